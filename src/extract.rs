//! Column-function binding
//!
//! An [`Extractor`] is a function equipped with an ordered list of column
//! names. Applying it to a row looks each name up (missing → `Null`) and
//! calls the function positionally; the function decides how to handle nulls,
//! commonly by returning `Null`, which the series assembler drops later.
//!
//! Functions are never resolved against a global namespace. A caller-supplied
//! [`FunctionRegistry`] maps names to function values, resolved once at
//! configuration time; unknown names are rejected immediately.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{DbplotError, Result, Row, Value};

/// A plain function over positional scalar arguments.
pub type ValueFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Number of arguments a registered function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Variadic,
}

/// A named function in the registry.
///
/// `params` holds the function's declared parameter names; when a plot spec
/// names a function but omits the column list, the parameter names double as
/// column names (the explicit stand-in for argspec reflection).
#[derive(Clone)]
pub struct UserFunction {
    func: ValueFn,
    arity: Arity,
    params: Vec<String>,
}

impl UserFunction {
    pub fn new(func: ValueFn, arity: Arity, params: &[&str]) -> Self {
        UserFunction {
            func,
            arity,
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }
}

/// Caller-supplied mapping from function name to function value.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    funcs: HashMap<String, UserFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        FunctionRegistry {
            funcs: HashMap::new(),
        }
    }

    /// Registry pre-loaded with general-purpose builtins.
    pub fn builtins() -> Self {
        let mut reg = FunctionRegistry::new();
        reg.register(
            "identity",
            UserFunction::new(Arc::new(identity), Arity::Exact(1), &["x"]),
        );
        reg.register(
            "join_underscore",
            UserFunction::new(Arc::new(join_underscore), Arity::Variadic, &[]),
        );
        reg.register(
            "abs",
            UserFunction::new(
                Arc::new(|args: &[Value]| numeric1(args, f64::abs)),
                Arity::Exact(1),
                &["x"],
            ),
        );
        reg.register(
            "negate",
            UserFunction::new(
                Arc::new(|args: &[Value]| numeric1(args, |x| -x)),
                Arity::Exact(1),
                &["x"],
            ),
        );
        reg.register(
            "log10",
            UserFunction::new(
                Arc::new(|args: &[Value]| {
                    numeric1(args, f64::log10)
                        .as_f64()
                        .filter(|v| v.is_finite())
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }),
                Arity::Exact(1),
                &["x"],
            ),
        );
        reg.register(
            "prefix",
            UserFunction::new(Arc::new(prefix), Arity::Exact(1), &["name"]),
        );
        reg
    }

    pub fn register(&mut self, name: &str, func: UserFunction) {
        self.funcs.insert(name.to_string(), func);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// Look a function up by name. Absence is a fatal configuration-time error.
    pub fn resolve(&self, name: &str) -> Result<&UserFunction> {
        self.funcs
            .get(name)
            .ok_or_else(|| DbplotError::NameResolution(name.to_string()))
    }
}

/// Which function to fall back to when a spec lists columns without a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    /// Single column passed through unchanged (x/y values).
    Identity,
    /// Columns joined with `_` (labels and group keys).
    JoinUnderscore,
}

/// A function bound to named row columns.
#[derive(Clone)]
pub struct Extractor {
    func: ValueFn,
    args: Vec<String>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    pub fn new(func: ValueFn, args: Vec<String>) -> Self {
        Extractor { func, args }
    }

    /// The identity extractor over one column.
    pub fn identity(column: &str) -> Self {
        Extractor::new(Arc::new(identity), vec![column.to_string()])
    }

    /// An extractor ignoring its row and returning a fixed value. Used as the
    /// default grouping key so "no grouping" degenerates to one group.
    pub fn constant(value: Value) -> Self {
        Extractor::new(Arc::new(move |_: &[Value]| value.clone()), Vec::new())
    }

    /// Bind a spec's (function name, column list) pair against a registry.
    ///
    /// Both absent means "not configured" (`None`); a function name alone
    /// borrows the function's declared parameter names as columns; columns
    /// alone fall back to `default`. Arity mismatches and unresolvable names
    /// fail here, before any query runs.
    pub fn bind(
        func_name: Option<&str>,
        columns: Option<&[String]>,
        registry: &FunctionRegistry,
        default: ColumnDefault,
    ) -> Result<Option<Extractor>> {
        match (func_name, columns) {
            (None, None) => Ok(None),
            (Some(name), cols) => {
                let func = registry.resolve(name)?;
                let args: Vec<String> = match cols {
                    Some(cols) => cols.to_vec(),
                    None => {
                        if func.params.is_empty() {
                            return Err(DbplotError::Config(format!(
                                "function '{}' declares no parameter names; \
                                 list the columns explicitly",
                                name
                            )));
                        }
                        func.params.clone()
                    }
                };
                if let Arity::Exact(n) = func.arity {
                    if args.len() != n {
                        return Err(DbplotError::Config(format!(
                            "function '{}' takes {} argument(s) but {} column(s) were bound",
                            name,
                            n,
                            args.len()
                        )));
                    }
                }
                Ok(Some(Extractor::new(func.func.clone(), args)))
            }
            (None, Some(cols)) => match default {
                ColumnDefault::Identity => {
                    if cols.len() != 1 {
                        return Err(DbplotError::Config(format!(
                            "{} columns bound without a function; \
                             the identity default takes exactly one",
                            cols.len()
                        )));
                    }
                    Ok(Some(Extractor::identity(&cols[0])))
                }
                ColumnDefault::JoinUnderscore => Ok(Some(Extractor::new(
                    Arc::new(join_underscore),
                    cols.to_vec(),
                ))),
            },
        }
    }

    /// Apply to a row: look up each bound column (missing → `Null`) and call
    /// the function positionally. Never errors.
    pub fn apply(&self, row: &Row) -> Value {
        let args: Vec<Value> = self.args.iter().map(|a| row.get(a)).collect();
        (self.func)(&args)
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

fn identity(args: &[Value]) -> Value {
    args.first().cloned().unwrap_or(Value::Null)
}

fn join_underscore(args: &[Value]) -> Value {
    let parts: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    Value::Text(parts.join("_"))
}

fn prefix(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Text(s)) if !s.is_empty() => {
            let head = s.split('_').next().unwrap_or("").split('-').next().unwrap_or("");
            Value::text(head)
        }
        _ => Value::text("X"),
    }
}

fn numeric1(args: &[Value], f: impl Fn(f64) -> f64) -> Value {
    args.first()
        .and_then(Value::as_f64)
        .map(|x| Value::Number(f(x)))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[test]
    fn test_identity_extractor() {
        let ex = Extractor::identity("a");
        assert_eq!(ex.apply(&row![("a", 4.0)]), Value::Number(4.0));
    }

    #[test]
    fn test_missing_column_is_null_not_error() {
        let ex = Extractor::identity("nope");
        assert_eq!(ex.apply(&row![("a", 4.0)]), Value::Null);
    }

    #[test]
    fn test_unknown_name_is_resolution_error() {
        let reg = FunctionRegistry::builtins();
        let cols = vec!["a".to_string()];
        let err = Extractor::bind(Some("no_such_fn"), Some(&cols), &reg, ColumnDefault::Identity)
            .unwrap_err();
        assert!(matches!(err, DbplotError::NameResolution(_)));
    }

    #[test]
    fn test_bind_nothing_is_none() {
        let reg = FunctionRegistry::builtins();
        let bound = Extractor::bind(None, None, &reg, ColumnDefault::Identity).unwrap();
        assert!(bound.is_none());
    }

    #[test]
    fn test_bind_derives_columns_from_params() {
        let mut reg = FunctionRegistry::new();
        reg.register(
            "total",
            UserFunction::new(
                Arc::new(|args: &[Value]| {
                    Value::Number(args.iter().filter_map(Value::as_f64).sum())
                }),
                Arity::Exact(2),
                &["a", "b"],
            ),
        );
        let ex = Extractor::bind(Some("total"), None, &reg, ColumnDefault::Identity)
            .unwrap()
            .unwrap();
        assert_eq!(ex.args(), &["a".to_string(), "b".to_string()]);
        assert_eq!(ex.apply(&row![("a", 1.0), ("b", 2.0)]), Value::Number(3.0));
    }

    #[test]
    fn test_bind_arity_mismatch_is_config_error() {
        let reg = FunctionRegistry::builtins();
        let cols = vec!["a".to_string(), "b".to_string()];
        let err = Extractor::bind(Some("abs"), Some(&cols), &reg, ColumnDefault::Identity)
            .unwrap_err();
        assert!(matches!(err, DbplotError::Config(_)));
    }

    #[test]
    fn test_join_underscore_default() {
        let reg = FunctionRegistry::builtins();
        let cols = vec!["a".to_string(), "b".to_string()];
        let ex = Extractor::bind(None, Some(&cols), &reg, ColumnDefault::JoinUnderscore)
            .unwrap()
            .unwrap();
        assert_eq!(
            ex.apply(&row![("a", "Fe"), ("b", 3.0)]),
            Value::text("Fe_3")
        );
    }

    #[test]
    fn test_null_joins_as_empty_segment() {
        let reg = FunctionRegistry::builtins();
        let cols = vec!["a".to_string(), "b".to_string()];
        let ex = Extractor::bind(None, Some(&cols), &reg, ColumnDefault::JoinUnderscore)
            .unwrap()
            .unwrap();
        assert_eq!(ex.apply(&row![("a", "Fe")]), Value::text("Fe_"));
    }

    #[test]
    fn test_constant_extractor() {
        let ex = Extractor::constant(Value::Number(1.0));
        assert_eq!(ex.apply(&row![("a", 9.0)]), Value::Number(1.0));
    }

    #[test]
    fn test_prefix_builtin() {
        let reg = FunctionRegistry::builtins();
        let cols = vec!["name".to_string()];
        let ex = Extractor::bind(Some("prefix"), Some(&cols), &reg, ColumnDefault::Identity)
            .unwrap()
            .unwrap();
        assert_eq!(
            ex.apply(&row![("name", "Li-bcc_1,1,0_3x3x4")]),
            Value::text("Li")
        );
        assert_eq!(ex.apply(&row![("other", 1.0)]), Value::text("X"));
    }
}
