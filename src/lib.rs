/*!
# dbplot - database rows to plot series

dbplot turns the rows returned by a SQL query into labeled, grouped, aggregated
and styled plot series. A plot is described by a small JSON document binding
functions to row columns; the engine partitions the rows into groups by a
computed key, collapses each group into plottable points, runs an ordered
post-processing pipeline over every series, and hands a renderer-agnostic
figure description to a pluggable writer.

## Example

```rust,ignore
use dbplot::{Plot, PlotConfig, FunctionRegistry};
use dbplot::reader::{Reader, SqliteReader};
use dbplot::writer::{Writer, JsonWriter};

let config: PlotConfig = serde_json::from_str(r#"{
    "type": "line",
    "query": "SELECT step, energy, name FROM runs",
    "x_columns": "step",
    "y_columns": "energy",
    "group_columns": "name"
}"#)?;

let plot = Plot::new(config, &FunctionRegistry::builtins())?;
let reader = SqliteReader::from_connection_string("sqlite://runs.db")?;
let figure = plot.render(&reader, &[])?;
println!("{}", JsonWriter.write(&figure)?);
```

## Architecture

Data flows one way:

rows → bound extraction → grouping → aggregation → post-processing → figure

- [`reader`] - data source abstraction layer (SQLite, PostgreSQL)
- [`extract`] - binding named functions to named row columns
- [`group`] - order-preserving partitioning by computed key
- [`series`] - series assembly and same-x aggregation
- [`transform`] - post-processing transform pipeline
- [`aggregate`] - aggregation functions and the convergence detector
- [`style`] - deterministic label → style resolution
- [`plot`] - the Line/Bar/Histogram strategy layer
- [`writer`] - output format abstraction layer (JSON, SVG)

No engine component depends on a rendering backend; the boundary is the
[`Figure`](plot::Figure) description.
*/

pub mod aggregate;
pub mod extract;
pub mod group;
pub mod plot;
pub mod reader;
pub mod series;
pub mod style;
pub mod transform;
pub mod value;
pub mod writer;

// Re-export key types for convenience
pub use aggregate::{Aggregation, ConvergenceSpec, ThresholdTable};
pub use extract::{Extractor, FunctionRegistry};
pub use group::{partition, Group, GroupKey};
pub use plot::{Figure, Plot, PlotConfig, PlotKind};
pub use series::SeriesPoint;
pub use style::{LinePattern, Marker, Style};
pub use transform::Transform;
pub use value::{Row, Value};

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum DbplotError {
    /// Missing or unsupported configuration keys, invalid extractor arity.
    /// Raised before any query executes.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An extractor was configured by name but the name is absent from the
    /// function registry.
    #[error("Unknown function name: {0}")]
    NameResolution(String),

    /// Query execution failed. Propagated from the reader untouched.
    #[error("Query error: {0}")]
    Query(String),

    /// Two series points share an x value inside the derivative transform,
    /// where the finite-difference formula is undefined.
    #[error("Duplicate abscissa: {0}")]
    DuplicateAbscissa(String),

    /// Data source connection or setup error.
    #[error("Data source error: {0}")]
    Reader(String),

    /// Output generation error.
    #[error("Output generation error: {0}")]
    Writer(String),
}

pub type Result<T> = std::result::Result<T, DbplotError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
