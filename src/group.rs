//! Order-preserving partitioning of rows into groups
//!
//! [`partition`] splits an ordered sequence of elements into [`Group`]s by a
//! computed key, preserving the order in which each key was first observed.
//! That ordering is externally observable (it fixes rendering and legend
//! order) and must not be replaced by a sort. Sub-grouping reuses the same
//! algorithm on a group's elements.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::extract::Extractor;
use crate::{Row, Value};

/// An opaque, equality-comparable grouping key computed from a row.
///
/// Wraps a [`Value`] with `Eq`/`Hash` so computed keys can index a map;
/// numbers compare by bit pattern, which is exact for keys produced by
/// lookups and deterministic functions.
#[derive(Debug, Clone)]
pub struct GroupKey(pub Value);

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Null => 0u8.hash(state),
            Value::Number(n) => {
                1u8.hash(state);
                n.to_bits().hash(state);
            }
            Value::Text(s) => {
                2u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl From<Value> for GroupKey {
    fn from(v: Value) -> Self {
        GroupKey(v)
    }
}

/// A partition of elements sharing a computed key, carrying a display label.
///
/// `id` is the 0-based assignment order; within one partitioning pass each
/// distinct key owns exactly one id. Groups are mutated only during
/// construction, then read-only.
#[derive(Debug, Clone)]
pub struct Group<T> {
    pub id: usize,
    pub key: GroupKey,
    pub label: String,
    pub elements: Vec<T>,
}

impl<T> Group<T> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Partition elements by computed key, in order of first key appearance.
///
/// The label is computed from the first element observed for each key.
pub fn partition<T>(
    items: impl IntoIterator<Item = T>,
    key_of: impl Fn(&T) -> GroupKey,
    label_of: impl Fn(&T) -> String,
) -> Vec<Group<T>> {
    let mut groups: Vec<Group<T>> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for item in items {
        let key = key_of(&item);
        match index.get(&key) {
            Some(&i) => groups[i].elements.push(item),
            None => {
                let id = groups.len();
                index.insert(key.clone(), id);
                let label = label_of(&item);
                groups.push(Group {
                    id,
                    key,
                    label,
                    elements: vec![item],
                });
            }
        }
    }
    groups
}

/// Partition query rows using optional key/label extractors.
///
/// With no key extractor every row lands in one group labeled with the empty
/// string; "no grouping" degenerates to the single-group case, not an error.
pub fn partition_rows(
    rows: Vec<Row>,
    key_fn: Option<&Extractor>,
    label_fn: Option<&Extractor>,
) -> Vec<Group<Row>> {
    partition(
        rows,
        |row| match key_fn {
            Some(f) => GroupKey(f.apply(row)),
            None => GroupKey(Value::Number(1.0)),
        },
        |row| match label_fn {
            Some(f) => f.apply(row).to_string(),
            None => String::new(),
        },
    )
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn partition_conserves_elements_and_orders_keys(
            keys in proptest::collection::vec(0u8..6, 0..64)
        ) {
            let groups = partition(
                keys.clone(),
                |k| GroupKey(Value::Number(*k as f64)),
                |k| k.to_string(),
            );

            let total: usize = groups.iter().map(Group::len).sum();
            prop_assert_eq!(total, keys.len());

            // group order matches first appearance of each key
            let mut seen = Vec::new();
            for k in &keys {
                if !seen.contains(k) {
                    seen.push(*k);
                }
            }
            let group_keys: Vec<u8> = groups.iter().map(|g| g.elements[0]).collect();
            prop_assert_eq!(group_keys, seen);

            // ids are dense and ordered
            for (i, g) in groups.iter().enumerate() {
                prop_assert_eq!(g.id, i);
            }
        }
    }
}
