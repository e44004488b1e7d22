/// Data layer: core types, loading, cleaning, filtering and caching.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (schema checked)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  interest-rate / loan-count repair
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  Arc<Dataset> keyed by path + content digest
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  equality predicates → View (row indices)
///   └──────────┘
/// ```

pub mod cache;
pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;

#[cfg(test)]
pub(crate) mod testing {
    use super::model::{Dataset, Record, Schema, Value};

    /// Build a bank-marketing dataset from sparse rows; unnamed cells are
    /// missing.
    pub fn dataset(rows: Vec<Vec<(&str, Value)>>) -> Dataset {
        let schema = Schema::bank_marketing();
        let records = rows
            .into_iter()
            .map(|cells| {
                let mut values = vec![Value::Missing; schema.len()];
                for (name, value) in cells {
                    let idx = schema
                        .index_of(name)
                        .unwrap_or_else(|| panic!("no column {name}"));
                    values[idx] = value;
                }
                Record { values }
            })
            .collect();
        Dataset::from_records(schema, records)
    }
}
