use std::collections::BTreeMap;
use std::fmt;

use super::model::{ColumnKind, Dataset, Record, Value};
use crate::error::ConfigurationError;

// ---------------------------------------------------------------------------
// Filter predicate: one equality constraint per column
// ---------------------------------------------------------------------------

/// Label used by the UI for the wildcard choice.
pub const ALL_LABEL: &str = "All";

/// What a column is constrained to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Wildcard: no constraint.
    #[default]
    All,
    Only(Value),
}

impl Selection {
    /// Interpret a UI label; `"All"` is the wildcard.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_LABEL {
            Selection::All
        } else {
            Selection::Only(Value::from(label))
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "{ALL_LABEL}"),
            Selection::Only(v) => write!(f, "{v}"),
        }
    }
}

/// Per-column constraints; columns absent from the map are unconstrained.
pub type FilterState = BTreeMap<String, Selection>;

// ---------------------------------------------------------------------------
// View – the rows that pass the active filters
// ---------------------------------------------------------------------------

/// A derived, read-only window onto a dataset. Holds row indices only.
#[derive(Debug, Clone)]
pub struct View<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> View<'a> {
    /// Every row of the dataset.
    pub fn all(dataset: &'a Dataset) -> Self {
        View {
            dataset,
            rows: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Indices into `dataset().records`, ascending.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.rows.iter().map(move |&i| &dataset.records[i])
    }

    /// Cells of one column, in row order.
    pub fn values(&self, column: usize) -> impl Iterator<Item = &'a Value> + '_ {
        self.records().map(move |r| r.get(column))
    }

    /// Narrow this view by further constraints.
    pub fn refine(&self, filters: &FilterState) -> Result<View<'a>, ConfigurationError> {
        let predicates = compile(self.dataset, filters)?;
        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&i| {
                let record = &self.dataset.records[i];
                predicates.iter().all(|(col, want)| record.get(*col) == want)
            })
            .collect();
        Ok(View {
            dataset: self.dataset,
            rows,
        })
    }
}

/// Return the view of rows that pass all active filters.
///
/// Constraints compose conjunctively. A constraint naming an unknown column,
/// or a value the column never takes, is a [`ConfigurationError`]. An empty
/// result is not an error.
pub fn apply<'a>(
    dataset: &'a Dataset,
    filters: &FilterState,
) -> Result<View<'a>, ConfigurationError> {
    View::all(dataset).refine(filters)
}

/// Resolve filters to `(column index, required value)` pairs, dropping
/// wildcards. Labels on numeric columns are read as numbers.
fn compile(
    dataset: &Dataset,
    filters: &FilterState,
) -> Result<Vec<(usize, Value)>, ConfigurationError> {
    let mut predicates = Vec::new();
    for (column, selection) in filters {
        let idx = dataset.column(column)?;
        let Selection::Only(value) = selection else {
            continue;
        };
        let unknown = || ConfigurationError::UnknownValue {
            column: column.clone(),
            value: value.to_string(),
        };
        let wanted = match dataset.schema.kind(idx) {
            ColumnKind::Categorical => {
                let known = dataset
                    .unique_values
                    .get(column)
                    .is_some_and(|vals| vals.contains(value));
                known.then(|| value.clone())
            }
            ColumnKind::Numeric => numeric_value(value)
                .filter(|v| dataset.records.iter().any(|r| r.get(idx) == v)),
        };
        predicates.push((idx, wanted.ok_or_else(unknown)?));
    }
    Ok(predicates)
}

fn numeric_value(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::Text(s) => s.trim().parse::<f64>().ok().map(Value::from),
        Value::Missing => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::columns;
    use crate::data::testing::dataset;

    fn sample() -> Dataset {
        let row = |month: &str, occupation: &str, loan: &str| {
            vec![
                (columns::MONTH, Value::from(month)),
                (columns::OCCUPATION, Value::from(occupation)),
                (columns::TYPE_OF_LOAN, Value::from(loan)),
            ]
        };
        dataset(vec![
            row("January", "Lawyer", "Auto Loan"),
            row("January", "Doctor", "Home Loan"),
            row("February", "Lawyer", "Home Loan"),
            row("March", "Writer", "Auto Loan"),
        ])
    }

    fn filters(pairs: &[(&str, &str)]) -> FilterState {
        pairs
            .iter()
            .map(|(c, v)| (c.to_string(), Selection::from_label(v)))
            .collect()
    }

    #[test]
    fn no_constraints_keep_everything() {
        let ds = sample();
        let view = apply(&ds, &FilterState::new()).unwrap();
        assert_eq!(view.rows(), &[0, 1, 2, 3]);
    }

    #[test]
    fn wildcard_is_no_constraint() {
        let ds = sample();
        let view = apply(&ds, &filters(&[(columns::MONTH, "All")])).unwrap();
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn constraints_compose_conjunctively() {
        let ds = sample();
        let view = apply(
            &ds,
            &filters(&[(columns::MONTH, "January"), (columns::OCCUPATION, "Lawyer")]),
        )
        .unwrap();
        assert_eq!(view.rows(), &[0]);
    }

    #[test]
    fn empty_result_is_valid() {
        let ds = sample();
        let view = apply(
            &ds,
            &filters(&[(columns::MONTH, "March"), (columns::OCCUPATION, "Lawyer")]),
        )
        .unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn filtering_is_a_subset_and_idempotent() {
        let ds = sample();
        let f = filters(&[(columns::TYPE_OF_LOAN, "Home Loan")]);
        let once = apply(&ds, &f).unwrap();
        let twice = once.refine(&f).unwrap();
        assert_eq!(once.rows(), twice.rows());
        assert_eq!(once.rows(), apply(&ds, &f).unwrap().rows());
        assert!(once.rows().iter().all(|&i| i < ds.len()));
    }

    #[test]
    fn unknown_column_is_configuration_error() {
        let ds = sample();
        let err = apply(&ds, &filters(&[("Planet", "Mars")])).unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownColumn("Planet".into()));
    }

    #[test]
    fn unknown_value_is_configuration_error() {
        let ds = sample();
        let err = apply(&ds, &filters(&[(columns::MONTH, "December")])).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownValue {
                column: "Month".into(),
                value: "December".into()
            }
        );
    }

    #[test]
    fn unknown_column_fails_even_as_wildcard() {
        let ds = sample();
        assert!(apply(&ds, &filters(&[("Planet", "All")])).is_err());
    }

    #[test]
    fn numeric_value_absent_from_column_is_unknown() {
        let ds = dataset(vec![
            vec![(columns::AGE, Value::Number(30.0))],
            vec![(columns::AGE, Value::Number(41.0))],
        ]);
        let mut f = FilterState::new();
        f.insert(columns::AGE.into(), Selection::Only(Value::Number(999.0)));
        assert_eq!(
            apply(&ds, &f).unwrap_err(),
            ConfigurationError::UnknownValue {
                column: "Age".into(),
                value: "999".into()
            }
        );
    }

    #[test]
    fn numeric_labels_match_numbers() {
        let ds = dataset(vec![
            vec![(columns::AGE, Value::Number(30.0))],
            vec![(columns::AGE, Value::Number(41.0))],
        ]);
        let view = apply(&ds, &filters(&[(columns::AGE, "41")])).unwrap();
        assert_eq!(view.rows(), &[1]);
        assert!(apply(&ds, &filters(&[(columns::AGE, "forty")])).is_err());
    }
}
