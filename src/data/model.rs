use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::ConfigurationError;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub mod columns {
    pub const CUSTOMER_ID: &str = "Customer_ID";
    pub const MONTH: &str = "Month";
    pub const AGE: &str = "Age";
    pub const AGE_CATEGORY: &str = "Age_Category";
    pub const OCCUPATION: &str = "Occupation";
    pub const ANNUAL_INCOME: &str = "Annual_Income";
    pub const INCOME_CATEGORY: &str = "Income_Category";
    pub const NUM_BANK_ACCOUNTS: &str = "Num_Bank_Accounts";
    pub const NUM_OF_LOAN: &str = "Num_of_Loan";
    pub const TYPE_OF_LOAN: &str = "Type_of_Loan";
    pub const INTEREST_RATE: &str = "Interest_Rate";
    pub const DELAY_FROM_DUE_DATE: &str = "Delay_from_due_date";
    pub const NUM_OF_DELAYED_PAYMENT: &str = "Num_of_Delayed_Payment";
    pub const OUTSTANDING_DEBT: &str = "Outstanding_Debt";
    pub const CREDIT_UTILIZATION_RATIO: &str = "Credit_Utilization_Ratio";
    pub const CREDIT_HISTORY_AGE_MONTHS: &str = "Credit_History_Age_Months";
    pub const TOTAL_EMI_PER_MONTH: &str = "Total_EMI_per_month";
    pub const AMOUNT_INVESTED_MONTHLY: &str = "Amount_invested_monthly";
    pub const MONTHLY_BALANCE: &str = "Monthly_Balance";
    pub const CREDIT_MIX: &str = "Credit_Mix";
    pub const CREDIT_SCORE: &str = "Credit_Score";
    pub const CUSTOMER_CATEGORY: &str = "Customer_Category";
    pub const PAYMENT_VALUE: &str = "Payment_Value";
    pub const SPENDING_LEVEL: &str = "Spending_Level";
}

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell. `Missing` stands for empty / NA cells and is
/// never counted by aggregations.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

// -- Manual Eq/Ord/Hash so values can key BTreeMap and HashSet groups --

/// `-0.0` and `0.0` are one value.
fn canonical(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Value::Missing, Value::Missing) => Ordering::Equal,
            (Value::Missing, _) => Ordering::Less,
            (_, Value::Missing) => Ordering::Greater,
            (Value::Number(a), Value::Number(b)) => canonical(*a).total_cmp(&canonical(*b)),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Number(v) => canonical(*v).to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{:.0}", canonical(*v))
            }
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Value::Missing
        } else {
            Value::Number(canonical(v))
        }
    }
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Ordered list of named, typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<(String, ColumnKind)>,
}

impl Schema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnKind)>,
        S: Into<String>,
    {
        Schema {
            columns: columns.into_iter().map(|(n, k)| (n.into(), k)).collect(),
        }
    }

    /// The customer-record layout every source must provide.
    pub fn bank_marketing() -> Self {
        use columns::*;
        use ColumnKind::{Categorical, Numeric};
        Schema::new([
            (CUSTOMER_ID, Categorical),
            (MONTH, Categorical),
            (AGE, Numeric),
            (AGE_CATEGORY, Categorical),
            (OCCUPATION, Categorical),
            (ANNUAL_INCOME, Numeric),
            (INCOME_CATEGORY, Categorical),
            (NUM_BANK_ACCOUNTS, Numeric),
            (NUM_OF_LOAN, Numeric),
            (TYPE_OF_LOAN, Categorical),
            (INTEREST_RATE, Numeric),
            (DELAY_FROM_DUE_DATE, Numeric),
            (NUM_OF_DELAYED_PAYMENT, Numeric),
            (OUTSTANDING_DEBT, Numeric),
            (CREDIT_UTILIZATION_RATIO, Numeric),
            (CREDIT_HISTORY_AGE_MONTHS, Numeric),
            (TOTAL_EMI_PER_MONTH, Numeric),
            (AMOUNT_INVESTED_MONTHLY, Numeric),
            (MONTHLY_BALANCE, Numeric),
            (CREDIT_MIX, Categorical),
            (CREDIT_SCORE, Categorical),
            (CUSTOMER_CATEGORY, Categorical),
            (PAYMENT_VALUE, Categorical),
            (SPENDING_LEVEL, Categorical),
        ])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.columns[idx].0
    }

    pub fn kind(&self, idx: usize) -> ColumnKind {
        self.columns[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.columns.iter().map(|(n, k)| (n.as_str(), *k))
    }
}

// ---------------------------------------------------------------------------
// Record – one customer-month observation
// ---------------------------------------------------------------------------

/// One row; `values[i]` belongs to schema column `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub values: Vec<Value>,
}

impl Record {
    pub fn get(&self, idx: usize) -> &Value {
        &self.values[idx]
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed categorical indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub schema: Schema,
    pub records: Vec<Record>,
    /// For each categorical column the sorted set of non-missing values.
    pub unique_values: BTreeMap<String, BTreeSet<Value>>,
}

impl Dataset {
    /// Build column indices from the loaded records.
    pub fn from_records(schema: Schema, records: Vec<Record>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<Value>> = BTreeMap::new();
        for (idx, (name, kind)) in schema.iter().enumerate() {
            if kind != ColumnKind::Categorical {
                continue;
            }
            let values = records
                .iter()
                .map(|r| r.get(idx))
                .filter(|v| !v.is_missing())
                .cloned()
                .collect();
            unique_values.insert(name.to_string(), values);
        }
        Dataset {
            schema,
            records,
            unique_values,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve a column name to its position.
    pub fn column(&self, name: &str) -> Result<usize, ConfigurationError> {
        self.schema
            .index_of(name)
            .ok_or_else(|| ConfigurationError::UnknownColumn(name.to_string()))
    }

    /// Resolve a column name, requiring it to be numeric.
    pub fn numeric_column(&self, name: &str) -> Result<usize, ConfigurationError> {
        let idx = self.column(name)?;
        match self.schema.kind(idx) {
            ColumnKind::Numeric => Ok(idx),
            ColumnKind::Categorical => Err(ConfigurationError::NotNumeric(name.to_string())),
        }
    }
}
