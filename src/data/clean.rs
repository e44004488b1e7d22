use serde::{Deserialize, Serialize};

use super::model::{Dataset, Record, Value, columns};
use crate::error::ConfigurationError;

// ---------------------------------------------------------------------------
// Cleaning rules
// ---------------------------------------------------------------------------

/// Dataset-specific repairs applied before any aggregation. Out-of-range
/// values are reset to a designated replacement, not clipped to the bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleaningRules {
    /// Interest rates above this are sentinel values.
    pub interest_rate_ceiling: f64,
    pub interest_rate_replacement: f64,
    /// Loan counts outside `loan_count_min..=loan_count_max` are invalid.
    pub loan_count_min: f64,
    pub loan_count_max: f64,
    pub loan_count_replacement: f64,
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            interest_rate_ceiling: 34.0,
            interest_rate_replacement: 14.0,
            loan_count_min: 0.0,
            loan_count_max: 9.0,
            loan_count_replacement: 0.0,
        }
    }
}

impl CleaningRules {
    /// Replacements must themselves be in range, otherwise a second pass would
    /// rewrite them again.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.interest_rate_replacement > self.interest_rate_ceiling {
            return Err(ConfigurationError::InvalidCleaningRule(format!(
                "interest rate replacement {} exceeds ceiling {}",
                self.interest_rate_replacement, self.interest_rate_ceiling
            )));
        }
        if self.loan_count_min > self.loan_count_max {
            return Err(ConfigurationError::InvalidCleaningRule(format!(
                "loan count range {}..={} is empty",
                self.loan_count_min, self.loan_count_max
            )));
        }
        if !(self.loan_count_min..=self.loan_count_max).contains(&self.loan_count_replacement) {
            return Err(ConfigurationError::InvalidCleaningRule(format!(
                "loan count replacement {} is outside {}..={}",
                self.loan_count_replacement, self.loan_count_min, self.loan_count_max
            )));
        }
        Ok(())
    }

    fn interest_rate(&self, v: f64) -> Option<f64> {
        (v > self.interest_rate_ceiling).then_some(self.interest_rate_replacement)
    }

    fn loan_count(&self, v: f64) -> Option<f64> {
        (v < self.loan_count_min || v > self.loan_count_max).then_some(self.loan_count_replacement)
    }
}

/// How many cells each rule rewrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub interest_rate_replaced: usize,
    pub loan_count_replaced: usize,
}

impl CleaningReport {
    pub fn total(&self) -> usize {
        self.interest_rate_replaced + self.loan_count_replaced
    }
}

// ---------------------------------------------------------------------------
// Cleaning pass
// ---------------------------------------------------------------------------

/// Return a repaired copy of `dataset`. Row-local and idempotent; missing
/// cells stay missing.
pub fn clean(dataset: &Dataset, rules: &CleaningRules) -> Dataset {
    clean_with_report(dataset, rules).0
}

/// As [`clean`], also reporting how many cells were replaced.
pub fn clean_with_report(dataset: &Dataset, rules: &CleaningRules) -> (Dataset, CleaningReport) {
    let rate_idx = dataset.schema.index_of(columns::INTEREST_RATE);
    let loan_idx = dataset.schema.index_of(columns::NUM_OF_LOAN);
    let mut report = CleaningReport::default();

    let records = dataset
        .records
        .iter()
        .map(|record| {
            let mut values = record.values.clone();
            if let Some(idx) = rate_idx {
                if let Some(fixed) = values[idx].as_f64().and_then(|v| rules.interest_rate(v)) {
                    values[idx] = Value::from(fixed);
                    report.interest_rate_replaced += 1;
                }
            }
            if let Some(idx) = loan_idx {
                if let Some(fixed) = values[idx].as_f64().and_then(|v| rules.loan_count(v)) {
                    values[idx] = Value::from(fixed);
                    report.loan_count_replaced += 1;
                }
            }
            Record { values }
        })
        .collect();

    if report.total() > 0 {
        log::warn!(
            "cleaning replaced {} interest rate and {} loan count values",
            report.interest_rate_replaced,
            report.loan_count_replaced
        );
    }

    (
        Dataset {
            schema: dataset.schema.clone(),
            records,
            unique_values: dataset.unique_values.clone(),
        },
        report,
    )
}
