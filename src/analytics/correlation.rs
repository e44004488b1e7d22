use super::encoding;
use crate::data::filter::View;
use crate::data::model::{ColumnKind, columns};
use crate::error::ConfigurationError;

/// Columns of the heatmap, in display order. Categorical entries go through
/// their fixed encoding.
pub const CORRELATION_COLUMNS: [&str; 17] = [
    columns::AGE,
    columns::ANNUAL_INCOME,
    columns::NUM_BANK_ACCOUNTS,
    columns::NUM_OF_LOAN,
    columns::INTEREST_RATE,
    columns::DELAY_FROM_DUE_DATE,
    columns::NUM_OF_DELAYED_PAYMENT,
    columns::OUTSTANDING_DEBT,
    columns::CREDIT_UTILIZATION_RATIO,
    columns::CREDIT_HISTORY_AGE_MONTHS,
    columns::TOTAL_EMI_PER_MONTH,
    columns::AMOUNT_INVESTED_MONTHLY,
    columns::MONTHLY_BALANCE,
    columns::MONTH,
    columns::OCCUPATION,
    columns::CREDIT_MIX,
    columns::CREDIT_SCORE,
];

/// Symmetric Pearson matrix. `None` marks a cell without enough data.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Encode one column of the view as numbers; missing or unmapped cells are
/// `None`.
fn feature(view: &View<'_>, column: &str) -> Result<Vec<Option<f64>>, ConfigurationError> {
    let ds = view.dataset();
    let idx = ds.column(column)?;
    match ds.schema.kind(idx) {
        ColumnKind::Numeric => Ok(view.values(idx).map(|v| v.as_f64()).collect()),
        ColumnKind::Categorical => {
            let enc = encoding::for_column(column)
                .ok_or_else(|| ConfigurationError::NotNumeric(column.to_string()))?;
            Ok(view.values(idx).map(|v| enc.code(v)).collect())
        }
    }
}

/// Pearson correlation over rows where both sides are present. `None` with
/// fewer than two such rows or zero variance on either side.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Pairwise matrix over `columns`.
pub fn correlation_matrix<S: AsRef<str>>(
    view: &View<'_>,
    columns: &[S],
) -> Result<CorrelationMatrix, ConfigurationError> {
    let features = columns
        .iter()
        .map(|c| feature(view, c.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let n = features.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&features[i], &features[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        values,
    })
}
