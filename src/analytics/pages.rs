use std::fmt;

use super::aggregate::{
    Bucket, count_distinct, grouped_count_distinct, grouped_mean, grouped_mean_by_key, max,
    mean_rounded, mode, percentage, round_to, sort_descending, sum_of_group_max, top_n,
    value_counts,
};
use super::correlation::{CORRELATION_COLUMNS, CorrelationMatrix, correlation_matrix};
use crate::config::DashboardConfig;
use crate::data::filter::View;
use crate::data::model::{Value, columns::*};
use crate::error::ConfigurationError;

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Kpis,
    Demographics,
    Monthly,
    Credit,
    Correlation,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Kpis,
        Page::Demographics,
        Page::Monthly,
        Page::Credit,
        Page::Correlation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Kpis => "KPIs",
            Page::Demographics => "Customer Demographics",
            Page::Monthly => "Monthly Financial Behaviour",
            Page::Credit => "Credit Payment & Loan Behaviour",
            Page::Correlation => "Correlation Heatmap",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Headline metrics. `None` means undefined for the current view.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiReport {
    pub total_customers: usize,
    pub total_months: usize,
    pub avg_bank_accounts: Option<f64>,
    pub avg_age: Option<f64>,
    pub common_age_category: Option<Value>,
    pub avg_annual_income: Option<f64>,
    pub on_time_payment_pct: Option<f64>,
    pub avg_credit_history_months: Option<f64>,
    /// Sum over customers of each customer's largest loan count.
    pub total_loans: f64,
    pub avg_emi: Option<f64>,
    pub max_outstanding_debt: Option<f64>,
    pub avg_interest_rate: Option<f64>,
    pub avg_delayed_payments: Option<f64>,
    pub max_loans_by_customer: Option<f64>,
}

impl KpiReport {
    pub fn compute(view: &View<'_>) -> Result<Self, ConfigurationError> {
        let delay = view.dataset().numeric_column(DELAY_FROM_DUE_DATE)?;
        Ok(Self {
            total_customers: count_distinct(view, CUSTOMER_ID)?,
            total_months: count_distinct(view, MONTH)?,
            avg_bank_accounts: mean_rounded(view, NUM_BANK_ACCOUNTS, 0)?,
            avg_age: mean_rounded(view, AGE, 0)?,
            common_age_category: mode(view, AGE_CATEGORY)?,
            avg_annual_income: mean_rounded(view, ANNUAL_INCOME, 1)?,
            on_time_payment_pct: percentage(view, |r| r.get(delay).as_f64() == Some(0.0)),
            avg_credit_history_months: mean_rounded(view, CREDIT_HISTORY_AGE_MONTHS, 0)?,
            total_loans: sum_of_group_max(view, CUSTOMER_ID, NUM_OF_LOAN)?,
            avg_emi: mean_rounded(view, TOTAL_EMI_PER_MONTH, 2)?,
            max_outstanding_debt: max(view, OUTSTANDING_DEBT)?,
            avg_interest_rate: mean_rounded(view, INTEREST_RATE, 2)?,
            avg_delayed_payments: mean_rounded(view, NUM_OF_DELAYED_PAYMENT, 0)?,
            max_loans_by_customer: max(view, NUM_OF_LOAN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemographicsReport {
    /// Unique customers per age category, largest first.
    pub customers_by_age_category: Vec<Bucket<usize>>,
    /// Unique customers per credit score bucket, in key order.
    pub customers_by_credit_score: Vec<Bucket<usize>>,
    /// Unique customers per customer category, largest first.
    pub customers_by_category: Vec<Bucket<usize>>,
    /// Customers ranked by their highest annual income.
    pub top_customers_by_income: Vec<Bucket<f64>>,
}

impl DemographicsReport {
    pub fn compute(view: &View<'_>, top: usize) -> Result<Self, ConfigurationError> {
        let mut by_age = grouped_count_distinct(view, AGE_CATEGORY, CUSTOMER_ID)?;
        sort_descending(&mut by_age);
        let mut by_category = grouped_count_distinct(view, CUSTOMER_CATEGORY, CUSTOMER_ID)?;
        sort_descending(&mut by_category);
        Ok(Self {
            customers_by_age_category: by_age,
            customers_by_credit_score: grouped_count_distinct(view, CREDIT_SCORE, CUSTOMER_ID)?,
            customers_by_category: by_category,
            top_customers_by_income: top_n(view, CUSTOMER_ID, ANNUAL_INCOME, top)?,
        })
    }
}

/// Month-indexed series; every series has one bucket per configured month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub avg_balance: Vec<Bucket<Option<f64>>>,
    pub avg_investment: Vec<Bucket<Option<f64>>>,
    pub avg_credit_utilization: Vec<Bucket<Option<f64>>>,
    pub avg_delayed_payments: Vec<Bucket<Option<f64>>>,
}

impl MonthlyReport {
    pub fn compute<S: AsRef<str>>(
        view: &View<'_>,
        month_order: &[S],
    ) -> Result<Self, ConfigurationError> {
        let by_month = |value: &str| grouped_mean(view, MONTH, value, month_order);
        Ok(Self {
            avg_balance: by_month(MONTHLY_BALANCE)?,
            avg_investment: by_month(AMOUNT_INVESTED_MONTHLY)?,
            avg_credit_utilization: by_month(CREDIT_UTILIZATION_RATIO)?,
            avg_delayed_payments: by_month(NUM_OF_DELAYED_PAYMENT)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreditReport {
    /// Records per loan count, in loan-count order.
    pub records_by_loan_count: Vec<Bucket<usize>>,
    pub customers_by_credit_mix: Vec<Bucket<usize>>,
    /// Mean credit history (whole months) per age category, largest first.
    pub credit_history_by_age_category: Vec<Bucket<Option<f64>>>,
    pub customers_by_payment_value: Vec<Bucket<usize>>,
}

impl CreditReport {
    pub fn compute(view: &View<'_>) -> Result<Self, ConfigurationError> {
        let mut history: Vec<Bucket<Option<f64>>> =
            grouped_mean_by_key(view, AGE_CATEGORY, CREDIT_HISTORY_AGE_MONTHS)?
                .into_iter()
                .map(|b| Bucket::new(b.key, b.value.map(|m| round_to(m, 0))))
                .collect();
        sort_descending(&mut history);
        Ok(Self {
            records_by_loan_count: value_counts(view, NUM_OF_LOAN)?,
            customers_by_credit_mix: grouped_count_distinct(view, CREDIT_MIX, CUSTOMER_ID)?,
            credit_history_by_age_category: history,
            customers_by_payment_value: grouped_count_distinct(view, PAYMENT_VALUE, CUSTOMER_ID)?,
        })
    }
}

/// Everything one page needs to render.
#[derive(Debug, Clone, PartialEq)]
pub enum PageReport {
    Kpis(KpiReport),
    Demographics(DemographicsReport),
    Monthly(MonthlyReport),
    Credit(CreditReport),
    Correlation(CorrelationMatrix),
}

/// Compute the report for `page` over the view.
pub fn build_report(
    page: Page,
    view: &View<'_>,
    config: &DashboardConfig,
) -> Result<PageReport, ConfigurationError> {
    Ok(match page {
        Page::Kpis => PageReport::Kpis(KpiReport::compute(view)?),
        Page::Demographics => {
            PageReport::Demographics(DemographicsReport::compute(view, config.top_n)?)
        }
        Page::Monthly => PageReport::Monthly(MonthlyReport::compute(view, &config.month_order)?),
        Page::Credit => PageReport::Credit(CreditReport::compute(view)?),
        Page::Correlation => {
            PageReport::Correlation(correlation_matrix(view, &CORRELATION_COLUMNS)?)
        }
    })
}
