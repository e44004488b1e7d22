use crate::analytics::pages::{Page, PageReport, build_report};
use crate::config::DashboardConfig;
use crate::data::filter::{FilterState, Selection, apply};
use crate::data::model::Dataset;
use crate::error::ConfigurationError;

/// Per-user interaction state. Passed into every pipeline run; nothing about a
/// session lives in process-wide state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub page: Page,
    pub filters: FilterState,
}

impl Session {
    /// A session with every configured filter set to the wildcard.
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            page: Page::default(),
            filters: config
                .filter_columns
                .iter()
                .map(|c| (c.clone(), Selection::All))
                .collect(),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Records passing the session filters.
    pub visible_records: usize,
    pub report: PageReport,
}

/// Filter the (already cleaned) dataset by the session and compute the
/// report for the session's page.
pub fn run(
    dataset: &Dataset,
    session: &Session,
    config: &DashboardConfig,
) -> Result<PipelineOutput, ConfigurationError> {
    let view = apply(dataset, &session.filters)?;
    log::debug!(
        "{}: {} of {} records pass filters",
        session.page,
        view.len(),
        dataset.len()
    );
    let report = build_report(session.page, &view, config)?;
    Ok(PipelineOutput {
        visible_records: view.len(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Value, columns};
    use crate::data::testing::dataset;

    fn sample() -> Dataset {
        dataset(vec![
            vec![
                (columns::CUSTOMER_ID, Value::from("A")),
                (columns::MONTH, Value::from("January")),
                (columns::OCCUPATION, Value::from("Lawyer")),
                (columns::TYPE_OF_LOAN, Value::from("Auto Loan")),
            ],
            vec![
                (columns::CUSTOMER_ID, Value::from("B")),
                (columns::MONTH, Value::from("February")),
                (columns::OCCUPATION, Value::from("Doctor")),
                (columns::TYPE_OF_LOAN, Value::from("Home Loan")),
            ],
        ])
    }

    #[test]
    fn new_session_has_wildcard_filters() {
        let session = Session::new(&DashboardConfig::default());
        assert_eq!(session.filters.len(), 3);
        assert!(session.filters.values().all(|s| *s == Selection::All));
        assert_eq!(session.page, Page::Kpis);
    }

    #[test]
    fn run_filters_then_reports() {
        let ds = sample();
        let config = DashboardConfig::default();
        let mut session = Session::new(&config);
        session
            .filters
            .insert(columns::OCCUPATION.into(), Selection::from_label("Doctor"));

        let out = run(&ds, &session, &config).unwrap();
        assert_eq!(out.visible_records, 1);
        let PageReport::Kpis(kpi) = out.report else {
            panic!("expected KPI report");
        };
        assert_eq!(kpi.total_customers, 1);
    }

    #[test]
    fn empty_selection_still_reports() {
        let ds = sample();
        let config = DashboardConfig::default();
        let mut session = Session::new(&config);
        session.page = Page::Monthly;
        session
            .filters
            .insert(columns::MONTH.into(), Selection::from_label("January"));
        session
            .filters
            .insert(columns::OCCUPATION.into(), Selection::from_label("Doctor"));

        let out = run(&ds, &session, &config).unwrap();
        assert_eq!(out.visible_records, 0);
        let PageReport::Monthly(monthly) = out.report else {
            panic!("expected monthly report");
        };
        assert_eq!(monthly.avg_balance.len(), 8);
    }

    #[test]
    fn bad_filter_value_is_reported() {
        let ds = sample();
        let config = DashboardConfig::default();
        let mut session = Session::new(&config);
        session
            .filters
            .insert(columns::MONTH.into(), Selection::from_label("Smarch"));
        assert!(matches!(
            run(&ds, &session, &config),
            Err(ConfigurationError::UnknownValue { .. })
        ));
    }
}
