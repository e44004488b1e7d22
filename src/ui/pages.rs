use eframe::egui::{self, RichText, ScrollArea, Ui};

use super::format;
use super::plot::{self, Series};
use crate::analytics::aggregate::Bucket;
use crate::analytics::pages::{
    CreditReport, DemographicsReport, KpiReport, MonthlyReport, PageReport,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Bucket → chart series
// ---------------------------------------------------------------------------

fn counts(buckets: &[Bucket<usize>]) -> Series {
    buckets
        .iter()
        .map(|b| (b.key.to_string(), Some(b.value as f64)))
        .collect()
}

fn means(buckets: &[Bucket<Option<f64>>]) -> Series {
    buckets
        .iter()
        .map(|b| (b.key.to_string(), b.value))
        .collect()
}

fn shares(buckets: &[Bucket<usize>]) -> Vec<(String, f64)> {
    buckets
        .iter()
        .map(|b| (b.key.to_string(), b.value as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the current page in the central panel.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(output) = &state.output else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a customer dataset to begin  (File → Open…)");
        });
        return;
    };

    ui.heading(state.session.page.title());
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match &output.report {
            PageReport::Kpis(kpi) => kpi_page(ui, kpi),
            PageReport::Demographics(report) => demographics_page(ui, report),
            PageReport::Monthly(report) => monthly_page(ui, report),
            PageReport::Credit(report) => credit_page(ui, report),
            PageReport::Correlation(matrix) => plot::heatmap(ui, matrix),
        });
}

fn tile(ui: &mut Ui, label: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(180.0);
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).heading().strong());
    });
}

fn kpi_page(ui: &mut Ui, kpi: &KpiReport) {
    let tiles = [
        ("Total Customers", format::thousands(kpi.total_customers as f64, 0)),
        ("Total Months", kpi.total_months.to_string()),
        ("Avg Bank Accounts", format::number(kpi.avg_bank_accounts, 0)),
        ("Avg Age", format::number(kpi.avg_age, 0)),
        (
            "Common Age Category",
            kpi.common_age_category
                .as_ref()
                .map_or_else(|| format::NOT_AVAILABLE.to_string(), |v| v.to_string()),
        ),
        ("Avg Annual Income", format::money(kpi.avg_annual_income, 0)),
        ("% On-Time Payments", format::percent(kpi.on_time_payment_pct)),
        (
            "Avg Credit History",
            kpi.avg_credit_history_months
                .map_or_else(|| format::NOT_AVAILABLE.to_string(), |m| format!("{m:.0} months")),
        ),
        ("Total Loans (Unique)", format::thousands(kpi.total_loans, 0)),
        ("Avg EMI", format::money(kpi.avg_emi, 2)),
        ("Max Outstanding Debt", format::money(kpi.max_outstanding_debt, 0)),
        ("Avg Interest Rate", format::percent(kpi.avg_interest_rate)),
        ("Avg Delayed Payments", format::number(kpi.avg_delayed_payments, 0)),
        ("Max Loans by 1 Customer", format::number(kpi.max_loans_by_customer, 0)),
    ];

    egui::Grid::new("kpi_tiles")
        .spacing([12.0, 12.0])
        .show(ui, |ui: &mut Ui| {
            for (i, (label, value)) in tiles.into_iter().enumerate() {
                tile(ui, label, value);
                if i % 4 == 3 {
                    ui.end_row();
                }
            }
        });
}

fn demographics_page(ui: &mut Ui, report: &DemographicsReport) {
    plot::bar_chart(
        ui,
        "age_category",
        "Total Customers by Age Category",
        &counts(&report.customers_by_age_category),
    );
    ui.add_space(12.0);
    plot::line_chart(
        ui,
        "credit_score",
        "Total Unique Customers by Credit Score",
        &counts(&report.customers_by_credit_score),
        0,
    );
    ui.add_space(12.0);
    plot::share_chart(
        ui,
        "Count of Customers by Category",
        &shares(&report.customers_by_category),
    );
    ui.add_space(12.0);
    let top: Series = report
        .top_customers_by_income
        .iter()
        .map(|b| (b.key.to_string(), Some(b.value)))
        .collect();
    plot::bar_chart(
        ui,
        "top_income",
        &format!("Top {} Customers by Max Annual Income", top.len()),
        &top,
    );
}

fn monthly_page(ui: &mut Ui, report: &MonthlyReport) {
    plot::line_chart(
        ui,
        "avg_balance",
        "Average Monthly Balance",
        &means(&report.avg_balance),
        1,
    );
    ui.add_space(12.0);
    plot::bar_chart(
        ui,
        "avg_investment",
        "Average Monthly Investment",
        &means(&report.avg_investment),
    );
    ui.add_space(12.0);
    plot::line_chart(
        ui,
        "avg_utilization",
        "Average Credit Utilization Ratio",
        &means(&report.avg_credit_utilization),
        3,
    );
    ui.add_space(12.0);
    plot::line_chart(
        ui,
        "avg_delays",
        "Average Delayed Payments",
        &means(&report.avg_delayed_payments),
        2,
    );
}

fn credit_page(ui: &mut Ui, report: &CreditReport) {
    plot::bar_chart(
        ui,
        "loan_count",
        "Total Customers by Num of Loan",
        &counts(&report.records_by_loan_count),
    );
    ui.add_space(12.0);
    plot::share_chart(
        ui,
        "Total Customers by Credit Mix",
        &shares(&report.customers_by_credit_mix),
    );
    ui.add_space(12.0);
    plot::line_chart(
        ui,
        "history_by_age",
        "Avg Credit History Months by Age Category",
        &means(&report.credit_history_by_age_category),
        0,
    );
    ui.add_space(12.0);
    plot::share_chart(
        ui,
        "Total Customers by Payment Value",
        &shares(&report.customers_by_payment_value),
    );
}
