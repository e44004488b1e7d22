//! Writes a synthetic `Banking Data Set - Marketing.csv` for local runs.
//!
//! Usage: `generate_sample [OUTPUT] [CUSTOMERS]`

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const MONTHS: [&str; 8] = [
    "January", "February", "March", "April", "May", "June", "July", "August",
];

const OCCUPATIONS: [&str; 15] = [
    "Accountant",
    "Architect",
    "Developer",
    "Doctor",
    "Engineer",
    "Entrepreneur",
    "Journalist",
    "Lawyer",
    "Manager",
    "Mechanic",
    "Media_Manager",
    "Musician",
    "Scientist",
    "Teacher",
    "Writer",
];

const LOAN_TYPES: [&str; 6] = [
    "Auto Loan",
    "Credit-Builder Loan",
    "Personal Loan",
    "Home Equity Loan",
    "Mortgage Loan",
    "Student Loan",
];

const CREDIT_MIX: [&str; 3] = ["Bad", "Standard", "Good"];
const CREDIT_SCORE: [&str; 3] = ["Poor", "Standard", "Good"];

#[derive(Serialize)]
struct Row {
    #[serde(rename = "Customer_ID")]
    customer_id: String,
    #[serde(rename = "Month")]
    month: &'static str,
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Age_Category")]
    age_category: &'static str,
    #[serde(rename = "Occupation")]
    occupation: &'static str,
    #[serde(rename = "Annual_Income")]
    annual_income: f64,
    #[serde(rename = "Income_Category")]
    income_category: &'static str,
    #[serde(rename = "Num_Bank_Accounts")]
    num_bank_accounts: u32,
    #[serde(rename = "Num_of_Loan")]
    num_of_loan: i32,
    #[serde(rename = "Type_of_Loan")]
    type_of_loan: &'static str,
    #[serde(rename = "Interest_Rate")]
    interest_rate: f64,
    #[serde(rename = "Delay_from_due_date")]
    delay_from_due_date: i32,
    #[serde(rename = "Num_of_Delayed_Payment")]
    num_of_delayed_payment: Option<u32>,
    #[serde(rename = "Outstanding_Debt")]
    outstanding_debt: f64,
    #[serde(rename = "Credit_Utilization_Ratio")]
    credit_utilization_ratio: f64,
    #[serde(rename = "Credit_History_Age_Months")]
    credit_history_age_months: Option<u32>,
    #[serde(rename = "Total_EMI_per_month")]
    total_emi_per_month: f64,
    #[serde(rename = "Amount_invested_monthly")]
    amount_invested_monthly: Option<f64>,
    #[serde(rename = "Monthly_Balance")]
    monthly_balance: f64,
    #[serde(rename = "Credit_Mix")]
    credit_mix: &'static str,
    #[serde(rename = "Credit_Score")]
    credit_score: &'static str,
    #[serde(rename = "Customer_Category")]
    customer_category: &'static str,
    #[serde(rename = "Payment_Value")]
    payment_value: &'static str,
    #[serde(rename = "Spending_Level")]
    spending_level: &'static str,
}

fn age_category(age: u32) -> &'static str {
    match age {
        0..=24 => "Young Adults",
        25..=39 => "Adults",
        40..=54 => "Middle-Aged",
        _ => "Seniors",
    }
}

fn income_category(income: f64) -> &'static str {
    if income < 30_000.0 {
        "Low Income"
    } else if income < 80_000.0 {
        "Middle Income"
    } else {
        "High Income"
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

struct Profile {
    age: u32,
    occupation: &'static str,
    annual_income: f64,
    num_bank_accounts: u32,
    num_of_loan: i32,
    type_of_loan: &'static str,
    credit_mix: usize,
    history_start: u32,
}

impl Profile {
    fn random(rng: &mut StdRng) -> Self {
        let num_of_loan = rng.gen_range(0..=9);
        let type_of_loan = if num_of_loan == 0 {
            "No Loan"
        } else {
            LOAN_TYPES.choose(rng).copied().unwrap_or("Personal Loan")
        };
        Self {
            age: rng.gen_range(18..=65),
            occupation: OCCUPATIONS.choose(rng).copied().unwrap_or("Engineer"),
            annual_income: round2(rng.gen_range(8_000.0..180_000.0)),
            num_bank_accounts: rng.gen_range(0..=10),
            num_of_loan,
            type_of_loan,
            credit_mix: rng.gen_range(0..CREDIT_MIX.len()),
            history_start: rng.gen_range(12..=400),
        }
    }
}

fn row(rng: &mut StdRng, id: usize, p: &Profile, month_idx: usize) -> Row {
    // A small share of dirty values exercises the cleaning rules.
    let interest_rate = if rng.gen_bool(0.03) {
        rng.gen_range(35.0..5_000.0_f64).round()
    } else {
        rng.gen_range(1.0..=34.0_f64).round()
    };
    let num_of_loan = if rng.gen_bool(0.02) {
        *[-100, 12, 250].choose(rng).unwrap_or(&-100)
    } else {
        p.num_of_loan
    };
    let delay = rng.gen_range(-5..=60);
    let emi = round2(p.annual_income / 12.0 * rng.gen_range(0.0..0.2));
    let invested = round2(p.annual_income / 12.0 * rng.gen_range(0.02..0.25));
    let balance = round2(p.annual_income / 12.0 - emi - invested).max(0.0);

    Row {
        customer_id: format!("CUS_{:04x}", 0x1000 + id),
        month: MONTHS[month_idx],
        age: p.age,
        age_category: age_category(p.age),
        occupation: p.occupation,
        annual_income: p.annual_income,
        income_category: income_category(p.annual_income),
        num_bank_accounts: p.num_bank_accounts,
        num_of_loan,
        type_of_loan: p.type_of_loan,
        interest_rate,
        delay_from_due_date: delay,
        num_of_delayed_payment: (!rng.gen_bool(0.05)).then(|| rng.gen_range(0..=25)),
        outstanding_debt: round2(rng.gen_range(0.0..5_000.0)),
        credit_utilization_ratio: round2(rng.gen_range(20.0..50.0)),
        credit_history_age_months: (!rng.gen_bool(0.05)).then(|| p.history_start + month_idx as u32),
        total_emi_per_month: emi,
        amount_invested_monthly: (!rng.gen_bool(0.04)).then_some(invested),
        monthly_balance: balance,
        credit_mix: CREDIT_MIX[p.credit_mix],
        credit_score: CREDIT_SCORE.choose(rng).copied().unwrap_or("Standard"),
        customer_category: if p.annual_income >= 80_000.0 { "Premium" } else { "Regular" },
        payment_value: if delay <= 0 { "On-Time" } else { "Delayed" },
        spending_level: if invested > emi { "Low Spender" } else { "High Spender" },
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let out_path = args
        .next()
        .unwrap_or_else(|| "Banking Data Set - Marketing.csv".to_string());
    let customers: usize = match args.next() {
        Some(n) => n.parse().context("CUSTOMERS must be a positive integer")?,
        None => 500,
    };

    let mut rng = StdRng::seed_from_u64(42);
    let mut writer = csv::Writer::from_path(&out_path)
        .with_context(|| format!("creating {out_path}"))?;

    let mut rows = 0usize;
    for id in 0..customers {
        let profile = Profile::random(&mut rng);
        for month_idx in 0..MONTHS.len() {
            writer.serialize(row(&mut rng, id, &profile, month_idx))?;
            rows += 1;
        }
    }
    writer.flush()?;

    println!("Wrote {rows} rows ({customers} customers) to {out_path}");
    Ok(())
}
