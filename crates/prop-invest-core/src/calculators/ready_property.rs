//! Mortgage-financed ("ready") property model.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropInvestError;
use crate::recommendation::{recommend, MetricSnapshot, Recommendation, READY_PROPERTY_PROFILE};
use crate::time_value::{self, SolverOutcome};
use crate::types::{with_metadata, CashFlowSeries, ComputationOutput, Money, Percent, Rate};
use crate::PropInvestResult;

/// Cash flows are projected annually; EMI is paid monthly.
const MONTHS_PER_YEAR: u32 = 12;

/// The DCF horizon is fixed at 20 years of rental cash flow regardless of
/// the loan tenure. Inherited from the reference model; every other figure
/// uses the actual tenure.
const DCF_HORIZON_YEARS: usize = 20;

fn default_agent_commission() -> Percent {
    Percent(dec!(2))
}

/// Inputs for a mortgage-financed acquisition.
///
/// Percentage fields are whole-number [`Percent`]s (25 = 25%); the off-plan
/// calculator uses fractional rates instead, and the two input shapes are
/// deliberately not interchangeable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyPropertyInputs {
    /// Unit area in square feet
    pub unit_area: Decimal,
    /// Total purchase price
    pub total_price: Money,
    /// Down payment (25 = 25%)
    pub down_payment_percent: Percent,
    /// Land-registry fee (typically 4)
    pub registration_fee_percent: Percent,
    /// Agent commission; defaults to 2 when omitted
    #[serde(default = "default_agent_commission")]
    pub agent_commission_percent: Percent,
    /// Mortgage tenure in years
    pub loan_tenure_years: u32,
    /// Annual discount rate, also used as the mortgage rate (4 = 4%)
    pub annual_discount_rate: Percent,
    /// Gross rental yield on price (6 = 6%)
    pub annual_rental_yield: Percent,
    /// Annual service charge per unit area
    pub service_charge_per_area: Money,
    /// Expected nominal sale value at end of tenure
    pub expected_exit_value: Money,
}

/// Full result bundle: acquisition costs, financing, income, headline
/// metrics, the cash-flow timeline, and the recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyPropertyResult {
    // --- Acquisition ---
    pub price_per_area: Money,
    pub down_payment_amount: Money,
    pub registration_fee_amount: Money,
    pub agent_commission_amount: Money,
    pub invested_capital: Money,
    pub financing_amount: Money,

    // --- Debt service ---
    pub monthly_emi: Money,
    pub annual_debt_service: Money,

    // --- Income ---
    pub annual_rental_income: Money,
    pub annual_service_charges: Money,
    pub net_operating_income: Money,
    pub net_annual_cash_flow: Money,

    // --- Metrics ---
    pub terminal_value_pv: Money,
    pub dcf: Money,
    pub npv: Money,
    pub irr: SolverOutcome,
    pub roic: Decimal,
    pub dscr: Decimal,

    /// Nominal timeline for visualization: period 0 is the invested
    /// capital, the final period includes the undiscounted exit value.
    pub cash_flows: CashFlowSeries,

    pub recommendation: Recommendation,
}

/// Evaluate a ready-property investment.
pub fn evaluate(
    inputs: &ReadyPropertyInputs,
) -> PropInvestResult<ComputationOutput<ReadyPropertyResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if inputs.loan_tenure_years == 0 {
        return Err(PropInvestError::InvalidInput {
            field: "loan_tenure_years".into(),
            reason: "Loan tenure must be at least 1 year".into(),
        });
    }

    let price = inputs.total_price;
    let discount_rate: Rate = inputs.annual_discount_rate.fraction();

    // --- Acquisition costs ---
    let down_payment_amount = price * inputs.down_payment_percent.fraction();
    let registration_fee_amount = price * inputs.registration_fee_percent.fraction();
    let agent_commission_amount = price * inputs.agent_commission_percent.fraction();
    let invested_capital = down_payment_amount + registration_fee_amount + agent_commission_amount;
    let financing_amount = price * (Decimal::ONE - inputs.down_payment_percent.fraction());

    let price_per_area = if inputs.unit_area.is_zero() {
        Decimal::ZERO
    } else {
        price / inputs.unit_area
    };

    // --- Debt service ---
    let monthly_rate = discount_rate / Decimal::from(MONTHS_PER_YEAR);
    let total_months = inputs.loan_tenure_years * MONTHS_PER_YEAR;
    let monthly_emi = time_value::pmt(monthly_rate, total_months, -financing_amount)?;
    let annual_debt_service = monthly_emi * Decimal::from(MONTHS_PER_YEAR);

    // --- Income ---
    let annual_rental_income = price * inputs.annual_rental_yield.fraction();
    let annual_service_charges = inputs.service_charge_per_area * inputs.unit_area;
    let net_operating_income = annual_rental_income - annual_service_charges;
    let net_annual_cash_flow = net_operating_income - annual_debt_service;

    if net_annual_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Net annual cash flow of {net_annual_cash_flow:.2} is negative — rent does not cover debt service and charges"
        ));
    }

    // --- Nominal timeline (actual tenure, exit value undiscounted) ---
    let mut cash_flows = CashFlowSeries::new(-invested_capital);
    for _ in 1..inputs.loan_tenure_years {
        cash_flows.push(net_annual_cash_flow);
    }
    cash_flows.push(net_annual_cash_flow + inputs.expected_exit_value);

    // --- Discounted metrics (fixed 20-year horizon) ---
    let terminal_value_pv = time_value::pv(
        inputs.expected_exit_value,
        discount_rate,
        inputs.loan_tenure_years,
    )?;

    let horizon_flows = vec![net_annual_cash_flow; DCF_HORIZON_YEARS];
    let dcf = time_value::npv(discount_rate, &horizon_flows)? + terminal_value_pv;
    let npv = dcf - invested_capital;

    let mut irr_series = Vec::with_capacity(DCF_HORIZON_YEARS + 2);
    irr_series.push(-invested_capital);
    irr_series.extend_from_slice(&horizon_flows);
    irr_series.push(terminal_value_pv);
    let irr = time_value::irr(&irr_series, None);

    if !irr.converged {
        warnings.push(format!(
            "IRR solve did not converge after {} iterations; {:.6} is the last estimate",
            irr.iterations, irr.value
        ));
    }

    let dscr = time_value::dscr(net_operating_income, annual_debt_service).unwrap_or(Decimal::ZERO);
    let roic = time_value::roic(dcf, invested_capital).unwrap_or(Decimal::ZERO);

    if dscr > Decimal::ZERO && dscr < dec!(1.2) {
        warnings.push(format!("DSCR of {dscr:.2}x is below 1.20x — lender covenant risk"));
    }

    let recommendation = recommend(
        &MetricSnapshot {
            npv,
            irr: irr.value,
            roic,
            dscr: Some(dscr),
        },
        &READY_PROPERTY_PROFILE,
    );

    let result = ReadyPropertyResult {
        price_per_area,
        down_payment_amount,
        registration_fee_amount,
        agent_commission_amount,
        invested_capital,
        financing_amount,
        monthly_emi,
        annual_debt_service,
        annual_rental_income,
        annual_service_charges,
        net_operating_income,
        net_annual_cash_flow,
        terminal_value_pv,
        dcf,
        npv,
        irr,
        roic,
        dscr,
        cash_flows,
        recommendation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Ready Property Investment Analysis (Mortgage-Financed DCF)",
        inputs,
        warnings,
        elapsed,
        result,
    ))
}
