//! Developer-installment ("off-plan") property model.
//!
//! The developer finances construction through an interest-free installment
//! plan; nothing is mortgaged until handover. Returns are measured on the
//! initial outlay (the down payment) only.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropInvestError;
use crate::recommendation::{recommend, MetricSnapshot, Recommendation, OFFPLAN_PROFILE};
use crate::time_value::{self, SolverOutcome};
use crate::types::{
    with_metadata, CashFlowSeries, ComputationOutput, Money, PaymentSchedule, Rate,
};
use crate::PropInvestResult;

const MONTHS_PER_YEAR: u32 = 12;

fn default_registration_fee() -> Rate {
    dec!(0.04)
}

/// Inputs for an off-plan purchase.
///
/// All rate fields are fractions (0.10 = 10%), unlike the whole-number
/// percentages of [`super::ReadyPropertyInputs`]; the distinct shapes keep
/// the two conventions from being interchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffplanInputs {
    /// Unit area in square feet
    pub unit_area: Decimal,
    /// Total purchase price
    pub total_price: Money,
    /// Down payment fraction at booking (0.10 = 10%)
    pub down_payment_rate: Rate,
    /// Fraction of price due per installment (0.05 = 5%)
    pub installment_rate: Rate,
    /// Months between installments
    pub payment_frequency_months: u32,
    /// Construction period in years
    pub construction_years: u32,
    /// Expected price per unit area at handover
    pub future_price_per_area: Money,
    /// Annual discount rate as a fraction (0.04 = 4%)
    pub annual_discount_rate: Rate,
    /// Land-registry fee fraction; informational, not part of the DCF
    #[serde(default = "default_registration_fee")]
    pub registration_fee_rate: Rate,
}

/// Full result bundle for an off-plan purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffplanResult {
    // --- Echoed deal shape (the continuation comparator re-prices from these) ---
    pub unit_area: Decimal,
    pub purchase_price: Money,
    pub annual_discount_rate: Rate,
    pub construction_years: u32,

    // --- Payment plan ---
    pub number_of_payments: u32,
    pub total_construction_percent: Rate,
    pub down_payment_amount: Money,
    pub total_payment_till_handover: Money,
    /// Interest-free developer financing between booking and handover
    pub shadow_financing: Money,
    pub annualized_installment: Money,
    pub payment_schedule: PaymentSchedule,
    /// Registry fee on the full price; informational, outside the DCF
    pub registration_fee_amount: Money,

    // --- Exit ---
    pub exit_value_nominal: Money,
    pub exit_value_discounted: Money,

    // --- Metrics (on the initial outlay only) ---
    pub invested_capital_today: Money,
    pub dcf: Money,
    pub npv: Money,
    pub irr: SolverOutcome,
    pub roic: Decimal,

    /// Timeline: period 0 is the down payment, then one annualized
    /// installment per construction year.
    pub cash_flows: CashFlowSeries,

    pub recommendation: Recommendation,
}

/// Evaluate an off-plan investment up to handover.
pub fn evaluate(inputs: &OffplanInputs) -> PropInvestResult<ComputationOutput<OffplanResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if inputs.payment_frequency_months == 0 {
        return Err(PropInvestError::InvalidInput {
            field: "payment_frequency_months".into(),
            reason: "Payment frequency must be at least 1 month".into(),
        });
    }
    if inputs.construction_years == 0 {
        return Err(PropInvestError::InvalidInput {
            field: "construction_years".into(),
            reason: "Construction period must be at least 1 year".into(),
        });
    }

    let price = inputs.total_price;
    let discount_rate = inputs.annual_discount_rate;

    // --- Payment plan ---
    let number_of_payments =
        inputs.construction_years * MONTHS_PER_YEAR / inputs.payment_frequency_months;
    let total_construction_percent = inputs.down_payment_rate
        + inputs.installment_rate * Decimal::from(number_of_payments);

    if total_construction_percent > Decimal::ONE {
        warnings.push(format!(
            "Payment plan collects {:.1}% of price before handover",
            total_construction_percent * dec!(100)
        ));
    }

    let down_payment_amount = price * inputs.down_payment_rate;
    let total_payment_till_handover = price * total_construction_percent;
    let shadow_financing = total_payment_till_handover - down_payment_amount;
    let annualized_installment = shadow_financing / Decimal::from(inputs.construction_years);

    let payment_schedule = PaymentSchedule {
        down_payment: down_payment_amount,
        installment_amount: price * inputs.installment_rate,
        installment_count: number_of_payments,
        frequency_months: inputs.payment_frequency_months,
    };

    let registration_fee_amount = price * inputs.registration_fee_rate;

    // --- Timeline ---
    let mut cash_flows = CashFlowSeries::new(-down_payment_amount);
    for _ in 0..inputs.construction_years {
        cash_flows.push(-annualized_installment);
    }

    // --- Exit at handover ---
    // The buyer resells their paid-in share of the unit at the handover price
    let exit_value_nominal =
        inputs.unit_area * inputs.future_price_per_area * total_construction_percent;
    let exit_value_discounted = time_value::pv(
        exit_value_nominal,
        discount_rate,
        inputs.construction_years,
    )?;

    // --- Metrics ---
    let dcf =
        time_value::npv(discount_rate, cash_flows.future_flows())? + exit_value_discounted;
    let npv = cash_flows.initial() + dcf;

    let mut irr_series = cash_flows.flows().to_vec();
    irr_series.push(exit_value_discounted);
    let irr = time_value::irr(&irr_series, None);

    if !irr.converged {
        warnings.push(format!(
            "IRR solve did not converge after {} iterations; {:.6} is the last estimate",
            irr.iterations, irr.value
        ));
    }

    // Installments already paid are deliberately excluded: ROIC here
    // measures return on the initial outlay.
    let invested_capital_today = down_payment_amount;
    let roic = time_value::roic(dcf, invested_capital_today).unwrap_or(Decimal::ZERO);

    let recommendation = recommend(
        &MetricSnapshot {
            npv,
            irr: irr.value,
            roic,
            dscr: None,
        },
        &OFFPLAN_PROFILE,
    );

    let result = OffplanResult {
        unit_area: inputs.unit_area,
        purchase_price: price,
        annual_discount_rate: discount_rate,
        construction_years: inputs.construction_years,
        number_of_payments,
        total_construction_percent,
        down_payment_amount,
        total_payment_till_handover,
        shadow_financing,
        annualized_installment,
        payment_schedule,
        registration_fee_amount,
        exit_value_nominal,
        exit_value_discounted,
        invested_capital_today,
        dcf,
        npv,
        irr,
        roic,
        cash_flows,
        recommendation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Off-Plan Investment Analysis (Developer Installment Plan)",
        inputs,
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_inputs() -> OffplanInputs {
        OffplanInputs {
            unit_area: dec!(850),
            total_price: dec!(850000),
            down_payment_rate: dec!(0.10),
            installment_rate: dec!(0.05),
            payment_frequency_months: 6,
            construction_years: 3,
            future_price_per_area: dec!(1200),
            annual_discount_rate: dec!(0.04),
            registration_fee_rate: dec!(0.04),
        }
    }

    #[test]
    fn payment_plan_breakdown() {
        let out = evaluate(&sample_inputs()).unwrap().result;

        assert_eq!(out.number_of_payments, 6);
        assert_eq!(out.total_construction_percent, dec!(0.40));
        assert_eq!(out.down_payment_amount, dec!(85000));
        assert_eq!(out.total_payment_till_handover, dec!(340000));
        assert_eq!(out.shadow_financing, dec!(255000));
        assert_eq!(out.annualized_installment, dec!(85000));

        assert_eq!(out.payment_schedule.down_payment, dec!(85000));
        assert_eq!(out.payment_schedule.installment_amount, dec!(42500));
        assert_eq!(out.payment_schedule.installment_count, 6);
        assert_eq!(out.payment_schedule.frequency_months, 6);
    }

    #[test]
    fn payment_count_floors() {
        // 36 months of construction at a 7-month cadence: 5 payments, not 5.14
        let mut inputs = sample_inputs();
        inputs.payment_frequency_months = 7;
        let out = evaluate(&inputs).unwrap().result;
        assert_eq!(out.number_of_payments, 5);

        inputs.payment_frequency_months = 11;
        let out = evaluate(&inputs).unwrap().result;
        assert_eq!(out.number_of_payments, 3);
    }

    #[test]
    fn timeline_shape() {
        let out = evaluate(&sample_inputs()).unwrap().result;

        assert_eq!(out.cash_flows.len(), 4);
        assert_eq!(out.cash_flows.initial(), dec!(-85000));
        for flow in out.cash_flows.future_flows() {
            assert_eq!(*flow, dec!(-85000));
        }
    }

    #[test]
    fn exit_value_is_paid_share_at_handover_price() {
        let out = evaluate(&sample_inputs()).unwrap().result;

        // 850 sqft × 1,200 × 40% paid-in share
        assert_eq!(out.exit_value_nominal, dec!(408000));
        assert!((out.exit_value_discounted - dec!(362710.51)).abs() < dec!(0.01));
    }

    #[test]
    fn roic_measures_initial_outlay_only() {
        let out = evaluate(&sample_inputs()).unwrap().result;

        assert_eq!(out.invested_capital_today, dec!(85000));
        // Not the 340,000 paid until handover
        assert_ne!(out.invested_capital_today, out.total_payment_till_handover);
    }

    #[test]
    fn registration_fee_is_informational() {
        let mut inputs = sample_inputs();
        let base = evaluate(&inputs).unwrap().result;

        inputs.registration_fee_rate = dec!(0.08);
        let doubled = evaluate(&inputs).unwrap().result;

        assert_eq!(doubled.registration_fee_amount, dec!(68000));
        // The DCF is untouched by the fee
        assert_eq!(base.dcf, doubled.dcf);
        assert_eq!(base.npv, doubled.npv);
    }

    #[test]
    fn zero_frequency_is_rejected() {
        let mut inputs = sample_inputs();
        inputs.payment_frequency_months = 0;
        assert!(evaluate(&inputs).is_err());
    }

    #[test]
    fn zero_construction_period_is_rejected() {
        let mut inputs = sample_inputs();
        inputs.construction_years = 0;
        assert!(evaluate(&inputs).is_err());
    }
}
