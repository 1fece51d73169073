//! Calculator service facade.
//!
//! The single entry point collaborators call. Raw requests arrive with
//! `f64` fields the way the web and chat layers deliver JSON; everything is
//! converted through the decimal foundation before any calculation, and the
//! two percentage unit conventions (whole numbers for ready property,
//! fractions for off-plan) are normalised here and nowhere else.

use serde::{Deserialize, Serialize};

use crate::calculators::{
    continuation, DefaultOffplanCalculator, DefaultReadyPropertyCalculator,
    MortgageContinuationInputs, OffplanCalculator, OffplanInputs, OffplanResult,
    ReadyPropertyCalculator, ReadyPropertyInputs, ReadyPropertyResult, ScenarioComparison,
};
use crate::numeric::decimal_from_f64;
use crate::types::{ComputationOutput, Percent};
use crate::PropInvestResult;

/// Ready-property request. Percentage fields are whole numbers (25 = 25%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyPropertyRequest {
    pub unit_area: f64,
    pub total_price: f64,
    pub down_payment_percent: f64,
    pub registration_fee_percent: f64,
    /// Defaults to 2 when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_commission_percent: Option<f64>,
    pub loan_tenure_years: u32,
    pub annual_discount_rate_percent: f64,
    pub annual_rental_yield_percent: f64,
    pub service_charge_per_area: f64,
    pub expected_exit_value: f64,
}

/// Off-plan request. Percentage fields are fractions (0.10 = 10%) — the
/// opposite convention from [`ReadyPropertyRequest`], inherited from the
/// original model and kept loud on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffplanRequest {
    pub unit_area: f64,
    pub total_price: f64,
    pub down_payment_fraction: f64,
    pub installment_fraction: f64,
    pub payment_frequency_months: u32,
    pub construction_years: u32,
    pub future_price_per_area: f64,
    pub annual_discount_rate_fraction: f64,
    /// Defaults to 0.04 when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_fee_fraction: Option<f64>,
}

/// Post-handover continuation request. Whole-number percentages, matching
/// the ready-property convention it feeds into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageContinuationRequest {
    pub mortgage_tenure_years: u32,
    pub annual_rental_yield_percent: f64,
    pub service_charge_per_area: f64,
    pub expected_exit_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_discount_rate_percent: Option<f64>,
}

const DEFAULT_AGENT_COMMISSION_PERCENT: f64 = 2.0;
const DEFAULT_REGISTRATION_FEE_FRACTION: f64 = 0.04;

/// Facade over the calculators. The calculator implementations can be
/// substituted for testing; in production the defaults are always used.
pub struct CalculatorService {
    ready: Box<dyn ReadyPropertyCalculator>,
    offplan: Box<dyn OffplanCalculator>,
}

impl Default for CalculatorService {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorService {
    pub fn new() -> Self {
        CalculatorService {
            ready: Box::new(DefaultReadyPropertyCalculator),
            offplan: Box::new(DefaultOffplanCalculator),
        }
    }

    /// Substitute calculator implementations. Testing seam only.
    pub fn with_calculators(
        ready: Box<dyn ReadyPropertyCalculator>,
        offplan: Box<dyn OffplanCalculator>,
    ) -> Self {
        CalculatorService { ready, offplan }
    }

    /// Analyse a mortgage-financed ready property.
    pub fn calculate_ready_property_investment(
        &self,
        request: &ReadyPropertyRequest,
    ) -> PropInvestResult<ComputationOutput<ReadyPropertyResult>> {
        let inputs = convert_ready_request(request)?;
        self.ready.calculate(&inputs)
    }

    /// Analyse an off-plan purchase up to handover.
    pub fn calculate_offplan_investment(
        &self,
        request: &OffplanRequest,
    ) -> PropInvestResult<ComputationOutput<OffplanResult>> {
        let inputs = convert_offplan_request(request)?;
        self.offplan.calculate(&inputs)
    }

    /// Compare exiting at handover with continuing under a mortgage.
    pub fn calculate_mortgage_continuation(
        &self,
        offplan_result: &OffplanResult,
        request: &MortgageContinuationRequest,
    ) -> PropInvestResult<ComputationOutput<ScenarioComparison>> {
        let inputs = convert_continuation_request(request)?;
        continuation::compare(offplan_result, &inputs, self.ready.as_ref())
    }
}

fn convert_ready_request(request: &ReadyPropertyRequest) -> PropInvestResult<ReadyPropertyInputs> {
    Ok(ReadyPropertyInputs {
        unit_area: decimal_from_f64("unit_area", request.unit_area)?,
        total_price: decimal_from_f64("total_price", request.total_price)?,
        down_payment_percent: Percent(decimal_from_f64(
            "down_payment_percent",
            request.down_payment_percent,
        )?),
        registration_fee_percent: Percent(decimal_from_f64(
            "registration_fee_percent",
            request.registration_fee_percent,
        )?),
        agent_commission_percent: Percent(decimal_from_f64(
            "agent_commission_percent",
            request
                .agent_commission_percent
                .unwrap_or(DEFAULT_AGENT_COMMISSION_PERCENT),
        )?),
        loan_tenure_years: request.loan_tenure_years,
        annual_discount_rate: Percent(decimal_from_f64(
            "annual_discount_rate_percent",
            request.annual_discount_rate_percent,
        )?),
        annual_rental_yield: Percent(decimal_from_f64(
            "annual_rental_yield_percent",
            request.annual_rental_yield_percent,
        )?),
        service_charge_per_area: decimal_from_f64(
            "service_charge_per_area",
            request.service_charge_per_area,
        )?,
        expected_exit_value: decimal_from_f64(
            "expected_exit_value",
            request.expected_exit_value,
        )?,
    })
}

fn convert_offplan_request(request: &OffplanRequest) -> PropInvestResult<OffplanInputs> {
    Ok(OffplanInputs {
        unit_area: decimal_from_f64("unit_area", request.unit_area)?,
        total_price: decimal_from_f64("total_price", request.total_price)?,
        down_payment_rate: decimal_from_f64(
            "down_payment_fraction",
            request.down_payment_fraction,
        )?,
        installment_rate: decimal_from_f64(
            "installment_fraction",
            request.installment_fraction,
        )?,
        payment_frequency_months: request.payment_frequency_months,
        construction_years: request.construction_years,
        future_price_per_area: decimal_from_f64(
            "future_price_per_area",
            request.future_price_per_area,
        )?,
        annual_discount_rate: decimal_from_f64(
            "annual_discount_rate_fraction",
            request.annual_discount_rate_fraction,
        )?,
        registration_fee_rate: decimal_from_f64(
            "registration_fee_fraction",
            request
                .registration_fee_fraction
                .unwrap_or(DEFAULT_REGISTRATION_FEE_FRACTION),
        )?,
    })
}

fn convert_continuation_request(
    request: &MortgageContinuationRequest,
) -> PropInvestResult<MortgageContinuationInputs> {
    let discount_rate_override = match request.annual_discount_rate_percent {
        Some(pct) => Some(Percent(decimal_from_f64(
            "annual_discount_rate_percent",
            pct,
        )?)),
        None => None,
    };

    Ok(MortgageContinuationInputs {
        mortgage_tenure_years: request.mortgage_tenure_years,
        annual_rental_yield: Percent(decimal_from_f64(
            "annual_rental_yield_percent",
            request.annual_rental_yield_percent,
        )?),
        service_charge_per_area: decimal_from_f64(
            "service_charge_per_area",
            request.service_charge_per_area,
        )?,
        expected_exit_value: decimal_from_f64(
            "expected_exit_value",
            request.expected_exit_value,
        )?,
        discount_rate_override,
    })
}
