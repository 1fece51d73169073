use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// A whole-number percentage as supplied by ready-property callers (25 = 25%).
///
/// Off-plan inputs use fractional [`Rate`]s instead. Keeping the two unit
/// conventions in distinct types means a caller cannot hand a whole-number
/// percentage to a calculator expecting a fraction, or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(pub Decimal);

impl Percent {
    pub const ZERO: Percent = Percent(Decimal::ZERO);

    /// The equivalent fractional rate: `Percent(25).fraction() == 0.25`.
    pub fn fraction(self) -> Rate {
        self.0 / dec!(100)
    }

    pub fn from_fraction(rate: Rate) -> Self {
        Percent(rate * dec!(100))
    }
}

/// An ordered series of periodic cash flows. Index is the period number;
/// period 0 holds the (negative) initial investment. Non-empty by
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CashFlowSeries {
    flows: Vec<Money>,
}

impl CashFlowSeries {
    pub fn new(initial: Money) -> Self {
        CashFlowSeries {
            flows: vec![initial],
        }
    }

    pub fn push(&mut self, flow: Money) {
        self.flows.push(flow);
    }

    /// Every flow, period 0 first.
    pub fn flows(&self) -> &[Money] {
        &self.flows
    }

    /// The period-0 flow (the initial investment).
    pub fn initial(&self) -> Money {
        self.flows[0]
    }

    /// Flows from period 1 onwards, in the shape `npv` expects.
    pub fn future_flows(&self) -> &[Money] {
        &self.flows[1..]
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

/// Developer payment plan for an off-plan purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    /// Amount due at booking
    pub down_payment: Money,
    /// Amount of each construction-period installment
    pub installment_amount: Money,
    /// Number of installments until handover
    pub installment_count: u32,
    /// Months between installments
    pub frequency_months: u32,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_to_fraction() {
        assert_eq!(Percent(dec!(25)).fraction(), dec!(0.25));
        assert_eq!(Percent(dec!(4)).fraction(), dec!(0.04));
        assert_eq!(Percent::from_fraction(dec!(0.40)), Percent(dec!(40.00)));
    }

    #[test]
    fn series_is_period_zero_first() {
        let mut series = CashFlowSeries::new(dec!(-1000));
        series.push(dec!(250));
        series.push(dec!(250));

        assert_eq!(series.initial(), dec!(-1000));
        assert_eq!(series.future_flows(), &[dec!(250), dec!(250)]);
        assert_eq!(series.len(), 3);
    }
}
