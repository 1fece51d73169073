//! Investment calculators: mortgage-financed ready property, developer-
//! installment off-plan, and the handover continuation comparator.

pub mod continuation;
pub mod offplan;
pub mod ready_property;

use crate::types::ComputationOutput;
use crate::PropInvestResult;

pub use continuation::{
    ComparisonDeltas, DecisionStrength, ExitSnapshot, MortgageContinuationInputs, ScenarioAction,
    ScenarioComparison, ScenarioDecision,
};
pub use offplan::{OffplanInputs, OffplanResult};
pub use ready_property::{ReadyPropertyInputs, ReadyPropertyResult};

/// Seam for substituting the ready-property model in tests.
pub trait ReadyPropertyCalculator: Send + Sync {
    fn calculate(
        &self,
        inputs: &ReadyPropertyInputs,
    ) -> PropInvestResult<ComputationOutput<ReadyPropertyResult>>;
}

/// Seam for substituting the off-plan model in tests.
pub trait OffplanCalculator: Send + Sync {
    fn calculate(&self, inputs: &OffplanInputs)
        -> PropInvestResult<ComputationOutput<OffplanResult>>;
}

/// Production ready-property model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReadyPropertyCalculator;

impl ReadyPropertyCalculator for DefaultReadyPropertyCalculator {
    fn calculate(
        &self,
        inputs: &ReadyPropertyInputs,
    ) -> PropInvestResult<ComputationOutput<ReadyPropertyResult>> {
        ready_property::evaluate(inputs)
    }
}

/// Production off-plan model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOffplanCalculator;

impl OffplanCalculator for DefaultOffplanCalculator {
    fn calculate(
        &self,
        inputs: &OffplanInputs,
    ) -> PropInvestResult<ComputationOutput<OffplanResult>> {
        offplan::evaluate(inputs)
    }
}
