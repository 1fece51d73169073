//! Threshold classifier turning headline metrics into a buy/don't-buy
//! verdict with per-metric reasoning.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Investment verdict, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    StrongBuy,
    Buy,
    Marginal,
    DontBuy,
}

/// Classifier output: verdict, one reasoning line per metric, and a
/// one-sentence summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub verdict: Verdict,
    pub reasons: Vec<String>,
    pub summary: String,
}

/// The metrics the classifier consumes. `dscr` is `None` for off-plan
/// deals, which carry no mortgage debt before handover.
#[derive(Debug, Clone, Copy)]
pub struct MetricSnapshot {
    pub npv: Money,
    pub irr: Rate,
    pub roic: Decimal,
    pub dscr: Option<Decimal>,
}

/// Fixed threshold table for one calculator kind.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdProfile {
    pub strong_buy_irr: Rate,
    pub strong_buy_roic: Decimal,
    /// DSCR floor for STRONG_BUY; profiles without a debt term leave this unset.
    pub strong_buy_dscr: Option<Decimal>,
    pub buy_irr: Rate,
    pub buy_roic: Decimal,
}

/// Mortgage-financed ready property.
pub const READY_PROPERTY_PROFILE: ThresholdProfile = ThresholdProfile {
    strong_buy_irr: dec!(0.08),
    strong_buy_roic: dec!(0.15),
    strong_buy_dscr: Some(dec!(1.25)),
    buy_irr: dec!(0.05),
    buy_roic: dec!(0.10),
};

/// Off-plan purchase. Higher bars reflect construction risk; no DSCR term.
pub const OFFPLAN_PROFILE: ThresholdProfile = ThresholdProfile {
    strong_buy_irr: dec!(0.12),
    strong_buy_roic: dec!(0.25),
    strong_buy_dscr: None,
    buy_irr: dec!(0.08),
    buy_roic: dec!(0.15),
};

/// Classify a metric snapshot against a threshold profile.
pub fn recommend(metrics: &MetricSnapshot, profile: &ThresholdProfile) -> Recommendation {
    let npv_positive = metrics.npv > Decimal::ZERO;

    let dscr_clears_strong = match profile.strong_buy_dscr {
        Some(floor) => matches!(metrics.dscr, Some(d) if d > floor),
        None => true,
    };

    let verdict = if npv_positive
        && metrics.irr > profile.strong_buy_irr
        && metrics.roic > profile.strong_buy_roic
        && dscr_clears_strong
    {
        Verdict::StrongBuy
    } else if npv_positive && metrics.irr > profile.buy_irr && metrics.roic > profile.buy_roic {
        Verdict::Buy
    } else if npv_positive {
        Verdict::Marginal
    } else {
        Verdict::DontBuy
    };

    Recommendation {
        verdict,
        reasons: build_reasons(metrics, profile),
        summary: summary_for(verdict),
    }
}

fn build_reasons(metrics: &MetricSnapshot, profile: &ThresholdProfile) -> Vec<String> {
    let mut reasons = Vec::with_capacity(4);

    if metrics.npv > Decimal::ZERO {
        reasons.push(format!(
            "NPV of {:.2} is positive: the deal creates value at the chosen discount rate",
            metrics.npv
        ));
    } else {
        reasons.push(format!(
            "NPV of {:.2} is not positive: discounted cash flows do not recover the capital",
            metrics.npv
        ));
    }

    let irr_pct = metrics.irr * dec!(100);
    if metrics.irr > profile.strong_buy_irr {
        reasons.push(format!(
            "IRR of {irr_pct:.2}% clears the {:.0}% strong-buy hurdle",
            profile.strong_buy_irr * dec!(100)
        ));
    } else if metrics.irr > profile.buy_irr {
        reasons.push(format!(
            "IRR of {irr_pct:.2}% clears the {:.0}% buy hurdle",
            profile.buy_irr * dec!(100)
        ));
    } else {
        reasons.push(format!(
            "IRR of {irr_pct:.2}% is below the {:.0}% buy hurdle",
            profile.buy_irr * dec!(100)
        ));
    }

    let roic_pct = metrics.roic * dec!(100);
    if metrics.roic > profile.strong_buy_roic {
        reasons.push(format!(
            "ROIC of {roic_pct:.2}% exceeds the {:.0}% strong-buy threshold",
            profile.strong_buy_roic * dec!(100)
        ));
    } else if metrics.roic > profile.buy_roic {
        reasons.push(format!(
            "ROIC of {roic_pct:.2}% exceeds the {:.0}% buy threshold",
            profile.buy_roic * dec!(100)
        ));
    } else {
        reasons.push(format!(
            "ROIC of {roic_pct:.2}% is below the {:.0}% buy threshold",
            profile.buy_roic * dec!(100)
        ));
    }

    if let Some(floor) = profile.strong_buy_dscr {
        match metrics.dscr {
            Some(d) if d > floor => reasons.push(format!(
                "DSCR of {d:.2}x covers debt service above the {floor}x floor"
            )),
            Some(d) => reasons.push(format!(
                "DSCR of {d:.2}x is below the {floor}x floor lenders expect"
            )),
            None => reasons.push("No debt service to cover; DSCR reads as zero".into()),
        }
    }

    reasons
}

fn summary_for(verdict: Verdict) -> String {
    match verdict {
        Verdict::StrongBuy => {
            "Strong buy: every return and coverage threshold is cleared with room to spare.".into()
        }
        Verdict::Buy => "Buy: the deal is value-accretive with acceptable returns.".into(),
        Verdict::Marginal => {
            "Marginal: the deal barely adds value; returns are thin for the risk.".into()
        }
        Verdict::DontBuy => "Don't buy: the deal destroys value at this discount rate.".into(),
    }
}
