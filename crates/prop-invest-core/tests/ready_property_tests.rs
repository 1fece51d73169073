use prop_invest_core::calculators::ready_property::{evaluate, ReadyPropertyInputs};
use prop_invest_core::recommendation::Verdict;
use prop_invest_core::types::Percent;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Reference case: 850 sqft at 850,000 — 25% down, 4% registry, 25-year
// mortgage at the 4% discount rate, 6% gross yield, 10/sqft service charge,
// 1,020,000 expected exit.
// ===========================================================================

fn reference_inputs() -> ReadyPropertyInputs {
    ReadyPropertyInputs {
        unit_area: dec!(850),
        total_price: dec!(850000),
        down_payment_percent: Percent(dec!(25)),
        registration_fee_percent: Percent(dec!(4)),
        agent_commission_percent: Percent(dec!(2)),
        loan_tenure_years: 25,
        annual_discount_rate: Percent(dec!(4)),
        annual_rental_yield: Percent(dec!(6)),
        service_charge_per_area: dec!(10),
        expected_exit_value: dec!(1020000),
    }
}

#[test]
fn reference_case_cost_and_income_anchors() {
    let out = evaluate(&reference_inputs()).unwrap().result;

    // invested = 850,000 × (25% + 4% + 2%) = 263,500
    assert_eq!(out.invested_capital, dec!(263500));
    // rental = 850,000 × 6% = 51,000
    assert_eq!(out.annual_rental_income, dec!(51000));
    // 850,000 / 850 sqft
    assert_eq!(out.price_per_area, dec!(1000));
}

#[test]
fn reference_case_headline_metrics_all_positive() {
    let out = evaluate(&reference_inputs()).unwrap().result;

    assert!(out.dcf > Decimal::ZERO, "DCF {}", out.dcf);
    assert!(out.npv > Decimal::ZERO, "NPV {}", out.npv);
    assert!(out.irr.value > Decimal::ZERO, "IRR {}", out.irr.value);
    assert!(out.irr.converged);
    assert!(out.roic > Decimal::ZERO, "ROIC {}", out.roic);
    assert!(out.dscr > Decimal::ZERO, "DSCR {}", out.dscr);
}

#[test]
fn reference_case_debt_service() {
    let out = evaluate(&reference_inputs()).unwrap().result;

    // 637,500 at 4%/12 over 300 months is ~3,364.94/month
    assert!(
        out.monthly_emi > dec!(3360) && out.monthly_emi < dec!(3370),
        "EMI {}",
        out.monthly_emi
    );
    assert_eq!(out.annual_debt_service, out.monthly_emi * dec!(12));

    // NOI 42,500 against ~40,379 of debt service → DSCR just above 1x
    assert!(
        out.dscr > dec!(1.0) && out.dscr < dec!(1.1),
        "DSCR {}",
        out.dscr
    );
}

#[test]
fn reference_case_dcf_decomposition() {
    let out = evaluate(&reference_inputs()).unwrap().result;

    // Terminal: 1,020,000 / 1.04^25 ≈ 382,618.50
    assert!(
        (out.terminal_value_pv - dec!(382618.50)).abs() < dec!(0.50),
        "terminal {}",
        out.terminal_value_pv
    );
    // NPV = DCF - invested capital, by definition
    assert_eq!(out.npv, out.dcf - out.invested_capital);
    // ROIC = DCF / invested - 1
    let expected_roic = out.dcf / out.invested_capital - Decimal::ONE;
    assert_eq!(out.roic, expected_roic);
}

#[test]
fn reference_case_is_not_a_dont_buy() {
    let out = evaluate(&reference_inputs()).unwrap().result;

    // Positive NPV keeps the verdict at MARGINAL or better; the thin IRR
    // on a 20-year horizon keeps it short of BUY
    assert_ne!(out.recommendation.verdict, Verdict::DontBuy);
    assert_eq!(out.recommendation.reasons.len(), 4);
    assert!(!out.recommendation.summary.is_empty());
}

#[test]
fn higher_discount_rate_lowers_value() {
    let mut inputs = reference_inputs();
    let base = evaluate(&inputs).unwrap().result;

    inputs.annual_discount_rate = Percent(dec!(8));
    let stressed = evaluate(&inputs).unwrap().result;

    // A dearer mortgage and heavier discounting both cut the DCF
    assert!(stressed.dcf < base.dcf);
    assert!(stressed.npv < base.npv);
    assert!(stressed.monthly_emi > base.monthly_emi);
}

#[test]
fn tenure_changes_do_not_move_the_horizon() {
    // The 20-year cash-flow horizon is a fixed modeling choice; only the
    // EMI (via amortisation length) and terminal discounting react to tenure.
    let mut inputs = reference_inputs();
    let at_25 = evaluate(&inputs).unwrap().result;

    inputs.loan_tenure_years = 20;
    let at_20 = evaluate(&inputs).unwrap().result;

    // Shorter amortisation → higher EMI → lower net annual cash flow
    assert!(at_20.monthly_emi > at_25.monthly_emi);
    assert!(at_20.net_annual_cash_flow < at_25.net_annual_cash_flow);
    // Both DCFs price exactly 20 annual flows plus the terminal
    assert_eq!(at_25.cash_flows.len(), 26);
    assert_eq!(at_20.cash_flows.len(), 21);
}
