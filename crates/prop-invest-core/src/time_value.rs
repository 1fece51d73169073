//! Time-value-of-money primitives.
//!
//! Pure, stateless functions shared by every calculator. Degenerate inputs
//! that a spreadsheet would tolerate do not error here: coverage ratios on a
//! zero denominator return `None`, and the iterative solvers always hand
//! back their best estimate via [`SolverOutcome`] rather than failing.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PropInvestError;
use crate::types::{Money, Rate};
use crate::PropInvestResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.000001);
const DERIVATIVE_FLOOR: Decimal = dec!(0.000000001);
const MAX_SOLVER_ITERATIONS: u32 = 100;
const DEFAULT_GUESS: Decimal = dec!(0.1);

// Newton steps outside these bounds are clamped (IRR) or abandoned (RATE)
// to keep the discount factors finite.
const IRR_MIN_RATE: Decimal = dec!(-0.9);
const IRR_MAX_RATE: Decimal = dec!(10);
const RATE_LOWER_BOUND: Decimal = dec!(-1);
const RATE_UPPER_BOUND: Decimal = dec!(10);
const RATE_DELTA_SCALE: Decimal = dec!(0.0001);

/// Outcome of an iterative rate solve (IRR, RATE).
///
/// `value` is always usable: when the solver did not converge it holds the
/// last (or, for RATE, the initial) estimate and `converged` is false, so
/// callers can tell a trustworthy figure from a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOutcome {
    pub value: Rate,
    pub converged: bool,
    pub iterations: u32,
}

/// Periodic payment for an annuity of `nper` periods at `rate` per period.
///
/// With `rate == 0` this is straight-line: `-pv / nper`.
pub fn pmt(rate: Rate, nper: u32, pv: Money) -> PropInvestResult<Money> {
    if nper == 0 {
        return Err(PropInvestError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-pv / Decimal::from(nper));
    }

    let pvif = compound(rate, nper)?;
    let denominator = pvif - Decimal::ONE;
    if denominator.is_zero() {
        return Err(PropInvestError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(rate / denominator * -(pv * pvif))
}

/// Net Present Value of a series of future cash flows.
///
/// Spreadsheet convention: flow `i` (0-indexed) is discounted by
/// `(1+rate)^(i+1)`, i.e. the first element is a period-1 flow. This is NOT
/// the textbook form that leaves element 0 undiscounted; period-0 amounts
/// belong outside the series and are added by the caller.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> PropInvestResult<Money> {
    if rate <= dec!(-1) {
        return Err(PropInvestError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for cf in cash_flows {
        discount *= one_plus_r;
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return via Newton-Raphson over the full series
/// (period 0 included).
///
/// Never fails: iteration stops on convergence, a vanishing derivative, or
/// the iteration cap, and the current estimate is returned either way.
pub fn irr(cash_flows: &[Money], guess: Option<Rate>) -> SolverOutcome {
    let mut rate = clamp_irr(guess.unwrap_or(DEFAULT_GUESS));
    let mut iterations = 0;

    while iterations < MAX_SOLVER_ITERATIONS {
        iterations += 1;
        let (npv_at_rate, dnpv) = npv_and_derivative(cash_flows, rate);

        if dnpv.abs() < DERIVATIVE_FLOOR {
            return SolverOutcome {
                value: rate,
                converged: false,
                iterations,
            };
        }

        let step = npv_at_rate / dnpv;
        rate = clamp_irr(rate - step);

        if step.abs() < CONVERGENCE_THRESHOLD {
            return SolverOutcome {
                value: rate,
                converged: true,
                iterations,
            };
        }
    }

    SolverOutcome {
        value: rate,
        converged: false,
        iterations,
    }
}

/// NPV(r) = Σ CF_t / (1+r)^t over the full series, and its derivative
/// dNPV/dr = Σ -t · CF_t / (1+r)^(t+1) for t > 0.
fn npv_and_derivative(cash_flows: &[Money], rate: Rate) -> (Decimal, Decimal) {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE; // (1+r)^0

    for (t, cf) in cash_flows.iter().enumerate() {
        npv_val += *cf * discount;
        if t > 0 {
            dnpv += Decimal::from(-(t as i64)) * *cf * discount / one_plus_r;
        }
        discount /= one_plus_r;
    }

    (npv_val, dnpv)
}

fn clamp_irr(rate: Rate) -> Rate {
    rate.clamp(IRR_MIN_RATE, IRR_MAX_RATE)
}

/// Present value of a single future amount.
pub fn pv(future_value: Money, rate: Rate, periods: u32) -> PropInvestResult<Money> {
    let factor = compound(rate, periods)?;
    if factor.is_zero() {
        return Err(PropInvestError::DivisionByZero {
            context: format!("PV discount factor over {periods} periods"),
        });
    }
    Ok(future_value / factor)
}

/// Future value of a single present amount.
pub fn fv(present_value: Money, rate: Rate, periods: u32) -> PropInvestResult<Money> {
    Ok(present_value * compound(rate, periods)?)
}

/// Number of periods for an annuity to amortise `pv` against `fv`.
pub fn nper(
    rate: Rate,
    pmt: Money,
    pv: Money,
    fv: Money,
    annuity_due: bool,
) -> PropInvestResult<Decimal> {
    if rate.is_zero() {
        if pmt.is_zero() {
            return Err(PropInvestError::DivisionByZero {
                context: "NPER with zero rate and zero payment".into(),
            });
        }
        return Ok(-(pv + fv) / pmt);
    }

    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return Err(PropInvestError::InvalidInput {
            field: "rate".into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }

    let timing = pmt * timing_factor(rate, annuity_due);
    let numerator = timing - fv * rate;
    let denominator = timing + pv * rate;
    if denominator.is_zero() {
        return Err(PropInvestError::DivisionByZero {
            context: "NPER annuity ratio".into(),
        });
    }

    let ratio = numerator / denominator;
    let log_ratio = ratio
        .checked_ln()
        .ok_or_else(|| PropInvestError::InvalidInput {
            field: "pmt/pv/fv".into(),
            reason: "No real period count solves this annuity".into(),
        })?;
    let log_rate = one_plus_r
        .checked_ln()
        .ok_or_else(|| PropInvestError::InvalidInput {
            field: "rate".into(),
            reason: "Rate must be greater than -100%".into(),
        })?;

    Ok(log_ratio / log_rate)
}

/// Periodic interest rate for an annuity, solved by finite-difference
/// Newton steps (`delta = rate * 0.0001`).
///
/// Deliberate safety valve against divergence: if a step leaves the open
/// interval (-1, 10), the derivative collapses, or the difference quotient
/// cannot be formed, the solve is abandoned and the INITIAL guess comes
/// back with `converged: false`.
pub fn rate(
    nper: u32,
    pmt: Money,
    pv: Money,
    fv: Money,
    annuity_due: bool,
    guess: Option<Rate>,
) -> SolverOutcome {
    let initial = guess.unwrap_or(DEFAULT_GUESS);
    let mut current = initial;
    let mut iterations = 0;

    while iterations < MAX_SOLVER_ITERATIONS {
        iterations += 1;

        let delta = current * RATE_DELTA_SCALE;
        if delta.is_zero() {
            return bail(initial, iterations);
        }

        let residual_pair = annuity_residual(nper, pmt, pv, fv, annuity_due, current)
            .zip(annuity_residual(nper, pmt, pv, fv, annuity_due, current + delta));
        let (f0, f1) = match residual_pair {
            Some(pair) => pair,
            None => return bail(initial, iterations),
        };

        let derivative = (f1 - f0) / delta;
        if derivative.abs() < DERIVATIVE_FLOOR {
            return bail(initial, iterations);
        }

        let next = current - f0 / derivative;
        if next <= RATE_LOWER_BOUND || next >= RATE_UPPER_BOUND {
            return bail(initial, iterations);
        }

        if (next - current).abs() < CONVERGENCE_THRESHOLD {
            return SolverOutcome {
                value: next,
                converged: true,
                iterations,
            };
        }
        current = next;
    }

    SolverOutcome {
        value: current,
        converged: false,
        iterations,
    }
}

/// Residual of the annuity equation at `rate`; zero at the solved rate.
/// `None` when the compounding factor overflows.
fn annuity_residual(
    nper: u32,
    pmt: Money,
    pv: Money,
    fv: Money,
    annuity_due: bool,
    rate: Rate,
) -> Option<Decimal> {
    if rate.is_zero() {
        return Some(pv + pmt * Decimal::from(nper) + fv);
    }

    let pvif = (Decimal::ONE + rate).checked_powi(nper as i64)?;
    let timing = timing_factor(rate, annuity_due);
    Some(pv * pvif + pmt * timing * (pvif - Decimal::ONE) / rate + fv)
}

fn timing_factor(rate: Rate, annuity_due: bool) -> Decimal {
    if annuity_due {
        Decimal::ONE + rate
    } else {
        Decimal::ONE
    }
}

fn bail(initial: Rate, iterations: u32) -> SolverOutcome {
    SolverOutcome {
        value: initial,
        converged: false,
        iterations,
    }
}

/// Effective annual rate from a nominal rate compounded `npery` times.
pub fn effect(nominal_rate: Rate, npery: u32) -> PropInvestResult<Rate> {
    if npery == 0 {
        return Err(PropInvestError::InvalidInput {
            field: "npery".into(),
            reason: "Compounding periods must be > 0".into(),
        });
    }
    let periodic = nominal_rate / Decimal::from(npery);
    Ok(compound(periodic, npery)? - Decimal::ONE)
}

/// Nominal rate whose `npery`-fold compounding yields `effective_rate`.
pub fn nominal(effective_rate: Rate, npery: u32) -> PropInvestResult<Rate> {
    if npery == 0 {
        return Err(PropInvestError::InvalidInput {
            field: "npery".into(),
            reason: "Compounding periods must be > 0".into(),
        });
    }

    let base = Decimal::ONE + effective_rate;
    if base <= Decimal::ZERO {
        return Err(PropInvestError::InvalidInput {
            field: "effective_rate".into(),
            reason: "Effective rate must be greater than -100%".into(),
        });
    }

    let exponent = Decimal::ONE / Decimal::from(npery);
    let root = base
        .checked_powd(exponent)
        .ok_or_else(|| PropInvestError::InvalidInput {
            field: "effective_rate".into(),
            reason: "Root extraction failed for this rate".into(),
        })?;

    Ok(Decimal::from(npery) * (root - Decimal::ONE))
}

/// Debt service coverage ratio: NOI over annual debt service.
///
/// `None` when there is no debt service; the calculator decides whether
/// that reads as zero.
pub fn dscr(noi: Money, debt_service: Money) -> Option<Decimal> {
    if debt_service.is_zero() {
        None
    } else {
        Some(noi / debt_service)
    }
}

/// Return on invested capital: `total_return / invested_capital - 1`.
///
/// `None` when no capital was invested.
pub fn roic(total_return: Money, invested_capital: Money) -> Option<Decimal> {
    if invested_capital.is_zero() {
        None
    } else {
        Some(total_return / invested_capital - Decimal::ONE)
    }
}

/// `(1 + rate)^periods`, erroring instead of panicking on overflow.
fn compound(rate: Rate, periods: u32) -> PropInvestResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(periods as i64)
        .ok_or_else(|| PropInvestError::InvalidInput {
            field: "rate".into(),
            reason: format!("Compounding over {periods} periods overflows"),
        })
}
