use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::TipConfig;
use crate::i18n::{CurrencyFormatter, TipLocale};
use crate::inputs::IntoTipDecimal;
use crate::types::{CalculationStep, TipDetails, TipError};

/// Tip percentage used when the caller does not supply one.
pub const DEFAULT_TIP_PERCENT: Decimal = dec!(15);

const HUNDRED: Decimal = dec!(100);

/// Computes `bill_amount * tip_percent / 100`, then the optional ceiling.
/// Returns `(unrounded, final)`.
fn checked_tip(bill_amount: Decimal, tip_percent: Decimal, round_up: bool) -> Result<(Decimal, Decimal), TipError> {
    let rate = tip_percent
        .checked_div(HUNDRED)
        .ok_or_else(|| TipError::overflow("tip_percent / 100"))?;
    let tip = bill_amount
        .checked_mul(rate)
        .ok_or_else(|| TipError::overflow("bill_amount * rate"))?;
    let rounded = if !round_up {
        tip
    } else if tip.is_zero() && positive_product(bill_amount, tip_percent) {
        // The product was below Decimal's precision but still above zero.
        Decimal::ONE
    } else {
        tip.ceil()
    };
    Ok((tip, rounded))
}

fn positive_product(a: Decimal, b: Decimal) -> bool {
    !a.is_zero() && !b.is_zero() && a.is_sign_negative() == b.is_sign_negative()
}

/// The numeric tip for a bill.
///
/// Total over its inputs: a product too large for `Decimal` saturates to
/// `Decimal::MAX` (or `MIN` for a negative product) instead of panicking.
pub fn tip_amount(bill_amount: Decimal, tip_percent: Decimal, round_up: bool) -> Decimal {
    match checked_tip(bill_amount, tip_percent, round_up) {
        Ok((_, tip)) => tip,
        Err(e) => {
            warn!(%bill_amount, %tip_percent, error = %e, "tip saturated");
            if bill_amount.is_sign_negative() != tip_percent.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        }
    }
}

/// Calculates the tip and formats it for the host locale, e.g. `$15.00`.
///
/// Negative inputs are not guarded against; they yield a negative tip.
pub fn calculate_tip(bill_amount: Decimal, tip_percent: Decimal, round_up: bool) -> String {
    calculate_tip_in(TipLocale::host(), bill_amount, tip_percent, round_up)
}

/// Like [`calculate_tip`], formatting for an explicit locale.
pub fn calculate_tip_in(locale: TipLocale, bill_amount: Decimal, tip_percent: Decimal, round_up: bool) -> String {
    locale.format_currency(tip_amount(bill_amount, tip_percent, round_up))
}

/// Inputs of one calculation. `tip_percent` defaults to 15.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipRequest {
    pub bill_amount: Decimal,
    pub tip_percent: Decimal,
    pub round_up: bool,
}

impl Default for TipRequest {
    fn default() -> Self {
        TipRequest {
            bill_amount: Decimal::ZERO,
            tip_percent: DEFAULT_TIP_PERCENT,
            round_up: false,
        }
    }
}

impl TipRequest {
    pub fn new(bill_amount: impl IntoTipDecimal) -> Result<Self, TipError> {
        Ok(TipRequest {
            bill_amount: bill_amount.into_tip_decimal()?,
            ..Default::default()
        })
    }

    pub fn percent(mut self, tip_percent: impl IntoTipDecimal) -> Result<Self, TipError> {
        self.tip_percent = tip_percent.into_tip_decimal()?;
        Ok(self)
    }

    pub fn round_up(mut self, round_up: bool) -> Self {
        self.round_up = round_up;
        self
    }
}

/// Produces traced [`TipDetails`] for a fixed locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TipCalculator {
    locale: TipLocale,
}

impl TipCalculator {
    pub fn new(locale: TipLocale) -> Self {
        TipCalculator { locale }
    }

    /// A calculator for the locale the process runs under.
    pub fn host() -> Self {
        Self::new(TipLocale::host())
    }

    pub fn from_config(config: &TipConfig) -> Self {
        Self::new(config.locale)
    }

    pub fn locale(&self) -> TipLocale {
        self.locale
    }

    /// Formats the tip for `request`. Never fails.
    pub fn format(&self, request: &TipRequest) -> String {
        calculate_tip_in(self.locale, request.bill_amount, request.tip_percent, request.round_up)
    }

    /// Calculates the tip with a full trace. Unlike [`TipCalculator::format`]
    /// an out-of-range product is reported instead of saturated.
    pub fn calculate(&self, request: &TipRequest) -> Result<TipDetails, TipError> {
        let (unrounded_tip, tip) = checked_tip(request.bill_amount, request.tip_percent, request.round_up)?;

        let mut trace = vec![
            CalculationStep::initial("Bill Amount", request.bill_amount),
            CalculationStep::rate("Tip Rate", request.tip_percent / HUNDRED),
            CalculationStep::multiply("Tip", unrounded_tip),
        ];
        if request.round_up {
            trace.push(CalculationStep::ceiling("Rounded Up", tip));
        }
        if request.bill_amount.is_sign_negative() || request.tip_percent.is_sign_negative() {
            trace.push(CalculationStep::info("Negative input, tip is not clamped"));
        }
        trace.push(CalculationStep::result("Tip Due", tip));

        Ok(TipDetails {
            bill_amount: request.bill_amount,
            tip_percent: request.tip_percent,
            round_up: request.round_up,
            unrounded_tip,
            tip,
            locale: self.locale,
            formatted_tip: self.locale.format_currency(tip),
            calculation_trace: trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StepOperation;

    fn us(amount: Decimal, percent: Decimal, round_up: bool) -> String {
        calculate_tip_in(TipLocale::EnUS, amount, percent, round_up)
    }

    #[test]
    fn test_basic_tips() {
        assert_eq!(us(dec!(0), dec!(15), false), "$0.00");
        assert_eq!(us(dec!(100), dec!(15), false), "$15.00");
        assert_eq!(us(dec!(59.99), dec!(20), false), "$12.00");
    }

    #[test]
    fn test_round_up() {
        // Already whole: ceiling is a no-op.
        assert_eq!(us(dec!(100), dec!(15), true), "$15.00");
        assert_eq!(us(dec!(100), dec!(18), true), "$18.00");
        assert_eq!(us(dec!(10), dec!(15), true), "$2.00");
        assert_eq!(us(dec!(10), dec!(15), false), "$1.50");
    }

    #[test]
    fn test_round_up_below_precision() {
        let tiny = Decimal::new(1, 28);
        assert_eq!(us(tiny, dec!(1), true), "$1.00");
        assert_eq!(tip_amount(tiny, dec!(1), true), Decimal::ONE);
        assert_eq!(tip_amount(tiny, dec!(1), false), Decimal::ZERO);
        // Negative or zero products keep ceiling at zero.
        assert_eq!(tip_amount(-tiny, dec!(1), true), Decimal::ZERO);
        assert_eq!(tip_amount(tiny, dec!(0), true), Decimal::ZERO);
    }

    #[test]
    fn test_negative_inputs_propagate() {
        assert_eq!(tip_amount(dec!(-100), dec!(15), false), dec!(-15));
        assert_eq!(us(dec!(-100), dec!(15), false), "-$15.00");
        // ceil moves toward positive infinity.
        assert_eq!(tip_amount(dec!(-10), dec!(15), true), dec!(-1));
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(tip_amount(Decimal::MAX, dec!(200), false), Decimal::MAX);
        assert_eq!(tip_amount(Decimal::MAX, dec!(-200), false), Decimal::MIN);
        assert!(!us(Decimal::MAX, dec!(200), false).is_empty());
    }

    #[test]
    fn test_request_builder() {
        let request = TipRequest::new(59.99).unwrap().percent(20).unwrap().round_up(true);
        assert_eq!(request.bill_amount, dec!(59.99));
        assert_eq!(request.tip_percent, dec!(20));
        assert!(request.round_up);

        assert_eq!(TipRequest::new(100).unwrap().tip_percent, DEFAULT_TIP_PERCENT);
        assert!(TipRequest::new(f64::NAN).is_err());
    }

    #[test]
    fn test_calculate_trace() {
        let calculator = TipCalculator::new(TipLocale::EnUS);
        let request = TipRequest::new(dec!(10)).unwrap().round_up(true);
        let details = calculator.calculate(&request).unwrap();

        assert_eq!(details.unrounded_tip, dec!(1.5));
        assert_eq!(details.tip, dec!(2));
        assert!(details.was_rounded());
        assert_eq!(details.formatted_tip, "$2.00");

        let ops: Vec<StepOperation> = details.calculation_trace.iter().map(|s| s.operation).collect();
        assert_eq!(
            ops,
            vec![
                StepOperation::Initial,
                StepOperation::Rate,
                StepOperation::Multiply,
                StepOperation::Ceiling,
                StepOperation::Result,
            ]
        );
    }

    #[test]
    fn test_calculate_reports_overflow() {
        let calculator = TipCalculator::new(TipLocale::EnUS);
        let request = TipRequest::new(Decimal::MAX).unwrap().percent(200).unwrap();
        assert!(matches!(calculator.calculate(&request), Err(TipError::Overflow { .. })));
    }
}
