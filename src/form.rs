//! Headless model of the calculator screen.
//!
//! A renderer owns a [`TipForm`], forwards text edits and toggle changes to
//! it, and draws whatever [`TipForm::screen`] returns. Every change
//! recomputes the tip synchronously; there is no debouncing or caching.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{TipCalculator, TipRequest};
use crate::config::TipConfig;
use crate::i18n::{CurrencyFormatter, Translator, keys};
use crate::inputs::{parse_amount, parse_tip_percent};
use crate::types::{TipDetails, TipError};

/// Raw field contents plus the round-up switch.
#[derive(Debug, Clone)]
pub struct TipForm {
    amount_input: String,
    tip_input: String,
    round_up: bool,
    config: TipConfig,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipScreen {
    pub title: String,
    pub amount_label: String,
    pub amount_input: String,
    pub tip_label: String,
    pub tip_input: String,
    pub round_up_label: String,
    pub round_up: bool,
    /// e.g. `Tip Amount: $15.00`
    pub result: String,
}

impl Default for TipForm {
    /// An empty form formatting for the host locale.
    fn default() -> Self {
        Self::new(TipConfig::for_host())
    }
}

impl TipForm {
    pub fn new(config: TipConfig) -> Self {
        TipForm {
            amount_input: String::new(),
            tip_input: String::new(),
            round_up: false,
            config,
        }
    }

    pub fn on_amount_change(&mut self, value: impl Into<String>) {
        self.amount_input = value.into();
    }

    pub fn on_tip_change(&mut self, value: impl Into<String>) {
        self.tip_input = value.into();
    }

    pub fn on_round_up_changed(&mut self, round_up: bool) {
        self.round_up = round_up;
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    pub fn tip_input(&self) -> &str {
        &self.tip_input
    }

    pub fn round_up(&self) -> bool {
        self.round_up
    }

    pub fn config(&self) -> &TipConfig {
        &self.config
    }

    /// The bill amount as the calculator sees it.
    pub fn amount(&self) -> Decimal {
        parse_amount(&self.amount_input)
    }

    /// The tip percentage as the calculator sees it, after the blank-field policy.
    pub fn tip_percent(&self) -> Decimal {
        parse_tip_percent(&self.tip_input, self.config.blank_tip, self.config.default_tip_percent)
    }

    pub fn request(&self) -> TipRequest {
        TipRequest {
            bill_amount: self.amount(),
            tip_percent: self.tip_percent(),
            round_up: self.round_up,
        }
    }

    /// The formatted tip, e.g. `$15.00`.
    pub fn tip_text(&self) -> String {
        TipCalculator::from_config(&self.config).format(&self.request())
    }

    pub fn details(&self) -> Result<TipDetails, TipError> {
        TipCalculator::from_config(&self.config).calculate(&self.request())
    }

    pub fn screen(&self, translator: &Translator) -> TipScreen {
        let locale = self.config.locale;
        TipScreen {
            title: translator.translate(locale, keys::CALCULATE_TIP, None),
            amount_label: translator.translate(locale, keys::BILL_AMOUNT, None),
            amount_input: self.amount_input.clone(),
            tip_label: translator.translate(locale, keys::HOW_WAS_THE_SERVICE, None),
            tip_input: self.tip_input.clone(),
            round_up_label: translator.translate(locale, keys::ROUND_UP_TIP, None),
            round_up: self.round_up,
            result: translator.tip_amount_label(locale, &self.tip_text()),
        }
    }

    /// Formats an arbitrary amount the same way the result line does.
    pub fn format_money(&self, amount: Decimal) -> String {
        self.config.locale.format_currency(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::TipLocale;
    use crate::inputs::BlankTipPolicy;
    use rust_decimal_macros::dec;

    fn us_form() -> TipForm {
        TipForm::new(TipConfig::default().with_locale(TipLocale::EnUS))
    }

    #[test]
    fn test_initial_state() {
        let form = us_form();
        assert_eq!(form.amount(), Decimal::ZERO);
        assert_eq!(form.tip_percent(), dec!(15));
        assert!(!form.round_up());
        assert_eq!(form.tip_text(), "$0.00");
    }

    #[test]
    fn test_default_form_uses_host_locale() {
        let form = TipForm::default();
        assert_eq!(form.config().locale, TipLocale::host());
        assert_eq!(form.tip_text(), TipLocale::host().format_currency(Decimal::ZERO));
    }

    #[test]
    fn test_recomputes_on_every_change() {
        let mut form = us_form();

        form.on_amount_change("1");
        assert_eq!(form.tip_text(), "$0.15");
        form.on_amount_change("10");
        assert_eq!(form.tip_text(), "$1.50");
        form.on_tip_change("18");
        assert_eq!(form.tip_text(), "$1.80");
        form.on_round_up_changed(true);
        assert_eq!(form.tip_text(), "$2.00");
        form.on_round_up_changed(false);
        assert_eq!(form.tip_text(), "$1.80");
    }

    #[test]
    fn test_garbage_amount_is_zero() {
        let mut form = us_form();
        form.on_amount_change("12abc");
        form.on_tip_change("20");
        assert_eq!(form.amount(), Decimal::ZERO);
        assert_eq!(form.tip_text(), "$0.00");
    }

    #[test]
    fn test_zero_policy_blank_tip() {
        let mut form = TipForm::new(TipConfig::default().with_blank_tip(BlankTipPolicy::Zero));
        form.on_amount_change("100");
        assert_eq!(form.tip_percent(), Decimal::ZERO);
        assert_eq!(form.tip_text(), "$0.00");
    }

    #[test]
    fn test_screen_snapshot() {
        let translator = Translator::new();
        let mut form = us_form();
        form.on_amount_change("100");
        form.on_tip_change("15");

        let screen = form.screen(&translator);
        assert_eq!(screen.title, "Calculate Tip");
        assert_eq!(screen.amount_label, "Bill Amount");
        assert_eq!(screen.tip_label, "Tip Percentage");
        assert_eq!(screen.round_up_label, "Round up tip?");
        assert_eq!(screen.amount_input, "100");
        assert_eq!(screen.result, "Tip Amount: $15.00");
    }

    #[test]
    fn test_german_screen() {
        let translator = Translator::new();
        let mut form = TipForm::new(TipConfig::default().with_locale(TipLocale::DeDE));
        form.on_amount_change("42");
        form.on_tip_change("10");

        let screen = form.screen(&translator);
        assert_eq!(screen.result, "Trinkgeld: 4,20\u{00A0}€");
        assert_eq!(form.format_money(dec!(1000)), "1.000,00\u{00A0}€");
    }
}
