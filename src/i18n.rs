use fixed_decimal::FixedDecimal;
use fluent_bundle::bundle::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use icu::decimal::{FixedDecimalFormatter, options::FixedDecimalFormatterOptions};
use icu::locid::Locale;
use once_cell::sync::Lazy;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use strum::{EnumIter, IntoEnumIterator};
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;
use writeable::Writeable;

use crate::types::TipError;

#[derive(RustEmbed)]
#[folder = "assets/locales"]
struct Asset;

/// Environment variables consulted for the host locale, highest priority first.
const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MONETARY", "LANG"];

static HOST_LOCALE: Lazy<TipLocale> = Lazy::new(|| {
    let locale = TipLocale::from_env_lookup(|key| std::env::var(key).ok());
    debug!(locale = locale.as_str(), "detected host locale");
    locale
});

/// Locales the calculator can format for. Each carries its own currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, EnumIter)]
pub enum TipLocale {
    #[default]
    #[serde(rename = "en-US")]
    EnUS,
    #[serde(rename = "en-GB")]
    EnGB,
    #[serde(rename = "de-DE")]
    DeDE,
    #[serde(rename = "fr-FR")]
    FrFR,
    #[serde(rename = "ja-JP")]
    JaJP,
    #[serde(rename = "id-ID")]
    IdID,
}

/// Where the currency symbol sits relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPlacement {
    Prefix,
    /// After the number, separated by a no-break space.
    Suffix,
}

impl TipLocale {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipLocale::EnUS => "en-US",
            TipLocale::EnGB => "en-GB",
            TipLocale::DeDE => "de-DE",
            TipLocale::FrFR => "fr-FR",
            TipLocale::JaJP => "ja-JP",
            TipLocale::IdID => "id-ID",
        }
    }

    pub fn all() -> impl Iterator<Item = TipLocale> {
        TipLocale::iter()
    }

    /// The locale of the running process, detected once from
    /// `LC_ALL`, `LC_MONETARY` and `LANG`. Falls back to en-US.
    pub fn host() -> TipLocale {
        *HOST_LOCALE
    }

    /// Resolves a locale the way POSIX does: the first non-empty variable wins.
    pub fn from_env_lookup<F>(lookup: F) -> TipLocale
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = LOCALE_ENV_VARS
            .iter()
            .filter_map(|&key| lookup(key))
            .find(|value| !value.trim().is_empty())
        else {
            return TipLocale::default();
        };

        Self::from_posix(&value).unwrap_or_else(|| {
            debug!(value = value.as_str(), "unsupported host locale, using en-US");
            TipLocale::default()
        })
    }

    /// Parses POSIX locale names such as `de_DE.UTF-8` or `fr_FR@euro`.
    pub fn from_posix(value: &str) -> Option<TipLocale> {
        let name = value.split(['.', '@']).next().unwrap_or_default().trim();
        if name.is_empty() || name == "C" || name == "POSIX" {
            return None;
        }
        name.replace('_', "-").parse().ok()
    }

    pub fn to_icu_locale(&self) -> Result<Locale, TipError> {
        self.as_str()
            .parse()
            .map_err(|e| TipError::UnsupportedLocale(format!("{}: {:?}", self.as_str(), e)))
    }

    pub fn currency_code(&self) -> &'static str {
        match self {
            TipLocale::EnUS => "USD",
            TipLocale::EnGB => "GBP",
            TipLocale::DeDE | TipLocale::FrFR => "EUR",
            TipLocale::JaJP => "JPY",
            TipLocale::IdID => "IDR",
        }
    }

    pub fn currency_symbol(&self) -> &'static str {
        match self {
            TipLocale::EnUS => "$",
            TipLocale::EnGB => "£",
            TipLocale::DeDE | TipLocale::FrFR => "€",
            TipLocale::JaJP => "￥",
            TipLocale::IdID => "Rp",
        }
    }

    pub fn symbol_placement(&self) -> SymbolPlacement {
        match self {
            TipLocale::DeDE | TipLocale::FrFR => SymbolPlacement::Suffix,
            _ => SymbolPlacement::Prefix,
        }
    }

    /// Number of fractional digits the currency is displayed with.
    pub fn minor_units(&self) -> u32 {
        match self {
            TipLocale::JaJP => 0,
            _ => 2,
        }
    }
}

impl fmt::Display for TipLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TipLocale {
    type Err = TipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(locale) = TipLocale::iter().find(|l| l.as_str().eq_ignore_ascii_case(s)) {
            return Ok(locale);
        }
        // Same language, unsupported region: use the first locale of that language.
        let language = s.split('-').next().unwrap_or_default().to_ascii_lowercase();
        match language.as_str() {
            "en" => Ok(TipLocale::EnUS),
            "de" => Ok(TipLocale::DeDE),
            "fr" => Ok(TipLocale::FrFR),
            "ja" => Ok(TipLocale::JaJP),
            "id" => Ok(TipLocale::IdID),
            _ => Err(TipError::UnsupportedLocale(s.to_string())),
        }
    }
}

/// Trait for formatting money.
pub trait CurrencyFormatter {
    fn format_currency(&self, amount: Decimal) -> String;
}

impl CurrencyFormatter for TipLocale {
    /// Rounds half-even to the currency's minor unit, groups digits per
    /// the locale, and attaches the currency symbol. Never fails: if the
    /// ICU data cannot be loaded the number is written ungrouped.
    fn format_currency(&self, amount: Decimal) -> String {
        let digits = self.minor_units();
        let rounded = amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointNearestEven);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();

        let mut magnitude = rounded.abs();
        magnitude.rescale(digits);
        let number = self.format_number(magnitude, digits);

        let sign = if negative { "-" } else { "" };
        let symbol = self.currency_symbol();
        match self.symbol_placement() {
            SymbolPlacement::Prefix => format!("{}{}{}", sign, symbol, number),
            SymbolPlacement::Suffix => format!("{}{}\u{00A0}{}", sign, number, symbol),
        }
    }
}

impl TipLocale {
    fn format_number(&self, magnitude: Decimal, digits: u32) -> String {
        let plain = magnitude.to_string();

        let formatter = self.to_icu_locale().and_then(|locale| {
            FixedDecimalFormatter::try_new(&locale.into(), FixedDecimalFormatterOptions::default())
                .map_err(|e| TipError::UnsupportedLocale(format!("{}: {:?}", self.as_str(), e)))
        });
        let formatter = match formatter {
            Ok(formatter) => formatter,
            Err(e) => {
                warn!(error = %e, "ICU decimal formatter unavailable, writing plain number");
                return plain;
            }
        };

        match FixedDecimal::from_str(&plain) {
            Ok(mut fixed) => {
                fixed.pad_end(-(digits as i16));
                formatter.format(&fixed).write_to_string().into_owned()
            }
            Err(e) => {
                warn!(value = plain.as_str(), error = ?e, "could not convert amount for ICU");
                plain
            }
        }
    }
}

type ConcurrentBundle = FluentBundle<FluentResource, intl_memoizer::concurrent::IntlLangMemoizer>;

/// Message keys of the calculator screen.
pub mod keys {
    pub const CALCULATE_TIP: &str = "calculate-tip";
    pub const BILL_AMOUNT: &str = "bill-amount";
    pub const HOW_WAS_THE_SERVICE: &str = "how-was-the-service";
    pub const ROUND_UP_TIP: &str = "round-up-tip";
    pub const TIP_AMOUNT: &str = "tip-amount";
}

/// Looks up the screen's user-facing strings from the embedded Fluent files.
#[derive(Clone)]
pub struct Translator {
    bundles: Arc<HashMap<TipLocale, ConcurrentBundle>>,
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("locales", &self.bundles.keys())
            .finish()
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    /// Loads every locale that has a `main.ftl`. Locales whose file is
    /// missing or malformed are skipped and fall back to en-US at lookup.
    pub fn new() -> Self {
        let mut bundles = HashMap::new();

        for locale in TipLocale::iter() {
            match Self::load_bundle(locale) {
                Ok(Some(bundle)) => {
                    bundles.insert(locale, bundle);
                }
                Ok(None) => debug!(locale = locale.as_str(), "no translation file, will fall back to en-US"),
                Err(e) => warn!(locale = locale.as_str(), error = %e, "failed to load translations"),
            }
        }

        Translator { bundles: Arc::new(bundles) }
    }

    fn load_bundle(locale: TipLocale) -> Result<Option<ConcurrentBundle>, TipError> {
        let file_path = format!("{}/main.ftl", locale.as_str());
        let Some(file) = Asset::get(&file_path) else {
            return Ok(None);
        };

        let lang_id: LanguageIdentifier = locale
            .as_str()
            .parse()
            .map_err(|e| TipError::UnsupportedLocale(format!("{}: {}", locale.as_str(), e)))?;
        let source = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| TipError::ConfigurationError(format!("{} is not UTF-8: {}", file_path, e)))?;
        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| TipError::ConfigurationError(format!("Failed to parse {}: {:?}", file_path, errors)))?;

        let mut bundle = FluentBundle::new_concurrent(vec![lang_id]);
        // Labels end up in terminals and tests, so no bidi isolation marks.
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| TipError::ConfigurationError(format!("Failed to add {}: {:?}", file_path, errors)))?;
        Ok(Some(bundle))
    }

    fn lookup(&self, locale: TipLocale, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundle = self.bundles.get(&locale)?;
        let pattern = bundle.get_message(key)?.value()?;
        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            debug!(key, ?errors, "fluent reported formatting errors");
        }
        Some(value.into_owned())
    }

    pub fn translate(&self, locale: TipLocale, key: &str, args: Option<&FluentArgs>) -> String {
        self.lookup(locale, key, args)
            .or_else(|| self.lookup(TipLocale::EnUS, key, args))
            .unwrap_or_else(|| format!("MISSING:{}", key))
    }

    pub fn translate_with_args(&self, locale: TipLocale, key: &str, args: &HashMap<String, String>) -> String {
        let mut f_args = FluentArgs::new();
        for (k, v) in args {
            f_args.set(k.as_str(), v.clone());
        }
        self.translate(locale, key, Some(&f_args))
    }

    /// The result line, e.g. `Tip Amount: $15.00`.
    pub fn tip_amount_label(&self, locale: TipLocale, formatted_tip: &str) -> String {
        let mut args = FluentArgs::new();
        args.set("amount", formatted_tip.to_string());
        self.translate(locale, keys::TIP_AMOUNT, Some(&args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_formatting() {
        let amount = dec!(1234.56);

        assert_eq!(TipLocale::EnUS.format_currency(amount), "$1,234.56");
        assert_eq!(TipLocale::EnGB.format_currency(amount), "£1,234.56");
        assert_eq!(TipLocale::IdID.format_currency(amount), "Rp1.234,56");
        assert_eq!(TipLocale::DeDE.format_currency(amount), "1.234,56\u{00A0}€");

        // fr uses a narrow no-break space for grouping; only check the parts.
        let fr = TipLocale::FrFR.format_currency(amount);
        assert!(fr.starts_with('1') && fr.contains("234,56") && fr.ends_with('€'));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(TipLocale::EnUS.format_currency(dec!(15)), "$15.00");
        assert_eq!(TipLocale::EnUS.format_currency(dec!(0)), "$0.00");
        assert_eq!(TipLocale::JaJP.format_currency(dec!(1500)), "￥1,500");
        assert_eq!(TipLocale::JaJP.format_currency(dec!(12.4)), "￥12");
    }

    #[test]
    fn test_half_even_display_rounding() {
        assert_eq!(TipLocale::EnUS.format_currency(dec!(0.125)), "$0.12");
        assert_eq!(TipLocale::EnUS.format_currency(dec!(0.135)), "$0.14");
        assert_eq!(TipLocale::EnUS.format_currency(dec!(11.998)), "$12.00");
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(TipLocale::EnUS.format_currency(dec!(-15)), "-$15.00");
        assert_eq!(TipLocale::DeDE.format_currency(dec!(-2.5)), "-2,50\u{00A0}€");
        // Rounds to zero, so no sign.
        assert_eq!(TipLocale::EnUS.format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_from_posix() {
        assert_eq!(TipLocale::from_posix("de_DE.UTF-8"), Some(TipLocale::DeDE));
        assert_eq!(TipLocale::from_posix("fr_FR@euro"), Some(TipLocale::FrFR));
        assert_eq!(TipLocale::from_posix("en_AU.UTF-8"), Some(TipLocale::EnUS));
        assert_eq!(TipLocale::from_posix("C.UTF-8"), None);
        assert_eq!(TipLocale::from_posix("POSIX"), None);
        assert_eq!(TipLocale::from_posix("xx_YY"), None);
    }

    #[test]
    fn test_env_lookup_priority() {
        let env = |pairs: &'static [(&'static str, &'static str)]| {
            move |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
        };

        assert_eq!(TipLocale::from_env_lookup(env(&[("LANG", "ja_JP.UTF-8")])), TipLocale::JaJP);
        assert_eq!(
            TipLocale::from_env_lookup(env(&[("LANG", "ja_JP.UTF-8"), ("LC_ALL", "en_GB.UTF-8")])),
            TipLocale::EnGB
        );
        assert_eq!(
            TipLocale::from_env_lookup(env(&[("LC_ALL", ""), ("LC_MONETARY", "id_ID")])),
            TipLocale::IdID
        );
        assert_eq!(TipLocale::from_env_lookup(env(&[])), TipLocale::EnUS);
        assert_eq!(TipLocale::from_env_lookup(env(&[("LANG", "C")])), TipLocale::EnUS);
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("de-DE".parse::<TipLocale>().unwrap(), TipLocale::DeDE);
        assert_eq!("en-gb".parse::<TipLocale>().unwrap(), TipLocale::EnGB);
        assert_eq!("ja".parse::<TipLocale>().unwrap(), TipLocale::JaJP);
        assert!(matches!("pt-BR".parse::<TipLocale>(), Err(TipError::UnsupportedLocale(_))));
    }

    #[test]
    fn test_translator_lookup_and_fallback() {
        let translator = Translator::new();

        assert_eq!(translator.translate(TipLocale::EnUS, keys::CALCULATE_TIP, None), "Calculate Tip");
        assert_eq!(translator.translate(TipLocale::DeDE, keys::ROUND_UP_TIP, None), "Trinkgeld aufrunden?");
        // No en-GB file: falls back to en-US.
        assert_eq!(translator.translate(TipLocale::EnGB, keys::BILL_AMOUNT, None), "Bill Amount");
        assert_eq!(translator.translate(TipLocale::EnUS, "no-such-key", None), "MISSING:no-such-key");
    }

    #[test]
    fn test_tip_amount_label() {
        let translator = Translator::new();
        assert_eq!(translator.tip_amount_label(TipLocale::EnUS, "$15.00"), "Tip Amount: $15.00");

        let mut args = HashMap::new();
        args.insert("amount".to_string(), "15,00 €".to_string());
        assert_eq!(
            translator.translate_with_args(TipLocale::DeDE, keys::TIP_AMOUNT, &args),
            "Trinkgeld: 15,00 €"
        );
    }
}
