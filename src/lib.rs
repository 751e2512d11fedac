//! Tip calculation with optional round-up and locale-aware currency formatting.
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use tiptime::{calculate_tip_in, TipLocale};
//!
//! assert_eq!(calculate_tip_in(TipLocale::EnUS, dec!(100), dec!(18), true), "$18.00");
//! ```

pub mod calculator;
pub mod config;
pub mod form;
pub mod i18n;
pub mod inputs;
pub mod prelude;
pub mod types;

pub use calculator::{DEFAULT_TIP_PERCENT, TipCalculator, TipRequest, calculate_tip, calculate_tip_in, tip_amount};
pub use config::TipConfig;
pub use form::{TipForm, TipScreen};
pub use i18n::{CurrencyFormatter, TipLocale, Translator};
pub use inputs::BlankTipPolicy;
pub use types::{TipDetails, TipError};
