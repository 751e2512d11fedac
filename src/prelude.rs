//! Prelude module for tiptime
//!
//! Re-exports the types most callers need.
//!
//! ```rust
//! use tiptime::prelude::*;
//! ```

pub use crate::calculator::{DEFAULT_TIP_PERCENT, TipCalculator, TipRequest, calculate_tip, calculate_tip_in, tip_amount};
pub use crate::config::TipConfig;
pub use crate::form::{TipForm, TipScreen};
pub use crate::i18n::{CurrencyFormatter, TipLocale, Translator};
pub use crate::inputs::{BlankTipPolicy, IntoTipDecimal, parse_amount, parse_tip_percent};
pub use crate::types::{CalculationStep, TipDetails, TipError};
