use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::i18n::TipLocale;

/// The kind of operation a [`CalculationStep`] records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepOperation {
    Initial,
    Rate,
    Multiply,
    Ceiling,
    Result,
    Info,
}

/// Represents a single step in the tip calculation.
///
/// The trace lets a caller show how the final tip was derived from the
/// bill amount, in the order the arithmetic happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationStep {
    /// Human-readable description of what this step does.
    pub description: String,
    /// The value at this step (if applicable).
    pub amount: Option<Decimal>,
    pub operation: StepOperation,
}

impl CalculationStep {
    fn new(description: impl Into<String>, amount: Option<Decimal>, operation: StepOperation) -> Self {
        Self {
            description: description.into(),
            amount,
            operation,
        }
    }

    pub fn initial(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Some(amount), StepOperation::Initial)
    }

    pub fn rate(description: impl Into<String>, rate: Decimal) -> Self {
        Self::new(description, Some(rate), StepOperation::Rate)
    }

    pub fn multiply(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Some(amount), StepOperation::Multiply)
    }

    pub fn ceiling(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Some(amount), StepOperation::Ceiling)
    }

    pub fn result(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Some(amount), StepOperation::Result)
    }

    pub fn info(description: impl Into<String>) -> Self {
        Self::new(description, None, StepOperation::Info)
    }
}

/// Detailed breakdown of one tip calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TipDetails {
    /// The bill amount the tip was computed on.
    pub bill_amount: Decimal,
    /// Tip percentage, e.g. `15` for 15%.
    pub tip_percent: Decimal,
    /// Whether the tip was rounded up to a whole currency unit.
    pub round_up: bool,
    /// `bill_amount * tip_percent / 100` before any ceiling.
    pub unrounded_tip: Decimal,
    /// The tip after the optional ceiling. Display rounding to the
    /// currency's minor unit happens only in `formatted_tip`.
    pub tip: Decimal,
    pub locale: TipLocale,
    /// The tip as a locale currency string, e.g. `$15.00`.
    pub formatted_tip: String,
    /// Step-by-step trace of how this calculation was derived.
    pub calculation_trace: Vec<CalculationStep>,
}

impl TipDetails {
    /// Whether the ceiling actually changed the tip.
    pub fn was_rounded(&self) -> bool {
        self.round_up && self.tip != self.unrounded_tip
    }
}

/// Errors surfaced at the fallible edges of the crate.
///
/// The formatting entry points (`calculate_tip` and friends) never return
/// these; they are produced by configuration loading, strict input
/// conversion and the traced [`crate::TipCalculator`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TipError {
    #[error("Invalid Input [{field}]: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Configuration Error: {0}")]
    ConfigurationError(String),

    #[error("Arithmetic Overflow: operation '{operation}' failed")]
    Overflow { operation: String },

    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
}

impl TipError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        TipError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        TipError::Overflow {
            operation: operation.into(),
        }
    }
}
