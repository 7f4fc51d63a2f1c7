//! Error types for invoicing-client.
//!
//! | Error | Raised by | Surfaced as |
//! |-------|-----------|-------------|
//! | `ValidationError` | line item / invoice construction, submit | inline field message, never sent to the server |
//! | `FetchError` | the persistence collaborator | message; the editor or list may retry |
//! | `IndexOutOfRange` | line item edits at a bad position | defect, not a user-facing condition |
//! | `InvalidTransition` | editor/list events in the wrong state | defect, not a user-facing condition |
//! | `Superseded` | a store-driven call whose response was discarded | defect, not a user-facing condition |

use rust_decimal::Decimal;
use thiserror::Error;

/// Client-side, field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("quantity must be at least 1 (got {quantity})")]
    QuantityBelowMinimum { quantity: u32 },

    #[error("unit price must be at least 0.01 (got {unit_price})")]
    UnitPriceBelowMinimum { unit_price: Decimal },

    #[error("unit price must have at most two decimal places (got {unit_price})")]
    UnitPricePrecision { unit_price: Decimal },

    #[error("unit price must be at most 99999999.99 (got {unit_price})")]
    UnitPriceAboveMaximum { unit_price: Decimal },

    #[error("{field} is too large to compute")]
    AmountOutOfRange { field: &'static str },

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("invalid number '{value}' for {field}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("at least one line item is required for an invoice")]
    NoLineItems,

    #[error("line item {}: {source}", .index + 1)]
    LineItem {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Short machine-readable reason, used as a metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::EmptyField { .. } => "empty_field",
            ValidationError::QuantityBelowMinimum { .. } => "quantity",
            ValidationError::UnitPriceBelowMinimum { .. } => "unit_price",
            ValidationError::UnitPricePrecision { .. } => "unit_price_precision",
            ValidationError::UnitPriceAboveMaximum { .. } => "unit_price_maximum",
            ValidationError::AmountOutOfRange { .. } => "amount_out_of_range",
            ValidationError::InvalidDate { .. } => "date",
            ValidationError::InvalidNumber { .. } => "number",
            ValidationError::NoLineItems => "no_line_items",
            ValidationError::LineItem { source, .. } => source.reason(),
        }
    }
}

/// Failure talking to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed with status {status}{}", .detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn not_found() -> Self {
        FetchError::Status {
            status: 404,
            detail: Some("Not found.".to_string()),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        FetchError::Status {
            status: 400,
            detail: Some(detail.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
                detail: None,
            }
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Top-level error for invoice operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("line item index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("{action} response was discarded because its request is no longer pending")]
    Superseded { action: &'static str },
}

impl InvoiceError {
    /// Message suitable for showing next to the form or list.
    pub fn user_message(&self) -> String {
        match self {
            InvoiceError::Validation(err) => err.to_string(),
            InvoiceError::Fetch(FetchError::Status {
                detail: Some(detail),
                ..
            }) => detail.clone(),
            InvoiceError::Fetch(err) if err.is_not_found() => {
                "The invoice could not be found.".to_string()
            }
            InvoiceError::Fetch(_) => {
                "Could not reach the invoice service. Please try again.".to_string()
            }
            InvoiceError::IndexOutOfRange { .. }
            | InvoiceError::InvalidTransition { .. }
            | InvoiceError::Superseded { .. } => {
                "Something went wrong. Please reload and try again.".to_string()
            }
        }
    }

    /// True for programming-invariant violations rather than user-facing conditions.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            InvoiceError::IndexOutOfRange { .. }
                | InvoiceError::InvalidTransition { .. }
                | InvoiceError::Superseded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_item_error_is_one_based() {
        let err = ValidationError::LineItem {
            index: 0,
            source: Box::new(ValidationError::QuantityBelowMinimum { quantity: 0 }),
        };
        assert_eq!(
            err.to_string(),
            "line item 1: quantity must be at least 1 (got 0)"
        );
        assert_eq!(err.reason(), "quantity");
    }

    #[test]
    fn status_error_includes_detail() {
        let err = FetchError::bad_request("invoice_number: Invoice number must be unique.");
        assert_eq!(
            err.to_string(),
            "request failed with status 400: invoice_number: Invoice number must be unique."
        );
        assert!(!err.is_not_found());
        assert!(FetchError::not_found().is_not_found());
    }

    #[test]
    fn user_message_hides_defects() {
        let err = InvoiceError::IndexOutOfRange { index: 3, len: 1 };
        assert!(err.is_defect());
        assert!(!err.user_message().contains("index"));

        let err = InvoiceError::from(ValidationError::NoLineItems);
        assert!(!err.is_defect());
        assert_eq!(
            err.user_message(),
            "at least one line item is required for an invoice"
        );
    }

    #[test]
    fn superseded_response_is_named_as_such() {
        let err = InvoiceError::Superseded { action: "submit" };
        assert!(err.is_defect());
        assert_eq!(
            err.to_string(),
            "submit response was discarded because its request is no longer pending"
        );
        assert!(!err.user_message().contains("pending"));
    }

    #[test]
    fn out_of_range_amount_is_a_validation_reason() {
        let err = ValidationError::AmountOutOfRange { field: "line_total" };
        assert_eq!(err.to_string(), "line_total is too large to compute");
        assert_eq!(err.reason(), "amount_out_of_range");
        assert!(!InvoiceError::from(err).is_defect());
    }
}
