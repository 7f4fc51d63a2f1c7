//! Line item model for invoicing-client.

use crate::error::ValidationError;
use crate::models::money;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Server-assigned identifier of a persisted line item.
pub type LineItemId = i64;

/// Single priced entry on an invoice.
///
/// `line_total` is never set directly; it is recomputed whenever `quantity`
/// or `unit_price` changes. A server response may carry its own copy, which
/// is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    id: Option<LineItemId>,
    description: String,
    quantity: u32,
    unit_price: Decimal,
    line_total: Decimal,
}

/// Editable fields of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemField {
    Description,
    Quantity,
    UnitPrice,
}

impl LineItemField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemField::Description => "description",
            LineItemField::Quantity => "quantity",
            LineItemField::UnitPrice => "unit_price",
        }
    }
}

/// A single field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemUpdate {
    Description(String),
    Quantity(u32),
    UnitPrice(Decimal),
}

impl LineItemUpdate {
    /// Coerce raw form input for `field` into a typed update.
    pub fn parse(field: LineItemField, raw: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidNumber {
            field: field.as_str(),
            value: raw.to_string(),
        };

        match field {
            LineItemField::Description => Ok(LineItemUpdate::Description(raw.to_string())),
            LineItemField::Quantity => raw
                .trim()
                .parse::<u32>()
                .map(LineItemUpdate::Quantity)
                .map_err(|_| invalid()),
            LineItemField::UnitPrice => {
                let unit_price = Decimal::from_str(raw.trim()).map_err(|_| invalid())?;
                if unit_price > money::max_unit_price() {
                    return Err(ValidationError::UnitPriceAboveMaximum { unit_price });
                }
                Ok(LineItemUpdate::UnitPrice(unit_price))
            }
        }
    }

    pub fn field(&self) -> LineItemField {
        match self {
            LineItemUpdate::Description(_) => LineItemField::Description,
            LineItemUpdate::Quantity(_) => LineItemField::Quantity,
            LineItemUpdate::UnitPrice(_) => LineItemField::UnitPrice,
        }
    }
}

impl LineItem {
    /// Create a validated line item.
    pub fn create(
        description: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<Self, ValidationError> {
        let item = Self::priced(None, description.into(), quantity, unit_price, None)?;
        item.validate()?;
        Ok(item)
    }

    /// Blank entry appended by "Add line item".
    ///
    /// Its zero price fails validation until the user fills it in.
    pub fn placeholder() -> Self {
        Self {
            id: None,
            description: String::new(),
            quantity: 1,
            unit_price: Decimal::ZERO,
            line_total: Decimal::ZERO,
        }
    }

    /// Rebuild a persisted item as returned by the server.
    ///
    /// The field rules are not checked: the server is the source of truth for
    /// what it stored. A missing line total is derived, which fails only when
    /// the product overflows.
    pub fn from_server(
        id: Option<LineItemId>,
        description: String,
        quantity: u32,
        unit_price: Decimal,
        line_total: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        Self::priced(id, description, quantity, unit_price, line_total)
    }

    fn priced(
        id: Option<LineItemId>,
        description: String,
        quantity: u32,
        unit_price: Decimal,
        line_total: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        let line_total = match line_total {
            Some(line_total) => line_total,
            None => money::line_total(quantity, unit_price)
                .ok_or(ValidationError::AmountOutOfRange { field: "line_total" })?,
        };
        Ok(Self {
            id,
            description,
            quantity,
            unit_price,
            line_total,
        })
    }

    /// Return a copy with `update` applied and the line total recomputed.
    ///
    /// Fails only when the new line total does not fit in a `Decimal`.
    pub fn update(&self, update: LineItemUpdate) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        match update {
            LineItemUpdate::Description(description) => {
                next.description = description;
                return Ok(next);
            }
            LineItemUpdate::Quantity(quantity) => next.quantity = quantity,
            LineItemUpdate::UnitPrice(unit_price) => next.unit_price = unit_price,
        }
        next.line_total = money::line_total(next.quantity, next.unit_price)
            .ok_or(ValidationError::AmountOutOfRange { field: "line_total" })?;
        Ok(next)
    }

    /// Check the submit-time invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "description",
            });
        }

        if self.quantity < 1 {
            return Err(ValidationError::QuantityBelowMinimum {
                quantity: self.quantity,
            });
        }

        if self.unit_price < money::min_unit_price() {
            return Err(ValidationError::UnitPriceBelowMinimum {
                unit_price: self.unit_price,
            });
        }

        if self.unit_price > money::max_unit_price() {
            return Err(ValidationError::UnitPriceAboveMaximum {
                unit_price: self.unit_price,
            });
        }

        if money::exceeds_currency_scale(self.unit_price) {
            return Err(ValidationError::UnitPricePrecision {
                unit_price: self.unit_price,
            });
        }

        Ok(())
    }

    pub fn id(&self) -> Option<LineItemId> {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn line_total(&self) -> Decimal {
        self.line_total
    }
}
