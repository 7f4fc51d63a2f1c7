//! Invoice model for invoicing-client.

use crate::error::{InvoiceError, ValidationError};
use crate::models::line_item::{LineItem, LineItemUpdate};
use crate::models::money;
use crate::models::wire::{DetailSubmission, InvoiceSubmission};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

/// Server-assigned invoice identifier.
pub type InvoiceId = i64;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Invoice total, tagged with who computed it.
///
/// A client-computed sum is only a preview; callers must not treat it as the
/// persisted amount until the server has confirmed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalAmount {
    /// The server sent no total.
    Unknown,
    /// Computed locally from the current line items.
    Unconfirmed(Decimal),
    /// Returned by the server after create/update.
    Confirmed(Decimal),
}

impl TotalAmount {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            TotalAmount::Unknown => None,
            TotalAmount::Unconfirmed(amount) | TotalAmount::Confirmed(amount) => Some(*amount),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, TotalAmount::Confirmed(_))
    }
}

impl fmt::Display for TotalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalAmount::Unknown => write!(f, "calculating..."),
            TotalAmount::Unconfirmed(amount) => {
                write!(f, "{} (calculating...)", money::format_currency(*amount))
            }
            TotalAmount::Confirmed(amount) => write!(f, "{}", money::format_currency(*amount)),
        }
    }
}

/// Raw header input, as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceHeader {
    pub invoice_number: String,
    pub customer_name: String,
    pub date: String,
}

/// Editable header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    InvoiceNumber,
    CustomerName,
    Date,
}

impl HeaderField {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderField::InvoiceNumber => "invoice_number",
            HeaderField::CustomerName => "customer_name",
            HeaderField::Date => "date",
        }
    }
}

/// Invoice document: header fields plus an ordered list of line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: Option<InvoiceId>,
    invoice_number: String,
    customer_name: String,
    date: Option<NaiveDate>,
    line_items: Vec<LineItem>,
    total_amount: TotalAmount,
}

impl Default for Invoice {
    fn default() -> Self {
        Self::draft()
    }
}

impl Invoice {
    /// Create a validated, unsaved invoice with a provisional total.
    pub fn create(
        header: InvoiceHeader,
        line_items: Vec<LineItem>,
    ) -> Result<Self, ValidationError> {
        let date = parse_date(&header.date)?;
        let invoice = Self {
            id: None,
            invoice_number: header.invoice_number,
            customer_name: header.customer_name,
            date,
            line_items,
            total_amount: TotalAmount::Unknown,
        }
        .recomputed()?;
        invoice.validate()?;
        Ok(invoice)
    }

    /// Fresh draft for create mode: empty header and one blank line item.
    pub fn draft() -> Self {
        Self {
            id: None,
            invoice_number: String::new(),
            customer_name: String::new(),
            date: None,
            line_items: vec![LineItem::placeholder()],
            total_amount: TotalAmount::Unconfirmed(Decimal::ZERO),
        }
    }

    /// Rebuild an invoice as persisted by the server.
    pub fn from_server(
        id: InvoiceId,
        invoice_number: String,
        customer_name: String,
        date: NaiveDate,
        line_items: Vec<LineItem>,
        total_amount: Option<Decimal>,
    ) -> Self {
        Self {
            id: Some(id),
            invoice_number,
            customer_name,
            date: Some(date),
            line_items,
            total_amount: total_amount
                .map(TotalAmount::Confirmed)
                .unwrap_or(TotalAmount::Unknown),
        }
    }

    /// Return a copy with one header field replaced and the total recomputed.
    ///
    /// `Date` input is parsed as `YYYY-MM-DD`; empty input clears the date.
    pub fn with_header_field(
        &self,
        field: HeaderField,
        raw: &str,
    ) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        match field {
            HeaderField::InvoiceNumber => next.invoice_number = raw.to_string(),
            HeaderField::CustomerName => next.customer_name = raw.to_string(),
            HeaderField::Date => next.date = parse_date(raw)?,
        }
        next.recomputed()
    }

    /// Apply a line item edit at `index` and recompute the total.
    pub fn with_line_item(
        &self,
        index: usize,
        update: LineItemUpdate,
    ) -> Result<Self, InvoiceError> {
        let len = self.line_items.len();
        let item = self
            .line_items
            .get(index)
            .ok_or(InvoiceError::IndexOutOfRange { index, len })?;

        let mut next = self.clone();
        next.line_items[index] = item.update(update)?;
        Ok(next.recomputed()?)
    }

    /// Append a blank line item.
    pub fn append_line_item(&self) -> Result<Self, InvoiceError> {
        let mut next = self.clone();
        next.line_items.push(LineItem::placeholder());
        Ok(next.recomputed()?)
    }

    /// Remove the line item at `index`.
    ///
    /// Removing the last item is allowed here; submit rejects the empty invoice.
    pub fn remove_line_item(&self, index: usize) -> Result<Self, InvoiceError> {
        let len = self.line_items.len();
        if index >= len {
            return Err(InvoiceError::IndexOutOfRange { index, len });
        }

        let mut next = self.clone();
        next.line_items.remove(index);
        Ok(next.recomputed()?)
    }

    /// Check every submit-time invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.invoice_number.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: HeaderField::InvoiceNumber.as_str(),
            });
        }

        if self.customer_name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: HeaderField::CustomerName.as_str(),
            });
        }

        if self.date.is_none() {
            return Err(ValidationError::EmptyField {
                field: HeaderField::Date.as_str(),
            });
        }

        if self.line_items.is_empty() {
            return Err(ValidationError::NoLineItems);
        }

        for (index, item) in self.line_items.iter().enumerate() {
            item.validate().map_err(|source| ValidationError::LineItem {
                index,
                source: Box::new(source),
            })?;
        }

        self.computed_total()?;
        Ok(())
    }

    /// Validate and strip derived fields, producing the create/update body.
    pub fn to_submission(&self) -> Result<InvoiceSubmission, ValidationError> {
        self.validate()?;

        let date = self.date.ok_or(ValidationError::EmptyField {
            field: HeaderField::Date.as_str(),
        })?;

        Ok(InvoiceSubmission {
            invoice_number: self.invoice_number.trim().to_string(),
            customer_name: self.customer_name.trim().to_string(),
            date,
            details: self
                .line_items
                .iter()
                .map(|item| DetailSubmission {
                    id: item.id(),
                    description: item.description().trim().to_string(),
                    quantity: item.quantity(),
                    unit_price: item.unit_price(),
                })
                .collect(),
        })
    }

    /// Sum of the current line totals.
    pub fn computed_total(&self) -> Result<Decimal, ValidationError> {
        money::checked_sum(self.line_items.iter().map(LineItem::line_total))
            .ok_or(ValidationError::AmountOutOfRange {
                field: "total_amount",
            })
    }

    fn recomputed(mut self) -> Result<Self, ValidationError> {
        self.total_amount = TotalAmount::Unconfirmed(self.computed_total()?);
        Ok(self)
    }

    pub fn id(&self) -> Option<InvoiceId> {
        self.id
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn total_amount(&self) -> TotalAmount {
        self.total_amount
    }
}

fn parse_date(raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate {
            value: raw.to_string(),
        })
}
