//! JSON shapes exchanged with the invoicing REST API.
//!
//! Money arrives either as a JSON string (`"10.00"`) or a number (`10.0`);
//! both decode into `Decimal`. Outgoing prices are sent as JSON numbers.

use crate::error::FetchError;
use crate::models::invoice::{Invoice, InvoiceId};
use crate::models::line_item::{LineItem, LineItemId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice as returned by `GET /invoices/{id}/`, `POST` and `PUT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub customer_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub details: Vec<DetailRecord>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

/// Line item ("detail") as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(default)]
    pub id: Option<LineItemId>,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub line_total: Option<Decimal>,
}

/// Body of `GET /invoices/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePage {
    pub count: u64,
    pub results: Vec<InvoiceRecord>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

/// Body of `POST /invoices/` and `PUT /invoices/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSubmission {
    pub invoice_number: String,
    pub customer_name: String,
    pub date: NaiveDate,
    pub details: Vec<DetailSubmission>,
}

/// One submitted line item. `id` is only sent for details the server already knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LineItemId>,
    pub description: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

/// Body of `POST /invoices/batch_delete/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<InvoiceId>,
}

impl TryFrom<DetailRecord> for LineItem {
    type Error = FetchError;

    fn try_from(record: DetailRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        LineItem::from_server(
            id,
            record.description,
            record.quantity,
            record.unit_price,
            record.line_total,
        )
        .map_err(|e| FetchError::Decode(format!("detail {id:?}: {e}")))
    }
}

impl TryFrom<InvoiceRecord> for Invoice {
    type Error = FetchError;

    fn try_from(record: InvoiceRecord) -> Result<Self, Self::Error> {
        let line_items = record
            .details
            .into_iter()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Invoice::from_server(
            record.id,
            record.invoice_number,
            record.customer_name,
            record.date,
            line_items,
            record.total_amount,
        ))
    }
}
