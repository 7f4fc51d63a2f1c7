//! Domain models for invoicing-client.

mod invoice;
mod line_item;
pub mod money;
pub mod wire;

pub use invoice::{HeaderField, Invoice, InvoiceHeader, InvoiceId, TotalAmount};
pub use line_item::{LineItem, LineItemField, LineItemId, LineItemUpdate};
pub use wire::{DetailSubmission, InvoiceSubmission};
