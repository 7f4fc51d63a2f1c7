//! invoicing-client: invoice data model, list queries and draft editing
//! against the invoicing REST API.

pub mod collection;
pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod observability;
pub mod query;
pub mod request;
pub mod services;

pub use collection::{InvoiceCollection, Reconciliation};
pub use crate::config::ClientConfig;
pub use editor::{DraftEditor, EditorMode, EditorState, SubmitOutcome, SubmitRequest, SubmitTarget};
pub use error::{FetchError, InvoiceError, ValidationError};
pub use models::{
    HeaderField, Invoice, InvoiceHeader, InvoiceId, InvoiceSubmission, LineItem, LineItemField,
    LineItemUpdate, TotalAmount,
};
pub use query::{
    resolve, InvoiceList, InvoiceQuery, ListState, PageControls, Pagination, PaymentFilter,
    PaymentStatus, PaymentStatusSource, ResultPage, SortDirection, SortKey,
};
pub use request::RequestTicket;
pub use services::{HttpInvoiceStore, InMemoryInvoiceStore, InvoiceStore};
