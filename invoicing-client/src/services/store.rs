//! Persistence collaborator interface.
//!
//! One interface serves every surface: the draft editor uses `get`,
//! `create` and `update`; the list uses `list` and the delete operations.

use crate::error::FetchError;
use crate::models::{Invoice, InvoiceId, InvoiceSubmission};
use crate::query::{InvoiceQuery, ResultPage};
use async_trait::async_trait;

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// `GET /invoices/?offset=&limit=&search=&sort=&filter=`
    async fn list(&self, query: &InvoiceQuery) -> Result<ResultPage, FetchError>;

    /// `GET /invoices/{id}/`
    async fn get(&self, id: InvoiceId) -> Result<Invoice, FetchError>;

    /// `POST /invoices/`; the returned invoice carries the authoritative totals.
    async fn create(&self, submission: &InvoiceSubmission) -> Result<Invoice, FetchError>;

    /// `PUT /invoices/{id}/`
    async fn update(
        &self,
        id: InvoiceId,
        submission: &InvoiceSubmission,
    ) -> Result<Invoice, FetchError>;

    /// `DELETE /invoices/{id}/`
    async fn delete(&self, id: InvoiceId) -> Result<(), FetchError>;

    /// `POST /invoices/batch_delete/`; an empty id list is a 400.
    async fn batch_delete(&self, ids: &[InvoiceId]) -> Result<(), FetchError>;
}
