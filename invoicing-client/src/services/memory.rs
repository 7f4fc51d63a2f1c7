//! In-memory persistence collaborator.
//!
//! Answers list queries by resolving over a snapshot of its invoices, assigns
//! ids, and computes authoritative totals the way the server does. Payment
//! status is held beside the invoices, never on them.

use crate::error::FetchError;
use crate::models::{money, Invoice, InvoiceId, InvoiceSubmission, LineItem, LineItemId};
use crate::query::{resolve, InvoiceQuery, PaymentStatus, ResultPage};
use crate::services::metrics::record_request;
use crate::services::store::InvoiceStore;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

#[derive(Debug, Default)]
struct StoreState {
    invoices: Vec<Invoice>,
    statuses: BTreeMap<InvoiceId, PaymentStatus>,
    last_invoice_id: InvoiceId,
    last_detail_id: LineItemId,
}

impl StoreState {
    fn position(&self, id: InvoiceId) -> Option<usize> {
        self.invoices
            .iter()
            .position(|invoice| invoice.id() == Some(id))
    }

    fn ensure_unique_number(
        &self,
        invoice_number: &str,
        except: Option<InvoiceId>,
    ) -> Result<(), FetchError> {
        let taken = self.invoices.iter().any(|invoice| {
            invoice.invoice_number() == invoice_number && invoice.id() != except
        });
        if taken {
            return Err(FetchError::bad_request(
                "invoice_number: Invoice number must be unique.",
            ));
        }
        Ok(())
    }

    /// Build the persisted invoice: known detail ids are kept, new details get fresh ids.
    fn persist(
        &mut self,
        id: InvoiceId,
        submission: &InvoiceSubmission,
        known_details: &[LineItemId],
    ) -> Result<Invoice, FetchError> {
        if submission.details.is_empty() {
            return Err(FetchError::bad_request(
                "At least one detail is required for an invoice.",
            ));
        }

        let mut line_items = Vec::with_capacity(submission.details.len());
        for detail in &submission.details {
            let detail_id = match detail.id {
                Some(detail_id) if known_details.contains(&detail_id) => detail_id,
                Some(detail_id) => {
                    return Err(FetchError::bad_request(format!(
                        "details: Invalid detail id {detail_id}."
                    )))
                }
                None => {
                    self.last_detail_id += 1;
                    self.last_detail_id
                }
            };

            if detail.unit_price > money::max_unit_price() {
                return Err(FetchError::bad_request(
                    "details: Ensure that there are no more than 10 digits in total.",
                ));
            }

            let item = LineItem::from_server(
                Some(detail_id),
                detail.description.clone(),
                detail.quantity,
                detail.unit_price,
                None,
            )
            .map_err(|e| FetchError::bad_request(format!("details: {e}")))?;
            line_items.push(item);
        }

        let total = money::checked_sum(line_items.iter().map(LineItem::line_total))
            .ok_or_else(|| FetchError::bad_request("total_amount is too large to compute"))?;

        Ok(Invoice::from_server(
            id,
            submission.invoice_number.clone(),
            submission.customer_name.clone(),
            submission.date,
            line_items,
            Some(total),
        ))
    }
}

/// Persistence collaborator backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    state: Mutex<StoreState>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the payment status the list filter should see for `id`.
    pub async fn set_payment_status(&self, id: InvoiceId, status: PaymentStatus) {
        let mut state = self.state.lock().await;
        state.statuses.insert(id, status);
    }

    /// Current contents, in insertion order.
    pub async fn snapshot(&self) -> Vec<Invoice> {
        self.state.lock().await.invoices.clone()
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    #[instrument(skip(self, query))]
    async fn list(&self, query: &InvoiceQuery) -> Result<ResultPage, FetchError> {
        let state = self.state.lock().await;
        let page = resolve(&state.invoices, query, &state.statuses);

        debug!(
            total_count = page.total_count,
            returned = page.items.len(),
            "Resolved invoice query"
        );
        let result = Ok(page);
        record_request("list", &result);
        result
    }

    #[instrument(skip(self))]
    async fn get(&self, id: InvoiceId) -> Result<Invoice, FetchError> {
        let state = self.state.lock().await;
        let result = state
            .position(id)
            .map(|index| state.invoices[index].clone())
            .ok_or_else(FetchError::not_found);
        record_request("get", &result);
        result
    }

    #[instrument(skip(self, submission), fields(invoice_number = %submission.invoice_number))]
    async fn create(&self, submission: &InvoiceSubmission) -> Result<Invoice, FetchError> {
        let mut state = self.state.lock().await;

        let result = state
            .ensure_unique_number(&submission.invoice_number, None)
            .and_then(|_| {
                let id = state.last_invoice_id + 1;
                let invoice = state.persist(id, submission, &[])?;
                state.last_invoice_id = id;
                state.invoices.push(invoice.clone());
                Ok(invoice)
            });

        if let Ok(invoice) = &result {
            info!(invoice_id = ?invoice.id(), "Invoice created");
        }
        record_request("create", &result);
        result
    }

    #[instrument(skip(self, submission), fields(invoice_number = %submission.invoice_number))]
    async fn update(
        &self,
        id: InvoiceId,
        submission: &InvoiceSubmission,
    ) -> Result<Invoice, FetchError> {
        let mut state = self.state.lock().await;

        let result = state
            .position(id)
            .ok_or_else(FetchError::not_found)
            .and_then(|index| {
                state.ensure_unique_number(&submission.invoice_number, Some(id))?;

                let known_details: Vec<LineItemId> = state.invoices[index]
                    .line_items()
                    .iter()
                    .filter_map(LineItem::id)
                    .collect();
                let invoice = state.persist(id, submission, &known_details)?;
                state.invoices[index] = invoice.clone();
                Ok(invoice)
            });

        if result.is_ok() {
            info!(invoice_id = id, "Invoice updated");
        }
        record_request("update", &result);
        result
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: InvoiceId) -> Result<(), FetchError> {
        let mut state = self.state.lock().await;

        let result = state
            .position(id)
            .ok_or_else(FetchError::not_found)
            .map(|index| {
                state.invoices.remove(index);
                state.statuses.remove(&id);
            });

        record_request("delete", &result);
        result
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn batch_delete(&self, ids: &[InvoiceId]) -> Result<(), FetchError> {
        if ids.is_empty() {
            return Err(FetchError::bad_request("No IDs provided."));
        }

        let mut state = self.state.lock().await;
        state
            .invoices
            .retain(|invoice| !invoice.id().is_some_and(|id| ids.contains(&id)));
        for id in ids {
            state.statuses.remove(id);
        }

        let result = Ok(());
        record_request("batch_delete", &result);
        result
    }
}
