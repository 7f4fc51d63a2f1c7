//! Client-owned invoice collection and the reconciliation injection point.

use crate::models::{Invoice, InvoiceId};
use crate::query::{resolve, InvoiceQuery, PaymentStatusSource, ResultPage};
use tracing::debug;

/// A server-confirmed invoice to inject into the caller's collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// New invoice; goes to the front.
    Created(Invoice),
    /// Existing invoice; replaces the entry with the same id.
    Updated(Invoice),
}

impl Reconciliation {
    pub fn invoice(&self) -> &Invoice {
        match self {
            Reconciliation::Created(invoice) | Reconciliation::Updated(invoice) => invoice,
        }
    }

    /// Apply to `items`, leaving every other entry untouched.
    ///
    /// Returns `false` when an update matches no entry.
    pub fn apply_to(&self, items: &mut Vec<Invoice>) -> bool {
        match self {
            Reconciliation::Created(invoice) => {
                items.insert(0, invoice.clone());
                true
            }
            Reconciliation::Updated(invoice) => {
                let slot = items
                    .iter_mut()
                    .find(|existing| existing.id().is_some() && existing.id() == invoice.id());
                match slot {
                    Some(existing) => {
                        *existing = invoice.clone();
                        true
                    }
                    None => false,
                }
            }
        }
    }
}

/// Ordered invoices held by the list surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceCollection {
    invoices: Vec<Invoice>,
}

impl InvoiceCollection {
    pub fn new(invoices: Vec<Invoice>) -> Self {
        Self { invoices }
    }

    /// Inject a confirmed invoice: prepend on create, replace by id on update.
    pub fn reconcile(&mut self, reconciliation: &Reconciliation) -> bool {
        let applied = reconciliation.apply_to(&mut self.invoices);
        debug!(
            invoice_id = ?reconciliation.invoice().id(),
            applied,
            "Reconciled invoice into collection"
        );
        applied
    }

    /// Drop a deleted invoice. Returns whether it was present.
    pub fn remove(&mut self, id: InvoiceId) -> bool {
        let before = self.invoices.len();
        self.invoices.retain(|invoice| invoice.id() != Some(id));
        self.invoices.len() != before
    }

    pub fn get(&self, id: InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.id() == Some(id))
    }

    /// Resolve `query` over a snapshot of the collection.
    pub fn resolve<S>(&self, query: &InvoiceQuery, statuses: &S) -> ResultPage
    where
        S: PaymentStatusSource + ?Sized,
    {
        resolve(&self.invoices, query, statuses)
    }

    pub fn as_slice(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}

impl From<Vec<Invoice>> for InvoiceCollection {
    fn from(invoices: Vec<Invoice>) -> Self {
        Self::new(invoices)
    }
}
