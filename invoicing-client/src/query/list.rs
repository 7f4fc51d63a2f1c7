//! Invoice list controller.

use crate::collection::Reconciliation;
use crate::error::FetchError;
use crate::models::InvoiceId;
use crate::query::{
    InvoiceQuery, PageControls, Pagination, PaymentFilter, ResultPage, SortDirection, SortKey,
};
use crate::request::{RequestTicket, RequestTracker};
use crate::services::metrics::STALE_RESPONSES_TOTAL;
use crate::services::store::InvoiceStore;
use tracing::{debug, info, warn};

/// Fetch state of the list surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Loaded(ResultPage),
    Failed(FetchError),
}

impl ListState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListState::Idle => "idle",
            ListState::Loading => "loading",
            ListState::Loaded(_) => "loaded",
            ListState::Failed(_) => "failed",
        }
    }
}

/// Owns the current query and the last page fetched for it.
#[derive(Debug, Default)]
pub struct InvoiceList {
    query: InvoiceQuery,
    state: ListState,
    tracker: RequestTracker,
}

impl InvoiceList {
    pub fn new(query: InvoiceQuery) -> Self {
        Self {
            query,
            state: ListState::Idle,
            tracker: RequestTracker::default(),
        }
    }

    pub fn query(&self) -> &InvoiceQuery {
        &self.query
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn page(&self) -> Option<&ResultPage> {
        match &self.state {
            ListState::Loaded(page) => Some(page),
            _ => None,
        }
    }

    /// Navigation state for the loaded page.
    pub fn controls(&self) -> Option<PageControls> {
        self.page()
            .map(|page| PageControls::new(self.query.pagination, page.total_count))
    }

    /// Change the search text and go back to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.query.pagination = self.query.pagination.first();
    }

    /// Change the payment filter and go back to the first page.
    pub fn set_filter(&mut self, filter: PaymentFilter) {
        self.query.filter = filter;
        self.query.pagination = self.query.pagination.first();
    }

    /// Change the ordering and go back to the first page.
    pub fn set_sort(&mut self, sort: SortKey, direction: SortDirection) {
        self.query.sort = sort;
        self.query.direction = direction;
        self.query.pagination = self.query.pagination.first();
    }

    pub fn set_pagination(&mut self, pagination: Pagination) {
        self.query.pagination = pagination;
    }

    /// Step forward one page. Returns `false` when the loaded page is the last.
    pub fn next_page(&mut self) -> bool {
        match self.controls() {
            Some(controls) if controls.has_next => {
                self.query.pagination = self.query.pagination.next();
                true
            }
            _ => false,
        }
    }

    /// Step back one page. Returns `false` when already at offset 0.
    pub fn previous_page(&mut self) -> bool {
        if self.query.pagination.offset() == 0 {
            return false;
        }
        self.query.pagination = self.query.pagination.previous();
        true
    }

    /// Start a fetch for the current query, superseding any in flight.
    pub fn begin_fetch(&mut self) -> (RequestTicket, InvoiceQuery) {
        let ticket = self.tracker.issue();
        self.state = ListState::Loading;
        debug!(%ticket, "Invoice list fetch started");
        (ticket, self.query.clone())
    }

    /// Apply a fetch result. Responses for superseded tickets are dropped.
    pub fn complete_fetch(
        &mut self,
        ticket: RequestTicket,
        result: Result<ResultPage, FetchError>,
    ) -> bool {
        if !self.tracker.settle(ticket) {
            STALE_RESPONSES_TOTAL.inc();
            debug!(%ticket, "Discarding stale invoice list response");
            return false;
        }

        self.state = match result {
            Ok(page) => {
                debug!(
                    %ticket,
                    total_count = page.total_count,
                    returned = page.items.len(),
                    "Invoice list loaded"
                );
                ListState::Loaded(page)
            }
            Err(e) => {
                warn!(%ticket, error = %e, "Invoice list fetch failed");
                ListState::Failed(e)
            }
        };
        true
    }

    /// Drop the in-flight fetch, if any; its response will be discarded.
    pub fn abandon(&mut self) {
        if let Some(ticket) = self.tracker.abandon() {
            debug!(%ticket, "Invoice list fetch abandoned");
            if matches!(self.state, ListState::Loading) {
                self.state = ListState::Idle;
            }
        }
    }

    /// Fetch the current query from `store`.
    pub async fn refresh<S>(&mut self, store: &S) -> Result<(), FetchError>
    where
        S: InvoiceStore + ?Sized,
    {
        let (ticket, query) = self.begin_fetch();
        let result = store.list(&query).await;
        self.complete_fetch(ticket, result);

        match &self.state {
            ListState::Failed(e) => Err(e.clone()),
            _ => Ok(()),
        }
    }

    /// Inject a confirmed invoice into the loaded page.
    ///
    /// A created invoice is prepended and counted; the page keeps at most
    /// `limit` items. Returns `false` when nothing was loaded or an update
    /// matched no entry on this page.
    pub fn reconcile(&mut self, reconciliation: &Reconciliation) -> bool {
        let limit = usize::try_from(self.query.pagination.limit()).unwrap_or(usize::MAX);
        let ListState::Loaded(page) = &mut self.state else {
            return false;
        };

        let applied = reconciliation.apply_to(&mut page.items);
        if applied {
            if let Reconciliation::Created(_) = reconciliation {
                page.total_count += 1;
                page.items.truncate(limit);
            }
            info!(
                invoice_id = ?reconciliation.invoice().id(),
                total_count = page.total_count,
                "Reconciled invoice into list"
            );
        }
        applied
    }

    /// Drop a deleted invoice from the loaded page.
    pub fn remove(&mut self, id: InvoiceId) -> bool {
        let ListState::Loaded(page) = &mut self.state else {
            return false;
        };

        let before = page.items.len();
        page.items.retain(|invoice| invoice.id() != Some(id));
        let removed = page.items.len() != before;
        if removed {
            page.total_count = page.total_count.saturating_sub(1);
        }
        removed
    }
}
