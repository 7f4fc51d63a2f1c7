//! Draft editor state machine.
//!
//! Owns one draft invoice, applies edits as pure transitions over it, and
//! reconciles the draft with the server's copy on submit:
//!
//! ```text
//! Loading ──load ok──▶ Editing ──submit──▶ Submitting ──ok──▶ Succeeded
//!    │                  ▲   ▲                   │
//!    └──load err──▶ Failed  └──edit / resume────┴──err──▶ Failed(draft kept)
//! ```
//!
//! Network calls are split into `begin_*` (issue a ticket) and `complete_*`
//! (apply the response) so a caller can drive the machine from any event
//! loop. Responses whose ticket is no longer pending are discarded.

mod state;

pub use state::{EditorMode, EditorState, SubmitOutcome, SubmitRequest, SubmitTarget};

use crate::collection::Reconciliation;
use crate::error::{FetchError, InvoiceError};
use crate::models::{HeaderField, Invoice, InvoiceId, LineItemField, LineItemUpdate};
use crate::request::{RequestTicket, RequestTracker};
use crate::services::metrics::{STALE_RESPONSES_TOTAL, VALIDATION_FAILURES_TOTAL};
use crate::services::store::InvoiceStore;
use tracing::{debug, info, warn};

/// Client-side controller for creating or editing one invoice.
#[derive(Debug)]
pub struct DraftEditor {
    mode: EditorMode,
    state: EditorState,
    draft: Option<Invoice>,
    tracker: RequestTracker,
}

impl DraftEditor {
    /// Start in `Editing` with a blank draft.
    pub fn new_create() -> Self {
        debug!("Draft editor opened for a new invoice");
        Self {
            mode: EditorMode::Create,
            state: EditorState::Editing,
            draft: Some(Invoice::draft()),
            tracker: RequestTracker::default(),
        }
    }

    /// Start in `Loading`; no draft exists until the invoice is fetched.
    pub fn new_edit(id: InvoiceId) -> Self {
        debug!(invoice_id = id, "Draft editor opened for an existing invoice");
        Self {
            mode: EditorMode::Edit(id),
            state: EditorState::Loading,
            draft: None,
            tracker: RequestTracker::default(),
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn draft(&self) -> Option<&Invoice> {
        self.draft.as_ref()
    }

    /// True while a load or submit response is awaited.
    pub fn in_flight(&self) -> bool {
        self.tracker.in_flight()
    }

    fn invalid(&self, action: &'static str) -> InvoiceError {
        InvoiceError::InvalidTransition {
            action,
            state: self.state.as_str(),
        }
    }

    fn transition(&mut self, next: EditorState) {
        debug!(
            from = self.state.as_str(),
            to = next.as_str(),
            "Draft editor transition"
        );
        self.state = next;
    }

    // -------------------------------------------------------------------------
    // Load
    // -------------------------------------------------------------------------

    /// Issue the fetch for edit mode. Also the retry after a failed load.
    pub fn begin_load(&mut self) -> Result<(RequestTicket, InvoiceId), InvoiceError> {
        let EditorMode::Edit(id) = self.mode else {
            return Err(self.invalid("load"));
        };

        let retryable = match self.state {
            EditorState::Loading => true,
            EditorState::Failed(_) => self.draft.is_none(),
            _ => false,
        };
        if !retryable {
            return Err(self.invalid("load"));
        }

        let ticket = self.tracker.issue();
        self.transition(EditorState::Loading);
        debug!(%ticket, invoice_id = id, "Loading invoice into editor");
        Ok((ticket, id))
    }

    /// Apply a fetch result. Returns `false` for a stale response.
    pub fn complete_load(
        &mut self,
        ticket: RequestTicket,
        result: Result<Invoice, FetchError>,
    ) -> bool {
        if !self.tracker.settle(ticket) {
            STALE_RESPONSES_TOTAL.inc();
            debug!(%ticket, "Discarding stale load response");
            return false;
        }

        match result {
            Ok(invoice) => {
                self.draft = Some(invoice);
                self.transition(EditorState::Editing);
            }
            Err(e) => {
                warn!(%ticket, error = %e, "Failed to load invoice");
                self.draft = None;
                self.transition(EditorState::Failed(e));
            }
        }
        true
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    fn edit<F>(&mut self, action: &'static str, apply: F) -> Result<&Invoice, InvoiceError>
    where
        F: FnOnce(&Invoice) -> Result<Invoice, InvoiceError>,
    {
        let editable = matches!(
            self.state,
            EditorState::Editing | EditorState::Failed(_)
        );
        let current = match (&self.draft, editable) {
            (Some(draft), true) => draft,
            _ => return Err(self.invalid(action)),
        };

        let next = apply(current)?;
        debug!(action, total = %next.total_amount(), "Draft edited");
        self.draft = Some(next);
        if !matches!(self.state, EditorState::Editing) {
            self.transition(EditorState::Editing);
        }

        self.draft.as_ref().ok_or_else(|| self.invalid(action))
    }

    /// Set a header field from raw form input.
    pub fn set_header_field(
        &mut self,
        field: HeaderField,
        raw: &str,
    ) -> Result<&Invoice, InvoiceError> {
        self.edit("edit header", |draft| {
            draft.with_header_field(field, raw).map_err(InvoiceError::from)
        })
    }

    /// Apply a typed line item edit at `index`.
    pub fn update_line_item(
        &mut self,
        index: usize,
        update: LineItemUpdate,
    ) -> Result<&Invoice, InvoiceError> {
        self.edit("edit line item", |draft| draft.with_line_item(index, update))
    }

    /// Set a line item field from raw form input; unparseable input leaves the draft unchanged.
    pub fn set_line_item_field(
        &mut self,
        index: usize,
        field: LineItemField,
        raw: &str,
    ) -> Result<&Invoice, InvoiceError> {
        self.edit("edit line item", |draft| {
            let update = LineItemUpdate::parse(field, raw)?;
            draft.with_line_item(index, update)
        })
    }

    pub fn append_line_item(&mut self) -> Result<&Invoice, InvoiceError> {
        self.edit("append line item", Invoice::append_line_item)
    }

    pub fn remove_line_item(&mut self, index: usize) -> Result<&Invoice, InvoiceError> {
        self.edit("remove line item", |draft| draft.remove_line_item(index))
    }

    /// Leave `Failed` for `Editing` without changing the draft.
    pub fn resume_editing(&mut self) -> Result<(), InvoiceError> {
        match (&self.state, &self.draft) {
            (EditorState::Failed(_), Some(_)) => {
                self.transition(EditorState::Editing);
                Ok(())
            }
            _ => Err(self.invalid("resume editing")),
        }
    }

    // -------------------------------------------------------------------------
    // Submit
    // -------------------------------------------------------------------------

    /// Validate the draft and, if it is valid, enter `Submitting`.
    ///
    /// An invalid draft leaves the editor in `Editing` and nothing is sent.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, InvoiceError> {
        let submittable = matches!(
            self.state,
            EditorState::Editing | EditorState::Failed(_)
        );
        let draft = match (&self.draft, submittable) {
            (Some(draft), true) => draft,
            _ => return Err(self.invalid("submit")),
        };

        let payload = match draft.to_submission() {
            Ok(payload) => payload,
            Err(e) => {
                VALIDATION_FAILURES_TOTAL
                    .with_label_values(&[e.reason()])
                    .inc();
                debug!(error = %e, "Draft rejected by validation");
                if !matches!(self.state, EditorState::Editing) {
                    self.transition(EditorState::Editing);
                }
                return Err(InvoiceError::Validation(e));
            }
        };

        let ticket = self.tracker.issue();
        let target = SubmitTarget::from(self.mode);
        self.transition(EditorState::Submitting);
        info!(
            %ticket,
            target = ?target,
            invoice_number = %payload.invoice_number,
            "Submitting invoice"
        );

        Ok(SubmitRequest {
            ticket,
            target,
            payload,
        })
    }

    /// Apply a submit response.
    ///
    /// On success the server's invoice replaces the draft wholesale and is
    /// returned for reconciliation into the caller's collection.
    pub fn complete_submit(
        &mut self,
        ticket: RequestTicket,
        result: Result<Invoice, FetchError>,
    ) -> SubmitOutcome {
        if !self.tracker.settle(ticket) {
            STALE_RESPONSES_TOTAL.inc();
            debug!(%ticket, "Discarding stale submit response");
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(invoice) => {
                let reconciliation = match self.mode {
                    EditorMode::Create => Reconciliation::Created(invoice.clone()),
                    EditorMode::Edit(_) => Reconciliation::Updated(invoice.clone()),
                };
                info!(
                    %ticket,
                    invoice_id = ?invoice.id(),
                    total = %invoice.total_amount(),
                    "Invoice confirmed by server"
                );
                self.draft = Some(invoice);
                self.transition(EditorState::Succeeded);
                SubmitOutcome::Reconciled(reconciliation)
            }
            Err(e) => {
                warn!(%ticket, error = %e, "Invoice submit failed");
                self.transition(EditorState::Failed(e.clone()));
                SubmitOutcome::Rejected(e)
            }
        }
    }

    /// Stop waiting for the in-flight request; its response will be discarded.
    ///
    /// An abandoned submit returns to `Editing` with the draft unchanged.
    pub fn abandon(&mut self) -> Option<RequestTicket> {
        let ticket = self.tracker.abandon()?;
        debug!(%ticket, "Draft editor request abandoned");
        if matches!(self.state, EditorState::Submitting) {
            self.transition(EditorState::Editing);
        }
        Some(ticket)
    }

    // -------------------------------------------------------------------------
    // Store-driven helpers
    // -------------------------------------------------------------------------

    /// Fetch the invoice being edited from `store`.
    pub async fn load<S>(&mut self, store: &S) -> Result<&Invoice, InvoiceError>
    where
        S: InvoiceStore + ?Sized,
    {
        let (ticket, id) = self.begin_load()?;
        let result = store.get(id).await;
        self.complete_load(ticket, result);

        match (&self.state, &self.draft) {
            (EditorState::Failed(e), _) => Err(InvoiceError::Fetch(e.clone())),
            (_, Some(draft)) => Ok(draft),
            _ => Err(self.invalid("load")),
        }
    }

    /// Validate, send and apply one submit against `store`.
    pub async fn submit<S>(&mut self, store: &S) -> Result<Reconciliation, InvoiceError>
    where
        S: InvoiceStore + ?Sized,
    {
        let request = self.begin_submit()?;
        let result = match request.target {
            SubmitTarget::Create => store.create(&request.payload).await,
            SubmitTarget::Update(id) => store.update(id, &request.payload).await,
        };

        match self.complete_submit(request.ticket, result) {
            SubmitOutcome::Reconciled(reconciliation) => Ok(reconciliation),
            SubmitOutcome::Rejected(e) => Err(InvoiceError::Fetch(e)),
            SubmitOutcome::Discarded => Err(InvoiceError::Superseded { action: "submit" }),
        }
    }
}
