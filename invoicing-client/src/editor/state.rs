//! Editor modes, states and submit messages.

use crate::collection::Reconciliation;
use crate::error::FetchError;
use crate::models::{InvoiceId, InvoiceSubmission};
use crate::request::RequestTicket;

/// Whether the editor creates a new invoice or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(InvoiceId),
}

/// Draft editor state.
///
/// `Loading` only occurs in edit mode. `Failed` keeps the draft when a submit
/// was rejected; after a failed load there is no draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Loading,
    Editing,
    Submitting,
    Succeeded,
    Failed(FetchError),
}

impl EditorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorState::Loading => "loading",
            EditorState::Editing => "editing",
            EditorState::Submitting => "submitting",
            EditorState::Succeeded => "succeeded",
            EditorState::Failed(_) => "failed",
        }
    }
}

/// Which collaborator call a submit maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    /// `POST /invoices/`
    Create,
    /// `PUT /invoices/{id}/`
    Update(InvoiceId),
}

impl From<EditorMode> for SubmitTarget {
    fn from(mode: EditorMode) -> Self {
        match mode {
            EditorMode::Create => SubmitTarget::Create,
            EditorMode::Edit(id) => SubmitTarget::Update(id),
        }
    }
}

/// Everything needed to send one submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub ticket: RequestTicket,
    pub target: SubmitTarget,
    pub payload: InvoiceSubmission,
}

/// Result of feeding a submit response back into the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server confirmed the invoice; inject it into the caller's collection.
    Reconciled(Reconciliation),
    /// The server or transport rejected the submit; the draft is kept.
    Rejected(FetchError),
    /// The response belonged to an abandoned or superseded request.
    Discarded,
}
