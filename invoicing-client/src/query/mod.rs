//! Invoice list queries: search, sort, payment filter and pagination.
//!
//! `resolve` is the reference algorithm for answering a query over a
//! snapshot of invoices. It is pure and deterministic: the same collection
//! and query always produce the same page.

pub mod list;

use crate::error::ValidationError;
use crate::models::{Invoice, InvoiceId};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub use list::{InvoiceList, ListState};

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest page the server hands out.
pub const MAX_PAGE_SIZE: u64 = 50;

/// Sort key for invoice listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Date,
    TotalAmount,
    CustomerName,
    InvoiceNumber,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::TotalAmount => "total_amount",
            SortKey::CustomerName => "customer_name",
            SortKey::InvoiceNumber => "invoice_number",
        }
    }

    fn compare(&self, a: &Invoice, b: &Invoice) -> Ordering {
        match self {
            SortKey::Date => a.date().cmp(&b.date()),
            SortKey::TotalAmount => a.total_amount().value().cmp(&b.total_amount().value()),
            SortKey::CustomerName => a.customer_name().cmp(b.customer_name()),
            SortKey::InvoiceNumber => a.invoice_number().cmp(b.invoice_number()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Payment-status filter. Paid/unpaid is owned by the persistence
/// collaborator; the invoice model carries no such field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl PaymentFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFilter::All => "all",
            PaymentFilter::Paid => "paid",
            PaymentFilter::Unpaid => "unpaid",
        }
    }

    fn admits<S>(&self, statuses: &S, invoice: &Invoice) -> bool
    where
        S: PaymentStatusSource + ?Sized,
    {
        match self {
            PaymentFilter::All => true,
            PaymentFilter::Paid => statuses.payment_status(invoice) == PaymentStatus::Paid,
            PaymentFilter::Unpaid => statuses.payment_status(invoice) == PaymentStatus::Unpaid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

/// Supplies the externally-defined payment status of an invoice.
pub trait PaymentStatusSource {
    fn payment_status(&self, invoice: &Invoice) -> PaymentStatus;
}

/// Known statuses by invoice id; anything missing counts as unpaid.
impl PaymentStatusSource for BTreeMap<InvoiceId, PaymentStatus> {
    fn payment_status(&self, invoice: &Invoice) -> PaymentStatus {
        invoice
            .id()
            .and_then(|id| self.get(&id).copied())
            .unwrap_or(PaymentStatus::Unpaid)
    }
}

/// Offset/limit window over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    offset: u64,
    limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(offset: u64, limit: u64) -> Result<Self, ValidationError> {
        if limit == 0 {
            return Err(ValidationError::InvalidNumber {
                field: "limit",
                value: limit.to_string(),
            });
        }
        Ok(Self { offset, limit })
    }

    /// Build a window with `limit` forced into `1..=max_limit`.
    pub fn clamped(offset: u64, limit: u64, max_limit: u64) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, max_limit.max(1)),
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            offset: self.offset.saturating_sub(self.limit),
            limit: self.limit,
        }
    }

    pub fn first(&self) -> Self {
        Self {
            offset: 0,
            limit: self.limit,
        }
    }
}

/// Search + sort + filter + pagination parameters for listing invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub search: String,
    pub sort: SortKey,
    pub direction: SortDirection,
    pub filter: PaymentFilter,
    pub pagination: Pagination,
}

impl InvoiceQuery {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: SortKey, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    pub fn with_filter(mut self, filter: PaymentFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Lowercased search terms; empty when there is nothing to match.
    pub fn search_terms(&self) -> Vec<String> {
        self.search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    /// Wire value for `sort`, with a `-` prefix for descending.
    pub fn sort_param(&self) -> String {
        match self.direction {
            SortDirection::Ascending => self.sort.as_str().to_string(),
            SortDirection::Descending => format!("-{}", self.sort.as_str()),
        }
    }

    /// Query-string parameters for `GET /invoices/`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("offset", self.pagination.offset.to_string()),
            ("limit", self.pagination.limit.to_string()),
            ("search", self.search.trim().to_string()),
            ("sort", self.sort_param()),
            ("filter", self.filter.as_str().to_string()),
        ]
    }

    fn matches_search(terms: &[String], invoice: &Invoice) -> bool {
        let number = invoice.invoice_number().to_lowercase();
        let customer = invoice.customer_name().to_lowercase();
        terms
            .iter()
            .all(|term| number.contains(term.as_str()) || customer.contains(term.as_str()))
    }
}

/// One page of a listing plus the size of the whole filtered set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub items: Vec<Invoice>,
    pub total_count: u64,
}

/// Derived navigation state for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControls {
    /// 1-based page number.
    pub page_index: u64,
    pub page_count: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageControls {
    pub fn new(pagination: Pagination, total_count: u64) -> Self {
        let Pagination { offset, limit } = pagination;
        Self {
            page_index: offset / limit + 1,
            page_count: total_count.div_ceil(limit),
            has_previous: offset > 0,
            has_next: offset.saturating_add(limit) < total_count,
        }
    }
}

/// Answer `query` over `collection`.
///
/// Filters by payment status then search text, sorts by the query's key
/// (ties broken by ascending id), counts, and finally slices the window.
/// An offset past the end yields an empty page, not an error.
pub fn resolve<S>(collection: &[Invoice], query: &InvoiceQuery, statuses: &S) -> ResultPage
where
    S: PaymentStatusSource + ?Sized,
{
    let terms = query.search_terms();

    let mut matched: Vec<&Invoice> = collection
        .iter()
        .filter(|invoice| query.filter.admits(statuses, invoice))
        .filter(|invoice| InvoiceQuery::matches_search(&terms, invoice))
        .collect();

    matched.sort_by(|a, b| {
        let by_key = query.sort.compare(a, b);
        let by_key = match query.direction {
            SortDirection::Ascending => by_key,
            SortDirection::Descending => by_key.reverse(),
        };
        by_key.then_with(|| a.id().cmp(&b.id()))
    });

    let total_count = matched.len() as u64;
    let offset = usize::try_from(query.pagination.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(query.pagination.limit).unwrap_or(usize::MAX);

    let items = matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    ResultPage { items, total_count }
}
