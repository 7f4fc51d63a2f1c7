//! Persistence collaborators and client metrics.

pub mod http;
pub mod memory;
pub mod metrics;
pub mod store;

pub use http::HttpInvoiceStore;
pub use memory::InMemoryInvoiceStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::InvoiceStore;
