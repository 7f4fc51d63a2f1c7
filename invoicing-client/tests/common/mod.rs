#![allow(dead_code)]

use chrono::NaiveDate;
use invoicing_client::models::wire::{DetailRecord, InvoiceRecord};
use invoicing_client::models::{DetailSubmission, InvoiceSubmission};
use invoicing_client::{
    HttpInvoiceStore, InMemoryInvoiceStore, Invoice, InvoiceHeader, InvoiceId, InvoiceStore,
    LineItem, PaymentStatus,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Once;
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Route library logs through the test harness's captured output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("Invalid decimal literal")
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("Invalid date literal")
}

pub fn header(invoice_number: &str, customer_name: &str, date: &str) -> InvoiceHeader {
    InvoiceHeader {
        invoice_number: invoice_number.to_string(),
        customer_name: customer_name.to_string(),
        date: date.to_string(),
    }
}

/// Persisted invoice with one line item whose total is `total`.
pub fn persisted(
    id: InvoiceId,
    invoice_number: &str,
    customer_name: &str,
    date_str: &str,
    total: &str,
) -> Invoice {
    let amount = dec(total);
    Invoice::from_server(
        id,
        invoice_number.to_string(),
        customer_name.to_string(),
        date(date_str),
        vec![LineItem::from_server(
            Some(id * 100),
            "Service".to_string(),
            1,
            amount,
            Some(amount),
        )
        .expect("Valid server item")],
        Some(amount),
    )
}

/// Twelve invoices dated 2024-01-01 through 2024-01-12, ids 1..=12.
pub fn twelve_invoices() -> Vec<Invoice> {
    (1..=12)
        .map(|n| {
            persisted(
                n,
                &format!("INV-{n:03}"),
                &format!("Customer {n}"),
                &format!("2024-01-{n:02}"),
                &format!("{}.00", n * 10),
            )
        })
        .collect()
}

pub fn submission(
    invoice_number: &str,
    customer_name: &str,
    details: &[(&str, u32, &str)],
) -> InvoiceSubmission {
    InvoiceSubmission {
        invoice_number: invoice_number.to_string(),
        customer_name: customer_name.to_string(),
        date: date("2024-01-01"),
        details: details
            .iter()
            .map(|(description, quantity, unit_price)| DetailSubmission {
                id: None,
                description: description.to_string(),
                quantity: *quantity,
                unit_price: dec(unit_price),
            })
            .collect(),
    }
}

/// Server JSON for an invoice, as `GET /invoices/{id}/` would return it.
pub fn record_json(
    id: InvoiceId,
    invoice_number: &str,
    customer_name: &str,
    total: &str,
) -> serde_json::Value {
    let record = InvoiceRecord {
        id,
        invoice_number: invoice_number.to_string(),
        customer_name: customer_name.to_string(),
        date: date("2024-01-01"),
        details: vec![DetailRecord {
            id: Some(id * 100),
            description: "Widget".to_string(),
            quantity: 2,
            unit_price: dec(total) / Decimal::TWO,
            line_total: Some(dec(total)),
        }],
        total_amount: Some(dec(total)),
    };
    serde_json::to_value(record).expect("Failed to encode invoice record")
}

/// In-memory store seeded through `create`, with the given paid invoice numbers.
pub async fn seeded_store(entries: &[(&str, &str)], paid: &[&str]) -> InMemoryInvoiceStore {
    let store = InMemoryInvoiceStore::new();
    for (invoice_number, customer_name) in entries {
        let invoice = store
            .create(&submission(invoice_number, customer_name, &[("Widget", 1, "10.00")]))
            .await
            .expect("Failed to seed invoice");
        if paid.contains(invoice_number) {
            let id = invoice.id().expect("Seeded invoice has no id");
            store.set_payment_status(id, PaymentStatus::Paid).await;
        }
    }
    store
}

/// A wiremock server plus an HTTP store pointed at it.
pub struct TestServer {
    pub server: MockServer,
    pub store: HttpInvoiceStore,
}

impl TestServer {
    pub async fn start() -> Self {
        init_tracing();
        let server = MockServer::start().await;
        let store = HttpInvoiceStore::with_client(reqwest::Client::new(), &server.uri());
        TestServer { server, store }
    }
}
