//! REST client for the invoicing API.
//!
//! Talks JSON over HTTP to `/invoices/`. Every non-2xx response becomes a
//! `FetchError::Status` carrying the server's error body flattened to text.

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::models::wire::{BatchDeleteRequest, InvoicePage, InvoiceRecord};
use crate::models::{Invoice, InvoiceId, InvoiceSubmission};
use crate::query::{InvoiceQuery, ResultPage};
use crate::services::metrics::{record_request, CLIENT_REQUEST_DURATION};
use crate::services::store::InvoiceStore;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Longest raw (non-JSON) error body kept in a `FetchError`.
const MAX_RAW_DETAIL: usize = 200;

/// HTTP implementation of the persistence collaborator.
#[derive(Clone)]
pub struct HttpInvoiceStore {
    client: Client,
    base_url: String,
}

impl HttpInvoiceStore {
    /// Create a new store from client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Create a store around an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/invoices/", self.base_url)
    }

    fn item_url(&self, id: InvoiceId) -> String {
        format!("{}/invoices/{}/", self.base_url, id)
    }

    async fn execute(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<String, FetchError> {
        let timer = CLIENT_REQUEST_DURATION
            .with_label_values(&[operation])
            .start_timer();

        let result = Self::read_response(operation, request).await;

        record_request(operation, &result);
        timer.observe_duration();
        result
    }

    async fn read_response(
        operation: &str,
        request: RequestBuilder,
    ) -> Result<String, FetchError> {
        let response = request.send().await.map_err(|e| {
            warn!(operation, error = %e, "Invoice API request failed");
            FetchError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        debug!(operation, status = %status, body = %body, "Invoice API response");

        if status.is_success() {
            Ok(body)
        } else {
            warn!(operation, status = %status, "Invoice API returned an error");
            Err(FetchError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            })
        }
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, FetchError> {
        let body = self.execute(operation, request).await?;
        serde_json::from_str(&body).map_err(FetchError::from)
    }
}

#[async_trait]
impl InvoiceStore for HttpInvoiceStore {
    #[instrument(skip(self, query), fields(offset = query.pagination.offset(), limit = query.pagination.limit()))]
    async fn list(&self, query: &InvoiceQuery) -> Result<ResultPage, FetchError> {
        let request = self.client.get(self.collection_url()).query(&query.to_params());
        let page: InvoicePage = self.execute_json("list", request).await?;

        Ok(ResultPage {
            items: page
                .results
                .into_iter()
                .map(Invoice::try_from)
                .collect::<Result<_, _>>()?,
            total_count: page.count,
        })
    }

    #[instrument(skip(self))]
    async fn get(&self, id: InvoiceId) -> Result<Invoice, FetchError> {
        let request = self.client.get(self.item_url(id));
        let record: InvoiceRecord = self.execute_json("get", request).await?;
        Invoice::try_from(record)
    }

    #[instrument(skip(self, submission), fields(invoice_number = %submission.invoice_number))]
    async fn create(&self, submission: &InvoiceSubmission) -> Result<Invoice, FetchError> {
        let request = self.client.post(self.collection_url()).json(submission);
        let record: InvoiceRecord = self.execute_json("create", request).await?;

        info!(invoice_id = record.id, "Invoice created");
        Invoice::try_from(record)
    }

    #[instrument(skip(self, submission), fields(invoice_number = %submission.invoice_number))]
    async fn update(
        &self,
        id: InvoiceId,
        submission: &InvoiceSubmission,
    ) -> Result<Invoice, FetchError> {
        let request = self.client.put(self.item_url(id)).json(submission);
        let record: InvoiceRecord = self.execute_json("update", request).await?;

        info!(invoice_id = record.id, "Invoice updated");
        Invoice::try_from(record)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: InvoiceId) -> Result<(), FetchError> {
        let request = self.client.delete(self.item_url(id));
        self.execute("delete", request).await?;

        info!(invoice_id = id, "Invoice deleted");
        Ok(())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn batch_delete(&self, ids: &[InvoiceId]) -> Result<(), FetchError> {
        if ids.is_empty() {
            return Err(FetchError::bad_request("No IDs provided."));
        }

        let body = BatchDeleteRequest { ids: ids.to_vec() };
        let request = self
            .client
            .post(format!("{}batch_delete/", self.collection_url()))
            .json(&body);
        self.execute("batch_delete", request).await?;

        info!(count = ids.len(), "Invoices deleted");
        Ok(())
    }
}

/// Flatten an error body into one displayable line.
///
/// Handles `{"detail": ..}`, `{"error": ..}`, field maps such as
/// `{"invoice_number": ["must be unique."]}` and bare message lists.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            for key in ["detail", "error"] {
                if let Some(Value::String(message)) = map.get(key) {
                    return Some(message.clone());
                }
            }

            let parts: Vec<String> = map
                .iter()
                .map(|(field, messages)| {
                    let text = flatten_messages(messages);
                    if field == "non_field_errors" {
                        text
                    } else {
                        format!("{field}: {text}")
                    }
                })
                .collect();
            Some(parts.join("; "))
        }
        Ok(other) => Some(flatten_messages(&other)),
        Err(_) => Some(body.chars().take(MAX_RAW_DETAIL).collect()),
    }
}

fn flatten_messages(value: &Value) -> String {
    match value {
        Value::String(message) => message.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_messages)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_detail_key() {
        assert_eq!(
            error_detail(r#"{"detail": "Not found."}"#).as_deref(),
            Some("Not found.")
        );
        assert_eq!(
            error_detail(r#"{"error": "No IDs provided."}"#).as_deref(),
            Some("No IDs provided.")
        );
    }

    #[test]
    fn error_detail_flattens_field_errors() {
        let body = r#"{"invoice_number": ["Invoice number must be unique."], "non_field_errors": ["At least one detail is required for an invoice."]}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some(
                "invoice_number: Invoice number must be unique.; At least one detail is required for an invoice."
            )
        );
    }

    #[test]
    fn error_detail_handles_lists_and_text() {
        assert_eq!(
            error_detail(r#"["At least one detail is required for an invoice."]"#).as_deref(),
            Some("At least one detail is required for an invoice.")
        );
        assert_eq!(error_detail("  ").as_deref(), None);
        assert_eq!(
            error_detail("<h1>Server Error (500)</h1>").as_deref(),
            Some("<h1>Server Error (500)</h1>")
        );
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let store = HttpInvoiceStore::with_client(Client::new(), "http://localhost:8000/");
        assert_eq!(store.collection_url(), "http://localhost:8000/invoices/");
        assert_eq!(store.item_url(7), "http://localhost:8000/invoices/7/");
    }
}
