use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::client::TextbinApi;
use crate::api::envelope::{error_from_response, ApiResponse, Gate};
use crate::api::requests::{
    CreateDocumentRequest, CreatedDocument, Credentials, DeleteDocumentRequest,
    EncryptedDocumentBody, ReadDocument, UpdateDocumentRequest,
};
use crate::config::ClientConfig;
use crate::error::TextbinError;
use crate::models::document::{Document, DocumentRecord, PrivacyStatus};
use crate::models::listing::{DocumentPage, ListQuery};
use crate::models::report::{Report, ReportRequest};
use crate::models::tokens::{DocumentId, ReadCode, UpdateCode};

/// `reqwest` implementation of [`TextbinApi`].
pub struct HttpTextbinApi {
    client: Client,
    base_url: Url,
}

impl HttpTextbinApi {
    /// Create a client against the API root (e.g. `https://api.textbin.dev`).
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    /// Create with an explicit `reqwest::Client` (useful for testing / DI).
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Append path segments to the API root, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TextbinError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TextbinError::Config(format!("API URL '{}' cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        gate: Gate,
    ) -> Result<T, TextbinError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = error_from_response(status, &text, gate);
            tracing::debug!("API request failed with {status}: {err}");
            return Err(err);
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&text)
            .map_err(|e| TextbinError::RequestFailed(format!("Invalid response body: {e}")))?;
        envelope.into_body()
    }
}

#[async_trait]
impl TextbinApi for HttpTextbinApi {
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreatedDocument, TextbinError> {
        let url = self.endpoint(&["documents"])?;
        let builder = self.client.post(url).json(request);

        if request.is_encrypted {
            let body: EncryptedDocumentBody = self.send(builder, Gate::Open).await?;
            Ok(CreatedDocument::Encrypted {
                document: body.document,
                decryption_key: body.decryption_key,
            })
        } else {
            let document: Document = self.send(builder, Gate::Open).await?;
            Ok(CreatedDocument::Plain(document))
        }
    }

    async fn update_document(
        &self,
        request: &UpdateDocumentRequest,
    ) -> Result<Document, TextbinError> {
        let url = self.endpoint(&["documents"])?;
        self.send(self.client.put(url).json(request), Gate::Open)
            .await
    }

    async fn get_document_by_id(&self, id: &DocumentId) -> Result<Document, TextbinError> {
        let url = self.endpoint(&["documents", "get", id.as_str()])?;
        self.send(self.client.get(url), Gate::Open).await
    }

    async fn get_privacy_status(&self, code: &ReadCode) -> Result<PrivacyStatus, TextbinError> {
        let url = self.endpoint(&["documents", "status", code.as_str()])?;
        self.send(self.client.get(url), Gate::Open).await
    }

    async fn read_document(
        &self,
        code: &ReadCode,
        credentials: &Credentials,
    ) -> Result<ReadDocument, TextbinError> {
        let url = self.endpoint(&["documents", "read", code.as_str()])?;
        let builder = self.client.get(url).query(&credentials.to_query_pairs());

        let record: DocumentRecord = self.send(builder, Gate::Credentialed).await?;
        let is_reported = record.is_reported.unwrap_or(false);
        Ok(ReadDocument {
            document: Document::try_from(record)?,
            is_reported,
        })
    }

    async fn get_document_for_update(
        &self,
        code: &UpdateCode,
    ) -> Result<Document, TextbinError> {
        let url = self.endpoint(&["documents", "update", code.expose()])?;
        self.send(self.client.get(url), Gate::Open).await
    }

    async fn list_documents(&self, query: &ListQuery) -> Result<DocumentPage, TextbinError> {
        let url = self.endpoint(&["documents"])?;
        let builder = self.client.get(url).query(&query.to_query_pairs());
        self.send(builder, Gate::Open).await
    }

    async fn delete_document(&self, request: &DeleteDocumentRequest) -> Result<(), TextbinError> {
        let url = self.endpoint(&["documents", "delete"])?;
        let _message: serde_json::Value = self
            .send(self.client.post(url).json(request), Gate::Open)
            .await?;
        Ok(())
    }

    async fn create_report(&self, request: &ReportRequest) -> Result<Report, TextbinError> {
        let url = self.endpoint(&["reports"])?;
        self.send(self.client.post(url).json(request), Gate::Open)
            .await
    }
}
