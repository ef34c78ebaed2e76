use async_trait::async_trait;

use crate::api::requests::{
    CreateDocumentRequest, CreatedDocument, Credentials, DeleteDocumentRequest, ReadDocument,
    UpdateDocumentRequest,
};
use crate::error::TextbinError;
use crate::models::document::{Document, PrivacyStatus};
use crate::models::listing::{DocumentPage, ListQuery};
use crate::models::report::{Report, ReportRequest};
use crate::models::tokens::{DocumentId, ReadCode, UpdateCode};

/// The document API the client talks to.
///
/// Abstracted as a trait so the access controller, lifecycle manager and
/// listing engine can run against the HTTP backend, the in-process backend,
/// or a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextbinApi: Send + Sync {
    /// `POST /documents`.
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreatedDocument, TextbinError>;

    /// `PUT /documents`.
    async fn update_document(&self, request: &UpdateDocumentRequest)
        -> Result<Document, TextbinError>;

    /// `GET /documents/get/:id`.
    async fn get_document_by_id(&self, id: &DocumentId) -> Result<Document, TextbinError>;

    /// `GET /documents/status/:code`. Never releases content.
    async fn get_privacy_status(&self, code: &ReadCode) -> Result<PrivacyStatus, TextbinError>;

    /// `GET /documents/read/:code`. Fails with `AccessDenied` on wrong or
    /// missing credentials.
    async fn read_document(
        &self,
        code: &ReadCode,
        credentials: &Credentials,
    ) -> Result<ReadDocument, TextbinError>;

    /// `GET /documents/update/:code`.
    async fn get_document_for_update(&self, code: &UpdateCode)
        -> Result<Document, TextbinError>;

    /// `GET /documents`.
    async fn list_documents(&self, query: &ListQuery) -> Result<DocumentPage, TextbinError>;

    /// `POST /documents/delete`.
    async fn delete_document(&self, request: &DeleteDocumentRequest) -> Result<(), TextbinError>;

    /// `POST /reports`.
    async fn create_report(&self, request: &ReportRequest) -> Result<Report, TextbinError>;
}
