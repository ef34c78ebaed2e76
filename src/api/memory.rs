use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::api::client::TextbinApi;
use crate::api::requests::{
    CreateDocumentRequest, CreatedDocument, Credentials, DeleteDocumentRequest, ReadDocument,
    UpdateDocumentRequest,
};
use crate::error::TextbinError;
use crate::models::document::{
    Capability, Document, DocumentKind, Expiry, PasswordStatusRecord, Privacy, PrivacyStatus, Tags,
};
use crate::models::listing::{DocumentPage, ListQuery, Pagination, SortBy, SortOrder};
use crate::models::report::{Report, ReportRequest};
use crate::models::tokens::{DecryptionKey, DocumentId, Password, ReadCode, UpdateCode};

const READ_CODE_LEN: usize = 10;
const UPDATE_CODE_LEN: usize = 24;
const DECRYPTION_KEY_BYTES: usize = 24;

/// In-process implementation of the document API.
///
/// Holds everything in memory and follows the same contract as the remote
/// service, including credential gating, expiry and pagination. Passwords
/// and decryption keys are kept only as salted SHA-256 digests.
#[derive(Default)]
pub struct MemoryTextbinApi {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    documents: Vec<StoredDocument>,
    reports: Vec<Report>,
    next_seq: u64,
}

struct StoredDocument {
    /// Carries the full capability; stripped before it reaches a reader.
    document: Document,
    password_digest: Option<String>,
    key_digest: Option<String>,
    /// Insertion order, tie-breaker for sorting.
    seq: u64,
}

impl StoredDocument {
    fn is_live(&self) -> bool {
        self.document.active && !self.document.expiry.is_expired_at(Utc::now())
    }
}

impl MemoryTextbinApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, including expired and inactive ones.
    pub fn document_count(&self) -> usize {
        self.state().documents.len()
    }

    /// Number of reports filed against the document with this read code.
    pub fn report_count(&self, code: &ReadCode) -> usize {
        let state = self.state();
        let Some(id) = state
            .documents
            .iter()
            .find(|d| &d.document.read_code == code)
            .map(|d| d.document.id.clone())
        else {
            return 0;
        };
        state.reports.iter().filter(|r| r.document_id == id).count()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MemoryState {
    /// Index of the live document with this read code.
    fn live_index(&self, code: &ReadCode) -> Result<usize, TextbinError> {
        self.documents
            .iter()
            .position(|d| &d.document.read_code == code && d.is_live())
            .ok_or_else(not_found)
    }

    fn position_by_id(&self, id: &DocumentId) -> Result<usize, TextbinError> {
        self.documents
            .iter()
            .position(|d| &d.document.id == id)
            .ok_or_else(not_found)
    }

    fn code_in_use(&self, code: &str) -> bool {
        self.documents.iter().any(|d| {
            d.document.read_code.as_str() == code
                || d.document.update_code().is_some_and(|u| u.expose() == code)
        })
    }

    fn unique_code(&self, len: usize) -> String {
        loop {
            let code = random_code(len);
            if !self.code_in_use(&code) {
                return code;
            }
        }
    }

    fn is_reported(&self, id: &DocumentId) -> bool {
        self.reports.iter().any(|r| &r.document_id == id)
    }
}

fn not_found() -> TextbinError {
    TextbinError::RequestFailed("Document not found".into())
}

fn random_code(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn random_key() -> DecryptionKey {
    let mut bytes = [0u8; DECRYPTION_KEY_BYTES];
    rand::rng().fill(&mut bytes);
    DecryptionKey::new(URL_SAFE_NO_PAD.encode(bytes))
}

/// Salted digest of a secret; the salt is the document id.
fn digest(id: &DocumentId, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

fn secret_matches(expected: Option<&str>, id: &DocumentId, presented: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => presented.is_some_and(|p| digest(id, p) == expected),
    }
}

/// Digest of the password carried by a password descriptor, if it protects.
fn protection_digest(id: &DocumentId, status: Option<&PasswordStatusRecord>) -> Option<String> {
    status
        .filter(|s| s.is_password_protected)
        .and_then(|s| s.password.as_ref())
        .filter(|p| !p.is_empty())
        .map(|p: &Password| digest(id, p.expose()))
}

#[async_trait]
impl TextbinApi for MemoryTextbinApi {
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreatedDocument, TextbinError> {
        if request.title.trim().is_empty() || request.content.trim().is_empty() {
            return Err(TextbinError::RequestFailed(
                "Title and content are required".into(),
            ));
        }
        if request.is_encrypted && request.privacy == Privacy::Public {
            return Err(TextbinError::RequestFailed(
                "Encrypted documents must be private".into(),
            ));
        }

        let mut state = self.state();
        let id = DocumentId::new(uuid::Uuid::new_v4().simple().to_string());
        let password_digest = match request.privacy {
            Privacy::Public => None,
            Privacy::Private => protection_digest(&id, request.password_status.as_ref()),
        };
        if request.privacy == Privacy::Private && !request.is_encrypted && password_digest.is_none()
        {
            return Err(TextbinError::RequestFailed(
                "Private documents require a password".into(),
            ));
        }

        let read_code = ReadCode::new(state.unique_code(READ_CODE_LEN));
        let (capability, key) = if request.is_encrypted {
            (Capability::Encrypted, Some(random_key()))
        } else {
            let update_code = UpdateCode::new(state.unique_code(UPDATE_CODE_LEN));
            (Capability::Updatable(update_code), None)
        };

        let now = Utc::now();
        let document = Document {
            id: id.clone(),
            title: request.title.clone(),
            content: request.content.clone(),
            kind: DocumentKind::from_wire(request.doc_type, request.syntax.clone()),
            tags: Tags::from(request.tags.clone()),
            privacy: request.privacy,
            active: true,
            views: 0,
            created_at: now,
            updated_at: now,
            expiry: Expiry::try_from(request.expiry_status.clone())?,
            password_protected: password_digest.is_some(),
            read_code,
            capability,
        };

        let seq = state.next_seq;
        state.next_seq += 1;
        state.documents.push(StoredDocument {
            document: document.clone(),
            password_digest,
            key_digest: key.as_ref().map(|k| digest(&id, k.expose())),
            seq,
        });

        tracing::debug!("Stored document {} ({} total)", id, state.documents.len());

        Ok(match key {
            Some(decryption_key) => CreatedDocument::Encrypted {
                document,
                decryption_key,
            },
            None => CreatedDocument::Plain(document),
        })
    }

    async fn update_document(
        &self,
        request: &UpdateDocumentRequest,
    ) -> Result<Document, TextbinError> {
        let mut state = self.state();
        let index = state.position_by_id(&request.id)?;
        let stored = &mut state.documents[index];

        if stored.document.update_code() != Some(&request.update_code) {
            return Err(TextbinError::AccessDenied("Invalid update code".into()));
        }

        let title = request.title.as_ref().unwrap_or(&stored.document.title);
        let content = request.content.as_ref().unwrap_or(&stored.document.content);
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(TextbinError::RequestFailed(
                "Title and content are required".into(),
            ));
        }
        let expiry = match &request.expiry_status {
            Some(record) => Expiry::try_from(record.clone())?,
            None => stored.document.expiry,
        };
        let privacy = request.privacy.unwrap_or(stored.document.privacy);

        let doc = &mut stored.document;
        if let Some(title) = &request.title {
            doc.title = title.clone();
        }
        if let Some(content) = &request.content {
            doc.content = content.clone();
        }
        if let Some(active) = request.active {
            doc.active = active;
        }
        if let Some(tags) = &request.tags {
            doc.tags = Tags::from(tags.clone());
        }
        if let Some(doc_type) = request.doc_type {
            doc.kind = DocumentKind::from_wire(doc_type, request.syntax.clone());
        }
        doc.expiry = expiry;
        doc.privacy = privacy;

        match privacy {
            Privacy::Public => stored.password_digest = None,
            Privacy::Private => {
                if let Some(status) = &request.password_status {
                    stored.password_digest = if status.is_password_protected {
                        protection_digest(&doc.id, Some(status))
                            .or(stored.password_digest.take())
                    } else {
                        None
                    };
                }
            }
        }
        doc.password_protected = stored.password_digest.is_some();
        doc.updated_at = Utc::now();

        Ok(doc.clone())
    }

    async fn get_document_by_id(&self, id: &DocumentId) -> Result<Document, TextbinError> {
        let state = self.state();
        let index = state.position_by_id(id)?;
        Ok(state.documents[index].document.clone().without_update_code())
    }

    async fn get_privacy_status(&self, code: &ReadCode) -> Result<PrivacyStatus, TextbinError> {
        let state = self.state();
        let index = state.live_index(code)?;
        Ok(state.documents[index].document.privacy_status())
    }

    async fn read_document(
        &self,
        code: &ReadCode,
        credentials: &Credentials,
    ) -> Result<ReadDocument, TextbinError> {
        let mut state = self.state();
        let index = state.live_index(code)?;
        let is_reported = {
            let stored = &state.documents[index];
            let id = &stored.document.id;

            let password = credentials.password.as_ref().map(|p| p.expose());
            if !secret_matches(stored.password_digest.as_deref(), id, password) {
                return Err(TextbinError::AccessDenied("Invalid password".into()));
            }
            let key = credentials.decryption_key.as_ref().map(|k| k.expose());
            if !secret_matches(stored.key_digest.as_deref(), id, key) {
                return Err(TextbinError::AccessDenied("Invalid decryption key".into()));
            }
            state.is_reported(id)
        };

        let stored = &mut state.documents[index];
        stored.document.views += 1;

        Ok(ReadDocument {
            document: stored.document.clone().without_update_code(),
            is_reported,
        })
    }

    async fn get_document_for_update(
        &self,
        code: &UpdateCode,
    ) -> Result<Document, TextbinError> {
        let state = self.state();
        state
            .documents
            .iter()
            .find(|d| d.document.update_code() == Some(code))
            .map(|d| d.document.clone())
            .ok_or_else(not_found)
    }

    async fn list_documents(&self, query: &ListQuery) -> Result<DocumentPage, TextbinError> {
        if query.page == 0 || query.limit == 0 {
            return Err(TextbinError::RequestFailed(
                "page and limit must be positive".into(),
            ));
        }

        let state = self.state();
        let filters = &query.filters;
        let mut matching: Vec<&StoredDocument> = state
            .documents
            .iter()
            .filter(|d| d.document.privacy == Privacy::Public && d.is_live())
            .filter(|d| d.document.tags.contains_all(&filters.tags))
            .filter(|d| {
                filters
                    .doc_type
                    .map_or(true, |t| d.document.kind.document_type() == t)
            })
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match filters.sort_by {
                SortBy::CreatedAt => {
                    (a.document.created_at, a.seq).cmp(&(b.document.created_at, b.seq))
                }
                SortBy::Views => (a.document.views, a.seq).cmp(&(b.document.views, b.seq)),
            };
            match filters.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total_count = matching.len() as u64;
        let limit = query.limit as usize;
        let total_pages = matching.len().div_ceil(limit) as u32;
        let offset = (query.page as usize - 1).saturating_mul(limit);

        let data = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|d| d.document.clone().without_update_code())
            .collect();

        Ok(DocumentPage {
            data,
            pagination: Pagination {
                total_count,
                total_pages,
                current_page: query.page,
                page_size: query.limit,
                has_next: query.page < total_pages,
            },
        })
    }

    async fn delete_document(&self, request: &DeleteDocumentRequest) -> Result<(), TextbinError> {
        let mut state = self.state();
        let index = state.position_by_id(&request.id)?;
        let doc = &state.documents[index].document;

        if doc.read_code != request.read_code || doc.update_code() != Some(&request.update_code) {
            return Err(TextbinError::AccessDenied("Invalid document codes".into()));
        }

        let removed = state.documents.remove(index);
        tracing::debug!("Deleted document {}", removed.document.id);
        Ok(())
    }

    async fn create_report(&self, request: &ReportRequest) -> Result<Report, TextbinError> {
        let mut state = self.state();
        let index = state.live_index(&request.read_code)?;
        let document_id = state.documents[index].document.id.clone();

        let now = Utc::now();
        let report = Report {
            document_id,
            reason: request.reason.clone(),
            ip_address: None,
            created_at: now,
            updated_at: now,
        };
        state.reports.push(report.clone());
        Ok(report)
    }
}
