use std::sync::Arc;

use chrono::Utc;

use crate::api::client::TextbinApi;
use crate::api::requests::{
    CreateDocumentRequest, CreatedDocument, DeleteDocumentRequest, UpdateDocumentRequest,
};
use crate::error::TextbinError;
use crate::models::document::{
    Capability, Document, DocumentKind, Expiry, PasswordStatusRecord, Privacy, Tags,
};
use crate::models::tokens::{DocumentId, Password, ReadCode, UpdateCode};

/// Minimum password length when a document is made or kept private on update.
pub const MIN_UPDATE_PASSWORD_LEN: usize = 8;

/// Input of [`DocumentLifecycle::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub tags: Tags,
    pub kind: DocumentKind,
    pub privacy: Privacy,
    pub expiry: Expiry,
    pub password: Option<Password>,
    pub encrypt: bool,
}

impl NewDocument {
    /// A public, never-expiring text document.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Tags::new(),
            kind: DocumentKind::Text,
            privacy: Privacy::Public,
            expiry: Expiry::Never,
            password: None,
            encrypt: false,
        }
    }
}

/// Changes applied by [`DocumentLifecycle::update`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub active: Option<bool>,
    pub tags: Option<Tags>,
    pub kind: Option<DocumentKind>,
    pub privacy: Option<Privacy>,
    pub expiry: Option<Expiry>,
    pub password: Option<Password>,
}

/// Create, update and delete documents through their capability tokens.
///
/// Every operation validates locally first; a validation failure never
/// reaches the backend. Backend failures are reported as `RequestFailed`.
#[derive(Clone)]
pub struct DocumentLifecycle {
    api: Arc<dyn TextbinApi>,
}

impl DocumentLifecycle {
    pub fn new(api: Arc<dyn TextbinApi>) -> Self {
        Self { api }
    }

    pub async fn create(&self, new: NewDocument) -> Result<CreatedDocument, TextbinError> {
        let request = build_create_request(new)?;

        let created = self
            .api
            .create_document(&request)
            .await
            .map_err(TextbinError::into_request_failed)?;
        check_created(&request, &created)?;

        tracing::info!(
            "Created {} document {}",
            created.document().privacy,
            created.document().id
        );
        Ok(created)
    }

    /// Fetch a document for editing by its update code.
    ///
    /// The returned document always carries `code` as its update capability.
    pub async fn load_for_update(&self, code: &UpdateCode) -> Result<Document, TextbinError> {
        if code.is_empty() {
            return Err(TextbinError::Validation("Update code is required".into()));
        }

        let mut document = self
            .api
            .get_document_for_update(code)
            .await
            .map_err(TextbinError::into_request_failed)?;

        if document.is_encrypted() {
            return Err(TextbinError::RequestFailed(
                "Encrypted documents cannot be edited".into(),
            ));
        }
        document.capability = Capability::Updatable(code.clone());
        Ok(document)
    }

    /// Apply `changes` to `current`, which must carry its update code.
    ///
    /// Whenever the resulting privacy is `PRIVATE`, a password of at least
    /// [`MIN_UPDATE_PASSWORD_LEN`] characters must come with the changes.
    /// Read and update codes are never rotated.
    pub async fn update(
        &self,
        current: &Document,
        changes: DocumentUpdate,
    ) -> Result<Document, TextbinError> {
        let update_code = match &current.capability {
            Capability::Updatable(code) => code.clone(),
            Capability::Encrypted => {
                return Err(TextbinError::Validation(
                    "Encrypted documents cannot be edited".into(),
                ))
            }
            Capability::ReadOnly => {
                return Err(TextbinError::Validation(
                    "Update code is required to edit this document".into(),
                ))
            }
        };

        let request = build_update_request(current, changes, update_code.clone())?;

        let mut updated = self
            .api
            .update_document(&request)
            .await
            .map_err(TextbinError::into_request_failed)?;

        if updated.read_code != current.read_code {
            tracing::warn!("Backend changed the read code of document {}", current.id);
            updated.read_code = current.read_code.clone();
        }
        updated.capability = Capability::Updatable(update_code);

        tracing::info!("Updated document {}", updated.id);
        Ok(updated)
    }

    /// Delete a document. Both capability tokens must be presented.
    pub async fn delete(
        &self,
        id: &DocumentId,
        read_code: &ReadCode,
        update_code: &UpdateCode,
    ) -> Result<(), TextbinError> {
        if read_code.is_empty() || update_code.is_empty() {
            return Err(TextbinError::Validation(
                "Both the read code and the update code are required".into(),
            ));
        }

        let request = DeleteDocumentRequest {
            id: id.clone(),
            read_code: read_code.clone(),
            update_code: update_code.clone(),
        };
        self.api
            .delete_document(&request)
            .await
            .map_err(TextbinError::into_request_failed)?;

        tracing::info!("Deleted document {}", id);
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<String, TextbinError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TextbinError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn require_future(expiry: &Expiry) -> Result<(), TextbinError> {
    match expiry {
        Expiry::At(at) if *at <= Utc::now() => Err(TextbinError::Validation(
            "Expiration date must be in the future".into(),
        )),
        _ => Ok(()),
    }
}

fn protected(password: Password) -> PasswordStatusRecord {
    PasswordStatusRecord {
        is_password_protected: true,
        password: Some(password),
    }
}

fn build_create_request(new: NewDocument) -> Result<CreateDocumentRequest, TextbinError> {
    let title = require_text("Title", &new.title)?;
    let content = require_text("Content", &new.content)?;

    if new.encrypt && new.privacy == Privacy::Public {
        return Err(TextbinError::Validation(
            "Encrypted documents must be private".into(),
        ));
    }
    let password = new.password.filter(|p| !p.is_empty());
    if new.privacy == Privacy::Private && !new.encrypt && password.is_none() {
        return Err(TextbinError::Validation(
            "Private documents require a password".into(),
        ));
    }
    require_future(&new.expiry)?;

    let password_status = match new.privacy {
        Privacy::Public => None,
        Privacy::Private => password.map(protected),
    };

    Ok(CreateDocumentRequest {
        title,
        content,
        tags: new.tags.into(),
        doc_type: new.kind.document_type(),
        syntax: new.kind.syntax().map(str::to_string),
        privacy: new.privacy,
        expiry_status: new.expiry.into(),
        password_status,
        is_encrypted: new.encrypt,
    })
}

fn build_update_request(
    current: &Document,
    changes: DocumentUpdate,
    update_code: UpdateCode,
) -> Result<UpdateDocumentRequest, TextbinError> {
    let title = changes
        .title
        .as_deref()
        .map(|t| require_text("Title", t))
        .transpose()?;
    let content = changes
        .content
        .as_deref()
        .map(|c| require_text("Content", c))
        .transpose()?;
    if let Some(expiry) = &changes.expiry {
        require_future(expiry)?;
    }

    let privacy = changes.privacy.unwrap_or(current.privacy);
    let password_status = match privacy {
        Privacy::Public => Some(PasswordStatusRecord {
            is_password_protected: false,
            password: None,
        }),
        Privacy::Private => match changes.password {
            Some(password) if password.trimmed_len() >= MIN_UPDATE_PASSWORD_LEN => {
                Some(protected(password))
            }
            _ => {
                return Err(TextbinError::Validation(format!(
                    "Private documents need a password of at least {MIN_UPDATE_PASSWORD_LEN} characters"
                )))
            }
        },
    };

    let (doc_type, syntax) = match &changes.kind {
        Some(kind) => (
            Some(kind.document_type()),
            kind.syntax().map(str::to_string),
        ),
        None => (None, None),
    };

    Ok(UpdateDocumentRequest {
        id: current.id.clone(),
        title,
        content,
        active: changes.active,
        tags: changes.tags.map(Vec::from),
        doc_type,
        syntax,
        privacy: changes.privacy,
        expiry_status: changes.expiry.map(Into::into),
        password_status,
        update_code,
    })
}

/// An encrypted creation must come back with a key and no update code; a
/// plain one with its update code.
fn check_created(
    request: &CreateDocumentRequest,
    created: &CreatedDocument,
) -> Result<(), TextbinError> {
    let consistent = match created {
        CreatedDocument::Encrypted {
            document,
            decryption_key,
        } => request.is_encrypted && !decryption_key.is_empty() && document.is_encrypted(),
        CreatedDocument::Plain(document) => {
            !request.is_encrypted && document.update_code().is_some()
        }
    };
    if !consistent || created.document().read_code.is_empty() {
        return Err(TextbinError::RequestFailed(
            "Malformed response to document creation".into(),
        ));
    }
    Ok(())
}
