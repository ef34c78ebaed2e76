//! Gated read path of a document.
//!
//! Reading is a two-step protocol: the privacy status of a read code is
//! resolved first, and only then is content requested, with whichever
//! credentials the status asks for. Each step is its own type:
//!
//! ```text
//! Unresolved ──resolve──▶ PublicResolved ──reveal──▶ Revealed
//!            └─────────▶ AwaitingCredentials ──submit──▶ Revealed
//!                              ▲           │ (AccessDenied)
//!                              └───────────┘
//! ```
//!
//! Content can only be requested from `PublicResolved` or
//! `AwaitingCredentials`, so a content fetch can never precede the status
//! call. A failed `submit` borrows the awaiting state and leaves it usable
//! for another attempt.

use std::sync::Arc;

use crate::api::client::TextbinApi;
use crate::api::requests::Credentials;
use crate::error::TextbinError;
use crate::models::document::{Document, Privacy, PrivacyStatus};
use crate::models::report::{Report, ReportRequest};
use crate::models::tokens::ReadCode;

/// Entry point of the read path.
#[derive(Clone)]
pub struct AccessController {
    api: Arc<dyn TextbinApi>,
}

impl AccessController {
    pub fn new(api: Arc<dyn TextbinApi>) -> Self {
        Self { api }
    }

    pub fn unresolved(&self, read_code: ReadCode) -> Unresolved {
        Unresolved {
            api: Arc::clone(&self.api),
            read_code,
        }
    }

    /// Resolve the status and, for public documents, fetch the content in
    /// the same call.
    pub async fn open(&self, read_code: ReadCode) -> Result<Opened, TextbinError> {
        match self.unresolved(read_code).resolve().await? {
            Resolved::Public(public) => Ok(Opened::Revealed(public.reveal().await?)),
            Resolved::Private(awaiting) => Ok(Opened::AwaitingCredentials(awaiting)),
        }
    }
}

/// Outcome of [`AccessController::open`].
pub enum Opened {
    Revealed(Revealed),
    AwaitingCredentials(AwaitingCredentials),
}

/// A read code whose privacy status is not known yet.
pub struct Unresolved {
    api: Arc<dyn TextbinApi>,
    read_code: ReadCode,
}

impl Unresolved {
    pub fn read_code(&self) -> &ReadCode {
        &self.read_code
    }

    /// Fetch the privacy status. Nothing of the content is requested here.
    pub async fn resolve(&self) -> Result<Resolved, TextbinError> {
        let status = self.api.get_privacy_status(&self.read_code).await?;

        let resolved = match status.privacy {
            Privacy::Public => Resolved::Public(PublicResolved {
                api: Arc::clone(&self.api),
                read_code: self.read_code.clone(),
            }),
            Privacy::Private => Resolved::Private(AwaitingCredentials {
                api: Arc::clone(&self.api),
                read_code: self.read_code.clone(),
                status,
            }),
        };
        tracing::debug!(
            privacy = %status.privacy,
            password = status.is_password_protected,
            encrypted = status.is_encrypted,
            "Resolved document status"
        );
        Ok(resolved)
    }
}

pub enum Resolved {
    Public(PublicResolved),
    Private(AwaitingCredentials),
}

/// A public document, ready to be fetched without credentials.
pub struct PublicResolved {
    api: Arc<dyn TextbinApi>,
    read_code: ReadCode,
}

impl PublicResolved {
    pub async fn reveal(&self) -> Result<Revealed, TextbinError> {
        let read = self
            .api
            .read_document(&self.read_code, &Credentials::none())
            .await?;
        tracing::debug!("Revealed public document {}", read.document.id);
        Ok(Revealed::new(
            Arc::clone(&self.api),
            self.read_code.clone(),
            read.document,
            read.is_reported,
        ))
    }
}

/// Which credentials a private document asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialRequirements {
    pub password: bool,
    pub decryption_key: bool,
}

impl From<&PrivacyStatus> for CredentialRequirements {
    fn from(status: &PrivacyStatus) -> Self {
        Self {
            password: status.is_password_protected,
            decryption_key: status.is_encrypted,
        }
    }
}

/// A private document waiting for its credentials.
pub struct AwaitingCredentials {
    api: Arc<dyn TextbinApi>,
    read_code: ReadCode,
    status: PrivacyStatus,
}

impl AwaitingCredentials {
    pub fn read_code(&self) -> &ReadCode {
        &self.read_code
    }

    pub fn status(&self) -> PrivacyStatus {
        self.status
    }

    pub fn requirements(&self) -> CredentialRequirements {
        CredentialRequirements::from(&self.status)
    }

    /// Try to unlock the document.
    ///
    /// A required credential that is missing or blank fails with
    /// `AccessDenied` without contacting the server. Only the credentials
    /// the status asks for are sent.
    pub async fn submit(&self, credentials: &Credentials) -> Result<Revealed, TextbinError> {
        let required = self.requirements();
        if required.password && !credentials.has_password() {
            return Err(TextbinError::AccessDenied("Password required".into()));
        }
        if required.decryption_key && !credentials.has_decryption_key() {
            return Err(TextbinError::AccessDenied("Decryption key required".into()));
        }

        let presented = Credentials {
            password: credentials.password.clone().filter(|_| required.password),
            decryption_key: credentials
                .decryption_key
                .clone()
                .filter(|_| required.decryption_key),
        };

        match self.api.read_document(&self.read_code, &presented).await {
            Ok(read) => {
                tracing::debug!("Credentials accepted for document {}", read.document.id);
                Ok(Revealed::new(
                    Arc::clone(&self.api),
                    self.read_code.clone(),
                    read.document,
                    read.is_reported,
                ))
            }
            Err(e) => {
                tracing::info!("Credentialed read rejected: {e}");
                Err(e)
            }
        }
    }
}

/// A document whose content has been released.
pub struct Revealed {
    api: Arc<dyn TextbinApi>,
    read_code: ReadCode,
    document: Document,
    is_reported: bool,
    report: Option<Report>,
}

impl Revealed {
    fn new(
        api: Arc<dyn TextbinApi>,
        read_code: ReadCode,
        document: Document,
        is_reported: bool,
    ) -> Self {
        Self {
            api,
            read_code,
            document,
            is_reported,
            report: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Whether the server holds a report, or one was filed from this view.
    pub fn is_reported(&self) -> bool {
        self.is_reported
    }

    /// The report filed from this view, if any.
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn can_report(&self) -> bool {
        !self.is_reported
    }

    /// File an abuse report. At most one is accepted per revealed view; a
    /// document already reported is rejected before any request is sent.
    pub async fn file_report(&mut self, reason: Option<&str>) -> Result<&Report, TextbinError> {
        if !self.can_report() {
            return Err(TextbinError::Validation(
                "Document has already been reported".into(),
            ));
        }

        let request = ReportRequest::new(self.read_code.clone(), reason);
        let report = self.api.create_report(&request).await?;
        tracing::info!("Filed report for document {}", self.document.id);

        self.is_reported = true;
        Ok(self.report.insert(report))
    }
}
