use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TextbinError;
use crate::models::tokens::{DocumentId, Password, ReadCode, UpdateCode};

/// Tags offered by the tag picker and the listing filter menu.
pub const SUGGESTED_TAGS: &[&str] = &[
    "JavaScript",
    "React",
    "TypeScript",
    "HTML",
    "CSS",
    "Python",
    "Java",
    "Go",
    "C++",
    "Tutorial",
    "Snippet",
    "Algorithm",
    "Frontend",
    "Backend",
    "Database",
];

/// Unix timestamp of 2100-01-01T00:00:00Z.
const NEVER_EXPIRES_TIMESTAMP: i64 = 4_102_444_800;

/// The far-future expiration date sent for documents that never expire.
pub fn never_expires_date() -> DateTime<Utc> {
    Utc.timestamp_opt(NEVER_EXPIRES_TIMESTAMP, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Who can see a document without a capability token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Privacy {
    /// Listed publicly and readable by anyone holding the read code.
    Public,
    /// Never listed; may additionally require a password and/or a decryption key.
    Private,
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privacy::Public => write!(f, "PUBLIC"),
            Privacy::Private => write!(f, "PRIVATE"),
        }
    }
}

/// The content kind as it appears on the wire (`type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Text,
    Code,
}

impl DocumentType {
    /// Parse a document type from a string (case-insensitive).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(DocumentType::Text),
            "code" => Some(DocumentType::Code),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Text => write!(f, "TEXT"),
            DocumentType::Code => write!(f, "CODE"),
        }
    }
}

/// Content kind with its syntax tag when it is code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Code { syntax: String },
}

impl DocumentKind {
    pub fn code(syntax: impl Into<String>) -> Self {
        DocumentKind::Code {
            syntax: syntax.into(),
        }
    }

    pub fn document_type(&self) -> DocumentType {
        match self {
            DocumentKind::Text => DocumentType::Text,
            DocumentKind::Code { .. } => DocumentType::Code,
        }
    }

    pub fn syntax(&self) -> Option<&str> {
        match self {
            DocumentKind::Text => None,
            DocumentKind::Code { syntax } => Some(syntax),
        }
    }

    pub(crate) fn from_wire(doc_type: DocumentType, syntax: Option<String>) -> Self {
        match doc_type {
            DocumentType::Text => DocumentKind::Text,
            DocumentType::Code => DocumentKind::Code {
                syntax: syntax.unwrap_or_default(),
            },
        }
    }
}

/// Tags of a document: unique, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag unless it is already present or blank. Returns `true` if added.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into().trim().to_string();
        if tag.is_empty() || self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    /// Select the tag if absent, deselect it if present.
    pub fn toggle(&mut self, tag: &str) {
        if !self.remove(tag) {
            self.insert(tag);
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// `true` if every tag of `required` is present here.
    pub fn contains_all(&self, required: &Tags) -> bool {
        required.iter().all(|t| self.contains(t))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// When a document stops being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(DateTime<Utc>),
}

impl Expiry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(at) => now >= *at,
        }
    }

    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Expiry::Never => None,
            Expiry::At(at) => Some(*at),
        }
    }
}

/// Wire form of [`Expiry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryStatusRecord {
    pub is_expiring: bool,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
}

impl From<Expiry> for ExpiryStatusRecord {
    fn from(expiry: Expiry) -> Self {
        match expiry {
            Expiry::Never => Self {
                is_expiring: false,
                expiration_date: Some(never_expires_date()),
            },
            Expiry::At(at) => Self {
                is_expiring: true,
                expiration_date: Some(at),
            },
        }
    }
}

impl TryFrom<ExpiryStatusRecord> for Expiry {
    type Error = TextbinError;

    fn try_from(record: ExpiryStatusRecord) -> Result<Self, Self::Error> {
        match (record.is_expiring, record.expiration_date) {
            (false, _) => Ok(Expiry::Never),
            (true, Some(at)) => Ok(Expiry::At(at)),
            (true, None) => Err(TextbinError::RequestFailed(
                "Expiring document without an expiration date".into(),
            )),
        }
    }
}

/// Wire form of the password-protection descriptor.
///
/// The password itself only travels on create/update requests; documents
/// coming back from the server carry the flag alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStatusRecord {
    pub is_password_protected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Password>,
}

/// What a holder of the document may do beyond reading it.
///
/// Encrypted documents trade away the update capability for confidentiality,
/// so an update code and encryption can never coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Unencrypted, and the update code was disclosed to us.
    Updatable(UpdateCode),
    /// Unencrypted, but the update code was not disclosed (listing, read path).
    ReadOnly,
    /// Encrypted; no update code was ever issued.
    Encrypted,
}

/// A document as the backend serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    pub privacy: Privacy,
    pub read_code: ReadCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_code: Option<UpdateCode>,
    pub expiry_status: ExpiryStatusRecord,
    #[serde(default)]
    pub password_status: PasswordStatusRecord,
    #[serde(default)]
    pub is_encrypted: bool,
    #[serde(default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Only present on the credentialed read endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reported: Option<bool>,
}

fn default_active() -> bool {
    true
}

/// A validated document.
///
/// Built from a [`DocumentRecord`]; the conversion rejects records that break
/// the privacy/encryption invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DocumentRecord", into = "DocumentRecord")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub kind: DocumentKind,
    pub tags: Tags,
    pub privacy: Privacy,
    pub active: bool,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expiry: Expiry,
    pub password_protected: bool,
    pub read_code: ReadCode,
    pub capability: Capability,
}

impl Document {
    pub fn is_encrypted(&self) -> bool {
        matches!(self.capability, Capability::Encrypted)
    }

    pub fn update_code(&self) -> Option<&UpdateCode> {
        match &self.capability {
            Capability::Updatable(code) => Some(code),
            _ => None,
        }
    }

    /// The minimal pre-content disclosure for this document.
    pub fn privacy_status(&self) -> PrivacyStatus {
        PrivacyStatus {
            privacy: self.privacy,
            is_password_protected: self.password_protected,
            is_encrypted: self.is_encrypted(),
        }
    }

    /// Drop the update capability, e.g. before handing the document to a reader.
    pub fn without_update_code(mut self) -> Self {
        if let Capability::Updatable(_) = self.capability {
            self.capability = Capability::ReadOnly;
        }
        self
    }
}

impl TryFrom<DocumentRecord> for Document {
    type Error = TextbinError;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        let malformed =
            |reason: &str| TextbinError::RequestFailed(format!("Malformed document '{}': {reason}", record.id));

        if record.read_code.is_empty() {
            return Err(malformed("missing read code"));
        }
        if record.privacy == Privacy::Public && record.is_encrypted {
            return Err(malformed("encrypted documents must be private"));
        }
        if record.privacy == Privacy::Public && record.password_status.is_password_protected {
            return Err(malformed("password-protected documents must be private"));
        }

        let update_code = record.update_code.clone().filter(|code| !code.is_empty());
        let capability = match (record.is_encrypted, update_code) {
            (true, Some(_)) => return Err(malformed("encrypted documents carry no update code")),
            (true, None) => Capability::Encrypted,
            (false, Some(code)) => Capability::Updatable(code),
            (false, None) => Capability::ReadOnly,
        };

        Ok(Document {
            kind: DocumentKind::from_wire(record.doc_type, record.syntax),
            expiry: Expiry::try_from(record.expiry_status)?,
            password_protected: record.password_status.is_password_protected,
            tags: Tags::from(record.tags),
            id: record.id,
            title: record.title,
            content: record.content,
            privacy: record.privacy,
            active: record.active,
            views: record.views,
            created_at: record.created_at,
            updated_at: record.updated_at,
            read_code: record.read_code,
            capability,
        })
    }
}

impl From<Document> for DocumentRecord {
    fn from(doc: Document) -> Self {
        let is_encrypted = doc.is_encrypted();
        let update_code = doc.update_code().cloned();
        DocumentRecord {
            id: doc.id,
            title: doc.title,
            content: doc.content,
            active: doc.active,
            tags: doc.tags.into(),
            doc_type: doc.kind.document_type(),
            syntax: doc.kind.syntax().map(str::to_string),
            privacy: doc.privacy,
            read_code: doc.read_code,
            update_code,
            expiry_status: doc.expiry.into(),
            password_status: PasswordStatusRecord {
                is_password_protected: doc.password_protected,
                password: None,
            },
            is_encrypted,
            views: doc.views,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            is_reported: None,
        }
    }
}

/// What credentials a document requires, disclosed without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyStatus {
    pub privacy: Privacy,
    pub is_password_protected: bool,
    pub is_encrypted: bool,
}
