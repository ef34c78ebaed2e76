//! Request and response bodies of the document API.

use serde::{Deserialize, Serialize};

use crate::models::document::{
    Document, DocumentType, ExpiryStatusRecord, PasswordStatusRecord, Privacy,
};
use crate::models::tokens::{DecryptionKey, DocumentId, Password, ReadCode, UpdateCode};

/// Warning shown permanently after creating an encrypted document.
pub const DECRYPTION_KEY_WARNING: &str =
    "Keep your decryption key safe! If you lose it, you won't be able to read this document later.";

/// Warning shown permanently after creating an unencrypted document.
pub const UPDATE_LINK_WARNING: &str =
    "Keep your update URL safe! If you lose it, you won't be able to edit this document later.";

/// Body of `POST /documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    pub privacy: Privacy,
    pub expiry_status: ExpiryStatusRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_status: Option<PasswordStatusRecord>,
    #[serde(default)]
    pub is_encrypted: bool,
}

/// Body of `PUT /documents`. Absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocumentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Privacy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_status: Option<ExpiryStatusRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_status: Option<PasswordStatusRecord>,
    pub update_code: UpdateCode,
}

/// Body of `POST /documents/delete`. Both capability tokens are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDocumentRequest {
    pub id: DocumentId,
    pub read_code: ReadCode,
    pub update_code: UpdateCode,
}

/// Response body of `POST /documents` when encryption was requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedDocumentBody {
    pub decryption_key: DecryptionKey,
    pub document: Document,
}

/// Credentials presented on a gated read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub password: Option<Password>,
    pub decryption_key: Option<DecryptionKey>,
}

impl Credentials {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Password::new(password));
        self
    }

    pub fn with_decryption_key(mut self, key: impl Into<String>) -> Self {
        self.decryption_key = Some(DecryptionKey::new(key));
        self
    }

    pub fn has_password(&self) -> bool {
        self.password.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_decryption_key(&self) -> bool {
        self.decryption_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Query parameters for `GET /documents/read/:code`; blank values are omitted.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(password) = self.password.as_ref().filter(|p| !p.is_empty()) {
            pairs.push(("password", password.expose().to_string()));
        }
        if let Some(key) = self.decryption_key.as_ref().filter(|k| !k.is_empty()) {
            pairs.push(("key", key.expose().to_string()));
        }
        pairs
    }
}

/// A document released by the read endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadDocument {
    pub document: Document,
    /// Whether the server already holds a report for this document.
    pub is_reported: bool,
}

/// Outcome of a successful creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedDocument {
    /// Unencrypted: carries its update code.
    Plain(Document),
    /// Encrypted: no update code; the key is shown once and never again.
    Encrypted {
        document: Document,
        decryption_key: DecryptionKey,
    },
}

impl CreatedDocument {
    pub fn document(&self) -> &Document {
        match self {
            CreatedDocument::Plain(document) => document,
            CreatedDocument::Encrypted { document, .. } => document,
        }
    }

    pub fn decryption_key(&self) -> Option<&DecryptionKey> {
        match self {
            CreatedDocument::Plain(_) => None,
            CreatedDocument::Encrypted { decryption_key, .. } => Some(decryption_key),
        }
    }

    /// The warning that must stay visible for as long as the result is shown.
    pub fn retention_warning(&self) -> &'static str {
        match self {
            CreatedDocument::Plain(_) => UPDATE_LINK_WARNING,
            CreatedDocument::Encrypted { .. } => DECRYPTION_KEY_WARNING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{never_expires_date, Expiry};

    #[test]
    fn test_create_request_serialization() {
        let req = CreateDocumentRequest {
            title: "T".to_string(),
            content: "C".to_string(),
            tags: vec![],
            doc_type: DocumentType::Text,
            syntax: None,
            privacy: Privacy::Public,
            expiry_status: Expiry::Never.into(),
            password_status: None,
            is_encrypted: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "TEXT");
        assert_eq!(json["privacy"], "PUBLIC");
        assert_eq!(json["isEncrypted"], false);
        assert_eq!(json["expiryStatus"]["isExpiring"], false);
        assert_eq!(
            json["expiryStatus"]["expirationDate"],
            serde_json::to_value(never_expires_date()).unwrap()
        );
        assert!(json.get("syntax").is_none());
        assert!(json.get("passwordStatus").is_none());
    }

    #[test]
    fn test_update_request_omits_unchanged_fields() {
        let req = UpdateDocumentRequest {
            id: DocumentId::new("doc-1"),
            title: Some("New title".to_string()),
            content: None,
            active: None,
            tags: None,
            doc_type: None,
            syntax: None,
            privacy: None,
            expiry_status: None,
            password_status: None,
            update_code: UpdateCode::new("upd"),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "doc-1", "title": "New title", "updateCode": "upd" })
        );
    }

    #[test]
    fn test_credentials_query_pairs_skip_blank() {
        let creds = Credentials::none()
            .with_password("   ")
            .with_decryption_key("k3y");
        assert_eq!(creds.to_query_pairs(), vec![("key", "k3y".to_string())]);
        assert!(!creds.has_password());
        assert!(creds.has_decryption_key());
    }
}
