use serde::{Deserialize, Serialize};

use crate::api::requests::CreatedDocument;
use crate::bookmarks::backend::{BookmarkBackend, FileBackend};
use crate::error::TextbinError;
use crate::links::ShareLinks;
use crate::models::document::Document;
use crate::models::tokens::{DecryptionKey, ReadCode};

/// A locally saved document together with the tokens needed to reach it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub document: Document,
    pub read_link: String,
    /// Only for unencrypted documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_link: Option<String>,
    /// Only for encrypted documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decryption_key: Option<DecryptionKey>,
}

impl Bookmark {
    pub fn from_created(created: &CreatedDocument, links: &ShareLinks) -> Self {
        let document = created.document().clone();
        Self {
            read_link: links.read_link(&document.read_code),
            update_link: document.update_code().map(|code| links.update_link(code)),
            decryption_key: created.decryption_key().cloned(),
            document,
        }
    }

    pub fn read_code(&self) -> &ReadCode {
        &self.document.read_code
    }
}

/// Ordered list of bookmarks persisted through a [`BookmarkBackend`].
///
/// Nothing is deduplicated and nothing expires: saving the same document
/// twice yields two entries, and bookmarks outlive the documents they point to.
pub struct BookmarkStore<B> {
    backend: B,
}

impl BookmarkStore<FileBackend> {
    /// Store backed by a JSON file.
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(FileBackend::new(path))
    }
}

impl<B: BookmarkBackend> BookmarkStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Append a bookmark.
    pub fn add(&self, bookmark: Bookmark) -> Result<(), TextbinError> {
        let mut bookmarks = self.load()?;
        tracing::debug!("Saving bookmark for document {}", bookmark.document.id);
        bookmarks.push(bookmark);
        self.store(&bookmarks)
    }

    /// All bookmarks, newest document first.
    pub fn list_all(&self) -> Result<Vec<Bookmark>, TextbinError> {
        let mut bookmarks = self.load()?;
        bookmarks.sort_by(|a, b| b.document.created_at.cmp(&a.document.created_at));
        Ok(bookmarks)
    }

    /// Remove every bookmark for `read_code`. Returns how many were removed.
    pub fn remove(&self, read_code: &ReadCode) -> Result<usize, TextbinError> {
        let mut bookmarks = self.load()?;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.read_code() != read_code);
        let removed = before - bookmarks.len();
        if removed > 0 {
            self.store(&bookmarks)?;
            tracing::debug!("Removed {removed} bookmark(s)");
        }
        Ok(removed)
    }

    pub fn clear_all(&self) -> Result<(), TextbinError> {
        self.backend.clear()?;
        tracing::debug!("Cleared all bookmarks");
        Ok(())
    }

    fn load(&self) -> Result<Vec<Bookmark>, TextbinError> {
        match self.backend.load()? {
            Some(data) if !data.trim().is_empty() => serde_json::from_str(&data)
                .map_err(|e| TextbinError::Storage(format!("Corrupted bookmark list: {e}"))),
            _ => Ok(Vec::new()),
        }
    }

    fn store(&self, bookmarks: &[Bookmark]) -> Result<(), TextbinError> {
        let data = serde_json::to_string(bookmarks)
            .map_err(|e| TextbinError::Storage(e.to_string()))?;
        self.backend.save(&data)
    }
}
