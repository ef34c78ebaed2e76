use serde::{Deserialize, Serialize};

use crate::models::document::{Document, DocumentType, Tags};

/// Default page size of the public listing.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "views")]
    Views,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "createdAt",
            SortBy::Views => "views",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filter set of the public listing.
///
/// `Default` is the cleared state: no tags, any type, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListFilters {
    /// Documents must carry at least these tags.
    pub tags: Tags,
    pub doc_type: Option<DocumentType>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// One page request against `GET /documents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub filters: ListFilters,
}

impl ListQuery {
    /// Encode as query pairs. Tags are sent as repeated `tags[]` parameters
    /// and omitted entirely when no tag is selected.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        for tag in self.filters.tags.iter() {
            pairs.push(("tags[]".to_string(), tag.to_string()));
        }
        if let Some(doc_type) = self.filters.doc_type {
            pairs.push(("type".to_string(), doc_type.to_string()));
        }
        pairs.push(("sortBy".to_string(), self.filters.sort_by.as_str().to_string()));
        pairs.push((
            "sortOrder".to_string(),
            self.filters.sort_order.as_str().to_string(),
        ));
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_count: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub page_size: u32,
    pub has_next: bool,
}

/// One page of the public listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub data: Vec<Document>,
    pub pagination: Pagination,
}
