use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::client::TextbinApi;
use crate::error::TextbinError;
use crate::models::document::Document;
use crate::models::listing::{ListFilters, ListQuery, Pagination};

/// Result of one [`ListingEngine::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A page was fetched and appended.
    Loaded { page: u32, added: usize },
    /// Nothing to do: a page is already in flight or the sequence is exhausted.
    Idle,
    /// The filters changed while the page was in flight; its result was dropped.
    Discarded,
}

/// Forward-only, restartable sequence of public document pages.
///
/// At most one page fetch is outstanding at any time. Changing the filters
/// restarts the sequence at page 1 and drops whatever is still in flight.
pub struct ListingEngine {
    api: Arc<dyn TextbinApi>,
    page_size: u32,
    state: Mutex<ListingState>,
}

struct ListingState {
    filters: ListFilters,
    /// Bumped on every restart; a result tagged with an older value is stale.
    generation: u64,
    next_page: u32,
    has_next: bool,
    in_flight: bool,
    documents: Vec<Document>,
    pagination: Option<Pagination>,
}

impl ListingState {
    fn new(filters: ListFilters) -> Self {
        Self {
            filters,
            generation: 0,
            next_page: 1,
            has_next: true,
            in_flight: false,
            documents: Vec::new(),
            pagination: None,
        }
    }

    fn restart(&mut self, filters: ListFilters) {
        let generation = self.generation + 1;
        *self = Self::new(filters);
        self.generation = generation;
    }
}

impl ListingEngine {
    pub fn new(api: Arc<dyn TextbinApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            state: Mutex::new(ListingState::new(ListFilters::default())),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn filters(&self) -> ListFilters {
        self.state().filters.clone()
    }

    /// Documents loaded so far, in server order.
    pub fn documents(&self) -> Vec<Document> {
        self.state().documents.clone()
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.state().pagination
    }

    pub fn has_next(&self) -> bool {
        self.state().has_next
    }

    pub fn is_loading(&self) -> bool {
        self.state().in_flight
    }

    /// Replace the filters and restart at page 1.
    pub fn set_filters(&self, filters: ListFilters) {
        let mut state = self.state();
        state.restart(filters);
        tracing::debug!("Listing restarted (generation {})", state.generation);
    }

    /// Change part of the filters and restart at page 1.
    ///
    /// `change` runs with the listing locked and must not call back into it.
    pub fn update_filters(&self, change: impl FnOnce(&mut ListFilters)) {
        let mut state = self.state();
        let mut filters = state.filters.clone();
        change(&mut filters);
        state.restart(filters);
        tracing::debug!("Listing restarted (generation {})", state.generation);
    }

    /// Reset to no tags, any type, newest first.
    pub fn clear_filters(&self) {
        self.set_filters(ListFilters::default());
    }

    /// Visibility signal of the end-of-list sentinel.
    pub async fn on_visibility_change(&self, visible: bool) -> Result<Advance, TextbinError> {
        if !visible {
            return Ok(Advance::Idle);
        }
        self.advance().await
    }

    /// Fetch the next page unless one is in flight or there are no more.
    ///
    /// On failure the page is not advanced and the next call retries it.
    pub async fn advance(&self) -> Result<Advance, TextbinError> {
        let (query, generation) = {
            let mut state = self.state();
            if state.in_flight || !state.has_next {
                return Ok(Advance::Idle);
            }
            state.in_flight = true;
            let query = ListQuery {
                page: state.next_page,
                limit: self.page_size,
                filters: state.filters.clone(),
            };
            (query, state.generation)
        };

        tracing::debug!("Fetching listing page {}", query.page);
        let result = self.api.list_documents(&query).await;

        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!("Discarding stale listing page {}", query.page);
            return Ok(Advance::Discarded);
        }
        state.in_flight = false;

        let page = result?;
        let added = page.data.len();
        let current = page.pagination.current_page;
        state.documents.extend(page.data);
        state.next_page = current.saturating_add(1);
        state.has_next = page.pagination.has_next && current < u32::MAX;
        state.pagination = Some(page.pagination);

        tracing::debug!(
            "Loaded listing page {current}: {added} documents, has_next={}",
            state.has_next
        );
        Ok(Advance::Loaded {
            page: current,
            added,
        })
    }

    fn state(&self) -> MutexGuard<'_, ListingState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
