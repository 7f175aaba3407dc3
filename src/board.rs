//! The editable ranking table: view state plus the edit session.
//!
//! Rows are selected and ordered by their saved baseline so that a row
//! being edited does not jump around the table; the displayed values come
//! from the edit overlay. Any navigation that would move edited rows out of
//! view discards the pending edits, and only after the user confirms.

use serde::Serialize;

use crate::error::PortfolioError;
use crate::ranking::{FilterChange, RankedService, RankingView, SortKey};
use crate::repository::ServiceRepository;
use crate::session::{
    Confirm, EditSession, FieldChanges, SaveBatch, SaveReport, SaveResults, ServiceEdit,
};
use crate::store::ServiceStore;
use crate::types::Role;

pub const NAVIGATION_PROMPT: &str =
    "You have unsaved changes that will be discarded. Continue?";

/// A user action that changes which rows the table shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Filter(FilterChange),
    ClearFilters,
    Sort(SortKey),
    Page(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRow {
    /// Effective values, with pending edits applied.
    #[serde(flatten)]
    pub row: RankedService,
    pub changes: FieldChanges,
    pub modified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPage {
    pub rows: Vec<BoardRow>,
    pub page_number: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub start_index: usize,
    pub pending_edits: usize,
    pub saving: bool,
    pub read_only: bool,
}

#[derive(Debug, Default)]
pub struct RankingBoard {
    view: RankingView,
    session: EditSession,
    /// Page count of the last render; `None` until rendered or after the
    /// filter changes.
    last_total_pages: Option<usize>,
}

impl RankingBoard {
    pub fn new(page_size: usize, role: Role) -> Self {
        Self {
            view: RankingView::new(page_size),
            session: EditSession::new(role),
            last_total_pages: None,
        }
    }

    pub fn view(&self) -> &RankingView {
        &self.view
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Apply a navigation. With edits pending the user is asked first; on
    /// decline nothing changes, on accept the edits are dropped and the
    /// navigation applied. A page past the last rendered page is clamped to
    /// it first. Returns whether the view changed.
    pub fn navigate(
        &mut self,
        navigation: Navigation,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, PortfolioError> {
        if self.session.is_saving() {
            return Err(PortfolioError::Busy);
        }

        let mut next = self.view.clone();
        match navigation {
            Navigation::Filter(change) => next.apply_filter(change),
            Navigation::ClearFilters => next.clear_filters(),
            Navigation::Sort(key) => next.toggle_sort(key),
            Navigation::Page(page_number) => next.go_to_page(
                self.last_total_pages
                    .map_or(page_number, |last| page_number.min(last)),
            ),
        }
        if next == self.view {
            return Ok(false);
        }

        if self.session.has_pending() {
            if !confirm.confirm(NAVIGATION_PROMPT) {
                log::debug!("Navigation cancelled, keeping unsaved edits");
                return Ok(false);
            }
            log::info!(
                "Discarding {} unsaved edits on navigation",
                self.session.pending_count()
            );
            self.session.clear_confirmed();
        }

        if self.view.filter() != next.filter() {
            self.last_total_pages = None;
        }
        self.view = next;
        Ok(true)
    }

    pub fn edit(
        &mut self,
        store: &ServiceStore,
        id: i64,
        edit: ServiceEdit,
    ) -> Result<bool, PortfolioError> {
        self.session.edit_in(store, id, edit)
    }

    pub fn discard_all(&mut self, confirm: &mut dyn Confirm) -> Result<bool, PortfolioError> {
        self.session.discard_all(confirm)
    }

    pub async fn save_all(
        &mut self,
        store: &mut ServiceStore,
        repo: &dyn ServiceRepository,
    ) -> Result<SaveReport, PortfolioError> {
        self.session.save_all(store, repo).await
    }

    /// Snapshot pending edits for dispatch. Navigation is refused with
    /// `Busy` until `finish_save`.
    pub fn begin_save(&mut self) -> Result<SaveBatch, PortfolioError> {
        self.session.begin_save()
    }

    pub fn finish_save(&mut self, store: &mut ServiceStore, results: SaveResults) -> SaveReport {
        self.session.finish_save(store, results)
    }

    /// Drop edits for records that vanished or now match a refreshed baseline.
    pub fn reconcile(&mut self, store: &ServiceStore) {
        self.session.prune(store);
    }

    pub fn render(&mut self, store: &ServiceStore) -> BoardPage {
        let page = self.view.render(store.all());

        let rows = page
            .rows
            .into_iter()
            .map(|ranked| {
                let baseline = &ranked.service;
                let changes = self.session.field_changes(baseline);
                let effective = self.session.effective(baseline).clone();
                BoardRow {
                    modified: changes.any(),
                    changes,
                    row: RankedService::new(effective),
                }
            })
            .collect();

        self.last_total_pages = Some(page.total_pages);
        BoardPage {
            rows,
            page_number: page.page_number,
            total_pages: page.total_pages,
            total_matches: page.total_matches,
            start_index: page.start_index,
            pending_edits: self.session.pending_count(),
            saving: self.session.is_saving(),
            read_only: self.session.is_read_only(),
        }
    }
}
