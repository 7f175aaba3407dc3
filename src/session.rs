//! Unsaved-edit overlay for the ranking table.
//!
//! The store keeps the baseline; the session keeps a sparse map of edited
//! snapshots keyed by id. Nothing reaches the backend until a save batch
//! runs, and a failed update leaves its edit in place for another attempt.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::Serialize;

use crate::error::PortfolioError;
use crate::repository::ServiceRepository;
use crate::store::ServiceStore;
use crate::types::{clamp_revenue, Role, Service, ServiceStatus, CRITERIA_COUNT};

pub const DISCARD_PROMPT: &str =
    "Discard all unsaved changes? This cannot be undone.";

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A single-field change from the ranking table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceEdit {
    Score { index: usize, value: i64 },
    RevenueEstimate(f64),
    Status(ServiceStatus),
}

/// Which visible fields differ from the baseline, for cell highlighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChanges {
    pub scores: [bool; CRITERIA_COUNT],
    pub revenue_estimate: bool,
    pub status: bool,
}

impl FieldChanges {
    pub fn between(baseline: &Service, edited: &Service) -> Self {
        let mut scores = [false; CRITERIA_COUNT];
        for (index, changed) in scores.iter_mut().enumerate() {
            *changed = baseline.scores.get(index) != edited.scores.get(index);
        }
        Self {
            scores,
            revenue_estimate: baseline.revenue_estimate != edited.revenue_estimate,
            status: baseline.status != edited.status,
        }
    }

    pub fn any(&self) -> bool {
        self.revenue_estimate || self.status || self.scores.iter().any(|c| *c)
    }
}

#[derive(Debug)]
pub struct SaveFailure {
    pub id: i64,
    pub error: PortfolioError,
}

/// Outcome of a save batch once every update has resolved.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub saved: Vec<i64>,
    pub failed: Vec<SaveFailure>,
}

impl SaveReport {
    pub fn all_saved(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Snapshots handed to the backend by [`EditSession::begin_save`].
#[derive(Debug, Clone)]
pub struct SaveBatch {
    services: Vec<Service>,
}

impl SaveBatch {
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Send every update concurrently. Each record goes out as one
    /// full-record update call.
    pub async fn dispatch(self, repo: &dyn ServiceRepository) -> SaveResults {
        let calls = self.services.iter().map(|service| async move {
            (service.id, repo.update_service(service).await)
        });
        SaveResults {
            results: join_all(calls).await,
        }
    }
}

/// Per-record results of a dispatched batch.
#[derive(Debug)]
pub struct SaveResults {
    results: Vec<(i64, Result<Service, PortfolioError>)>,
}

#[derive(Debug, Default)]
pub struct EditSession {
    edits: BTreeMap<i64, Service>,
    saving: bool,
    read_only: bool,
}

impl EditSession {
    pub fn new(role: Role) -> Self {
        Self {
            edits: BTreeMap::new(),
            saving: false,
            read_only: !role.can_edit(),
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Number of records with unsaved changes.
    pub fn pending_count(&self) -> usize {
        self.edits.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Ids whose snapshot differs from the current baseline.
    pub fn modified_ids(&self, store: &ServiceStore) -> Vec<i64> {
        self.edits
            .iter()
            .filter(|(id, snapshot)| store.get(**id).map_or(true, |base| base != *snapshot))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn snapshot(&self, id: i64) -> Option<&Service> {
        self.edits.get(&id)
    }

    /// The version of a record to display: the edited snapshot if any.
    pub fn effective<'a>(&'a self, baseline: &'a Service) -> &'a Service {
        self.edits.get(&baseline.id).unwrap_or(baseline)
    }

    pub fn field_changes(&self, baseline: &Service) -> FieldChanges {
        self.edits
            .get(&baseline.id)
            .map(|edited| FieldChanges::between(baseline, edited))
            .unwrap_or_default()
    }

    fn ensure_writable(&self) -> Result<(), PortfolioError> {
        if self.read_only {
            return Err(PortfolioError::ReadOnly);
        }
        if self.saving {
            return Err(PortfolioError::Busy);
        }
        Ok(())
    }

    /// Apply `edit` on top of any pending snapshot for the record, clamping
    /// scores into `0..=5` and revenue to `>= 0`. Returns whether the record
    /// is now modified; an edit that restores the baseline drops the entry.
    pub fn edit(&mut self, baseline: &Service, edit: ServiceEdit) -> Result<bool, PortfolioError> {
        self.ensure_writable()?;

        let mut snapshot = self
            .edits
            .get(&baseline.id)
            .cloned()
            .unwrap_or_else(|| baseline.clone());

        match edit {
            ServiceEdit::Score { index, value } => {
                snapshot.scores.set(index, value)?;
            }
            ServiceEdit::RevenueEstimate(value) => snapshot.revenue_estimate = clamp_revenue(value),
            ServiceEdit::Status(status) => snapshot.status = status,
        }

        if snapshot == *baseline {
            self.edits.remove(&baseline.id);
            Ok(false)
        } else {
            self.edits.insert(baseline.id, snapshot);
            Ok(true)
        }
    }

    /// [`edit`](Self::edit) against the record's baseline in `store`.
    pub fn edit_in(
        &mut self,
        store: &ServiceStore,
        id: i64,
        edit: ServiceEdit,
    ) -> Result<bool, PortfolioError> {
        let baseline = store.get(id).ok_or(PortfolioError::NotFound(id))?;
        self.edit(baseline, edit)
    }

    /// Drop every pending edit after the user confirms. Returns whether
    /// anything was discarded; with nothing pending no prompt is shown.
    pub fn discard_all(&mut self, confirm: &mut dyn Confirm) -> Result<bool, PortfolioError> {
        self.ensure_writable()?;
        if self.edits.is_empty() {
            return Ok(false);
        }
        if !confirm.confirm(DISCARD_PROMPT) {
            return Ok(false);
        }
        log::info!("Discarded {} unsaved edits", self.edits.len());
        self.edits.clear();
        Ok(true)
    }

    /// Clear edits without prompting. Callers must have obtained
    /// confirmation already.
    pub(crate) fn clear_confirmed(&mut self) {
        self.edits.clear();
    }

    /// Drop edits whose record no longer exists or matches its baseline
    /// again, e.g. after a refresh.
    pub fn prune(&mut self, store: &ServiceStore) {
        self.edits
            .retain(|id, snapshot| store.get(*id).is_some_and(|base| base != snapshot));
    }

    /// Freeze the pending edits into a batch and enter the saving state.
    /// Edits and discards are refused until [`finish_save`](Self::finish_save).
    pub fn begin_save(&mut self) -> Result<SaveBatch, PortfolioError> {
        self.ensure_writable()?;
        self.saving = true;
        Ok(SaveBatch {
            services: self.edits.values().cloned().collect(),
        })
    }

    /// Commit accepted records into the store and leave failed ones pending.
    pub fn finish_save(&mut self, store: &mut ServiceStore, results: SaveResults) -> SaveReport {
        let mut report = SaveReport::default();

        for (id, result) in results.results {
            match result {
                Ok(saved) => {
                    if let Err(e) = store.replace(saved) {
                        // Deleted while the update was in flight.
                        log::warn!("Saved service {} is no longer in the store: {}", id, e);
                    }
                    self.edits.remove(&id);
                    report.saved.push(id);
                }
                Err(error) => {
                    log::warn!("Failed to save service {}: {}", id, error);
                    report.failed.push(SaveFailure { id, error });
                }
            }
        }

        self.saving = false;
        log::info!(
            "Save batch finished: {} saved, {} failed",
            report.saved.len(),
            report.failed.len()
        );
        report
    }

    /// Begin, dispatch and finish a save batch.
    pub async fn save_all(
        &mut self,
        store: &mut ServiceStore,
        repo: &dyn ServiceRepository,
    ) -> Result<SaveReport, PortfolioError> {
        let batch = self.begin_save()?;
        let results = batch.dispatch(repo).await;
        Ok(self.finish_save(store, results))
    }
}
