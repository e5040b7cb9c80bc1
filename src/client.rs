//! Read-modify-write operations over the single stored document.
//!
//! Every mutation loads the whole document, changes it in memory and writes
//! the whole thing back. Nothing is locked or versioned, so two overlapping
//! mutations race and the last completed write wins. Failures never reach the
//! caller as errors: loads fall back to the default document, and a failed
//! write reverts the change in the returned copy only.

use crate::models::{AppData, MutationOutcome, NewEntry, RevenueEntry, Settings, SettingsPatch};
use crate::store::{DocumentStore, StoreError};
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct PersistenceClient<S> {
    store: S,
    default_settings: Settings,
}

impl<S: DocumentStore> PersistenceClient<S> {
    pub fn new(store: S, default_settings: Settings) -> Self {
        Self {
            store,
            default_settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn default_data(&self) -> AppData {
        AppData::with_settings(self.default_settings.clone())
    }

    /// Never fails; a missing, unreachable or malformed document all read as
    /// the default document.
    pub async fn load(&self) -> AppData {
        match self.store.fetch().await {
            Ok(Some(data)) => data,
            Ok(None) => self.default_data(),
            Err(err) => {
                error!("failed to load document, serving defaults: {err}");
                self.default_data()
            }
        }
    }

    /// Unconditional overwrite; `false` on any store failure.
    pub async fn save(&self, data: &AppData) -> bool {
        self.try_save(data).await.is_ok()
    }

    pub async fn try_save(&self, data: &AppData) -> Result<(), StoreError> {
        self.store.put(data).await.inspect_err(|err| {
            error!("failed to save document: {err}");
        })
    }

    pub async fn add_entry(&self, entry: NewEntry) -> MutationOutcome {
        let mut data = self.load().await;
        let id = Uuid::new_v4().to_string();
        data.entries.push(RevenueEntry {
            id: id.clone(),
            amount: entry.amount,
            date: entry.date,
            note: entry.note,
        });

        let saved = self.save(&data).await;
        if saved {
            info!("added entry {id}");
        } else {
            warn!("rolling back entry {id} after failed save");
            data.entries.retain(|existing| existing.id != id);
        }

        MutationOutcome { data, saved }
    }

    pub async fn delete_entry(&self, id: &str) -> MutationOutcome {
        let mut data = self.load().await;
        let Some(position) = data.entries.iter().position(|entry| entry.id == id) else {
            info!("entry {id} not found, nothing to delete");
            return MutationOutcome { data, saved: true };
        };

        let removed = data.entries.remove(position);
        let saved = self.save(&data).await;
        if saved {
            info!("deleted entry {id}");
        } else {
            warn!("restoring entry {id} after failed save");
            data.entries.insert(position, removed);
        }

        MutationOutcome { data, saved }
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> MutationOutcome {
        let mut data = self.load().await;
        let previous = data.settings.clone();
        data.settings.apply(patch);

        let saved = self.save(&data).await;
        if saved {
            info!(
                "settings now target={} demo_day={:?}",
                data.settings.target_revenue, data.settings.demo_day
            );
        } else {
            warn!("restoring previous settings after failed save");
            data.settings = previous;
        }

        MutationOutcome { data, saved }
    }
}
