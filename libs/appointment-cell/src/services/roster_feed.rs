use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use shared_backend::{BackendError, ClinicApiClient};

use crate::models::AppointmentRecord;

/// Point-in-time copy of the backend's appointment list.
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    /// Ticket of the fetch that produced this snapshot; 0 before the first fetch.
    pub generation: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub records: Vec<AppointmentRecord>,
}

/// Shared appointment roster. Only the newest issued fetch may replace the
/// shared snapshot, so a slow response never overwrites a fresher one.
///
/// `refresh` always hands the caller the records fetched with its own token;
/// the shared snapshot is never served in place of a caller's fetch.
pub struct RosterFeed {
    backend: Arc<ClinicApiClient>,
    issued: AtomicU64,
    current: RwLock<Arc<RosterSnapshot>>,
}

impl RosterFeed {
    pub fn new(backend: Arc<ClinicApiClient>) -> Self {
        Self {
            backend,
            issued: AtomicU64::new(0),
            current: RwLock::new(Arc::new(RosterSnapshot::default())),
        }
    }

    pub async fn snapshot(&self) -> Arc<RosterSnapshot> {
        self.current.read().await.clone()
    }

    /// Re-fetch the roster. On failure the previous snapshot is kept.
    pub async fn refresh(&self, auth_token: &str) -> Result<Arc<RosterSnapshot>, BackendError> {
        let ticket = self.issue_ticket();
        debug!("Fetching appointment roster (ticket {})", ticket);

        let raw: Vec<Value> = self.backend
            .get("/appointments", Some(auth_token))
            .await
            .map_err(|e| {
                error!("Error fetching appointment roster (ticket {}): {}", ticket, e);
                e
            })?;

        let fetched = Arc::new(RosterSnapshot {
            generation: ticket,
            fetched_at: Some(Utc::now()),
            records: decode_records(raw),
        });
        self.commit(fetched.clone()).await;

        Ok(fetched)
    }

    pub(crate) fn issue_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install `fetched` unless a newer ticket has already been committed.
    /// Returns whichever snapshot is current afterwards.
    pub(crate) async fn commit(&self, fetched: Arc<RosterSnapshot>) -> Arc<RosterSnapshot> {
        let mut current = self.current.write().await;

        if fetched.generation > current.generation {
            debug!("Committing roster ticket {} with {} records", fetched.generation, fetched.records.len());
            *current = fetched;
        } else {
            warn!(
                "Discarding stale roster response (ticket {}, current generation {})",
                fetched.generation, current.generation
            );
        }

        current.clone()
    }
}

/// Each record is read on its own; one the gateway cannot understand is
/// skipped instead of failing the whole roster.
fn decode_records(raw: Vec<Value>) -> Vec<AppointmentRecord> {
    let total = raw.len();
    let records: Vec<AppointmentRecord> = raw
        .into_iter()
        .filter_map(|entry| {
            let id = entry.get("id").cloned().unwrap_or(Value::Null);
            serde_json::from_value(entry)
                .map_err(|e| warn!("Skipping undecodable roster record {}: {}", id, e))
                .ok()
        })
        .collect();

    if records.len() < total {
        warn!("Dropped {} of {} roster records", total - records.len(), total);
    }
    records
}
