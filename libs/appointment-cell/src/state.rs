use std::sync::Arc;

use tracing::{info, warn};

use doctor_cell::SlotPolicy;
use shared_backend::{BackendError, ClinicApiClient};
use shared_config::AppConfig;

use crate::services::booking::BookingService;
use crate::services::roster_feed::RosterFeed;

/// Shared handler state. The roster feed lives here so every request sees
/// the same generation counter.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<ClinicApiClient>,
    pub roster: Arc<RosterFeed>,
    pub policy: SlotPolicy,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Result<Self, BackendError> {
        let backend = Arc::new(ClinicApiClient::new(&config)?);

        let policy = SlotPolicy::parse(&config.slot_windows).unwrap_or_else(|e| {
            warn!("Invalid slot windows '{}', using business hours: {}", config.slot_windows, e);
            SlotPolicy::default()
        });
        info!("Booking slots offered in {:?}", policy.windows());

        Ok(Self {
            roster: Arc::new(RosterFeed::new(backend.clone())),
            config,
            backend,
            policy,
        })
    }

    pub fn booking_service(&self) -> BookingService {
        BookingService::new(self.backend.clone(), self.roster.clone(), self.policy.clone())
    }
}
