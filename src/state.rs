use std::sync::Arc;

use chrono::FixedOffset;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use crate::{
    config::Config,
    models::{AppointmentDetail, Lead, Review, TextEnum},
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub events: broadcast::Sender<ServerEvent>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            db,
            events,
            config: Arc::new(config),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.config.business_offset
    }

    /// Fire-and-forget: nobody listening is not an error.
    pub fn publish(&self, event: ServerEvent) {
        let _ = self.events.send(event);
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ServerEvent {
    pub kind: String,
    pub entity_id: String,
    pub summary: String,
}

impl ServerEvent {
    pub fn lead_created(lead: &Lead) -> Self {
        let service = lead.service_interested.as_deref().unwrap_or("a service");
        Self {
            kind: "lead_created".to_string(),
            entity_id: lead.id.clone(),
            summary: format!("New enquiry from {} about {}.", lead.full_name, service),
        }
    }

    pub fn review_submitted(review: &Review) -> Self {
        Self {
            kind: "review_submitted".to_string(),
            entity_id: review.id.clone(),
            summary: format!(
                "{} left a {}-star review awaiting approval.",
                review.full_name, review.rating
            ),
        }
    }

    pub fn appointment(kind: &str, detail: &AppointmentDetail) -> Self {
        Self {
            kind: kind.to_string(),
            entity_id: detail.appointment.id.clone(),
            summary: format!(
                "{} for {} on {} ({}).",
                detail.service_name,
                detail.client_name,
                detail.appointment.appointment_date,
                detail.appointment.status.label()
            ),
        }
    }
}
