use anyhow::{anyhow, Result};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use shared_client::ClinicApiClient;
use shared_config::AppConfig;

use crate::models::{CreateProfessionalRequest, Professional, WeeklyAvailability};
use crate::services::availability::AvailabilityGrid;

pub struct ProfessionalService {
    client: ClinicApiClient,
}

impl ProfessionalService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: ClinicApiClient::new(config),
        }
    }

    pub async fn get_professional(&self, professional_id: i64, auth_token: &str) -> Result<Professional> {
        debug!("Fetching professional: {}", professional_id);

        let path = format!("/professionals/{}", professional_id);
        let professional: Professional = self
            .client
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(professional)
    }

    /// Editor state for an existing professional, seeded from their persisted schedule.
    pub async fn load_availability(&self, professional_id: i64, auth_token: &str) -> Result<AvailabilityGrid> {
        let professional = self.get_professional(professional_id, auth_token).await?;
        Ok(AvailabilityGrid::from_schedules(professional_id, &professional.schedules))
    }

    /// Replaces the professional's schedule with the export of `availability`.
    pub async fn save_availability(
        &self,
        professional_id: i64,
        availability: WeeklyAvailability,
        auth_token: &str,
    ) -> Result<Professional> {
        let professional = self.get_professional(professional_id, auth_token).await?;

        let grid = AvailabilityGrid::with_availability(Some(professional_id), availability);
        let entries = grid.export();
        debug!("Saving {} schedule entries for professional {}", entries.len(), professional_id);

        let payload = serde_json::to_value(professional.into_payload(entries))?;
        let path = format!("/professionals/{}", professional_id);
        let updated: Option<Professional> = self
            .client
            .request(Method::PUT, &path, Some(auth_token), Some(payload))
            .await?;

        info!("Availability updated for professional {}", professional_id);

        match updated {
            Some(professional) => Ok(professional),
            None => self.get_professional(professional_id, auth_token).await,
        }
    }

    pub async fn create_professional(
        &self,
        request: CreateProfessionalRequest,
        auth_token: &str,
    ) -> Result<Professional> {
        request.validate().map_err(|e| anyhow!("Validation error: {}", e))?;

        let CreateProfessionalRequest {
            name,
            email,
            phone,
            specialty,
            availability,
            extra,
        } = request;

        let entries = AvailabilityGrid::with_availability(None, availability).export();
        let draft = Professional {
            id: None,
            name,
            email,
            phone,
            specialty,
            schedules: Vec::new(),
            extra,
        };

        debug!("Creating professional {} with {} schedule entries", draft.email, entries.len());

        let payload = serde_json::to_value(draft.into_payload(entries))?;
        let created: Value = self
            .client
            .request(Method::POST, "/professionals", Some(auth_token), Some(payload))
            .await?;

        let professional: Professional = serde_json::from_value(created)?;
        info!("Professional created with ID: {:?}", professional.id);

        Ok(professional)
    }
}
