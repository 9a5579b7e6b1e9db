use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Dossier, DossierId};
use super::next_action::Recommendation;

/// Repository record wrapping the dossier snapshot with service metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DossierRecord {
    pub dossier: Dossier,
    pub registered_at: DateTime<Utc>,
    /// Recommendation computed on the most recent `next_action` call.
    pub last_recommendation: Option<Recommendation>,
}

impl DossierRecord {
    pub fn status_view(&self) -> DossierStatusView {
        DossierStatusView {
            dossier_id: self.dossier.id.clone(),
            status: self.dossier.status.label(),
            next_action: self
                .last_recommendation
                .as_ref()
                .map(|recommendation| recommendation.action.clone()),
        }
    }
}

/// Storage abstraction standing in for the managed backend, so the service
/// module can be exercised in isolation.
pub trait DossierRepository: Send + Sync {
    fn insert(&self, record: DossierRecord) -> Result<DossierRecord, RepositoryError>;
    fn update(&self, record: DossierRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &DossierId) -> Result<Option<DossierRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<DossierRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Compact representation of a dossier's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct DossierStatusView {
    pub dossier_id: DossierId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}
