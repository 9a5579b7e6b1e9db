use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{
    Appointment, Dossier, DossierId, DossierStatus, Invoice, JournalEntry, Quote, SiteVisit,
};
use super::intake::SnapshotInspector;
use super::next_action::{NextActionResolver, Recommendation, ResolverConfig};
use super::repository::{DossierRecord, DossierRepository, RepositoryError};

/// Inbound snapshot for registration; the service assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DossierSubmission {
    pub status: DossierStatus,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub site_visits: Vec<SiteVisit>,
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
}

impl DossierSubmission {
    fn into_dossier(self, id: DossierId) -> Dossier {
        Dossier {
            id,
            status: self.status,
            appointments: self.appointments,
            quotes: self.quotes,
            invoices: self.invoices,
            site_visits: self.site_visits,
            journal: self.journal,
        }
    }
}

static DOSSIER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_dossier_id() -> DossierId {
    let id = DOSSIER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DossierId(format!("dos-{id:06}"))
}

/// Service composing the intake inspector, repository, and resolver.
pub struct DossierService<R> {
    inspector: SnapshotInspector,
    repository: Arc<R>,
    resolver: NextActionResolver,
}

impl<R> DossierService<R>
where
    R: DossierRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: ResolverConfig) -> Self {
        Self {
            inspector: SnapshotInspector::new(),
            repository,
            resolver: NextActionResolver::new(config),
        }
    }

    /// Register a new dossier snapshot, returning the repository-backed record.
    ///
    /// Intake findings are logged but never block registration.
    pub fn register(
        &self,
        submission: DossierSubmission,
    ) -> Result<DossierRecord, DossierServiceError> {
        let id = next_dossier_id();
        let dossier = submission.into_dossier(id.clone());

        for finding in self.inspector.findings(&dossier) {
            warn!(dossier_id = %id, "intake: {}", finding.summary());
        }

        let record = DossierRecord {
            dossier,
            registered_at: Utc::now(),
            last_recommendation: None,
        };

        let stored = self.repository.insert(record)?;
        Ok(stored)
    }

    /// Fetch a dossier record for API responses.
    pub fn get(&self, id: &DossierId) -> Result<DossierRecord, DossierServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(DossierServiceError::NotFound)
    }

    /// Resolve the next action as of the given instant (defaults to now) and
    /// persist it on the record.
    pub fn next_action(
        &self,
        id: &DossierId,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Option<Recommendation>, DossierServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(DossierServiceError::NotFound)?;

        let as_of = as_of.unwrap_or_else(Utc::now);
        let recommendation = self.resolver.resolve(&record.dossier, as_of);

        record.last_recommendation = recommendation.clone();
        self.repository.update(record)?;

        Ok(recommendation)
    }
}

/// Error raised by the dossier service.
#[derive(Debug, thiserror::Error)]
pub enum DossierServiceError {
    #[error("dossier not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
