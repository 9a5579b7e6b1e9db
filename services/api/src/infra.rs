use artisan_ops::workflows::dossier::{
    DossierId, DossierRecord, DossierRepository, RepositoryError, ResolverConfig,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDossierRepository {
    records: Arc<Mutex<HashMap<DossierId, DossierRecord>>>,
}

impl DossierRepository for InMemoryDossierRepository {
    fn insert(&self, record: DossierRecord) -> Result<DossierRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.dossier.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.dossier.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: DossierRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.dossier.id) {
            guard.insert(record.dossier.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &DossierId) -> Result<Option<DossierRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<DossierRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(crate) fn default_resolver_config() -> ResolverConfig {
    ResolverConfig::default()
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as RFC 3339 ({err})"))
}
