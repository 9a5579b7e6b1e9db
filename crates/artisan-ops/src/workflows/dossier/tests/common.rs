use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::dossier::domain::{
    Appointment, AppointmentStatus, Dossier, DossierId, Invoice, InvoiceStatus, JournalEntry,
    PaymentTerms, Quote, QuoteStatus, SiteVisit,
};
use crate::workflows::dossier::repository::{
    DossierRecord, DossierRepository, RepositoryError,
};
use crate::workflows::dossier::DossierStatus;

/// Pinned clock so every assertion on elapsed days is deterministic.
pub(super) fn clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

pub(super) fn dossier(status: DossierStatus) -> Dossier {
    Dossier {
        id: DossierId("dos-fixture".to_string()),
        status,
        appointments: Vec::new(),
        quotes: Vec::new(),
        invoices: Vec::new(),
        site_visits: Vec::new(),
        journal: Vec::new(),
    }
}

pub(super) fn quote(status: QuoteStatus) -> Quote {
    Quote {
        id: "dev-1".to_string(),
        number: Some("DEV-2026-001".to_string()),
        status,
        sent_at: None,
        payment_terms: None,
    }
}

pub(super) fn signed_quote(deposit_pct: f64, balance_pct: f64) -> Quote {
    Quote {
        payment_terms: Some(PaymentTerms {
            name: Some("acompte_solde".to_string()),
            deposit_pct,
            balance_pct,
        }),
        ..quote(QuoteStatus::Signe)
    }
}

pub(super) fn invoice(
    number: &str,
    status: InvoiceStatus,
    due_date: Option<DateTime<Utc>>,
) -> Invoice {
    Invoice {
        id: format!("fac-{}", number.to_lowercase()),
        number: Some(number.to_string()),
        status,
        due_date,
    }
}

pub(super) fn site_visit(created_at: Option<DateTime<Utc>>) -> SiteVisit {
    SiteVisit {
        id: "fv-1".to_string(),
        created_at,
    }
}

pub(super) fn appointment(
    status: AppointmentStatus,
    scheduled_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
) -> Appointment {
    Appointment {
        id: "rdv-1".to_string(),
        status,
        scheduled_at,
        created_at,
    }
}

pub(super) fn creneaux_entry(created_at: DateTime<Utc>) -> JournalEntry {
    JournalEntry {
        id: "jnl-1".to_string(),
        created_at: Some(created_at),
        title: "Créneaux envoyés".to_string(),
        body: "3 créneaux de visite proposés au client.".to_string(),
        kind: Some("notification".to_string()),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<DossierId, DossierRecord>>>,
}

impl DossierRepository for MemoryRepository {
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
        guard.insert(record.dossier.id.clone(), record);
        Ok(())
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

pub(super) struct ConflictRepository;

impl DossierRepository for ConflictRepository {
    fn insert(&self, _record: DossierRecord) -> Result<DossierRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: DossierRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &DossierId) -> Result<Option<DossierRecord>, RepositoryError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<DossierRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl DossierRepository for UnavailableRepository {
    fn insert(&self, _record: DossierRecord) -> Result<DossierRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn update(&self, _record: DossierRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn fetch(&self, _id: &DossierId) -> Result<Option<DossierRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn list(&self) -> Result<Vec<DossierRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }
}
