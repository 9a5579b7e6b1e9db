//! Dossier workflow: domain model, intake inspection, next-action engine,
//! and the HTTP surface over the storage seam.

pub mod domain;
pub mod intake;
pub mod next_action;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Appointment, AppointmentStatus, Dossier, DossierId, DossierStatus, Invoice, InvoiceStatus,
    JournalEntry, PaymentTerms, Quote, QuoteStatus, SiteVisit,
};
pub use intake::{Inconsistency, SnapshotInspector};
pub use next_action::{
    ActionButton, NextActionResolver, Recommendation, ResolverConfig, Urgency,
};
pub use repository::{DossierRecord, DossierRepository, DossierStatusView, RepositoryError};
pub use router::dossier_router;
pub use service::{DossierService, DossierServiceError, DossierSubmission};
