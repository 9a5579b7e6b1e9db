//! Consistency inspection for incoming dossier snapshots.
//!
//! The lifecycle stage and the sub-collections carry redundant signals (a
//! dossier can claim `visite_realisee` without a fiche de visite). Findings
//! are logged at registration time; they never block registration and never
//! change what the resolver returns.

use serde::Serialize;

use super::domain::{AppointmentStatus, Dossier, DossierStatus, InvoiceStatus, QuoteStatus};

/// A non-fatal mismatch between the recorded stage and the sub-collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    /// Stage says the visit happened but no fiche de visite exists.
    VisitClaimedWithoutFiche,
    /// Stage says the devis is signed but no devis carries a signed status.
    SignedWithoutSignedQuote,
    /// A devis is marked sent without a send date.
    SentQuoteMissingDate { quote_id: String },
    /// A facture is sent without a due date, so it can never become overdue.
    SentInvoiceMissingDueDate { invoice_id: String },
    /// A confirmed rendez-vous has no scheduled date.
    ConfirmedAppointmentMissingDate { appointment_id: String },
}

impl Inconsistency {
    pub fn summary(&self) -> String {
        match self {
            Inconsistency::VisitClaimedWithoutFiche => {
                "statut visite_realisee sans fiche de visite".to_string()
            }
            Inconsistency::SignedWithoutSignedQuote => {
                "statut signe sans devis signé".to_string()
            }
            Inconsistency::SentQuoteMissingDate { quote_id } => {
                format!("devis {quote_id} envoyé sans date d'envoi")
            }
            Inconsistency::SentInvoiceMissingDueDate { invoice_id } => {
                format!("facture {invoice_id} envoyée sans date d'échéance")
            }
            Inconsistency::ConfirmedAppointmentMissingDate { appointment_id } => {
                format!("rendez-vous {appointment_id} confirmé sans date")
            }
        }
    }
}

/// Boundary check comparing the stage against the sub-collection contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotInspector;

impl SnapshotInspector {
    pub fn new() -> Self {
        Self
    }

    pub fn findings(&self, dossier: &Dossier) -> Vec<Inconsistency> {
        let mut findings = Vec::new();

        if dossier.status == DossierStatus::VisiteRealisee && !dossier.has_site_visit() {
            findings.push(Inconsistency::VisitClaimedWithoutFiche);
        }

        if dossier.status == DossierStatus::Signe && dossier.signed_quote().is_none() {
            findings.push(Inconsistency::SignedWithoutSignedQuote);
        }

        for quote in &dossier.quotes {
            if quote.status == QuoteStatus::Envoye && quote.sent_at.is_none() {
                findings.push(Inconsistency::SentQuoteMissingDate {
                    quote_id: quote.id.clone(),
                });
            }
        }

        for invoice in &dossier.invoices {
            if invoice.status == InvoiceStatus::Envoyee && invoice.due_date.is_none() {
                findings.push(Inconsistency::SentInvoiceMissingDueDate {
                    invoice_id: invoice.id.clone(),
                });
            }
        }

        for appointment in &dossier.appointments {
            if appointment.status == AppointmentStatus::Confirme
                && appointment.scheduled_at.is_none()
            {
                findings.push(Inconsistency::ConfirmedAppointmentMissingDate {
                    appointment_id: appointment.id.clone(),
                });
            }
        }

        findings
    }
}
