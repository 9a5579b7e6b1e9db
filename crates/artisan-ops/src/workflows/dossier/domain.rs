//! Domain model for a client engagement ("dossier") and its sub-collections.
//!
//! The shapes mirror the records served by the managed backend: every date is
//! optional and every sub-collection defaults to empty, so a partial snapshot
//! deserializes cleanly instead of erroring. Lifecycle enums keep their
//! original French snake_case wire values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for dossiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DossierId(pub String);

impl std::fmt::Display for DossierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle stage recorded on the dossier itself.
///
/// The stage is a loosely-coupled signal: several rules cross-check it
/// against the sub-collections (a dossier can claim `visite_realisee` while
/// the fiche de visite is still missing). Unknown stages map to [`Self::Autre`]
/// so the resolver degrades to "no recommendation" instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DossierStatus {
    Qualification,
    ContactRecu,
    RdvAPlanifier,
    RdvPlanifie,
    VisiteRealisee,
    DevisEnCours,
    DevisEnPreparation,
    DevisPret,
    DevisEnvoye,
    Signe,
    ChantierEnCours,
    ChantierTermine,
    Termine,
    Perdu,
    #[serde(other)]
    Autre,
}

impl DossierStatus {
    pub fn label(self) -> &'static str {
        match self {
            DossierStatus::Qualification => "qualification",
            DossierStatus::ContactRecu => "contact_recu",
            DossierStatus::RdvAPlanifier => "rdv_a_planifier",
            DossierStatus::RdvPlanifie => "rdv_planifie",
            DossierStatus::VisiteRealisee => "visite_realisee",
            DossierStatus::DevisEnCours => "devis_en_cours",
            DossierStatus::DevisEnPreparation => "devis_en_preparation",
            DossierStatus::DevisPret => "devis_pret",
            DossierStatus::DevisEnvoye => "devis_envoye",
            DossierStatus::Signe => "signe",
            DossierStatus::ChantierEnCours => "chantier_en_cours",
            DossierStatus::ChantierTermine => "chantier_termine",
            DossierStatus::Termine => "termine",
            DossierStatus::Perdu => "perdu",
            DossierStatus::Autre => "autre",
        }
    }
}

/// State of a scheduled rendez-vous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Planifie,
    Confirme,
    Annule,
    Termine,
    #[serde(other)]
    Autre,
}

/// A visit slot proposed to or booked with the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub status: AppointmentStatus,
    /// When the visit is due to take place.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// When the slot was first proposed/recorded.
    pub created_at: Option<DateTime<Utc>>,
}

/// State of a devis (quote).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Brouillon,
    EnPreparation,
    Pret,
    Envoye,
    #[serde(alias = "accepte")]
    Signe,
    Refuse,
    Expire,
    #[serde(other)]
    Autre,
}

impl QuoteStatus {
    /// Draft, in-preparation, or ready: written but never sent.
    pub fn is_unsent(self) -> bool {
        matches!(
            self,
            QuoteStatus::Brouillon | QuoteStatus::EnPreparation | QuoteStatus::Pret
        )
    }
}

/// Named payment policy attached to a signed devis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub name: Option<String>,
    /// Deposit ("acompte") share, in percent of the devis total.
    pub deposit_pct: f64,
    /// Balance ("solde") share, in percent of the devis total.
    pub balance_pct: f64,
}

impl PaymentTerms {
    /// Deposit of (about) 100%: the whole amount is billed in one invoice.
    pub fn is_full_upfront(&self) -> bool {
        self.deposit_pct >= 100.0 - 1e-6
    }

    pub fn requires_deposit(&self) -> bool {
        self.deposit_pct > 0.0 && !self.is_full_upfront()
    }
}

/// A priced proposal ("devis") sent to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    /// Human-readable number, e.g. `DEV-2026-014`.
    pub number: Option<String>,
    pub status: QuoteStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub payment_terms: Option<PaymentTerms>,
}

impl Quote {
    pub fn display_number(&self) -> String {
        display_number(self.number.as_deref(), &self.id)
    }
}

/// State of a facture (invoice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Brouillon,
    Envoyee,
    Payee,
    EnRetard,
    #[serde(other)]
    Autre,
}

/// A payment request ("facture").
///
/// By numbering convention a deposit invoice carries the `-A` suffix
/// (acompte) and a balance invoice the `-S` suffix (solde).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub number: Option<String>,
    pub status: InvoiceStatus,
    pub due_date: Option<DateTime<Utc>>,
}

impl Invoice {
    pub fn is_deposit(&self) -> bool {
        self.number
            .as_deref()
            .map(|number| number.ends_with("-A"))
            .unwrap_or(false)
    }

    pub fn is_balance(&self) -> bool {
        self.number
            .as_deref()
            .map(|number| number.ends_with("-S"))
            .unwrap_or(false)
    }

    /// Flagged overdue by the backend, or sent with a due date in the past.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            InvoiceStatus::EnRetard => true,
            InvoiceStatus::Envoyee => self
                .due_date
                .map(|due_date| due_date < now)
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn display_number(&self) -> String {
        display_number(self.number.as_deref(), &self.id)
    }
}

/// Evidence that a physical site visit took place ("fiche de visite").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteVisit {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Free-text log entry attached to the dossier ("journal").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Type tag assigned by the backend, e.g. `notification`.
    pub kind: Option<String>,
}

impl JournalEntry {
    /// Substring heuristic used to detect the "visit slots sent" system
    /// notification. Kept byte-compatible with the legacy behavior; a
    /// structured event type on the journal would make this obsolete.
    pub fn mentions_creneaux(&self) -> bool {
        let needle = "créneaux";
        self.title.to_lowercase().contains(needle) || self.body.to_lowercase().contains(needle)
    }
}

/// The aggregate business record tracking one client engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dossier {
    pub id: DossierId,
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

impl Dossier {
    pub fn signed_quote(&self) -> Option<&Quote> {
        self.quotes
            .iter()
            .find(|quote| quote.status == QuoteStatus::Signe)
    }

    pub fn deposit_invoice(&self) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.is_deposit())
    }

    pub fn balance_invoice(&self) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.is_balance())
    }

    /// Most recent fiche de visite timestamp, when any is dated.
    pub fn latest_visit_at(&self) -> Option<DateTime<Utc>> {
        self.site_visits
            .iter()
            .filter_map(|visit| visit.created_at)
            .max()
    }

    pub fn has_site_visit(&self) -> bool {
        !self.site_visits.is_empty()
    }

    pub fn confirmed_appointment(&self) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|appointment| appointment.status == AppointmentStatus::Confirme)
    }
}

/// Human number when present, otherwise a truncated-id placeholder.
///
/// Display-only: the resolver never branches on this value.
pub fn display_number(number: Option<&str>, id: &str) -> String {
    match number {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => format!("#{}", id.chars().take(8).collect::<String>()),
    }
}
