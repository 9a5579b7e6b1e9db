use chrono::{DateTime, Duration, Utc};

use super::super::domain::{Appointment, AppointmentStatus, Dossier, Invoice, Quote};
use super::ResolverConfig;

/// Pre-computed lookups shared by the rule chain.
pub(crate) struct DossierSignals<'a> {
    pub overdue_invoice: Option<&'a Invoice>,
    pub signed_quote: Option<&'a Quote>,
    pub deposit_invoice: Option<&'a Invoice>,
    pub balance_invoice: Option<&'a Invoice>,
    pub latest_visit_at: Option<DateTime<Utc>>,
    pub confirmed_appointment: Option<&'a Appointment>,
    /// Earliest proposed-but-unconfirmed rendez-vous, by creation date.
    pub earliest_planned: Option<&'a Appointment>,
    pub has_open_appointment: bool,
    /// When the "créneaux" notification was last logged, within the lookback.
    pub slots_sent_at: Option<DateTime<Utc>>,
}

pub(crate) fn gather<'a>(
    dossier: &'a Dossier,
    config: &ResolverConfig,
    now: DateTime<Utc>,
) -> DossierSignals<'a> {
    let lookback = Duration::days(config.journal_lookback_days);
    let slots_sent_at = dossier
        .journal
        .iter()
        .filter(|entry| entry.mentions_creneaux())
        .filter_map(|entry| entry.created_at)
        .filter(|at| *at <= now && now.signed_duration_since(*at) <= lookback)
        .max();

    DossierSignals {
        overdue_invoice: dossier
            .invoices
            .iter()
            .find(|invoice| invoice.is_overdue(now)),
        signed_quote: dossier.signed_quote(),
        deposit_invoice: dossier.deposit_invoice(),
        balance_invoice: dossier.balance_invoice(),
        latest_visit_at: dossier.latest_visit_at(),
        confirmed_appointment: dossier.confirmed_appointment(),
        earliest_planned: dossier
            .appointments
            .iter()
            .filter(|appointment| appointment.status == AppointmentStatus::Planifie)
            .min_by_key(|appointment| (appointment.created_at.is_none(), appointment.created_at)),
        has_open_appointment: dossier.appointments.iter().any(|appointment| {
            matches!(
                appointment.status,
                AppointmentStatus::Planifie | AppointmentStatus::Confirme
            )
        }),
        slots_sent_at,
    }
}

impl DossierSignals<'_> {
    /// A solde payment is still to come: either the signed devis splits the
    /// amount, or a deposit invoice already exists.
    pub(crate) fn balance_expected(&self) -> bool {
        if self.deposit_invoice.is_some() {
            return true;
        }
        self.signed_quote
            .and_then(|quote| quote.payment_terms.as_ref())
            .map(|terms| terms.requires_deposit() || terms.balance_pct > 0.0)
            .unwrap_or(false)
    }
}
