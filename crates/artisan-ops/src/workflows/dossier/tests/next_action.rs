use chrono::Duration;

use super::common::{
    appointment, clock, creneaux_entry, days_ago, dossier, invoice, quote, signed_quote,
    site_visit,
};
use crate::workflows::dossier::domain::{
    AppointmentStatus, Invoice, InvoiceStatus, QuoteStatus,
};
use crate::workflows::dossier::next_action::{NextActionResolver, Urgency};
use crate::workflows::dossier::DossierStatus;

fn resolver() -> NextActionResolver {
    NextActionResolver::default()
}

#[test]
fn overdue_invoice_dominates_all_other_state() {
    let now = clock();
    let due = days_ago(now, 5);
    let mut dossier = dossier(DossierStatus::Signe);
    dossier.quotes.push(signed_quote(30.0, 70.0));
    dossier
        .invoices
        .push(invoice("FAC-2026-001-A", InvoiceStatus::EnRetard, Some(due)));
    dossier.appointments.push(appointment(
        AppointmentStatus::Planifie,
        None,
        Some(days_ago(now, 2)),
    ));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Relancer le paiement");
    assert_eq!(rec.urgency, Urgency::Urgent);
    assert_eq!(rec.deadline, Some(due));
    assert!(rec.description.contains("5 jour(s)"));
}

#[test]
fn sent_invoice_past_due_counts_as_overdue() {
    let now = clock();
    let due = days_ago(now, 1);
    let mut dossier = dossier(DossierStatus::ChantierEnCours);
    dossier
        .invoices
        .push(invoice("FAC-2026-002", InvoiceStatus::Envoyee, Some(due)));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Relancer le paiement");
    assert_eq!(rec.urgency, Urgency::Urgent);
}

#[test]
fn invoice_without_number_falls_back_to_truncated_id() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::Signe);
    dossier.invoices.push(Invoice {
        id: "9f8e7d6c5b4a".to_string(),
        number: None,
        status: InvoiceStatus::EnRetard,
        due_date: Some(days_ago(now, 2)),
    });

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Relancer le paiement");
    assert!(rec.description.contains("#9f8e7d6c"));
}

#[test]
fn signed_quote_with_deposit_terms_requests_deposit_invoice() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::Signe);
    dossier.quotes.push(signed_quote(30.0, 70.0));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Créer la facture d'acompte");
    assert_eq!(rec.urgency, Urgency::High);
    assert!(rec.description.contains("30%"));
    let button = rec.action_button.expect("button");
    assert!(button.href.contains("action=creer_facture_acompte"));
}

#[test]
fn signed_quote_without_terms_asks_for_invoice_before_works() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::Signe);
    dossier.quotes.push(quote(QuoteStatus::Signe));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Créer la facture");
    assert_ne!(rec.action, "Démarrer le chantier");
    assert_eq!(rec.urgency, Urgency::High);
}

#[test]
fn signed_quote_full_upfront_requests_single_invoice() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::Signe);
    dossier.quotes.push(signed_quote(100.0, 0.0));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Créer la facture");
    assert!(rec.description.contains("une seule fois"));
}

#[test]
fn signed_quote_zero_deposit_starts_chantier() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::Signe);
    dossier.quotes.push(signed_quote(0.0, 100.0));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Démarrer le chantier");
    assert_eq!(rec.urgency, Urgency::High);
}

#[test]
fn unpaid_deposit_invoice_waits_for_payment() {
    let now = clock();
    let due = now + Duration::days(10);
    let mut dossier = dossier(DossierStatus::Signe);
    dossier.quotes.push(signed_quote(30.0, 70.0));
    dossier
        .invoices
        .push(invoice("FAC-2026-003-A", InvoiceStatus::Envoyee, Some(due)));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "En attente du paiement de l'acompte");
    assert_eq!(rec.urgency, Urgency::Normal);
    assert_eq!(rec.deadline, Some(due));
}

#[test]
fn paid_deposit_starts_chantier() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::Signe);
    dossier.quotes.push(signed_quote(30.0, 70.0));
    dossier
        .invoices
        .push(invoice("FAC-2026-003-A", InvoiceStatus::Payee, None));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Démarrer le chantier");
    assert_eq!(rec.urgency, Urgency::High);
    assert!(rec.description.contains("acompte est réglé"));
}

#[test]
fn chantier_en_cours_mentions_upcoming_solde() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::ChantierEnCours);
    dossier.quotes.push(signed_quote(30.0, 70.0));
    dossier
        .invoices
        .push(invoice("FAC-2026-003-A", InvoiceStatus::Payee, None));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Terminer le chantier");
    assert_eq!(rec.urgency, Urgency::Normal);
    assert!(rec.description.contains("solde"));
}

#[test]
fn chantier_termine_requests_balance_invoice() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::ChantierTermine);
    dossier.quotes.push(signed_quote(30.0, 70.0));
    dossier
        .invoices
        .push(invoice("FAC-2026-003-A", InvoiceStatus::Payee, None));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Créer la facture de solde");
    assert_eq!(rec.urgency, Urgency::High);
}

#[test]
fn chantier_termine_without_invoices_requests_invoice() {
    let now = clock();
    let dossier = dossier(DossierStatus::ChantierTermine);

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Créer la facture");
    assert_eq!(rec.urgency, Urgency::High);
}

#[test]
fn stale_visit_without_quote_escalates() {
    let now = clock();
    let visited_at = days_ago(now, 5);
    let mut dossier = dossier(DossierStatus::VisiteRealisee);
    dossier.site_visits.push(site_visit(Some(visited_at)));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Créer le devis");
    assert_eq!(rec.urgency, Urgency::High);
    assert_eq!(rec.deadline, Some(visited_at + Duration::days(3)));
    assert!(rec.description.contains("5 jour(s)"));
}

#[test]
fn fresh_visit_without_quote_stays_normal() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::VisiteRealisee);
    dossier.site_visits.push(site_visit(Some(days_ago(now, 1))));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Créer le devis");
    assert_eq!(rec.urgency, Urgency::Normal);
}

#[test]
fn visit_status_without_fiche_still_requests_quote() {
    let now = clock();
    let dossier = dossier(DossierStatus::VisiteRealisee);

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Créer le devis");
    assert_eq!(rec.urgency, Urgency::Normal);
    assert_eq!(rec.deadline, None);
}

#[test]
fn devis_pret_status_prompts_send() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::DevisPret);
    dossier.quotes.push(quote(QuoteStatus::Pret));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Envoyer le devis");
    assert_eq!(rec.urgency, Urgency::Normal);
    assert!(rec.description.contains("DEV-2026-001"));
}

#[test]
fn quote_sent_ten_days_ago_prompts_normal_follow_up() {
    let now = clock();
    let sent_at = days_ago(now, 10);
    let mut dossier = dossier(DossierStatus::DevisEnvoye);
    let mut sent = quote(QuoteStatus::Envoye);
    sent.sent_at = Some(sent_at);
    dossier.quotes.push(sent);

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Relancer le client");
    assert_eq!(rec.urgency, Urgency::Normal);
    assert_eq!(rec.deadline, Some(sent_at + Duration::days(7)));
}

#[test]
fn quote_sent_fifteen_days_ago_escalates_follow_up() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::DevisEnvoye);
    let mut sent = quote(QuoteStatus::Envoye);
    sent.sent_at = Some(days_ago(now, 15));
    dossier.quotes.push(sent);

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Relancer le client");
    assert_eq!(rec.urgency, Urgency::High);
}

#[test]
fn recently_sent_quote_waits_for_signature() {
    let now = clock();
    let sent_at = days_ago(now, 2);
    let mut dossier = dossier(DossierStatus::DevisEnvoye);
    let mut sent = quote(QuoteStatus::Envoye);
    sent.sent_at = Some(sent_at);
    dossier.quotes.push(sent);

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "En attente de signature du client");
    assert_eq!(rec.urgency, Urgency::Normal);
    assert_eq!(rec.deadline, Some(sent_at + Duration::days(7)));
}

#[test]
fn visit_with_draft_quote_prompts_send() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::VisiteRealisee);
    dossier.site_visits.push(site_visit(Some(days_ago(now, 2))));
    dossier.quotes.push(quote(QuoteStatus::Brouillon));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Envoyer le devis");
    assert!(rec.description.contains("brouillon"));
}

#[test]
fn ready_quote_on_any_stage_prompts_send() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::Qualification);
    dossier.quotes.push(quote(QuoteStatus::Pret));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    // The generic fallback outranks "schedule an appointment".
    assert_eq!(rec.action, "Envoyer le devis");
}

#[test]
fn slots_sent_four_days_ago_prompt_follow_up() {
    let now = clock();
    let sent_at = days_ago(now, 4);
    let mut dossier = dossier(DossierStatus::RdvAPlanifier);
    dossier.journal.push(creneaux_entry(sent_at));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Relancer pour les créneaux");
    assert_eq!(rec.urgency, Urgency::High);
    assert_eq!(rec.deadline, Some(sent_at + Duration::days(3)));
}

#[test]
fn freshly_sent_slots_wait_for_confirmation() {
    let now = clock();
    let sent_at = days_ago(now, 1);
    let mut dossier = dossier(DossierStatus::RdvAPlanifier);
    dossier.journal.push(creneaux_entry(sent_at));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "En attente de confirmation du client");
    assert_eq!(rec.urgency, Urgency::Normal);
}

#[test]
fn journal_mention_outside_lookback_is_ignored() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::RdvAPlanifier);
    dossier.journal.push(creneaux_entry(days_ago(now, 10)));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    // Slots are still implied by the stage, but without a dated reference
    // the resolver cannot escalate.
    assert_eq!(rec.action, "En attente de confirmation du client");
    assert_eq!(rec.deadline, None);
}

#[test]
fn stale_planned_appointment_prompts_follow_up() {
    let now = clock();
    let created_at = days_ago(now, 5);
    let mut dossier = dossier(DossierStatus::ContactRecu);
    dossier
        .appointments
        .push(appointment(AppointmentStatus::Planifie, None, Some(created_at)));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Relancer pour les créneaux");
    assert_eq!(rec.urgency, Urgency::High);
    assert_eq!(rec.deadline, Some(created_at + Duration::days(3)));
    assert!(rec.description.contains("rendez-vous"));
}

#[test]
fn qualification_without_appointments_schedules_visit() {
    let now = clock();
    let dossier = dossier(DossierStatus::Qualification);

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Planifier un rendez-vous");
    assert_eq!(rec.urgency, Urgency::Normal);
}

#[test]
fn confirmed_future_appointment_prepares_visit() {
    let now = clock();
    let scheduled_at = now + Duration::days(2);
    let mut dossier = dossier(DossierStatus::RdvPlanifie);
    dossier.appointments.push(appointment(
        AppointmentStatus::Confirme,
        Some(scheduled_at),
        Some(days_ago(now, 1)),
    ));

    let rec = resolver().resolve(&dossier, now).expect("recommendation");

    assert_eq!(rec.action, "Préparer la visite");
    assert_eq!(rec.urgency, Urgency::Normal);
    assert_eq!(rec.deadline, Some(scheduled_at));
}

#[test]
fn neutral_dossier_yields_no_recommendation() {
    let now = clock();
    let dossier = dossier(DossierStatus::Termine);

    assert_eq!(resolver().resolve(&dossier, now), None);
}

#[test]
fn unknown_status_degrades_to_none() {
    let now = clock();
    let parsed: crate::workflows::dossier::Dossier = serde_json::from_value(serde_json::json!({
        "id": "dos-inconnu",
        "status": "archive",
    }))
    .expect("partial snapshot deserializes");

    assert_eq!(parsed.status, DossierStatus::Autre);
    assert_eq!(resolver().resolve(&parsed, now), None);
}

#[test]
fn resolver_is_deterministic_for_a_pinned_clock() {
    let now = clock();
    let mut dossier = dossier(DossierStatus::DevisEnvoye);
    let mut sent = quote(QuoteStatus::Envoye);
    sent.sent_at = Some(days_ago(now, 9));
    dossier.quotes.push(sent);

    let first = resolver().resolve(&dossier, now);
    let second = resolver().resolve(&dossier, now);

    assert_eq!(first, second);
    assert!(first.is_some());
}
