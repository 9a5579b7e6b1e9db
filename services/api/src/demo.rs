use crate::infra::parse_timestamp;
use artisan_ops::error::AppError;
use artisan_ops::workflows::dossier::{
    Appointment, AppointmentStatus, Dossier, DossierId, DossierStatus, Invoice, InvoiceStatus,
    JournalEntry, NextActionResolver, PaymentTerms, Quote, QuoteStatus, Recommendation, SiteVisit,
    SnapshotInspector, Urgency,
};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ResolveArgs {
    /// Path to a dossier snapshot stored as JSON
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Resolve as of this instant (RFC 3339, defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Resolve as of this instant (RFC 3339, defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

pub(crate) fn run_resolve(args: ResolveArgs) -> Result<(), AppError> {
    let ResolveArgs { snapshot, as_of } = args;

    let raw = std::fs::read_to_string(&snapshot)?;
    let dossier: Dossier = serde_json::from_str(&raw)
        .map_err(|err| AppError::InvalidInput(format!("invalid dossier snapshot: {err}")))?;

    let as_of = as_of.unwrap_or_else(Utc::now);
    render_resolution(&dossier, as_of);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(Utc::now);

    println!("Artisan back-office demo (evaluated {})", as_of.to_rfc3339());
    for dossier in sample_dossiers(as_of) {
        println!();
        render_resolution(&dossier, as_of);
    }

    Ok(())
}

fn render_resolution(dossier: &Dossier, as_of: DateTime<Utc>) {
    println!("Dossier {} ({})", dossier.id, dossier.status.label());

    let findings = SnapshotInspector::new().findings(dossier);
    for finding in &findings {
        println!("  Incohérence: {}", finding.summary());
    }

    match NextActionResolver::default().resolve(dossier, as_of) {
        Some(recommendation) => render_recommendation(&recommendation),
        None => println!("  Aucune action recommandée."),
    }
}

fn render_recommendation(recommendation: &Recommendation) {
    let urgency = match recommendation.urgency {
        Urgency::Urgent => "URGENT",
        Urgency::High => "haute",
        Urgency::Normal => "normale",
    };
    println!(
        "  -> {} (priorité {})",
        recommendation.action, urgency
    );
    println!("     {}", recommendation.description);
    if let Some(deadline) = recommendation.deadline {
        println!("     Échéance: {}", deadline.format("%d/%m/%Y"));
    }
    if let Some(button) = &recommendation.action_button {
        println!("     [{}] {}", button.label, button.href);
    }
}

fn sample_dossiers(now: DateTime<Utc>) -> Vec<Dossier> {
    let empty = |id: &str, status: DossierStatus| Dossier {
        id: DossierId(id.to_string()),
        status,
        appointments: Vec::new(),
        quotes: Vec::new(),
        invoices: Vec::new(),
        site_visits: Vec::new(),
        journal: Vec::new(),
    };

    // Fresh contact with nothing scheduled.
    let contact = empty("dos-demo-contact", DossierStatus::ContactRecu);

    // Visit slots proposed four days ago, still unanswered.
    let mut slots = empty("dos-demo-creneaux", DossierStatus::RdvAPlanifier);
    slots.journal.push(JournalEntry {
        id: "jnl-demo-1".to_string(),
        created_at: Some(now - Duration::days(4)),
        title: "Notification".to_string(),
        body: "Créneaux de visite proposés au client.".to_string(),
        kind: Some("notification".to_string()),
    });

    // Confirmed rendez-vous later this week.
    let mut confirmed = empty("dos-demo-rdv", DossierStatus::RdvPlanifie);
    confirmed.appointments.push(Appointment {
        id: "rdv-demo-1".to_string(),
        status: AppointmentStatus::Confirme,
        scheduled_at: Some(now + Duration::days(3)),
        created_at: Some(now - Duration::days(1)),
    });

    // Visit done five days ago, no devis written yet.
    let mut visited = empty("dos-demo-visite", DossierStatus::VisiteRealisee);
    visited.site_visits.push(SiteVisit {
        id: "fv-demo-1".to_string(),
        created_at: Some(now - Duration::days(5)),
    });

    // Devis sent ten days ago without an answer.
    let mut waiting = empty("dos-demo-devis", DossierStatus::DevisEnvoye);
    waiting.quotes.push(Quote {
        id: "dev-demo-1".to_string(),
        number: Some("DEV-2026-010".to_string()),
        status: QuoteStatus::Envoye,
        sent_at: Some(now - Duration::days(10)),
        payment_terms: None,
    });

    // Signed devis with a 30/70 split, acompte not yet invoiced.
    let mut signed = empty("dos-demo-signe", DossierStatus::Signe);
    signed.quotes.push(Quote {
        id: "dev-demo-2".to_string(),
        number: Some("DEV-2026-011".to_string()),
        status: QuoteStatus::Signe,
        sent_at: Some(now - Duration::days(20)),
        payment_terms: Some(PaymentTerms {
            name: Some("acompte_solde".to_string()),
            deposit_pct: 30.0,
            balance_pct: 70.0,
        }),
    });

    // Acompte invoice overdue for a week.
    let mut overdue = empty("dos-demo-retard", DossierStatus::ChantierEnCours);
    overdue.invoices.push(Invoice {
        id: "fac-demo-1".to_string(),
        number: Some("FAC-2026-011-A".to_string()),
        status: InvoiceStatus::Envoyee,
        due_date: Some(now - Duration::days(7)),
    });

    vec![
        contact, slots, confirmed, visited, waiting, signed, overdue,
    ]
}
