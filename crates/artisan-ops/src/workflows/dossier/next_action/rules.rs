//! The priority-ordered rule chain. Rules are evaluated in declaration
//! order and the first match wins; a later rule is unreachable once an
//! earlier one fires.

use chrono::{DateTime, Duration, Utc};

use super::super::domain::{
    Dossier, DossierId, DossierStatus, InvoiceStatus, QuoteStatus,
};
use super::signals::DossierSignals;
use super::{ActionButton, Recommendation, ResolverConfig, Urgency};

pub(crate) fn next_action(
    dossier: &Dossier,
    config: &ResolverConfig,
    signals: &DossierSignals<'_>,
    now: DateTime<Utc>,
) -> Option<Recommendation> {
    if let Some(rec) = overdue_payment(signals, now) {
        return Some(rec);
    }
    if let Some(rec) = post_signature(dossier, signals) {
        return Some(rec);
    }
    if let Some(rec) = chantier_en_cours(dossier, signals) {
        return Some(rec);
    }
    if let Some(rec) = chantier_termine(dossier, signals) {
        return Some(rec);
    }
    if let Some(rec) = create_quote_after_visit(dossier, config, signals, now) {
        return Some(rec);
    }
    if let Some(rec) = send_prepared_quote(dossier) {
        return Some(rec);
    }
    if let Some(rec) = follow_up_sent_quote(dossier, config, now) {
        return Some(rec);
    }
    if let Some(rec) = send_quote_after_visit(dossier) {
        return Some(rec);
    }
    if let Some(rec) = send_ready_quote(dossier) {
        return Some(rec);
    }
    if let Some(rec) = slot_confirmation(dossier, config, signals, now) {
        return Some(rec);
    }
    if let Some(rec) = schedule_visit(dossier) {
        return Some(rec);
    }
    prepare_visit(dossier, signals, now)
}

/// Rule 1: an unpaid facture past its due date dominates everything else.
fn overdue_payment(signals: &DossierSignals<'_>, now: DateTime<Utc>) -> Option<Recommendation> {
    let invoice = signals.overdue_invoice?;
    let number = invoice.display_number();
    let description = match invoice.due_date {
        Some(due_date) if due_date < now => format!(
            "La facture {number} est en retard de {} jour(s).",
            days_since(now, due_date)
        ),
        _ => format!("La facture {number} est en retard de paiement."),
    };

    Some(Recommendation {
        action: "Relancer le paiement".to_string(),
        description,
        urgency: Urgency::Urgent,
        deadline: invoice.due_date,
        action_button: Some(ActionButton {
            label: "Voir la facture".to_string(),
            href: format!("/factures/{}", invoice.id),
        }),
    })
}

/// Rule 2: post-signature sequencing — acompte invoice, acompte payment,
/// then chantier start.
fn post_signature(dossier: &Dossier, signals: &DossierSignals<'_>) -> Option<Recommendation> {
    let quote = signals.signed_quote?;
    if dossier.status != DossierStatus::Signe {
        return None;
    }
    let number = quote.display_number();

    if dossier.invoices.is_empty() {
        let rec = match &quote.payment_terms {
            // No payment terms on the signed devis: ask for an invoice
            // before letting the chantier start.
            None => Recommendation {
                action: "Créer la facture".to_string(),
                description: format!(
                    "Le devis {number} est signé mais aucune condition de paiement n'est \
                     définie. Créer la facture avant de démarrer le chantier."
                ),
                urgency: Urgency::High,
                deadline: None,
                action_button: dossier_action(&dossier.id, "creer_facture", "Créer la facture"),
            },
            Some(terms) if terms.requires_deposit() => Recommendation {
                action: "Créer la facture d'acompte".to_string(),
                description: format!(
                    "Le devis {number} est signé. Émettre la facture d'acompte ({:.0}%).",
                    terms.deposit_pct
                ),
                urgency: Urgency::High,
                deadline: None,
                action_button: dossier_action(
                    &dossier.id,
                    "creer_facture_acompte",
                    "Créer la facture d'acompte",
                ),
            },
            Some(terms) if terms.is_full_upfront() => Recommendation {
                action: "Créer la facture".to_string(),
                description: format!(
                    "Le devis {number} est signé avec paiement en une seule fois. \
                     Émettre la facture."
                ),
                urgency: Urgency::High,
                deadline: None,
                action_button: dossier_action(&dossier.id, "creer_facture", "Créer la facture"),
            },
            // Deposit share of zero: nothing to invoice before the works.
            Some(_) => Recommendation {
                action: "Démarrer le chantier".to_string(),
                description: format!(
                    "Le devis {number} est signé sans acompte. Le chantier peut démarrer."
                ),
                urgency: Urgency::High,
                deadline: None,
                action_button: dossier_action(
                    &dossier.id,
                    "demarrer_chantier",
                    "Démarrer le chantier",
                ),
            },
        };
        return Some(rec);
    }

    if let Some(deposit) = signals.deposit_invoice {
        if deposit.status != InvoiceStatus::Payee {
            return Some(Recommendation {
                action: "En attente du paiement de l'acompte".to_string(),
                description: format!(
                    "La facture d'acompte {} est émise. Attendre son règlement avant de \
                     démarrer le chantier.",
                    deposit.display_number()
                ),
                urgency: Urgency::Normal,
                deadline: deposit.due_date,
                action_button: Some(ActionButton {
                    label: "Voir la facture".to_string(),
                    href: format!("/factures/{}", deposit.id),
                }),
            });
        }
    }

    let description = if signals.deposit_invoice.is_some() {
        "L'acompte est réglé. Le chantier peut démarrer.".to_string()
    } else {
        "Aucun acompte n'est attendu. Le chantier peut démarrer.".to_string()
    };
    Some(Recommendation {
        action: "Démarrer le chantier".to_string(),
        description,
        urgency: Urgency::High,
        deadline: None,
        action_button: dossier_action(&dossier.id, "demarrer_chantier", "Démarrer le chantier"),
    })
}

/// Rule 3: works in progress.
fn chantier_en_cours(dossier: &Dossier, signals: &DossierSignals<'_>) -> Option<Recommendation> {
    if dossier.status != DossierStatus::ChantierEnCours {
        return None;
    }
    let description = if signals.balance_expected() {
        "Chantier en cours. Une facture de solde sera à émettre à la fin des travaux.".to_string()
    } else {
        "Chantier en cours. Finaliser les travaux.".to_string()
    };

    Some(Recommendation {
        action: "Terminer le chantier".to_string(),
        description,
        urgency: Urgency::Normal,
        deadline: None,
        action_button: Some(ActionButton {
            label: "Voir le dossier".to_string(),
            href: format!("/dossiers/{}", dossier.id),
        }),
    })
}

/// Rule 4: works completed, billing to close out.
fn chantier_termine(dossier: &Dossier, signals: &DossierSignals<'_>) -> Option<Recommendation> {
    if dossier.status != DossierStatus::ChantierTermine {
        return None;
    }

    if signals.balance_expected() && signals.balance_invoice.is_none() {
        return Some(Recommendation {
            action: "Créer la facture de solde".to_string(),
            description: "Le chantier est terminé. Émettre la facture de solde.".to_string(),
            urgency: Urgency::High,
            deadline: None,
            action_button: dossier_action(
                &dossier.id,
                "creer_facture_solde",
                "Créer la facture de solde",
            ),
        });
    }

    if !signals.balance_expected() && dossier.invoices.is_empty() {
        return Some(Recommendation {
            action: "Créer la facture".to_string(),
            description: "Le chantier est terminé et aucune facture n'a été émise.".to_string(),
            urgency: Urgency::High,
            deadline: None,
            action_button: dossier_action(&dossier.id, "creer_facture", "Créer la facture"),
        });
    }

    None
}

/// Rule 5: visit done, no devis yet. Escalates after the configured delay.
fn create_quote_after_visit(
    dossier: &Dossier,
    config: &ResolverConfig,
    signals: &DossierSignals<'_>,
    now: DateTime<Utc>,
) -> Option<Recommendation> {
    let visited = dossier.status == DossierStatus::VisiteRealisee || dossier.has_site_visit();
    if !visited || !dossier.quotes.is_empty() {
        return None;
    }

    let action_button = dossier_action(&dossier.id, "creer_devis", "Créer le devis");
    let rec = match signals.latest_visit_at {
        Some(visit_at) => {
            let elapsed = days_since(now, visit_at);
            let urgency = if elapsed > config.visit_quote_delay_days {
                Urgency::High
            } else {
                Urgency::Normal
            };
            Recommendation {
                action: "Créer le devis".to_string(),
                description: format!(
                    "La visite a été réalisée il y a {elapsed} jour(s). Le client attend \
                     le devis."
                ),
                urgency,
                deadline: Some(visit_at + Duration::days(config.visit_quote_delay_days)),
                action_button,
            }
        }
        None => Recommendation {
            action: "Créer le devis".to_string(),
            description: "La visite est réalisée. Préparer le devis.".to_string(),
            urgency: Urgency::Normal,
            deadline: None,
            action_button,
        },
    };
    Some(rec)
}

/// Rule 6: dossier parked in a devis-preparation stage with an unsent devis.
fn send_prepared_quote(dossier: &Dossier) -> Option<Recommendation> {
    if !matches!(
        dossier.status,
        DossierStatus::DevisEnCours
            | DossierStatus::DevisEnPreparation
            | DossierStatus::DevisPret
    ) {
        return None;
    }
    let quote = dossier.quotes.iter().find(|quote| quote.status.is_unsent())?;
    let number = quote.display_number();
    let description = match quote.status {
        QuoteStatus::Pret => format!("Le devis {number} est prêt. L'envoyer au client."),
        _ => format!("Le devis {number} est encore en préparation. Le finaliser puis l'envoyer."),
    };

    Some(Recommendation {
        action: "Envoyer le devis".to_string(),
        description,
        urgency: Urgency::Normal,
        deadline: None,
        action_button: Some(ActionButton {
            label: "Voir le devis".to_string(),
            href: format!("/devis/{}", quote.id),
        }),
    })
}

/// Rule 7: devis sent, awaiting signature; follow up after 7 days, harder
/// after 14.
fn follow_up_sent_quote(
    dossier: &Dossier,
    config: &ResolverConfig,
    now: DateTime<Utc>,
) -> Option<Recommendation> {
    if dossier.status != DossierStatus::DevisEnvoye {
        return None;
    }
    let quote = dossier
        .quotes
        .iter()
        .find(|quote| quote.status == QuoteStatus::Envoye)?;
    let number = quote.display_number();

    let rec = match quote.sent_at {
        Some(sent_at) => {
            let elapsed = days_since(now, sent_at);
            let deadline = Some(sent_at + Duration::days(config.quote_follow_up_days));
            if elapsed >= config.quote_follow_up_days {
                let urgency = if elapsed >= config.quote_follow_up_urgent_days {
                    Urgency::High
                } else {
                    Urgency::Normal
                };
                Recommendation {
                    action: "Relancer le client".to_string(),
                    description: format!(
                        "Le devis {number} a été envoyé il y a {elapsed} jour(s) sans réponse."
                    ),
                    urgency,
                    deadline,
                    action_button: dossier_action(&dossier.id, "relance_devis", "Relancer"),
                }
            } else {
                Recommendation {
                    action: "En attente de signature du client".to_string(),
                    description: format!(
                        "Le devis {number} a été envoyé il y a {elapsed} jour(s). Laisser au \
                         client le temps de répondre."
                    ),
                    urgency: Urgency::Normal,
                    deadline,
                    action_button: Some(ActionButton {
                        label: "Voir le devis".to_string(),
                        href: format!("/devis/{}", quote.id),
                    }),
                }
            }
        }
        None => Recommendation {
            action: "En attente de signature du client".to_string(),
            description: format!("Le devis {number} a été envoyé. Attendre la réponse du client."),
            urgency: Urgency::Normal,
            deadline: None,
            action_button: Some(ActionButton {
                label: "Voir le devis".to_string(),
                href: format!("/devis/{}", quote.id),
            }),
        },
    };
    Some(rec)
}

/// Rule 8: visit done but an existing devis never left the workshop.
fn send_quote_after_visit(dossier: &Dossier) -> Option<Recommendation> {
    let visited = dossier.status == DossierStatus::VisiteRealisee || dossier.has_site_visit();
    if !visited {
        return None;
    }

    if let Some(quote) = dossier.quotes.iter().find(|quote| {
        matches!(
            quote.status,
            QuoteStatus::Brouillon | QuoteStatus::EnPreparation
        )
    }) {
        return Some(Recommendation {
            action: "Envoyer le devis".to_string(),
            description: format!(
                "La visite est réalisée et le devis {} est encore en brouillon. Le \
                 finaliser puis l'envoyer.",
                quote.display_number()
            ),
            urgency: Urgency::Normal,
            deadline: None,
            action_button: Some(ActionButton {
                label: "Voir le devis".to_string(),
                href: format!("/devis/{}", quote.id),
            }),
        });
    }

    let quote = dossier
        .quotes
        .iter()
        .find(|quote| quote.status == QuoteStatus::Pret)?;
    Some(Recommendation {
        action: "Envoyer le devis".to_string(),
        description: format!(
            "Le devis {} est prêt suite à la visite. L'envoyer au client.",
            quote.display_number()
        ),
        urgency: Urgency::Normal,
        deadline: None,
        action_button: Some(ActionButton {
            label: "Voir le devis".to_string(),
            href: format!("/devis/{}", quote.id),
        }),
    })
}

/// Rule 9: generic fallback for a ready devis on a dossier not yet marked
/// as sent.
fn send_ready_quote(dossier: &Dossier) -> Option<Recommendation> {
    if dossier.status == DossierStatus::DevisEnvoye {
        return None;
    }
    let quote = dossier
        .quotes
        .iter()
        .find(|quote| quote.status == QuoteStatus::Pret)?;

    Some(Recommendation {
        action: "Envoyer le devis".to_string(),
        description: format!(
            "Le devis {} est prêt mais n'a pas encore été envoyé.",
            quote.display_number()
        ),
        urgency: Urgency::Normal,
        deadline: None,
        action_button: Some(ActionButton {
            label: "Voir le devis".to_string(),
            href: format!("/devis/{}", quote.id),
        }),
    })
}

/// Rule 10: slots proposed or a rendez-vous pencilled in, still waiting for
/// the client to confirm. Only considered while no visit happened and no
/// rendez-vous is confirmed.
fn slot_confirmation(
    dossier: &Dossier,
    config: &ResolverConfig,
    signals: &DossierSignals<'_>,
    now: DateTime<Utc>,
) -> Option<Recommendation> {
    if dossier.has_site_visit() || signals.confirmed_appointment.is_some() {
        return None;
    }

    let slots_offered = matches!(
        dossier.status,
        DossierStatus::RdvAPlanifier | DossierStatus::RdvPlanifie
    ) || (signals.slots_sent_at.is_some() && dossier.appointments.is_empty())
        || signals.has_open_appointment;

    if slots_offered && dossier.appointments.is_empty() {
        return Some(slot_recommendation(
            dossier,
            config,
            signals.slots_sent_at,
            now,
            "Des créneaux de visite ont été proposés",
        ));
    }

    let appointment = signals.earliest_planned?;
    Some(slot_recommendation(
        dossier,
        config,
        appointment.created_at,
        now,
        "Un rendez-vous a été proposé",
    ))
}

fn slot_recommendation(
    dossier: &Dossier,
    config: &ResolverConfig,
    proposed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    context: &str,
) -> Recommendation {
    match proposed_at {
        Some(at) => {
            let elapsed = days_since(now, at);
            let deadline = Some(at + Duration::days(config.slot_follow_up_days));
            if elapsed >= config.slot_follow_up_days {
                Recommendation {
                    action: "Relancer pour les créneaux".to_string(),
                    description: format!(
                        "{context} il y a {elapsed} jour(s) sans confirmation du client."
                    ),
                    urgency: Urgency::High,
                    deadline,
                    action_button: dossier_action(&dossier.id, "relance_creneaux", "Relancer"),
                }
            } else {
                Recommendation {
                    action: "En attente de confirmation du client".to_string(),
                    description: format!(
                        "{context} il y a {elapsed} jour(s). Attendre la confirmation du client."
                    ),
                    urgency: Urgency::Normal,
                    deadline,
                    action_button: Some(ActionButton {
                        label: "Voir le dossier".to_string(),
                        href: format!("/dossiers/{}", dossier.id),
                    }),
                }
            }
        }
        None => Recommendation {
            action: "En attente de confirmation du client".to_string(),
            description: format!("{context}. Attendre la confirmation du client."),
            urgency: Urgency::Normal,
            deadline: None,
            action_button: Some(ActionButton {
                label: "Voir le dossier".to_string(),
                href: format!("/dossiers/{}", dossier.id),
            }),
        },
    }
}

/// Rule 11: fresh contact, nothing scheduled yet.
fn schedule_visit(dossier: &Dossier) -> Option<Recommendation> {
    if !matches!(
        dossier.status,
        DossierStatus::Qualification | DossierStatus::ContactRecu
    ) || !dossier.appointments.is_empty()
    {
        return None;
    }

    Some(Recommendation {
        action: "Planifier un rendez-vous".to_string(),
        description: "Nouveau contact à qualifier. Proposer des créneaux de visite au client."
            .to_string(),
        urgency: Urgency::Normal,
        deadline: None,
        action_button: dossier_action(&dossier.id, "planifier_rdv", "Proposer des créneaux"),
    })
}

/// Rule 12: confirmed upcoming rendez-vous, visit not yet done.
fn prepare_visit(
    dossier: &Dossier,
    signals: &DossierSignals<'_>,
    now: DateTime<Utc>,
) -> Option<Recommendation> {
    if dossier.has_site_visit() || dossier.status == DossierStatus::VisiteRealisee {
        return None;
    }
    let appointment = signals.confirmed_appointment?;
    let scheduled_at = appointment.scheduled_at?;
    if scheduled_at <= now {
        return None;
    }

    Some(Recommendation {
        action: "Préparer la visite".to_string(),
        description: format!(
            "Visite confirmée le {}. Préparer le rendez-vous.",
            scheduled_at.format("%d/%m/%Y")
        ),
        urgency: Urgency::Normal,
        deadline: Some(scheduled_at),
        action_button: Some(ActionButton {
            label: "Voir le rendez-vous".to_string(),
            href: format!("/rdv/{}", appointment.id),
        }),
    })
}

/// Elapsed whole days, 24-hour units, rounded towards zero.
fn days_since(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    now.signed_duration_since(then).num_days()
}

fn dossier_action(id: &DossierId, action: &str, label: &str) -> Option<ActionButton> {
    Some(ActionButton {
        label: label.to_string(),
        href: format!("/dossiers/{id}?action={action}"),
    })
}
