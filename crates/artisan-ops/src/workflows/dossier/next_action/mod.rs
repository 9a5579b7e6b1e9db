//! Rule-based "next action" recommendation engine.
//!
//! Given one dossier snapshot and an explicit clock, derive the single most
//! urgent next step. The rules form a priority-ordered chain evaluated top to
//! bottom; the first match wins. Ordering encodes business priority: money
//! collection and active chantier work outrank upstream qualification and
//! visit scheduling.

mod rules;
mod signals;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Dossier;

/// Escalation thresholds for the rule chain, in whole days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Days after a visit before "create the devis" escalates to high.
    pub visit_quote_delay_days: i64,
    /// Days after sending a devis before a client follow-up is suggested.
    pub quote_follow_up_days: i64,
    /// Days after sending a devis before the follow-up becomes high urgency.
    pub quote_follow_up_urgent_days: i64,
    /// Days after proposing visit slots before a follow-up is suggested.
    pub slot_follow_up_days: i64,
    /// How far back in the journal to look for the "créneaux" notification.
    pub journal_lookback_days: i64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            visit_quote_delay_days: 3,
            quote_follow_up_days: 7,
            quote_follow_up_urgent_days: 14,
            slot_follow_up_days: 3,
            journal_lookback_days: 7,
        }
    }
}

/// Three-level priority attached to a recommendation for UI emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Urgent,
    High,
    Normal,
}

/// Follow-up navigation target suggested alongside a recommendation.
///
/// The href is an opaque path convention interpreted by the presentation
/// layer (`/dossiers/{id}?action=…`, `/devis/{id}`, `/factures/{id}`,
/// `/rdv/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub label: String,
    pub href: String,
}

/// The recommended next step for a dossier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Short imperative label, e.g. "Envoyer le devis".
    pub action: String,
    /// Human-readable detail; may embed elapsed days or document numbers.
    pub description: String,
    pub urgency: Urgency,
    /// Point in time after which the action is considered overdue.
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_button: Option<ActionButton>,
}

/// Stateless resolver applying the rule chain to a dossier snapshot.
///
/// Pure with respect to its inputs: the clock is an explicit parameter so
/// callers (and tests) can pin it, and the dossier is never mutated.
#[derive(Debug, Clone, Default)]
pub struct NextActionResolver {
    config: ResolverConfig,
}

impl NextActionResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Derive the recommended next step, or `None` when no rule matches.
    pub fn resolve(&self, dossier: &Dossier, now: DateTime<Utc>) -> Option<Recommendation> {
        let signals = signals::gather(dossier, &self.config, now);
        rules::next_action(dossier, &self.config, &signals, now)
    }
}
