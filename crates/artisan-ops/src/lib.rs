//! Operations backend for a small trades business.
//!
//! The heart of the crate is [`workflows::dossier`], which models a client
//! engagement ("dossier") from first contact through site visit, devis,
//! signature, chantier, and invoicing, and derives the single most urgent
//! next step for each dossier.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
