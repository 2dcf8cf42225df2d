//! Core data model for the incident desk.
//!
//! Plain records: incidents as the catalog lists them, votes cast on
//! drafts, and the snapshots that publish proposals carry.

mod incident;
mod publication;
mod summary;
mod vote;

pub use incident::{Incident, IncidentKind, IncidentState, Severity, TIME_FORMAT};
pub use publication::Publication;
pub use summary::IncidentSummary;
pub use vote::{FeedbackSubject, Vote};

#[cfg(test)]
pub(crate) use incident::sample_incident;
