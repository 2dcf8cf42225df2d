//! AI-style incident summaries.

/// A three-part situation summary shown alongside an incident.
///
/// Generated, not observed: readers are told to check it for accuracy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentSummary {
    pub what_we_know: Vec<String>,
    pub what_has_been_done: Vec<String>,
    pub customer_communication: Vec<String>,
}
