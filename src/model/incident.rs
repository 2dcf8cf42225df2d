//! Incident records: the flat rows the catalog lists and sessions open.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::Serialize;

/// Display format for incident timestamps, rendered in UTC.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A service disruption, as listed on the desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub kind: IncidentKind,

    /// Human-facing identifier, e.g. `INC-4821`.
    pub id: String,

    pub severity: Severity,
    pub state: IncidentState,
    pub title: String,
    pub created_at: Timestamp,
    pub owning_service: String,
    pub owner: String,

    /// Only set once the incident is resolved or closed.
    pub resolved_at: Option<Timestamp>,
}

impl Incident {
    /// Critical or high severity incidents that are still being worked.
    pub fn is_escalation_prone(&self) -> bool {
        matches!(self.severity, Severity::Critical | Severity::High)
            && matches!(self.state, IncidentState::Open | IncidentState::InProgress)
    }

    /// Creation time as shown in listings.
    pub fn created_display(&self) -> String {
        self.created_at.strftime(TIME_FORMAT).to_string()
    }

    /// Resolution time as shown in reports, if any.
    pub fn resolved_display(&self) -> Option<String> {
        self.resolved_at.map(|at| at.strftime(TIME_FORMAT).to_string())
    }
}

/// Whether customers can see the incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IncidentKind {
    External,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IncidentState {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl IncidentKind {
    pub const ALL: [Self; 2] = [Self::External, Self::Internal];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::External => "External",
            Self::Internal => "Internal",
        }
    }
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl IncidentState {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Closed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    /// Resolved and closed incidents carry a resolution time.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

// Parsing is forgiving about case, spaces, dashes, and underscores so
// `in-progress`, `In Progress`, and `in_progress` all name the same state.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_one_of<T: Copy>(
    s: &str,
    all: &[T],
    name: impl Fn(T) -> &'static str,
    what: &str,
) -> Result<T, String> {
    let wanted = normalize(s);
    all.iter()
        .copied()
        .find(|v| normalize(name(*v)) == wanted)
        .ok_or_else(|| {
            let options: Vec<&str> = all.iter().map(|v| name(*v)).collect();
            format!("unknown {what} '{s}' (expected one of: {})", options.join(", "))
        })
}

impl FromStr for IncidentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_one_of(s, &Self::ALL, Self::as_str, "incident type")
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_one_of(s, &Self::ALL, Self::as_str, "severity")
    }
}

impl FromStr for IncidentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_one_of(s, &Self::ALL, Self::as_str, "state")
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for IncidentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
pub(crate) fn sample_incident() -> Incident {
    Incident {
        kind: IncidentKind::External,
        id: "INC-4821".into(),
        severity: Severity::High,
        state: IncidentState::Open,
        title: "Service degradation in Payment Service".into(),
        created_at: Timestamp::new(1_700_000_000, 0).unwrap(),
        owning_service: "Payment Service".into(),
        owner: "Jane Smith".into(),
        resolved_at: None,
    }
}
