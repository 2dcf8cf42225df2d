//! Offline templates: message drafts, summaries, and postmortem reports.

use crate::model::{Incident, IncidentSummary};

use super::{DraftError, Drafter};

/// Drafts a fixed customer message from the incident's own fields.
///
/// Used when no chat-completion key is configured.
#[derive(Debug, Clone)]
pub struct TemplateDrafter {
    pub status_page_url: String,
    pub team_name: String,
}

impl Drafter for TemplateDrafter {
    fn draft(&self, incident: &Incident) -> Result<String, DraftError> {
        Ok(format!(
            "Dear valued customers,\n\
             \n\
             We are currently experiencing {severity} issues with our {service}. {title}\n\
             \n\
             Our team is actively working on resolving this issue. We will provide updates \
             every 30 minutes until the situation is resolved.\n\
             \n\
             You can check the status of the incident on our status page: {url} \
             and subscribe for notifications.\n\
             \n\
             We apologize for any inconvenience this may cause and appreciate your patience.\n\
             \n\
             Best regards,\n\
             {team}\n",
            severity = incident.severity.as_str().to_lowercase(),
            service = incident.owning_service.to_lowercase(),
            title = incident.title,
            url = self.status_page_url,
            team = self.team_name,
        ))
    }
}

/// A canned situation summary for the incident's service.
pub fn mock_summary(incident: &Incident) -> IncidentSummary {
    let service = &incident.owning_service;

    IncidentSummary {
        what_we_know: vec![
            format!("Service degradation detected in the {service} API"),
            "Error rate increased by 15% in the last hour".to_string(),
            "Affecting approximately 5% of all transactions".to_string(),
            format!("Primary error: timeouts between {service} and its upstream dependencies"),
        ],
        what_has_been_done: vec![
            format!("Initial investigation completed by the {service} team"),
            "Identified the root cause as increased upstream latency".to_string(),
            "Implemented temporary rate limiting to prevent cascading failures".to_string(),
            "Deployed hotfix to improve error handling and retry logic".to_string(),
        ],
        customer_communication: [
            "Initial notification sent to affected customers",
            "Regular updates provided every 30 minutes",
            "Estimated resolution time communicated: 2 hours",
            "Alternative workflows suggested to customers",
        ]
        .map(String::from)
        .to_vec(),
    }
}

/// The customer-facing postmortem, with `[TIME]` until the incident resolves.
pub fn customer_postmortem(incident: &Incident) -> String {
    let resolved = incident
        .resolved_display()
        .unwrap_or_else(|| "[TIME]".to_string());

    format!(
        "On {created}, our {service} experienced a disruption due to {cause}. \
         We mitigated the issue and restored service by {resolved}.\n\
         \n\
         We sincerely apologize for the inconvenience and are implementing additional \
         safeguards to prevent recurrence.\n",
        created = incident.created_display(),
        service = incident.owning_service,
        cause = incident.title,
    )
}

/// The internal postmortem skeleton; bracketed fields are for the owner to fill.
pub fn internal_postmortem(incident: &Incident) -> String {
    format!(
        "- Date/Time of Incident: {created}\n\
         - Root Cause: {cause}\n\
         - Detection Timeline: [WHO/WHEN]\n\
         - Mitigation: [ACTIONS TAKEN]\n\
         - Impact Analysis: [USERS IMPACTED, DURATION]\n\
         - Lessons Learned:\n\
         \x20   - [1]\n\
         \x20   - [2]\n\
         - Next Steps:\n\
         \x20   - [Actionable Item 1]\n\
         \x20   - [Owner & Timeline]\n",
        created = incident.created_display(),
        cause = incident.title,
    )
}
