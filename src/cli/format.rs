//! Output formatting for CLI display.

use std::fmt::{Display, Write as _};

use crate::catalog::{IncidentFilter, Page};
use crate::channels::ChannelSelection;
use crate::confirm::{ConfirmableAction, Phase};
use crate::model::{Incident, IncidentSummary, Publication, Vote};

const FLAG: &str = "🚩";

/// One listing row. Escalation-prone incidents are flagged.
pub(super) fn format_incident_row(incident: &Incident) -> String {
    let flag = if incident.is_escalation_prone() { FLAG } else { "  " };
    format!(
        "{flag} {:<9} {:<8} {:<8} {:<11} {:<20} {:<14} {}",
        incident.id,
        incident.kind.as_str(),
        incident.severity.as_str(),
        incident.state.as_str(),
        incident.owning_service,
        incident.owner,
        incident.created_display(),
    )
}

/// A page of incidents with a header and a "Showing a-b of n" caption.
pub(super) fn format_incident_table(page: &Page<&Incident>) -> String {
    if page.items.is_empty() {
        return "No incidents match the current filters.".to_string();
    }

    let mut out = format!(
        "   {:<9} {:<8} {:<8} {:<11} {:<20} {:<14} {}\n",
        "ID", "Type", "Severity", "State", "Service", "Owner", "Created"
    );
    for incident in &page.items {
        out.push_str(&format_incident_row(incident));
        out.push('\n');
    }
    let _ = write!(
        out,
        "{} (page {}/{})",
        page.caption(),
        page.number,
        page.total_pages
    );
    out
}

/// Active filters as `severity=Critical,High service=Auth Service`.
pub(super) fn format_filter(filter: &IncidentFilter) -> String {
    let fields = [
        ("severity", join(&filter.severities)),
        ("state", join(&filter.states)),
        ("service", join(&filter.services)),
        ("type", join(&filter.kinds)),
    ];
    fields
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(field, values)| format!("{field}={values}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// The essentials block shown when an incident is opened.
pub(super) fn format_incident_detail(incident: &Incident) -> String {
    let mut out = format!("{}  {}\n", incident.id, incident.title);
    let _ = writeln!(out, "  Type:      {}", incident.kind);
    let _ = write!(out, "  Severity:  {}", incident.severity);
    if incident.is_escalation_prone() {
        let _ = write!(out, "  {FLAG} escalation prone");
    }
    out.push('\n');
    let _ = writeln!(out, "  State:     {}", incident.state);
    let _ = writeln!(out, "  Service:   {}", incident.owning_service);
    let _ = writeln!(out, "  Owner:     {}", incident.owner);
    let _ = writeln!(out, "  Created:   {}", incident.created_display());
    let _ = write!(
        out,
        "  Resolved:  {}",
        incident.resolved_display().as_deref().unwrap_or("-")
    );
    out
}

pub(super) fn format_summary(summary: &IncidentSummary) -> String {
    let sections = [
        ("What we know", &summary.what_we_know),
        ("What has been done", &summary.what_has_been_done),
        ("What has been communicated", &summary.customer_communication),
    ];

    let mut out = String::from("AI generated summary. Verify before sharing.\n");
    for (title, lines) in sections {
        let _ = writeln!(out, "\n{title}:");
        for line in lines {
            let _ = writeln!(out, "  - {line}");
        }
    }
    out.truncate(out.trim_end().len());
    out
}

/// Available channels with the selected ones checked.
pub(super) fn format_channels(channels: &ChannelSelection) -> String {
    channels
        .available()
        .iter()
        .map(|c| {
            let mark = if channels.is_selected(&c.name) { 'x' } else { ' ' };
            format!("[{mark}] {}", c.display_label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn format_publish_status(
    action: &ConfirmableAction<Publication>,
    channels: &ChannelSelection,
) -> String {
    match action.phase() {
        Phase::Idle => "not published".to_string(),
        Phase::Proposed(p) => format!(
            "awaiting confirmation for {}",
            channel_labels(p, channels)
        ),
        Phase::Confirmed { choice, .. } => {
            format!("confirmed for {}, not yet delivered", channel_labels(choice, channels))
        }
        Phase::Committed { choice, .. } => {
            format!("published to {}", channel_labels(choice, channels))
        }
    }
}

pub(super) fn format_feedback_status(action: &ConfirmableAction<Vote>) -> String {
    match action.phase() {
        Phase::Idle => "no feedback yet".to_string(),
        Phase::Proposed(vote) => format!("{} selected, awaiting confirmation", vote.label()),
        Phase::Confirmed { choice, .. } => match action.comment() {
            Some(c) => format!("{} confirmed, comment: {c}", choice.label()),
            None => format!("{} confirmed", choice.label()),
        },
        Phase::Committed { choice, .. } => format!("{} submitted", choice.label()),
    }
}

/// Display labels for a publication's channels, comma separated.
pub(super) fn channel_labels(publication: &Publication, channels: &ChannelSelection) -> String {
    publication
        .channels
        .iter()
        .map(|name| {
            channels
                .display_label(name)
                .unwrap_or_else(|| name.clone())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::catalog::paginate;
    use crate::model::{IncidentState, Severity, sample_incident};

    #[test]
    fn escalation_prone_rows_are_flagged() {
        let mut incident = sample_incident();
        assert!(format_incident_row(&incident).starts_with(FLAG));

        incident.severity = Severity::Low;
        assert!(!format_incident_row(&incident).contains(FLAG));
    }

    #[test]
    fn row_contains_all_columns() {
        let row = format_incident_row(&sample_incident());
        for column in [
            "INC-4821",
            "External",
            "High",
            "Open",
            "Payment Service",
            "Jane Smith",
            "2023-11-14 22:13",
        ] {
            assert!(row.contains(column), "missing {column} in {row}");
        }
    }

    #[test]
    fn table_has_header_and_caption() {
        let incident = sample_incident();
        let table = format_incident_table(&paginate(&[&incident], 1, 10));

        assert!(table.starts_with("   ID"));
        assert!(table.ends_with("Showing 1-1 of 1 incidents (page 1/1)"));
    }

    #[test]
    fn empty_table_says_so() {
        let table = format_incident_table(&paginate::<&Incident>(&[], 1, 10));
        assert_eq!(table, "No incidents match the current filters.");
    }

    #[test]
    fn filter_lists_only_active_fields() {
        let filter = IncidentFilter {
            severities: vec![Severity::Critical, Severity::High],
            services: vec!["Auth Service".into()],
            ..IncidentFilter::default()
        };
        assert_eq!(
            format_filter(&filter),
            "severity=Critical,High service=Auth Service"
        );
        assert_eq!(format_filter(&IncidentFilter::default()), "");
    }

    #[test]
    fn detail_shows_resolution_when_present() {
        let mut incident = sample_incident();
        assert!(format_incident_detail(&incident).ends_with("Resolved:  -"));

        incident.state = IncidentState::Resolved;
        incident.resolved_at = Some(incident.created_at + jiff::SignedDuration::from_hours(2));
        let detail = format_incident_detail(&incident);
        assert!(detail.ends_with("Resolved:  2023-11-15 00:13"));
        assert!(!detail.contains(FLAG));
    }

    #[test]
    fn summary_has_three_sections() {
        let summary = IncidentSummary {
            what_we_know: vec!["a".into()],
            what_has_been_done: vec!["b".into()],
            customer_communication: vec!["c".into()],
        };
        assert_eq!(
            format_summary(&summary),
            "AI generated summary. Verify before sharing.\n\
             \n\
             What we know:\n  - a\n\
             \n\
             What has been done:\n  - b\n\
             \n\
             What has been communicated:\n  - c"
        );
    }

    #[test]
    fn channels_show_selection_marks() {
        assert_eq!(
            format_channels(&ChannelSelection::standard()),
            "[x] Status Page\n[x] Slack (42 subs)\n[ ] Email (128 subs)\n[ ] SMS (65 subs)"
        );
    }

    #[test]
    fn publish_status_uses_labels() {
        let channels = ChannelSelection::standard();
        let mut action = ConfirmableAction::new("publish");
        assert_eq!(format_publish_status(&action, &channels), "not published");

        let _ = action.propose(Publication {
            text: "hi".into(),
            channels: vec!["Slack".into(), "Email".into()],
        });
        assert_eq!(
            format_publish_status(&action, &channels),
            "awaiting confirmation for Slack (42 subs), Email (128 subs)"
        );
    }

    #[test]
    fn feedback_status_follows_phase() {
        let mut action = ConfirmableAction::new("feedback");
        let _ = action.propose(Vote::Down);
        assert_eq!(
            format_feedback_status(&action),
            "👎 Needs improvement selected, awaiting confirmation"
        );

        let _ = action.confirm();
        let _ = action.set_comment("too vague");
        assert_eq!(
            format_feedback_status(&action),
            "👎 Needs improvement confirmed, comment: too vague"
        );
    }
}
