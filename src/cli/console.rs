//! Interactive console: browse incidents and walk the confirmation flows.
//!
//! Line-driven so it runs over any reader and writer. The console holds at
//! most one open [`IncidentSession`]; opening another incident discards the
//! current one along with any unconfirmed proposals.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use tracing::{debug, info};

use crate::catalog::{Catalog, IncidentFilter, paginate};
use crate::channels::ChannelSelection;
use crate::confirm::{CommitOutcome, Phase, Transition};
use crate::draft::Drafter;
use crate::model::{FeedbackSubject, IncidentKind, IncidentState, Severity, TIME_FORMAT, Vote};
use crate::publish::Outbox;
use crate::session::{Bulletin, IncidentSession};

use super::format::{
    channel_labels, format_channels, format_feedback_status, format_filter,
    format_incident_detail, format_incident_table, format_publish_status, format_summary,
};

const HELP: &str = r"Browsing:
  list [page]                     show a page of incidents
  filter <field> <a>, <b>         field is severity, state, service, or type
  filter clear                    drop all filters
  open <ID>                       open an incident
  outbox                          everything published or submitted so far
  help                            this text
  quit                            leave the console

With an incident open (<target> is `message` or `postmortem`):
  show                            incident details and action status
  back                            close the incident
  summary                         AI generated situation summary
  <target> [draft]                current draft and its status
  <target> generate               regenerate the draft
  <target> edit <text>            replace the draft (\n for a line break)
  <target> channels               available and selected channels
  <target> select <a>, <b>        choose channels by name or label
  <target> publish                propose publishing the draft
  <target> publish yes|no         confirm or cancel the publish
  <target> vote up|down           propose feedback on the draft
  <target> vote yes|no            confirm or cancel the vote
  <target> comment <text>         attach a comment to a confirmed vote
  <target> submit                 send the confirmed feedback
  internal [edit <text>]          view or replace the internal postmortem";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleCommand {
    List { page: Option<usize> },
    Filter(FilterChange),
    Open(String),
    Back,
    Show,
    Summary,
    Generate(FeedbackSubject),
    Bulletin(FeedbackSubject, BulletinCommand),
    Internal(Option<String>),
    Outbox,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterChange {
    Clear,
    Severity(Vec<Severity>),
    State(Vec<IncidentState>),
    Service(Vec<String>),
    Kind(Vec<IncidentKind>),
}

/// Commands that act on one bulletin of the open incident.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BulletinCommand {
    Draft,
    Edit(String),
    Channels,
    Select(Vec<String>),
    Publish,
    AnswerPublish(bool),
    Vote(Vote),
    AnswerVote(bool),
    Comment(String),
    Submit,
}

/// What the console has to say after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Console state for one run.
pub struct Console {
    catalog: Catalog,
    channels: ChannelSelection,
    page_size: usize,
    filter: IncidentFilter,
    page: usize,
    session: Option<IncidentSession>,
    drafter: Box<dyn Drafter>,
    outbox: Outbox,
}

/// Reads commands from `input` until `quit` or end of input.
///
/// Lines that are not valid UTF-8 are decoded lossily rather than ending the
/// session.
pub fn run<R: BufRead, W: Write>(
    console: &mut Console,
    mut input: R,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "Incident desk. Type `help` for commands.")?;
    write!(out, "{}", console.prompt())?;
    out.flush()?;

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        match console.handle_line(line) {
            Reply::Quit => return Ok(()),
            Reply::Text(text) if text.is_empty() => {}
            Reply::Text(text) => writeln!(out, "{text}")?,
        }
        write!(out, "{}", console.prompt())?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}

impl Console {
    pub fn new(
        catalog: Catalog,
        channels: ChannelSelection,
        page_size: usize,
        drafter: Box<dyn Drafter>,
    ) -> Self {
        Self {
            catalog,
            channels,
            page_size,
            filter: IncidentFilter::default(),
            page: 1,
            session: None,
            drafter,
            outbox: Outbox::new(),
        }
    }

    pub fn prompt(&self) -> String {
        match &self.session {
            Some(session) => format!("{}> ", session.incident().id),
            None => "incident-desk> ".to_string(),
        }
    }

    /// Parses and runs one line. Errors are rendered into the reply.
    pub fn handle_line(&mut self, line: &str) -> Reply {
        let command = match parse_line(line) {
            Ok(Some(ConsoleCommand::Quit)) => return Reply::Quit,
            Ok(Some(command)) => command,
            Ok(None) => return Reply::Text(String::new()),
            Err(e) => return Reply::Text(format!("error: {e}")),
        };

        debug!(?command, "console command");
        match self.execute(command) {
            Ok(text) => Reply::Text(text),
            Err(e) => Reply::Text(format!("error: {e}")),
        }
    }

    fn execute(&mut self, command: ConsoleCommand) -> Result<String, String> {
        match command {
            ConsoleCommand::List { page } => Ok(self.list(page)),
            ConsoleCommand::Filter(change) => {
                self.apply_filter(change);
                self.page = 1;
                Ok(self.list(None))
            }
            ConsoleCommand::Open(id) => self.open(&id),
            ConsoleCommand::Back => {
                let session = self.session.take().ok_or_else(no_session)?;
                info!(session = %session.id(), "session closed");
                Ok(format!("Closed {}.", session.incident().id))
            }
            ConsoleCommand::Show => Ok(overview(self.session()?)),
            ConsoleCommand::Summary => Ok(format_summary(self.session()?.summary())),
            ConsoleCommand::Generate(subject) => self.generate(subject),
            ConsoleCommand::Bulletin(subject, command) => self.bulletin(subject, command),
            ConsoleCommand::Internal(None) => {
                Ok(self.session()?.internal_report().snapshot().to_string())
            }
            ConsoleCommand::Internal(Some(text)) => {
                self.session
                    .as_mut()
                    .ok_or_else(no_session)?
                    .edit_internal_report(text);
                Ok("Internal report updated.".to_string())
            }
            ConsoleCommand::Outbox => Ok(self.outbox_report()),
            ConsoleCommand::Help => Ok(HELP.to_string()),
            ConsoleCommand::Quit => Ok(String::new()),
        }
    }

    fn session(&self) -> Result<&IncidentSession, String> {
        self.session.as_ref().ok_or_else(no_session)
    }

    fn list(&mut self, page: Option<usize>) -> String {
        if let Some(page) = page {
            self.page = page;
        }

        let matches = self.catalog.filter(&self.filter);
        let page = paginate(&matches, self.page, self.page_size);
        self.page = page.number;

        let table = format_incident_table(&page);
        if self.filter.is_empty() {
            table
        } else {
            format!("Filters: {}\n{table}", format_filter(&self.filter))
        }
    }

    fn apply_filter(&mut self, change: FilterChange) {
        match change {
            FilterChange::Clear => self.filter = IncidentFilter::default(),
            FilterChange::Severity(values) => self.filter.severities = values,
            FilterChange::State(values) => self.filter.states = values,
            FilterChange::Service(values) => self.filter.services = values,
            FilterChange::Kind(values) => self.filter.kinds = values,
        }
    }

    fn open(&mut self, id: &str) -> Result<String, String> {
        let incident = self
            .catalog
            .find(id)
            .ok_or_else(|| format!("no incident '{id}'"))?
            .clone();

        let session = IncidentSession::open(incident, &self.channels);
        let reply = format!(
            "{}\n\nType `help` for what you can do with this incident.",
            format_incident_detail(session.incident())
        );

        if let Some(previous) = self.session.replace(session) {
            info!(session = %previous.id(), "session closed");
        }
        Ok(reply)
    }

    fn generate(&mut self, subject: FeedbackSubject) -> Result<String, String> {
        let session = self.session.as_mut().ok_or_else(no_session)?;
        let pending = publish_pending(session.bulletin(subject));

        session
            .generate(subject, self.drafter.as_ref())
            .map_err(|e| format!("could not generate draft: {e}. The current draft was kept."))?;

        Ok(with_withdrawal(
            format!(
                "Draft regenerated.\n\n{}",
                session.bulletin(subject).draft().snapshot()
            ),
            pending,
            subject,
        ))
    }

    fn bulletin(
        &mut self,
        subject: FeedbackSubject,
        command: BulletinCommand,
    ) -> Result<String, String> {
        let bulletin = self
            .session
            .as_mut()
            .ok_or_else(no_session)?
            .bulletin_mut(subject);

        match command {
            BulletinCommand::Draft => Ok(describe_bulletin(bulletin)),
            BulletinCommand::Edit(text) => {
                let pending = publish_pending(bulletin);
                bulletin.edit(text);
                Ok(with_withdrawal("Draft updated.".to_string(), pending, subject))
            }
            BulletinCommand::Channels => Ok(format_channels(bulletin.channels())),
            BulletinCommand::Select(names) => {
                let pending = publish_pending(bulletin);
                bulletin
                    .select_channels(&names)
                    .map_err(|e| e.to_string())?;
                let labels = bulletin.channels().selected_labels();
                let reply = if labels.is_empty() {
                    "No channels selected.".to_string()
                } else {
                    format!("Selected: {}", labels.join(", "))
                };
                Ok(with_withdrawal(reply, pending, subject))
            }
            BulletinCommand::Publish => match bulletin.propose_publish() {
                Ok(Transition::Applied) => Ok(publish_preview(bulletin)),
                Ok(Transition::Ignored) => Ok(format!("The {subject} is already published.")),
                Err(e) => Err(e.to_string()),
            },
            BulletinCommand::AnswerPublish(true) => {
                let _ = bulletin.confirm_publish();
                match bulletin.commit_publish(&mut self.outbox) {
                    Ok(CommitOutcome::Committed) => {
                        let labels = bulletin
                            .publish_action()
                            .confirmed_choice()
                            .map(|p| channel_labels(p, bulletin.channels()))
                            .unwrap_or_default();
                        Ok(format!("Published the {subject} to {labels}."))
                    }
                    Ok(CommitOutcome::NothingToCommit) if bulletin.publish_action().is_committed() => {
                        Ok(format!("The {subject} is already published."))
                    }
                    Ok(CommitOutcome::NothingToCommit) => Err(format!(
                        "nothing to confirm; run `{subject} publish` first"
                    )),
                    Err(e) => Err(format!(
                        "publish failed: {e}. Run `{subject} publish yes` to retry."
                    )),
                }
            }
            BulletinCommand::AnswerPublish(false) => Ok(match bulletin.cancel_publish() {
                Transition::Applied => "Publish cancelled.".to_string(),
                Transition::Ignored => "Nothing to cancel.".to_string(),
            }),
            BulletinCommand::Vote(vote) => match bulletin.vote(vote) {
                Transition::Applied => Ok(format!(
                    "{} selected. Confirm with `{subject} vote yes` or cancel with `{subject} vote no`.",
                    vote.label()
                )),
                Transition::Ignored => Err(format!(
                    "feedback on the {subject} is already confirmed"
                )),
            },
            BulletinCommand::AnswerVote(true) => match bulletin.confirm_vote() {
                Transition::Applied => Ok(format!(
                    "Feedback confirmed. Add a comment with `{subject} comment <text>`, \
                     then send it with `{subject} submit`."
                )),
                Transition::Ignored => Err(format!(
                    "no vote to confirm; use `{subject} vote up|down` first"
                )),
            },
            BulletinCommand::AnswerVote(false) => Ok(match bulletin.cancel_vote() {
                Transition::Applied => "Vote cancelled.".to_string(),
                Transition::Ignored => "Nothing to cancel.".to_string(),
            }),
            BulletinCommand::Comment(text) => match bulletin.comment(text) {
                Transition::Applied => Ok("Comment added.".to_string()),
                Transition::Ignored if bulletin.feedback_action().is_committed() => Err(format!(
                    "feedback on the {subject} was already submitted"
                )),
                Transition::Ignored => Err("confirm a vote before commenting".to_string()),
            },
            BulletinCommand::Submit => match bulletin.submit_feedback(&mut self.outbox) {
                Ok(CommitOutcome::Committed) => Ok("Thank you for your feedback!".to_string()),
                Ok(CommitOutcome::NothingToCommit) if bulletin.feedback_action().is_committed() => {
                    Ok("Feedback already submitted.".to_string())
                }
                Ok(CommitOutcome::NothingToCommit) => {
                    Err("confirm a vote before submitting".to_string())
                }
                Err(e) => Err(format!("feedback submission failed: {e}")),
            },
        }
    }

    fn outbox_report(&self) -> String {
        let deliveries = self.outbox.deliveries();
        let feedback = self.outbox.feedback();
        if deliveries.is_empty() && feedback.is_empty() {
            return "Nothing sent yet.".to_string();
        }

        let mut lines = Vec::new();
        if !deliveries.is_empty() {
            lines.push("Deliveries:".to_string());
            for d in deliveries {
                lines.push(format!(
                    "  {}  {:<12} {}",
                    d.delivered_at.strftime(TIME_FORMAT),
                    d.channel,
                    first_line(&d.text)
                ));
            }
        }
        if !feedback.is_empty() {
            lines.push("Feedback:".to_string());
            for f in feedback {
                let comment = f
                    .comment
                    .as_deref()
                    .map(|c| format!(" \"{c}\""))
                    .unwrap_or_default();
                lines.push(format!(
                    "  {}  {:<12} {}{comment}",
                    f.submitted_at.strftime(TIME_FORMAT),
                    f.subject,
                    f.vote.label()
                ));
            }
        }
        lines.join("\n")
    }
}

fn no_session() -> String {
    "no incident open; use `open <ID>` first".to_string()
}

fn publish_pending(bulletin: &Bulletin) -> bool {
    matches!(
        bulletin.publish_action().phase(),
        Phase::Proposed(_) | Phase::Confirmed { .. }
    )
}

fn with_withdrawal(reply: String, was_pending: bool, subject: FeedbackSubject) -> String {
    if was_pending {
        format!("{reply}\nThe pending publish was withdrawn; run `{subject} publish` again.")
    } else {
        reply
    }
}

fn overview(session: &IncidentSession) -> String {
    let mut out = format_incident_detail(session.incident());
    for subject in [FeedbackSubject::Message, FeedbackSubject::Postmortem] {
        let bulletin = session.bulletin(subject);
        out.push_str(&format!(
            "\n\n{subject}:\n  Publish:  {}\n  Feedback: {}",
            format_publish_status(bulletin.publish_action(), bulletin.channels()),
            format_feedback_status(bulletin.feedback_action()),
        ));
    }
    out
}

fn describe_bulletin(bulletin: &Bulletin) -> String {
    let subject = bulletin.subject();
    let text = if bulletin.draft().is_blank() {
        format!("(empty; run `{subject} generate` or `{subject} edit <text>`)")
    } else {
        bulletin.draft().snapshot().to_string()
    };

    let labels = bulletin.channels().selected_labels();
    let channels = if labels.is_empty() {
        "none".to_string()
    } else {
        labels.join(", ")
    };

    format!(
        "{text}\n\nChannels: {channels}\nPublish:  {}\nFeedback: {}",
        format_publish_status(bulletin.publish_action(), bulletin.channels()),
        format_feedback_status(bulletin.feedback_action()),
    )
}

fn publish_preview(bulletin: &Bulletin) -> String {
    let subject = bulletin.subject();
    let labels = bulletin
        .publish_action()
        .proposed_choice()
        .map(|p| channel_labels(p, bulletin.channels()))
        .unwrap_or_default();

    format!(
        "Publish the {subject} to {labels}?\n\n{}\n\n\
         Confirm with `{subject} publish yes` or cancel with `{subject} publish no`.",
        bulletin.draft().snapshot()
    )
}

fn first_line(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if line.chars().count() > 50 {
        let cut: String = line.chars().take(49).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}

// ── Parsing ──

fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = split_word(line);
    let command = match word.to_lowercase().as_str() {
        "list" | "ls" => ConsoleCommand::List {
            page: parse_page(rest)?,
        },
        "filter" => ConsoleCommand::Filter(parse_filter(rest)?),
        "open" => ConsoleCommand::Open(required(rest, "open <ID>")?),
        "back" => ConsoleCommand::Back,
        "show" => ConsoleCommand::Show,
        "summary" => ConsoleCommand::Summary,
        "message" => parse_bulletin(FeedbackSubject::Message, rest)?,
        "postmortem" => parse_bulletin(FeedbackSubject::Postmortem, rest)?,
        "internal" => ConsoleCommand::Internal(parse_internal(rest)?),
        "outbox" => ConsoleCommand::Outbox,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try `help`)")),
    };
    Ok(Some(command))
}

fn parse_bulletin(subject: FeedbackSubject, rest: &str) -> Result<ConsoleCommand, String> {
    let (word, arg) = split_word(rest);
    let command = match word.to_lowercase().as_str() {
        "" | "draft" => BulletinCommand::Draft,
        "generate" => return Ok(ConsoleCommand::Generate(subject)),
        "edit" => BulletinCommand::Edit(unescape(&required(arg, "edit <text>")?)),
        "channels" => BulletinCommand::Channels,
        "select" => BulletinCommand::Select(split_list(arg).map(String::from).collect()),
        "publish" => match arg.to_lowercase().as_str() {
            "" => BulletinCommand::Publish,
            "yes" | "y" => BulletinCommand::AnswerPublish(true),
            "no" | "n" => BulletinCommand::AnswerPublish(false),
            other => return Err(format!("unknown answer '{other}' (expected yes or no)")),
        },
        "vote" => match arg.to_lowercase().as_str() {
            "" => return Err("usage: vote up|down, then vote yes|no".to_string()),
            "yes" | "y" => BulletinCommand::AnswerVote(true),
            "no" | "n" => BulletinCommand::AnswerVote(false),
            other => BulletinCommand::Vote(other.parse()?),
        },
        "comment" => BulletinCommand::Comment(required(arg, "comment <text>")?),
        "submit" => BulletinCommand::Submit,
        other => return Err(format!("unknown action '{other}' (try `help`)")),
    };
    Ok(ConsoleCommand::Bulletin(subject, command))
}

fn parse_internal(rest: &str) -> Result<Option<String>, String> {
    let (word, arg) = split_word(rest);
    match word.to_lowercase().as_str() {
        "" | "show" => Ok(None),
        "edit" => required(arg, "internal edit <text>").map(|text| Some(unescape(&text))),
        other => Err(format!("unknown action '{other}' (expected edit)")),
    }
}

fn parse_filter(rest: &str) -> Result<FilterChange, String> {
    let (field, values) = split_word(rest);
    match field.to_lowercase().as_str() {
        "clear" => Ok(FilterChange::Clear),
        "severity" => parse_values(values).map(FilterChange::Severity),
        "state" | "status" => parse_values(values).map(FilterChange::State),
        "service" => Ok(FilterChange::Service(
            split_list(values).map(String::from).collect(),
        )),
        "type" | "kind" => parse_values(values).map(FilterChange::Kind),
        "" => Err("usage: filter <severity|state|service|type> <values> | filter clear".to_string()),
        other => Err(format!(
            "unknown filter '{other}' (expected severity, state, service, or type)"
        )),
    }
}

fn parse_page(rest: &str) -> Result<Option<usize>, String> {
    if rest.is_empty() {
        return Ok(None);
    }
    rest.parse()
        .map(Some)
        .map_err(|_| format!("invalid page number '{rest}'"))
}

fn parse_values<T: FromStr<Err = String>>(values: &str) -> Result<Vec<T>, String> {
    split_list(values).map(str::parse).collect()
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|v| !v.is_empty())
}

fn required(arg: &str, usage: &str) -> Result<String, String> {
    if arg.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(arg.to_string())
    }
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use crate::draft::fakes::FixedDrafter;
    use crate::model::{Incident, sample_incident};

    fn incident(id: &str, severity: Severity, state: IncidentState) -> Incident {
        Incident {
            id: id.to_string(),
            severity,
            state,
            ..sample_incident()
        }
    }

    fn console_with(drafter: FixedDrafter) -> Console {
        let catalog = Catalog::new(vec![
            sample_incident(),
            incident("INC-1002", Severity::Low, IncidentState::Open),
            incident("INC-1003", Severity::Critical, IncidentState::InProgress),
        ]);
        Console::new(catalog, ChannelSelection::standard(), 2, Box::new(drafter))
    }

    fn console() -> Console {
        console_with(FixedDrafter(Some("We are investigating.")))
    }

    fn say(console: &mut Console, line: &str) -> String {
        match console.handle_line(line) {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit on {line:?}"),
        }
    }

    #[test]
    fn parses_bulletin_commands() {
        assert_eq!(
            parse_line("message publish yes").unwrap(),
            Some(ConsoleCommand::Bulletin(
                FeedbackSubject::Message,
                BulletinCommand::AnswerPublish(true)
            ))
        );
        assert_eq!(
            parse_line("POSTMORTEM vote down").unwrap(),
            Some(ConsoleCommand::Bulletin(
                FeedbackSubject::Postmortem,
                BulletinCommand::Vote(Vote::Down)
            ))
        );
        assert_eq!(
            parse_line("message select Slack, Email (128 subs)").unwrap(),
            Some(ConsoleCommand::Bulletin(
                FeedbackSubject::Message,
                BulletinCommand::Select(vec!["Slack".into(), "Email (128 subs)".into()])
            ))
        );
        assert_eq!(
            parse_line("postmortem generate").unwrap(),
            Some(ConsoleCommand::Generate(FeedbackSubject::Postmortem))
        );
        assert_eq!(
            parse_line("message edit Line one\\nLine two").unwrap(),
            Some(ConsoleCommand::Bulletin(
                FeedbackSubject::Message,
                BulletinCommand::Edit("Line one\nLine two".into())
            ))
        );
    }

    #[test]
    fn parses_filters() {
        assert_eq!(
            parse_line("filter state open, in progress").unwrap(),
            Some(ConsoleCommand::Filter(FilterChange::State(vec![
                IncidentState::Open,
                IncidentState::InProgress
            ])))
        );
        assert!(parse_line("filter severity urgent").is_err());
        assert!(parse_line("filter colour red").is_err());
    }

    #[test]
    fn rejects_bad_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert!(parse_line("launch").is_err());
        assert!(parse_line("message publish maybe").is_err());
        assert!(parse_line("message vote").is_err());
        assert!(parse_line("open").is_err());
        assert!(parse_line("list two").is_err());
    }

    #[test]
    fn list_pages_and_filters() {
        let mut c = console();
        let first = say(&mut c, "list");
        assert!(first.contains("INC-4821"));
        assert!(first.ends_with("Showing 1-2 of 3 incidents (page 1/2)"));

        let second = say(&mut c, "list 9");
        assert!(second.contains("INC-1003"));
        assert!(second.ends_with("(page 2/2)"));

        let filtered = say(&mut c, "filter severity low");
        assert!(filtered.starts_with("Filters: severity=Low"));
        assert!(filtered.contains("INC-1002"));
        assert!(!filtered.contains("INC-4821"));

        let cleared = say(&mut c, "filter clear");
        assert!(cleared.ends_with("Showing 1-2 of 3 incidents (page 1/2)"));
    }

    #[test]
    fn incident_commands_need_an_open_incident() {
        let mut c = console();
        assert!(say(&mut c, "message publish").starts_with("error: no incident open"));
        assert!(say(&mut c, "summary").starts_with("error: no incident open"));
        assert!(say(&mut c, "open INC-0000").starts_with("error: no incident"));
    }

    #[test]
    fn open_shows_details_and_changes_prompt() {
        let mut c = console();
        let reply = say(&mut c, "open inc-4821");
        assert!(reply.starts_with("INC-4821  Service degradation in Payment Service"));
        assert_eq!(c.prompt(), "INC-4821> ");

        assert_eq!(say(&mut c, "back"), "Closed INC-4821.");
        assert_eq!(c.prompt(), "incident-desk> ");
    }

    #[test]
    fn publish_flow_delivers_once() {
        let mut c = console();
        say(&mut c, "open INC-4821");
        assert!(say(&mut c, "message generate").contains("We are investigating."));

        let preview = say(&mut c, "message publish");
        assert!(preview.starts_with("Publish the message to Status Page, Slack (42 subs)?"));
        assert!(c.outbox.deliveries().is_empty());

        let done = say(&mut c, "message publish yes");
        assert_eq!(
            done,
            "Published the message to Status Page, Slack (42 subs)."
        );
        assert_eq!(c.outbox.deliveries().len(), 2);

        assert_eq!(
            say(&mut c, "message publish"),
            "The message is already published."
        );
        assert_eq!(
            say(&mut c, "message publish yes"),
            "The message is already published."
        );
        assert_eq!(c.outbox.deliveries().len(), 2);
    }

    #[test]
    fn publishing_an_empty_draft_is_refused() {
        let mut c = console();
        say(&mut c, "open INC-4821");
        assert!(say(&mut c, "message publish").starts_with("error: the draft is empty"));

        say(&mut c, "message edit Hello");
        say(&mut c, "message select");
        assert!(say(&mut c, "message publish").starts_with("error: select at least one channel"));
    }

    #[test]
    fn publish_uses_selected_channels() {
        let mut c = console();
        say(&mut c, "open INC-4821");
        say(&mut c, "message edit Hello");
        assert_eq!(
            say(&mut c, "message select email, SMS (65 subs)"),
            "error: unknown channel: email"
        );
        assert_eq!(
            say(&mut c, "message select Email, SMS (65 subs)"),
            "Selected: Email (128 subs), SMS (65 subs)"
        );

        say(&mut c, "message publish");
        say(&mut c, "message publish yes");
        let channels: Vec<&str> = c
            .outbox
            .deliveries()
            .iter()
            .map(|d| d.channel.as_str())
            .collect();
        assert_eq!(channels, ["Email", "SMS"]);
    }

    #[test]
    fn editing_withdraws_a_pending_publish() {
        let mut c = console();
        say(&mut c, "open INC-4821");
        say(&mut c, "message edit first");
        say(&mut c, "message publish");

        let reply = say(&mut c, "message edit second");
        assert!(reply.contains("The pending publish was withdrawn"));
        assert!(say(&mut c, "message publish yes").starts_with("error: nothing to confirm"));
        assert!(c.outbox.deliveries().is_empty());

        say(&mut c, "message publish");
        say(&mut c, "message publish yes");
        assert_eq!(c.outbox.deliveries()[0].text, "second");
    }

    #[test]
    fn cancelling_a_publish_sends_nothing() {
        let mut c = console();
        say(&mut c, "open INC-4821");
        say(&mut c, "postmortem publish");
        assert_eq!(say(&mut c, "postmortem publish no"), "Publish cancelled.");
        assert_eq!(say(&mut c, "postmortem publish no"), "Nothing to cancel.");
        assert!(c.outbox.deliveries().is_empty());
    }

    #[test]
    fn feedback_flow() {
        let mut c = console();
        say(&mut c, "open INC-4821");

        assert_eq!(
            say(&mut c, "message comment too early"),
            "error: confirm a vote before commenting"
        );
        assert!(say(&mut c, "message vote up").starts_with("👍 Looks good selected."));
        assert!(say(&mut c, "message vote down").starts_with("👎 Needs improvement selected."));
        assert!(say(&mut c, "message vote yes").starts_with("Feedback confirmed."));
        assert_eq!(
            say(&mut c, "message vote up"),
            "error: feedback on the message is already confirmed"
        );
        assert_eq!(say(&mut c, "message comment too formal"), "Comment added.");
        assert_eq!(say(&mut c, "message submit"), "Thank you for your feedback!");
        assert_eq!(say(&mut c, "message submit"), "Feedback already submitted.");
        assert_eq!(
            say(&mut c, "message comment one more thing"),
            "error: feedback on the message was already submitted"
        );

        let feedback = c.outbox.feedback();
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback[0].vote, Vote::Down);
        assert_eq!(feedback[0].comment.as_deref(), Some("too formal"));

        assert_eq!(
            say(&mut c, "postmortem submit"),
            "error: confirm a vote before submitting"
        );
    }

    #[test]
    fn failed_generation_keeps_the_draft() {
        let mut c = console_with(FixedDrafter(None));
        say(&mut c, "open INC-4821");
        say(&mut c, "message edit mine");

        let reply = say(&mut c, "message generate");
        assert!(reply.starts_with("error: could not generate draft"));
        assert!(reply.ends_with("The current draft was kept."));
        assert!(say(&mut c, "message").starts_with("mine\n"));
    }

    #[test]
    fn internal_report_can_be_replaced() {
        let mut c = console();
        say(&mut c, "open INC-4821");
        assert!(say(&mut c, "internal").contains("- Root Cause:"));
        assert_eq!(say(&mut c, "internal edit Root cause: DNS"), "Internal report updated.");
        assert_eq!(say(&mut c, "internal"), "Root cause: DNS");
    }

    #[test]
    fn reopening_discards_the_session() {
        let mut c = console();
        say(&mut c, "open INC-4821");
        say(&mut c, "message edit draft");
        say(&mut c, "message publish");

        say(&mut c, "open INC-4821");
        assert!(say(&mut c, "message").starts_with("(empty;"));
    }

    #[test]
    fn run_reads_until_quit() {
        let mut c = console();
        let input = Cursor::new("open INC-4821\nshow\nquit\nlist\n");
        let mut out = Vec::new();
        run(&mut c, input, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Incident desk."));
        assert!(out.contains("INC-4821> "));
        assert!(out.contains("message:\n  Publish:  not published"));
        assert!(!out.contains("Showing"));
    }

    #[test]
    fn run_stops_at_end_of_input() {
        let mut c = console();
        let mut out = Vec::new();
        run(&mut c, Cursor::new("help\n"), &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Browsing:"));
        assert!(out.ends_with("incident-desk> \n"));
    }

    #[test]
    fn invalid_utf8_line_keeps_the_session() {
        let mut c = console();
        say(&mut c, "open INC-4821");
        say(&mut c, "message edit first");
        say(&mut c, "message publish");

        let input = Cursor::new(b"message edit caf\xe9\r\nshow\nquit\n".to_vec());
        let mut out = Vec::new();
        run(&mut c, input, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("The pending publish was withdrawn"));
        assert!(out.contains("message:\n  Publish:  not published"));
        assert!(say(&mut c, "message").starts_with("caf\u{FFFD}\n"));
    }
}
