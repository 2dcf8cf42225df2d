//! Per-incident sessions: everything a user can change about one incident.
//!
//! Opening an incident creates an [`IncidentSession`]. It owns two
//! [`Bulletin`]s (the customer message and the customer-facing postmortem),
//! each with its own draft, channel selection, publish action, and feedback
//! action, plus the internal postmortem report. Nothing is shared between
//! sessions and nothing outlives one.

use tracing::{info, warn};
use uuid::Uuid;

use crate::channels::{ChannelError, ChannelSelection};
use crate::confirm::{CommitOutcome, ConfirmableAction, Transition};
use crate::draft::{self, DraftError, DraftSession, Drafter};
use crate::model::{FeedbackSubject, Incident, IncidentSummary, Publication, Vote};
use crate::publish::{DeliveryError, FeedbackSink, Publisher};

/// Why a publish could not be proposed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("select at least one channel before publishing")]
    NoChannelsSelected,

    #[error("the draft is empty; generate or write one before publishing")]
    EmptyDraft,
}

/// A publishable draft with its channels, publish action, and feedback.
///
/// Changing the draft or the channels withdraws a pending or confirmed
/// publish, so what gets published is always what was confirmed.
#[derive(Debug, Clone)]
pub struct Bulletin {
    subject: FeedbackSubject,
    draft: DraftSession,
    channels: ChannelSelection,
    publish: ConfirmableAction<Publication>,
    feedback: ConfirmableAction<Vote>,
}

impl Bulletin {
    pub fn new(subject: FeedbackSubject, draft: DraftSession, channels: ChannelSelection) -> Self {
        let (publish, feedback) = match subject {
            FeedbackSubject::Message => ("message-publish", "message-feedback"),
            FeedbackSubject::Postmortem => ("postmortem-publish", "postmortem-feedback"),
        };
        Self {
            subject,
            draft,
            channels,
            publish: ConfirmableAction::new(publish),
            feedback: ConfirmableAction::new(feedback),
        }
    }

    pub fn subject(&self) -> FeedbackSubject {
        self.subject
    }

    pub fn draft(&self) -> &DraftSession {
        &self.draft
    }

    pub fn channels(&self) -> &ChannelSelection {
        &self.channels
    }

    pub fn publish_action(&self) -> &ConfirmableAction<Publication> {
        &self.publish
    }

    pub fn feedback_action(&self) -> &ConfirmableAction<Vote> {
        &self.feedback
    }

    // ── Draft ──

    pub fn edit(&mut self, text: impl Into<String>) {
        self.draft.edit(text);
        self.invalidate_publish("draft edited");
    }

    /// Replaces the draft with a fresh one from `drafter`.
    ///
    /// On failure the draft and any pending publish are left as they were.
    pub fn request_draft(
        &mut self,
        incident: &Incident,
        drafter: &dyn Drafter,
    ) -> Result<(), DraftError> {
        self.draft.request_draft(incident, drafter)?;
        self.invalidate_publish("draft regenerated");
        Ok(())
    }

    // ── Channels ──

    pub fn select_channels<I, S>(&mut self, names: I) -> Result<(), ChannelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.channels.select_channels(names)?;
        self.invalidate_publish("channels changed");
        Ok(())
    }

    // ── Publish ──

    /// Proposes publishing the current draft to the current channels.
    ///
    /// Ignored once published. Rejected when there is nothing to publish or
    /// nowhere to publish it.
    pub fn propose_publish(&mut self) -> Result<Transition, SessionError> {
        if self.publish.is_committed() {
            return Ok(self.publish.propose(self.publication()));
        }
        if self.draft.is_blank() {
            return Err(SessionError::EmptyDraft);
        }
        if self.channels.selected().is_empty() {
            return Err(SessionError::NoChannelsSelected);
        }
        Ok(self.publish.propose(self.publication()))
    }

    pub fn confirm_publish(&mut self) -> Transition {
        self.publish.confirm()
    }

    pub fn cancel_publish(&mut self) -> Transition {
        self.publish.cancel()
    }

    /// Publishes the confirmed snapshot through `publisher`.
    pub fn commit_publish(
        &mut self,
        publisher: &mut dyn Publisher,
    ) -> Result<CommitOutcome, DeliveryError> {
        let subject = self.subject;
        self.publish
            .commit(|publication, _| publisher.publish(&publication.text, &publication.channels))
            .inspect_err(|e| warn!(%subject, error = %e, "publish failed"))
    }

    // ── Feedback ──

    pub fn vote(&mut self, vote: Vote) -> Transition {
        self.feedback.propose(vote)
    }

    pub fn confirm_vote(&mut self) -> Transition {
        self.feedback.confirm()
    }

    pub fn cancel_vote(&mut self) -> Transition {
        self.feedback.cancel()
    }

    pub fn comment(&mut self, text: impl Into<String>) -> Transition {
        self.feedback.set_comment(text)
    }

    /// Submits the confirmed vote and comment through `sink`.
    pub fn submit_feedback(
        &mut self,
        sink: &mut dyn FeedbackSink,
    ) -> Result<CommitOutcome, DeliveryError> {
        let subject = self.subject;
        self.feedback
            .commit(|vote, comment| sink.submit_feedback(subject, *vote, comment))
            .inspect_err(|e| warn!(%subject, error = %e, "feedback submission failed"))
    }

    fn publication(&self) -> Publication {
        Publication {
            text: self.draft.snapshot().to_string(),
            channels: self.channels.selected().to_vec(),
        }
    }

    fn invalidate_publish(&mut self, reason: &str) {
        if self.publish.withdraw() == Transition::Applied {
            info!(subject = %self.subject, reason, "publish proposal withdrawn");
        }
    }
}

/// Everything one user has open for one incident.
#[derive(Debug, Clone)]
pub struct IncidentSession {
    id: Uuid,
    incident: Incident,
    summary: IncidentSummary,
    message: Bulletin,
    postmortem: Bulletin,
    internal_report: DraftSession,
}

impl IncidentSession {
    /// Opens `incident`, seeding the postmortems from templates.
    ///
    /// The message draft starts empty until a drafter fills it.
    pub fn open(incident: Incident, channels: &ChannelSelection) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, incident = %incident.id, "session opened");

        let postmortem = DraftSession::with_text(draft::customer_postmortem(&incident));
        let internal_report = DraftSession::with_text(draft::internal_postmortem(&incident));

        Self {
            id,
            summary: draft::mock_summary(&incident),
            message: Bulletin::new(FeedbackSubject::Message, DraftSession::new(), channels.clone()),
            postmortem: Bulletin::new(FeedbackSubject::Postmortem, postmortem, channels.clone()),
            internal_report,
            incident,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn incident(&self) -> &Incident {
        &self.incident
    }

    pub fn summary(&self) -> &IncidentSummary {
        &self.summary
    }

    pub fn bulletin(&self, subject: FeedbackSubject) -> &Bulletin {
        match subject {
            FeedbackSubject::Message => &self.message,
            FeedbackSubject::Postmortem => &self.postmortem,
        }
    }

    pub fn bulletin_mut(&mut self, subject: FeedbackSubject) -> &mut Bulletin {
        match subject {
            FeedbackSubject::Message => &mut self.message,
            FeedbackSubject::Postmortem => &mut self.postmortem,
        }
    }

    /// Replaces a bulletin's draft with a freshly generated one.
    ///
    /// The message asks `drafter`; the postmortem is reset to its template.
    pub fn generate(
        &mut self,
        subject: FeedbackSubject,
        drafter: &dyn Drafter,
    ) -> Result<(), DraftError> {
        match subject {
            FeedbackSubject::Message => self.message.request_draft(&self.incident, drafter),
            FeedbackSubject::Postmortem => {
                self.postmortem.edit(draft::customer_postmortem(&self.incident));
                Ok(())
            }
        }
    }

    pub fn internal_report(&self) -> &DraftSession {
        &self.internal_report
    }

    pub fn edit_internal_report(&mut self, text: impl Into<String>) {
        self.internal_report.edit(text);
    }
}
