//! Delivery collaborators: where confirmed publishes and feedback go.
//!
//! Real channel integrations are out of scope. The [`Outbox`] stands in for
//! them: it records every delivery for the session and logs it, so the
//! console can show what went where.

use jiff::Timestamp;
use tracing::info;

use crate::model::{FeedbackSubject, Vote};

/// Errors from a delivery collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("no channels to publish to")]
    NoChannels,

    #[error("{channel} rejected the message: {reason}")]
    Rejected { channel: String, reason: String },
}

/// Delivers message text to named channels.
pub trait Publisher {
    fn publish(&mut self, text: &str, channels: &[String]) -> Result<(), DeliveryError>;
}

/// Receives feedback votes on drafts.
pub trait FeedbackSink {
    fn submit_feedback(
        &mut self,
        subject: FeedbackSubject,
        vote: Vote,
        comment: Option<&str>,
    ) -> Result<(), DeliveryError>;
}

/// One message sent to one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: String,
    pub text: String,
    pub delivered_at: Timestamp,
}

/// One piece of submitted feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub subject: FeedbackSubject,
    pub vote: Vote,
    pub comment: Option<String>,
    pub submitted_at: Timestamp,
}

/// In-memory record of everything a session sent out.
#[derive(Debug, Default)]
pub struct Outbox {
    deliveries: Vec<Delivery>,
    feedback: Vec<FeedbackRecord>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn feedback(&self) -> &[FeedbackRecord] {
        &self.feedback
    }
}

impl Publisher for Outbox {
    fn publish(&mut self, text: &str, channels: &[String]) -> Result<(), DeliveryError> {
        if channels.is_empty() {
            return Err(DeliveryError::NoChannels);
        }
        if text.trim().is_empty() {
            return Err(DeliveryError::Rejected {
                channel: channels[0].clone(),
                reason: "message is empty".to_string(),
            });
        }

        let delivered_at = Timestamp::now();
        for channel in channels {
            info!(%channel, chars = text.len(), "message delivered");
            self.deliveries.push(Delivery {
                channel: channel.clone(),
                text: text.to_string(),
                delivered_at,
            });
        }
        Ok(())
    }
}

impl FeedbackSink for Outbox {
    fn submit_feedback(
        &mut self,
        subject: FeedbackSubject,
        vote: Vote,
        comment: Option<&str>,
    ) -> Result<(), DeliveryError> {
        info!(%subject, %vote, has_comment = comment.is_some(), "feedback recorded");
        self.feedback.push(FeedbackRecord {
            subject,
            vote,
            comment: comment.map(String::from),
            submitted_at: Timestamp::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_records_one_delivery_per_channel() {
        let mut outbox = Outbox::new();
        let channels = vec!["Slack".to_string(), "Email".to_string()];
        outbox.publish("We are investigating.", &channels).unwrap();

        let sent: Vec<&str> = outbox
            .deliveries()
            .iter()
            .map(|d| d.channel.as_str())
            .collect();
        assert_eq!(sent, ["Slack", "Email"]);
        assert!(
            outbox
                .deliveries()
                .iter()
                .all(|d| d.text == "We are investigating.")
        );
    }

    #[test]
    fn publish_without_channels_fails() {
        let mut outbox = Outbox::new();
        assert_eq!(
            outbox.publish("text", &[]).unwrap_err(),
            DeliveryError::NoChannels
        );
        assert!(outbox.deliveries().is_empty());
    }

    #[test]
    fn blank_text_is_rejected() {
        let mut outbox = Outbox::new();
        let err = outbox.publish(" \n", &["SMS".to_string()]).unwrap_err();

        assert_eq!(err.to_string(), "SMS rejected the message: message is empty");
        assert!(outbox.deliveries().is_empty());
    }

    #[test]
    fn feedback_is_recorded() {
        let mut outbox = Outbox::new();
        outbox
            .submit_feedback(FeedbackSubject::Postmortem, Vote::Down, Some("too long"))
            .unwrap();

        let record = &outbox.feedback()[0];
        assert_eq!(record.subject, FeedbackSubject::Postmortem);
        assert_eq!(record.vote, Vote::Down);
        assert_eq!(record.comment.as_deref(), Some("too long"));
    }
}
