//! Two-step confirmation for irreversible actions.
//!
//! Anything that publishes or submits goes through a [`ConfirmableAction`]:
//! the user proposes a choice, explicitly confirms it, and only then can the
//! side effect be committed. A committed action never runs its effect again.
//!
//! Out-of-order events (confirming with nothing proposed, committing twice)
//! are expected from a click-driven UI. They are reported as ignored rather
//! than as errors and leave the state untouched.

use std::fmt;

use tracing::{debug, info};

/// Where a confirmable action stands. The phases are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase<C> {
    /// Nothing proposed yet, or the last proposal was cancelled.
    Idle,

    /// A choice is waiting for confirmation.
    Proposed(C),

    /// The choice is confirmed; a comment may be attached before commit.
    Confirmed { choice: C, comment: Option<String> },

    /// The side effect ran. Terminal.
    Committed { choice: C, comment: Option<String> },
}

/// Whether an event changed the action's phase.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,

    /// The event made no sense in the current phase and was dropped.
    Ignored,
}

/// Result of a commit attempt that did not fail in the collaborator.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The effect ran and the action is now terminal.
    Committed,

    /// Not confirmed, or already committed. The effect was not called.
    NothingToCommit,
}

/// A propose → confirm → commit state machine over choices of type `C`.
///
/// One instance per logical action: feedback on a draft and publishing that
/// draft are separate instances and never affect each other.
#[derive(Debug, Clone)]
pub struct ConfirmableAction<C> {
    name: &'static str,
    phase: Phase<C>,
}

impl<C: fmt::Debug> ConfirmableAction<C> {
    /// A fresh action. `name` only labels log lines.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> &Phase<C> {
        &self.phase
    }

    /// The choice awaiting confirmation, if any.
    pub fn proposed_choice(&self) -> Option<&C> {
        match &self.phase {
            Phase::Proposed(choice) => Some(choice),
            _ => None,
        }
    }

    /// The confirmed choice, whether or not it has been committed.
    pub fn confirmed_choice(&self) -> Option<&C> {
        match &self.phase {
            Phase::Confirmed { choice, .. } | Phase::Committed { choice, .. } => Some(choice),
            _ => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match &self.phase {
            Phase::Confirmed { comment, .. } | Phase::Committed { comment, .. } => {
                comment.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.phase, Phase::Committed { .. })
    }

    /// Proposes `choice`, replacing any proposal still awaiting confirmation.
    ///
    /// Ignored once a choice has been confirmed.
    pub fn propose(&mut self, choice: C) -> Transition {
        match self.phase {
            Phase::Idle | Phase::Proposed(_) => {
                debug!(action = self.name, ?choice, "proposed");
                self.phase = Phase::Proposed(choice);
                Transition::Applied
            }
            Phase::Confirmed { .. } | Phase::Committed { .. } => self.ignored("propose"),
        }
    }

    /// Confirms the pending proposal.
    pub fn confirm(&mut self) -> Transition {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Proposed(choice) => {
                debug!(action = self.name, ?choice, "confirmed");
                self.phase = Phase::Confirmed {
                    choice,
                    comment: None,
                };
                Transition::Applied
            }
            other => {
                self.phase = other;
                self.ignored("confirm")
            }
        }
    }

    /// Drops the pending proposal. Never touches a confirmed choice.
    pub fn cancel(&mut self) -> Transition {
        if let Phase::Proposed(_) = self.phase {
            debug!(action = self.name, "cancelled");
            self.phase = Phase::Idle;
            Transition::Applied
        } else {
            self.ignored("cancel")
        }
    }

    /// Attaches a free-text comment to a confirmed, uncommitted choice.
    pub fn set_comment(&mut self, text: impl Into<String>) -> Transition {
        if let Phase::Confirmed { comment, .. } = &mut self.phase {
            *comment = Some(text.into());
            Transition::Applied
        } else {
            self.ignored("comment")
        }
    }

    /// Returns a proposed or confirmed choice to idle.
    ///
    /// Used when whatever the choice refers to has changed, so the user must
    /// look at it again. Committed actions are left alone.
    pub fn withdraw(&mut self) -> Transition {
        match self.phase {
            Phase::Proposed(_) | Phase::Confirmed { .. } => {
                debug!(action = self.name, "withdrawn");
                self.phase = Phase::Idle;
                Transition::Applied
            }
            Phase::Idle | Phase::Committed { .. } => Transition::Ignored,
        }
    }

    /// Runs `effect` with the confirmed choice and comment, exactly once.
    ///
    /// Blank comments are passed as `None`. If the effect fails the action
    /// stays confirmed and the error is returned as-is, so the caller can
    /// retry. Outside the confirmed phase the effect is not called.
    pub fn commit<F, E>(&mut self, effect: F) -> Result<CommitOutcome, E>
    where
        F: FnOnce(&C, Option<&str>) -> Result<(), E>,
    {
        let Phase::Confirmed { choice, comment } = &self.phase else {
            debug!(action = self.name, phase = self.phase_name(), "nothing to commit");
            return Ok(CommitOutcome::NothingToCommit);
        };

        let note = comment.as_deref().map(str::trim).filter(|c| !c.is_empty());
        effect(choice, note)?;

        if let Phase::Confirmed { choice, comment } =
            std::mem::replace(&mut self.phase, Phase::Idle)
        {
            info!(action = self.name, ?choice, "committed");
            self.phase = Phase::Committed { choice, comment };
        }
        Ok(CommitOutcome::Committed)
    }

    fn ignored(&self, event: &str) -> Transition {
        debug!(action = self.name, event, phase = self.phase_name(), "ignored");
        Transition::Ignored
    }

    fn phase_name(&self) -> &'static str {
        match self.phase {
            Phase::Idle => "idle",
            Phase::Proposed(_) => "proposed",
            Phase::Confirmed { .. } => "confirmed",
            Phase::Committed { .. } => "committed",
        }
    }
}
