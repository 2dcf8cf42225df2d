//! Feedback votes on AI-drafted text.

use std::fmt;
use std::str::FromStr;

/// Thumbs up or down on a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// The button label the vote was cast with.
    pub fn label(self) -> &'static str {
        match self {
            Self::Up => "👍 Looks good",
            Self::Down => "👎 Needs improvement",
        }
    }
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "+1" | "good" => Ok(Self::Up),
            "down" | "-1" | "bad" => Ok(Self::Down),
            other => Err(format!("unknown vote '{other}' (expected up or down)")),
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which draft a piece of feedback is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSubject {
    /// The customer communication draft.
    Message,

    /// The postmortem reports.
    Postmortem,
}

impl fmt::Display for FeedbackSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Message => "message",
            Self::Postmortem => "postmortem",
        })
    }
}
