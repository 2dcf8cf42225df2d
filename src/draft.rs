//! Draft text and the collaborators that produce it.
//!
//! A [`DraftSession`] holds the text a user is about to publish. Drafts come
//! from a [`Drafter`]: the offline [`TemplateDrafter`] or the HTTP
//! [`ChatDrafter`]. A failed draft request never touches the current text.

mod chat;
mod template;

use tracing::{info, warn};

use crate::model::Incident;

pub use chat::ChatDrafter;
pub use template::{TemplateDrafter, customer_postmortem, internal_postmortem, mock_summary};

/// Errors from a drafting collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("drafting request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("drafting service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed drafting response: {0}")]
    Malformed(String),

    #[error("drafting service returned no text")]
    Empty,
}

/// Produces customer-facing message text for an incident.
pub trait Drafter {
    fn draft(&self, incident: &Incident) -> Result<String, DraftError>;
}

/// Editable draft text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftSession {
    text: String,
}

impl DraftSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session seeded with template text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Asks `drafter` for a fresh draft and replaces the text on success.
    ///
    /// Blank replies count as failures. On any failure the current text is
    /// kept and the error is returned for the caller to show.
    pub fn request_draft(
        &mut self,
        incident: &Incident,
        drafter: &dyn Drafter,
    ) -> Result<(), DraftError> {
        let text = drafter.draft(incident).and_then(|text| {
            if text.trim().is_empty() {
                Err(DraftError::Empty)
            } else {
                Ok(text)
            }
        });

        match text {
            Ok(text) => {
                info!(incident = %incident.id, chars = text.len(), "draft replaced");
                self.text = text;
                Ok(())
            }
            Err(e) => {
                warn!(incident = %incident.id, error = %e, "draft request failed");
                Err(e)
            }
        }
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn snapshot(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
