//! What a publish proposal carries.

/// The text and channels captured when a publish is proposed.
///
/// Confirmation applies to exactly this snapshot. Changing the draft or the
/// channel selection afterwards withdraws the proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub text: String,
    pub channels: Vec<String>,
}
