//! Distribution channels and the user's selection among them.
//!
//! A channel's identity is its bare name. Subscriber counts only decorate
//! the display label, and labels map back to names by exact lookup.

/// Errors from channel selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("unknown channel: {0}")]
    InvalidChannel(String),
}

/// A named distribution target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub name: String,

    /// Shown next to the name; never part of the channel's identity.
    pub subscribers: Option<u32>,
}

impl Channel {
    pub fn new(name: impl Into<String>, subscribers: Option<u32>) -> Self {
        Self {
            name: name.into(),
            subscribers,
        }
    }

    /// `"Slack (42 subs)"` with a count, `"Status Page"` without.
    pub fn display_label(&self) -> String {
        match self.subscribers {
            Some(count) => format!("{} ({count} subs)", self.name),
            None => self.name.clone(),
        }
    }
}

/// The channels a message can go to, and which of them are selected.
#[derive(Debug, Clone)]
pub struct ChannelSelection {
    available: Vec<Channel>,

    /// Always a subset of `available` names, in `available` order.
    selected: Vec<String>,
}

impl ChannelSelection {
    /// Builds a selection with `defaults` pre-selected.
    ///
    /// Defaults are validated like any other selection.
    pub fn new<S: AsRef<str>>(
        available: Vec<Channel>,
        defaults: &[S],
    ) -> Result<Self, ChannelError> {
        let mut selection = Self {
            available,
            selected: Vec::new(),
        };
        selection.select_channels(defaults)?;
        Ok(selection)
    }

    /// Status Page, Slack, Email, and SMS, with Status Page and Slack selected.
    pub fn standard() -> Self {
        let available = vec![
            Channel::new("Status Page", None),
            Channel::new("Slack", Some(42)),
            Channel::new("Email", Some(128)),
            Channel::new("SMS", Some(65)),
        ];
        Self {
            available,
            selected: vec!["Status Page".to_string(), "Slack".to_string()],
        }
    }

    pub fn available(&self) -> &[Channel] {
        &self.available
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s == name)
    }

    /// Replaces the selection with `names`.
    ///
    /// Each entry may be a channel name or its exact display label. If any
    /// entry matches neither, nothing changes and the first offender is
    /// reported.
    pub fn select_channels<I, S>(&mut self, names: I) -> Result<(), ChannelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted = Vec::new();
        for name in names {
            let name = name.as_ref();
            let channel = self
                .resolve(name)
                .ok_or_else(|| ChannelError::InvalidChannel(name.to_string()))?;
            wanted.push(channel.to_string());
        }

        self.selected = self
            .available
            .iter()
            .filter(|c| wanted.contains(&c.name))
            .map(|c| c.name.clone())
            .collect();
        Ok(())
    }

    /// Display label for a channel name, if the channel exists.
    pub fn display_label(&self, name: &str) -> Option<String> {
        self.find(name).map(Channel::display_label)
    }

    /// The channel name behind an exact display label.
    pub fn channel_for_label(&self, label: &str) -> Option<&str> {
        self.available
            .iter()
            .find(|c| c.display_label() == label)
            .map(|c| c.name.as_str())
    }

    /// Labels of the selected channels, in order.
    pub fn selected_labels(&self) -> Vec<String> {
        self.selected
            .iter()
            .filter_map(|name| self.display_label(name))
            .collect()
    }

    fn find(&self, name: &str) -> Option<&Channel> {
        self.available.iter().find(|c| c.name == name)
    }

    // Names win over labels so a channel literally named like another
    // channel's label still resolves to itself.
    fn resolve(&self, name_or_label: &str) -> Option<&str> {
        let trimmed = name_or_label.trim();
        self.find(trimmed)
            .map(|c| c.name.as_str())
            .or_else(|| self.channel_for_label(trimmed))
    }
}
