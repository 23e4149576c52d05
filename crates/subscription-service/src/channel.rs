//! Contact channel classification.

use std::fmt;

/// Kind of contact channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Email,
    Phone,
}

impl ChannelKind {
    /// Name of the verified flag on the backing record.
    pub fn record_field(self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::Phone => "phone",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_field())
    }
}

/// A contact identifier tagged with its channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContactChannel {
    Email(String),
    Phone(String),
}

impl ContactChannel {
    /// Classify a raw identifier.
    ///
    /// Anything containing `@` is an email address, everything else a phone
    /// number. No further well-formedness checks are made.
    pub fn classify(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.contains('@') {
            ContactChannel::Email(raw)
        } else {
            ContactChannel::Phone(raw)
        }
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            ContactChannel::Email(_) => ChannelKind::Email,
            ContactChannel::Phone(_) => ChannelKind::Phone,
        }
    }

    /// The raw identifier, used as the pending registry key.
    pub fn identifier(&self) -> &str {
        match self {
            ContactChannel::Email(v) | ContactChannel::Phone(v) => v,
        }
    }
}

impl fmt::Display for ContactChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.identifier())
    }
}
