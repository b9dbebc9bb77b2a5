use std::fmt;

/// Lifecycle of one video call as seen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Requesting,
    Connecting,
    Active,
    Ending,
    /// User-facing reason for the failure.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    SessionCreated,
    Joined,
    Close,
    RemoteEnded,
    CleanupComplete,
    Fail(String),
    Dismiss,
}

impl SessionState {
    /// Pure transition function. `None` means the event does not apply in
    /// this state and should be ignored.
    pub fn next(&self, event: &SessionEvent) -> Option<SessionState> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (_, E::Fail(reason)) => Some(S::Error(reason.clone())),
            (S::Idle | S::Error(_), E::Start) => Some(S::Requesting),
            (S::Requesting, E::SessionCreated) => Some(S::Connecting),
            (S::Connecting, E::Joined) => Some(S::Active),
            (S::Requesting | S::Connecting | S::Active, E::Close) => Some(S::Ending),
            (S::Connecting | S::Active, E::RemoteEnded) => Some(S::Ending),
            (S::Ending, E::CleanupComplete) => Some(S::Idle),
            (S::Error(_), E::Dismiss | E::Close) => Some(S::Idle),
            _ => None,
        }
    }

    /// True while a call is being set up or is live.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Requesting | Self::Connecting | Self::Active)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Requesting => f.write_str("requesting"),
            Self::Connecting => f.write_str("connecting"),
            Self::Active => f.write_str("active"),
            Self::Ending => f.write_str("ending"),
            Self::Error(_) => f.write_str("error"),
        }
    }
}
