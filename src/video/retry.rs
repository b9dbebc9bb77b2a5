use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinAction {
    Retry { after: Duration },
    GiveUp,
}

/// Decides what to do after join attempt number `attempt` (1-based) failed.
pub fn next_join_action(attempt: u32, max_attempts: u32, backoff: Duration) -> JoinAction {
    if attempt < max_attempts {
        JoinAction::Retry { after: backoff }
    } else {
        JoinAction::GiveUp
    }
}
