//! Loop lifecycle

use serde::Serialize;
use std::fmt;

/// `Idle → Running → Stopped`. A stopped agent is never restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoopState::Idle => "IDLE",
            LoopState::Running => "RUNNING",
            LoopState::Stopped => "STOPPED",
        })
    }
}
