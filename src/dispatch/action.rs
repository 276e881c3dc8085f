// src/dispatch/action.rs
//! Action resolution.

use std::fmt;

/// The closed set of actions the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Copy,
    Move,
    Delete,
    Get,
    List,
    Start,
    Stop,
    Restart,
    SetStartMode,
}

impl Action {
    /// Case-insensitive resolution. `None` means the action is unknown.
    pub fn resolve(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "copy" => Some(Self::Copy),
            "move" => Some(Self::Move),
            "delete" => Some(Self::Delete),
            "get" => Some(Self::Get),
            "list" => Some(Self::List),
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "restart" => Some(Self::Restart),
            "set-start-mode" | "setstartmode" => Some(Self::SetStartMode),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Move => "move",
            Self::Delete => "delete",
            Self::Get => "get",
            Self::List => "list",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::SetStartMode => "set-start-mode",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
