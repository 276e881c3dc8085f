// src/dispatch/command.rs
//! Typed commands and lenient parameter binding.

use std::path::PathBuf;

use crate::dispatch::action::Action;
use crate::dispatch::params::ParamBag;
use crate::service::StartMode;

/// A fully bound command, ready for validation and execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Copy {
        source: PathBuf,
        dest: PathBuf,
        overwrite: bool,
    },
    Move {
        source: PathBuf,
        dest: PathBuf,
        overwrite: bool,
    },
    Delete {
        path: PathBuf,
    },
    Get {
        path: PathBuf,
    },
    List {
        path: PathBuf,
    },
    Start {
        service_name: String,
    },
    Stop {
        service_name: String,
    },
    Restart {
        service_name: String,
    },
    SetStartMode {
        service_name: String,
        /// `None` when the parameter was missing or not one of the three
        /// accepted modes; validation reports it.
        start_mode: Option<StartMode>,
    },
}

impl Command {
    /// Bind parameters for `action`. Binding is lenient: a missing or
    /// unconvertible parameter takes its zero value here and is reported
    /// by validation, never by binding itself.
    pub fn bind(action: Action, params: &ParamBag) -> Self {
        match action {
            Action::Copy => Self::Copy {
                source: path_field(params, "sourcePath"),
                dest: path_field(params, "destPath"),
                overwrite: params.get_bool("overwrite"),
            },
            Action::Move => Self::Move {
                source: path_field(params, "sourcePath"),
                dest: path_field(params, "destPath"),
                overwrite: params.get_bool("overwrite"),
            },
            Action::Delete => Self::Delete {
                path: path_field(params, "path"),
            },
            Action::Get => Self::Get {
                path: path_field(params, "path"),
            },
            Action::List => Self::List {
                path: path_field(params, "path"),
            },
            Action::Start => Self::Start {
                service_name: text_field(params, "serviceName"),
            },
            Action::Stop => Self::Stop {
                service_name: text_field(params, "serviceName"),
            },
            Action::Restart => Self::Restart {
                service_name: text_field(params, "serviceName"),
            },
            Action::SetStartMode => Self::SetStartMode {
                service_name: text_field(params, "serviceName"),
                start_mode: params
                    .get_str("startMode")
                    .and_then(|raw| StartMode::parse_request(&raw)),
            },
        }
    }
}

fn text_field(params: &ParamBag, key: &str) -> String {
    params.get_str(key).unwrap_or_default()
}

fn path_field(params: &ParamBag, key: &str) -> PathBuf {
    PathBuf::from(text_field(params, key))
}
