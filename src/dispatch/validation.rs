// src/dispatch/validation.rs
//! Pre-execution request validation.
//!
//! Rules run over the fully bound command and every broken rule lands in
//! the returned map, so one response reports all problems at once. Only a
//! command with an empty map reaches an executor.

use std::path::Path;

use crate::dispatch::command::Command;
use crate::error::{AgentError, Result, ValidationErrors};
use crate::service::StartMode;

pub const START_MODE_RULE: &str = "The startMode field must be Automatic, Manual or Disabled.";

/// The parsed mode of a SetStartMode command. The rule message lives here
/// so an unchecked command fails the same way a validated one would.
pub fn require_start_mode(start_mode: Option<StartMode>) -> Result<StartMode> {
    start_mode.ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.insert("startMode".to_string(), START_MODE_RULE.to_string());
        AgentError::Validation(errors)
    })
}

pub fn validate(command: &Command) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    match command {
        Command::Copy { source, dest, .. } | Command::Move { source, dest, .. } => {
            require_path(&mut errors, "sourcePath", source);
            require_path(&mut errors, "destPath", dest);
        }
        Command::Delete { path } => {
            require_path(&mut errors, "path", path);
        }
        Command::Get { path } | Command::List { path } => {
            require_path(&mut errors, "path", path);
            well_formed_path(&mut errors, "path", path);
        }
        Command::Start { service_name }
        | Command::Stop { service_name }
        | Command::Restart { service_name } => {
            require_text(&mut errors, "serviceName", service_name);
        }
        Command::SetStartMode {
            service_name,
            start_mode,
        } => {
            require_text(&mut errors, "serviceName", service_name);
            if start_mode.is_none() {
                errors.insert("startMode".to_string(), START_MODE_RULE.to_string());
            }
        }
    }
    errors
}

fn require_path(errors: &mut ValidationErrors, field: &str, path: &Path) {
    if path.as_os_str().is_empty() {
        errors.insert(field.to_string(), format!("The {field} field is required."));
    }
}

fn require_text(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), format!("The {field} field is required."));
    }
}

/// Read paths are rejected before touching the filesystem when they are
/// relative or malformed; write commands let the executor classify them.
fn well_formed_path(errors: &mut ValidationErrors, field: &str, path: &Path) {
    if path.as_os_str().is_empty() {
        return;
    }
    if !path.is_absolute() {
        errors.insert(
            field.to_string(),
            "The path should be a rooted path.".to_string(),
        );
        return;
    }
    if has_invalid_chars(path) {
        errors.insert(
            field.to_string(),
            "The path contains invalid characters.".to_string(),
        );
    }
}

fn has_invalid_chars(path: &Path) -> bool {
    let text = path.to_string_lossy();
    if text.contains('\0') {
        return true;
    }
    #[cfg(windows)]
    {
        if text.chars().any(|c| c == '|' || (c as u32) < 32) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::action::Action;
    use crate::dispatch::params::ParamBag;
    use serde_json::json;
    use test_case::test_case;

    fn bound(action: Action, body: serde_json::Value) -> Command {
        Command::bind(action, &ParamBag::from_json(&body))
    }

    #[test]
    fn copy_reports_every_missing_field_at_once() {
        let errors = validate(&bound(Action::Copy, json!({})));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["sourcePath"], "The sourcePath field is required.");
        assert_eq!(errors["destPath"], "The destPath field is required.");
    }

    #[test_case(Action::Delete)]
    #[test_case(Action::Get)]
    #[test_case(Action::List)]
    fn path_commands_require_a_path(action: Action) {
        let errors = validate(&bound(action, json!({})));
        assert_eq!(errors["path"], "The path field is required.");
    }

    #[test]
    fn read_paths_must_be_rooted() {
        let errors = validate(&bound(Action::List, json!({ "path": "work/logs" })));
        assert_eq!(errors["path"], "The path should be a rooted path.");
    }

    #[test]
    fn read_paths_reject_embedded_nul() {
        let errors = validate(&bound(Action::Get, json!({ "path": "/tmp/a\u{0}b" })));
        assert_eq!(errors["path"], "The path contains invalid characters.");
    }

    #[test]
    fn a_clean_command_validates_to_an_empty_map() {
        let errors = validate(&bound(
            Action::Copy,
            json!({ "sourcePath": "/a", "destPath": "/b" }),
        ));
        assert!(errors.is_empty());
    }

    #[test_case(Action::Start)]
    #[test_case(Action::Stop)]
    #[test_case(Action::Restart)]
    fn service_commands_require_a_name(action: Action) {
        let errors = validate(&bound(action, json!({ "serviceName": "  " })));
        assert_eq!(
            errors["serviceName"],
            "The serviceName field is required."
        );
    }

    #[test]
    fn a_missing_start_mode_resolves_to_the_same_rule() {
        match require_start_mode(None) {
            Err(AgentError::Validation(fields)) => {
                assert_eq!(fields["startMode"], START_MODE_RULE);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(
            require_start_mode(Some(StartMode::Manual)).unwrap(),
            StartMode::Manual
        );
    }

    #[test]
    fn set_start_mode_collects_both_rules() {
        let errors = validate(&bound(
            Action::SetStartMode,
            json!({ "startMode": "boot" }),
        ));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["startMode"], START_MODE_RULE);
        assert_eq!(
            errors["serviceName"],
            "The serviceName field is required."
        );
    }
}
