//! Process launch boundary: turns an `Exec` template into a running process.

use std::process::{Child, Command};

use log::info;

use crate::desktop_entry::extract_args;
use crate::error::{AppError, Result};

/// Split an `Exec` value into the program and its expanded arguments.
///
/// The template is split on whitespace; a quoted program token has its
/// quotes removed.
pub fn command_line(exec: &str, params: &[String]) -> Result<(String, Vec<String>)> {
    let tokens: Vec<&str> = exec.split_whitespace().collect();
    let Some(&first) = tokens.first() else {
        return Err(AppError::EmptyCommand);
    };

    let program = first
        .strip_prefix('"')
        .map(|p| p.strip_suffix('"').unwrap_or(p))
        .unwrap_or(first)
        .to_string();
    let args = extract_args(tokens.as_slice(), params).into_iter().skip(1).collect();

    Ok((program, args))
}

/// Start `program` without waiting for it. `env` entries are set on top of
/// the inherited environment, overriding variables of the same name.
pub fn spawn(program: &str, args: &[String], env: &[(String, String)]) -> Result<Child> {
    info!("Launching {} {:?}", program, args);

    Command::new(program)
        .args(args)
        .envs(env.iter().map(|(k, v)| (k, v)))
        .spawn()
        .map_err(|source| AppError::Launch {
            command: program.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_line_expands_field_codes() {
        let (program, args) =
            command_line("firefox --new-window %u", &strings(&["https://example.com"])).unwrap();
        assert_eq!(program, "firefox");
        assert_eq!(args, strings(&["--new-window", "https://example.com"]));
    }

    #[test]
    fn test_command_line_strips_quoted_program() {
        let (program, args) = command_line("\"/opt/tool\" --flag %F", &strings(&["a", "b"])).unwrap();
        assert_eq!(program, "/opt/tool");
        assert_eq!(args, strings(&["--flag", "a", "b"]));
    }

    #[test]
    fn test_command_line_without_args() {
        let (program, args) = command_line("xterm", &strings(&["ignored"])).unwrap();
        assert_eq!(program, "xterm");
        assert!(args.is_empty());
    }

    #[test]
    fn test_empty_command() {
        assert!(matches!(command_line("   ", &[]), Err(AppError::EmptyCommand)));
    }

    #[test]
    fn test_spawn_missing_program_is_launch_error() {
        let err = spawn("/nonexistent/appie-test-binary", &[], &[]).unwrap_err();
        assert!(matches!(err, AppError::Launch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_applies_env_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out.txt");
        let script = format!("printf '%s' \"$APPIE_LAUNCH_TEST\" > '{}'", out.display());

        let mut child = spawn(
            "sh",
            &strings(&["-c", &script]),
            &[("APPIE_LAUNCH_TEST".to_string(), "override".to_string())],
        )
        .unwrap();
        assert!(child.wait().unwrap().success());
        assert_eq!(std::fs::read_to_string(out).unwrap(), "override");
    }
}
