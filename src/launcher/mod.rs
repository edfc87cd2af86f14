//! App launching and URL opening
//!
//! OS-specific collaborator behind a narrow `launch(name)` contract.
//! Launching tries a canonical per-OS command table first, then a PATH
//! lookup, then a last-resort generic invocation; every attempt is
//! logged and failure is reported, never raised.

use std::process::{Command, Stdio};

use serde::Serialize;
use url::Url;

/// Result of one launch or open attempt
#[derive(Debug, Clone, Serialize)]
pub struct LaunchOutcome {
    /// Whether the target was started
    pub ok: bool,
    /// User-facing message for the attempt
    pub message: String,
}

impl LaunchOutcome {
    fn opened(label: &str) -> Self {
        Self {
            ok: true,
            message: format!("Opened {label}"),
        }
    }

    fn failed(label: &str) -> Self {
        Self {
            ok: false,
            message: format!("Could not open {label}. It may not be installed or accessible."),
        }
    }
}

/// Canonical commands for known app names
#[cfg(target_os = "windows")]
const APP_COMMANDS: &[(&str, &str)] = &[
    ("notepad", "notepad.exe"),
    ("calculator", "calc.exe"),
    ("paint", "mspaint.exe"),
    ("explorer", "explorer.exe"),
    ("chrome", "chrome"),
    ("brave", "brave"),
    ("edge", "msedge"),
    ("firefox", "firefox"),
    ("vs code", "code"),
    ("word", "winword"),
    ("excel", "excel"),
    ("powerpoint", "powerpnt"),
];

#[cfg(target_os = "macos")]
const APP_COMMANDS: &[(&str, &str)] = &[
    ("chrome", "Google Chrome"),
    ("brave", "Brave Browser"),
    ("edge", "Microsoft Edge"),
    ("firefox", "Firefox"),
    ("vs code", "Visual Studio Code"),
    ("word", "Microsoft Word"),
    ("excel", "Microsoft Excel"),
    ("powerpoint", "Microsoft PowerPoint"),
    ("notepad", "TextEdit"),
    ("calculator", "Calculator"),
    ("explorer", "Finder"),
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const APP_COMMANDS: &[(&str, &str)] = &[
    ("chrome", "google-chrome"),
    ("brave", "brave-browser"),
    ("edge", "microsoft-edge"),
    ("firefox", "firefox"),
    ("vs code", "code"),
    ("notepad", "gedit"),
    ("calculator", "gnome-calculator"),
    ("explorer", "nautilus"),
];

/// Launches apps and opens URLs on the host OS
#[derive(Debug, Clone, Copy, Default)]
pub struct Launcher;

impl Launcher {
    /// Create a launcher
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Launch an app by canonical name
    ///
    /// Tries the per-OS command table, then a PATH lookup of the bare
    /// name, then a generic invocation.
    #[must_use]
    pub fn launch(&self, name: &str) -> LaunchOutcome {
        let name = name.trim().to_lowercase();
        tracing::info!(app = %name, "launching app");

        if let Some(command) = resolve_command(&name) {
            match spawn_app(command) {
                Ok(()) => return LaunchOutcome::opened(&name),
                Err(e) => {
                    tracing::warn!(app = %name, command, error = %e, "mapped command failed");
                }
            }
        }

        if let Ok(path) = which::which(&name) {
            tracing::debug!(app = %name, path = %path.display(), "found on PATH");
            match spawn_binary(&path.to_string_lossy()) {
                Ok(()) => return LaunchOutcome::opened(&name),
                Err(e) => {
                    tracing::warn!(app = %name, error = %e, "PATH binary failed to start");
                }
            }
        }

        // Last resort: hand the raw name to the OS
        match spawn_app(&name) {
            Ok(()) => LaunchOutcome::opened(&name),
            Err(e) => {
                tracing::warn!(app = %name, error = %e, "all launch attempts failed");
                LaunchOutcome::failed(&name)
            }
        }
    }

    /// Open a URL in the default browser
    #[must_use]
    pub fn open_url(&self, url: &str, label: &str) -> LaunchOutcome {
        let target = normalize_url(url);
        tracing::info!(url = %target, "opening url");

        match spawn_opener(&target) {
            Ok(()) => LaunchOutcome::opened(label),
            Err(e) => {
                tracing::warn!(url = %target, error = %e, "failed to open url");
                LaunchOutcome::failed(label)
            }
        }
    }
}

/// Prefix a scheme when the target isn't already an http(s) URL
fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => raw.to_string(),
        _ => format!("https://{raw}"),
    }
}

/// Look up the canonical command for a known app name
fn resolve_command(name: &str) -> Option<&'static str> {
    APP_COMMANDS
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, command)| *command)
}

/// Start an app via the OS launch convention
#[cfg(target_os = "macos")]
fn spawn_app(command: &str) -> std::io::Result<()> {
    Command::new("open")
        .arg("-a")
        .arg(command)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
}

#[cfg(target_os = "windows")]
fn spawn_app(command: &str) -> std::io::Result<()> {
    Command::new("cmd")
        .args(["/C", "start", "", command])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn spawn_app(command: &str) -> std::io::Result<()> {
    spawn_binary(command)
}

/// Start a binary directly
fn spawn_binary(command: &str) -> std::io::Result<()> {
    Command::new(command)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
}

/// Open a URL with the platform opener
fn spawn_opener(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(url);
        c
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    };

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
}
