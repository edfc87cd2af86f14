//! Voice command parsing
//!
//! Classifies recognized text into a structured action with ordered
//! pattern tables. Order is a deliberate tie-break: multi-word aliases
//! are listed before the single-word aliases they contain, so "visual
//! studio code" resolves before "code" can shadow it.

use std::sync::LazyLock;

use regex::Regex;

/// A recognized command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// Open a website
    Website {
        /// Canonical URL to open
        url: String,
        /// Display label for the response message
        label: String,
    },
    /// Launch an application
    App {
        /// Canonical app name for the launcher
        name: String,
    },
    /// No command recognized
    Unrecognized {
        /// Normalized input text
        text: String,
    },
}

/// Website table entry
struct SiteRule {
    pattern: Regex,
    url: &'static str,
    label: &'static str,
}

/// App table entry
struct AppRule {
    pattern: Regex,
    name: &'static str,
}

static SITE_RULES: LazyLock<Vec<SiteRule>> = LazyLock::new(|| {
    [
        (r"(open|go to|visit)\s*(youtube|you\s*tube)", "https://youtube.com", "youtube"),
        (r"(open|go to|visit)\s*google", "https://google.com", "google"),
        (r"(open|go to|visit)\s*(facebook|fb)", "https://facebook.com", "facebook"),
        (r"(open|go to|visit)\s*twitter", "https://twitter.com", "twitter"),
        (r"(open|go to|visit)\s*instagram", "https://instagram.com", "instagram"),
        (r"(open|go to|visit)\s*github", "https://github.com", "github"),
        (r"(open|go to|visit)\s*stackoverflow", "https://stackoverflow.com", "stackoverflow"),
    ]
    .into_iter()
    .map(|(pattern, url, label)| SiteRule {
        pattern: Regex::new(pattern).expect("valid regex"),
        url,
        label,
    })
    .collect()
});

static APP_RULES: LazyLock<Vec<AppRule>> = LazyLock::new(|| {
    [
        (r"(open|start|launch)\s+(notepad|text\s*editor)", "notepad"),
        (r"(open|start|launch)\s+(calculator|calc)", "calculator"),
        (r"(open|start|launch)\s+(chrome|google\s*chrome)", "chrome"),
        (r"(open|start|launch)\s+(brave|brave\s*browser)", "brave"),
        (r"(open|start|launch)\s+(edge|microsoft\s*edge)", "edge"),
        (r"(open|start|launch)\s+(firefox|mozilla)", "firefox"),
        (r"(open|start|launch)\s+(vs\s*code|visual\s*studio\s*code|code)", "vs code"),
        (r"(open|start|launch)\s+(word|microsoft\s*word)", "word"),
        (r"(open|start|launch)\s+(excel|microsoft\s*excel)", "excel"),
        (r"(open|start|launch)\s+(powerpoint|microsoft\s*powerpoint|power\s*point)", "powerpoint"),
        (r"(open|start|launch)\s+(explorer|file\s*explorer|files?)", "explorer"),
        (r"(open|start|launch)\s+(paint|ms\s*paint)", "paint"),
        (r"(open|start|launch)\s+(browser|web\s*browser)", "edge"),
    ]
    .into_iter()
    .map(|(pattern, name)| AppRule {
        pattern: Regex::new(pattern).expect("valid regex"),
        name,
    })
    .collect()
});

/// Action verb followed by a free-text target
static VERB_REMAINDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(open|start|launch)\s+(.+)").expect("valid regex"));

/// Trailing filler words spoken after an app name
static FILLER_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(app|application|program)$").expect("valid regex"));

/// Classify recognized text into a structured action
///
/// Stateless and deterministic. Tables are evaluated in fixed priority
/// order, first match wins; an unmatched action verb still yields a
/// best-effort app guess rather than outright failure.
#[must_use]
pub fn parse(text: &str) -> ParsedCommand {
    let text = text.trim().to_lowercase();

    for rule in SITE_RULES.iter() {
        if rule.pattern.is_match(&text) {
            return ParsedCommand::Website {
                url: rule.url.to_string(),
                label: rule.label.to_string(),
            };
        }
    }

    for rule in APP_RULES.iter() {
        if rule.pattern.is_match(&text) {
            return ParsedCommand::App {
                name: rule.name.to_string(),
            };
        }
    }

    if let Some(caps) = VERB_REMAINDER.captures(&text) {
        let remainder = caps[2].trim();
        let name = FILLER_SUFFIX.replace(remainder, "").into_owned();

        // A dotted, space-free target is a direct URL, not an app
        if name.contains('.') && !name.contains(char::is_whitespace) {
            let url = if name.starts_with("http://") || name.starts_with("https://") {
                name.clone()
            } else {
                format!("https://{name}")
            };
            return ParsedCommand::Website { url, label: name };
        }

        return ParsedCommand::App { name };
    }

    ParsedCommand::Unrecognized { text }
}
