//! Leveled logging sink.
//!
//! Messages carry one of five levels and the name of the section (module)
//! that emitted them. Every section has a level threshold: the default one,
//! or its own when set with [`set_level`]. Messages above the threshold are
//! dropped before they reach `tracing`; the rest are emitted with the section
//! recorded as a structured field.
//!
//! Enable output with [`init_logging`] (or `RUST_LOG=...` and
//! [`init_tracing`]).

use std::fmt;
use std::str::FromStr;
use std::sync::{Once, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Section used by grammar diagnostics.
pub const GRAMMAR_SECTION: &str = "grammar";

/// Severity of a log message.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Fatal,
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Equivalent `EnvFilter` directive level.
    pub const fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Fatal | LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized log level name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownLevel(pub String);

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown log level '{}' (expected fatal, error, warn, info or debug, optionally prefixed by 'section:')",
            self.0
        )
    }
}

impl std::error::Error for UnknownLevel {}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// One `--loglevel` item: `level` for every section, or `section:level`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LevelDirective {
    pub section: Option<String>,
    pub level: LogLevel,
}

impl FromStr for LevelDirective {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((section, level)) if !section.is_empty() => Ok(LevelDirective {
                section: Some(section.to_string()),
                level: level.parse()?,
            }),
            Some(_) => Err(UnknownLevel(s.to_string())),
            None => Ok(LevelDirective {
                section: None,
                level: s.parse()?,
            }),
        }
    }
}

/// Parse a comma-separated directive list such as `warn,grammar:debug`.
pub fn parse_directives(s: &str) -> Result<Vec<LevelDirective>, UnknownLevel> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::parse)
        .collect()
}

struct SectionLevels {
    default: LogLevel,
    sections: FxHashMap<String, LogLevel>,
}

fn levels() -> &'static RwLock<SectionLevels> {
    static LEVELS: OnceLock<RwLock<SectionLevels>> = OnceLock::new();
    // Until configured, every message is forwarded and the subscriber filters.
    LEVELS.get_or_init(|| {
        RwLock::new(SectionLevels {
            default: LogLevel::Debug,
            sections: FxHashMap::default(),
        })
    })
}

/// Set the threshold of `section`, or the default threshold with `None`.
pub fn set_level(section: Option<&str>, level: LogLevel) {
    let mut levels = levels().write();
    match section {
        Some(section) => {
            levels.sections.insert(section.to_string(), level);
        }
        None => levels.default = level,
    }
}

/// Drop the threshold of `section`; it follows the default again.
pub fn clear_level(section: &str) {
    levels().write().sections.remove(section);
}

/// Threshold in effect for `section`.
pub fn level(section: &str) -> LogLevel {
    let levels = levels().read();
    levels.sections.get(section).copied().unwrap_or(levels.default)
}

/// Whether a message at `level` from `section` would be written.
///
/// Lets callers skip building expensive messages.
pub fn enabled(level: LogLevel, section: &str) -> bool {
    if level > self::level(section) {
        return false;
    }
    match level {
        LogLevel::Fatal | LogLevel::Error => tracing::enabled!(tracing::Level::ERROR),
        LogLevel::Warning => tracing::enabled!(tracing::Level::WARN),
        LogLevel::Info => tracing::enabled!(tracing::Level::INFO),
        LogLevel::Debug => tracing::enabled!(tracing::Level::DEBUG),
    }
}

/// Emit `message` at `level` on behalf of `section`.
pub fn emit(level: LogLevel, section: &str, message: &str) {
    if level > self::level(section) {
        return;
    }
    match level {
        LogLevel::Fatal => tracing::error!(section, fatal = true, "{message}"),
        LogLevel::Error => tracing::error!(section, "{message}"),
        LogLevel::Warning => tracing::warn!(section, "{message}"),
        LogLevel::Info => tracing::info!(section, "{message}"),
        LogLevel::Debug => tracing::debug!(section, "{message}"),
    }
}

static TRACING_INIT: Once = Once::new();

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence and leaves every section threshold open.
/// Otherwise `default_level` becomes the default section threshold and the
/// level of every other target. Safe to call multiple times.
pub fn init_tracing(default_level: LogLevel) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            set_level(None, default_level);
            // Sections are filtered by the sink itself.
            EnvFilter::new(format!(
                "{},{}=debug",
                default_level.filter_directive(),
                module_path!()
            ))
        });
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

/// Initialize logging from `--loglevel` directives.
///
/// The last directive without a section sets the default (warning when there
/// is none); the others set their section's threshold.
pub fn init_logging(directives: &[LevelDirective]) {
    let default = directives
        .iter()
        .rev()
        .find(|directive| directive.section.is_none())
        .map_or(LogLevel::Warning, |directive| directive.level);
    init_tracing(default);
    for directive in directives {
        if let Some(section) = &directive.section {
            set_level(Some(section), directive.level);
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
