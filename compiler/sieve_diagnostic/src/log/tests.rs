use super::*;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::io;
use std::sync::Arc;

#[test]
fn test_level_parsing() {
    assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    assert_eq!("fatal".parse::<LogLevel>().unwrap(), LogLevel::Fatal);
    assert_eq!(
        "verbose".parse::<LogLevel>(),
        Err(UnknownLevel("verbose".to_string()))
    );
}

#[test]
fn test_level_ordering_follows_severity() {
    assert!(LogLevel::Fatal < LogLevel::Error);
    assert!(LogLevel::Info < LogLevel::Debug);
}

#[test]
fn test_fatal_filters_as_error() {
    assert_eq!(LogLevel::Fatal.filter_directive(), "error");
    assert_eq!(LogLevel::Debug.filter_directive(), "debug");
}

#[test]
fn test_emit_without_subscriber_is_silent() {
    // No subscriber installed: events are dropped, never panic.
    emit(LogLevel::Error, GRAMMAR_SECTION, "parse error at byte 0");
    emit(LogLevel::Fatal, "core", "fatal condition");
}

#[test]
fn test_directive_parsing() {
    assert_eq!(
        "debug".parse::<LevelDirective>().unwrap(),
        LevelDirective {
            section: None,
            level: LogLevel::Debug,
        }
    );
    assert_eq!(
        "grammar:info".parse::<LevelDirective>().unwrap(),
        LevelDirective {
            section: Some(GRAMMAR_SECTION.to_string()),
            level: LogLevel::Info,
        }
    );
    assert!(":debug".parse::<LevelDirective>().is_err());
    assert!("grammar:loud".parse::<LevelDirective>().is_err());
}

#[test]
fn test_directive_list() {
    let directives = parse_directives("warn, grammar:debug,,packet:error").unwrap();
    assert_eq!(directives.len(), 3);
    assert_eq!(directives[0].section, None);
    assert_eq!(directives[1].level, LogLevel::Debug);
    assert_eq!(directives[2].section.as_deref(), Some("packet"));
    assert!(parse_directives("warn,verbose").is_err());
}

#[test]
fn test_default_threshold_applies_to_unset_sections() {
    set_level(None, LogLevel::Warning);
    assert_eq!(level("unset-section"), LogLevel::Warning);

    set_level(Some("tuned-section"), LogLevel::Debug);
    assert_eq!(level("tuned-section"), LogLevel::Debug);
    assert_eq!(level("unset-section"), LogLevel::Warning);

    clear_level("tuned-section");
    assert_eq!(level("tuned-section"), LogLevel::Warning);
    set_level(None, LogLevel::Debug);
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn captured_lines(f: impl FnOnce()) -> Vec<String> {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let output = String::from_utf8_lossy(&captured.0.lock()).into_owned();
    output.lines().map(str::to_string).collect()
}

#[test]
fn test_emit_honors_section_threshold() {
    set_level(Some("loud-section"), LogLevel::Debug);
    set_level(Some("quiet-section"), LogLevel::Warning);

    let lines = captured_lines(|| {
        assert!(enabled(LogLevel::Debug, "loud-section"));
        assert!(!enabled(LogLevel::Debug, "quiet-section"));
        emit(LogLevel::Debug, "loud-section", "node table built");
        emit(LogLevel::Debug, "quiet-section", "packet received");
        emit(LogLevel::Warning, "quiet-section", "packet truncated");
    });

    assert_eq!(lines.len(), 2, "{lines:#?}");
    assert!(lines[0].contains("DEBUG") && lines[0].contains("node table built"));
    assert!(lines[0].contains("loud-section"));
    assert!(lines[1].contains("WARN") && lines[1].contains("packet truncated"));
}
