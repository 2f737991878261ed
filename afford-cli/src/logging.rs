//! Logging for the `afford` binary.
//!
//! Records go to stderr so stdout stays clean for reports and JSON. A log
//! file can be attached after startup, once the settings file has been read,
//! and the level can be changed the same way.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, reload};

// --- Formatter ---

/// `<time> <level> <target>: <fields>`.
///
/// The terminal gets a short wall-clock time; the log file gets the full
/// local timestamp with offset so runs can be told apart.
struct RecordFormat {
    full_timestamp: bool,
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[36m",
        Level::TRACE => "\x1b[90m",
    }
}

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let now = Local::now();
        let stamp = if self.full_timestamp {
            now.format("%Y-%m-%d %H:%M:%S%.3f %:z")
        } else {
            now.format("%H:%M:%S%.3f")
        };
        let level = meta.level().as_str().to_ascii_lowercase();

        if writer.has_ansi_escapes() {
            write!(
                writer,
                "\x1b[2m{stamp}\x1b[0m {}{level:<5}\x1b[0m \x1b[2m{}:\x1b[0m ",
                level_color(*meta.level()),
                meta.target()
            )?;
        } else {
            write!(writer, "{stamp} {level:<5} {}: ", meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// --- Log file attached after startup ---

type SharedFile = Arc<Mutex<Option<File>>>;

/// Writes to the attached file, or nowhere until one is attached.
#[derive(Clone)]
struct DeferredFile(SharedFile);

struct DeferredFileGuard<'a>(MutexGuard<'a, Option<File>>);

impl Write for DeferredFileGuard<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), File::flush)
    }
}

impl<'a> MakeWriter<'a> for DeferredFile {
    type Writer = DeferredFileGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        DeferredFileGuard(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

// --- Process-wide handles ---

type Reloader = Box<dyn Fn(EnvFilter) -> Result<()> + Send + Sync>;

static RELOAD_FILTER: OnceLock<Reloader> = OnceLock::new();
static LOG_FILE: OnceLock<SharedFile> = OnceLock::new();

/// Parses a bare level ("warn", "debug") or any `EnvFilter` directive.
pub fn parse_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level.trim()).map_err(|e| anyhow!("invalid log level '{level}': {e}"))
}

/// `RUST_LOG` when set, otherwise `default_level`, otherwise `warn`.
fn initial_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| parse_filter(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

// --- Public API ---

/// Replaces the active filter.
pub fn set_log_level(level: &str) -> Result<()> {
    let Some(reload) = RELOAD_FILTER.get() else {
        bail!("logging not yet initialized");
    };
    reload(parse_filter(level)?)
}

/// Appends log records to `path` from now on, replacing any earlier file.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let Some(slot) = LOG_FILE.get() else {
        bail!("logging not yet initialized");
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;

    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    tracing::debug!(path = %path.display(), "log file attached");
    Ok(())
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(default_level: &str) {
    let file: SharedFile = Arc::new(Mutex::new(None));
    let (filter, handle) = reload::Layer::new(initial_filter(default_level));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(RecordFormat {
                    full_timestamp: false,
                })
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(RecordFormat {
                    full_timestamp: true,
                })
                .with_ansi(false)
                .with_writer(DeferredFile(file.clone())),
        )
        .try_init()
        .is_ok();

    if installed {
        let _ = LOG_FILE.set(file);
        let _ = RELOAD_FILTER.set(Box::new(move |filter| {
            handle
                .reload(filter)
                .map_err(|e| anyhow!("filter reload failed: {e}"))
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_filter_accepts_levels_and_directives() {
        assert!(parse_filter("debug").is_ok());
        assert!(parse_filter(" WARN ").is_ok());
        assert!(parse_filter("afford_core=debug,warn").is_ok());
    }

    #[test]
    fn parse_filter_rejects_garbage() {
        let err = parse_filter("afford_core=loud").unwrap_err();

        assert!(err.to_string().contains("invalid log level"), "{err}");
    }

    #[test]
    fn deferred_file_discards_until_attached() {
        let target = DeferredFile(Arc::new(Mutex::new(None)));

        let mut writer = target.make_writer();

        assert_eq!(writer.write(b"dropped").unwrap(), 7);
        assert!(writer.flush().is_ok());
    }
}
