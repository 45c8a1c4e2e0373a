//! Subscriber setup from the `logging` config section.
//!
//! Every key except `default` names a crate; its events go to the console at
//! `console_level` and, when `file` is set, to that file at `file_level`.
//! The `default` section covers all remaining targets. Files are JSON lines
//! rotated by size.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use file_rotate::{
    compression::Compression,
    suffix::AppendCount,
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::filter::{FilterFn, Targets};
use tracing_subscriber::fmt::{self, time::UtcTime, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::config::{LoggingConfig, Section};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// `None` means the output is switched off. Unknown names fall back to info.
fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// `target` is `krate` itself or one of its modules.
fn owns_target(krate: &str, target: &str) -> bool {
    target
        .strip_prefix(krate)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

// --- file output ---

/// Size-rotated log file shared by every writer handle.
#[derive(Clone)]
struct RollingFile(Arc<Mutex<FileRotate<AppendCount>>>);

impl RollingFile {
    fn open(path: &Path, section: &Section) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
        let backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

        let rot = FileRotate::new(
            path,
            AppendCount::new(backups),
            ContentLimit::BytesSurpassed(max_bytes as usize),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rot))))
    }
}

/// Writer for one event: a file, or nowhere.
enum Sink {
    File(RollingFile),
    Discard,
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Sink::File(f) => f.0.lock().write(buf),
            Sink::Discard => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Sink::File(f) => f.0.lock().flush(),
            Sink::Discard => Ok(()),
        }
    }
}

/// Picks the file for an event by its target.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RollingFile>,
    named: Vec<(String, RollingFile)>,
}

impl FileRouter {
    fn open(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut router = FileRouter::default();
        for (name, section) in cfg {
            if section.file.trim().is_empty() {
                continue;
            }
            let path = resolve_log_path(&section.file, base_dir);
            match RollingFile::open(&path, section) {
                Ok(file) if name == DEFAULT_SECTION => router.default = Some(file),
                Ok(file) => router.named.push((name.clone(), file)),
                // No subscriber is installed yet.
                Err(e) => eprintln!("Failed to open log file {} for '{name}': {e}", path.display()),
            }
        }
        router
    }

    fn route(&self, target: &str) -> Sink {
        self.named
            .iter()
            .find(|(krate, _)| owns_target(krate, target))
            .map(|(_, file)| file)
            .or(self.default.as_ref())
            .map_or(Sink::Discard, |file| Sink::File(file.clone()))
    }
}

impl<'a> MakeWriter<'a> for FileRouter {
    type Writer = Sink;

    fn make_writer(&'a self) -> Self::Writer {
        self.default
            .as_ref()
            .map_or(Sink::Discard, |file| Sink::File(file.clone()))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.route(meta.target())
    }
}

// --- filters ---

fn named_sections(cfg: &LoggingConfig) -> impl Iterator<Item = (&String, &Section)> {
    cfg.iter().filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
}

/// Targets for named crates, at the level `pick` selects from their section.
fn named_targets(cfg: &LoggingConfig, pick: impl Fn(&Section) -> Option<Level>) -> Targets {
    named_sections(cfg).fold(
        Targets::new().with_default(LevelFilter::OFF),
        |targets, (name, section)| match pick(section) {
            Some(level) => targets.with_target(name.clone(), level),
            None => targets,
        },
    )
}

/// Everything not owned by a named crate, up to `max_level`.
fn unclaimed_targets(
    cfg: &LoggingConfig,
    max_level: Level,
) -> FilterFn<impl Fn(&Metadata<'_>) -> bool + Send + Sync + 'static> {
    let named: Vec<String> = named_sections(cfg).map(|(name, _)| name.clone()).collect();
    FilterFn::new(move |meta: &Metadata<'_>| {
        meta.level() <= &max_level && !named.iter().any(|krate| owns_target(krate, meta.target()))
    })
}

// --- layers ---

fn console_layer<S>(ansi: bool) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339())
}

fn json_file_layer<S>(router: FileRouter) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(router)
}

fn build_layers(cfg: &LoggingConfig, base_dir: &Path, ansi: bool) -> Vec<BoxedLayer> {
    let router = FileRouter::open(cfg, base_dir);
    let mut layers: Vec<BoxedLayer> = vec![console_layer(ansi)
        .with_filter(named_targets(cfg, |s| parse_level(&s.console_level)))
        .boxed()];

    if !router.named.is_empty() {
        let file_level = |s: &Section| {
            if s.file.trim().is_empty() {
                None
            } else {
                parse_level(&s.file_level)
            }
        };
        layers.push(
            json_file_layer(router.clone())
                .with_filter(named_targets(cfg, file_level))
                .boxed(),
        );
    }

    if let Some(default) = cfg.get(DEFAULT_SECTION) {
        if let Some(level) = parse_level(&default.console_level) {
            layers.push(
                console_layer(ansi)
                    .with_filter(unclaimed_targets(cfg, level))
                    .boxed(),
            );
        }
        if router.default.is_some() {
            if let Some(level) = parse_level(&default.file_level) {
                layers.push(
                    json_file_layer(router)
                        .with_filter(unclaimed_targets(cfg, level))
                        .boxed(),
                );
            }
        }
    }

    layers
}

/// Install the global subscriber. Relative log files are resolved against
/// `base_dir` (normally `server.home_dir`). A second call is a no-op.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` records before the subscriber goes in.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let ansi = atty::is(atty::Stream::Stdout);
    let _ = Registry::default()
        .with(build_layers(cfg, base_dir, ansi))
        .try_init();
}

fn init_default_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .try_init();
}
