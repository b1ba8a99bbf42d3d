use std::collections::HashMap;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

use chrono::Local;
use flate2::{write::GzEncoder, Compression};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rotate once the live file reaches this size
const MAX_LOG_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_ARCHIVES: usize = 5;
/// Size is only checked every N appends
const SIZE_CHECK_EVERY: u32 = 200;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,                             // ISO-8601 with timezone
    pub level: String,                                 // DEBUG, ERROR, PERF, PROBE, RUN
    pub component: String,
    pub event: String,
    pub message: String,
    pub correlation_id: Option<String>,                // run id, or the session id
    pub fields: HashMap<String, serde_json::Value>,
}

/// Append-only JSON-lines file with gzip archives next to it
struct LogFile {
    path: PathBuf,
    max_bytes: u64,
    appends: AtomicU32,
}

impl LogFile {
    fn open(path: PathBuf, max_bytes: u64) -> Self {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        Self {
            path,
            max_bytes,
            appends: AtomicU32::new(0),
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if self.appends.fetch_add(1, Ordering::Relaxed) % SIZE_CHECK_EVERY == 0
            && self.oversized()
        {
            // A failed rotation keeps appending to the live file
            let _ = self.rotate_locked();
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)
    }

    fn oversized(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|m| m.len() >= self.max_bytes)
            .unwrap_or(false)
    }

    /// Rotate under an advisory lock; gives up if another process holds it
    fn rotate_locked(&self) -> std::io::Result<()> {
        let lock_path = self.path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        if lock.try_lock_exclusive().is_err() {
            return Ok(());
        }

        let rotated = if self.oversized() { self.rotate() } else { Ok(()) };
        let _ = std::fs::remove_file(&lock_path);
        rotated
    }

    fn rotate(&self) -> std::io::Result<()> {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reachscan-debug".to_string());
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let archive = dir.join(format!(
            "{}.{}.gz",
            stem,
            Local::now().format("%Y%m%d_%H%M%S%3f")
        ));

        // Move aside first so concurrent appends start a fresh file
        let staged = self.path.with_extension("rotating");
        std::fs::rename(&self.path, &staged)?;
        gzip_into(&staged, &archive)?;
        std::fs::remove_file(&staged)?;

        prune_archives(dir, &format!("{}.", stem), KEEP_ARCHIVES)
    }
}

fn gzip_into(source: &Path, target: &Path) -> std::io::Result<()> {
    let mut encoder = GzEncoder::new(File::create(target)?, Compression::default());
    std::io::copy(&mut BufReader::new(File::open(source)?), &mut encoder)?;
    encoder.finish()?;
    Ok(())
}

/// Delete all but the `keep` newest `<prefix>*.gz` files in `dir`
fn prune_archives(dir: &Path, prefix: &str, keep: usize) -> std::io::Result<()> {
    let mut archives: Vec<(SystemTime, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.starts_with(prefix) && name.ends_with(".gz")
        })
        .filter_map(|entry| {
            let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, entry.path()))
        })
        .collect();

    archives.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in archives.into_iter().skip(keep) {
        let _ = std::fs::remove_file(path);
    }
    Ok(())
}

/// JSON-lines debug logger, gated by `REACHSCAN_DEBUG`
pub struct EnhancedDebugLogger {
    enabled: bool,
    log_file: Option<Mutex<LogFile>>,
    session_id: String,
}

impl EnhancedDebugLogger {
    pub fn new() -> Self {
        let enabled = parse_debug_enabled();
        let log_path = if enabled { Some(Self::get_log_path()) } else { None };
        Self::build(log_path)
    }

    /// Logger that always writes to `log_path`
    pub fn with_path(log_path: PathBuf) -> Self {
        Self::build(Some(log_path))
    }

    /// Like [`with_path`](Self::with_path) with a custom rotation size
    pub fn with_rotation(log_path: PathBuf, max_bytes: u64) -> Self {
        let mut logger = Self::build(None);
        logger.log_file = Some(Mutex::new(LogFile::open(log_path, max_bytes)));
        logger.enabled = true;
        logger
    }

    fn build(log_path: Option<PathBuf>) -> Self {
        let session_id = Uuid::new_v4().to_string()[..8].to_string();
        let log_file = log_path.map(|p| Mutex::new(LogFile::open(p, MAX_LOG_BYTES)));

        Self {
            enabled: log_file.is_some(),
            log_file,
            session_id,
        }
    }

    fn get_log_path() -> PathBuf {
        if let Ok(path) = env::var("REACHSCAN_LOG_PATH") {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        let mut log_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        log_path.push(".reachscan");
        log_path.push("reachscan-debug.log");
        log_path
    }

    fn log_sync(
        &self,
        level: &str,
        component: &str,
        event: &str,
        message: &str,
        correlation_id: Option<String>,
        fields: HashMap<String, serde_json::Value>,
    ) {
        if !self.enabled {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            level: level.to_string(),
            component: component.to_string(),
            event: event.to_string(),
            message: message.to_string(),
            correlation_id: correlation_id.or_else(|| Some(self.session_id.clone())),
            fields,
        };

        let Some(file) = &self.log_file else {
            return;
        };
        if let (Ok(file), Ok(line)) = (file.lock(), serde_json::to_string(&entry)) {
            let _ = file.append(&line);
        }
    }

    pub fn debug_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("DEBUG", component, event, message, None, HashMap::new());
    }

    pub fn error_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("ERROR", component, event, message, None, HashMap::new());
    }

    pub fn performance_sync(&self, component: &str, operation: &str, duration_ms: u64) {
        let mut fields = HashMap::new();
        fields.insert("duration_ms".to_string(), duration_ms.into());

        self.log_sync("PERF", component, "operation_complete", operation, None, fields);
    }

    // Typed methods for probing events

    pub fn probe_attempt(&self, domain: &str, kind: &str, status: &str, latency_ms: Option<u64>) {
        let mut fields = HashMap::new();
        fields.insert("domain".to_string(), domain.into());
        fields.insert("probe".to_string(), kind.into());
        fields.insert("status".to_string(), status.into());
        if let Some(latency) = latency_ms {
            fields.insert("latency_ms".to_string(), latency.into());
        }

        self.log_sync(
            "PROBE",
            "ProbeStrategy",
            "attempt_settled",
            &format!("{} {} -> {}", domain, kind, status),
            None,
            fields,
        );
    }

    pub fn domain_settled(&self, run_id: &str, domain: &str, status: &str, probe_used: Option<&str>) {
        let mut fields = HashMap::new();
        fields.insert("domain".to_string(), domain.into());
        fields.insert("status".to_string(), status.into());
        if let Some(probe) = probe_used {
            fields.insert("probe_used".to_string(), probe.into());
        }

        self.log_sync(
            "PROBE",
            "Scheduler",
            "domain_settled",
            &format!("{}: {}", domain, status),
            Some(run_id.to_string()),
            fields,
        );
    }

    pub fn run_start(&self, run_id: &str, total: usize, concurrency: usize, timeout_ms: u64) {
        let mut fields = HashMap::new();
        fields.insert("total".to_string(), total.into());
        fields.insert("concurrency".to_string(), concurrency.into());
        fields.insert("timeout_ms".to_string(), timeout_ms.into());

        self.log_sync(
            "RUN",
            "Scheduler",
            "run_start",
            &format!("Starting run over {} domains (K={})", total, concurrency),
            Some(run_id.to_string()),
            fields,
        );
    }

    pub fn run_end(&self, run_id: &str, done: usize, total: usize, cancelled: bool, duration_ms: u64) {
        let mut fields = HashMap::new();
        fields.insert("done".to_string(), done.into());
        fields.insert("total".to_string(), total.into());
        fields.insert("cancelled".to_string(), cancelled.into());
        fields.insert("duration_ms".to_string(), duration_ms.into());

        self.log_sync(
            "RUN",
            "Scheduler",
            "run_end",
            &format!("Run finished: {}/{} ({}ms{})", done, total, duration_ms, if cancelled { ", cancelled" } else { "" }),
            Some(run_id.to_string()),
            fields,
        );
    }

    pub fn list_source(&self, source: &str, count: usize, used_fallback: bool) {
        let mut fields = HashMap::new();
        fields.insert("source".to_string(), source.into());
        fields.insert("count".to_string(), count.into());
        fields.insert("used_fallback".to_string(), used_fallback.into());

        self.log_sync(
            "DEBUG",
            "ListLoader",
            "list_loaded",
            &format!("{} domains from {}", count, source),
            None,
            fields,
        );
    }

    pub fn diagnostics_summary(&self, health_status: &str, ok_ratio: f64) {
        let mut fields = HashMap::new();
        fields.insert("health_status".to_string(), health_status.into());
        fields.insert("ok_ratio".to_string(), ok_ratio.into());

        self.log_sync(
            "RUN",
            "Diagnostics",
            "verdict",
            &format!("Health: {} (ok ratio {:.2})", health_status, ok_ratio),
            None,
            fields,
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_session_id(&self) -> &str {
        &self.session_id
    }
}

impl Default for EnhancedDebugLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `REACHSCAN_DEBUG`: true/false, 1/0, yes/no, on/off (case insensitive)
pub fn parse_debug_enabled() -> bool {
    env::var("REACHSCAN_DEBUG")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        .unwrap_or(false)
}

static DEBUG_LOGGER: OnceLock<EnhancedDebugLogger> = OnceLock::new();

/// Process-wide logger, configured from the environment on first use
pub fn get_debug_logger() -> &'static EnhancedDebugLogger {
    DEBUG_LOGGER.get_or_init(EnhancedDebugLogger::new)
}
