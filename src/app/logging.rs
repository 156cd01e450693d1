use crate::config::AppConfig;
use std::{
    env, fs,
    io::Write,
    panic,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, OnceLock,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: OnceLock<Mutex<Option<LogWriter>>> = OnceLock::new();

/// Path to the debug log; rotated in place once it grows past the cap.
pub fn log_file_path() -> PathBuf {
    env::var("SWITCHBOARD_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("switchboard.log"))
}

fn crash_log_path() -> PathBuf {
    env::temp_dir().join("switchboard_crash.log")
}

/// Append-only file that starts over once `max_bytes` would be exceeded.
struct LogWriter {
    path: PathBuf,
    file: fs::File,
    max_bytes: u64,
    written: u64,
}

impl LogWriter {
    fn open(path: PathBuf, max_bytes: u64) -> Option<Self> {
        let existing = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let file = open_log(&path, existing > max_bytes)?;
        let written = if existing > max_bytes { 0 } else { existing };
        Some(Self {
            path,
            file,
            max_bytes,
            written,
        })
    }

    fn append(&mut self, line: &str) {
        let len = line.len() as u64;
        if self.written.saturating_add(len) > self.max_bytes {
            if let Some(file) = open_log(&self.path, true) {
                self.file = file;
                self.written = 0;
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.written = self.written.saturating_add(len);
        }
    }
}

fn open_log(path: &Path, truncate: bool) -> Option<fs::File> {
    fs::OpenOptions::new()
        .create(true)
        .write(true)
        .append(!truncate)
        .truncate(truncate)
        .open(path)
        .ok()
}

// Not `lock_or_recover`: that helper logs through here.
fn debug_log() -> MutexGuard<'static, Option<LogWriter>> {
    DEBUG_LOG
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

fn configure(enabled: bool, content_enabled: bool) {
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    LOG_CONTENT_ENABLED.store(enabled && content_enabled, Ordering::Relaxed);
    *debug_log() = if enabled {
        LogWriter::open(log_file_path(), LOG_MAX_BYTES)
    } else {
        None
    };
}

/// Configure logging based on CLI flags or environment.
pub fn init_logging(config: &AppConfig) {
    configure(config.logs && !config.no_logs, config.log_content);
}

/// Write debug messages to a file so the console surface stays readable.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let line = format!("[{}] {msg}\n", since_epoch().as_millis());
    if let Some(writer) = debug_log().as_mut() {
        writer.append(&line);
    }
}

/// Write logs that quote script content (caption or greeting text).
pub fn log_debug_content(msg: &str) {
    if LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        log_debug(msg);
    }
}

fn panic_payload(info: &panic::PanicHookInfo<'_>) -> String {
    if !LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        return "payload omitted (log-content disabled)".to_string();
    }
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string payload".to_string())
}

/// Record where the exhibit panicked. The crash log starts over past its cap.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let line = format!(
        "[{}] switchboard v{} panic at {location}: {}\n",
        since_epoch().as_secs(),
        env!("CARGO_PKG_VERSION"),
        panic_payload(info)
    );
    if let Some(mut writer) = LogWriter::open(crash_log_path(), CRASH_LOG_MAX_BYTES) {
        writer.append(&line);
    }
}
