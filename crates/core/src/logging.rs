//! Category/level logging for the CPU cores.
//!
//! Everything is off until a host raises a level, either directly through
//! [`LogConfig::global`] or from a config file (see
//! [`crate::config::LogSettings`]). Messages are built lazily, so a disabled
//! category costs one atomic load per call site.
//!
//! A category with its own level ignores the global level. Output goes to
//! stderr, or to a file written by a background thread so a trace of every
//! instruction doesn't stall the step loop. Each category is rate limited
//! over a one second sliding window.
//!
//! ```rust
//! use retro_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Interrupts, LogLevel::Debug, || {
//!     format!("CPU: NMI at PC={:04X}", 0x8000)
//! });
//! ```

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

const DEFAULT_RATE_LIMIT: usize = 60;
const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLogLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    /// Case-insensitive; numeric levels 0-5 are accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.to_ascii_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "err" | "1" => LogLevel::Error,
            "warn" | "warning" | "2" => LogLevel::Warn,
            "info" | "3" => LogLevel::Info,
            "debug" | "4" => LogLevel::Debug,
            "trace" | "5" => LogLevel::Trace,
            _ => return Err(ParseLogLevelError(s.to_string())),
        };
        Ok(level)
    }
}

impl From<u8> for LogLevel {
    fn from(raw: u8) -> Self {
        match raw {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

const CATEGORY_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Resets, instruction trace, JMP-to-self loops
    Cpu,
    /// NMI, IRQ, BRK and RTI
    Interrupts,
    /// Illegal opcodes and the opcode table self-check
    Decode,
}

impl LogCategory {
    pub const ALL: [LogCategory; CATEGORY_COUNT] =
        [LogCategory::Cpu, LogCategory::Interrupts, LogCategory::Decode];

    fn index(self) -> usize {
        self as usize
    }
}

/// Outcome of asking the rate limiter about one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Admission {
    allowed: bool,
    /// Messages dropped since the last report, when one is due now
    report_dropped: Option<usize>,
}

#[derive(Debug, Default)]
struct Window {
    sent: VecDeque<Instant>,
    dropped: usize,
    last_report: Option<Instant>,
}

/// Sliding-window limiter, one window per category.
struct RateLimiter {
    max_per_window: AtomicUsize,
    windows: Mutex<[Window; CATEGORY_COUNT]>,
}

impl RateLimiter {
    fn new(max_per_window: usize) -> Self {
        Self {
            max_per_window: AtomicUsize::new(max_per_window),
            windows: Mutex::new(Default::default()),
        }
    }

    fn admit(&self, category: LogCategory) -> Admission {
        self.admit_at(category, Instant::now())
    }

    fn admit_at(&self, category: LogCategory, now: Instant) -> Admission {
        let max = self.max_per_window.load(Ordering::Relaxed);
        // A poisoned lock only means stale counters.
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let w = &mut windows[category.index()];

        while w.sent.front().is_some_and(|&t| now.duration_since(t) > WINDOW) {
            w.sent.pop_front();
        }

        if w.sent.len() < max {
            w.sent.push_back(now);
            let report_dropped = (w.dropped > 0).then(|| {
                w.last_report = Some(now);
                std::mem::take(&mut w.dropped)
            });
            return Admission {
                allowed: true,
                report_dropped,
            };
        }

        w.dropped += 1;
        let due = w
            .last_report
            .map_or(true, |last| now.duration_since(last) >= WINDOW);
        let report_dropped = due.then(|| {
            w.last_report = Some(now);
            std::mem::take(&mut w.dropped)
        });
        Admission {
            allowed: false,
            report_dropped,
        }
    }
}

pub struct LogConfig {
    global_level: AtomicU8,
    /// `Off` means "use the global level"
    levels: [AtomicU8; CATEGORY_COUNT],
    /// Present while a file writer thread is running
    file_sender: Mutex<Option<Sender<String>>>,
    rate_limiter: RateLimiter,
}

impl LogConfig {
    pub(crate) fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            levels: std::array::from_fn(|_| AtomicU8::new(LogLevel::Off as u8)),
            file_sender: Mutex::new(None),
            rate_limiter: RateLimiter::new(DEFAULT_RATE_LIMIT),
        }
    }

    /// Process-wide configuration used by [`log`].
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        self.global_level.load(Ordering::Relaxed).into()
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        self.levels[category.index()].load(Ordering::Relaxed).into()
    }

    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        let limit = match self.get_level(category) {
            LogLevel::Off => self.get_global_level(),
            own => own,
        };
        level != LogLevel::Off && level <= limit
    }

    /// Turn every level back off. Output and rate limit are left alone.
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }

    /// Maximum messages per second, per category.
    pub fn set_rate_limit(&self, max_per_second: usize) {
        self.rate_limiter
            .max_per_window
            .store(max_per_second, Ordering::Relaxed);
    }

    pub fn get_rate_limit(&self) -> usize {
        self.rate_limiter.max_per_window.load(Ordering::Relaxed)
    }

    /// Append log output to `path`.
    ///
    /// The file is opened here so errors surface to the caller; writes then
    /// happen on a `log-writer` thread. Replaces any previous log file.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();

        thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                // Ends when the sender is dropped.
                for line in receiver {
                    let _ = writeln!(file, "{}", line);
                    let _ = file.flush();
                }
            })?;

        *self.file_sender.lock().unwrap_or_else(|e| e.into_inner()) = Some(sender);
        Ok(())
    }

    /// Go back to stderr output.
    pub fn clear_log_file(&self) {
        *self.file_sender.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn write_line(&self, line: String) {
        let sender = self.file_sender.lock().unwrap_or_else(|e| e.into_inner());
        match sender.as_ref() {
            Some(tx) => {
                if let Err(unsent) = tx.send(line) {
                    eprintln!("{}", unsent.0);
                }
            }
            None => eprintln!("{}", line),
        }
    }
}

/// Log through the global [`LogConfig`].
///
/// `message` only runs when the category and level are enabled and the
/// category is under its rate limit. Dropped messages are summarized at
/// most once per second.
pub fn log<F>(category: LogCategory, level: LogLevel, message: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let admission = config.rate_limiter.admit(category);
    if let Some(dropped) = admission.report_dropped {
        config.write_line(format!(
            "[{:?}] WARNING: rate limit exceeded, {} message(s) dropped",
            category, dropped
        ));
    }
    if admission.allowed {
        config.write_line(message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_names() {
        let cases = [
            ("off", LogLevel::Off),
            ("0", LogLevel::Off),
            ("ERR", LogLevel::Error),
            ("Warning", LogLevel::Warn),
            ("3", LogLevel::Info),
            ("DEBUG", LogLevel::Debug),
            ("trace", LogLevel::Trace),
        ];
        for (name, level) in cases {
            assert_eq!(name.parse::<LogLevel>(), Ok(level), "{}", name);
        }
        assert_eq!(
            "chatty".parse::<LogLevel>(),
            Err(ParseLogLevelError("chatty".to_string()))
        );
    }

    #[test]
    fn level_serde_names() {
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"warn\"");
        assert!(serde_json::from_str::<LogLevel>("\"loud\"").is_err());
    }

    #[test]
    fn level_from_raw_byte() {
        assert_eq!(LogLevel::from(LogLevel::Trace as u8), LogLevel::Trace);
        assert_eq!(LogLevel::from(200), LogLevel::Off);
    }

    #[test]
    fn global_level_applies_to_unset_categories() {
        let config = LogConfig::new();
        assert!(!config.should_log(LogCategory::Cpu, LogLevel::Error));

        config.set_global_level(LogLevel::Warn);
        assert!(config.should_log(LogCategory::Cpu, LogLevel::Error));
        assert!(config.should_log(LogCategory::Decode, LogLevel::Warn));
        assert!(!config.should_log(LogCategory::Interrupts, LogLevel::Info));
    }

    #[test]
    fn category_level_overrides_global() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Error);
        config.set_level(LogCategory::Interrupts, LogLevel::Debug);

        assert!(config.should_log(LogCategory::Interrupts, LogLevel::Debug));
        assert!(!config.should_log(LogCategory::Interrupts, LogLevel::Trace));
        assert!(!config.should_log(LogCategory::Cpu, LogLevel::Warn));
        assert_eq!(config.get_level(LogCategory::Cpu), LogLevel::Off);
    }

    #[test]
    fn off_is_never_logged() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        assert!(!config.should_log(LogCategory::Cpu, LogLevel::Off));
    }

    #[test]
    fn reset_turns_everything_off() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        config.set_level(LogCategory::Cpu, LogLevel::Debug);
        config.set_rate_limit(5);

        config.reset();

        assert_eq!(config.get_global_level(), LogLevel::Off);
        for category in LogCategory::ALL {
            assert_eq!(config.get_level(category), LogLevel::Off);
        }
        assert_eq!(config.get_rate_limit(), 5);
    }

    #[test]
    fn limiter_blocks_over_limit_per_category() {
        let limiter = RateLimiter::new(3);
        let t0 = Instant::now();

        for _ in 0..3 {
            assert!(limiter.admit_at(LogCategory::Cpu, t0).allowed);
        }
        assert!(!limiter.admit_at(LogCategory::Cpu, t0).allowed);
        assert!(limiter.admit_at(LogCategory::Decode, t0).allowed);
    }

    #[test]
    fn limiter_window_slides_and_reports_drops() {
        let limiter = RateLimiter::new(2);
        let t0 = Instant::now();

        limiter.admit_at(LogCategory::Interrupts, t0);
        limiter.admit_at(LogCategory::Interrupts, t0);
        // First drop reports immediately, the rest wait for the next report.
        let first = limiter.admit_at(LogCategory::Interrupts, t0);
        assert_eq!(
            first,
            Admission {
                allowed: false,
                report_dropped: Some(1)
            }
        );
        for _ in 0..4 {
            let a = limiter.admit_at(LogCategory::Interrupts, t0);
            assert_eq!(a.report_dropped, None);
        }

        let later = t0 + Duration::from_millis(1100);
        let a = limiter.admit_at(LogCategory::Interrupts, later);
        assert!(a.allowed);
        assert_eq!(a.report_dropped, Some(4));
    }

    #[test]
    fn log_file_receives_lines() {
        let config = LogConfig::new();
        let path = std::env::temp_dir().join(format!(
            "retro_core_log_{}.txt",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        config.set_log_file(path.clone()).unwrap();
        config.write_line("CPU: reset, PC=8000".to_string());
        // Dropping the sender lets the writer drain and exit.
        config.clear_log_file();

        let mut contents = String::new();
        for _ in 0..50 {
            contents = std::fs::read_to_string(&path).unwrap_or_default();
            if !contents.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        let _ = std::fs::remove_file(&path);
        assert_eq!(contents, "CPU: reset, PC=8000\n");
    }
}
