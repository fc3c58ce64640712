// Session log for the overlay process: one timestamped file per run, pruned on startup
use anyhow::Result;
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

pub struct SessionLogger {
    log_buffer: Mutex<Vec<String>>,
    log_path: PathBuf,
    log_dir: PathBuf,
    retention_count: usize,
    app_name: String,
    stream: bool,
}

impl SessionLogger {
    pub fn new(log_dir: PathBuf, app_name: &str, retention_count: usize, stream: bool) -> Result<Self> {
        fs::create_dir_all(&log_dir)?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_filename = format!("{}_{}.log", app_name, timestamp);
        let log_path = log_dir.join(&log_filename);

        let logger = Self {
            log_buffer: Mutex::new(Vec::new()),
            log_path,
            log_dir,
            retention_count,
            app_name: app_name.to_string(),
            stream,
        };

        logger.clean_old_logs()?;
        logger.log(Level::Info, format!("=== {} Session Started ===", app_name));

        Ok(logger)
    }

    pub fn log(&self, level: Level, message: impl AsRef<str>) {
        let message = message.as_ref();
        match level {
            Level::Info => tracing::info!("{}", message),
            Level::Warn => tracing::warn!("{}", message),
            Level::Error => tracing::error!("{}", message),
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let log_line = match level {
            Level::Info => format!("[{}] {}", timestamp, message),
            Level::Warn => format!("[{}] WARN: {}", timestamp, message),
            Level::Error => format!("[{}] ERROR: {}", timestamp, message),
        };

        if self.stream {
            let _ = self.write_lines(std::slice::from_ref(&log_line));
        } else {
            self.log_buffer.lock().push(log_line);
        }
    }

    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    fn write_lines(&self, lines: &[String]) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        file.flush()?;
        Ok(())
    }

    fn clean_old_logs(&self) -> Result<()> {
        let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
        let prefix = format!("{}_", self.app_name);

        if let Ok(entries) = fs::read_dir(&self.log_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                let is_log = path.extension().and_then(|s| s.to_str()) == Some("log");
                let ours = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix));
                if !(is_log && ours) {
                    continue;
                }
                if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                    log_files.push((path, modified));
                }
            }
        }

        // newest first; the file for this session doesn't exist yet
        log_files.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in log_files.iter().skip(self.retention_count.saturating_sub(1)) {
            let _ = fs::remove_file(path);
        }

        Ok(())
    }

    pub fn flush_to_disk(&self) -> Result<()> {
        let mut buffer = self.log_buffer.lock();
        if buffer.is_empty() {
            return Ok(());
        }

        self.write_lines(&buffer)?;
        buffer.clear();
        Ok(())
    }

    pub fn finalize(&self) -> Result<()> {
        self.log(Level::Info, format!("=== {} Session Ended ===", self.app_name));
        self.flush_to_disk()
    }
}

static LOGGER: once_cell::sync::OnceCell<SessionLogger> = once_cell::sync::OnceCell::new();

/// Installs the global session logger. In streaming mode log lines are also
/// printed to stdout through a `tracing` fmt subscriber.
pub fn init_logger(log_dir: PathBuf, app_name: &str, retention_count: usize, stream: bool) -> Result<()> {
    if stream {
        let _ = tracing_subscriber::fmt().with_target(false).try_init();
    }

    let logger = SessionLogger::new(log_dir, app_name, retention_count, stream)?;
    LOGGER.set(logger).map_err(|_| anyhow::anyhow!("Logger already initialized"))?;
    Ok(())
}

pub fn log(level: Level, message: impl AsRef<str>) {
    if let Some(logger) = LOGGER.get() {
        logger.log(level, message);
    }
}

pub fn log_info(message: impl AsRef<str>) {
    log(Level::Info, message);
}

pub fn log_warn(message: impl AsRef<str>) {
    log(Level::Warn, message);
}

pub fn log_error(message: impl AsRef<str>) {
    log(Level::Error, message);
}

pub fn finalize_logs() -> Result<()> {
    if let Some(logger) = LOGGER.get() {
        logger.finalize()?;
    }
    Ok(())
}

pub fn get_log_path() -> Option<PathBuf> {
    LOGGER.get().map(|logger| logger.log_path.clone())
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::log_info(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::log_warn(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logger::log_error(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_files(dir: &std::path::Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("log"))
            .collect()
    }

    #[test]
    fn buffered_lines_reach_disk_on_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let logger = SessionLogger::new(dir.path().to_path_buf(), "overlay", 10, false).unwrap();
        logger.log(Level::Info, "renderer ready");
        logger.log(Level::Warn, "batch full");
        assert!(!logger.log_path().exists());

        logger.finalize().unwrap();
        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("Session Started"));
        assert!(content.contains("renderer ready"));
        assert!(content.contains("WARN: batch full"));
        assert!(content.contains("Session Ended"));
    }

    #[test]
    fn streaming_writes_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let logger = SessionLogger::new(dir.path().to_path_buf(), "overlay", 10, true).unwrap();
        logger.log(Level::Error, "map failed");

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("ERROR: map failed"));
    }

    #[test]
    fn old_logs_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("overlay_2024010{}_000000.log", i)), "old").unwrap();
        }
        fs::write(dir.path().join("other_20240101_000000.log"), "keep").unwrap();

        let logger = SessionLogger::new(dir.path().to_path_buf(), "overlay", 3, false).unwrap();
        logger.finalize().unwrap();

        let ours = log_files(dir.path())
            .into_iter()
            .filter(|p| p.file_name().unwrap().to_string_lossy().starts_with("overlay_"))
            .count();
        assert_eq!(ours, 3);
        assert!(dir.path().join("other_20240101_000000.log").exists());
    }
}
