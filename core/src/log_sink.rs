// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::error::{MapReduceError, Result};
use chrono::Local;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Debug,
    Error,
    Warning,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging collaborator handed to every component of a run.
/// Implementations must serialize writes: workers log concurrently.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str, level: LogLevel);

    fn info(&self, message: &str) {
        self.log(message, LogLevel::Info);
    }

    fn debug(&self, message: &str) {
        self.log(message, LogLevel::Debug);
    }

    fn warning(&self, message: &str) {
        self.log(message, LogLevel::Warning);
    }

    fn error(&self, message: &str) {
        self.log(message, LogLevel::Error);
    }
}

/// Default sink: forwards to `tracing` and optionally appends to a log file
pub struct Logger {
    file: Mutex<Option<File>>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub fn new() -> Self {
        Self {
            file: Mutex::new(None),
        }
    }

    /// Also append every message to `path`, creating it if needed
    pub fn with_log_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| MapReduceError::io(path, e))?;

        Ok(Self {
            file: Mutex::new(Some(file)),
        })
    }
}

impl LogSink for Logger {
    fn log(&self, message: &str, level: LogLevel) {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);

        match level {
            LogLevel::Info => info!("{}", message),
            LogLevel::Debug => debug!("{}", message),
            LogLevel::Error => error!("{}", message),
            LogLevel::Warning => warn!("{}", message),
        }

        if let Some(file) = file.as_mut() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            if let Err(e) = writeln!(file, "{} - {}: {}", timestamp, level, message) {
                error!("Failed to write log file: {}", e);
            }
        }
    }
}

/// Sink that keeps every message in memory, for tests and diagnostics
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True if some message at `level` contains `fragment`
    pub fn contains(&self, level: LogLevel, fragment: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(l, message)| *l == level && message.contains(fragment))
    }
}

impl LogSink for RecordingSink {
    fn log(&self, message: &str, level: LogLevel) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}
