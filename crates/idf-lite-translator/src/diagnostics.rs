// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component-tagged diagnostics for translation sessions
//!
//! Each session owns a [`Diagnostics`] sink instead of writing to a global
//! logger. Messages at or above the sink's threshold are kept for the
//! translation result and mirrored to the `log` facade with the component
//! name as target.

use serde::Serialize;
use std::fmt;

/// Message severity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    fn as_log(self) -> log::Level {
        match self {
            LogLevel::Trace => log::Level::Trace,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(text)
    }
}

/// One recorded message
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogMessage {
    pub level: LogLevel,
    pub component: String,
    pub message: String,
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.component, self.level, self.message)
    }
}

/// Message sink for one translation run
#[derive(Clone, Debug)]
pub struct Diagnostics {
    component: String,
    min_level: LogLevel,
    messages: Vec<LogMessage>,
}

impl Diagnostics {
    /// Create a sink keeping warnings and errors
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            min_level: LogLevel::Warn,
            messages: Vec::new(),
        }
    }

    /// Keep messages at `level` and above
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        log::log!(target: self.component.as_str(), level.as_log(), "{}", message);
        if level >= self.min_level {
            self.messages.push(LogMessage {
                level,
                component: self.component.clone(),
                message,
            });
        }
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Recorded messages in emission order
    pub fn messages(&self) -> &[LogMessage] {
        &self.messages
    }

    /// Number of recorded warnings
    pub fn warning_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.level == LogLevel::Warn)
            .count()
    }

    /// Take the recorded messages, leaving the sink empty
    pub fn take_messages(&mut self) -> Vec<LogMessage> {
        std::mem::take(&mut self.messages)
    }
}
