//! Transient user-facing notifications.
//!
//! Views never propagate request failures; they push a toast here and fall
//! back to an empty state. The CLI drains and prints the queue after each
//! navigation.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            ToastLevel::Success => "[ok]",
            ToastLevel::Error => "[!!]",
            ToastLevel::Info => "[--]",
        };
        write!(f, "{tag} {}", self.message)
    }
}

/// Shared toast queue. Cloning shares the queue.
#[derive(Debug, Clone, Default)]
pub struct Toaster {
    queue: Arc<Mutex<Vec<Toast>>>,
}

impl Toaster {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: ToastLevel, message: String) {
        match level {
            ToastLevel::Error => error!(toast = %message, "toast"),
            _ => info!(toast = %message, "toast"),
        }
        if let Ok(mut queue) = self.queue.lock() {
            queue.push(Toast { level, message });
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message.into());
    }

    /// Removes and returns everything queued so far.
    pub fn drain(&self) -> Vec<Toast> {
        self.queue
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Toast> {
        self.queue.lock().ok().and_then(|queue| queue.last().cloned())
    }
}
