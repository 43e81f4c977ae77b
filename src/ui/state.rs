//! Caption log - the feedback surface used by the terminal harness

use crate::command::feedback::FeedbackSink;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

/// A caption shown (or spoken) to the user
#[derive(Debug, Clone)]
pub struct Caption {
    pub at: SystemTime,
    pub message: String,
}

/// Bounded log of captions, oldest dropped first
#[derive(Debug)]
pub struct CaptionLog {
    entries: Mutex<VecDeque<Caption>>,
    capacity: usize,
}

impl CaptionLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn push(&self, message: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(Caption {
            at: SystemTime::now(),
            message: message.into(),
        });
    }

    /// Most recent caption
    pub fn latest(&self) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .map(|c| c.message.clone())
    }

    /// All captions, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|c| c.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for CaptionLog {
    fn default() -> Self {
        Self::new(crate::core::config::config().max_captions)
    }
}

impl FeedbackSink for CaptionLog {
    fn emit(&self, message: &str) {
        tracing::info!(caption = message, "feedback");
        self.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_drops_oldest() {
        let log = CaptionLog::new(3);
        for i in 0..5 {
            log.push(format!("caption {}", i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(
            log.messages(),
            vec!["caption 2", "caption 3", "caption 4"]
        );
        assert_eq!(log.latest().as_deref(), Some("caption 4"));
    }

    #[test]
    fn test_sink_records() {
        let log = CaptionLog::new(10);
        log.emit("Friend request sent to Alice.");
        assert_eq!(log.latest().as_deref(), Some("Friend request sent to Alice."));
        log.clear();
        assert!(log.is_empty());
    }
}
