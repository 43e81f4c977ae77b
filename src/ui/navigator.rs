//! Navigation collaborator

use crate::core::types::AppView;
use std::sync::{Mutex, PoisonError};

/// Host-side view switching
pub trait Navigator: Send + Sync {
    fn navigate(&self, view: AppView);

    fn go_back(&self);

    fn open_profile(&self, username: &str);
}

/// A navigation request as recorded by `NavigationLog`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Navigate(AppView),
    Back,
    OpenProfile(String),
}

/// Navigator that records requests instead of switching views
#[derive(Debug, Default)]
pub struct NavigationLog {
    events: Mutex<Vec<NavigationEvent>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<NavigationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    fn record(&self, event: NavigationEvent) {
        tracing::debug!(?event, "navigation");
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, view: AppView) {
        self.record(NavigationEvent::Navigate(view));
    }

    fn go_back(&self) {
        self.record(NavigationEvent::Back);
    }

    fn open_profile(&self, username: &str) {
        self.record(NavigationEvent::OpenProfile(username.to_string()));
    }
}
