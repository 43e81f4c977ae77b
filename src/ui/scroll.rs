//! Scroll animator - constant-velocity scrolling driven by a discrete state
//!
//! `ScrollState::Up`/`Down` start a frame loop that moves the surface by a
//! fixed step every frame; `None` stops it before the next frame. The loop
//! ends when the animator is shut down or dropped.

use crate::core::config::ControllerConfig;
use crate::core::types::ScrollState;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Something that can be scrolled
pub trait ScrollSurface: Send + Sync {
    fn scroll_by(&self, delta: f64);
}

/// Vertical scroll offset clamped to `[0, max]`
#[derive(Debug, Default)]
pub struct ScrollPosition {
    offset: Mutex<f64>,
    max: Option<f64>,
}

impl ScrollPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max(max: f64) -> Self {
        Self {
            offset: Mutex::new(0.0),
            max: Some(max.max(0.0)),
        }
    }

    pub fn offset(&self) -> f64 {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScrollSurface for ScrollPosition {
    fn scroll_by(&self, delta: f64) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = (*offset + delta).max(0.0);
        if let Some(max) = self.max {
            next = next.min(max);
        }
        *offset = next;
    }
}

/// Cheap handle for setting the scroll state from commands or UI controls
#[derive(Debug, Clone)]
pub struct ScrollHandle {
    tx: Arc<watch::Sender<ScrollState>>,
}

impl ScrollHandle {
    pub fn set(&self, state: ScrollState) {
        let previous = self.tx.send_replace(state);
        if previous != state {
            tracing::debug!(?previous, ?state, "scroll state changed");
        }
    }

    pub fn state(&self) -> ScrollState {
        *self.tx.borrow()
    }
}

pub struct ScrollAnimator {
    handle: ScrollHandle,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ScrollAnimator {
    /// Start the frame loop on the current tokio runtime
    pub fn spawn(surface: Arc<dyn ScrollSurface>, step: f64, frame: Duration) -> Self {
        let (tx, rx) = watch::channel(ScrollState::None);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(frame_loop(rx, surface, step, frame, cancel.clone()));

        Self {
            handle: ScrollHandle { tx: Arc::new(tx) },
            cancel,
            task: Some(task),
        }
    }

    pub fn from_config(surface: Arc<dyn ScrollSurface>, config: &ControllerConfig) -> Self {
        Self::spawn(surface, config.scroll_step, config.frame_interval)
    }

    pub fn handle(&self) -> ScrollHandle {
        self.handle.clone()
    }

    pub fn set_state(&self, state: ScrollState) {
        self.handle.set(state);
    }

    pub fn state(&self) -> ScrollState {
        self.handle.state()
    }

    /// Stop the frame loop and wait for it to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!("scroll frame loop ended abnormally: {}", err);
            }
        }
    }
}

impl Drop for ScrollAnimator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn frame_loop(
    mut rx: watch::Receiver<ScrollState>,
    surface: Arc<dyn ScrollSurface>,
    step: f64,
    frame: Duration,
    cancel: CancellationToken,
) {
    loop {
        let state = *rx.borrow_and_update();

        let Some(sign) = state.direction() else {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            continue;
        };

        let mut ticker = tokio::time::interval_at(Instant::now() + frame, frame);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                _ = ticker.tick() => surface.scroll_by(sign * step),
            }
        }
    }
    tracing::debug!("scroll frame loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn test_position_clamps() {
        let pos = ScrollPosition::with_max(5.0);
        pos.scroll_by(-3.0);
        assert_eq!(pos.offset(), 0.0);
        pos.scroll_by(4.0);
        pos.scroll_by(4.0);
        assert_eq!(pos.offset(), 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_does_not_move() {
        let surface = Arc::new(ScrollPosition::new());
        let animator = ScrollAnimator::spawn(surface.clone(), 2.0, FRAME);

        tokio::time::sleep(FRAME * 10).await;
        assert_eq!(surface.offset(), 0.0);
        assert_eq!(animator.state(), ScrollState::None);
        animator.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrolls_down_in_fixed_steps() {
        let surface = Arc::new(ScrollPosition::new());
        let animator = ScrollAnimator::spawn(surface.clone(), 2.0, FRAME);

        animator.set_state(ScrollState::Down);
        tokio::time::sleep(FRAME * 5 + Duration::from_millis(1)).await;

        let offset = surface.offset();
        assert!(offset > 0.0);
        assert_eq!(offset % 2.0, 0.0);
        animator.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_direction_change_reverses() {
        let surface = Arc::new(ScrollPosition::new());
        let animator = ScrollAnimator::spawn(surface.clone(), 2.0, FRAME);

        animator.set_state(ScrollState::Down);
        tokio::time::sleep(FRAME * 6 + Duration::from_millis(1)).await;
        let peak = surface.offset();

        animator.set_state(ScrollState::Up);
        tokio::time::sleep(FRAME * 2 + Duration::from_millis(1)).await;
        assert!(surface.offset() < peak);
        animator.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_frames() {
        let surface = Arc::new(ScrollPosition::new());
        let animator = ScrollAnimator::spawn(surface.clone(), 2.0, FRAME);
        animator.set_state(ScrollState::Down);
        tokio::time::sleep(FRAME * 3 + Duration::from_millis(1)).await;

        drop(animator);
        tokio::task::yield_now().await;
        let frozen = surface.offset();

        tokio::time::sleep(FRAME * 10).await;
        assert_eq!(surface.offset(), frozen);
    }
}
