//! Render progress reporting and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A progress update event.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderProgress {
    /// Rendering has started.
    Started { total_effects: usize },
    /// An effect is about to be rendered.
    EffectStarted {
        effect_id: String,
        index: usize,
        total: usize,
    },
    /// An effect contributed nothing.
    EffectSkipped {
        effect_id: String,
        reason: SkipReason,
    },
    /// An effect's layers have been painted.
    EffectCompleted {
        effect_id: String,
        layers: usize,
        duration_ms: u64,
    },
    /// Rendering has completed.
    Completed {
        total_duration_ms: u64,
        effects_rendered: usize,
        effects_skipped: usize,
    },
    /// Rendering was cancelled.
    Cancelled,
}

/// Reason why an effect was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The id no longer resolves to a registered effect.
    UnknownEffect,
    /// The effect needs an external asset that was not supplied.
    MissingAsset,
}

/// Callback type for progress updates.
pub type ProgressCallback = Arc<dyn Fn(RenderProgress) + Send + Sync>;

/// Cooperative cancellation flag, checked between effects and layers.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Counters and event fan-out for a single render call.
pub(crate) struct ProgressTracker {
    total_effects: usize,
    rendered: usize,
    skipped: usize,
    layers_painted: usize,
    start_time: Instant,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    pub(crate) fn start(total_effects: usize, callback: Option<ProgressCallback>) -> Self {
        let tracker = Self {
            total_effects,
            rendered: 0,
            skipped: 0,
            layers_painted: 0,
            start_time: Instant::now(),
            callback,
        };
        tracker.send(RenderProgress::Started { total_effects });
        tracker
    }

    pub(crate) fn effect_started(&self, effect_id: &str, index: usize) {
        self.send(RenderProgress::EffectStarted {
            effect_id: effect_id.to_string(),
            index,
            total: self.total_effects,
        });
    }

    pub(crate) fn effect_skipped(&mut self, effect_id: &str, reason: SkipReason) {
        self.skipped += 1;
        self.send(RenderProgress::EffectSkipped {
            effect_id: effect_id.to_string(),
            reason,
        });
    }

    pub(crate) fn effect_completed(&mut self, effect_id: &str, layers: usize, duration: Duration) {
        self.rendered += 1;
        self.layers_painted += layers;
        self.send(RenderProgress::EffectCompleted {
            effect_id: effect_id.to_string(),
            layers,
            duration_ms: duration.as_millis() as u64,
        });
    }

    pub(crate) fn cancelled(&self) {
        self.send(RenderProgress::Cancelled);
    }

    /// Emit the final event and hand back the stats.
    pub(crate) fn complete(self) -> RenderStats {
        let stats = RenderStats {
            effects_rendered: self.rendered,
            effects_skipped: self.skipped,
            layers_painted: self.layers_painted,
            duration: self.start_time.elapsed(),
        };
        self.send(RenderProgress::Completed {
            total_duration_ms: stats.duration.as_millis() as u64,
            effects_rendered: stats.effects_rendered,
            effects_skipped: stats.effects_skipped,
        });
        stats
    }

    fn send(&self, update: RenderProgress) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }
}

/// Render statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderStats {
    /// Effects whose layers were painted.
    pub effects_rendered: usize,
    /// Effects skipped as stale or missing their asset.
    pub effects_skipped: usize,
    /// Layers actually painted (invisible layers are not counted).
    pub layers_painted: usize,
    /// Wall-clock time of the render call.
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_cancellation_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_tracker_events_and_stats() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let callback: ProgressCallback = Arc::new(move |e| sink.lock().push(e));

        let mut tracker = ProgressTracker::start(2, Some(callback));
        tracker.effect_started("a", 0);
        tracker.effect_completed("a", 2, Duration::from_millis(3));
        tracker.effect_skipped("b", SkipReason::UnknownEffect);
        let stats = tracker.complete();

        assert_eq!(stats.effects_rendered, 1);
        assert_eq!(stats.effects_skipped, 1);
        assert_eq!(stats.layers_painted, 2);

        let events = events.lock();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], RenderProgress::Started { total_effects: 2 });
        assert!(matches!(events[4], RenderProgress::Completed { effects_rendered: 1, .. }));
    }
}
