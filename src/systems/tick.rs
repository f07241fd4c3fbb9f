//! tick.rs
//!
//! Per-frame broadcast signal with no payload.
//! Kept as an explicit observer list instead of bevy events so that plain
//! closures outside the ECS can hook the frame, and so delivery order and
//! mid-pass unsubscription stay under our control.

use bevy::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct TickPlugin;

impl Plugin for TickPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(TickBroadcaster::default())
            .add_systems(Update, publish);
    }
}

type Observer = Box<dyn FnMut() + Send + Sync>;

struct Entry {
    cancelled: Arc<AtomicBool>,
    callback: Observer,
}

/// Handle returned by [`TickBroadcaster::subscribe`].
///
/// Unsubscribing is a flag flip, so it is safe to call at any time,
/// including from inside the observer's own callback.
#[derive(Clone)]
pub struct TickSubscription {
    cancelled: Arc<AtomicBool>,
}

impl TickSubscription {
    pub fn unsubscribe(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::Relaxed)
    }
}

/// One-to-many frame signal: observers are notified synchronously,
/// in subscription order, once per publish. No buffering, no replay
/// for late subscribers.
#[derive(Resource, Default)]
pub struct TickBroadcaster {
    observers: Vec<Entry>,
}

impl TickBroadcaster {
    pub fn subscribe(&mut self, callback: impl FnMut() + Send + Sync + 'static) -> TickSubscription {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.observers.push(Entry {
            cancelled: cancelled.clone(),
            callback: Box::new(callback),
        });
        TickSubscription { cancelled }
    }

    /// Notify every live observer once. The pass runs over the list as it
    /// was at entry; an observer cancelled mid-pass is skipped from that
    /// point on, without affecting delivery to the rest of the pass.
    pub fn publish(&mut self) {
        let snapshot_len = self.observers.len();
        for index in 0..snapshot_len {
            let entry = &mut self.observers[index];
            if entry.cancelled.load(Ordering::Relaxed) {
                continue;
            }
            (entry.callback)();
        }

        // sweep cancelled entries after the pass
        self.observers
            .retain(|entry| !entry.cancelled.load(Ordering::Relaxed));
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .iter()
            .filter(|entry| !entry.cancelled.load(Ordering::Relaxed))
            .count()
    }
}

// runs every frame in Update; bevy renders after Update, so all observers
// see the tick before the frame is repainted
pub fn publish(mut broadcaster: ResMut<TickBroadcaster>) {
    broadcaster.publish();
}
