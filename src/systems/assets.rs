//! assets.rs
//!
//! Wraps the asset server's handle-and-poll loading into a single batch
//! result: all loads resolved, or the first failure in queue order.

use bevy::asset::{AssetServer, LoadState, UntypedHandle};
use thiserror::Error;

/// Failure to fetch or decode one asset. Carries the configured path and
/// whatever the asset backend reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load asset '{path}': {reason}")]
pub struct LoadError {
    pub path: String,
    pub reason: String,
}

/// One queued load: the configured path plus the handle that will resolve it.
pub struct PendingLoad {
    pub path: String,
    pub handle: UntypedHandle,
}

/// Load state as the batch sees it, abstracted from the asset server so the
/// sequencing logic stays testable without IO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProgress {
    Pending,
    Ready,
    Failed(String),
}

/// A fixed sequence of asset loads awaited as one deferred value.
/// Queue order is the deterministic attach order for whatever the
/// caller builds out of the results.
#[derive(Default)]
pub struct LoadBatch {
    loads: Vec<PendingLoad>,
}

impl LoadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, handle: UntypedHandle) {
        self.loads.push(PendingLoad {
            path: path.into(),
            handle,
        });
    }

    pub fn len(&self) -> usize {
        self.loads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    /// Poll every queued load.
    ///
    /// Returns `None` while any load is still in flight, `Some(Err)` with
    /// the first failure in queue order, and `Some(Ok)` once every load has
    /// resolved. Failure wins over still-pending loads so a doomed batch
    /// aborts immediately, no retries.
    pub fn poll(
        &self,
        progress_of: impl Fn(&PendingLoad) -> LoadProgress,
    ) -> Option<Result<(), LoadError>> {
        let mut in_flight = false;

        for load in &self.loads {
            match progress_of(load) {
                LoadProgress::Failed(reason) => {
                    return Some(Err(LoadError {
                        path: load.path.clone(),
                        reason,
                    }));
                }
                LoadProgress::Pending => in_flight = true,
                LoadProgress::Ready => {}
            }
        }

        if in_flight { None } else { Some(Ok(())) }
    }
}

/// Adapter from the asset server's view of a handle onto [`LoadProgress`].
pub fn server_progress(server: &AssetServer, load: &PendingLoad) -> LoadProgress {
    match server.get_load_state(load.handle.id()) {
        Some(LoadState::Loaded) => LoadProgress::Ready,
        Some(LoadState::Failed(error)) => LoadProgress::Failed(error.to_string()),
        Some(LoadState::Loading) | Some(LoadState::NotLoaded) | None => LoadProgress::Pending,
    }
}
