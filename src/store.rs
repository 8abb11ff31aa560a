//! The store task: owns the library and applies read-state actions.
//!
//! The UI never waits on the store. Actions are dispatched with `try_send`
//! and the store reports changed sources back on the app event channel.

use crate::app::AppEvent;
use crate::episodes::{Episode, EpisodeKey, Library};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Capacity of the action queue.
const ACTION_QUEUE: usize = 32;

/// Actions the UI sends to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// Mark every episode of a source as read.
    ReadAll { source_id: String },
    /// Mark one episode as read.
    MarkRead { source_id: String, key: EpisodeKey },
}

/// New episode list for a source after the store changed it.
#[derive(Debug, Clone)]
pub struct SourceUpdate {
    pub source_id: String,
    pub episodes: Arc<Vec<Episode>>,
    /// Episodes whose read state changed.
    pub changed: usize,
}

/// Apply an action to the library.
///
/// Returns `None` when nothing changed or the source is unknown, so callers
/// only emit events for real updates.
pub fn apply(library: &mut Library, action: &StoreAction) -> Option<SourceUpdate> {
    let (source_id, changed) = match action {
        StoreAction::ReadAll { source_id } => {
            let changed = library.mark_source_read(source_id)?;
            (source_id, changed)
        }
        StoreAction::MarkRead { source_id, key } => {
            let changed = usize::from(library.mark_episode_read(source_id, key));
            (source_id, changed)
        }
    };

    if changed == 0 {
        return None;
    }

    let source = library.source(source_id)?;
    Some(SourceUpdate {
        source_id: source_id.clone(),
        episodes: Arc::clone(&source.episodes),
        changed,
    })
}

/// Sending half used by the UI.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreAction>,
}

impl StoreHandle {
    /// Wrap an existing action sender.
    pub fn from_sender(tx: mpsc::Sender<StoreAction>) -> Self {
        Self { tx }
    }

    /// Fire-and-forget dispatch. A full or closed queue drops the action with
    /// a warning; the UI does not wait for acknowledgement.
    pub fn dispatch(&self, action: StoreAction) {
        tracing::debug!(?action, "Dispatching store action");
        if let Err(e) = self.tx.try_send(action) {
            tracing::warn!(error = %e, "Failed to dispatch store action");
        }
    }
}

/// Spawn the store task.
///
/// The task runs until every `StoreHandle` is dropped.
pub fn spawn(
    mut library: Library,
    events: mpsc::Sender<AppEvent>,
) -> (StoreHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<StoreAction>(ACTION_QUEUE);

    let task = tokio::spawn(async move {
        while let Some(action) = rx.recv().await {
            let Some(update) = apply(&mut library, &action) else {
                tracing::debug!(?action, "Store action changed nothing");
                continue;
            };
            tracing::info!(
                source_id = %update.source_id,
                changed = update.changed,
                "Store updated source"
            );
            if let Err(e) = events.send(AppEvent::SourceUpdated(update)).await {
                tracing::warn!(error = %e, "Failed to send source update (receiver dropped)");
                break;
            }
        }
        tracing::debug!("Store task finished");
    });

    (StoreHandle { tx }, task)
}
