//! Subscription a mounted control keeps on the action it shows

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tui_relay_core::{ActionHandle, Subscription};

/// Keeps a control subscribed to its bound action while it is alive.
///
/// The listener flags the control as changed; the control turns the flag
/// into a render request on its next tick. Dropping the control drops the
/// subscription.
#[derive(Debug, Default)]
pub(crate) struct Watch {
    subscription: Option<Subscription>,
    changed: Arc<AtomicBool>,
}

impl Watch {
    /// Subscribe to `action`, or switch over when the bound key changed.
    pub(crate) fn follow<T>(&mut self, action: &ActionHandle<T>) {
        let bound = action.key().map(|key| key.id());
        if self.subscription.as_ref().map(Subscription::action) == bound {
            return;
        }
        let changed = self.changed.clone();
        self.subscription = action.subscribe(move |_| changed.store(true, Ordering::Release));
    }

    /// Whether the action changed state since the last call.
    pub(crate) fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }
}
