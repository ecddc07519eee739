/// One-shot readiness gate for an asynchronously loaded asset.
///
/// Before the asset is ready, at most one action is parked; parking a new one
/// replaces the previous (a superseded hover must not draw). Becoming ready
/// hands back the parked action exactly once. After that, actions pass
/// straight through.
#[derive(Debug)]
pub struct Deferred<T> {
    ready: bool,
    parked: Option<T>,
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self {
            ready: false,
            parked: None,
        }
    }
}

impl<T> Deferred<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(action)` if it can run now, otherwise parks it.
    pub fn run_or_park(&mut self, action: T) -> Option<T> {
        if self.ready {
            Some(action)
        } else {
            self.parked = Some(action);
            None
        }
    }

    /// Drops the parked action, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.parked.take()
    }

    /// Fires the ready signal.
    ///
    /// Returns the parked action on the first call only.
    pub fn mark_ready(&mut self) -> Option<T> {
        if self.ready {
            return None;
        }
        self.ready = true;
        self.parked.take()
    }
}
