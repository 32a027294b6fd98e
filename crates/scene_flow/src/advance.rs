use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

/// One-shot "proceed to the next scene" action.
///
/// Clones share the same guard: the wrapped callback runs on the first
/// activation only and every later activation is a no-op, so a double click
/// cannot queue two transitions or dispose a scene twice.
#[derive(Clone)]
pub struct AdvanceAction {
    callback: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
}

impl AdvanceAction {
    pub fn new(callback: impl FnOnce() + 'static) -> Self {
        Self {
            callback: Rc::new(RefCell::new(Some(Box::new(callback)))),
        }
    }

    /// Runs the callback if it has not run yet. Returns whether it ran.
    pub fn activate(&self) -> bool {
        let callback = self.callback.borrow_mut().take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => {
                debug!("advance_action_already_consumed");
                false
            }
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.callback.borrow().is_none()
    }
}

impl fmt::Debug for AdvanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvanceAction")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// Pending "advance" flag shared between the active scene's action and the
/// flow driver. Requests coalesce: several before the driver looks count once.
#[derive(Debug, Clone, Default)]
pub struct AdvanceRequests {
    pending: Rc<Cell<bool>>,
}

impl AdvanceRequests {
    pub fn request(&self) {
        self.pending.set(true);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Clears the flag and reports whether a request was pending.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }

    /// Action that raises this flag when activated.
    pub fn action(&self) -> AdvanceAction {
        let requests = self.clone();
        AdvanceAction::new(move || requests.request())
    }
}
