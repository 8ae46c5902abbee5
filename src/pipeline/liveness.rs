//! Liveness tokens tying in-flight requests to the view that issued them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Marks a consumer as alive for as long as it is held.
///
/// Dropping it flips every [`ViewToken`] handed out by [`token`](Self::token)
/// to dead, so results produced afterwards are discarded instead of
/// delivered.
#[derive(Debug)]
pub struct ViewLifetime {
    alive: Arc<AtomicBool>,
}

impl ViewLifetime {
    /// Start a new live view.
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Token to attach to requests issued by this view.
    pub fn token(&self) -> ViewToken {
        ViewToken {
            alive: Arc::clone(&self.alive),
        }
    }
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewLifetime {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

/// Cheap handle reporting whether the issuing view still exists.
#[derive(Debug, Clone)]
pub struct ViewToken {
    alive: Arc<AtomicBool>,
}

impl ViewToken {
    /// Whether the issuing view is still alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_alive_while_view_held() {
        let view = ViewLifetime::new();
        let token = view.token();
        assert!(token.is_alive());
        assert!(token.clone().is_alive());
    }

    #[test]
    fn test_token_dead_after_view_dropped() {
        let view = ViewLifetime::new();
        let token = view.token();
        let copy = token.clone();
        drop(view);
        assert!(!token.is_alive());
        assert!(!copy.is_alive());
    }
}
