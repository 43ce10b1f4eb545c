//! Per-user command cooldowns.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

/// One use per `window` for each (command, user) pair.
pub struct CommandCooldown {
    /// Map of (command, `user_id`) to last accepted use.
    last_use: DashMap<(&'static str, Uuid), Instant>,
    /// Minimum time between uses.
    window: Duration,
}

impl CommandCooldown {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            last_use: DashMap::new(),
            window,
        }
    }

    /// Record a use, or return how long the user still has to wait.
    pub fn check(&self, command: &'static str, user_id: Uuid) -> Result<(), Duration> {
        let now = Instant::now();
        match self.last_use.entry((command, user_id)) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.duration_since(*entry.get());
                if elapsed < self.window {
                    return Err(self.window - elapsed);
                }
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }
        Ok(())
    }

    /// Drop entries whose window has passed.
    pub fn cleanup(&self) {
        let window = self.window;
        self.last_use.retain(|_, last| last.elapsed() < window);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.last_use.len()
    }
}
