use std::time::{Duration, Instant};

/// Trailing-edge debouncer. Holds at most one pending value; pushing a new
/// one supersedes the old and restarts the quiet window. The host loop polls
/// it once per tick, there are no timers or threads behind it.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Debouncer {
            window,
            pending: None,
        }
    }

    pub fn push_at(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.window, value));
    }

    pub fn push(&mut self, value: T) {
        self.push_at(value, Instant::now());
    }

    /// Take the pending value once input has been quiescent for the full
    /// window.
    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => {
                self.pending.take().map(|(_, value)| value)
            }
            _ => None,
        }
    }

    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn fires_only_after_quiescence() {
        let t0 = Instant::now();
        let mut debounce = Debouncer::new(WINDOW);
        debounce.push_at("a", t0);
        assert_eq!(debounce.poll_at(t0 + Duration::from_millis(100)), None);
        assert_eq!(debounce.poll_at(t0 + WINDOW), Some("a"));
        // One-shot: a second poll returns nothing.
        assert_eq!(debounce.poll_at(t0 + WINDOW), None);
    }

    #[test]
    fn later_pushes_supersede_earlier_ones() {
        let t0 = Instant::now();
        let mut debounce = Debouncer::new(WINDOW);
        debounce.push_at("a", t0);
        debounce.push_at("ab", t0 + Duration::from_millis(200));
        // The first deadline passes without firing.
        assert_eq!(debounce.poll_at(t0 + WINDOW), None);
        assert_eq!(
            debounce.poll_at(t0 + Duration::from_millis(500)),
            Some("ab")
        );
    }

    #[test]
    fn cancel_discards_pending() {
        let t0 = Instant::now();
        let mut debounce = Debouncer::new(WINDOW);
        debounce.push_at("a", t0);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll_at(t0 + WINDOW), None);
    }
}
