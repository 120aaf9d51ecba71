//! Leading and trailing edge throttle.
//!
//! A request runs right away when more than `interval` milliseconds passed
//! since the previous run. Otherwise it is parked until the interval
//! boundary, and a newer request replaces the parked one. The caller owns
//! the timer: it polls with the current time once [`Throttle::next_deadline`]
//! is reached.

/// Throttle state carrying the payload of the parked run.
#[derive(Debug)]
pub struct Throttle<T> {
    last_run: Option<u64>,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    due: u64,
    payload: T,
}

impl<T> Default for Throttle<T> {
    fn default() -> Self {
        Self {
            last_run: None,
            pending: None,
        }
    }
}

impl<T> Throttle<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a run at `now`.
    ///
    /// Returns the payload when the run happens immediately. A disabled
    /// throttle or `ignore_throttle` always runs immediately. Any parked run
    /// is dropped either way.
    pub fn request(
        &mut self,
        now: u64,
        interval: u64,
        payload: T,
        enabled: bool,
        ignore_throttle: bool,
    ) -> Option<T> {
        self.pending = None;

        let elapsed_enough = match self.last_run {
            Some(last) => now.saturating_sub(last) > interval,
            None => true,
        };

        if elapsed_enough || !enabled || ignore_throttle {
            self.last_run = Some(now);
            return Some(payload);
        }

        let due = self.last_run.map_or(now, |last| last + interval);
        log::trace!("throttled run parked until {due}");
        self.pending = Some(Pending { due, payload });
        None
    }

    /// Fires the parked run if it is due.
    pub fn poll(&mut self, now: u64) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.due <= now => {}
            _ => return None,
        }
        let pending = self.pending.take()?;
        self.last_run = Some(now);
        Some(pending.payload)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// When the parked run becomes due.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_runs_immediately() {
        let mut throttle = Throttle::new();
        assert_eq!(throttle.request(0, 250, 1, true, false), Some(1));
    }

    #[test]
    fn burst_collapses_into_one_trailing_run() {
        let mut throttle = Throttle::new();
        assert_eq!(throttle.request(1_000, 250, "a", true, false), Some("a"));
        assert_eq!(throttle.request(1_050, 250, "b", true, false), None);
        assert_eq!(throttle.request(1_100, 250, "c", true, false), None);
        assert_eq!(throttle.next_deadline(), Some(1_250));

        assert_eq!(throttle.poll(1_200), None);
        assert_eq!(throttle.poll(1_250), Some("c"));
        assert_eq!(throttle.poll(1_300), None);
    }

    #[test]
    fn exactly_interval_is_still_throttled() {
        let mut throttle = Throttle::new();
        throttle.request(0, 250, (), true, false);
        assert_eq!(throttle.request(250, 250, (), true, false), None);
        assert_eq!(throttle.request(251, 250, (), true, false), Some(()));
    }

    #[test]
    fn ignore_flag_runs_and_drops_parked_run() {
        let mut throttle = Throttle::new();
        throttle.request(0, 250, 1, true, false);
        assert_eq!(throttle.request(10, 250, 2, true, false), None);
        assert_eq!(throttle.request(20, 250, 3, true, true), Some(3));
        assert!(!throttle.has_pending());
    }

    #[test]
    fn disabled_throttle_always_runs() {
        let mut throttle = Throttle::new();
        for now in 0..5 {
            assert_eq!(throttle.request(now, 250, now, false, false), Some(now));
        }
    }
}
