// One-second game clock
// A cancellable periodic tick driven by the event loop's own clock

use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_secs(1);

/// Counts whole seconds while running
///
/// There is no background thread: the owner calls [`TickTimer::poll`] with
/// the current instant and every due tick fires there. Stopping clears the
/// pending deadline, so nothing scheduled before a stop can fire after it.
#[derive(Debug, Clone, Default)]
pub struct TickTimer {
    counter: u64,
    next_tick: Option<Instant>, // Pending tick; None when stopped
}

impl TickTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from zero, first tick one second from `now`
    pub fn start(&mut self, now: Instant) {
        self.counter = 0;
        self.next_tick = Some(now + TICK);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    pub fn reset(&mut self) {
        self.stop();
        self.counter = 0;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn seconds(&self) -> u64 {
        self.counter
    }

    /// Fire every tick due at `now`; returns how many fired
    pub fn poll(&mut self, now: Instant) -> u32 {
        let mut fired = 0;
        while let Some(deadline) = self.next_tick {
            if deadline > now {
                break;
            }
            self.counter += 1;
            self.next_tick = Some(deadline + TICK);
            fired += 1;
        }
        fired
    }

    /// Time left until the pending tick, if one is scheduled
    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whole_seconds() {
        let t0 = Instant::now();
        let mut timer = TickTimer::new();
        timer.start(t0);

        assert_eq!(timer.poll(t0 + Duration::from_millis(999)), 0);
        assert_eq!(timer.poll(t0 + Duration::from_secs(1)), 1);
        assert_eq!(timer.poll(t0 + Duration::from_millis(3500)), 2);
        assert_eq!(timer.seconds(), 3);
        assert_eq!(
            timer.until_next_tick(t0 + Duration::from_millis(3500)),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn stop_cancels_pending_tick() {
        let t0 = Instant::now();
        let mut timer = TickTimer::new();
        timer.start(t0);
        timer.poll(t0 + Duration::from_secs(2));

        timer.stop();

        assert!(!timer.is_running());
        assert_eq!(timer.poll(t0 + Duration::from_secs(10)), 0);
        assert_eq!(timer.seconds(), 2);
        assert_eq!(timer.until_next_tick(t0), None);
    }

    #[test]
    fn reset_zeroes_counter() {
        let t0 = Instant::now();
        let mut timer = TickTimer::new();
        timer.start(t0);
        timer.poll(t0 + Duration::from_secs(5));

        timer.reset();

        assert_eq!(timer.seconds(), 0);
        assert_eq!(timer.poll(t0 + Duration::from_secs(6)), 0);
    }

    #[test]
    fn restart_begins_from_zero() {
        let t0 = Instant::now();
        let mut timer = TickTimer::new();
        timer.start(t0);
        timer.poll(t0 + Duration::from_secs(4));

        let t1 = t0 + Duration::from_secs(4);
        timer.start(t1);

        assert_eq!(timer.seconds(), 0);
        assert_eq!(timer.poll(t1 + Duration::from_secs(1)), 1);
    }
}
