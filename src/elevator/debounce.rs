use tokio::time::{Duration, Instant};

/// Rising-edge debounce for a noisy boolean: reports true only once the raw
/// signal has held true continuously for the full window, and drops back to
/// false the moment the raw signal does.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_raw: bool,
    held_since: Instant,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_raw: false,
            held_since: Instant::now(),
        }
    }

    /// Feeds one sample; call once per polling cycle.
    pub fn update(&mut self, raw: bool) -> bool {
        let now = Instant::now();
        if raw != self.last_raw {
            self.last_raw = raw;
            self.held_since = now;
        }
        raw && now.duration_since(self.held_since) >= self.window
    }
}
