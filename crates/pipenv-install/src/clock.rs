//! Injectable time source

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Source of "now". Builds take one so timestamps and durations can be
/// pinned in tests.
#[derive(Clone)]
pub struct Clock {
    now: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl Clock {
    pub fn new(now: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Clock { now: Arc::new(now) }
    }

    /// Wall clock
    pub fn system() -> Self {
        Self::new(Utc::now)
    }

    /// Always reports `instant`
    pub fn fixed(instant: DateTime<Utc>) -> Self {
        Self::new(move || instant)
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now)()
    }

    /// Run `f` and report how long it took, whether or not it succeeded
    pub fn measure<T>(&self, f: impl FnOnce() -> T) -> (Duration, T) {
        let start = self.now();
        let value = f();
        let elapsed = (self.now() - start).to_std().unwrap_or_default();
        (elapsed, value)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

/// Render a duration rounded to the millisecond: `250ms`, `1.5s`, `2m3.004s`
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis()
        + u128::from(duration.subsec_nanos() % 1_000_000 >= 500_000);
    if millis == 0 {
        return "0s".to_string();
    }
    if millis < 1000 {
        return format!("{}ms", millis);
    }

    let minutes = millis / 60_000;
    let secs = (millis % 60_000) / 1000;
    let frac = millis % 1000;

    let mut seconds = if frac == 0 {
        secs.to_string()
    } else {
        format!("{}.{:03}", secs, frac).trim_end_matches('0').to_string()
    };
    seconds.push('s');

    if minutes > 0 {
        format!("{}m{}", minutes, seconds)
    } else {
        seconds
    }
}
