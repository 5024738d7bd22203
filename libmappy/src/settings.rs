//! Process-wide minimap2 state: the verbosity level and a wall-clock timer.
//!
//! minimap2 keeps its verbosity in an unsynchronized C global (`mm_verbose`).
//! Every access from this module goes through an internal [`Mutex`] so that
//! concurrent callers are defined behaviour; the level itself still applies
//! to the whole process, not to an individual [`Aligner`](crate::Aligner).
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

/// Serializes reads and writes of minimap2's global verbosity flag.
static VERBOSE_LOCK: Mutex<()> = Mutex::new(());

fn timer() -> &'static Mutex<Instant> {
    static TIMER: OnceLock<Mutex<Instant>> = OnceLock::new();
    TIMER.get_or_init(|| Mutex::new(Instant::now()))
}

/// The current minimap2 verbosity level.
///
/// Levels follow minimap2: 1 shows errors only, 2 adds warnings, 3 adds
/// debug output. The default is 1.
pub fn verbosity() -> i32 {
    let _guard = VERBOSE_LOCK.lock().unwrap();
    unsafe { minimap2_sys::mm_verbose }
}

/// Set the minimap2 verbosity level, returning the previous level.
pub fn set_verbosity(level: i32) -> i32 {
    let _guard = VERBOSE_LOCK.lock().unwrap();
    unsafe {
        let previous = minimap2_sys::mm_verbose;
        minimap2_sys::mm_verbose = level;
        previous
    }
}

/// Reset the process-wide timer to now.
///
/// minimap2's own epoch (`mm_realtime0`) is not exported by `minimap2-sys`,
/// so the timer is kept on the Rust side; it measures wall-clock time for
/// reporting, nothing else depends on it.
pub fn reset_timer() {
    *timer().lock().unwrap() = Instant::now();
}

/// Wall-clock time elapsed since the last [`reset_timer`] call (or since the
/// timer was first touched).
pub fn elapsed() -> Duration {
    timer().lock().unwrap().elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_verbosity_returns_previous() {
        let original = verbosity();
        let previous = set_verbosity(3);
        assert_eq!(previous, original);
        assert_eq!(verbosity(), 3);
        set_verbosity(original);
    }

    #[test]
    fn test_reset_timer() {
        reset_timer();
        let first = elapsed();
        assert!(first < Duration::from_secs(5));
        reset_timer();
        assert!(elapsed() <= first + Duration::from_secs(5));
    }
}
