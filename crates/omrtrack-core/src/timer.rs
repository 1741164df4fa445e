//! One-second countdowns for the test clock and the study timer.
//!
//! A countdown runs as a tokio task that owns its callbacks. The handle it
//! returns is the only way to stop it; dropping the handle stops it too, so
//! a countdown can never outlive the session that started it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Default length of a study session in minutes.
pub const DEFAULT_STUDY_MINUTES: u32 = 25;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct CountdownState {
    remaining: u64,
    cancelled: bool,
    expired: bool,
}

fn lock(state: &Mutex<CountdownState>) -> MutexGuard<'_, CountdownState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a running countdown.
#[derive(Debug)]
pub struct CountdownHandle {
    state: Arc<Mutex<CountdownState>>,
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    /// Stop the countdown. Returns `true` if it was still active.
    ///
    /// Callbacks run under the same lock this takes, so once `cancel`
    /// returns no further tick or expiry is delivered.
    pub fn cancel(&mut self) -> bool {
        let was_active = {
            let mut state = lock(&self.state);
            let active = !state.cancelled && !state.expired;
            state.cancelled = true;
            active
        };
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if was_active {
            tracing::debug!("countdown cancelled");
        }
        was_active
    }

    /// Whether the countdown is still ticking.
    pub fn is_active(&self) -> bool {
        let state = lock(&self.state);
        !state.cancelled && !state.expired
    }

    pub fn is_expired(&self) -> bool {
        lock(&self.state).expired
    }

    /// Seconds left on the clock.
    pub fn remaining(&self) -> u64 {
        lock(&self.state).remaining
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start a countdown of `duration_secs` seconds.
///
/// `on_tick` receives the remaining seconds after each one-second
/// decrement. `on_expire` runs exactly once when the clock reaches zero,
/// immediately for a zero duration. Neither callback may call back into
/// the returned handle.
///
/// Must be called from within a tokio runtime.
pub fn start_countdown<T, E>(duration_secs: u64, mut on_tick: T, on_expire: E) -> CountdownHandle
where
    T: FnMut(u64) + Send + 'static,
    E: FnOnce() + Send + 'static,
{
    let state = Arc::new(Mutex::new(CountdownState {
        remaining: duration_secs,
        cancelled: false,
        expired: false,
    }));
    let shared = Arc::clone(&state);

    tracing::debug!(duration_secs, "countdown started");

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + TICK, TICK);
        let mut on_expire = Some(on_expire);

        loop {
            {
                let mut state = lock(&shared);
                if state.cancelled {
                    return;
                }
                if state.remaining == 0 {
                    state.expired = true;
                    tracing::debug!("countdown expired");
                    if let Some(expire) = on_expire.take() {
                        expire();
                    }
                    return;
                }
            }

            ticker.tick().await;

            {
                let mut state = lock(&shared);
                if state.cancelled {
                    return;
                }
                state.remaining -= 1;
                on_tick(state.remaining);
            }
        }
    });

    CountdownHandle {
        state,
        task: Some(task),
    }
}

/// Format seconds as the test clock, `H:MM:SS`.
pub fn format_test_clock(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Format seconds as the study clock, `MM:SS`. Minutes are not capped.
pub fn format_study_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Pausable study-session countdown.
///
/// At most one countdown is active at a time; starting while running is a
/// no-op. Pausing keeps the remaining time, resetting restores the
/// configured duration.
#[derive(Debug)]
pub struct StudyTimer {
    duration_minutes: u32,
    remaining: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
    countdown: Option<CountdownHandle>,
}

impl Default for StudyTimer {
    fn default() -> Self {
        Self::new(DEFAULT_STUDY_MINUTES)
    }
}

impl StudyTimer {
    /// A stopped timer of the given length. Zero falls back to the default.
    pub fn new(minutes: u32) -> Self {
        let minutes = normalize_minutes(minutes);
        Self {
            duration_minutes: minutes,
            remaining: Arc::new(AtomicU64::new(u64::from(minutes) * 60)),
            finished: Arc::new(AtomicBool::new(false)),
            countdown: None,
        }
    }

    /// Start or resume the countdown. Returns `false` if it was already
    /// running or has no time left.
    ///
    /// `on_complete` runs once when the session finishes; the timer is then
    /// paused at `00:00` until reset.
    pub fn start<T, C>(&mut self, mut on_tick: T, on_complete: C) -> bool
    where
        T: FnMut(u64) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        if self.is_running() {
            return false;
        }
        let remaining = self.remaining();
        if remaining == 0 {
            return false;
        }

        // Tear down any previous, already-stopped countdown first.
        if let Some(mut previous) = self.countdown.take() {
            previous.cancel();
        }

        self.finished.store(false, Ordering::SeqCst);
        let tick_remaining = Arc::clone(&self.remaining);
        let finished = Arc::clone(&self.finished);

        self.countdown = Some(start_countdown(
            remaining,
            move |secs| {
                tick_remaining.store(secs, Ordering::SeqCst);
                on_tick(secs);
            },
            move || {
                finished.store(true, Ordering::SeqCst);
                on_complete();
            },
        ));
        tracing::info!(remaining_secs = remaining, "study timer started");
        true
    }

    /// Stop ticking, keeping the remaining time.
    pub fn pause(&mut self) {
        if let Some(mut countdown) = self.countdown.take() {
            if countdown.cancel() {
                tracing::info!(remaining_secs = self.remaining(), "study timer paused");
            }
        }
    }

    /// Pause and restore a full session of `minutes` (zero means the default).
    pub fn reset(&mut self, minutes: u32) {
        self.pause();
        self.duration_minutes = normalize_minutes(minutes);
        self.remaining
            .store(u64::from(self.duration_minutes) * 60, Ordering::SeqCst);
        self.finished.store(false, Ordering::SeqCst);
        tracing::info!(minutes = self.duration_minutes, "study timer reset");
    }

    pub fn is_running(&self) -> bool {
        self.countdown.as_ref().is_some_and(CountdownHandle::is_active)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Current clock as `MM:SS`.
    pub fn display(&self) -> String {
        format_study_clock(self.remaining())
    }
}

fn normalize_minutes(minutes: u32) -> u32 {
    if minutes == 0 {
        DEFAULT_STUDY_MINUTES
    } else {
        minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;
    use tokio::time::sleep;

    fn counter() -> (Arc<AtomicU64>, impl FnMut(u64) + Send + 'static) {
        let count = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&count);
        (count, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn clock_formats() {
        assert_eq!(format_test_clock(3 * 3600 + 5 * 60 + 9), "3:05:09");
        assert_eq!(format_test_clock(59), "0:00:59");
        assert_eq!(format_study_clock(25 * 60), "25:00");
        assert_eq!(format_study_clock(61), "01:01");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_down_then_expires_once() {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let t = Arc::clone(&ticks);
        let (tx, rx) = oneshot::channel();

        let handle = start_countdown(
            3,
            move |remaining| t.lock().unwrap().push(remaining),
            move || {
                let _ = tx.send(());
            },
        );

        rx.await.unwrap();
        assert_eq!(*ticks.lock().unwrap(), vec![2, 1, 0]);
        assert!(handle.is_expired());
        assert!(!handle.is_active());
        assert_eq!(handle.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_expires_without_ticking() {
        let (count, on_tick) = counter();
        let (tx, rx) = oneshot::channel();
        let _handle = start_countdown(0, on_tick, move || {
            let _ = tx.send(());
        });
        rx.await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_countdown_never_ticks_again() {
        let (first_count, first_tick) = counter();
        let expired = Arc::new(AtomicBool::new(false));
        let e = Arc::clone(&expired);

        let mut first = start_countdown(60, first_tick, move || e.store(true, Ordering::SeqCst));
        sleep(Duration::from_millis(3500)).await;
        assert_eq!(first_count.load(Ordering::SeqCst), 3);

        assert!(first.cancel());
        assert!(!first.is_active());

        let (second_count, second_tick) = counter();
        let second = start_countdown(60, second_tick, || {});
        sleep(Duration::from_millis(2500)).await;

        assert_eq!(first_count.load(Ordering::SeqCst), 3);
        assert_eq!(second_count.load(Ordering::SeqCst), 2);
        assert!(second.is_active());
        assert!(!expired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_countdown() {
        let (count, on_tick) = counter();
        let handle = start_countdown(10, on_tick, || {});
        sleep(Duration::from_millis(1500)).await;
        drop(handle);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_expiry_reports_inactive() {
        let (tx, rx) = oneshot::channel();
        let mut handle = start_countdown(1, |_| {}, move || {
            let _ = tx.send(());
        });
        rx.await.unwrap();
        assert!(!handle.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn study_timer_start_is_idempotent() {
        let mut timer = StudyTimer::new(1);
        let (count, on_tick) = counter();
        assert!(timer.start(on_tick, || {}));
        assert!(!timer.start(|_| {}, || {}));
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(timer.remaining(), 58);
        assert_eq!(timer.display(), "00:58");
    }

    #[tokio::test(start_paused = true)]
    async fn study_timer_pause_keeps_remaining_and_resumes() {
        let mut timer = StudyTimer::new(1);
        timer.start(|_| {}, || {});
        sleep(Duration::from_millis(5500)).await;
        timer.pause();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 55);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.remaining(), 55);

        assert!(timer.start(|_| {}, || {}));
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(timer.remaining(), 54);
    }

    #[tokio::test(start_paused = true)]
    async fn study_timer_completes_and_requires_reset() {
        let mut timer = StudyTimer::new(1);
        let (tx, rx) = oneshot::channel();
        timer.start(|_| {}, move || {
            let _ = tx.send(());
        });
        rx.await.unwrap();
        assert!(timer.is_finished());
        assert!(!timer.is_running());
        assert_eq!(timer.display(), "00:00");
        assert!(!timer.start(|_| {}, || {}));

        timer.reset(0);
        assert_eq!(timer.duration_minutes(), DEFAULT_STUDY_MINUTES);
        assert_eq!(timer.display(), "25:00");
        assert!(!timer.is_finished());
    }
}
