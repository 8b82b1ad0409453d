use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Timer registry keyed by `K`, delivering `E` events to one receiver
///
/// At most one timer is armed per key: arming a key again replaces the
/// previous timer. All tasks are aborted when the scheduler is dropped.
pub struct Scheduler<K, E> {
    tx: mpsc::UnboundedSender<E>,
    timers: HashMap<K, JoinHandle<()>>,
}

impl<K, E> Scheduler<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Clone + Send + 'static,
{
    /// Create a scheduler and the receiver its events arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                timers: HashMap::new(),
            },
            rx,
        )
    }

    /// Deliver `event` every `period`, first one `period` from now
    ///
    /// A zero period is raised to one millisecond.
    pub fn every(&mut self, key: K, period: Duration, event: E) {
        let period = if period.is_zero() {
            log::warn!("Zero period for timer {:?}, using 1ms", key);
            MIN_PERIOD
        } else {
            period
        };
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(event.clone()).is_err() {
                    break;
                }
            }
        });
        self.arm(key, handle);
    }

    /// Deliver `event` once after `delay`
    pub fn once(&mut self, key: K, delay: Duration, event: E) {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(event);
        });
        self.arm(key, handle);
    }

    fn arm(&mut self, key: K, handle: JoinHandle<()>) {
        if let Some(previous) = self.timers.insert(key.clone(), handle) {
            log::trace!("Replacing timer {:?}", key);
            previous.abort();
        }
    }

    /// Cancel the timer for `key`; returns whether one was armed
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.timers.remove(key) {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                was_running
            }
            None => false,
        }
    }

    /// Whether a timer for `key` is still pending
    pub fn is_armed(&self, key: &K) -> bool {
        self.timers
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Number of timers still pending
    pub fn armed(&self) -> usize {
        self.timers.values().filter(|h| !h.is_finished()).count()
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

impl<K, E> Drop for Scheduler<K, E> {
    fn drop(&mut self) {
        for handle in self.timers.values() {
            handle.abort();
        }
    }
}
