//! Request throttle for rate-limited downstream APIs.
//!
//! Serializes submitted operations so no two begin less than a configured
//! minimum interval apart. Submission order is preserved, nothing is
//! dropped, and only one operation runs at a time per instance.
//!
//! Instances are constructed explicitly and passed to whatever issues the
//! rate-limited calls; two instances wrapping the same downstream do not
//! coordinate.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Default minimum gap between operation starts.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(2000);

/// A queued operation, type-erased. The closure owns the caller's oneshot
/// sender and delivers the result itself, so the drain loop never sees a
/// per-operation type.
type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

struct ThrottleState {
    queue: VecDeque<Job>,
    /// True while a drain task owns the queue. At most one drain task
    /// exists per instance at any time.
    draining: bool,
    last_start: Option<Instant>,
}

struct ThrottleInner {
    min_interval: Duration,
    state: Mutex<ThrottleState>,
}

/// Serializes async operations with a minimum start-to-start interval.
///
/// `submit` returns a future resolving to exactly the operation's own
/// output; failures pass through untouched and do not affect later
/// queued operations.
#[derive(Clone)]
pub struct RequestThrottle {
    inner: Arc<ThrottleInner>,
}

impl RequestThrottle {
    /// Create a throttle with the given minimum start-to-start interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            inner: Arc::new(ThrottleInner {
                min_interval,
                state: Mutex::new(ThrottleState {
                    queue: VecDeque::new(),
                    draining: false,
                    last_start: None,
                }),
            }),
        }
    }

    /// The configured minimum interval.
    pub fn min_interval(&self) -> Duration {
        self.inner.min_interval
    }

    /// Number of operations waiting in the queue (not counting one in flight).
    pub fn queue_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Enqueue an operation and wait for its result.
    ///
    /// The operation starts once everything submitted before it has
    /// started and the minimum interval since the previous start has
    /// elapsed. There is no cancellation: once submitted, the operation
    /// will run unless the runtime shuts down first.
    pub fn submit<F, Fut, T>(&self, operation: F) -> impl std::future::Future<Output = T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let job: Job = Box::new(move || {
            Box::pin(async move {
                let result = operation().await;
                // Receiver may have been dropped; the operation still ran.
                let _ = tx.send(result);
            })
        });

        let start_drain = {
            let mut state = self.inner.state.lock();
            state.queue.push_back(job);
            if state.draining {
                false
            } else {
                state.draining = true;
                true
            }
        };

        if start_drain {
            tokio::spawn(Self::drain(Arc::clone(&self.inner)));
        }

        async move {
            // The drain loop runs every queued job to completion and each
            // job always sends; a closed channel means the runtime was
            // torn down mid-operation.
            rx.await
                .expect("throttle drain task dropped without running the operation")
        }
    }

    /// Pop and run queued operations until the queue is empty.
    ///
    /// The state lock is only held for queue/flag access, never across an
    /// await point.
    async fn drain(inner: Arc<ThrottleInner>) {
        loop {
            let job = {
                let mut state = inner.state.lock();
                match state.queue.pop_front() {
                    Some(job) => job,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };

            let deadline = {
                let state = inner.state.lock();
                state.last_start.map(|start| start + inner.min_interval)
            };
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if deadline > now {
                    tracing::debug!(
                        wait_ms = (deadline - now).as_millis() as u64,
                        "throttle waiting before next operation"
                    );
                    tokio::time::sleep_until(deadline).await;
                }
            }

            inner.state.lock().last_start = Some(Instant::now());

            job().await;
        }
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("RequestThrottle")
            .field("min_interval", &self.inner.min_interval)
            .field("queued", &state.queue.len())
            .field("draining", &state.draining)
            .finish()
    }
}
