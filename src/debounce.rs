//! Trailing-edge debounce around an async function.
//!
//! Every call restarts the timer. When the timer finally elapses the wrapped
//! function runs once with the arguments of the last call, and every caller
//! still waiting (including superseded ones) receives a clone of its output.
//! An invocation that has already started is never cancelled. Each timer is
//! stamped with a generation, so a timer racing a newer call on another
//! worker thread stands down instead of stealing its waiters.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

type Job<A, T> = Arc<dyn Fn(A) -> BoxFuture<'static, T> + Send + Sync>;

struct Pending<A, T> {
    // Bumped on every call; a timer only fires if it still holds the latest.
    generation: u64,
    timer: Option<JoinHandle<()>>,
    args: Option<A>,
    waiters: Vec<oneshot::Sender<T>>,
}

impl<A, T> Pending<A, T> {
    /// Claim the scheduled firing, leaving nothing pending.
    fn take(&mut self) -> Option<(A, Vec<oneshot::Sender<T>>)> {
        self.timer = None;
        let args = self.args.take()?;
        Some((args, std::mem::take(&mut self.waiters)))
    }
}

fn lock<A, T>(pending: &Mutex<Pending<A, T>>) -> MutexGuard<'_, Pending<A, T>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn fire<A, T: Clone>(job: Job<A, T>, args: A, waiters: Vec<oneshot::Sender<T>>) {
    let output = job(args).await;
    for waiter in waiters {
        let _ = waiter.send(output.clone());
    }
}

pub struct Debouncer<A, T> {
    delay: Duration,
    job: Job<A, T>,
    pending: Arc<Mutex<Pending<A, T>>>,
}

impl<A, T> Debouncer<A, T>
where
    A: Send + 'static,
    T: Clone + Send + 'static,
{
    pub fn new<F, Fut>(delay: Duration, f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let job: Job<A, T> = Arc::new(move |args| -> BoxFuture<'static, T> { Box::pin(f(args)) });
        Self {
            delay,
            job,
            pending: Arc::new(Mutex::new(Pending {
                generation: 0,
                timer: None,
                args: None,
                waiters: Vec::new(),
            })),
        }
    }

    /// Schedule `args`, discarding whatever call was still waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call(&self, args: A) -> Debounced<T> {
        let (tx, rx) = oneshot::channel();

        let mut pending = lock(&self.pending);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.generation += 1;
        pending.args = Some(args);
        pending.waiters.push(tx);

        let generation = pending.generation;
        let job = self.job.clone();
        let shared = self.pending.clone();
        let delay = self.delay;
        pending.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // A timer that woke after a newer call leaves the firing to it.
            let claimed = {
                let mut pending = lock(&shared);
                if pending.generation != generation {
                    return;
                }
                pending.take()
            };

            if let Some((args, waiters)) = claimed {
                fire(job, args, waiters).await;
            }
        }));

        Debounced { rx }
    }

    /// Run the pending call now instead of waiting out the delay.
    ///
    /// Returns false when nothing was pending.
    pub async fn flush(&self) -> bool {
        let claimed = {
            let mut pending = lock(&self.pending);
            if let Some(timer) = pending.timer.take() {
                timer.abort();
            }
            pending.generation += 1;
            pending.take()
        };

        match claimed {
            Some((args, waiters)) => {
                fire(self.job.clone(), args, waiters).await;
                true
            }
            None => false,
        }
    }
}

/// Result of one [`Debouncer::call`].
///
/// Resolves to `None` only if the firing task was torn down before
/// delivering, e.g. on runtime shutdown.
pub struct Debounced<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Future for Debounced<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}
