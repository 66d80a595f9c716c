//! Single-threaded executor for futures that must run on the UI thread

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

/// Handle to the result of a spawned future
///
/// Awaiting resolves to `None` if the future was dropped before completing.
#[must_use = "dropping a Task discards its result"]
pub struct Task<R> {
    receiver: oneshot::Receiver<R>,
}

impl<R> Task<R> {
    pub(crate) fn from_receiver(receiver: oneshot::Receiver<R>) -> Self {
        Self { receiver }
    }

    /// An already completed task
    pub fn ready(value: R) -> Self {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(value);
        Self::from_receiver(receiver)
    }

    /// Take the result if the future has completed
    pub fn try_take(&mut self) -> Option<R> {
        self.receiver.try_recv().ok().flatten()
    }
}

impl<R> Future for Task<R> {
    type Output = Option<R>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver).poll(cx).map(Result::ok)
    }
}

impl<R> std::fmt::Debug for Task<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// Yield to the executor once before continuing
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Cooperative executor driven by the event loop
pub struct ForegroundExecutor {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    _not_send: PhantomData<Rc<()>>,
}

impl ForegroundExecutor {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: RefCell::new(pool),
            spawner,
            _not_send: PhantomData,
        }
    }

    /// Queue a future; it makes progress only when the executor is polled
    pub fn spawn<R>(&self, future: impl Future<Output = R> + 'static) -> Task<R>
    where
        R: 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let spawned = self.spawner.spawn_local(async move {
            let result = future.await;
            let _ = sender.send(result);
        });
        if let Err(e) = spawned {
            tracing::error!("Foreground spawn failed: {}", e);
        }
        Task::from_receiver(receiver)
    }

    /// Run queued futures until none can make progress
    pub fn run_until_stalled(&self) {
        match self.pool.try_borrow_mut() {
            Ok(mut pool) => pool.run_until_stalled(),
            Err(_) => tracing::warn!("Foreground executor polled re-entrantly, skipping"),
        }
    }
}

impl Default for ForegroundExecutor {
    fn default() -> Self {
        Self::new()
    }
}
