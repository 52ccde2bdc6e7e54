//! Defintion and implementations of the [Command] trait.

use crate::error::{Error, Failure, Outcome, Result};
use crate::executor::Executor;
use crate::handler::CompletionHandler;
use async_trait::async_trait;
use futures::future::{AbortHandle, AbortRegistration, Abortable, BoxFuture};
use futures::FutureExt;
use std::fmt::{self, Debug};
use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle states a command goes through.
#[derive(strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Lifecycle {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl Lifecycle {
    /// Returns true if, and only if, no further transition can happen from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Lifecycle::Completed | Lifecycle::Failed | Lifecycle::Cancelled
        )
    }
}

/// Represents a single unit of asynchronous work producing exactly one outcome.
#[async_trait]
pub trait Command<T: Send + 'static>: Sync {
    /// Starts the command, handing the outcome of its work to the given handler once finished.
    fn start<H: CompletionHandler<T>>(&self, handler: H) -> Result<()>;

    /// Cancels the command. Once cancelled, the handler given to start is never invoked.
    fn cancel(&self) -> Result<()>;

    fn state(&self) -> Lifecycle;

    fn id(&self) -> u64;

    /// Starts the command and waits for its outcome.
    async fn execute(&self) -> Result<Outcome<T>> {
        let (tx, rx) = oneshot::channel();
        self.start(move |outcome: Outcome<T>| {
            // nobody to notify if the caller is no longer waiting.
            let _ = tx.send(outcome);
        })?;

        rx.await.map_err(|_| Error::Cancelled { id: self.id() })
    }
}

type Work<T> = Box<dyn FnOnce() -> BoxFuture<'static, Outcome<T>> + Send>;

struct Inner<T> {
    state: Lifecycle,
    work: Option<Work<T>>,
    abort: Option<AbortHandle>,
}

fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    // no user code ever runs while the lock is held, so the state stays consistent.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Moves a running command into the given terminal state, returning false if it was cancelled
/// meanwhile.
fn settle<T>(inner: &Mutex<Inner<T>>, next: Lifecycle) -> bool {
    let mut inner = lock(inner);
    if inner.state != Lifecycle::Running {
        return false;
    }

    inner.state = next;
    inner.abort = None;
    true
}

/// [`Command`] implementation whose work is scheduled by an [`Executor`].
pub struct AsyncCommand<T> {
    id: u64,
    executor: Arc<dyn Executor>,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T: Send + 'static> AsyncCommand<T> {
    /// Returns a new pending command that will perform the given asynchronous work once started.
    pub fn new<X, F, Fut, E>(executor: Arc<X>, work: F) -> Self
    where
        X: Executor + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        E: Into<Failure>,
    {
        let work: Work<T> =
            Box::new(move || async move { work().await.map_err(Into::into) }.boxed());

        Self {
            id: NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed),
            executor,
            inner: Arc::new(Mutex::new(Inner {
                state: Lifecycle::Pending,
                work: Some(work),
                abort: None,
            })),
        }
    }

    /// Returns a new pending command that will call the given function once started.
    pub fn from_fn<X, F, E>(executor: Arc<X>, work: F) -> Self
    where
        X: Executor + 'static,
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        E: Into<Failure> + Send + 'static,
    {
        Self::new(executor, move || futures::future::ready(work()))
    }

    /// Builds the task that runs the work and reports its outcome to the handler.
    fn task<H>(
        &self,
        work: Work<T>,
        registration: AbortRegistration,
        handler: H,
    ) -> BoxFuture<'static, ()>
    where
        H: CompletionHandler<T>,
    {
        let id = self.id;
        let delivery = Delivery {
            id,
            inner: self.inner.clone(),
            handler: Some(handler),
            outcome: PhantomData,
        };

        async move {
            // the work is invoked inside the guarded future, so a panic while building it is
            // caught as well.
            let guarded = AssertUnwindSafe(async move { work().await }).catch_unwind();
            match Abortable::new(guarded, registration).await {
                Ok(Ok(outcome)) => delivery.complete(outcome),
                Ok(Err(payload)) => delivery.complete(Err(Failure::from_panic(payload))),
                Err(_) => debug!(id, "command aborted while running"),
            }
        }
        .boxed()
    }
}

/// Hands the outcome of a running command to its handler.
///
/// If dropped before delivering, e.g. because the executor discarded the task, the command is
/// settled as failed with [`Failure::Abandoned`] unless it was cancelled meanwhile.
struct Delivery<T, H: CompletionHandler<T>> {
    id: u64,
    inner: Arc<Mutex<Inner<T>>>,
    handler: Option<H>,
    outcome: PhantomData<fn(T)>,
}

impl<T, H: CompletionHandler<T>> Delivery<T, H> {
    fn complete(mut self, outcome: Outcome<T>) {
        let id = self.id;
        let Some(handler) = self.handler.take() else {
            return;
        };

        let next = if outcome.is_ok() {
            Lifecycle::Completed
        } else {
            Lifecycle::Failed
        };

        if !settle(&self.inner, next) {
            debug!(id, "command cancelled before completion, dropping outcome");
            return;
        }

        match &outcome {
            Ok(_) => debug!(id, "command completed"),
            Err(reason) => warn!(id, error = reason.to_string(), "command failed"),
        }

        handler.complete(outcome);
    }
}

impl<T, H: CompletionHandler<T>> Drop for Delivery<T, H> {
    fn drop(&mut self) {
        let Some(handler) = self.handler.take() else {
            return;
        };

        if settle(&self.inner, Lifecycle::Failed) {
            warn!(id = self.id, "command dropped by its executor before completion");
            handler.on_error(Failure::Abandoned);
        }
    }
}

impl<T: Send + 'static> Command<T> for AsyncCommand<T> {
    #[instrument(skip(self, handler), fields(id = self.id))]
    fn start<H: CompletionHandler<T>>(&self, handler: H) -> Result<()> {
        let (work, registration) = {
            let mut inner = lock(&self.inner);
            let found = inner.state;
            if found != Lifecycle::Pending {
                warn!(state = found.to_string(), "starting a non-pending command");
                return Error::InvalidState { id: self.id, found }.into();
            }

            let Some(work) = inner.work.take() else {
                error!("pending command with no work to perform");
                return Error::InvalidState { id: self.id, found }.into();
            };

            let (abort, registration) = AbortHandle::new_pair();
            inner.state = Lifecycle::Running;
            inner.abort = Some(abort);
            (work, registration)
        };

        debug!("command started");
        self.executor.execute(self.task(work, registration, handler));
        Ok(())
    }

    #[instrument(skip(self), fields(id = self.id))]
    fn cancel(&self) -> Result<()> {
        let (work, abort) = {
            let mut inner = lock(&self.inner);
            match inner.state {
                Lifecycle::Cancelled => return Ok(()),
                found @ (Lifecycle::Completed | Lifecycle::Failed) => {
                    warn!(state = found.to_string(), "cancelling a finished command");
                    return Error::InvalidState { id: self.id, found }.into();
                }
                Lifecycle::Pending | Lifecycle::Running => {
                    inner.state = Lifecycle::Cancelled;
                    (inner.work.take(), inner.abort.take())
                }
            }
        };

        if let Some(abort) = abort {
            abort.abort();
        }

        drop(work);
        debug!("command cancelled");
        Ok(())
    }

    fn state(&self) -> Lifecycle {
        lock(&self.inner).state
    }

    fn id(&self) -> u64 {
        self.id
    }
}

impl<T> Debug for AsyncCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCommand")
            .field("id", &self.id)
            .field("state", &lock(&self.inner).state)
            .finish()
    }
}
