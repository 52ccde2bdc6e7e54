//! Defintion and implementations of the [Executor] trait.

use futures::future::BoxFuture;
use tokio::runtime::Handle;

/// Decides where, and when, the unit of work of a started command runs.
pub trait Executor: Send + Sync {
    fn execute(&self, task: BoxFuture<'static, ()>);
}

/// Runs the task to completion on the calling thread.
///
/// Must not be used from within an asynchronous context, since blocking on a future from inside
/// a runtime worker may stall the whole runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Executor for Immediate {
    fn execute(&self, task: BoxFuture<'static, ()>) {
        futures::executor::block_on(task)
    }
}

/// Spawns the task onto a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    pub handle: Handle,
}

impl TokioExecutor {
    /// Returns an executor bound to the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics if called outside the context of a tokio runtime.
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }
}

impl From<Handle> for TokioExecutor {
    fn from(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: BoxFuture<'static, ()>) {
        // the join handle is not needed: the outcome travels through the completion handler.
        drop(self.handle.spawn(task));
    }
}

#[cfg(test)]
mod test {
    use super::{Executor, Immediate, TokioExecutor};
    use futures::FutureExt;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };
    use tokio::sync::oneshot;

    #[test]
    fn immediate_runs_before_returning() {
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();

        Immediate.execute(async move { flag.store(true, Ordering::SeqCst) }.boxed());
        assert!(done.load(Ordering::SeqCst), "task did not run on the caller");
    }

    #[tokio::test]
    async fn tokio_executor_spawns_onto_the_runtime() {
        let (tx, rx) = oneshot::channel();

        TokioExecutor::current().execute(
            async move {
                tx.send(std::thread::current().id()).unwrap();
            }
            .boxed(),
        );

        assert!(rx.await.is_ok(), "spawned task never ran");
    }
}
