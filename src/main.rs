#[macro_use]
extern crate tracing;

use rcommand::{config, tracer, AsyncCommand, Callback, Command, Failure, TokioExecutor};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::sync::Notify;

const FETCH_LATENCY: Duration = Duration::from_millis(50);

/// Runs a command whose work always succeeds, waiting for its outcome.
async fn run_double(executor: Arc<TokioExecutor>) -> rcommand::Result<()> {
    let input = *config::SCENARIO_INPUT;
    let command = AsyncCommand::from_fn(executor, move || {
        input.checked_mul(2).ok_or("integer overflow")
    });

    let outcome = command.execute().await.map_err(|err| {
        error!(id = command.id(), error = err.to_string(), "executing double command");
        err
    })?;

    match outcome {
        Ok(value) => info!(id = command.id(), input, value, "double command completed"),
        Err(reason) => error!(
            id = command.id(),
            error = reason.to_string(),
            "double command failed"
        ),
    }

    Ok(())
}

/// Runs a command whose work always fails, handling each branch with its own closure.
async fn run_fetch(executor: Arc<TokioExecutor>) -> rcommand::Result<()> {
    let command = AsyncCommand::new(executor, || async {
        tokio::time::sleep(FETCH_LATENCY).await;
        Err::<String, _>("network unavailable")
    });

    let done = Arc::new(Notify::new());
    let on_result = {
        let done = done.clone();
        move |body: String| {
            info!(length = body.len(), "fetch command completed");
            done.notify_one();
        }
    };

    let on_error = {
        let done = done.clone();
        move |reason: Failure| {
            warn!(error = reason.to_string(), "fetch command failed");
            done.notify_one();
        }
    };

    command
        .start(Callback::new(on_result, on_error))
        .map_err(|err| {
            error!(id = command.id(), error = err.to_string(), "starting fetch command");
            err
        })?;
    done.notified().await;

    info!(id = command.id(), state = command.state().to_string(), "fetch command settled");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let dotenv = dotenv::dotenv();
    tracer::init()?;

    if let Err(err) = dotenv {
        warn!(error = err.to_string(), "processing dotenv file");
    }

    let runtime = Builder::new_multi_thread()
        .worker_threads(*config::COMMAND_WORKERS)
        .enable_all()
        .build()?;

    info!(workers = *config::COMMAND_WORKERS, "runtime ready to run commands");

    runtime.block_on(async {
        let executor = Arc::new(TokioExecutor::current());
        // a usage error in one scenario must not prevent the other from running.
        let double = run_double(executor.clone()).await;
        let fetch = run_fetch(executor).await;
        double.and(fetch)
    })?;

    Ok(())
}
