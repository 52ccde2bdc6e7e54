#[macro_use]
extern crate tracing;

pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod handler;
pub mod tracer;

pub use command::{AsyncCommand, Command, Lifecycle};
pub use error::{Error, Failure, Outcome, Result};
pub use executor::{Executor, Immediate, TokioExecutor};
pub use handler::{Callback, CompletionHandler};
