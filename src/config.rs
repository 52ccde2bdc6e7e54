use once_cell::sync::Lazy;
use std::env;

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SERVICE_NAME: &str = "rcommand";
const DEFAULT_SCENARIO_INPUT: i32 = 21;

const ENV_COMMAND_WORKERS: &str = "COMMAND_WORKERS";
const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
const ENV_SERVICE_NAME: &str = "SERVICE_NAME";
const ENV_SCENARIO_INPUT: &str = "SCENARIO_INPUT";

/// Number of worker threads of the runtime commands are spawned onto.
pub static COMMAND_WORKERS: Lazy<usize> = Lazy::new(|| {
    env::var(ENV_COMMAND_WORKERS)
        .ok()
        .and_then(|workers| workers.parse().ok())
        .filter(|workers| *workers > 0)
        .unwrap_or(DEFAULT_WORKERS)
});

pub static LOG_LEVEL: Lazy<String> =
    Lazy::new(|| env::var(ENV_LOG_LEVEL).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()));

pub static SERVICE_NAME: Lazy<String> = Lazy::new(|| {
    env::var(ENV_SERVICE_NAME).unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string())
});

pub static SCENARIO_INPUT: Lazy<i32> = Lazy::new(|| {
    env::var(ENV_SCENARIO_INPUT)
        .ok()
        .and_then(|input| input.parse().ok())
        .unwrap_or(DEFAULT_SCENARIO_INPUT)
});
