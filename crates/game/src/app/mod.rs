pub(crate) mod bootstrap;
mod console_engine;
pub(crate) mod loop_runner;
mod setup;
