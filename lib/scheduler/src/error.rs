//! Error taxonomy shared by the scheduler, the kernels and the driver.
//!
//! `ConfigError` and `BindingError` are reported before any worker thread is
//! created and abort the process. `ResourceError` and `StateError` are fatal
//! invariant breaches discovered once the harness is already running.
//! `RuntimeWarning` is non-fatal and is only ever logged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("binding error: {0}")]
    Binding(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("internal state error: {0}")]
    State(String),
}

impl HarnessError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn binding(msg: impl Into<String>) -> Self {
        Self::Binding(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }
}
