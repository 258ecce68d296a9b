//! Status fetch contract between the engine and its network layer.
//!
//! The engine never talks to the network itself: it polls through this
//! trait and treats a [`FetchError`] as "no signal this tick".

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::{Instance, StatusSnapshot};

/// Errors from a single status fetch. Always transient: the engine's
/// checks interpret them, the runner never aborts on one.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("protocol handshake failed: {0}")]
    Handshake(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("response body unreadable: {0}")]
    Body(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Collaborator that obtains the current status snapshot of one instance.
///
/// The convergence engine calls this once per still-active instance per
/// polling iteration.
pub trait StatusSource {
    fn fetch(
        &self,
        instance: &Instance,
    ) -> impl Future<Output = Result<StatusSnapshot, FetchError>> + Send;
}
