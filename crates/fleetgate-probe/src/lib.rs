//! fleetgate-probe — status fetching for fleet instances.
//!
//! The convergence engine consumes instance status through the
//! [`fleetgate_core::StatusSource`] trait; this crate provides the
//! production implementation, [`HttpStatusSource`], which performs an
//! HTTP/1 GET against each instance's status endpoint.
//!
//! A failed fetch is a [`fleetgate_core::FetchError`], never a panic or
//! an abort: the engine's checks decide what absence of a response means
//! (the unavailable check reads it as "down", the stability checks as
//! "no signal this tick").

pub mod source;

pub use source::HttpStatusSource;
