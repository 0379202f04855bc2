//! Native (tokio) host adapter for `zonestream-core`: a hyper-backed
//! [`transport::HyperTransport`], the [`autoplay::AutoplayDriver`] interval
//! timer, and the axum preview server in [`server`].

pub mod autoplay;
pub mod server;
pub mod transport;
