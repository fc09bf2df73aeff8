#[macro_use]
extern crate tracing;

use std::sync::Arc;

use axum::extract::FromRef;

pub mod api;
pub mod config;
mod error;
pub mod geo;
mod middleware;
pub mod resolve;
pub mod trace;
pub mod util;

pub use config::Config;
pub use error::Error;
pub use resolve::Resolver;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
}
