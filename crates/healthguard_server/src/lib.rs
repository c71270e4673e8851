//! HealthGuard server: a newline-delimited JSON protocol over TCP in front of
//! the health store and the recommendation engine.
//!
//! # Modules
//!
//! - [`protocol`]: request and response envelopes
//! - [`dispatch`]: action routing
//! - [`server`]: listener and per-connection loop
//! - [`store`]: persistence trait and the in-memory store
//! - [`domains`]: payload decoding and validation
//! - [`seed`]: demo account generation

pub mod config;
pub mod dispatch;
pub mod domains;
pub mod error;
pub mod protocol;
pub mod seed;
pub mod server;
pub mod store;
pub mod types;

mod test_utils;

pub use config::ServerConfig;
pub use dispatch::{Action, Dispatcher};
pub use error::{ServerError, ServerResult};
pub use protocol::{Request, Response, Status};
pub use seed::seed_demo_data;
pub use server::{handle_connection, serve};
pub use store::{HealthStore, MemoryStore};
