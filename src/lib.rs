pub mod config;
pub mod db;
pub mod error;
pub mod server;
pub mod service;
pub mod sheets;
pub mod telegram;
mod utils;

pub use error::FnotifierError;
pub use server::router::{FnotifierState, fnotifier_router};
