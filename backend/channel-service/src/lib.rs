pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pipeline;
pub mod repository;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
pub use repository::Repositories;
pub use services::Services;
