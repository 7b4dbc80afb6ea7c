//! Infrastructure layer - External service implementations

pub mod fetchers;
pub mod http_client;
pub mod llm;
pub mod logging;
pub mod metrics;
pub mod services;
pub mod storage;
