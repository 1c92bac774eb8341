//! # jwks-mock-core
//!
//! Shared configuration types for the jwks-mock service.
//!
//! Configuration is assembled in three layers, later layers winning:
//!
//! 1. Built-in defaults (`0.0.0.0:3000`, issuer `http://localhost:3000`,
//!    audience `dev-api`, keys `key-1` and `key-2`)
//! 2. An optional YAML file
//! 3. Environment variables (`PORT`, `HOST`, `JWT_ISSUER`, `JWT_AUDIENCE`,
//!    `KEY_IDS`, `KEY_COUNT`, `LOG_LEVEL`)

pub mod config;
pub mod error;

pub use config::{AppConfig, InitialKeysConfig, JwtConfig, LoggingConfig, ServerConfig};
pub use error::ConfigError;
