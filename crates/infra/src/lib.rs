//! Infrastructure layer: configuration, Postgres wiring and store adapters.

pub mod config;
pub mod db;
pub mod directory;
pub mod memory;
pub mod postgres;
pub mod seed;

pub use config::{AppConfig, ConfigError};
pub use directory::{Directory, NewUser, RoleRecord, UserRecord};
pub use memory::{InMemorySessionLog, InMemoryUserStore};
pub use postgres::{PostgresSessionLog, PostgresUserStore};
pub use seed::{SeedError, SeedOutcome, seed_defaults};
