/// Database configuration and connection management
pub mod database;

/// Initial member seeding from config.toml
pub mod members;
