//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod validate;

/// Read the catalog database URL from the environment.
///
/// `MULTIVERSE_DATABASE_URL` takes precedence over `DATABASE_URL`.
fn database_url() -> Result<secrecy::SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    std::env::var("MULTIVERSE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(secrecy::SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}

#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: MULTIVERSE_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;
