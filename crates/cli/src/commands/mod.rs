//! CLI command implementations.

pub mod clear;
pub mod migrate;

use secrecy::SecretString;

/// Name of the primary database URL variable.
pub const DATABASE_URL_VAR: &str = "PANTRY_DATABASE_URL";

/// Read the pantry database URL, falling back to `DATABASE_URL`.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
