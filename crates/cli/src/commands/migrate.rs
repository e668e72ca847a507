//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! farmlink-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `FARMLINK_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string

use tracing::info;

/// Run database migrations from `crates/api/migrations/`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Connecting to database...");
    let pool = super::connect().await?;

    info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}
