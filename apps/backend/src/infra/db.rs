use std::future::Future;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Strip credentials from a connection URL before it reaches the logs.
pub fn sanitize_db_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}

fn is_sqlite_memory(url: &str) -> bool {
    url.starts_with("sqlite::memory:") || (url.starts_with("sqlite:") && url.contains("mode=memory"))
}

/// Retry a connection attempt with fixed interval delays.
/// Returns the result of the last attempt after all retries are exhausted.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval: Duration,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %e, "database connection failed; retrying");
                tokio::time::sleep(interval).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Connect and bring the schema up to date. Single entrypoint used by the
/// state builder whenever `DATABASE_URL` is configured.
pub async fn bootstrap_db(database_url: &str) -> Result<DatabaseConnection, AppError> {
    let safe_url = sanitize_db_url(database_url);
    info!(url = %safe_url, "connecting to database");

    let mut options = ConnectOptions::new(database_url.to_string());
    options
        .max_connections(10)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if is_sqlite_memory(database_url) {
        // Each pooled connection would otherwise see its own empty database.
        options.max_connections(1).min_connections(1);
    }

    let conn = retry_connection(
        || {
            let options = options.clone();
            async move { Database::connect(options).await.map_err(AppError::from) }
        },
        CONNECT_ATTEMPTS,
        CONNECT_RETRY_INTERVAL,
    )
    .await?;

    migration::migrate_up(&conn)
        .await
        .map_err(|e| AppError::config(format!("migrations failed: {e}")))?;

    info!(url = %safe_url, "database ready");
    Ok(conn)
}
