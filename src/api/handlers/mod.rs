//! Route handlers and the helpers they share.

pub mod feedback;
pub mod health;
pub mod login;
pub mod pages;
pub mod signup;
pub mod sitemap;
pub mod upcoming;

use crate::store::StoreError;
use tracing::error;

/// Run blocking store work (file I/O, Argon2) off the async workers.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(e) => {
            error!("Blocking store task failed: {e}");
            Err(StoreError::Task(e.to_string()))
        }
    }
}
