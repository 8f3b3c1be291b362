use std::future::Future;
use std::time::Duration;

use voty_common::{Error, Result};

/// Run `future` for at most `limit`; elapsing becomes `on_elapsed(message)`
pub(crate) async fn within<T, F>(
    limit: Duration,
    what: &str,
    on_elapsed: fn(String) -> Error,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(on_elapsed(format!("{} timed out after {:?}", what, limit))),
    }
}
