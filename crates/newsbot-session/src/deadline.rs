//! Bounded waits on service calls.

use std::future::Future;
use std::time::Duration;

use newsbot_client::ClientError;

/// Await `fut`, turning expiry of `timeout` into [`ClientError::Timeout`].
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout(timeout)),
    }
}
