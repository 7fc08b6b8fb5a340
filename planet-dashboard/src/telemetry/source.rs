use async_trait::async_trait;

use crate::error::TelemetryResult;

/// Where a poller gets its data from.
///
/// One call is one poll cycle. Implementations must not retry on their own;
/// the poll interval is the retry.
#[async_trait]
pub trait TelemetrySource<P, T>: Send + Sync {
    async fn fetch(&self, params: P) -> TelemetryResult<T>;
}
