pub mod radio;
pub mod reconciler;
pub mod spotify;

use std::future::Future;

use color_eyre::eyre::{Result, eyre};
use tokio_util::sync::CancellationToken;

/// Runs `work` unless `cancel` fires first, in which case the in-flight
/// request is dropped.
pub(crate) async fn cancellable<T, E>(
    cancel: &CancellationToken,
    work: impl Future<Output = std::result::Result<T, E>>,
) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(eyre!("Request was cancelled")),
        result = work => Ok(result?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[tokio::test]
    async fn test_cancellable_passes_through_result() {
        let cancel = CancellationToken::new();
        let value = cancellable(&cancel, async { Ok::<_, Boom>(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = cancellable(&cancel, async { Err::<u8, _>(Boom) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_cancellable_stops_pending_work() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let work = std::future::pending::<std::result::Result<(), Boom>>();
        let result = cancellable(&cancel, work).await;
        assert!(result.unwrap_err().to_string().contains("cancelled"));
    }
}
