//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap node calls with a deadline
//! - Cancel the in-flight request cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other transport errors
//! - Expired calls map to 504 Gateway Timeout at the API

use std::future::Future;
use std::time::Duration;

use crate::rpc::types::{RpcError, RpcResult};

/// Run `fut` with a deadline, mapping expiry to [`RpcError::Timeout`].
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> RpcResult<T>
where
    F: Future<Output = RpcResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(RpcError::Timeout(deadline.as_secs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, RpcError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: RpcResult<()> = with_deadline(Duration::from_secs(1), async {
            Err(RpcError::Transport("refused".into()))
        })
        .await;
        assert_eq!(result, Err(RpcError::Transport("refused".into())));
    }

    #[tokio::test]
    async fn test_expiry_is_timeout() {
        let result: RpcResult<()> = with_deadline(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(RpcError::Timeout(0)));
    }
}
