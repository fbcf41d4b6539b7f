use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;

/// Trait for backends the benchmark can drive.
pub trait UpdateTarget: Send + Sync {
    fn name(&self) -> &'static str;

    /// Open a per-worker session. Whatever preparation the backend needs
    /// (connection checkout, statement preparation) happens here; a failure
    /// here is fatal to the run.
    fn start_session<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn UpdateSession>>> + Send + 'a>>;
}

/// One worker's handle for issuing updates.
pub trait UpdateSession: Send {
    /// Execute a single update round-trip against the shared row.
    fn execute_update<'a>(&'a mut self)
        -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Mock target for testing (always succeeds after a fixed delay)
pub struct MockUpdateTarget {
    delay: Duration,
}

impl MockUpdateTarget {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl UpdateTarget for MockUpdateTarget {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn start_session<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn UpdateSession>>> + Send + 'a>> {
        Box::pin(async move {
            Ok(Box::new(MockUpdateSession { delay: self.delay }) as Box<dyn UpdateSession>)
        })
    }
}

struct MockUpdateSession {
    delay: Duration,
}

impl UpdateSession for MockUpdateSession {
    fn execute_update<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            sleep(self.delay).await;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_target_session_executes() {
        let target = MockUpdateTarget::new(Duration::from_millis(1));
        assert_eq!(target.name(), "mock");

        let mut session = target.start_session().await.unwrap();
        session.execute_update().await.unwrap();
        session.execute_update().await.unwrap();
    }
}
