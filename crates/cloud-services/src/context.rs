//! Cancellation context for provider calls.
//!
//! Every provider call a service makes goes through [`Context::run`]. When
//! the context is cancelled the in-flight call is dropped and the service
//! returns [`ServiceError::Cancelled`].

use crate::error::ServiceError;
use std::future::Future;
use tokio::sync::watch;

/// Caller-owned cancellation signal
#[derive(Debug, Clone)]
pub struct Context {
    cancelled: Option<watch::Receiver<bool>>,
}

/// Cancels every [`Context`] cloned from the one it was created with
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled
    pub fn background() -> Self {
        Self { cancelled: None }
    }

    /// A context plus the handle that cancels it
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        (
            Self {
                cancelled: Some(receiver),
            },
            CancelHandle { sender },
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Run `fut` unless the context is (or becomes) cancelled first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = T>,
    {
        let Some(receiver) = &self.cancelled else {
            return Ok(fut.await);
        };
        if *receiver.borrow() {
            return Err(ServiceError::Cancelled);
        }

        let mut receiver = receiver.clone();
        tokio::select! {
            biased;
            _ = wait_cancelled(&mut receiver) => Err(ServiceError::Cancelled),
            out = fut => Ok(out),
        }
    }
}

async fn wait_cancelled(receiver: &mut watch::Receiver<bool>) {
    // A dropped handle can no longer cancel; wait forever in that case
    if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
