//! Cancellation for in-flight pricing requests.
//!
//! A host keeps the [`CancelHandle`] and passes the [`CancelSignal`] into
//! [`quote_cancellable`]. Cancelling (or dropping the handle without
//! cancelling) never blocks.

use tokio::sync::watch;

use super::{PricingRequest, PricingService, ServiceError};
use crate::models::Pounds;

/// Fires the paired [`CancelSignal`].
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Resolves once cancelled. Pends forever if the handle is dropped first.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Runs `service.quote`, resolving to [`ServiceError::Cancelled`] as soon as
/// `signal` fires.
pub async fn quote_cancellable<S>(
    service: &S,
    request: &PricingRequest,
    mut signal: CancelSignal,
) -> Result<Pounds, ServiceError>
where
    S: PricingService + ?Sized,
{
    tokio::select! {
        biased;
        _ = signal.cancelled() => {
            tracing::info!(ticket = request.ticket, "pricing request cancelled");
            Err(ServiceError::Cancelled)
        }
        result = service.quote(request) => result,
    }
}
