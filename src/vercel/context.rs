//! Call context
//!
//! Carries the cooperative cancellation signal and optional deadline for a
//! single client call. Every request checks the context before touching the
//! network and races the in-flight exchange against it.

use super::error::Error;
use futures::future::select_all;
use std::future::pending;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// Cancellation and deadline for one logical operation (including chained calls)
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    /// One signal per `with_cancel` in the derivation chain; any of them cancels
    cancel: Vec<watch::Receiver<bool>>,
}

/// Cancels the [`Context`] returned alongside it and every context derived from that one
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Bound the context by an absolute deadline. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Bound the context by a timeout measured from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context with its own cancellation signal, returning the handle that triggers it.
    ///
    /// Signals attached earlier still cancel the derived context; the new
    /// handle does not cancel the context it was derived from.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel.push(rx);
        (self, CancelHandle { tx })
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the error the context is already in, if any
    pub fn err(&self) -> Option<Error> {
        if self.cancel.iter().any(|rx| *rx.borrow()) {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    ///
    /// Never resolves for a background context.
    pub async fn done(&self) -> Error {
        let signals: Vec<_> = self
            .cancel
            .iter()
            .map(|rx| {
                let mut rx = rx.clone();
                Box::pin(async move {
                    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                    // A dropped handle can no longer cancel.
                    if closed {
                        pending::<()>().await;
                    }
                })
            })
            .collect();
        let cancelled = async {
            if signals.is_empty() {
                pending::<()>().await;
            } else {
                select_all(signals).await;
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Error::Cancelled,
            _ = expired => Error::DeadlineExceeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_never_done() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_cancel_is_visible_immediately() {
        let (ctx, handle) = Context::background().with_cancel();
        assert!(ctx.err().is_none());

        handle.cancel();
        assert!(matches!(ctx.err(), Some(Error::Cancelled)));

        // Clones share the signal
        let cloned = ctx.clone();
        assert!(matches!(cloned.err(), Some(Error::Cancelled)));
    }

    #[test]
    fn test_derived_context_keeps_parent_signal() {
        let (parent, parent_handle) = Context::background().with_cancel();
        let (child, child_handle) = parent.clone().with_cancel();

        child_handle.cancel();
        assert!(matches!(child.err(), Some(Error::Cancelled)));
        assert!(parent.err().is_none());

        let (other_child, _handle) = parent.clone().with_cancel();
        parent_handle.cancel();
        assert!(matches!(parent.err(), Some(Error::Cancelled)));
        assert!(matches!(other_child.err(), Some(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_done_resolves_on_parent_cancel() {
        let (parent, parent_handle) = Context::background().with_cancel();
        let (child, _child_handle) = parent.with_cancel();
        let waiter = tokio::spawn(async move { child.done().await });

        parent_handle.cancel();
        assert!(matches!(waiter.await.unwrap(), Error::Cancelled));
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = Context::background()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_expired_deadline_reports_error() {
        let ctx = Context::background().with_timeout(Duration::ZERO);
        assert!(matches!(ctx.err(), Some(Error::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_done_resolves_on_cancel() {
        let (ctx, handle) = Context::background().with_cancel();
        let waiter = tokio::spawn(async move { ctx.done().await });

        handle.cancel();
        let err = waiter.await.unwrap();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_done_resolves_on_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        let err = tokio_test::block_on(ctx.done());
        assert!(matches!(err, Error::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let (ctx, handle) = Context::background().with_cancel();
        drop(handle);

        let ctx = ctx.with_timeout(Duration::from_millis(20));
        assert!(matches!(ctx.done().await, Error::DeadlineExceeded));
    }
}
