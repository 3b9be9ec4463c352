//! Runs refresh actions off the UI loop and reports back when they settle.
//!
//! The action runs in its own task so that a panic inside it still produces
//! a settlement message; the controller must never stay wedged in its
//! refreshing phase.  There is no timeout and no cancellation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::gesture::{RefreshAction, RefreshTicket};

/// Sent once per spawned refresh.
#[derive(Debug)]
pub struct RefreshUpdate<T> {
    pub ticket: RefreshTicket,
    pub result: anyhow::Result<T>,
    pub elapsed: Duration,
}

pub fn spawn_refresh<A>(
    tx: mpsc::UnboundedSender<RefreshUpdate<A::Output>>,
    ticket: RefreshTicket,
    action: Arc<A>,
) -> JoinHandle<()>
where
    A: RefreshAction + ?Sized,
{
    tokio::spawn(async move {
        let started = Instant::now();
        tracing::debug!(?ticket, "refresh started");

        // Called inside the inner task: a panic while building the future
        // settles as an error too.
        let result = match tokio::spawn(async move { action.refresh().await }).await {
            Ok(result) => result,
            Err(err) if err.is_panic() => Err(anyhow!("refresh task panicked")),
            Err(err) => Err(anyhow!("refresh task aborted: {err}")),
        };
        let elapsed = started.elapsed();
        tracing::debug!(?ticket, ok = result.is_ok(), ?elapsed, "refresh settled");

        if tx
            .send(RefreshUpdate {
                ticket,
                result,
                elapsed,
            })
            .is_err()
        {
            tracing::debug!("refresh finished after the UI loop exited");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gesture::{PullConfig, PullController};
    use crate::core::surface::{Bounds, ScrollRegion, ScrollRegions};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ticket() -> (PullController, RefreshTicket) {
        let mut host = ScrollRegions::new();
        let root = host.add_root(ScrollRegion::new("root", Bounds::new(0.0, 0.0, 10.0, 10.0)));
        let mut ctl = PullController::new(PullConfig::default()).unwrap();
        ctl.attach(&mut host, root).unwrap();
        let t = ctl.trigger().unwrap();
        (ctl, t)
    }

    #[tokio::test]
    async fn success_is_delivered_and_settles() {
        let (mut ctl, t) = ticket();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let action = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>(42u32) }
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_refresh(tx, t, action).await.unwrap();
        let update = rx.recv().await.unwrap();

        assert_eq!(update.ticket, t);
        assert_eq!(update.result.as_ref().unwrap(), &42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(ctl.settle(update.ticket, &update.result));
        assert!(!ctl.state().is_refreshing);
    }

    #[tokio::test]
    async fn failure_is_delivered() {
        let (mut ctl, t) = ticket();
        let action = Arc::new(|| async { Err::<(), _>(anyhow!("offline")) });

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_refresh(tx, t, action);
        let update = rx.recv().await.unwrap();

        assert_eq!(update.result.unwrap_err().to_string(), "offline");
        assert!(ctl.settle(update.ticket, &Ok(())));
    }

    #[tokio::test]
    async fn panic_still_settles() {
        let (mut ctl, t) = ticket();
        let action = Arc::new(|| async {
            if true {
                panic!("boom");
            }
            Ok::<(), anyhow::Error>(())
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_refresh(tx, t, action);
        let update = rx.recv().await.unwrap();

        assert!(update.result.is_err());
        assert!(ctl.settle(update.ticket, &update.result));
        assert!(!ctl.state().is_refreshing);
    }

    #[tokio::test]
    async fn panic_before_future_still_settles() {
        let (mut ctl, t) = ticket();
        let action = Arc::new(|| -> std::future::Ready<anyhow::Result<()>> {
            panic!("exploded while building the request")
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_refresh(tx, t, action);
        let update = rx.recv().await.unwrap();

        assert!(update.result.is_err());
        assert!(ctl.settle(update.ticket, &update.result));
        assert!(!ctl.state().is_refreshing);
    }
}
