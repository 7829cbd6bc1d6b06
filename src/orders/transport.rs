//! Bus transport for billing - a background thread polling the order subscription.

use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, warn};

use super::billing::{BillingHandler, Delivery};
use crate::bus::Subscriber;

/// Statistics from a subscription thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransportStats {
    /// Orders billed.
    pub handled: usize,
    /// Redelivered orders skipped.
    pub duplicates: usize,
    /// Events dropped because they could not be handled.
    pub failed: usize,
    /// Number of poll cycles completed.
    pub polls: usize,
}

/// Handle to a background subscription thread. Drop or call `stop()` to shut down.
pub struct TransportHandle {
    stop_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<TransportStats>>,
}

impl TransportHandle {
    /// Stop the transport and wait for it to finish. Returns stats.
    pub fn stop(mut self) -> TransportStats {
        let _ = self.stop_tx.send(());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => TransportStats::default(),
        }
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

/// Start billing orders from a subscription.
///
/// Spawns a thread that polls `subscriber` and hands each event to
/// `handler`. Handled and duplicate events are acknowledged. Events that
/// cannot be decoded are logged and acknowledged too, since redelivering
/// them would never succeed.
///
/// ## Example
///
/// ```ignore
/// let queue = InMemoryQueue::new();
/// let handler = Arc::new(BillingHandler::new());
/// let handle = orders::subscribe(handler, queue.subscribe(ORDERS_TOPIC), Duration::from_millis(50));
///
/// OrderPublisher::new(queue.clone()).publish_order(&order);
///
/// let stats = handle.stop();
/// ```
pub fn subscribe<S>(
    handler: Arc<BillingHandler>,
    subscriber: S,
    poll_interval: Duration,
) -> TransportHandle
where
    S: Subscriber + 'static,
{
    let (stop_tx, stop_rx) = mpsc::channel();

    let poll_ms = poll_timeout_ms(poll_interval);

    let handle = thread::spawn(move || {
        let mut stats = TransportStats::default();

        loop {
            match stop_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            stats.polls += 1;

            let event = match subscriber.poll(poll_ms) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(err) => {
                    warn!(error = %err, "order subscription poll failed");
                    thread::sleep(poll_interval);
                    continue;
                }
            };

            match handler.handle_event(&event) {
                Ok(Delivery::Processed(_)) => stats.handled += 1,
                Ok(Delivery::Duplicate(_)) => stats.duplicates += 1,
                Err(err) => {
                    error!(event_id = %event.id, error = %err, "dropping order event");
                    stats.failed += 1;
                }
            }

            if let Err(err) = subscriber.ack(&event.id) {
                debug!(event_id = %event.id, error = %err, "ack failed");
            }
        }

        stats
    });

    TransportHandle {
        stop_tx,
        handle: Some(handle),
    }
}

/// Poll timeout in milliseconds, saturating at `u64::MAX`.
fn poll_timeout_ms(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}
