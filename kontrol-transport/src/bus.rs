//! Best-effort event fan-out
//!
//! Each subscriber owns a bounded queue. Publishing never blocks: a full or
//! closed queue just misses that event.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, trace};

use crate::event::Event;

/// Default capacity of a subscriber queue
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Event>,
}

/// Registry of subscriber queues
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new queue of `capacity` events
    pub fn subscribe(&self, capacity: usize) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push(Subscriber { id, tx });
        info!("Event subscriber {} registered (capacity {})", id, capacity);
        rx
    }

    /// Number of live subscriber queues
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .iter()
            .filter(|s| !s.tx.is_closed())
            .count()
    }

    /// Offer `event` to every subscriber without blocking
    ///
    /// Returns how many subscribers accepted it.
    pub fn publish(&self, event: Event) -> usize {
        let mut delivered = 0;
        let mut saw_closed = false;
        {
            let subscribers = self.subscribers.read();
            for sub in subscribers.iter() {
                match sub.tx.try_send(event) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        trace!("Subscriber {} full, dropping {}", sub.id, event);
                    }
                    Err(TrySendError::Closed(_)) => saw_closed = true,
                }
            }
        }

        // Pruning is opportunistic; a contended lock just defers it
        if saw_closed {
            if let Some(mut subscribers) = self.subscribers.try_write() {
                subscribers.retain(|s| {
                    let open = !s.tx.is_closed();
                    if !open {
                        debug!("Event subscriber {} closed, removing", s.id);
                    }
                    open
                });
            }
        }

        delivered
    }

    /// Run `handler` for every event passing `filter`
    ///
    /// Spawns a dedicated consumer thread; the handler runs on it, so a slow
    /// handler only delays its own queue. The thread ends when the bus is
    /// dropped.
    pub fn add_callback<F, H>(&self, capacity: usize, filter: F, mut handler: H)
    where
        F: Fn(&Event) -> bool + Send + 'static,
        H: FnMut(Event) + Send + 'static,
    {
        let mut rx = self.subscribe(capacity);
        std::thread::Builder::new()
            .name("f1-event-callback".into())
            .spawn(move || {
                while let Some(event) = rx.blocking_recv() {
                    if filter(&event) {
                        handler(event);
                    }
                }
                debug!("Event callback consumer exiting");
            })
            .expect("Failed to spawn event callback thread");
    }

    /// Drop every subscriber, ending their queues
    pub fn clear(&self) {
        self.subscribers.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlId;
    use crate::event::{is_control, Event};
    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;

    #[test]
    fn test_fan_out() {
        let bus = EventBus::new();
        let mut a = bus.subscribe(4);
        let mut b = bus.subscribe(4);

        assert_eq!(bus.publish(Event::pressed(ControlId::PadA1)), 2);
        assert_eq!(a.try_recv().unwrap(), Event::pressed(ControlId::PadA1));
        assert_eq!(b.try_recv().unwrap(), Event::pressed(ControlId::PadA1));
    }

    #[test]
    fn test_full_subscriber_misses_event() {
        let bus = EventBus::new();
        let mut slow = bus.subscribe(1);
        let mut fast = bus.subscribe(8);

        bus.publish(Event::pressed(ControlId::PadA1));
        // slow is now full; this must neither block nor fail for fast
        assert_eq!(bus.publish(Event::released(ControlId::PadA1)), 1);

        assert_eq!(slow.try_recv().unwrap(), Event::pressed(ControlId::PadA1));
        assert!(slow.try_recv().is_err());
        assert_eq!(fast.try_recv().unwrap(), Event::pressed(ControlId::PadA1));
        assert_eq!(fast.try_recv().unwrap(), Event::released(ControlId::PadA1));
    }

    #[test]
    fn test_closed_subscriber_pruned() {
        let bus = EventBus::new();
        let rx = bus.subscribe(2);
        let _keep = bus.subscribe(2);
        drop(rx);

        assert_eq!(bus.publish(Event::pressed(ControlId::Sync)), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(bus.subscribers.read().len(), 1);
    }

    #[test]
    fn test_callback_filters() {
        let bus = EventBus::new();
        let (tx, rx) = std_mpsc::channel();
        bus.add_callback(8, is_control(ControlId::Mute1), move |e| {
            let _ = tx.send(e);
        });

        bus.publish(Event::pressed(ControlId::Mute2));
        bus.publish(Event::pressed(ControlId::Mute1));

        let got = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(got, Event::pressed(ControlId::Mute1));
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
