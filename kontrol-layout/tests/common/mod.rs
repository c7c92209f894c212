//! In-memory surface shared by the layout integration tests

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kontrol_layout::Surface;
use kontrol_transport::{
    ColorMap, ControlId, DeviceError, Event, EventBus, EventKind, TransportError,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Surface backed by an [`EventBus`] that records every color write
pub struct FakeSurface {
    pub bus: EventBus,
    writes: Mutex<Vec<ColorMap>>,
    fail_writes: AtomicBool,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            bus: EventBus::new(),
            writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        })
    }

    pub fn press(&self, control: ControlId) {
        self.bus.publish(Event::pressed(control));
    }

    pub fn release(&self, control: ControlId) {
        self.bus.publish(Event::released(control));
    }

    pub fn turn(&self, control: ControlId, kind: EventKind, value: i16) {
        self.bus.publish(Event::new(control, kind, value));
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<ColorMap> {
        self.writes.lock().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }

    /// Every control that was ever written
    pub fn written_controls(&self) -> BTreeSet<ControlId> {
        self.writes
            .lock()
            .iter()
            .flat_map(|w| w.controls().collect::<Vec<_>>())
            .collect()
    }

    /// Latest written color per control
    pub fn current(&self) -> ColorMap {
        let mut out = ColorMap::new();
        for w in self.writes.lock().iter() {
            out.apply_from(w);
        }
        out
    }
}

impl Surface for FakeSurface {
    fn subscribe(&self, capacity: usize) -> mpsc::Receiver<Event> {
        self.bus.subscribe(capacity)
    }

    fn write_colors(&self, colors: &ColorMap) -> Result<(), DeviceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DeviceError::Transport {
                op: "set colors",
                source: TransportError::Disconnected,
            });
        }
        self.writes.lock().push(colors.clone());
        Ok(())
    }

    fn name(&self) -> String {
        "fake".to_string()
    }
}

/// Let spawned tasks process what was just published
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
