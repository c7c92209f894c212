//! Flushes that are still writing: deactivate / disconnect wait for them, and
//! they never hold up the runtime

use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kontrol_layout::{HandlerSlot, Layout, MaskPreset, Surface};
use kontrol_transport::{ColorMap, ControlId, DeviceError, Event, EventBus};
use parking_lot::Mutex;
use tokio::sync::mpsc;

type Order = Arc<Mutex<Vec<&'static str>>>;

/// Surface whose first write parks until the test releases it
struct GatedSurface {
    bus: EventBus,
    entered: Mutex<Option<std_mpsc::Sender<()>>>,
    release: Mutex<Option<std_mpsc::Receiver<()>>>,
    order: Order,
    writes: Mutex<usize>,
}

impl GatedSurface {
    /// Returns the surface, the "write entered" signal and the gate release
    fn new(order: Order) -> (Arc<Self>, std_mpsc::Receiver<()>, std_mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = std_mpsc::channel();
        let (release_tx, release_rx) = std_mpsc::channel();
        let surface = Arc::new(Self {
            bus: EventBus::new(),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
            order,
            writes: Mutex::new(0),
        });
        (surface, entered_rx, release_tx)
    }
}

impl Surface for GatedSurface {
    fn subscribe(&self, capacity: usize) -> mpsc::Receiver<Event> {
        self.bus.subscribe(capacity)
    }

    fn write_colors(&self, _colors: &ColorMap) -> Result<(), DeviceError> {
        *self.writes.lock() += 1;
        let gate = self.release.lock().take();
        if let Some(gate) = gate {
            if let Some(entered) = self.entered.lock().take() {
                let _ = entered.send(());
            }
            let _ = gate.recv_timeout(Duration::from_secs(5));
            self.order.lock().push("write-done");
        }
        Ok(())
    }

    fn name(&self) -> String {
        "gated".to_string()
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

/// Start a parked flush, then run `stop` on another thread and check it
/// only returns once the write has finished
fn assert_stop_waits_for_flush<F>(stop: F) -> (tokio::runtime::Runtime, Layout, Arc<GatedSurface>)
where
    F: FnOnce(&Layout) + Send + 'static,
{
    let rt = runtime();
    let order: Order = Arc::new(Mutex::new(Vec::new()));
    let (surface, entered, release) = GatedSurface::new(order.clone());
    let layout = Layout::from_preset(MaskPreset::Mutes);
    {
        let _guard = rt.enter();
        layout.connect(surface.clone()).unwrap();
    }
    layout.activate();

    entered
        .recv_timeout(Duration::from_secs(5))
        .expect("refresh never reached the surface");

    let stopping = layout.clone();
    let stop_order = order.clone();
    let stopper = thread::spawn(move || {
        stop(&stopping);
        stop_order.lock().push("stop-returned");
    });

    thread::sleep(Duration::from_millis(50));
    assert!(order.lock().is_empty(), "stop returned while a write was in flight");

    release.send(()).unwrap();
    stopper.join().unwrap();
    assert_eq!(*order.lock(), vec!["write-done", "stop-returned"]);

    (rt, layout, surface)
}

#[test]
fn deactivate_waits_for_in_flight_flush() {
    let (_rt, layout, surface) = assert_stop_waits_for_flush(|layout| layout.deactivate());

    // nothing more is written once deactivate has returned
    let writes = *surface.writes.lock();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(*surface.writes.lock(), writes);
    assert_eq!(layout.refresh().unwrap(), 0);
}

#[test]
fn disconnect_waits_for_in_flight_flush() {
    let (_rt, layout, _surface) = assert_stop_waits_for_flush(|layout| {
        layout.disconnect().unwrap();
    });
    assert!(!layout.is_connected());
}

async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

#[test]
fn parked_flush_does_not_stall_dispatch() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let order: Order = Arc::new(Mutex::new(Vec::new()));
    let (surface, entered, release) = GatedSurface::new(order.clone());

    rt.block_on(async {
        let layout = Layout::from_preset(MaskPreset::Mutes);
        layout.connect(surface.clone()).unwrap();
        layout.activate();

        let pressed = Arc::new(Mutex::new(Vec::new()));
        let p = pressed.clone();
        layout.set_handler(HandlerSlot::MutePressed, move |_, control| {
            p.lock().push(control)
        });

        wait_for(|| entered.try_recv().is_ok()).await;
        surface.bus.publish(Event::pressed(ControlId::Mute2));
        wait_for(|| !pressed.lock().is_empty()).await;

        // the only runtime thread handled the press while the write was parked
        assert_eq!(*pressed.lock(), vec![ControlId::Mute2]);
        assert!(order.lock().is_empty());

        release.send(()).unwrap();
        layout.disconnect().unwrap();
        assert_eq!(*order.lock(), vec!["write-done"]);
    });
}
