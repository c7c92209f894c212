//! Device state holder
//!
//! A [`Device`] owns the transport, the last decoded input snapshot and the
//! last written output state. A dedicated reader thread decodes every input
//! report, diffs it against the retained snapshot and publishes the resulting
//! events on the device's [`EventBus`]. Mutators write through to the hardware
//! synchronously.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::bus::EventBus;
use crate::color::{ColorMap, LedIntensity, Rgb};
use crate::config::DeviceConfig;
use crate::control::ControlId;
use crate::diff::diff;
use crate::discovery::HidDiscovery;
use crate::error::DeviceError;
use crate::event::Event;
use crate::input::{self, InputSnapshot};
use crate::output::{self, OutputState};
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// Input buffer size; reports longer than 22 bytes are truncated by decode
const READ_BUFFER_SIZE: usize = 64;

/// State guarded by the device lock
struct Retained {
    /// `None` until the first report arrives
    input: Option<InputSnapshot>,
    output: OutputState,
}

struct Shared {
    transport: Arc<dyn Transport>,
    state: Mutex<Retained>,
    bus: EventBus,
    shutdown: AtomicBool,
    reading: AtomicBool,
}

/// An opened Kontrol F1
pub struct Device {
    shared: Arc<Shared>,
    reader: Mutex<Option<JoinHandle<()>>>,
    config: DeviceConfig,
}

impl Device {
    /// Open the first attached controller with default settings
    pub fn open() -> Result<Self, DeviceError> {
        Self::open_with(DeviceConfig::default())
    }

    pub fn open_with(config: DeviceConfig) -> Result<Self, DeviceError> {
        let transport = HidDiscovery::new(&config).open_first()?;
        Ok(Self::from_transport(transport, config))
    }

    /// Wrap an already opened transport and start reading from it
    pub fn from_transport(transport: Arc<dyn Transport>, config: DeviceConfig) -> Self {
        let shared = Arc::new(Shared {
            transport,
            state: Mutex::new(Retained {
                input: None,
                output: OutputState::new(),
            }),
            bus: EventBus::new(),
            shutdown: AtomicBool::new(false),
            reading: AtomicBool::new(true),
        });

        // Start from a known dark frame
        let blank = output::encode(&OutputState::new());
        if let Err(e) = shared.transport.write(&blank) {
            warn!("Failed to write initial output report: {}", e);
        }

        let reader_shared = shared.clone();
        let timeout_ms = config.read_timeout_ms;
        let reader = std::thread::Builder::new()
            .name("f1-input-reader".into())
            .spawn(move || run_reader_loop(reader_shared, timeout_ms))
            .expect("Failed to spawn F1 input reader thread");

        info!("{} ready", shared.transport.device_info().display_name());

        Self {
            shared,
            reader: Mutex::new(Some(reader)),
            config,
        }
    }

    pub fn info(&self) -> &TransportDeviceInfo {
        self.shared.transport.device_info()
    }

    pub fn name(&self) -> String {
        self.info().display_name()
    }

    /// Whether the reader thread is still running
    pub fn is_reading(&self) -> bool {
        self.shared.reading.load(Ordering::Acquire)
    }

    /// Latest decoded input, if any report has arrived yet
    pub fn snapshot(&self) -> Option<InputSnapshot> {
        self.shared.state.lock().input
    }

    /// Copy of the output state last written
    pub fn output(&self) -> OutputState {
        self.shared.state.lock().output
    }

    pub fn is_pressed(&self, control: ControlId) -> bool {
        self.snapshot().is_some_and(|s| s.is_pressed(control))
    }

    /// Raw 12-bit reading of a knob or fader
    pub fn analog(&self, control: ControlId) -> Option<u16> {
        self.snapshot().and_then(|s| s.analog(control))
    }

    /// New event queue; events are dropped for it while it is full
    pub fn subscribe(&self, capacity: usize) -> mpsc::Receiver<Event> {
        self.shared.bus.subscribe(capacity)
    }

    /// Invoke `handler` on a dedicated consumer for every event passing `filter`
    pub fn add_callback<F, H>(&self, filter: F, handler: H)
    where
        F: Fn(&Event) -> bool + Send + 'static,
        H: FnMut(Event) + Send + 'static,
    {
        self.shared
            .bus
            .add_callback(self.config.subscriber_capacity, filter, handler);
    }

    /// Log every event at debug level
    pub fn enable_debug_logger(&self) {
        self.add_callback(|_| true, |event| debug!("{}", event));
    }

    /// Mutate a copy of the output state, then commit, encode and write it
    fn write_with<F>(&self, op: &'static str, mutate: F) -> Result<(), DeviceError>
    where
        F: FnOnce(&mut OutputState) -> Result<(), DeviceError>,
    {
        let mut state = self.shared.state.lock();
        let mut next = state.output;
        mutate(&mut next)?;
        state.output = next;

        let report = output::encode(&next);
        self.shared
            .transport
            .write(&report)
            .map_err(DeviceError::transport(op))?;
        Ok(())
    }

    pub fn set_pad_color(&self, pad: ControlId, color: Rgb) -> Result<(), DeviceError> {
        self.write_with("set pad color", |out| out.set_pad_color(pad, color))
    }

    /// Set several pads to one color in a single report
    pub fn set_pad_color_many(&self, pads: &[ControlId], color: Rgb) -> Result<(), DeviceError> {
        self.write_with("set pad color", |out| {
            if let Some(bad) = pads.iter().find(|c| !c.is_pad()) {
                return Err(DeviceError::invalid(*bad, "set pad color"));
            }
            for pad in pads {
                out.set_pad_color(*pad, color)?;
            }
            Ok(())
        })
    }

    pub fn set_pad_color_all(&self, color: Rgb) -> Result<(), DeviceError> {
        self.set_pad_color_many(&ControlId::PADS, color)
    }

    /// Set the LED intensity (0..=127) of a mute or function key
    pub fn set_brightness(&self, control: ControlId, level: u8) -> Result<(), DeviceError> {
        self.write_with("set brightness", |out| {
            out.set_intensity(control, LedIntensity::new(level))
        })
    }

    /// Show a value on the two-digit display; clamped to [-99, 99]
    pub fn set_display(&self, value: i32) -> Result<(), DeviceError> {
        self.write_with("set display", |out| {
            out.set_display(value);
            Ok(())
        })
    }

    /// Apply a color map in a single report
    ///
    /// Pads take the color directly; mute and function keys take the
    /// intensity of the brightest channel.
    pub fn set_colors(&self, colors: &ColorMap) -> Result<(), DeviceError> {
        self.write_with("set colors", |out| out.apply_colors(colors))
    }

    /// Turn every LED off and reset the display
    pub fn blackout(&self) -> Result<(), DeviceError> {
        self.write_with("blackout", |out| {
            *out = OutputState::new();
            Ok(())
        })
    }

    /// Stop the reader thread, end every subscriber queue and release the
    /// transport
    pub fn close(&self) -> Result<(), DeviceError> {
        self.shared.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.reader.lock().take() {
            if handle.join().is_err() {
                error!("F1 input reader thread panicked");
            }
        }
        self.shared.bus.clear();
        info!("Closing {}", self.name());
        self.shared
            .transport
            .close()
            .map_err(DeviceError::transport("close device"))
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
    }
}

fn run_reader_loop(shared: Arc<Shared>, timeout_ms: i32) {
    debug!("F1 input reader thread started");
    let mut buf = [0u8; READ_BUFFER_SIZE];

    while !shared.shutdown.load(Ordering::Acquire) {
        let len = match shared.transport.read(&mut buf, timeout_ms) {
            Ok(0) => continue,
            Ok(len) => len,
            Err(e) => {
                if !shared.shutdown.load(Ordering::Acquire) {
                    error!("F1 input read failed, stopping reader: {}", e);
                }
                break;
            }
        };

        let current = match input::decode(&buf[..len]) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Dropping malformed input report: {}", e);
                continue;
            }
        };

        let previous = shared.state.lock().input;
        let baseline = previous.unwrap_or(InputSnapshot {
            version: current.version,
            dial: current.dial,
            ..Default::default()
        });

        for event in diff(&baseline, &current) {
            shared.bus.publish(event);
        }

        shared.state.lock().input = Some(current);
    }

    shared.reading.store(false, Ordering::Release);
    debug!("F1 input reader thread exiting");
}
