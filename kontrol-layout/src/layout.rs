//! Layout engine
//!
//! A [`Layout`] owns a [`Mask`] of controls on one [`Surface`]. Connected, it
//! runs two tasks on the current Tokio runtime:
//!
//! - dispatch: routes masked events to the handler slots, tracks press state
//!   and starts one hold watch per press
//! - refresh: at a fixed rate, writes the masked colors that changed since the
//!   last successful flush
//!
//! Handlers run without the layout lock held, so they may call back into the
//! layout freely. Surface writes happen under a separate flush lock, which
//! `deactivate` and `disconnect` take before returning; no write from a layout
//! lands after either call.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use kontrol_transport::{ColorMap, ControlId, Event, EventKind, Rgb};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::handler::{first_only, HandlerSlot, HoldHandler, Phase, ValueHandler};
use crate::mask::{Mask, MaskPreset};
use crate::surface::Surface;

/// One press in progress
struct Press {
    since: Instant,
    /// Dropping or firing this stops the hold watch
    cancel: Option<oneshot::Sender<()>>,
}

impl Press {
    fn cancel_hold(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }
}

enum Link {
    Detached,
    Connected {
        surface: Arc<dyn Surface>,
        tasks: Vec<JoinHandle<()>>,
    },
}

struct LayoutState {
    desired: ColorMap,
    flushed: ColorMap,
    presses: HashMap<ControlId, Press>,
    handlers: HashMap<HandlerSlot, HoldHandler>,
    value_handler: Option<ValueHandler>,
    hold_timers: HashMap<HandlerSlot, Duration>,
    default_hold: Duration,
    link: Link,
    /// Bumped whenever `flushed` is invalidated; a flush that started under an
    /// older epoch must not record its colors
    epoch: u64,
}

impl LayoutState {
    fn hold_threshold(&self, slot: HandlerSlot) -> Duration {
        self.hold_timers
            .get(&slot)
            .copied()
            .unwrap_or(self.default_hold)
    }

    fn cancel_presses(&mut self) {
        for (_, mut press) in self.presses.drain() {
            press.cancel_hold();
        }
    }

    fn detach(&mut self) -> Option<Vec<JoinHandle<()>>> {
        match std::mem::replace(&mut self.link, Link::Detached) {
            Link::Connected { tasks, .. } => Some(tasks),
            Link::Detached => None,
        }
    }
}

struct LayoutInner {
    name: String,
    config: LayoutConfig,
    mask: Mask,
    enabled: AtomicBool,
    state: Mutex<LayoutState>,
    /// Held across a surface write; never taken while `state` is locked
    flush: Mutex<()>,
}

impl Drop for LayoutInner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.cancel_presses();
        if let Some(tasks) = state.detach() {
            tasks.iter().for_each(JoinHandle::abort);
        }
    }
}

/// Handle to a layout; clones share the same layout
#[derive(Clone)]
pub struct Layout {
    inner: Arc<LayoutInner>,
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("name", &self.inner.name)
            .field("mask", &self.inner.mask.len())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn has_led(control: &ControlId) -> bool {
    control.class().has_led()
}

impl Layout {
    pub fn new(mask: impl Into<Mask>) -> Self {
        Self::with_config(mask, LayoutConfig::default())
    }

    pub fn from_preset(preset: MaskPreset) -> Self {
        Self::new(preset.mask())
    }

    pub fn with_config(mask: impl Into<Mask>, config: LayoutConfig) -> Self {
        let mask = mask.into();
        // Masked LEDs start dark
        let desired = ColorMap::filled(mask.iter().filter(has_led), Rgb::BLACK);

        let state = LayoutState {
            desired,
            flushed: ColorMap::new(),
            presses: HashMap::new(),
            handlers: HashMap::new(),
            value_handler: None,
            hold_timers: HashMap::new(),
            default_hold: config.default_hold,
            link: Link::Detached,
            epoch: 0,
        };

        Self {
            inner: Arc::new(LayoutInner {
                name: config.name.clone(),
                config,
                mask,
                enabled: AtomicBool::new(false),
                state: Mutex::new(state),
                flush: Mutex::new(()),
            }),
        }
    }

    fn from_weak(weak: &Weak<LayoutInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn mask(&self) -> &Mask {
        &self.inner.mask
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.inner.state.lock().link, Link::Connected { .. })
    }

    // ---- lifecycle ----

    /// Attach to a surface and start the dispatch and refresh tasks
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect<S: Surface>(&self, surface: Arc<S>) -> Result<(), LayoutError> {
        let surface: Arc<dyn Surface> = surface;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| LayoutError::NoRuntime(self.inner.name.clone()))?;

        if self.is_connected() {
            return Err(LayoutError::AlreadyConnected(self.inner.name.clone()));
        }

        // Calls into the surface happen outside the layout lock
        let surface_name = surface.name();
        let rx = surface.subscribe(self.inner.config.event_queue_capacity);

        let mut state = self.inner.state.lock();
        if matches!(state.link, Link::Connected { .. }) {
            return Err(LayoutError::AlreadyConnected(self.inner.name.clone()));
        }

        let weak = Arc::downgrade(&self.inner);
        let dispatch = runtime.spawn(run_dispatch(weak.clone(), rx));
        let refresh = runtime.spawn(run_refresh(weak, self.inner.config.refresh_period()));

        info!(
            "Connecting layout {} to controller {}",
            self.inner.name, surface_name
        );
        state.link = Link::Connected {
            surface,
            tasks: vec![dispatch, refresh],
        };
        Ok(())
    }

    /// Stop the tasks, cancel holds and forget the surface
    pub fn disconnect(&self) -> Result<(), LayoutError> {
        let _flush = self.inner.flush.lock();
        let mut state = self.inner.state.lock();
        let Some(tasks) = state.detach() else {
            return Err(LayoutError::NotConnected(self.inner.name.clone()));
        };
        tasks.iter().for_each(JoinHandle::abort);
        state.cancel_presses();
        state.flushed.clear();
        state.epoch += 1;
        info!("Disconnected layout {}", self.inner.name);
        Ok(())
    }

    /// Start handling events and flushing colors
    pub fn activate(&self) {
        self.inner.enabled.store(true, Ordering::Release);
        debug!("Layout {} activated", self.inner.name);
    }

    /// Stop handling events and flushing; clears press state and the flush
    /// cache so the next activation repaints every masked LED
    ///
    /// Waits for a flush already writing to the surface.
    pub fn deactivate(&self) {
        self.inner.enabled.store(false, Ordering::Release);
        let _flush = self.inner.flush.lock();
        let mut state = self.inner.state.lock();
        state.cancel_presses();
        state.flushed.clear();
        state.epoch += 1;
        debug!("Layout {} deactivated", self.inner.name);
    }

    // ---- handlers ----

    /// Register a press-style handler; for Hold slots only the first call of
    /// each press is forwarded
    pub fn set_handler<F>(&self, slot: HandlerSlot, handler: F)
    where
        F: Fn(&Layout, ControlId) + Send + Sync + 'static,
    {
        self.inner
            .state
            .lock()
            .handlers
            .insert(slot, first_only(handler));
    }

    /// Register a handler that receives the `first` flag
    pub fn set_hold_handler<F>(&self, slot: HandlerSlot, handler: F)
    where
        F: Fn(&Layout, ControlId, bool) + Send + Sync + 'static,
    {
        self.inner
            .state
            .lock()
            .handlers
            .insert(slot, Arc::new(handler));
    }

    pub fn clear_handler(&self, slot: HandlerSlot) {
        self.inner.state.lock().handlers.remove(&slot);
    }

    /// Handler for knob, fader and dial rotation events of masked controls
    pub fn set_value_handler<F>(&self, handler: F)
    where
        F: Fn(&Layout, Event) + Send + Sync + 'static,
    {
        self.inner.state.lock().value_handler = Some(Arc::new(handler));
    }

    /// Hold threshold for one slot (normally a Hold slot)
    pub fn set_hold_timer(&self, slot: HandlerSlot, duration: Duration) {
        self.inner.state.lock().hold_timers.insert(slot, duration);
    }

    pub fn set_default_hold_timer(&self, duration: Duration) {
        self.inner.state.lock().default_hold = duration;
    }

    // ---- press state ----

    pub fn is_pressed(&self, control: ControlId) -> bool {
        self.inner.state.lock().presses.contains_key(&control)
    }

    /// How long `control` has been pressed
    pub fn hold_time(&self, control: ControlId) -> Option<Duration> {
        self.inner
            .state
            .lock()
            .presses
            .get(&control)
            .map(|p| p.since.elapsed())
    }

    /// Pressed for at least `threshold`
    pub fn is_held(&self, control: ControlId, threshold: Duration) -> bool {
        self.hold_time(control).is_some_and(|t| t >= threshold)
    }

    // ---- colors ----

    /// Desired color of a control
    pub fn color(&self, control: ControlId) -> Option<Rgb> {
        self.inner.state.lock().desired.get(control)
    }

    /// Set a desired color; controls without a light are ignored
    pub fn set_color(&self, control: ControlId, color: Rgb) {
        if has_led(&control) {
            self.inner.state.lock().desired.set(control, color);
        }
    }

    pub fn set_color_many(&self, controls: &[ControlId], color: Rgb) {
        let mut state = self.inner.state.lock();
        for control in controls.iter().filter(|c| has_led(c)) {
            state.desired.set(*control, color);
        }
    }

    pub fn set_color_preset(&self, preset: MaskPreset, color: Rgb) {
        let mut state = self.inner.state.lock();
        for control in preset.mask().iter().filter(has_led) {
            state.desired.set(control, color);
        }
    }

    /// Set every LED; only masked ones are ever flushed
    pub fn set_color_all(&self, color: Rgb) {
        let mut state = self.inner.state.lock();
        for control in ControlId::all().filter(has_led) {
            state.desired.set(control, color);
        }
    }

    pub fn set_colors(&self, colors: &ColorMap) {
        let mut state = self.inner.state.lock();
        for (control, color) in colors.iter().filter(|(c, _)| has_led(c)) {
            state.desired.set(control, color);
        }
    }

    /// Flush masked colors changed since the last flush
    ///
    /// Does nothing while disabled. Returns the number of controls written.
    /// Blocks for the duration of the surface write.
    pub fn refresh(&self) -> Result<usize, LayoutError> {
        let _flush = self.inner.flush.lock();
        if !self.is_enabled() {
            return Ok(0);
        }

        let (surface, changes, epoch) = {
            let state = self.inner.state.lock();
            let Link::Connected { surface, .. } = &state.link else {
                return Err(LayoutError::NotConnected(self.inner.name.clone()));
            };
            let changes = state
                .desired
                .restricted_to(self.inner.mask.as_set())
                .diff_from(&state.flushed);
            (surface.clone(), changes, state.epoch)
        };

        if changes.is_empty() {
            return Ok(0);
        }

        surface.write_colors(&changes)?;

        let mut state = self.inner.state.lock();
        if state.epoch == epoch {
            state.flushed.apply_from(&changes);
        }
        Ok(changes.len())
    }

    // ---- dispatch ----

    fn dispatch(&self, event: Event) {
        if !self.is_enabled() || !self.inner.mask.contains(event.control) {
            return;
        }

        match event.kind {
            EventKind::Pressed => self.on_pressed(event.control),
            EventKind::Released => self.on_released(event.control),
            EventKind::Changed | EventKind::Increment | EventKind::Decrement => {
                let handler = self.inner.state.lock().value_handler.clone();
                if let Some(handler) = handler {
                    handler(self, event);
                }
            }
        }
    }

    fn on_pressed(&self, control: ControlId) {
        let (Some(pressed_slot), Some(hold_slot)) = (
            HandlerSlot::for_control(control, Phase::Pressed),
            HandlerSlot::for_control(control, Phase::Hold),
        ) else {
            return;
        };

        let (pressed, hold) = {
            let mut state = self.inner.state.lock();
            let threshold = state.hold_threshold(hold_slot);
            let (cancel, watch) = match state.handlers.get(&hold_slot).cloned() {
                Some(handler) => {
                    let (tx, rx) = oneshot::channel();
                    (Some(tx), Some((handler, threshold, rx)))
                }
                None => (None, None),
            };
            let press = Press {
                since: Instant::now(),
                cancel,
            };
            if let Some(mut previous) = state.presses.insert(control, press) {
                previous.cancel_hold();
            }
            (state.handlers.get(&pressed_slot).cloned(), watch)
        };

        if let Some((handler, threshold, cancel)) = hold {
            tokio::spawn(run_hold_watch(
                Arc::downgrade(&self.inner),
                control,
                threshold,
                cancel,
                handler,
            ));
        }

        if let Some(handler) = pressed {
            handler(self, control, true);
        }
    }

    fn on_released(&self, control: ControlId) {
        let Some(released_slot) = HandlerSlot::for_control(control, Phase::Released) else {
            return;
        };

        let released = {
            let mut state = self.inner.state.lock();
            if let Some(press) = state.presses.get_mut(&control) {
                press.cancel_hold();
            }
            state.handlers.get(&released_slot).cloned()
        };

        if let Some(handler) = released {
            handler(self, control, true);
        }

        self.inner.state.lock().presses.remove(&control);
    }
}

async fn run_dispatch(weak: Weak<LayoutInner>, mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        let Some(layout) = Layout::from_weak(&weak) else {
            break;
        };
        layout.dispatch(event);
    }
    debug!("Layout dispatch task exiting");
}

async fn run_refresh(weak: Weak<LayoutInner>, period: Duration) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut failing = false;

    loop {
        ticker.tick().await;
        let Some(layout) = Layout::from_weak(&weak) else {
            break;
        };
        // Surface writes block on device I/O
        let flusher = layout.clone();
        let result = match task::spawn_blocking(move || flusher.refresh()).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Layout {} refresh task failed: {}", layout.name(), e);
                continue;
            }
        };
        match result {
            Ok(_) => failing = false,
            Err(LayoutError::NotConnected(_)) => break,
            Err(e) => {
                // Log once per failure streak
                if !failing {
                    warn!("Layout {} refresh failed: {}", layout.name(), e);
                }
                failing = true;
            }
        }
    }
    debug!("Layout refresh task exiting");
}

/// Fires the Hold handler every `threshold` while `control` stays pressed
async fn run_hold_watch(
    weak: Weak<LayoutInner>,
    control: ControlId,
    threshold: Duration,
    mut cancel: oneshot::Receiver<()>,
    handler: HoldHandler,
) {
    let mut first = true;
    loop {
        tokio::select! {
            _ = &mut cancel => return,
            _ = time::sleep(threshold) => {}
        }

        let Some(layout) = Layout::from_weak(&weak) else {
            return;
        };
        if !layout.is_held(control, threshold) {
            return;
        }
        handler(&layout, control, first);
        first = false;
    }
}
