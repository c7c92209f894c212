//! Layout configuration

use std::time::Duration;

/// Default press duration before Hold handlers fire
pub const DEFAULT_HOLD: Duration = Duration::from_millis(250);

/// Default LED refresh rate
pub const DEFAULT_REFRESH_HZ: u32 = 60;

/// Default capacity of the layout's event queue
pub const DEFAULT_EVENT_QUEUE: usize = 20;

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Name used in log messages
    pub name: String,
    pub refresh_rate_hz: u32,
    /// Hold threshold for slots without their own timer
    pub default_hold: Duration,
    pub event_queue_capacity: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            name: "layout".to_string(),
            refresh_rate_hz: DEFAULT_REFRESH_HZ,
            default_hold: DEFAULT_HOLD,
            event_queue_capacity: DEFAULT_EVENT_QUEUE,
        }
    }
}

impl LayoutConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_refresh_rate_hz(mut self, hz: u32) -> Self {
        self.refresh_rate_hz = hz;
        self
    }

    pub fn with_default_hold(mut self, hold: Duration) -> Self {
        self.default_hold = hold;
        self
    }

    pub fn with_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity;
        self
    }

    /// Interval between refresh ticks (a zero rate is treated as 1 Hz)
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(1) / self.refresh_rate_hz.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.default_hold, Duration::from_millis(250));
        assert_eq!(config.event_queue_capacity, 20);
        assert_eq!(config.refresh_period(), Duration::from_secs(1) / 60);
    }

    #[test]
    fn test_zero_rate_does_not_divide_by_zero() {
        let config = LayoutConfig::default().with_refresh_rate_hz(0);
        assert_eq!(config.refresh_period(), Duration::from_secs(1));
    }
}
