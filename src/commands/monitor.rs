//! Print control events as they arrive

use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use super::{open_device, shutdown};

pub async fn run(json: bool, capacity: usize) -> Result<()> {
    let device = open_device()?;
    let mut events = device.subscribe(capacity);

    if !json {
        println!("Monitoring {} (Ctrl+C to stop)", device.name());
    }

    let mut health = tokio::time::interval(Duration::from_millis(500));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = health.tick() => {
                if !device.is_reading() {
                    warn!("Input reader stopped, exiting");
                    break;
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    warn!("Event stream closed");
                    break;
                };
                if json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    println!("{event}");
                }
            }
        }
    }

    shutdown(&device)
}
