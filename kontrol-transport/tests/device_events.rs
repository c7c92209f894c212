//! End-to-end: scripted input reports through a Device to subscribers

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use kontrol_transport::input::encode_input;
use kontrol_transport::protocol::INPUT_VERSION;
use kontrol_transport::{
    ControlId, Device, DeviceConfig, Event, EventKind, InputSnapshot, Transport,
    TransportDeviceInfo, TransportError,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::timeout;

struct ScriptedTransport {
    reads: Mutex<VecDeque<Vec<u8>>>,
    writes: Mutex<Vec<Vec<u8>>>,
    info: TransportDeviceInfo,
}

impl ScriptedTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            reads: Mutex::new(VecDeque::new()),
            writes: Mutex::new(Vec::new()),
            info: TransportDeviceInfo {
                vid: 0x17CC,
                pid: 0x1120,
                device_path: "scripted".into(),
                serial: Some("0001".into()),
                product_name: Some("Traktor Kontrol F1".into()),
            },
        })
    }

    fn feed(&self, snapshots: &[InputSnapshot]) {
        let mut reads = self.reads.lock();
        for s in snapshots {
            reads.push_back(encode_input(s).to_vec());
        }
    }
}

impl Transport for ScriptedTransport {
    fn read(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError> {
        if let Some(data) = self.reads.lock().pop_front() {
            buf[..data.len()].copy_from_slice(&data);
            return Ok(data.len());
        }
        std::thread::sleep(Duration::from_millis(timeout_ms.max(1) as u64));
        Ok(0)
    }

    fn write(&self, data: &[u8]) -> Result<usize, TransportError> {
        self.writes.lock().push(data.to_vec());
        Ok(data.len())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}

fn base() -> InputSnapshot {
    InputSnapshot {
        version: INPUT_VERSION,
        dial: 254,
        ..Default::default()
    }
}

async fn next(rx: &mut mpsc::Receiver<Event>) -> Event {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event queue closed")
}

#[tokio::test]
async fn test_scripted_session() {
    let transport = ScriptedTransport::new();
    let device = Device::from_transport(transport.clone(), DeviceConfig::default());
    let mut rx = device.subscribe(64);

    let s0 = base();
    let mut s1 = s0;
    s1.dial = 255;
    let mut s2 = s1;
    s2.dial = 0;
    s2.pads[15] = true;
    let mut s3 = s2;
    s3.pads[15] = false;
    s3.faders[1] = 4090;
    let mut s4 = s3;
    s4.dial = 255;

    // identical report produces nothing
    transport.feed(&[s0, s0, s1, s2, s3, s3, s4]);

    assert_eq!(
        next(&mut rx).await,
        Event::new(ControlId::Dial, EventKind::Increment, 255)
    );
    assert_eq!(
        next(&mut rx).await,
        Event::new(ControlId::Dial, EventKind::Increment, 0)
    );
    assert_eq!(next(&mut rx).await, Event::pressed(ControlId::PadD4));
    assert_eq!(next(&mut rx).await, Event::released(ControlId::PadD4));
    assert_eq!(
        next(&mut rx).await,
        Event::new(ControlId::Volume2, EventKind::Changed, 256)
    );
    assert_eq!(
        next(&mut rx).await,
        Event::new(ControlId::Dial, EventKind::Decrement, 255)
    );

    assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    device.close().unwrap();
}

#[tokio::test]
async fn test_slow_subscriber_does_not_stall_others() {
    let transport = ScriptedTransport::new();
    let device = Device::from_transport(transport.clone(), DeviceConfig::default());
    let mut slow = device.subscribe(1);
    let mut fast = device.subscribe(64);

    let mut snapshots = vec![base()];
    for i in 0..10u8 {
        let mut s = base();
        s.dial = i;
        snapshots.push(s);
    }
    transport.feed(&snapshots);

    // 254 -> 0 is not adjacent: a plain decrement, then nine increments
    let first = next(&mut fast).await;
    assert_eq!(first.kind, EventKind::Decrement);
    for expected in 1..10 {
        let e = next(&mut fast).await;
        assert_eq!(e, Event::new(ControlId::Dial, EventKind::Increment, expected));
    }

    // the slow queue only kept what fit
    assert_eq!(next(&mut slow).await, first);
    assert!(slow.try_recv().is_err());
    device.close().unwrap();
}

#[tokio::test]
async fn test_writes_reach_transport() {
    let transport = ScriptedTransport::new();
    let device = Device::from_transport(transport.clone(), DeviceConfig::default());

    device.set_pad_color_all(kontrol_transport::Rgb::WHITE).unwrap();
    let frame = transport.writes.lock().last().cloned().unwrap();
    assert_eq!(frame.len(), 81);
    assert!(frame[25..73].iter().all(|&b| b == 127));

    device.close().unwrap();
    assert!(!device.is_reading());
}

#[test]
#[ignore] // Requires a connected Kontrol F1
fn test_hardware_open_and_blink() {
    let device = Device::open().expect("no F1 attached");
    println!("Opened {}", device.name());
    device.set_pad_color_all(kontrol_transport::Rgb::GREEN).unwrap();
    std::thread::sleep(Duration::from_millis(300));
    device.blackout().unwrap();
    device.close().unwrap();
}
