//! Scriptable in-memory [`DeviceApi`] for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thermopilot_core::{ActuatorKind, DeviceApi, DeviceError, Mode, SensorDevice, SensorType};
use tokio::sync::Mutex;

pub struct FakeDevices {
    pub temperature: Result<f64, DeviceError>,
    pub discovered: Result<Vec<String>, DeviceError>,
    pub failing: HashMap<String, DeviceError>,
    pub hanging: HashSet<String>,
    pub sensor_hangs: bool,
    pub discovery_hangs: bool,
    pub discover_calls: AtomicUsize,
    pub commands: Mutex<Vec<(String, f64, Mode)>>,
}

impl FakeDevices {
    pub fn new(temperature: f64, discovered: &[&str]) -> Self {
        Self {
            temperature: Ok(temperature),
            discovered: Ok(discovered.iter().map(ToString::to_string).collect()),
            failing: HashMap::new(),
            hanging: HashSet::new(),
            sensor_hangs: false,
            discovery_hangs: false,
            discover_calls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, id: &str, error: DeviceError) -> Self {
        self.failing.insert(id.to_string(), error);
        self
    }

    pub fn hanging(mut self, id: &str) -> Self {
        self.hanging.insert(id.to_string());
        self
    }

    pub fn discover_calls(&self) -> usize {
        self.discover_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceApi for FakeDevices {
    async fn locate_sensor(&self, _sensor_type: SensorType) -> Result<SensorDevice, DeviceError> {
        Ok(SensorDevice {
            device_id: "meter-1".to_string(),
            device_name: "Living room".to_string(),
        })
    }

    async fn read_temperature(&self, _sensor_id: &str) -> Result<f64, DeviceError> {
        if self.sensor_hangs {
            std::future::pending::<()>().await;
        }
        self.temperature.clone()
    }

    async fn discover_actuators(&self, _kind: ActuatorKind) -> Result<Vec<String>, DeviceError> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        if self.discovery_hangs {
            std::future::pending::<()>().await;
        }
        self.discovered.clone()
    }

    async fn set_temperature(
        &self,
        device_id: &str,
        value: f64,
        mode: Mode,
    ) -> Result<(), DeviceError> {
        self.commands
            .lock()
            .await
            .push((device_id.to_string(), value, mode));
        if self.hanging.contains(device_id) {
            std::future::pending::<()>().await;
        }
        self.failing.get(device_id).cloned().map_or(Ok(()), Err)
    }
}
