//! Shared fixtures for reconciler behaviour tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use thermopilot_core::{
    ActuatorKind, CredentialError, Credentials, DeviceApi, DeviceApiFactory, DeviceError, Mode,
    SecretReference, SensorDevice, SensorType, ThermoPilot, ThermoPilotSpec,
};
use thermopilot_reconciler::{InMemorySecretStore, Reconciler, ReconcilerBuilder};
use tokio::sync::Mutex;

/// A home with one Meter Pro and some air conditioners.
pub struct FakeHome {
    pub temperature: Result<f64, DeviceError>,
    pub air_conditioners: Result<Vec<String>, DeviceError>,
    pub failing: HashMap<String, DeviceError>,
    pub hanging: HashSet<String>,
    pub discover_calls: AtomicUsize,
    pub commands: Mutex<Vec<(String, f64, Mode)>>,
}

impl FakeHome {
    pub fn new(temperature: f64, air_conditioners: &[&str]) -> Self {
        Self {
            temperature: Ok(temperature),
            air_conditioners: Ok(air_conditioners.iter().map(ToString::to_string).collect()),
            failing: HashMap::new(),
            hanging: HashSet::new(),
            discover_calls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(
            id.to_string(),
            DeviceError::rejected(161, "device offline"),
        );
        self
    }

    pub fn hanging(mut self, id: &str) -> Self {
        self.hanging.insert(id.to_string());
        self
    }

    pub fn discover_calls(&self) -> usize {
        self.discover_calls.load(Ordering::SeqCst)
    }

    pub async fn commands(&self) -> Vec<(String, f64, Mode)> {
        self.commands.lock().await.clone()
    }
}

#[async_trait]
impl DeviceApi for FakeHome {
    async fn locate_sensor(&self, _sensor_type: SensorType) -> Result<SensorDevice, DeviceError> {
        Ok(SensorDevice {
            device_id: "meter-1".to_string(),
            device_name: "Living room meter".to_string(),
        })
    }

    async fn read_temperature(&self, _sensor_id: &str) -> Result<f64, DeviceError> {
        self.temperature.clone()
    }

    async fn discover_actuators(&self, _kind: ActuatorKind) -> Result<Vec<String>, DeviceError> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        self.air_conditioners.clone()
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

/// Connects every pass to the same [`FakeHome`].
pub struct FakeConnector {
    pub home: Arc<FakeHome>,
    pub refuse: bool,
}

impl DeviceApiFactory for FakeConnector {
    fn connect(&self, _credentials: &Credentials) -> Result<Arc<dyn DeviceApi>, CredentialError> {
        if self.refuse {
            return Err(CredentialError::client_setup("invalid base url"));
        }
        Ok(self.home.clone())
    }
}

pub fn secrets() -> InMemorySecretStore {
    InMemorySecretStore::new().with_secret(
        "home",
        "switchbot",
        HashMap::from([
            ("token".to_string(), "t0k3n".to_string()),
            ("secret".to_string(), "s3cr3t".to_string()),
        ]),
    )
}

pub fn reconciler(home: Arc<FakeHome>) -> thermopilot_reconciler::Result<Reconciler> {
    ReconcilerBuilder::new()
        .with_credentials(Arc::new(secrets()))
        .with_devices(Arc::new(FakeConnector { home, refuse: false }))
        .command_timeout(Duration::from_millis(100))
        .build()
}

pub fn thermopilot(target: &str, threshold: Option<&str>, mode: &str) -> ThermoPilot {
    ThermoPilot::new(
        "living-room",
        "home",
        ThermoPilotSpec {
            secret_ref: SecretReference::new("switchbot"),
            air_conditioner_id: None,
            temperature_sensor_type: "MeterPro".to_string(),
            target_temperature: target.to_string(),
            threshold: threshold.map(str::to_string),
            mode: mode.to_string(),
        },
    )
}
