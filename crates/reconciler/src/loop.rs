//! Continuous reconciliation loop.
//!
//! One task per resource: a resource's passes never overlap, different
//! resources run side by side. Each task sleeps for the pass's requeue
//! interval or until the resource's spec changes, whichever comes first.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thermopilot_core::{ResourceKey, ThermoPilot, ThermoPilotStatus};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{RwLock, broadcast, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::reconciler::Reconciler;

const CHANGE_BUFFER: usize = 64;

/// Where resources live between passes.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Get a resource, `None` once it has been removed.
    async fn get(&self, key: &ResourceKey) -> Result<Option<ThermoPilot>>;

    /// Keys of every resource currently stored.
    async fn keys(&self) -> Result<Vec<ResourceKey>>;

    /// Replace a resource's status. Never counts as a spec change.
    async fn update_status(&self, key: &ResourceKey, status: ThermoPilotStatus) -> Result<()>;

    /// Receive the key of every resource that was added, removed or whose
    /// spec changed.
    fn subscribe(&self) -> broadcast::Receiver<ResourceKey>;
}

/// Simple in-memory resource store.
pub struct InMemoryResourceStore {
    resources: RwLock<BTreeMap<ResourceKey, ThermoPilot>>,
    changes: broadcast::Sender<ResourceKey>,
}

impl InMemoryResourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            resources: RwLock::new(BTreeMap::new()),
            changes,
        }
    }

    /// Create or update a resource from its declared spec.
    ///
    /// The generation starts at 1 and is bumped only when the spec differs
    /// from the stored one. The stored status is kept. Returns the
    /// resulting generation.
    pub async fn apply(&self, resource: ThermoPilot) -> i64 {
        let key = resource.key();
        let mut resources = self.resources.write().await;

        let generation = match resources.get_mut(&key) {
            Some(existing) if existing.spec == resource.spec => return existing.generation,
            Some(existing) => {
                existing.spec = resource.spec;
                existing.generation += 1;
                existing.generation
            }
            None => {
                resources.insert(
                    key.clone(),
                    ThermoPilot {
                        generation: 1,
                        ..resource
                    },
                );
                1
            }
        };
        drop(resources);

        debug!(resource = %key, generation, "Resource applied");
        let _ = self.changes.send(key);
        generation
    }

    /// Remove a resource. Its loop task ends on its next wake-up.
    pub async fn remove(&self, key: &ResourceKey) -> Option<ThermoPilot> {
        let removed = self.resources.write().await.remove(key);
        if removed.is_some() {
            let _ = self.changes.send(key.clone());
        }
        removed
    }
}

impl Default for InMemoryResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn get(&self, key: &ResourceKey) -> Result<Option<ThermoPilot>> {
        Ok(self.resources.read().await.get(key).cloned())
    }

    async fn keys(&self) -> Result<Vec<ResourceKey>> {
        Ok(self.resources.read().await.keys().cloned().collect())
    }

    async fn update_status(&self, key: &ResourceKey, status: ThermoPilotStatus) -> Result<()> {
        let mut resources = self.resources.write().await;
        let resource = resources
            .get_mut(key)
            .ok_or_else(|| Error::resource_not_found(key.to_string()))?;
        resource.status = status;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ResourceKey> {
        self.changes.subscribe()
    }
}

/// Why a resource task woke up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Requeue,
    SpecChanged,
    Stopped,
    StoreClosed,
}

/// Continuous reconciliation loop.
#[derive(Clone)]
pub struct ReconciliationLoop {
    /// The reconciler.
    reconciler: Arc<Reconciler>,
    /// Resource store.
    store: Arc<dyn ResourceStore>,
    /// Stop signal receiver.
    stop_rx: watch::Receiver<bool>,
    /// Stop signal sender (for external control).
    stop_tx: watch::Sender<bool>,
}

impl ReconciliationLoop {
    /// Create a new reconciliation loop.
    pub fn new(reconciler: Arc<Reconciler>, store: Arc<dyn ResourceStore>) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            reconciler,
            store,
            stop_rx,
            stop_tx,
        }
    }

    /// Run one task per resource until stopped.
    ///
    /// Resources added later get a task when the store announces them.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot list its resources.
    pub async fn run(&self) -> Result<()> {
        info!("Starting reconciliation loop");

        let mut changes = self.store.subscribe();
        let mut stop_rx = self.stop_rx.clone();
        let mut tasks = JoinSet::new();
        let mut running: HashSet<ResourceKey> = HashSet::new();

        for key in self.store.keys().await? {
            self.spawn_resource(&mut tasks, &mut running, key);
        }

        loop {
            tokio::select! {
                change = changes.recv() => match change {
                    Ok(key) => self.spawn_resource(&mut tasks, &mut running, key),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed resource changes, resyncing");
                        for key in self.store.keys().await? {
                            self.spawn_resource(&mut tasks, &mut running, key);
                        }
                    }
                    Err(RecvError::Closed) => {
                        info!("Resource store closed");
                        break;
                    }
                },
                Some(joined) = tasks.join_next() => {
                    let (key, result) = match joined {
                        Ok(finished) => finished,
                        Err(e) => {
                            error!(error = %e, "Resource task aborted");
                            continue;
                        }
                    };
                    running.remove(&key);
                    match result {
                        Ok(passes) => debug!(resource = %key, passes, "Resource task finished"),
                        Err(e) => error!(resource = %key, error = %e, "Resource task failed"),
                    }
                    // Re-added while the old task was finishing.
                    let stopped = *stop_rx.borrow();
                    if !stopped && self.store.get(&key).await?.is_some() {
                        self.spawn_resource(&mut tasks, &mut running, key);
                    }
                }
                result = stop_rx.changed() => {
                    if result.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        self.stop();
        while tasks.join_next().await.is_some() {}
        info!("Reconciliation loop stopped");
        Ok(())
    }

    fn spawn_resource(
        &self,
        tasks: &mut JoinSet<(ResourceKey, Result<usize>)>,
        running: &mut HashSet<ResourceKey>,
        key: ResourceKey,
    ) {
        if !running.insert(key.clone()) {
            return;
        }
        debug!(resource = %key, "Spawning resource task");
        let this = self.clone();
        tasks.spawn(async move {
            let result = this.run_resource(&key).await;
            (key, result)
        });
    }

    /// Reconcile one resource repeatedly until it is removed or the loop stops.
    ///
    /// Returns the number of passes run.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn run_resource(&self, key: &ResourceKey) -> Result<usize> {
        let mut changes = self.store.subscribe();
        let mut stop_rx = self.stop_rx.clone();
        let mut passes = 0usize;

        loop {
            if *stop_rx.borrow() {
                return Ok(passes);
            }
            let Some(resource) = self.store.get(key).await? else {
                info!(resource = %key, passes, "Resource removed");
                return Ok(passes);
            };

            let outcome = self.reconciler.reconcile(&resource).await;
            passes += 1;

            let mut status = resource.status.clone();
            outcome.apply_to(&mut status);
            match self.store.update_status(key, status).await {
                Ok(()) => {}
                Err(Error::ResourceNotFound { .. }) => {
                    info!(resource = %key, passes, "Resource removed");
                    return Ok(passes);
                }
                Err(e) => return Err(e),
            }

            let wake = tokio::select! {
                () = wait_for(outcome.requeue_after) => Wake::Requeue,
                changed = wait_for_change(&mut changes, key) => {
                    if changed { Wake::SpecChanged } else { Wake::StoreClosed }
                }
                _ = stop_rx.changed() => Wake::Stopped,
            };
            debug!(resource = %key, wake = ?wake, "Woke up");

            if matches!(wake, Wake::Stopped | Wake::StoreClosed) {
                return Ok(passes);
            }
        }
    }

    /// Stop the loop.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Get a stopper handle.
    pub fn stopper(&self) -> LoopStopper {
        LoopStopper {
            stop_tx: self.stop_tx.clone(),
        }
    }
}

/// Sleep for `delay`, or forever when there is none.
async fn wait_for(delay: Option<Duration>) {
    match delay {
        Some(delay) => tokio::time::sleep(delay).await,
        None => std::future::pending().await,
    }
}

/// Wait for a change to `key`. False once the store has gone away.
async fn wait_for_change(changes: &mut broadcast::Receiver<ResourceKey>, key: &ResourceKey) -> bool {
    loop {
        match changes.recv().await {
            Ok(changed) if changed == *key => return true,
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => return true,
            Err(RecvError::Closed) => return false,
        }
    }
}

/// Handle to stop a reconciliation loop.
#[derive(Clone)]
pub struct LoopStopper {
    stop_tx: watch::Sender<bool>,
}

impl LoopStopper {
    /// Stop the loop.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::InMemorySecretStore;
    use crate::fake::FakeDevices;
    use crate::reconciler::ReconcilerBuilder;
    use std::collections::HashMap;
    use thermopilot_core::{
        ConditionStatus, ConditionType, CredentialError, Credentials, DeviceApi, DeviceApiFactory,
        SecretReference, ThermoPilotSpec,
    };

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    struct FixedDevices(Arc<FakeDevices>);

    impl DeviceApiFactory for FixedDevices {
        fn connect(
            &self,
            _credentials: &Credentials,
        ) -> std::result::Result<Arc<dyn DeviceApi>, CredentialError> {
            Ok(self.0.clone())
        }
    }

    fn setup() -> Result<(ReconciliationLoop, Arc<InMemoryResourceStore>)> {
        let secrets = InMemorySecretStore::new().with_secret(
            "home",
            "switchbot",
            HashMap::from([
                ("token".to_string(), "t".to_string()),
                ("secret".to_string(), "s".to_string()),
            ]),
        );
        let reconciler = ReconcilerBuilder::new()
            .with_credentials(Arc::new(secrets))
            .with_devices(Arc::new(FixedDevices(Arc::new(FakeDevices::new(
                25.0,
                &["ac-1"],
            )))))
            .build()?;
        let store = Arc::new(InMemoryResourceStore::new());
        let runner = ReconciliationLoop::new(Arc::new(reconciler), store.clone());
        Ok((runner, store))
    }

    fn resource(mode: &str) -> ThermoPilot {
        ThermoPilot::new(
            "living-room",
            "home",
            ThermoPilotSpec {
                secret_ref: SecretReference::new("switchbot"),
                temperature_sensor_type: "MeterPro".to_string(),
                target_temperature: "25".to_string(),
                mode: mode.to_string(),
                ..ThermoPilotSpec::default()
            },
        )
    }

    /// Poll the store until the resource matches, or give up after ~2s.
    async fn wait_until<F>(store: &InMemoryResourceStore, key: &ResourceKey, done: F) -> bool
    where
        F: Fn(&ThermoPilot) -> bool,
    {
        for _ in 0..200 {
            if let Ok(Some(resource)) = store.get(key).await {
                if done(&resource) {
                    return true;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    fn available(resource: &ThermoPilot) -> Option<(ConditionStatus, i64)> {
        resource
            .status
            .conditions
            .get(ConditionType::Available)
            .map(|c| (c.status, c.observed_generation))
    }

    #[tokio::test]
    async fn apply_bumps_generation_only_on_spec_change() {
        let store = InMemoryResourceStore::new();
        assert_eq!(store.apply(resource("cool")).await, 1);
        assert_eq!(store.apply(resource("cool")).await, 1);
        assert_eq!(store.apply(resource("heat")).await, 2);
    }

    #[tokio::test]
    async fn apply_keeps_status() -> TestResult {
        let store = InMemoryResourceStore::new();
        let key = resource("cool").key();
        store.apply(resource("cool")).await;
        store
            .update_status(
                &key,
                ThermoPilotStatus {
                    current_temperature: Some("24.0".to_string()),
                    ..ThermoPilotStatus::default()
                },
            )
            .await?;

        store.apply(resource("heat")).await;

        let stored = store.get(&key).await?;
        assert_eq!(
            stored.and_then(|r| r.status.current_temperature),
            Some("24.0".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_status_of_missing_resource_fails() {
        let store = InMemoryResourceStore::new();
        let result = store
            .update_status(&ResourceKey::new("home", "gone"), ThermoPilotStatus::default())
            .await;
        assert_eq!(result, Err(Error::resource_not_found("home/gone")));
    }

    /// Given a resource with an unsupported mode
    /// When the spec is fixed
    /// Then the task wakes without a requeue and reconciles the new generation
    #[tokio::test]
    async fn config_error_waits_for_spec_change() -> TestResult {
        let (runner, store) = setup()?;
        let key = resource("auto").key();
        store.apply(resource("auto")).await;

        let task_runner = runner.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move { task_runner.run_resource(&task_key).await });

        let failed = wait_until(&store, &key, |r| {
            available(r) == Some((ConditionStatus::False, 1))
        })
        .await;
        assert!(failed, "config error should be reported");

        store.apply(resource("cool")).await;
        let recovered = wait_until(&store, &key, |r| {
            available(r) == Some((ConditionStatus::True, 2))
        })
        .await;
        assert!(recovered, "fixed spec should be reconciled");

        runner.stop();
        let passes = tokio::time::timeout(Duration::from_secs(1), handle).await??;
        assert_eq!(passes, Ok(2));
        Ok(())
    }

    /// Given a running resource task
    /// When the resource is removed
    /// Then the task ends
    #[tokio::test]
    async fn removed_resource_ends_task() -> TestResult {
        let (runner, store) = setup()?;
        let key = resource("cool").key();
        store.apply(resource("cool")).await;

        let task_key = key.clone();
        let handle = tokio::spawn(async move { runner.run_resource(&task_key).await });
        assert!(wait_until(&store, &key, |r| available(r).is_some()).await);

        store.remove(&key).await;

        let passes = tokio::time::timeout(Duration::from_secs(1), handle).await??;
        assert_eq!(passes, Ok(1));
        Ok(())
    }

    /// Given a loop that is running
    /// When a resource is added and stop() is called
    /// Then the resource is reconciled and the loop exits gracefully
    #[tokio::test]
    async fn stop_signal_terminates_loop() -> TestResult {
        let (runner, store) = setup()?;
        let stopper = runner.stopper();
        let handle = tokio::spawn(async move { runner.run().await });

        let key = resource("cool").key();
        store.apply(resource("cool")).await;
        assert!(wait_until(&store, &key, |r| available(r).is_some()).await);

        stopper.stop();

        let result = tokio::time::timeout(Duration::from_secs(1), handle).await??;
        assert_eq!(result, Ok(()));
        Ok(())
    }
}
