use async_trait::async_trait;
use chisel_sdf::orchestration::{InstallError, InstallInvocation, SliceInstaller};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What the pool handed to one install call.
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    pub slices: Vec<String>,
    pub args: Vec<String>,
    pub root: PathBuf,
    pub cache_dir: PathBuf,
    pub root_was_empty: bool,
}

/// Installer that sleeps instead of running chisel.
///
/// Fails for configured slice names and tracks how many installs overlap.
#[derive(Debug, Default)]
pub struct MockInstaller {
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    pub invocations: Mutex<Vec<RecordedInvocation>>,
    pub completed: Mutex<Vec<String>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: AtomicUsize,
}

impl MockInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, names: &[&str]) -> Self {
        self.failing.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_delay_for(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn started(&self) -> Vec<String> {
        self.invocations
            .lock()
            .iter()
            .map(|i| i.slices.join(" "))
            .collect()
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().clone()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn delay_for(&self, slices: &[String]) -> Duration {
        slices
            .iter()
            .filter_map(|s| self.delays.get(s))
            .copied()
            .max()
            .unwrap_or(self.default_delay)
    }
}

/// Keeps the in-flight count right even when the install future is dropped.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SliceInstaller for MockInstaller {
    async fn install(&self, invocation: &InstallInvocation<'_>) -> Result<(), InstallError> {
        let root_was_empty = std::fs::read_dir(invocation.root)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        self.invocations.lock().push(RecordedInvocation {
            slices: invocation.task.slices().to_vec(),
            args: invocation.task.args().to_vec(),
            root: invocation.root.to_path_buf(),
            cache_dir: invocation.cache_dir.to_path_buf(),
            root_was_empty,
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(Arc::clone(&self.in_flight));

        // Leave something behind so root cleanup is observable.
        std::fs::write(invocation.root.join("installed"), b"ok").expect("write into root");

        let delay = self.delay_for(invocation.task.slices());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let name = invocation.task.display_name();
        if invocation.task.slices().iter().any(|s| self.failing.contains(s)) {
            return Err(InstallError::Failed {
                slices: name,
                status: "exit status: 1".to_string(),
                output: "error: slice failed to install".to_string(),
            });
        }
        self.completed.lock().push(name);
        Ok(())
    }
}
