use std::collections::HashSet;
use std::io;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use rescue_core::{ControlRequest, DetectorSettings, FailureEvent, NavigationSignal, TabId};
use rescue_logging::{rescue_error, rescue_warn};
use thiserror::Error;

use crate::archive::{ArchiveLookup, LookupSettings, ReqwestArchiveLookup};
use crate::monitor::{NavigationMonitor, TabQuery};
use crate::workflow::{ChannelStatusSink, Navigator, RecoveryWorkflow, WorkflowTimings};
use crate::{EngineEvent, LookupError};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub lookup: LookupSettings,
    pub timings: WorkflowTimings,
    pub detector: DetectorSettings,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to create archive client: {0}")]
    Lookup(#[from] LookupError),
}

enum EngineCommand {
    Observe(NavigationSignal),
    Recover(FailureEvent),
    Control {
        tab_id: TabId,
        request: ControlRequest,
    },
}

/// Runs detection and rescues on a background runtime.
///
/// Commands go in through the handle; [`EngineEvent`]s come back out. At most
/// one rescue runs per tab; failures reported while one is running are dropped.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        settings: EngineSettings,
        navigator: Arc<dyn Navigator>,
        tabs: Arc<dyn TabQuery>,
    ) -> Result<Self, EngineError> {
        let lookup = Arc::new(ReqwestArchiveLookup::new(settings.lookup.clone())?);
        Self::with_lookup(settings, lookup, navigator, tabs)
    }

    pub fn with_lookup(
        settings: EngineSettings,
        lookup: Arc<dyn ArchiveLookup>,
        navigator: Arc<dyn Navigator>,
        tabs: Arc<dyn TabQuery>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        let worker = Worker {
            runtime,
            monitor: NavigationMonitor::new(settings.detector, tabs),
            workflow: Arc::new(RecoveryWorkflow::new(
                lookup,
                navigator.clone(),
                settings.timings,
            )),
            navigator,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            event_tx,
        };

        thread::spawn(move || {
            // Signals are handled in delivery order; rescues run concurrently.
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(command);
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn observe(&self, signal: NavigationSignal) {
        let _ = self.cmd_tx.send(EngineCommand::Observe(signal));
    }

    /// Starts a rescue directly, bypassing detection.
    pub fn recover(&self, event: FailureEvent) {
        let _ = self.cmd_tx.send(EngineCommand::Recover(event));
    }

    pub fn control(&self, tab_id: TabId, request: ControlRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Control { tab_id, request });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct Worker {
    runtime: tokio::runtime::Runtime,
    monitor: NavigationMonitor,
    workflow: Arc<RecoveryWorkflow>,
    navigator: Arc<dyn Navigator>,
    in_flight: Arc<Mutex<HashSet<TabId>>>,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Worker {
    fn handle(&self, command: EngineCommand) {
        match command {
            EngineCommand::Observe(signal) => {
                let tab_id = signal.tab_id();
                let ends_navigation = signal.ends_navigation();
                match self.runtime.block_on(self.monitor.observe(signal)) {
                    Some(event) => self.start_rescue(event),
                    None if ends_navigation => {
                        let _ = self.event_tx.send(EngineEvent::Ignored { tab_id });
                    }
                    None => {}
                }
            }
            EngineCommand::Recover(event) => self.start_rescue(event),
            EngineCommand::Control { tab_id, request } => {
                let result = match &request {
                    ControlRequest::ReturnToOriginal { url } => {
                        self.runtime.block_on(self.navigator.navigate(tab_id, url))
                    }
                    ControlRequest::CloseTab => {
                        self.monitor.forget_tab(tab_id);
                        self.runtime.block_on(self.navigator.close_tab(tab_id))
                    }
                };
                if let Err(err) = &result {
                    rescue_error!("Control request {:?} for tab {} failed: {}", request, tab_id, err);
                }
                let _ = self.event_tx.send(EngineEvent::ControlHandled {
                    tab_id,
                    request,
                    result,
                });
            }
        }
    }

    fn start_rescue(&self, event: FailureEvent) {
        if !lock(&self.in_flight).insert(event.tab_id) {
            rescue_warn!(
                "Rescue already running for tab {}; ignoring {}",
                event.tab_id,
                event.url
            );
            return;
        }
        let _ = self.event_tx.send(EngineEvent::Detected(event.clone()));

        let workflow = self.workflow.clone();
        let in_flight = self.in_flight.clone();
        let event_tx = self.event_tx.clone();
        self.runtime.spawn(async move {
            let sink = ChannelStatusSink::new(event_tx.clone());
            let outcome = workflow.run(&event, &sink).await;
            lock(&in_flight).remove(&event.tab_id);
            let _ = event_tx.send(EngineEvent::Finished {
                tab_id: event.tab_id,
                outcome,
            });
        });
    }
}

fn lock(in_flight: &Mutex<HashSet<TabId>>) -> std::sync::MutexGuard<'_, HashSet<TabId>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}
