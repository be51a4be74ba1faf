//! Worker-backed synchronous engine calls.
//!
//! `SyncProxy` hands a request to a dedicated worker thread that owns a
//! tokio runtime, then blocks the caller on a condition variable until the
//! worker posts the response. Requests and responses cross the thread
//! boundary as MessagePack.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use markupsync_core::proxy::SynchronousProxyFactory;
//!
//! let factory = SynchronousProxyFactory::new(Arc::new(engine), BridgeOptions::default());
//!
//! // The worker is spawned on first use and reused afterwards.
//! let result = factory.get()?.call(&request)?;
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use markupsync_engine::{Engine, EngineError, EngineResult, ExecutionRequest};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::{debug, trace, warn};

use crate::{BridgeError, BridgeOptions};

/// Response posted by the worker.
#[derive(Debug, Serialize, Deserialize)]
enum WireResponse {
    Completed(EngineResult),
    Failed(EngineError),
    Rejected(String),
}

impl From<Result<EngineResult, EngineError>> for WireResponse {
    fn from(result: Result<EngineResult, EngineError>) -> Self {
        match result {
            Ok(result) => Self::Completed(result),
            Err(err) => Self::Failed(err),
        }
    }
}

/// One-shot slot the caller waits on.
struct Completion {
    slot: Mutex<Option<Result<Vec<u8>, BridgeError>>>,
    ready: Condvar,
}

impl Completion {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn complete(&self, response: Result<Vec<u8>, BridgeError>) {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            *slot = Some(response);
            self.ready.notify_one();
        }
    }

    fn wait(&self) -> Result<Vec<u8>, BridgeError> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(response) = slot.take() {
                return response;
            }
            self.ready.wait(&mut slot);
        }
    }
}

/// The worker's handle on a pending call.
///
/// Dropping it unanswered (worker shutdown) wakes the caller with
/// `WorkerDisconnected`.
struct Reply {
    completion: Arc<Completion>,
    answered: bool,
}

impl Reply {
    fn new(completion: Arc<Completion>) -> Self {
        Self {
            completion,
            answered: false,
        }
    }

    fn send(mut self, response: Result<Vec<u8>, BridgeError>) {
        self.answered = true;
        self.completion.complete(response);
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if !self.answered {
            warn!("Bridge worker dropped a request without answering");
            self.completion.complete(Err(BridgeError::WorkerDisconnected));
        }
    }
}

struct Job {
    payload: Vec<u8>,
    reply: Reply,
}

/// Blocking handle on the bridge worker.
pub struct SyncProxy {
    sender: Sender<Job>,
}

impl SyncProxy {
    /// Spawns the worker thread and waits until its runtime is ready.
    fn spawn<E: Engine>(engine: Arc<E>, options: &BridgeOptions) -> Result<Self, String> {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), String>>(1);

        let mut builder = thread::Builder::new().name(options.worker_thread_name.clone());
        if let Some(stack_size) = options.worker_stack_size {
            builder = builder.stack_size(stack_size);
        }

        builder
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!("failed to build runtime: {}", e)));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                run_worker(&runtime, engine.as_ref(), &receiver);
                debug!("Bridge worker exiting");
            })
            .map_err(|e| format!("failed to spawn worker thread: {}", e))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { sender }),
            Ok(Err(message)) => Err(message),
            Err(_) => Err("worker thread exited during setup".to_string()),
        }
    }

    /// Runs `request` on the worker, blocking until it settles.
    ///
    /// An engine failure is returned as `BridgeError::Engine` with its
    /// original kind and message.
    pub fn call(&self, request: &ExecutionRequest) -> Result<EngineResult, BridgeError> {
        let payload = rmp_serde::to_vec_named(request).map_err(|e| {
            BridgeError::serialization(format!("Failed to serialize request: {}", e))
        })?;

        let completion = Arc::new(Completion::new());
        let job = Job {
            payload,
            reply: Reply::new(Arc::clone(&completion)),
        };

        trace!("Sending {} to bridge worker", request.name);
        self.sender
            .send(job)
            .map_err(|_| BridgeError::WorkerDisconnected)?;

        let bytes = completion.wait()?;
        let response: WireResponse = rmp_serde::from_slice(&bytes).map_err(|e| {
            BridgeError::serialization(format!("Invalid response from bridge worker: {}", e))
        })?;

        match response {
            WireResponse::Completed(result) => Ok(result),
            WireResponse::Failed(err) => Err(BridgeError::Engine(err)),
            WireResponse::Rejected(message) => Err(BridgeError::serialization(message)),
        }
    }
}

fn run_worker<E: Engine>(runtime: &Runtime, engine: &E, receiver: &Receiver<Job>) {
    for Job { payload, reply } in receiver.iter() {
        let response = match rmp_serde::from_slice::<ExecutionRequest>(&payload) {
            Ok(request) => WireResponse::from(execute(runtime, engine, request)),
            Err(e) => WireResponse::Rejected(format!("Invalid request for bridge worker: {}", e)),
        };

        let encoded = rmp_serde::to_vec_named(&response).map_err(|e| {
            BridgeError::serialization(format!("Failed to serialize response: {}", e))
        });
        reply.send(encoded);
    }
}

/// Runs one request to completion. A panicking engine fails only this call.
fn execute<E: Engine>(
    runtime: &Runtime,
    engine: &E,
    request: ExecutionRequest,
) -> Result<EngineResult, EngineError> {
    let name = request.name.clone();
    panic::catch_unwind(AssertUnwindSafe(|| runtime.block_on(engine.exec(request))))
        .unwrap_or_else(|payload| {
            let message = panic_message(payload.as_ref());
            warn!("Engine panicked while processing {}: {}", name, message);
            Err(EngineError::runtime(format!("Engine panicked: {}", message)))
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Lazily spawns and memoizes the bridge worker.
///
/// The worker is started at most once per factory, even when first
/// accessed from several threads. A failed start is memoized as well and
/// reported on every use.
pub struct SynchronousProxyFactory<E: Engine> {
    engine: Arc<E>,
    options: BridgeOptions,
    proxy: OnceLock<Result<SyncProxy, String>>,
}

impl<E: Engine> SynchronousProxyFactory<E> {
    /// Creates a factory. Nothing is spawned until `get` is called.
    pub fn new(engine: Arc<E>, options: BridgeOptions) -> Self {
        Self {
            engine,
            options,
            proxy: OnceLock::new(),
        }
    }

    /// Returns the worker handle, starting the worker on first access.
    pub fn get(&self) -> Result<&SyncProxy, BridgeError> {
        self.proxy
            .get_or_init(|| {
                debug!(
                    "Starting bridge worker '{}'",
                    self.options.worker_thread_name
                );
                SyncProxy::spawn(Arc::clone(&self.engine), &self.options)
            })
            .as_ref()
            .map_err(|message| BridgeError::worker_setup(message.clone()))
    }

    /// Returns `true` once `get` has been called.
    pub fn is_initialized(&self) -> bool {
        self.proxy.get().is_some()
    }

    /// The options the worker is started with.
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }
}
