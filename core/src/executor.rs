//! The request executor.
//!
//! # Design
//! Each `Executor` owns one worker thread fed by an unbounded FIFO queue, so
//! attempts from one executor never overlap and finish in submission order.
//! The worker performs the whole exchange (connect, write, read, classify)
//! and then hands the outcome to the configured `Dispatcher`, which decides
//! where the callback runs. A throttled request keeps the worker asleep for
//! the throttle interval after its callback has been dispatched.
//!
//! Every submitted request produces exactly one callback. Failures inside an
//! attempt, including a panicking transport, are folded into an `ApiStatus`.
//! Dropping the executor closes the queue; requests already queued still run
//! and still complete.

use std::future::Future;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;

use crossbeam::channel;
use tokio::sync::oneshot;

use crate::classify;
use crate::config::ExecutorConfig;
use crate::dispatch::{Dispatcher, Inline};
use crate::error::AttemptError;
use crate::http::ApiRequest;
use crate::sink::{LogSink, RequestLog};
use crate::status::{ApiStatus, Outcome};
use crate::transport::{Transport, UreqTransport};

type Completion = Box<dyn FnOnce(Outcome) + Send + 'static>;

struct Attempt {
    request: ApiRequest,
    on_complete: Completion,
}

/// Runs HTTP requests one at a time on a dedicated background thread.
pub struct Executor {
    queue: Option<channel::Sender<Attempt>>,
    worker: Option<thread::JoinHandle<()>>,
    dispatcher: Arc<dyn Dispatcher>,
    log_sink: Option<Arc<dyn LogSink>>,
}

impl Executor {
    /// Executor over `transport` that runs callbacks on its worker thread.
    pub fn new(transport: impl Transport + 'static) -> io::Result<Self> {
        Self::builder().transport(transport).build()
    }

    /// Builder for an executor with a custom transport, dispatcher, sink or config.
    pub fn builder() -> ExecutorBuilder {
        ExecutorBuilder::default()
    }

    /// Queue `request`; `on_complete` runs exactly once, on the dispatcher.
    pub fn request<F>(&self, request: ApiRequest, on_complete: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        self.enqueue(request, Box::new(on_complete));
    }

    /// Queue `request` without observing its outcome.
    pub fn request_detached(&self, request: ApiRequest) {
        self.enqueue(request, Box::new(|_: Outcome| {}));
    }

    /// Queue `request` and return a handle to its outcome.
    ///
    /// The handle resolves once the dispatcher has run the completion, so with
    /// a `ForegroundLane` the lane has to be pumped first.
    pub fn submit(&self, request: ApiRequest) -> PendingOutcome {
        let (sender, receiver) = oneshot::channel();
        self.enqueue(
            request,
            Box::new(move |outcome: Outcome| {
                let _ = sender.send(outcome);
            }),
        );
        PendingOutcome { receiver }
    }

    /// Close the queue and wait for every queued request to finish.
    pub fn shutdown(mut self) {
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("request worker panicked");
            }
        }
    }

    fn enqueue(&self, request: ApiRequest, on_complete: Completion) {
        let log = RequestLog::new(request.log_sink.as_deref().or(self.log_sink.as_deref()));
        log.debug(|| {
            format!(
                "API request | method = {}; url = {}; headers = {:?}; params = {}",
                request.method,
                request.url,
                request.headers,
                request
                    .body
                    .as_ref()
                    .map(classify::render)
                    .unwrap_or_else(|| "null".to_string())
            )
        });

        let attempt = Attempt {
            request,
            on_complete,
        };
        let Some(queue) = &self.queue else {
            return fail_undelivered(&*self.dispatcher, attempt);
        };
        if let Err(channel::SendError(attempt)) = queue.send(attempt) {
            tracing::error!("request worker is gone");
            fail_undelivered(&*self.dispatcher, attempt);
        }
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        // Detach: the worker drains what is queued, then exits.
        self.queue.take();
    }
}

fn fail_undelivered(dispatcher: &dyn Dispatcher, attempt: Attempt) {
    let on_complete = attempt.on_complete;
    dispatcher.dispatch(Box::new(move || {
        on_complete(Outcome::failure(ApiStatus::ErrorUnknown))
    }));
}

/// Configures and starts an `Executor`.
#[derive(Default)]
pub struct ExecutorBuilder {
    transport: Option<Arc<dyn Transport>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    log_sink: Option<Arc<dyn LogSink>>,
    config: ExecutorConfig,
}

impl ExecutorBuilder {
    /// Defaults to a `UreqTransport` built from the configured timeouts and
    /// body limit.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Defaults to `Inline`.
    pub fn dispatcher(mut self, dispatcher: impl Dispatcher + 'static) -> Self {
        self.dispatcher = Some(Arc::new(dispatcher));
        self
    }

    /// Sink for requests that do not carry their own.
    pub fn log_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.log_sink = Some(Arc::new(sink));
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> io::Result<Executor> {
        let config = self.config;
        let transport = self
            .transport
            .unwrap_or_else(|| {
                Arc::new(
                    UreqTransport::with_timeouts(config.timeouts)
                        .max_response_body(config.max_response_body),
                )
            });
        let dispatcher = self.dispatcher.unwrap_or_else(|| Arc::new(Inline));

        let (sender, receiver) = channel::unbounded();
        let worker = Worker {
            transport,
            dispatcher: dispatcher.clone(),
            log_sink: self.log_sink.clone(),
            config,
        };
        let handle = thread::Builder::new()
            .name("api-executor-worker".to_string())
            .spawn(move || worker.run(receiver))?;

        Ok(Executor {
            queue: Some(sender),
            worker: Some(handle),
            dispatcher,
            log_sink: self.log_sink,
        })
    }
}

struct Worker {
    transport: Arc<dyn Transport>,
    dispatcher: Arc<dyn Dispatcher>,
    log_sink: Option<Arc<dyn LogSink>>,
    config: ExecutorConfig,
}

impl Worker {
    fn run(self, queue: channel::Receiver<Attempt>) {
        tracing::debug!("request worker started");
        for Attempt {
            request,
            on_complete,
        } in queue.iter()
        {
            let outcome = self.attempt(&request);
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                status = %outcome.status(),
                "request finished"
            );

            let dispatched = panic::catch_unwind(AssertUnwindSafe(|| {
                self.dispatcher
                    .dispatch(Box::new(move || on_complete(outcome)))
            }));
            if dispatched.is_err() {
                tracing::error!(url = %request.url, "completion callback panicked");
            }

            if request.throttle {
                thread::sleep(self.config.throttle_interval);
            }
        }
        tracing::debug!("request worker stopped");
    }

    fn attempt(&self, request: &ApiRequest) -> Outcome {
        let log = RequestLog::new(request.log_sink.as_deref().or(self.log_sink.as_deref()));
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.exchange(request, log)))
            .unwrap_or(Err(AttemptError::Panicked));

        result.unwrap_or_else(|err| {
            tracing::debug!(url = %request.url, error = %err, "request failed");
            Outcome::failure(err.status())
        })
    }

    fn exchange(&self, request: &ApiRequest, log: RequestLog<'_>) -> Result<Outcome, AttemptError> {
        let http_request = request.to_http()?;
        let response = self.transport.send(&http_request)?;
        classify::interpret(&http_request, &response, log)
    }
}

/// The outcome of a request queued with `Executor::submit`.
///
/// Await it from async code, or call `wait` from a plain thread.
pub struct PendingOutcome {
    receiver: oneshot::Receiver<Outcome>,
}

impl PendingOutcome {
    /// Block until the outcome arrives. Must not be called from within an
    /// async runtime.
    pub fn wait(self) -> Outcome {
        self.receiver.blocking_recv().unwrap_or_else(|_| lost())
    }
}

impl Future for PendingOutcome {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| lost()))
    }
}

// The completion was dropped without running, e.g. its foreground lane went away.
fn lost() -> Outcome {
    Outcome::failure(ApiStatus::ErrorUnknown)
}
