//! Single-attempt HTTP request executor.
//!
//! # Overview
//! An `Executor` takes a fully formed `ApiRequest`, performs it on a
//! dedicated background thread, and reports exactly one `Outcome` through a
//! completion callback. The outcome's `ApiStatus` is one of a small closed
//! set: transport failures, unparseable bodies and well-formed HTTP errors
//! are all folded into a status rather than surfaced as errors.
//!
//! # Design
//! - Requests from one executor run strictly one at a time, in submission
//!   order. A throttled request holds the worker for a fixed interval
//!   afterwards.
//! - The network is behind the `Transport` trait. `UreqTransport` is the
//!   production implementation with fixed connect and read timeouts.
//! - Callbacks run wherever the `Dispatcher` puts them: inline on the worker,
//!   or on a caller-owned `ForegroundLane`.
//! - There are no retries. One call, one attempt, one outcome.
//!
//! ```no_run
//! use api_executor::{ApiRequest, Executor, HttpMethod, TracingSink};
//!
//! let executor = Executor::builder().log_sink(TracingSink).build()?;
//! let outcome = executor
//!     .submit(ApiRequest::new(HttpMethod::Get, "https://api.example.com/v1/config"))
//!     .wait();
//! println!("{}", outcome.status());
//! # Ok::<(), std::io::Error>(())
//! ```

mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod http;
pub mod sink;
pub mod status;
pub mod transport;

pub use config::{
    ExecutorConfig, Timeouts, CONNECT_TIMEOUT, MAX_RESPONSE_BODY, READ_TIMEOUT, THROTTLE_INTERVAL,
};
pub use dispatch::{Dispatcher, ForegroundHandle, ForegroundLane, Inline, Job};
pub use error::{AttemptError, ParseMethodError, TransportError};
pub use executor::{Executor, ExecutorBuilder, PendingOutcome};
pub use http::{ApiRequest, HttpMethod, HttpRequest, HttpResponse, JsonObject};
pub use sink::{LogSink, TracingSink};
pub use status::{ApiStatus, Outcome};
pub use transport::{Transport, UreqTransport};
