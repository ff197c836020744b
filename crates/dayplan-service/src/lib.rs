mod client;
mod http;
mod local;
mod traits;
mod transport;

pub use client::{RetryingClient, DEFAULT_RETRY_DELAY};
pub use http::HttpService;
pub use local::MemoryService;
pub use traits::{ServiceError, TrackerService};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport, TransportError};
