use std::time::Duration;

use tracing::{debug, warn};

use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::ServiceError;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2500);

/// Wraps a transport with a single delayed retry on transport failure.
///
/// A response that arrived is handed back as-is, error status included;
/// only a failure to get any response at all is retried.
pub struct RetryingClient<T> {
    transport: T,
    retry_delay: Duration,
}

impl<T: Transport> RetryingClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request`, retrying once after the delay if no response came
    /// back. A request the server answered is never repeated, even when
    /// its body could not be read.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ServiceError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        match self.transport.execute(request).await {
            Ok(resp) => Ok(resp),
            Err(first) if first.received => Err(after_response(first)),
            Err(first) => {
                warn!(
                    path = %request.path,
                    error = %first,
                    "transport failure, retrying in {:?}",
                    self.retry_delay
                );
                tokio::time::sleep(self.retry_delay).await;
                self.transport
                    .execute(request)
                    .await
                    .map_err(|e| {
                        if e.received {
                            after_response(e)
                        } else {
                            ServiceError::Network(e.message)
                        }
                    })
            }
        }
    }
}

fn after_response(e: TransportError) -> ServiceError {
    warn!(error = %e, "response cut off after status, not retrying");
    ServiceError::Decode(e.message)
}
