//! The system under test, seen from the orchestrator.
//!
//! The wire format belongs to the collaborator; the orchestrator only needs
//! a success signal back for each request.

use isoguard_core::errors::Result;
use isoguard_core_types::RequestId;
use std::time::Duration;

/// One workload submission.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    /// Opaque workload body
    pub payload: serde_json::Value,
    /// Period / window parameter forwarded as-is
    pub period: String,
    /// Fresh per invocation, so two invocations never collide
    pub request_id: RequestId,
    pub end_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status: u16,
    pub success: bool,
}

/// Something that runs workloads and writes artifacts under the cache root.
///
/// Implementations must not retry; a failed invocation is reported as-is.
pub trait SystemUnderTest: Send + Sync {
    /// Submit `request`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// - `Timeout` if no response arrives within `timeout`
    /// - `InvocationError` on transport failure
    ///
    /// A response that arrives but signals failure is `Ok` with
    /// `success == false`.
    fn invoke(&self, request: &InvocationRequest, timeout: Duration) -> Result<InvocationResponse>;
}
