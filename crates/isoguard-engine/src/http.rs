//! HTTP system under test: POSTs each workload as JSON and treats any 2xx
//! status as success.

use crate::invoker::{InvocationRequest, InvocationResponse, SystemUnderTest};
use isoguard_core::errors::{ExError, ExErrorKind, Result};
use isoguard_core::{log_op_end, log_op_error, log_op_start};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Request body understood by the backtest service.
#[derive(Debug, Serialize)]
struct InvocationBody<'a> {
    json: &'a serde_json::Value,
    period: &'a str,
    hash: &'a str,
    end_date: &'a str,
}

pub struct HttpSystemUnderTest {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpSystemUnderTest {
    /// # Errors
    ///
    /// `InvocationError` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().build().map_err(|e| {
            ExError::new(ExErrorKind::InvocationError)
                .with_op("http_client")
                .with_message(e.to_string())
        })?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn transport_error(err: reqwest::Error, request: &InvocationRequest) -> ExError {
    let kind = if err.is_timeout() {
        ExErrorKind::Timeout
    } else {
        ExErrorKind::InvocationError
    };
    ExError::new(kind)
        .with_op("invoke")
        .with_request_id(request.request_id.clone())
        .with_message(err.to_string())
}

impl SystemUnderTest for HttpSystemUnderTest {
    fn invoke(&self, request: &InvocationRequest, timeout: Duration) -> Result<InvocationResponse> {
        let started = Instant::now();
        log_op_start!(
            "invoke",
            endpoint = %self.endpoint,
            request_id = %request.request_id
        );

        let body = InvocationBody {
            json: &request.payload,
            period: &request.period,
            hash: request.request_id.as_str(),
            end_date: &request.end_date,
        };
        let result = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&body)
            .send();

        match result {
            Ok(response) => {
                let status = response.status();
                log_op_end!(
                    "invoke",
                    duration_ms = started.elapsed().as_millis() as u64,
                    request_id = %request.request_id,
                    status = status.as_u16()
                );
                Ok(InvocationResponse {
                    status: status.as_u16(),
                    success: status.is_success(),
                })
            }
            Err(e) => {
                let err = transport_error(e, request);
                log_op_error!(
                    "invoke",
                    err.clone(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    request_id = %request.request_id
                );
                Err(err)
            }
        }
    }
}
