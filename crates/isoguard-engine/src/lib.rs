//! isoguard Engine - verification orchestration
//!
//! Drives the system under test twice against one cache root, captures a
//! snapshot after each invocation and asserts that the second workload left
//! the first workload's artifacts untouched.

pub mod config;
pub mod http;
pub mod invoker;
pub mod orchestrator;
pub mod report;
pub mod scenarios;

pub use config::VerifyConfig;
pub use http::HttpSystemUnderTest;
pub use invoker::{InvocationRequest, InvocationResponse, SystemUnderTest};
pub use orchestrator::{
    verify_isolation, AbortedRun, Phase, VerificationOutcome, VerificationReport, VerifyPlan,
};
pub use report::{render_verification_summary, write_verification_report};
pub use scenarios::run_scenarios;
