//! In-memory event capture for log assertions in tests.
//!
//! Every event is flattened to `field name -> rendered value`; strings are
//! stored unquoted, everything else through its `Debug` rendering.

use crate::logging_facility::schema::{FIELD_EVENT, FIELD_OP};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    /// True for the `event` phase of operation `op`.
    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

struct Flatten<'a>(&'a mut HashMap<String, String>);

impl Visit for Flatten<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer(Buffer);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut Flatten(&mut fields));
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields,
        };
        if let Ok(mut buffer) = self.0.lock() {
            buffer.push(captured);
        }
    }
}

/// Shared handle onto the captured events.
#[derive(Clone, Default)]
pub struct TestCapture(Buffer);

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events logged for operation `op`, oldest first.
    pub fn events_for(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op() == Some(op))
            .collect()
    }

    /// Count events matching a predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics if no `event` was logged for `op`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let seen: Vec<String> = self
            .events_for(op)
            .iter()
            .filter_map(|e| e.event().map(str::to_string))
            .collect();
        assert!(
            seen.iter().any(|e| e == event),
            "no {} event for op {} (saw {:?})",
            event,
            op,
            seen
        );
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.0.lock() {
            buffer.clear();
        }
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (first call only) and
/// return the shared handle.
///
/// Tests in one binary share the buffer, so filter by an `op` or field
/// value that only your test produces.
///
/// # Example
///
/// ```
/// use isoguard_core::logging_facility::test_capture::init_test_capture;
/// use isoguard_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example");
/// capture.assert_event_exists("doc_example", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let capture = TestCapture::default();
            tracing_subscriber::registry()
                .with(CaptureLayer(capture.0.clone()))
                .try_init()
                .ok();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(op: &str, event: &str) -> CapturedEvent {
        let mut fields = HashMap::new();
        fields.insert(FIELD_OP.to_string(), op.to_string());
        fields.insert(FIELD_EVENT.to_string(), event.to_string());
        CapturedEvent {
            level: Level::INFO,
            target: "isoguard_core".to_string(),
            fields,
        }
    }

    #[test]
    fn test_is_matches_op_and_event() {
        let e = event("capture", "end");
        assert!(e.is("capture", "end"));
        assert!(!e.is("capture", "start"));
    }

    #[test]
    fn test_events_for_and_clear() {
        let capture = TestCapture::default();
        if let Ok(mut buffer) = capture.0.lock() {
            buffer.push(event("capture", "start"));
            buffer.push(event("diff", "start"));
        }
        assert_eq!(capture.events_for("capture").len(), 1);
        capture.clear();
        assert!(capture.events().is_empty());
    }
}
