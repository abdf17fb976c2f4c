#![forbid(unsafe_code)]

//! Tracing contract of the store.
//!
//! Every dispatch opens a `store.dispatch` span with the action kind and
//! records its outcome; soft failures are reported as warnings inside it.
//!
//! Run:
//!   cargo test -p bcui-runtime --test tracing_dispatch

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bcui_core::BusinessComponent;
use bcui_runtime::{Action, Store, ViewDescriptor};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Capture layer
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    parent_span_name: Option<String>,
}

#[derive(Clone, Default)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    span_index: Arc<Mutex<HashMap<u64, usize>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let mut spans = self.spans.lock().unwrap();
        self.span_index
            .lock()
            .unwrap()
            .insert(id.into_u64(), spans.len());
        spans.push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        values.record(&mut visitor);
        let index = self.span_index.lock().unwrap();
        if let Some(&idx) = index.get(&id.into_u64()) {
            let mut spans = self.spans.lock().unwrap();
            if let Some(span) = spans.get_mut(idx) {
                span.fields.extend(visitor.0);
            }
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            parent_span_name,
        });
    }
}

fn with_capture<F: FnOnce()>(f: F) -> Capture {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

fn select_view() -> Action {
    Action::SelectView {
        view: ViewDescriptor {
            name: "clients".into(),
            bcs: vec![BusinessComponent::new("client")],
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn dispatch_span_records_action_and_outcome() {
    let capture = with_capture(|| {
        let store = Store::default();
        store.dispatch(select_view());
    });
    let spans = capture.spans.lock().unwrap().clone();
    let dispatch = spans
        .iter()
        .find(|s| s.name == "store.dispatch")
        .expect("store.dispatch span");
    assert_eq!(dispatch.fields.get("action").map(String::as_str), Some("select_view"));
    assert_eq!(dispatch.fields.get("changed").map(String::as_str), Some("true"));
    assert_eq!(dispatch.fields.get("effects").map(String::as_str), Some("1"));
    assert_eq!(dispatch.fields.get("version").map(String::as_str), Some("1"));
    assert!(dispatch.fields.contains_key("duration_us"));
}

#[test]
fn dispatch_event_is_emitted_inside_span() {
    let capture = with_capture(|| {
        Store::default().dispatch(select_view());
    });
    let events = capture.events.lock().unwrap().clone();
    let dispatched = events
        .iter()
        .find(|e| e.message == "action dispatched")
        .expect("dispatch event");
    assert_eq!(dispatched.target, "bcui.store");
    assert_eq!(dispatched.parent_span_name.as_deref(), Some("store.dispatch"));
}

#[test]
fn blocked_operation_warns() {
    let capture = with_capture(|| {
        let store = Store::default();
        store.dispatch(select_view());
        store.dispatch(Action::ChangeDataItems {
            bc_name: "client".into(),
            cursors: vec!["1".into()],
            data_items: Vec::new(),
        });
        store.dispatch(Action::SendOperation {
            bc_name: "unknown".into(),
            operation_type: "save".into(),
        });
    });
    let events = capture.events.lock().unwrap().clone();
    let warnings: Vec<&CapturedEvent> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert!(
        warnings.iter().any(|e| e.target == "bcui.pending"),
        "bulk edit length mismatch should warn: {warnings:?}"
    );
    assert!(
        warnings
            .iter()
            .any(|e| e.target == "bcui.reducer" && e.message == "operation on unknown bc"),
        "{warnings:?}"
    );
    assert!(
        warnings
            .iter()
            .all(|e| e.parent_span_name.as_deref() == Some("store.dispatch"))
    );
}

#[test]
fn missing_association_target_warns() {
    let capture = with_capture(|| {
        Store::default().dispatch(Action::ChangeAssociation {
            bc_name: "client".into(),
            id: "nope".into(),
            selected: true,
            assoc_value_key: None,
            scope: bcui_runtime::AssociationScope::Single,
            policy: bcui_runtime::SelectionPolicy::radio(),
        });
    });
    let events = capture.events.lock().unwrap().clone();
    assert!(events.iter().any(|e| e.level == tracing::Level::WARN
        && e.target == "bcui.association"
        && e.message == "association target not found"));
}
