#![forbid(unsafe_code)]

//! Dispatch observability.
//!
//! Every dispatch runs inside a `store.dispatch` span carrying the action
//! kind; `version`, `changed`, `effects` and `duration_us` are recorded when
//! the reducer returns. Counters live in [`DispatchStats`], one per store.

use tracing::Span;

use crate::effect::Effect;

/// Per-store dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Actions dispatched.
    pub dispatched: u64,
    /// Dispatches that changed the state.
    pub changed: u64,
    /// Effects returned across all dispatches.
    pub effects: u64,
    /// Operations refused by the validation gate.
    pub blocked_operations: u64,
}

impl DispatchStats {
    pub(crate) fn record(&mut self, changed: bool, effects: usize, blocked: bool) {
        self.dispatched += 1;
        self.changed += u64::from(changed);
        self.effects += effects as u64;
        self.blocked_operations += u64::from(blocked);
    }
}

/// Open the span of one dispatch.
pub(crate) fn dispatch_span(action: &'static str) -> Span {
    tracing::debug_span!(
        "store.dispatch",
        action = action,
        version = tracing::field::Empty,
        changed = tracing::field::Empty,
        effects = tracing::field::Empty,
        duration_us = tracing::field::Empty,
    )
}

/// Record the outcome of a dispatch on the current span.
pub(crate) fn record_dispatch(
    action: &'static str,
    version: u64,
    changed: bool,
    effects: &[Effect],
    duration_us: u64,
) {
    let span = Span::current();
    span.record("version", version);
    span.record("changed", changed);
    span.record("effects", effects.len() as u64);
    span.record("duration_us", duration_us);

    tracing::debug!(
        target: "bcui.store",
        action = action,
        version,
        changed,
        effects = effects.len() as u64,
        duration_us,
        "action dispatched"
    );
    for effect in effects {
        tracing::trace!(
            target: "bcui.store",
            effect = effect.kind(),
            bc = %effect.bc_name(),
            "effect requested"
        );
    }
}
