#![forbid(unsafe_code)]

//! The view store.
//!
//! # Design
//!
//! [`Store`] owns one [`ViewState`] in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). [`Store::dispatch`] runs the root reducer, bumps the
//! version when the state changed (compared by `PartialEq` against a
//! snapshot) and notifies live subscribers in registration order. The
//! effects returned by the reducer are handed back to the caller.
//!
//! Cloning a `Store` creates another handle to the same state.
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 on each state-changing dispatch.
//! 2. A dispatch that leaves the state equal is not notified.
//! 3. Subscribers are notified in registration order.
//! 4. Dead subscribers (dropped [`Subscription`] guards) are pruned lazily.
//!
//! # Failure Modes
//!
//! - **Re-entrant dispatch**: dispatching from inside a subscriber callback
//!   is allowed; the nested dispatch completes and notifies before the
//!   outer notification loop continues.
//! - **Subscriber leak**: guards stored indefinitely keep their callbacks
//!   alive.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use web_time::Instant;

use crate::action::Action;
use crate::config::StoreConfig;
use crate::effect::Effect;
use crate::reducer;
use crate::state::{PersistedState, ViewState};
use crate::telemetry::{self, DispatchStats};

type CallbackRc = Rc<dyn Fn(&ViewState)>;
type CallbackWeak = Weak<dyn Fn(&ViewState)>;

struct StoreInner {
    state: ViewState,
    config: StoreConfig,
    version: u64,
    stats: DispatchStats,
    subscribers: Vec<CallbackWeak>,
}

/// Shared, versioned view state with change notification.
pub struct Store {
    inner: Rc<RefCell<StoreInner>>,
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("view", &inner.state.view_name)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl Store {
    /// Empty store. Validation fails use the configured format.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let state = ViewState::new(config.validation.format);
        Self::with_state(config, state)
    }

    /// Store seeded with an existing state.
    #[must_use]
    pub fn with_state(config: StoreConfig, state: ViewState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                state,
                config,
                version: 0,
                stats: DispatchStats::default(),
                subscribers: Vec::new(),
            })),
        }
    }

    /// Apply an action and return the effects it requests.
    pub fn dispatch(&self, action: Action) -> Vec<Effect> {
        let kind = action.kind();
        let span = telemetry::dispatch_span(kind);
        let _guard = span.enter();
        let start = Instant::now();

        let (effects, changed, version) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let gated = matches!(
                &action,
                Action::SendOperation { bc_name, .. }
                    if inner.state.pending_validation_fails.has_pending(bc_name)
            );
            let before = inner.state.clone();
            let effects = reducer::reduce(&mut inner.state, action, &inner.config);
            let changed = inner.state != before;
            if changed {
                inner.version += 1;
            }
            inner.stats.record(changed, effects.len(), gated);
            (effects, changed, inner.version)
        };

        let duration_us = start.elapsed().as_micros() as u64;
        telemetry::record_dispatch(kind, version, changed, &effects, duration_us);

        if changed {
            self.notify();
        }
        effects
    }

    /// Access the state by reference.
    pub fn with_state_ref<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&self.inner.borrow().state)
    }

    /// A clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.inner.borrow().state.clone()
    }

    /// Current version. Useful for dirty-checking.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.inner.borrow().stats
    }

    #[must_use]
    pub fn config(&self) -> StoreConfig {
        self.inner.borrow().config.clone()
    }

    /// The persisted part of the state.
    #[must_use]
    pub fn persisted(&self) -> PersistedState {
        self.inner.borrow().state.persisted()
    }

    /// Replace the persisted part of the state.
    ///
    /// On error the state is left untouched.
    pub fn restore(&self, persisted: PersistedState) -> bcui_core::Result<()> {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let mut next = inner.state.clone();
            next.restore(persisted)?;
            let changed = next != inner.state;
            if changed {
                inner.state = next;
                inner.version += 1;
            }
            changed
        };
        if changed {
            self.notify();
        }
        Ok(())
    }

    /// Subscribe to state changes.
    ///
    /// Dropping the returned [`Subscription`] unsubscribes the callback.
    pub fn subscribe(&self, callback: impl Fn(&ViewState) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let (callbacks, state): (Vec<CallbackRc>, ViewState) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks = inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect();
            (callbacks, inner.state.clone())
        };
        for callback in &callbacks {
            callback(&state);
        }
    }
}

/// RAII guard for a store subscriber.
///
/// Dropping it makes the callback unreachable; its slot is pruned on the
/// next notification.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
