#![forbid(unsafe_code)]

//! bcui Runtime
//!
//! State, actions and reducers for a view made of business components.
//!
//! # Key Components
//!
//! - [`Store`] - versioned view state with subscriptions; `dispatch` returns effects
//! - [`Action`] - every state transition, user- or server-originated
//! - [`Effect`] - fetches and invocations the caller performs
//! - [`ViewState`] - BCs, data, row metadata, pending changes, validation fails
//! - [`selectors`] - effective values, selections and the operation gate
//! - [`StoreConfig`] - validation, search and log settings
//! - [`Debouncer`] - trailing-edge debounce for search inputs
//!
//! # Role in bcui
//! `bcui-runtime` sits on top of `bcui-core`. It never performs I/O: a
//! transport layer executes the returned [`Effect`]s and dispatches their
//! responses back as actions.

pub mod action;
pub mod association;
pub mod config;
pub mod debounce;
pub mod effect;
pub mod force_active;
pub mod lifecycle;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod pending;
pub mod reducer;
pub mod selectors;
pub mod state;
pub mod store;
pub mod telemetry;

pub use action::{Action, AssociationScope, HierarchyLevel, SelectionPolicy};
pub use config::{ConfigError, LogConfig, SearchConfig, StoreConfig, ValidationConfig};
pub use debounce::Debouncer;
pub use effect::Effect;
pub use reducer::reduce;
pub use state::{PersistedState, ViewDescriptor, ViewState};
pub use store::{Store, Subscription};
pub use telemetry::DispatchStats;
