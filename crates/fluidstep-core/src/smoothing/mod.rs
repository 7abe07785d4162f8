//! Per-object motion smoothing.
//!
//! Every simulation step the engine samples each tracked object's authoritative value into a short
//! history. Every draw it derives a smoothed value from that history, writes it onto the object for
//! the duration of the draw call, then restores the authoritative value.

mod accessor;
mod engine;
mod history;
mod kind;
mod policy;
mod registry;
mod rules;
mod state;
mod value;

pub use accessor::{Accessor, FnAccessor, FnPathAccessor, PathAccessor, ValueAccessor};
pub use engine::{SmoothingEngine, SmoothingSettings};
pub use history::{History, MAX_HISTORY};
pub use kind::{KindEntry, KindRegistry, KindRole, KindSpec};
pub use policy::{smooth, SmoothParams, SmoothingMode, DEFAULT_TELEPORT_THRESHOLD};
pub use registry::ObjectSmoothingRegistry;
pub use rules::{FnRule, OverrideRule, OverrideRules};
pub use state::{SmoothingState, StatePhase};
pub use value::{Sample, Smoothable, ValueKind};
