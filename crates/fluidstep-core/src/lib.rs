pub mod bus;
pub mod config;
pub mod core_invariants;
pub mod error;
pub mod frame;
pub mod host;
pub mod math;
pub mod module;
pub mod player;
pub mod pusher;
pub mod runtime;
pub mod sched;
pub mod smoothing;
pub mod sync;
pub mod telemetry;
pub mod time;

pub use bus::{HostSignal, SignalBus, SignalSender};
pub use config::{FluidConfig, SmoothingConfig, TelemetryConfig, TimingConfig};
pub use error::{FluidError, FluidResult, ModuleStage};
pub use frame::{Frame, FrameKind};
pub use host::{Host, HostWorld, KindId, ObjectId};
pub use math::{Angle, Vec2};
pub use module::{Module, ModuleCtx};
pub use player::{InputPeek, InputSource, PlayerExtrapolator, PlayerFrame};
pub use pusher::PusherOffsetTracker;
pub use runtime::{Runtime, RuntimeStats};
pub use sched::{IterationReport, Pacing, SchedulerConfig, TickScheduler, TickTarget};
pub use smoothing::{
    Accessor, FnAccessor, FnPathAccessor, FnRule, KindRole, KindSpec, OverrideRule, PathAccessor,
    Sample, SmoothingEngine, SmoothingMode, SmoothingSettings, SmoothingState, ValueAccessor,
    ValueKind,
};
pub use sync::ShutdownToken;
pub use telemetry::TelemetryModule;
pub use time::{Clock, ManualClock, SystemClock};
