use crate::bus::SignalSender;
use crate::error::FluidResult;
use crate::frame::Frame;
use crate::runtime::RuntimeStats;
use crate::sync::ShutdownToken;

/// Optional component hooked into the runtime lifecycle.
///
/// `fixed_update` runs after every simulation step, once history is sampled. `render` runs after
/// every draw, once authoritative values are restored.
pub trait Module {
    fn id(&self) -> &'static str {
        "module"
    }

    fn init(&mut self, _ctx: &mut ModuleCtx<'_>) -> FluidResult<()> {
        Ok(())
    }

    fn fixed_update(&mut self, _ctx: &mut ModuleCtx<'_>) -> FluidResult<()> {
        Ok(())
    }

    fn render(&mut self, _ctx: &mut ModuleCtx<'_>) -> FluidResult<()> {
        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut ModuleCtx<'_>) -> FluidResult<()> {
        Ok(())
    }
}

/// Context passed to modules.
///
/// Modules see the runtime through this, never through `&mut Runtime`.
pub struct ModuleCtx<'a> {
    stats: &'a RuntimeStats,
    signals: &'a SignalSender,
    shutdown: &'a ShutdownToken,

    /// Frame snapshot for the current stage (stored by value).
    frame: Option<Frame>,
}

impl<'a> ModuleCtx<'a> {
    #[inline]
    pub(crate) fn new(
        stats: &'a RuntimeStats,
        signals: &'a SignalSender,
        shutdown: &'a ShutdownToken,
    ) -> Self {
        Self {
            stats,
            signals,
            shutdown,
            frame: None,
        }
    }

    #[inline]
    pub(crate) fn with_frame(mut self, frame: &Frame) -> Self {
        self.frame = Some(*frame);
        self
    }

    /// Returns the current frame snapshot, if attached.
    #[inline]
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    #[inline]
    pub fn stats(&self) -> &RuntimeStats {
        self.stats
    }

    /// Same channel the host uses; signals are drained after the next simulation step and before
    /// the next draw.
    #[inline]
    pub fn signals(&self) -> &SignalSender {
        self.signals
    }

    #[inline]
    pub fn request_exit(&self) {
        self.shutdown.request();
    }

    #[inline]
    pub fn is_exit_requested(&self) -> bool {
        self.shutdown.is_requested()
    }
}
