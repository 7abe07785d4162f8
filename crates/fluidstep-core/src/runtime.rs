use crate::bus::{HostSignal, SignalBus, SignalSender};
use crate::config::FluidConfig;
use crate::error::{FluidError, FluidResult, ModuleStage};
use crate::frame::Frame;
use crate::host::{Host, KindId, ObjectId};
use crate::module::{Module, ModuleCtx};
use crate::player::PlayerExtrapolator;
use crate::pusher::PusherOffsetTracker;
use crate::sched::{IterationReport, SchedulerConfig, TickScheduler, TickTarget};
use crate::smoothing::{Accessor, KindSpec, OverrideRule, SmoothingEngine, SmoothingSettings};
use crate::sync::ShutdownToken;
use crate::time::{Clock, SystemClock};

/// Counters exposed to modules and callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub updates: u64,
    pub draws: u64,
    pub draws_skipped: u64,
    pub tracked: usize,
    pub running_slowly: bool,
}

/// Everything the scheduler drives: the host plus the smoothing machinery around it.
struct Pipeline<H: Host> {
    host: H,
    smoothing: SmoothingEngine<H::World>,
    pushers: PusherOffsetTracker,
    player: PlayerExtrapolator,

    bus: SignalBus,
    signals: SignalSender,
    pending: Vec<HostSignal>,
    suppress_requested: bool,

    modules: Vec<Box<dyn Module>>,
    stats: RuntimeStats,
    shutdown: ShutdownToken,
}

impl<H: Host> Pipeline<H> {
    /// Pulls queued host signals. Draw suppression takes effect immediately, the rest waits for
    /// `apply_signals`.
    fn collect_signals(&mut self) {
        let start = self.pending.len();
        self.bus.drain_into(&mut self.pending);
        if self.pending.len() == start {
            return;
        }
        let mut suppress = false;
        self.pending.retain(|s| {
            if matches!(s, HostSignal::SuppressNextDraw) {
                suppress = true;
                false
            } else {
                true
            }
        });
        self.suppress_requested |= suppress;
    }

    fn apply_signals(&mut self) -> FluidResult<()> {
        self.collect_signals();
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut first_err = None;
        for signal in std::mem::take(&mut self.pending) {
            let res = match signal {
                HostSignal::ObjectCreated { id, kind } => self.smoothing.track(id, kind).map(|_| ()),
                HostSignal::ObjectDestroyed(id) => {
                    self.forget(id);
                    Ok(())
                }
                HostSignal::SceneReset => {
                    self.reset_scene();
                    Ok(())
                }
                HostSignal::PushCollision { actor, platform } => {
                    self.pushers.record_push(actor, platform);
                    Ok(())
                }
                HostSignal::SuppressNextDraw => {
                    self.suppress_requested = true;
                    Ok(())
                }
            };
            if let Err(e) = res {
                first_err.get_or_insert(e);
            }
        }
        self.stats.tracked = self.smoothing.len();

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn forget(&mut self, id: ObjectId) {
        self.smoothing.untrack(id);
        self.pushers.forget(id);
    }

    fn reset_scene(&mut self) {
        self.pushers.clear();
        let n = self.smoothing.rescan(self.host.world());
        self.stats.tracked = n;
        log::debug!("runtime: scene reset, {n} objects tracked");
    }

    fn run_modules(&mut self, stage: ModuleStage, frame: Option<&Frame>) -> FluidResult<()> {
        let Pipeline {
            modules,
            stats,
            signals,
            shutdown,
            ..
        } = self;

        for m in modules.iter_mut() {
            let mut ctx = ModuleCtx::new(stats, signals, shutdown);
            if let Some(f) = frame {
                ctx = ctx.with_frame(f);
            }
            let res = match stage {
                ModuleStage::Init => m.init(&mut ctx),
                ModuleStage::FixedUpdate => m.fixed_update(&mut ctx),
                ModuleStage::Render => m.render(&mut ctx),
                ModuleStage::Shutdown => m.shutdown(&mut ctx),
            };
            res.map_err(|e| FluidError::with_module_stage(m.id(), stage, e))?;
        }
        Ok(())
    }

    /// Reverse registration order. Errors are logged, never stop the teardown.
    fn shutdown_modules(&mut self) {
        let Pipeline {
            modules,
            stats,
            signals,
            shutdown,
            ..
        } = self;

        for m in modules.iter_mut().rev() {
            let mut ctx = ModuleCtx::new(stats, signals, shutdown);
            if let Err(e) = m.shutdown(&mut ctx) {
                log::error!("module '{}' shutdown failed: {e}", m.id());
            }
        }
    }
}

impl<H: Host> TickTarget for Pipeline<H> {
    fn poll_events(&mut self) {
        self.host.poll_events();
    }

    fn update(&mut self, frame: &Frame) -> FluidResult<()> {
        self.pushers.begin_step();
        self.player.on_update();

        self.host.update(frame)?;
        if self.host.is_disposed() {
            log::info!("runtime: host disposed during update {}", frame.update_index);
            return Err(FluidError::HostDisposed);
        }

        // The step is sampled even when a signal fails, so history stays one sample per update.
        let signalled = self.apply_signals();
        self.smoothing.update_history(self.host.world());
        self.pushers.collect_riders(self.host.world(), &self.smoothing);

        self.stats.updates += 1;
        self.stats.running_slowly = frame.running_slowly;
        signalled?;
        self.run_modules(ModuleStage::FixedUpdate, Some(frame))
    }

    fn draw(&mut self, frame: &Frame) -> FluidResult<()> {
        self.apply_signals()?;

        self.smoothing.compute_smoothed(
            self.host.world_mut(),
            frame.elapsed_fraction,
            &self.pushers,
            &mut self.player,
        );
        self.smoothing.apply_smoothed(self.host.world_mut());
        let drawn = self.host.draw(frame);
        self.smoothing.restore_original(self.host.world_mut());
        drawn?;

        self.stats.draws += 1;
        self.stats.running_slowly = frame.running_slowly;
        self.run_modules(ModuleStage::Render, Some(frame))
    }

    fn take_draw_suppression(&mut self) -> bool {
        self.collect_signals();
        std::mem::take(&mut self.suppress_requested)
    }
}

/// Owns the scheduler, the smoothing engine and the host, and drives them.
///
/// The host calls [`tick`](Self::tick) from its own loop, or hands control over with
/// [`run`](Self::run).
pub struct Runtime<H: Host, C: Clock = SystemClock> {
    scheduler: TickScheduler<C>,
    pipeline: Pipeline<H>,
    started: bool,
    shut_down: bool,
}

impl<H: Host> Runtime<H, SystemClock> {
    pub fn new(host: H, config: &FluidConfig) -> FluidResult<Self> {
        Self::with_clock(host, config, SystemClock::new())
    }
}

impl<H: Host, C: Clock> Runtime<H, C> {
    pub fn with_clock(host: H, config: &FluidConfig, clock: C) -> FluidResult<Self> {
        let (sched_cfg, smoothing) = config.validate()?;
        let scheduler = TickScheduler::new(clock, sched_cfg)?;
        let plan = scheduler.plan();
        log::info!(
            "runtime: {:?} update={:?} draw={:?} smoothing={:?}/{:?}",
            plan.pacing,
            plan.update_interval,
            plan.draw_interval,
            smoothing.mode,
            smoothing.player_mode
        );

        let bus = SignalBus::new();
        let signals = bus.sender();
        Ok(Self {
            scheduler,
            pipeline: Pipeline {
                host,
                smoothing: SmoothingEngine::new(smoothing),
                pushers: PusherOffsetTracker::new(),
                player: PlayerExtrapolator::new(),
                bus,
                signals,
                pending: Vec::new(),
                suppress_requested: false,
                modules: Vec::new(),
                stats: RuntimeStats::default(),
                shutdown: ShutdownToken::new(),
            },
            started: false,
            shut_down: false,
        })
    }

    pub fn register_kind(&mut self, kind: KindId, spec: KindSpec, accessor: Accessor<H::World>) {
        self.pipeline.smoothing.register_kind(kind, spec, accessor);
    }

    pub fn add_override_rule(&mut self, rule: impl OverrideRule<H::World> + 'static) {
        self.pipeline.smoothing.add_rule(rule);
    }

    pub fn add_module(&mut self, module: impl Module + 'static) {
        log::debug!("runtime: module '{}' added", module.id());
        self.pipeline.modules.push(Box::new(module));
    }

    /// Handle the host uses to report lifecycle events, pushes and draw suppression.
    #[inline]
    pub fn signals(&self) -> SignalSender {
        self.pipeline.signals.clone()
    }

    #[inline]
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.pipeline.shutdown.clone()
    }

    /// Initializes modules and tracks the world's live objects. Called by the first `tick`.
    pub fn start(&mut self) -> FluidResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        self.pipeline.run_modules(ModuleStage::Init, None)?;
        self.pipeline.reset_scene();
        self.scheduler.reset_timing();
        Ok(())
    }

    /// One scheduler iteration. Errors with `ExitRequested` once shutdown was requested.
    pub fn tick(&mut self) -> FluidResult<IterationReport> {
        if self.shut_down {
            return Err(FluidError::ExitRequested);
        }
        if self.pipeline.shutdown.is_requested() {
            self.shutdown();
            return Err(FluidError::ExitRequested);
        }
        self.start()?;

        let report = self.scheduler.run_one_iteration(&mut self.pipeline)?;
        if report.draw_skipped {
            self.pipeline.stats.draws_skipped += 1;
        }
        Ok(report)
    }

    /// Ticks until shutdown is requested or something fails. Always leaves the runtime shut down.
    pub fn run(&mut self) -> FluidResult<()> {
        loop {
            match self.tick() {
                Ok(_) => {}
                Err(e) if e.is_exit() => return Ok(()),
                Err(e) => {
                    log::error!("runtime: stopping: {e}");
                    self.shutdown();
                    return Err(e);
                }
            }
        }
    }

    /// Tracks a new object immediately. Unknown kinds are an error.
    pub fn object_created(&mut self, id: ObjectId, kind: KindId) -> FluidResult<bool> {
        let added = self.pipeline.smoothing.track(id, kind)?;
        self.pipeline.stats.tracked = self.pipeline.smoothing.len();
        Ok(added)
    }

    pub fn object_destroyed(&mut self, id: ObjectId) {
        self.pipeline.forget(id);
        self.pipeline.stats.tracked = self.pipeline.smoothing.len();
    }

    /// Drops every tracked state and re-tracks the world's live objects.
    pub fn scene_reset(&mut self) {
        self.pipeline.reset_scene();
    }

    #[inline]
    pub fn suppress_next_draw(&mut self) {
        self.scheduler.suppress_next_draw();
    }

    #[inline]
    pub fn draw_suppressed(&self) -> bool {
        self.scheduler.draw_suppressed()
    }

    #[inline]
    pub fn is_running_slowly(&self) -> bool {
        self.scheduler.is_running_slowly()
    }

    pub fn configure_timing(&mut self, config: SchedulerConfig) -> FluidResult<()> {
        self.scheduler.configure(config)
    }

    pub fn set_smoothing(&mut self, settings: SmoothingSettings) {
        self.pipeline.smoothing.set_settings(settings);
    }

    #[inline]
    pub fn stats(&self) -> &RuntimeStats {
        &self.pipeline.stats
    }

    #[inline]
    pub fn smoothing(&self) -> &SmoothingEngine<H::World> {
        &self.pipeline.smoothing
    }

    #[inline]
    pub fn pushers(&self) -> &PusherOffsetTracker {
        &self.pipeline.pushers
    }

    #[inline]
    pub fn scheduler(&self) -> &TickScheduler<C> {
        &self.scheduler
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.pipeline.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.pipeline.host
    }

    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Stops scheduling and drops all tracked state. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.pipeline.shutdown.request();
        self.scheduler.stop();

        let p = &mut self.pipeline;
        p.smoothing.restore_original(p.host.world_mut());
        p.smoothing.clear_all();
        p.pushers.clear();
        p.pending.clear();
        p.stats.tracked = 0;
        if self.started {
            p.shutdown_modules();
        }

        log::info!(
            "runtime: shut down after {} updates, {} draws ({} skipped)",
            p.stats.updates,
            p.stats.draws,
            p.stats.draws_skipped
        );
    }
}

impl<H: Host, C: Clock> Drop for Runtime<H, C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
