mod config;
mod world;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use fluidstep_core::{
    FluidResult, FnRule, Module, ModuleCtx, Runtime, ShutdownToken, SmoothingState,
    TelemetryModule,
};
use fluidstep_modules_input::{InputDevice, InputEvent, KeyCode, KeyState, LiveInput};
use fluidstep_modules_logging::{ConsoleLoggerConfig, ConsoleLoggerModule};
use log::info;

use crate::config::DemoConfig;
use crate::world::{kinds, DemoHost, DemoWorld};

/// Requests exit once enough simulation steps ran.
struct RunFor {
    updates: u64,
}

impl Module for RunFor {
    fn id(&self) -> &'static str {
        "run-for"
    }

    fn fixed_update(&mut self, ctx: &mut ModuleCtx<'_>) -> FluidResult<()> {
        if self.updates > 0 && ctx.stats().updates >= self.updates {
            info!("run-for: {} updates done", self.updates);
            ctx.request_exit();
        }
        Ok(())
    }
}

/// Plays a platform input thread: taps the first dash key periodically.
fn spawn_tapper(live: LiveInput, key: KeyCode, period: Duration, stop: ShutdownToken) {
    thread::spawn(move || {
        while !stop.is_requested() {
            thread::sleep(period);
            live.push(InputEvent::Key {
                code: key,
                state: KeyState::Pressed,
                repeat: false,
            });
            thread::sleep(Duration::from_millis(30));
            live.push(InputEvent::Key {
                code: key,
                state: KeyState::Released,
                repeat: false,
            });
        }
    });
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let cfg = DemoConfig::load(path.as_deref())?;

    let live = LiveInput::new();
    let device = InputDevice::new(live.clone(), cfg.demo.dash.clone());
    let world = DemoWorld::new(device);

    let mut runtime = Runtime::new(DemoHost::new(world), &cfg.fluid)?;
    let signals = runtime.signals();
    runtime.host_mut().attach(signals);

    for (kind, spec, accessor) in kinds() {
        runtime.register_kind(kind, spec, accessor);
    }
    runtime.add_override_rule(FnRule::new(
        "boosting",
        |w: &DemoWorld, s: &SmoothingState| w.is_boosting(s.id()),
    ));

    runtime.add_module(ConsoleLoggerModule::new(ConsoleLoggerConfig::from_env()));
    runtime.add_module(TelemetryModule::new(
        cfg.fluid.telemetry.log_rates,
        cfg.fluid.telemetry.period(),
    ));
    runtime.add_module(RunFor {
        updates: (cfg.demo.seconds * cfg.fluid.timing.update_hz).round() as u64,
    });

    let token = runtime.shutdown_token();
    {
        let token = token.clone();
        ctrlc::set_handler(move || token.request())?;
    }

    if let Some(&key) = cfg.demo.dash.keys.first() {
        spawn_tapper(
            live,
            key,
            Duration::from_millis(cfg.demo.dash_period_ms.max(50)),
            token.clone(),
        );
    }

    runtime.run()?;

    let stats = *runtime.stats();
    info!(
        "demo: updates={} draws={} skipped={} host_draws={}",
        stats.updates,
        stats.draws,
        stats.draws_skipped,
        runtime.host().draws()
    );
    token.request();
    Ok(())
}
