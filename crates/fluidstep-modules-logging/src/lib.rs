use env_logger::fmt::style::{AnsiColor, Style};
use env_logger::{Builder, WriteStyle};
use fluidstep_core::{FluidError, FluidResult, Module, ModuleCtx};
use log::{Level, LevelFilter};

use std::io::Write;

#[derive(Debug, Clone)]
pub struct ConsoleLoggerConfig {
    pub level: LevelFilter,
    pub colors: bool,
    pub include_module: bool,
}

impl ConsoleLoggerConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("FLUIDSTEP_LOG").ok().as_deref(),
            std::env::var("FLUIDSTEP_LOG_COLORS").ok().as_deref(),
            std::env::var("FLUIDSTEP_LOG_MODULE").ok().as_deref(),
        )
    }

    fn from_vars(level: Option<&str>, colors: Option<&str>, include_module: Option<&str>) -> Self {
        Self {
            level: level
                .and_then(|v| v.trim().parse::<LevelFilter>().ok())
                .unwrap_or(LevelFilter::Info),
            colors: flag(colors),
            include_module: flag(include_module),
        }
    }
}

/// Unset means on; only "0" turns a switch off.
fn flag(v: Option<&str>) -> bool {
    v.map(|v| v.trim() != "0").unwrap_or(true)
}

impl Default for ConsoleLoggerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::Error => AnsiColor::Red.on_default().bold(),
        Level::Warn => AnsiColor::Yellow.on_default().bold(),
        Level::Info => AnsiColor::Green.on_default(),
        Level::Debug => AnsiColor::Blue.on_default(),
        Level::Trace => AnsiColor::Magenta.on_default(),
    }
}

pub struct ConsoleLoggerModule {
    config: ConsoleLoggerConfig,
    initialized: bool,
}

impl ConsoleLoggerModule {
    #[inline]
    pub fn new(config: ConsoleLoggerConfig) -> Self {
        Self {
            config,
            initialized: false,
        }
    }

    #[inline]
    pub fn config(&self) -> &ConsoleLoggerConfig {
        &self.config
    }
}

impl Default for ConsoleLoggerModule {
    fn default() -> Self {
        Self::new(ConsoleLoggerConfig::from_env())
    }
}

impl Module for ConsoleLoggerModule {
    fn id(&self) -> &'static str {
        "console-logger"
    }

    fn init(&mut self, _ctx: &mut ModuleCtx<'_>) -> FluidResult<()> {
        if self.initialized {
            return Ok(());
        }

        let mut builder = Builder::new();
        builder.filter_level(self.config.level);
        if !self.config.colors {
            builder.write_style(WriteStyle::Never);
        }

        let config = self.config.clone();
        builder.format(move |buf, record| {
            let style = if config.colors {
                level_style(record.level())
            } else {
                Style::new()
            };

            if config.include_module {
                writeln!(
                    buf,
                    "[{style}{:<5}{style:#}] {:<25} {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            } else {
                writeln!(buf, "[{style}{:<5}{style:#}] {}", record.level(), record.args())
            }
        });

        builder
            .try_init()
            .map_err(|e| FluidError::other(format!("logger init failed: {e}")))?;

        self.initialized = true;
        log::debug!("console-logger: level={}", self.config.level);
        Ok(())
    }
}
