use std::{backtrace::Backtrace, fs, path::PathBuf};

use anyhow::{Context, bail};
use calloop::{
    EventLoop, LoopSignal,
    channel::{self, Channel},
    signals::{Signal, Signals},
};
use ivi_shell::{Event, Shell, ShellError, config, replay};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

enum Command {
    /// Feed a script of events through the shell.
    Run { script: PathBuf },
    /// Load the configuration and exit.
    CheckConfig,
}

struct Args {
    config: Option<PathBuf>,
    command: Command,
}

/// Loop data: the shell plus what the driver needs to stop the loop.
struct Driver {
    shell: Shell,
    signal: LoopSignal,
    failed: usize,
}

impl Driver {
    fn dispatch(&mut self, event: Event) {
        if let Err(err) = self.shell.handle(event) {
            self.failed += 1;
            if err.is_client_fatal() {
                tracing::error!("client terminated: {err}");
            }
        }
    }

    fn flush(&mut self) {
        for action in self.shell.take_actions() {
            tracing::info!(%action, "outbound");
        }
        for output in self.shell.take_damage() {
            if let Some(output) = self.shell.outputs.get(output) {
                tracing::debug!(output = %output.name, "repaint");
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_backtrace_defaults();
    init_logging()?;
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::force_capture();
        tracing::error!("panic: {panic_info}\n{backtrace}");
        eprintln!("panic: {panic_info}\n{backtrace}");
    }));

    let args = parse_args(std::env::args().skip(1))?;
    let loaded = config::load_or_create_default(args.config)?;
    tracing::info!(path = %loaded.path.display(), "config loaded");

    let script = match args.command {
        Command::CheckConfig => {
            println!(
                "{}: ok, {} output(s) configured",
                loaded.path.display(),
                loaded.config.outputs.len()
            );
            return Ok(());
        }
        Command::Run { script } => script,
    };

    let content = fs::read_to_string(&script)
        .with_context(|| format!("failed to read script {}", script.display()))?;
    let events = replay::parse_script(&content)
        .with_context(|| format!("invalid script {}", script.display()))?;

    if let Some(command) = &loaded.config.shell_client_command {
        tracing::info!(%command, "shell client command configured");
    }

    let mut event_loop: EventLoop<Driver> =
        EventLoop::try_new().map_err(|e| ShellError::EventLoop(e.to_string()))?;

    let mut shell = Shell::new(loaded.config);
    shell.add_configured_outputs()?;
    let mut driver = Driver {
        shell,
        signal: event_loop.get_signal(),
        failed: 0,
    };

    let (sender, events_channel) = channel::channel::<Event>();
    insert_event_source(&event_loop, events_channel)?;

    let signals = Signals::new(&[Signal::SIGINT, Signal::SIGTERM])
        .map_err(|e| ShellError::EventLoop(e.to_string()))?;
    event_loop
        .handle()
        .insert_source(signals, |event, _, driver| {
            tracing::info!(signal = ?event.signal(), "stopping");
            driver.signal.stop();
        })
        .map_err(|e| ShellError::EventLoop(format!("failed to watch signals: {e}")))?;

    let total = events.len();
    for event in events {
        sender
            .send(event)
            .map_err(|e| ShellError::EventLoop(e.to_string()))?;
    }
    // Closing the channel stops the loop once every event was handled.
    drop(sender);

    event_loop
        .run(None, &mut driver, |driver| driver.flush())
        .map_err(|e| ShellError::EventLoop(e.to_string()))?;
    driver.flush();

    tracing::info!(events = total, failed = driver.failed, "script finished");
    Ok(())
}

fn insert_event_source(
    event_loop: &EventLoop<Driver>,
    events: Channel<Event>,
) -> Result<(), ShellError> {
    event_loop
        .handle()
        .insert_source(events, |event, _, driver| match event {
            channel::Event::Msg(event) => driver.dispatch(event),
            channel::Event::Closed => driver.signal.stop(),
        })
        .map_err(|e| ShellError::EventLoop(format!("failed to insert event source: {e}")))?;
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut config = None;
    let mut command = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "check-config" => command = Some(Command::CheckConfig),
            "run" => {
                let script = args.next().context("run needs a script path")?;
                command = Some(Command::Run {
                    script: PathBuf::from(script),
                });
            }
            other => bail!("unknown argument `{other}`; usage: ivi-shell [--config PATH] run SCRIPT | check-config"),
        }
    }
    let command = command.context("usage: ivi-shell [--config PATH] run SCRIPT | check-config")?;
    Ok(Args { config, command })
}

fn init_backtrace_defaults() {
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // Safety: called at startup before creating any threads.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    if std::env::var_os("RUST_LIB_BACKTRACE").is_none() {
        // Safety: called at startup before creating any threads.
        unsafe { std::env::set_var("RUST_LIB_BACKTRACE", "0") };
    }
}

const DEFAULT_LOG_FILTER: &str = concat!(
    "ivi_shell=debug,",
    "ivi_shell::handlers=debug,",
    "ivi_shell::layout=debug"
);

fn init_logging() -> Result<(), ShellError> {
    let log_dir: PathBuf = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("log");
    fs::create_dir_all(&log_dir).map_err(|err| {
        ShellError::Config(format!(
            "failed to create log directory {}: {err}",
            log_dir.display()
        ))
    })?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "ivi-shell.log");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender),
        )
        .init();

    let log_file = log_dir.join("ivi-shell.log");
    tracing::info!(path = %log_file.display(), "logging initialized");

    Ok(())
}
