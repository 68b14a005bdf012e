use std::io::Write;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use core_actions::MoveDirection;
use core_config::{Config, LogConfig};
use core_events::{
    COMMANDS_DISPATCHED, COMMANDS_UNHANDLED, CommandEvent, CommandRegistry, CommandTarget, Event,
    event_channel,
};
use core_plugin::{EditorHost, LineMoverPackage, LocalHost};
use core_text::{Buffer, NormalizedText, TextBuffer, normalize_line_endings};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod cli;

use cli::Args;

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self, log: &LogConfig) -> Result<()> {
        std::fs::create_dir_all(&log.directory).with_context(|| {
            format!("creating log directory {}", log.directory.display())
        })?;
        let file_appender = tracing_appender::rolling::never(&log.directory, &log.file);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        // RUST_LOG wins over the configured directive.
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.filter));
        match tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global subscriber already installed; dropping the guard stops the writer.
            }
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// File contents ready to load into a buffer.
struct OpenedFile {
    name: String,
    text: NormalizedText,
}

fn read_file(path: &Path) -> Result<OpenedFile> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let text = normalize_line_endings(&content);
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string();
    debug!(
        target: "io",
        file = %path.display(),
        size_bytes = content.len(),
        line_ending = ?text.original,
        mixed = text.mixed,
        "file_read_ok"
    );
    Ok(OpenedFile { name, text })
}

/// Feed `commands` through the bounded event channel and dispatch them one at a time.
async fn run_commands(
    registry: &CommandRegistry,
    target: CommandTarget,
    commands: Vec<MoveDirection>,
) -> Result<()> {
    let (tx, mut rx) = event_channel();
    let producer = tokio::spawn(async move {
        for direction in commands {
            if tx
                .send(Event::invoke(target, direction.command()))
                .await
                .is_err()
            {
                return;
            }
        }
        let _ = tx.send(Event::Shutdown).await;
    });

    while let Some(event) = rx.recv().await {
        match event {
            Event::Command(CommandEvent::Invoke { target, name }) => {
                let handled = registry
                    .dispatch(target, &name)
                    .with_context(|| format!("running {name} on {target}"))?;
                if !handled {
                    warn!(target: "runtime", cmd_target = %target, command = %name, "command_not_bound");
                }
            }
            Event::Shutdown => break,
        }
    }
    producer.await.context("command producer task failed")?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config: Config = core_config::load_from(args.config.clone())?;

    let mut startup = AppStartup::new();
    startup.configure_logging(&config.file.log)?;
    AppStartup::install_panic_hook();
    if let Some(failure) = &config.parse_failure {
        warn!(
            target: "config",
            path = %failure.path.display(),
            error = %failure.error,
            "config_parse_failed_using_defaults"
        );
    }
    info!(
        target: "runtime",
        config = config.source.as_ref().map(|p| p.display().to_string()).as_deref(),
        commands = args.commands.len(),
        "startup"
    );

    let opened = read_file(&args.path)?;
    let mut buffer = Buffer::from_str(opened.name.as_str(), opened.text.body())?;
    buffer
        .set_selection(args.select)
        .with_context(|| format!("selection outside {}", args.path.display()))?;

    let host = LocalHost::new();
    let mut package = LineMoverPackage::activate(&host);
    let editor = host.open(&opened.name, buffer);

    run_commands(&host.commands(), editor.target, args.commands).await?;

    let text = editor
        .buffer
        .lock()
        .map_err(|_| anyhow!("buffer lock poisoned"))?
        .text();
    package.deactivate();
    host.close(editor.target);

    let ending = config.file.output.line_ending.resolve(opened.text.original);
    let mut output = ending.restore(&text);
    if opened.text.had_trailing_newline {
        output.push_str(ending.as_str());
    }
    if args.in_place {
        std::fs::write(&args.path, &output)
            .with_context(|| format!("writing {}", args.path.display()))?;
        info!(target: "io", file = %args.path.display(), bytes = output.len(), "file_write_ok");
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
    }

    info!(
        target: "runtime",
        dispatched = COMMANDS_DISPATCHED.load(Ordering::Relaxed),
        unhandled = COMMANDS_UNHANDLED.load(Ordering::Relaxed),
        "shutdown"
    );
    Ok(())
}
