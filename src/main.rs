use clap::Parser;
use tracing::{info, warn};

use rtmp_setup::Result;
use rtmp_setup::bridge::{AdbClient, ProcessRunner};
use rtmp_setup::cli::Cli;
use rtmp_setup::clipboard::SystemClipboard;
use rtmp_setup::config;
use rtmp_setup::console::{DialoguerPrompter, Prompter, Sink, TermSink};
use rtmp_setup::logging;
use rtmp_setup::pipeline::{Pipeline, conclude};
use rtmp_setup::process::{HostOs, SystemProbe};
use rtmp_setup::server::ProcessLauncher;

fn main() {
    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli.log_level);
    console::set_colors_enabled(cli.color.should_enable());

    // An interrupt outside a prompt is still an operator cancellation.
    if let Err(e) = ctrlc::set_handler(|| {
        println!();
        std::process::exit(0);
    }) {
        warn!(%e, "could not install interrupt handler");
    }

    let sink = TermSink::stdout();
    let prompter = DialoguerPrompter::new();

    let code = conclude(run(&cli, &sink, &prompter), &sink, &prompter);
    std::process::exit(code);
}

fn run(cli: &Cli, sink: &dyn Sink, prompter: &dyn Prompter) -> Result<()> {
    sink.info("RTMP Stream Setup Assistant");
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    sink.step("Configuration");
    let os = HostOs::current();
    let config = config::load_or_setup(&cli.config_path(), os, sink, prompter)?;

    let bridge = AdbClient::new(
        ProcessRunner::new(&config.adb_path),
        config.policy().fetch_metadata,
    );
    let probe = SystemProbe;
    let launcher = ProcessLauncher;
    let clipboard = SystemClipboard;

    Pipeline::new(&bridge, &probe, &launcher, &clipboard, sink, prompter).run(&config)?;
    Ok(())
}
