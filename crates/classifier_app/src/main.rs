use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use classifier_app::config::{load_or_default, save_config};
use classifier_app::render::render;
use classifier_app::{Controller, PolicySetting, CONFIG_FILENAME};
use classifier_logging::{classifier_info, LogDestination};

/// Check if a URL is malicious or safe.
#[derive(Debug, Parser)]
#[command(name = "url_classifier", version)]
struct Cli {
    /// URLs to analyze, one request each. Reads stdin line by line when empty.
    urls: Vec<String>,

    /// Config file (RON).
    #[arg(long, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Analysis service endpoint, overrides the config file.
    #[arg(long)]
    endpoint: Option<String>,

    /// How to treat a submission while another is in flight.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogArg::File)]
    log: LogArg,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,

    /// Write the effective config to `--config` and exit.
    #[arg(long)]
    init_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Supersede,
    Reject,
    LastWriteWins,
}

impl From<PolicyArg> for PolicySetting {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Supersede => PolicySetting::Supersede,
            PolicyArg::Reject => PolicySetting::RejectWhilePending,
            PolicyArg::LastWriteWins => PolicySetting::LastWriteWins,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogArg {
    Terminal,
    File,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::File => LogDestination::File,
            LogArg::Both => LogDestination::Both,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    classifier_logging::initialize(
        cli.log.into(),
        classifier_logging::level_for(cli.verbose),
        &classifier_logging::default_log_path(),
    );

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("url_classifier error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Returns whether every submission succeeded.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = load_or_default(&cli.config);
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(policy) = cli.policy {
        config.submit_policy = policy.into();
    }

    if cli.init_config {
        save_config(&cli.config, &config)?;
        println!("Wrote {}", cli.config.display());
        return Ok(true);
    }

    let mut controller = Controller::new(&config).context("failed to start analysis engine")?;
    classifier_info!("Submit policy {:?}", config.submit_policy);

    let mut all_ok = true;
    if cli.urls.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("failed to read stdin")?;
            all_ok &= analyze_and_print(&mut controller, &line);
        }
    } else {
        for url in &cli.urls {
            all_ok &= analyze_and_print(&mut controller, url);
        }
    }
    controller.shutdown();
    Ok(all_ok)
}

/// Prints the pending screen, then the settled one. Frames without a state
/// change are skipped.
fn analyze_and_print(controller: &mut Controller, input: &str) -> bool {
    controller.set_input(input);
    controller.submit_current();
    print_frame(controller);
    controller.wait_idle();
    print_frame(controller);
    controller.view().result.is_some()
}

fn print_frame(controller: &mut Controller) {
    if let Some(view) = controller.take_frame() {
        for line in render(&view) {
            println!("{line}");
        }
        println!();
    }
}
