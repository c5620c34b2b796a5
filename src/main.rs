use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::layer, layer::SubscriberExt, util::SubscriberInitExt};

use interpbench::builder;
use interpbench::config::{self, Defaults};
use interpbench::display::{self, Progress};
use interpbench::report;
use interpbench::timer::ShellTimer;
use interpbench::types::{Mode, Settings};

#[derive(Parser)]
#[command(
    name = "interpbench",
    version,
    about = "Time workload scripts across interpreter binaries"
)]
struct Cli {
    /// Suite file (defaults to ./interpbench.toml, then the user config dir)
    #[arg(short, long)]
    suite: Option<PathBuf>,

    /// Runs per (test, binary) pair; the fastest is kept [default: 3]
    #[arg(short = 'n', long)]
    runs: Option<usize>,

    /// Output base name; writes <NAME>.dat and <NAME>.png [default: results]
    #[arg(short, long)]
    output: Option<String>,

    /// Report each cell relative to the first binary (cell / first)
    #[arg(long, conflicts_with = "speedup")]
    normalize: bool,

    /// Report speedup over the first binary (first / cell)
    #[arg(long)]
    speedup: bool,

    /// Print diagnostics for failed measurements
    #[arg(long)]
    no_suppress: bool,

    /// Skip the plot renderer
    #[arg(long)]
    no_plot: bool,

    /// Kill a single invocation after this many seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Decimal places in the report [default: 3]
    #[arg(long)]
    precision: Option<usize>,

    /// Print the commands that would be timed and exit
    #[arg(long)]
    dry_run: bool,

    /// Also print the final matrix as JSON on stdout
    #[arg(long)]
    json: bool,

    /// No progress output
    #[arg(short, long)]
    quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives)?,
        Err(_) => EnvFilter::new(format!("interpbench={level}")),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer().with_writer(std::io::stderr).compact())
        .try_init()?;
    Ok(())
}

fn build_settings(cli: &Cli, defaults: &Defaults) -> Result<Settings> {
    let base = Settings::default();

    let timeout = match cli.timeout.or(defaults.timeout) {
        Some(secs) => match Duration::try_from_secs_f64(secs) {
            Ok(timeout) if !timeout.is_zero() => Some(timeout),
            _ => anyhow::bail!("--timeout must be a positive number of seconds, got {secs}"),
        },
        None => None,
    };

    let settings = Settings {
        runs: cli.runs.or(defaults.runs).unwrap_or(base.runs),
        suppress_errors: !cli.no_suppress,
        output: cli
            .output
            .clone()
            .or_else(|| defaults.output.clone())
            .unwrap_or(base.output),
        mode: Mode::from_flags(cli.normalize, cli.speedup)?,
        plot: !cli.no_plot,
        timeout,
        precision: cli.precision.or(defaults.precision).unwrap_or(base.precision),
    };
    settings.validate()?;
    Ok(settings)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let suite_path = config::locate_suite(cli.suite.as_deref())?;
    let suite = config::load_suite(&suite_path)?;
    let settings = build_settings(&cli, &suite.defaults)?;

    if cli.dry_run {
        print!("{}", display::format_commands(&suite.tests, &suite.binaries));
        return Ok(());
    }

    info!(
        suite = %suite_path.display(),
        tests = suite.tests.len(),
        binaries = suite.binaries.len(),
        runs = settings.runs,
        "starting"
    );

    let mut timer = ShellTimer::new(settings.timeout);
    let progress = Progress::new(!cli.quiet);
    let mut matrix = builder::build_matrix(
        &suite.tests,
        &suite.binaries,
        &settings,
        &mut timer,
        &progress,
    );
    matrix.apply(settings.mode);

    let data_file = report::write_report(
        &settings.output,
        &matrix,
        &suite.tests,
        &suite.binaries,
        settings.precision,
    )?;

    if settings.plot {
        let image_file = report::image_path(&settings.output);
        report::render_plot(&suite.plot, &data_file, &image_file, suite.binaries.len())?;
    }

    if cli.json {
        println!(
            "{}",
            display::format_json(
                &matrix,
                &suite.tests,
                &suite.binaries,
                settings.mode,
                Utc::now()
            )
        );
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
