//! Headless operator CLI for the tunnel processing console.
//!
//! Every subcommand drives the same reducers and runners a front end would,
//! printing one JSON status event per line on stdout. Logs go to stderr.


use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::net::{MockStatusChannel, StatusChannel, WsStatusChannel};
use console::runner::{PipelineRunner, RunHandle, scale_delay, snapshot_event, start_batch_ticker};
use console::state::batch::{self, BatchAction};
use console::state::params::{AnalysisMode, AnalysisParams, BatchParams, ComputeMode, FeatureToggles, UnwrapParams};
use console::state::staging::{CandidateFile, StagingAction, StagingState, add_files};
use console::state::workflow::{PanelKind, WorkflowAction};
use console::util::format::{format_label, percent, size_mb, thousands};
use console::{ConsoleState, Intent, ModuleTag, StatusEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("no .las or .laz files among the given paths")]
    NothingStaged,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error("status link failed: {0}")]
    Channel(#[from] console::net::ChannelError),
    #[error("status link closed")]
    LinkClosed,
    #[error("run stopped before finishing")]
    RunAborted,
    #[error("timed out waiting for a status event")]
    Timeout,
    #[error("event encode failed: {0}")]
    Encode(#[from] frames::CodecError),
}

#[derive(Parser, Debug)]
#[command(name = "tunnelscope-cli", about = "Tunnel point cloud processing console")]
struct Cli {
    #[arg(long, env = "TUNNELSCOPE_BASE_URL", default_value = "http://127.0.0.1:9001")]
    base_url: String,

    /// Multiplier applied to every simulated delay.
    #[arg(long, global = true, default_value_t = 1.0)]
    time_scale: f64,

    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the status server's health endpoint.
    Ping,
    /// Stage files and run the cylindrical unwrap on the first one.
    Unwrap(UnwrapArgs),
    /// Stage files and run the deep analysis on the first one.
    Analysis(AnalysisArgs),
    /// Resume the batch run over a folder for a number of ticks.
    Batch(BatchArgs),
    /// Print events from the status link.
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct UnwrapArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(long, default_value_t = 0.05)]
    sample_ratio: f64,

    #[arg(long, default_value_t = 100)]
    resolution: u32,

    #[arg(long, default_value_t = 0.5)]
    deviation_threshold: f64,

    #[arg(long, default_value_t = false)]
    no_diagnostic_images: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Quick,
    Standard,
    Deep,
}

impl From<ModeArg> for AnalysisMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Quick => Self::Quick,
            ModeArg::Standard => Self::Standard,
            ModeArg::Deep => Self::Deep,
        }
    }
}

#[derive(Args, Debug)]
struct AnalysisArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Standard)]
    mode: ModeArg,

    #[arg(long, default_value_t = false)]
    gpu: bool,

    #[arg(long, default_value_t = false)]
    no_geometric: bool,

    #[arg(long, default_value_t = false)]
    no_color: bool,

    #[arg(long, default_value_t = false)]
    no_structure: bool,
}

impl AnalysisArgs {
    fn params(&self) -> AnalysisParams {
        let features =
            FeatureToggles { geometric: !self.no_geometric, color: !self.no_color, structure: !self.no_structure };
        AnalysisParams::default()
            .with_mode(self.mode.into())
            .with_features(features)
            .with_gpu_acceleration(self.gpu)
    }
}

#[derive(Args, Debug)]
struct BatchArgs {
    #[arg(long, default_value = batch::DEFAULT_FOLDER)]
    folder: String,

    #[arg(long, default_value_t = 10)]
    ticks: usize,

    #[arg(long, default_value_t = 4)]
    workers: u32,

    #[arg(long, default_value_t = false)]
    gpu: bool,

    /// Reprocess files that already have output.
    #[arg(long, default_value_t = false)]
    no_skip_existing: bool,
}

impl BatchArgs {
    fn params(&self) -> BatchParams {
        let mode = if self.gpu { ComputeMode::Gpu } else { ComputeMode::Cpu };
        BatchParams::default()
            .with_mode(mode)
            .with_worker_count(self.workers)
            .with_skip_existing(!self.no_skip_existing)
    }
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[arg(long, env = "TUNNELSCOPE_URL")]
    url: Option<String>,

    /// Use the in-process synthetic feed even when a URL is set.
    #[arg(long, default_value_t = false)]
    mock: bool,

    #[arg(long, default_value_t = 5)]
    count: usize,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    match cli.command {
        Command::Ping => run_ping(&cli.base_url).await,
        Command::Unwrap(args) => {
            let console = ConsoleState::default().reduce(Intent::SetUnwrapParams(unwrap_params(&args)));
            run_workflow(console, PanelKind::Unwrap, &args.files, cli.time_scale, &mut rng).await
        }
        Command::Analysis(args) => {
            let console = ConsoleState::default().reduce(Intent::SetAnalysisParams(args.params()));
            run_workflow(console, PanelKind::Analysis, &args.files, cli.time_scale, &mut rng).await
        }
        Command::Batch(args) => run_batch(args, cli.time_scale, cli.seed).await,
        Command::Watch(args) => run_watch(args, cli.seed).await,
    }
}

// =============================================================================
// PING
// =============================================================================

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let url = format!("{}/healthz", base_url.trim_end_matches('/'));
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

// =============================================================================
// WORKFLOW PANELS
// =============================================================================

fn unwrap_params(args: &UnwrapArgs) -> UnwrapParams {
    UnwrapParams::default()
        .with_sample_ratio(args.sample_ratio)
        .with_resolution(args.resolution)
        .with_deviation_threshold(args.deviation_threshold)
        .with_diagnostic_images(!args.no_diagnostic_images)
}

/// Stat a path into a candidate. Contents are never read.
async fn candidate(path: &Path) -> Result<CandidateFile, CliError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    let name = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(CandidateFile::new(name, meta.len()))
}

async fn stage(paths: &[PathBuf], rng: &mut StdRng) -> Result<StagingState, CliError> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        candidates.push(candidate(path).await?);
    }
    let staging = add_files(StagingState::default(), candidates, rng);
    if staging.is_empty() {
        return Err(CliError::NothingStaged);
    }
    for file in &staging.files {
        info!(
            name = %file.name,
            format = %format_label(&file.name),
            size = %size_mb(file.size, 2),
            points = %thousands(file.point_count),
            "staged"
        );
    }
    Ok(staging)
}

async fn run_workflow(
    mut console: ConsoleState,
    panel: PanelKind,
    paths: &[PathBuf],
    time_scale: f64,
    rng: &mut StdRng,
) -> Result<(), CliError> {
    let files = stage(paths, rng).await?.files;
    console = console.reduce(Intent::Staging(panel, StagingAction::Add(files)));
    console = console.reduce(Intent::Start(panel));
    if !console.workflow(panel).is_processing() {
        return Err(CliError::NothingStaged);
    }

    let handle = PipelineRunner::default().with_time_scale(time_scale).start(panel);
    let console = drive_run(console, panel, handle, print_event).await?;

    info!(status = %console.shell.status_line(), "run finished");
    Ok(())
}

/// Fold a run into `console`, emitting a snapshot per action, until a
/// terminal action or Ctrl-C. A stream that ends early is an error.
async fn drive_run(
    mut console: ConsoleState,
    panel: PanelKind,
    mut handle: RunHandle<WorkflowAction>,
    mut emit: impl FnMut(&StatusEvent) -> Result<(), CliError>,
) -> Result<ConsoleState, CliError> {
    let task_id = handle.task_id().to_string();

    loop {
        tokio::select! {
            action = handle.next() => {
                let Some(action) = action else {
                    warn!(%task_id, "run ended without a terminal action");
                    return Err(CliError::RunAborted);
                };
                let terminal = action.is_terminal();
                console = console.reduce(Intent::Workflow(panel, action));
                emit(&snapshot_event(console.workflow(panel), &task_id))?;
                if terminal {
                    return Ok(console);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                handle.cancel().await;
                console = console.reduce(Intent::Workflow(panel, WorkflowAction::Cancelled));
                emit(&snapshot_event(console.workflow(panel), &task_id))?;
                return Ok(console);
            }
        }
    }
}

// =============================================================================
// BATCH
// =============================================================================

async fn run_batch(args: BatchArgs, time_scale: f64, seed: Option<u64>) -> Result<(), CliError> {
    let mut console = ConsoleState::default()
        .reduce(Intent::SetBatchParams(args.params()))
        .reduce(Intent::Batch(BatchAction::SelectFolder(args.folder)))
        .reduce(Intent::Batch(BatchAction::Start));

    let task_id = Uuid::new_v4().to_string();
    let period = scale_delay(Duration::from_millis(batch::TICK_MS), time_scale);
    let mut ticker = start_batch_ticker(period, seed);
    for _ in 0..args.ticks {
        let Some(action) = ticker.next().await else {
            return Err(CliError::RunAborted);
        };
        console = console.reduce(Intent::Batch(action));
        print_event(&batch_event(&console, &task_id))?;
    }
    ticker.cancel().await;
    console = console.reduce(Intent::Batch(BatchAction::Pause));

    let state = &console.batch.state;
    for row in state.rows.iter().filter(|r| r.error.is_some()) {
        warn!(name = %row.name, kind = ?row.failure_kind(), error = ?row.error, "batch file failed");
    }
    info!(
        completed = state.completed_count(),
        failed = state.failed_count(),
        total = state.total_count(),
        overall = %percent(state.overall_progress),
        "batch paused"
    );
    Ok(())
}

fn batch_event(console: &ConsoleState, task_id: &str) -> StatusEvent {
    let state = &console.batch.state;
    StatusEvent::progress(ModuleTag::Batch, task_id, state.overall_progress, state.current_file.clone())
        .with_detail("file_progress", state.file_progress)
        .with_detail("workers", console.batch.params.worker_count)
}

// =============================================================================
// WATCH
// =============================================================================

async fn run_watch(args: WatchArgs, seed: Option<u64>) -> Result<(), CliError> {
    let mut channel: Box<dyn StatusChannel> = match args.url {
        Some(url) if !args.mock => Box::new(WsStatusChannel::new(url)),
        _ => {
            let mock = MockStatusChannel::default();
            Box::new(match seed {
                Some(seed) => mock.with_seed(seed),
                None => mock,
            })
        }
    };
    channel.connect().await?;

    let mut events = channel.subscribe();
    let timeout = Duration::from_secs(args.timeout_secs);
    let mut result = Ok(());
    for _ in 0..args.count {
        match tokio::time::timeout(timeout, events.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                result = Err(CliError::LinkClosed);
                break;
            }
            Err(_) => {
                result = Err(CliError::Timeout);
                break;
            }
        }
        let event = events.borrow_and_update().clone();
        if let Some(event) = event {
            if let Err(e) = print_event(&event) {
                result = Err(e);
                break;
            }
        }
    }

    channel.close().await;
    result
}

fn print_event(event: &StatusEvent) -> Result<(), CliError> {
    println!("{}", frames::encode_json(event)?);
    Ok(())
}
