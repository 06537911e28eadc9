mod loop_support;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use moai_config::{Config, TemplateContextBuilder};
use moai_loop::{JsonFileLoopStorage, LoopController, LoopStorage};
use moai_quality::{Gate, GateContext};
use moai_remote::{GhClient, GhOps, MergeMethod, RetrySettings, SpecLinker};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "moai", about = "Agentic development kit: quality gate, feedback loop, remote hosting", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a .moai/.claude project skeleton
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Re-deploy the embedded template tree
    Deploy {
        #[arg(long)]
        force_update: bool,
    },
    /// Run the TRUST-5 quality gate
    Quality {
        #[arg(long, value_enum)]
        phase: Option<PhaseArg>,
        #[arg(long)]
        json: bool,
    },
    /// Feedback-loop controller
    Loop {
        #[command(subcommand)]
        action: LoopAction,
    },
    /// Pull-request lifecycle via gh
    Pr {
        #[command(subcommand)]
        action: PrAction,
    },
    /// Close an issue with a comment
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },
    /// Spec-to-issue link registry
    Spec {
        #[command(subcommand)]
        action: SpecAction,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum PhaseArg {
    Plan,
    Run,
    Sync,
}

#[derive(Subcommand)]
enum LoopAction {
    Start {
        spec_id: String,
        #[arg(long, default_value_t = 5)]
        max_iter: u32,
    },
    Status {
        spec_id: String,
    },
    Pause {
        spec_id: String,
    },
    Resume {
        spec_id: String,
    },
    Cancel {
        spec_id: String,
    },
}

#[derive(Subcommand)]
enum PrAction {
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long, default_value = "main")]
        base: String,
    },
    View {
        number: u64,
    },
    Merge {
        number: u64,
        #[arg(long, value_enum, default_value_t = MergeMethodArg::Squash)]
        method: MergeMethodArg,
        #[arg(long)]
        delete_branch: bool,
    },
    Checks {
        number: u64,
    },
    Push,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MergeMethodArg {
    Merge,
    Squash,
    Rebase,
}

impl From<MergeMethodArg> for MergeMethod {
    fn from(value: MergeMethodArg) -> Self {
        match value {
            MergeMethodArg::Merge => MergeMethod::Merge,
            MergeMethodArg::Squash => MergeMethod::Squash,
            MergeMethodArg::Rebase => MergeMethod::Rebase,
        }
    }
}

#[derive(Subcommand)]
enum IssueAction {
    Close {
        number: i64,
        #[arg(long)]
        spec: Option<String>,
    },
}

#[derive(Subcommand)]
enum SpecAction {
    Link { issue_number: i64, spec_id: String },
    Show { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("moai=info".parse()?))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let workspace = moai_core::detect_workspace(&cwd);
    let root = workspace.project_root.clone();

    match cli.command {
        Commands::Init { force } => cmd_init(&root, force).await?,
        Commands::Deploy { force_update } => cmd_deploy(&root, force_update).await?,
        Commands::Quality { phase, json } => cmd_quality(phase, json).await?,
        Commands::Loop { action } => cmd_loop(&root, action).await?,
        Commands::Pr { action } => cmd_pr(action).await?,
        Commands::Issue { action } => cmd_issue(&root, action).await?,
        Commands::Spec { action } => cmd_spec(&root, action).await?,
    }

    Ok(())
}

async fn cmd_init(root: &std::path::Path, force: bool) -> Result<()> {
    if !force && moai_core::Initializer::already_initialized(root)? {
        return Err(moai_core::Error::ProjectExists(root.to_path_buf()).into());
    }
    run_init(root, force).await
}

async fn cmd_deploy(root: &std::path::Path, force_update: bool) -> Result<()> {
    run_init(root, force_update).await
}

async fn run_init(root: &std::path::Path, force_update: bool) -> Result<()> {
    let development_mode =
        moai_core::recommend_development_mode(root).unwrap_or(moai_config::DevelopmentMode::Tdd);
    let project_name = root.file_name().and_then(|n| n.to_str()).unwrap_or("project").to_string();
    let ctx = TemplateContextBuilder::new(project_name, root).development_mode(development_mode).build();

    let cancel = CancellationToken::new();
    let result = moai_core::Initializer::run(root, &ctx, &cancel, force_update)?;

    println!("created {} directories, {} files", result.created_dirs.len(), result.created_files.len());
    for warning in &result.warnings {
        println!("warning: {warning}");
    }
    println!("development mode: {}", result.development_mode);
    Ok(())
}

async fn cmd_quality(phase: Option<PhaseArg>, json: bool) -> Result<()> {
    let gate = Gate::new(Gate::default_validators());
    let mut ctx = GateContext::default();
    ctx.phase = phase.map(|p| match p {
        PhaseArg::Plan => moai_quality::Phase::Plan,
        PhaseArg::Run => moai_quality::Phase::Run,
        PhaseArg::Sync => moai_quality::Phase::Sync,
    });

    let cancel = CancellationToken::new();
    let report = gate.validate(&ctx, &cancel).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("score: {:.3} passed: {}", report.score, report.passed);
    }
    Ok(())
}

async fn cmd_loop(root: &std::path::Path, action: LoopAction) -> Result<()> {
    let storage = Arc::new(JsonFileLoopStorage::new(root));

    match action {
        LoopAction::Start { spec_id, max_iter } => {
            let controller = LoopController::new(
                Arc::new(loop_support::ThresholdDecisionEngine),
                Arc::new(loop_support::ShellFeedbackSource),
                storage,
            );
            controller.start(&spec_id, max_iter).await?;
            if let Some(mut done) = controller.done().await {
                let _ = done.changed().await;
            }
            let (state, loop_state) = controller.status().await;
            println!("controller state: {state:?}");
            if let Some(loop_state) = loop_state {
                println!("iteration: {}", loop_state.iteration);
            }
        }
        LoopAction::Status { spec_id } => match storage.load(&spec_id).await? {
            Some(state) => println!("iteration {}/{} (may be running or paused)", state.iteration, state.max_iter),
            None => println!("no persisted loop state for {spec_id} (idle or already converged)"),
        },
        LoopAction::Pause { spec_id: _ } | LoopAction::Resume { spec_id: _ } => {
            anyhow::bail!("pause/resume require attaching to the running `moai loop start` process; not supported across separate CLI invocations");
        }
        LoopAction::Cancel { spec_id } => {
            storage.delete(&spec_id).await?;
            println!("deleted persisted loop state for {spec_id}");
        }
    }
    Ok(())
}

async fn cmd_pr(action: PrAction) -> Result<()> {
    let client = GhClient::new();
    match action {
        PrAction::Create { title, body, base } => {
            let number = client.pr_create(&title, &body, &base).await?;
            println!("opened pull request #{number}");
        }
        PrAction::View { number } => println!("{}", client.pr_view(number).await?),
        PrAction::Merge { number, method, delete_branch } => {
            client.pr_merge(number, method.into(), delete_branch).await?;
            println!("merged pull request #{number}");
        }
        PrAction::Checks { number } => println!("{:?}", client.pr_checks(number).await?),
        PrAction::Push => {
            client.push().await?;
            println!("pushed");
        }
    }
    Ok(())
}

async fn cmd_issue(root: &std::path::Path, action: IssueAction) -> Result<()> {
    let client = GhClient::new();
    let settings = RetrySettings::default();
    match action {
        IssueAction::Close { number, spec } => {
            let comment = match &spec {
                Some(spec_id) => format!("Resolved by spec {spec_id}."),
                None => "Resolved.".to_string(),
            };
            let result = moai_remote::close_issue_with_comment(&client, &settings, number, &comment, Some("resolved")).await?;
            println!("commented={} labelled={} closed={}", result.commented, result.labelled, result.closed);

            if let Some(spec_id) = spec {
                let linker = SpecLinker::new(root);
                linker.set_status(number, moai_remote::LinkStatus::Closed).await.ok();
                println!("linked issue #{number} to {spec_id} marked closed");
            }
        }
    }
    Ok(())
}

async fn cmd_spec(root: &std::path::Path, action: SpecAction) -> Result<()> {
    let linker = SpecLinker::new(root);
    match action {
        SpecAction::Link { issue_number, spec_id } => {
            linker.link(issue_number, &spec_id).await?;
            println!("linked issue #{issue_number} to {spec_id}");
        }
        SpecAction::Show { query } => {
            let found = match query.parse::<i64>() {
                Ok(issue_number) => linker.lookup_by_issue(issue_number).await,
                Err(_) => linker.lookup_by_spec(&query).await,
            }?;
            println!("issue #{} -> {} ({:?})", found.issue_number, found.spec_id, found.status);
        }
    }
    Ok(())
}

#[allow(dead_code)]
fn load_merged_config(workspace: &moai_core::WorkspaceContext) -> Result<Config> {
    let global = Config::load()?;
    Config::ensure_dirs()?;
    let config = if workspace.has_moai_config {
        match Config::load_project(&workspace.project_root)? {
            Some(project) => Config::merge(&global, &project),
            None => global,
        }
    } else {
        global
    };
    Ok(config)
}
