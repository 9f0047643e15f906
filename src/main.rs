// ABOUTME: Entry point for the cfpush CLI application.
// ABOUTME: Loads the manifest, builds push plans and runs them against an in-memory platform.

mod cli;

use cfpush::config::{FlagOverrides, Manifest, PushConfig};
use cfpush::error::{Error, Result};
use cfpush::output::{Output, OutputMode};
use cfpush::platform::{ApiError, ApplicationState, InMemoryPlatform, Operation};
use cfpush::push::{ProgressBar, PushActor, PushEvent, PushPlan, TransferLog, sequence};
use cfpush::resources::LocalResources;
use cfpush::types::{AppName, OrgGuid, SpaceGuid};
use cfpush::warnings::Warnings;
use clap::Parser;
use cli::{Cli, Commands, DOCKER_PASSWORD_VAR, PlatformArgs, PushArgs};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const REHEARSAL_ORG: &str = "rehearsal-org";
const REHEARSAL_SPACE: &str = "rehearsal-space";

type Actor = PushActor<InMemoryPlatform, LocalResources>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli.command, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: &mut Output) -> Result<()> {
    match command {
        Commands::Plan { push, platform } => {
            let (_, plans) = prepare(&push, &platform, false, output).await?;
            for plan in &plans {
                output.plan(plan, &sequence::full_sequence(plan));
            }
            Ok(())
        }
        Commands::Rehearse {
            push,
            platform,
            flaky_uploads,
            apply_manifest,
        } => {
            output.start_timer();
            let (actor, plans) = prepare(&push, &platform, apply_manifest, output).await?;

            let upload = if push.droplet.is_some() {
                Operation::UploadDroplet
            } else {
                Operation::UploadBitsPackage
            };
            for _ in 0..flaky_uploads {
                actor.platform().fail_next(
                    upload,
                    ApiError::PipeSeek("connection reset while sending body".into()),
                );
            }

            let count = plans.len();
            for plan in plans {
                rehearse(&actor, plan, output).await?;
            }
            output.success(&format!("Pushed {count} application(s)"));
            Ok(())
        }
    }
}

/// Load inputs, seed the platform and resolve plans against it.
async fn prepare(
    push: &PushArgs,
    platform: &PlatformArgs,
    apply_manifest: bool,
    output: &Output,
) -> Result<(Actor, Vec<PushPlan>)> {
    let manifest = load_manifest(push)?;
    let overrides = overrides(push);

    let platform = Arc::new(seed_platform(platform)?);
    let actor = PushActor::new(platform, Arc::new(LocalResources::new()))
        .with_config(PushConfig::from_env());

    if apply_manifest {
        let app = push.app_name.as_deref().map(app_name).transpose()?;
        prepare_space(&actor, app.as_ref(), &manifest, output).await?;
    }

    let plans = actor.create_push_plans(
        push.app_name.as_deref(),
        &SpaceGuid::new(REHEARSAL_SPACE),
        &OrgGuid::new(REHEARSAL_ORG),
        &manifest,
        &overrides,
    )?;

    let mut warnings = Warnings::new();
    let resolved = actor.resolve_applications(plans, &mut warnings).await;
    for warning in warnings.iter() {
        output.warning(warning);
    }

    Ok((actor, resolved?))
}

fn load_manifest(push: &PushArgs) -> Result<Manifest> {
    match &push.manifest {
        Some(path) if !path.exists() => Err(Error::ManifestNotFound(path.clone())),
        Some(path) => Manifest::load(path),
        None => Manifest::discover(&env::current_dir()?),
    }
}

fn overrides(push: &PushArgs) -> FlagOverrides {
    let password = push
        .docker_username
        .as_ref()
        .and_then(|_| env::var(DOCKER_PASSWORD_VAR).ok());
    push.overrides(password)
}

fn app_name(name: &str) -> Result<AppName> {
    AppName::new(name).map_err(|e| Error::InvalidFlags(format!("application name {name:?}: {e}")))
}

fn seed_platform(args: &PlatformArgs) -> Result<InMemoryPlatform> {
    let mut platform = InMemoryPlatform::new();
    let seeds = args
        .running
        .iter()
        .map(|name| (name, ApplicationState::Started))
        .chain(args.stopped.iter().map(|name| (name, ApplicationState::Stopped)));

    for (name, state) in seeds {
        platform = platform.with_application(&app_name(name)?, state);
    }
    Ok(platform)
}

/// Apply the manifest, or create the named app, before any plan runs.
async fn prepare_space(
    actor: &Actor,
    app: Option<&AppName>,
    manifest: &Manifest,
    output: &Output,
) -> Result<()> {
    let mut stream = actor.prepare_space(SpaceGuid::new(REHEARSAL_SPACE), app, manifest);
    let mut failure = None;

    while let Some(message) = stream.recv().await {
        match message {
            PushEvent::Event(event) => output.event(REHEARSAL_SPACE, &event),
            PushEvent::Warnings(warnings) => {
                for warning in warnings.iter() {
                    output.warning(warning);
                }
            }
            PushEvent::Prepared(apps) => {
                tracing::debug!("{} holds {} application(s)", REHEARSAL_SPACE, apps.len());
            }
            PushEvent::Plan(_) => {}
            PushEvent::Failed(error) => failure = Some(error),
        }
    }

    match failure {
        Some(source) => Err(Error::PrepareSpaceFailed {
            space: REHEARSAL_SPACE.to_string(),
            source,
        }),
        None => Ok(()),
    }
}

/// Actualize one plan, rendering its events as they arrive.
async fn rehearse(actor: &Actor, plan: PushPlan, output: &Output) -> Result<()> {
    let app = plan.app_name().to_string();
    output.progress(&format!("Pushing {app}..."));

    let progress: Arc<dyn ProgressBar> = Arc::new(TransferLog::new());
    let mut stream = actor.actualize(plan, progress);
    let mut failure = None;

    while let Some(message) = stream.recv().await {
        match message {
            PushEvent::Plan(_) | PushEvent::Prepared(_) => {}
            PushEvent::Event(event) => output.event(&app, &event),
            PushEvent::Warnings(warnings) => {
                for warning in warnings.iter() {
                    output.warning(warning);
                }
            }
            PushEvent::Failed(error) => failure = Some(error),
        }
    }

    match failure {
        Some(source) => Err(Error::AppPushFailed { app, source }),
        None => Ok(()),
    }
}
