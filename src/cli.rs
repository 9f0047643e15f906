// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the plan and rehearse subcommands and the push flags they share.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use cfpush::config::{DeploymentStrategy, FlagOverrides, HealthCheckType, Megabytes};

/// Environment variable holding the docker registry password.
pub const DOCKER_PASSWORD_VAR: &str = "CF_DOCKER_PASSWORD";

#[derive(Parser)]
#[command(name = "cfpush")]
#[command(about = "Plan and rehearse application pushes to a PaaS")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the steps each application's push would run
    Plan {
        #[command(flatten)]
        push: PushArgs,

        #[command(flatten)]
        platform: PlatformArgs,
    },

    /// Run the push against an in-memory platform and show its events
    Rehearse {
        #[command(flatten)]
        push: PushArgs,

        #[command(flatten)]
        platform: PlatformArgs,

        /// Make this many uploads fail with an interrupted transfer
        #[arg(long, default_value_t = 0)]
        flaky_uploads: u32,

        /// Apply the manifest to the space before pushing
        #[arg(long)]
        apply_manifest: bool,
    },
}

/// Initial state of the simulated platform.
#[derive(Args, Debug, Clone, Default)]
pub struct PlatformArgs {
    /// Treat this application as already existing and running
    #[arg(long = "running", value_name = "APP")]
    pub running: Vec<String>,

    /// Treat this application as already existing but stopped
    #[arg(long = "stopped", value_name = "APP")]
    pub stopped: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PushArgs {
    /// Application to push; all manifest applications when omitted
    pub app_name: Option<String>,

    /// Path to the manifest
    #[arg(short = 'f', long = "manifest")]
    pub manifest: Option<PathBuf>,

    /// Directory or zip archive with the application bits
    #[arg(short = 'p', long)]
    pub path: Option<PathBuf>,

    /// Prebuilt droplet tarball to upload instead of staging
    #[arg(long)]
    pub droplet: Option<PathBuf>,

    #[arg(short = 'o', long)]
    pub docker_image: Option<String>,

    #[arg(long)]
    pub docker_username: Option<String>,

    /// Buildpack to use; repeat for several
    #[arg(short = 'b', long = "buildpack")]
    pub buildpacks: Vec<String>,

    #[arg(short = 's', long)]
    pub stack: Option<String>,

    #[arg(short = 'm', long)]
    pub memory: Option<Megabytes>,

    #[arg(short = 'k', long)]
    pub disk: Option<Megabytes>,

    #[arg(short = 'i', long)]
    pub instances: Option<u32>,

    /// Log rate limit per second
    #[arg(short = 'l', long)]
    pub log_rate_limit: Option<Megabytes>,

    #[arg(short = 'u', long)]
    pub health_check_type: Option<HealthCheckType>,

    #[arg(long)]
    pub endpoint: Option<String>,

    /// Seconds allowed for the app to become healthy
    #[arg(short = 't', long)]
    pub timeout: Option<u32>,

    #[arg(short = 'c', long)]
    pub start_command: Option<String>,

    /// default, rolling or canary
    #[arg(long, default_value = "default")]
    pub strategy: DeploymentStrategy,

    #[arg(long)]
    pub max_in_flight: Option<u32>,

    /// Canary step weights, e.g. 10,50
    #[arg(long, value_delimiter = ',')]
    pub instance_steps: Vec<u32>,

    #[arg(long)]
    pub no_start: bool,

    #[arg(long)]
    pub no_wait: bool,

    #[arg(long)]
    pub no_route: bool,

    #[arg(long)]
    pub random_route: bool,

    /// Push as a task: staged but never started
    #[arg(long)]
    pub task: bool,
}

impl PushArgs {
    pub fn overrides(&self, docker_password: Option<String>) -> FlagOverrides {
        FlagOverrides {
            provided_app_path: self.path.clone(),
            droplet_path: self.droplet.clone(),
            docker_image: self.docker_image.clone(),
            docker_username: self.docker_username.clone(),
            docker_password,
            buildpacks: self.buildpacks.clone(),
            stack: self.stack.clone(),
            memory: self.memory,
            disk: self.disk,
            instances: self.instances,
            log_rate_limit: self.log_rate_limit,
            health_check_type: self.health_check_type,
            health_check_endpoint: self.endpoint.clone(),
            health_check_timeout: self.timeout,
            start_command: self.start_command.clone(),
            strategy: self.strategy,
            max_in_flight: self.max_in_flight,
            instance_steps: self.instance_steps.clone(),
            no_start: self.no_start,
            no_wait: self.no_wait,
            no_route: self.no_route,
            random_route: self.random_route,
            task: self.task,
        }
    }
}
