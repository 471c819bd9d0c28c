//! s3-deploy-rs - build-artifact deployment step for S3 buckets

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use s3_deploy::config::{self, DeployConfig};
use s3_deploy::mime::MimeRegistry;
use s3_deploy::storage::S3Storage;
use s3_deploy::uploader::Uploader;

/// Global configuration file name, looked up under the step root
const GLOBAL_CONFIG_FILE: &str = "s3-deploy.yml";

#[derive(Parser, Debug)]
#[command(name = "s3-deploy-rs")]
#[command(about = "Deploy build artifacts to an S3 bucket")]
struct Args {
    /// Root directory of the build artifacts
    #[arg(long, env = "DEPLOY_BUILD_ROOT")]
    build_root: PathBuf,

    /// Directory holding the step's own assets (global config, mime.types)
    #[arg(long, env = "DEPLOY_STEP_ROOT")]
    step_root: PathBuf,

    /// Target S3 bucket
    #[arg(long, env = "DEPLOY_TARGET_BUCKET")]
    bucket: String,

    /// Project-level configuration file
    #[arg(long, env = "DEPLOY_CONFIGURATION_FILE", default_value = "s3-deploy.yml")]
    config_file: PathBuf,

    /// AWS region override
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,
}

// Exit codes: 0 all jobs succeeded, 1 at least one file permanently
// failed, 2 a configuration file existed but failed to parse.

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(&args);

    let exit_code = match run(&args, &config).await {
        Ok(true) => {
            info!("All jobs completed");
            0
        }
        Ok(false) => 1,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

/// Run every configured job against the target bucket
async fn run(args: &Args, config: &DeployConfig) -> Result<bool> {
    // MIME registry with step-level then project-level overlays
    let mut registry = MimeRegistry::new();
    registry.load_overlay(&args.step_root.join("mime.types"));
    registry.load_overlay(&args.build_root.join("mime.types"));

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = args.region.clone() {
        loader = loader.region(aws_config::Region::new(region));
    }
    let sdk_config = loader.load().await;
    let storage = S3Storage::new(aws_sdk_s3::Client::new(&sdk_config), args.bucket.clone());

    let uploader = Uploader::new(&storage, &registry, &config.mime_types, &args.build_root);

    uploader
        .run_jobs(config)
        .await
        .context("deployment run aborted")
}

/// Assemble the merged configuration; any parse failure is fatal with
/// exit code 2.
fn load_config(args: &Args) -> DeployConfig {
    let project = load_or_exit(&args.config_file);
    let global = load_or_exit(&args.step_root.join(GLOBAL_CONFIG_FILE));

    match config::merged_config(project, global) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    }
}

fn load_or_exit(path: &Path) -> Option<serde_yaml::Value> {
    match config::load_config_file(path) {
        Ok(value) => value,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    }
}
