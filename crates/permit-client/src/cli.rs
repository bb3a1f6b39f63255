use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::cmd::{
    self, Env,
    account::{LoginArgs, OtpArgs, ResendOtpArgs},
    form::{CheckArgs, SchemaArgs, SubmitArgs},
    vendor::{GalleryCommand, PredictArgs},
};
use crate::config::ClientConfig;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "permit-client",
    about = "Driver for resident registration, vendor application and document workflows",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(long, value_name = "PATH", global = true, env = "PERMIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the form definition schema, or one workflow's definition
    Schema(SchemaArgs),
    /// Walk every section offline with an answers file and report errors
    Check(CheckArgs),
    /// Validate, upload files and submit a workflow
    Submit(SubmitArgs),
    /// Sign in and persist the session
    Login(LoginArgs),
    /// Forget the persisted session
    Logout,
    /// Confirm a registration with the emailed code
    VerifyOtp(OtpArgs),
    /// Ask for a new registration code
    ResendOtp(ResendOtpArgs),
    /// Run cart detection on a photo
    Predict(PredictArgs),
    /// List your document submissions
    Submissions,
    /// Manage captured cart photos
    #[command(subcommand)]
    Gallery(GalleryCommand),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, rejected_env) = ClientConfig::load(cli.config.as_deref())?;
    logging::init(&config.log_filter);
    for message in rejected_env {
        warn!("{message}, keeping the configured value");
    }

    match cli.command {
        Commands::Schema(args) => cmd::form::schema(args),
        Commands::Check(args) => cmd::form::check(args, &config),
        Commands::Submit(args) => {
            let env = Env::open(config)?;
            block_on(cmd::form::submit(args, &env))
        }
        Commands::Login(args) => {
            let env = Env::open(config)?;
            block_on(cmd::account::login(args, &env))
        }
        Commands::Logout => cmd::account::logout(&Env::open(config)?),
        Commands::VerifyOtp(args) => {
            let env = Env::open(config)?;
            block_on(cmd::account::verify_otp(args, &env))
        }
        Commands::ResendOtp(args) => {
            let env = Env::open(config)?;
            block_on(cmd::account::resend_otp(args, &env))
        }
        Commands::Predict(args) => {
            let env = Env::open(config)?;
            block_on(cmd::vendor::predict(args, &env))
        }
        Commands::Submissions => {
            let env = Env::open(config)?;
            block_on(cmd::vendor::submissions(&env))
        }
        Commands::Gallery(command) => {
            let env = Env::open(config)?;
            block_on(cmd::vendor::gallery(command, &env))
        }
    }
}

fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?
        .block_on(future)
}
