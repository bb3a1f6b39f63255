use anyhow::Result;
use clap::Args;

use super::{Env, report};

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "PERMIT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct OtpArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long = "code", value_name = "OTP")]
    pub otp_code: String,
}

#[derive(Args, Debug, Clone)]
pub struct ResendOtpArgs {
    #[arg(long)]
    pub email: String,
}

pub async fn login(args: LoginArgs, env: &Env) -> Result<()> {
    let response = env
        .api
        .login(&args.email, &args.password)
        .await
        .map_err(report)?;
    println!("Signed in as {}", response.user.display_name());
    Ok(())
}

pub fn logout(env: &Env) -> Result<()> {
    env.auth.logout().map_err(report)?;
    println!("Signed out.");
    Ok(())
}

pub async fn verify_otp(args: OtpArgs, env: &Env) -> Result<()> {
    let response = env
        .api
        .verify_otp(&args.email, &args.otp_code)
        .await
        .map_err(report)?;
    println!(
        "{}",
        response
            .message
            .unwrap_or_else(|| "Account verified.".to_string())
    );
    Ok(())
}

pub async fn resend_otp(args: ResendOtpArgs, env: &Env) -> Result<()> {
    let response = env.api.resend_otp(&args.email).await.map_err(report)?;
    println!(
        "{}",
        response
            .message
            .unwrap_or_else(|| "A new code was sent.".to_string())
    );
    Ok(())
}
