use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use permit_form::{
    AssetSource, AssetStager, FieldErrors, FieldKind, FieldStore, FormSession, PickOutcome, StepOutcome,
    form_schema,
};
use serde_json::{Value, json};
use tracing::warn;

use super::{Env, clock, report};
use crate::config::ClientConfig;
use crate::orchestrator::{SubmissionOrchestrator, SubmitOutcome, shared};
use crate::picker::PathPicker;
use crate::workflows::{Workflow, vendor_application};

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Print this workflow's form definition instead of the generic schema
    #[arg(long, value_enum)]
    pub workflow: Option<Workflow>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(value_enum)]
    pub workflow: Workflow,
    #[arg(long, value_name = "answers.json")]
    pub answers: PathBuf,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    #[arg(value_enum)]
    pub workflow: Workflow,
    #[arg(long, value_name = "answers.json")]
    pub answers: PathBuf,
    /// Attach a local file to an asset field; repeat for multi-file fields
    #[arg(long = "asset", value_name = "FIELD=PATH", value_parser = parse_asset)]
    pub assets: Vec<(String, PathBuf)>,
    /// Update the existing record instead of creating one
    #[arg(long)]
    pub update: bool,
    #[arg(long, value_name = "ID", requires = "update")]
    pub record_id: Option<String>,
    #[arg(long)]
    pub json: bool,
}

fn parse_asset(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((field, path)) if !field.is_empty() && !path.is_empty() => {
            Ok((field.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected FIELD=PATH, got '{raw}'")),
    }
}

pub fn schema(args: SchemaArgs) -> Result<()> {
    let value = match args.workflow {
        Some(workflow) => serde_json::to_value(workflow.spec())?,
        None => form_schema(),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub fn check(args: CheckArgs, config: &ClientConfig) -> Result<()> {
    let answers = read_answers(&args.answers)?;
    let mut session = args.workflow.start(clock(config));
    apply_answers(&mut session, &answers);

    let blocked = walk(&mut session);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&check_report(&session, &blocked))?);
    } else {
        print_report(&session, &blocked);
    }
    match blocked {
        Some(errors) => bail!("{} field(s) need attention", errors.len()),
        None => Ok(()),
    }
}

pub async fn submit(args: SubmitArgs, env: &Env) -> Result<()> {
    let answers = read_answers(&args.answers)?;
    let workflow = args.workflow;
    if args.update && !workflow.supports_update() {
        bail!("workflow does not support updates");
    }

    let session = if args.update {
        workflow.resume(env.clock(), &answers, args.record_id.clone())
    } else {
        let mut session = workflow.start(env.clock());
        apply_answers(&mut session, &answers);
        session
    };
    let mut session = session.with_stager(AssetStager::new(env.config.max_asset_bytes));
    stage_assets(&mut session, &args.assets)?;
    if workflow == Workflow::VendorApplication {
        vendor_application::fill_product_categories(&mut session);
    }

    if let Some(errors) = walk(&mut session) {
        print_report(&session, &Some(errors.clone()));
        bail!("{} field(s) need attention", errors.len());
    }

    let session = shared(session);
    let orchestrator = SubmissionOrchestrator::new(env.api.clone(), env.api.clone());
    let outcome = orchestrator
        .submit(&session, &workflow.target())
        .await
        .map_err(report)?;

    match outcome {
        SubmitOutcome::Submitted(result) if args.json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        SubmitOutcome::Submitted(result) => {
            println!("Submitted: {}", result.status.label());
            if let Some(id) = &result.id {
                println!("Reference: {id}");
            }
            if let Some(message) = &result.message {
                println!("{message}");
            }
        }
        SubmitOutcome::AlreadyInFlight => println!("A submission is already in progress."),
    }
    Ok(())
}

fn read_answers(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read answers {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid answers {}", path.display()))
}

fn apply_answers(session: &mut FormSession, answers: &Value) {
    let fields = FieldStore::from_json(session.spec(), answers);
    session.set_fields(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );
}

fn stage_assets(session: &mut FormSession, assets: &[(String, PathBuf)]) -> Result<()> {
    let mut by_field: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
    for (field, path) in assets {
        by_field
            .entry(field.as_str())
            .or_default()
            .push(path.as_path());
    }
    for (field, paths) in by_field {
        let single = matches!(
            session.spec().field(field).map(|spec| &spec.kind),
            Some(FieldKind::Asset { multiple: false, .. })
        );
        if single && paths.len() > 1 {
            bail!("'{field}' takes one file, got {}", paths.len());
        }
        let mut picker = PathPicker::from_paths(&paths).map_err(report)?;
        match session
            .pick_asset(field, &mut picker, AssetSource::DocumentBrowser)
            .map_err(|err| report(err.into()))?
        {
            PickOutcome::Staged(stage) => {
                for name in stage.rejected_names() {
                    warn!(field, file = name, "file not attached");
                }
            }
            PickOutcome::Cancelled => return Err(anyhow!("no file given for '{field}'")),
        }
    }
    Ok(())
}

/// Presses `Next` until the last section; returns the errors that stopped it.
fn walk(session: &mut FormSession) -> Option<FieldErrors> {
    loop {
        match session.next() {
            StepOutcome::Advanced { .. } => continue,
            StepOutcome::Blocked(errors) => return Some(errors),
            _ => return None,
        }
    }
}

fn check_report(session: &FormSession, blocked: &Option<FieldErrors>) -> Value {
    let section = session.current_section();
    json!({
        "form": session.spec().id,
        "valid": blocked.is_none(),
        "section": section.map(|section| section.id.clone()),
        "errors": blocked.clone().unwrap_or_default(),
    })
}

fn print_report(session: &FormSession, blocked: &Option<FieldErrors>) {
    let title = session
        .current_section()
        .map(|section| section.title.as_str())
        .unwrap_or_default();
    match blocked {
        None => println!("All {} sections are valid.", session.section_count()),
        Some(errors) => {
            println!("Section '{title}' needs attention:");
            for error in errors.values() {
                println!("  {}: {}", error.field, error.message);
            }
        }
    }
}
