use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use time::OffsetDateTime;

use super::{Env, report};
use crate::gallery::{Gallery, GeoPoint};
use crate::picker::stage_file;

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GalleryCommand {
    /// List saved photos
    List,
    /// Save a captured photo
    Add {
        path: PathBuf,
        #[arg(long, requires = "longitude", allow_negative_numbers = true)]
        latitude: Option<f64>,
        #[arg(long, requires = "latitude", allow_negative_numbers = true)]
        longitude: Option<f64>,
    },
    /// Delete a saved photo
    Remove { id: String },
    /// Upload a saved photo and remember its remote URL
    Upload { id: String },
}

pub async fn predict(args: PredictArgs, env: &Env) -> Result<()> {
    let asset = stage_file(&args.file).map_err(report)?;
    let prediction = env.api.predict_cart(&asset).await.map_err(report)?;
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}

pub async fn submissions(env: &Env) -> Result<()> {
    let results = env.api.fetch_submissions().await.map_err(report)?;
    if results.is_empty() {
        println!("No submissions yet.");
    }
    for result in results {
        println!(
            "{:<26} {:<15} {:>5.1}%  {}",
            result.id.as_deref().unwrap_or("-"),
            result.status.label(),
            result.scores.similarity,
            result.submitted_at.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub async fn gallery(command: GalleryCommand, env: &Env) -> Result<()> {
    let session = env
        .auth
        .current()
        .ok_or_else(|| anyhow!("please login first"))?;
    let user_id = session.user.id.as_str();
    let gallery = Gallery::new(env.store.clone());

    match command {
        GalleryCommand::List => {
            let now = OffsetDateTime::now_utc();
            for photo in gallery.list(user_id).map_err(report)? {
                println!(
                    "{}  {}  {}{}",
                    photo.id,
                    photo.uri,
                    if photo.is_fresh_at(now) { "fresh" } else { "expired" },
                    if photo.in_service_area() {
                        ""
                    } else {
                        "  outside service area"
                    }
                );
            }
        }
        GalleryCommand::Add {
            path,
            latitude,
            longitude,
        } => {
            let location = latitude
                .zip(longitude)
                .map(|(latitude, longitude)| GeoPoint {
                    latitude,
                    longitude,
                });
            let asset = stage_file(&path).map_err(report)?;
            let photo = gallery
                .save(user_id, asset.local_ref, location, OffsetDateTime::now_utc())
                .map_err(report)?;
            println!("{}", photo.id);
        }
        GalleryCommand::Remove { id } => {
            if !gallery.remove(user_id, &id).map_err(report)? {
                return Err(anyhow!("no photo with id '{id}'"));
            }
        }
        GalleryCommand::Upload { id } => {
            let photo = gallery
                .list(user_id)
                .map_err(report)?
                .into_iter()
                .find(|photo| photo.id == id)
                .ok_or_else(|| anyhow!("no photo with id '{id}'"))?;
            if let Some(url) = &photo.cloud_url {
                println!("{url}");
                return Ok(());
            }
            let asset = stage_file(Path::new(&photo.uri)).map_err(report)?;
            let url = env.api.upload_image(&asset).await.map_err(report)?;
            gallery
                .attach_cloud_url(user_id, &photo.id, url.clone())
                .map_err(report)?;
            println!("{url}");
        }
    }
    Ok(())
}
