//! Per-user gallery of captured cart photos.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::error::ClientError;
use crate::kv::{KeyValueStore, load_json, save_json};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Pasig City centre.
pub const SERVICE_CENTER: GeoPoint = GeoPoint {
    latitude: 14.5764,
    longitude: 121.0851,
};
pub const SERVICE_RADIUS_M: f64 = 6_000.0;

/// Photos older than this are no longer accepted for submission.
pub const PHOTO_MAX_AGE: Duration = Duration::hours(36);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Haversine great-circle distance in metres.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        EARTH_RADIUS_M * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
    }

    pub fn within_service_area(&self) -> bool {
        self.distance_m(&SERVICE_CENTER) <= SERVICE_RADIUS_M
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPhoto {
    pub id: String,
    pub uri: String,
    #[serde(with = "time::serde::rfc3339")]
    pub captured_at: OffsetDateTime,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_url: Option<String>,
}

impl GalleryPhoto {
    pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
        now - self.captured_at <= PHOTO_MAX_AGE
    }

    pub fn in_service_area(&self) -> bool {
        self.location
            .is_some_and(|location| location.within_service_area())
    }
}

pub struct Gallery {
    store: Arc<dyn KeyValueStore>,
}

impl Gallery {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(user_id: &str) -> String {
        format!("gallery_{user_id}")
    }

    pub fn list(&self, user_id: &str) -> Result<Vec<GalleryPhoto>, ClientError> {
        Ok(load_json(self.store.as_ref(), &Self::key(user_id))?.unwrap_or_default())
    }

    pub fn save(
        &self,
        user_id: &str,
        uri: impl Into<String>,
        location: Option<GeoPoint>,
        captured_at: OffsetDateTime,
    ) -> Result<GalleryPhoto, ClientError> {
        let photo = GalleryPhoto {
            id: Uuid::new_v4().to_string(),
            uri: uri.into(),
            captured_at,
            location,
            cloud_url: None,
        };
        let mut photos = self.list(user_id)?;
        photos.push(photo.clone());
        self.write(user_id, &photos)?;
        debug!(photo = %photo.id, "saved photo to gallery");
        Ok(photo)
    }

    /// Returns whether a photo was removed.
    pub fn remove(&self, user_id: &str, photo_id: &str) -> Result<bool, ClientError> {
        let mut photos = self.list(user_id)?;
        let before = photos.len();
        photos.retain(|photo| photo.id != photo_id);
        if photos.len() == before {
            return Ok(false);
        }
        self.write(user_id, &photos)?;
        Ok(true)
    }

    /// Records where a photo ended up after upload.
    pub fn attach_cloud_url(
        &self,
        user_id: &str,
        photo_id: &str,
        url: impl Into<String>,
    ) -> Result<bool, ClientError> {
        let mut photos = self.list(user_id)?;
        let Some(photo) = photos.iter_mut().find(|photo| photo.id == photo_id) else {
            return Ok(false);
        };
        photo.cloud_url = Some(url.into());
        self.write(user_id, &photos)?;
        Ok(true)
    }

    fn write(&self, user_id: &str, photos: &[GalleryPhoto]) -> Result<(), ClientError> {
        save_json(self.store.as_ref(), &Self::key(user_id), &photos)
    }
}
