//! Wire types exchanged with the annotation service.
//!
//! Field names match the service's JSON bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sphere_geo::GeoBounds;

use crate::model::{ImageId, ServerId};

/// An annotation as stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: ServerId,
    pub image_id: ImageId,
    #[serde(default)]
    pub label: Option<String>,
    pub az_min: f64,
    pub alt_min: f64,
    pub az_max: f64,
    pub alt_max: f64,
    #[serde(default)]
    pub color: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl AnnotationRecord {
    /// The record's corners, normalized.
    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::from_edges(self.az_min, self.alt_min, self.az_max, self.alt_max)
    }
}

/// Request body for creating or updating an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPayload {
    pub label: String,
    pub az_min: f64,
    pub alt_min: f64,
    pub az_max: f64,
    pub alt_max: f64,
    pub color: String,
}

impl AnnotationPayload {
    pub fn new(label: &str, bounds: &GeoBounds, color: &str) -> Self {
        Self {
            label: label.to_string(),
            az_min: bounds.min.azimuth,
            alt_min: bounds.min.altitude,
            az_max: bounds.max.azimuth,
            alt_max: bounds.max.altitude,
            color: color.to_string(),
        }
    }

    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::from_edges(self.az_min, self.alt_min, self.az_max, self.alt_max)
    }

    /// Build the stored record this payload becomes under `id`.
    pub fn into_record(self, id: ServerId, image_id: ImageId, created_at: DateTime<Utc>) -> AnnotationRecord {
        AnnotationRecord {
            id,
            image_id,
            label: if self.label.is_empty() { None } else { Some(self.label) },
            az_min: self.az_min,
            alt_min: self.alt_min,
            az_max: self.az_max,
            alt_max: self.alt_max,
            color: self.color,
            created_at,
        }
    }
}

/// Timestamps are written as RFC 3339. On read, naive ISO timestamps
/// (no offset, as some backends emit) are taken to be UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(D::Error::custom)
    }
}
