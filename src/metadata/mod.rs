// Sidecar metadata model

pub mod exiftool;

use std::path::Path;
use chrono::{DateTime, Local, TimeZone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use crate::constants::DESCRIPTION_LINE_SEPARATOR;
use crate::error::{ReconcileError, Result};

/// Fields consumed from a photo-backup JSON sidecar. Everything else is ignored.
/// Only `photoTakenTime` is type-checked; other fields of the wrong type read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    pub photo_taken_time: Option<TakenTime>,
    #[serde(default, deserialize_with = "lenient")]
    pub geo_data: Option<GeoData>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TakenTime {
    pub timestamp: Option<EpochSeconds>,
}

/// Exports encode epoch seconds as a string; bare integers are accepted too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EpochSeconds {
    Text(String),
    Number(i64),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoData {
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub altitude: Option<f64>,
}

/// Any value that does not fit `T` becomes None instead of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Numbers, or strings holding a number; anything else is absent.
fn lenient_coordinate<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

/// Read and parse a sidecar file.
pub fn load_sidecar(path: &Path) -> Result<SidecarRecord> {
    let contents = std::fs::read_to_string(path)?;
    let record = serde_json::from_str(&contents)?;
    Ok(record)
}

impl SidecarRecord {
    /// Capture time in epoch seconds. `path` is only used for error messages.
    pub fn epoch_seconds(&self, path: &Path) -> Result<i64> {
        let value = self
            .photo_taken_time
            .as_ref()
            .and_then(|t| t.timestamp.as_ref())
            .ok_or_else(|| ReconcileError::MissingField {
                field: "photoTakenTime",
                path: path.display().to_string(),
            })?;

        match value {
            EpochSeconds::Number(n) => Ok(*n),
            EpochSeconds::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                ReconcileError::InvalidTimestamp {
                    value: s.clone(),
                    path: path.display().to_string(),
                }
            }),
        }
    }

    /// Capture time converted to the local timezone.
    pub fn local_capture_time(&self, path: &Path) -> Result<DateTime<Local>> {
        let seconds = self.epoch_seconds(path)?;
        Local
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| ReconcileError::InvalidTimestamp {
                value: seconds.to_string(),
                path: path.display().to_string(),
            })
    }

    /// Description flattened to one line with double quotes swapped for single quotes.
    /// Returns None when absent or blank.
    pub fn normalized_description(&self) -> Option<String> {
        let flattened = self
            .description
            .as_deref()?
            .trim()
            .replace("\r\n", "\n")
            .replace('\n', DESCRIPTION_LINE_SEPARATOR)
            .replace('"', "'");

        if flattened.is_empty() {
            None
        } else {
            Some(flattened)
        }
    }
}
