use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::LoadError;

/// One reported marine mammal observation, as served by the sightings API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sighting {
    #[serde(rename = "type", default, deserialize_with = "de_text")]
    pub species: String,
    #[serde(deserialize_with = "de_coordinate")]
    pub longitude: f64,
    #[serde(deserialize_with = "de_coordinate")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "de_text")]
    pub data_source_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub data_source_comments: String,
    #[serde(default, deserialize_with = "de_count")]
    pub no_sighted: Option<u32>,
    #[serde(default, deserialize_with = "de_text")]
    pub ssemmi_date_added: String,
}

impl Sighting {
    pub fn date_added(&self) -> SightingDate {
        SightingDate::parse(&self.ssemmi_date_added)
    }
}

/// Parse the sightings endpoint body. Any malformed record fails the whole payload.
pub fn parse_sightings(body: &str) -> Result<Vec<Sighting>, LoadError> {
    let sightings = serde_json::from_str::<Vec<Sighting>>(body)?;
    Ok(sightings)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn de_coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate {s:?}")))?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("non-finite coordinate"));
    }
    Ok(value)
}

fn de_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let count = match Option::<NumberOrText>::deserialize(deserializer)? {
        None => None,
        Some(NumberOrText::Number(n)) => whole_count(n),
        Some(NumberOrText::Text(s)) => s.trim().parse::<f64>().ok().and_then(whole_count),
    };
    Ok(count)
}

fn whole_count(n: f64) -> Option<u32> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64).then_some(n as u32)
}

/// `ssemmi_date_added`, parsed when it looks like a date, otherwise kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SightingDate {
    Parsed(DateTime<Utc>),
    Raw(String),
}

impl SightingDate {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return SightingDate::Parsed(dt.with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return SightingDate::Parsed(naive.and_utc());
            }
        }
        if let Some(naive) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return SightingDate::Parsed(naive.and_utc());
        }
        SightingDate::Raw(raw.to_string())
    }
}

impl fmt::Display for SightingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SightingDate::Parsed(dt) => write!(f, "{}", dt.format("%a %b %d %Y %H:%M:%S UTC")),
            SightingDate::Raw(raw) => f.write_str(raw),
        }
    }
}
