//! Reader for the JSON map export.
//!
//! Every tile carries its owner and population inside templated,
//! HTML-escaped text such as `{k.spieler} Alice<br />{k.einwohner} 120`.
//! This module is the only place that looks at that text.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::village::{SourceError, VillageRecord, VillageSource};

#[derive(Debug, Clone, Deserialize)]
pub struct MapDocument {
    pub tiles: Vec<RawTile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTile {
    pub position: Position,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub uid: Option<i64>,
    #[serde(default)]
    pub did: Option<i64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

fn player_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{k\.spieler\} (.+?)<br").expect("valid player pattern"))
}

fn population_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{k\.einwohner\} (\d+)").expect("valid population pattern"))
}

fn bracket_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{[ka]\.[^}]+\}").expect("valid tag pattern"))
}

impl RawTile {
    pub fn to_record(&self) -> VillageRecord {
        let text = html_escape::decode_html_entities(self.text.as_deref().unwrap_or_default());
        let title = html_escape::decode_html_entities(self.title.as_deref().unwrap_or_default());

        let player = player_pattern()
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        // Digits that overflow u64 are treated like a missing value.
        let population = population_pattern()
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok());

        VillageRecord {
            x: self.position.x,
            y: self.position.y,
            player,
            population,
            village_id: self.did,
            tile_id: self.uid,
            title: bracket_tag_pattern()
                .replace_all(&title, "")
                .trim()
                .to_string(),
        }
    }
}

impl MapDocument {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn records(&self) -> Vec<VillageRecord> {
        self.tiles.iter().map(RawTile::to_record).collect()
    }
}

/// Village source backed by a map export file on disk.
#[derive(Debug, Clone)]
pub struct MapExport {
    path: PathBuf,
}

impl MapExport {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VillageSource for MapExport {
    fn villages(&self) -> Result<Vec<VillageRecord>, SourceError> {
        let data = fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document = MapDocument::from_json(&data).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let records = document.records();
        debug!(
            path = %self.path.display(),
            tiles = records.len(),
            "map export loaded"
        );
        Ok(records)
    }
}
