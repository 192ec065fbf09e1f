//! Loading snapshots and side files from disk.
//!
//! Snapshots and the hero master are CSV with a header row. Rules and Discord
//! templates are JSON, forum templates are `[key]`-sectioned text. A side file
//! that does not exist loads as its empty default so that a fresh checkout
//! works without any of them; a snapshot that does not exist is an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::display::rules::RuleSet;
use crate::errors::{CalendiffError, ExError, ExErrorKind};
use crate::model::{EventRecord, Snapshot};
use crate::posts::DiscordTemplate;
use crate::template::parse_forum_templates;
use crate::translation::HeroTranslator;
use crate::{log_op_end, log_op_error, log_op_start};

/// `base/folder/calendar-export-{folder}.csv`
pub fn snapshot_path(base: &Path, folder: &str) -> PathBuf {
    base.join(folder)
        .join(format!("calendar-export-{}.csv", folder))
}

/// Header plus raw rows of a CSV file.
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn read_table(path: &Path) -> Result<Table, ExError> {
    if !path.exists() {
        return Err(CalendiffError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        // Short rows read as trailing blanks; long rows have nowhere to go
        if record.len() > header.len() {
            return Err(CalendiffError::RaggedRow {
                source_name: path.display().to_string(),
                row: i + 1,
                expected: header.len(),
                found: record.len(),
            }
            .into());
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { header, rows })
}

/// Load one calendar export.
///
/// The snapshot is named after the file stem. Required columns are not
/// checked here; the diff engine does that.
///
/// # Errors
///
/// - `NotFound`: the file does not exist
/// - `InvalidInput`: malformed CSV or a row longer than the header
/// - `Io`: the file could not be read
pub fn load_snapshot(path: &Path) -> Result<Snapshot, ExError> {
    let started = Instant::now();
    let path_str = path.display().to_string();
    log_op_start!("load_snapshot", snapshot_path = %path_str);

    let table = match read_table(path) {
        Ok(t) => t,
        Err(err) => {
            log_op_error!(
                "load_snapshot",
                err.clone(),
                duration_ms = started.elapsed().as_millis() as u64
            );
            return Err(err.with_op("load_snapshot"));
        }
    };

    let records: Vec<EventRecord> = table
        .rows
        .iter()
        .map(|cells| EventRecord::from_cells(&table.header, cells))
        .collect();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_str.clone());

    log_op_end!(
        "load_snapshot",
        duration_ms = started.elapsed().as_millis() as u64,
        output_len = records.len()
    );
    Ok(Snapshot::new(name, table.header, records))
}

/// Load the hero master into a translator.
///
/// Name columns may be called `hero_en`/`hero_ja` or
/// `heroname_en`/`heroname_ja`. A missing file gives an empty translator.
///
/// # Errors
///
/// - `MissingColumn`: no `id` column
/// - `InvalidInput` / `Io`: as for [`load_snapshot`]
pub fn load_hero_master(path: &Path) -> Result<HeroTranslator, ExError> {
    if !path.exists() {
        return Ok(HeroTranslator::default());
    }
    let table = read_table(path).map_err(|e| e.with_op("load_hero_master"))?;

    let id_col = column_index(&table.header, &["id"]).ok_or_else(|| {
        ExError::from(CalendiffError::MissingColumn {
            snapshot: path.display().to_string(),
            column: "id".to_string(),
        })
        .with_op("load_hero_master")
    })?;
    let en_col = column_index(&table.header, &["hero_en", "heroname_en"]);
    let ja_col = column_index(&table.header, &["hero_ja", "heroname_ja"]);

    let mut translator = HeroTranslator::new();
    for row in &table.rows {
        let id = cell(row, Some(id_col));
        translator.insert(&id, &cell(row, en_col), &cell(row, ja_col));
    }
    tracing::debug!(heroes = translator.len(), "hero master loaded");
    Ok(translator)
}

fn column_index(header: &[String], names: &[&str]) -> Option<usize> {
    header.iter().position(|h| names.contains(&h.as_str()))
}

fn cell(row: &[String], col: Option<usize>) -> String {
    col.and_then(|c| row.get(c)).cloned().unwrap_or_default()
}

fn read_optional(path: &Path) -> Result<Option<String>, ExError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ExError::from(e).with_entity_id(path.display().to_string())),
    }
}

/// Load type-mapping rules.
///
/// # Errors
///
/// - `Serialization`: not a JSON rule array
/// - `InvalidRule`: unknown operator or bad pattern
pub fn load_rules(path: &Path) -> Result<RuleSet, ExError> {
    let Some(text) = read_optional(path)? else {
        return Ok(RuleSet::default());
    };
    RuleSet::from_json(&text).map_err(|e| {
        ExError::from(e)
            .with_op("load_rules")
            .with_entity_id(path.display().to_string())
    })
}

/// Load forum templates keyed by section name (`new_en`, `modified_ja`, ...).
///
/// # Errors
///
/// `Io` when the file exists but cannot be read.
pub fn load_forum_templates(path: &Path) -> Result<BTreeMap<String, String>, ExError> {
    Ok(read_optional(path)?
        .map(|text| parse_forum_templates(&text))
        .unwrap_or_default())
}

/// Load the Discord template list.
///
/// # Errors
///
/// `InvalidTemplate` when the file is not a JSON array of templates.
pub fn load_discord_templates(path: &Path) -> Result<Vec<DiscordTemplate>, ExError> {
    let Some(text) = read_optional(path)? else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&text).map_err(|e| {
        ExError::new(ExErrorKind::InvalidTemplate)
            .with_op("load_discord_templates")
            .with_entity_id(path.display().to_string())
            .with_message(e.to_string())
    })
}
