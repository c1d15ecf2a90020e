/*!
 * History and evaluation files.
 *
 * The history CSV is append-only: one row per completed interactive
 * translation, header written once. The evaluation CSV is regenerated in
 * full on every batch run and replaced atomically.
 */

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::PersistenceError;
use crate::file_utils::FileManager;

/// Column order of the history file
pub const HISTORY_COLUMNS: [&str; 5] = ["source_lang", "target_lang", "src_text", "ref_text", "our_translation"];

/// Column order of the evaluation file
pub const EVALUATION_COLUMNS: [&str; 12] = [
    "source_lang",
    "target_lang",
    "src_text",
    "ref_text",
    "our_translation",
    "google_translation",
    "bleu",
    "ter",
    "meteor",
    "google_bleu",
    "google_ter",
    "google_meteor",
];

/// One logged interactive translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub source_lang: String,
    pub target_lang: String,
    pub src_text: String,
    #[serde(default)]
    pub ref_text: String,
    #[serde(default)]
    pub our_translation: String,
}

impl HistoryRow {
    /// Check the row invariants; only `ref_text` may be empty
    pub fn validate(&self) -> Result<(), PersistenceError> {
        let required = [
            ("source_lang", &self.source_lang),
            ("target_lang", &self.target_lang),
            ("src_text", &self.src_text),
            ("our_translation", &self.our_translation),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(PersistenceError::InvalidRow(format!("{} is empty", name))),
            None => Ok(()),
        }
    }

    /// Whether a reference translation is present
    pub fn has_reference(&self) -> bool {
        !self.ref_text.trim().is_empty()
    }
}

/// A history row with recomputed metrics and the comparison translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub source_lang: String,
    pub target_lang: String,
    pub src_text: String,
    #[serde(default)]
    pub ref_text: String,
    #[serde(default)]
    pub our_translation: String,
    #[serde(default)]
    pub google_translation: String,
    #[serde(serialize_with = "serialize_score", default)]
    pub bleu: Option<f64>,
    #[serde(serialize_with = "serialize_score", default)]
    pub ter: Option<f64>,
    #[serde(serialize_with = "serialize_score", default)]
    pub meteor: Option<f64>,
    #[serde(serialize_with = "serialize_score", default)]
    pub google_bleu: Option<f64>,
    #[serde(serialize_with = "serialize_score", default)]
    pub google_ter: Option<f64>,
    #[serde(serialize_with = "serialize_score", default)]
    pub google_meteor: Option<f64>,
}

impl EvaluationRow {
    /// Start an evaluation row from a history row with every score absent
    pub fn from_history(row: &HistoryRow) -> Self {
        Self {
            source_lang: row.source_lang.clone(),
            target_lang: row.target_lang.clone(),
            src_text: row.src_text.clone(),
            ref_text: row.ref_text.clone(),
            our_translation: row.our_translation.clone(),
            google_translation: String::new(),
            bleu: None,
            ter: None,
            meteor: None,
            google_bleu: None,
            google_ter: None,
            google_meteor: None,
        }
    }

    /// Whether our side has any score
    pub fn has_our_metrics(&self) -> bool {
        self.bleu.is_some() || self.ter.is_some() || self.meteor.is_some()
    }

    /// Whether the comparison side has any score
    pub fn has_google_metrics(&self) -> bool {
        self.google_bleu.is_some() || self.google_ter.is_some() || self.google_meteor.is_some()
    }
}

fn serialize_score<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_str(&format!("{:.4}", v)),
        None => serializer.serialize_none(),
    }
}

/// Append-only history file
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        FileManager::file_exists(&self.path)
    }

    /// Append one row, writing the header if the file is new or empty
    pub fn append(&self, row: &HistoryRow) -> Result<(), PersistenceError> {
        row.validate()?;
        if let Some(parent) = self.path.parent() {
            FileManager::ensure_dir(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush().map_err(|e| PersistenceError::io(&self.path, e))?;

        debug!("Logged history row to {:?}", self.path);
        Ok(())
    }

    /// Read every row, keeping per-row decode failures separate
    pub fn rows(&self) -> Result<Vec<Result<HistoryRow, PersistenceError>>, PersistenceError> {
        if !self.exists() {
            return Err(PersistenceError::NoHistory(self.path.clone()));
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        Ok(reader
            .deserialize::<HistoryRow>()
            .map(|row| row.map_err(PersistenceError::from))
            .collect())
    }

    /// Read every row, failing on the first malformed one
    pub fn load(&self) -> Result<Vec<HistoryRow>, PersistenceError> {
        self.rows()?.into_iter().collect()
    }
}

/// Replace the evaluation file with `rows`
///
/// Written to a temporary file in the same directory, then renamed over the target.
pub fn write_evaluation(path: &Path, rows: &[EvaluationRow]) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    FileManager::ensure_dir(&dir).map_err(|e| PersistenceError::io(&dir, e))?;

    let temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file());
        writer.write_record(EVALUATION_COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|e| PersistenceError::io(path, e))?;
    }
    temp.persist(path).map_err(|e| PersistenceError::io(path, e.error))?;

    debug!("Wrote {} evaluation rows to {:?}", rows.len(), path);
    Ok(())
}

/// Read an evaluation file produced by `write_evaluation`
pub fn read_evaluation(path: &Path) -> Result<Vec<EvaluationRow>, PersistenceError> {
    if !FileManager::file_exists(path) {
        return Err(PersistenceError::NoEvaluation(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<EvaluationRow>()
        .map(|row| row.map_err(PersistenceError::from))
        .collect()
}
