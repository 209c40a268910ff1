//! Session registry: working datasets keyed by id.
//!
//! A [`SessionStore`] is an explicit value owned by the caller. Sessions live until they are
//! removed; nothing is persisted. [`SessionStore::apply`] is the writer path for pipeline runs and
//! [`SessionStore::preview`] only reads.
//!
//! The store is not internally synchronized: writers take `&mut self`, so sharing it across threads
//! means wrapping it in the caller's own lock.
//!
//! ```rust
//! use rust_data_transform::execution::TransformationEngine;
//! use rust_data_transform::session::SessionStore;
//! use rust_data_transform::step::{StepKind, TransformationStep};
//! use rust_data_transform::types::{DataSet, Record, Value};
//!
//! let mut store = SessionStore::new();
//! let ds: DataSet = (1..=3).map(|i| Record::from_iter([("id", Value::from(i))])).collect();
//! let id = store.create(ds);
//!
//! let engine = TransformationEngine::default();
//! let steps = vec![TransformationStep::new(StepKind::FilterRows, "Small ids")
//!     .with_parameter("condition", serde_json::json!("id < 3"))];
//!
//! store.apply(&engine, &id, &steps).unwrap();
//! let session = store.get(&id).unwrap();
//! assert_eq!(session.total_rows, 2);
//! assert_eq!(session.transformations, vec!["Small ids".to_string()]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};
use crate::execution::{TransformationEngine, TransformationResult};
use crate::step::TransformationStep;
use crate::types::{DataSet, Record, Value};

/// Session identifier: a millisecond timestamp followed by a random suffix.
pub type SessionId = String;

const DEFAULT_PREVIEW_ROWS: usize = 10;
const ID_SUFFIX_LEN: usize = 9;

/// One working dataset and its history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "sessionId")]
    pub id: SessionId,
    pub data: DataSet,
    /// The first rows of `data`.
    pub preview: Vec<Record>,
    pub total_rows: usize,
    /// Keys of the first record of `data`.
    pub columns: Vec<String>,
    /// Labels of every change applied so far, oldest first.
    pub transformations: Vec<String>,
}

impl Session {
    fn new(id: SessionId, data: DataSet, preview_rows: usize) -> Self {
        let mut session = Self {
            id,
            data: DataSet::default(),
            preview: Vec::new(),
            total_rows: 0,
            columns: Vec::new(),
            transformations: Vec::new(),
        };
        session.set_data(data, preview_rows);
        session
    }

    fn set_data(&mut self, data: DataSet, preview_rows: usize) {
        self.preview = data.preview(preview_rows);
        self.total_rows = data.row_count();
        self.columns = data.columns();
        self.data = data;
    }
}

/// One-click clean-ups that bypass the step pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Lowercase, trim and underscore column names, then drop structurally duplicate rows.
    CleanColumns,
    /// Drop every row that has a missing cell.
    HandleMissing,
    /// Turn numeric text into numbers.
    ConvertTypes,
}

impl Preset {
    /// History label recorded when the preset is applied.
    pub fn label(self) -> &'static str {
        match self {
            Self::CleanColumns => "Clean column names & remove duplicates",
            Self::HandleMissing => "Handle missing data",
            Self::ConvertTypes => "Convert data types",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CleanColumns => "clean_columns",
            Self::HandleMissing => "handle_missing",
            Self::ConvertTypes => "convert_types",
        }
    }

    fn apply(self, data: &DataSet) -> DataSet {
        match self {
            Self::CleanColumns => drop_duplicate_rows(&clean_column_names(data)),
            Self::HandleMissing => data.filter_rows(|row| row.values().all(|v| !v.is_missing())),
            Self::ConvertTypes => data.map_rows(|row| {
                row.iter()
                    .map(|(key, value)| match value {
                        Value::Utf8(_) => {
                            let converted = value
                                .as_f64()
                                .map_or_else(|| value.clone(), Value::Number);
                            (key, converted)
                        }
                        _ => (key, value.clone()),
                    })
                    .collect()
            }),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::CleanColumns, Self::HandleMissing, Self::ConvertTypes]
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| SessionError::UnknownPreset { name: s.to_string() })
    }
}

fn clean_column_names(data: &DataSet) -> DataSet {
    data.map_rows(|row| {
        row.iter()
            .map(|(key, value)| {
                let clean = key
                    .trim()
                    .to_lowercase()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join("_");
                (clean, value.clone())
            })
            .collect()
    })
}

fn drop_duplicate_rows(data: &DataSet) -> DataSet {
    let mut seen = std::collections::HashSet::new();
    data.filter_rows(|row| seen.insert(row.canonical_key()))
}

/// Registry of sessions.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
    preview_rows: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    /// Set how many rows [`Session::preview`] keeps.
    pub fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }

    /// Register a freshly ingested dataset and return its new id.
    pub fn create(&mut self, data: DataSet) -> SessionId {
        let id = new_session_id();
        info!(session_id = %id, rows = data.row_count(), "session created");
        let session = Session::new(id.clone(), data, self.preview_rows);
        self.sessions.insert(id.clone(), session);
        id
    }

    pub fn get(&self, id: &str) -> SessionResult<&Session> {
        self.sessions.get(id).ok_or_else(|| not_found(id))
    }

    /// Replace a session's dataset and append `labels` to its history.
    pub fn replace<I>(&mut self, id: &str, data: DataSet, labels: I) -> SessionResult<&Session>
    where
        I: IntoIterator<Item = String>,
    {
        let preview_rows = self.preview_rows;
        let session = self.sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        session.set_data(data, preview_rows);
        session.transformations.extend(labels);
        debug!(session_id = id, rows = session.total_rows, "session replaced");
        Ok(session)
    }

    /// Drop a session, returning it.
    pub fn remove(&mut self, id: &str) -> SessionResult<Session> {
        let session = self.sessions.remove(id).ok_or_else(|| not_found(id))?;
        debug!(session_id = id, "session removed");
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    /// Run `steps` over the whole session dataset and store the result.
    ///
    /// On failure the session is left exactly as it was.
    pub fn apply(
        &mut self,
        engine: &TransformationEngine,
        id: &str,
        steps: &[TransformationStep],
    ) -> SessionResult<TransformationResult> {
        let result = engine.execute(&self.get(id)?.data, steps, false)?;
        self.replace(id, result.data.clone(), result.applied_transformations.iter().cloned())?;
        info!(
            session_id = id,
            steps = result.applied_transformations.len(),
            rows = result.total_rows,
            "session updated"
        );
        Ok(result)
    }

    /// Preview `steps` over a sample of the session dataset. Never writes.
    pub fn preview(
        &self,
        engine: &TransformationEngine,
        id: &str,
        steps: &[TransformationStep],
    ) -> SessionResult<TransformationResult> {
        Ok(engine.execute(&self.get(id)?.data, steps, true)?)
    }

    /// Apply a [`Preset`] to a session and record its label.
    pub fn apply_preset(&mut self, id: &str, preset: Preset) -> SessionResult<&Session> {
        let data = preset.apply(&self.get(id)?.data);
        info!(session_id = id, preset = %preset, rows = data.row_count(), "preset applied");
        self.replace(id, data, [preset.label().to_string()])
    }
}

fn not_found(id: &str) -> SessionError {
    SessionError::NotFound { id: id.to_string() }
}

fn new_session_id() -> SessionId {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::{new_session_id, Preset, SessionStore};
    use crate::error::SessionError;
    use crate::types::{DataSet, Record, Value};

    fn messy() -> DataSet {
        DataSet::new(vec![
            Record::from_iter([(" First Name ", Value::from("Ada")), ("Age", Value::from("36"))]),
            Record::from_iter([(" First Name ", Value::from("Ada")), ("Age", Value::from("36"))]),
            Record::from_iter([(" First Name ", Value::from("")), ("Age", Value::from("x"))]),
        ])
    }

    #[test]
    fn ids_are_timestamp_plus_lowercase_suffix() {
        let id = new_session_id();
        let (ts, suffix) = id.split_at(id.len() - 9);
        assert!(ts.parse::<i64>().is_ok());
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn create_get_replace_remove() {
        let mut store = SessionStore::new().with_preview_rows(2);
        let id = store.create(messy());
        assert_eq!(store.len(), 1);

        let session = store.get(&id).unwrap();
        assert_eq!(session.preview.len(), 2);
        assert_eq!(session.total_rows, 3);
        assert_eq!(session.columns, vec![" First Name ", "Age"]);

        let session = store.replace(&id, DataSet::default(), ["Cleared".to_string()]).unwrap();
        assert_eq!(session.total_rows, 0);
        assert!(session.columns.is_empty());
        assert_eq!(session.transformations, vec!["Cleared"]);

        store.remove(&id).unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.get(&id), Err(SessionError::NotFound { .. })));
        assert!(matches!(store.remove(&id), Err(SessionError::NotFound { .. })));
    }

    #[test]
    fn clean_columns_preset_renames_and_dedupes() {
        let mut store = SessionStore::new();
        let id = store.create(messy());
        let session = store.apply_preset(&id, Preset::CleanColumns).unwrap();
        assert_eq!(session.columns, vec!["first_name", "age"]);
        assert_eq!(session.total_rows, 2);
        assert_eq!(session.transformations, vec![Preset::CleanColumns.label()]);
    }

    #[test]
    fn handle_missing_and_convert_types_presets() {
        let mut store = SessionStore::new();
        let id = store.create(messy());
        store.apply_preset(&id, Preset::HandleMissing).unwrap();
        let session = store.apply_preset(&id, Preset::ConvertTypes).unwrap();
        assert_eq!(session.total_rows, 2);
        assert_eq!(session.data.rows[0].get("Age"), Some(&Value::from(36)));
        assert_eq!(session.data.rows[0].get(" First Name "), Some(&Value::from("Ada")));
        assert_eq!(session.transformations, vec!["Handle missing data", "Convert data types"]);
    }

    #[test]
    fn presets_parse_from_their_names() {
        assert_eq!("convert_types".parse::<Preset>().ok(), Some(Preset::ConvertTypes));
        assert!(matches!("sort".parse::<Preset>(), Err(SessionError::UnknownPreset { .. })));
    }
}
