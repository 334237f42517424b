use std::{collections::BTreeMap, fs, io, path::Path};

use is_it_fake_preprocessing::PreprocessorParams;
use serde::Deserialize;

use crate::{
    error::AdapterError,
    scores::{FAKE_LABEL, REAL_LABEL},
};

pub const MODEL_FILENAME: &str = "model.onnx";
pub const CONFIG_FILENAME: &str = "config.json";
pub const PREPROCESSOR_FILENAME: &str = "preprocessor_config.json";

/// Label order assumed when the export ships without an `id2label` table.
pub const DEFAULT_LABELS: [&str; 2] = [REAL_LABEL, FAKE_LABEL];

#[derive(Debug, Deserialize)]
struct ModelConfig {
    #[serde(default)]
    id2label: BTreeMap<String, String>,
}

/// Read an optional JSON artifact; `Ok(None)` when the file does not exist.
fn read_optional(path: &Path) -> Result<Option<String>, AdapterError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(
                path = %path.display(),
                "optional model artifact missing, using defaults"
            );
            Ok(None)
        }
        Err(err) => Err(AdapterError::Unavailable(format!(
            "failed to read {}: {err}",
            path.display()
        ))),
    }
}

/// Labels in index order from a Hugging Face `config.json`.
pub fn parse_labels(json: &str) -> Result<Vec<String>, AdapterError> {
    let config: ModelConfig = serde_json::from_str(json)
        .map_err(|err| AdapterError::Unavailable(format!("invalid {CONFIG_FILENAME}: {err}")))?;

    if config.id2label.is_empty() {
        return Ok(DEFAULT_LABELS.iter().map(ToString::to_string).collect());
    }

    let mut indexed = config
        .id2label
        .into_iter()
        .map(|(id, label)| {
            id.parse::<usize>().map(|id| (id, label)).map_err(|_| {
                AdapterError::Unavailable(format!("non-numeric id2label key {id:?}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    indexed.sort_by_key(|(id, _)| *id);

    if indexed.iter().enumerate().any(|(pos, (id, _))| pos != *id) {
        return Err(AdapterError::Unavailable(
            "id2label keys must be contiguous from 0".to_string(),
        ));
    }
    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

pub fn load_labels(model_dir: &Path) -> Result<Vec<String>, AdapterError> {
    match read_optional(&model_dir.join(CONFIG_FILENAME))? {
        Some(json) => parse_labels(&json),
        None => Ok(DEFAULT_LABELS.iter().map(ToString::to_string).collect()),
    }
}

pub fn parse_preprocessor(json: &str) -> Result<PreprocessorParams, AdapterError> {
    serde_json::from_str(json).map_err(|err| {
        AdapterError::Unavailable(format!("invalid {PREPROCESSOR_FILENAME}: {err}"))
    })
}

pub fn load_preprocessor(model_dir: &Path) -> Result<PreprocessorParams, AdapterError> {
    read_optional(&model_dir.join(PREPROCESSOR_FILENAME))?
        .map_or_else(|| Ok(PreprocessorParams::default()), |json| parse_preprocessor(&json))
}
