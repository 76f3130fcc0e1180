use uqf_core::{ErrorInfo, UqfError};

use crate::persistence::{Study, STUDY_SCHEMA};

fn map_json(err: serde_json::Error, code: &str) -> UqfError {
    UqfError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn map_bincode(err: bincode::Error, code: &str) -> UqfError {
    UqfError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn check_schema(study: Study) -> Result<Study, UqfError> {
    let found = study.schema_version();
    if STUDY_SCHEMA.reads(&found) {
        Ok(study)
    } else {
        Err(UqfError::Serde(
            ErrorInfo::new(
                "study-schema",
                format!(
                    "study schema {}.{}.{} cannot be read by {}.{}.{}",
                    found.major,
                    found.minor,
                    found.patch,
                    STUDY_SCHEMA.major,
                    STUDY_SCHEMA.minor,
                    STUDY_SCHEMA.patch
                ),
            )
            .with_hint("re-export the study with a matching crate version"),
        ))
    }
}

/// Serialises a study to JSON.
pub fn study_to_json(study: &Study) -> Result<String, UqfError> {
    serde_json::to_string_pretty(study).map_err(|err| map_json(err, "study-serialize"))
}

/// Restores a study from JSON.
pub fn study_from_json(json: &str) -> Result<Study, UqfError> {
    check_schema(serde_json::from_str(json).map_err(|err| map_json(err, "study-deserialize"))?)
}

/// Serialises a study to a compact binary payload.
pub fn study_to_bytes(study: &Study) -> Result<Vec<u8>, UqfError> {
    bincode::serialize(study).map_err(|err| map_bincode(err, "study-encode"))
}

/// Restores a study from a binary payload.
pub fn study_from_bytes(bytes: &[u8]) -> Result<Study, UqfError> {
    check_schema(bincode::deserialize(bytes).map_err(|err| map_bincode(err, "study-decode"))?)
}
