use serde::Serialize;
use sha2::{Digest, Sha256};
use uqf_core::{ErrorInfo, UqfError};

use crate::persistence::Study;

fn hash_json<T: Serialize>(value: &T) -> Result<String, UqfError> {
    let json = serde_json::to_vec(value)
        .map_err(|err| UqfError::Serde(ErrorInfo::new("serialize", err.to_string())))?;
    let mut hasher = Sha256::new();
    hasher.update(json);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Computes the canonical hash of a study.
///
/// Objects and labels are kept in ordered maps, so two studies holding the
/// same graph stored in the same order hash identically.
pub fn canonical_hash(study: &Study) -> Result<String, UqfError> {
    hash_json(study)
}
