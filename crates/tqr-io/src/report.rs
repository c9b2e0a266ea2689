use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::output::ensure_parent_dir;

/// A JSON report envelope: schema version, kind tag and generation time around a payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report<T> {
    pub schema_version: u32,
    pub kind: String,
    pub generated_at: DateTime<Utc>,
    pub payload: T,
}

impl<T> Report<T> {
    pub fn new(kind: impl Into<String>, payload: T) -> Self {
        Self {
            schema_version: 1,
            kind: kind.into(),
            generated_at: Utc::now(),
            payload,
        }
    }
}

/// Serialize `value` as pretty JSON, creating parent directories as needed.
pub fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;
    use crate::output::StudyRow;

    #[test]
    fn report_roundtrip_preserves_payload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("reports").join("study.json");

        let report = Report::new(
            "convergence-study",
            vec![StudyRow {
                test_id: 0,
                shifted: true,
                dimension: 5,
                iterations: 12,
                eigenvalue_error: 1.8e-15,
                eigenvector_error: 2.5e-15,
            }],
        );

        save_json(&path, &report).expect("save should succeed");
        let loaded: Report<Vec<StudyRow>> = load_json(&path).expect("load should succeed");
        assert_eq!(loaded, report);
        assert_eq!(loaded.schema_version, 1);
    }

    #[test]
    fn load_json_fails_for_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_json::<Report<u32>>(dir.path().join("missing.json"))
            .expect_err("missing file should fail");
        match err {
            IoError::Io(io_err) => assert_eq!(io_err.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_json_fails_for_invalid_payload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{invalid json").expect("write invalid payload");
        let err = load_json::<Report<u32>>(&path).expect_err("invalid JSON should fail");
        assert!(matches!(err, IoError::Json(_)));
    }
}
