//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup by the binaries and then passed into the
//! core. Library code never reads environment variables, so request handling and tests see one
//! consistent view.

use crate::constants::DEFAULT_HISTORY_FILE;
use crate::{CoreResult, TriageError};
use std::path::{Path, PathBuf};
use triage_kb::KnowledgeBase;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    history_file: PathBuf,
    kb_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::InvalidInput`] if `history_file` is empty or names an existing
    /// directory, or if `kb_dir` is given but is not a directory.
    pub fn new(history_file: PathBuf, kb_dir: Option<PathBuf>) -> CoreResult<Self> {
        if history_file.as_os_str().is_empty() {
            return Err(TriageError::InvalidInput(
                "history file path cannot be empty".into(),
            ));
        }
        if history_file.is_dir() {
            return Err(TriageError::InvalidInput(format!(
                "history file path {} is a directory",
                history_file.display()
            )));
        }
        if let Some(dir) = &kb_dir {
            if !dir.is_dir() {
                return Err(TriageError::InvalidInput(format!(
                    "TRIAGE_KB_DIR override {} is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(Self {
            history_file,
            kb_dir,
        })
    }

    pub fn history_file(&self) -> &Path {
        &self.history_file
    }

    pub fn kb_dir(&self) -> Option<&Path> {
        self.kb_dir.as_deref()
    }

    /// Load the knowledge base this configuration points at: the override directory when set,
    /// the built-in data otherwise.
    pub fn load_knowledge_base(&self) -> CoreResult<KnowledgeBase> {
        let kb = match &self.kb_dir {
            Some(dir) => KnowledgeBase::from_dir(dir)?,
            None => KnowledgeBase::builtin()?,
        };
        Ok(kb)
    }
}

/// Resolve the history file from an optional raw value.
///
/// Empty or whitespace values fall back to [`DEFAULT_HISTORY_FILE`].
pub fn history_file_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE))
}

/// Resolve the optional knowledge-base override directory from a raw value.
pub fn kb_dir_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_history_file_from_env_value_defaults() {
        assert_eq!(
            history_file_from_env_value(None),
            PathBuf::from(DEFAULT_HISTORY_FILE)
        );
        assert_eq!(
            history_file_from_env_value(Some("   ".into())),
            PathBuf::from(DEFAULT_HISTORY_FILE)
        );
        assert_eq!(
            history_file_from_env_value(Some(" /tmp/h.jsonl ".into())),
            PathBuf::from("/tmp/h.jsonl")
        );
    }

    #[test]
    fn test_kb_dir_from_env_value_ignores_blank() {
        assert_eq!(kb_dir_from_env_value(Some("".into())), None);
        assert_eq!(
            kb_dir_from_env_value(Some("kb".into())),
            Some(PathBuf::from("kb"))
        );
    }

    #[test]
    fn test_core_config_rejects_directory_as_history_file() {
        let temp = TempDir::new().expect("temp dir");
        let err = CoreConfig::new(temp.path().to_path_buf(), None).expect_err("dir as file");
        assert!(matches!(err, TriageError::InvalidInput(msg) if msg.contains("is a directory")));
    }

    #[test]
    fn test_core_config_rejects_missing_kb_dir() {
        let temp = TempDir::new().expect("temp dir");
        let err = CoreConfig::new(
            temp.path().join("history.jsonl"),
            Some(temp.path().join("missing")),
        )
        .expect_err("missing kb dir");
        assert!(matches!(err, TriageError::InvalidInput(msg) if msg.contains("TRIAGE_KB_DIR")));
    }

    #[test]
    fn test_core_config_loads_builtin_knowledge_base() {
        let temp = TempDir::new().expect("temp dir");
        let cfg = CoreConfig::new(temp.path().join("history.jsonl"), None).expect("config");
        let kb = cfg.load_knowledge_base().expect("builtin kb");
        assert_eq!(kb.regions().count(), 3);
    }
}
