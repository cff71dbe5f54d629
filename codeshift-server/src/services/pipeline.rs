//! Batch migration pipeline
//!
//! Strictly sequential: one file at a time, no parallelism, no retries, no
//! cancellation once started. A failed translation is recorded on that
//! file's outcome and the loop continues; the batch itself never aborts.
//!
//! Invariants:
//! - exactly one outcome per input file, in input order
//! - total = migrated + skipped + failed

use crate::services::classifier::should_translate;
use crate::services::translator::{CodeTranslator, FileContext, LanguagePair};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One file submitted for batch migration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub file_name: String,
    pub file_path: String,
    pub content: String,
}

/// Per-file result of a batch migration attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub file_name: String,
    pub file_path: String,
    /// Translated code on success; original content when the file was
    /// classified as non-code and passed through unchanged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_code: Option<String>,
    pub migrated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary counters over a batch's outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStats {
    pub total_files: usize,
    pub migrated_files: usize,
    pub skipped_files: usize,
    pub failed_files: usize,
}

/// Migrate every file in the batch, one at a time.
///
/// Returns one outcome per input file, in input order.
pub async fn migrate_project(
    translator: &dyn CodeTranslator,
    files: &[ProjectFile],
    pair: &LanguagePair,
) -> Vec<FileOutcome> {
    let mut outcomes = Vec::with_capacity(files.len());

    for file in files {
        if !should_translate(&file.file_name) {
            debug!(file = %file.file_name, "Skipping non-code file");
            outcomes.push(FileOutcome {
                file_name: file.file_name.clone(),
                file_path: file.file_path.clone(),
                target_code: Some(file.content.clone()),
                migrated: false,
                reason: Some("File type doesn't require migration".to_string()),
                error: None,
            });
            continue;
        }

        let context = FileContext {
            file_name: Some(file.file_name.clone()),
            file_path: Some(file.file_path.clone()),
        };

        match translator.translate(&file.content, pair, Some(&context)).await {
            Ok(target_code) => {
                outcomes.push(FileOutcome {
                    file_name: file.file_name.clone(),
                    file_path: file.file_path.clone(),
                    target_code: Some(target_code),
                    migrated: true,
                    reason: None,
                    error: None,
                });
            }
            Err(e) => {
                warn!(file = %file.file_name, error = %e, "File migration failed, continuing batch");
                outcomes.push(FileOutcome {
                    file_name: file.file_name.clone(),
                    file_path: file.file_path.clone(),
                    target_code: None,
                    migrated: false,
                    reason: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    outcomes
}

/// Compute summary counters from a batch's outcomes
pub fn migration_stats(outcomes: &[FileOutcome]) -> MigrationStats {
    MigrationStats {
        total_files: outcomes.len(),
        migrated_files: outcomes.iter().filter(|o| o.migrated).count(),
        skipped_files: outcomes
            .iter()
            .filter(|o| !o.migrated && o.error.is_none())
            .count(),
        failed_files: outcomes
            .iter()
            .filter(|o| !o.migrated && o.error.is_some())
            .count(),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_one_outcome_per_file_in_input_order() {
        let translator = MockTranslator::default();
        let files = vec![
            project_file("a.py", "a"),
            project_file("b.py", "b"),
            project_file("c.py", "c"),
        ];

        let outcomes = migrate_project(&translator, &files, &language_pair()).await;

        assert_eq!(outcomes.len(), 3);
        let names: Vec<&str> = outcomes.iter().map(|o| o.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.py", "b.py", "c.py"]);
        assert!(outcomes.iter().all(|o| o.migrated));
    }

    #[tokio::test]
    async fn test_non_code_files_pass_through_unchanged() {
        let translator = MockTranslator::default();
        let files = vec![
            project_file("logo.png", "<binary>"),
            project_file("app.py", "print('hi')"),
        ];

        let outcomes = migrate_project(&translator, &files, &language_pair()).await;

        assert!(!outcomes[0].migrated);
        assert_eq!(outcomes[0].target_code.as_deref(), Some("<binary>"));
        assert_eq!(
            outcomes[0].reason.as_deref(),
            Some("File type doesn't require migration")
        );
        assert!(outcomes[1].migrated);
        // Only the eligible file hit the translator
        assert_eq!(
            translator
                .translate_calls
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_failure_recorded_and_batch_continues() {
        let translator = MockTranslator {
            fail_marker: Some("BOOM".to_string()),
            ..Default::default()
        };
        let files = vec![
            project_file("one.py", "ok"),
            project_file("two.py", "BOOM"),
            project_file("three.py", "ok"),
        ];

        let outcomes = migrate_project(&translator, &files, &language_pair()).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].migrated);
        assert!(!outcomes[1].migrated);
        assert!(outcomes[1]
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("simulated service failure"));
        assert!(outcomes[2].migrated, "Failure must not abort the batch");
    }

    #[tokio::test]
    async fn test_stats_counters_partition_outcomes() {
        let translator = MockTranslator {
            fail_marker: Some("BOOM".to_string()),
            ..Default::default()
        };
        let files = vec![
            project_file("ok.py", "fine"),
            project_file("bad.py", "BOOM"),
            project_file("logo.png", "<binary>"),
        ];

        let outcomes = migrate_project(&translator, &files, &language_pair()).await;
        let stats = migration_stats(&outcomes);

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.migrated_files, 1);
        assert_eq!(stats.skipped_files, 1);
        assert_eq!(stats.failed_files, 1);
        assert_eq!(
            stats.migrated_files + stats.skipped_files + stats.failed_files,
            stats.total_files
        );
    }

    #[tokio::test]
    async fn test_two_file_scenario_summary() {
        let translator = MockTranslator {
            fail_marker: Some("BOOM".to_string()),
            ..Default::default()
        };
        let files = vec![project_file("A", "fine"), project_file("B", "BOOM")];

        let outcomes = migrate_project(&translator, &files, &language_pair()).await;
        let stats = migration_stats(&outcomes);

        assert_eq!(outcomes[0].file_name, "A");
        assert!(outcomes[0].migrated);
        assert_eq!(outcomes[1].file_name, "B");
        assert!(!outcomes[1].migrated);
        assert!(!outcomes[1].error.as_deref().unwrap().is_empty());
        assert_eq!(
            stats,
            MigrationStats {
                total_files: 2,
                migrated_files: 1,
                skipped_files: 0,
                failed_files: 1
            }
        );
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let translator = MockTranslator::default();
        let outcomes = migrate_project(&translator, &[], &language_pair()).await;
        assert!(outcomes.is_empty());
        let stats = migration_stats(&outcomes);
        assert_eq!(stats.total_files, 0);
    }
}
