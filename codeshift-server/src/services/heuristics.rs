//! Local analysis heuristics
//!
//! Everything here is computed without the LLM: file metadata enhancement,
//! the compatibility score, and the complexity rating derived from the
//! key-change list the analysis call returns.

use serde_json::Value;
use std::time::Instant;

/// File type from the extension, without the dot; "unknown" when absent
pub fn file_type(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => "unknown".to_string(),
    }
}

fn count_severity(key_changes: &[Value], severity: &str) -> usize {
    key_changes
        .iter()
        .filter(|change| change["severity"] == severity)
        .count()
}

/// Compatibility score 0-100 from the key-change list.
///
/// 100 when no changes were needed; each critical change costs 15 points,
/// each warning 5, floored at 0.
pub fn compatibility_score(key_changes: &[Value]) -> i64 {
    if key_changes.is_empty() {
        return 100;
    }

    let critical = count_severity(key_changes, "critical") as i64;
    let warning = count_severity(key_changes, "warning") as i64;

    (100 - critical * 15 - warning * 5).max(0)
}

/// Complexity rating for a migration: "low", "medium", or "high".
///
/// Weighted by source length (>10000 chars +30, >3000 +15, >1000 +5) and by
/// key-change severity (critical +10 each, warning +5 each); >=40 is high,
/// >=15 medium.
pub fn migration_complexity(source_code: &str, key_changes: &[Value]) -> &'static str {
    let mut score = match source_code.len() {
        len if len > 10_000 => 30,
        len if len > 3_000 => 15,
        len if len > 1_000 => 5,
        _ => 0,
    };

    score += count_severity(key_changes, "critical") * 10;
    score += count_severity(key_changes, "warning") * 5;

    match score {
        s if s >= 40 => "high",
        s if s >= 15 => "medium",
        _ => "low",
    }
}

/// Elapsed-time tracker for migration operations
pub struct ProcessingTimer {
    start: Instant,
}

impl ProcessingTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    /// Elapsed milliseconds since start
    pub fn elapsed_ms(&self) -> i64 {
        self.start.elapsed().as_millis() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_type() {
        assert_eq!(file_type("app.py"), "py");
        assert_eq!(file_type("archive.tar.gz"), "gz");
        assert_eq!(file_type("Component.TSX"), "tsx");
        assert_eq!(file_type("Dockerfile"), "unknown");
        assert_eq!(file_type(".gitignore"), "unknown");
    }

    #[test]
    fn test_compatibility_score_perfect_when_no_changes() {
        assert_eq!(compatibility_score(&[]), 100);
    }

    #[test]
    fn test_compatibility_score_deductions() {
        let changes = vec![
            json!({"category": "api", "severity": "critical"}),
            json!({"category": "types", "severity": "warning"}),
            json!({"category": "style", "severity": "info"}),
        ];
        // 100 - 15 - 5; info changes cost nothing
        assert_eq!(compatibility_score(&changes), 80);
    }

    #[test]
    fn test_compatibility_score_floors_at_zero() {
        let changes: Vec<Value> = (0..10)
            .map(|_| json!({"severity": "critical"}))
            .collect();
        assert_eq!(compatibility_score(&changes), 0);
    }

    #[test]
    fn test_complexity_from_length() {
        assert_eq!(migration_complexity(&"x".repeat(500), &[]), "low");
        assert_eq!(migration_complexity(&"x".repeat(4_000), &[]), "medium");
        // Length alone caps out at +30, which is still "medium"
        assert_eq!(migration_complexity(&"x".repeat(20_000), &[]), "medium");
    }

    #[test]
    fn test_complexity_from_severity() {
        let changes = vec![
            json!({"severity": "critical"}),
            json!({"severity": "critical"}),
            json!({"severity": "critical"}),
            json!({"severity": "critical"}),
        ];
        assert_eq!(migration_complexity("short", &changes), "high");

        let mild = vec![json!({"severity": "warning"}), json!({"severity": "warning"})];
        assert_eq!(migration_complexity("short", &mild), "low");
    }

    #[test]
    fn test_processing_timer_monotonic() {
        let timer = ProcessingTimer::start();
        assert!(timer.elapsed_ms() >= 0);
    }
}
