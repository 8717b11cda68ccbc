//! Batch evaluation: scores many resumes against one job description.
//!
//! Pipeline:
//! 1. Persist every upload into a fresh request-scoped `ScratchArea`
//! 2. Score resumes one at a time, in upload order, pausing between calls
//! 3. Delete each upload as soon as its scorer call returns
//! 4. Extract candidates from successful results
//! 5. Keep those at or above the threshold, highest score first
//!
//! Scoring is deliberately sequential: the scorer fronts an inference backend
//! with little tolerance for concurrent requests. The pacing delay is the
//! admission-control knob.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::evaluation::{BatchResult, CandidateRecord, ResumeOutcome};
use crate::scoring::extract::extract_candidate;
use crate::scoring::{JobDescription, ResumeScorer};
use crate::scratch::ScratchArea;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub scratch_root: PathBuf,
    /// Pause inserted between consecutive scorer calls.
    pub pacing: Duration,
    pub threshold: i64,
}

pub async fn evaluate_batch(
    scorer: &dyn ResumeScorer,
    files: &[Bytes],
    job_description: &JobDescription,
    options: &BatchOptions,
) -> Result<BatchResult, AppError> {
    if files.is_empty() {
        return Err(AppError::Validation("No PDF files provided".to_string()));
    }

    let scratch = ScratchArea::create(&options.scratch_root)
        .await
        .map_err(|e| AppError::Persistence(format!("could not create scratch area: {e}")))?;

    evaluate_in(scratch, scorer, files, job_description, options).await
}

/// Runs the batch inside `scratch`, which is removed on drop whichever way
/// this function exits.
async fn evaluate_in(
    scratch: ScratchArea,
    scorer: &dyn ResumeScorer,
    files: &[Bytes],
    job_description: &JobDescription,
    options: &BatchOptions,
) -> Result<BatchResult, AppError> {
    debug!(scratch = %scratch.path().display(), files = files.len(), "Persisting uploads");
    let paths = persist_uploads(&scratch, files).await?;
    let outcomes = score_sequentially(scorer, &scratch, &paths, job_description, options.pacing).await;

    let failed = outcomes.iter().filter(|o| o.data().is_none()).count();
    let qualifying = qualifying_candidates(&outcomes, options.threshold);

    info!(
        total = files.len(),
        failed,
        qualifying = qualifying.len(),
        threshold = options.threshold,
        "Batch evaluation finished"
    );

    drop(scratch);

    Ok(BatchResult {
        qualifying,
        total: files.len(),
    })
}

/// Writes uploads as `resume_<index>.pdf`, preserving order.
async fn persist_uploads(scratch: &ScratchArea, files: &[Bytes]) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let path = scratch.file(&format!("resume_{index}.pdf"));
        tokio::fs::write(&path, file)
            .await
            .map_err(|e| AppError::Persistence(format!("{}: {e}", path.display())))?;
        paths.push(path);
    }
    Ok(paths)
}

/// Scores each path in order. Failures become `ResumeOutcome::Failed` and the
/// loop moves on.
async fn score_sequentially(
    scorer: &dyn ResumeScorer,
    scratch: &ScratchArea,
    paths: &[PathBuf],
    job_description: &JobDescription,
    pacing: Duration,
) -> Vec<ResumeOutcome> {
    let mut outcomes = Vec::with_capacity(paths.len());

    for (index, path) in paths.iter().enumerate() {
        let outcome = score_one(scorer, index, path, job_description).await;
        debug!(
            index = outcome.index(),
            success = outcome.data().is_some(),
            "Resume processed"
        );
        outcomes.push(outcome);

        scratch.discard(path).await;

        if index + 1 < paths.len() && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }

    outcomes
}

async fn score_one(
    scorer: &dyn ResumeScorer,
    index: usize,
    path: &Path,
    job_description: &JobDescription,
) -> ResumeOutcome {
    match scorer.score(path, job_description).await {
        Ok(data) => ResumeOutcome::scored(index, data),
        Err(e) => {
            warn!(index, error = %e, "Failed to score resume");
            ResumeOutcome::failed(index, e.to_string())
        }
    }
}

/// Candidates from successful outcomes with `score >= threshold`, sorted by
/// score descending. Ties keep upload order.
pub fn qualifying_candidates(outcomes: &[ResumeOutcome], threshold: i64) -> Vec<CandidateRecord> {
    let threshold = threshold as f64;
    let mut qualifying: Vec<CandidateRecord> = outcomes
        .iter()
        .filter_map(ResumeOutcome::data)
        .map(extract_candidate)
        .filter(|candidate| candidate.score >= threshold)
        .collect();

    qualifying.sort_by(|a, b| b.score.total_cmp(&a.score));
    qualifying
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::mock::{scored, MockScorer};
    use serde_json::json;
    use tempfile::TempDir;

    fn options(root: &Path, threshold: i64) -> BatchOptions {
        BatchOptions {
            scratch_root: root.to_path_buf(),
            pacing: Duration::ZERO,
            threshold,
        }
    }

    fn uploads(payloads: &[String]) -> Vec<Bytes> {
        payloads
            .iter()
            .map(|p| Bytes::copy_from_slice(p.as_bytes()))
            .collect()
    }

    fn fail() -> String {
        "fail".to_string()
    }

    fn dir_is_empty(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_threshold_filters_and_sorts_descending() {
        let root = TempDir::new().unwrap();
        let files = uploads(&[scored("Ann", 85), scored("Bob", 40), scored("Cat", 70)]);

        let result = evaluate_batch(
            &MockScorer::new(),
            &files,
            &JobDescription::new("jd"),
            &options(root.path(), 70),
        )
        .await
        .unwrap();

        assert_eq!(result.total, 3);
        let names: Vec<_> = result.qualifying.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Cat"]);
        assert_eq!(result.qualifying[0].score, 85.0);
        assert_eq!(result.qualifying[1].score, 70.0);
        assert_eq!(result.qualifying[0].email, "ann@example.com");
    }

    #[tokio::test]
    async fn test_failed_resume_does_not_abort_siblings() {
        let root = TempDir::new().unwrap();
        let files = uploads(&[scored("Ann", 90), fail(), scored("Cat", 75)]);
        let scorer = MockScorer::new();

        let result = evaluate_batch(
            &scorer,
            &files,
            &JobDescription::new("jd"),
            &options(root.path(), 0),
        )
        .await
        .unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(scorer.calls().len(), 3);
        let names: Vec<_> = result.qualifying.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Cat"]);
    }

    #[tokio::test]
    async fn test_total_counts_inputs_even_when_nothing_qualifies() {
        let root = TempDir::new().unwrap();
        let files = uploads(&[fail(), scored("Bob", 10)]);

        let result = evaluate_batch(
            &MockScorer::new(),
            &files,
            &JobDescription::new("jd"),
            &options(root.path(), 70),
        )
        .await
        .unwrap();

        assert_eq!(result.total, 2);
        assert!(result.qualifying.is_empty());
    }

    #[tokio::test]
    async fn test_scores_in_upload_order_one_at_a_time() {
        let root = TempDir::new().unwrap();
        let files = uploads(&[scored("A", 1), scored("B", 2), scored("C", 3), scored("D", 4)]);
        let scorer = MockScorer::new();

        evaluate_batch(&scorer, &files, &JobDescription::new("jd"), &options(root.path(), 0))
            .await
            .unwrap();

        let calls = scorer.calls();
        let names: Vec<_> = calls
            .iter()
            .map(|c| c.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["resume_0.pdf", "resume_1.pdf", "resume_2.pdf", "resume_3.pdf"]
        );
        assert_eq!(calls[2].content, scored("C", 3));
        assert_eq!(scorer.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_each_upload_deleted_before_next_is_scored() {
        let root = TempDir::new().unwrap();
        let files = uploads(&[scored("A", 1), scored("B", 2), scored("C", 3)]);
        let scorer = MockScorer::new();

        evaluate_batch(&scorer, &files, &JobDescription::new("jd"), &options(root.path(), 0))
            .await
            .unwrap();

        let calls = scorer.calls();
        // Call i sees only uploads i.. still on disk.
        for (i, call) in calls.iter().enumerate() {
            assert_eq!(call.siblings.len(), files.len() - i, "call {i}");
            assert!(call.siblings.contains(&call.path));
        }
    }

    #[tokio::test]
    async fn test_scratch_area_removed_after_success() {
        let root = TempDir::new().unwrap();
        let files = uploads(&[scored("A", 80), fail()]);

        evaluate_batch(
            &MockScorer::new(),
            &files,
            &JobDescription::new("jd"),
            &options(root.path(), 0),
        )
        .await
        .unwrap();

        assert!(dir_is_empty(root.path()));
    }

    #[tokio::test]
    async fn test_scratch_root_failure_is_persistence_error_and_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("scratch");
        std::fs::write(&blocker, b"file, not dir").unwrap();

        let err = evaluate_batch(
            &MockScorer::new(),
            &uploads(&[scored("A", 80)]),
            &JobDescription::new("jd"),
            &options(&blocker, 0),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)), "got: {err:?}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_is_validation_error() {
        let root = TempDir::new().unwrap();
        let err = evaluate_batch(
            &MockScorer::new(),
            &[],
            &JobDescription::new("jd"),
            &options(root.path(), 70),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(dir_is_empty(root.path()));
    }

    #[tokio::test]
    async fn test_pacing_inserted_between_calls_only() {
        let root = TempDir::new().unwrap();
        let files = uploads(&[scored("A", 1), scored("B", 2), scored("C", 3)]);
        let scorer = MockScorer::new();
        let pacing = Duration::from_millis(40);
        let opts = BatchOptions {
            pacing,
            ..options(root.path(), 0)
        };

        let started = std::time::Instant::now();
        evaluate_batch(&scorer, &files, &JobDescription::new("jd"), &opts)
            .await
            .unwrap();
        let elapsed = started.elapsed();

        let calls = scorer.calls();
        for pair in calls.windows(2) {
            assert!(pair[1].started.duration_since(pair[0].started) >= pacing);
        }
        assert!(elapsed >= pacing * 2, "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_results() {
        let root = TempDir::new().unwrap();
        let files = uploads(&[scored("A", 72), scored("B", 95), scored("C", 72), scored("D", 30)]);
        let scorer = MockScorer::new();
        let jd = JobDescription::new("jd");

        let first = evaluate_batch(&scorer, &files, &jd, &options(root.path(), 70))
            .await
            .unwrap();
        let second = evaluate_batch(&scorer, &files, &jd, &options(root.path(), 70))
            .await
            .unwrap();

        assert_eq!(first.qualifying, second.qualifying);
        let names: Vec<_> = first.qualifying.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_qualifying_candidates_ignores_failures_and_keeps_ties_stable() {
        let outcomes = vec![
            ResumeOutcome::scored(0, json!({"overallMatch": 80, "name": "first"})),
            ResumeOutcome::failed(1, "boom"),
            ResumeOutcome::scored(2, json!({"overallMatch": "80", "name": "second"})),
            ResumeOutcome::scored(3, json!({"overallMatch": 99, "name": "top"})),
            ResumeOutcome::scored(4, json!({"summary": "no score"})),
        ];

        let qualifying = qualifying_candidates(&outcomes, 50);
        let names: Vec<_> = qualifying.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["top", "first", "second"]);
        assert!(qualifying.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_zero_threshold_admits_unscored_results() {
        let outcomes = vec![ResumeOutcome::scored(0, json!({}))];
        let qualifying = qualifying_candidates(&outcomes, 0);
        assert_eq!(qualifying.len(), 1);
        assert_eq!(qualifying[0].score, 0.0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_timeout_becomes_per_resume_failure() {
        use crate::script_runner::tests::sh_script;
        use crate::scoring::ScriptScorer;

        let root = TempDir::new().unwrap();
        let scripts = TempDir::new().unwrap();
        let config = sh_script(
            scripts.path(),
            "score.sh",
            r#"content=$(cat "$1")
if [ "$content" = "hang" ]; then sleep 30; fi
printf '{"overallMatch": %s, "name": "n%s"}' "$content" "$content"
"#,
            Duration::from_secs(2),
        );
        let scorer = ScriptScorer::new(config);
        let files = uploads(&["88".to_string(), "hang".to_string(), "91".to_string()]);

        let result = evaluate_batch(&scorer, &files, &JobDescription::new("jd"), &options(root.path(), 50))
            .await
            .unwrap();

        assert_eq!(result.total, 3);
        let names: Vec<_> = result.qualifying.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["n91", "n88"]);
        assert!(dir_is_empty(root.path()));
    }

    #[tokio::test]
    async fn test_scratch_area_removed_when_persisting_fails() {
        let root = TempDir::new().unwrap();
        let scratch = ScratchArea::create(root.path()).await.unwrap();
        // A directory where the second upload should go makes its write fail.
        std::fs::create_dir(scratch.file("resume_1.pdf")).unwrap();
        let scorer = MockScorer::new();
        let files = uploads(&[scored("Ann", 90), scored("Bob", 80)]);

        let err = evaluate_in(
            scratch,
            &scorer,
            &files,
            &JobDescription::new("jd"),
            &options(root.path(), 0),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)), "got: {err:?}");
        assert!(scorer.calls().is_empty());
        assert!(dir_is_empty(root.path()));
    }
}
