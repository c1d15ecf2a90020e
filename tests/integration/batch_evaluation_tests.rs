/*!
 * Integration tests for batch evaluation of the history file
 */

use std::fs;
use std::sync::Arc;

use indicmt::errors::PersistenceError;
use indicmt::evaluation::batch::{BatchEvaluator, summarize_file};
use indicmt::evaluation::corpus::CorpusAccumulator;
use indicmt::evaluation::metrics::{StandardMetrics, meteor};
use indicmt::history::{EVALUATION_COLUMNS, HISTORY_COLUMNS, read_evaluation};
use indicmt::providers::mock::{CountingTransliterator, MockComparison, MockTranslator};

use crate::common::{create_history_file, create_temp_dir, create_test_file, init_logging, test_service};

const THREE_ROWS: [[&str; 5]; 3] = [
    ["English", "Hindi", "I am going home", "मैं घर जा रहा हूँ", "मैं घर जा रहा हूं"],
    ["Hindi", "English", "नमस्ते दुनिया", "", "hello world"],
    ["English", "Marathi", "thank you very much", "खूप खूप धन्यवाद", "खूप धन्यवाद"],
];

fn evaluator() -> BatchEvaluator {
    BatchEvaluator::new(Arc::new(StandardMetrics::default())).with_progress(false)
}

#[tokio::test]
async fn test_evaluate_withOneEmptyReference_shouldScoreOnlyReferencedRows() {
    init_logging();
    let dir = create_temp_dir().unwrap();
    let history = create_history_file(dir.path(), &THREE_ROWS).unwrap();
    let output = dir.path().join("out").join("eval_results.csv");

    let report = evaluator().evaluate(&history, &output).await.unwrap();

    assert_eq!(report.rows.len(), 3);
    assert!(report.failures.is_empty());
    assert!(report.rows[1].bleu.is_none());
    assert!(report.rows[1].ter.is_none());
    assert!(report.rows[1].meteor.is_none());

    let mut expected = CorpusAccumulator::new();
    for row in [&THREE_ROWS[0], &THREE_ROWS[2]] {
        expected.add(row[4], row[3], Some(meteor(row[4], row[3])));
    }
    let expected = expected.finish();

    assert_eq!(report.summary.ours.rows_scored, 2);
    assert_eq!(report.summary.ours.corpus_bleu, expected.corpus_bleu);
    assert_eq!(report.summary.ours.corpus_ter, expected.corpus_ter);
    assert_eq!(report.summary.ours.avg_meteor, expected.avg_meteor);
    assert!(!report.summary.google.has_data());

    let written = read_evaluation(&output).unwrap();
    assert_eq!(written.len(), 3);
    assert_eq!(written[1].ref_text, "");
    assert!(written[1].bleu.is_none());
}

#[tokio::test]
async fn test_evaluate_withMeteorDisabled_shouldLeaveAverageAbsent() {
    let dir = create_temp_dir().unwrap();
    let history = create_history_file(dir.path(), &THREE_ROWS).unwrap();
    let output = dir.path().join("eval_results.csv");

    let report = BatchEvaluator::new(Arc::new(StandardMetrics::new(false)))
        .with_progress(false)
        .evaluate(&history, &output)
        .await
        .unwrap();

    assert!(report.rows.iter().all(|row| row.meteor.is_none()));
    assert!(report.summary.ours.corpus_bleu.is_some());
    assert!(report.summary.ours.avg_meteor.is_none());
}

#[tokio::test]
async fn test_evaluate_withMissingHistory_shouldReportNoHistoryAndWriteNothing() {
    let dir = create_temp_dir().unwrap();
    let output = dir.path().join("eval_results.csv");

    let err = evaluator()
        .evaluate(&dir.path().join("historical.csv"), &output)
        .await
        .unwrap_err();

    assert!(matches!(err, PersistenceError::NoHistory(_)));
    assert!(err.to_string().contains("No history available"));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_evaluate_withEmptyHistory_shouldWriteHeaderOnly() {
    let dir = create_temp_dir().unwrap();
    let header_only = format!("{}\n", HISTORY_COLUMNS.join(","));
    for content in ["", header_only.as_str()] {
        let history = create_test_file(dir.path(), "historical.csv", content).unwrap();
        let output = dir.path().join("eval_results.csv");

        let report = evaluator().evaluate(&history, &output).await.unwrap();

        assert!(report.rows.is_empty());
        assert!(!report.summary.has_data());
        assert!(report.summary.to_string().contains("No references"));
        assert_eq!(fs::read_to_string(&output).unwrap().trim(), EVALUATION_COLUMNS.join(","));
    }
}

#[tokio::test]
async fn test_evaluate_withIntermittentComparison_shouldIsolateFailingRows() {
    let dir = create_temp_dir().unwrap();
    let history = create_history_file(dir.path(), &THREE_ROWS).unwrap();
    let output = dir.path().join("eval_results.csv");
    let comparison = MockComparison::intermittent(3).with_response("I am going home", "मैं घर जा रहा हूँ");

    let report = evaluator()
        .with_comparison(Arc::new(comparison.clone()))
        .evaluate(&history, &output)
        .await
        .unwrap();

    assert_eq!(comparison.request_count(), 3);
    assert_eq!(report.rows.len(), 3);

    // Row 1: comparison answered and a reference exists.
    assert_eq!(report.rows[0].google_translation, "मैं घर जा रहा हूँ");
    assert!(report.rows[0].google_bleu.is_some());
    // Row 2: comparison answered but there is no reference.
    assert_eq!(report.rows[1].google_translation, "google(नमस्ते दुनिया)");
    assert!(!report.rows[1].has_google_metrics());
    // Row 3: comparison failed; our metrics survive.
    assert_eq!(report.rows[2].google_translation, "");
    assert!(!report.rows[2].has_google_metrics());
    assert!(report.rows[2].bleu.is_some());

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 3);
    assert_eq!(report.summary.ours.rows_scored, 2);
    assert_eq!(report.summary.google.rows_scored, 1);
}

#[tokio::test]
async fn test_evaluate_withoutTranslationColumn_shouldScoreOnlyComparison() {
    let dir = create_temp_dir().unwrap();
    let history = create_test_file(
        dir.path(),
        "dataset.csv",
        "source_lang,target_lang,src_text,ref_text\nEnglish,Hindi,Hello world,नमस्ते दुनिया\n",
    )
    .unwrap();
    let output = dir.path().join("eval_results.csv");
    let comparison = MockComparison::working().with_response("Hello world", "नमस्ते दुनिया");

    let report = evaluator()
        .with_comparison(Arc::new(comparison))
        .evaluate(&history, &output)
        .await
        .unwrap();

    let row = &report.rows[0];
    assert_eq!(row.our_translation, "");
    assert_eq!((row.bleu, row.ter, row.meteor), (None, None, None));
    assert!(row.has_google_metrics());
    assert_eq!(report.summary.ours.rows_scored, 0);
    assert!(report.summary.ours.corpus_bleu.is_none());
    assert_eq!(report.summary.google.rows_scored, 1);

    let summary = summarize_file(&output).unwrap();
    assert_eq!(summary.ours.rows_scored, 0);
    assert_eq!(summary.google.rows_scored, 1);
}

#[tokio::test]
async fn test_evaluate_withFailedRetranslation_shouldNotScoreEmptyOutput() {
    let dir = create_temp_dir().unwrap();
    let history = create_history_file(dir.path(), &[["Hindi", "English", "धन्यवाद", "thank you", ""]]).unwrap();
    let output = dir.path().join("eval_results.csv");
    let translator = MockTranslator::failing();
    let transliterator = CountingTransliterator::new();
    let service = test_service(&translator, &transliterator);

    let report = evaluator()
        .with_retranslation(&service)
        .evaluate(&history, &output)
        .await
        .unwrap();

    assert!(!report.rows[0].has_our_metrics());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].reason.starts_with("retranslation"));
    assert_eq!(report.summary.ours.rows_scored, 0);
}

#[tokio::test]
async fn test_evaluate_withMalformedRow_shouldSkipItAndContinue() {
    let dir = create_temp_dir().unwrap();
    let content = format!(
        "{}\nEnglish,Hindi,hello,नमस्ते,नमस्ते\nEnglish,Hindi\nHindi,English,धन्यवाद,thank you,thanks\n",
        HISTORY_COLUMNS.join(",")
    );
    let history = create_test_file(dir.path(), "historical.csv", &content).unwrap();
    let output = dir.path().join("eval_results.csv");

    let report = evaluator().evaluate(&history, &output).await.unwrap();

    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 2);
    assert_eq!(report.summary.ours.rows_scored, 2);
}

#[tokio::test]
async fn test_evaluate_shouldOverwritePreviousResults() {
    let dir = create_temp_dir().unwrap();
    let history = create_history_file(dir.path(), &THREE_ROWS[..1]).unwrap();
    let output = create_test_file(dir.path(), "eval_results.csv", "old,content\n1,2\n3,4\n5,6\n").unwrap();

    evaluator().evaluate(&history, &output).await.unwrap();

    let written = read_evaluation(&output).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].src_text, "I am going home");
}

#[tokio::test]
async fn test_evaluate_withRetranslation_shouldReplaceLoggedOutput() {
    let dir = create_temp_dir().unwrap();
    let history = create_history_file(
        dir.path(),
        &[
            ["English", "Hindi", "Namastey", "नमस्ते", "stale output"],
            ["Hindi", "English", "धन्यवाद", "thank you", "stale output"],
        ],
    )
    .unwrap();
    let output = dir.path().join("eval_results.csv");
    let translator = MockTranslator::working().with_response("धन्यवाद", "thank you");
    let transliterator = CountingTransliterator::new();
    let service = test_service(&translator, &transliterator);

    let report = evaluator()
        .with_retranslation(&service)
        .evaluate(&history, &output)
        .await
        .unwrap();

    assert_eq!(report.rows[0].our_translation, "नमस्ते");
    assert_eq!(report.rows[1].our_translation, "thank you");
    assert_eq!(report.rows[1].ter, Some(0.0));
    assert_eq!(transliterator.call_count(), 1);
    assert_eq!(translator.call_count(), 1);
    // The replay must not append to the file it reads.
    assert_eq!(fs::read_to_string(&history).unwrap().lines().count(), 3);
}

#[tokio::test]
async fn test_summarizeFile_shouldMatchBatchSummary() {
    let dir = create_temp_dir().unwrap();
    let history = create_history_file(dir.path(), &THREE_ROWS).unwrap();
    let output = dir.path().join("eval_results.csv");

    let report = evaluator()
        .with_comparison(Arc::new(MockComparison::working()))
        .evaluate(&history, &output)
        .await
        .unwrap();
    let summary = summarize_file(&output).unwrap();

    assert_eq!(summary.ours.rows_scored, report.summary.ours.rows_scored);
    assert_eq!(summary.google.rows_scored, report.summary.google.rows_scored);
    // Scores are re-derived from the text columns, not from the rounded cells.
    assert_eq!(summary.ours.corpus_bleu, report.summary.ours.corpus_bleu);
    let (a, b) = (summary.ours.avg_meteor.unwrap(), report.summary.ours.avg_meteor.unwrap());
    assert!((a - b).abs() < 1e-4);
}

#[test]
fn test_summarizeFile_withMissingFile_shouldReportNoEvaluation() {
    let dir = create_temp_dir().unwrap();
    let err = summarize_file(&dir.path().join("eval_results.csv")).unwrap_err();
    assert!(matches!(err, PersistenceError::NoEvaluation(_)));
}
