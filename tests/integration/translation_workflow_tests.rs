/*!
 * End-to-end tests: interactive translations feed the batch evaluation
 */

use std::sync::Arc;

use indicmt::app_config::Config;
use indicmt::app_controller::{Controller, format_outcome, format_report};
use indicmt::errors::{PersistenceError, TranslationError};
use indicmt::history::HistoryStore;
use indicmt::language_utils::Language;
use indicmt::providers::mock::{CountingTransliterator, MockComparison, MockTranslator};
use indicmt::translation::{Comparison, TranslationRequest};

use crate::common::{create_temp_dir, init_logging, test_service};

fn controller(dir: &std::path::Path, comparison: MockComparison) -> (Controller, MockTranslator) {
    let mut config = Config::default();
    config.storage.data_dir = dir.join("data");
    config.storage.out_dir = dir.join("out");

    let translator = MockTranslator::working()
        .with_response("नमस्ते दुनिया", "hello world")
        .with_response("मी घरी जातो", "I am going home");
    let service = test_service(&translator, &CountingTransliterator::new())
        .with_history(HistoryStore::new(config.storage.history_path()))
        .with_comparison(Arc::new(comparison));
    (Controller::with_service(config, service), translator)
}

#[tokio::test]
async fn test_translateThenEvaluate_shouldScoreLoggedHistory() {
    init_logging();
    let dir = create_temp_dir().unwrap();
    let (controller, _) = controller(dir.path(), MockComparison::working().with_response("नमस्ते दुनिया", "hello world"));

    let requests = [
        TranslationRequest::new(Language::Hindi, Language::English, "नमस्ते दुनिया").with_reference("hello world"),
        TranslationRequest::new(Language::Marathi, Language::English, "मी घरी जातो"),
        TranslationRequest::new(Language::English, Language::Hindi, "namastey").with_reference("नमस्ते"),
    ];
    for request in &requests {
        controller.translate(request, false, true).await.unwrap();
    }
    // Not logged: same language, and an explicit opt-out.
    let same = TranslationRequest::new(Language::Hindi, Language::Hindi, "नमस्ते");
    controller.translate(&same, false, true).await.unwrap();
    controller.translate(&requests[0], false, false).await.unwrap();

    let history = HistoryStore::new(controller.config().storage.history_path()).load().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].our_translation, "नमस्ते");

    let report = controller.evaluate(None, None, false).await.unwrap();
    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.summary.ours.rows_scored, 2);
    assert_eq!(report.summary.google.rows_scored, 2);
    assert!(report.summary.ours.corpus_bleu.is_some());
    assert_eq!(report.summary.ours.corpus_ter, Some(0.0));
    assert!(format_report(&report).starts_with("Evaluated 3 rows"));

    let summary = controller.report(None).unwrap();
    assert_eq!(summary.ours.rows_scored, 2);
}

#[tokio::test]
async fn test_translate_withFailingComparison_shouldKeepPrimaryResult() {
    let dir = create_temp_dir().unwrap();
    let (controller, _) = controller(dir.path(), MockComparison::failing());

    let request = TranslationRequest::new(Language::Hindi, Language::English, "नमस्ते दुनिया");
    let outcome = controller.translate(&request, true, false).await.unwrap();

    assert_eq!(outcome.result.translated_text, "hello world");
    assert!(matches!(outcome.comparison, Some(Comparison::Unavailable(_))));
    let rendered = format_outcome(&outcome);
    assert!(rendered.starts_with("hello world\nModel: hi-en"));
    assert!(rendered.contains("Google: unavailable"));
}

#[tokio::test]
async fn test_translate_withWorkingComparison_shouldShowBothOutputs() {
    let dir = create_temp_dir().unwrap();
    let (controller, translator) = controller(dir.path(), MockComparison::working());

    let request = TranslationRequest::new(Language::Marathi, Language::Hindi, "मी घरी जातो");
    let outcome = controller.translate(&request, true, false).await.unwrap();

    assert_eq!(translator.call_count(), 2);
    assert_eq!(outcome.comparison, Some(Comparison::Available("google(मी घरी जातो)".to_string())));
    assert!(format_outcome(&outcome).contains("Model: mr-en + en-hi"));
}

#[tokio::test]
async fn test_controller_withoutHistory_shouldReportPersistenceErrors() {
    let dir = create_temp_dir().unwrap();
    let (controller, _) = controller(dir.path(), MockComparison::working());

    let err = controller.evaluate(None, None, false).await.unwrap_err();
    assert!(matches!(err, PersistenceError::NoHistory(_)));
    assert!(matches!(controller.report(None), Err(PersistenceError::NoEvaluation(_))));
}

#[tokio::test]
async fn test_controller_withEmptyText_shouldSurfaceValidationError() {
    let dir = create_temp_dir().unwrap();
    let (controller, translator) = controller(dir.path(), MockComparison::working());

    let request = TranslationRequest::new(Language::English, Language::Hindi, "  ");
    let err = controller.translate(&request, true, true).await.unwrap_err();

    assert!(matches!(err, TranslationError::EmptyInput));
    assert_eq!(err.to_string(), "Please enter text to translate");
    assert_eq!(translator.call_count(), 0);
}

#[test]
fn test_resolve_shouldDescribePivot() {
    let dir = create_temp_dir().unwrap();
    let (controller, _) = controller(dir.path(), MockComparison::working());

    let pipeline = controller.resolve(Language::Marathi, Language::Hindi).unwrap();
    assert!(pipeline.is_pivot());
    assert_eq!(pipeline.model_names(), vec!["mr-en", "en-hi"]);
}
