/*!
 * Tests for metric computation and corpus aggregation
 */

use indicmt::evaluation::corpus::CorpusAccumulator;
use indicmt::evaluation::metrics::{BleuStats, StandardMetrics, TerStats, meteor};
use indicmt::providers::MetricProvider;

const ROWS: [(&str, &str); 4] = [
    ("मैं घर जा रहा हूँ", "मैं घर जा रहा हूँ ।"),
    ("the cat is on the mat", "there is a cat on the mat"),
    ("नमस्ते दुनिया", "नमस्ते संसार"),
    ("a quick brown fox jumps", "the quick brown fox jumped over"),
];

fn corpus_bleu(order: &[usize]) -> f64 {
    let mut acc = CorpusAccumulator::new();
    for &i in order {
        let (hyp, reference) = ROWS[i];
        acc.add(hyp, reference, None);
    }
    acc.finish().corpus_bleu.unwrap()
}

#[test]
fn test_corpusBleu_shouldBeOrderIndependent() {
    let forward = corpus_bleu(&[0, 1, 2, 3]);
    for order in [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]] {
        assert!((corpus_bleu(&order) - forward).abs() < 1e-9);
    }
}

#[test]
fn test_corpusBleu_shouldDifferFromMeanOfSentenceScores() {
    let mut total = BleuStats::default();
    let mut sentence_sum = 0.0;
    for (hyp, reference) in ROWS {
        let stats = BleuStats::from_sentence(hyp, reference);
        sentence_sum += stats.sentence_score();
        total += stats;
    }
    let mean = sentence_sum / ROWS.len() as f64;
    assert!((total.corpus_score() - mean).abs() > 1e-6);
    assert!((total.corpus_score() - corpus_bleu(&[0, 1, 2, 3])).abs() < 1e-9);
}

#[test]
fn test_corpusTer_shouldPoolEditsOverReferenceWords() {
    let mut acc = CorpusAccumulator::new();
    let mut ter = TerStats::default();
    for (hyp, reference) in ROWS {
        acc.add(hyp, reference, None);
        ter += TerStats::from_sentence(hyp, reference);
    }
    assert_eq!(acc.finish().corpus_ter, Some(ter.score()));
    assert!(ter.score() > 0.0);
}

#[test]
fn test_standardMetrics_withOddInputs_shouldNeverPanic() {
    let metrics = StandardMetrics::default();
    for (hyp, reference) in [("", "reference"), ("।।।", "।"), ("   ", "a b"), ("x", "x")] {
        let scores = metrics.score(hyp, reference);
        assert!(scores.bleu.is_some_and(|v| (0.0..=100.0 + 1e-9).contains(&v)));
        assert!(scores.ter.is_some_and(|v| v >= 0.0));
        assert!(scores.meteor.is_some_and(|v| (0.0..=1.0).contains(&v)));
    }
}

#[test]
fn test_meteor_withReorderedWords_shouldPenalizeFragmentation() {
    let in_order = meteor("the cat sat on the mat", "the cat sat on the mat");
    let shuffled = meteor("mat the on sat cat the", "the cat sat on the mat");
    assert!(shuffled < in_order);
    assert!(shuffled > 0.0);
}
