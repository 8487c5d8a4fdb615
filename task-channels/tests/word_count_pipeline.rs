// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use map_reduce_core::config::Config;
use map_reduce_core::log_sink::{LogLevel, LogSink, RecordingSink};
use map_reduce_core::MapReduceError;
use map_reduce_task_channels::run_word_count;
use map_reduce_word_count::layout::{final_output_path, partition_output_path};
use map_reduce_word_count::record::parse_record;
use map_reduce_word_count::text::{normalize_token, tokens};
use rand::Rng;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn recording_log() -> (Arc<RecordingSink>, Arc<dyn LogSink>) {
    let sink = Arc::new(RecordingSink::new());
    let log: Arc<dyn LogSink> = sink.clone();
    (sink, log)
}

fn read_output(dir: &Path) -> Vec<(String, u64)> {
    fs::read_to_string(final_output_path(dir))
        .unwrap()
        .lines()
        .map(|line| {
            let (word, count) = parse_record(line).unwrap();
            (word.to_string(), count)
        })
        .collect()
}

fn random_corpus(words: usize) -> String {
    const VOCABULARY: [&str; 12] = [
        "alpha", "Beta", "gamma,", "delta.", "EPSILON", "zeta!", "eta", "(theta)", "42", "ok?",
        "--", "iota;",
    ];
    const SEPARATORS: [&str; 4] = [" ", "  ", "\n", "\t"];
    let mut rng = rand::rng();
    let mut text = String::new();
    for _ in 0..words {
        text.push_str(VOCABULARY[rng.random_range(0..VOCABULARY.len())]);
        text.push_str(SEPARATORS[rng.random_range(0..SEPARATORS.len())]);
    }
    text
}

fn direct_count(texts: &[String]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for text in texts {
        for word in tokens(text.as_bytes()).filter_map(normalize_token) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }
    counts
}

#[tokio::test]
async fn test_single_worker_example() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("animals.txt"), "Cat cat dog! DOG, bird").unwrap();
    let (sink, log) = recording_log();

    let config = Config::new(input.path(), output.path(), 1, 2).unwrap();
    let report = run_word_count(config, log).await.unwrap();

    let written = fs::read_to_string(final_output_path(output.path())).unwrap();
    assert_eq!(written, "cat,2\ndog,2\nbird,1\n");
    assert_eq!(report.output.get("cat"), Some(2));
    assert!(report.map.all_completed());
    assert!(report.reduce.all_completed());
    assert!(partition_output_path(output.path(), 0).exists());
    assert!(partition_output_path(output.path(), 1).exists());
    assert!(sink.contains(LogLevel::Info, "Map phase starting"));
    assert!(sink.contains(LogLevel::Info, "Merging Complete"));
}

#[tokio::test]
async fn test_random_corpus_matches_direct_count() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let texts: Vec<String> = (0..5).map(|i| random_corpus(200 + i * 150)).collect();
    for (i, text) in texts.iter().enumerate() {
        fs::write(input.path().join(format!("part-{}.txt", i)), text).unwrap();
    }
    let (_sink, log) = recording_log();

    let config = Config::new(input.path(), output.path(), 4, 3)
        .unwrap()
        .with_chunk_size(64)
        .unwrap();
    let report = run_word_count(config, log).await.unwrap();

    let expected = direct_count(&texts);
    let written = read_output(output.path());
    assert_eq!(written.len(), expected.len());
    for (word, count) in &written {
        assert_eq!(expected.get(word), Some(count), "count of {}", word);
    }
    assert_eq!(report.output.len(), expected.len());
    assert_eq!(report.map.workers, 4);
}

#[tokio::test]
async fn test_output_sorted_by_count_then_word() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join("a.txt"),
        "pear apple fig apple kiwi pear apple plum\nfig; kiwi. lime",
    )
    .unwrap();
    fs::write(input.path().join("b.txt"), "Plum PEAR date").unwrap();
    let (_sink, log) = recording_log();

    let config = Config::new(input.path(), output.path(), 3, 4)
        .unwrap()
        .with_chunk_size(8)
        .unwrap();
    run_word_count(config, log).await.unwrap();

    let written = read_output(output.path());
    for pair in written.windows(2) {
        let (ref w1, c1) = pair[0];
        let (ref w2, c2) = pair[1];
        assert!(c1 > c2 || (c1 == c2 && w1 < w2), "{:?} before {:?}", pair[0], pair[1]);
    }
    assert_eq!(written[0], ("apple".to_string(), 3));
    assert_eq!(written[1], ("pear".to_string(), 3));
}

#[tokio::test]
async fn test_rerun_does_not_double_count() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("a.txt"), "one two two").unwrap();

    for _ in 0..2 {
        let (_sink, log) = recording_log();
        let config = Config::new(input.path(), output.path(), 2, 2).unwrap();
        run_word_count(config, log).await.unwrap();
    }

    let written = fs::read_to_string(final_output_path(output.path())).unwrap();
    assert_eq!(written, "two,2\none,1\n");
}

#[tokio::test]
async fn test_empty_input_produces_empty_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("empty.txt"), "").unwrap();
    let (sink, log) = recording_log();

    let config = Config::new(input.path(), output.path(), 2, 2).unwrap();
    let report = run_word_count(config, log).await.unwrap();

    assert!(report.output.is_empty());
    assert_eq!(fs::read_to_string(final_output_path(output.path())).unwrap(), "");
    assert!(sink.contains(LogLevel::Error, "Skipping empty file"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_link_in_input_is_skipped() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("a.txt"), "cat dog cat").unwrap();
    std::os::unix::fs::symlink(input.path().join("missing.txt"), input.path().join("link.txt"))
        .unwrap();
    let (sink, log) = recording_log();

    let config = Config::new(input.path(), output.path(), 2, 2).unwrap();
    let report = run_word_count(config, log).await.unwrap();

    let written = fs::read_to_string(final_output_path(output.path())).unwrap();
    assert_eq!(written, "cat,2\ndog,1\n");
    assert_eq!(report.output.total(), 3);
    assert!(sink.contains(LogLevel::Error, "link.txt"));
}

#[tokio::test]
async fn test_missing_input_dir_aborts() {
    let root = tempfile::tempdir().unwrap();
    let (_sink, log) = recording_log();

    let config = Config::new(root.path().join("missing"), root.path().join("out"), 2, 2).unwrap();
    let result = run_word_count(config, log).await;

    assert!(matches!(result, Err(MapReduceError::InputDir { .. })));
    assert!(!final_output_path(&root.path().join("out")).exists());
}

#[tokio::test]
async fn test_invalid_config_aborts_before_any_file_is_touched() {
    let root = tempfile::tempdir().unwrap();
    let output = root.path().join("out");
    let (_sink, log) = recording_log();

    let mut config = Config::new(root.path(), &output, 2, 2).unwrap();
    config.num_partitions = 0;
    let result = run_word_count(config, log).await;

    assert!(matches!(result, Err(MapReduceError::InvalidConfig(_))));
    assert!(!output.exists());
}
