// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::layout::{final_output_path, partition_output_path};
use crate::record::{parse_record, write_record};
use map_reduce_core::log_sink::LogSink;
use map_reduce_core::{MapReduceError, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Final word totals, sorted by count descending then word ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalResult {
    counts: Vec<(String, u64)>,
}

impl GlobalResult {
    pub fn from_counts(counts: HashMap<String, u64>) -> Self {
        let mut counts: Vec<(String, u64)> = counts.into_iter().collect();
        counts.sort_by(compare_counts);
        Self { counts }
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|(w, _)| w == word)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(w, c)| (w.as_str(), *c))
    }
}

pub fn compare_counts(a: &(String, u64), b: &(String, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Combine every `reduce.part-<p>.txt` into `output.txt`.
/// Partition files that cannot be read are reported and skipped.
pub fn merge_partitions(
    output_dir: &Path,
    num_partitions: usize,
    log: &dyn LogSink,
) -> Result<GlobalResult> {
    let mut totals: HashMap<String, u64> = HashMap::new();

    for partition in 0..num_partitions {
        let path = partition_output_path(output_dir, partition);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                log.warning(&format!(
                    "Failed to open reduce output file: {}: {}",
                    path.display(),
                    e
                ));
                continue;
            }
        };

        for (word, count) in contents.lines().filter_map(parse_record) {
            *totals.entry(word.to_string()).or_insert(0) += count;
        }
    }

    let result = GlobalResult::from_counts(totals);

    let path = final_output_path(output_dir);
    let io_error = |e| MapReduceError::io(&path, e);
    let mut writer = BufWriter::new(File::create(&path).map_err(io_error)?);
    for (word, count) in result.iter() {
        write_record(&mut writer, word, count).map_err(io_error)?;
    }
    writer.flush().map_err(io_error)?;

    log.info(&format!(
        "Merged {} words ({} occurrences) into {}",
        result.len(),
        result.total(),
        path.display()
    ));
    Ok(result)
}
