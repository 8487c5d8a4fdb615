// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::layout::{intermediate_path, partition_output_path};
use crate::record::{parse_record, write_record};
use crate::text::{clean_word, is_valid_word};
use map_reduce_core::log_sink::LogSink;
use map_reduce_core::{MapReduceError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Word totals of one partition, ordered by word
pub type PartitionResult = BTreeMap<String, u64>;

/// Sum every worker's emissions for `partition`.
/// Missing intermediate files contribute nothing; malformed lines and words
/// that do not clean to letters only are skipped.
pub fn aggregate_partition(
    worker_id: usize,
    partition: usize,
    num_workers: usize,
    output_dir: &Path,
    log: &dyn LogSink,
) -> PartitionResult {
    let mut counts = PartitionResult::new();

    for map_worker in 0..num_workers {
        let path = intermediate_path(output_dir, map_worker, partition);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                log.warning(&format!(
                    "Worker {} failed to open intermediate file: {}: {}",
                    worker_id,
                    path.display(),
                    e
                ));
                continue;
            }
        };

        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log.warning(&format!(
                        "Worker {} stopped reading {}: {}",
                        worker_id,
                        path.display(),
                        e
                    ));
                    break;
                }
            };
            let Some((word, count)) = parse_record(&line) else {
                continue;
            };
            let word = clean_word(word);
            if is_valid_word(&word) {
                *counts.entry(word).or_insert(0) += count;
            }
        }
    }

    counts
}

pub fn write_partition(path: &Path, counts: &PartitionResult) -> Result<()> {
    let io_error = |e| MapReduceError::io(path, e);
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    for (word, count) in counts {
        write_record(&mut writer, word, *count).map_err(io_error)?;
    }
    writer.flush().map_err(io_error)
}

/// Aggregate one partition and write its `reduce.part-<partition>.txt`
pub fn reduce_partition(
    worker_id: usize,
    partition: usize,
    num_workers: usize,
    output_dir: &Path,
    log: &dyn LogSink,
) -> Result<PartitionResult> {
    let counts = aggregate_partition(worker_id, partition, num_workers, output_dir, log);
    write_partition(&partition_output_path(output_dir, partition), &counts)?;
    Ok(counts)
}

/// Reduce every partition a worker owns, in order
pub fn reduce_partitions(
    worker_id: usize,
    partitions: &[usize],
    num_workers: usize,
    output_dir: &Path,
    log: &dyn LogSink,
) {
    for &partition in partitions {
        log.info(&format!(
            "Worker {} starts reduce task ID: {}",
            worker_id, partition
        ));
        let start = Instant::now();

        match reduce_partition(worker_id, partition, num_workers, output_dir, log) {
            Ok(counts) => log.info(&format!(
                "Worker {} completed reduce task ID: {} ({} words) in {:.6} seconds",
                worker_id,
                partition,
                counts.len(),
                start.elapsed().as_secs_f64()
            )),
            Err(e) => log.error(&format!(
                "Worker {} failed to write output of reduce task ID {}: {}",
                worker_id, partition, e
            )),
        }
    }
}
