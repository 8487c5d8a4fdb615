// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::chunker::ChunkAssignment;
use crate::layout::intermediate_path;
use crate::record::write_record;
use crate::text::{normalize_token, partition_for, tokens};
use map_reduce_core::log_sink::LogSink;
use map_reduce_core::{MapReduceError, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Counters for one worker's map assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStats {
    pub chunks: usize,
    pub failed_chunks: usize,
    pub emitted: u64,
}

/// Append-mode handles to one worker's intermediate files, opened lazily
struct IntermediateWriters<'a> {
    worker_id: usize,
    output_dir: &'a Path,
    writers: HashMap<usize, (PathBuf, BufWriter<File>)>,
}

impl<'a> IntermediateWriters<'a> {
    fn new(worker_id: usize, output_dir: &'a Path) -> Self {
        Self {
            worker_id,
            output_dir,
            writers: HashMap::new(),
        }
    }

    fn emit(&mut self, word: &str, partition: usize) -> Result<()> {
        let (path, writer) = match self.writers.entry(partition) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = intermediate_path(self.output_dir, self.worker_id, partition);
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|e| MapReduceError::io(&path, e))?;
                entry.insert((path, BufWriter::new(file)))
            }
        };
        write_record(writer, word, 1).map_err(|e| MapReduceError::io(path.as_path(), e))
    }

    fn flush(self) -> Result<()> {
        for (_, (path, mut writer)) in self.writers {
            writer.flush().map_err(|e| MapReduceError::io(path, e))?;
        }
        Ok(())
    }
}

/// Read exactly the chunk's bytes
pub fn read_chunk(chunk: &ChunkAssignment) -> Result<Vec<u8>> {
    let io_error = |e| MapReduceError::io(&chunk.path, e);
    let mut file = File::open(&chunk.path).map_err(io_error)?;
    file.seek(SeekFrom::Start(chunk.offset)).map_err(io_error)?;

    let mut buffer = vec![0u8; chunk.length as usize];
    file.read_exact(&mut buffer).map_err(io_error)?;
    Ok(buffer)
}

/// Map one chunk, appending a `word,1` line per valid word to the
/// intermediate file of the word's partition. Returns the number of emissions.
pub fn map_chunk(
    worker_id: usize,
    chunk: &ChunkAssignment,
    output_dir: &Path,
    num_partitions: usize,
) -> Result<u64> {
    let buffer = read_chunk(chunk)?;
    let mut writers = IntermediateWriters::new(worker_id, output_dir);
    let mut emitted = 0;

    for token in tokens(&buffer) {
        let Some(word) = normalize_token(token) else {
            continue;
        };
        writers.emit(&word, partition_for(&word, num_partitions))?;
        emitted += 1;
    }

    writers.flush()?;
    Ok(emitted)
}

/// Map every chunk of a worker in order. A chunk that fails is logged and
/// skipped; the remaining chunks still run.
pub fn map_chunks(
    worker_id: usize,
    chunks: &[ChunkAssignment],
    output_dir: &Path,
    num_partitions: usize,
    log: &dyn LogSink,
) -> MapStats {
    let mut stats = MapStats::default();

    for chunk in chunks {
        stats.chunks += 1;
        match map_chunk(worker_id, chunk, output_dir, num_partitions) {
            Ok(emitted) => stats.emitted += emitted,
            Err(e) => {
                stats.failed_chunks += 1;
                log.error(&format!(
                    "Worker {} could not map chunk of {} at offset {}: {}",
                    worker_id,
                    chunk.path.display(),
                    chunk.offset,
                    e
                ));
            }
        }
    }

    log.info(&format!(
        "Worker {} mapped {} chunks ({} failed), emitted {} words",
        worker_id, stats.chunks, stats.failed_chunks, stats.emitted
    ));
    stats
}
