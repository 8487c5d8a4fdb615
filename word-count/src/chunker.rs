// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use map_reduce_core::log_sink::LogSink;
use map_reduce_core::{MapReduceError, Result};
use std::cmp::min;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Bytes read per step while looking for a word boundary past the window
const SCAN_BLOCK: usize = 64;

/// An input file as enumerated at the start of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub total_size: u64,
}

/// A word-aligned byte range of one file, owned by exactly one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkAssignment {
    pub path: PathBuf,
    pub offset: u64,
    pub length: u64,
}

impl ChunkAssignment {
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Per-worker chunk lists plus the byte load each worker ended up with
#[derive(Debug, Clone, Default)]
pub struct WorkDistribution {
    pub assignments: Vec<Vec<ChunkAssignment>>,
    pub loads: Vec<u64>,
}

impl WorkDistribution {
    pub fn new(num_workers: usize) -> Self {
        Self {
            assignments: vec![Vec::new(); num_workers],
            loads: vec![0; num_workers],
        }
    }

    /// Linear scan, O(workers) per chunk. Ties go to the lowest worker id.
    pub fn least_loaded_worker(&self) -> usize {
        let mut best = 0;
        for (worker_id, load) in self.loads.iter().enumerate() {
            if *load < self.loads[best] {
                best = worker_id;
            }
        }
        best
    }

    pub fn assign(&mut self, chunk: ChunkAssignment) -> usize {
        let worker_id = self.least_loaded_worker();
        self.loads[worker_id] += chunk.length;
        self.assignments[worker_id].push(chunk);
        worker_id
    }

    pub fn chunk_count(&self) -> usize {
        self.assignments.iter().map(Vec::len).sum()
    }

    /// Heaviest minus lightest worker load
    pub fn imbalance(&self) -> u64 {
        let max = self.loads.iter().max().copied().unwrap_or(0);
        let min = self.loads.iter().min().copied().unwrap_or(0);
        max - min
    }

    pub fn log_workload(&self, log: &dyn LogSink) {
        let mut report = String::from("\n");
        for (worker_id, chunks) in self.assignments.iter().enumerate() {
            let _ = writeln!(
                report,
                "Worker {} will process {} chunks ({} bytes):",
                worker_id,
                chunks.len(),
                self.loads[worker_id]
            );
            for chunk in chunks {
                let _ = writeln!(
                    report,
                    "\t{} (offset {}, {} bytes)",
                    chunk.path.display(),
                    chunk.offset,
                    chunk.length
                );
            }
        }
        log.info(&report);
    }
}

/// Regular files of `input_dir`, sorted by path.
/// Only a directory that cannot be listed is an error; entries that cannot
/// be inspected (dangling links, files removed while listing) are logged and skipped.
pub fn read_file_metadata(input_dir: &Path, log: &dyn LogSink) -> Result<Vec<FileDescriptor>> {
    let entries = fs::read_dir(input_dir).map_err(|source| MapReduceError::InputDir {
        path: input_dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                log.error(&format!(
                    "Error reading entry of {}: {}",
                    input_dir.display(),
                    e
                ));
                continue;
            }
        };
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log.error(&format!("Error opening file: {}: {}", path.display(), e));
                continue;
            }
        };
        if metadata.is_file() {
            files.push(FileDescriptor {
                path,
                total_size: metadata.len(),
            });
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

pub fn is_boundary(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte.is_ascii_punctuation()
}

/// Length of the chunk starting at `offset` whose nominal size is `window`.
///
/// Scanning starts at the last byte of the window; the chunk ends just after
/// the first boundary byte, or at end of file if there is none.
/// Requires `window >= 1` and `offset + window <= file_size`.
pub fn find_split_point<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    window: u64,
    file_size: u64,
) -> io::Result<u64> {
    let mut position = offset + window - 1;
    reader.seek(SeekFrom::Start(position))?;

    let mut block = [0u8; SCAN_BLOCK];
    while position < file_size {
        let wanted = min(SCAN_BLOCK as u64, file_size - position) as usize;
        let read = reader.read(&mut block[..wanted])?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file ended at byte {}, expected {}", position, file_size),
            ));
        }
        if let Some(index) = block[..read].iter().position(|b| is_boundary(*b)) {
            return Ok(position + index as u64 + 1 - offset);
        }
        position += read as u64;
    }
    Ok(file_size - offset)
}

/// Split one file into word-aligned chunks that cover it exactly once
pub fn split_file(file: &FileDescriptor, chunk_size: usize) -> io::Result<Vec<ChunkAssignment>> {
    let mut reader = File::open(&file.path)?;
    let mut chunks = Vec::new();
    let mut offset = 0;

    while offset < file.total_size {
        let window = min(chunk_size as u64, file.total_size - offset);
        let length = find_split_point(&mut reader, offset, window, file.total_size)?;
        chunks.push(ChunkAssignment {
            path: file.path.clone(),
            offset,
            length,
        });
        offset += length;
    }
    Ok(chunks)
}

/// Greedy distribution: every chunk goes to the currently least-loaded worker.
/// Empty or unreadable files are logged and skipped as a whole.
pub fn distribute_work(
    files: &[FileDescriptor],
    num_workers: usize,
    chunk_size: usize,
    log: &dyn LogSink,
) -> WorkDistribution {
    let mut distribution = WorkDistribution::new(num_workers);

    for file in files {
        if file.total_size == 0 {
            log.error(&format!("Skipping empty file: {}", file.path.display()));
            continue;
        }
        match split_file(file, chunk_size) {
            Ok(chunks) => {
                for chunk in chunks {
                    distribution.assign(chunk);
                }
            }
            Err(e) => {
                log.error(&format!(
                    "Error opening file: {}: {}",
                    file.path.display(),
                    e
                ));
            }
        }
    }

    log.info(&format!(
        "Work distribution complete: {} chunks across {} workers",
        distribution.chunk_count(),
        num_workers
    ));
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_reduce_core::log_sink::{LogLevel, RecordingSink};
    use rand::Rng;
    use std::io::Cursor;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> FileDescriptor {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        FileDescriptor {
            path,
            total_size: contents.len() as u64,
        }
    }

    fn random_text(len: usize) -> Vec<u8> {
        let alphabet = b"abcdefghij    \n,.!";
        let mut rng = rand::rng();
        (0..len)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())])
            .collect()
    }

    fn assert_exact_cover(chunks: &[ChunkAssignment], file_size: u64) {
        let mut expected_offset = 0;
        for chunk in chunks {
            assert_eq!(chunk.offset, expected_offset);
            assert!(chunk.length > 0);
            expected_offset = chunk.end();
        }
        assert_eq!(expected_offset, file_size);
    }

    #[test]
    fn test_split_point_extends_to_next_boundary() {
        let text = b"hello world again";
        let mut reader = Cursor::new(&text[..]);
        // window ends inside "world"; chunk runs through the space after it
        assert_eq!(find_split_point(&mut reader, 0, 8, 17).unwrap(), 12);
        // window ends on the space itself
        assert_eq!(find_split_point(&mut reader, 0, 6, 17).unwrap(), 6);
    }

    #[test]
    fn test_split_point_takes_rest_of_file_without_boundary() {
        let text = b"ab cdefghijklmnopqrstuvwxyz";
        let mut reader = Cursor::new(&text[..]);
        assert_eq!(find_split_point(&mut reader, 3, 4, 27).unwrap(), 24);
    }

    #[test]
    fn test_split_point_scans_past_lookahead_block() {
        let mut text = vec![b'x'; 200];
        text.push(b' ');
        text.extend_from_slice(b"tail");
        let size = text.len() as u64;
        let mut reader = Cursor::new(text);
        assert_eq!(find_split_point(&mut reader, 0, 10, size).unwrap(), 201);
    }

    #[test]
    fn test_punctuation_is_a_boundary() {
        let text = b"dog!cat";
        let mut reader = Cursor::new(&text[..]);
        assert_eq!(find_split_point(&mut reader, 0, 2, 7).unwrap(), 4);
    }

    #[test]
    fn test_split_file_covers_file_on_word_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let contents = random_text(10_000);
        let file = write_file(dir.path(), "a.txt", &contents);

        let chunks = split_file(&file, 128).unwrap();
        assert_exact_cover(&chunks, file.total_size);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.length >= 128);
            assert!(is_boundary(contents[chunk.end() as usize - 1]));
        }
        assert!(chunks.last().unwrap().length > 0);
    }

    #[test]
    fn test_least_loaded_ties_go_to_lowest_worker() {
        let mut distribution = WorkDistribution::new(3);
        let chunk = |length| ChunkAssignment {
            path: PathBuf::from("f"),
            offset: 0,
            length,
        };
        assert_eq!(distribution.assign(chunk(10)), 0);
        assert_eq!(distribution.assign(chunk(10)), 1);
        assert_eq!(distribution.assign(chunk(5)), 2);
        assert_eq!(distribution.assign(chunk(5)), 2);
        assert_eq!(distribution.assign(chunk(1)), 0);
        assert_eq!(distribution.assign(chunk(1)), 1);
        assert_eq!(distribution.loads, vec![11, 11, 10]);
    }

    #[test]
    fn test_distribution_covers_every_file_and_stays_balanced() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<FileDescriptor> = [3_000, 17, 9_500, 1_024, 640]
            .iter()
            .enumerate()
            .map(|(i, len)| write_file(dir.path(), &format!("f{}.txt", i), &random_text(*len)))
            .collect();

        let sink = RecordingSink::new();
        let distribution = distribute_work(&files, 4, 256, &sink);

        for file in &files {
            let mut chunks: Vec<ChunkAssignment> = distribution
                .assignments
                .iter()
                .flatten()
                .filter(|c| c.path == file.path)
                .cloned()
                .collect();
            chunks.sort_by_key(|c| c.offset);
            assert_exact_cover(&chunks, file.total_size);
        }

        let largest = distribution
            .assignments
            .iter()
            .flatten()
            .map(|c| c.length)
            .max()
            .unwrap();
        assert!(distribution.imbalance() <= largest);

        for (worker_id, chunks) in distribution.assignments.iter().enumerate() {
            let load: u64 = chunks.iter().map(|c| c.length).sum();
            assert_eq!(distribution.loads[worker_id], load);
        }
    }

    #[test]
    fn test_empty_and_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write_file(dir.path(), "empty.txt", b"");
        let good = write_file(dir.path(), "good.txt", b"one two three");
        let missing = FileDescriptor {
            path: dir.path().join("gone.txt"),
            total_size: 12,
        };

        let sink = RecordingSink::new();
        let distribution = distribute_work(&[empty, missing, good.clone()], 2, 4, &sink);

        assert!(sink.contains(LogLevel::Error, "empty.txt"));
        assert!(sink.contains(LogLevel::Error, "gone.txt"));
        assert!(distribution
            .assignments
            .iter()
            .flatten()
            .all(|c| c.path == good.path));
        assert_eq!(distribution.loads.iter().sum::<u64>(), good.total_size);
    }

    #[test]
    fn test_read_file_metadata_lists_regular_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "b.txt", b"bb");
        write_file(dir.path(), "a.txt", b"a");
        fs::create_dir(dir.path().join("nested")).unwrap();

        let files = read_file_metadata(dir.path(), &RecordingSink::new()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(files[1].total_size, 2);
    }

    #[test]
    fn test_read_file_metadata_fails_on_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_file_metadata(&dir.path().join("nope"), &RecordingSink::new());
        assert!(matches!(result, Err(MapReduceError::InputDir { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_file_metadata_skips_dangling_link() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.txt", b"cat dog cat");
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("link.txt"))
            .unwrap();
        let sink = RecordingSink::new();

        let files = read_file_metadata(dir.path(), &sink).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, dir.path().join("a.txt"));
        assert!(sink.contains(LogLevel::Error, "link.txt"));
    }
}
