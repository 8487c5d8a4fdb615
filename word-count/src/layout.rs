// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use std::path::{Path, PathBuf};

const INTERMEDIATE_PREFIX: &str = "map.part-";
const PARTITION_PREFIX: &str = "reduce.part-";
const FINAL_OUTPUT: &str = "output.txt";

/// `map.part-<worker>-<partition>.txt`, written only by `worker_id`
pub fn intermediate_path(output_dir: &Path, worker_id: usize, partition: usize) -> PathBuf {
    output_dir.join(format!("{}{}-{}.txt", INTERMEDIATE_PREFIX, worker_id, partition))
}

/// `reduce.part-<partition>.txt`, written only by the partition's owner
pub fn partition_output_path(output_dir: &Path, partition: usize) -> PathBuf {
    output_dir.join(format!("{}{}.txt", PARTITION_PREFIX, partition))
}

pub fn final_output_path(output_dir: &Path) -> PathBuf {
    output_dir.join(FINAL_OUTPUT)
}

pub fn is_intermediate_file(file_name: &str) -> bool {
    file_name.starts_with(INTERMEDIATE_PREFIX) && file_name.ends_with(".txt")
}
