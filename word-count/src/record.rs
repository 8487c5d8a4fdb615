// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use std::io::{self, Write};

/// Parse a `word,count` line. Lines without a comma or with a
/// non-numeric count are rejected.
pub fn parse_record(line: &str) -> Option<(&str, u64)> {
    let (word, count) = line.split_once(',')?;
    let count = count.trim().parse().ok()?;
    Some((word, count))
}

pub fn write_record<W: Write>(writer: &mut W, word: &str, count: u64) -> io::Result<()> {
    writeln!(writer, "{},{}", word, count)
}
