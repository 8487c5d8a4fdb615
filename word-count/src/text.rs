// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Split raw bytes on ASCII whitespace, dropping empty tokens
pub fn tokens(buffer: &[u8]) -> impl Iterator<Item = &[u8]> {
    buffer
        .split(u8::is_ascii_whitespace)
        .filter(|token| !token.is_empty())
}

/// Trim everything before the first and after the last ASCII letter, then lowercase.
/// Returns an empty string when there is no letter at all.
pub fn clean_word(word: &str) -> String {
    let bytes = word.as_bytes();
    match (
        bytes.iter().position(u8::is_ascii_alphabetic),
        bytes.iter().rposition(u8::is_ascii_alphabetic),
    ) {
        // ASCII positions are always char boundaries
        (Some(start), Some(end)) => word[start..=end].to_ascii_lowercase(),
        _ => String::new(),
    }
}

pub fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Clean and validate one raw token.
/// Tokens with anything but letters between their first and last letter are
/// rejected whole, never partially cleaned.
pub fn normalize_token(token: &[u8]) -> Option<String> {
    let start = token.iter().position(u8::is_ascii_alphabetic)?;
    let end = token.iter().rposition(u8::is_ascii_alphabetic)?;
    let letters = &token[start..=end];

    if !letters.iter().all(u8::is_ascii_alphabetic) {
        return None;
    }
    Some(
        letters
            .iter()
            .map(|b| char::from(b.to_ascii_lowercase()))
            .collect(),
    )
}

/// Reduce partition for a word. Stable for the lifetime of the process.
pub fn partition_for(word: &str, num_partitions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    word.hash(&mut hasher);
    (hasher.finish() % num_partitions as u64) as usize
}
