//! Content hashes used as stable identities for tricks and challenges.
//!
//! Row ids in the content database change whenever the trick list is
//! re-imported, so saves key on a hash of the text that names the record.

use xxhash_rust::xxh32::Xxh32;

/// xxHash32 (seed 0) over the concatenation of `parts`.
///
/// Text is narrowed to ASCII first: every non-ASCII character becomes a
/// single `?` byte, so hashes of names with accents stay identical to the
/// ones stored by older saves.
pub fn content_hash(parts: &[&str]) -> u32 {
    let mut hasher = Xxh32::new(0);
    for part in parts {
        let bytes: Vec<u8> = part
            .chars()
            .map(|c| u8::try_from(c).ok().filter(u8::is_ascii).unwrap_or(b'?'))
            .collect();
        hasher.update(&bytes);
    }
    hasher.digest()
}

/// Hash of a trick within a category. `full_name` includes the stance prefix.
pub fn trick_hash(category: &str, full_name: &str) -> u32 {
    content_hash(&[category, full_name])
}

pub fn challenge_hash(name: &str) -> u32 {
    content_hash(&[name])
}
