use std::path::{Path, PathBuf};

pub const STORE_DIR: &str = "store";

#[must_use]
pub fn store_root(home: &Path) -> PathBuf {
    home.join(STORE_DIR)
}

/// Maps a key onto characters that are safe in a file name on every platform.
#[must_use]
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' => c,
            _ => '-',
        })
        .collect()
}

#[must_use]
pub fn key_file_name(key: &str) -> String {
    format!("{}.json", sanitize_key(key))
}
