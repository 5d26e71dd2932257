//! Path utilities for writing profile data to disk.
//!
//! Profile names are author-controlled, so anything derived from them must be
//! reduced to a single safe path component before it touches the filesystem.

/// Fallback stem when a profile name sanitizes to nothing
const FALLBACK_STEM: &str = "profile";

/// Reduce arbitrary text to a single, portable file name component
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Leading dots would hide the file or form `..`
    let cleaned = cleaned.trim_start_matches('.').trim().to_string();

    if cleaned.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        cleaned
    }
}

/// File name used when saving a profile's archive
pub fn archive_file_name(profile_name: &str) -> String {
    format!("{}.zip", sanitize_file_name(profile_name))
}
