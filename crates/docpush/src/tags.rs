//! `--tags` parsing

/// Split a comma-separated tag list, trimming whitespace around each tag.
///
/// An absent or empty argument yields no tags. Empty entries between commas
/// are kept as empty strings.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) if !raw.is_empty() => raw.split(',').map(|tag| tag.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}
