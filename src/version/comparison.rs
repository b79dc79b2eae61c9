//! Segment-wise comparison of dot-delimited numeric versions.

use std::cmp::Ordering;
use std::fmt;

/// A version split into numeric segments.
///
/// Parsing never fails. Each `.`-separated segment is read as a non-negative
/// decimal integer; anything that is not purely ASCII digits (an empty
/// segment, a sign, `1-beta`, `rc1`) counts as `0`. Pre-release and build
/// metadata are therefore not understood: `1.2.3-beta` compares equal to
/// `1.2.0`.
///
/// Segments are kept as normalized digit strings, so there is no limit on
/// their magnitude. Missing trailing segments compare as zero, which makes
/// `1.2` equal to `1.2.0`; `PartialEq` follows the ordering, not the text.
#[derive(Debug, Clone)]
pub struct DottedVersion {
    raw: String,
    segments: Vec<String>,
}

impl DottedVersion {
    /// Parse a version string. Never fails; see the type docs.
    pub fn parse(version: &str) -> Self {
        let segments = version.split('.').map(normalize_segment).collect();
        Self {
            raw: version.to_string(),
            segments,
        }
    }

    /// The string this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn segment(&self, index: usize) -> &str {
        self.segments.get(index).map_or("0", String::as_str)
    }
}

fn normalize_segment(segment: &str) -> String {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return "0".to_string();
    }
    let trimmed = segment.trim_start_matches('0');
    if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() }
}

// Both inputs are normalized digit strings without leading zeros.
fn compare_segments(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| compare_segments(self.segment(i), other.segment(i)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DottedVersion {}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two version strings.
///
/// `Greater` means `a` is newer than `b`.
///
/// ```
/// use media_updater::version::compare;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare("1.9", "1.10"), Ordering::Less);
/// assert_eq!(compare("1.2", "1.2.0"), Ordering::Equal);
/// ```
pub fn compare(a: &str, b: &str) -> Ordering {
    DottedVersion::parse(a).cmp(&DottedVersion::parse(b))
}
