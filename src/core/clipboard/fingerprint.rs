//! Cheap payload fingerprints
//!
//! Computed on poll ticks for diagnostics and similarity checks. These are
//! heuristic summaries, not cryptographic hashes: two different images of
//! identical size and type can collide. The binding duplicate-suppression
//! contract is raw payload equality against the last-processed slot; the
//! fingerprint is auxiliary.

/// Number of evenly-strided byte samples taken from an image payload
const IMAGE_SAMPLE_SIZE: usize = 50;

/// Max characters of prefix/suffix included in a text fingerprint
const TEXT_PART_LEN: usize = 100;

/// Text length above which the suffix is included
const TEXT_SUFFIX_THRESHOLD: usize = 200;

/// Fingerprint an image payload: byte length, MIME type and a fixed-size
/// strided sample of the content
pub fn image_fingerprint(bytes: &[u8], mime: &str) -> String {
    let sample_size = IMAGE_SAMPLE_SIZE.min(bytes.len());
    let step = if sample_size == 0 {
        1
    } else {
        (bytes.len() / sample_size).max(1)
    };

    let mut samples = String::new();
    let mut i = 0;
    while i < bytes.len() {
        samples.push_str(&bytes[i].to_string());
        i += step;
    }

    format!("{}-{}-{}", bytes.len(), mime, samples)
}

/// Fingerprint a text payload: length, word count, a bounded prefix and
/// (for long texts) a bounded suffix
///
/// The suffix guards against false-positive duplicate detection on long
/// documents that share only a prefix.
pub fn text_fingerprint(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let length = chars.len();
    let word_count = text.split_whitespace().count();

    let first_part: String = chars.iter().take(TEXT_PART_LEN.min(length)).collect();
    let last_part: String = if length > TEXT_SUFFIX_THRESHOLD {
        chars[length - TEXT_PART_LEN..].iter().collect()
    } else {
        String::new()
    };

    format!("{}-{}-{}{}", length, word_count, first_part, last_part)
}
