//! Abbreviation-aware sentence segmentation.
//!
//! Splits raw page text on whitespace that immediately follows a sentence
//! terminator (`.` or `?`), keeping the terminator attached to its sentence.
//! Two guards suppress splits after common abbreviations: a
//! "word-char, dot, word-char" window ("e.g.", "U.S.") and a
//! "capital, lowercase, dot" window ("Mr.", "Dr."). This is a heuristic, not
//! a full boundary classifier; abbreviations outside those two shapes may
//! still over- or under-split.

use crate::models::SentenceRecord;

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split `text` into sentence records, all carrying `page_number` (1-based).
///
/// Output order matches input order; nothing is merged or dropped beyond the
/// split rule — the separator whitespace is consumed, everything else is
/// preserved byte for byte. Empty input yields a single empty-string record;
/// empty records are kept so a blank page still appears in the index.
pub fn segment(page_number: u32, text: &str) -> Vec<SentenceRecord> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut records = Vec::new();
    let mut start = 0usize;

    for (i, &(byte_pos, c)) in chars.iter().enumerate() {
        if !c.is_whitespace() {
            continue;
        }
        let terminated = i >= 1 && matches!(chars[i - 1].1, '.' | '?');
        if !terminated {
            continue;
        }
        // "e.g." — word-char, dot, word-char right before the terminator.
        let abbreviation = i >= 4
            && is_word(chars[i - 4].1)
            && chars[i - 3].1 == '.'
            && is_word(chars[i - 2].1);
        // "Mr." — capital, lowercase, dot.
        let honorific = i >= 3
            && chars[i - 3].1.is_ascii_uppercase()
            && chars[i - 2].1.is_ascii_lowercase()
            && chars[i - 1].1 == '.';
        if abbreviation || honorific {
            continue;
        }
        records.push(SentenceRecord {
            page_number,
            text: text[start..byte_pos].to_string(),
        });
        start = byte_pos + c.len_utf8();
    }

    records.push(SentenceRecord {
        page_number,
        text: text[start..].to_string(),
    });
    records
}
