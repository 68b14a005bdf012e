//! Line ending detection and normalization for file IO.
//!
//! Buffers hold LF-only text; the original style is remembered so it can be restored
//! when the buffer is written back out.

/// Line ending style detected from source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Cr,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::Crlf => "\r\n",
        }
    }

    /// Convert LF-only `text` to this style.
    pub fn restore(self, text: &str) -> String {
        match self {
            LineEnding::Lf => text.to_string(),
            other => text.replace('\n', other.as_str()),
        }
    }
}

/// Result of normalizing line endings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub normalized: String,         // LF-only content
    pub original: LineEnding,       // majority style
    pub had_trailing_newline: bool, // original trailing newline presence
    pub mixed: bool,                // more than one style encountered
}

impl NormalizedText {
    /// Normalized content minus the final terminator, so the file's last line is the
    /// buffer's last line.
    pub fn body(&self) -> &str {
        if self.had_trailing_newline {
            self.normalized
                .strip_suffix('\n')
                .unwrap_or(&self.normalized)
        } else {
            &self.normalized
        }
    }
}

/// Detect and normalize line endings of `input` to LF.
/// The majority style wins; ties resolve by precedence CRLF > LF > CR.
pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let bytes = input.as_bytes();
    let (mut crlf, mut lf, mut cr) = (0usize, 0usize, 0usize);
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                crlf += 1;
                i += 2;
            }
            b'\r' => {
                cr += 1;
                i += 1;
            }
            b'\n' => {
                lf += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    let had_trailing_newline = input.ends_with('\n') || input.ends_with('\r');

    let mut original = LineEnding::Lf;
    let mut max = 0usize;
    for (style, count) in [
        (LineEnding::Crlf, crlf),
        (LineEnding::Lf, lf),
        (LineEnding::Cr, cr),
    ] {
        if count > max {
            max = count;
            original = style;
        }
    }
    let mixed = [crlf, lf, cr].iter().filter(|c| **c > 0).count() > 1;

    if crlf == 0 && cr == 0 {
        return NormalizedText {
            normalized: input.to_string(),
            original,
            had_trailing_newline,
            mixed,
        };
    }
    // '\r' is ASCII so splitting on it never lands inside a multi-byte sequence.
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    debug_assert!(!normalized.contains('\r'));
    NormalizedText {
        normalized,
        original,
        had_trailing_newline,
        mixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lf_input_passes_through() {
        let n = normalize_line_endings("a\nb\n");
        assert_eq!(n.normalized, "a\nb\n");
        assert_eq!(n.original, LineEnding::Lf);
        assert!(n.had_trailing_newline);
        assert!(!n.mixed);
    }

    #[test]
    fn crlf_majority_detected_and_restored() {
        let n = normalize_line_endings("a\r\nb\r\nc");
        assert_eq!(n.normalized, "a\nb\nc");
        assert_eq!(n.original, LineEnding::Crlf);
        assert!(!n.had_trailing_newline);
        assert_eq!(n.original.restore(&n.normalized), "a\r\nb\r\nc");
    }

    #[test]
    fn body_drops_only_the_final_terminator() {
        assert_eq!(normalize_line_endings("a\r\nb\r\n").body(), "a\nb");
        assert_eq!(normalize_line_endings("a\n\n").body(), "a\n");
        assert_eq!(normalize_line_endings("a\nb").body(), "a\nb");
        assert_eq!(normalize_line_endings("").body(), "");
    }

    #[test]
    fn mixed_styles_flagged() {
        let n = normalize_line_endings("a\r\nb\nc\rd");
        assert!(n.mixed);
        assert_eq!(n.normalized, "a\nb\nc\nd");
        // one of each: tie resolved toward CRLF
        assert_eq!(n.original, LineEnding::Crlf);
    }
}
