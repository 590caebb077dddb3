use difference::{Changeset, Difference};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Match,
    Mismatch(String),
}

/// Byte-exact comparison of an actual output stream against the golden
/// reference. No whitespace or line-ending normalization: golden files are
/// expected to be canonical already.
///
/// A missing golden file is a distinct condition callers must handle before
/// calling this; `compare` only ever sees two byte streams.
pub fn compare(golden: &[u8], actual: &[u8]) -> DiffOutcome {
    if golden == actual {
        DiffOutcome::Match
    } else {
        DiffOutcome::Mismatch(render_line_diff(golden, actual))
    }
}

/// Line diff with `-` for golden-only lines and `+` for actual-only lines.
fn render_line_diff(golden: &[u8], actual: &[u8]) -> String {
    let golden = String::from_utf8_lossy(golden);
    let actual = String::from_utf8_lossy(actual);
    let changeset = Changeset::new(&golden, &actual, "\n");

    let mut out = String::new();
    for diff in &changeset.diffs {
        let (prefix, chunk) = match diff {
            Difference::Same(x) => ("  ", x),
            Difference::Rem(x) => ("- ", x),
            Difference::Add(x) => ("+ ", x),
        };
        for line in chunk.split('\n') {
            out.push_str(prefix);
            out.push_str(line);
            out.push('\n');
        }
    }
    if out.is_empty() {
        // Bytes differed but the line splitter saw nothing (e.g. invalid
        // UTF-8 folded together by the lossy conversion).
        out.push_str("(outputs differ at the byte level)\n");
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identical_bytes_match() {
        assert_eq!(compare(b"3\n", b"3\n"), DiffOutcome::Match);
        assert_eq!(compare(b"", b""), DiffOutcome::Match);
    }

    #[test]
    fn mismatch_produces_a_diff_showing_both_sides() {
        let DiffOutcome::Mismatch(diff) = compare(b"3\n", b"4\n") else {
            panic!("expected a mismatch");
        };
        assert!(!diff.is_empty());
        assert!(diff.contains("- 3"), "diff = {:?}", diff);
        assert!(diff.contains("+ 4"), "diff = {:?}", diff);
    }

    #[test]
    fn one_byte_difference_is_a_mismatch() {
        // No normalization: a missing trailing newline is a real mismatch.
        let DiffOutcome::Mismatch(diff) = compare(b"hello\n", b"hello") else {
            panic!("expected a mismatch");
        };
        assert!(!diff.is_empty());
    }

    #[test]
    fn line_endings_are_not_normalized() {
        assert!(matches!(
            compare(b"a\r\nb\r\n", b"a\nb\n"),
            DiffOutcome::Mismatch(_)
        ));
    }
}
