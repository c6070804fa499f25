//! Leading-whitespace measurement

/// Columns a tab advances to (the next multiple of this value).
pub const TAB_STOP: usize = 4;

/// The leading whitespace of `line`.
pub fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// Width of the leading whitespace, expanding tabs to [`TAB_STOP`].
pub fn leading_width(line: &str) -> usize {
    let prefix = leading_whitespace(line);
    if prefix.contains(' ') && prefix.contains('\t') {
        tracing::debug!(line = line.trim_end(), "Mixed tabs and spaces in indentation");
    }
    prefix.chars().fold(0, |width, c| match c {
        '\t' => (width / TAB_STOP + 1) * TAB_STOP,
        _ => width + 1,
    })
}

/// One indentation level deeper than `prefix`, in the same style.
pub fn deeper(prefix: &str) -> String {
    if prefix.contains('\t') {
        format!("{prefix}\t")
    } else {
        format!("{prefix}  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("}", 0)]
    #[case("  }", 2)]
    #[case("\t}", 4)]
    #[case("  \t}", 4)]
    #[case("\t  }", 6)]
    #[case("     \t}", 8)]
    fn test_leading_width(#[case] line: &str, #[case] expected: usize) {
        assert_eq!(leading_width(line), expected);
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(leading_whitespace("\t  $include x\n"), "\t  ");
        assert_eq!(leading_whitespace("x"), "");
    }

    #[test]
    fn test_deeper_keeps_style() {
        assert_eq!(deeper("  "), "    ");
        assert_eq!(deeper("\t"), "\t\t");
    }
}
