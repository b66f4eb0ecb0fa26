//! core::cover
//!
//! Cover letter text as stored in cover tag messages.
//!
//! Everything from the first `---` line on is scratch space and is dropped
//! when the letter is read back.

/// Message for a cover tag that has not been written yet.
pub const DEFAULT_COVER_MESSAGE: &str = "\
*** SUBJECT HERE ***

*** PATCHSET DESCRIPTION HERE ***

---
";

/// The cover letter part of a tag message.
///
/// ```
/// use patchset::core::cover::cover_letter;
///
/// let msg = "Subject line\n\nBody text.\n---\nnotes\n";
/// assert_eq!(cover_letter(msg), "Subject line\n\nBody text.");
/// ```
pub fn cover_letter(message: &str) -> String {
    message
        .lines()
        .take_while(|line| *line != "---")
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_reads_back_without_separator() {
        assert_eq!(
            cover_letter(DEFAULT_COVER_MESSAGE),
            "*** SUBJECT HERE ***\n\n*** PATCHSET DESCRIPTION HERE ***"
        );
    }

    #[test]
    fn separator_must_be_whole_line() {
        assert_eq!(cover_letter("a\n--- b\nc"), "a\n--- b\nc");
    }

    #[test]
    fn empty() {
        assert_eq!(cover_letter(""), "");
        assert_eq!(cover_letter("---\nall notes\n"), "");
    }
}
