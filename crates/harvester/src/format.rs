//! Text normalization for free-text metadata.
//!
//! Abstracts, titles and comments in OAI-PMH documents are hard-wrapped at arbitrary columns and
//! indented to match the surrounding XML. This module turns that into a canonical form: soft
//! line breaks become spaces, blank lines become paragraph breaks.
//!
//! # Examples
//!
//! ```
//! use harvester::format;
//!
//! let text = "  We study heavy\n  particles.\n\n  They are produced.  ";
//! assert_eq!(format::normalize_text(text), "We study heavy particles.\nThey are produced.");
//! ```

/// Collapses irregular line breaks and whitespace into paragraphs.
///
/// The input is split on newlines and each line is trimmed. Runs of non-empty lines are joined
/// with a single space into one paragraph; lines that are empty after trimming separate
/// paragraphs. Paragraphs are joined with a single newline and no empty paragraph is ever
/// emitted, so leading, trailing and repeated blank lines vanish. Whitespace runs inside a line
/// collapse to one space.
///
/// # Examples
///
/// ```
/// use harvester::format::normalize_text;
///
/// assert_eq!(normalize_text("Test \n this"), "Test this");
/// assert_eq!(normalize_text("Test\n    \nthis"), "Test\nthis");
/// assert_eq!(normalize_text(" \n\t \n"), "");
/// ```
pub fn normalize_text(text: &str) -> String {
  let mut paragraphs: Vec<String> = Vec::new();
  let mut current: Vec<String> = Vec::new();

  for line in text.split('\n') {
    let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.is_empty() {
      if !current.is_empty() {
        paragraphs.push(current.join(" "));
        current.clear();
      }
    } else {
      current.push(line);
    }
  }
  if !current.is_empty() {
    paragraphs.push(current.join(" "));
  }

  paragraphs.join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_text() {
    assert_eq!(normalize_text("Test\nthis"), "Test this");
    assert_eq!(normalize_text("Test \n this"), "Test this");
    assert_eq!(normalize_text("Test\n\nthis"), "Test\nthis");
    assert_eq!(normalize_text("Test\n    \nthis"), "Test\nthis");
    assert_eq!(normalize_text("  Test   \n   \n   this  "), "Test\nthis");
  }

  #[test]
  fn test_normalize_whitespace_only() {
    assert_eq!(normalize_text(""), "");
    assert_eq!(normalize_text("   "), "");
    assert_eq!(normalize_text("\n\n  \n"), "");
  }

  #[test]
  fn test_normalize_interior_spaces() {
    assert_eq!(normalize_text("No    extra\tspaces"), "No extra spaces");
    assert_eq!(normalize_text("a\r\nb\r\n\r\nc"), "a b\nc");
    assert_eq!(normalize_text("\n\nfirst\n\n\n\nsecond\n\n"), "first\nsecond");
  }
}
