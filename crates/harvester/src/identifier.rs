//! arXiv identifier handling.
//!
//! arXiv has used two identifier schemes:
//! - legacy identifiers, `category[.subclass]/number` (e.g. `math.RA/0601001`), where the subclass
//!   is not part of the identifier the OAI-PMH interface accepts;
//! - modern identifiers, `number[version]` (e.g. `0709.3040v1`), often written with an `arXiv:`
//!   scheme prefix.
//!
//! [`fix_key`] rewrites either form into the canonical form used both for requests and for the
//! stored `eprint` field.

use lazy_static::lazy_static;
use regex::Regex;

/// Scheme prefix carried by modern identifiers.
pub const ARXIV_PREFIX: &str = "arXiv:";

/// The shape of an identifier, as far as it can be told from the string alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
  /// `category[.subclass]/number`, e.g. `hep-ph/0408155`
  Legacy,
  /// `[arXiv:]YYMM.NNNN[N][vK]`, e.g. `arXiv:0709.3040v1`
  Modern,
  /// Anything else; it is still sent to the repository verbatim
  Unrecognized,
}

impl std::fmt::Display for IdentifierKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      IdentifierKind::Legacy => write!(f, "legacy"),
      IdentifierKind::Modern => write!(f, "modern"),
      IdentifierKind::Unrecognized => write!(f, "unrecognized"),
    }
  }
}

/// Rewrites a raw identifier into the canonical form accepted by the repository.
///
/// Rules, in order:
/// 1. a leading `arXiv:` prefix is stripped and the remainder returned unchanged;
/// 2. otherwise, if the part before the first `/` contains a `.`, everything from that `.` up to
///    the `/` is dropped;
/// 3. otherwise the input is returned unchanged.
///
/// The function is total: every input yields an output.
///
/// # Examples
///
/// ```
/// use harvester::identifier::fix_key;
///
/// assert_eq!(fix_key("math.RA/0601001"), "math/0601001");
/// assert_eq!(fix_key("arXiv:0709.3040v1"), "0709.3040v1");
/// assert_eq!(fix_key("hep-ph/0408155"), "hep-ph/0408155");
/// ```
pub fn fix_key(id: &str) -> String {
  if let Some(rest) = id.strip_prefix(ARXIV_PREFIX) {
    return rest.to_string();
  }

  match id.split_once('/') {
    Some((category, number)) => match category.split_once('.') {
      Some((archive, _subclass)) => format!("{archive}/{number}"),
      None => id.to_string(),
    },
    None => id.to_string(),
  }
}

/// Tells which identifier scheme `id` follows.
///
/// This is informational; [`fix_key`] and the client accept any string.
pub fn classify(id: &str) -> IdentifierKind {
  lazy_static! {
      /// `[arXiv:]YYMM.NNNN[N][vK]`
      static ref MODERN: Regex = Regex::new(r"^(?:arXiv:)?\d{4}\.\d{4,5}(?:v\d+)?$").unwrap();
      /// `category[.subclass]/NNNNNNN[vK]`
      static ref LEGACY: Regex =
        Regex::new(r"^[a-zA-Z-]+(?:\.[a-zA-Z-]+)?/\d{7}(?:v\d+)?$").unwrap();
  }

  if MODERN.is_match(id) {
    IdentifierKind::Modern
  } else if LEGACY.is_match(id) {
    IdentifierKind::Legacy
  } else {
    IdentifierKind::Unrecognized
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fix_key() {
    assert_eq!(fix_key(""), "");
    assert_eq!(fix_key("test"), "test");
    assert_eq!(fix_key("math.RA/0601001"), "math/0601001");
    assert_eq!(fix_key("math.QA/0601001"), "math/0601001");
    assert_eq!(fix_key("hep-ph/0408155"), "hep-ph/0408155");
    assert_eq!(fix_key("arXiv:0709.3040v1"), "0709.3040v1");
    assert_eq!(fix_key("arXiv:"), "");
  }

  #[test]
  fn test_fix_key_is_idempotent() {
    for id in
      ["", "test", "math.RA/0601001", "math.QA/0601001", "hep-ph/0408155", "arXiv:0709.3040v1"]
    {
      let once = fix_key(id);
      assert_eq!(fix_key(&once), once, "not idempotent for {id}");
    }
  }

  #[test]
  fn test_fix_key_only_touches_category() {
    // a dot after the slash belongs to the number and stays
    assert_eq!(fix_key("0709.3040"), "0709.3040");
    assert_eq!(fix_key("math/0601.001"), "math/0601.001");
  }

  #[test]
  fn test_classify() {
    assert_eq!(classify("0709.3040"), IdentifierKind::Modern);
    assert_eq!(classify("arXiv:0709.3040v1"), IdentifierKind::Modern);
    assert_eq!(classify("2301.07041"), IdentifierKind::Modern);
    assert_eq!(classify("hep-ph/0408155"), IdentifierKind::Legacy);
    assert_eq!(classify("math.RA/0612188"), IdentifierKind::Legacy);
    assert_eq!(classify("test"), IdentifierKind::Unrecognized);
    assert_eq!(classify(""), IdentifierKind::Unrecognized);
  }
}
