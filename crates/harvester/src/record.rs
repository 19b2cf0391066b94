//! The bibliographic record produced by a harvest.
//!
//! A [`Record`] is a flat mapping from field names to string values plus an entry type tag such as
//! `article`. Field names are case-insensitive: they are stored lower-cased, so `Title` and
//! `title` address the same field. A field that was never set is absent (`None`), which is
//! distinct from a field set to the empty string.
//!
//! # Examples
//!
//! ```
//! use harvester::record::{field, Record};
//!
//! let mut record = Record::new("article");
//! record.set_field(field::TITLE, "Heavy Particles from Inflation");
//! record.append_field(field::AUTHOR, "G. F. Giudice", " and ");
//! record.append_field(field::AUTHOR, "A. Riotto", " and ");
//!
//! assert_eq!(record.field("TITLE"), Some("Heavy Particles from Inflation"));
//! assert_eq!(record.field(field::AUTHOR), Some("G. F. Giudice and A. Riotto"));
//! assert_eq!(record.field(field::DOI), None);
//! ```

use super::*;

/// Names of the fields the parser knows how to fill.
pub mod field {
  /// Canonical arXiv identifier
  pub const EPRINT: &str = "eprint";
  /// Authors, joined by [`AUTHOR_SEPARATOR`](super::AUTHOR_SEPARATOR)
  pub const AUTHOR: &str = "author";
  /// Title
  pub const TITLE: &str = "title";
  /// Abstract
  pub const ABSTRACT: &str = "abstract";
  /// Journal name from the journal reference
  pub const JOURNAL: &str = "journal";
  /// Journal volume
  pub const VOLUME: &str = "volume";
  /// Four digit year
  pub const YEAR: &str = "year";
  /// Page range, e.g. `511-525`
  pub const PAGES: &str = "pages";
  /// Free-text author comment, e.g. `23 pages`
  pub const COMMENT: &str = "comment";
  /// Report number
  pub const REPORTNO: &str = "reportno";
  /// Digital Object Identifier
  pub const DOI: &str = "doi";
  /// Month as a BibTeX month macro token, e.g. `#sep#`
  pub const MONTH: &str = "month";
}

/// Separator placed between the names in the `author` field.
pub const AUTHOR_SEPARATOR: &str = " and ";

/// Entry type given to freshly harvested records.
pub const DEFAULT_ENTRY_TYPE: &str = "article";

/// A bibliographic entry: an entry type plus named string fields.
///
/// The parser only ever writes fields. The citation key is left for the caller to assign; a
/// harvested record never carries one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  /// Entry type tag, e.g. `article`
  pub entry_type: String,
  /// Citation key, assigned by the caller if at all
  #[serde(default, skip_serializing_if = "Option::is_none")]
  citation_key:   Option<String>,
  /// Field values keyed by lower-cased field name
  #[serde(default)]
  fields:         BTreeMap<String, String>,
}

impl Record {
  /// Creates an empty record with the given entry type.
  pub fn new(entry_type: impl Into<String>) -> Self {
    Self { entry_type: entry_type.into(), citation_key: None, fields: BTreeMap::new() }
  }

  /// Reads a field. `None` means the field was never set.
  pub fn field(&self, name: &str) -> Option<&str> {
    self.fields.get(&name.to_lowercase()).map(String::as_str)
  }

  /// Whether the field is present, even if empty.
  pub fn has_field(&self, name: &str) -> bool { self.fields.contains_key(&name.to_lowercase()) }

  /// Sets a field, returning the value it replaced.
  pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
    self.fields.insert(name.to_lowercase(), value.into())
  }

  /// Appends `value` to a field, inserting `separator` if the field already has content.
  pub fn append_field(&mut self, name: &str, value: &str, separator: &str) {
    match self.fields.get_mut(&name.to_lowercase()) {
      Some(existing) if !existing.is_empty() => {
        existing.push_str(separator);
        existing.push_str(value);
      },
      Some(existing) => existing.push_str(value),
      None => {
        self.fields.insert(name.to_lowercase(), value.to_string());
      },
    }
  }

  /// Removes a field, returning its value.
  pub fn clear_field(&mut self, name: &str) -> Option<String> {
    self.fields.remove(&name.to_lowercase())
  }

  /// Iterates over `(name, value)` pairs in name order.
  pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
    self.fields.iter().map(|(name, value)| (name.as_str(), value.as_str()))
  }

  /// Number of fields set.
  pub fn len(&self) -> usize { self.fields.len() }

  /// Whether no field has been set.
  pub fn is_empty(&self) -> bool { self.fields.is_empty() }

  /// The citation key, if the caller assigned one.
  pub fn citation_key(&self) -> Option<&str> { self.citation_key.as_deref() }

  /// Assigns a citation key.
  pub fn set_citation_key(&mut self, key: impl Into<String>) { self.citation_key = Some(key.into()); }
}

impl Default for Record {
  fn default() -> Self { Self::new(DEFAULT_ENTRY_TYPE) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_field_names_are_case_insensitive() {
    let mut record = Record::default();
    record.set_field("Title", "First");
    assert_eq!(record.set_field("TITLE", "Second"), Some("First".to_string()));
    assert_eq!(record.field("title"), Some("Second"));
    assert_eq!(record.len(), 1);
  }

  #[test]
  fn test_absent_is_not_empty() {
    let mut record = Record::default();
    assert_eq!(record.field(field::COMMENT), None);
    assert!(!record.has_field(field::COMMENT));

    record.set_field(field::COMMENT, "");
    assert_eq!(record.field(field::COMMENT), Some(""));
    assert!(record.has_field(field::COMMENT));

    assert_eq!(record.clear_field(field::COMMENT), Some(String::new()));
    assert_eq!(record.field(field::COMMENT), None);
  }

  #[test]
  fn test_append_field() {
    let mut record = Record::default();
    record.append_field(field::AUTHOR, "Javier López Peña", AUTHOR_SEPARATOR);
    record.append_field(field::AUTHOR, "Gabriel Navarro", AUTHOR_SEPARATOR);
    assert_eq!(record.field(field::AUTHOR), Some("Javier López Peña and Gabriel Navarro"));

    record.set_field(field::PAGES, "");
    record.append_field(field::PAGES, "511-525", AUTHOR_SEPARATOR);
    assert_eq!(record.field(field::PAGES), Some("511-525"));
  }

  #[test]
  fn test_new_record_has_no_citation_key() {
    let mut record = Record::new("misc");
    assert_eq!(record.entry_type, "misc");
    assert_eq!(record.citation_key(), None);
    assert!(record.is_empty());

    record.set_citation_key("Giudice2005");
    assert_eq!(record.citation_key(), Some("Giudice2005"));
  }

  #[test]
  fn test_record_serialization() -> anyhow::Result<()> {
    let mut record = Record::default();
    record.set_field(field::EPRINT, "hep-ph/0408155");
    record.set_field(field::YEAR, "2005");

    let json = serde_json::to_value(&record)?;
    assert_eq!(
      json,
      serde_json::json!({
        "entry_type": "article",
        "fields": { "eprint": "hep-ph/0408155", "year": "2005" }
      })
    );

    let back: Record = serde_json::from_value(json)?;
    assert_eq!(back, record);
    Ok(())
  }
}
