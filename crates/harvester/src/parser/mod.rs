//! Streaming parser that folds an OAI-PMH `GetRecord` response into a [`Record`].
//!
//! The parser is an explicit state machine driven by [`XmlEvent`]s. It keeps the path of open
//! elements, a text buffer per open element, and the detected [`Dialect`]. When an element
//! closes, its text is handed to the rule the dialect table gives for that element and then
//! appended to its parent's text, so inline markup such as `<i>` keeps its words.
//!
//! Outside the metadata block the parser still reads the OAI-PMH envelope: the header
//! `identifier` and `datestamp` serve as fallbacks for `eprint` and `year`, and an `<error>`
//! element aborts the parse with [`HarvesterError::Repository`].
//!
//! # Examples
//!
//! ```
//! use harvester::{parser, record::field, Record};
//!
//! let xml = r#"<record><metadata><arXiv><id>math.RA/0612188</id>
//!   <title>On the classification and properties
//!   of noncommutative duplicates</title></arXiv></metadata></record>"#;
//!
//! let mut record = Record::default();
//! parser::parse_str(xml, &mut record).unwrap();
//! assert_eq!(record.field(field::EPRINT), Some("math/0612188"));
//! assert_eq!(
//!   record.field(field::TITLE),
//!   Some("On the classification and properties of noncommutative duplicates")
//! );
//! ```

use std::io::BufRead;

use quick_xml::errors::IllFormedError;

use super::*;
use crate::{
  format::normalize_text,
  record::{field, AUTHOR_SEPARATOR},
};

pub mod dialect;
pub mod events;

pub use dialect::{Dialect, FieldRule};
use dialect::{classify_identifier, parse_date, uninvert_name, IdentifierValue, JournalRef};
pub use events::{XmlEvent, XmlEvents};

/// Where the parser is relative to the record being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  /// No metadata block seen yet; only envelope elements are read
  OutsideRecord,
  /// Inside a metadata block of the given dialect
  InRecord(Dialect),
  /// The `record` element has closed; later events are only checked for structure
  Finished,
}

/// Parts of a structured author collected until `</author>`.
#[derive(Debug, Default)]
struct PendingAuthor {
  /// Family name
  keyname:   Option<String>,
  /// Given names or initials
  forenames: Option<String>,
  /// Suffix such as `Jr.`
  suffix:    Option<String>,
}

impl PendingAuthor {
  /// Renders `forenames keyname suffix` and resets the author.
  fn take_name(&mut self) -> Option<String> {
    let parts: Vec<String> =
      [self.forenames.take(), self.keyname.take(), self.suffix.take()].into_iter().flatten().collect();
    (!parts.is_empty()).then(|| parts.join(" "))
  }
}

/// Single-pass fold of [`XmlEvent`]s into a [`Record`].
///
/// A parser is used for one document: feed it every event in order, then call
/// [`finish`](MetadataParser::finish), which consumes it.
#[derive(Debug)]
pub struct MetadataParser {
  /// Current position relative to the record
  state:             State,
  /// Names of the currently open elements, outermost first
  path:              Vec<String>,
  /// Character data of each open element, parallel to `path`
  text:              Vec<String>,
  /// Structured author being assembled
  author:            PendingAuthor,
  /// Identifier from the OAI header, minus the `oai:<archive>:` prefix
  header_identifier: Option<String>,
  /// Datestamp from the OAI header
  datestamp:         Option<String>,
  /// Year taken from a date element, to tell whether a journal reference disagrees
  date_year:         Option<String>,
  /// Whether any element was seen at all
  seen_root:         bool,
}

impl MetadataParser {
  /// Creates a parser in the [`State::OutsideRecord`] state.
  pub fn new() -> Self {
    Self {
      state:             State::OutsideRecord,
      path:              Vec::new(),
      text:              Vec::new(),
      author:            PendingAuthor::default(),
      header_identifier: None,
      datestamp:         None,
      date_year:         None,
      seen_root:         false,
    }
  }

  /// The current state.
  pub fn state(&self) -> State { self.state }

  /// Names of the currently open elements.
  pub fn path(&self) -> &[String] { &self.path }

  /// Applies one event to the parser and the record.
  ///
  /// # Errors
  ///
  /// - [`HarvesterError::MalformedResponse`] if a close event does not match the innermost open
  ///   element;
  /// - [`HarvesterError::Repository`] when the document carries an OAI-PMH `<error>`.
  pub fn feed(&mut self, event: XmlEvent, record: &mut Record) -> Result<()> {
    match event {
      XmlEvent::Open(name) => {
        self.seen_root = true;
        if self.state == State::OutsideRecord {
          if let Some(dialect) = Dialect::detect(&name) {
            debug!("Detected {dialect} metadata");
            self.state = State::InRecord(dialect);
          }
        }
        self.path.push(name);
        self.text.push(String::new());
      },
      XmlEvent::Text(text) =>
        if let Some(buffer) = self.text.last_mut() {
          buffer.push_str(&text);
        },
      XmlEvent::Close(name) => {
        match self.path.pop() {
          Some(open) if open == name => {},
          Some(open) => {
            return Err(
              quick_xml::Error::IllFormed(IllFormedError::MismatchedEndTag {
                expected: open,
                found:    name,
              })
              .into(),
            )
          },
          None => return Err(quick_xml::Error::IllFormed(IllFormedError::UnmatchedEndTag(name)).into()),
        }

        let text = self.text.pop().unwrap_or_default();
        self.close_element(&name, text.trim(), record)?;
        if let Some(parent) = self.text.last_mut() {
          parent.push_str(&text);
        }
      },
    }
    Ok(())
  }

  /// Completes the parse, applying envelope fallbacks.
  ///
  /// # Errors
  ///
  /// Returns [`HarvesterError::EmptyResponse`] if no element was ever fed, and
  /// [`HarvesterError::MalformedResponse`] if elements are still open.
  pub fn finish(mut self, record: &mut Record) -> Result<()> {
    if !self.seen_root {
      return Err(HarvesterError::EmptyResponse);
    }
    if let Some(open) = self.path.pop() {
      return Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(open)).into());
    }
    self.apply_fallbacks(record);
    Ok(())
  }

  /// Dispatches the text of a closed element according to the current state.
  fn close_element(&mut self, name: &str, text: &str, record: &mut Record) -> Result<()> {
    match self.state {
      State::InRecord(dialect) => {
        if let Some(rule) = dialect.rule(name) {
          self.apply_rule(rule, text, record);
        }
        if name == "record" {
          self.apply_fallbacks(record);
          self.state = State::Finished;
        }
      },
      State::OutsideRecord => match name {
        "error" => return Err(HarvesterError::Repository(text.to_string())),
        "identifier" if !text.is_empty() => {
          let id = text.splitn(3, ':').nth(2).unwrap_or(text);
          self.header_identifier = Some(id.to_string());
        },
        "datestamp" if !text.is_empty() => self.datestamp = Some(text.to_string()),
        "record" => {
          self.apply_fallbacks(record);
          self.state = State::Finished;
        },
        _ => {},
      },
      State::Finished => {},
    }
    Ok(())
  }

  /// Stores `text` on the record as `rule` says.
  fn apply_rule(&mut self, rule: FieldRule, text: &str, record: &mut Record) {
    // composite authors close with no text of their own
    if text.is_empty() && rule != FieldRule::AuthorEnd {
      return;
    }
    trace!("Applying {rule:?} to {text:?}");

    match rule {
      FieldRule::Eprint => {
        record.set_field(field::EPRINT, fix_key(text));
      },
      FieldRule::Text(name) => {
        record.set_field(name, normalize_text(text));
      },
      FieldRule::Verbatim(name) => {
        record.set_field(name, text);
      },
      FieldRule::Keyname => self.author.keyname = Some(normalize_text(text)),
      FieldRule::Forenames => self.author.forenames = Some(normalize_text(text)),
      FieldRule::Suffix => self.author.suffix = Some(normalize_text(text)),
      FieldRule::AuthorEnd =>
        if let Some(name) = self.author.take_name() {
          record.append_field(field::AUTHOR, &name, AUTHOR_SEPARATOR);
        },
      FieldRule::Creator => {
        record.append_field(field::AUTHOR, &uninvert_name(text), AUTHOR_SEPARATOR);
      },
      FieldRule::JournalRef => self.apply_journal_ref(text, record),
      FieldRule::Date => self.apply_date(text, record),
      FieldRule::Identifier => match classify_identifier(text) {
        Some(IdentifierValue::Eprint(id)) => {
          record.set_field(field::EPRINT, fix_key(&id));
        },
        Some(IdentifierValue::Doi(doi)) => {
          record.set_field(field::DOI, doi);
        },
        Some(IdentifierValue::JournalRef(reference)) => self.apply_journal_ref(&reference, record),
        None => trace!("Ignoring identifier {text:?}"),
      },
      FieldRule::Description => match text.strip_prefix("Comment:") {
        Some(comment) => {
          record.set_field(field::COMMENT, normalize_text(comment));
        },
        None =>
          if !record.has_field(field::ABSTRACT) {
            record.set_field(field::ABSTRACT, normalize_text(text));
          },
      },
    }
  }

  /// Splits a journal reference into journal, volume, pages and year.
  fn apply_journal_ref(&mut self, text: &str, record: &mut Record) {
    let reference = JournalRef::parse(text);
    if !reference.journal.is_empty() {
      record.set_field(field::JOURNAL, reference.journal);
    }
    if let Some(volume) = reference.volume {
      record.set_field(field::VOLUME, volume);
    }
    if let Some(pages) = reference.pages {
      record.set_field(field::PAGES, pages);
    }
    if let Some(year) = reference.year {
      if self.date_year.as_deref().is_some_and(|date_year| date_year != year) {
        record.clear_field(field::MONTH);
      }
      record.set_field(field::YEAR, year);
    }
  }

  /// Takes year and month from a date unless a year is already known.
  fn apply_date(&mut self, text: &str, record: &mut Record) {
    if record.has_field(field::YEAR) {
      return;
    }
    if let Some((year, month)) = parse_date(text) {
      self.date_year = Some(year.clone());
      record.set_field(field::YEAR, year);
      if let Some(month) = month {
        record.set_field(field::MONTH, month);
      }
    }
  }

  /// Fills `eprint` and `year` from the OAI header when the metadata lacked them.
  fn apply_fallbacks(&mut self, record: &mut Record) {
    if !record.has_field(field::EPRINT) {
      if let Some(id) = self.header_identifier.take() {
        debug!("Using header identifier {id} as eprint");
        record.set_field(field::EPRINT, fix_key(&id));
      }
    }
    if !record.has_field(field::YEAR) {
      if let Some((year, _)) = self.datestamp.take().as_deref().and_then(parse_date) {
        debug!("Using header datestamp year {year}");
        record.set_field(field::YEAR, year);
      }
    }
  }
}

impl Default for MetadataParser {
  fn default() -> Self { Self::new() }
}

/// Parses a whole document from `reader` into `record`.
///
/// Fields set before a failure stay on the record, but an error means the record is not a
/// faithful copy of the document.
pub fn parse<R: BufRead>(reader: R, record: &mut Record) -> Result<()> {
  let mut parser = MetadataParser::new();
  for event in XmlEvents::new(reader) {
    parser.feed(event?, record)?;
  }
  parser.finish(record)
}

/// Parses a document held in memory.
pub fn parse_str(xml: &str, record: &mut Record) -> Result<()> { parse(xml.as_bytes(), record) }

#[cfg(test)]
mod tests {
  use super::*;

  fn open(name: &str) -> XmlEvent { XmlEvent::Open(name.to_string()) }
  fn text(value: &str) -> XmlEvent { XmlEvent::Text(value.to_string()) }
  fn close(name: &str) -> XmlEvent { XmlEvent::Close(name.to_string()) }

  fn leaf(name: &str, value: &str) -> Vec<XmlEvent> { vec![open(name), text(value), close(name)] }

  fn fold(events: Vec<XmlEvent>) -> Result<Record> {
    let mut record = Record::default();
    let mut parser = MetadataParser::new();
    for event in events {
      parser.feed(event, &mut record)?;
    }
    parser.finish(&mut record)?;
    Ok(record)
  }

  #[test]
  fn test_fold_without_xml_engine() -> anyhow::Result<()> {
    let mut events = vec![open("arXiv")];
    events.extend(leaf("id", "math.QA/0601001"));
    events.extend([open("authors"), open("author")]);
    events.extend(leaf("keyname", "Navarro"));
    events.extend(leaf("forenames", "Gabriel"));
    events.extend([close("author"), close("authors")]);
    events.extend(leaf("comments", "12 pages,\n  2 figures"));
    events.push(close("arXiv"));

    let record = fold(events)?;
    assert_eq!(record.field(field::EPRINT), Some("math/0601001"));
    assert_eq!(record.field(field::AUTHOR), Some("Gabriel Navarro"));
    assert_eq!(record.field(field::COMMENT), Some("12 pages, 2 figures"));
    Ok(())
  }

  #[test]
  fn test_state_transitions() -> anyhow::Result<()> {
    let mut record = Record::default();
    let mut parser = MetadataParser::new();
    assert_eq!(parser.state(), State::OutsideRecord);

    parser.feed(open("record"), &mut record)?;
    parser.feed(open("metadata"), &mut record)?;
    assert_eq!(parser.state(), State::OutsideRecord);
    parser.feed(open("dc"), &mut record)?;
    assert_eq!(parser.state(), State::InRecord(Dialect::DublinCore));
    assert_eq!(parser.path(), ["record", "metadata", "dc"]);

    // a second wrapper never switches the dialect
    parser.feed(open("arXiv"), &mut record)?;
    parser.feed(close("arXiv"), &mut record)?;
    assert_eq!(parser.state(), State::InRecord(Dialect::DublinCore));

    parser.feed(close("dc"), &mut record)?;
    parser.feed(close("metadata"), &mut record)?;
    parser.feed(close("record"), &mut record)?;
    assert_eq!(parser.state(), State::Finished);
    assert!(parser.path().is_empty());
    parser.finish(&mut record)?;
    Ok(())
  }

  #[test]
  fn test_dialect_decides_mapping() -> anyhow::Result<()> {
    // `comments` means nothing in Dublin Core
    let mut events = vec![open("dc")];
    events.extend(leaf("comments", "ignored"));
    events.extend(leaf("creator", "Navarro, Gabriel"));
    events.push(close("dc"));

    let record = fold(events)?;
    assert_eq!(record.field(field::COMMENT), None);
    assert_eq!(record.field(field::AUTHOR), Some("Gabriel Navarro"));
    Ok(())
  }

  #[test]
  fn test_mismatched_close_is_malformed() {
    let err = fold(vec![open("arXiv"), open("id"), close("arXiv")]).unwrap_err();
    assert!(err.is_malformed_response());
  }

  #[test]
  fn test_unclosed_document_is_malformed() {
    let err = fold(vec![open("arXiv"), open("id")]).unwrap_err();
    assert!(err.is_malformed_response());
  }

  #[test]
  fn test_empty_document() {
    assert!(matches!(fold(Vec::new()), Err(HarvesterError::EmptyResponse)));
    let mut record = Record::default();
    assert!(matches!(parse_str("   ", &mut record), Err(HarvesterError::EmptyResponse)));
  }

  #[test]
  fn test_fields_survive_a_failure() {
    let mut record = Record::default();
    let result = parse_str("<arXiv><id>hep-ph/0408155</id><title>Heavy</arXiv>", &mut record);
    assert!(result.unwrap_err().is_malformed_response());
    assert_eq!(record.field(field::EPRINT), Some("hep-ph/0408155"));
    assert_eq!(record.field(field::TITLE), None);
  }

  #[test]
  fn test_repository_error() {
    let xml = r#"<OAI-PMH><request verb="GetRecord">http://export.arxiv.org/oai2</request>
      <error code="idDoesNotExist">Malformed identifier</error></OAI-PMH>"#;
    let mut record = Record::default();
    match parse_str(xml, &mut record) {
      Err(HarvesterError::Repository(message)) => assert_eq!(message, "Malformed identifier"),
      other => panic!("expected a repository error, got {other:?}"),
    }
    assert!(record.is_empty());
  }

  #[test]
  fn test_date_does_not_override_year() -> anyhow::Result<()> {
    let mut events = vec![open("arXiv")];
    events.extend(leaf("created", "2004-08-13"));
    events.extend(leaf("journal-ref", "Nucl.Phys. B710 (2005) 511-525"));
    events.extend(leaf("created", "2003-01-01"));
    events.push(close("arXiv"));

    let record = fold(events)?;
    assert_eq!(record.field(field::YEAR), Some("2005"));
    // the month belonged to the 2004 submission date
    assert_eq!(record.field(field::MONTH), None);
    Ok(())
  }

  #[test]
  fn test_month_from_creation_date() -> anyhow::Result<()> {
    let mut events = vec![open("arXiv")];
    events.extend(leaf("id", "0709.3040"));
    events.extend(leaf("created", "2007-09-19"));
    events.push(close("arXiv"));

    let record = fold(events)?;
    assert_eq!(record.field(field::YEAR), Some("2007"));
    assert_eq!(record.field(field::MONTH), Some("#sep#"));
    Ok(())
  }

  #[test]
  fn test_header_fallbacks() -> anyhow::Result<()> {
    let mut events = vec![open("record"), open("header")];
    events.extend(leaf("identifier", "oai:arXiv.org:math.RA/0612188"));
    events.extend(leaf("datestamp", "2007-05-23"));
    events.extend([close("header"), open("metadata"), open("dc")]);
    events.extend(leaf("title", "Duplicates"));
    events.extend([close("dc"), close("metadata"), close("record")]);

    let record = fold(events)?;
    assert_eq!(record.field(field::EPRINT), Some("math/0612188"));
    assert_eq!(record.field(field::YEAR), Some("2007"));
    assert_eq!(record.field(field::MONTH), None);
    Ok(())
  }

  #[test]
  fn test_inline_markup_keeps_text() -> anyhow::Result<()> {
    let mut events = vec![open("arXiv"), open("title"), text("Heavy ")];
    events.extend(leaf("i", "x"));
    events.extend([text(" Particles"), close("title"), close("arXiv")]);

    let record = fold(events)?;
    assert_eq!(record.field(field::TITLE), Some("Heavy x Particles"));

    let mut record = Record::default();
    parse_str("<arXiv><title>Heavy <i>x</i> Particles</title></arXiv>", &mut record)?;
    assert_eq!(record.field(field::TITLE), Some("Heavy x Particles"));
    Ok(())
  }

  #[test]
  fn test_journal_ref_without_name() -> anyhow::Result<()> {
    let mut events = vec![open("arXiv")];
    events.extend(leaf("journal-ref", "710 (2005) 511-525"));
    events.push(close("arXiv"));

    let record = fold(events)?;
    assert_eq!(record.field(field::JOURNAL), None);
    assert_eq!(record.field(field::VOLUME), Some("710"));
    assert_eq!(record.field(field::YEAR), Some("2005"));
    assert_eq!(record.field(field::PAGES), Some("511-525"));
    Ok(())
  }

  #[test]
  fn test_doi_in_both_dialects() -> anyhow::Result<()> {
    let mut events = vec![open("arXiv")];
    events.extend(leaf("doi", "  10.1016/j.nuclphysb.2004.11.056 "));
    events.push(close("arXiv"));
    let record = fold(events)?;
    assert_eq!(record.field(field::DOI), Some("10.1016/j.nuclphysb.2004.11.056"));

    let mut events = vec![open("dc")];
    events.extend(leaf("identifier", "http://arxiv.org/abs/hep-ph/0408155"));
    events.extend(leaf("identifier", "doi:10.1016/j.nuclphysb.2004.11.056"));
    events.push(close("dc"));
    let record = fold(events)?;
    assert_eq!(record.field(field::EPRINT), Some("hep-ph/0408155"));
    assert_eq!(record.field(field::DOI), Some("10.1016/j.nuclphysb.2004.11.056"));
    Ok(())
  }

  #[test]
  fn test_description_split() -> anyhow::Result<()> {
    let mut events = vec![open("dc")];
    events.extend(leaf("description", "First abstract."));
    events.extend(leaf("description", "Comment: 23 pages"));
    events.extend(leaf("description", "A later description."));
    events.push(close("dc"));

    let record = fold(events)?;
    assert_eq!(record.field(field::ABSTRACT), Some("First abstract."));
    assert_eq!(record.field(field::COMMENT), Some("23 pages"));
    Ok(())
  }
}
