//! Metadata dialects and their element tables.
//!
//! Each dialect is a small table from element name to a [`FieldRule`]. The wrapper element that
//! opens the metadata block decides the dialect once; after that only that table is consulted.

use chrono::Month;
use lazy_static::lazy_static;
use regex::Regex;

use super::*;

/// A metadata vocabulary that can appear inside an OAI-PMH `<metadata>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
  /// arXiv's own format (`metadataPrefix=arXiv`), wrapper `<arXiv>`
  Arxiv,
  /// Simple Dublin Core (`oai_dc`), wrapper `<oai_dc:dc>`
  DublinCore,
  /// Qualified Dublin Core, wrapper `<qdc:qualifieddc>`
  QualifiedDublinCore,
}

/// What to do with the text of an element once it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
  /// Identifier, stored in `eprint` after [`fix_key`]
  Eprint,
  /// Free text stored in the named field after [`normalize_text`]
  Text(&'static str),
  /// Value stored trimmed but otherwise untouched
  Verbatim(&'static str),
  /// `keyname` part of a structured author
  Keyname,
  /// `forenames` part of a structured author
  Forenames,
  /// `suffix` part of a structured author
  Suffix,
  /// End of a structured author; the collected parts are appended to `author`
  AuthorEnd,
  /// A creator written `Last, First`, appended to `author` as `First Last`
  Creator,
  /// A journal reference to split into journal, volume, year and pages
  JournalRef,
  /// A date whose year (and month) are used unless a year is already known
  Date,
  /// A Dublin Core identifier: an arXiv URL, a DOI or a journal reference
  Identifier,
  /// A Dublin Core description: the abstract, or a `Comment:` line
  Description,
}

/// Element table of [`Dialect::Arxiv`].
const ARXIV_RULES: &[(&str, FieldRule)] = &[
  ("id", FieldRule::Eprint),
  ("keyname", FieldRule::Keyname),
  ("forenames", FieldRule::Forenames),
  ("suffix", FieldRule::Suffix),
  ("author", FieldRule::AuthorEnd),
  ("title", FieldRule::Text(field::TITLE)),
  ("abstract", FieldRule::Text(field::ABSTRACT)),
  ("comments", FieldRule::Text(field::COMMENT)),
  ("report-no", FieldRule::Text(field::REPORTNO)),
  ("journal-ref", FieldRule::JournalRef),
  ("doi", FieldRule::Verbatim(field::DOI)),
  ("created", FieldRule::Date),
];

/// Element table of [`Dialect::DublinCore`].
const DUBLIN_CORE_RULES: &[(&str, FieldRule)] = &[
  ("title", FieldRule::Text(field::TITLE)),
  ("creator", FieldRule::Creator),
  ("description", FieldRule::Description),
  ("date", FieldRule::Date),
  ("identifier", FieldRule::Identifier),
];

/// Element table of [`Dialect::QualifiedDublinCore`].
const QUALIFIED_DUBLIN_CORE_RULES: &[(&str, FieldRule)] = &[
  ("title", FieldRule::Text(field::TITLE)),
  ("creator", FieldRule::Creator),
  ("abstract", FieldRule::Text(field::ABSTRACT)),
  ("description", FieldRule::Description),
  ("issued", FieldRule::Date),
  ("date", FieldRule::Date),
  ("identifier", FieldRule::Identifier),
  ("bibliographicCitation", FieldRule::JournalRef),
];

impl Dialect {
  /// Recognizes the wrapper element that opens a metadata block.
  pub fn detect(element: &str) -> Option<Self> {
    match element {
      "arXiv" => Some(Dialect::Arxiv),
      "dc" => Some(Dialect::DublinCore),
      "qualifieddc" => Some(Dialect::QualifiedDublinCore),
      _ => None,
    }
  }

  /// Looks up the rule for an element of this dialect.
  pub fn rule(self, element: &str) -> Option<FieldRule> {
    let table = match self {
      Dialect::Arxiv => ARXIV_RULES,
      Dialect::DublinCore => DUBLIN_CORE_RULES,
      Dialect::QualifiedDublinCore => QUALIFIED_DUBLIN_CORE_RULES,
    };
    table.iter().find(|(name, _)| *name == element).map(|(_, rule)| *rule)
  }
}

impl std::fmt::Display for Dialect {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Dialect::Arxiv => write!(f, "arXiv"),
      Dialect::DublinCore => write!(f, "Dublin Core"),
      Dialect::QualifiedDublinCore => write!(f, "qualified Dublin Core"),
    }
  }
}

lazy_static! {
    /// `Journal Volume (Year) Pages`
    static ref JOURNAL_REF: Regex =
      Regex::new(r"^(?P<journal>[^0-9]*?)\s*(?P<volume>\d+)\s*\((?P<year>\d{4})\)\s*(?P<pages>.*)$")
        .unwrap();
    /// A plausible publication year
    static ref YEAR: Regex = Regex::new(r"\b((?:19|20)\d{2})\b").unwrap();
    /// `YYYY` with an optional `-MM`
    static ref DATE: Regex = Regex::new(r"^\s*(\d{4})(?:-(\d{2}))?").unwrap();
    /// arXiv abstract page
    static ref ARXIV_URL: Regex = Regex::new(r"^https?://(?:www\.|export\.)?arxiv\.org/abs/(.+)$").unwrap();
    /// Bare, `doi:` prefixed or resolver URL DOI
    static ref DOI: Regex = Regex::new(r"^(?:doi:\s*|https?://(?:dx\.)?doi\.org/)?(10\.\d{4,9}/\S+)$").unwrap();
}

/// The parts of a journal reference such as `Nucl.Phys. B710 (2005) 511-525`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRef {
  /// Journal name, `Nucl.Phys. B`
  pub journal: String,
  /// Volume, `710`
  pub volume:  Option<String>,
  /// Year, `2005`
  pub year:    Option<String>,
  /// Pages with whitespace removed, `511-525`
  pub pages:   Option<String>,
}

impl JournalRef {
  /// Splits a journal reference.
  ///
  /// References of the form `Journal Volume (Year) Pages` are split into their parts. Anything
  /// else is kept whole as the journal name, with the first plausible year picked out of it.
  pub fn parse(text: &str) -> Self {
    let text = normalize_text(text).replace('\n', " ");
    if let Some(caps) = JOURNAL_REF.captures(&text) {
      let pages: String = caps["pages"].chars().filter(|c| !c.is_whitespace()).collect();
      return Self {
        journal: caps["journal"].trim().to_string(),
        volume:  Some(caps["volume"].to_string()),
        year:    Some(caps["year"].to_string()),
        pages:   (!pages.is_empty()).then_some(pages),
      };
    }

    Self {
      year:    YEAR.captures(&text).map(|caps| caps[1].to_string()),
      journal: text,
      volume:  None,
      pages:   None,
    }
  }

  /// Whether `text` has the `Journal Volume (Year) Pages` shape.
  pub fn is_structured(text: &str) -> bool { JOURNAL_REF.is_match(text.trim()) }
}

/// Extracts the year and, when present, the BibTeX month token from a date.
///
/// `2007-09-19` gives `("2007", Some("#sep#"))`, `2005` gives `("2005", None)`.
pub fn parse_date(text: &str) -> Option<(String, Option<String>)> {
  let caps = DATE.captures(text)?;
  let month = caps.get(2).and_then(|m| m.as_str().parse::<u8>().ok()).and_then(month_token);
  Some((caps[1].to_string(), month))
}

/// Renders a month number as a BibTeX month macro, e.g. `9` as `#sep#`.
pub fn month_token(month: u8) -> Option<String> {
  let month = Month::try_from(month).ok()?;
  Some(format!("#{}#", &month.name()[..3].to_lowercase()))
}

/// Turns `Last, First` into `First Last`; names without a comma are kept.
pub fn uninvert_name(name: &str) -> String {
  let name = normalize_text(name).replace('\n', " ");
  match name.split_once(',') {
    Some((last, first)) if !first.trim().is_empty() => format!("{} {}", first.trim(), last.trim()),
    Some((last, _)) => last.trim().to_string(),
    None => name,
  }
}

/// What a Dublin Core `identifier` value refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierValue {
  /// An arXiv abstract page, holding the identifier
  Eprint(String),
  /// A DOI
  Doi(String),
  /// A journal reference
  JournalRef(String),
}

/// Classifies a Dublin Core `identifier` value.
pub fn classify_identifier(text: &str) -> Option<IdentifierValue> {
  let text = text.trim();
  if let Some(caps) = ARXIV_URL.captures(text) {
    Some(IdentifierValue::Eprint(caps[1].to_string()))
  } else if let Some(caps) = DOI.captures(text) {
    Some(IdentifierValue::Doi(caps[1].to_string()))
  } else if JournalRef::is_structured(text) {
    Some(IdentifierValue::JournalRef(text.to_string()))
  } else {
    None
  }
}
