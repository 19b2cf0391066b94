//! Pull-style XML event source.
//!
//! [`XmlEvents`] wraps a `quick_xml` reader and yields the three event kinds the metadata fold
//! cares about. Names are namespace-local, so `<dc:creator>` and `<creator>` produce the same
//! event.

use std::io::BufRead;

use quick_xml::{
  events::{BytesEnd, BytesStart, Event},
  Reader,
};

use super::*;

/// A single structural event of an XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
  /// An element was opened
  Open(String),
  /// Character data inside the innermost open element, already unescaped
  Text(String),
  /// An element was closed
  Close(String),
}

/// Iterator over the [`XmlEvent`]s of a document.
///
/// Self-closing elements produce an `Open` immediately followed by a `Close`. Comments,
/// processing instructions and the XML declaration are skipped. The first reader error ends
/// the iteration.
pub struct XmlEvents<R> {
  /// Underlying reader
  reader:        Reader<R>,
  /// Scratch buffer reused between reads
  buf:           Vec<u8>,
  /// `Close` still owed for a self-closing element
  pending_close: Option<String>,
  /// Set after end of input or an error
  done:          bool,
}

impl<R: BufRead> XmlEvents<R> {
  /// Starts reading events from `reader`.
  pub fn new(reader: R) -> Self {
    Self { reader: Reader::from_reader(reader), buf: Vec::new(), pending_close: None, done: false }
  }

  /// Reads the next raw event and converts it, skipping events that carry no structure.
  fn read_next(&mut self) -> Result<Option<XmlEvent>> {
    loop {
      self.buf.clear();
      let event = match self.reader.read_event_into(&mut self.buf)? {
        Event::Start(e) => XmlEvent::Open(start_name(&e)),
        Event::Empty(e) => {
          let name = start_name(&e);
          self.pending_close = Some(name.clone());
          XmlEvent::Open(name)
        },
        Event::End(e) => XmlEvent::Close(end_name(&e)),
        Event::Text(e) => XmlEvent::Text(e.unescape().map_err(quick_xml::Error::from)?.into_owned()),
        Event::CData(e) => XmlEvent::Text(String::from_utf8_lossy(&e.into_inner()).into_owned()),
        Event::Eof => return Ok(None),
        _ => continue,
      };
      return Ok(Some(event));
    }
  }
}

impl<R: BufRead> Iterator for XmlEvents<R> {
  type Item = Result<XmlEvent>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(name) = self.pending_close.take() {
      return Some(Ok(XmlEvent::Close(name)));
    }
    if self.done {
      return None;
    }

    match self.read_next() {
      Ok(Some(event)) => Some(Ok(event)),
      Ok(None) => {
        self.done = true;
        None
      },
      Err(e) => {
        self.done = true;
        Some(Err(e))
      },
    }
  }
}

/// Namespace-local name of an opening tag.
fn start_name(e: &BytesStart<'_>) -> String {
  String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Namespace-local name of a closing tag.
fn end_name(e: &BytesEnd<'_>) -> String {
  String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}
