//! XML reading utilities for the SpreadsheetML parts of an xlsx package

use crate::error::FinsheetError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// Event reader over one XML part, reusing a single buffer
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        // <c r="A1"/> must produce Start + End so empty cells close like full ones
        config.expand_empty_elements = true;
        config.trim_text(false);

        XmlReader { reader, buffer: Vec::with_capacity(1024) }
    }

    /// Reads the next XML event, `None` at end of document
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, FinsheetError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(FinsheetError::XmlError(error)),
        }
    }
}

/// Attribute lookup on start tags
pub(crate) trait XmlNodeHelper<'a> {
    /// Gets an unescaped attribute value by name
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, FinsheetError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, FinsheetError> {
        match self.try_get_attribute(name)? {
            Some(attribute) => Ok(Some(attribute.unescape_value()?)),
            None => Ok(None),
        }
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends an entity or character reference (`&amp;`, `&#10;`, `&#x41;`)
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), FinsheetError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), FinsheetError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16)?,
                None => number.parse::<u32>()?,
            };
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }
        Ok(())
    }
}

/// Drives an [`XmlReader`] to the end of the document, dispatching each event
/// to the given match arms. Unmatched events are ignored; `break` stops early.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_text(xml: &str) -> String {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut text = String::new();
        let mut collect = || -> Result<(), FinsheetError> {
            match_xml_events!(reader => {
                Event::Text(event) => text.push_str(&event.xml_content()?),
                Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
            });
            Ok(())
        };
        collect().unwrap();
        text
    }

    #[test]
    fn resolves_entities_and_character_references() {
        assert_eq!(collect_text("<t>Cost &amp; Sales</t>"), "Cost & Sales");
        assert_eq!(collect_text("<t>&#65;&#x42;C</t>"), "ABC");
    }

    #[test]
    fn reads_attribute_values() {
        let mut reader = XmlReader::new(r#"<c r="B3" t="s"/>"#.as_bytes());
        let event = reader.next().unwrap().unwrap();
        match event {
            Event::Start(start) => {
                assert_eq!(start.get_attribute_value("r").unwrap().as_deref(), Some("B3"));
                assert_eq!(start.get_attribute_value("t").unwrap().as_deref(), Some("s"));
                assert_eq!(start.get_attribute_value("s").unwrap(), None);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
