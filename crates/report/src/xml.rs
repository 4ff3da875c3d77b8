//! A small validating XML writer.
//!
//! The writer refuses, rather than silently repairs, any call sequence that
//! would produce malformed output: attributes after content, duplicate
//! attributes, writes after the root element closed. Elements with neither
//! content nor children close as self-closing tags. The prolog is written
//! automatically ahead of the first element.

use std::collections::HashSet;
use std::io::Write;

use crate::error::WriteError;

/// Where the writer is in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Nothing open yet.
    NoElement,
    /// The innermost start tag is still open; attributes are legal.
    ElementOpenNoContent,
    /// Elements are open but the innermost start tag is finished.
    ElementOpenWithContent,
    /// The root element has closed; only `close_document` is legal.
    DocumentClosed,
}

pub struct XmlWriter<W: Write> {
    out: W,
    state: WriterState,
    open_elements: Vec<String>,
    current_attributes: HashSet<String>,
    prolog_written: bool,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        XmlWriter {
            out,
            state: WriterState::NoElement,
            open_elements: Vec::new(),
            current_attributes: HashSet::new(),
            prolog_written: false,
        }
    }

    /// Whether any element has been opened yet.
    pub fn started(&self) -> bool {
        self.state != WriterState::NoElement
    }

    /// Open an element as a child of the current one, or as the root.
    pub fn open_element(&mut self, name: &str) -> Result<(), WriteError> {
        if self.state == WriterState::DocumentClosed {
            return Err(WriteError::OperationNotAllowed(
                "root element already closed",
            ));
        }
        validate_name(name)?;
        if !self.prolog_written {
            self.out.write_all(b"<?xml version='1.0'?>")?;
            self.prolog_written = true;
        }
        if self.state == WriterState::ElementOpenNoContent {
            self.out.write_all(b">")?;
        }
        write!(self.out, "<{name}")?;
        self.open_elements.push(name.to_string());
        self.current_attributes.clear();
        self.state = WriterState::ElementOpenNoContent;
        Ok(())
    }

    /// Write one attribute on the element just opened.
    pub fn attribute(&mut self, name: &str, value: &str) -> Result<(), WriteError> {
        match self.state {
            WriterState::ElementOpenNoContent => {}
            WriterState::ElementOpenWithContent => {
                return Err(WriteError::AttributeAfterContent(name.to_string()))
            }
            WriterState::NoElement => return Err(WriteError::NoOpenElement),
            WriterState::DocumentClosed => {
                return Err(WriteError::OperationNotAllowed(
                    "root element already closed",
                ))
            }
        }
        validate_name(name)?;
        if !self.current_attributes.insert(name.to_string()) {
            return Err(WriteError::DuplicateAttribute(name.to_string()));
        }
        write!(self.out, " {name}='{}'", escape(value, true))?;
        Ok(())
    }

    /// Write text content into the current element.
    pub fn content(&mut self, text: &str) -> Result<(), WriteError> {
        match self.state {
            WriterState::ElementOpenNoContent => self.out.write_all(b">")?,
            WriterState::ElementOpenWithContent => {}
            WriterState::NoElement => return Err(WriteError::NoOpenElement),
            WriterState::DocumentClosed => {
                return Err(WriteError::OperationNotAllowed(
                    "root element already closed",
                ))
            }
        }
        write!(self.out, "{}", escape(text, false))?;
        self.state = WriterState::ElementOpenWithContent;
        Ok(())
    }

    /// Close the innermost open element, self-closing if it got neither
    /// content nor children.
    pub fn close_element(&mut self) -> Result<(), WriteError> {
        match self.state {
            WriterState::NoElement => return Err(WriteError::NoOpenElement),
            WriterState::DocumentClosed => {
                return Err(WriteError::OperationNotAllowed(
                    "root element already closed",
                ))
            }
            _ => {}
        }
        let name = match self.open_elements.pop() {
            Some(name) => name,
            None => return Err(WriteError::NoOpenElement),
        };
        if self.state == WriterState::ElementOpenNoContent {
            self.out.write_all(b"/>")?;
        } else {
            write!(self.out, "</{name}>")?;
        }
        self.out.flush()?;
        self.state = if self.open_elements.is_empty() {
            WriterState::DocumentClosed
        } else {
            WriterState::ElementOpenWithContent
        };
        Ok(())
    }

    /// Close all pending elements and flush. Safe to call again once the
    /// document is closed; an error before anything was written.
    pub fn close_document(&mut self) -> Result<(), WriteError> {
        if self.state == WriterState::NoElement {
            return Err(WriteError::NothingWritten);
        }
        while !self.open_elements.is_empty() {
            self.close_element()?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Escape `text` for body or attribute position. Characters XML forbids
/// outright are replaced with `?` instead of corrupting the document.
fn escape(text: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' if attribute => escaped.push_str("&apos;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ if permitted(ch) => escaped.push(ch),
            _ => escaped.push('?'),
        }
    }
    escaped
}

fn permitted(ch: char) -> bool {
    matches!(
        u32::from(ch),
        0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x1_0000..=0x10_FFFF
    )
}

fn validate_name(name: &str) -> Result<(), WriteError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == ':')
                && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_' | ':'))
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(WriteError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(writer: XmlWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn writes_nested_elements_with_attributes_and_content() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("report").unwrap();
        writer.attribute("version", "1").unwrap();
        writer.open_element("entry").unwrap();
        writer.attribute("name", "a").unwrap();
        writer.content("body").unwrap();
        writer.close_element().unwrap();
        writer.close_element().unwrap();
        assert_eq!(
            output(writer),
            "<?xml version='1.0'?><report version='1'><entry name='a'>body</entry></report>"
        );
    }

    #[test]
    fn element_without_content_self_closes() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("report").unwrap();
        writer.open_element("empty").unwrap();
        writer.attribute("name", "x").unwrap();
        writer.close_element().unwrap();
        writer.close_element().unwrap();
        assert_eq!(
            output(writer),
            "<?xml version='1.0'?><report><empty name='x'/></report>"
        );
    }

    #[test]
    fn attribute_after_content_is_an_error() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("report").unwrap();
        writer.content("body").unwrap();
        let err = writer.attribute("late", "1").unwrap_err();
        assert!(matches!(err, WriteError::AttributeAfterContent(name) if name == "late"));
    }

    #[test]
    fn attribute_after_child_is_an_error() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("report").unwrap();
        writer.open_element("child").unwrap();
        writer.close_element().unwrap();
        assert!(matches!(
            writer.attribute("late", "1"),
            Err(WriteError::AttributeAfterContent(_))
        ));
    }

    #[test]
    fn duplicate_attribute_is_an_error() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("report").unwrap();
        writer.attribute("name", "a").unwrap();
        let err = writer.attribute("name", "b").unwrap_err();
        assert!(matches!(err, WriteError::DuplicateAttribute(name) if name == "name"));
    }

    #[test]
    fn same_attribute_on_sibling_elements_is_fine() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("report").unwrap();
        writer.open_element("a").unwrap();
        writer.attribute("name", "1").unwrap();
        writer.close_element().unwrap();
        writer.open_element("b").unwrap();
        writer.attribute("name", "2").unwrap();
        writer.close_element().unwrap();
        writer.close_element().unwrap();
        assert_eq!(
            output(writer),
            "<?xml version='1.0'?><report><a name='1'/><b name='2'/></report>"
        );
    }

    #[test]
    fn nothing_is_allowed_after_the_root_closes() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("report").unwrap();
        writer.close_element().unwrap();
        assert!(matches!(
            writer.open_element("again"),
            Err(WriteError::OperationNotAllowed(_))
        ));
        assert!(matches!(
            writer.content("text"),
            Err(WriteError::OperationNotAllowed(_))
        ));
        assert!(matches!(
            writer.close_element(),
            Err(WriteError::OperationNotAllowed(_))
        ));
    }

    #[test]
    fn close_document_closes_all_pending_elements() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("a").unwrap();
        writer.open_element("b").unwrap();
        writer.open_element("c").unwrap();
        writer.content("deep").unwrap();
        writer.close_document().unwrap();
        // Safe to call again on a closed document.
        writer.close_document().unwrap();
        assert_eq!(
            output(writer),
            "<?xml version='1.0'?><a><b><c>deep</c></b></a>"
        );
    }

    #[test]
    fn close_document_before_any_element_is_an_error() {
        let mut writer = XmlWriter::new(Vec::new());
        assert!(matches!(
            writer.close_document(),
            Err(WriteError::NothingWritten)
        ));
    }

    #[test]
    fn escapes_content_and_attribute_values() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("e").unwrap();
        writer.attribute("q", "a'b\"c<d").unwrap();
        writer.content("x & y < z > w").unwrap();
        writer.close_element().unwrap();
        assert_eq!(
            output(writer),
            "<?xml version='1.0'?><e q='a&apos;b&quot;c&lt;d'>x &amp; y &lt; z &gt; w</e>"
        );
    }

    #[test]
    fn quotes_stay_literal_in_body_content() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("e").unwrap();
        writer.content("keep 'these' \"quotes\"").unwrap();
        writer.close_element().unwrap();
        assert_eq!(
            output(writer),
            "<?xml version='1.0'?><e>keep 'these' \"quotes\"</e>"
        );
    }

    #[test]
    fn forbidden_characters_become_question_marks() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.open_element("e").unwrap();
        writer.content("a\u{0}b\u{8}c\td").unwrap();
        writer.close_element().unwrap();
        assert_eq!(output(writer), "<?xml version='1.0'?><e>a?b?c\td</e>");
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut writer = XmlWriter::new(Vec::new());
        assert!(matches!(
            writer.open_element("1starts-with-digit"),
            Err(WriteError::InvalidName(_))
        ));
        assert!(matches!(
            writer.open_element(""),
            Err(WriteError::InvalidName(_))
        ));
        writer.open_element("ok").unwrap();
        assert!(matches!(
            writer.attribute("bad name", "x"),
            Err(WriteError::InvalidName(_))
        ));
    }
}
