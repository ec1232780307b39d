//! Reading and writing the experiment descriptor as an element tree.

use crate::error::{Result, SchemaError};
use crate::types::document::{XmlDocument, XmlElement};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

fn start_element(event: &BytesStart) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(event.name().as_ref()));
    for attr in event.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.get_or_insert_with(String::new).push_str(text);
    }
}

/// Closes `element`: attaches it to its parent, or makes it the root.
fn close_element(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Parses descriptor text into an owned element tree. Whitespace-only text is
/// dropped; comments, processing instructions and the declaration are ignored.
pub fn parse_document(text: &str) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    loop {
        match reader.read_event()? {
            Event::Start(ref e) => stack.push(start_element(e)?),
            Event::Empty(ref e) => {
                let element = start_element(e)?;
                close_element(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    close_element(&mut stack, &mut root, element);
                }
            }
            Event::Text(ref e) => push_text(&mut stack, &e.unescape()?),
            Event::CData(e) => push_text(&mut stack, &String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.first() {
        return Err(quick_xml::Error::UnexpectedEof(format!("unclosed <{}>", open.name)).into());
    }
    let root = root.ok_or(SchemaError::EmptyDocument)?;
    Ok(XmlDocument { root })
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Serializes a document with an XML declaration and two-space indentation.
pub fn write_document(document: &XmlDocument) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut writer, &document.root)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

impl XmlDocument {
    pub fn parse(text: &str) -> Result<Self> {
        parse_document(text)
    }

    pub fn to_xml_string(&self) -> Result<String> {
        write_document(self)
    }
}
