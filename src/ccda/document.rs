//! In-memory element tree for clinical documents
//!
//! Documents are small enough to hold entirely in memory, and the extraction
//! rules need to look around (e.g. from a narrative table row to the coded
//! entry that references it), so the event stream from `quick-xml` is folded
//! into a tree first. Names are kept namespace-local.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{IngestError, Result};

/// Local name of the root element of a clinical document
pub const ROOT_ELEMENT: &str = "ClinicalDocument";

/// An XML element with its attributes, child elements and direct text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    /// Namespace-local element name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the attribute with the given local name
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct text content, `None` when empty
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Text of this element and all descendants, joined by single spaces
    #[must_use]
    pub fn all_text(&self) -> Option<String> {
        let parts: Vec<&str> = std::iter::once(self)
            .chain(self.descendants())
            .filter_map(Self::text)
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a XmlElement> + use<'a, 'n> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First child with the given name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All descendants in document order, excluding `self`
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// First descendant with the given name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.descendants().find(|element| element.name == name)
    }

    pub fn find_all<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a XmlElement> + use<'a, 'n> {
        self.descendants().filter(move |element| element.name == name)
    }

    /// Elements reached by following a slash-separated path of child names
    #[must_use]
    pub fn select(&self, path: &str) -> Vec<&XmlElement> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.children_named(segment))
                .collect();
        }
        current
    }

    #[must_use]
    pub fn select_first(&self, path: &str) -> Option<&XmlElement> {
        self.select(path).into_iter().next()
    }

    /// First match of a child path whose first segment may sit at any depth
    ///
    /// `find_path("patientRole/patient")` finds a `patientRole` descendant and
    /// then its `patient` child.
    #[must_use]
    pub fn find_path(&self, path: &str) -> Option<&XmlElement> {
        let (first, rest) = path.split_once('/').unwrap_or((path, ""));
        self.find_all(first).find_map(|element| {
            if rest.is_empty() {
                Some(element)
            } else {
                element.select_first(rest)
            }
        })
    }

    /// Whether a `templateId` child declares the given root OID
    #[must_use]
    pub fn has_template(&self, root: &str) -> bool {
        self.children_named("templateId")
            .any(|template| template.attr("root") == Some(root))
    }

    fn push_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }
}

/// Pre-order iterator over the descendants of an element
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        ..XmlElement::default()
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(IngestError::malformed("multiple root elements"));
    }
    Ok(())
}

/// Parse XML text into an element tree rooted at a `ClinicalDocument`
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| IngestError::malformed("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(IngestError::malformed(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    let root = root.ok_or_else(|| IngestError::malformed("document is empty"))?;
    if root.name != ROOT_ELEMENT {
        return Err(IngestError::malformed(format!(
            "expected <{ROOT_ELEMENT}> root element, found <{}>",
            root.name
        )));
    }

    Ok(root)
}
