//! A minimal namespace aware element tree.
//!
//! The pack description is read once into this tree, which is then converted
//! into the typed representation in [`crate::package`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::LoadError;

#[derive(Debug, Default)]
pub(crate) struct Element {
    /// Resolved namespace URI, `None` for unqualified elements.
    pub namespace: Option<String>,
    /// Local name, without any prefix.
    pub name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Character data of the element and its descendants, untrimmed.
    pub text: String,
}

impl Element {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn owned_attribute(&self, key: &str) -> Option<String> {
        self.attribute(key).map(str::to_owned)
    }

    /// Children with the given local name and no namespace.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children_in(None, name)
    }

    /// Children with the given local name in the given namespace.
    pub fn children_in<'a>(
        &'a self,
        namespace: Option<&'a str>,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |child| child.name == name && child.namespace.as_deref() == namespace)
    }

    /// Follows a `/` separated path of unqualified element names.
    pub fn descendants<'a>(&'a self, path: &'a str) -> Vec<&'a Element> {
        path.split('/').fold(vec![self], |current, step| {
            current
                .into_iter()
                .flat_map(|element| element.children(step))
                .collect()
        })
    }
}

/// Parses `xml` and returns its root element.
pub(crate) fn parse(xml: &str) -> Result<Element, LoadError> {
    let mut reader = NsReader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        let (namespace, event) = reader.read_resolved_event()?;
        match event {
            Event::Start(start) => {
                let element = open(namespace, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open(namespace, &start)?;
                close(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| LoadError::Malformed {
                    reason: "unexpected closing tag".to_string(),
                })?;
                close(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = stack.last() {
        return Err(LoadError::Malformed {
            reason: format!("element <{}> is never closed", unclosed.name),
        });
    }

    root.ok_or_else(|| LoadError::Malformed {
        reason: "document has no root element".to_string(),
    })
}

fn open(namespace: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Element, LoadError> {
    let namespace = match namespace {
        ResolveResult::Bound(namespace) => {
            Some(String::from_utf8_lossy(namespace.as_ref()).into_owned())
        }
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(LoadError::Malformed {
                reason: format!(
                    "undeclared namespace prefix '{}'",
                    String::from_utf8_lossy(&prefix)
                ),
            })
        }
    };

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        namespace,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn close(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), LoadError> {
    if let Some(parent) = stack.last_mut() {
        parent.text.push_str(&element.text);
        parent.children.push(element);
    } else if root.is_some() {
        return Err(LoadError::Malformed {
            reason: format!("unexpected second root element <{}>", element.name),
        });
    } else {
        *root = Some(element);
    }

    Ok(())
}
