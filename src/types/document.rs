//! An owned element tree for the ThorImage experiment descriptor.

use crate::error::SchemaError;
use std::str::FromStr;

/// One XML element with its attributes in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: Option<String>,
}

/// A parsed experiment descriptor. Lookups are relative to the root element.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given tag.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Follows a `/`-separated path of child tags, e.g. `Wavelengths/ChannelEnable`.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        path.split('/')
            .filter(|step| !step.is_empty())
            .try_fold(self, |node, step| node.child(step))
    }

    /// All direct children with the given tag, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn require_attr(&self, name: &str) -> Result<&str, SchemaError> {
        self.attr(name).ok_or_else(|| SchemaError::MissingAttribute {
            element: self.name.clone(),
            attribute: name.to_string(),
        })
    }

    /// Reads and parses a required attribute. Surrounding whitespace is ignored.
    pub fn parse_attr<T: FromStr>(&self, name: &str) -> Result<T, SchemaError> {
        let raw = self.require_attr(name)?;
        raw.trim()
            .parse::<T>()
            .map_err(|_| SchemaError::InvalidAttribute {
                element: self.name.clone(),
                attribute: name.to_string(),
                value: raw.to_string(),
            })
    }
}

impl XmlDocument {
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        self.root.find(path)
    }

    pub fn require(&self, path: &str) -> Result<&XmlElement, SchemaError> {
        self.find(path).ok_or_else(|| SchemaError::MissingElement {
            path: path.to_string(),
        })
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.root.find_all(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlDocument {
        let mut root = XmlElement::new("ThorImageExperiment");
        let mut wavelengths = XmlElement::new("Wavelengths");
        let mut enable = XmlElement::new("ChannelEnable");
        enable.attributes.push(("Set".into(), " 5 ".into()));
        wavelengths.children.push(enable);
        root.children.push(wavelengths);
        for start in ["0", "10"] {
            let mut p = XmlElement::new("Pockels");
            p.attributes.push(("start".into(), start.into()));
            root.children.push(p);
        }
        XmlDocument { root }
    }

    #[test]
    fn test_find_nested_path() {
        let doc = sample();
        let node = doc.find("Wavelengths/ChannelEnable").unwrap();
        assert_eq!(node.parse_attr::<u64>("Set").unwrap(), 5);
        assert!(doc.find("Wavelengths/Missing").is_none());
        assert_eq!(doc.find_all("Pockels").count(), 2);
    }

    #[test]
    fn test_attribute_errors_name_the_element() {
        let doc = sample();
        let node = doc.find("Wavelengths/ChannelEnable").unwrap();
        assert_eq!(
            node.parse_attr::<u64>("Missing"),
            Err(SchemaError::MissingAttribute {
                element: "ChannelEnable".into(),
                attribute: "Missing".into(),
            })
        );

        let pockels = doc.find_all("Pockels").next().unwrap();
        assert!(matches!(
            pockels.parse_attr::<bool>("start"),
            Err(SchemaError::InvalidAttribute { ref value, .. }) if value == "0"
        ));
        assert_eq!(
            doc.require("Camera").unwrap_err(),
            SchemaError::MissingElement {
                path: "Camera".into()
            }
        );
    }
}
