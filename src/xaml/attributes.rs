//! Attribute view handed to content handlers with each start element.

use crate::common::{Error, Result};
use crate::vocabulary::{self, AttributeKind, ValueType};
use smallvec::SmallVec;

/// One resolved attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Namespace URI; empty for unprefixed attributes
    pub namespace_uri: String,
    /// Local name
    pub local_name: String,
    /// Qualified name as written
    pub qname: String,
    /// Attribute value
    pub value: String,
    kind: AttributeKind,
    value_type: ValueType,
}

impl Attribute {
    /// Create an attribute, resolving it against the vocabulary.
    pub fn new(
        namespace_uri: impl Into<String>,
        local_name: impl Into<String>,
        qname: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let namespace_uri = namespace_uri.into();
        let local_name = local_name.into();
        let desc = vocabulary::lookup_expanded(&namespace_uri, &local_name);
        Self {
            namespace_uri,
            local_name,
            qname: qname.into(),
            value: value.into(),
            kind: desc.kind,
            value_type: desc.value_type,
        }
    }

    /// Unprefixed attribute in the default namespace.
    pub fn plain(name: &str, value: impl Into<String>) -> Self {
        Self::new("", name, name, value)
    }

    /// Vocabulary kind (`Unknown` outside the vocabulary).
    #[inline]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Declared value type.
    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

/// Ordered, indexable and name-addressable attributes of one element.
///
/// Insertion order is markup order. Namespace declarations are not
/// attributes and never appear here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attrs: SmallVec<[Attribute; 4]>,
}

impl AttributeSet {
    /// Create an empty set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute. A second attribute with the same qualified name
    /// or the same expanded name is `InvalidFormat`.
    pub fn push(&mut self, attr: Attribute) -> Result<()> {
        let duplicate = self.attrs.iter().any(|a| {
            a.qname == attr.qname
                || (a.namespace_uri == attr.namespace_uri && a.local_name == attr.local_name)
        });
        if duplicate {
            return Err(Error::format(format!("Duplicate attribute {}", attr.qname)));
        }
        self.attrs.push(attr);
        Ok(())
    }

    /// Number of attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether there are no attributes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Attribute at `index`.
    pub fn get(&self, index: usize) -> Result<&Attribute> {
        self.attrs.get(index).ok_or(Error::OutOfRange {
            index,
            count: self.attrs.len(),
        })
    }

    pub fn namespace_uri(&self, index: usize) -> Result<&str> {
        self.get(index).map(|a| a.namespace_uri.as_str())
    }

    pub fn local_name(&self, index: usize) -> Result<&str> {
        self.get(index).map(|a| a.local_name.as_str())
    }

    pub fn qname(&self, index: usize) -> Result<&str> {
        self.get(index).map(|a| a.qname.as_str())
    }

    pub fn value_type(&self, index: usize) -> Result<ValueType> {
        self.get(index).map(Attribute::value_type)
    }

    pub fn value(&self, index: usize) -> Result<&str> {
        self.get(index).map(|a| a.value.as_str())
    }

    pub fn kind(&self, index: usize) -> Result<AttributeKind> {
        self.get(index).map(Attribute::kind)
    }

    /// Position of the attribute with the given expanded name.
    pub fn index_of(&self, namespace_uri: &str, local_name: &str) -> Result<usize> {
        self.attrs
            .iter()
            .position(|a| a.namespace_uri == namespace_uri && a.local_name == local_name)
            .ok_or_else(|| {
                Error::parameter(format!("No attribute {{{}}}{}", namespace_uri, local_name))
            })
    }

    /// Position of the attribute with the given qualified name.
    pub fn index_of_qname(&self, qname: &str) -> Result<usize> {
        self.attrs
            .iter()
            .position(|a| a.qname == qname)
            .ok_or_else(|| Error::parameter(format!("No attribute {}", qname)))
    }

    /// Value of the attribute with the given qualified name.
    pub fn value_of(&self, qname: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.qname == qname)
            .map(|a| a.value.as_str())
    }

    /// Iterate in markup order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attrs.iter()
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;
    use crate::vocabulary::XML_NAMESPACE;

    fn sample() -> AttributeSet {
        let mut set = AttributeSet::new();
        set.push(Attribute::plain("FontWeight", "Bold")).unwrap();
        set.push(Attribute::new(XML_NAMESPACE, "lang", "xml:lang", "en-US"))
            .unwrap();
        set.push(Attribute::plain("Tag", "x")).unwrap();
        set
    }

    #[test]
    fn test_indexed_access() {
        let set = sample();
        assert_eq!(set.len(), 3);
        assert_eq!(set.qname(1).unwrap(), "xml:lang");
        assert_eq!(set.namespace_uri(1).unwrap(), XML_NAMESPACE);
        assert_eq!(set.local_name(1).unwrap(), "lang");
        assert_eq!(set.value(0).unwrap(), "Bold");
        assert_eq!(set.kind(1).unwrap(), AttributeKind::Language);
        assert_eq!(set.value_type(0).unwrap(), ValueType::FontWeight);
        assert_eq!(set.kind(2).unwrap(), AttributeKind::Unknown);
        assert_eq!(set.value_type(2).unwrap(), ValueType::String);
    }

    #[test]
    fn test_out_of_range() {
        let set = sample();
        let err = set.value(3).unwrap_err();
        assert_eq!(err, Error::OutOfRange { index: 3, count: 3 });
        assert_eq!(set.qname(99).unwrap_err().kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_name_lookup() {
        let set = sample();
        assert_eq!(set.index_of(XML_NAMESPACE, "lang").unwrap(), 1);
        assert_eq!(set.index_of_qname("Tag").unwrap(), 2);
        assert_eq!(
            set.index_of_qname("Missing").unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(set.index_of("", "lang").unwrap_err().kind(), ErrorKind::InvalidParameter);
        assert_eq!(set.value_of("FontWeight"), Some("Bold"));
        assert_eq!(set.value_of("FontSize"), None);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut set = sample();
        let err = set.push(Attribute::plain("FontWeight", "Normal")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        // Same expanded name under a different prefix
        let err = set
            .push(Attribute::new(XML_NAMESPACE, "lang", "x:lang", "fr-FR"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_iteration_order() {
        let names: Vec<_> = sample().iter().map(|a| a.qname.clone()).collect();
        assert_eq!(names, ["FontWeight", "xml:lang", "Tag"]);
    }
}
