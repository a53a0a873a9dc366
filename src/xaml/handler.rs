//! Push-parser sink for XAML content.

use super::attributes::AttributeSet;
use crate::common::Result;

/// Receives XAML parse events in document order.
///
/// Every callback returns a [`Result`]; the first `Err` aborts the parse and
/// is returned from [`parse`](super::parse) unchanged. Namespace URIs are
/// empty for names in no namespace.
pub trait ContentHandler {
    fn start_document(&mut self) -> Result<()>;

    fn end_document(&mut self) -> Result<()>;

    /// A namespace prefix comes into scope. The default namespace has the
    /// empty prefix.
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()>;

    /// A namespace prefix goes out of scope.
    fn end_prefix_mapping(&mut self, _prefix: &str) -> Result<()> {
        Ok(())
    }

    fn start_element(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        qname: &str,
        attributes: &AttributeSet,
    ) -> Result<()>;

    fn end_element(&mut self, namespace_uri: &str, local_name: &str, qname: &str) -> Result<()>;

    /// Character data, with references already resolved.
    fn characters(&mut self, text: &str) -> Result<()>;

    /// Whitespace-only character data inside the root element.
    fn ignorable_whitespace(&mut self, text: &str) -> Result<()>;

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()>;

    /// A reference to an entity the parser cannot resolve.
    fn skipped_entity(&mut self, name: &str) -> Result<()>;
}
