use kuchiki::iter::NodeIterator;
use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute};

pub type Element = NodeDataRef<ElementData>;

/// A parsed document plus the fingerprint of the source text it came from.
pub struct DocumentTree {
    document: NodeRef,
    fingerprint: String,
}

impl DocumentTree {
    pub fn parse(html: &str, fingerprint: impl Into<String>) -> Self {
        Self {
            document: kuchiki::parse_html().one(html),
            fingerprint: fingerprint.into(),
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// All matches in document order. An invalid selector matches nothing.
    pub fn select(&self, selector: &str) -> Vec<Element> {
        match self.document.select(selector) {
            Ok(matches) => matches.collect(),
            Err(()) => Vec::new(),
        }
    }

    pub fn first(&self, selector: &str) -> Option<Element> {
        self.document.select_first(selector).ok()
    }

    pub fn count(&self, selector: &str) -> usize {
        self.document
            .select(selector)
            .map(|matches| matches.count())
            .unwrap_or(0)
    }

    pub fn element_count(&self) -> usize {
        self.document.inclusive_descendants().elements().count()
    }
}

pub fn attr(element: &Element, name: &str) -> Option<String> {
    element.attributes.borrow().get(name).map(str::to_string)
}

pub fn has_attr(element: &Element, name: &str) -> bool {
    element.attributes.borrow().contains(name)
}

/// Concatenated text of the element and its descendants.
pub fn text(element: &Element) -> String {
    element.as_node().text_contents()
}

pub fn local_name(element: &Element) -> &str {
    &element.name.local
}

pub fn element_children(element: &Element) -> Vec<Element> {
    element.as_node().children().elements().collect()
}

/// Reads one property from the element's `style` attribute, serialised the
/// way lightningcss prints it. `!important` declarations take precedence;
/// otherwise the last declaration wins.
pub fn css(element: &Element, property: &str) -> Option<String> {
    let raw = attr(element, "style")?;
    let parsed = StyleAttribute::parse(&raw, ParserOptions::default()).ok()?;
    let block = &parsed.declarations;
    block
        .important_declarations
        .iter()
        .rev()
        .chain(block.declarations.iter().rev())
        .find(|declaration| declaration.property_id().name().eq_ignore_ascii_case(property))
        .and_then(|declaration| declaration.value_to_css_string(PrinterOptions::default()).ok())
}
