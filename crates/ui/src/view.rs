//! Static presentation structure produced by rendering.
//!
//! A [`View`] is a plain element tree; it is built once and never diffed.
//! Regions that a surface realizes carry an [`ElementId`].

use txpanel_types::ElementId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    pub element_id: Option<ElementId>,
    pub class: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<View>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            element_id: None,
            class: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(mut self, element_id: ElementId) -> Self {
        self.element_id = Some(element_id);
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: impl Into<View>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = View>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(View::Text(text.into()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Void elements have no closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self.tag, "input" | "br" | "hr" | "img")
    }
}

impl From<Element> for View {
    fn from(element: Element) -> Self {
        View::Element(element)
    }
}

impl View {
    /// Serialize to HTML, escaping text and attribute values.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Depth-first search for the element carrying `element_id`.
    pub fn find(&self, element_id: &ElementId) -> Option<&Element> {
        match self {
            View::Text(_) => None,
            View::Element(element) => {
                if element.element_id.as_ref() == Some(element_id) {
                    return Some(element);
                }
                element.children.iter().find_map(|child| child.find(element_id))
            }
        }
    }

    /// Concatenated text content.
    pub fn text_content(&self) -> String {
        match self {
            View::Text(text) => text.clone(),
            View::Element(element) => element.children.iter().map(View::text_content).collect(),
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            View::Text(text) => escape_into(text, out),
            View::Element(element) => {
                out.push('<');
                out.push_str(element.tag);
                if let Some(class) = &element.class {
                    write_attribute(out, "class", class);
                }
                if let Some(element_id) = &element.element_id {
                    write_attribute(out, "id", element_id.as_str());
                }
                for (name, value) in &element.attributes {
                    write_attribute(out, name, value);
                }
                out.push('>');
                if element.is_void() {
                    return;
                }
                for child in &element.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(element.tag);
                out.push('>');
            }
        }
    }
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(value, out);
    out.push('"');
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
}
