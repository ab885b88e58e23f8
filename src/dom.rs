//! Arena-based DOM for XHTML content files.
//!
//! Content documents are well-formed XML, so they are parsed with a quick-xml
//! event loop into an arena tree: all nodes live in a contiguous vector, and
//! parent/child/sibling links are indices into it. The tree supports the small
//! query and mutation surface the titling engine needs, then serializes back
//! to markup text.

use quick_xml::Reader;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::Event;

use crate::error::Result;

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel value for no node.
    const NONE: NodeId = NodeId(u32::MAX);

    fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// An attribute on an element node, with the qualified name as written
/// (`epub:type` keeps its prefix).
#[derive(Debug, Clone)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with qualified tag name and attributes.
    Element { name: String, attrs: Vec<Attr> },
    /// Text content, stored unescaped.
    Text(String),
    /// Comment, raw interior text.
    Comment(String),
    /// Doctype, raw interior text (e.g. `html`).
    Doctype(String),
    /// Processing instruction, raw interior text.
    Pi(String),
}

#[derive(Debug)]
struct Node {
    data: NodeData,
    parent: NodeId,
    first_child: NodeId,
    last_child: NodeId,
    next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena-allocated XHTML document tree.
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
    /// XML declaration interior (`version="1.0" encoding="utf-8"`), if present.
    decl: Option<String>,
}

impl Dom {
    /// Parse an XHTML document.
    pub fn parse(xhtml: &str) -> Result<Self> {
        let mut dom = Self {
            nodes: vec![Node::new(NodeData::Document)],
            document: NodeId(0),
            decl: None,
        };
        let document = dom.document;
        dom.read_into(xhtml, document)?;
        Ok(dom)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    /// Run a quick-xml event loop over `markup`, appending the resulting
    /// nodes under `parent`.
    fn read_into(&mut self, markup: &str, parent: NodeId) -> Result<()> {
        let mut reader = Reader::from_str(markup);
        let mut stack = vec![parent];

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let node = self.element_from_start(&e)?;
                    self.append(*stack.last().expect("stack never empty"), node);
                    stack.push(node);
                }
                Event::Empty(e) => {
                    let node = self.element_from_start(&e)?;
                    self.append(*stack.last().expect("stack never empty"), node);
                }
                Event::End(_) => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                Event::Text(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    self.append_text(*stack.last().expect("stack never empty"), &text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    self.append_text(*stack.last().expect("stack never empty"), &text);
                }
                Event::GeneralRef(e) => {
                    // Character and entity references arrive as separate
                    // events; resolve them back into the text stream.
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        self.append_text(*stack.last().expect("stack never empty"), &resolved);
                    }
                }
                Event::Comment(e) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    let node = self.alloc(Node::new(NodeData::Comment(raw)));
                    self.append(*stack.last().expect("stack never empty"), node);
                }
                Event::DocType(e) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    let node = self.alloc(Node::new(NodeData::Doctype(raw)));
                    self.append(*stack.last().expect("stack never empty"), node);
                }
                Event::PI(e) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    let node = self.alloc(Node::new(NodeData::Pi(raw)));
                    self.append(*stack.last().expect("stack never empty"), node);
                }
                Event::Decl(e) => {
                    let mut decl = String::from("version=\"");
                    match e.version() {
                        Ok(v) => decl.push_str(&String::from_utf8_lossy(&v)),
                        Err(_) => decl.push_str("1.0"),
                    }
                    decl.push('"');
                    if let Some(Ok(enc)) = e.encoding() {
                        decl.push_str(" encoding=\"");
                        decl.push_str(&String::from_utf8_lossy(&enc));
                        decl.push('"');
                    }
                    if let Some(Ok(standalone)) = e.standalone() {
                        decl.push_str(" standalone=\"");
                        decl.push_str(&String::from_utf8_lossy(&standalone));
                        decl.push('"');
                    }
                    self.decl = Some(decl);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn element_from_start(&mut self, e: &quick_xml::events::BytesStart<'_>) -> Result<NodeId> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in e.attributes().flatten() {
            attrs.push(Attr {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: attr
                    .unescape_value()
                    .map_err(quick_xml::Error::from)?
                    .into_owned(),
            });
        }
        Ok(self.alloc(Node::new(NodeData::Element { name, attrs })))
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        let last = self.node(parent).last_child;
        {
            let child_node = self.node_mut(child);
            child_node.parent = parent;
            child_node.next_sibling = NodeId::NONE;
        }
        if last.is_some() {
            self.node_mut(last).next_sibling = child;
        } else {
            self.node_mut(parent).first_child = child;
        }
        self.node_mut(parent).last_child = child;
    }

    /// Append text to an existing trailing text node, or create a new one.
    fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.node(parent).last_child;
        if last.is_some()
            && let NodeData::Text(existing) = &mut self.node_mut(last).data
        {
            existing.push_str(text);
            return;
        }
        let node = self.alloc(Node::new(NodeData::Text(text.to_string())));
        self.append(parent, node);
    }

    /// Detach all children of a node. Detached nodes stay allocated in the
    /// arena but are no longer reachable from the document.
    fn clear_children(&mut self, parent: NodeId) {
        let node = self.node_mut(parent);
        node.first_child = NodeId::NONE;
        node.last_child = NodeId::NONE;
    }

    /// Iterate the immediate children of a node.
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.node(parent).first_child;
        std::iter::from_fn(move || {
            if current.is_none() {
                return None;
            }
            let id = current;
            current = self.node(id).next_sibling;
            Some(id)
        })
    }

    /// Element tag name, if the node is an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Check whether the node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element { .. })
    }

    /// Text content, if the node is a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Get an attribute value by qualified name.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    /// Set an attribute, replacing an existing value or appending a new one.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            if let Some(attr) = attrs.iter_mut().find(|a| a.name == name) {
                attr.value = value.to_string();
            } else {
                attrs.push(Attr {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    /// Find the first element with one of the given tag names, in document
    /// order.
    pub fn find_first(&self, tags: &[&str]) -> Option<NodeId> {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(name) = self.tag_name(id) {
                if tags.contains(&name) {
                    return Some(id);
                }
            }
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        None
    }

    /// Walk ancestors from nearest to farthest, excluding the document root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.node(id).parent;
        std::iter::from_fn(move || {
            if current.is_none() || current == self.document {
                return None;
            }
            let id = current;
            current = self.node(id).parent;
            Some(id)
        })
    }

    /// Concatenated text of all descendant text nodes, markup stripped.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for child in self.children(id).collect::<Vec<_>>() {
            match &self.node(child).data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Element { .. } => self.collect_text(child, out),
                _ => {}
            }
        }
    }

    /// Serialized markup of a node's children, inline structure preserved.
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Replace a node's children with a parsed markup fragment.
    pub fn set_inner_markup(&mut self, id: NodeId, markup: &str) -> Result<()> {
        self.clear_children(id);
        self.read_into(markup, id)
    }

    /// Replace a node's children with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        let node = self.alloc(Node::new(NodeData::Text(text.to_string())));
        self.append(id, node);
    }

    /// Serialize the whole document back to markup text.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        if let Some(decl) = &self.decl {
            out.push_str("<?xml ");
            out.push_str(decl);
            out.push_str("?>\n");
        }
        for child in self.children(self.document) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.node(id).data {
            NodeData::Document => {}
            NodeData::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for attr in attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape(attr.value.as_str()));
                    out.push('"');
                }
                if self.node(id).first_child.is_none() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for child in self.children(id) {
                        self.write_node(child, out);
                    }
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
            NodeData::Text(text) => out.push_str(&partial_escape(text.as_str())),
            NodeData::Comment(raw) => {
                out.push_str("<!--");
                out.push_str(raw);
                out.push_str("-->");
            }
            NodeData::Doctype(raw) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(raw);
                out.push('>');
            }
            NodeData::Pi(raw) => {
                out.push_str("<?");
                out.push_str(raw);
                out.push_str("?>");
            }
        }
    }
}

/// Resolve a predefined or numeric character reference.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#') {
        if let Ok(code) = dec.parse::<u32>()
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    }

    None
}
