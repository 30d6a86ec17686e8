// WHY: Paragraph-level view of an (X)HTML document that reproduces untouched bytes exactly
// Only <p> elements become nodes; every other byte is kept as opaque text

use std::collections::HashMap;
use std::fmt;

/// Elements whose content is not markup and must be skipped wholesale
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "pre"];

/// Elements that never push onto the open-element stack
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Parent identity of elements at document root
pub const ROOT_PARENT: usize = 0;

/// One attribute of a paragraph's start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// A `<p>` element with its inner markup kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphElement {
    /// Start tag exactly as written, e.g. `<p class="text">`
    open_tag: String,
    /// End tag exactly as written, e.g. `</p>`
    close_tag: String,
    attributes: Vec<Attribute>,
    inner: String,
    parent: usize,
}

impl ParagraphElement {
    pub fn new(open_tag: &str, inner: &str, close_tag: &str, parent: usize) -> Self {
        Self {
            open_tag: open_tag.to_string(),
            close_tag: close_tag.to_string(),
            attributes: parse_attributes(open_tag),
            inner: inner.to_string(),
            parent,
        }
    }

    /// Serialized inner markup
    pub fn inner_html(&self) -> &str {
        &self.inner
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute value by case-insensitive name; valueless attributes read as ""
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    /// `class` as a space-joined token list; absent reads as ""
    pub fn normalized_class(&self) -> String {
        self.attribute("class")
            .map(|c| c.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }

    /// `style` verbatim; absent reads as ""
    pub fn normalized_style(&self) -> &str {
        self.attribute("style").unwrap_or("")
    }

    /// Identity of the enclosing element
    pub fn parent(&self) -> usize {
        self.parent
    }

    /// New paragraph with the same start tag, end tag, and parent
    pub fn with_inner_html(&self, inner: &str) -> Self {
        Self {
            open_tag: self.open_tag.clone(),
            close_tag: self.close_tag.clone(),
            attributes: self.attributes.clone(),
            inner: inner.to_string(),
            parent: self.parent,
        }
    }

    pub fn append_html(&mut self, html: &str) {
        self.inner.push_str(html);
    }
}

impl fmt::Display for ParagraphElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.open_tag, self.inner, self.close_tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Any markup or text outside candidate paragraphs
    Text(String),
    Paragraph(ParagraphElement),
}

impl Node {
    pub fn as_paragraph(&self) -> Option<&ParagraphElement> {
        match self {
            Node::Paragraph(p) => Some(p),
            Node::Text(_) => None,
        }
    }

    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

/// Ordered sequence of opaque text and paragraph nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse a markup document; never fails, unrecognized markup stays text
    pub fn parse(src: &str) -> Self {
        Parser::new(src).run()
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Take the node list out, leaving the document empty until `set_nodes`
    pub fn take_nodes(&mut self) -> Vec<Node> {
        std::mem::take(&mut self.nodes)
    }

    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &ParagraphElement> {
        self.nodes.iter().filter_map(Node::as_paragraph)
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match node {
                Node::Text(text) => f.write_str(text)?,
                Node::Paragraph(p) => write!(f, "{p}")?,
            }
        }
        Ok(())
    }
}

fn starts_with_ignore_case(bytes: &[u8], at: usize, pattern: &str) -> bool {
    bytes
        .get(at..at + pattern.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(pattern.as_bytes()))
}

fn find_from(src: &str, from: usize, pattern: &str) -> Option<usize> {
    src.get(from..)?.find(pattern).map(|rel| from + rel)
}

fn find_ignore_case(bytes: &[u8], from: usize, pattern: &str) -> Option<usize> {
    (from..bytes.len()).find(|&at| starts_with_ignore_case(bytes, at, pattern))
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'-' | b'_' | b'.')
}

/// Index of the `>` closing the tag that starts at `lt`, skipping quoted attribute values
fn find_tag_end(bytes: &[u8], lt: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(lt + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

/// Tag name starting at `at`, lowercased; empty if none
fn read_name(bytes: &[u8], at: usize) -> String {
    let at = at.min(bytes.len());
    let end = (at..bytes.len())
        .find(|&i| !is_name_byte(bytes[i]))
        .unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[at..end]).to_ascii_lowercase()
}

/// Resume position after a comment, CDATA section, declaration or processing instruction at `lt`
fn skip_non_element(src: &str, lt: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    if starts_with_ignore_case(bytes, lt, "<!--") {
        return Some(find_from(src, lt + 4, "-->").map_or(bytes.len(), |e| e + 3));
    }
    if starts_with_ignore_case(bytes, lt, "<![CDATA[") {
        return Some(find_from(src, lt + 9, "]]>").map_or(bytes.len(), |e| e + 3));
    }
    if starts_with_ignore_case(bytes, lt, "<!") || starts_with_ignore_case(bytes, lt, "<?") {
        return Some(find_from(src, lt, ">").map_or(bytes.len(), |e| e + 1));
    }
    None
}

/// Position of the end tag of a raw-text element whose start tag ends at `end`
fn skip_raw_text(bytes: &[u8], name: &str, end: usize) -> usize {
    find_ignore_case(bytes, end + 1, &format!("</{name}")).unwrap_or(bytes.len())
}

/// Match every `<p>` start tag to its `</p>` in one forward pass
///
/// Keys are the `<` offsets of start tags; values are the `<` and `>` offsets of
/// the matching end tag. Unmatched paragraphs have no entry. Scanning stops at
/// the first unterminated tag, leaving every paragraph still open unmatched.
fn match_paragraphs(src: &str) -> HashMap<usize, (usize, usize)> {
    let bytes = src.as_bytes();
    let mut matches = HashMap::new();
    let mut open: Vec<usize> = Vec::new();
    let mut pos = 0;

    while let Some(lt) = find_from(src, pos, "<") {
        if let Some(next) = skip_non_element(src, lt) {
            pos = next;
            continue;
        }

        let closing = starts_with_ignore_case(bytes, lt, "</");
        let name = read_name(bytes, if closing { lt + 2 } else { lt + 1 });
        if !closing && !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            pos = lt + 1;
            continue;
        }
        let Some(end) = find_tag_end(bytes, lt) else {
            break;
        };

        if closing {
            if name == "p" {
                if let Some(start) = open.pop() {
                    matches.insert(start, (lt, end));
                }
            }
            pos = end + 1;
        } else if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && bytes[end - 1] != b'/' {
            pos = skip_raw_text(bytes, &name, end);
        } else {
            if name == "p" && bytes[end - 1] != b'/' {
                open.push(lt);
            }
            pos = end + 1;
        }
    }

    matches
}

/// Parse `name="value"` pairs out of a start tag, preserving order
pub fn parse_attributes(open_tag: &str) -> Vec<Attribute> {
    let body = open_tag
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end_matches('/');
    let chars: Vec<char> = body.chars().collect();
    let mut attributes = Vec::new();

    // Skip the element name
    let mut i = chars.iter().position(|c| c.is_whitespace()).unwrap_or(chars.len());

    while i < chars.len() {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        let name_start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' && chars[i] != '/' {
            i += 1;
        }
        if name_start == i {
            break;
        }
        let name: String = chars[name_start..i].iter().collect();

        let mut j = i;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        if j >= chars.len() || chars[j] != '=' {
            attributes.push(Attribute { name, value: None });
            continue;
        }
        j += 1;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }

        let value: String;
        match chars.get(j) {
            Some(&q) if q == '"' || q == '\'' => {
                let start = j + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&c| c == q)
                    .map_or(chars.len(), |p| start + p);
                value = chars[start..end].iter().collect();
                i = (end + 1).min(chars.len());
            }
            _ => {
                let start = j;
                let end = chars[start..]
                    .iter()
                    .position(|c| c.is_whitespace())
                    .map_or(chars.len(), |p| start + p);
                value = chars[start..end].iter().collect();
                i = end;
            }
        }
        attributes.push(Attribute {
            name,
            value: Some(value),
        });
    }

    attributes
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    nodes: Vec<Node>,
    /// `<p>` start offset -> matching end tag offsets
    paragraph_closes: HashMap<usize, (usize, usize)>,
    /// Open elements as (name, identity)
    open: Vec<(String, usize)>,
    next_id: usize,
    text_start: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            nodes: Vec::new(),
            paragraph_closes: match_paragraphs(src),
            open: Vec::new(),
            next_id: ROOT_PARENT + 1,
            text_start: 0,
        }
    }

    fn run(mut self) -> Document {
        let mut pos = 0;

        while let Some(lt) = find_from(self.src, pos, "<") {
            pos = match self.step(lt) {
                Some(next) => next,
                None => break,
            };
        }

        if self.text_start < self.src.len() {
            self.nodes.push(Node::Text(self.src[self.text_start..].to_string()));
        }
        Document { nodes: self.nodes }
    }

    /// Handle the construct at `lt`; returns where scanning resumes
    fn step(&mut self, lt: usize) -> Option<usize> {
        let bytes = self.bytes;

        if let Some(next) = skip_non_element(self.src, lt) {
            return Some(next);
        }

        if starts_with_ignore_case(bytes, lt, "</") {
            let name = read_name(bytes, lt + 2);
            let end = find_tag_end(bytes, lt)?;
            if let Some(depth) = self.open.iter().rposition(|(open, _)| *open == name) {
                self.open.truncate(depth);
            }
            return Some(end + 1);
        }

        let name = read_name(bytes, lt + 1);
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            // Stray '<' in text
            return Some(lt + 1);
        }
        let end = find_tag_end(bytes, lt)?;
        let self_closing = bytes[end - 1] == b'/';

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            return Some(end + 1);
        }

        if name == "p" {
            if let Some(&(close_lt, close_end)) = self.paragraph_closes.get(&lt) {
                self.push_paragraph(lt, end, close_lt, close_end);
                return Some(close_end + 1);
            }
        }

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            return Some(skip_raw_text(bytes, &name, end));
        }

        self.open.push((name, self.next_id));
        self.next_id += 1;
        Some(end + 1)
    }

    fn push_paragraph(&mut self, lt: usize, open_end: usize, close_lt: usize, close_end: usize) {
        if self.text_start < lt {
            self.nodes.push(Node::Text(self.src[self.text_start..lt].to_string()));
        }

        let parent = self.open.last().map_or(ROOT_PARENT, |&(_, id)| id);
        self.nodes.push(Node::Paragraph(ParagraphElement::new(
            &self.src[lt..=open_end],
            &self.src[open_end + 1..close_lt],
            &self.src[close_lt..=close_end],
            parent,
        )));
        self.text_start = close_end + 1;
    }
}
