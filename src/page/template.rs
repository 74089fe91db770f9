use crate::page::*;

/// An HTML page with a container element the cards are appended to.
///
/// Cards go after the content already in the container, right before its
/// closing tag, in the order they are appended.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PageTemplate {
    html: String,
    insert_at: usize,
}

impl PageTemplate {
    /// Locates the first element carrying `container_class` in its class
    /// list. Returns None if there is no such element, or if it is never
    /// closed.
    pub fn parse(html: String, container_class: &str) -> Option<PageTemplate> {
        // ASCII lowercasing keeps the byte offsets.
        let lower = html.to_ascii_lowercase();
        let (tag_name, content_start) = find_container(&html, &lower, container_class)?;
        let insert_at = find_closing_tag(&lower, &tag_name, content_start)?;
        debug!(
            "PageTemplate: container <{}> content at {}..{}",
            tag_name, content_start, insert_at
        );
        Some(PageTemplate { html, insert_at })
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

impl RenderTarget for PageTemplate {
    fn append(&mut self, card: &ParticipantCard) {
        let fragment = card.to_html();
        self.html.insert_str(self.insert_at, &fragment);
        self.insert_at += fragment.len();
    }
}

// Elements whose content is text, not markup.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

#[derive(Eq, PartialEq, Debug, Clone)]
struct Tag {
    name: String,
    closing: bool,
    // Offset of the '<'.
    start: usize,
    // Offset right after the '>'.
    end: usize,
}

/// The opening and closing tags of a lowercased page, in document order.
/// Comments, doctypes and the bodies of raw text elements are skipped.
struct Tags<'a> {
    lower: &'a str,
    pos: usize,
}

impl<'a> Tags<'a> {
    fn new(lower: &'a str, from: usize) -> Tags<'a> {
        Tags { lower, pos: from }
    }
}

impl Iterator for Tags<'_> {
    type Item = Tag;

    fn next(&mut self) -> Option<Tag> {
        loop {
            let start = self.pos + self.lower[self.pos..].find('<')?;
            let rest = &self.lower[start..];
            if let Some(comment) = rest.strip_prefix("<!--") {
                self.pos = start + 4 + comment.find("-->")? + 3;
                continue;
            }
            let end = start + tag_end(rest)?;
            self.pos = end;

            let (closing, body) = match rest[1..].strip_prefix('/') {
                Some(b) => (true, b),
                None => (false, &rest[1..]),
            };
            let name: String = body
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            if name.is_empty() {
                continue;
            }
            if !closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                let close = format!("</{}", name);
                self.pos = self.lower[end..]
                    .find(&close)
                    .map(|i| end + i)
                    .unwrap_or(self.lower.len());
            }
            return Some(Tag {
                name,
                closing,
                start,
                end,
            });
        }
    }
}

// Length of the tag at the start of `s`, up to and including its '>'.
// A '>' inside a quoted attribute value does not end the tag.
fn tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut prev = b'<';
    for (i, b) in s.bytes().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if (b == b'"' || b == b'\'') && prev == b'=' => quote = Some(b),
            None if b == b'>' => return Some(i + 1),
            None => {}
        }
        if !b.is_ascii_whitespace() {
            prev = b;
        }
    }
    None
}

// Returns the tag name of the container and the offset right after its opening tag.
fn find_container(html: &str, lower: &str, container_class: &str) -> Option<(String, usize)> {
    Tags::new(lower, 0)
        .filter(|t| !t.closing)
        .find(|t| class_list(&html[t.start + 1..t.end - 1]).any(|c| c == container_class))
        .map(|t| (t.name, t.end))
}

fn class_list(tag: &str) -> impl Iterator<Item = &str> {
    attribute_value(tag, "class")
        .unwrap_or_default()
        .split_whitespace()
}

// `tag` is the text between '<' and '>'.
fn attribute_value<'a>(tag: &'a str, attribute: &str) -> Option<&'a str> {
    // Skip the tag name.
    let mut rest = tag.trim_start_matches(|c: char| !c.is_ascii_whitespace());
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
        if rest.is_empty() {
            return None;
        }
        let name_len = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        rest = rest[name_len..].trim_start();

        let mut value = None;
        if let Some(v) = rest.strip_prefix('=') {
            let v = v.trim_start();
            match v.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let close = v[1..].find(q).map(|i| i + 1).unwrap_or(v.len());
                    value = Some(&v[1..close]);
                    rest = &v[(close + 1).min(v.len())..];
                }
                _ => {
                    let len = v.find(|c: char| c.is_ascii_whitespace()).unwrap_or(v.len());
                    value = Some(&v[..len]);
                    rest = &v[len..];
                }
            }
        }
        if name.eq_ignore_ascii_case(attribute) {
            return value;
        }
    }
}

// Offset of the closing tag matching an element opened right before `from`.
fn find_closing_tag(lower: &str, tag_name: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    for tag in Tags::new(lower, from).filter(|t| t.name == tag_name) {
        if !tag.closing {
            depth += 1;
            continue;
        }
        depth -= 1;
        if depth == 0 {
            return Some(tag.start);
        }
    }
    None
}
