//! Scan-based extraction from CoT XML.
//!
//! This is not an XML parser. It finds the first occurrence of a named
//! element by substring search and reads its attributes or inner text as raw
//! slices. Attribute values are returned verbatim: entities are not
//! unescaped and nothing is converted to a number here.

/// True if, after leading whitespace, the bytes start with `<?xml` or
/// `<event`.
pub fn is_xml(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let rest = &data[start..];
    rest.starts_with(b"<?xml") || rest.starts_with(b"<event")
}

/// Location of an opening tag inside the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenTag {
    start: usize,
    /// One past the closing `>`
    end: usize,
    self_closing: bool,
}

fn find_open_tag(bytes: &[u8], tag: &str) -> Option<OpenTag> {
    let tag = tag.as_bytes();
    let mut from = 0;

    while let Some(found) = bytes[from..].iter().position(|&b| b == b'<') {
        let start = from + found;
        let name_end = start + 1 + tag.len();
        let name_matches = bytes.get(start + 1..name_end) == Some(tag);
        let boundary = bytes
            .get(name_end)
            .is_some_and(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/');

        if name_matches && boundary {
            let end = find_tag_end(bytes, name_end)?;
            return Some(OpenTag {
                start,
                end,
                self_closing: bytes[..end].ends_with(b"/>"),
            });
        }
        from = start + 1;
    }
    None
}

/// Index one past the `>` that closes the tag, skipping quoted values.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match (quote, b) {
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if b == q => quote = None,
            (None, b'>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// The raw opening tag of the first `<tag ...>` element, from `<` through
/// `>` inclusive.
///
/// Returns `None` if the element does not appear or its opening tag never
/// closes.
pub fn get_element_with_attrs<'t>(text: &'t str, tag: &str) -> Option<&'t str> {
    find_open_tag(text.as_bytes(), tag).map(|open| &text[open.start..open.end])
}

/// Value of attribute `name` in an opening tag, exactly as it appears between
/// the quotes.
pub fn get_attr<'t>(element: &'t str, name: &str) -> Option<&'t str> {
    attributes(element).find(|(key, _)| *key == name).map(|(_, value)| value)
}

/// Iterate over the `name="value"` pairs of an opening tag.
///
/// Iteration stops at the first construct that is not a well-formed
/// attribute.
pub fn attributes(element: &str) -> Attributes<'_> {
    let body = element.strip_prefix('<').unwrap_or(element);
    let after_name = body
        .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .unwrap_or(body.len());
    Attributes {
        rest: &body[after_name..],
    }
}

/// Iterator returned by [`attributes`].
#[derive(Debug, Clone)]
pub struct Attributes<'t> {
    rest: &'t str,
}

impl<'t> Iterator for Attributes<'t> {
    type Item = (&'t str, &'t str);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.trim_start();
        let name_len = rest.find(|c: char| c == '=' || c.is_ascii_whitespace() || c == '>' || c == '/')?;
        if name_len == 0 {
            self.rest = "";
            return None;
        }
        let name = &rest[..name_len];

        let after = rest[name_len..].trim_start().strip_prefix('=')?.trim_start();
        let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value_and_rest = &after[1..];
        let close = value_and_rest.find(quote)?;

        self.rest = &value_and_rest[close + 1..];
        Some((name, &value_and_rest[..close]))
    }
}

/// Closing tag of a CoT event.
pub const EVENT_END_TAG: &[u8] = b"</event>";

/// Length of the first complete `event` element in `data`, counting any
/// prolog before it.
///
/// A self-closing `<event .../>` ends at its `/>`; otherwise the element runs
/// through the next `</event>`. `None` means more bytes are needed.
pub fn event_len(data: &[u8]) -> Option<usize> {
    let open = find_open_tag(data, "event")?;
    if open.self_closing {
        return Some(open.end);
    }
    data[open.end..]
        .windows(EVENT_END_TAG.len())
        .position(|window| window == EVENT_END_TAG)
        .map(|pos| open.end + pos + EVENT_END_TAG.len())
}

/// Everything between the first `<tag ...>` and the next `</tag>`.
///
/// Nesting of the same tag is not tracked. A self-closing element has no
/// content and yields `None`.
pub fn get_element<'t>(text: &'t str, tag: &str) -> Option<&'t str> {
    let open = find_open_tag(text.as_bytes(), tag)?;
    if open.self_closing {
        return None;
    }
    let closing = format!("</{tag}");
    let len = text[open.end..].find(&closing)?;
    Some(&text[open.end..open.end + len])
}
