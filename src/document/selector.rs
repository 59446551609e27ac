//! Minimal CSS selector support for the in-memory document.
//!
//! Supported forms: `tag`, `.class`, `#id`, `[attr]`, `[attr="value"]`,
//! `[attr^="prefix"]` and compounds of those (`img[data-src]`, `a.btn`), plus
//! comma-separated lists. Commas and spaces inside `[...]` belong to the
//! attribute value.
//! Combinators are not supported; every compound matches a single element.

/// Read-only view of an element that a selector can be matched against.
pub trait Matchable {
    fn tag(&self) -> &str;
    fn has_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    Present(String),
    Equals(String, String),
    Prefix(String, String),
}

/// Split `input` at `sep` where it occurs outside `[...]`.
fn split_outside_brackets(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn has_space_outside_brackets(input: &str) -> bool {
    let mut depth = 0usize;
    input.chars().any(|c| {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        depth == 0 && c.is_whitespace()
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || has_space_outside_brackets(input) {
            return None;
        }

        let mut compound = Compound::default();
        let mut rest = input;

        let tag_end = rest
            .find(|c: char| c == '.' || c == '#' || c == '[')
            .unwrap_or(rest.len());
        if tag_end > 0 {
            let tag = &rest[..tag_end];
            if tag != "*" {
                compound.tag = Some(tag.to_ascii_lowercase());
            }
            rest = &rest[tag_end..];
        }

        while let Some(first) = rest.chars().next() {
            match first {
                '.' | '#' => {
                    let body = &rest[1..];
                    let end = body
                        .find(|c: char| c == '.' || c == '#' || c == '[')
                        .unwrap_or(body.len());
                    if end == 0 {
                        return None;
                    }
                    let name = body[..end].to_string();
                    if first == '.' {
                        compound.classes.push(name);
                    } else {
                        compound.id = Some(name);
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let close = rest.find(']')?;
                    let inner = &rest[1..close];
                    let test = match inner.split_once('=') {
                        Some((name, value)) => {
                            let value = value
                                .trim()
                                .trim_matches(|c| c == '"' || c == '\'')
                                .to_string();
                            match name.trim().strip_suffix('^') {
                                Some(name) => AttrTest::Prefix(name.to_string(), value),
                                None => AttrTest::Equals(name.trim().to_string(), value),
                            }
                        }
                        None => AttrTest::Present(inner.trim().to_string()),
                    };
                    compound.attrs.push(test);
                    rest = &rest[close + 1..];
                }
                _ => return None,
            }
        }

        Some(compound)
    }

    fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|test| match test {
            AttrTest::Present(name) => el.attribute(name).is_some(),
            AttrTest::Equals(name, value) => el.attribute(name) == Some(value.as_str()),
            AttrTest::Prefix(name, prefix) => el
                .attribute(name)
                .is_some_and(|v| v.starts_with(prefix.as_str())),
        })
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    /// Parse a selector list. Returns `None` for anything outside the
    /// supported subset, which callers treat as "matches nothing".
    pub fn parse(input: &str) -> Option<Self> {
        let alternatives = split_outside_brackets(input, ',')
            .into_iter()
            .map(Compound::parse)
            .collect::<Option<Vec<_>>>()?;
        if alternatives.is_empty() {
            return None;
        }
        Some(Self { alternatives })
    }

    pub fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}
