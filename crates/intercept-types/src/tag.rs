//! Marker tags and the ordered, deduplicated tag set.
//!
//! A [`Tag`] is the value attached to a type or a method to say "this behavior
//! category applies here". Tags compare by value: two tags are the same tag when
//! their kind and all attribute values match, regardless of where they were
//! declared. This is what lets type-level and method-level declarations of the
//! same marker collapse into a single entry of a [`TagSet`].
//!
//! # Textual form
//!
//! Tags have a compact textual form used by manifests and the CLI:
//!
//! ```
//! use proxy_intercept_types::Tag;
//!
//! let plain: Tag = "Audited".parse().unwrap();
//! assert_eq!(plain.kind(), "Audited");
//! assert!(plain.attributes().is_empty());
//!
//! let scoped: Tag = "CheckRole(role=admin, realm=ops)".parse().unwrap();
//! assert_eq!(scoped.attribute("role"), Some("admin"));
//! assert_eq!(scoped.to_string(), "CheckRole(realm=ops, role=admin)");
//! ```
//!
//! Keys and values that contain `,`, `=`, `(`, `)`, `"` or `\`, or that are
//! empty or padded with whitespace, are written in double quotes with `\"` and
//! `\\` escapes, so every tag's text parses back to an equal tag:
//!
//! ```
//! use proxy_intercept_types::Tag;
//!
//! let tag = Tag::new("CheckRole").with_attribute("roles", "admin,ops");
//! assert_eq!(tag.to_string(), r#"CheckRole(roles="admin,ops")"#);
//! assert_eq!(tag.to_string().parse::<Tag>().unwrap(), tag);
//! ```

use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value-comparable behavior marker.
///
/// `kind` identifies the marker category (the thing selector and group lookups
/// are keyed on); `attributes` carry the marker's member values. Attributes are
/// kept sorted so equality and hashing do not depend on declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "TagRepr", into = "TagRepr")]
pub struct Tag {
    kind: Arc<str>,
    attributes: BTreeMap<String, String>,
}

impl Tag {
    /// Create a tag with no attributes.
    ///
    /// `kind` must be a valid kind (alphanumerics plus `_ . : -`); use
    /// [`Tag::try_new`] for kinds that come from outside the program.
    pub fn new(kind: impl Into<Arc<str>>) -> Self {
        let kind = kind.into();
        debug_assert!(is_valid_kind(&kind), "invalid tag kind '{}'", kind);
        Self {
            kind,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a tag with no attributes, rejecting kinds the textual form
    /// could not carry.
    pub fn try_new(kind: impl Into<Arc<str>>) -> Result<Self, TagParseError> {
        let kind = kind.into();
        if !is_valid_kind(&kind) {
            return Err(TagParseError::InvalidKind(kind.to_string()));
        }
        Ok(Self {
            kind,
            attributes: BTreeMap::new(),
        })
    }

    /// Add an attribute value, replacing any previous value for `key`.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The marker category.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// All attribute values, sorted by key.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Look up a single attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether this tag has the given kind.
    pub fn is_kind(&self, kind: &str) -> bool {
        &*self.kind == kind
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        if self.attributes.is_empty() {
            return Ok(());
        }
        f.write_char('(')?;
        for (i, (key, value)) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_attribute_text(f, key)?;
            f.write_char('=')?;
            write_attribute_text(f, value)?;
        }
        f.write_char(')')
    }
}

fn needs_quoting(text: &str) -> bool {
    text.is_empty()
        || text.trim() != text
        || text
            .chars()
            .any(|c| matches!(c, ',' | '=' | '(' | ')' | '"' | '\\'))
}

fn write_attribute_text(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if !needs_quoting(text) {
        return f.write_str(text);
    }
    f.write_char('"')?;
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

/// Error returned when a tag's textual form cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    #[error("tag is empty")]
    Empty,
    #[error("invalid tag kind '{0}'")]
    InvalidKind(String),
    #[error("unterminated attribute list in '{0}'")]
    Unterminated(String),
    #[error("malformed attribute '{attribute}' in '{input}' (expected key=value)")]
    MalformedAttribute { input: String, attribute: String },
}

fn is_kind_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | ':' | '-')
}

fn is_valid_kind(kind: &str) -> bool {
    !kind.is_empty() && kind.chars().all(is_kind_char)
}

/// Byte offsets of every `separator` outside a quoted section, or `None` if a
/// quote is left open.
fn separator_positions(text: &str, separator: char) -> Option<Vec<usize>> {
    let mut positions = Vec::new();
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if quoted {
            match c {
                '\\' => escaped = true,
                '"' => quoted = false,
                _ => {}
            }
        } else if c == '"' {
            quoted = true;
        } else if c == separator {
            positions.push(i);
        }
    }
    (!quoted).then_some(positions)
}

/// Decode one key or value: bare text is trimmed, quoted text is unescaped.
fn attribute_text(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let Some(quoted) = raw.strip_prefix('"') else {
        return (!raw.contains('"')).then(|| raw.to_string());
    };
    let mut text = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => text.push(chars.next()?),
            '"' => return chars.as_str().is_empty().then_some(text),
            _ => text.push(c),
        }
    }
    None
}

impl FromStr for Tag {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(TagParseError::Empty);
        }

        let (kind, rest) = match input.find('(') {
            Some(open) => (&input[..open], Some(&input[open + 1..])),
            None => (input, None),
        };
        let mut tag = Tag::try_new(kind.trim())?;
        let Some(rest) = rest else {
            return Ok(tag);
        };

        let unterminated = || TagParseError::Unterminated(input.to_string());
        let body = rest.strip_suffix(')').ok_or_else(unterminated)?;
        let commas = separator_positions(body, ',').ok_or_else(unterminated)?;

        let mut start = 0;
        let ends = commas.into_iter().chain(std::iter::once(body.len()));
        for end in ends {
            let attribute = body[start..end].trim();
            start = end + 1;
            if attribute.is_empty() {
                continue;
            }
            let malformed = || TagParseError::MalformedAttribute {
                input: input.to_string(),
                attribute: attribute.to_string(),
            };
            let eq = separator_positions(attribute, '=')
                .and_then(|positions| positions.first().copied())
                .ok_or_else(malformed)?;
            let (key, value) = (&attribute[..eq], &attribute[eq + 1..]);
            if key.trim().is_empty() {
                return Err(malformed());
            }
            let key = attribute_text(key).ok_or_else(malformed)?;
            let value = attribute_text(value).ok_or_else(malformed)?;
            tag = tag.with_attribute(key, value);
        }
        Ok(tag)
    }
}

/// Wire form of a tag: either the compact string or an explicit object.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TagRepr {
    Short(String),
    Full {
        kind: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
    },
}

impl TryFrom<TagRepr> for Tag {
    type Error = TagParseError;

    fn try_from(repr: TagRepr) -> Result<Self, Self::Error> {
        match repr {
            TagRepr::Short(s) => s.parse(),
            TagRepr::Full { kind, attributes } => Ok(Tag {
                attributes,
                ..Tag::try_new(kind)?
            }),
        }
    }
}

impl From<Tag> for TagRepr {
    fn from(tag: Tag) -> Self {
        TagRepr::Full {
            kind: tag.kind.to_string(),
            attributes: tag.attributes,
        }
    }
}

/// Insertion-ordered set of tags with value-based deduplication.
///
/// Marker sets are small (a handful of entries per call site), so membership is
/// a linear scan over the backing vector, the same trade-off a list with a
/// `contains` check makes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Tag>", into = "Vec<Tag>")]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag. Returns `false` if an equal tag was already present.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether any tag of the given kind is present.
    pub fn contains_kind(&self, kind: &str) -> bool {
        self.tags.iter().any(|t| t.is_kind(kind))
    }

    /// Whether every tag in `required` is present in this set.
    pub fn contains_all<'a>(&self, required: impl IntoIterator<Item = &'a Tag>) -> bool {
        required.into_iter().all(|t| self.contains(t))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }

    pub fn into_vec(self) -> Vec<Tag> {
        self.tags
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.tags.iter().map(Tag::to_string).collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}

impl From<Vec<Tag>> for TagSet {
    fn from(tags: Vec<Tag>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<Tag> {
    fn from(set: TagSet) -> Self {
        set.tags
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl Extend<Tag> for TagSet {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        for tag in iter {
            self.insert(tag);
        }
    }
}

impl IntoIterator for TagSet {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}
