//! Block attribute lists and the deferred attribute queue.
//!
//! Attribute lists use the `#id .class key=value key2="two words"` form,
//! written on their own line above the block they decorate. The walker
//! queues each parsed list; the next block renderer consumes the whole
//! queue, whether or not it can attach anything.

/// Parsed attribute list for one block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockAttrs {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
}

impl BlockAttrs {
    /// Parse the inner text of an attribute list, braces already stripped.
    /// Unrecognized tokens are skipped.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut parsed = Self::default();
        for token in tokenize(input) {
            if let Some(id) = token.strip_prefix('#') {
                if !id.is_empty() {
                    parsed.id = Some(id.to_owned());
                }
            } else if let Some(class) = token.strip_prefix('.') {
                if !class.is_empty() {
                    parsed.classes.push(class.to_owned());
                }
            } else if let Some((key, value)) = token.split_once('=') {
                if !key.is_empty() {
                    parsed.attrs.push((key.to_owned(), unquote(value).to_owned()));
                }
            } else {
                tracing::debug!(token, "skipping unrecognized attribute token");
            }
        }
        parsed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }
}

/// Split on whitespace outside double quotes, keeping the quotes in place
/// for [`unquote`] to strip.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// FIFO queue of attribute sets awaiting the next block.
#[derive(Debug, Default)]
pub(crate) struct AttrQueue {
    pending: Vec<BlockAttrs>,
}

impl AttrQueue {
    pub(crate) fn enqueue(&mut self, attrs: BlockAttrs) {
        self.pending.push(attrs);
    }

    /// Take every queued set, leaving the queue empty for the next block.
    pub(crate) fn drain(&mut self) -> Vec<BlockAttrs> {
        std::mem::take(&mut self.pending)
    }
}

/// Queued attribute sets merged for a single block. Later sets override the
/// id; key/value pairs keep their queue order. Classes have no attribute
/// form in the output vocabulary and are dropped here.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct MergedAttrs {
    pub(crate) id: Option<String>,
    pub(crate) pairs: Vec<(String, String)>,
}

impl MergedAttrs {
    pub(crate) fn from_sets(sets: Vec<BlockAttrs>) -> Self {
        let mut merged = Self::default();
        for set in sets {
            if set.id.is_some() {
                merged.id = set.id;
            }
            if !set.classes.is_empty() {
                tracing::debug!(classes = ?set.classes, "dropping classes from attribute list");
            }
            merged.pairs.extend(set.attrs);
        }
        merged
    }
}
