//! Source preparation ahead of the markdown parser.
//!
//! The RFC dialect carries lines CommonMark has no syntax for: `%%%` title
//! block fences, `{frontmatter}`-style matter markers, standalone `{...}`
//! attribute lines and the `A>` / `N>` / `AS>` region prefixes. Those lines
//! are rewritten into `<!--md2rfc:...-->` comment markers that ride through
//! pulldown-cmark as HTML blocks and surface as events for the walker.

use crate::ConvertError;

/// Marker prefix shared with the walker's HTML block dispatch.
pub(crate) const DIRECTIVE_PREFIX: &str = "<!--md2rfc:";

/// Split a leading `%%%` title block off the source.
///
/// Returns the raw TOML between the fences (when present) and the remainder
/// of the document. An opening fence without a closing one is an error.
pub(crate) fn split_title_block(source: &str) -> Result<(Option<&str>, &str), ConvertError> {
    let mut lines = source.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok((None, source));
    };
    if first.trim_end() != "%%%" {
        return Ok((None, source));
    }
    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == "%%%" {
            let toml = &source[start..offset];
            let rest = &source[offset + line.len()..];
            return Ok((Some(toml), rest));
        }
        offset += line.len();
    }
    Err(ConvertError::UnterminatedTitleBlock)
}

/// Line rewriter that turns dialect lines into directive comments.
///
/// Fenced code blocks shield their content: a `{mainmatter}` line inside a
/// fence stays literal. Region prefixes are stripped line by line and the
/// unwrapped content is bracketed with `begin` / `end` markers; the first
/// line without the prefix ends the region.
pub(crate) struct Preprocessor {
    fence: Fences,
    region: Option<&'static str>,
}

impl Preprocessor {
    pub(crate) fn new() -> Self {
        Self {
            fence: Fences::new(),
            region: None,
        }
    }

    /// Rewrite dialect lines and return the prepared markdown.
    pub(crate) fn process(&mut self, source: &str) -> String {
        let mut output = String::with_capacity(source.len() + 64);
        for line in source.lines() {
            self.line(line, &mut output);
        }
        self.close_region(&mut output);
        output
    }

    fn line(&mut self, line: &str, output: &mut String) {
        if let Some(name) = self.region {
            if let Some((kind, rest)) = region_line(line)
                && kind == name
            {
                self.fence.update(rest);
                output.push_str(rest);
                output.push('\n');
                return;
            }
            self.close_region(output);
        }
        if self.fence.update(line) || self.fence.active() {
            output.push_str(line);
            output.push('\n');
            return;
        }
        let trimmed = line.trim();
        if let Some(phase) = matter_line(trimmed) {
            output.push_str(&format!("{DIRECTIVE_PREFIX}matter {phase}-->\n"));
            return;
        }
        if let Some(inner) = attr_line(trimmed) {
            output.push_str(&format!("{DIRECTIVE_PREFIX}attrs {inner}-->\n"));
            return;
        }
        if let Some((name, rest)) = region_line(line) {
            self.region = Some(name);
            output.push_str(&format!("{DIRECTIVE_PREFIX}begin {name}-->\n\n"));
            self.fence.update(rest);
            output.push_str(rest);
            output.push('\n');
            return;
        }
        output.push_str(line);
        output.push('\n');
    }

    fn close_region(&mut self, output: &mut String) {
        if let Some(name) = self.region.take() {
            output.push_str(&format!("\n{DIRECTIVE_PREFIX}end {name}-->\n"));
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Match a region prefix and return the kind with the unwrapped content.
///
/// `AS>` is listed ahead of `A>` so the aside prefix is never read as an
/// abstract line with a stray `S`.
fn region_line(line: &str) -> Option<(&'static str, &str)> {
    const REGIONS: [(&str, &str); 3] = [("AS>", "aside"), ("A>", "abstract"), ("N>", "note")];
    REGIONS.iter().find_map(|&(prefix, name)| {
        line.strip_prefix(prefix)
            .map(|rest| (name, rest.strip_prefix(' ').unwrap_or(rest)))
    })
}

fn matter_line(trimmed: &str) -> Option<&'static str> {
    match trimmed {
        "{frontmatter}" => Some("front"),
        "{mainmatter}" => Some("main"),
        "{backmatter}" => Some("back"),
        _ => None,
    }
}

/// Match a standalone attribute line like `{#anchor}` or `{type="abnf"}`.
///
/// Only lines whose body starts with `#` or `.` or carries a `=` pair are
/// taken; anything else in braces stays literal text.
fn attr_line(trimmed: &str) -> Option<&str> {
    let inner = trimmed.strip_prefix('{')?.strip_suffix('}')?;
    let first = inner.trim_start().chars().next()?;
    if first == '#' || first == '.' || inner.contains('=') {
        Some(inner)
    } else {
        None
    }
}

/// Tracks whether the current line sits inside a fenced code block.
struct Fences {
    open: Option<(char, usize)>,
}

impl Fences {
    const fn new() -> Self {
        Self { open: None }
    }

    const fn active(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line; returns true when the line is a fence marker itself.
    fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.open {
            Some((ch, len)) => {
                let run = trimmed.chars().take_while(|&c| c == ch).count();
                if run >= len && trimmed[run..].trim().is_empty() {
                    self.open = None;
                    true
                } else {
                    false
                }
            }
            None => {
                let Some(first) = trimmed.chars().next() else {
                    return false;
                };
                if first != '`' && first != '~' {
                    return false;
                }
                let run = trimmed.chars().take_while(|&c| c == first).count();
                if run >= 3 {
                    self.open = Some((first, run));
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn process(source: &str) -> String {
        Preprocessor::new().process(source)
    }

    #[test]
    fn test_title_block_splits_cleanly() {
        let source = "%%%\ntitle = \"DNS Cookies\"\n%%%\n\n# Body\n";
        let (toml, rest) = split_title_block(source).unwrap();
        assert_eq!(toml, Some("title = \"DNS Cookies\"\n"));
        assert_eq!(rest, "\n# Body\n");
    }

    #[test]
    fn test_document_without_title_block_passes_through() {
        let source = "# Just markdown\n";
        let (toml, rest) = split_title_block(source).unwrap();
        assert_eq!(toml, None);
        assert_eq!(rest, source);
    }

    #[test]
    fn test_unterminated_title_block_is_an_error() {
        let result = split_title_block("%%%\ntitle = \"broken\"\n");
        assert!(matches!(result, Err(ConvertError::UnterminatedTitleBlock)));
    }

    #[test]
    fn test_matter_lines_become_markers() {
        let output = process("{frontmatter}\n\ntext\n\n{mainmatter}\n");
        assert_eq!(
            output,
            "<!--md2rfc:matter front-->\n\ntext\n\n<!--md2rfc:matter main-->\n"
        );
    }

    #[test]
    fn test_attribute_lines_become_markers() {
        let output = process("{type=\"abnf\"}\n```\nrule = x\n```\n");
        assert_eq!(
            output,
            "<!--md2rfc:attrs type=\"abnf\"-->\n```\nrule = x\n```\n"
        );
    }

    #[test]
    fn test_braced_words_stay_literal() {
        let output = process("{placeholder}\n");
        assert_eq!(output, "{placeholder}\n");
    }

    #[test]
    fn test_fences_shield_dialect_lines() {
        let source = "```\n{mainmatter}\nA> quoted\n```\n";
        assert_eq!(process(source), source);
    }

    #[test]
    fn test_tilde_fences_are_tracked_too() {
        let source = "~~~~\n{backmatter}\n~~~~\n";
        assert_eq!(process(source), source);
    }

    #[test]
    fn test_abstract_region_is_bracketed() {
        let output = process("A> One.\nA> Two.\n");
        assert_eq!(
            output,
            "<!--md2rfc:begin abstract-->\n\nOne.\nTwo.\n\n<!--md2rfc:end abstract-->\n"
        );
    }

    #[test]
    fn test_aside_prefix_is_not_read_as_abstract() {
        let output = process("AS> An aside.\n");
        assert_eq!(
            output,
            "<!--md2rfc:begin aside-->\n\nAn aside.\n\n<!--md2rfc:end aside-->\n"
        );
    }

    #[test]
    fn test_region_ends_at_first_plain_line() {
        let output = process("N> Editors take note.\n\nBody text.\n");
        assert_eq!(
            output,
            "<!--md2rfc:begin note-->\n\nEditors take note.\n\n<!--md2rfc:end note-->\n\n\
             Body text.\n"
        );
    }

    #[test]
    fn test_bare_prefix_keeps_paragraph_breaks_inside_region() {
        let output = process("A> First.\nA>\nA> Second.\n");
        assert_eq!(
            output,
            "<!--md2rfc:begin abstract-->\n\nFirst.\n\nSecond.\n\n<!--md2rfc:end abstract-->\n"
        );
    }

    #[test]
    fn test_fences_inside_regions_shield_their_content() {
        let output = process("A> ```\nA> {mainmatter}\nA> ```\n");
        assert_eq!(
            output,
            "<!--md2rfc:begin abstract-->\n\n```\n{mainmatter}\n```\n\n<!--md2rfc:end abstract-->\n"
        );
    }

    #[test]
    fn test_closing_fence_needs_matching_char_and_length() {
        let mut fence = Fences::new();
        assert!(fence.update("````rust"));
        assert!(!fence.update("```"));
        assert!(fence.active());
        assert!(!fence.update("~~~~"));
        assert!(fence.update("`````"));
        assert!(!fence.active());
    }
}
