//! Go-to-definition for component tags.
//!
//! The host hands over the document and a cursor offset; the tag word under
//! the cursor (`<my-header` or `</MyHeader`) is normalized to PascalCase and
//! looked up in the document's component map.

use crate::origin_resolver::ResolutionSession;
use crate::project_config::ProjectConfig;
use crate::registration::{RegistrationExtractor, resolve_component_with};
use std::path::{Path, PathBuf};

/// PascalCase form of a tag or identifier: `my-header`, `my_header`,
/// `myHeader` and `MY_HEADER` all become `MyHeader`.
pub fn pascal_case(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    for part in split_words(word) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.extend(chars.flat_map(char::to_lowercase));
        }
    }
    result
}

/// Split on separators and on case boundaries (`myHeader` -> `my`, `Header`;
/// `HTMLInput` -> `HTML`, `Input`).
fn split_words(word: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for segment in word.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<(usize, char)> = segment.char_indices().collect();
        let mut start = 0;
        for i in 1..chars.len() {
            let (idx, c) = chars[i];
            let prev = chars[i - 1].1;
            let next_is_lower = chars.get(i + 1).is_some_and(|(_, n)| n.is_lowercase());
            let boundary = c.is_uppercase()
                && (prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower));
            if boundary {
                words.push(&segment[start..idx]);
                start = idx;
            }
        }
        if start < segment.len() {
            words.push(&segment[start..]);
        }
    }
    words
}

fn is_tag_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

/// Tag word at byte `offset`: a `<` or `/` followed by tag characters, on the
/// line containing `offset`, with the cursor anywhere from the `<` through
/// the end of the word. Returned without its leading `<` or `/`.
pub fn component_tag_at(source: &str, offset: usize) -> Option<&str> {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let bytes = source.as_bytes();
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[offset..].find('\n').map_or(source.len(), |i| offset + i);

    let mut pos = line_start;
    while pos < line_end {
        if matches!(bytes[pos], b'<' | b'/') {
            let word_start = pos + 1;
            let mut word_end = word_start;
            while word_end < line_end && is_tag_char(bytes[word_end]) {
                word_end += 1;
            }
            if word_end > word_start {
                if (pos..=word_end).contains(&offset) {
                    return Some(&source[word_start..word_end]);
                }
                pos = word_end;
                continue;
            }
        }
        pos += 1;
    }
    None
}

/// Definition file of the component registered as `public_name` (already
/// PascalCase) in `file`.
pub fn provide_definition(file: &Path, public_name: &str, config: &ProjectConfig) -> Option<PathBuf> {
    let mut session = ResolutionSession::new(config);
    provide_definition_with(&mut session, &RegistrationExtractor::default(), file, public_name)
}

/// [`provide_definition`] within an existing session, for registration
/// blocks recognized by `extractor`.
pub fn provide_definition_with(
    session: &mut ResolutionSession<'_>,
    extractor: &RegistrationExtractor,
    file: &Path,
    public_name: &str,
) -> Option<PathBuf> {
    let definition = resolve_component_with(session, extractor, file, public_name);
    if definition.is_none() {
        tracing::debug!(file = %file.display(), name = public_name, "no definition");
    }
    definition
}

/// Definition of the component tag under `offset` in `source`, the text of
/// `file`.
pub fn definition_at(
    file: &Path,
    source: &str,
    offset: usize,
    config: &ProjectConfig,
) -> Option<PathBuf> {
    let tag = component_tag_at(source, offset)?;
    provide_definition(file, &pascal_case(tag), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_normalizes_tag_spellings() {
        assert_eq!(pascal_case("my-header"), "MyHeader");
        assert_eq!(pascal_case("my_header"), "MyHeader");
        assert_eq!(pascal_case("myHeader"), "MyHeader");
        assert_eq!(pascal_case("MyHeader"), "MyHeader");
        assert_eq!(pascal_case("MY_HEADER"), "MyHeader");
        assert_eq!(pascal_case("HTMLInput"), "HtmlInput");
        assert_eq!(pascal_case("header"), "Header");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn tag_under_cursor() {
        let source = "<template>\n  <my-header :title=\"t\" />\n</template>";
        let open = source.find("<my-header").unwrap();
        assert_eq!(component_tag_at(source, open), Some("my-header"));
        assert_eq!(component_tag_at(source, open + 4), Some("my-header"));
        assert_eq!(component_tag_at(source, open + "<my-header".len()), Some("my-header"));
        // Inside the attribute list.
        assert_eq!(component_tag_at(source, open + 14), None);
    }

    #[test]
    fn closing_tag_under_cursor() {
        let source = "<Card>\n</Card>";
        let close = source.rfind("Card").unwrap();
        assert_eq!(component_tag_at(source, close + 1), Some("Card"));
        assert_eq!(component_tag_at(source, 2), Some("Card"));
    }

    #[test]
    fn offset_past_end_is_clamped() {
        assert_eq!(component_tag_at("<Foo", 100), Some("Foo"));
        assert_eq!(component_tag_at("", 3), None);
    }
}
