//! Vue single-file component support: locate the `<script>` block.

/// Extension of single-file components whose script block is read instead of
/// the whole file.
pub const SFC_EXTENSION: &str = "vue";

/// One `<script ...>...</script>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptBlock<'a> {
    /// Attribute text of the opening tag, e.g. ` lang="ts" setup`
    pub attributes: &'a str,
    pub content: &'a str,
}

impl ScriptBlock<'_> {
    pub fn is_setup(&self) -> bool {
        self.attributes
            .split(|c: char| c.is_whitespace() || c == '=')
            .any(|attribute| attribute.eq_ignore_ascii_case("setup"))
    }

    pub fn lang(&self) -> Option<&str> {
        let start = self.attributes.find("lang=")? + "lang=".len();
        let rest = self.attributes[start..].trim_start_matches(['"', '\'']);
        let end = rest
            .find(|c: char| c == '"' || c == '\'' || c.is_whitespace())
            .unwrap_or(rest.len());
        Some(&rest[..end])
    }
}

/// Every script block of an SFC, in source order. Unterminated blocks are
/// ignored.
pub fn script_blocks(source: &str) -> Vec<ScriptBlock<'_>> {
    let lower = source.to_ascii_lowercase();
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = lower[cursor..].find("<script") {
        let tag_start = cursor + offset;
        let after_name = tag_start + "<script".len();
        // Reject `<scripts>` and the like.
        if !lower[after_name..].starts_with(|c: char| c == '>' || c.is_whitespace()) {
            cursor = after_name;
            continue;
        }
        let Some(tag_end) = lower[after_name..].find('>').map(|i| after_name + i) else {
            break;
        };
        let content_start = tag_end + 1;
        let Some(close) = lower[content_start..].find("</script").map(|i| content_start + i) else {
            break;
        };
        blocks.push(ScriptBlock {
            attributes: &source[after_name..tag_end],
            content: &source[content_start..close],
        });
        cursor = close + "</script".len();
    }

    blocks
}

/// The script block the component options live in: the first block that is
/// not `<script setup>`, falling back to the first block.
pub fn extract_script(source: &str) -> Option<&str> {
    let blocks = script_blocks(source);
    blocks
        .iter()
        .find(|block| !block.is_setup())
        .or_else(|| blocks.first())
        .map(|block| block.content)
}
