//! Whitespace tokenizer for ASE text.

/// Characters that separate tokens. Runs of them collapse.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\n', '\r', '\0'];

/// Split `text` into non-empty tokens, in order.
///
/// Braces are ordinary content: `{` is a token of its own only when
/// surrounded by delimiters. Numbers are not typed here.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(DELIMITERS).filter(|t| !t.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\r\n\0 ").is_empty());
    }

    #[test]
    fn delimiter_runs_collapse() {
        let tokens = tokenize("*MESH_VERTEX    0\t\t-1.5  \r\n 2.0\0\x003");
        assert_eq!(tokens, ["*MESH_VERTEX", "0", "-1.5", "2.0", "3"]);
    }

    #[test]
    fn braces_split_only_on_delimiters() {
        let tokens = tokenize("*MESH_VERTEX_LIST {\n}\n*NODE_NAME {box}");
        assert_eq!(tokens, ["*MESH_VERTEX_LIST", "{", "}", "*NODE_NAME", "{box}"]);
    }

    #[test]
    fn quoted_strings_are_not_special() {
        let tokens = tokenize("*MATERIAL_NAME \"Wood\"");
        assert_eq!(tokens, ["*MATERIAL_NAME", "\"Wood\""]);
    }
}
