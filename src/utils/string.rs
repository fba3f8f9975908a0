/// Normalizes a string before similarity scoring.
///
/// Lowercases, turns every non-alphanumeric character into a space,
/// collapses runs of whitespace and trims both ends. Two strings that only
/// differ in case, punctuation or spacing normalize to the same text.
pub fn default_process(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Whitespace-separated tokens of a normalized string, sorted.
pub fn sorted_tokens(text: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_process() {
        assert_eq!(default_process("  New-York,  CITY! "), "new york city");
        assert_eq!(default_process("O'Brien"), "o brien");
        assert_eq!(default_process("***"), "");
        assert_eq!(default_process("ÉCOLE"), "école");
        assert_eq!(default_process("a\t\nb"), "a b");
    }

    #[test]
    fn test_sorted_tokens() {
        assert_eq!(sorted_tokens("york new city"), vec!["city", "new", "york"]);
        assert!(sorted_tokens("").is_empty());
    }
}
