//! Case and punctuation preservation for token replacements.

/// Reapply an original token's surface form to a bare replacement word:
/// full-uppercase originals uppercase the replacement, capitalized originals
/// capitalize it, and trailing non-alphabetic characters stripped from the
/// original are appended back. Never fails; worst case it returns the bare
/// replacement unchanged.
pub(crate) fn preserve_case_and_punctuation(original: &str, replacement: &str) -> String {
    let mut result = if is_all_uppercase(original) {
        replacement.to_uppercase()
    } else if original
        .chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
    {
        capitalize(replacement)
    } else {
        replacement.to_string()
    };

    result.push_str(trailing_punctuation(original));
    result
}

/// True when the token has at least one letter and every letter is uppercase.
fn is_all_uppercase(token: &str) -> bool {
    let mut has_alpha = false;
    for c in token.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    has_alpha
}

/// First letter uppercased, the rest lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// The non-alphabetic suffix of a token ("," in "Teh,", "" in "don't").
fn trailing_punctuation(token: &str) -> &str {
    let end = token
        .char_indices()
        .rev()
        .take_while(|(_, c)| !c.is_alphabetic())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[end..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalized_with_trailing_comma() {
        assert_eq!(preserve_case_and_punctuation("Teh,", "the"), "The,");
    }

    #[test]
    fn test_all_uppercase_stays_uppercase() {
        assert_eq!(preserve_case_and_punctuation("HOUSE", "house"), "HOUSE");
    }

    #[test]
    fn test_lowercase_passes_through() {
        assert_eq!(preserve_case_and_punctuation("teh", "the"), "the");
    }

    #[test]
    fn test_multiple_trailing_characters() {
        assert_eq!(preserve_case_and_punctuation("freind!?", "friend"), "friend!?");
    }

    #[test]
    fn test_internal_punctuation_is_not_appended() {
        assert_eq!(preserve_case_and_punctuation("don't", "dont"), "dont");
    }

    #[test]
    fn test_empty_original_returns_bare_replacement() {
        assert_eq!(preserve_case_and_punctuation("", "word"), "word");
    }

    #[test]
    fn test_no_alphabetic_original() {
        // A token that is pure punctuation capitalizes nothing and carries
        // itself over as the trailing suffix.
        assert_eq!(preserve_case_and_punctuation("...", "and"), "and...");
    }
}
