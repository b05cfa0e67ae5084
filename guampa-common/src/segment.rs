//! Sentence segmentation for imported documents
//!
//! Source text is split on line breaks, then on `.`, `!` or `?` followed by
//! whitespace. Terminal punctuation stays with its sentence; blank fragments
//! are dropped.

/// Split `text` into trimmed, non-empty sentences in reading order
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    for line in text.lines() {
        let mut current = String::new();
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            current.push(c);
            let at_boundary = matches!(c, '.' | '!' | '?')
                && chars.peek().map_or(true, |next| next.is_whitespace());
            if at_boundary {
                push_trimmed(&mut sentences, &current);
                current.clear();
            }
        }
        push_trimmed(&mut sentences, &current);
    }

    sentences
}

fn push_trimmed(out: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_terminal_punctuation() {
        let out = split_sentences("Hola. ¿Qué tal? ¡Muy bien!");
        assert_eq!(out, vec!["Hola.", "¿Qué tal?", "¡Muy bien!"]);
    }

    #[test]
    fn test_lines_are_boundaries() {
        let out = split_sentences("first line\nsecond line");
        assert_eq!(out, vec!["first line", "second line"]);
    }

    #[test]
    fn test_blank_lines_and_whitespace_dropped() {
        let out = split_sentences("\n\n   \nOne.   \n\n  Two.  ");
        assert_eq!(out, vec!["One.", "Two."]);
    }

    #[test]
    fn test_inner_dots_do_not_split() {
        let out = split_sentences("Version 3.14 is out. Enjoy");
        assert_eq!(out, vec!["Version 3.14 is out.", "Enjoy"]);
    }

    #[test]
    fn test_repeated_punctuation_stays_together() {
        let out = split_sentences("Wait... what?! Yes.");
        assert_eq!(out, vec!["Wait...", "what?!", "Yes."]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("").is_empty());
    }
}
