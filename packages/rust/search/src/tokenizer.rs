//! Identifier-aware tokenization for documentation text.
//!
//! Splits camelCase/PascalCase compounds before lowercasing so that code
//! symbols like `getMotorPosition` match prose queries like "motor position".

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Common stop words removed from both documents and queries.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do",
        "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
        "can", "need", "this", "that", "these", "those", "it", "its", "you", "your", "we",
        "our", "they", "their", "he", "she", "him", "her", "his", "hers",
    ]
    .into_iter()
    .collect()
});

// Lower-to-upper transition: "getMotor" → "get Motor".
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));

// Acronym-to-titlecase transition: "CANSparkMax" → "CAN SparkMax".
static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid regex"));

static WORD_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-]").expect("valid regex"));

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid regex"));

/// Tokenizer for index and query text. Stateless: identical input always
/// yields the identical token sequence.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    strip_stop_words: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            strip_stop_words: true,
        }
    }
}

impl Tokenizer {
    pub fn new(strip_stop_words: bool) -> Self {
        Self { strip_stop_words }
    }

    /// Split `text` into lowercase tokens of length > 1.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        // Split compound identifiers before lowercasing erases the boundaries.
        let text = CAMEL_BOUNDARY.replace_all(text, "$1 $2");
        let text = ACRONYM_BOUNDARY.replace_all(&text, "$1 $2");

        let text = text.to_lowercase();
        let text = WORD_SEPARATORS.replace_all(&text, " ");
        let text = NON_ALPHANUMERIC.replace_all(&text, " ");

        text.split_whitespace()
            .filter(|t| t.len() > 1)
            .filter(|t| !self.strip_stop_words || !STOP_WORDS.contains(t))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        Tokenizer::default().tokenize(text)
    }

    #[test]
    fn splits_camel_case() {
        let tokens = tokens("getMotorPosition");
        assert!(tokens.contains(&"get".to_string()));
        assert!(tokens.contains(&"motor".to_string()));
        assert!(tokens.contains(&"position".to_string()));
    }

    #[test]
    fn splits_acronym_prefixes() {
        let tokens = tokens("CANSparkMax");
        assert!(tokens.contains(&"can".to_string()));
        assert!(tokens.contains(&"spark".to_string()));
        assert!(tokens.contains(&"max".to_string()));
    }

    #[test]
    fn splits_snake_case() {
        let tokens = tokens("get_motor_position");
        assert!(tokens.contains(&"get".to_string()));
        assert!(tokens.contains(&"motor".to_string()));
        assert!(tokens.contains(&"position".to_string()));
    }

    #[test]
    fn splits_hyphenated_words() {
        let tokens = tokens("closed-loop control");
        assert!(tokens.contains(&"closed".to_string()));
        assert!(tokens.contains(&"loop".to_string()));
        assert!(tokens.contains(&"control".to_string()));
    }

    #[test]
    fn drops_stop_words_and_single_chars() {
        let tokens = tokens("the motor is running at x speed");
        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"is".to_string()));
        assert!(!tokens.contains(&"at".to_string()));
        assert!(!tokens.iter().any(|t| t.len() <= 1));
        assert!(tokens.contains(&"motor".to_string()));
        assert!(tokens.contains(&"running".to_string()));
    }

    #[test]
    fn keeps_stop_words_when_disabled() {
        let tokens = Tokenizer::new(false).tokenize("the motor");
        assert!(tokens.contains(&"the".to_string()));
        assert!(tokens.contains(&"motor".to_string()));
    }

    #[test]
    fn strips_punctuation() {
        let tokens = tokens("motor.set(0.5); // comment");
        assert!(tokens.contains(&"motor".to_string()));
        assert!(tokens.contains(&"set".to_string()));
        assert!(tokens.contains(&"comment".to_string()));
    }

    #[test]
    fn tokenizing_is_idempotent() {
        let text = "Configure the SparkMax motor_controller over CAN-bus";
        assert_eq!(tokens(text), tokens(text));
    }

    #[test]
    fn empty_and_stopword_only_input_yield_nothing() {
        assert!(tokens("").is_empty());
        assert!(tokens("the a an of").is_empty());
        assert!(tokens("x y z").is_empty());
    }
}
