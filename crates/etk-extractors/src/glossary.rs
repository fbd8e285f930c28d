//! Glossary matching

use etk_domain::{Extraction, Extractor, ExtractorError, ExtractorInput, InputKind, Token};
use etk_tokenizer::Tokenizer;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// A list of known phrases
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glossary {
    entries: Vec<String>,
}

impl Glossary {
    /// Build a glossary from entries, skipping blanks
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(Into::into)
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Parse a glossary with one entry per line
    pub fn from_lines(text: &str) -> Self {
        Self::from_entries(text.lines())
    }

    /// Parse a glossary stored as a JSON array of strings
    pub fn from_json_str(json: &str) -> Result<Self, ExtractorError> {
        let entries: Vec<String> = serde_json::from_str(json)
            .map_err(|e| ExtractorError::Config(format!("Glossary is not a JSON string array: {}", e)))?;
        Ok(Self::from_entries(entries))
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Finds glossary phrases in token streams
///
/// Matching runs over the non-whitespace tokens, tries the longest n-gram
/// first and never reports overlapping matches. The glossary's own spelling
/// is emitted, so case-insensitive matches are normalized.
#[derive(Debug, Clone)]
pub struct GlossaryExtractor {
    name: String,
    glossary: Glossary,
    tokenizer: Tokenizer,
    case_sensitive: bool,
    ngrams: Option<usize>,
    lookup: HashMap<String, String>,
    longest_entry: usize,
}

impl GlossaryExtractor {
    /// Create a case-insensitive extractor with no n-gram cap
    pub fn new(
        glossary: Glossary,
        name: impl Into<String>,
        tokenizer: Tokenizer,
    ) -> Result<Self, ExtractorError> {
        let mut extractor = Self {
            name: name.into(),
            glossary,
            tokenizer,
            case_sensitive: false,
            ngrams: None,
            lookup: HashMap::new(),
            longest_entry: 0,
        };
        extractor.rebuild()?;
        Ok(extractor)
    }

    /// Match case exactly
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Result<Self, ExtractorError> {
        self.case_sensitive = case_sensitive;
        self.rebuild()?;
        Ok(self)
    }

    /// Only consider phrases of up to `n` tokens
    pub fn ngrams(mut self, n: usize) -> Result<Self, ExtractorError> {
        if n == 0 {
            return Err(ExtractorError::Config("ngrams must be greater than 0".to_string()));
        }
        self.ngrams = Some(n);
        Ok(self)
    }

    /// Longest phrase length considered, in tokens
    pub fn max_ngram(&self) -> usize {
        match self.ngrams {
            Some(n) => n.min(self.longest_entry),
            None => self.longest_entry,
        }
    }

    fn rebuild(&mut self) -> Result<(), ExtractorError> {
        let mut lookup = HashMap::with_capacity(self.glossary.len());
        let mut longest = 0;

        for entry in self.glossary.entries() {
            let tokens = self.tokenizer.tokenize(entry).map_err(|e| {
                ExtractorError::Config(format!("Cannot tokenize glossary entry {:?}: {}", entry, e))
            })?;
            let words: Vec<&Token> = tokens.iter().filter(|t| !t.is_whitespace()).collect();
            longest = longest.max(words.len());
            // First spelling wins for duplicate keys
            lookup
                .entry(self.key(words.iter().map(|t| t.text.as_str())))
                .or_insert_with(|| entry.clone());
        }

        debug!(
            "Glossary extractor '{}' indexed {} phrases (longest {} tokens)",
            self.name,
            lookup.len(),
            longest
        );
        self.lookup = lookup;
        self.longest_entry = longest;
        Ok(())
    }

    fn key<'a>(&self, words: impl Iterator<Item = &'a str>) -> String {
        let joined = words.collect::<Vec<_>>().join(" ");
        if self.case_sensitive {
            joined
        } else {
            joined.to_lowercase()
        }
    }

    fn match_tokens(&self, tokens: &[Token]) -> Vec<Extraction> {
        let words: Vec<&Token> = tokens.iter().filter(|t| !t.is_whitespace()).collect();
        let max_n = self.max_ngram();
        let mut extractions = Vec::new();

        let mut i = 0;
        while i < words.len() {
            let longest = max_n.min(words.len() - i);
            let found = (1..=longest).rev().find_map(|n| {
                let window = &words[i..i + n];
                self.lookup
                    .get(&self.key(window.iter().map(|t| t.text.as_str())))
                    .map(|canonical| (n, canonical))
            });

            match found {
                Some((n, canonical)) => {
                    let start = words[i].offset;
                    let end = words[i + n - 1].end_offset();
                    extractions.push(
                        Extraction::new(canonical.clone(), self.name.clone()).with_span(start, end),
                    );
                    i += n;
                }
                None => i += 1,
            }
        }

        extractions
    }

    fn match_text(&self, text: &str) -> Result<Vec<Extraction>, ExtractorError> {
        let tokens = self
            .tokenizer
            .tokenize(text)
            .map_err(|e| ExtractorError::Tokenizer {
                extractor: self.name.clone(),
                message: e.to_string(),
            })?;
        Ok(self.match_tokens(&tokens))
    }
}

impl Extractor for GlossaryExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Tokens
    }

    fn extract(&self, input: ExtractorInput<'_>) -> Result<Vec<Extraction>, ExtractorError> {
        match input {
            ExtractorInput::Tokens(tokens) => Ok(self.match_tokens(tokens)),
            ExtractorInput::Text(text) => self.match_text(text),
            ExtractorInput::Value(Value::String(text)) => self.match_text(text),
            ExtractorInput::Value(_) => Err(ExtractorError::UnsupportedInput {
                extractor: self.name.clone(),
                expected: "text or tokens".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etk_domain::{RawSpan, TokenProvider};
    use etk_tokenizer::WordBoundaryProvider;
    use serde_json::json;

    fn names() -> Glossary {
        Glossary::from_lines("Dongyu Li\nSylvia Lin\nAmandeep\nPedro\nMayank\n\nYixiang\n")
    }

    fn values(extractions: &[Extraction]) -> Vec<Value> {
        extractions.iter().map(|e| e.value.clone()).collect()
    }

    /// Behaves for glossary entries, misreports spans for `"abc"`
    struct MisalignedProvider;

    impl TokenProvider for MisalignedProvider {
        fn spans(&self, text: &str) -> Vec<RawSpan> {
            if text == "abc" {
                vec![RawSpan::new("zzz", 0)]
            } else {
                WordBoundaryProvider::new().spans(text)
            }
        }
    }

    #[test]
    fn test_tokenizer_failure_on_text_is_fatal() {
        let tokenizer = Tokenizer::new(MisalignedProvider);
        let extractor = GlossaryExtractor::new(names(), "names", tokenizer).unwrap();

        let err = extractor.extract(ExtractorInput::Text("abc")).unwrap_err();
        assert!(matches!(err, ExtractorError::Tokenizer { ref extractor, .. } if extractor == "names"));
        assert!(err.is_fatal());

        let err = extractor.extract(ExtractorInput::Value(&json!("abc"))).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_glossary_from_lines_skips_blanks() {
        assert_eq!(names().len(), 6);
    }

    #[test]
    fn test_glossary_from_json() {
        let glossary = Glossary::from_json_str(r#"["Pedro", " Mayank "]"#).unwrap();
        assert_eq!(glossary.entries(), ["Pedro", "Mayank"]);
        assert!(Glossary::from_json_str("{}").is_err());
    }

    #[test]
    fn test_matches_multi_word_names_case_insensitively() {
        let extractor = GlossaryExtractor::new(names(), "names", Tokenizer::default()).unwrap();
        let text = "implemented by Runqi12 Shao, Dongyu Li, Sylvia lin, Amandeep and others.";
        let result = extractor.extract(ExtractorInput::Text(text)).unwrap();
        assert_eq!(
            values(&result),
            [json!("Dongyu Li"), json!("Sylvia Lin"), json!("Amandeep")]
        );
    }

    #[test]
    fn test_match_provenance_in_code_points() {
        let extractor = GlossaryExtractor::new(names(), "names", Tokenizer::default()).unwrap();
        let result = extractor.extract(ExtractorInput::Text("by Pedro, Mayank")).unwrap();
        assert_eq!(result[0].start_char, Some(3));
        assert_eq!(result[0].end_char, Some(8));
        assert_eq!(result[1].start_char, Some(10));
        assert_eq!(result[0].extractor, "names");
    }

    #[test]
    fn test_case_sensitive_mode() {
        let extractor = GlossaryExtractor::new(names(), "names", Tokenizer::default())
            .unwrap()
            .case_sensitive(true)
            .unwrap();
        let result = extractor.extract(ExtractorInput::Text("pedro and Pedro")).unwrap();
        assert_eq!(values(&result), [json!("Pedro")]);
    }

    #[test]
    fn test_ngram_cap_blocks_long_phrases() {
        let extractor = GlossaryExtractor::new(names(), "names", Tokenizer::default())
            .unwrap()
            .ngrams(1)
            .unwrap();
        let result = extractor.extract(ExtractorInput::Text("Dongyu Li and Pedro")).unwrap();
        assert_eq!(values(&result), [json!("Pedro")]);
    }

    #[test]
    fn test_zero_ngrams_rejected() {
        let extractor = GlossaryExtractor::new(names(), "names", Tokenizer::default()).unwrap();
        assert!(extractor.ngrams(0).is_err());
    }

    #[test]
    fn test_token_input() {
        let tokenizer = Tokenizer::default();
        let extractor = GlossaryExtractor::new(names(), "names", tokenizer.clone()).unwrap();
        let tokens = tokenizer.tokenize("Yixiang\n\nMayank").unwrap();
        let result = extractor.extract(ExtractorInput::Tokens(&tokens)).unwrap();
        assert_eq!(values(&result), [json!("Yixiang"), json!("Mayank")]);
    }

    #[test]
    fn test_non_string_value_is_unsupported() {
        let extractor = GlossaryExtractor::new(names(), "names", Tokenizer::default()).unwrap();
        let value = json!({"a": 1});
        assert!(matches!(
            extractor.extract(ExtractorInput::Value(&value)),
            Err(ExtractorError::UnsupportedInput { .. })
        ));
    }
}
