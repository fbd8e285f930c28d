//! Regular expression matching

use etk_domain::{Extraction, Extractor, ExtractorError, ExtractorInput, InputKind};
use etk_tokenizer::Tokenizer;
use regex::Regex;
use serde_json::Value;

/// Emits every match of a regular expression in the input text
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    name: String,
    regex: Regex,
    group: usize,
}

impl RegexExtractor {
    /// Compile `pattern`; the whole match is emitted
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, ExtractorError> {
        let regex = Regex::new(pattern)
            .map_err(|e| ExtractorError::Config(format!("Invalid pattern {:?}: {}", pattern, e)))?;
        Ok(Self {
            name: name.into(),
            regex,
            group: 0,
        })
    }

    /// Emit capture group `group` instead of the whole match
    pub fn group(mut self, group: usize) -> Result<Self, ExtractorError> {
        if group >= self.regex.captures_len() {
            return Err(ExtractorError::Config(format!(
                "Pattern has {} groups, cannot select group {}",
                self.regex.captures_len() - 1,
                group
            )));
        }
        self.group = group;
        Ok(self)
    }

    fn match_text(&self, text: &str) -> Vec<Extraction> {
        let mut extractions = Vec::new();
        // Byte-to-code-point conversion done incrementally, matches come in order
        let mut last_byte = 0;
        let mut last_char = 0;

        for caps in self.regex.captures_iter(text) {
            let Some(m) = caps.get(self.group) else {
                continue;
            };
            last_char += text[last_byte..m.start()].chars().count();
            last_byte = m.start();
            let start = last_char;
            let end = start + m.as_str().chars().count();
            extractions.push(Extraction::new(m.as_str(), self.name.clone()).with_span(start, end));
        }

        extractions
    }
}

impl Extractor for RegexExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Text
    }

    fn extract(&self, input: ExtractorInput<'_>) -> Result<Vec<Extraction>, ExtractorError> {
        match input {
            ExtractorInput::Text(text) => Ok(self.match_text(text)),
            ExtractorInput::Tokens(tokens) => Ok(self.match_text(&Tokenizer::reconstruct(tokens))),
            ExtractorInput::Value(Value::String(text)) => Ok(self.match_text(text)),
            ExtractorInput::Value(_) => Err(ExtractorError::UnsupportedInput {
                extractor: self.name.clone(),
                expected: "text".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            RegexExtractor::new("bad", "(unclosed"),
            Err(ExtractorError::Config(_))
        ));
    }

    #[test]
    fn test_matches_with_char_offsets() {
        let extractor = RegexExtractor::new("years", r"\d{4}").unwrap();
        let result = extractor.extract(ExtractorInput::Text("né 1984, mort 2019")).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].value, json!("1984"));
        assert_eq!(result[0].start_char, Some(3));
        assert_eq!(result[1].start_char, Some(14));
        assert_eq!(result[1].end_char, Some(18));
    }

    #[test]
    fn test_capture_group() {
        let extractor = RegexExtractor::new("user", r"(\w+)@isi\.edu")
            .unwrap()
            .group(1)
            .unwrap();
        let result = extractor.extract(ExtractorInput::Text("mail dsa@isi.edu")).unwrap();
        assert_eq!(result[0].value, json!("dsa"));
        assert_eq!(result[0].start_char, Some(5));
    }

    #[test]
    fn test_missing_group_rejected() {
        let extractor = RegexExtractor::new("plain", r"\d+").unwrap();
        assert!(extractor.group(1).is_err());
    }

    #[test]
    fn test_number_value_is_unsupported() {
        let extractor = RegexExtractor::new("plain", r"\d+").unwrap();
        let value = json!(12);
        assert!(extractor.extract(ExtractorInput::Value(&value)).is_err());
    }
}
