//! Shape-based token matching

use etk_domain::{shape_of, Extraction, Extractor, ExtractorError, ExtractorInput, InputKind};

/// Emits tokens whose shape signature equals a fixed shape
///
/// The shape can be given directly (`"dd.d"`) or derived from an example
/// token with [`ShapeExtractor::like`].
#[derive(Debug, Clone)]
pub struct ShapeExtractor {
    name: String,
    shape: String,
}

impl ShapeExtractor {
    /// Match tokens with exactly this shape
    pub fn new(name: impl Into<String>, shape: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: shape.into(),
        }
    }

    /// Match tokens shaped like `example`
    pub fn like(name: impl Into<String>, example: &str) -> Self {
        Self::new(name, shape_of(example))
    }

    /// The shape being matched
    pub fn shape(&self) -> &str {
        &self.shape
    }
}

impl Extractor for ShapeExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Tokens
    }

    fn extract(&self, input: ExtractorInput<'_>) -> Result<Vec<Extraction>, ExtractorError> {
        let ExtractorInput::Tokens(tokens) = input else {
            return Err(ExtractorError::UnsupportedInput {
                extractor: self.name.clone(),
                expected: "tokens".to_string(),
            });
        };

        Ok(tokens
            .iter()
            .filter(|t| t.shape == self.shape)
            .map(|t| Extraction::new(t.text.clone(), self.name.clone()).with_span(t.offset, t.end_offset()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etk_tokenizer::Tokenizer;
    use serde_json::json;

    #[test]
    fn test_decimal_shapes() {
        let tokens = Tokenizer::default().tokenize("32.4 -32.1 and 7").unwrap();
        let extractor = ShapeExtractor::like("decimals", "10.5");
        assert_eq!(extractor.shape(), "dd.d");

        let result = extractor.extract(ExtractorInput::Tokens(&tokens)).unwrap();
        let values: Vec<_> = result.iter().map(|e| e.value.clone()).collect();
        assert_eq!(values, [json!("32.4"), json!("32.1")]);
        assert_eq!(result[1].start_char, Some(6));
    }

    #[test]
    fn test_text_input_rejected() {
        let extractor = ShapeExtractor::new("decimals", "dd.d");
        assert!(matches!(
            extractor.extract(ExtractorInput::Text("32.4")),
            Err(ExtractorError::UnsupportedInput { .. })
        ));
    }
}
