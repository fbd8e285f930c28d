//! Tokens and shape signatures

use serde::{Deserialize, Serialize};

/// A single token of some input text
///
/// `offset` counts Unicode scalar values (code points) from the start of the
/// original text, so it matches what callers see when they index by `chars()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Exact substring of the original text
    pub text: String,

    /// Start of the token in the original text, in code points
    pub offset: usize,

    /// Shape signature of `text` (see [`shape_of`])
    pub shape: String,
}

impl Token {
    /// Create a token, computing its shape from the text
    ///
    /// # Examples
    ///
    /// ```
    /// use etk_domain::Token;
    ///
    /// let token = Token::new("32.4", 12);
    /// assert_eq!(token.shape, "dd.d");
    /// assert_eq!(token.end_offset(), 16);
    /// ```
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        let shape = shape_of(&text);
        Self {
            text,
            offset,
            shape,
        }
    }

    /// Offset one past the last code point of this token
    pub fn end_offset(&self) -> usize {
        self.offset + self.text.chars().count()
    }

    /// True when the token consists only of whitespace
    pub fn is_whitespace(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_whitespace)
    }
}

/// Compute the shape signature of a piece of text
///
/// Every letter becomes `x`, every digit becomes `d`, and every other
/// character is kept as itself. Runs are not collapsed, so the signature
/// always has exactly one symbol per input character.
///
/// # Examples
///
/// ```
/// use etk_domain::shape_of;
///
/// assert_eq!(shape_of("32.4"), "dd.d");
/// assert_eq!(shape_of("dsa"), "xxx");
/// assert_eq!(shape_of("(123)"), "(ddd)");
/// ```
pub fn shape_of(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphabetic() {
                'x'
            } else if c.is_numeric() {
                'd'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_letters_and_digits() {
        assert_eq!(shape_of("Runqi12"), "xxxxxdd");
        assert_eq!(shape_of("6789,"), "dddd,");
        assert_eq!(shape_of("-"), "-");
    }

    #[test]
    fn test_shape_keeps_whitespace() {
        assert_eq!(shape_of("\n "), "\n ");
        assert_eq!(shape_of("   "), "   ");
    }

    #[test]
    fn test_shape_non_ascii_letters() {
        assert_eq!(shape_of("Zoë"), "xxx");
        assert_eq!(shape_of("東京"), "xx");
    }

    #[test]
    fn test_shape_of_empty() {
        assert_eq!(shape_of(""), "");
    }

    #[test]
    fn test_token_end_offset_counts_code_points() {
        let token = Token::new("Zoë", 3);
        assert_eq!(token.end_offset(), 6);
    }

    #[test]
    fn test_whitespace_token() {
        assert!(Token::new(" \n", 0).is_whitespace());
        assert!(!Token::new("a ", 0).is_whitespace());
        assert!(!Token::new("", 0).is_whitespace());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: one shape symbol per input character
        #[test]
        fn test_shape_length_matches_chars(text in ".*") {
            prop_assert_eq!(shape_of(&text).chars().count(), text.chars().count());
        }

        /// Property: shapes are pure functions of the text
        #[test]
        fn test_shape_is_stable(text in ".*") {
            prop_assert_eq!(shape_of(&text), shape_of(&text));
        }
    }
}
