//! # Token Dictionary
//!
//! Bidirectional table between well-known strings and compact token codes.
//!
//! ## Code Spaces
//! - `0`: reserved for the empty string (the "no tag" tag)
//! - `1 .. N1`: single-byte tokens, written as the code itself
//! - `N1 .. N1 + N2`: double-byte tokens, written as an escape byte plus the
//!   index inside the secondary table
//!
//! The order of the input lists *is* the numbering. Reordering a deployed
//! dictionary silently breaks compatibility with peers that still use the
//! old order; nothing here can detect that.
//!
//! A dictionary is immutable once built. Share it between threads with
//! `Arc<TokenDictionary>`.

use crate::config::DictionaryConfig;
use crate::core::marker::{MAX_DOUBLE_BYTE_TOKENS, MAX_SINGLE_BYTE_TOKENS};
use crate::error::{constants, CodecError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Wire form of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// One byte, the code itself
    Single(u8),
    /// Escape byte, then this index in the double-byte table
    Double(u8),
}

/// Immutable token table shared by the encoder and decoder
#[derive(Debug, Clone)]
pub struct TokenDictionary {
    version: u32,
    single_byte: Vec<String>,
    double_byte: Vec<String>,
    index: HashMap<String, Token>,
}

impl TokenDictionary {
    /// Build a dictionary from ordered token lists.
    ///
    /// `single_byte` receives codes starting at 1. `double_byte` receives
    /// codes right after the single-byte space.
    ///
    /// # Errors
    /// Returns `CodecError::Dictionary` if either table overflows its code
    /// space, an entry is empty, or an entry appears twice.
    pub fn new<I, J, S, T>(single_byte: I, double_byte: J) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut singles = vec![String::new()];
        singles.extend(single_byte.into_iter().map(Into::into));
        let doubles: Vec<String> = double_byte.into_iter().map(Into::into).collect();

        if singles.len() > MAX_SINGLE_BYTE_TOKENS {
            return Err(CodecError::Dictionary(format!(
                "{}: {} (maximum {})",
                constants::ERR_SINGLE_BYTE_FULL,
                singles.len() - 1,
                MAX_SINGLE_BYTE_TOKENS - 1
            )));
        }
        if doubles.len() > MAX_DOUBLE_BYTE_TOKENS {
            return Err(CodecError::Dictionary(format!(
                "{}: {} (maximum {})",
                constants::ERR_DOUBLE_BYTE_FULL,
                doubles.len(),
                MAX_DOUBLE_BYTE_TOKENS
            )));
        }

        let mut index = HashMap::with_capacity(singles.len() + doubles.len());
        let tokens = singles
            .iter()
            .enumerate()
            .map(|(i, s)| (s, Token::Single(i as u8)))
            .chain(
                doubles
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (s, Token::Double(i as u8))),
            );
        for (entry, token) in tokens {
            if entry.is_empty() && token != Token::Single(0) {
                return Err(CodecError::Dictionary(
                    constants::ERR_EMPTY_TOKEN.to_string(),
                ));
            }
            if index.insert(entry.clone(), token).is_some() {
                return Err(CodecError::Dictionary(format!(
                    "duplicate token: {entry:?}"
                )));
            }
        }

        debug!(
            single_byte = singles.len(),
            double_byte = doubles.len(),
            "Built token dictionary"
        );

        Ok(Self {
            version: 0,
            single_byte: singles,
            double_byte: doubles,
            index,
        })
    }

    /// Build from configuration: `tags` then `single_byte` fill the
    /// single-byte space, `double_byte` the secondary table.
    pub fn from_config(config: &DictionaryConfig) -> Result<Self> {
        let singles = config.tags.iter().chain(config.single_byte.iter()).cloned();
        let dictionary = Self::new(singles, config.double_byte.iter().cloned())?;
        Ok(dictionary.with_version(config.version))
    }

    /// Tag this table with a version number peers can compare
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Dictionary holding only the reserved empty-string code
    pub fn empty() -> Self {
        let mut index = HashMap::with_capacity(1);
        index.insert(String::new(), Token::Single(0));
        Self {
            version: 0,
            single_byte: vec![String::new()],
            double_byte: Vec::new(),
            index,
        }
    }

    /// Numeric code of `s`, if it is a token
    pub fn lookup_code(&self, s: &str) -> Option<u16> {
        self.token(s).map(|token| self.code_of(token))
    }

    /// String assigned to `code`, if any
    pub fn lookup_string(&self, code: u16) -> Option<&str> {
        let code = code as usize;
        let n1 = self.single_byte.len();
        if code < n1 {
            Some(self.single_byte[code].as_str())
        } else {
            self.double_byte.get(code - n1).map(String::as_str)
        }
    }

    /// Wire form of `s`, if it is a token
    #[inline]
    pub fn token(&self, s: &str) -> Option<Token> {
        self.index.get(s).copied()
    }

    /// String behind a wire token, if the token is assigned
    #[inline]
    pub fn resolve(&self, token: Token) -> Option<&str> {
        match token {
            Token::Single(code) => self.single_byte.get(code as usize),
            Token::Double(idx) => self.double_byte.get(idx as usize),
        }
        .map(String::as_str)
    }

    /// Numeric code of a wire token
    pub fn code_of(&self, token: Token) -> u16 {
        match token {
            Token::Single(code) => code as u16,
            Token::Double(idx) => (self.single_byte.len() + idx as usize) as u16,
        }
    }

    /// Size of the single-byte space, including the reserved code 0
    pub fn single_byte_len(&self) -> usize {
        self.single_byte.len()
    }

    pub fn double_byte_len(&self) -> usize {
        self.double_byte.len()
    }

    /// Total number of assigned codes
    pub fn len(&self) -> usize {
        self.single_byte.len() + self.double_byte.len()
    }

    /// True when only the reserved empty-string code is assigned
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }
}

impl Default for TokenDictionary {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TokenDictionary {
        TokenDictionary::new(["iq", "query", "message"], ["audio", "offer"]).unwrap()
    }

    #[test]
    fn test_codes_follow_list_order() {
        let dict = sample();
        assert_eq!(dict.lookup_code(""), Some(0));
        assert_eq!(dict.lookup_code("iq"), Some(1));
        assert_eq!(dict.lookup_code("message"), Some(3));
        assert_eq!(dict.lookup_code("audio"), Some(4));
        assert_eq!(dict.lookup_code("offer"), Some(5));
        assert_eq!(dict.lookup_code("nope"), None);
    }

    #[test]
    fn test_lookup_is_inverse() {
        let dict = sample();
        for code in 0..dict.len() as u16 {
            let s = dict.lookup_string(code).unwrap();
            assert_eq!(dict.lookup_code(s), Some(code));
        }
        assert_eq!(dict.lookup_string(dict.len() as u16), None);
    }

    #[test]
    fn test_wire_tokens() {
        let dict = sample();
        assert_eq!(dict.token("query"), Some(Token::Single(2)));
        assert_eq!(dict.token("offer"), Some(Token::Double(1)));
        assert_eq!(dict.resolve(Token::Double(1)), Some("offer"));
        assert_eq!(dict.resolve(Token::Double(2)), None);
        assert_eq!(dict.resolve(Token::Single(4)), None);
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = TokenDictionary::new(["a", "b"], ["a"]).unwrap_err();
        assert!(matches!(err, CodecError::Dictionary(_)));
    }

    #[test]
    fn test_empty_entry_rejected() {
        let err = TokenDictionary::new(["a", ""], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CodecError::Dictionary(_)));
    }

    #[test]
    fn test_single_byte_capacity() {
        let full: Vec<String> = (0..MAX_SINGLE_BYTE_TOKENS - 1).map(|i| format!("t{i}")).collect();
        assert!(TokenDictionary::new(full.clone(), Vec::<String>::new()).is_ok());

        let mut over = full;
        over.push("overflow".to_string());
        let err = TokenDictionary::new(over, Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CodecError::Dictionary(_)));
    }

    #[test]
    fn test_double_byte_capacity() {
        let full: Vec<String> = (0..MAX_DOUBLE_BYTE_TOKENS).map(|i| format!("d{i}")).collect();
        let dict = TokenDictionary::new(Vec::<String>::new(), full).unwrap();
        assert_eq!(dict.token("d255"), Some(Token::Double(255)));
    }

    #[test]
    fn test_from_config_concatenates_tags_first() {
        let config = DictionaryConfig {
            version: 3,
            tags: vec!["iq".into(), "query".into()],
            single_byte: vec!["stream".into()],
            double_byte: vec!["offer".into()],
        };
        let dict = TokenDictionary::from_config(&config).unwrap();
        assert_eq!(dict.lookup_code("stream"), Some(3));
        assert_eq!(dict.lookup_code("offer"), Some(4));
        assert_eq!(dict.version(), 3);
    }

    #[test]
    fn test_empty_dictionary() {
        let dict = TokenDictionary::empty();
        assert!(dict.is_empty());
        assert_eq!(dict.token(""), Some(Token::Single(0)));
    }
}
