//! The default word splitter used by [`diff_words`](crate::diff_words).
//!
//! Splits a string into maximal alphanumeric runs (per Unicode letter/digit
//! categories) interleaved with maximal non-alphanumeric runs; *both* kinds
//! of run are kept as tokens, so the concatenation of all tokens equals the
//! original string exactly (spec §4.9). This is what makes reconstruction
//! (`Equal | Delete` joins `before` tokens, `Insert` joins `after` tokens)
//! exact.

use crate::TokenSource;

/// Splits `data` into alphanumeric/non-alphanumeric runs, see module docs.
pub fn split_words(data: &str) -> impl Iterator<Item = &str> + Clone {
    WordSplit { rest: data }
}

/// A [`TokenSource`] over the default word splitter.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Words<'a>(&'a str);

/// Returns a [`TokenSource`] that uses the default word splitter on `data`.
pub fn words(data: &str) -> Words<'_> {
    Words(data)
}

impl<'a> TokenSource for Words<'a> {
    type Token = &'a str;
    type Tokenizer = WordSplit<'a>;

    fn tokenize(&self) -> Self::Tokenizer {
        WordSplit { rest: self.0 }
    }

    fn estimate_tokens(&self) -> u32 {
        // words are typically a handful of bytes; this is a rough guess
        // used only to size the interner's initial allocation.
        (self.0.len() / 4).max(1) as u32
    }
}

#[derive(Clone, Copy)]
pub struct WordSplit<'a> {
    rest: &'a str,
}

impl<'a> Iterator for WordSplit<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let mut chars = self.rest.char_indices();
        let (_, first) = chars.next().unwrap();
        let is_word = is_alphanumeric(first);
        let mut end = self.rest.len();
        for (idx, ch) in chars {
            if is_alphanumeric(ch) != is_word {
                end = idx;
                break;
            }
        }
        let (token, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(token)
    }
}

fn is_alphanumeric(ch: char) -> bool {
    ch.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstructs_exactly() {
        let input = "The quick, brown-fox! 42 foxes.";
        let joined: String = split_words(input).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn splits_on_punctuation_boundaries() {
        let tokens: Vec<_> = split_words("foo_bar baz").collect();
        assert_eq!(tokens, ["foo", "_", "bar", " ", "baz"]);
    }
}
