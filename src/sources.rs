//! Utilities for creating token sources from common data types.
//!
//! This module provides implementations of [`TokenSource`] for strings and
//! byte slices, splitting them into lines by default, as well as a
//! streaming variant that scans a [`Read`]er to EOF.

use std::fmt::{self, Display};
use std::io::{self, Read};
use std::str::from_utf8_unchecked;

use memchr::memchr;

use crate::intern::{Interner, Token};
use crate::newline::Newline;
use crate::TokenSource;

/// Returns a [`TokenSource`] that uses the lines in `data` as Tokens in
/// [`Newline::Raw`] mode: the newline separator (`\r\n` or `\n`) is included
/// in the emitted tokens verbatim. This means that changing the newline
/// separator from `\r\n` to `\n` (or omitting it fully on the last line) is
/// detected by [`Diff`](crate::Diff).
pub fn lines(data: &str) -> Lines<'_> {
    lines_with_mode(data, Newline::Raw)
}

/// Returns a [`TokenSource`] that uses the lines in `data` as Tokens,
/// applying `mode`'s newline handling (spec §4.1): in [`Newline::Raw`] the
/// separator is kept verbatim; in [`Newline::Lf`]/[`Newline::Crlf`] the
/// separator is stripped before interning, so equivalent lines with
/// different endings intern to the same token.
pub fn lines_with_mode(data: &str, mode: Newline) -> Lines<'_> {
    Lines {
        data: ByteLines(data.as_bytes()),
        mode,
    }
}

/// Returns a [`TokenSource`] that uses the lines in `data` as Tokens. The newline
/// separator (`\r\n` or `\n`) is included in the emitted tokens.
pub fn byte_lines(data: &[u8]) -> ByteLines<'_> {
    ByteLines(data)
}

/// Reads `reader` to EOF and returns its lines as owned `String` tokens,
/// applying `mode`'s newline handling. This is the streaming counterpart of
/// [`lines_with_mode`] (spec §4.1 `scan`); failures from the underlying
/// reader are propagated.
pub fn scan_lines(mut reader: impl Read, mode: Newline) -> io::Result<Vec<String>> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(lines_with_mode(&buf, mode).map(str::to_owned).collect())
}

/// Writes one token's text to `out`, followed by `mode`'s separator if
/// `mode` isn't [`Newline::Raw`] (whose tokens already embed their own
/// separator verbatim).
pub(crate) fn write_token<T: Display>(
    out: &mut impl fmt::Write,
    token: Token,
    interner: &Interner<T>,
    mode: Newline,
) -> fmt::Result {
    write!(out, "{}", interner[token])?;
    if mode != Newline::Raw {
        out.write_str(mode.separator())?;
    }
    Ok(())
}

/// Materializes a token-id sequence back into text, honoring `mode`'s
/// newline handling (spec §4.1 `write_lines`): the counterpart of
/// [`lines_with_mode`]/[`scan_lines`] that reverses tokenization.
pub fn write_lines<T: Display>(
    out: &mut impl fmt::Write,
    tokens: &[Token],
    interner: &Interner<T>,
    mode: Newline,
) -> fmt::Result {
    for &token in tokens {
        write_token(out, token, interner, mode)?;
    }
    Ok(())
}

/// By default, a line diff is produced for a string
impl<'a> TokenSource for &'a str {
    type Token = &'a str;

    type Tokenizer = Lines<'a>;

    fn tokenize(&self) -> Self::Tokenizer {
        lines(self)
    }

    fn estimate_tokens(&self) -> u32 {
        lines(self).estimate_tokens()
    }
}

/// By default, a line diff is produced for a bytes
impl<'a> TokenSource for &'a [u8] {
    type Token = Self;
    type Tokenizer = ByteLines<'a>;

    fn tokenize(&self) -> Self::Tokenizer {
        byte_lines(self)
    }

    fn estimate_tokens(&self) -> u32 {
        byte_lines(self).estimate_tokens()
    }
}

/// A [`TokenSource`] that returns the lines of a `str` as tokens, with
/// newline handling controlled by a [`Newline`] mode. See [`lines`] and
/// [`lines_with_mode`] for details.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Lines<'a> {
    data: ByteLines<'a>,
    mode: Newline,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        // safety invariant: this struct may only contain valid utf8
        // dividing valid utf8 bytes by ascii characters always produces valid utf-8
        let line = unsafe { from_utf8_unchecked(self.data.next()?) };
        Some(self.mode.strip(line))
    }
}

/// By default, a line diff is produced for a string
impl<'a> TokenSource for Lines<'a> {
    type Token = &'a str;

    type Tokenizer = Self;

    fn tokenize(&self) -> Self::Tokenizer {
        *self
    }

    fn estimate_tokens(&self) -> u32 {
        self.data.estimate_tokens()
    }
}

/// A [`TokenSource`] that returns the lines of a byte slice as tokens. See [`byte_lines`]
/// for details.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ByteLines<'a>(&'a [u8]);

impl<'a> Iterator for ByteLines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_empty() {
            return None;
        }
        let line_len = memchr(b'\n', self.0).map_or(self.0.len(), |len| len + 1);
        let (line, rem) = self.0.split_at(line_len);
        self.0 = rem;
        Some(line)
    }
}

/// By default, a line diff is produced for a byte slice
impl<'a> TokenSource for ByteLines<'a> {
    type Token = &'a [u8];

    type Tokenizer = Self;

    fn tokenize(&self) -> Self::Tokenizer {
        *self
    }

    fn estimate_tokens(&self) -> u32 {
        let len: usize = self.take(20).map(|line| line.len()).sum();
        if len == 0 {
            100
        } else {
            (self.0.len() * 20 / len) as u32
        }
    }
}

/// A [`TokenSource`] that interns individual Unicode scalar values (runes).
/// Used by the rune-level front end (spec §4.9).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Runes<'a>(&'a str);

/// Returns a [`TokenSource`] that uses the `char`s of `data` as tokens.
pub fn runes(data: &str) -> Runes<'_> {
    Runes(data)
}

impl<'a> TokenSource for Runes<'a> {
    type Token = char;
    type Tokenizer = std::str::Chars<'a>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.0.chars()
    }

    fn estimate_tokens(&self) -> u32 {
        self.0.len() as u32
    }
}
