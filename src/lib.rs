#![deny(missing_docs)]
//! A solid text diffing and three-way merge library.
//!
//! Solid refers to the fact that this crate provides very good runtime
//! performance even in pathological cases, so that an application never
//! appears to freeze while waiting on a diff. The performance improvements
//! are achieved using battle-tested heuristics used in gnu-diff and git.
//!
//! Five diff algorithms are provided, selectable through [`Algorithm`]:
//!
//! * [`Algorithm::Myers`], the linear-space variant of the well known
//!   [Myers algorithm](http://www.xmailserver.org/diff2.pdf)
//! * [`Algorithm::Onp`], the O(NP) algorithm of Wu, Manber, Myers and Miller
//! * [`Algorithm::Histogram`], a patience-diff variant using a token
//!   occurrence histogram, falling back to O(NP) on pathological input
//! * [`Algorithm::Patience`], the classic unique-anchor patience diff
//! * [`Algorithm::Minimal`], a reference Hunt-McIlroy LCS implementation
//!
//! # API Overview
//!
//! ## Preparing the input
//!
//! To compute a diff, an input sequence is required. This crate computes
//! diffs on abstract sequences represented as a slice of IDs/tokens:
//! [`Token`]. To create such a sequence from your input type (for example,
//! text), the input needs to be interned. [`InternedInput`] does this,
//! using a `TokenSource` to split the input into tokens; it contains the
//! two sides of the diff (used while computing the diff) as well as the
//! interner that allows mapping tokens back to their original data.
//!
//! The most common use case for diff is comparing text. `&str` implements
//! `TokenSource` by default to segment the text into lines. So creating an
//! input for a text-based diff usually looks something like the following:
//!
//! ```
//! # use tatu_diff::InternedInput;
//! #
//! let before = "abc\ndef";
//! let after = "abc\ndefg";
//! let input = InternedInput::new(before, after);
//! assert_eq!(input.interner[input.before[0]], "abc\n");
//! ```
//!
//! Note that interning inputs is optional, and you could choose a different
//! strategy for creating a sequence of tokens. Instead of using the
//! [`Diff::compute`] function, [`Diff::compute_with`] can be used to provide
//! a list of tokens directly, entirely bypassing the interning step.
//!
//! ## Computing the Diff
//!
//! A diff of two sequences is represented by the [`Diff`] struct and
//! computed by [`Diff::compute`] / [`Diff::compute_with`]. An algorithm can
//! also be chosen here; [`Algorithm::Unspecified`] (the default) picks
//! Histogram or O(NP) automatically based on input size.
//!
//! After the initial computation, the diff can be *postprocessed*. If the
//! diff is shown to a human in some way (even indirectly), you always want
//! to use this. The postprocessing allows you to provide your own heuristic
//! for selecting a slider position; an indentation-based heuristic is
//! provided, which is a good fit for text-based line diffs.
//!
//! ```
//! # use tatu_diff::{InternedInput, Diff, Algorithm};
//! #
//! let before = "abc\ndef";
//! let after = "abc\ndefg";
//! let input = InternedInput::new(before, after);
//! let mut diff = Diff::compute(Algorithm::Histogram, &input);
//! diff.postprocess_lines(&input);
//! assert!(!diff.is_removed(0) && !diff.is_added(0));
//! assert!(diff.is_removed(1) && diff.is_added(1));
//! ```
//!
//! ## Accessing results
//!
//! [`Diff`] allows querying whether a particular position was removed/added
//! on either side of the diff with [`Diff::is_removed`] / [`Diff::is_added`].
//! The number of additions/removals can be quickly counted with
//! [`Diff::count_removals`] / [`Diff::count_additions`]. The most
//! powerful/useful interface is the hunk iterator [`Diff::hunks`], which
//! returns a list of additions/removals/modifications in the order that
//! they appear in the input.
//!
//! For most callers, the free functions [`diff`], [`diff_runes`],
//! [`diff_words`] and [`unified`] are more convenient than driving [`Diff`]
//! directly: they take care of interning and return [`Change`]/[`StringDiff`]
//! lists or a rendered unified diff. [`merge`] and [`has_conflict`] implement
//! a diff3-style three-way merge on top of the same algorithms.

use std::ops::Range;
use std::slice;

use crate::cancel::Cancel;
use crate::util::{strip_common_postfix, strip_common_prefix};

pub use crate::api::{diff, diff_runes, diff_words, has_conflict, merge, stat, unified};
pub use crate::cancel::CancelToken;
pub use crate::change::{Change, FileMeta, Kind, StringDiff};
pub use crate::error::{Error, Result};
pub use crate::merge::{ConflictStyle, MergeLabels, MergeOptions, MergeOutcome};
pub use crate::newline::Newline;
pub use crate::slider_heuristic::{
    IndentHeuristic, IndentLevel, NoSliderHeuristic, SliderHeuristic,
};
pub use crate::unified::Stat;
pub use crate::word_split::{split_words, Words};
pub use intern::{InternedInput, Interner, Token, TokenSource};
pub use sources::Runes;

mod api;
mod cancel;
mod change;
mod error;
mod histogram;
mod intern;
mod merge;
mod minimal;
mod myers;
mod newline;
mod onp;
mod patience;
mod postprocess;
mod slider_heuristic;
pub mod sources;
mod unified;
mod util;
mod word_split;

#[cfg(test)]
mod tests;

/// The diffing algorithms this crate can dispatch to. These have different
/// performance and all produce different (if all valid) edit sequences.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Algorithm {
    /// Automatically picks [`Histogram`](Algorithm::Histogram) for inputs
    /// under 5000 tokens per side, and [`Onp`](Algorithm::Onp) above that
    /// threshold, where Histogram's chain search starts to lose its edge.
    /// This threshold is a single retunable policy knob and affects only
    /// performance, never the shape of a valid (if non-unique) edit script.
    #[default]
    Unspecified,
    /// A variation of the [`patience` diff algorithm described by Bram Cohen's blog post](https://bramcohen.livejournal.com/73318.html)
    /// that uses a histogram to find the least common LCS.
    /// Just like the `patience` diff algorithm, this algorithm usually produces
    /// more human-readable output than Myers algorithm.
    /// However, compared to the `patience` diff algorithm (which is slower than Myers algorithm),
    /// the Histogram algorithm performs much better.
    ///
    /// The implementation here was originally ported from `git` but has been significantly
    /// modified to improve performance.
    /// As a result, it consistently **performs better than Myers algorithm** (5%-100%) over
    /// a wide variety of test data.
    ///
    /// For pathological subsequences that only contain highly repeating tokens (64+ occurrences)
    /// the algorithm falls back on [`Onp`](Algorithm::Onp) to avoid quadratic behavior.
    ///
    /// Compared to Myers algorithm, the Histogram diff algorithm is more focused on providing
    /// human-readable diffs instead of minimal diffs. In practice, this means that the edit sequences
    /// produced by the histogram diff are often longer than those produced by Myers algorithm.
    ///
    /// The heuristic used by the histogram diff does not work well for inputs with small (often repeated)
    /// tokens. For example, **character diffs do not work well** as most (English) text is made up of
    /// a fairly small set of characters. If it's known upfront that the sort of tokens is very small,
    /// `Myers` or `Onp` should be used instead.
    Histogram,
    /// An implementation of the linear space variant of
    /// [Myers  `O((N+M)D)` algorithm](http://www.xmailserver.org/diff2.pdf).
    /// The algorithm is enhanced with preprocessing that removes
    /// tokens that don't occur in the other file at all.
    /// Furthermore, two heuristics for the middle snake search are implemented
    /// that ensure reasonable runtime (mostly linear time complexity) even for large files.
    ///
    /// Due to the divide-and-conquer nature of the algorithm,
    /// the edit sequences produced are still fairly small even when the middle snake
    /// search is aborted by a heuristic.
    /// However, the produced edit sequences are not guaranteed to be fully minimal.
    /// If that property is vital to you, use [`Minimal`](Algorithm::Minimal) instead.
    ///
    /// The implementation (including the preprocessing) is mostly
    /// ported from `git` and `gnu-diff`, where Myers algorithm is used
    /// as the default diff algorithm.
    /// Therefore, the used heuristics have been heavily battle-tested and
    /// are known to behave well over a large variety of inputs.
    Myers,
    /// The O(NP) algorithm of Wu, Manber, Myers and Miller: a diagonal
    /// sweep bounded by the number of edits on the shorter side. Used as
    /// [`Histogram`](Algorithm::Histogram)'s fallback on pathologically
    /// repetitive inputs, and directly selected by
    /// [`Unspecified`](Algorithm::Unspecified) above the token threshold.
    Onp,
    /// The `patience` diff algorithm: anchors on tokens unique to both
    /// sides and recurses between anchors, falling back to
    /// [`Myers`](Algorithm::Myers) where a span has no unique anchor.
    /// Tends to produce diffs that track a reader's intuition for "what
    /// moved" better than a strictly minimal edit script would.
    Patience,
    /// A classical Hunt-McIlroy longest-common-subsequence diff, computed by
    /// straightforward `O(before.len() * after.len())` dynamic programming.
    /// Always exactly minimal, unlike the early-abort heuristics
    /// [`Myers`](Algorithm::Myers) may take; useful as a reference
    /// implementation or for small inputs where its cost is a non-issue.
    Minimal,
}

impl Algorithm {
    /// Inputs at or above this many tokens per side are routed to
    /// [`Onp`](Algorithm::Onp) instead of [`Histogram`](Algorithm::Histogram)
    /// by [`Unspecified`](Algorithm::Unspecified) (spec §4.8).
    const HISTOGRAM_TOKEN_LIMIT: usize = 5000;

    fn resolve(self, before_len: usize, after_len: usize) -> Algorithm {
        match self {
            Algorithm::Unspecified => {
                let resolved = if before_len < Self::HISTOGRAM_TOKEN_LIMIT
                    && after_len < Self::HISTOGRAM_TOKEN_LIMIT
                {
                    Algorithm::Histogram
                } else {
                    Algorithm::Onp
                };
                tracing::debug!(before_len, after_len, ?resolved, "auto-selected diff algorithm");
                resolved
            }
            other => other,
        }
    }

    #[cfg(test)]
    const ALL: [Self; 5] = [
        Algorithm::Histogram,
        Algorithm::Myers,
        Algorithm::Onp,
        Algorithm::Patience,
        Algorithm::Minimal,
    ];
}

/// Represents the difference between two sequences of tokens.
///
/// A `Diff` stores which tokens were removed from the first sequence and which tokens were added to the second sequence.
#[derive(Default)]
pub struct Diff {
    /// Tracks which tokens were removed from the first sequence (`before`), with
    /// one entry for each one in the `before` sequence.
    removed: Vec<bool>,
    /// Tracks which tokens were added to the second sequence (`after`), with
    /// one entry for each one in the `after` sequence.
    added: Vec<bool>,
}

impl std::fmt::Debug for Diff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.hunks()).finish()
    }
}

impl Diff {
    /// Computes an edit-script that transforms `input.before` into `input.after` using
    /// the specified `algorithm`, never cancelling.
    pub fn compute<T>(algorithm: Algorithm, input: &InternedInput<T>) -> Diff {
        Self::try_compute(algorithm, input, &()).expect("() never cancels")
    }

    /// Fallible, cancellable counterpart of [`compute`](Diff::compute).
    pub fn try_compute<T>(
        algorithm: Algorithm,
        input: &InternedInput<T>,
        cancel: &impl Cancel,
    ) -> crate::error::Result<Diff> {
        let mut diff = Diff::default();
        diff.compute_with(
            algorithm,
            &input.before,
            &input.after,
            input.interner.num_tokens(),
            cancel,
        )?;
        Ok(diff)
    }

    /// Computes an edit-script that transforms `before` into `after` using
    /// the specified `algorithm`.
    pub fn compute_with(
        &mut self,
        algorithm: Algorithm,
        mut before: &[Token],
        mut after: &[Token],
        num_tokens: u32,
        cancel: &impl Cancel,
    ) -> crate::error::Result<()> {
        assert!(
            before.len() < i32::MAX as usize,
            "imara-diff only supports up to {} tokens",
            i32::MAX
        );
        assert!(
            after.len() < i32::MAX as usize,
            "imara-diff only supports up to {} tokens",
            i32::MAX
        );
        self.removed.clear();
        self.added.clear();
        self.removed.resize(before.len(), false);
        self.added.resize(after.len(), false);
        let common_prefix = strip_common_prefix(&mut before, &mut after) as usize;
        let common_postfix = strip_common_postfix(&mut before, &mut after);
        let range = common_prefix..self.removed.len() - common_postfix as usize;
        let removed = &mut self.removed[range];
        let range = common_prefix..self.added.len() - common_postfix as usize;
        let added = &mut self.added[range];
        match algorithm.resolve(before.len(), after.len()) {
            Algorithm::Histogram => histogram::diff(before, after, removed, added, num_tokens, cancel),
            Algorithm::Myers => myers::diff(before, after, removed, added, cancel, false),
            Algorithm::Minimal => minimal::diff(before, after, removed, added, cancel),
            Algorithm::Onp => onp::diff(before, after, removed, added, cancel),
            Algorithm::Patience => patience::diff(before, after, removed, added, cancel),
            Algorithm::Unspecified => unreachable!("resolve() never returns Unspecified"),
        }
    }

    /// Returns the total number of tokens that were added in the second sequence.
    pub fn count_additions(&self) -> u32 {
        self.added.iter().map(|&added| added as u32).sum()
    }

    /// Returns the total number of tokens that were removed from the first sequence (`before`).
    pub fn count_removals(&self) -> u32 {
        self.removed.iter().map(|&removed| removed as u32).sum()
    }

    /// Returns `true` if the token at the given index was removed from the first sequence (`before`).
    ///
    /// # Panics
    ///
    /// Panics if `token_idx` is out of bounds for the first sequence.
    pub fn is_removed(&self, token_idx: u32) -> bool {
        self.removed[token_idx as usize]
    }

    /// Returns `true` if the token at the given index was added to the second sequence (`after`).
    ///
    /// # Panics
    ///
    /// Panics if `token_idx` is out of bounds for the second sequence (`after`).
    pub fn is_added(&self, token_idx: u32) -> bool {
        self.added[token_idx as usize]
    }

    /// Postprocesses the diff to make it more human-readable. Certain hunks
    /// have an ambiguous placement (even in a minimal diff) where they can move
    /// downward or upward by removing a token (line) at the start and adding
    /// one at the end (or the other way around). The postprocessing adjusts
    /// these hunks according to a couple of rules:
    ///
    /// * Always merge multiple hunks if possible.
    /// * Always try to create a single MODIFY hunk instead of multiple disjoint
    ///   ADDED/REMOVED hunks.
    /// * Move sliders as far down as possible.
    pub fn postprocess_no_heuristic<T>(&mut self, input: &InternedInput<T>) {
        self.postprocess_with_heuristic(input, NoSliderHeuristic)
    }

    /// Postprocesses the diff to make it more human-readable. Certain hunks
    /// have an ambiguous placement (even in a minimal diff) where they can move
    /// downward or upward by removing a token (line) at the start and adding
    /// one at the end (or the other way around). The postprocessing adjusts
    /// these hunks according to a couple of rules:
    ///
    /// * Always merge multiple hunks if possible.
    /// * Always try to create a single MODIFY hunk instead of multiple disjoint
    ///   ADDED/REMOVED hunks.
    /// * Based on a line's indentation level, heuristically compute the most
    ///   intuitive location to split lines.
    /// * Move sliders as far down as possible.
    pub fn postprocess_lines<T: AsRef<[u8]>>(&mut self, input: &InternedInput<T>) {
        self.postprocess_with_heuristic(
            input,
            IndentHeuristic::new(|token| {
                IndentLevel::for_ascii_line(input.interner[token].as_ref().iter().copied(), 8)
            }),
        )
    }

    /// Return an iterator that yields the changed hunks in this diff.
    pub fn hunks(&self) -> HunkIter<'_> {
        HunkIter {
            removed: self.removed.iter(),
            added: self.added.iter(),
            pos_before: 0,
            pos_after: 0,
        }
    }
}

/// A single change in a `Diff` that represents a range of tokens (`before`)
/// in the first sequence that were replaced by a different range of tokens
/// in the second sequence (`after`).
///
/// Each hunk identifies a contiguous region of change, where tokens from the `before` range
/// should be replaced with tokens from the `after` range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Hunk {
    /// The range of token indices in the first sequence (`before`) that were removed.
    pub before: Range<u32>,
    /// The range of token indices in the second sequence (`after`) that were added.
    pub after: Range<u32>,
}

impl Hunk {
    /// Can be used instead of `Option::None` for better performance.
    /// Because `imara-diff` does not support more than `i32::MAX` there is an unused bit pattern that can be used.
    ///
    /// It has some nice properties where it usually is not necessary to check for `None` separately:
    /// Empty ranges fail contains checks and also fail smaller than checks.
    pub const NONE: Hunk = Hunk {
        before: u32::MAX..u32::MAX,
        after: u32::MAX..u32::MAX,
    };

    /// Inverts a hunk so that it represents a change
    /// that would undo this hunk.
    pub fn invert(&self) -> Hunk {
        Hunk {
            before: self.after.clone(),
            after: self.before.clone(),
        }
    }

    /// Returns whether tokens are only inserted and not removed in this hunk.
    pub fn is_pure_insertion(&self) -> bool {
        self.before.is_empty()
    }

    /// Returns whether tokens are only removed and not inserted in this hunk.
    pub fn is_pure_removal(&self) -> bool {
        self.after.is_empty()
    }
}

/// Yields all [`Hunk`]s in a file in monotonically increasing order.
/// Monotonically increasing means here that the following holds for any two
/// consecutive [`Hunk`]s `x` and `y`:
///
/// ``` no_compile
/// assert!(x.before.end < y.before.start);
/// assert!(x.after.end < y.after.start);
/// ```
///
pub struct HunkIter<'diff> {
    removed: slice::Iter<'diff, bool>,
    added: slice::Iter<'diff, bool>,
    pos_before: u32,
    pos_after: u32,
}

impl Iterator for HunkIter<'_> {
    type Item = Hunk;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let removed = (&mut self.removed).take_while(|&&removed| removed).count() as u32;
            let added = (&mut self.added).take_while(|&&added| added).count() as u32;
            if removed != 0 || added != 0 {
                let start_before = self.pos_before;
                let start_after = self.pos_after;
                self.pos_before += removed;
                self.pos_after += added;
                let hunk = Hunk {
                    before: start_before..self.pos_before,
                    after: start_after..self.pos_after,
                };
                self.pos_before += 1;
                self.pos_after += 1;
                return Some(hunk);
            } else if self.removed.len() == 0 && self.added.len() == 0 {
                return None;
            } else {
                self.pos_before += 1;
                self.pos_after += 1;
            }
        }
    }
}
