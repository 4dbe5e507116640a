//! The free-function public operations (spec §6.3): convenience wrappers
//! around [`Diff`]/[`InternedInput`] that take raw text, handle interning,
//! and return the shapes callers usually want (`Change`/`StringDiff` lists,
//! a rendered unified diff, a [`Stat`], or a three-way [`MergeOutcome`]).
//!
//! Grounded on the doctest usage already shown in the crate's module docs
//! (intern → compute → postprocess → read out), just promoted to standalone
//! functions instead of requiring every caller to drive [`Diff`] by hand.

use std::fmt::{Display, Write as _};
use std::hash::Hash;

use crate::cancel::Cancel;
use crate::change::{Change, FileMeta, Kind, StringDiff};
use crate::error::Result;
use crate::intern::{InternedInput, Interner, Token};
use crate::merge::{self, MergeOptions, MergeOutcome};
use crate::sources;
use crate::unified::{self, Stat};
use crate::word_split;
use crate::{Algorithm, Diff};

/// Computes the line-level [`Change`] list that transforms `before` into
/// `after` (spec §6.3 `diff`).
pub fn diff(
    before: &str,
    after: &str,
    algorithm: Algorithm,
    cancel: &impl Cancel,
) -> Result<Vec<Change>> {
    let input = InternedInput::new(before, after);
    let mut diff = Diff::try_compute(algorithm, &input, cancel)?;
    diff.postprocess_lines(&input);
    Ok(diff.hunks().map(Change::from).collect())
}

/// Computes a rune (Unicode scalar value) diff and returns it as tagged
/// `Equal`/`Delete`/`Insert` segments (spec §6.3 `diff_runes`).
pub fn diff_runes(
    before: &str,
    after: &str,
    algorithm: Algorithm,
    cancel: &impl Cancel,
) -> Result<Vec<StringDiff>> {
    let input = InternedInput::new(sources::runes(before), sources::runes(after));
    let diff = Diff::try_compute(algorithm, &input, cancel)?;
    Ok(build_segments(&diff, &input))
}

/// Computes a word-level diff (default splitter, spec §4.9) and returns it
/// as tagged `Equal`/`Delete`/`Insert` segments (spec §6.3 `diff_words`).
pub fn diff_words(
    before: &str,
    after: &str,
    algorithm: Algorithm,
    cancel: &impl Cancel,
) -> Result<Vec<StringDiff>> {
    let input = InternedInput::new(word_split::words(before), word_split::words(after));
    let diff = Diff::try_compute(algorithm, &input, cancel)?;
    Ok(build_segments(&diff, &input))
}

/// Renders a Git-style unified diff of `before` vs. `after` with `context`
/// lines of symmetrical context (spec §6.3 `unified`, byte format §6.2).
///
/// `from`/`to` carry the name/hash/mode each side is described by; a
/// differing `from.name`/`to.name` renders `rename from`/`rename to`
/// lines, and a differing `from.mode`/`to.mode` renders `old mode`/`new
/// mode` lines. `is_binary`/`is_fragments` replace the hunk body with a
/// `Binary files … differ`/`Fragments files … differ` message — content
/// hashing and binary/fragment detection are the caller's job, not this
/// crate's (spec §1).
#[allow(clippy::too_many_arguments)]
pub fn unified(
    from: &FileMeta,
    to: &FileMeta,
    before: &str,
    after: &str,
    algorithm: Algorithm,
    context: u32,
    is_binary: bool,
    is_fragments: bool,
    cancel: &impl Cancel,
) -> Result<String> {
    let input = InternedInput::new(before, after);
    let mut diff = Diff::try_compute(algorithm, &input, cancel)?;
    diff.postprocess_lines(&input);
    let before_final_newline = before.is_empty() || before.ends_with('\n');
    let after_final_newline = after.is_empty() || after.ends_with('\n');
    Ok(unified::render(
        from,
        to,
        &input,
        &diff,
        context,
        crate::newline::Newline::Raw,
        before_final_newline,
        after_final_newline,
        is_binary,
        is_fragments,
    ))
}

/// Computes line-level addition/deletion/hunk counts without building a
/// [`Change`] list or rendered text (spec §6.3 `stat`).
pub fn stat(before: &str, after: &str, algorithm: Algorithm, cancel: &impl Cancel) -> Result<Stat> {
    let input = InternedInput::new(before, after);
    let mut diff = Diff::try_compute(algorithm, &input, cancel)?;
    diff.postprocess_lines(&input);
    Ok(Stat::from_diff(&diff))
}

/// Performs a three-way merge of `text_o`/`text_a`/`text_b` (spec §6.3
/// `merge`, §4.11).
pub fn merge(
    text_o: &str,
    text_a: &str,
    text_b: &str,
    opts: &MergeOptions,
    cancel: &impl Cancel,
) -> Result<MergeOutcome> {
    let (o, a, b, interner) = intern_three(text_o, text_a, text_b, opts.newline);
    merge::merge(&o, &a, &b, &interner, opts, cancel)
}

/// Reports whether merging `text_o`/`text_a`/`text_b` would produce any
/// conflict region, without materializing the merged text (spec §6.3
/// `has_conflict`).
pub fn has_conflict(
    text_o: &str,
    text_a: &str,
    text_b: &str,
    opts: &MergeOptions,
    cancel: &impl Cancel,
) -> Result<bool> {
    opts.validate()?;
    let (o, a, b, interner) = intern_three(text_o, text_a, text_b, opts.newline);
    merge::any_conflict(&o, &a, &b, interner.num_tokens(), opts.algorithm, cancel)
}

fn intern_three<'a>(
    o: &'a str,
    a: &'a str,
    b: &'a str,
    newline: crate::newline::Newline,
) -> (Vec<Token>, Vec<Token>, Vec<Token>, Interner<&'a str>) {
    let estimate = (o.len() + a.len() + b.len()) / 40 + 3;
    let mut interner = Interner::new(estimate);
    let o_tokens = sources::lines_with_mode(o, newline)
        .map(|line| interner.intern(line))
        .collect();
    let a_tokens = sources::lines_with_mode(a, newline)
        .map(|line| interner.intern(line))
        .collect();
    let b_tokens = sources::lines_with_mode(b, newline)
        .map(|line| interner.intern(line))
        .collect();
    (o_tokens, a_tokens, b_tokens, interner)
}

fn build_segments<T: Display + Eq + Hash>(diff: &Diff, input: &InternedInput<T>) -> Vec<StringDiff> {
    let mut segments = Vec::new();
    let mut pos_before = 0u32;
    for hunk in diff.hunks() {
        if hunk.before.start > pos_before {
            segments.push(make_segment(
                Kind::Equal,
                &input.before[pos_before as usize..hunk.before.start as usize],
                &input.interner,
            ));
        }
        if !hunk.before.is_empty() {
            segments.push(make_segment(
                Kind::Delete,
                &input.before[hunk.before.start as usize..hunk.before.end as usize],
                &input.interner,
            ));
        }
        if !hunk.after.is_empty() {
            segments.push(make_segment(
                Kind::Insert,
                &input.after[hunk.after.start as usize..hunk.after.end as usize],
                &input.interner,
            ));
        }
        pos_before = hunk.before.end;
    }
    if (pos_before as usize) < input.before.len() {
        segments.push(make_segment(Kind::Equal, &input.before[pos_before as usize..], &input.interner));
    }
    segments
}

fn make_segment<T: Display + Eq + Hash>(kind: Kind, tokens: &[Token], interner: &Interner<T>) -> StringDiff {
    let mut text = String::new();
    for &token in tokens {
        write!(&mut text, "{}", interner[token]).unwrap();
    }
    StringDiff { kind, text }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_matches_scenario_s1() {
        let changes = diff("a\nb\nc\nd\n", "a\nx\nc\ny\nd\n", Algorithm::Myers, &()).unwrap();
        assert_eq!(
            changes,
            vec![
                Change { p1: 1, p2: 1, del: 1, ins: 1 },
                Change { p1: 3, p2: 3, del: 0, ins: 1 },
            ]
        );
    }

    #[test]
    fn diff_words_matches_scenario_s2() {
        let segments = diff_words(
            "The quick brown fox",
            "The quick brown dog",
            Algorithm::Histogram,
            &(),
        )
        .unwrap();
        assert_eq!(
            segments,
            vec![
                StringDiff { kind: Kind::Equal, text: "The quick brown ".into() },
                StringDiff { kind: Kind::Delete, text: "fox".into() },
                StringDiff { kind: Kind::Insert, text: "dog".into() },
            ]
        );
    }

    #[test]
    fn unified_matches_scenario_s6() {
        let text = unified(
            &FileMeta::new("a", "abc1234"),
            &FileMeta::new("b", "def5678"),
            "hello\nworld\n",
            "hello\nnovel\nworld\n",
            Algorithm::Histogram,
            3,
            false,
            false,
            &(),
        )
        .unwrap();
        assert!(text.contains("@@ -1,2 +1,3 @@\n"));
        assert!(text.contains(" hello\n+novel\n world\n"));
        assert!(text.contains("index abc1234..def5678 100644\n"));
    }

    #[test]
    fn merge_matches_scenario_s3() {
        let out = merge(
            "a\nb\nc\n",
            "a\nB\nc\n",
            "a\nb\nC\n",
            &MergeOptions::default(),
            &(),
        )
        .unwrap();
        assert_eq!(out.text, "a\nB\nC\n");
        assert!(!out.has_conflict);
    }

    #[test]
    fn has_conflict_matches_merge_for_scenario_s4() {
        let opts = MergeOptions::default();
        let conflict = has_conflict("a\nb\nc\n", "a\nX\nc\n", "a\nY\nc\n", &opts, &()).unwrap();
        assert!(conflict);
        let clean = has_conflict("a\nb\nc\n", "a\nb\nc\n", "a\nb\nc\n", &opts, &()).unwrap();
        assert!(!clean);
    }
}
