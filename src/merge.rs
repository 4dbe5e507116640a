//! Three-way merge (spec §4.11): compute origin→A and origin→B, partition
//! origin's domain into regions by interval-merging the union of the two
//! change lists, classify each region clean/conflict (with false-conflict
//! suppression), and render the merged text with conflict markers (§6.1)
//! for the `plain`/`diff3`/`zealous_diff3` styles.
//!
//! Grounded on the region-partition-then-classify shape a diff3 merge
//! typically takes: walk both change lists in parallel over the base,
//! classify each region clean/conflicting as it's found. Built directly on
//! top of this crate's own [`Diff`]/[`Change`] rather than re-diffing
//! strings, since origin, A and B share one interner here.

use std::fmt::Display;
use std::hash::Hash;
use std::ops::Range;

use crate::cancel::Cancel;
use crate::change::Change;
use crate::error::{Error, Result};
use crate::intern::{Interner, Token};
use crate::newline::Newline;
use crate::{Algorithm, Diff};

/// Conflict-marker style for [`merge`](crate::merge) (spec §6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictStyle {
    /// `<<<<<<< / ======= / >>>>>>>` around A's and B's content only.
    #[default]
    Plain,
    /// [`Plain`](ConflictStyle::Plain) with an additional `||||||| origin`
    /// section holding the origin's content for the conflicting region.
    Diff3,
    /// [`Diff3`](ConflictStyle::Diff3) with identical leading/trailing
    /// lines of A, origin and B pulled out of the conflict and emitted as
    /// ordinary equal context.
    ZealousDiff3,
}

/// The (optional) labels attached to conflict markers (spec §6.1), one per
/// side of the merge. Labels containing a line break are rejected by
/// [`MergeOptions::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeLabels {
    /// Label for the `|||||||` origin section (diff3/zealous_diff3 only).
    pub origin: Option<String>,
    /// Label for the `<<<<<<<` section (A's content).
    pub ours: Option<String>,
    /// Label for the `>>>>>>>` section (B's content).
    pub theirs: Option<String>,
}

/// Options accepted by [`merge`](crate::merge) and
/// [`has_conflict`](crate::has_conflict) (spec §6.3).
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Conflict-marker style.
    pub style: ConflictStyle,
    /// Pairwise diff algorithm used for origin→A and origin→B.
    pub algorithm: Algorithm,
    /// Labels attached to conflict markers.
    pub labels: MergeLabels,
    /// Newline mode used both for tokenizing the three texts and for the
    /// line terminator written after synthesized marker lines.
    pub newline: Newline,
}

impl MergeOptions {
    /// Rejects mutually inconsistent options (spec §7 "Invalid options").
    /// Currently the only documented inconsistency is a label that embeds
    /// a line break, which would corrupt the byte-exact marker format.
    pub(crate) fn validate(&self) -> Result<()> {
        for label in [&self.labels.origin, &self.labels.ours, &self.labels.theirs] {
            if let Some(label) = label {
                if label.contains('\n') || label.contains('\r') {
                    return Err(Error::InvalidOptions(
                        "conflict labels may not contain line breaks".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Result of [`merge`](crate::merge): the merged text and whether any
/// region required a conflict marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The merged text.
    pub text: String,
    /// Whether any region of the merge required a conflict marker.
    pub has_conflict: bool,
}

/// Runs the merge pipeline of spec §4.11 over already-interned token
/// sequences sharing `interner`.
pub(crate) fn merge<T: Display + Eq + Hash>(
    o: &[Token],
    a: &[Token],
    b: &[Token],
    interner: &Interner<T>,
    opts: &MergeOptions,
    cancel: &impl Cancel,
) -> Result<MergeOutcome> {
    opts.validate()?;
    let num_tokens = interner.num_tokens();

    let mut diff_a = Diff::default();
    diff_a.compute_with(opts.algorithm, o, a, num_tokens, cancel)?;
    let mut diff_b = Diff::default();
    diff_b.compute_with(opts.algorithm, o, b, num_tokens, cancel)?;

    let c_a: Vec<Change> = diff_a.hunks().map(Change::from).collect();
    let c_b: Vec<Change> = diff_b.hunks().map(Change::from).collect();

    let regions = partition_regions(&c_a, &c_b);

    let mut out = String::new();
    let mut has_conflict = false;
    let mut pos = 0u32;
    let marker_sep = if opts.newline == Newline::Crlf { "\r\n" } else { "\n" };

    for region in &regions {
        cancel.check()?;
        push_tokens(&mut out, &o[pos as usize..region.o_start as usize], interner, opts.newline);

        let a_changes = &c_a[region.a.clone()];
        let b_changes = &c_b[region.b.clone()];
        let false_conflict = !a_changes.is_empty()
            && !b_changes.is_empty()
            && is_false_conflict(a_changes, b_changes, a, b);
        if false_conflict {
            tracing::debug!(
                o_start = region.o_start,
                o_end = region.o_end,
                "suppressing false conflict"
            );
        }

        if b_changes.is_empty() || false_conflict {
            let content = render_side(o, a, a_changes, region.o_start, region.o_end);
            push_tokens(&mut out, &content, interner, opts.newline);
        } else if a_changes.is_empty() {
            let content = render_side(o, b, b_changes, region.o_start, region.o_end);
            push_tokens(&mut out, &content, interner, opts.newline);
        } else {
            has_conflict = true;
            let a_content = render_side(o, a, a_changes, region.o_start, region.o_end);
            let b_content = render_side(o, b, b_changes, region.o_start, region.o_end);
            let o_content = &o[region.o_start as usize..region.o_end as usize];
            write_conflict(&mut out, interner, opts, marker_sep, &a_content, o_content, &b_content);
        }
        pos = region.o_end;
    }
    push_tokens(&mut out, &o[pos as usize..], interner, opts.newline);

    Ok(MergeOutcome { text: out, has_conflict })
}

/// The cheap counterpart of [`merge`] used by
/// [`has_conflict`](crate::has_conflict): computes the same regions but
/// never materializes merged text, short-circuiting as soon as a true
/// conflict region is found.
pub(crate) fn any_conflict(
    o: &[Token],
    a: &[Token],
    b: &[Token],
    num_tokens: u32,
    algorithm: Algorithm,
    cancel: &impl Cancel,
) -> Result<bool> {
    let mut diff_a = Diff::default();
    diff_a.compute_with(algorithm, o, a, num_tokens, cancel)?;
    let mut diff_b = Diff::default();
    diff_b.compute_with(algorithm, o, b, num_tokens, cancel)?;

    let c_a: Vec<Change> = diff_a.hunks().map(Change::from).collect();
    let c_b: Vec<Change> = diff_b.hunks().map(Change::from).collect();
    let regions = partition_regions(&c_a, &c_b);

    for region in &regions {
        cancel.check()?;
        let a_changes = &c_a[region.a.clone()];
        let b_changes = &c_b[region.b.clone()];
        if !a_changes.is_empty()
            && !b_changes.is_empty()
            && !is_false_conflict(a_changes, b_changes, a, b)
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A maximal run of origin positions touched by either side's change list,
/// tagged with the (possibly empty) sub-slices of `c_a`/`c_b` it covers.
struct Region {
    o_start: u32,
    o_end: u32,
    a: Range<usize>,
    b: Range<usize>,
}

/// Interval-merges the union of `c_a` and `c_b` in O-position order (spec
/// §4.11 step 3): extends the current region's end while the next change
/// (from either side) starts at or before it, else starts a new region.
fn partition_regions(c_a: &[Change], c_b: &[Change]) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut ai = 0usize;
    let mut bi = 0usize;

    while ai < c_a.len() || bi < c_b.len() {
        let a_start = ai;
        let b_start = bi;

        let take_a = match (c_a.get(ai), c_b.get(bi)) {
            (Some(ca), Some(cb)) => ca.p1 <= cb.p1,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => unreachable!(),
        };
        let o_start;
        let mut o_end;
        if take_a {
            o_start = c_a[ai].p1;
            o_end = c_a[ai].p1 + c_a[ai].del;
            ai += 1;
        } else {
            o_start = c_b[bi].p1;
            o_end = c_b[bi].p1 + c_b[bi].del;
            bi += 1;
        }

        loop {
            let mut extended = false;
            while ai < c_a.len() && c_a[ai].p1 <= o_end {
                o_end = o_end.max(c_a[ai].p1 + c_a[ai].del);
                ai += 1;
                extended = true;
            }
            while bi < c_b.len() && c_b[bi].p1 <= o_end {
                o_end = o_end.max(c_b[bi].p1 + c_b[bi].del);
                bi += 1;
                extended = true;
            }
            if !extended {
                break;
            }
        }

        regions.push(Region {
            o_start,
            o_end,
            a: a_start..ai,
            b: b_start..bi,
        });
    }

    regions
}

/// A region is a *false* conflict (spec §4.11 step 4) when both sides made
/// exactly one, identical change over it: same `p1`/`del`/`ins` and
/// token-wise equal inserted content.
fn is_false_conflict(a_changes: &[Change], b_changes: &[Change], a: &[Token], b: &[Token]) -> bool {
    if a_changes.len() != 1 || b_changes.len() != 1 {
        return false;
    }
    let ca = a_changes[0];
    let cb = b_changes[0];
    ca.p1 == cb.p1
        && ca.del == cb.del
        && ca.ins == cb.ins
        && a[ca.p2 as usize..(ca.p2 + ca.ins) as usize] == b[cb.p2 as usize..(cb.p2 + cb.ins) as usize]
}

/// Renders one side's content for the origin range `[o_start, o_end)`:
/// origin tokens outside of `changes` are identical on both sides by
/// construction, so copying them straight from `o` is equivalent to
/// reading them out of `side`.
fn render_side(o: &[Token], side: &[Token], changes: &[Change], o_start: u32, o_end: u32) -> Vec<Token> {
    let mut out = Vec::new();
    let mut pos = o_start;
    for c in changes {
        out.extend_from_slice(&o[pos as usize..c.p1 as usize]);
        out.extend_from_slice(&side[c.p2 as usize..(c.p2 + c.ins) as usize]);
        pos = c.p1 + c.del;
    }
    out.extend_from_slice(&o[pos as usize..o_end as usize]);
    out
}

fn push_tokens<T: Display>(out: &mut String, tokens: &[Token], interner: &Interner<T>, mode: Newline) {
    crate::sources::write_lines(out, tokens, interner, mode).unwrap();
}

#[allow(clippy::too_many_arguments)]
fn write_conflict<T: Display>(
    out: &mut String,
    interner: &Interner<T>,
    opts: &MergeOptions,
    marker_sep: &str,
    a_content: &[Token],
    o_content: &[Token],
    b_content: &[Token],
) {
    let (prefix, suffix) = if opts.style == ConflictStyle::ZealousDiff3 {
        zealous_trim(a_content, o_content, b_content)
    } else {
        (0, 0)
    };

    push_tokens(out, &a_content[..prefix], interner, opts.newline);

    write_marker(out, '<', opts.labels.ours.as_deref(), marker_sep);
    push_tokens(out, &a_content[prefix..a_content.len() - suffix], interner, opts.newline);

    if opts.style != ConflictStyle::Plain {
        write_marker(out, '|', opts.labels.origin.as_deref(), marker_sep);
        push_tokens(out, &o_content[prefix..o_content.len() - suffix], interner, opts.newline);
    }

    out.push_str("=======");
    out.push_str(marker_sep);
    push_tokens(out, &b_content[prefix..b_content.len() - suffix], interner, opts.newline);

    write_marker(out, '>', opts.labels.theirs.as_deref(), marker_sep);

    push_tokens(out, &a_content[a_content.len() - suffix..], interner, opts.newline);
}

fn write_marker(out: &mut String, ch: char, label: Option<&str>, sep: &str) {
    for _ in 0..7 {
        out.push(ch);
    }
    if let Some(label) = label {
        if !label.is_empty() {
            out.push(' ');
            out.push_str(label);
        }
    }
    out.push_str(sep);
}

/// Finds the longest prefix/suffix of lines identical across `a`, `o` and
/// `b` (spec §6.1 zealous_diff3 trimming). The two runs never overlap.
fn zealous_trim(a: &[Token], o: &[Token], b: &[Token]) -> (usize, usize) {
    let mut prefix = 0;
    while prefix < a.len()
        && prefix < o.len()
        && prefix < b.len()
        && a[prefix] == o[prefix]
        && o[prefix] == b[prefix]
    {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < a.len() - prefix
        && suffix < o.len() - prefix
        && suffix < b.len() - prefix
        && a[a.len() - 1 - suffix] == o[o.len() - 1 - suffix]
        && o[o.len() - 1 - suffix] == b[b.len() - 1 - suffix]
    {
        suffix += 1;
    }

    (prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn merge_text(o: &str, a: &str, b: &str, style: ConflictStyle) -> MergeOutcome {
        let mut interner = Interner::new(64);
        let o_tokens: Vec<Token> = crate::sources::lines(o).map(|l| interner.intern(l)).collect();
        let a_tokens: Vec<Token> = crate::sources::lines(a).map(|l| interner.intern(l)).collect();
        let b_tokens: Vec<Token> = crate::sources::lines(b).map(|l| interner.intern(l)).collect();
        let opts = MergeOptions {
            style,
            ..MergeOptions::default()
        };
        merge(&o_tokens, &a_tokens, &b_tokens, &interner, &opts, &()).unwrap()
    }

    #[test]
    fn clean_merge_identity() {
        let out = merge_text("a\nb\nc\n", "a\nb\nc\n", "a\nb\nc\n", ConflictStyle::Plain);
        assert_eq!(out.text, "a\nb\nc\n");
        assert!(!out.has_conflict);
    }

    #[test]
    fn one_sided_change_takes_the_changed_side() {
        let out = merge_text("a\nb\nc\n", "a\nb\nc\n", "a\nx\nc\n", ConflictStyle::Plain);
        assert_eq!(out.text, "a\nx\nc\n");
        assert!(!out.has_conflict);
    }

    #[test]
    fn identical_changes_on_both_sides_suppress_conflict() {
        let out = merge_text("a\nb\nc\n", "a\nB\nc\n", "a\nB\nc\n", ConflictStyle::Plain);
        assert_eq!(out.text, "a\nB\nc\n");
        assert!(!out.has_conflict);
    }

    #[test]
    fn disjoint_changes_merge_cleanly() {
        let out = merge_text("a\nb\nc\n", "a\nB\nc\n", "a\nb\nC\n", ConflictStyle::Plain);
        assert_eq!(out.text, "a\nB\nC\n");
        assert!(!out.has_conflict);
    }

    #[test]
    fn both_sides_deleting_the_same_line_is_clean() {
        let out = merge_text("a\nb\nc\n", "a\nb\n", "a\nb\n", ConflictStyle::Plain);
        assert_eq!(out.text, "a\nb\n");
        assert!(!out.has_conflict);
    }

    #[test]
    fn conflicting_edits_emit_plain_markers() {
        // the conflict region is only the single differing line; "a" and
        // "c" sit outside of it as ordinary equal context on both sides.
        let out = merge_text("a\nb\nc\n", "a\nX\nc\n", "a\nY\nc\n", ConflictStyle::Plain);
        assert!(out.has_conflict);
        assert_eq!(out.text, "a\n<<<<<<<\nX\n=======\nY\n>>>>>>>\nc\n");
    }

    #[test]
    fn diff3_style_includes_origin_section() {
        let out = merge_text("a\nb\nc\n", "a\nX\nc\n", "a\nY\nc\n", ConflictStyle::Diff3);
        assert!(out.has_conflict);
        assert_eq!(
            out.text,
            "a\n<<<<<<<\nX\n|||||||\nb\n=======\nY\n>>>>>>>\nc\n"
        );
    }

    #[test]
    fn zealous_trim_finds_shared_leading_and_trailing_lines() {
        let a: Vec<Token> = (0..5).map(Token).collect();
        let o: Vec<Token> = vec![Token(0), Token(1), Token(99), Token(3), Token(4)];
        let b: Vec<Token> = vec![Token(0), Token(1), Token(98), Token(3), Token(4)];
        let (prefix, suffix) = zealous_trim(&a, &o, &b);
        assert_eq!(prefix, 2);
        assert_eq!(suffix, 2);
    }
}
