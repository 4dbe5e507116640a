//! The Patience diff algorithm (spec §4.6): anchor on tokens that appear
//! exactly once on both sides, take the longest increasing run of those
//! anchors (via patience sorting, hence the name), and recurse on the gaps
//! between them. Falls back to Myers for any span that has no unique
//! anchors at all, matching git's actual patience-diff behavior.
//!
//! Grounded on the shape of [`histogram::diff`](crate::histogram::diff):
//! find an anchor, recurse on the region before it, advance past it, loop.
//! Unlike histogram's chain search, patience only ever considers tokens
//! that are globally unique on both sides.

use ahash::AHashMap;

use crate::cancel::Cancel;
use crate::error::Result;
use crate::intern::Token;
use crate::myers;
use crate::util::{common_postfix, common_prefix};

pub fn diff(
    before: &[Token],
    after: &[Token],
    removed: &mut [bool],
    added: &mut [bool],
    cancel: &impl Cancel,
) -> Result<()> {
    run(before, after, removed, added, cancel)
}

fn run(
    before: &[Token],
    after: &[Token],
    removed: &mut [bool],
    added: &mut [bool],
    cancel: &impl Cancel,
) -> Result<()> {
    cancel.check()?;

    let prefix = common_prefix(before, after) as usize;
    let postfix = common_postfix(&before[prefix..], &after[prefix..]) as usize;
    let before = &before[prefix..before.len() - postfix];
    let after = &after[prefix..after.len() - postfix];
    let removed = &mut removed[prefix..removed.len() - postfix];
    let added = &mut added[prefix..added.len() - postfix];

    if before.is_empty() {
        added.fill(true);
        return Ok(());
    }
    if after.is_empty() {
        removed.fill(true);
        return Ok(());
    }

    let anchors = unique_anchors(before, after);
    let chain = longest_anchor_chain(&anchors);

    if chain.is_empty() {
        // No token occurs exactly once on both sides of this span; patience
        // has nothing to anchor on, so fall back to Myers like git does.
        return myers::diff(before, after, removed, added, cancel, false);
    }

    let mut before_pos = 0u32;
    let mut after_pos = 0u32;
    for &anchor_idx in &chain {
        let anchor = anchors[anchor_idx];
        run(
            &before[before_pos as usize..anchor.before_pos as usize],
            &after[after_pos as usize..anchor.after_pos as usize],
            &mut removed[before_pos as usize..anchor.before_pos as usize],
            &mut added[after_pos as usize..anchor.after_pos as usize],
            cancel,
        )?;
        before_pos = anchor.before_pos + 1;
        after_pos = anchor.after_pos + 1;
    }
    run(
        &before[before_pos as usize..],
        &after[after_pos as usize..],
        &mut removed[before_pos as usize..],
        &mut added[after_pos as usize..],
        cancel,
    )
}

#[derive(Clone, Copy)]
struct Anchor {
    before_pos: u32,
    after_pos: u32,
}

enum Occurrence {
    Unique(u32),
    Duplicate,
}

/// Tokens that occur exactly once in `before` and exactly once in `after`,
/// paired by position and ordered by `before_pos`.
fn unique_anchors(before: &[Token], after: &[Token]) -> Vec<Anchor> {
    let mut in_before: AHashMap<Token, Occurrence> = AHashMap::default();
    for (i, &token) in before.iter().enumerate() {
        in_before
            .entry(token)
            .and_modify(|e| *e = Occurrence::Duplicate)
            .or_insert(Occurrence::Unique(i as u32));
    }

    let mut in_after: AHashMap<Token, Occurrence> = AHashMap::default();
    for (i, &token) in after.iter().enumerate() {
        in_after
            .entry(token)
            .and_modify(|e| *e = Occurrence::Duplicate)
            .or_insert(Occurrence::Unique(i as u32));
    }

    let mut anchors: Vec<Anchor> = in_before
        .iter()
        .filter_map(|(token, occ)| {
            let Occurrence::Unique(before_pos) = occ else {
                return None;
            };
            let Occurrence::Unique(after_pos) = in_after.get(token)? else {
                return None;
            };
            Some(Anchor {
                before_pos: *before_pos,
                after_pos: *after_pos,
            })
        })
        .collect();
    anchors.sort_unstable_by_key(|a| a.before_pos);
    anchors
}

/// Finds the longest strictly increasing subsequence of `after_pos` among
/// `anchors` (already sorted by `before_pos`), via patience sorting:
/// maintains one pile per distinct subsequence length, each holding the
/// anchor index with the smallest `after_pos` ending a chain of that
/// length, plus back-pointers to reconstruct the winning chain.
fn longest_anchor_chain(anchors: &[Anchor]) -> Vec<usize> {
    if anchors.is_empty() {
        return Vec::new();
    }

    let mut piles: Vec<usize> = Vec::new();
    let mut predecessor: Vec<Option<usize>> = vec![None; anchors.len()];

    for (i, anchor) in anchors.iter().enumerate() {
        let pile = piles.partition_point(|&p| anchors[p].after_pos < anchor.after_pos);
        if pile > 0 {
            predecessor[i] = Some(piles[pile - 1]);
        }
        if pile == piles.len() {
            piles.push(i);
        } else {
            piles[pile] = i;
        }
    }

    let mut chain = Vec::with_capacity(piles.len());
    let mut cur = piles.last().copied();
    while let Some(i) = cur {
        chain.push(i);
        cur = predecessor[i];
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InternedInput;

    fn run(before: &str, after: &str) -> (Vec<bool>, Vec<bool>) {
        let input = InternedInput::new(before, after);
        let mut removed = vec![false; input.before.len()];
        let mut added = vec![false; input.after.len()];
        diff(&input.before, &input.after, &mut removed, &mut added, &()).unwrap();
        (removed, added)
    }

    #[test]
    fn identical_inputs_produce_no_changes() {
        let (removed, added) = run("a\nb\nc\n", "a\nb\nc\n");
        assert!(removed.iter().all(|&r| !r));
        assert!(added.iter().all(|&a| !a));
    }

    #[test]
    fn anchors_on_unique_lines_around_a_reordered_block() {
        // "fn foo" and "fn bar" each occur once on both sides and anchor the
        // diff around the reordered body.
        let before = "fn foo() {\nfn bar() {\n";
        let after = "fn foo() {\nx\nfn bar() {\n";
        let (removed, added) = run(before, after);
        assert_eq!(removed, vec![false, false]);
        assert_eq!(added, vec![false, true, false]);
    }

    #[test]
    fn chain_picks_longest_increasing_run_and_skips_crossing_anchors() {
        // anchor 1 crosses anchor 0's after_pos order, so it must be dropped
        let anchors = [
            Anchor { before_pos: 0, after_pos: 0 },
            Anchor { before_pos: 1, after_pos: 3 },
            Anchor { before_pos: 2, after_pos: 1 },
            Anchor { before_pos: 3, after_pos: 2 },
        ];
        let chain = longest_anchor_chain(&anchors);
        assert_eq!(chain, vec![0, 2, 3]);
    }

    #[test]
    fn unique_anchors_ignores_tokens_repeated_on_either_side() {
        let input = InternedInput::new("a\nb\na\n", "a\nb\nb\n");
        let anchors = unique_anchors(&input.before, &input.after);
        // "a\n" is duplicated in before, "b\n" is duplicated in after: neither anchors
        assert!(anchors.is_empty());
    }

    #[test]
    fn falls_back_to_myers_when_no_span_has_a_unique_anchor() {
        // after trimming the common "x"/"y" ends, the middle span is [a,b,a]
        // vs [b,a,b]; every token repeats on both sides of that span so no
        // anchor ever forms and it must go through the Myers fallback.
        let before = "x\na\nb\na\ny\n";
        let after = "x\nb\na\nb\ny\n";
        let (removed, added) = run(before, after);
        assert!(!removed[0] && !removed[4]);
        assert!(!added[0] && !added[4]);
        let kept = removed.iter().filter(|&&r| !r).count();
        let kept_after = added.iter().filter(|&&a| !a).count();
        assert_eq!(kept, kept_after);
    }
}
