//! The O(NP) algorithm (Wu, Manber, Myers, Miller 1989), spec §4.4.
//!
//! A diagonal-sweep variant of Myers' algorithm that ascends along the main
//! diagonal `delta = N - M`, tracking the farthest point reached on each
//! diagonal (`fp[k]`) and extending *snakes* (maximal diagonal runs of
//! matches) at every step. The path cost `p` corresponds to the number of
//! insertions needed on the shorter side; when the second sequence is
//! shorter than the first the two are swapped (`xchg`) for the duration of
//! the sweep and the result is un-swapped on output.
//!
//! Arena/index style mirrors the rest of this crate (see
//! `histogram/list_pool.rs`'s pool allocator and `myers/middle_snake.rs`'s
//! per-diagonal frontier array): rather than a chain of `Rc`/`Box` nodes,
//! each diagonal's route is a singly-linked list of [`Node`]s living in one
//! flat arena, addressed by index, and freed in one shot when the arena is
//! dropped at the end of the call.

use crate::cancel::Cancel;
use crate::error::Result;
use crate::intern::Token;

/// One matched run (snake) on the route that produced a diagonal's current
/// farthest point, plus the single-token edit that preceded it (absent for
/// the very first node on the path).
struct Node {
    /// The diagonal (`y - x`) this node lives on.
    k: i32,
    /// Position in `a` where this snake starts (after the preceding edit,
    /// if any).
    start_x: i32,
    /// Position in `a` where this snake ends (`fp[k]` at the time this node
    /// was recorded).
    end_x: i32,
    /// `true` if the edit preceding this snake was an insertion into `b`
    /// (diagonal `k - 1` -> `k`); `false` if it was a deletion from `a`
    /// (diagonal `k + 1` -> `k`). Meaningless (and unused) when `prev` is
    /// `None`.
    via_insert: bool,
    /// Index of the node this one continues from, or `None` for the path's
    /// root (the true origin `(0, 0)`).
    prev: Option<u32>,
}

/// Computes an O(NP) diff, writing into `removed`/`added` boolean arrays
/// the same way [`myers::diff`](crate::myers::diff) and
/// [`histogram::diff`](crate::histogram::diff) do.
pub fn diff(
    before: &[Token],
    after: &[Token],
    removed: &mut [bool],
    added: &mut [bool],
    cancel: &impl Cancel,
) -> Result<()> {
    let (a, b, xchg) = if before.len() <= after.len() {
        (before, after, false)
    } else {
        (after, before, true)
    };

    let m = a.len() as i32;
    let n = b.len() as i32;
    let delta = n - m;

    if m == 0 {
        // `a` is empty: every token of `b` is an unmatched insertion into
        // `b`. Map onto the caller's removed/after, un-swapping if needed.
        if xchg {
            removed.fill(true);
        } else {
            added.fill(true);
        }
        return Ok(());
    }

    let offset = (m + 1) as usize;
    let size = (m + n + 3) as usize;
    let idx = |k: i32| (k + offset as i32) as usize;

    let mut fp = vec![-1i32; size];
    let mut route: Vec<Option<u32>> = vec![None; size];
    let mut arena: Vec<Node> = Vec::new();

    macro_rules! step {
        ($k:expr) => {{
            let k = $k;
            let insert_candidate = fp[idx(k - 1)];
            let delete_candidate = fp[idx(k + 1)] + 1;
            let use_insert = insert_candidate >= delete_candidate;
            let (x0, prev) = if use_insert {
                (insert_candidate, route[idx(k - 1)])
            } else {
                (delete_candidate, route[idx(k + 1)])
            };
            let x0 = x0.max(0);

            let mut x = x0;
            let mut y = x + k;
            while x < m && y < n && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }

            arena.push(Node {
                k,
                start_x: x0,
                end_x: x,
                via_insert: use_insert,
                prev,
            });
            let node_idx = (arena.len() - 1) as u32;
            fp[idx(k)] = x;
            route[idx(k)] = Some(node_idx);
        }};
    }

    let mut p: i32 = -1;
    loop {
        cancel.check()?;
        p += 1;
        for k in -p..delta {
            step!(k);
        }
        for k in ((delta + 1)..=(delta + p)).rev() {
            step!(k);
        }
        step!(delta);
        if fp[idx(delta)] >= m {
            break;
        }
        debug_assert!(p <= m + n, "O(NP) sweep did not converge");
    }

    // internal_removed tracks deletions from `a`, internal_added tracks
    // insertions into `b`; these get mapped onto the caller's removed/added
    // (which describe `before`/`after`) below, un-swapping if needed.
    let mut internal_removed = vec![false; a.len()];
    let mut internal_added = vec![false; b.len()];

    let mut node_idx = route[idx(delta)];
    while let Some(i) = node_idx {
        let node = &arena[i as usize];
        if let Some(prev) = node.prev {
            if node.via_insert {
                // The inserted token in `b` sits immediately before this
                // node's snake start, on the predecessor's row.
                let y = node.start_x + node.k - 1;
                internal_added[y as usize] = true;
            } else {
                let prev_node = &arena[prev as usize];
                internal_removed[prev_node.end_x as usize] = true;
            }
        }
        node_idx = node.prev;
    }

    if xchg {
        removed.copy_from_slice(&internal_added);
        added.copy_from_slice(&internal_removed);
    } else {
        removed.copy_from_slice(&internal_removed);
        added.copy_from_slice(&internal_added);
    }

    Ok(())
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
    fn empty_before_is_pure_insert() {
        let (removed, added) = run("", "a\nb\n");
        assert!(removed.is_empty());
        assert!(added.iter().all(|&a| a));
    }

    #[test]
    fn empty_after_is_pure_delete() {
        let (removed, added) = run("a\nb\n", "");
        assert!(removed.iter().all(|&r| r));
        assert!(added.is_empty());
    }

    #[test]
    fn single_middle_replace() {
        let (removed, added) = run("a\nb\nc\n", "a\nx\nc\n");
        assert_eq!(removed, vec![false, true, false]);
        assert_eq!(added, vec![false, true, false]);
    }
}
