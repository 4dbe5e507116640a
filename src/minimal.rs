//! The `Minimal` algorithm (spec §4.7): a classical LCS computed by dynamic
//! programming, producing an exact minimum deletion/insertion alignment.
//! Intended as a reference implementation and for small inputs; its cost is
//! `O(before.len() * after.len())` time and space.

use crate::cancel::Cancel;
use crate::error::Result;
use crate::intern::Token;

/// Computes a minimal diff via the standard LCS dynamic-programming table.
pub fn diff(
    before: &[Token],
    after: &[Token],
    removed: &mut [bool],
    added: &mut [bool],
    cancel: &impl Cancel,
) -> Result<()> {
    cancel.check()?;

    let m = before.len();
    let n = after.len();

    if m == 0 {
        added.fill(true);
        return Ok(());
    }
    if n == 0 {
        removed.fill(true);
        return Ok(());
    }

    // dp[i][j] = length of the LCS of before[i..] and after[j..], stored
    // row-major with one extra row/col of zeros for the base case.
    let stride = n + 1;
    let mut dp = vec![0u32; (m + 1) * stride];
    for i in (0..m).rev() {
        cancel.check()?;
        for j in (0..n).rev() {
            dp[i * stride + j] = if before[i] == after[j] {
                dp[(i + 1) * stride + (j + 1)] + 1
            } else {
                dp[(i + 1) * stride + j].max(dp[i * stride + (j + 1)])
            };
        }
    }

    // Walk the table from (0, 0) choosing, at each step, to follow a match
    // if one exists, otherwise to step in whichever direction preserves the
    // LCS length — this reconstructs one specific minimal alignment.
    let (mut i, mut j) = (0usize, 0usize);
    while i < m && j < n {
        if before[i] == after[j] {
            i += 1;
            j += 1;
        } else if dp[(i + 1) * stride + j] >= dp[i * stride + (j + 1)] {
            removed[i] = true;
            i += 1;
        } else {
            added[j] = true;
            j += 1;
        }
    }
    for r in removed.iter_mut().skip(i) {
        *r = true;
    }
    for a in added.iter_mut().skip(j) {
        *a = true;
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
    fn identity_has_no_changes() {
        let (removed, added) = run("a\nb\nc\n", "a\nb\nc\n");
        assert!(removed.iter().all(|&r| !r));
        assert!(added.iter().all(|&a| !a));
    }

    #[test]
    fn replace_single_line() {
        let (removed, added) = run("a\nb\nc\n", "a\nx\nc\n");
        assert_eq!(removed, vec![false, true, false]);
        assert_eq!(added, vec![false, true, false]);
    }

    #[test]
    fn disjoint_sequences_change_everything() {
        let (removed, added) = run("a\nb\n", "c\nd\n");
        assert!(removed.iter().all(|&r| r));
        assert!(added.iter().all(|&a| a));
    }
}
