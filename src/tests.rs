//! Cross-cutting property and scenario tests (spec §8) exercised through
//! the public free-function API rather than one algorithm's internals.

use expect_test::expect;
use pretty_assertions::assert_eq;

use crate::{diff, has_conflict, merge, unified, Algorithm, Change, FileMeta, MergeOptions};

const ALGORITHMS: [Algorithm; 5] = [
    Algorithm::Histogram,
    Algorithm::Myers,
    Algorithm::Onp,
    Algorithm::Patience,
    Algorithm::Minimal,
];

/// Replays a [`Change`] list against `before`/`after`'s own lines and
/// checks it reconstructs `after` exactly (spec §8 property: applying a
/// diff's changes to `before` always reproduces `after`).
fn reconstruct(before: &str, after: &str, changes: &[Change]) -> String {
    let before_lines: Vec<&str> = crate::sources::lines(before).collect();
    let after_lines: Vec<&str> = crate::sources::lines(after).collect();
    let mut out = String::new();
    let mut pos = 0u32;
    for c in changes {
        out.push_str(&before_lines[pos as usize..c.p1 as usize].concat());
        out.push_str(&after_lines[c.p2 as usize..(c.p2 + c.ins) as usize].concat());
        pos = c.p1 + c.del;
    }
    out.push_str(&before_lines[pos as usize..].concat());
    out
}

#[test]
fn every_algorithm_reconstructs_after_from_before() {
    let cases: [(&str, &str); 4] = [
        ("a\nb\nc\nd\n", "a\nx\nc\ny\nd\n"),
        ("a\nb\nx\nx\ny\n", "b\na\nx\ny\nx\n"),
        ("", "a\nb\n"),
        ("a\nb\n", ""),
    ];
    for (before, after) in cases {
        for algorithm in ALGORITHMS {
            let changes = diff(before, after, algorithm, &()).unwrap();
            assert_eq!(
                reconstruct(before, after, &changes),
                after,
                "algorithm {algorithm:?} failed to reconstruct {after:?} from {before:?}"
            );
        }
    }
}

#[test]
fn every_algorithm_produces_no_hunks_for_identical_input() {
    let text = "a\nb\nc\n";
    for algorithm in ALGORITHMS {
        let changes = diff(text, text, algorithm, &()).unwrap();
        assert!(changes.is_empty(), "algorithm {algorithm:?} found spurious changes");
    }
}

#[test]
fn changes_are_reported_in_strictly_increasing_order() {
    let before = "1\n2\n3\n4\n5\n6\n7\n8\n";
    let after = "1\n9\n3\n4\n5\n6\n7\n10\n";
    for algorithm in ALGORITHMS {
        let changes = diff(before, after, algorithm, &()).unwrap();
        for pair in changes.windows(2) {
            assert!(pair[0].before().end < pair[1].before().start);
            assert!(pair[0].after().end < pair[1].after().start);
        }
    }
}

#[test]
fn unified_renders_header_and_hunk_for_a_simple_insertion() {
    let text = unified(
        &FileMeta::new("a", "aaa1111"),
        &FileMeta::new("b", "bbb2222"),
        "hello\nworld\n",
        "hello\nnovel\nworld\n",
        Algorithm::Histogram,
        3,
        false,
        false,
        &(),
    )
    .unwrap();
    expect![[r#"
        diff --zeta a/a b/b
        index aaa1111..bbb2222 100644
        --- a/a
        +++ b/b
        @@ -1,2 +1,3 @@
         hello
        +novel
         world
    "#]]
    .assert_eq(&text);
}

#[test]
fn unified_marks_a_missing_trailing_newline() {
    let text = unified(
        &FileMeta::new("a", "aaa1111"),
        &FileMeta::new("b", "bbb2222"),
        "x\ny",
        "x\nz",
        Algorithm::Histogram,
        3,
        false,
        false,
        &(),
    )
    .unwrap();
    assert!(text.contains("-y\n\\ No newline at end of file\n"));
    assert!(text.contains("+z\n\\ No newline at end of file\n"));
}

#[test]
fn merge_has_conflict_agrees_with_merge_outcome() {
    let cases: [(&str, &str, &str); 4] = [
        ("a\nb\nc\n", "a\nb\nc\n", "a\nb\nc\n"),
        ("a\nb\nc\n", "a\nB\nc\n", "a\nb\nC\n"),
        ("a\nb\nc\n", "a\nX\nc\n", "a\nY\nc\n"),
        ("a\nb\nc\n", "a\nB\nc\n", "a\nB\nc\n"),
    ];
    let opts = MergeOptions::default();
    for (o, a, b) in cases {
        let outcome = merge(o, a, b, &opts, &()).unwrap();
        let conflict = has_conflict(o, a, b, &opts, &()).unwrap();
        assert_eq!(outcome.has_conflict, conflict, "mismatch for {o:?}/{a:?}/{b:?}");
    }
}
