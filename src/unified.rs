//! The Git-style unified diff formatter.
//!
//! Keeps the hunk-grouping/context-window logic of a classic per-change
//! line-diff builder, but builds directly off an already computed [`Diff`]
//! instead of a callback-per-change interface, and adds the full header
//! framing (`diff --zeta`, `index`/mode/rename lines, created/deleted file
//! handling, "\ No newline at end of file"). Binary/fragment files skip
//! hunk rendering for a `… differ` message instead.

use std::fmt::Display;
use std::fmt::Write as _;

use crate::change::{Change, FileMeta};
use crate::intern::InternedInput;
use crate::newline::Newline;
use crate::sources::write_token;
use crate::Diff;

/// The content hash Git itself uses for a side that doesn't exist (a
/// created file's `from`, or a deleted file's `to`).
const NULL_HASH: &str = "0000000";

/// Line-count/hunk summary of a diff (spec §6.3 `stat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stat {
    /// Number of tokens inserted across every hunk.
    pub additions: u32,
    /// Number of tokens removed across every hunk.
    pub deletions: u32,
    /// Number of hunks (contiguous changed regions).
    pub hunks: u32,
}

impl Stat {
    pub(crate) fn from_diff(diff: &Diff) -> Stat {
        let mut stat = Stat::default();
        for hunk in diff.hunks() {
            stat.hunks += 1;
            stat.deletions += hunk.before.end - hunk.before.start;
            stat.additions += hunk.after.end - hunk.after.start;
        }
        stat
    }
}

/// Renders `diff` between `input.before` and `input.after` as a unified
/// diff with `context` lines of symmetrical context, under the given
/// `newline` mode. `before_final_newline`/`after_final_newline` record
/// whether the original (pre-tokenization) text ended in a line
/// terminator, to emit the "\ No newline at end of file" marker.
///
/// `from`/`to` carry the name/hash/mode header fields (spec §3); `is_binary`/
/// `is_fragments` skip hunk rendering entirely in favor of a `Binary files …
/// differ`/`Fragments files … differ` message (spec §6.2). Content hashing
/// and binary/fragment sniffing are the caller's responsibility.
#[allow(clippy::too_many_arguments)]
pub(crate) fn render<T: Display>(
    from: &FileMeta,
    to: &FileMeta,
    input: &InternedInput<T>,
    diff: &Diff,
    context: u32,
    newline: Newline,
    before_final_newline: bool,
    after_final_newline: bool,
    is_binary: bool,
    is_fragments: bool,
) -> String {
    let created = input.before.is_empty() && !input.after.is_empty();
    let deleted = !input.before.is_empty() && input.after.is_empty();
    let renamed = from.name != to.name;
    let mode_changed = !created && !deleted && from.mode != to.mode;

    let mut out = String::new();
    writeln!(out, "diff --zeta a/{} b/{}", from.name, to.name).unwrap();

    if created {
        writeln!(out, "new file mode {:o}", to.mode).unwrap();
    } else if deleted {
        writeln!(out, "deleted file mode {:o}", from.mode).unwrap();
    } else if mode_changed {
        writeln!(out, "old mode {:o}", from.mode).unwrap();
        writeln!(out, "new mode {:o}", to.mode).unwrap();
    }

    if renamed {
        writeln!(out, "rename from {}", from.name).unwrap();
        writeln!(out, "rename to {}", to.name).unwrap();
    }

    let from_hash = if created { NULL_HASH } else { from.hash.as_str() };
    let to_hash = if deleted { NULL_HASH } else { to.hash.as_str() };
    if created || deleted || mode_changed || renamed {
        writeln!(out, "index {from_hash}..{to_hash}").unwrap();
    } else {
        writeln!(out, "index {from_hash}..{to_hash} {:o}", from.mode).unwrap();
    }

    let from_path = if created {
        "/dev/null".to_string()
    } else {
        format!("a/{}", from.name)
    };
    let to_path = if deleted {
        "/dev/null".to_string()
    } else {
        format!("b/{}", to.name)
    };

    if is_binary || is_fragments {
        let kind = if is_binary { "Binary" } else { "Fragments" };
        writeln!(out, "{kind} files {from_path} and {to_path} differ").unwrap();
        return out;
    }

    writeln!(out, "--- {from_path}").unwrap();
    writeln!(out, "+++ {to_path}").unwrap();

    let mut builder = Builder {
        input,
        ctx: context,
        newline,
        before_final_newline,
        after_final_newline,
        pos: 0,
        hunk_before_start: 0,
        hunk_after_start: 0,
        hunk_before_len: 0,
        hunk_after_len: 0,
        body: String::new(),
        out: &mut out,
    };
    for change in diff.hunks().map(Change::from) {
        builder.process_change(change);
    }
    builder.flush();

    out
}

struct Builder<'a, T: Display> {
    input: &'a InternedInput<T>,
    ctx: u32,
    newline: Newline,
    before_final_newline: bool,
    after_final_newline: bool,

    pos: u32,
    hunk_before_start: u32,
    hunk_after_start: u32,
    hunk_before_len: u32,
    hunk_after_len: u32,

    body: String,
    out: &'a mut String,
}

impl<'a, T: Display> Builder<'a, T> {
    fn emit(&mut self, prefix: char, side: Side, idx: u32) {
        let tokens = match side {
            Side::Before => &self.input.before,
            Side::After => &self.input.after,
        };
        let token = tokens[idx as usize];
        let is_last = idx + 1 == tokens.len() as u32;
        let final_newline = match side {
            Side::Before => self.before_final_newline,
            Side::After => self.after_final_newline,
        };

        self.body.push(prefix);
        if is_last && !final_newline {
            write!(&mut self.body, "{}", self.input.interner[token]).unwrap();
            self.body.push('\n');
            self.body.push_str("\\ No newline at end of file\n");
        } else {
            write_token(&mut self.body, token, &self.input.interner, self.newline).unwrap();
        }
    }

    fn update_pos(&mut self, print_to: u32, move_to: u32) {
        for idx in self.pos..print_to {
            self.emit(' ', Side::Before, idx);
        }
        let len = print_to - self.pos;
        self.pos = move_to;
        self.hunk_before_len += len;
        self.hunk_after_len += len;
    }

    fn flush(&mut self) {
        if self.hunk_before_len == 0 && self.hunk_after_len == 0 {
            return;
        }
        let end = (self.pos + self.ctx).min(self.input.before.len() as u32);
        self.update_pos(end, end);

        write_hunk_header(
            self.out,
            self.hunk_before_start,
            self.hunk_before_len,
            self.hunk_after_start,
            self.hunk_after_len,
        );
        self.out.push_str(&self.body);
        self.body.clear();
        self.hunk_before_len = 0;
        self.hunk_after_len = 0;
    }

    fn process_change(&mut self, change: Change) {
        let before = change.before();
        let after = change.after();
        if (self.pos == 0 && before.start - self.pos > self.ctx)
            || (self.pos != 0 && before.start - self.pos > 2 * self.ctx)
        {
            self.flush();
            self.pos = before.start.saturating_sub(self.ctx);
            self.hunk_before_start = self.pos;
            self.hunk_after_start = after.start.saturating_sub(self.ctx);
        }
        self.update_pos(before.start, before.end);
        self.hunk_before_len += before.end - before.start;
        self.hunk_after_len += after.end - after.start;
        for idx in before.clone() {
            self.emit('-', Side::Before, idx);
        }
        for idx in after.clone() {
            self.emit('+', Side::After, idx);
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Before,
    After,
}

fn write_hunk_header(out: &mut String, before_start: u32, before_len: u32, after_start: u32, after_len: u32) {
    out.push_str("@@ -");
    write_range(out, before_start, before_len);
    out.push_str(" +");
    write_range(out, after_start, after_len);
    out.push_str(" @@\n");
}

fn write_range(out: &mut String, start: u32, len: u32) {
    if len == 0 {
        write!(out, "0,0").unwrap();
    } else if len == 1 {
        write!(out, "{}", start + 1).unwrap();
    } else {
        write!(out, "{},{}", start + 1, len).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Algorithm, InternedInput};

    fn meta(name: &str) -> FileMeta {
        FileMeta::new(name, "abc1234")
    }

    #[test]
    fn single_hunk_with_default_context() {
        let before = "hello\nworld\n";
        let after = "hello\nnovel\nworld\n";
        let input = InternedInput::new(before, after);
        let mut diff = Diff::compute(Algorithm::Histogram, &input);
        diff.postprocess_lines(&input);
        let text = render(
            &meta("a"),
            &meta("b"),
            &input,
            &diff,
            3,
            Newline::Raw,
            true,
            true,
            false,
            false,
        );
        assert!(text.contains("@@ -1,2 +1,3 @@\n"));
        assert!(text.contains(" hello\n"));
        assert!(text.contains("+novel\n"));
        assert!(text.contains(" world\n"));
        assert!(text.contains("index abc1234..abc1234 100644\n"));
    }

    #[test]
    fn missing_trailing_newline_emits_marker() {
        let before = "a\nb";
        let after = "a\nc";
        let input = InternedInput::new(before, after);
        let mut diff = Diff::compute(Algorithm::Histogram, &input);
        diff.postprocess_lines(&input);
        let text = render(
            &meta("a"),
            &meta("b"),
            &input,
            &diff,
            3,
            Newline::Raw,
            false,
            false,
            false,
            false,
        );
        assert!(text.contains("\\ No newline at end of file\n"));
    }

    #[test]
    fn created_file_uses_dev_null_and_null_hash() {
        let input = InternedInput::new("", "hello\n");
        let mut diff = Diff::compute(Algorithm::Histogram, &input);
        diff.postprocess_lines(&input);
        let text = render(
            &meta("a"),
            &meta("a"),
            &input,
            &diff,
            3,
            Newline::Raw,
            true,
            true,
            false,
            false,
        );
        assert!(text.contains("new file mode 100644\n"));
        assert!(text.contains("index 0000000..abc1234\n"));
        assert!(text.contains("--- /dev/null\n"));
        assert!(text.contains("+++ b/a\n"));
    }

    #[test]
    fn mode_change_emits_old_and_new_mode_lines() {
        let input = InternedInput::new("a\n", "a\n");
        let mut diff = Diff::compute(Algorithm::Histogram, &input);
        diff.postprocess_lines(&input);
        let from = FileMeta { mode: 0o100644, ..meta("a") };
        let to = FileMeta { mode: 0o100755, ..meta("a") };
        let text = render(&from, &to, &input, &diff, 3, Newline::Raw, true, true, false, false);
        assert!(text.contains("old mode 100644\n"));
        assert!(text.contains("new mode 100755\n"));
        assert!(text.contains("index abc1234..abc1234\n"));
    }

    #[test]
    fn rename_emits_rename_from_and_rename_to_lines() {
        let input = InternedInput::new("a\n", "a\n");
        let mut diff = Diff::compute(Algorithm::Histogram, &input);
        diff.postprocess_lines(&input);
        let text = render(
            &meta("old.txt"),
            &meta("new.txt"),
            &input,
            &diff,
            3,
            Newline::Raw,
            true,
            true,
            false,
            false,
        );
        assert!(text.contains("rename from old.txt\n"));
        assert!(text.contains("rename to new.txt\n"));
    }

    #[test]
    fn binary_flag_skips_hunks_and_emits_message() {
        let input = InternedInput::new("a\n", "b\n");
        let mut diff = Diff::compute(Algorithm::Histogram, &input);
        diff.postprocess_lines(&input);
        let text = render(
            &meta("a"),
            &meta("a"),
            &input,
            &diff,
            3,
            Newline::Raw,
            true,
            true,
            true,
            false,
        );
        assert_eq!(text, "diff --zeta a/a b/a\nindex abc1234..abc1234 100644\nBinary files a/a and b/a differ\n");
    }

    #[test]
    fn stat_counts_additions_and_deletions() {
        let input = InternedInput::new("a\nb\nc\n", "a\nx\nc\n");
        let mut diff = Diff::compute(Algorithm::Histogram, &input);
        diff.postprocess_lines(&input);
        let stat = Stat::from_diff(&diff);
        assert_eq!(stat.hunks, 1);
        assert_eq!(stat.additions, 1);
        assert_eq!(stat.deletions, 1);
    }
}
