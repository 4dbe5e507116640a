use std::ops::Range;

use crate::Hunk;

/// One edit block: a deletion of `del` tokens at position `p1` in `before`,
/// co-located with an insertion of `ins` tokens starting at position `p2`
/// in `after` (spec §3).
///
/// `del == 0` is a pure insert; `ins == 0` is a pure delete; both `> 0` is a
/// replace. A well-formed [`Change`] list (as produced by [`diff`](crate::diff))
/// is returned in strictly increasing `p1` order, never straddles the
/// common prefix/suffix, and never has overlapping replace ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Change {
    /// Position of the first removed token in `before`.
    pub p1: u32,
    /// Position of the first inserted token in `after`.
    pub p2: u32,
    /// Number of tokens removed from `before` starting at `p1`.
    pub del: u32,
    /// Number of tokens inserted into `after` starting at `p2`.
    pub ins: u32,
}

impl Change {
    /// The removed range in `before`.
    pub fn before(&self) -> Range<u32> {
        self.p1..self.p1 + self.del
    }

    /// The inserted range in `after`.
    pub fn after(&self) -> Range<u32> {
        self.p2..self.p2 + self.ins
    }

    /// Whether this change only inserts tokens.
    pub fn is_pure_insert(&self) -> bool {
        self.del == 0
    }

    /// Whether this change only removes tokens.
    pub fn is_pure_delete(&self) -> bool {
        self.ins == 0
    }
}

impl From<Hunk> for Change {
    fn from(hunk: Hunk) -> Self {
        Change {
            p1: hunk.before.start,
            p2: hunk.after.start,
            del: hunk.before.end - hunk.before.start,
            ins: hunk.after.end - hunk.after.start,
        }
    }
}

impl From<Change> for Hunk {
    fn from(change: Change) -> Self {
        Hunk {
            before: change.before(),
            after: change.after(),
        }
    }
}

/// A single tagged segment of a rune- or word-level diff (spec §3).
///
/// For [`Kind::Equal`] and [`Kind::Delete`] the text comes from `before`;
/// for [`Kind::Insert`] it comes from `after`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringDiff {
    /// Whether this segment was kept, removed, or inserted.
    pub kind: Kind,
    /// The segment text, always non-empty.
    pub text: String,
}

/// A file's identity on one side of [`unified`](crate::unified): a logical
/// name, a content hash, and a permission mode (spec §3 `Unified.from`/`to`).
/// The hash is opaque to this crate — callers own content hashing and
/// binary/fragment detection (spec §1, "Out of scope (external
/// collaborators)") and pass the result in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    /// The logical path/name shown in the diff header and `---`/`+++` lines.
    pub name: String,
    /// The content hash shown on the `index` line.
    pub hash: String,
    /// The file's permission mode, rendered in octal (e.g. `0o100644`).
    pub mode: u32,
}

impl FileMeta {
    /// A regular file (mode `0o100644`) with the given name and hash.
    pub fn new(name: impl Into<String>, hash: impl Into<String>) -> Self {
        FileMeta {
            name: name.into(),
            hash: hash.into(),
            mode: 0o100644,
        }
    }
}

/// The three kinds of line/segment a [`StringDiff`] or [`Hunk`] line can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Present, unchanged, on both sides.
    Equal,
    /// Present in `before`, removed from `after`.
    Delete,
    /// Absent from `before`, present in `after`.
    Insert,
}
