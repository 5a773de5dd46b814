//! Line-oriented diff between two version snapshots.
//!
//! Lines are aligned by longest common subsequence after trimming the
//! common prefix and suffix. When the remaining middle is too large for
//! the quadratic table, lines are paired by position instead.

use serde::{Deserialize, Serialize};

/// Largest `lines_a * lines_b` aligned by LCS.
pub const LCS_CELL_LIMIT: usize = 4_000_000;

/// How a line takes part in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Context,
    Removed,
    Added,
}

impl LineTag {
    fn prefix(self) -> &'static str {
        match self {
            Self::Context => "  ",
            Self::Removed => "- ",
            Self::Added => "+ ",
        }
    }
}

/// Change counters.
///
/// `modified` counts lines replaced in place: within each contiguous
/// block of changes, the smaller of its removals and additions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

/// A computed diff: counters plus the rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    pub changes: ChangeCounts,
    pub diff: String,
}

/// Diff `old` against `new`.
pub fn diff_lines(old: &str, new: &str) -> LineDiff {
    let a: Vec<&str> = old.lines().collect();
    let b: Vec<&str> = new.lines().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let mut ops: Vec<(LineTag, &str)> = a[..prefix].iter().map(|l| (LineTag::Context, *l)).collect();
    if mid_a.len().saturating_mul(mid_b.len()) <= LCS_CELL_LIMIT {
        lcs_ops(mid_a, mid_b, &mut ops);
    } else {
        positional_ops(mid_a, mid_b, &mut ops);
    }
    ops.extend(a[a.len() - suffix..].iter().map(|l| (LineTag::Context, *l)));

    render(&ops)
}

fn lcs_ops<'s>(a: &[&'s str], b: &[&'s str], ops: &mut Vec<(LineTag, &'s str)>) {
    let (n, m) = (a.len(), b.len());
    let width = m + 1;
    // table[i * width + j] = LCS length of a[i..] and b[j..]
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            ops.push((LineTag::Context, a[i]));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            ops.push((LineTag::Removed, a[i]));
            i += 1;
        } else {
            ops.push((LineTag::Added, b[j]));
            j += 1;
        }
    }
    ops.extend(a[i..].iter().map(|l| (LineTag::Removed, *l)));
    ops.extend(b[j..].iter().map(|l| (LineTag::Added, *l)));
}

fn positional_ops<'s>(a: &[&'s str], b: &[&'s str], ops: &mut Vec<(LineTag, &'s str)>) {
    for idx in 0..a.len().max(b.len()) {
        match (a.get(idx), b.get(idx)) {
            (Some(x), Some(y)) if x == y => ops.push((LineTag::Context, *x)),
            (Some(x), Some(y)) => {
                ops.push((LineTag::Removed, *x));
                ops.push((LineTag::Added, *y));
            }
            (Some(x), None) => ops.push((LineTag::Removed, *x)),
            (None, Some(y)) => ops.push((LineTag::Added, *y)),
            (None, None) => {}
        }
    }
}

fn render(ops: &[(LineTag, &str)]) -> LineDiff {
    let mut changes = ChangeCounts::default();
    let (mut block_removed, mut block_added) = (0, 0);
    let mut text = Vec::with_capacity(ops.len());

    for (tag, line) in ops {
        match tag {
            LineTag::Context => {
                changes.modified += block_removed.min(block_added);
                block_removed = 0;
                block_added = 0;
            }
            LineTag::Removed => {
                changes.removed += 1;
                block_removed += 1;
            }
            LineTag::Added => {
                changes.added += 1;
                block_added += 1;
            }
        }
        text.push(format!("{}{line}", tag.prefix()));
    }
    changes.modified += block_removed.min(block_added);

    LineDiff {
        changes,
        diff: text.join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_has_no_changes() {
        let diff = diff_lines("a\nb\n", "a\nb\n");
        assert_eq!(diff.changes, ChangeCounts::default());
        assert_eq!(diff.diff, "  a\n  b");
    }

    #[test]
    fn test_replaced_line_counts_as_modified() {
        let diff = diff_lines("a\nb\nc", "a\nB\nc");
        assert_eq!(
            diff.changes,
            ChangeCounts {
                added: 1,
                removed: 1,
                modified: 1
            }
        );
        assert_eq!(diff.diff, "  a\n- b\n+ B\n  c");
    }

    #[test]
    fn test_inserted_line_does_not_shift_the_rest() {
        let diff = diff_lines("a\nb\nc\nd", "x\na\nb\nc\nd");
        assert_eq!(
            diff.changes,
            ChangeCounts {
                added: 1,
                removed: 0,
                modified: 0
            }
        );
        assert!(diff.diff.starts_with("+ x\n  a"));
    }

    #[test]
    fn test_lcs_in_middle_block() {
        let diff = diff_lines("h\n1\n2\n3\nt", "h\n2\n3\n4\nt");
        assert_eq!(diff.changes.removed, 1);
        assert_eq!(diff.changes.added, 1);
        assert_eq!(diff.changes.modified, 0);
        assert_eq!(diff.diff, "  h\n- 1\n  2\n  3\n+ 4\n  t");
    }

    #[test]
    fn test_positional_fallback_pairs_by_index() {
        let mut ops = Vec::new();
        positional_ops(&["a", "b"], &["a", "c", "d"], &mut ops);
        assert_eq!(
            ops,
            vec![
                (LineTag::Context, "a"),
                (LineTag::Removed, "b"),
                (LineTag::Added, "c"),
                (LineTag::Added, "d"),
            ]
        );
        let rendered = render(&ops);
        assert_eq!(rendered.changes.modified, 1);
    }

    #[test]
    fn test_empty_to_content() {
        let diff = diff_lines("", "one\ntwo");
        assert_eq!(diff.changes.added, 2);
        assert_eq!(diff.changes.modified, 0);
    }
}
