//! Shortest edit script between two strings, classic Myers O((N+M)D):
//! grow match diagonals per edit distance, record the frontier per step,
//! then walk the trace backward to emit edits in original order.
//!
//! Indices are char indices (`index_a` into the original, `index_b` into
//! the corrected text). Replaying the ops — `a` for equal, `b` for
//! insert/replace, nothing for delete — reconstructs the corrected text;
//! `a` for equal/delete reconstructs the original.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Equal,
    Insert,
    Delete,
    Replace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffOp {
    pub op: DiffKind,
    pub a: String,
    pub b: String,
    pub index_a: usize,
    pub index_b: usize,
}

#[derive(Debug, Clone, Copy)]
enum Edit {
    Equal,
    Insert,
    Delete,
}

/// Walk the recorded frontiers backward from the terminal corner, emitting
/// edits in reverse. Each trace level keeps the previous level's values on
/// the opposite-parity diagonals, which is exactly what the backtrack needs.
fn build_edits(n: usize, m: usize, trace: &[Vec<usize>]) -> Vec<Edit> {
    let max = n + m;
    let mut edits = Vec::new();
    let mut x = n as isize;
    let mut y = m as isize;

    for d in (1..trace.len()).rev() {
        let v = &trace[d];
        let k = x - y;
        let idx = (max as isize + k) as usize;
        let d = d as isize;
        let prev_k = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_idx = (max as isize + prev_k) as usize;
        let prev_x = v[prev_idx] as isize;
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            edits.push(Edit::Equal);
            x -= 1;
            y -= 1;
        }

        if x == prev_x {
            edits.push(Edit::Insert);
            y -= 1;
        } else {
            edits.push(Edit::Delete);
            x -= 1;
        }
    }

    while x > 0 && y > 0 {
        edits.push(Edit::Equal);
        x -= 1;
        y -= 1;
    }
    while x > 0 {
        edits.push(Edit::Delete);
        x -= 1;
    }
    while y > 0 {
        edits.push(Edit::Insert);
        y -= 1;
    }

    edits.reverse();
    edits
}

/// Compute the minimal edit script from `a` to `b`. Equal inputs short-
/// circuit without running the search.
pub fn diff_text(a: &str, b: &str) -> Vec<DiffOp> {
    if a == b {
        if a.is_empty() {
            return Vec::new();
        }
        return vec![DiffOp {
            op: DiffKind::Equal,
            a: a.to_string(),
            b: a.to_string(),
            index_a: 0,
            index_b: 0,
        }];
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = a_chars.len();
    let m = b_chars.len();
    let max = n + m;
    let mut v = vec![0usize; 2 * max + 1];
    let mut trace: Vec<Vec<usize>> = Vec::new();

    'outer: for d in 0..=(max as isize) {
        let mut snapshot = v.clone();
        let mut k = -d;
        while k <= d {
            let idx = (max as isize + k) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && a_chars[x] == b_chars[y] {
                x += 1;
                y += 1;
            }
            snapshot[idx] = x;
            if x >= n && y >= m {
                trace.push(snapshot);
                break 'outer;
            }
            k += 2;
        }
        trace.push(snapshot.clone());
        v = snapshot;
    }

    let edits = build_edits(n, m, &trace);
    build_diff_ops(&a_chars, &b_chars, &edits)
}

/// Coalesce per-char edits into runs, then merge adjacent delete/insert
/// pairs covering the same region into replace ops.
fn build_diff_ops(a_chars: &[char], b_chars: &[char], edits: &[Edit]) -> Vec<DiffOp> {
    let mut diffs: Vec<DiffOp> = Vec::new();
    let mut index_a = 0;
    let mut index_b = 0;

    for edit in edits {
        match edit {
            Edit::Equal => {
                let ch = a_chars[index_a];
                match diffs.last_mut() {
                    Some(op) if op.op == DiffKind::Equal => {
                        op.a.push(ch);
                        op.b.push(ch);
                    }
                    _ => diffs.push(DiffOp {
                        op: DiffKind::Equal,
                        a: ch.to_string(),
                        b: ch.to_string(),
                        index_a,
                        index_b,
                    }),
                }
                index_a += 1;
                index_b += 1;
            }
            Edit::Delete => {
                let ch = a_chars[index_a];
                match diffs.last_mut() {
                    Some(op) if op.op == DiffKind::Delete => op.a.push(ch),
                    _ => diffs.push(DiffOp {
                        op: DiffKind::Delete,
                        a: ch.to_string(),
                        b: String::new(),
                        index_a,
                        index_b,
                    }),
                }
                index_a += 1;
            }
            Edit::Insert => {
                let ch = b_chars[index_b];
                match diffs.last_mut() {
                    Some(op) if op.op == DiffKind::Insert => op.b.push(ch),
                    _ => diffs.push(DiffOp {
                        op: DiffKind::Insert,
                        a: String::new(),
                        b: ch.to_string(),
                        index_a,
                        index_b,
                    }),
                }
                index_b += 1;
            }
        }
    }

    let mut merged: Vec<DiffOp> = Vec::with_capacity(diffs.len());
    let mut iter = diffs.into_iter().peekable();
    while let Some(current) = iter.next() {
        let mergeable = match (&current, iter.peek()) {
            (cur, Some(next)) if cur.op == DiffKind::Delete && next.op == DiffKind::Insert => {
                cur.index_b == next.index_b
            }
            (cur, Some(next)) if cur.op == DiffKind::Insert && next.op == DiffKind::Delete => {
                cur.index_a == next.index_a
            }
            _ => false,
        };
        if mergeable {
            let next = iter.next().expect("peeked");
            let (a, b) = if current.op == DiffKind::Delete {
                (current.a, next.b)
            } else {
                (next.a, current.b)
            };
            merged.push(DiffOp {
                op: DiffKind::Replace,
                a,
                b,
                index_a: current.index_a.min(next.index_a),
                index_b: current.index_b.min(next.index_b),
            });
        } else {
            merged.push(current);
        }
    }

    merged
}

/// Rebuild the corrected text from an op sequence.
pub fn replay_corrected(diffs: &[DiffOp]) -> String {
    let mut output = String::new();
    for diff in diffs {
        match diff.op {
            DiffKind::Equal => output.push_str(&diff.a),
            DiffKind::Insert | DiffKind::Replace => output.push_str(&diff.b),
            DiffKind::Delete => {}
        }
    }
    output
}

/// Rebuild the original text from an op sequence.
pub fn replay_original(diffs: &[DiffOp]) -> String {
    let mut output = String::new();
    for diff in diffs {
        match diff.op {
            DiffKind::Equal | DiffKind::Delete | DiffKind::Replace => output.push_str(&diff.a),
            DiffKind::Insert => {}
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roundtrip(a: &str, b: &str) {
        let diffs = diff_text(a, b);
        assert_eq!(replay_corrected(&diffs), b, "corrected replay for {:?} -> {:?}", a, b);
        assert_eq!(replay_original(&diffs), a, "original replay for {:?} -> {:?}", a, b);
    }

    #[test]
    fn test_equal_inputs_short_circuit() {
        let diffs = diff_text("같다", "같다");
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].op, DiffKind::Equal);
        assert!(diff_text("", "").is_empty());
    }

    #[test]
    fn test_simple_edits() {
        assert_roundtrip("abc", "axc");
        assert_roundtrip("abc", "abxc");
        assert_roundtrip("abxc", "abc");
        assert_roundtrip("", "abc");
        assert_roundtrip("abc", "");
    }

    #[test]
    fn test_korean_correction_roundtrip() {
        assert_roundtrip("나는 가방에 드러갓어.", "나는 가방에 들어갔어.");
        assert_roundtrip("그낭 걸엇어.", "그냥 걸었어.");
        assert_roundtrip("할수있어", "할 수 있어");
    }

    #[test]
    fn test_multibyte_boundaries() {
        assert_roundtrip("한글과 English 혼용", "한글과 English 혼용!");
        assert_roundtrip("ㅅㅂ", "시발");
    }

    #[test]
    fn test_ops_are_ordered() {
        let diffs = diff_text("가나다라", "가다나라");
        let mut last_a = 0;
        for d in &diffs {
            assert!(d.index_a >= last_a);
            last_a = d.index_a;
        }
    }
}
