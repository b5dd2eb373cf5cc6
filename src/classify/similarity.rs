//! Character-sequence similarity (Ratcliff/Obershelp "gestalt" matching).
//!
//! `ratio = 2·M / (|a| + |b|)` where `M` is the total length of the
//! matching blocks found by recursively taking the longest common
//! substring and repeating on the pieces to its left and right.
//!
//! Ties between equally long common substrings resolve to the one that
//! starts earliest in `a`, then earliest in `b`.  This makes the ratio
//! asymmetric for some inputs (`ratio("tide", "diet") != ratio("diet", "tide")`).
//! Comparison is on Unicode scalar values and is case-sensitive; callers
//! lower-case first.

/// Similarity of `a` and `b` in `[0.0, 1.0]`.  Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_len(&a, &b) as f64 / total as f64
}

/// Total length of all matching blocks between `a` and `b`.
fn matching_len(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    let width = bhi - blo + 1;
    // run[j - blo + 1] = length of the common run ending at (i, j)
    let mut prev = vec![0usize; width];
    let mut run = vec![0usize; width];

    for i in alo..ahi {
        run.fill(0);
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                run[j - blo + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }
    best
}
