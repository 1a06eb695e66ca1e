/// Sequence similarity in `[0, 1]`: `2 * M / T`, where `M` is the number of
/// characters in recursively found longest common blocks and `T` the combined length.
///
/// Two empty strings are identical (1.0). The block count can depend on argument
/// order when longest blocks tie, so the larger of both directions is returned
/// to keep the ratio symmetric.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b).max(matching_chars(&b, &a));
    2.0 * matched as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
/// Earliest block in `a`, then in `b`, wins ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // run[j - blo + 1] = length of the common run ending at (i - 1, j)
    let width = bhi.saturating_sub(blo) + 1;
    let mut prev = vec![0usize; width];
    let mut next = vec![0usize; width];
    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            if a[i] == b[j] {
                let len = prev[slot - 1] + 1;
                next[slot] = len;
                if len > best_len {
                    best_i = i + 1 - len;
                    best_j = j + 1 - len;
                    best_len = len;
                }
            } else {
                next[slot] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut next);
    }
    (best_i, best_j, best_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(close(similarity_ratio("晴天", "晴天"), 1.0));
        assert!(close(similarity_ratio("", ""), 1.0));
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(close(similarity_ratio("小幸运", "卜卦"), 0.0));
        assert!(close(similarity_ratio("abc", ""), 0.0));
    }

    #[test]
    fn known_ratios_match_block_counting() {
        // "abcd" vs "bcde": block "bcd" -> 2 * 3 / 8
        assert!(close(similarity_ratio("abcd", "bcde"), 0.75));
        // two separate blocks "ab" and "d" -> 2 * 3 / 8
        assert!(close(similarity_ratio("abxd", "abyd"), 0.75));
    }

    #[test]
    fn ratio_is_symmetric_and_bounded() {
        let samples = ["tide", "diet", "稻香", "周杰伦稻香", "abab", "baba", "", "x"];
        for a in samples {
            for b in samples {
                let ab = similarity_ratio(a, b);
                let ba = similarity_ratio(b, a);
                assert!(close(ab, ba), "{a:?} vs {b:?}: {ab} != {ba}");
                assert!((0.0..=1.0).contains(&ab));
            }
        }
    }
}
