//! String similarity used by the fuzzy and keyword price tiers.
//!
//! `similarity_ratio` is the Ratcliff-Obershelp "gestalt" score: find the
//! longest common contiguous block, recurse on the unmatched text to its left
//! and right, and score `2 * matched / (len(a) + len(b))`. Comparison is per
//! Unicode scalar value so CJK names score the same way Latin names do.

use std::collections::HashSet;

/// A common block: `a[a_start..a_start + len] == b[b_start..b_start + len]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Among equally long blocks the one starting earliest in `a` wins, then the
/// one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> MatchingBlock {
    let mut best = MatchingBlock {
        a_start: alo,
        b_start: blo,
        len: 0,
    };
    // run[j + 1] = length of the common suffix ending at a[i], b[j]
    let mut prev = vec![0usize; bhi - blo + 1];
    let mut run = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let k = j - blo + 1;
            if a[i] == b[j] {
                run[k] = prev[k - 1] + 1;
                if run[k] > best.len {
                    best = MatchingBlock {
                        a_start: i + 1 - run[k],
                        b_start: j + 1 - run[k],
                        len: run[k],
                    };
                }
            } else {
                run[k] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }
    best
}

/// All matching blocks of two char sequences, ordered by position in `a`
pub fn matching_blocks(a: &[char], b: &[char]) -> Vec<MatchingBlock> {
    let mut blocks = Vec::new();
    let mut pending = vec![((0, a.len()), (0, b.len()))];

    while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let block = longest_match(a, b, (alo, ahi), (blo, bhi));
        if block.len == 0 {
            continue;
        }
        pending.push(((alo, block.a_start), (blo, block.b_start)));
        pending.push((
            (block.a_start + block.len, ahi),
            (block.b_start + block.len, bhi),
        ));
        blocks.push(block);
    }

    blocks.sort_by_key(|block| (block.a_start, block.b_start));
    blocks
}

/// Ratcliff-Obershelp similarity in `[0, 1]`; two empty strings score 1.0
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched: usize = matching_blocks(&a, &b).iter().map(|block| block.len).sum();
    2.0 * matched as f64 / total as f64
}

/// Whitespace-separated token set
pub fn tokens(text: &str) -> HashSet<&str> {
    text.split_whitespace().collect()
}

/// Number of whitespace tokens two strings have in common
pub fn shared_token_count(a: &str, b: &str) -> usize {
    let a = tokens(a);
    tokens(b).iter().filter(|token| a.contains(*token)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_identical_and_disjoint() {
        assert_eq!(similarity_ratio("apple", "apple"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_prefix_match_ratio() {
        // 17 matched chars out of 17 + 25
        let ratio = similarity_ratio("organic red apple", "organic red apple (large)");
        assert!((ratio - 34.0 / 42.0).abs() < 1e-12);
    }

    #[test]
    fn test_recursion_on_both_sides() {
        // Longest block "BCD", then "A" on the left is unmatched in b,
        // "F" on the right matches.
        let blocks = matching_blocks(&chars("ABCDEF"), &chars("BCDXF"));
        assert_eq!(
            blocks,
            vec![
                MatchingBlock {
                    a_start: 1,
                    b_start: 0,
                    len: 3
                },
                MatchingBlock {
                    a_start: 5,
                    b_start: 4,
                    len: 1
                },
            ]
        );
        let ratio = similarity_ratio("ABCDEF", "BCDXF");
        assert!((ratio - 8.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_earliest_block_wins_ties() {
        let block = longest_match(&chars("abab"), &chars("ab"), (0, 4), (0, 2));
        assert_eq!(block.a_start, 0);
        assert_eq!(block.b_start, 0);
        assert_eq!(block.len, 2);
    }

    #[test]
    fn test_cjk_ratio() {
        let ratio = similarity_ratio("有机红苹果", "有机红苹果（大）");
        assert!((ratio - 10.0 / 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_shared_tokens() {
        assert_eq!(shared_token_count("fresh whole milk", "whole milk 1L"), 2);
        assert_eq!(shared_token_count("milk milk", "milk"), 1);
        assert_eq!(shared_token_count("xyz123", "organic red apple"), 0);
    }
}
