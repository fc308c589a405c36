//! Approximate name matching used to correct misspelled city names.

/// Similarity between two names in `[0, 1]`, 1 meaning identical.
pub trait NameMatcher: Send + Sync {
    fn similarity(&self, candidate: &str, query: &str) -> f64;

    /// Cheap upper bound on [`NameMatcher::similarity`], used to skip
    /// candidates before the full comparison.
    fn upper_bound(&self, _candidate: &str, _query: &str) -> f64 {
        1.0
    }
}

/// Gestalt pattern matching (Ratcliff/Obershelp).
///
/// Similarity is `2 * M / T` where `T` is the combined length and `M` the
/// number of characters in the longest common block, plus the matches found
/// recursively left and right of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceMatcher;

impl SequenceMatcher {
    pub fn new() -> Self {
        Self
    }

    fn matching_characters(a: &[char], b: &[char]) -> usize {
        let mut total = 0;
        let mut pending = vec![(0, a.len(), 0, b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, size) = Self::longest_block(a, b, alo, ahi, blo, bhi);
            if size == 0 {
                continue;
            }
            total += size;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + size < ahi && j + size < bhi {
                pending.push((i + size, ahi, j + size, bhi));
            }
        }

        total
    }

    /// Longest common block in `a[alo..ahi]` x `b[blo..bhi]`.
    ///
    /// Among equally long blocks the one starting earliest in `a`, then
    /// earliest in `b`, wins.
    fn longest_block(
        a: &[char],
        b: &[char],
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let width = bhi - blo;
        let mut best = (alo, blo, 0);
        let mut previous = vec![0usize; width + 1];
        let mut current = vec![0usize; width + 1];

        for i in alo..ahi {
            for j in blo..bhi {
                let col = j - blo;
                current[col + 1] = if a[i] == b[j] { previous[col] + 1 } else { 0 };

                let run = current[col + 1];
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
            std::mem::swap(&mut previous, &mut current);
        }

        best
    }
}

impl NameMatcher for SequenceMatcher {
    fn similarity(&self, candidate: &str, query: &str) -> f64 {
        let a: Vec<char> = candidate.chars().collect();
        let b: Vec<char> = query.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * Self::matching_characters(&a, &b) as f64 / total as f64
    }

    fn upper_bound(&self, candidate: &str, query: &str) -> f64 {
        let (la, lb) = (candidate.chars().count(), query.chars().count());
        if la + lb == 0 {
            return 1.0;
        }
        2.0 * la.min(lb) as f64 / (la + lb) as f64
    }
}

/// Best candidate whose similarity to `query` is at least `cutoff`.
///
/// Ties between equally similar candidates go to the lexicographically
/// greatest name.
pub fn closest_match<'a, M, I>(matcher: &M, query: &str, candidates: I, cutoff: f64) -> Option<&'a str>
where
    M: NameMatcher + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(f64, &'a str)> = None;

    for candidate in candidates {
        if matcher.upper_bound(candidate, query) < cutoff {
            continue;
        }
        let score = matcher.similarity(candidate, query);
        if score < cutoff {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_score, best_name)) => {
                score > best_score || (score == best_score && candidate > best_name)
            }
        };
        if better {
            best = Some((score, candidate));
        }
    }

    best.map(|(_, name)| name)
}
