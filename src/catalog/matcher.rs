//! Text matching seam for food lookup

/// Decides whether a food name matches a search query
///
/// Returns a rank (lower is better) for matches, `None` otherwise.
pub trait FoodMatcher: Send + Sync {
    fn rank(&self, query: &str, candidate: &str) -> Option<u32>;
}

/// Case-insensitive token matcher
///
/// Every whitespace-separated query token must occur in the candidate. The
/// rank is where the first token starts, so prefix hits sort first. An empty
/// query matches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl FoodMatcher for SubstringMatcher {
    fn rank(&self, query: &str, candidate: &str) -> Option<u32> {
        let haystack = candidate.to_lowercase();
        let mut tokens = query.split_whitespace().map(str::to_lowercase);

        let first = tokens.next()?;
        let position = haystack.find(&first)?;

        if tokens.all(|token| haystack.contains(&token)) {
            Some(u32::try_from(position).unwrap_or(u32::MAX))
        } else {
            None
        }
    }
}
