//! Name Resolver
//!
//! Pulls a candidate member key out of a free-text question. Known aliases
//! are checked first; otherwise a short list of question-shaped patterns is
//! tried. Captures that start with a determiner or pronoun are treated as
//! low confidence and dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const NAME: &str = r"\p{L}[\p{L}'’\-]*(?:\s+\p{L}[\p{L}'’\-]*)?";

static QUESTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(?:when|where|who|what|how)\s+(?:is|was|are|does|did|do)\s+(NAME)",
        r"\bhow\s+many\s+\S+\s+(?:does|do|did|has|have)\s+(NAME)",
        r"\b(NAME)\s+(?:planning|plans|has|have|favorite|favourite|want|wants|need|needs)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(&pattern.replace("NAME", NAME)).expect("valid name pattern"))
    .collect()
});

/// Leading auxiliaries skipped before the name
static AUXILIARIES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["is", "are", "was", "does", "do", "did", "has", "have"]));

/// A capture starting with one of these is not a name
static LOW_CONFIDENCE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "the", "a", "an", "my", "your", "his", "her", "their", "our", "its", "it", "this",
        "that", "these", "those", "there", "here", "you", "i", "me", "we", "they", "he", "she",
        "someone", "anyone", "everyone", "somebody", "anybody", "any", "some", "many", "much",
        "weather", "time", "today", "tomorrow",
    ])
});

/// A name ends before any of these
static NAME_TERMINATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "planning", "plans", "plan", "going", "has", "have", "had", "favorite", "favourite",
        "want", "wants", "need", "needs", "is", "are", "was", "does", "do", "did", "like",
        "likes", "trip", "travel", "own", "owns", "mentioned", "said", "say", "to", "for",
        "about", "in", "on", "at", "of", "and", "or", "the", "a",
    ])
});

/// Which tier produced a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Alias,
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: String,
    pub source: ResolutionSource,
}

#[derive(Debug, Clone)]
pub struct NameResolver {
    /// (word-bounded alias pattern, canonical key), longest alias first
    aliases: Vec<(Regex, String)>,
}

impl NameResolver {
    /// Builds the alias table from full member names. Each full name and its
    /// first name map to the lowercase first name.
    pub fn new<S: AsRef<str>>(known_members: &[S]) -> Self {
        let mut aliases: Vec<(String, String)> = Vec::new();

        for member in known_members {
            let full = member.as_ref().trim().to_lowercase();
            let Some(first) = full.split_whitespace().next().map(str::to_string) else {
                continue;
            };
            for alias in [full.clone(), first.clone()] {
                if !aliases.iter().any(|(existing, _)| *existing == alias) {
                    aliases.push((alias, first.clone()));
                }
            }
        }

        aliases.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        let aliases = aliases
            .into_iter()
            .map(|(alias, key)| {
                let pattern = format!(r"\b{}\b", regex::escape(&alias).replace(' ', r"\s+"));
                (Regex::new(&pattern).expect("escaped alias pattern"), key)
            })
            .collect();
        Self { aliases }
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Returns the canonical key of the member the question is about.
    pub fn resolve(&self, question: &str) -> Option<String> {
        self.resolve_with_source(question).map(|r| r.key)
    }

    pub fn resolve_with_source(&self, question: &str) -> Option<Resolution> {
        let lowered = question.to_lowercase();

        if let Some(key) = self.match_alias(&lowered) {
            return Some(Resolution {
                key,
                source: ResolutionSource::Alias,
            });
        }

        match_patterns(&lowered).map(|key| Resolution {
            key,
            source: ResolutionSource::Pattern,
        })
    }

    fn match_alias(&self, lowered: &str) -> Option<String> {
        self.aliases
            .iter()
            .find(|(alias, _)| alias.is_match(lowered))
            .map(|(_, key)| key.clone())
    }
}

fn match_patterns(lowered: &str) -> Option<String> {
    QUESTION_PATTERNS
        .iter()
        .filter_map(|pattern| pattern.captures(lowered))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .find_map(|raw| clean_candidate(&raw))
}

fn strip_possessive(token: &str) -> Option<&str> {
    token
        .strip_suffix("'s")
        .or_else(|| token.strip_suffix("’s"))
}

/// Trims a regex capture down to a name, or rejects it.
fn clean_candidate(raw: &str) -> Option<String> {
    let mut tokens = raw
        .split_whitespace()
        .skip_while(|token| AUXILIARIES.contains(token))
        .peekable();

    let first = *tokens.peek()?;
    let first_bare = strip_possessive(first).unwrap_or(first);
    if LOW_CONFIDENCE.contains(first_bare) || NAME_TERMINATORS.contains(first_bare) {
        return None;
    }

    let mut kept: Vec<&str> = Vec::new();
    for token in tokens {
        if let Some(bare) = strip_possessive(token) {
            kept.push(bare);
            break;
        }
        if NAME_TERMINATORS.contains(token) {
            break;
        }
        kept.push(token);
    }

    let name = kept.join(" ").trim().to_string();
    if name.chars().count() < 2 {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::ResolverConfig;
    use rstest::rstest;

    fn resolver() -> NameResolver {
        NameResolver::new(&ResolverConfig::default().known_members)
    }

    #[rstest]
    #[case("Tell me about Layla's trip", "layla")]
    #[case("When is Layla planning her trip to London", "layla")]
    #[case("How many cars does Vikram have", "vikram")]
    #[case("What are Amina's favorite restaurants?", "amina")]
    #[case("what did amina van den berg say", "amina")]
    #[case("Where is HANS MÜLLER going?", "hans")]
    #[case("Any news from lily o'sullivan", "lily")]
    fn test_alias_wins(#[case] question: &str, #[case] expected: &str) {
        let resolution = resolver().resolve_with_source(question).unwrap();
        assert_eq!(resolution.key, expected);
        assert_eq!(resolution.source, ResolutionSource::Alias);
    }

    #[rstest]
    #[case("When is Zed planning his trip?", "zed")]
    #[case("How many cars does Zed Brown have", "zed brown")]
    #[case("What are Zed's favorite restaurants", "zed")]
    #[case("Zed's favorite food?", "zed")]
    #[case("Who is Zed", "zed")]
    fn test_pattern_fallback(#[case] question: &str, #[case] expected: &str) {
        let resolution = resolver().resolve_with_source(question).unwrap();
        assert_eq!(resolution.key, expected);
        assert_eq!(resolution.source, ResolutionSource::Pattern);
    }

    #[rstest]
    #[case("What's the weather")]
    #[case("What is the weather like?")]
    #[case("How many cars are there")]
    #[case("hello")]
    #[case("How did the examination go for Zed?")]
    #[case("")]
    fn test_no_confident_name(#[case] question: &str) {
        assert_eq!(resolver().resolve(question), None);
    }

    #[test]
    fn test_alias_needs_whole_word() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("Did the examination go well?"), None);
        assert_eq!(
            resolver.resolve("Did Amina's examination go well?"),
            Some("amina".to_string())
        );
    }

    #[test]
    fn test_full_name_alias_maps_to_first_name() {
        let resolver = NameResolver::new(&["Amina Van Den Berg"]);
        assert_eq!(resolver.alias_count(), 2);
        assert_eq!(
            resolver.resolve("amina van den berg's restaurants"),
            Some("amina".to_string())
        );
    }

    #[test]
    fn test_empty_alias_table_uses_patterns_only() {
        let resolver = NameResolver::new::<&str>(&[]);
        assert_eq!(
            resolver.resolve("When is Layla planning her trip"),
            Some("layla".to_string())
        );
    }
}
