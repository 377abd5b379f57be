//! Member Matcher
//!
//! Maps a resolved key onto a directory entry. Rules are tried in order over
//! the whole directory: full name, first name, then substring of the full
//! name.

use crate::models::directory::{AuthorDirectory, AuthorRecord};

/// Which rule matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    FullName,
    FirstName,
    Substring,
}

pub fn match_member<'a>(directory: &'a AuthorDirectory, key: &str) -> Option<&'a AuthorRecord> {
    match_member_with_rule(directory, key).map(|(author, _)| author)
}

pub fn match_member_with_rule<'a>(
    directory: &'a AuthorDirectory,
    key: &str,
) -> Option<(&'a AuthorRecord, MatchRule)> {
    let key = key.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }

    let authors = directory.authors();

    authors
        .iter()
        .find(|a| a.name.to_lowercase() == key)
        .map(|a| (a, MatchRule::FullName))
        .or_else(|| {
            authors
                .iter()
                .find(|a| a.first_name().to_lowercase() == key)
                .map(|a| (a, MatchRule::FirstName))
        })
        .or_else(|| {
            authors
                .iter()
                .find(|a| a.name.to_lowercase().contains(&key))
                .map(|a| (a, MatchRule::Substring))
        })
}
