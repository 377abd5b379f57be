//! Topic Extractor
//!
//! Each topic is a [`TopicHandler`]: it decides from the question whether it
//! applies, then extracts an answer from one member's messages. The
//! extractor walks handlers in a fixed priority order and the first match
//! answers, so a question touching two topics gets the higher-priority one.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::directory::AuthorRecord;
use crate::models::message::MessageRecord;
use crate::qa::formatter;

/// A question in its original and case-folded forms
#[derive(Debug, Clone)]
pub struct Question {
    pub text: String,
    pub lowered: String,
}

impl Question {
    pub fn new(text: &str) -> Self {
        let text = text.trim().to_string();
        let lowered = text.to_lowercase();
        Self { text, lowered }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub trait TopicHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, question: &Question) -> bool;

    fn extract(&self, author: &AuthorRecord, question: &Question) -> String;
}

fn word_regex(words: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", words)).expect("valid keyword pattern")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

// ===== Trip =====

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("valid date pattern"));

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(this|next|on)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    )
    .expect("valid weekday pattern")
});

static RELATIVE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(next\s+(?:week|weekend|month|year)|this\s+(?:week|weekend|month)|tomorrow|tonight|in\s+(?:january|february|march|april|may|june|july|august|september|october|november|december))\b",
    )
    .expect("valid relative time pattern")
});

/// How precisely a message pins down a date; higher is more specific
#[derive(Debug, Clone, PartialEq, Eq)]
enum TripWhen {
    Relative(String),
    Weekday(String),
    Date(String),
}

impl TripWhen {
    fn clause(&self) -> String {
        match self {
            TripWhen::Date(date) => format!("around {}", date),
            TripWhen::Weekday(day) | TripWhen::Relative(day) => day.clone(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TripWhen::Relative(_) => 0,
            TripWhen::Weekday(_) => 1,
            TripWhen::Date(_) => 2,
        }
    }
}

fn trip_when(body: &str) -> Option<TripWhen> {
    if let Some(date) = ISO_DATE.find(body) {
        return Some(TripWhen::Date(date.as_str().to_string()));
    }

    if let Some(caps) = WEEKDAY.captures(body) {
        let day = capitalize(&caps[2].to_lowercase());
        let when = match caps.get(1) {
            Some(prefix) => format!("{} {}", prefix.as_str().to_lowercase(), day),
            None => day,
        };
        return Some(TripWhen::Weekday(when));
    }

    RELATIVE_TIME.find(body).map(|m| {
        let words: Vec<String> = m
            .as_str()
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();
        let phrase = match words.as_slice() {
            [preposition, month] if preposition == "in" => {
                format!("in {}", capitalize(month))
            }
            _ => words.join(" "),
        };
        TripWhen::Relative(phrase)
    })
}

pub struct TripTopic {
    places: Vec<(String, Regex)>,
}

impl TripTopic {
    pub fn new<S: AsRef<str>>(places: &[S]) -> Self {
        let places = places
            .iter()
            .map(|place| {
                let place = place.as_ref().to_lowercase();
                let pattern = word_regex(&regex::escape(&place).replace(' ', r"\s+"));
                (place, pattern)
            })
            .collect();
        Self { places }
    }

    /// The place mentioned earliest in the question
    fn place_in(&self, question: &Question) -> Option<&(String, Regex)> {
        self.places
            .iter()
            .filter_map(|entry| entry.1.find(&question.lowered).map(|m| (m.start(), entry)))
            .min_by_key(|(start, _)| *start)
            .map(|(_, entry)| entry)
    }
}

impl Default for TripTopic {
    fn default() -> Self {
        Self::new(&[
            "london",
            "paris",
            "tokyo",
            "new york",
            "milan",
            "rome",
            "dubai",
            "barcelona",
            "sydney",
            "singapore",
        ])
    }
}

impl TopicHandler for TripTopic {
    fn name(&self) -> &'static str {
        "trip"
    }

    fn matches(&self, question: &Question) -> bool {
        self.place_in(question).is_some()
    }

    fn extract(&self, author: &AuthorRecord, question: &Question) -> String {
        let Some((place, pattern)) = self.place_in(question) else {
            return formatter::statement(&format!(
                "I couldn't tell which trip you're asking about for {}",
                author.name
            ));
        };
        let place = title_case(place);

        let mentions: Vec<&MessageRecord> = author
            .messages
            .iter()
            .filter(|m| pattern.is_match(&m.body))
            .collect();

        if mentions.is_empty() {
            return formatter::statement(&format!(
                "I couldn't find information about {}'s trip to {} in the messages",
                author.name, place
            ));
        }

        // most specific wins; earlier message wins a tie
        let best = mentions
            .iter()
            .filter_map(|m| trip_when(&m.body))
            .fold(None::<TripWhen>, |best, when| match best {
                Some(current) if current.rank() >= when.rank() => Some(current),
                _ => Some(when),
            });

        match best {
            Some(when) => formatter::sentence(
                &author.name,
                &format!("is planning a trip to {} {}", place, when.clause()),
            ),
            None => formatter::sentence(
                &author.name,
                &format!("mentioned {} but no specific date was given", place),
            ),
        }
    }
}

// ===== Possession count =====

static CAR_WORD: Lazy<Regex> = Lazy::new(|| word_regex("cars?"));

static CAR_NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)\s+cars?\b").expect("valid numeral pattern"));

static CAR_QUALIFIER: Lazy<Regex> = Lazy::new(|| word_regex("second|another|two"));

#[derive(Debug, Default)]
pub struct CarCountTopic;

impl CarCountTopic {
    /// Last explicit `<N> car(s)` wins; otherwise 2 when a qualifier such as
    /// "second" appears, otherwise 1. `None` when no message mentions cars.
    pub fn count(messages: &[MessageRecord]) -> Option<u32> {
        let mut explicit: Option<u32> = None;
        let mut inferred: Option<u32> = None;

        for message in messages.iter().filter(|m| CAR_WORD.is_match(&m.body)) {
            let last_numeral = CAR_NUMERAL
                .captures_iter(&message.body)
                .filter_map(|caps| caps[1].parse::<u32>().ok())
                .last();

            match last_numeral {
                Some(n) => explicit = Some(n),
                None => {
                    let guess = if CAR_QUALIFIER.is_match(&message.body) { 2 } else { 1 };
                    inferred = Some(inferred.map_or(guess, |current| current.max(guess)));
                }
            }
        }

        explicit.or(inferred)
    }
}

impl TopicHandler for CarCountTopic {
    fn name(&self) -> &'static str {
        "possession-count"
    }

    fn matches(&self, question: &Question) -> bool {
        CAR_WORD.is_match(&question.lowered)
    }

    fn extract(&self, author: &AuthorRecord, _question: &Question) -> String {
        match Self::count(&author.messages) {
            Some(count) => formatter::sentence(&author.name, &format!("has {} car(s)", count)),
            None => formatter::statement(&format!(
                "I couldn't find information about how many cars {} has",
                author.name
            )),
        }
    }
}

// ===== Preference list =====

static PREFERENCE_WORD: Lazy<Regex> = Lazy::new(|| word_regex("restaurants?|dinner|food"));

/// Closing delimiters accepted for an opening quote
fn closers(open: char) -> Option<&'static [char]> {
    match open {
        '\'' | '‘' => Some(&['\'', '’'][..]),
        '"' | '“' => Some(&['"', '”'][..]),
        _ => None,
    }
}

/// Spans wrapped in matching quotes. A quote only opens or closes at a word
/// boundary, so apostrophes inside words (`I'd`, `Joe's`) are plain text.
fn quoted_spans(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let is_word = |i: usize| chars.get(i).is_some_and(|(_, c)| c.is_alphanumeric());

    let mut spans = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (start, open) = chars[i];
        let opens = closers(open).filter(|_| (i == 0 || !is_word(i - 1)) && is_word(i + 1));
        let Some(close) = opens else {
            i += 1;
            continue;
        };

        let end = (i + 2..chars.len()).find(|&j| close.contains(&chars[j].1) && !is_word(j + 1));
        match end {
            Some(j) => {
                let inner = &text[start + open.len_utf8()..chars[j].0];
                spans.push(inner);
                i = j + 1;
            }
            None => i += 1,
        }
    }
    spans
}

static CAPITALIZED_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\p{Lu}[\p{L}'&\-]*(?:\s+\p{Lu}[\p{L}'&\-]*)+").expect("valid phrase pattern")
});

#[derive(Debug, Default)]
pub struct PreferenceTopic;

fn push_unique(found: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !found.iter().any(|f| f == value) {
        found.push(value.to_string());
    }
}

impl PreferenceTopic {
    /// Quoted names from messages about food; capitalized phrases when
    /// nothing is quoted. Deduplicated, first seen first.
    pub fn preferences(messages: &[MessageRecord]) -> Vec<String> {
        let relevant: Vec<&MessageRecord> = messages
            .iter()
            .filter(|m| PREFERENCE_WORD.is_match(&m.body))
            .collect();

        let mut found = Vec::new();
        for message in &relevant {
            for span in quoted_spans(&message.body) {
                push_unique(&mut found, span);
            }
        }

        if found.is_empty() {
            for message in &relevant {
                for phrase in CAPITALIZED_PHRASE.find_iter(&message.body) {
                    if phrase.as_str().chars().count() > 3 {
                        push_unique(&mut found, phrase.as_str());
                    }
                }
            }
        }

        found
    }
}

impl TopicHandler for PreferenceTopic {
    fn name(&self) -> &'static str {
        "preference-list"
    }

    fn matches(&self, question: &Question) -> bool {
        PREFERENCE_WORD.is_match(&question.lowered)
    }

    fn extract(&self, author: &AuthorRecord, question: &Question) -> String {
        let label = if question.lowered.contains("restaurant") {
            "favorite restaurants"
        } else {
            "food preferences"
        };

        let found = Self::preferences(&author.messages);
        if found.is_empty() {
            return formatter::statement(&format!(
                "I couldn't find specific {} for {} in the messages",
                label, author.name
            ));
        }

        formatter::possessive(
            &author.name,
            &format!("{} include: {}", label, found.join(", ")),
        )
    }
}

// ===== Fallback =====

static REQUEST_WORD: Lazy<Regex> =
    Lazy::new(|| word_regex("plan|plans|planning|want|wants|need|needs"));

pub struct LatestMessageTopic {
    max_chars: usize,
}

impl LatestMessageTopic {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn truncate(&self, text: &str) -> String {
        if text.chars().count() > self.max_chars {
            text.chars().take(self.max_chars).collect::<String>() + "..."
        } else {
            text.to_string()
        }
    }
}

impl TopicHandler for LatestMessageTopic {
    fn name(&self) -> &'static str {
        "latest-message"
    }

    fn matches(&self, _question: &Question) -> bool {
        true
    }

    fn extract(&self, author: &AuthorRecord, question: &Question) -> String {
        let label = if REQUEST_WORD.is_match(&question.lowered) {
            "latest request"
        } else {
            "latest message"
        };

        match author.latest_message() {
            Some(message) => formatter::possessive(
                &author.name,
                &format!("{}: {}", label, self.truncate(message.body.trim())),
            ),
            None => formatter::statement(&format!(
                "I found {} in the system but they don't have any messages",
                author.name
            )),
        }
    }
}

// ===== Dispatch =====

/// Extracted answer and the topic that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicAnswer {
    pub topic: &'static str,
    pub text: String,
}

pub struct TopicExtractor {
    handlers: Vec<Box<dyn TopicHandler>>,
}

impl TopicExtractor {
    pub fn new(handlers: Vec<Box<dyn TopicHandler>>) -> Self {
        Self { handlers }
    }

    /// Trip, possession count, preference list, then latest message.
    pub fn with_defaults(max_snippet_chars: usize) -> Self {
        Self::new(vec![
            Box::new(TripTopic::default()),
            Box::new(CarCountTopic),
            Box::new(PreferenceTopic),
            Box::new(LatestMessageTopic::new(max_snippet_chars)),
        ])
    }

    pub fn topic_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn extract(&self, author: &AuthorRecord, question: &Question) -> String {
        self.extract_with_topic(author, question).text
    }

    pub fn extract_with_topic(&self, author: &AuthorRecord, question: &Question) -> TopicAnswer {
        match self.handlers.iter().find(|h| h.matches(question)) {
            Some(handler) => TopicAnswer {
                topic: handler.name(),
                text: handler.extract(author, question),
            },
            None => TopicAnswer {
                topic: "unsupported",
                text: formatter::statement(&format!(
                    "I can answer questions about {}'s travel plans, possessions, or preferences, but I need a more specific question",
                    author.name
                )),
            },
        }
    }
}
