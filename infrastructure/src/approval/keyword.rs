//! Keyword-based approval parser.
//!
//! Matches whole words (case-insensitive) against two vocabularies. A reply
//! that hits exactly one side is classified as that side; a reply that hits
//! neither or both is passed through as `Modify(reply)`.

use agentry_application::ApprovalParser;
use agentry_domain::ApprovalDecision;
use async_trait::async_trait;
use regex::Regex;

const APPROVE_WORDS: &[&str] = &[
    "yes", "y", "ok", "okay", "approve", "approved", "confirm", "go ahead", "do it", "sure",
    "proceed",
];

const REJECT_WORDS: &[&str] = &["no", "n", "cancel", "reject", "stop", "don't", "abort", "nope"];

pub struct KeywordApprovalParser {
    approve: Regex,
    reject: Regex,
}

impl KeywordApprovalParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            approve: word_set(APPROVE_WORDS)?,
            reject: word_set(REJECT_WORDS)?,
        })
    }

    /// Synchronous classification; the trait method delegates here.
    pub fn classify_text(&self, reply: &str) -> ApprovalDecision {
        let approves = self.approve.is_match(reply);
        let rejects = self.reject.is_match(reply);
        match (approves, rejects) {
            (true, false) => ApprovalDecision::Approved,
            (false, true) => ApprovalDecision::Rejected,
            _ => ApprovalDecision::Modify(reply.trim().to_string()),
        }
    }
}

/// `(?i)(?:^|[^\w'])(?:yes|go\s+ahead|...)(?:$|[^\w'])`
///
/// Apostrophes count as word characters so `don't` is one word and `n` does
/// not match inside it.
fn word_set(words: &[&str]) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| {
            w.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    let pattern = format!(r"(?i)(?:^|[^\w'])(?:{})(?:$|[^\w'])", alternatives.join("|"));
    Regex::new(&pattern)
}

#[async_trait]
impl ApprovalParser for KeywordApprovalParser {
    async fn classify(&self, reply: &str) -> ApprovalDecision {
        self.classify_text(reply)
    }
}
