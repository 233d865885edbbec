use anyhow::Result;
use regex::{Captures, Regex};

/// A command recognised in a user message, with its extracted entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Help,
    SetTopic(String),
    SetWordCount(u32),
    SaveNote(String),
    ShowSession,
    /// Lowercased "on" or "off"
    ExplainToggle(String),
    ResearchQuestion,
    Keywords,
    SearchStrings,
    Outline,
    ClaimCheck(String),
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Help,
    SetTopic,
    SetWordCount,
    SaveNote,
    ShowSession,
    ExplainToggle,
    ResearchQuestion,
    Keywords,
    SearchStrings,
    Outline,
    ClaimCheck,
}

// Evaluated in order; the first pattern that matches wins. Anchored patterns
// must cover the whole message, the rest may match anywhere.
const PATTERNS: &[(Kind, &str)] = &[
    (Kind::Help, r"(?i)^\s*(help|\?|commands)\s*$"),
    (Kind::SetTopic, r"(?i)^\s*set\s+topic\s*:\s*(?P<topic>.+?)\s*$"),
    (
        Kind::SetWordCount,
        r"(?i)^\s*(set\s+word\s*count|my\s+word\s*count\s+is)\s*[: ]\s*(?P<wc>\d{3,5})\s*$",
    ),
    (Kind::SaveNote, r"(?i)^\s*save\s+note\s*:\s*(?P<note>.+?)\s*$"),
    (Kind::ShowSession, r"(?i)^\s*(show|view)\s+(my\s+)?session\s*$"),
    (Kind::ExplainToggle, r"(?i)^\s*explain\s+mode\s*:\s*(?P<state>on|off)\s*$"),
    (Kind::ResearchQuestion, r"(?i)\b(research\s+question|rq)\b"),
    (Kind::Keywords, r"(?i)\b(keywords|search\s+terms)\b"),
    (Kind::SearchStrings, r"(?i)\b(search\s+strings|boolean|google\s+scholar)\b"),
    (Kind::Outline, r"(?i)\b(outline|structure|essay\s+plan)\b"),
    (Kind::ClaimCheck, r"(?i)^\s*check\s+my\s+claim\s*:\s*(?P<claim>.+?)\s*$"),
];

pub struct IntentMatcher {
    patterns: Vec<(Kind, Regex)>,
}

impl IntentMatcher {
    pub fn new() -> Result<Self> {
        let patterns = PATTERNS
            .iter()
            .map(|(kind, pattern)| Ok((*kind, Regex::new(pattern)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn detect(&self, text: &str) -> Option<Intent> {
        self.patterns
            .iter()
            .find_map(|(kind, regex)| regex.captures(text).and_then(|caps| build(*kind, &caps)))
    }
}

fn entity(caps: &Captures, name: &str) -> String {
    caps.name(name)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn build(kind: Kind, caps: &Captures) -> Option<Intent> {
    let intent = match kind {
        Kind::Help => Intent::Help,
        Kind::SetTopic => Intent::SetTopic(entity(caps, "topic")),
        Kind::SetWordCount => Intent::SetWordCount(entity(caps, "wc").parse().ok()?),
        Kind::SaveNote => Intent::SaveNote(entity(caps, "note")),
        Kind::ShowSession => Intent::ShowSession,
        Kind::ExplainToggle => Intent::ExplainToggle(entity(caps, "state").to_lowercase()),
        Kind::ResearchQuestion => Intent::ResearchQuestion,
        Kind::Keywords => Intent::Keywords,
        Kind::SearchStrings => Intent::SearchStrings,
        Kind::Outline => Intent::Outline,
        Kind::ClaimCheck => Intent::ClaimCheck(entity(caps, "claim")),
    };
    Some(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Option<Intent> {
        IntentMatcher::new().unwrap().detect(text)
    }

    #[test]
    fn test_commands() {
        assert_eq!(detect("HELP"), Some(Intent::Help));
        assert_eq!(detect("?"), Some(Intent::Help));
        assert_eq!(detect("show my session"), Some(Intent::ShowSession));
        assert_eq!(detect("view session"), Some(Intent::ShowSession));
        assert_eq!(
            detect("Set Topic:  social media and teens "),
            Some(Intent::SetTopic("social media and teens".to_string()))
        );
        assert_eq!(
            detect("save note: read Smith 2019"),
            Some(Intent::SaveNote("read Smith 2019".to_string()))
        );
    }

    #[test]
    fn test_word_count_needs_three_to_five_digits() {
        assert_eq!(detect("my word count is 2000"), Some(Intent::SetWordCount(2000)));
        assert_eq!(detect("set word count: 750"), Some(Intent::SetWordCount(750)));
        assert_eq!(detect("set wordcount 12000"), Some(Intent::SetWordCount(12000)));
        assert_eq!(detect("my word count is 50"), None);
    }

    #[test]
    fn test_explain_toggle_lowercases_state() {
        assert_eq!(
            detect("Explain Mode: ON"),
            Some(Intent::ExplainToggle("on".to_string()))
        );
        assert_eq!(
            detect("explain mode: off"),
            Some(Intent::ExplainToggle("off".to_string()))
        );
        assert_eq!(detect("explain mode: maybe"), None);
    }

    #[test]
    fn test_workflow_intents_match_anywhere() {
        assert_eq!(detect("can you give me a research question?"), Some(Intent::ResearchQuestion));
        assert_eq!(detect("some search terms please"), Some(Intent::Keywords));
        assert_eq!(detect("what about google scholar"), Some(Intent::SearchStrings));
        assert_eq!(detect("I need an essay plan"), Some(Intent::Outline));
    }

    #[test]
    fn test_earlier_patterns_take_priority() {
        // set_topic is tried before the workflow intents
        assert_eq!(
            detect("set topic: outline of research question design"),
            Some(Intent::SetTopic("outline of research question design".to_string()))
        );
        // a claim mentioning "structure" is caught by the outline intent first
        assert_eq!(detect("check my claim: this structure always works"), Some(Intent::Outline));
        assert_eq!(
            detect("check my claim: homework always helps"),
            Some(Intent::ClaimCheck("homework always helps".to_string()))
        );
    }

    #[test]
    fn test_plain_question_has_no_intent() {
        assert_eq!(detect("what is a literature review"), None);
    }
}
