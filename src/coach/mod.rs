//! Server-side coaching logic: command intents, workflow helpers, and
//! knowledge-base retrieval for free-form questions.

pub mod intent;
pub mod kb;
pub mod retrieval;

use anyhow::Result;
use tracing::debug;

use crate::state::SessionState;
use intent::{Intent, IntentMatcher};
use kb::ARTICLES;
use retrieval::TfIdfIndex;

/// Retrieval scores below this get the "not sure" reply.
const MATCH_THRESHOLD: f64 = 0.17;
const DEFAULT_WORD_COUNT: u32 = 1500;
const ABSOLUTE_WORDS: &[&str] = &["always", "never", "proves", "everyone", "no one", "obviously"];

pub struct Coach {
    intents: IntentMatcher,
    index: TfIdfIndex,
}

impl Coach {
    pub fn new() -> Result<Self> {
        let docs: Vec<&str> = ARTICLES.iter().map(|a| a.text).collect();
        Ok(Self {
            intents: IntentMatcher::new()?,
            index: TfIdfIndex::new(&docs)?,
        })
    }

    /// Handle one turn and return the reply plus the updated session state.
    pub fn handle_message(&self, message: &str, mut state: SessionState) -> (String, SessionState) {
        let msg = message.trim();
        if msg.is_empty() {
            return ("Type a message (try: help).".to_string(), state);
        }

        let Some(intent) = self.intents.detect(msg) else {
            return (self.answer_from_kb(msg, state.explain), state);
        };
        debug!(?intent, "intent detected");

        let reply = match intent {
            Intent::Help => HELP_TEXT.to_string(),
            Intent::SetTopic(topic) => {
                let reply = format!(
                    "Topic set to: {}\nWhat do you want next — research question, keywords, search strings, or an outline?",
                    topic
                );
                state.topic = Some(topic);
                reply
            }
            Intent::SetWordCount(wc) => {
                state.word_count = Some(wc);
                format!("Word count set to {}. Ask for an outline when you're ready.", wc)
            }
            Intent::SaveNote(note) => {
                state.notes.push(note);
                "Saved that note for this session.".to_string()
            }
            Intent::ShowSession => show_session(&state),
            Intent::ExplainToggle(mode) => {
                state.explain = mode == "on";
                format!("Explain mode is now {}.", mode)
            }
            Intent::ResearchQuestion | Intent::Keywords | Intent::SearchStrings | Intent::Outline => {
                match state.topic.as_deref().filter(|t| !t.is_empty()) {
                    Some(topic) => workflow(&intent, topic, state.word_count),
                    None => "Set your topic first: set topic: <your topic>".to_string(),
                }
            }
            Intent::ClaimCheck(claim) => claim_check(&claim),
        };

        (reply, state)
    }

    fn answer_from_kb(&self, msg: &str, explain: bool) -> String {
        let (best, score) = self
            .index
            .retrieve(msg, 1)
            .first()
            .copied()
            .unwrap_or((0, 0.0));

        if score < MATCH_THRESHOLD {
            return "I’m not fully sure what you mean.\n\
                    Try: help\n\
                    Or: set topic: <topic> then ask for research question / keywords / outline."
                .to_string();
        }

        let article = &ARTICLES[best];
        debug!(article = article.id, score, "knowledge base match");
        let mut reply = format!("{}\n{}", article.title, article.text);

        if explain {
            let keywords: Vec<String> = self
                .index
                .explain_keywords(msg, 6)
                .iter()
                .map(|k| format!("'{}'", k))
                .collect();
            reply.push_str(&format!(
                "\n\n(explain) similarity={:.2}, keywords=[{}]",
                score,
                keywords.join(", ")
            ));
        }
        reply
    }
}

const HELP_TEXT: &str = "You can try:\n\
• set topic: <topic>\n\
• my word count is <number>\n\
• save note: <text>\n\
• show session\n\
• explain mode: on/off\n\
• ask for: research question / keywords / search strings / outline\n\
• check my claim: <claim>";

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|x| format!("• {}", x))
        .collect::<Vec<_>>()
        .join("\n")
}

fn show_session(state: &SessionState) -> String {
    let topic = state.topic.as_deref().filter(|t| !t.is_empty()).unwrap_or("not set");
    let word_count = match state.word_count {
        Some(n) if n > 0 => n.to_string(),
        _ => "not set".to_string(),
    };

    let mut reply = format!("Session:\n• Topic: {}\n• Word count: {}\n• Notes:\n", topic, word_count);
    if state.notes.is_empty() {
        reply.push_str("  - none\n");
    } else {
        let start = state.notes.len().saturating_sub(6);
        for note in &state.notes[start..] {
            reply.push_str(&format!("  - {}\n", note));
        }
    }
    reply.trim().to_string()
}

fn workflow(intent: &Intent, topic: &str, word_count: Option<u32>) -> String {
    match intent {
        Intent::ResearchQuestion => {
            format!("Research question starters:\n{}", bullets(&question_starters(topic)))
        }
        Intent::Keywords => {
            let (core, related) = keyword_pack(topic);
            let or_none = |xs: &[String]| if xs.is_empty() { "(none)".to_string() } else { xs.join(", ") };
            format!(
                "Keyword pack:\n• Core: {}\n• Related: {}\nTip: test 2–3 searches, then refine your terms.",
                or_none(&core),
                or_none(&related)
            )
        }
        Intent::SearchStrings => {
            let (core, related) = keyword_pack(topic);
            format!(
                "Search strings (copy/paste):\n{}",
                bullets(&search_strings(topic, &core, &related))
            )
        }
        _ => format!("Draft outline:\n{}", outline(topic, word_count).join("\n")),
    }
}

pub fn question_starters(topic: &str) -> Vec<String> {
    let t = topic.trim();
    vec![
        format!("To what extent does {} influence ______ in ______ context?", t),
        format!("How do different groups experience {}?", t),
        format!("What are the key benefits and risks of {}, and who is most affected?", t),
        format!("What factors explain differences in outcomes related to {}?", t),
    ]
}

fn expansions(word: &str) -> &'static [&'static str] {
    match word {
        "ai" => &["artificial intelligence", "machine learning", "algorithm", "automation"],
        "education" => &["learning", "teaching", "assessment", "classroom", "pedagogy"],
        "social" => &["society", "community", "culture"],
        "media" => &["platform", "online", "digital"],
        "bias" => &["fairness", "equity", "discrimination"],
        "privacy" => &["data protection", "GDPR", "consent"],
        _ => &[],
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Core terms from the topic itself and related terms from a fixed expansion table.
pub fn keyword_pack(topic: &str) -> (Vec<String>, Vec<String>) {
    let base: Vec<String> = topic
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .map(|w| w.trim_matches(|c| " ,.!?;:".contains(c)).to_lowercase())
        .collect();

    let related: Vec<String> = base
        .iter()
        .flat_map(|w| expansions(w).iter().map(|s| s.to_string()))
        .collect();

    let mut core = dedup(base);
    core.truncate(10);
    let mut related = dedup(related);
    related.truncate(12);
    (core, related)
}

fn quoted_or(terms: &[String]) -> String {
    terms
        .iter()
        .take(4)
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(" OR ")
}

pub fn search_strings(topic: &str, core: &[String], related: &[String]) -> Vec<String> {
    let topic_phrase = format!("\"{}\"", topic);
    let core_q = if core.is_empty() { topic_phrase.clone() } else { quoted_or(core) };
    let first = core.first().map(String::as_str).unwrap_or(topic);

    let mut strings = vec![
        format!("{} AND ({})", topic_phrase, core_q),
        format!("({} OR {}) AND (study OR evidence OR impact)", topic_phrase, first),
    ];
    if !related.is_empty() {
        strings.push(format!(
            "{} AND ({}) AND (benefit OR risk OR challenge)",
            topic_phrase,
            quoted_or(related)
        ));
    }
    strings.push(format!(
        "{} AND (\"systematic review\" OR \"meta analysis\" OR \"literature review\")",
        topic_phrase
    ));
    strings
}

/// Six essay sections sized as fixed shares of the word count.
pub fn outline(topic: &str, word_count: Option<u32>) -> Vec<String> {
    let wc = match word_count {
        Some(n) if n > 0 => n as f64,
        _ => DEFAULT_WORD_COUNT as f64,
    };
    let share = |p: f64| (wc * p) as u64;
    vec![
        format!("1) Introduction (~{} words): context, research question, roadmap", share(0.12)),
        format!("2) Key concepts (~{} words): define terms + scope for {}", share(0.18), topic),
        format!("3) Evidence/Literature (~{} words): key studies + what they show", share(0.30)),
        format!("4) Discussion (~{} words): your argument + analysis + examples", share(0.25)),
        format!("5) Limitations/Counterarguments (~{} words): what evidence can't claim", share(0.10)),
        format!("6) Conclusion (~{} words): answer question + implications", share(0.05)),
    ]
}

fn claim_check(claim: &str) -> String {
    let c = claim.trim();
    let low = c.to_lowercase();
    let flags: Vec<&str> = ABSOLUTE_WORDS.iter().copied().filter(|w| low.contains(w)).collect();

    let rewrite = c
        .replace("always", "often")
        .replace("never", "rarely")
        .replace("proves", "suggests");

    let evidence = [
        "Define key terms (what exactly is being measured?).".to_string(),
        "Add context (who/where/when does this apply?).".to_string(),
        "Decide evidence type: quantitative, qualitative, mixed-methods, policy, case study.".to_string(),
    ];

    let mut reply = String::new();
    if !flags.is_empty() {
        reply.push_str(&format!("Flags: {}\n", flags.join(", ")));
    }
    reply.push_str(&format!("Safer rewrite: {}\n", rewrite));
    reply.push_str(&format!("Evidence checklist:\n{}", bullets(&evidence)));
    reply
}
