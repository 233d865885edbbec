/// A short study-skills article the coach can answer with.
#[derive(Debug, Clone, Copy)]
pub struct Article {
    pub id: &'static str,
    pub title: &'static str,
    pub text: &'static str,
}

pub const ARTICLES: &[Article] = &[
    Article {
        id: "rq_quality",
        title: "What makes a strong research question?",
        text: "A strong research question is specific, arguable, and researchable. \
               It should point to what you will compare/measure/explore. \
               If it’s too broad, narrow it by time period, location, population, or a single variable.",
    },
    Article {
        id: "rq_templates",
        title: "Research question templates",
        text: "Useful frames: \
               1) To what extent does X affect Y in Z context? \
               2) How do different groups experience X? \
               3) What factors explain variation in Y? \
               4) What are the benefits/risks of X, and for whom?",
    },
    Article {
        id: "keywords",
        title: "How to generate keywords",
        text: "Start with 3–6 core terms, then expand: synonyms, related concepts, narrower terms, and phrase variants. \
               Include UK/US spelling variants where relevant. Test searches early and adjust.",
    },
    Article {
        id: "boolean",
        title: "Boolean searching (AND / OR / quotes / wildcard)",
        text: "AND narrows (must include both). OR expands (either). \
               Quotes lock phrases (\"social media\"). \
               Wildcard * can capture endings (educat* → education, educational).",
    },
    Article {
        id: "sources",
        title: "What counts as evidence?",
        text: "Match evidence type to your question. Quantitative studies help with measurable outcomes. \
               Interviews/qualitative work helps with experience and meaning. \
               Policy documents help with rules/institutions. Use multiple sources where possible.",
    },
    Article {
        id: "claims",
        title: "Avoiding weak claims",
        text: "Watch out for absolute words like 'always', 'never', 'proves', or 'everyone'. \
               Academic claims usually need conditions: 'in some contexts', 'the evidence suggests', \
               'for this population'. Then define what you mean and what evidence would support it.",
    },
    Article {
        id: "lit_review",
        title: "Literature review: what you’re actually doing",
        text: "A literature review isn’t a list of summaries. It groups sources by themes, debates, methods, \
               or findings. You’re showing what’s known, what’s uncertain, and where your question fits.",
    },
    Article {
        id: "structure",
        title: "A reliable essay structure",
        text: "A common structure: Introduction (context + question + roadmap), \
               Key concepts/definitions, Literature/evidence, Discussion/argument, \
               Counterarguments/limitations, Conclusion (answer + implications).",
    },
    Article {
        id: "ethics",
        title: "Ethics and bias (quick checklist)",
        text: "Ask: Who benefits? Who might be harmed? What data is used? \
               Could there be bias in sampling, measurement, or interpretation? \
               Are there privacy/consent issues? Are certain groups excluded?",
    },
    Article {
        id: "planning",
        title: "Planning: stop it becoming last-minute panic",
        text: "Break it into steps: choose question → search → skim and shortlist → read properly → outline → draft → edit. \
               If you have a deadline, work backwards and assign mini-deadlines.",
    },
];
