use std::collections::HashMap;

use anyhow::Result;
use regex::Regex;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

type SparseVec = Vec<(usize, f64)>;

/// TF-IDF index over a fixed set of documents, queried by cosine similarity.
pub struct TfIdfIndex {
    non_word: Regex,
    vocab: HashMap<String, usize>,
    idf: Vec<f64>,
    docs: Vec<SparseVec>,
}

impl TfIdfIndex {
    pub fn new(documents: &[&str]) -> Result<Self> {
        let mut index = Self {
            non_word: Regex::new(r"[^a-z0-9\s]")?,
            vocab: HashMap::new(),
            idf: Vec::new(),
            docs: Vec::new(),
        };

        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|d| tokenize(&index.normalise(d)))
            .collect();

        // Vocabulary in sorted order, document frequency per term
        let mut terms: Vec<&String> = tokenized.iter().flatten().collect();
        terms.sort();
        terms.dedup();
        for (i, term) in terms.into_iter().enumerate() {
            index.vocab.insert(term.clone(), i);
        }

        let mut df = vec![0usize; index.vocab.len()];
        for tokens in &tokenized {
            let mut seen: Vec<usize> = tokens.iter().filter_map(|t| index.vocab.get(t).copied()).collect();
            seen.sort_unstable();
            seen.dedup();
            for i in seen {
                df[i] += 1;
            }
        }

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let n = documents.len() as f64;
        index.idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        index.docs = tokenized.iter().map(|tokens| index.vectorize(tokens)).collect();
        Ok(index)
    }

    /// Lowercase, replace anything but `[a-z0-9]` and whitespace, collapse spaces.
    pub fn normalise(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        let cleaned = self.non_word.replace_all(&lower, " ");
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Documents ranked by similarity to `query` (highest first, ties by index).
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<(usize, f64)> {
        let query_vec = self.vectorize(&tokenize(&self.normalise(query)));

        let mut scores: Vec<(usize, f64)> = self
            .docs
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, dot(doc, &query_vec)))
            .collect();

        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores.truncate(top_k);
        scores
    }

    /// The first `n` words of the normalised query.
    pub fn explain_keywords(&self, query: &str, n: usize) -> Vec<String> {
        self.normalise(query)
            .split(' ')
            .filter(|w| !w.is_empty())
            .take(n)
            .map(str::to_string)
            .collect()
    }

    fn vectorize(&self, tokens: &[String]) -> SparseVec {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&i) = self.vocab.get(token) {
                *counts.entry(i).or_insert(0.0) += 1.0;
            }
        }

        let mut vec: SparseVec = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i]))
            .collect();
        vec.sort_unstable_by_key(|(i, _)| *i);

        let norm = vec.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in vec.iter_mut() {
                *w /= norm;
            }
        }
        vec
    }
}

/// Tokens of two or more characters that aren't stop words.
fn tokenize(normalised: &str) -> Vec<String> {
    normalised
        .split_whitespace()
        .filter(|t| t.chars().count() >= 2 && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Dot product of two L2-normalised sparse vectors sorted by index.
fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> TfIdfIndex {
        TfIdfIndex::new(&[
            "Cats purr and chase mice.",
            "Dogs bark at the mail carrier.",
            "Boolean operators AND OR narrow searches.",
        ])
        .unwrap()
    }

    #[test]
    fn test_normalise() {
        let idx = index();
        assert_eq!(idx.normalise("  Hello, World!! It's  2024 "), "hello world it s 2024");
    }

    #[test]
    fn test_retrieve_best_match() {
        let idx = index();
        let results = idx.retrieve("why do dogs bark?", 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, 1);
        assert!(results[0].1 > 0.3);
    }

    #[test]
    fn test_exact_document_scores_one() {
        let idx = index();
        let results = idx.retrieve("Cats purr and chase mice.", 3);
        assert_eq!(results[0].0, 0);
        assert!((results[0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_words_score_zero_first_doc_wins_tie() {
        let idx = index();
        let results = idx.retrieve("zebra quantum", 3);
        assert_eq!(results[0], (0, 0.0));
        assert!(results.iter().all(|(_, s)| *s == 0.0));
    }

    #[test]
    fn test_stop_words_ignored() {
        let idx = index();
        let results = idx.retrieve("the and of", 1);
        assert_eq!(results[0].1, 0.0);
    }

    #[test]
    fn test_explain_keywords_takes_first_words() {
        let idx = index();
        assert_eq!(
            idx.explain_keywords("What is a literature-review, really? tell me more", 6),
            vec!["what", "is", "a", "literature", "review", "really"]
        );
    }
}
