//! Statistical keyword extraction
//!
//! Keywords name and annotate the output documents. Scoring follows the YAKE
//! family of unsupervised extractors: every term is rated from its frequency,
//! where it first shows up, how many sentences it spreads over and how varied
//! its neighbours are; candidate phrases combine the ratings of their terms.
//! Lower scores are better.
//!
//! No model and no corpus statistics are involved, so identical text always
//! yields identical keywords.

mod stopwords;

pub use stopwords::is_stopword;

use crate::config::KeywordConfig;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?;]+(?:\s+|$)|\n+").expect("sentence pattern compiles"));

/// Tokens shorter than this are dropped during cleaning
const MIN_TOKEN_CHARS: usize = 3;

/// Extracts the top-N keywords of a text
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    count: usize,
    max_ngram: usize,
    dedup_threshold: f64,
}

/// Per-term statistics gathered in one pass over the text
#[derive(Debug, Default)]
struct TermStats {
    tf: usize,
    sentences: Vec<usize>,
    left_total: usize,
    left_distinct: HashSet<String>,
    right_total: usize,
    right_distinct: HashSet<String>,
}

#[derive(Debug)]
struct Candidate {
    phrase: String,
    terms: Vec<String>,
    tf: usize,
    first_position: usize,
}

impl KeywordExtractor {
    pub fn new(count: usize, max_ngram: usize) -> Self {
        Self {
            count,
            max_ngram: max_ngram.max(1),
            dedup_threshold: 0.9,
        }
    }

    pub fn from_config(config: &KeywordConfig) -> Self {
        Self {
            count: config.count,
            max_ngram: config.max_ngram.max(1),
            dedup_threshold: config.dedup_threshold,
        }
    }

    /// Returns up to `count` distinct keywords, best first
    ///
    /// Ties are broken by first occurrence, earlier wins. When the scorer
    /// cannot fill the list it is padded with the most frequent remaining
    /// words; if the text is too poor even for that, fewer keywords come back.
    ///
    /// # Example
    ///
    /// ```
    /// use site2pdf::KeywordExtractor;
    ///
    /// let extractor = KeywordExtractor::new(3, 2);
    /// let text = "The community garden opens in spring. \
    ///             Volunteers tend the community garden every weekend.";
    /// let keywords = extractor.extract(text);
    ///
    /// assert!(!keywords.is_empty() && keywords.len() <= 3);
    /// assert_eq!(keywords, extractor.extract(text));
    /// ```
    pub fn extract(&self, text: &str) -> Vec<String> {
        if self.count == 0 {
            return Vec::new();
        }

        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }

        let (order, stats) = term_statistics(&sentences);
        let term_scores = score_terms(&order, &stats, sentences.len());
        let candidates = collect_candidates(&sentences, self.max_ngram);

        let mut ranked: Vec<(f64, &Candidate)> = candidates
            .iter()
            .map(|candidate| (phrase_score(candidate, &term_scores), candidate))
            .collect();
        ranked.sort_by(|(a_score, a), (b_score, b)| {
            a_score
                .total_cmp(b_score)
                .then_with(|| a.first_position.cmp(&b.first_position))
                .then_with(|| a.terms.len().cmp(&b.terms.len()))
        });

        let mut selected: Vec<String> = Vec::with_capacity(self.count);
        for (_, candidate) in ranked {
            if selected.len() == self.count {
                break;
            }
            let duplicate = selected
                .iter()
                .any(|kept| similarity(kept, &candidate.phrase) >= self.dedup_threshold);
            if !duplicate {
                selected.push(candidate.phrase.clone());
            }
        }

        if selected.len() < self.count {
            pad_with_frequent_words(&mut selected, &sentences, self.count);
        }

        selected
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::from_config(&KeywordConfig::default())
    }
}

/// Splits text into sentences of cleaned tokens
///
/// Cleaning lowercases, turns punctuation into separators and drops tokens
/// shorter than three characters. Sentences left without tokens are skipped.
fn split_sentences(text: &str) -> Vec<Vec<String>> {
    SENTENCE_BREAK
        .split(text)
        .map(|sentence| {
            sentence
                .to_lowercase()
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { ' ' })
                .collect::<String>()
                .split_whitespace()
                .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|tokens| !tokens.is_empty())
        .collect()
}

/// Stopwords and numbers never become keywords
fn is_candidate_term(token: &str) -> bool {
    !is_stopword(token) && token.chars().any(char::is_alphabetic)
}

/// Gathers statistics for candidate terms, in order of first occurrence
fn term_statistics(sentences: &[Vec<String>]) -> (Vec<String>, HashMap<String, TermStats>) {
    let mut order = Vec::new();
    let mut stats: HashMap<String, TermStats> = HashMap::new();

    for (index, tokens) in sentences.iter().enumerate() {
        for (position, token) in tokens.iter().enumerate() {
            if !is_candidate_term(token) {
                continue;
            }

            let entry = stats.entry(token.clone()).or_insert_with(|| {
                order.push(token.clone());
                TermStats::default()
            });
            entry.tf += 1;
            entry.sentences.push(index);

            if let Some(left) = position.checked_sub(1).and_then(|p| tokens.get(p)) {
                entry.left_total += 1;
                entry.left_distinct.insert(left.clone());
            }
            if let Some(right) = tokens.get(position + 1) {
                entry.right_total += 1;
                entry.right_distinct.insert(right.clone());
            }
        }
    }

    (order, stats)
}

/// Rates every term; lower means more relevant
fn score_terms(
    order: &[String],
    stats: &HashMap<String, TermStats>,
    sentence_count: usize,
) -> HashMap<String, f64> {
    let frequencies: Vec<f64> = order
        .iter()
        .filter_map(|term| stats.get(term))
        .map(|s| s.tf as f64)
        .collect();
    if frequencies.is_empty() {
        return HashMap::new();
    }

    let n = frequencies.len() as f64;
    let mean = frequencies.iter().sum::<f64>() / n;
    let variance = frequencies.iter().map(|tf| (tf - mean).powi(2)).sum::<f64>() / n;
    let spread = mean + variance.sqrt();
    let max_tf = frequencies.iter().copied().fold(1.0, f64::max);

    order
        .iter()
        .filter_map(|term| stats.get(term).map(|s| (term, s)))
        .map(|(term, s)| {
            let tf = s.tf as f64;

            let position = (3.0 + median(&s.sentences)).ln().ln();
            let frequency = tf / spread;

            let distinct_sentences = s.sentences.iter().collect::<HashSet<_>>().len() as f64;
            let dispersion = distinct_sentences / sentence_count as f64;

            let left = ratio(s.left_distinct.len(), s.left_total);
            let right = ratio(s.right_distinct.len(), s.right_total);
            let relatedness = 1.0 + (left + right) * tf / max_tf;

            let score = relatedness * position
                / (frequency / relatedness + dispersion / relatedness);
            (term.clone(), score)
        })
        .collect()
}

/// Candidate phrases: runs of up to `max_ngram` adjacent candidate terms
fn collect_candidates(sentences: &[Vec<String>], max_ngram: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut offset = 0;

    for tokens in sentences {
        for start in 0..tokens.len() {
            for len in 1..=max_ngram {
                let Some(window) = tokens.get(start..start + len) else {
                    break;
                };
                if !window.iter().all(|t| is_candidate_term(t)) {
                    break;
                }

                let phrase = window.join(" ");
                match index.get(&phrase) {
                    Some(&i) => candidates[i].tf += 1,
                    None => {
                        index.insert(phrase.clone(), candidates.len());
                        candidates.push(Candidate {
                            phrase,
                            terms: window.to_vec(),
                            tf: 1,
                            first_position: offset + start,
                        });
                    }
                }
            }
        }
        offset += tokens.len();
    }

    candidates
}

fn phrase_score(candidate: &Candidate, term_scores: &HashMap<String, f64>) -> f64 {
    let scores: Vec<f64> = candidate
        .terms
        .iter()
        .map(|term| term_scores.get(term).copied().unwrap_or(f64::MAX))
        .collect();
    let product: f64 = scores.iter().product();
    let sum: f64 = scores.iter().sum();
    product / (candidate.tf as f64 * (1.0 + sum))
}

/// Adds the most frequent words not yet covered by a selected keyword
fn pad_with_frequent_words(selected: &mut Vec<String>, sentences: &[Vec<String>], count: usize) {
    let covered: HashSet<String> = selected
        .iter()
        .flat_map(|phrase| phrase.split(' ').map(str::to_string))
        .collect();

    let mut frequency: Vec<(String, usize, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (position, token) in sentences.iter().flatten().enumerate() {
        if !is_candidate_term(token) || covered.contains(token) {
            continue;
        }
        match index.get(token.as_str()) {
            Some(&i) => frequency[i].1 += 1,
            None => {
                index.insert(token, frequency.len());
                frequency.push((token.clone(), 1, position));
            }
        }
    }

    frequency.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
    let missing = count.saturating_sub(selected.len());
    selected.extend(frequency.into_iter().map(|(word, _, _)| word).take(missing));
}

fn median(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

fn ratio(distinct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        distinct as f64 / total as f64
    }
}

/// Character-trigram Jaccard similarity of two phrases
fn similarity(a: &str, b: &str) -> f64 {
    let a = trigrams(a);
    let b = trigrams(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

fn trigrams(phrase: &str) -> HashSet<String> {
    let padded: Vec<char> = format!(" {} ", phrase).chars().collect();
    padded
        .windows(3)
        .map(|window| window.iter().collect())
        .collect()
}
