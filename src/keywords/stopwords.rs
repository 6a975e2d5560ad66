use std::collections::HashSet;
use std::sync::LazyLock;

/// English and German function words; sites crawled are mostly one or the other
const STOPWORDS: &[&str] = &[
    // English
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "his", "how", "its", "may", "new", "now", "own", "she",
    "who", "why", "did", "get", "got", "him", "let", "see", "too", "use", "way", "yes", "yet",
    "about", "above", "after", "again", "against", "also", "been", "before", "being", "below",
    "between", "both", "could", "does", "doing", "down", "during", "each", "even", "every",
    "from", "further", "here", "hers", "herself", "himself", "into", "itself", "just", "like",
    "made", "make", "many", "more", "most", "much", "must", "myself", "need", "only", "other",
    "ours", "ourselves", "over", "same", "shall", "should", "some", "such", "than", "that",
    "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "under", "until", "upon", "very", "want", "well", "were", "what", "when",
    "where", "which", "while", "whom", "whose", "will", "with", "within", "without", "would",
    "your", "yours", "yourself", "yourselves", "because", "cannot", "into", "off", "once",
    "per", "via", "still", "though", "whether", "already", "always", "never", "often", "please",
    "read", "click", "more", "home", "page",
    // German
    "der", "die", "das", "den", "dem", "des", "ein", "eine", "einer", "eines", "einem", "einen",
    "und", "oder", "aber", "mit", "für", "auf", "von", "nach", "bei", "aus", "vor", "über",
    "unter", "durch", "gegen", "ohne", "um", "ist", "sind", "war", "waren", "wird", "werden",
    "wurde", "wurden", "kann", "können", "könnte", "sollte", "soll", "muss", "müssen", "hat",
    "haben", "hatte", "sein", "seine", "ihre", "ihr", "ihren", "ihrem", "sie", "wir", "ich",
    "du", "euch", "uns", "mich", "dich", "sich", "nicht", "auch", "noch", "nur", "schon",
    "sehr", "mehr", "wie", "was", "wer", "wo", "wenn", "dass", "als", "also", "doch", "dann",
    "denn", "diese", "dieser", "dieses", "diesem", "diesen", "jede", "jeder", "jedes", "alle",
    "allem", "allen", "aller", "alles", "man", "zum", "zur", "im", "ins", "vom", "beim", "bis",
    "hier", "dort", "heute", "immer", "kein", "keine", "keinen", "mal", "viel", "viele",
    "weitere", "weiter", "sowie", "bzw", "etc", "unsere", "unser", "unseren", "unserem",
    "ihnen", "ihrer", "seinen", "seinem", "seiner", "zwischen", "damit", "dazu", "darauf",
    "hin", "her", "mehr", "lesen", "startseite",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

/// Returns true for a lowercase function word
pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}
