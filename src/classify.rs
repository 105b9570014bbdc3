use std::fs;
use std::ops::Range;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quick_xml::escape::escape;

use crate::entity::EntityType;

/// The injected sequence-labeling capability. The pipeline only needs text in,
/// inline-tagged text out; whatever model sits behind this is out of scope.
pub trait InlineClassifier {
    /// Return `text` with recognized entity spans wrapped in type-named tags,
    /// e.g. `<PERSON>Nixon</PERSON>`. Untagged text passes through unchanged.
    fn classify_inline(&self, text: &str) -> Result<String>;

    /// `token/LABEL` transcript of `text`. Demo mode only.
    fn classify_plain(&self, text: &str) -> Result<String>;
}

/// Escape a segment so its own markup-significant characters survive the
/// re-parse of the tagged output, then hand it to the classifier.
pub fn tag(segment: &str, classifier: &dyn InlineClassifier) -> Result<String> {
    let escaped = escape(segment);
    classifier.classify_inline(&escaped)
}

/// Gazetteer-backed classifier: wraps every longest, word-bounded occurrence
/// of a known phrase. Stands in for a statistical model in tests and demos,
/// and doubles as a usable tagger when given a domain lexicon.
pub struct LexiconClassifier {
    entries: Vec<(String, EntityType)>,
}

impl LexiconClassifier {
    pub fn new(entries: Vec<(String, EntityType)>) -> Self {
        Self { entries }
    }

    /// Entities for the two demo sentences.
    pub fn demo() -> Self {
        Self::new(vec![
            ("Beibei Yang".into(), EntityType::Person),
            ("EMC".into(), EntityType::Other("ORGANIZATION".into())),
            ("Hopkinton MA USA".into(), EntityType::Location),
        ])
    }

    /// Load `TYPE<TAB>phrase` lines; `#` starts a comment.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon {}", path.display()))?;
        let mut entries = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((label, phrase)) = line.split_once('\t') else {
                bail!("{}:{}: expected TYPE<TAB>phrase", path.display(), lineno + 1);
            };
            entries.push((phrase.trim().to_string(), EntityType::from_label(label.trim())));
        }
        Ok(Self::new(entries))
    }
}

impl InlineClassifier for LexiconClassifier {
    fn classify_inline(&self, text: &str) -> Result<String> {
        Ok(wrap_phrases(text, &self.entries))
    }

    fn classify_plain(&self, text: &str) -> Result<String> {
        Ok(plain_transcript(text, &self.entries))
    }
}

/// Wrap every match of `entries` in `text` in a pair of type-named tags.
pub(crate) fn wrap_phrases(text: &str, entries: &[(String, EntityType)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (range, ty) in match_spans(text, entries) {
        out.push_str(&text[last..range.start]);
        let label = ty.as_label();
        out.push_str(&format!("<{label}>{}</{label}>", &text[range.clone()]));
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}

/// `token/LABEL` transcript; a token overlapping any span gets its label,
/// everything else is `O`.
pub(crate) fn plain_transcript(text: &str, entries: &[(String, EntityType)]) -> String {
    let spans = match_spans(text, entries);
    let mut parts = Vec::new();
    let mut cursor = 0;
    for token in text.split_whitespace() {
        let start = text[cursor..].find(token).map_or(cursor, |p| p + cursor);
        let end = start + token.len();
        cursor = end;
        let label = spans
            .iter()
            .find(|(range, _)| range.start < end && start < range.end)
            .map_or("O", |(_, ty)| ty.as_label());
        parts.push(format!("{token}/{label}"));
    }
    parts.join(" ")
}

/// Non-overlapping matches, left to right, longest phrase first, bounded by
/// non-alphanumeric characters on both sides.
fn match_spans<'a>(
    text: &str,
    entries: &'a [(String, EntityType)],
) -> Vec<(Range<usize>, &'a EntityType)> {
    let mut by_length: Vec<&(String, EntityType)> =
        entries.iter().filter(|(phrase, _)| !phrase.is_empty()).collect();
    by_length.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut spans = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        let hit = by_length.iter().copied().find(|(phrase, _)| {
            rest.starts_with(phrase.as_str())
                && boundary_before(text, i)
                && boundary_after(text, i + phrase.len())
        });
        match hit {
            Some((phrase, ty)) => {
                spans.push((i..i + phrase.len(), ty));
                i += phrase.len();
            }
            None => i += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
    spans
}

fn boundary_before(text: &str, i: usize) -> bool {
    i == 0 || !text[..i].chars().next_back().is_some_and(char::is_alphanumeric)
}

fn boundary_after(text: &str, i: usize) -> bool {
    i >= text.len() || !text[i..].chars().next().is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns its input untouched; makes the adapter's escaping visible.
    struct Echo;

    impl InlineClassifier for Echo {
        fn classify_inline(&self, text: &str) -> Result<String> {
            Ok(text.to_string())
        }

        fn classify_plain(&self, text: &str) -> Result<String> {
            Ok(text.to_string())
        }
    }

    #[test]
    fn adapter_escapes_before_delegating() {
        let tagged = tag("AT&T said <so>", &Echo).unwrap();
        assert_eq!(tagged, "AT&amp;T said &lt;so&gt;");
    }

    #[test]
    fn wraps_known_phrases() {
        let classifier = LexiconClassifier::new(vec![
            ("Nixon".into(), EntityType::Person),
            ("Hopkinton MA".into(), EntityType::Location),
        ]);
        let tagged = classifier
            .classify_inline("Nixon flew to Hopkinton MA today.")
            .unwrap();
        assert_eq!(
            tagged,
            "<PERSON>Nixon</PERSON> flew to <LOCATION>Hopkinton MA</LOCATION> today."
        );
    }

    #[test]
    fn longest_phrase_wins() {
        let classifier = LexiconClassifier::new(vec![
            ("Hopkinton".into(), EntityType::Location),
            ("Hopkinton MA USA".into(), EntityType::Location),
        ]);
        let tagged = classifier.classify_inline("in Hopkinton MA USA.").unwrap();
        assert_eq!(tagged, "in <LOCATION>Hopkinton MA USA</LOCATION>.");
    }

    #[test]
    fn word_boundaries_respected() {
        let classifier = LexiconClassifier::new(vec![("MA".into(), EntityType::Location)]);
        let tagged = classifier.classify_inline("MARK went to MA.").unwrap();
        assert_eq!(tagged, "MARK went to <LOCATION>MA</LOCATION>.");
    }

    #[test]
    fn plain_transcript_labels_tokens() {
        let classifier = LexiconClassifier::demo();
        let transcript = classifier
            .classify_plain("Good afternoon Beibei Yang, how are you today?")
            .unwrap();
        assert_eq!(
            transcript,
            "Good/O afternoon/O Beibei/PERSON Yang,/PERSON how/O are/O you/O today?/O"
        );
    }

    #[test]
    fn demo_lexicon_covers_second_sentence() {
        let tagged = tag("I'm from EMC. Its headquarter is in Hopkinton MA USA.",
            &LexiconClassifier::demo())
        .unwrap();
        assert_eq!(
            tagged,
            "I&apos;m from <ORGANIZATION>EMC</ORGANIZATION>. Its headquarter is in \
             <LOCATION>Hopkinton MA USA</LOCATION>."
        );
    }

    #[test]
    fn lexicon_file_parses() {
        let dir = std::env::temp_dir().join("wiretally-lexicon-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("names.tsv");
        std::fs::write(&path, "# people\nPERSON\tNixon\nLOCATION\tHopkinton MA\n\n").unwrap();
        let classifier = LexiconClassifier::from_path(&path).unwrap();
        let tagged = classifier.classify_inline("Nixon in Hopkinton MA").unwrap();
        assert_eq!(
            tagged,
            "<PERSON>Nixon</PERSON> in <LOCATION>Hopkinton MA</LOCATION>"
        );
    }

    #[test]
    fn lexicon_file_rejects_untabbed_lines() {
        let dir = std::env::temp_dir().join("wiretally-lexicon-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.tsv");
        std::fs::write(&path, "PERSON Nixon\n").unwrap();
        assert!(LexiconClassifier::from_path(&path).is_err());
    }
}
