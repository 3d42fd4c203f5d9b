//! Intent analyzer: free-form text to [`MusicIntent`].
//!
//! Tag extraction goes through the [`TagMatcher`] trait so a language
//! understanding service can stand in for the rule-based [`LexiconMatcher`].
//! Explicit values (tempo, duration, key) are pulled out with regexes.

mod extract;
mod lexicon;

use std::sync::Arc;

use tracing::debug;

use cantus_spec::{
    AnalyzerBudget, Complexity, InstrumentId, Mood, MusicIntent, PipelineError, TempoHint,
};

pub use extract::{extract_duration, extract_key, extract_named_styles, extract_tempo};
pub use lexicon::LexiconMatcher;

/// A single extracted tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Style(String),
    Culture(String),
    Mood(Mood),
    Tempo(TempoHint),
    Instrument(InstrumentId),
    Complexity(Complexity),
}

/// A tag and the byte offset in the analysed text where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    pub offset: usize,
    pub tag: Tag,
}

/// Capability that finds tags in lowercased text.
///
/// Implementations must tolerate unseen vocabulary by returning no tags.
pub trait TagMatcher: Send + Sync {
    /// Matcher name for logs.
    fn name(&self) -> &str;

    /// Tags found in `text`, with offsets into `text`.
    fn match_tags(&self, text: &str) -> Vec<TagMatch>;
}

/// Stage 1 of the pipeline.
#[derive(Clone)]
pub struct IntentAnalyzer {
    matcher: Arc<dyn TagMatcher>,
    budget: AnalyzerBudget,
}

impl std::fmt::Debug for IntentAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentAnalyzer")
            .field("matcher", &self.matcher.name())
            .field("budget", &self.budget)
            .finish()
    }
}

impl Default for IntentAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(LexiconMatcher::new()), AnalyzerBudget::default())
    }
}

impl IntentAnalyzer {
    pub fn new(matcher: Arc<dyn TagMatcher>, budget: AnalyzerBudget) -> Self {
        Self { matcher, budget }
    }

    /// Analyzer using the built-in lexicon under the given budget.
    pub fn with_budget(budget: AnalyzerBudget) -> Self {
        Self::new(Arc::new(LexiconMatcher::new()), budget)
    }

    /// Extract a [`MusicIntent`] from `text`.
    ///
    /// Fails only for empty or whitespace-only text, or text over the
    /// configured character limit.
    pub fn analyze(&self, text: &str) -> Result<MusicIntent, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::InvalidInput("text is empty".to_string()));
        }
        let chars = text.chars().count();
        if chars > self.budget.max_text_chars {
            return Err(PipelineError::InvalidInput(format!(
                "text has {} characters; the limit is {}",
                chars, self.budget.max_text_chars
            )));
        }

        let lowered = text.to_lowercase();
        let mut matches = self.matcher.match_tags(&lowered);
        for (offset, word) in extract_named_styles(&lowered) {
            if self.matcher.match_tags(&word).is_empty() {
                matches.push(TagMatch {
                    offset,
                    tag: Tag::Style(word),
                });
            }
        }
        matches.sort_by_key(|m| m.offset);

        let mut intent = MusicIntent::new(text);
        for TagMatch { tag, .. } in matches {
            match tag {
                Tag::Style(style) => push_unique(&mut intent.styles, style),
                Tag::Culture(marker) => push_unique(&mut intent.cultural_markers, marker),
                Tag::Mood(mood) => push_unique(&mut intent.moods, mood),
                Tag::Tempo(hint) => push_unique(&mut intent.tempo_hints, hint),
                Tag::Instrument(id) => push_unique(&mut intent.instruments, id),
                Tag::Complexity(level) => {
                    intent.complexity_hint.get_or_insert(level);
                }
            }
        }
        intent.explicit_tempo = extract_tempo(&lowered);
        intent.duration_hint = extract_duration(&lowered);
        intent.key_hint = extract_key(text);

        debug!(
            matcher = self.matcher.name(),
            styles = ?intent.styles,
            moods = ?intent.moods,
            instruments = intent.instruments.len(),
            "analyzed intent"
        );
        Ok(intent)
    }
}

/// Analyze `text` with the built-in lexicon and default limits.
pub fn analyze(text: &str) -> Result<MusicIntent, PipelineError> {
    IntentAnalyzer::default().analyze(text)
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
