use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::normalize::{is_negated, normalize};
use super::vocabulary::{ComplaintTag, RedFlagTag, SymptomTag, VocabEntry, Vocabulary};

/// Candidate numbers. Shape and unit filtering happen after the match.
/// "39°5" is the French way of writing 39.5.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+|°\d\b)?").unwrap());

/// Tokens that mark a number as something other than a temperature ("40 ans", "36 heures").
static NON_TEMPERATURE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:ans?|years?|yo|mois|months?|kg|kilos?|journees?|jours?|j|days?|h|heures?|hours?|hrs?|semaines?|weeks?|min|minutes?|fois|times|%|/)(?:\b|$|[^a-z])").unwrap()
});

const COUNT: &str = r"\d+|une?|deux|trois|quatre|cinq|six|sept|huit|neuf|dix|one|two|three|four|five|seven|eight|nine|ten";

static DAYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({COUNT})\s*(?:journees?|jours?|j|days?)\b")).unwrap()
});

static WEEKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({COUNT})\s*(?:semaines?|weeks?)\b")).unwrap()
});

static HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({COUNT})\s*(?:h|heures?|hours?|hrs?)\b")).unwrap()
});

static SINCE_YESTERDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:depuis hier|since yesterday)\b").unwrap()
});

/// Structured clinical signals read from patient text.
///
/// Tag lists keep first-detection order; they behave as sets (no duplicates).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactSet {
    pub complaint_present: bool,
    pub complaints: Vec<ComplaintTag>,
    pub temperature_c: Option<f64>,
    pub duration_days: Option<u32>,
    pub symptoms: Vec<SymptomTag>,
    pub red_flags: Vec<RedFlagTag>,
    pub further_symptoms_denied: bool,
}

impl FactSet {
    pub fn is_empty(&self) -> bool {
        *self == FactSet::default()
    }

    pub fn has_febrile_complaint(&self) -> bool {
        self.complaints.iter().any(|c| c.is_febrile())
    }

    /// Fold a freshly extracted window into the accumulated facts.
    ///
    /// Flags latch, tag sets union, numeric readings are replaced only when restated.
    pub fn absorb(&mut self, window: &FactSet) {
        self.complaint_present |= window.complaint_present;
        self.further_symptoms_denied |= window.further_symptoms_denied;
        push_all(&mut self.complaints, &window.complaints);
        push_all(&mut self.symptoms, &window.symptoms);
        push_all(&mut self.red_flags, &window.red_flags);
        if window.temperature_c.is_some() {
            self.temperature_c = window.temperature_c;
        }
        if window.duration_days.is_some() {
            self.duration_days = window.duration_days;
        }
    }
}

fn push_all<T: PartialEq + Copy>(into: &mut Vec<T>, from: &[T]) {
    for t in from {
        if !into.contains(t) {
            into.push(*t);
        }
    }
}

/// Side observations made while extracting. Not part of the fact set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionNotes {
    /// Temperature-shaped numbers rejected for falling outside the plausible range.
    pub discarded_temperatures: usize,
}

/// Parsing limits applied to numeric readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingLimits {
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub duration_max_days: u32,
}

impl Default for ReadingLimits {
    fn default() -> Self {
        Self {
            temperature_min: 34.0,
            temperature_max: 43.0,
            duration_max_days: 365,
        }
    }
}

pub struct SignalExtractor {
    vocabulary: Arc<Vocabulary>,
    limits: ReadingLimits,
}

impl SignalExtractor {
    pub fn new(vocabulary: Arc<Vocabulary>, limits: ReadingLimits) -> Self {
        Self { vocabulary, limits }
    }

    /// PURE FUNCTION: text -> facts. Total over any input.
    pub fn extract(&self, text: &str) -> FactSet {
        self.extract_with_notes(text).0
    }

    pub fn extract_with_notes(&self, text: &str) -> (FactSet, ExtractionNotes) {
        let norm = normalize(text);
        let mut notes = ExtractionNotes::default();

        let complaints = self.detect(&norm, &self.vocabulary.complaints);
        let facts = FactSet {
            complaint_present: !complaints.is_empty(),
            complaints,
            temperature_c: self.parse_temperature(&norm, &mut notes),
            duration_days: self.parse_duration(&norm),
            symptoms: self.detect(&norm, &self.vocabulary.symptoms),
            red_flags: self.detect(&norm, &self.vocabulary.red_flags),
            further_symptoms_denied: self
                .vocabulary
                .denial_cues
                .iter()
                .any(|cue| norm.contains(cue.as_str())),
        };

        (facts, notes)
    }

    /// Extraction over a window of patient messages, oldest first.
    ///
    /// Tags and temperature come from the joined text. Duration is resolved per message, newest
    /// first, so a later correction ("en fait depuis 12 heures") beats an older day count.
    pub fn extract_window(&self, messages: &[&str]) -> (FactSet, ExtractionNotes) {
        let (mut facts, notes) = self.extract_with_notes(&messages.join("\n"));
        facts.duration_days = messages
            .iter()
            .rev()
            .find_map(|m| self.parse_duration(&normalize(m)));
        (facts, notes)
    }

    /// Tags whose surface forms occur in `norm`, in order of first occurrence.
    fn detect<T: Copy + PartialEq>(&self, norm: &str, entries: &[VocabEntry<T>]) -> Vec<T> {
        let mut hits: Vec<(usize, T)> = Vec::new();

        for entry in entries {
            let first = entry
                .forms
                .iter()
                .filter(|f| !f.is_empty())
                .filter_map(|form| self.first_affirmed(norm, form))
                .min();
            if let Some(pos) = first {
                hits.push((pos, entry.tag));
            }
        }

        hits.sort_by_key(|(pos, _)| *pos);
        hits.into_iter().map(|(_, tag)| tag).collect()
    }

    fn first_affirmed(&self, norm: &str, form: &str) -> Option<usize> {
        norm.match_indices(form).map(|(pos, _)| pos).find(|&pos| {
            !self.vocabulary.negation_guard
                || !is_negated(
                    norm,
                    pos,
                    &self.vocabulary.negation_cues,
                    self.vocabulary.negation_window,
                )
        })
    }

    fn parse_temperature(&self, norm: &str, notes: &mut ExtractionNotes) -> Option<f64> {
        let mut last = None;

        for m in NUMBER.find_iter(norm) {
            let raw = m.as_str();
            let (int_part, frac_part) = match raw.char_indices().find(|(_, c)| matches!(c, '.' | ',' | '°')) {
                Some((i, sep)) => (&raw[..i], Some(&raw[i + sep.len_utf8()..])),
                None => (raw, None),
            };
            if int_part.len() != 2 || frac_part.is_some_and(|f| f.len() != 1) {
                continue;
            }
            // "18h30", "12:45", "x40" are clock times or codes
            let glued = norm[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || c == ':' || c == '°');
            if glued || NON_TEMPERATURE_UNIT.is_match(&norm[m.end()..]) {
                continue;
            }

            let Ok(value) = raw.replace([',', '°'], ".").parse::<f64>() else {
                continue;
            };
            if value >= self.limits.temperature_min && value <= self.limits.temperature_max {
                last = Some(value);
            } else {
                notes.discarded_temperatures += 1;
            }
        }

        last
    }

    /// Days beat weeks beat hours beat "since yesterday"; within a tier the last mention wins.
    fn parse_duration(&self, norm: &str) -> Option<u32> {
        let in_range = |d: u32| (d <= self.limits.duration_max_days).then_some(d);

        if let Some(days) = last_count(&DAYS, norm) {
            return in_range(days);
        }
        if let Some(weeks) = last_count(&WEEKS, norm) {
            return in_range(weeks.saturating_mul(7));
        }
        if let Some(hours) = last_count(&HOURS, norm) {
            return in_range((hours as f64 / 24.0).round() as u32);
        }
        if SINCE_YESTERDAY.is_match(norm) {
            return in_range(1);
        }
        None
    }
}

fn last_count(re: &Regex, norm: &str) -> Option<u32> {
    re.captures_iter(norm)
        .filter_map(|c| c.get(1).and_then(|m| parse_count(m.as_str())))
        .last()
}

fn parse_count(word: &str) -> Option<u32> {
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    let n = match word {
        "un" | "une" | "one" => 1,
        "deux" | "two" => 2,
        "trois" | "three" => 3,
        "quatre" | "four" => 4,
        "cinq" | "five" => 5,
        "six" => 6,
        "sept" | "seven" => 7,
        "huit" | "eight" => 8,
        "neuf" | "nine" => 9,
        "dix" | "ten" => 10,
        _ => return None,
    };
    Some(n)
}
