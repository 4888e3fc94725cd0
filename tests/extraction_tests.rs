use std::sync::Arc;

use triage::kernel::extract::{FactSet, ReadingLimits, SignalExtractor};
use triage::kernel::normalize::normalize;
use triage::kernel::vocabulary::{ComplaintTag, RedFlagTag, SymptomTag, Vocabulary};

fn extractor() -> SignalExtractor {
    SignalExtractor::new(Arc::new(Vocabulary::default()), ReadingLimits::default())
}

#[test]
fn test_normalization_folds_accents_and_case() {
    assert_eq!(normalize("Fièvre"), "fievre");
    assert_eq!(normalize("  J’ai   MAL à la Gorge "), "j'ai mal a la gorge");
    assert_eq!(normalize("cœur"), "coeur");

    let ex = extractor();
    assert_eq!(ex.extract("Fièvre"), ex.extract("fievre"));
    assert!(ex.extract("FIÈVRE").complaint_present);
}

#[test]
fn test_temperature_range_filter() {
    let ex = extractor();

    let (facts, notes) = ex.extract_with_notes("temperature 99");
    assert_eq!(facts.temperature_c, None, "99 is outside [34, 43] and must be discarded");
    assert_eq!(notes.discarded_temperatures, 1);

    let facts = ex.extract("39.5°C depuis 2 jours");
    assert_eq!(facts.temperature_c, Some(39.5));
    assert_eq!(facts.duration_days, Some(2));

    assert_eq!(ex.extract("38,7 ce matin").temperature_c, Some(38.7));
    assert_eq!(ex.extract("il fait 33").temperature_c, None);
    assert_eq!(ex.extract("thermomètre à 43").temperature_c, Some(43.0));
    assert_eq!(ex.extract("thermomètre à 34").temperature_c, Some(34.0));
}

#[test]
fn test_temperature_ignores_ages_and_durations() {
    let ex = extractor();

    let facts = ex.extract("j'ai 40 ans et de la fièvre");
    assert_eq!(facts.temperature_c, None, "an age is not a temperature");
    assert!(facts.complaint_present);

    let facts = ex.extract("ça dure depuis 36 heures");
    assert_eq!(facts.temperature_c, None);
    assert_eq!(facts.duration_days, Some(2));

    let (facts, notes) = ex.extract_with_notes("pris à 18h30");
    assert_eq!(facts.temperature_c, None);
    assert_eq!(notes.discarded_temperatures, 0);
}

#[test]
fn test_most_recent_temperature_wins() {
    let facts = extractor().extract("38.5 hier soir, 39.2 ce matin");
    assert_eq!(facts.temperature_c, Some(39.2));
}

#[test]
fn test_hour_to_day_conversion() {
    let ex = extractor();
    assert_eq!(ex.extract("depuis 48h").duration_days, Some(2));
    assert_eq!(ex.extract("depuis 50h").duration_days, Some(2)); // round(50/24)
    assert_eq!(ex.extract("depuis 2 heures").duration_days, Some(0));
    assert_eq!(ex.extract("since 30 hours").duration_days, Some(1));
}

#[test]
fn test_day_pattern_takes_precedence_over_hours() {
    let ex = extractor();
    let facts = ex.extract("depuis 3 jours, surtout les dernières 12 heures");
    assert_eq!(facts.duration_days, Some(3));

    assert_eq!(ex.extract("depuis deux jours").duration_days, Some(2));
    assert_eq!(ex.extract("depuis une semaine").duration_days, Some(7));
    assert_eq!(ex.extract("ça a commencé depuis hier").duration_days, Some(1));
    assert_eq!(ex.extract("depuis 900 jours").duration_days, None);
}

#[test]
fn test_keyword_detection_in_order() {
    let facts = extractor().extract("des frissons et beaucoup de fatigue, il boit moins");
    assert_eq!(
        facts.symptoms,
        vec![SymptomTag::Chills, SymptomTag::Fatigue, SymptomTag::DecreasedIntake]
    );

    let facts = extractor().extract("fièvre et nez qui coule");
    assert_eq!(facts.complaints, vec![ComplaintTag::Fever, ComplaintTag::Rhinitis]);
    assert!(facts.symptoms.is_empty(), "complaint keywords are not associated symptoms");
}

#[test]
fn test_negated_mentions_are_ignored() {
    let ex = extractor();

    let facts = ex.extract("pas de difficulté à respirer, pas de douleur thoracique");
    assert!(facts.red_flags.is_empty(), "negated red flags must not trigger: {:?}", facts.red_flags);

    let facts = ex.extract("il a du mal à respirer");
    assert_eq!(facts.red_flags, vec![RedFlagTag::BreathingDifficulty]);

    // Negation does not leak across a clause boundary
    let facts = ex.extract("pas de toux, mais de la fièvre");
    assert_eq!(facts.complaints, vec![ComplaintTag::Fever]);
}

#[test]
fn test_negation_guard_can_be_disabled() {
    let vocab = Vocabulary {
        negation_guard: false,
        ..Vocabulary::default()
    };
    let ex = SignalExtractor::new(Arc::new(vocab), ReadingLimits::default());
    let facts = ex.extract("pas de douleur thoracique");
    assert_eq!(facts.red_flags, vec![RedFlagTag::ChestPain]);
}

#[test]
fn test_denial_of_further_symptoms() {
    let ex = extractor();
    assert!(ex.extract("pas d'autre symptôme, juste fatigue").further_symptoms_denied);
    assert!(ex.extract("Rien d’autre").further_symptoms_denied);
    assert!(!ex.extract("fatigue").further_symptoms_denied);
}

#[test]
fn test_malformed_input_yields_empty_facts() {
    let ex = extractor();
    for text in ["", "   ", "???!!!", "12/12/2024", "🤒🤒🤒", "\u{0}\u{7f}"] {
        let facts = ex.extract(text);
        assert!(facts.is_empty(), "expected empty facts for {:?}, got {:?}", text, facts);
    }
}

#[test]
fn test_extract_is_idempotent() {
    let ex = extractor();
    let text = "Fièvre à 39,2 depuis 3 jours, frissons, pas de toux. Il respire mal.";
    assert_eq!(ex.extract(text), ex.extract(text));
}

#[test]
fn test_absorb_accumulates_without_forgetting() {
    let ex = extractor();
    let mut acc = FactSet::default();

    acc.absorb(&ex.extract("fièvre 38.5 et frissons"));
    acc.absorb(&ex.extract("depuis 2 jours"));
    let before = acc.clone();
    acc.absorb(&ex.extract("finalement 39.4, et fatigue"));

    assert!(acc.complaint_present);
    assert_eq!(acc.temperature_c, Some(39.4), "restated readings override");
    assert_eq!(acc.duration_days, Some(2), "unrestated readings persist");
    assert_eq!(acc.symptoms, vec![SymptomTag::Chills, SymptomTag::Fatigue]);

    // Monotonicity: everything true before is still true
    assert!(before.symptoms.iter().all(|s| acc.symptoms.contains(s)));
    assert!(before.complaints.iter().all(|c| acc.complaints.contains(c)));

    // An empty window changes nothing
    let snapshot = acc.clone();
    acc.absorb(&FactSet::default());
    assert_eq!(acc, snapshot);
}

#[test]
fn test_pas_mal_is_an_intensifier_not_a_negation() {
    let ex = extractor();

    let facts = ex.extract("il est pas mal essoufflé");
    assert_eq!(facts.red_flags, vec![RedFlagTag::BreathingDifficulty]);

    let facts = ex.extract("il tousse pas mal et respire mal");
    assert_eq!(facts.red_flags, vec![RedFlagTag::BreathingDifficulty]);
    assert_eq!(facts.complaints, vec![ComplaintTag::Cough]);

    // Real negations still hold
    assert!(ex.extract("pas de fièvre").complaints.is_empty());
    assert!(ex.extract("il n'a pas eu de fièvre").complaints.is_empty());
    assert!(ex.extract("sans fièvre").complaints.is_empty());
    // A cue that governs another word does not reach the hit
    assert_eq!(ex.extract("sans doute une douleur thoracique").red_flags, vec![RedFlagTag::ChestPain]);
}

#[test]
fn test_degree_sign_as_decimal_separator() {
    let ex = extractor();
    assert_eq!(ex.extract("39°5 ce soir").temperature_c, Some(39.5));
    assert_eq!(ex.extract("38°2").temperature_c, Some(38.2));
    assert_eq!(ex.extract("39°C").temperature_c, Some(39.0));
    assert_eq!(ex.extract("39° ce matin").temperature_c, Some(39.0));
}

#[test]
fn test_journee_counts_as_days() {
    let ex = extractor();
    assert_eq!(ex.extract("depuis une journée").duration_days, Some(1));
    assert_eq!(ex.extract("depuis 2 journées").duration_days, Some(2));
}

#[test]
fn test_window_duration_follows_newest_message() {
    let ex = extractor();
    let (facts, _) = ex.extract_window(&["mal de tête depuis 2 jours", "en fait depuis 12 heures"]);
    assert_eq!(facts.duration_days, Some(1));
    assert_eq!(facts.complaints, vec![ComplaintTag::Headache]);

    let (facts, _) = ex.extract_window(&["depuis 3 jours", "fatigue"]);
    assert_eq!(facts.duration_days, Some(3));
}
