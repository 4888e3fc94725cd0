use serde::{Deserialize, Serialize};
use super::normalize::normalize;

/// Chief complaints. Presence of any of these latches `complaint_present`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintTag {
    Fever,
    SoreThroat,
    Cough,
    EarPain,
    Diarrhea,
    Vomiting,
    Rhinitis,
    Headache,
    AbdominalPain,
    Rash,
    UrinaryBurning,
    Pain,
}

impl ComplaintTag {
    pub fn label(&self) -> &'static str {
        match self {
            ComplaintTag::Fever => "fever",
            ComplaintTag::SoreThroat => "sore_throat",
            ComplaintTag::Cough => "cough",
            ComplaintTag::EarPain => "ear_pain",
            ComplaintTag::Diarrhea => "diarrhea",
            ComplaintTag::Vomiting => "vomiting",
            ComplaintTag::Rhinitis => "rhinitis",
            ComplaintTag::Headache => "headache",
            ComplaintTag::AbdominalPain => "abdominal_pain",
            ComplaintTag::Rash => "rash",
            ComplaintTag::UrinaryBurning => "urinary_burning",
            ComplaintTag::Pain => "pain",
        }
    }

    /// Presentations where a measured temperature is needed before moving on.
    pub fn is_febrile(&self) -> bool {
        matches!(
            self,
            ComplaintTag::Fever | ComplaintTag::SoreThroat | ComplaintTag::EarPain | ComplaintTag::Cough
        )
    }
}

/// Associated symptoms collected after the chief complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomTag {
    Fatigue,
    Chills,
    BodyAches,
    DecreasedIntake,
    Nausea,
    Sneezing,
    Congestion,
    Sweats,
    Dizziness,
    Itching,
}

impl SymptomTag {
    pub fn label(&self) -> &'static str {
        match self {
            SymptomTag::Fatigue => "fatigue",
            SymptomTag::Chills => "chills",
            SymptomTag::BodyAches => "body_aches",
            SymptomTag::DecreasedIntake => "decreased_intake",
            SymptomTag::Nausea => "nausea",
            SymptomTag::Sneezing => "sneezing",
            SymptomTag::Congestion => "congestion",
            SymptomTag::Sweats => "sweats",
            SymptomTag::Dizziness => "dizziness",
            SymptomTag::Itching => "itching",
        }
    }
}

/// Severity markers. Any one of these short-circuits to urgent referral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedFlagTag {
    BreathingDifficulty,
    ChestPain,
    StiffNeck,
    ConsciousnessLoss,
    Confusion,
    Seizure,
    Purpura,
    BlueLips,
    Dehydration,
    Bleeding,
}

impl RedFlagTag {
    pub fn label(&self) -> &'static str {
        match self {
            RedFlagTag::BreathingDifficulty => "breathing_difficulty",
            RedFlagTag::ChestPain => "chest_pain",
            RedFlagTag::StiffNeck => "stiff_neck",
            RedFlagTag::ConsciousnessLoss => "consciousness_loss",
            RedFlagTag::Confusion => "confusion",
            RedFlagTag::Seizure => "seizure",
            RedFlagTag::Purpura => "purpura",
            RedFlagTag::BlueLips => "blue_lips",
            RedFlagTag::Dehydration => "dehydration",
            RedFlagTag::Bleeding => "bleeding",
        }
    }
}

/// One canonical tag and the surface forms that identify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabEntry<T> {
    pub tag: T,
    pub forms: Vec<String>,
}

impl<T> VocabEntry<T> {
    fn new(tag: T, forms: &[&str]) -> Self {
        Self {
            tag,
            forms: forms.iter().map(|f| normalize(f)).collect(),
        }
    }
}

/// Immutable keyword configuration injected into the extractor.
/// Shared across sessions behind an `Arc`; nothing here is mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub complaints: Vec<VocabEntry<ComplaintTag>>,
    pub symptoms: Vec<VocabEntry<SymptomTag>>,
    pub red_flags: Vec<VocabEntry<RedFlagTag>>,
    /// Tokens that cancel a keyword hit when they appear just before it.
    pub negation_cues: Vec<String>,
    /// Phrases where the patient volunteers there is nothing more to report.
    pub denial_cues: Vec<String>,
    pub negation_guard: bool,
    /// How many tokens before a hit are checked for negation.
    pub negation_window: usize,
}

impl Vocabulary {
    /// Re-normalize every surface form. Needed after loading a vocabulary from JSON,
    /// since hand-written forms may carry accents or capitals.
    pub fn normalized(mut self) -> Self {
        for e in &mut self.complaints {
            e.forms = e.forms.iter().map(|f| normalize(f)).collect();
        }
        for e in &mut self.symptoms {
            e.forms = e.forms.iter().map(|f| normalize(f)).collect();
        }
        for e in &mut self.red_flags {
            e.forms = e.forms.iter().map(|f| normalize(f)).collect();
        }
        self.negation_cues = self.negation_cues.iter().map(|f| normalize(f)).collect();
        self.denial_cues = self.denial_cues.iter().map(|f| normalize(f)).collect();
        self
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        use ComplaintTag as C;
        use RedFlagTag as R;
        use SymptomTag as S;

        Self {
            complaints: vec![
                VocabEntry::new(C::Fever, &["fièvre", "fievreux", "fiévreux", "de la température", "fever", "feverish"]),
                VocabEntry::new(C::SoreThroat, &["mal à la gorge", "mal de gorge", "angine", "gorge qui gratte", "sore throat"]),
                VocabEntry::new(C::Cough, &["toux", "tousse", "tousser", "cough"]),
                VocabEntry::new(C::EarPain, &["mal à l'oreille", "mal aux oreilles", "otite", "ear pain", "earache"]),
                VocabEntry::new(C::Diarrhea, &["diarrhée", "diarrhea", "diarrhoea"]),
                VocabEntry::new(C::Vomiting, &["vomi", "vomissement", "vomit"]),
                VocabEntry::new(C::Rhinitis, &["nez qui coule", "rhume", "rhinite", "runny nose"]),
                VocabEntry::new(C::Headache, &["mal à la tête", "mal de tête", "céphalée", "migraine", "headache"]),
                VocabEntry::new(C::AbdominalPain, &["mal au ventre", "douleur abdominale", "douleurs abdominales", "stomach ache", "abdominal pain"]),
                VocabEntry::new(C::Rash, &["boutons", "éruption", "plaques rouges", "rash"]),
                VocabEntry::new(C::UrinaryBurning, &["brûlure urinaire", "brûlures urinaires", "brûle quand j'urine", "cystite", "burning urination"]),
                VocabEntry::new(C::Pain, &["douleur", "j'ai mal", "pain", "hurts"]),
            ],
            symptoms: vec![
                VocabEntry::new(S::Fatigue, &["fatigue", "fatigué", "épuisé", "tired", "exhausted"]),
                VocabEntry::new(S::Chills, &["frissons", "chills"]),
                VocabEntry::new(S::BodyAches, &["courbatures", "body aches", "muscle aches"]),
                VocabEntry::new(S::DecreasedIntake, &["boit moins", "mange moins", "ne mange plus", "perte d'appétit", "not eating"]),
                VocabEntry::new(S::Nausea, &["nausée", "envie de vomir", "nausea"]),
                VocabEntry::new(S::Sneezing, &["éternue", "éternuements", "sneezing"]),
                VocabEntry::new(S::Congestion, &["nez bouché", "congestion", "stuffy nose"]),
                VocabEntry::new(S::Sweats, &["sueurs", "transpire", "sweats", "sweating"]),
                VocabEntry::new(S::Dizziness, &["vertige", "étourdi", "dizzy", "dizziness"]),
                VocabEntry::new(S::Itching, &["démange", "démangeaisons", "itchy", "itching"]),
            ],
            red_flags: vec![
                VocabEntry::new(R::BreathingDifficulty, &["mal à respirer", "difficulté à respirer", "difficultés à respirer", "difficultés respiratoires", "essoufflé", "respire mal", "souffle court", "short of breath", "difficulty breathing", "can't breathe"]),
                VocabEntry::new(R::ChestPain, &["douleur thoracique", "douleur dans la poitrine", "mal à la poitrine", "chest pain"]),
                VocabEntry::new(R::StiffNeck, &["raideur de la nuque", "nuque raide", "stiff neck"]),
                VocabEntry::new(R::ConsciousnessLoss, &["perte de connaissance", "évanoui", "inconscient", "passed out", "fainted", "unconscious"]),
                VocabEntry::new(R::Confusion, &["confus", "difficile à réveiller", "somnolent", "confused", "hard to wake"]),
                VocabEntry::new(R::Seizure, &["convulsion", "convulse", "crise d'épilepsie", "seizure"]),
                VocabEntry::new(R::Purpura, &["purpura", "taches violettes", "taches qui ne s'effacent pas", "purple spots"]),
                VocabEntry::new(R::BlueLips, &["lèvres bleues", "cyanose", "blue lips"]),
                VocabEntry::new(R::Dehydration, &["ne boit plus", "ne boit rien", "n'urine plus", "no urine"]),
                VocabEntry::new(R::Bleeding, &["saigne beaucoup", "hémorragie", "du sang", "vomit blood", "coughing blood"]),
            ],
            negation_cues: ["pas", "sans", "aucun", "aucune", "ni", "jamais", "no", "not", "without", "never"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            denial_cues: ["pas d'autre", "rien d'autre", "aucun autre", "aucune autre", "c'est tout", "nothing else", "no other"]
                .iter()
                .map(|s| normalize(s))
                .collect(),
            negation_guard: true,
            negation_window: 3,
        }
    }
}
