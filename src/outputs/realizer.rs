use std::fmt::Write;

use crate::kernel::policy::{Action, Field, Summary};
use super::report::TriageLevel;

/// PURE FUNCTION: fixed patient-facing wording for an action.
/// Used when the phrasing service is unavailable, and always for urgent referrals.
pub fn render_template(action: &Action) -> String {
    match action {
        Action::AskField(Field::Complaint) => {
            "Qu'est-ce qui vous amène aujourd'hui ? Décrivez le motif principal en une phrase.".to_string()
        }
        Action::AskField(Field::Temperature) => {
            "Avez-vous pris votre température ? Si oui, combien (en °C) ?".to_string()
        }
        Action::AskField(Field::Duration) => {
            "Depuis quand cela a-t-il commencé (en heures ou en jours) ?".to_string()
        }
        Action::AskField(Field::Symptoms) => {
            "Avez-vous d'autres symptômes (fatigue, frissons, courbatures, nausées…) ?".to_string()
        }
        Action::AskRedFlags => {
            "Avez-vous l'un de ces signes : difficulté à respirer, douleur dans la poitrine, \
             nuque raide, taches violettes sur la peau, somnolence inhabituelle ?"
                .to_string()
        }
        Action::EmitSummary(_) => {
            "Merci, j'ai tout ce qu'il faut. Je prépare votre résumé…".to_string()
        }
        Action::UrgentReferral(_) => {
            "Signe d'alerte détecté. Appelez immédiatement le 15.".to_string()
        }
    }
}

/// Markdown record for the doctor. Deterministic: same summary, same text.
pub fn render_markdown(summary: &Summary, triage: TriageLevel, red_flags: &[String]) -> String {
    let mut md = String::new();

    let level = match triage {
        TriageLevel::Urgent15 => "URGENT_15",
        TriageLevel::Unscheduled => "SNP",
    };
    let _ = writeln!(md, "**Priorité** : {}", level);
    let _ = writeln!(md, "- Motif : {}", summary.complaint);
    match summary.duration_days {
        Some(d) => {
            let _ = writeln!(md, "- Durée : {} j", d);
        }
        None => {
            let _ = writeln!(md, "- Durée : non précisée");
        }
    }
    match summary.temperature_c {
        Some(t) => {
            let _ = writeln!(md, "- Température : {:.1} °C", t);
        }
        None => {
            let _ = writeln!(md, "- Température : non mesurée");
        }
    }
    if summary.symptoms.is_empty() {
        let _ = writeln!(md, "- Symptômes : aucun signalé");
    } else {
        let _ = writeln!(md, "- Symptômes : {}", summary.symptoms.join(", "));
    }
    if red_flags.is_empty() {
        let _ = write!(md, "- Signes d'alerte : aucun");
    } else {
        let _ = write!(md, "- Signes d'alerte : {}", red_flags.join(", "));
    }

    md
}
