use tokio::sync::mpsc;
use triage::config::TriageConfig;
use triage::kernel::policy::{Action, Field, PolicyState};
use triage::kernel::reactor::Reactor;
use triage::kernel::scheduler::SideEffect;
use triage::outputs::realizer::render_template;
use triage::outputs::report::{ChatReply, TriageLevel};

/// Full consultation: fever + runny nose, temperature given late, then a denial of further symptoms.
#[tokio::test]
async fn test_end_to_end_consultation() {
    let (_tx, rx) = mpsc::channel(100);
    let mut reactor = Reactor::new(rx, TriageConfig::default());

    let script = [
        ("fièvre et nez qui coule", Some(Action::AskField(Field::Temperature))),
        ("39°C hier soir, depuis 2 jours", Some(Action::AskField(Field::Symptoms))),
        ("pas d'autre symptôme, juste fatigue", None),
    ];

    let mut final_report = None;
    for (text, expected) in script {
        let effects = reactor.submit(text).expect("session open");
        for effect in effects {
            match effect {
                SideEffect::RequestPhrasing { output_id, action } => {
                    if let Some(expected) = &expected {
                        assert_eq!(&action, expected, "after {:?}", text);
                    }
                    reactor.deliver(output_id, &render_template(&action)).unwrap();
                }
                SideEffect::Finalize { report, .. } => final_report = Some(report),
                SideEffect::Log(msg) => panic!("Unexpected log: {}", msg),
            }
        }
    }

    let report = final_report.expect("third turn concludes the session");
    assert_eq!(reactor.state.policy_state(), Some(PolicyState::Ready));
    assert_eq!(report.triage, TriageLevel::Unscheduled);
    assert_eq!(report.estimated_slot_min, 10);

    let summary = serde_json::to_value(&report.summary).unwrap();
    assert_eq!(
        summary,
        serde_json::json!({
            "complaint": "fever/rhinitis",
            "durationDays": 2,
            "temperatureC": 39.0,
            "symptoms": ["fatigue"],
            "redFlagsPresent": false
        })
    );

    assert!(report.summary_md.contains("- Motif : fever/rhinitis"));
    assert!(report.summary_md.contains("- Température : 39.0 °C"));

    let envelope = serde_json::to_value(ChatReply::Final(Box::new(report))).unwrap();
    assert_eq!(envelope["final"]["triage"], "SNP");
    assert!(envelope["final"].get("summary_patient").is_none());

    // Six turns: three from the patient, three rendered replies
    assert_eq!(reactor.state.transcript().len(), 6);
    println!("End-to-end consultation passed");
}
