use tokio::sync::mpsc;
use triage::config::TriageConfig;
use triage::error::TriageError;
use triage::kernel::event::{Event, OutputId, Speaker, Turn};
use triage::kernel::policy::{Action, Field, PolicyState};
use triage::kernel::reactor::Reactor;
use triage::kernel::scheduler::SideEffect;
use triage::outputs::realizer::render_template;
use triage::outputs::report::TriageLevel;

fn reactor_with(config: TriageConfig) -> (mpsc::Sender<Event>, Reactor) {
    let (tx, rx) = mpsc::channel(100);
    (tx, Reactor::new(rx, config))
}

/// Answers every phrasing request with its template, the way the driver does when offline.
/// Returns the actions that were requested.
fn deliver_all(reactor: &mut Reactor, effects: Vec<SideEffect>) -> Vec<Action> {
    let mut actions = Vec::new();
    for effect in effects {
        if let SideEffect::RequestPhrasing { output_id, action } = effect {
            reactor
                .deliver(output_id, &render_template(&action))
                .expect("pending output");
            actions.push(action);
        }
    }
    actions
}

fn say(reactor: &mut Reactor, text: &str) -> Action {
    let effects = reactor.submit(text).expect("session open");
    let mut actions = deliver_all(reactor, effects);
    assert_eq!(actions.len(), 1, "exactly one action per patient step");
    actions.remove(0)
}

#[tokio::test]
async fn test_burst_of_turns_yields_one_question() {
    let (_tx, mut reactor) = reactor_with(TriageConfig::default());

    let effects = reactor.step(vec![
        Event::Turn(Turn::patient("fièvre")),
        Event::Turn(Turn::patient("depuis 2 jours")),
    ]);

    let requests: Vec<_> = effects
        .iter()
        .filter(|e| matches!(e, SideEffect::RequestPhrasing { .. }))
        .collect();
    assert_eq!(requests.len(), 1, "a burst is evaluated once");

    match requests[0] {
        SideEffect::RequestPhrasing { action, .. } => {
            assert_eq!(*action, Action::AskField(Field::Temperature));
        }
        _ => unreachable!(),
    }
    assert_eq!(reactor.state.transcript().len(), 2);
    assert_eq!(reactor.state.facts().duration_days, Some(2));
}

#[tokio::test]
async fn test_questions_are_never_repeated() {
    let (_tx, mut reactor) = reactor_with(TriageConfig::default());

    assert_eq!(say(&mut reactor, "bonjour"), Action::AskField(Field::Complaint));
    assert_eq!(say(&mut reactor, "je sais pas"), Action::AskField(Field::Duration));
    assert_eq!(say(&mut reactor, "euh"), Action::AskField(Field::Symptoms));
    assert_eq!(say(&mut reactor, "rien"), Action::AskRedFlags);

    match say(&mut reactor, "non") {
        Action::EmitSummary(summary) => {
            assert_eq!(summary.complaint, "unspecified");
            assert_eq!(summary.duration_days, None);
            assert_eq!(summary.temperature_c, None);
            assert!(summary.symptoms.is_empty());
        }
        other => panic!("Expected summary after exhausting questions, got {:?}", other),
    }

    assert_eq!(reactor.state.policy_state(), Some(PolicyState::Ready));
    assert_eq!(reactor.state.progress().asked.len(), 4);
    println!("No-repeat flow passed");
}

#[tokio::test]
async fn test_red_flag_short_circuits_to_urgent() {
    let (_tx, mut reactor) = reactor_with(TriageConfig::default());

    assert_eq!(say(&mut reactor, "fièvre"), Action::AskField(Field::Temperature));

    let effects = reactor.submit("il respire mal depuis ce matin").unwrap();
    let (closing_id, report) = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::Finalize { output_id, report } => Some((*output_id, report.clone())),
            _ => None,
        })
        .expect("urgent referral finalizes the session");
    let requested_id = effects.iter().find_map(|e| match e {
        SideEffect::RequestPhrasing { output_id, .. } => Some(*output_id),
        _ => None,
    });
    assert_eq!(requested_id, Some(closing_id), "the report is tied to the closing request");

    assert_eq!(report.triage, TriageLevel::Urgent15);
    assert_eq!(report.estimated_slot_min, 0);
    assert_eq!(report.red_flags, vec!["breathing_difficulty".to_string()]);
    assert_eq!(report.summary.complaint, "fever");
    assert!(report.summary.red_flags_present);
    assert_eq!(report.session_id, reactor.state.session_id);

    let actions = deliver_all(&mut reactor, effects);
    assert!(matches!(actions[0], Action::UrgentReferral(_)));
    assert_eq!(reactor.state.policy_state(), Some(PolicyState::UrgentOverride));
}

#[tokio::test]
async fn test_closed_session_rejects_new_turns() {
    let (_tx, mut reactor) = reactor_with(TriageConfig::default());
    say(&mut reactor, "j'ai du mal à respirer");
    assert!(reactor.state.is_closed());

    let err = reactor.submit("et aussi de la fièvre").unwrap_err();
    assert!(matches!(err, TriageError::SessionClosed(id) if id == reactor.state.session_id));

    let turns_before = reactor.state.transcript().len();
    let effects = reactor.step(vec![Event::Turn(Turn::patient("toujours là ?"))]);
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], SideEffect::Log(_)));
    assert_eq!(reactor.state.transcript().len(), turns_before, "rejected turns are not recorded");
    assert_eq!(reactor.telemetry.snapshot().turn_stats.rejected, 1);
}

#[tokio::test]
async fn test_unknown_output_is_refused() {
    let (_tx, mut reactor) = reactor_with(TriageConfig::default());
    let bogus = OutputId { turn: 9, ordinal: 0 };
    assert!(matches!(
        reactor.deliver(bogus, "bonjour"),
        Err(TriageError::UnknownOutput(id)) if id == bogus
    ));

    // Delivering twice is refused too
    let effects = reactor.submit("toux").unwrap();
    let SideEffect::RequestPhrasing { output_id, action } = effects[0].clone() else {
        panic!("Expected a phrasing request");
    };
    reactor.deliver(output_id, &render_template(&action)).unwrap();
    assert!(reactor.deliver(output_id, "encore").is_err());

    let assistant_turns = reactor
        .state
        .transcript()
        .turns()
        .iter()
        .filter(|t| t.speaker == Speaker::Assistant)
        .count();
    assert_eq!(assistant_turns, 1);
}

#[tokio::test]
async fn test_reset_starts_a_fresh_session() {
    let (_tx, mut reactor) = reactor_with(TriageConfig::default());
    say(&mut reactor, "fièvre à 39");
    let first_id = reactor.state.session_id;

    let effects = reactor.step(vec![Event::Reset]);
    assert!(matches!(effects.as_slice(), [SideEffect::Log(_)]));
    assert_ne!(reactor.state.session_id, first_id);
    assert!(reactor.state.transcript().is_empty());
    assert!(reactor.state.facts().is_empty());
    assert!(reactor.state.progress().asked.is_empty());

    // The previous session's facts do not leak
    assert_eq!(say(&mut reactor, "bonjour"), Action::AskField(Field::Complaint));
}

#[tokio::test]
async fn test_facts_survive_a_narrow_window() {
    let config = TriageConfig {
        window_turns: 2,
        ..TriageConfig::default()
    };
    let (_tx, mut reactor) = reactor_with(config);

    assert_eq!(say(&mut reactor, "fièvre"), Action::AskField(Field::Temperature));
    // "fièvre" is out of the 2-turn window now, but was absorbed already
    assert_eq!(say(&mut reactor, "38.5"), Action::AskField(Field::Duration));
    assert!(reactor.state.facts().complaint_present);
    assert_eq!(reactor.state.facts().temperature_c, Some(38.5));
}

#[tokio::test]
async fn test_state_version_is_monotonic() {
    let (_tx, mut reactor) = reactor_with(TriageConfig::default());
    let mut last = reactor.state.version;
    for text in ["mal à la gorge", "depuis 3 jours", "fatigue", "non rien d'autre"] {
        let effects = reactor.submit(text).unwrap();
        deliver_all(&mut reactor, effects);
        assert!(reactor.state.version > last);
        last = reactor.state.version;
    }
}

#[tokio::test]
async fn test_run_drains_channel_until_closed() {
    let (tx, mut reactor) = reactor_with(TriageConfig::default());

    tx.send(Event::Turn(Turn::patient("fièvre depuis 2 jours"))).await.unwrap();
    tx.send(Event::Turn(Turn::patient("39,5 ce matin"))).await.unwrap();
    drop(tx);

    reactor.run().await;

    assert_eq!(reactor.state.patient_turns(), 2);
    assert_eq!(reactor.state.facts().temperature_c, Some(39.5));
}

#[tokio::test]
async fn test_newer_duration_correction_wins() {
    let (_tx, mut reactor) = reactor_with(TriageConfig::default());

    assert_eq!(say(&mut reactor, "mal de tête depuis 2 jours"), Action::AskField(Field::Symptoms));
    assert_eq!(reactor.state.facts().duration_days, Some(2));

    // Hours in the newer message beat days in the older one
    say(&mut reactor, "pardon, en fait depuis 12 heures seulement");
    assert_eq!(reactor.state.facts().duration_days, Some(1));

    // A later message without any duration keeps the correction
    let effects = reactor.submit("un peu de fatigue").unwrap();
    deliver_all(&mut reactor, effects);
    assert_eq!(reactor.state.facts().duration_days, Some(1));
}
