use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use triage::config::{PhrasingConfig, TriageConfig};
use triage::kernel::event::{Event, OutputId, Turn};
use triage::kernel::reactor::Reactor;
use triage::kernel::scheduler::SideEffect;
use triage::kernel::telemetry::event::{PhrasingEvent, TelemetryEvent};
use triage::outputs::report::PendingFinal;
use triage::services::llm::client::{Phrased, PhrasingService};

// Internal Driver Events (Never touch Kernel)
enum DriverEvent {
    Phrased { output_id: OutputId, phrased: Phrased },
    InputClosed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let phrasing_config = PhrasingConfig::from_env();
    if std::env::args().any(|a| a == "--selftest") {
        println!("{}", serde_json::to_string_pretty(&phrasing_config.self_test())?);
        return Ok(());
    }

    let config = match std::env::var("TRIAGE_CONFIG") {
        Ok(path) => TriageConfig::from_json(&tokio::fs::read_to_string(&path).await?)?,
        Err(_) => TriageConfig::default(),
    };

    tracing::info!("Triage Kernel Booting... {:?}", phrasing_config);

    // Kernel Channel
    let (tx, rx) = mpsc::channel(100);
    // Driver Internal Channel
    let (driver_tx, mut driver_rx) = mpsc::channel(100);

    let mut reactor = Reactor::new(rx, config);
    let service = PhrasingService::new(phrasing_config);

    // Stdin reader: every non-empty line is one patient turn
    let input_tx = tx.clone();
    let input_driver_tx = driver_tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event = if line == "/reset" {
                Event::Reset
            } else {
                Event::Turn(Turn::patient(line))
            };
            if input_tx.send(event).await.is_err() {
                break;
            }
        }
        let _ = input_driver_tx.send(DriverEvent::InputClosed).await;
    });

    // Driver State
    let mut phrasing_tasks: HashMap<OutputId, JoinHandle<()>> = HashMap::new();
    let mut pending_final = PendingFinal::default();
    let mut input_closed = false;

    let mut cadence = tokio::time::interval(Duration::from_millis(50));
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    println!("Assistant: Expliquez ce qui vous amène (motif, depuis quand, symptômes).");

    loop {
        tokio::select! {
            _ = cadence.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted.");
                break;
            }
        }

        // 1. Drain Kernel Events
        let mut events = Vec::new();
        while let Ok(event) = reactor.receiver.try_recv() {
            events.push(event);
        }

        // 2. Drain Driver Events (Async Results)
        while let Ok(evt) = driver_rx.try_recv() {
            match evt {
                DriverEvent::Phrased { output_id, phrased } => {
                    if phrasing_tasks.remove(&output_id).is_none() {
                        continue;
                    }
                    let event = match &phrased {
                        Phrased::Generated(_) => PhrasingEvent::Generated,
                        Phrased::Template(_) => PhrasingEvent::FellBack,
                    };
                    reactor.telemetry.record(TelemetryEvent::PhrasingLifecycle { output_id, event });

                    let text = phrased.into_text();
                    println!("Assistant: {}", text);
                    if let Some(reply) = pending_final.complete(output_id, &text) {
                        println!("{}", serde_json::to_string_pretty(&reply)?);
                    }
                    events.push(Event::AssistantReply { output_id, text });
                }
                DriverEvent::InputClosed => input_closed = true,
            }
        }

        // 3. Kernel Step
        let effects = reactor.step(events);

        // 4. Handle Side Effects
        for effect in effects {
            match effect {
                SideEffect::Log(msg) => tracing::info!("[LOG] {}", msg),
                SideEffect::Finalize { output_id, report } => pending_final.hold(output_id, report),
                SideEffect::RequestPhrasing { output_id, action } => {
                    let service = service.clone();
                    let dr_tx = driver_tx.clone();
                    let transcript = reactor.state.transcript().clone();

                    let task = tokio::spawn(async move {
                        let phrased = service.phrase(&action, &transcript).await;
                        let _ = dr_tx.send(DriverEvent::Phrased { output_id, phrased }).await;
                    });
                    phrasing_tasks.insert(output_id, task);
                }
            }
        }

        if input_closed && phrasing_tasks.is_empty() {
            break;
        }
    }

    for (_, task) in phrasing_tasks.drain() {
        task.abort();
    }
    if pending_final.is_waiting() {
        tracing::warn!("Shutting down before the closing message was phrased");
    }
    reactor.shutdown();

    let snap = reactor.telemetry.snapshot();
    tracing::info!(
        "Shutdown. turns={} questions={} summaries={} urgent={} fallbacks={}",
        snap.turn_stats.patient,
        snap.question_stats.total(),
        snap.outcome_stats.summaries,
        snap.outcome_stats.urgent_referrals,
        snap.phrasing_stats.fell_back
    );
    Ok(())
}
