use std::fs;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use spotcheck_catalog::{builtin_catalog, SceneCatalog};
use spotcheck_protocol::AttemptRecord;

use crate::cli::{ProbeArgs, RunArgs};
use crate::coordinator::{dispatch_completion, CompletionHandle, GateOutcome, LoginGate};
use crate::events::{EventLog, SessionObserver};
use crate::geometry::Point;
use crate::profile::PlayerProfile;
use crate::remote::RemoteService;
use crate::script::{ClickScript, Step};
use crate::session::{ScenePhase, SceneSession, SceneSummary};

/// Console reporter for session callbacks.
struct ConsoleObserver {
    verbose: bool,
}

impl SessionObserver for ConsoleObserver {
    fn scene_ready(&self, index: usize, file: &str) {
        if self.verbose {
            println!("  showing {file} (scene {})", index + 1);
        }
    }

    fn hotspot_found(&self, index: usize, desc: &str) {
        println!("  found #{}: {desc}", index + 1);
    }

    fn click_observed(&self, point: Point, hit: Option<usize>) {
        if self.verbose && hit.is_none() {
            println!("  miss at {:.0},{:.0}", point.x, point.y);
        }
    }
}

#[derive(Debug, Serialize)]
struct RunSummary {
    player: String,
    scene: u32,
    found_count: usize,
    total: usize,
    missed: Vec<String>,
    completion_reported: Option<bool>,
    events: Vec<String>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let RunArgs {
        endpoint,
        player,
        catalog,
        script,
        profile,
        event_log_json,
        summary_json,
        verbose,
    } = args;

    // Local inputs are validated before any reservation is attempted, so a
    // typo in a path never burns the player's one attempt.
    let catalog = match catalog.as_ref() {
        Some(path) => SceneCatalog::from_json_file(path)?,
        None => builtin_catalog()?,
    };
    let script = match script.as_ref() {
        Some(path) => Some(ClickScript::from_json_file(path)?),
        None => None,
    };

    let mut profile = PlayerProfile::from_json_file(profile.as_deref())?;
    let requested = match player.or_else(|| profile.last_player().map(str::to_string)) {
        Some(name) => name,
        None => bail!("no participant name: pass --player or keep one in --profile"),
    };

    let events = EventLog::new();
    let service = Arc::new(
        RemoteService::new(&endpoint)
            .with_context(|| format!("configuring collaborator endpoint {endpoint}"))?,
    );

    let gate = LoginGate::new(service.as_ref(), events.clone());
    let admitted = match gate.admit(&requested).await? {
        GateOutcome::Admitted(admitted) => admitted,
        GateOutcome::AlreadyPlayed => {
            bail!("{requested} has already recorded an attempt; pick a different name")
        }
        GateOutcome::Unavailable => {
            bail!(
                "could not reserve an attempt for {requested}; collaborator refused or unreachable"
            )
        }
    };

    profile.remember(&admitted.display_name);
    profile.save()?;
    println!("Welcome, {}.", admitted.display_name);

    let observer = Rc::new(ConsoleObserver { verbose });
    let mut session = SceneSession::new(&catalog, observer, events.clone());
    session.load(0);
    session.mark_ready();
    println!("{}", session.progress_label());
    println!("  {} hotspots to find", session.scene().hotspot_count());

    let mut completions: Vec<(u32, CompletionHandle)> = Vec::new();
    let mut final_summary: Option<(u32, SceneSummary, String)> = None;

    if let Some(script) = script {
        for step in script.steps {
            match step {
                Step::Click { x, y } => {
                    let report = session.register_click(Point::new(x, y));
                    if verbose && report.hit.is_some() && !report.newly_found {
                        println!("  already counted");
                    }
                }
                Step::Next => {
                    session.next();
                    session.mark_ready();
                }
                Step::Prev => {
                    session.prev();
                    session.mark_ready();
                }
                Step::Reset => {
                    session.reset();
                    session.mark_ready();
                }
                Step::Finish => {
                    if session.phase() == ScenePhase::Scored {
                        eprintln!(
                            "[spotcheck_engine] warning: scene already scored; ignoring extra finish"
                        );
                        continue;
                    }
                    let summary = session.finish();
                    let scene_number = session.active_index() as u32 + 1;
                    let record = AttemptRecord {
                        name: admitted.identity.clone(),
                        display_name: admitted.display_name.clone(),
                        scene: scene_number,
                        score: summary.found_count as u32,
                        total: summary.total as u32,
                        missed: summary.missed.clone(),
                        time: Utc::now(),
                    };
                    completions.push((scene_number, dispatch_completion(service.clone(), record)));
                    final_summary = Some((scene_number, summary, session.progress_label()));
                }
            }
        }
    }

    // Completion reports were sent fire-and-forget; their status is only
    // observed here, after all scripted play is done.
    let mut completion_reported = None;
    for (scene_number, handle) in completions {
        let ok = handle.observe().await;
        events.record(format!(
            "attempt.complete scene={scene_number} {}",
            if ok { "ok" } else { "failed" }
        ));
        if !ok {
            eprintln!(
                "[spotcheck_engine] warning: completion report for scene {scene_number} was not acknowledged"
            );
        }
        completion_reported = Some(ok);
    }

    match final_summary.as_ref() {
        Some((_, summary, label)) => {
            println!(
                "Final score for {}: {}/{} on {label}",
                admitted.display_name, summary.found_count, summary.total
            );
            for missed in &summary.missed {
                println!("  missed: {missed}");
            }
        }
        None => {
            println!(
                "Session ended without a finished scene; {} found so far on {}",
                session.found_count(),
                session.progress_label()
            );
            if verbose {
                for (index, hotspot) in session.remaining() {
                    println!("  unfound #{}: {}", index + 1, hotspot.desc);
                }
            }
        }
    }

    if let Some(path) = event_log_json.as_ref() {
        let entries = events.entries();
        let json = serde_json::to_string_pretty(&entries)
            .context("serializing session event log to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing session event log to {}", path.display()))?;
        println!("Saved session event log to {}", path.display());
    }

    if let Some(path) = summary_json.as_ref() {
        match final_summary.as_ref() {
            Some((scene_number, summary, _)) => {
                let report = RunSummary {
                    player: admitted.display_name.clone(),
                    scene: *scene_number,
                    found_count: summary.found_count,
                    total: summary.total,
                    missed: summary.missed.clone(),
                    completion_reported,
                    events: events.entries(),
                };
                let json = serde_json::to_string_pretty(&report)
                    .context("serializing run summary to JSON")?;
                fs::write(path, &json)
                    .with_context(|| format!("writing run summary to {}", path.display()))?;
                println!("Saved run summary to {}", path.display());
            }
            None => eprintln!(
                "[spotcheck_engine] warning: --summary-json ignored without a finished scene"
            ),
        }
    }

    Ok(())
}

pub async fn probe(args: ProbeArgs) -> Result<()> {
    let service = RemoteService::new(&args.endpoint)
        .with_context(|| format!("configuring collaborator endpoint {}", args.endpoint))?;
    let reply = service
        .probe()
        .await
        .with_context(|| format!("probing collaborator at {}", args.endpoint))?;
    match reply.msg.as_deref() {
        Some(msg) => println!("Collaborator reachable: ok={} ({msg})", reply.ok),
        None => println!("Collaborator reachable: ok={}", reply.ok),
    }
    Ok(())
}
