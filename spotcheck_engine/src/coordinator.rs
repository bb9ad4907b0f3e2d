use std::sync::Arc;

use anyhow::{bail, Result};
use spotcheck_protocol::{reserve_meta, AttemptRecord, Identity, ProtocolError};
use tokio::task::JoinHandle;

use crate::events::EventLog;
use crate::remote::{AttemptBackend, RemoteError};

/// Successful claim produced by the login gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedAttempt {
    pub identity: Identity,
    pub display_name: String,
}

/// Result of one check+reserve pass for a candidate name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Reservation held; scenes may begin.
    Admitted(AdmittedAttempt),
    /// The identity has already recorded an attempt.
    AlreadyPlayed,
    /// Reservation refused or could not be confirmed.
    Unavailable,
}

/// Gates scene entry behind the check+reserve protocol.
///
/// `check` is an optimistic pre-flight hint and degrades to "not played" on
/// any failure; `reserve` is the sole source of truth for exclusivity and
/// degrades to a refusal. Callers re-prompt on anything but `Admitted`, and
/// every retry runs a fresh pass through here.
pub struct LoginGate<'a, B> {
    backend: &'a B,
    events: EventLog,
}

impl<'a, B: AttemptBackend> LoginGate<'a, B> {
    pub fn new(backend: &'a B, events: EventLog) -> Self {
        Self { backend, events }
    }

    /// Runs one check+reserve pass for the raw name typed at the door.
    ///
    /// An empty name is a validation failure and never reaches the wire.
    pub async fn admit(&self, raw_name: &str) -> Result<GateOutcome> {
        let identity = match Identity::normalize(raw_name) {
            Ok(identity) => identity,
            Err(ProtocolError::EmptyIdentity) => bail!("participant name is empty"),
            Err(err) => return Err(err.into()),
        };
        let display_name = raw_name.trim().to_string();

        let played = match self.backend.check(&identity).await {
            Ok(played) => played,
            Err(err) => {
                log::warn!("check failed for {identity}: {err}");
                false
            }
        };
        self.events
            .record(format!("attempt.check {identity} played={played}"));
        if played {
            return Ok(GateOutcome::AlreadyPlayed);
        }

        let reserved = match self.backend.reserve(&identity, reserve_meta(&display_name)).await {
            Ok(reserved) => reserved,
            Err(err) => {
                log::warn!("reserve failed for {identity}: {err}");
                false
            }
        };
        self.events
            .record(format!("attempt.reserve {identity} reserved={reserved}"));
        if !reserved {
            return Ok(GateOutcome::Unavailable);
        }

        Ok(GateOutcome::Admitted(AdmittedAttempt {
            identity,
            display_name,
        }))
    }
}

/// Handle to a detached completion report.
///
/// The report never gates navigation or clicking; the handle is consulted
/// once at the end of a run purely for status display.
#[derive(Debug)]
pub struct CompletionHandle {
    task: JoinHandle<bool>,
}

impl CompletionHandle {
    /// Waits for the report status. A false outcome only means the remote
    /// bookkeeping missed the attempt; local results stand.
    pub async fn observe(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}

/// Sends the attempt record as its own task, fire-and-forget.
pub fn dispatch_completion<B>(backend: Arc<B>, record: AttemptRecord) -> CompletionHandle
where
    B: AttemptBackend + Send + Sync + 'static,
{
    let task = tokio::spawn(async move {
        match backend.complete(&record).await {
            Ok(ok) => ok,
            Err(err) => {
                log::warn!("completion report failed: {err}");
                false
            }
        }
    });
    CompletionHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hyper::StatusCode;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedBackend {
        played: bool,
        reserve_ok: bool,
        complete_ok: bool,
        fail_check: bool,
        fail_reserve: bool,
        fail_complete: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl AttemptBackend for ScriptedBackend {
        async fn check(&self, identity: &Identity) -> Result<bool, RemoteError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(format!("check {identity}"));
            if self.fail_check {
                return Err(RemoteError::Status(StatusCode::INTERNAL_SERVER_ERROR));
            }
            Ok(self.played)
        }

        async fn reserve(&self, identity: &Identity, meta: Value) -> Result<bool, RemoteError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(format!("reserve {identity} {}", meta["displayName"]));
            if self.fail_reserve {
                return Err(RemoteError::Status(StatusCode::INTERNAL_SERVER_ERROR));
            }
            Ok(self.reserve_ok)
        }

        async fn complete(&self, record: &AttemptRecord) -> Result<bool, RemoteError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(format!("complete {} {}/{}", record.name, record.score, record.total));
            if self.fail_complete {
                return Err(RemoteError::Status(StatusCode::INTERNAL_SERVER_ERROR));
            }
            Ok(self.complete_ok)
        }
    }

    fn make_record(name: &str, score: u32, total: u32) -> AttemptRecord {
        AttemptRecord {
            name: Identity::normalize(name).expect("identity"),
            display_name: name.to_string(),
            scene: 1,
            score,
            total,
            missed: vec!["Open drink in production".to_string()],
            time: Utc::now(),
        }
    }

    #[tokio::test]
    async fn fresh_name_is_admitted_after_check_and_reserve() {
        let backend = ScriptedBackend {
            reserve_ok: true,
            ..Default::default()
        };
        let gate = LoginGate::new(&backend, EventLog::new());

        let outcome = gate.admit("  Alice  ").await.expect("gate pass");
        let admitted = match outcome {
            GateOutcome::Admitted(admitted) => admitted,
            other => panic!("expected admission, got {other:?}"),
        };
        assert_eq!(admitted.identity.as_str(), "alice");
        assert_eq!(admitted.display_name, "Alice");
        assert_eq!(
            backend.calls(),
            vec![
                "check alice".to_string(),
                "reserve alice \"Alice\"".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn played_name_never_reaches_reserve() {
        let backend = ScriptedBackend {
            played: true,
            reserve_ok: true,
            ..Default::default()
        };
        let gate = LoginGate::new(&backend, EventLog::new());

        let outcome = gate.admit("alice").await.expect("gate pass");
        assert_eq!(outcome, GateOutcome::AlreadyPlayed);
        assert_eq!(backend.calls(), vec!["check alice".to_string()]);
    }

    #[tokio::test]
    async fn check_transport_failure_is_fail_open() {
        let backend = ScriptedBackend {
            fail_check: true,
            reserve_ok: true,
            ..Default::default()
        };
        let gate = LoginGate::new(&backend, EventLog::new());

        let outcome = gate.admit("alice").await.expect("gate pass");
        assert!(
            matches!(outcome, GateOutcome::Admitted(_)),
            "a failed check must degrade to not-played, got {outcome:?}"
        );
    }

    #[tokio::test]
    async fn reserve_refusal_blocks_entry() {
        let backend = ScriptedBackend::default();
        let gate = LoginGate::new(&backend, EventLog::new());

        let outcome = gate.admit("alice").await.expect("gate pass");
        assert_eq!(outcome, GateOutcome::Unavailable);
    }

    #[tokio::test]
    async fn reserve_transport_failure_blocks_entry() {
        let backend = ScriptedBackend {
            fail_reserve: true,
            ..Default::default()
        };
        let gate = LoginGate::new(&backend, EventLog::new());

        let outcome = gate.admit("alice").await.expect("gate pass");
        assert_eq!(outcome, GateOutcome::Unavailable);
    }

    #[tokio::test]
    async fn blank_name_never_reaches_the_wire() {
        let backend = ScriptedBackend::default();
        let gate = LoginGate::new(&backend, EventLog::new());

        let err = gate.admit("   ").await.expect_err("blank name must fail");
        assert!(err.to_string().contains("empty"), "unexpected error: {err:#}");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn retry_with_new_name_is_a_fresh_pair() {
        let backend = ScriptedBackend {
            played: true,
            ..Default::default()
        };
        let gate = LoginGate::new(&backend, EventLog::new());

        let first = gate.admit("alice").await.expect("gate pass");
        assert_eq!(first, GateOutcome::AlreadyPlayed);
        let second = gate.admit("Bob").await.expect("gate pass");
        assert_eq!(second, GateOutcome::AlreadyPlayed);
        assert_eq!(
            backend.calls(),
            vec!["check alice".to_string(), "check bob".to_string()]
        );
    }

    #[tokio::test]
    async fn completion_status_is_observable() {
        let backend = Arc::new(ScriptedBackend {
            complete_ok: true,
            ..Default::default()
        });
        let handle = dispatch_completion(backend.clone(), make_record("alice", 2, 3));
        assert!(handle.observe().await);
        assert_eq!(backend.calls(), vec!["complete alice 2/3".to_string()]);
    }

    #[tokio::test]
    async fn completion_transport_failure_reports_false() {
        let backend = Arc::new(ScriptedBackend {
            fail_complete: true,
            ..Default::default()
        });
        let handle = dispatch_completion(backend.clone(), make_record("alice", 2, 3));
        assert!(!handle.observe().await, "transport failure must surface as not-ok");
    }
}
