// Application shell - owns the input/session state machine
//
// Idle -> Loading -> {Loaded, Failed}, and back to Idle on reset. The session
// is the only place that state changes; renderers get read-only projections.
use crate::client::{FetchError, FetchErrorKind};
use crate::models::AnalysisRecord;
use crate::normalize::normalize;
use crate::view_model::{derive, ViewModel};
use tracing::{debug, warn};

pub const NOT_FOUND_MESSAGE: &str = "User not found. Check the username and try again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to fetch analysis. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading { handle: String },
    Loaded(AnalysisRecord),
    Failed { message: String },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading { .. } => "loading",
            Phase::Loaded(_) => "loaded",
            Phase::Failed { .. } => "failed",
        }
    }
}

/// Stamped handle for one in-flight fetch. Only the ticket of the current
/// generation can settle the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    handle: String,
}

impl Ticket {
    pub fn handle(&self) -> &str {
        &self.handle
    }
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
        }
    }

    /// Start a lookup for `input`.
    ///
    /// Returns `None` when the input is blank or a lookup is already in
    /// flight; submits while loading are ignored rather than superseding the
    /// outstanding request.
    pub fn submit(&mut self, input: &str) -> Option<Ticket> {
        if input.trim().is_empty() {
            return None;
        }
        if self.is_loading() {
            debug!("Ignoring submit while a lookup is in flight");
            return None;
        }

        let handle = normalize(input);
        self.generation += 1;
        debug!(
            "{} -> loading {:?} (generation {})",
            self.phase.name(),
            handle,
            self.generation
        );
        self.phase = Phase::Loading {
            handle: handle.clone(),
        };

        Some(Ticket {
            generation: self.generation,
            handle,
        })
    }

    /// Settle the lookup identified by `ticket`. Returns `false` when the
    /// outcome was stale and dropped.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisRecord, FetchError>,
    ) -> bool {
        if ticket.generation != self.generation || !self.is_loading() {
            debug!(
                "Dropping stale response for {:?} (generation {}, current {})",
                ticket.handle, ticket.generation, self.generation
            );
            return false;
        }

        self.phase = match outcome {
            Ok(record) => {
                debug!("loading -> loaded {:?}", record.handle);
                Phase::Loaded(record)
            }
            Err(e) => {
                warn!("loading -> failed for {:?}: {}", ticket.handle, e);
                Phase::Failed {
                    message: user_message(&e).to_string(),
                }
            }
        };
        true
    }

    /// Return to the input form, discarding any record or error. A lookup
    /// still in flight becomes stale.
    pub fn reset(&mut self) {
        debug!("{} -> idle", self.phase.name());
        self.generation += 1;
        self.phase = Phase::Idle;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn record(&self) -> Option<&AnalysisRecord> {
        match &self.phase {
            Phase::Loaded(record) => Some(record),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Derived fresh on every call
    pub fn view_model(&self) -> Option<ViewModel> {
        self.record().map(derive)
    }
}

/// The single message shown for each error kind
pub fn user_message(error: &FetchError) -> &'static str {
    match error.kind() {
        FetchErrorKind::NotFound => NOT_FOUND_MESSAGE,
        FetchErrorKind::RequestFailed | FetchErrorKind::Network | FetchErrorKind::Parse => {
            GENERIC_FAILURE_MESSAGE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AnalysisClient;
    use crate::models::fixtures::record_json;
    use crate::view_model::Severity;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(name: &str) -> AnalysisRecord {
        serde_json::from_value(record_json(name, 70)).unwrap()
    }

    fn parse_error() -> FetchError {
        FetchError::Parse(serde_json::from_str::<AnalysisRecord>("{").unwrap_err())
    }

    #[test]
    fn test_starts_idle() {
        let session = Session::new();
        assert_eq!(session.phase(), &Phase::Idle);
        assert!(session.record().is_none());
        assert!(session.error_message().is_none());
        assert!(session.view_model().is_none());
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut session = Session::new();
        assert!(session.submit("   ").is_none());
        assert_eq!(session.phase(), &Phase::Idle);
    }

    #[test]
    fn test_submit_normalizes_input() {
        let mut session = Session::new();
        let ticket = session.submit(" https://github.com/torvalds ").unwrap();
        assert_eq!(ticket.handle(), "torvalds");
        assert_eq!(
            session.phase(),
            &Phase::Loading {
                handle: "torvalds".to_string()
            }
        );
    }

    #[test]
    fn test_success_transitions_to_loaded() {
        let mut session = Session::new();
        let ticket = session.submit("octocat").unwrap();
        assert!(session.complete(ticket, Ok(record("octocat"))));
        assert_eq!(session.record().map(|r| r.handle.as_str()), Some("octocat"));
        assert!(session.view_model().is_some());
    }

    #[test]
    fn test_error_kinds_map_to_messages() {
        let cases = [
            (FetchError::NotFound("ghost".to_string()), NOT_FOUND_MESSAGE),
            (FetchError::RequestFailed { status: 500 }, GENERIC_FAILURE_MESSAGE),
            (parse_error(), GENERIC_FAILURE_MESSAGE),
        ];
        for (error, expected) in cases {
            let mut session = Session::new();
            let ticket = session.submit("ghost").unwrap();
            assert!(session.complete(ticket, Err(error)));
            assert_eq!(session.error_message(), Some(expected));
            assert!(session.record().is_none());
        }
    }

    #[test]
    fn test_submit_while_loading_is_ignored() {
        let mut session = Session::new();
        let first = session.submit("octocat").unwrap();
        assert!(session.submit("torvalds").is_none());
        assert!(session.complete(first, Ok(record("octocat"))));
        assert_eq!(session.record().map(|r| r.handle.as_str()), Some("octocat"));
    }

    #[test]
    fn test_resubmit_clears_previous_record_and_error() {
        let mut session = Session::new();
        let ticket = session.submit("octocat").unwrap();
        session.complete(ticket, Ok(record("octocat")));

        let ticket = session.submit("ghost").unwrap();
        assert!(session.record().is_none());
        session.complete(ticket, Err(FetchError::NotFound("ghost".to_string())));
        assert!(session.error_message().is_some());

        let _ticket = session.submit("torvalds").unwrap();
        assert!(session.error_message().is_none());
        assert!(session.is_loading());
    }

    #[test]
    fn test_reset_discards_record() {
        let mut session = Session::new();
        let ticket = session.submit("octocat").unwrap();
        session.complete(ticket, Ok(record("octocat")));
        session.reset();
        assert_eq!(session.phase(), &Phase::Idle);
        assert!(session.record().is_none());
    }

    #[test]
    fn test_stale_response_after_reset_is_dropped() {
        let mut session = Session::new();
        let ticket = session.submit("octocat").unwrap();
        session.reset();
        assert!(!session.complete(ticket, Ok(record("octocat"))));
        assert_eq!(session.phase(), &Phase::Idle);
    }

    #[test]
    fn test_stale_response_does_not_overwrite_newer_lookup() {
        let mut session = Session::new();
        let old = session.submit("octocat").unwrap();
        session.reset();
        let new = session.submit("torvalds").unwrap();

        assert!(!session.complete(old, Ok(record("octocat"))));
        assert!(session.is_loading());
        assert!(session.complete(new, Ok(record("torvalds"))));
        assert_eq!(session.record().map(|r| r.handle.as_str()), Some("torvalds"));
    }

    #[test]
    fn test_ticket_cannot_settle_twice() {
        let mut session = Session::new();
        let ticket = session.submit("octocat").unwrap();
        assert!(session.complete(ticket.clone(), Ok(record("octocat"))));
        assert!(!session.complete(ticket, Err(FetchError::RequestFailed { status: 500 })));
        assert!(session.record().is_some());
    }

    #[tokio::test]
    async fn test_pasted_url_not_found_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/torvalds"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        let client = AnalysisClient::new(Url::parse(&server.uri()).unwrap());

        let mut session = Session::new();
        let ticket = session.submit("https://github.com/torvalds").unwrap();
        let outcome = client.fetch_analysis(ticket.handle()).await;
        assert!(session.complete(ticket, outcome));

        assert_eq!(session.error_message(), Some(NOT_FOUND_MESSAGE));
        assert!(session.record().is_none());
    }

    #[tokio::test]
    async fn test_high_score_with_weak_activity_end_to_end() {
        let server = MockServer::start().await;
        let mut body = record_json("octocat", 92);
        body["breakdown"]["activity"] = serde_json::json!(5);
        Mock::given(method("GET"))
            .and(path("/profile/octocat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let client = AnalysisClient::new(Url::parse(&server.uri()).unwrap());

        let mut session = Session::new();
        let ticket = session.submit("octocat").unwrap();
        let outcome = client.fetch_analysis(ticket.handle()).await;
        assert!(session.complete(ticket, outcome));

        let view = session.view_model().unwrap();
        assert_eq!(view.score_severity, Severity::High);
        let flagged: Vec<&str> = view.underperforming().map(|e| e.label).collect();
        assert_eq!(flagged, vec!["Activity"]);
    }

    #[tokio::test]
    async fn test_reset_during_flight_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/octocat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(record_json("octocat", 92))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = AnalysisClient::new(Url::parse(&server.uri()).unwrap());

        let mut session = Session::new();
        let ticket = session.submit("octocat").unwrap();
        let handle = ticket.handle().to_string();
        let pending = tokio::spawn(async move { client.fetch_analysis(&handle).await });

        // Wait until the backend has the request, then reset under it
        for _ in 0..200 {
            if server.received_requests().await.is_some_and(|r| !r.is_empty()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!pending.is_finished());
        session.reset();

        let outcome = pending.await.unwrap();
        assert!(outcome.is_ok());
        assert!(!session.complete(ticket, outcome));
        assert_eq!(session.phase(), &Phase::Idle);
        assert!(session.record().is_none());
    }
}
