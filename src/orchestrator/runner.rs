//! Step orchestration.
//!
//! Each call to [`Orchestrator::run_step`] is independent: it validates,
//! posts to the step's endpoint, applies the result to the session and
//! always clears the step's loading flag, even when the future is dropped.

use crate::config::Endpoints;
use crate::error::StepError;
use crate::models::{AnalysisStep, ErrorBody, FinderResponse};
use crate::orchestrator::session::Session;
use crate::orchestrator::transport::{HttpReply, Transport};
use futures::future::join_all;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Receives progress notifications while steps run.
pub trait StepObserver: Sync {
    fn started(&self, _step: AnalysisStep) {}
    fn finished(&self, _step: AnalysisStep, _result: &Result<Value, StepError>) {}
    fn skipped(&self, _step: AnalysisStep) {}
}

/// Observer that ignores everything.
impl StepObserver for () {}

/// Clears a step's loading flag when dropped.
struct LoadingGuard<'a> {
    session: &'a Mutex<Session>,
    step: AnalysisStep,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        lock(self.session).finish(self.step);
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs analysis steps against the configured endpoints.
pub struct Orchestrator<T: Transport> {
    endpoints: Endpoints,
    transport: T,
    session: Mutex<Session>,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(endpoints: Endpoints, transport: T) -> Self {
        Self {
            endpoints,
            transport,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn set_brand_name(&self, name: impl Into<String>) {
        lock(&self.session).brand_name = name.into();
    }

    /// Copy of the current session state.
    pub fn snapshot(&self) -> Session {
        lock(&self.session).clone()
    }

    /// Whether the step's control is currently enabled.
    pub fn is_enabled(&self, step: AnalysisStep) -> bool {
        lock(&self.session).control(step).enabled
    }

    /// Run one step, recording any failure in the session's error slot.
    ///
    /// Returns the parsed success payload.
    pub async fn run_step(&self, step: AnalysisStep) -> Option<Value> {
        self.try_run_step(step).await.ok()
    }

    /// Like [`run_step`](Self::run_step), but also hands back the error.
    pub async fn try_run_step(&self, step: AnalysisStep) -> Result<Value, StepError> {
        let brand_name = {
            let mut session = lock(&self.session);
            if let Err(err) = session.begin(step) {
                warn!("{} rejected: {}", step, err);
                session.record_error(step, &err);
                return Err(err);
            }
            session.brand_name.clone()
        };

        let _loading = LoadingGuard {
            session: &self.session,
            step,
        };

        info!("Running {} analysis", step);
        let result = self.execute(step, &brand_name).await;

        match &result {
            Ok(_) => info!("{} analysis complete", step),
            Err(err) => {
                warn!("{} analysis failed: {}", step, err);
                lock(&self.session).record_error(step, err);
            }
        }

        result
    }

    async fn execute(&self, step: AnalysisStep, brand_name: &str) -> Result<Value, StepError> {
        let url = self.endpoints.url_for(step)?;
        let body = step.request_body(brand_name);
        let payload = self.post(&url, &body).await?;

        let needs_refresh = {
            let mut session = lock(&self.session);
            if step.is_finder() {
                let competitors = FinderResponse::competitors_from(&payload)
                    .map_err(|e| StepError::Decode(e.to_string()))?;
                info!("Found {} competitors", competitors.len());
                session.competitors = competitors;
            }
            session.mark_complete(step);
            !step.is_finder() && !session.competitors.is_empty()
        };

        if needs_refresh {
            self.refresh_competitors(brand_name).await;
        }

        Ok(payload)
    }

    /// Re-fetch the competitor list after another step updated it server-side.
    ///
    /// Failures are logged and counted, never put in the error slot.
    async fn refresh_competitors(&self, brand_name: &str) {
        let step = AnalysisStep::Finder;
        let result = match self.endpoints.url_for(step) {
            Ok(url) => self
                .post(&url, &step.request_body(brand_name))
                .await
                .and_then(|payload| {
                    FinderResponse::competitors_from(&payload)
                        .map_err(|e| StepError::Decode(e.to_string()))
                }),
            Err(err) => Err(err),
        };

        let mut session = lock(&self.session);
        match result {
            Ok(competitors) => {
                debug!("Refreshed competitor list ({} entries)", competitors.len());
                session.competitors = competitors;
            }
            Err(err) => {
                warn!("Competitor refresh failed: {}", err);
                session.refresh_failures += 1;
            }
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, StepError> {
        let reply = self
            .transport
            .post_json(url, body)
            .await
            .map_err(StepError::Transport)?;

        if !reply.is_success() {
            return Err(error_from_reply(&reply));
        }

        serde_json::from_str(&reply.body).map_err(|e| StepError::Decode(e.to_string()))
    }

    /// Run steps one after another, finder first.
    ///
    /// Steps whose control is disabled at their turn are skipped.
    pub async fn run_sequence(
        &self,
        steps: &[AnalysisStep],
        observer: &dyn StepObserver,
    ) -> BTreeMap<AnalysisStep, Value> {
        let mut payloads = BTreeMap::new();

        for step in plan(steps) {
            if let Some(payload) = self.run_observed(step, observer).await {
                payloads.insert(step, payload);
            }
        }

        payloads
    }

    /// Run finder first, then every other enabled step at once.
    pub async fn run_concurrently(
        &self,
        steps: &[AnalysisStep],
        observer: &dyn StepObserver,
    ) -> BTreeMap<AnalysisStep, Value> {
        let mut payloads = BTreeMap::new();
        let planned = plan(steps);

        let (finder, rest): (Vec<_>, Vec<_>) =
            planned.into_iter().partition(|step| step.is_finder());

        for step in finder {
            if let Some(payload) = self.run_observed(step, observer).await {
                payloads.insert(step, payload);
            }
        }

        let results = join_all(rest.into_iter().map(|step| async move {
            (step, self.run_observed(step, observer).await)
        }))
        .await;

        for (step, payload) in results {
            if let Some(payload) = payload {
                payloads.insert(step, payload);
            }
        }

        payloads
    }

    /// Finder always runs so a blank brand name lands in the error slot.
    async fn run_observed(&self, step: AnalysisStep, observer: &dyn StepObserver) -> Option<Value> {
        if !step.is_finder() && !self.is_enabled(step) {
            warn!("Skipping {}: control is disabled", step);
            observer.skipped(step);
            return None;
        }

        observer.started(step);
        let result = self.try_run_step(step).await;
        observer.finished(step, &result);
        result.ok()
    }
}

/// Turn a non-2xx reply into a step error.
fn error_from_reply(reply: &HttpReply) -> StepError {
    serde_json::from_str::<ErrorBody>(&reply.body)
        .ok()
        .and_then(|body| body.message())
        .map(|message| StepError::Server {
            status: reply.status,
            message,
        })
        .unwrap_or_else(|| StepError::status_fallback(reply.status, &reply.reason))
}

/// Deduplicate steps and move finder to the front.
pub fn plan(steps: &[AnalysisStep]) -> Vec<AnalysisStep> {
    let mut planned: Vec<AnalysisStep> = Vec::with_capacity(steps.len());
    if steps.contains(&AnalysisStep::Finder) {
        planned.push(AnalysisStep::Finder);
    }
    for &step in steps {
        if !planned.contains(&step) {
            planned.push(step);
        }
    }
    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    const FINDER_URL: &str = "http://backend.test/analyze-competitors";

    /// Replays scripted replies and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<HttpReply, String>>>,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedTransport {
        fn reply(self, status: u16, body: &str) -> Self {
            self.replies.lock().unwrap().push_back(Ok(HttpReply {
                status,
                reason: reason_for(status).to_string(),
                body: body.to_string(),
            }));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(message.to_string()));
            self
        }

        fn requests(&self) -> Vec<(String, Value)> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn reason_for(status: u16) -> &'static str {
        match status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            _ => "",
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_json(&self, url: &str, body: &Value) -> Result<HttpReply, String> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), body.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted reply".to_string()))
        }
    }

    /// Holds every request until released.
    struct GatedTransport {
        gate: Notify,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn post_json(&self, _url: &str, _body: &Value) -> Result<HttpReply, String> {
            *self.calls.lock().unwrap() += 1;
            self.gate.notified().await;
            Ok(HttpReply {
                status: 200,
                reason: "OK".to_string(),
                body: r#"{"competitors":[{"competitor_name":"Acme"}]}"#.to_string(),
            })
        }
    }

    fn all_endpoints() -> Endpoints {
        let mut config = Config::default();
        config.endpoints.base_url = Some("http://backend.test".to_string());
        Endpoints::resolve(&config, |_| None)
    }

    fn orchestrator(transport: ScriptedTransport) -> Orchestrator<ScriptedTransport> {
        let orchestrator = Orchestrator::new(all_endpoints(), transport);
        orchestrator.set_brand_name("Loyalty Co");
        orchestrator
    }

    fn with_competitors(transport: ScriptedTransport) -> Orchestrator<ScriptedTransport> {
        let transport = transport.reply(200, r#"{"competitors":[{"competitor_name":"Acme"}]}"#);
        // Move the finder reply to the front of the queue.
        transport.replies.lock().unwrap().rotate_right(1);
        let orchestrator = orchestrator(transport);
        assert!(tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder)).is_some());
        orchestrator
    }

    #[test]
    fn test_unconfigured_step_makes_no_call() {
        let orchestrator = Orchestrator::new(
            Endpoints::resolve(&Config::default(), |_| None),
            ScriptedTransport::default(),
        );
        orchestrator.set_brand_name("Loyalty Co");

        for step in AnalysisStep::ALL {
            let result = tokio_test::block_on(orchestrator.try_run_step(step));
            assert!(matches!(result, Err(StepError::NotConfigured { .. })));

            let session = orchestrator.snapshot();
            assert!(session.error.as_deref().unwrap().contains("not configured"));
            assert!(!session.is_loading(step));
        }
        assert!(orchestrator.transport.requests().is_empty());
    }

    #[test]
    fn test_blank_brand_name_is_rejected() {
        let orchestrator = orchestrator(ScriptedTransport::default());
        orchestrator.set_brand_name("   ");

        let payload = tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder));
        assert!(payload.is_none());

        let session = orchestrator.snapshot();
        assert_eq!(
            session.error.as_deref(),
            Some("Error in finder: Please enter a brand name")
        );
        assert!(!session.is_loading(AnalysisStep::Finder));
        assert!(orchestrator.transport.requests().is_empty());
    }

    #[test]
    fn test_finder_success_replaces_competitors() {
        let transport =
            ScriptedTransport::default().reply(200, r#"{"competitors":[{"competitor_name":"Acme"}]}"#);
        let orchestrator = orchestrator(transport);

        let payload = tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder));
        assert!(payload.is_some());

        let session = orchestrator.snapshot();
        assert_eq!(session.competitors.len(), 1);
        assert_eq!(session.competitors[0].competitor_name, "Acme");
        assert!(session.is_complete(AnalysisStep::Finder));
        assert!(!session.is_loading(AnalysisStep::Finder));
        assert!(session.error.is_none());

        let requests = orchestrator.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, FINDER_URL);
        assert_eq!(requests[0].1, json!({ "brand_name": "Loyalty Co" }));
    }

    #[test]
    fn test_finder_without_competitors_field() {
        let transport = ScriptedTransport::default().reply(200, r#"{"status":"ok"}"#);
        let orchestrator = orchestrator(transport);

        tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder));
        let session = orchestrator.snapshot();
        assert!(session.competitors.is_empty());
        assert!(session.is_complete(AnalysisStep::Finder));
    }

    #[test]
    fn test_step_success_triggers_one_refresh() {
        let transport = ScriptedTransport::default()
            .reply(200, r#"{"status":"updated"}"#)
            .reply(
                200,
                r#"{"competitors":[{"competitor_name":"Acme","competitor_rewards_benefits":"Points"}]}"#,
            );
        let orchestrator = with_competitors(transport);

        let payload = tokio_test::block_on(orchestrator.run_step(AnalysisStep::Rewards));
        assert_eq!(payload, Some(json!({ "status": "updated" })));

        let requests = orchestrator.transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].0, "http://backend.test/analyze-rewards");
        assert_eq!(requests[2].0, FINDER_URL);

        let session = orchestrator.snapshot();
        assert_eq!(
            session.competitors[0].competitor_rewards_benefits.as_deref(),
            Some("Points")
        );
        assert!(session.is_complete(AnalysisStep::Rewards));
    }

    #[test]
    fn test_failed_refresh_is_swallowed() {
        let transport = ScriptedTransport::default()
            .reply(200, r#"{"status":"updated"}"#)
            .fail("Cannot connect to http://backend.test/analyze-competitors");
        let orchestrator = with_competitors(transport);
        let before = orchestrator.snapshot().competitors;

        let payload = tokio_test::block_on(orchestrator.run_step(AnalysisStep::Rewards));
        assert!(payload.is_some());

        let session = orchestrator.snapshot();
        assert_eq!(session.competitors, before);
        assert!(session.error.is_none());
        assert_eq!(session.refresh_failures, 1);
        assert!(session.is_complete(AnalysisStep::Rewards));
        assert_eq!(orchestrator.transport.requests().len(), 3);
    }

    #[test]
    fn test_no_refresh_without_competitors() {
        let transport = ScriptedTransport::default().reply(200, r#"{"status":"updated"}"#);
        let orchestrator = orchestrator(transport);

        tokio_test::block_on(orchestrator.run_step(AnalysisStep::Summarizer));

        let requests = orchestrator.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "http://backend.test/update-all");
        assert_eq!(requests[0].1, json!({}));
    }

    #[test]
    fn test_detail_message_is_used_verbatim() {
        let transport = ScriptedTransport::default().reply(404, r#"{"detail":"brand not found"}"#);
        let orchestrator = orchestrator(transport);

        tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder));

        let session = orchestrator.snapshot();
        assert_eq!(
            session.error.as_deref(),
            Some("Error in finder: brand not found")
        );
        assert!(!session.is_complete(AnalysisStep::Finder));
        assert!(!session.is_loading(AnalysisStep::Finder));
    }

    #[test]
    fn test_unparseable_error_body_includes_status() {
        let transport = ScriptedTransport::default().reply(502, "<html>upstream</html>");
        let orchestrator = orchestrator(transport);

        let result = tokio_test::block_on(orchestrator.try_run_step(AnalysisStep::Finder));
        assert!(matches!(result, Err(StepError::Server { status: 502, .. })));

        let error = orchestrator.snapshot().error.unwrap();
        assert!(error.starts_with("Error in finder: "));
        assert!(error.contains("502"));
    }

    #[test]
    fn test_failure_keeps_previous_state() {
        let transport = ScriptedTransport::default().reply(500, r#"{"detail":"model overloaded"}"#);
        let orchestrator = with_competitors(transport);
        let before = orchestrator.snapshot();

        tokio_test::block_on(orchestrator.run_step(AnalysisStep::Swot));

        let after = orchestrator.snapshot();
        assert_eq!(after.competitors, before.competitors);
        assert!(!after.is_complete(AnalysisStep::Swot));
        assert!(after.is_complete(AnalysisStep::Finder));
        assert_eq!(after.error.as_deref(), Some("Error in swot: model overloaded"));
        // No refresh after a failed step.
        assert_eq!(orchestrator.transport.requests().len(), 2);
    }

    #[test]
    fn test_transport_failure_resets_loading() {
        let transport = ScriptedTransport::default().fail("Request timed out after 5s");
        let orchestrator = orchestrator(transport);

        tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder));

        let session = orchestrator.snapshot();
        assert_eq!(
            session.error.as_deref(),
            Some("Error in finder: Request timed out after 5s")
        );
        assert!(!session.is_loading(AnalysisStep::Finder));
    }

    #[test]
    fn test_invalid_success_body_is_decode_error() {
        let transport = ScriptedTransport::default().reply(200, "not json");
        let orchestrator = orchestrator(transport);

        let result = tokio_test::block_on(orchestrator.try_run_step(AnalysisStep::Finder));
        assert!(matches!(result, Err(StepError::Decode(_))));
        assert!(!orchestrator.snapshot().is_complete(AnalysisStep::Finder));
    }

    #[test]
    fn test_new_attempt_clears_error() {
        let transport = ScriptedTransport::default()
            .reply(404, r#"{"detail":"brand not found"}"#)
            .reply(200, r#"{"competitors":[]}"#);
        let orchestrator = orchestrator(transport);

        tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder));
        assert!(orchestrator.snapshot().error.is_some());

        tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder));
        assert!(orchestrator.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_invocation_is_rejected_while_in_flight() {
        let orchestrator = Orchestrator::new(
            all_endpoints(),
            GatedTransport {
                gate: Notify::new(),
                calls: Mutex::new(0),
            },
        );
        orchestrator.set_brand_name("Loyalty Co");

        let first = orchestrator.run_step(AnalysisStep::Finder);
        let second = async {
            tokio::task::yield_now().await;
            assert!(orchestrator.snapshot().is_loading(AnalysisStep::Finder));
            let result = orchestrator.try_run_step(AnalysisStep::Finder).await;
            orchestrator.transport.gate.notify_one();
            result
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_some());
        assert_eq!(second, Err(StepError::AlreadyRunning));
        assert_eq!(*orchestrator.transport.calls.lock().unwrap(), 1);

        let session = orchestrator.snapshot();
        assert!(!session.is_loading(AnalysisStep::Finder));
        assert_eq!(session.competitors.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_step_resets_loading() {
        let orchestrator = Orchestrator::new(
            all_endpoints(),
            GatedTransport {
                gate: Notify::new(),
                calls: Mutex::new(0),
            },
        );
        orchestrator.set_brand_name("Loyalty Co");

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            orchestrator.run_step(AnalysisStep::Finder),
        )
        .await;
        assert!(timed_out.is_err());
        assert!(!orchestrator.snapshot().is_loading(AnalysisStep::Finder));
    }

    #[test]
    fn test_plan_moves_finder_first() {
        let planned = plan(&[
            AnalysisStep::Swot,
            AnalysisStep::Finder,
            AnalysisStep::Swot,
            AnalysisStep::Rewards,
        ]);
        assert_eq!(
            planned,
            vec![AnalysisStep::Finder, AnalysisStep::Swot, AnalysisStep::Rewards]
        );
    }

    #[test]
    fn test_sequence_skips_disabled_steps() {
        let transport = ScriptedTransport::default().reply(404, r#"{"detail":"brand not found"}"#);
        let orchestrator = orchestrator(transport);

        let payloads = tokio_test::block_on(
            orchestrator.run_sequence(&[AnalysisStep::Swot, AnalysisStep::Finder], &()),
        );

        assert!(payloads.is_empty());
        // Finder failed, so swot never became enabled.
        assert_eq!(orchestrator.transport.requests().len(), 1);
        assert_eq!(
            orchestrator.snapshot().error.as_deref(),
            Some("Error in finder: brand not found")
        );
    }

    #[test]
    fn test_sequence_with_blank_brand_reports_finder_error() {
        let transport = ScriptedTransport::default()
            .reply(200, r#"{"competitors":[{"competitor_name":"Acme"}]}"#);
        let orchestrator = orchestrator(transport);
        orchestrator.set_brand_name("  ");

        let payloads = tokio_test::block_on(orchestrator.run_sequence(&AnalysisStep::ALL, &()));

        assert!(payloads.is_empty());
        let session = orchestrator.snapshot();
        assert_eq!(
            session.error.as_deref(),
            Some("Error in finder: Please enter a brand name")
        );
        assert!(session.completed_steps().is_empty());
        assert!(orchestrator.transport.requests().is_empty());
    }

    #[test]
    fn test_concurrent_run_with_blank_brand_reports_finder_error() {
        let orchestrator = orchestrator(ScriptedTransport::default());
        orchestrator.set_brand_name("");

        let payloads = tokio_test::block_on(orchestrator.run_concurrently(&AnalysisStep::ALL, &()));

        assert!(payloads.is_empty());
        assert_eq!(
            orchestrator.snapshot().error.as_deref(),
            Some("Error in finder: Please enter a brand name")
        );
        assert!(orchestrator.transport.requests().is_empty());
    }

    #[test]
    fn test_detail_blank_falls_back_to_status() {
        let transport = ScriptedTransport::default().reply(404, r#"{"detail":"  "}"#);
        let orchestrator = orchestrator(transport);

        tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder));

        assert_eq!(
            orchestrator.snapshot().error.as_deref(),
            Some("Error in finder: Request failed with status 404 Not Found")
        );
    }

    #[test]
    fn test_finder_keeps_competitors_with_non_text_fields() {
        let transport = ScriptedTransport::default().reply(
            200,
            r#"{"competitors":[{"competitor_name":"Acme","competitor_strength":["Scale","Brand"]},{"competitor_name":"Globex"}]}"#,
        );
        let orchestrator = orchestrator(transport);

        tokio_test::block_on(orchestrator.run_step(AnalysisStep::Finder));

        let session = orchestrator.snapshot();
        assert!(session.error.is_none());
        assert_eq!(session.competitors.len(), 2);
        assert_eq!(
            session.competitors[0].competitor_strength.as_deref(),
            Some(r#"["Scale","Brand"]"#)
        );
    }

    #[test]
    fn test_concurrent_run_collects_payloads() {
        let transport = ScriptedTransport::default()
            .reply(200, r#"{"competitors":[{"competitor_name":"Acme"}]}"#)
            .reply(200, r#"{"step":"a"}"#)
            .reply(200, r#"{"competitors":[{"competitor_name":"Acme"}]}"#)
            .reply(200, r#"{"step":"b"}"#)
            .reply(200, r#"{"competitors":[{"competitor_name":"Acme"}]}"#);
        let orchestrator = orchestrator(transport);

        let payloads = tokio_test::block_on(orchestrator.run_concurrently(
            &[AnalysisStep::Positioning, AnalysisStep::Feedback, AnalysisStep::Finder],
            &(),
        ));

        assert_eq!(payloads.len(), 3);
        let session = orchestrator.snapshot();
        assert!(session.is_complete(AnalysisStep::Positioning));
        assert!(session.is_complete(AnalysisStep::Feedback));
        assert_eq!(session.competitors.len(), 1);
        assert_eq!(orchestrator.transport.requests().len(), 5);
    }
}
