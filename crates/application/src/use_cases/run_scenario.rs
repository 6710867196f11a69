//! Run one scenario through `Built -> Sent -> Validated -> Passed | Failed`.

use std::sync::Arc;
use std::time::Instant;

use covenant_domain::{
    ComparisonOutcome, Failure, ResponseSpec, Scenario, ScenarioReport, ScenarioState,
};
use tracing::{debug, info, warn};

use crate::comparator::ResponseComparator;
use crate::error::{JsonSide, ScenarioError};
use crate::ports::Transport;
use crate::request_builder::RequestBuilder;

/// Executes scenarios one at a time.
///
/// Holds only shared read-only state, so one runner can serve many
/// concurrent scenarios.
pub struct ScenarioRunner {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
    comparator: ResponseComparator,
}

#[derive(Default)]
struct Progress {
    trail: Vec<ScenarioState>,
    checks_passed: usize,
}

impl Progress {
    fn advance(&mut self, next: ScenarioState) {
        debug_assert!(
            self.trail.last().is_none_or(|s| s.can_transition_to(next)),
            "illegal scenario transition to {next}"
        );
        self.trail.push(next);
    }
}

impl ScenarioRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(
        builder: RequestBuilder,
        transport: Arc<dyn Transport>,
        comparator: ResponseComparator,
    ) -> Self {
        Self {
            builder,
            transport,
            comparator,
        }
    }

    /// Runs `scenario` and reports the outcome. Never returns an error:
    /// every scenario-time failure is recorded in the report.
    pub async fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let started = Instant::now();
        info!("==== Begin Scenario: {} ====", scenario.name);

        let mut progress = Progress::default();
        let result = self.execute(scenario, &mut progress).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let report = match result {
            Ok(()) => {
                progress.advance(ScenarioState::Passed);
                ScenarioReport::passed(&scenario.name, progress.checks_passed, duration_ms)
            }
            Err(failure) => {
                progress.advance(ScenarioState::Failed);
                let mode = failure
                    .mode
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                warn!(
                    scenario = %scenario.name,
                    kind = %failure.kind,
                    mode = %mode,
                    "{}",
                    failure.message
                );
                ScenarioReport::failed(
                    &scenario.name,
                    failure,
                    progress.checks_passed,
                    duration_ms,
                )
            }
        }
        .with_trail(progress.trail);

        info!("==== End Scenario: {} ({}) ====", scenario.name, report.state);
        report
    }

    async fn execute(&self, scenario: &Scenario, progress: &mut Progress) -> Result<(), Failure> {
        let request = self
            .builder
            .build_with_headers(
                &scenario.endpoint,
                &scenario.path_params,
                &scenario.query_params,
                &scenario.headers,
            )
            .map_err(|e| failure(&e))?;
        progress.advance(ScenarioState::Built);
        info!("{}: {} {:?}", scenario.name, request.path(), scenario.path_params);
        debug!(url = %request.url, headers = ?request.headers, "Sending request");

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| failure(&ScenarioError::from(e)))?;
        progress.advance(ScenarioState::Sent);
        debug!(
            status = response.status,
            content_type = response.content_type.as_deref().unwrap_or(""),
            elapsed_ms = u64::try_from(response.duration.as_millis()).unwrap_or(u64::MAX),
            body = %response.body_text(),
            "Received response"
        );

        validate(scenario, &response).map_err(|e| failure(&e))?;
        progress.advance(ScenarioState::Validated);

        let Some(first) = scenario.checks.first() else {
            return Ok(());
        };
        // Bodies must be strict UTF-8 before any check sees them.
        let body = response.body_utf8().map_err(|e| {
            let error = ScenarioError::MalformedJson {
                side: JsonSide::Actual,
                message: e.to_string(),
            };
            failure(&error).with_mode(first.mode.clone())
        })?;
        for check in &scenario.checks {
            match self.comparator.compare(&check.request(body)).await {
                Ok(ComparisonOutcome::Match) => progress.checks_passed += 1,
                Ok(ComparisonOutcome::Mismatch(diff)) => {
                    return Err(Failure::new("Mismatch", diff.to_string())
                        .with_mode(check.mode.clone())
                        .with_diff(diff));
                }
                Err(e) => return Err(failure(&e).with_mode(check.mode.clone())),
            }
        }
        Ok(())
    }
}

/// Status first, then content type. Body checks never run on a failure here.
fn validate(scenario: &Scenario, response: &ResponseSpec) -> Result<(), ScenarioError> {
    if response.status != scenario.expected_status {
        return Err(ScenarioError::UnexpectedStatus {
            expected: scenario.expected_status,
            actual: response.status,
        });
    }
    if let Some(expected) = &scenario.expected_content_type {
        if !response.has_media_type(expected) {
            return Err(ScenarioError::UnexpectedContentType {
                expected: expected.clone(),
                actual: response.content_type.clone(),
            });
        }
    }
    Ok(())
}

fn failure(error: &ScenarioError) -> Failure {
    Failure::new(error.kind(), error.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use covenant_domain::{
        APPLICATION_JSON, Check, ComparisonMode, EndpointSpec, Expectation, PathTemplate, Profile,
        RequestDescriptor, ResolvedConfig,
    };
    use pretty_assertions::assert_eq;

    use crate::fixture_store::FixtureStore;
    use crate::fixture_store::tests::MapFixtureSource;
    use crate::ports::TransportError;

    /// Transport that answers by request path and records every request.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        pub(crate) responses: HashMap<String, Result<ResponseSpec, TransportError>>,
        pub(crate) sent: Mutex<Vec<RequestDescriptor>>,
    }

    impl ScriptedTransport {
        pub(crate) fn respond(mut self, path: &str, status: u16, content_type: &str, body: &str) -> Self {
            let content_type = (!content_type.is_empty()).then(|| content_type.to_string());
            self.responses.insert(
                path.to_string(),
                Ok(ResponseSpec::new(status, content_type, body, Duration::from_millis(3))),
            );
            self
        }

        pub(crate) fn fail(mut self, path: &str, error: TransportError) -> Self {
            self.responses.insert(path.to_string(), Err(error));
            self
        }

        pub(crate) fn sent_paths(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.path().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &RequestDescriptor) -> Result<ResponseSpec, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            self.responses
                .get(request.path())
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Connection("no route".to_string())))
        }
    }

    pub(crate) fn config() -> ResolvedConfig {
        let endpoints = [
            ("user", "/user/{userId}"),
            ("users", "/users"),
            ("city", "/city/{city}/users"),
            ("instructions", "/instructions"),
        ]
        .into_iter()
        .map(|(name, path)| EndpointSpec::new(name, PathTemplate::parse(path).unwrap()));
        ResolvedConfig::new(Profile::new("local", "http", "localhost", 8080), endpoints)
    }

    pub(crate) fn runner(transport: Arc<ScriptedTransport>, fixtures: MapFixtureSource) -> ScenarioRunner {
        ScenarioRunner::new(
            RequestBuilder::new(Arc::new(config())),
            transport,
            ResponseComparator::new(Arc::new(FixtureStore::new(Arc::new(fixtures)))),
        )
    }

    fn user_fixture() -> MapFixtureSource {
        MapFixtureSource::default().with("user_12.json", r#"{"id":12,"first_name":"Ann"}"#)
    }

    fn user_scenario() -> Scenario {
        Scenario::new("user_validUserId_OK", "user")
            .with_path_param("userId", "12")
            .with_check(
                Check::new(ComparisonMode::FullEquality)
                    .expecting(Expectation::fixture("user_12.json")),
            )
    }

    #[tokio::test]
    async fn test_valid_user_passes() {
        let transport = Arc::new(ScriptedTransport::default().respond(
            "/user/12",
            200,
            "application/json; charset=utf-8",
            r#"{"first_name":"Ann","id":12}"#,
        ));
        let report = runner(Arc::clone(&transport), user_fixture())
            .run(&user_scenario())
            .await;

        assert!(report.is_passed(), "{report:?}");
        assert_eq!(report.checks_passed, 1);
        assert_eq!(
            report.trail,
            vec![
                ScenarioState::Built,
                ScenarioState::Sent,
                ScenarioState::Validated,
                ScenarioState::Passed,
            ]
        );
        assert_eq!(transport.sent_paths(), vec!["/user/12"]);
    }

    #[tokio::test]
    async fn test_not_found_skips_body() {
        let transport = Arc::new(ScriptedTransport::default().respond(
            "/user/9999999",
            404,
            "text/html",
            "<h1>Not Found</h1>",
        ));
        let scenario = Scenario::new("user_userIdNotFound_NotFound", "user")
            .with_path_param("userId", "9999999")
            .expecting_status(404);

        let report = runner(transport, MapFixtureSource::default()).run(&scenario).await;
        assert!(report.is_passed());
        assert_eq!(report.checks_passed, 0);
    }

    #[tokio::test]
    async fn test_unexpected_status_skips_checks() {
        let transport = Arc::new(ScriptedTransport::default().respond(
            "/user/12",
            500,
            APPLICATION_JSON,
            "{}",
        ));
        let report = runner(transport, user_fixture()).run(&user_scenario()).await;

        assert_eq!(report.state, ScenarioState::Failed);
        let failure = report.failure.unwrap();
        assert_eq!(failure.kind, "UnexpectedStatus");
        assert_eq!(failure.mode, None);
        assert_eq!(
            report.trail,
            vec![ScenarioState::Built, ScenarioState::Sent, ScenarioState::Failed]
        );
    }

    #[tokio::test]
    async fn test_unexpected_content_type() {
        let transport = Arc::new(ScriptedTransport::default().respond(
            "/user/12",
            200,
            "text/plain",
            r#"{"id":12,"first_name":"Ann"}"#,
        ));
        let report = runner(transport, user_fixture()).run(&user_scenario()).await;
        assert_eq!(report.failure.unwrap().kind, "UnexpectedContentType");
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let transport = Arc::new(
            ScriptedTransport::default().fail("/user/12", TransportError::Timeout { timeout_ms: 50 }),
        );
        let report = runner(Arc::clone(&transport), user_fixture())
            .run(&user_scenario())
            .await;

        assert_eq!(report.failure.unwrap().kind, "TransportFailure");
        assert_eq!(transport.sent_paths().len(), 1);
        assert_eq!(report.trail, vec![ScenarioState::Built, ScenarioState::Failed]);
    }

    #[tokio::test]
    async fn test_missing_path_param_never_sends() {
        let transport = Arc::new(ScriptedTransport::default());
        let scenario = Scenario::new("user_noId", "user");

        let report = runner(Arc::clone(&transport), MapFixtureSource::default())
            .run(&scenario)
            .await;
        assert_eq!(report.failure.unwrap().kind, "MissingPathParam");
        assert!(transport.sent_paths().is_empty());
        assert_eq!(report.trail, vec![ScenarioState::Failed]);
    }

    #[tokio::test]
    async fn test_fail_fast_on_first_mismatch() {
        let body = serde_json::Value::Array(vec![serde_json::json!({"id": 1}); 999]).to_string();
        let transport =
            Arc::new(ScriptedTransport::default().respond("/users", 200, APPLICATION_JSON, &body));
        let scenario = Scenario::new("users_getAll_OK", "users")
            .with_check(Check::new(ComparisonMode::IsArrayExact { size: 999 }))
            .with_check(Check::new(ComparisonMode::IsArrayWithMinSize { min: 1000 }))
            .with_check(
                Check::new(ComparisonMode::ArrayElementEquality { index: 0 })
                    .expecting(Expectation::fixture("missing.json")),
            );

        let report = runner(transport, MapFixtureSource::default()).run(&scenario).await;

        assert_eq!(report.checks_passed, 1);
        let failure = report.failure.unwrap();
        assert_eq!(failure.kind, "Mismatch");
        assert_eq!(
            failure.mode,
            Some(ComparisonMode::IsArrayWithMinSize { min: 1000 })
        );
        assert_eq!(failure.diff.unwrap().message, "999 < 1000");
    }

    #[tokio::test]
    async fn test_comparison_error_records_mode() {
        let transport =
            Arc::new(ScriptedTransport::default().respond("/users", 200, APPLICATION_JSON, "[]"));
        let scenario = Scenario::new("users_element", "users").with_check(
            Check::new(ComparisonMode::ArrayElementEquality { index: 0 })
                .expecting(Expectation::literal(serde_json::json!({}))),
        );

        let report = runner(transport, MapFixtureSource::default()).run(&scenario).await;
        let failure = report.failure.unwrap();
        assert_eq!(failure.kind, "IndexOutOfRange");
        assert_eq!(
            failure.mode,
            Some(ComparisonMode::ArrayElementEquality { index: 0 })
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_body_is_malformed() {
        let mut transport = ScriptedTransport::default();
        transport.responses.insert(
            "/users".to_string(),
            Ok(ResponseSpec::new(
                200,
                Some(APPLICATION_JSON.to_string()),
                b"[\"\xff\"]".to_vec(),
                Duration::from_millis(3),
            )),
        );
        let scenario = Scenario::new("users_replacementChar", "users").with_check(
            Check::new(ComparisonMode::FullEquality)
                .expecting(Expectation::literal(serde_json::json!(["\u{fffd}"]))),
        );

        let report = runner(Arc::new(transport), MapFixtureSource::default())
            .run(&scenario)
            .await;

        assert_eq!(report.state, ScenarioState::Failed);
        assert_eq!(report.checks_passed, 0);
        let failure = report.failure.unwrap();
        assert_eq!(failure.kind, "MalformedJson");
        assert!(failure.message.starts_with("actual body"), "{}", failure.message);
        assert_eq!(failure.mode, Some(ComparisonMode::FullEquality));
        assert_eq!(
            report.trail,
            vec![
                ScenarioState::Built,
                ScenarioState::Sent,
                ScenarioState::Validated,
                ScenarioState::Failed,
            ]
        );
    }

    #[tokio::test]
    async fn test_city_without_users_is_empty() {
        let transport = Arc::new(ScriptedTransport::default().respond(
            "/city/Atlantis/users",
            200,
            APPLICATION_JSON,
            "[]",
        ));
        let scenario = Scenario::new("city_cityNoUsers_OK", "city")
            .with_path_param("city", "Atlantis")
            .with_check(Check::new(ComparisonMode::IsEmpty));

        let report = runner(transport, MapFixtureSource::default()).run(&scenario).await;
        assert!(report.is_passed());
    }

    #[tokio::test]
    async fn test_utf8_city_round_trips_through_transport() {
        let city = "Zürich-Kraków-東京 A";
        let transport = Arc::new(ScriptedTransport::default());
        let scenario = Scenario::new("city_cityUTF8_OK", "city").with_path_param("city", city);

        let _ = runner(Arc::clone(&transport), MapFixtureSource::default())
            .run(&scenario)
            .await;

        let sent = transport.sent.lock().unwrap();
        let segment = sent[0].path().split('/').nth(2).unwrap();
        assert!(segment.is_ascii());
        assert_eq!(urlencoding::decode(segment).unwrap(), city);
    }
}
