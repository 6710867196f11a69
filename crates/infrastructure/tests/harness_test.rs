//! Checks that the bundled `harness/` directory is a consistent setup:
//! every profile resolves, every scenario compiles and every fixture a
//! scenario names exists and is valid JSON.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::PathBuf;
use std::sync::Arc;

use covenant_application::{ConfigResolver, FixtureSource, RunSelection, prepare_run};
use covenant_domain::{ComparisonMode, Expectation};
use covenant_infrastructure::persistence::SUITES_DIR;
use covenant_infrastructure::{FileConfigSource, FileFixtureSource, SuiteLoader, TokioFileSystem};
use pretty_assertions::assert_eq;

fn harness_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../harness")
}

#[tokio::test]
async fn test_demo_harness_prepares() {
    let root = harness_dir();
    let resolver = ConfigResolver::new(Arc::new(FileConfigSource::new(&root)));
    let suite = SuiteLoader::new(TokioFileSystem::new())
        .load(&root.join(SUITES_DIR))
        .await
        .unwrap();

    let run = prepare_run(&resolver, &suite, &RunSelection::default())
        .await
        .unwrap();

    assert_eq!(run.config.profile.name, "local");
    assert_eq!(run.config.base_uri, "http://localhost:8080");
    assert_eq!(run.dataset.name, "local");
    assert_eq!(run.scenarios.len(), 8);

    let utf8 = run
        .scenarios
        .iter()
        .find(|s| s.name == "city_getUsersByCityMultiByteUTF8_OK")
        .unwrap();
    assert_eq!(utf8.path_params["city"], "Ḩakkārī");

    let users = run
        .scenarios
        .iter()
        .find(|s| s.name == "users_getAll_OK")
        .unwrap();
    assert_eq!(
        users.checks[0].mode,
        ComparisonMode::IsArrayWithMinSize { min: 1000 }
    );
}

#[tokio::test]
async fn test_dev_profile_resolves() {
    let root = harness_dir();
    let resolver = ConfigResolver::new(Arc::new(FileConfigSource::new(&root)));

    let config = resolver.resolve("dev").await.unwrap();
    assert_eq!(config.base_uri, "https://bpdts-test-app.herokuapp.com:443");
    assert_eq!(config.endpoints.len(), 4);
}

#[tokio::test]
async fn test_demo_fixtures_exist_and_parse() {
    let root = harness_dir();
    let resolver = ConfigResolver::new(Arc::new(FileConfigSource::new(&root)));
    let suite = SuiteLoader::new(TokioFileSystem::new())
        .load(&root.join(SUITES_DIR))
        .await
        .unwrap();
    let run = prepare_run(&resolver, &suite, &RunSelection::default())
        .await
        .unwrap();
    let fixtures = FileFixtureSource::for_dataset(&root, &run.dataset.name);

    let mut checked = 0;
    for scenario in &run.scenarios {
        for check in &scenario.checks {
            let Some(Expectation::Fixture(name)) = &check.expected else {
                continue;
            };
            let bytes = fixtures
                .load(name)
                .await
                .unwrap_or_else(|e| panic!("{}: {e}", scenario.name));
            serde_json::from_slice::<serde_json::Value>(&bytes)
                .unwrap_or_else(|e| panic!("{name}: {e}"));
            checked += 1;
        }
    }
    assert_eq!(checked, 5);
}
