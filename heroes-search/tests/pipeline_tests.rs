use async_trait::async_trait;
use heroes_client::{ClientConfig, HeroClient, MessageLog};
use heroes_model::Hero;
use heroes_search::{HeroSearch, SearchConfig, SearchPipeline};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

/// Records every term it is asked for and answers after a per-term delay.
#[derive(Default)]
struct ScriptedSearch {
    calls: Mutex<Vec<String>>,
    delays: HashMap<String, Duration>,
}

impl ScriptedSearch {
    fn with_delays(delays: &[(&str, u64)]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            delays: delays
                .iter()
                .map(|(term, ms)| (term.to_string(), Duration::from_millis(*ms)))
                .collect(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HeroSearch for ScriptedSearch {
    async fn search_heroes(&self, term: &str) -> Vec<Hero> {
        self.calls.lock().unwrap().push(term.to_string());
        if let Some(delay) = self.delays.get(term) {
            sleep(*delay).await;
        }
        vec![Hero::new(term.len() as i64, term)]
    }
}

fn spawn_pipeline(searcher: &Arc<ScriptedSearch>) -> SearchPipeline {
    SearchPipeline::spawn(searcher.clone(), SearchConfig::default())
}

fn names(batch: &[Hero]) -> Vec<&str> {
    batch.iter().map(|h| h.name.as_str()).collect()
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn search_config_default() {
    let cfg = SearchConfig::default();
    assert_eq!(cfg.debounce_ms, 300);
    assert_eq!(cfg.debounce(), Duration::from_millis(300));
    assert_eq!(cfg.channel_capacity, 16);
}

// ── Debounce ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn burst_collapses_to_last_term() {
    let searcher = Arc::new(ScriptedSearch::default());
    let pipeline = spawn_pipeline(&searcher);
    let mut results = pipeline.subscribe();

    pipeline.push("m");
    pipeline.push("ma");
    pipeline.push("mag");

    let batch = results.next().await.unwrap();
    assert_eq!(names(&batch), vec!["mag"]);
    assert_eq!(searcher.calls(), vec!["mag"]);
}

#[tokio::test(start_paused = true)]
async fn pushes_inside_window_restart_it() {
    let searcher = Arc::new(ScriptedSearch::default());
    let pipeline = spawn_pipeline(&searcher);
    let _results = pipeline.subscribe();

    pipeline.push("b");
    sleep(Duration::from_millis(200)).await;
    pipeline.push("bo");
    sleep(Duration::from_millis(200)).await;
    // 400ms since the first push, but only 200ms since the last one.
    assert!(searcher.calls().is_empty());

    sleep(Duration::from_millis(150)).await;
    assert_eq!(searcher.calls(), vec!["bo"]);
}

#[tokio::test(start_paused = true)]
async fn spaced_terms_each_search_in_order() {
    let searcher = Arc::new(ScriptedSearch::default());
    let pipeline = spawn_pipeline(&searcher);
    let mut results = pipeline.subscribe();

    pipeline.push("a");
    sleep(Duration::from_millis(400)).await;
    pipeline.push("b");

    assert_eq!(names(&results.next().await.unwrap()), vec!["a"]);
    assert_eq!(names(&results.next().await.unwrap()), vec!["b"]);
    assert_eq!(searcher.calls(), vec!["a", "b"]);
    assert_eq!(pipeline.generation(), 2);
}

// ── Change filter ───────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn repeated_term_searches_once() {
    let searcher = Arc::new(ScriptedSearch::default());
    let pipeline = spawn_pipeline(&searcher);
    let mut results = pipeline.subscribe();

    pipeline.push("ma");
    sleep(Duration::from_millis(400)).await;
    pipeline.push("ma");
    sleep(Duration::from_millis(400)).await;

    assert_eq!(searcher.calls(), vec!["ma"]);
    assert!(results.try_next().is_some());
    assert!(results.try_next().is_none());
}

#[tokio::test(start_paused = true)]
async fn edit_that_settles_back_on_previous_term_is_ignored() {
    let searcher = Arc::new(ScriptedSearch::default());
    let pipeline = spawn_pipeline(&searcher);
    let _results = pipeline.subscribe();

    pipeline.push("a");
    sleep(Duration::from_millis(400)).await;
    pipeline.push("ab");
    pipeline.push("a");
    sleep(Duration::from_millis(400)).await;

    assert_eq!(searcher.calls(), vec!["a"]);
    assert_eq!(pipeline.generation(), 1);
}

// ── Supersession ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn late_result_of_superseded_search_is_discarded() {
    let searcher = Arc::new(ScriptedSearch::with_delays(&[("slow", 1_000), ("fast", 10)]));
    let pipeline = spawn_pipeline(&searcher);
    let mut results = pipeline.subscribe();

    pipeline.push("slow");
    sleep(Duration::from_millis(400)).await;
    pipeline.push("fast");

    assert_eq!(names(&results.next().await.unwrap()), vec!["fast"]);

    // "slow" completes at 1300ms and must not reach the subscriber.
    sleep(Duration::from_millis(2_000)).await;
    assert!(results.try_next().is_none());
    assert_eq!(searcher.calls(), vec!["slow", "fast"]);
}

#[tokio::test(start_paused = true)]
async fn earlier_completion_of_superseded_search_is_discarded() {
    let searcher = Arc::new(ScriptedSearch::with_delays(&[("first", 1_000), ("second", 2_000)]));
    let pipeline = spawn_pipeline(&searcher);
    let mut results = pipeline.subscribe();

    pipeline.push("first");
    sleep(Duration::from_millis(400)).await;
    pipeline.push("second");

    // "first" finishes at 1300ms, "second" at 2700ms; only "second" is seen.
    let batch = results.next().await.unwrap();
    assert_eq!(names(&batch), vec!["second"]);
    assert!(results.try_next().is_none());
}

// ── Subscription & lifetime ─────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn terms_without_subscriber_are_dropped() {
    let searcher = Arc::new(ScriptedSearch::default());
    let pipeline = spawn_pipeline(&searcher);

    pipeline.push("a");
    sleep(Duration::from_millis(400)).await;
    assert!(searcher.calls().is_empty());

    let mut results = pipeline.subscribe();
    pipeline.push("a");
    assert_eq!(names(&results.next().await.unwrap()), vec!["a"]);
    assert_eq!(searcher.calls(), vec!["a"]);
}

#[tokio::test(start_paused = true)]
async fn every_subscriber_receives_the_batch() {
    let searcher = Arc::new(ScriptedSearch::default());
    let pipeline = spawn_pipeline(&searcher);
    let mut first = pipeline.subscribe();
    let mut second = pipeline.subscribe();

    pipeline.push("nar");

    assert_eq!(names(&first.next().await.unwrap()), vec!["nar"]);
    assert_eq!(names(&second.next().await.unwrap()), vec!["nar"]);
    assert_eq!(searcher.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_pipeline_stops_searching() {
    let searcher = Arc::new(ScriptedSearch::default());
    let pipeline = spawn_pipeline(&searcher);
    let mut results = pipeline.subscribe();

    pipeline.push("a");
    drop(pipeline);
    sleep(Duration::from_millis(400)).await;

    assert!(searcher.calls().is_empty());
    assert!(results.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn dropping_pipeline_discards_in_flight_search() {
    let searcher = Arc::new(ScriptedSearch::with_delays(&[("slow", 1_000)]));
    let pipeline = spawn_pipeline(&searcher);
    let mut results = pipeline.subscribe();

    pipeline.push("slow");
    sleep(Duration::from_millis(400)).await;
    drop(pipeline);
    sleep(Duration::from_millis(2_000)).await;

    assert_eq!(searcher.calls(), vec!["slow"]);
    assert!(results.try_next().is_none());
}

#[tokio::test(start_paused = true)]
async fn dropping_pipeline_closes_results_despite_pending_search() {
    let searcher = Arc::new(ScriptedSearch::with_delays(&[("hung", 10_000)]));
    let pipeline = spawn_pipeline(&searcher);
    let mut results = pipeline.subscribe();

    pipeline.push("hung");
    sleep(Duration::from_millis(400)).await;
    assert_eq!(searcher.calls(), vec!["hung"]);
    drop(pipeline);

    let closed = tokio::time::timeout(Duration::from_secs(1), results.next()).await;
    assert_eq!(closed.ok(), Some(None));
}

#[tokio::test(start_paused = true)]
async fn slow_subscriber_gets_newest_batch() {
    let searcher = Arc::new(ScriptedSearch::default());
    let config = SearchConfig {
        channel_capacity: 2,
        ..Default::default()
    };
    let pipeline = SearchPipeline::spawn(searcher.clone(), config);
    let mut results = pipeline.subscribe();

    for term in ["a", "b", "c", "d", "e"] {
        pipeline.push(term);
        sleep(Duration::from_millis(400)).await;
    }

    assert_eq!(searcher.calls(), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(names(&results.next().await.unwrap()), vec!["e"]);
    assert!(results.try_next().is_none());
}

#[tokio::test(start_paused = true)]
async fn buffered_batches_collapse_to_newest() {
    let searcher = Arc::new(ScriptedSearch::default());
    let pipeline = spawn_pipeline(&searcher);
    let mut results = pipeline.subscribe();

    pipeline.push("a");
    sleep(Duration::from_millis(400)).await;
    pipeline.push("b");
    sleep(Duration::from_millis(400)).await;

    assert_eq!(names(&results.try_next().unwrap()), vec!["b"]);
    assert!(results.try_next().is_none());
}

// ── With the real client ────────────────────────────────────────

mod with_client {
    use super::*;
    use heroes_client::NotificationSink;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> SearchConfig {
        SearchConfig {
            debounce_ms: 20,
            ..Default::default()
        }
    }

    fn make_client(server: &MockServer) -> (Arc<HeroClient>, Arc<MessageLog>) {
        let log = Arc::new(MessageLog::new());
        let config = ClientConfig {
            base_url: format!("{}/api/heroes", server.uri()),
            ..Default::default()
        };
        let client = HeroClient::new(config, log.clone()).unwrap();
        (Arc::new(client), log)
    }

    #[tokio::test]
    async fn blank_term_yields_empty_batch_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let (client, log) = make_client(&server);
        let pipeline = SearchPipeline::spawn(client, fast_config());
        let mut results = pipeline.subscribe();

        pipeline.push("   ");
        let batch = tokio::time::timeout(Duration::from_secs(5), results.next())
            .await
            .unwrap()
            .unwrap();

        assert!(batch.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn search_goes_through_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/heroes"))
            .and(query_param("name", "mag"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 15, "name": "Magneta" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (client, log) = make_client(&server);
        let pipeline = SearchPipeline::spawn(client, fast_config());
        let mut results = pipeline.subscribe();

        pipeline.push("m");
        pipeline.push("mag");
        let batch = tokio::time::timeout(Duration::from_secs(5), results.next())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(batch, vec![Hero::new(15, "Magneta")]);
        assert_eq!(
            log.current_entries(),
            vec![r#"HeroService: found heroes matching "mag""#]
        );
    }

    #[tokio::test]
    async fn remote_failure_yields_empty_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (client, log) = make_client(&server);
        let pipeline = SearchPipeline::spawn(client, fast_config());
        let mut results = pipeline.subscribe();

        pipeline.push("mag");
        let batch = tokio::time::timeout(Duration::from_secs(5), results.next())
            .await
            .unwrap()
            .unwrap();

        assert!(batch.is_empty());
        assert_eq!(log.len(), 1);
        assert!(log.entries()[0].contains("search_heroes failed"));
    }
}
