//! End-to-end cache-aside behavior against a mock scoring service.

use std::sync::Arc;
use std::time::Duration;

use creditlens::{
    ArtifactHandle, ArtifactRequest, ArtifactStore, CachingFetcher, CreditError, FeatureCatalog,
    HttpRemoteClient, Session,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

fn catalog() -> Arc<FeatureCatalog> {
    Arc::new(
        FeatureCatalog::new(
            vec![
                "AGE".to_string(),
                "EDUCATION".to_string(),
                "INCOME".to_string(),
            ],
            vec!["EDUCATION".to_string()],
            vec!["AGE".to_string(), "INCOME".to_string()],
        )
        .unwrap(),
    )
}

fn fetcher(server: &MockServer, dir: &std::path::Path) -> CachingFetcher<HttpRemoteClient> {
    CachingFetcher::new(
        catalog(),
        ArtifactStore::open(dir).unwrap(),
        HttpRemoteClient::new(server.uri()),
    )
}

#[tokio::test]
async fn sequential_requests_fetch_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/global_impact"))
        .and(query_param("max_feat", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let f = fetcher(&server, dir.path());
    let req = ArtifactRequest::GlobalImpact { max_features: 20 };

    let first = f.get(&req).await.unwrap();
    let second = f.get(&req).await.unwrap();

    assert_eq!(first, second);
    let path = first.path().unwrap();
    assert_eq!(std::fs::read(path).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn symmetric_bivariate_requests_share_one_blob() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graph_bivar"))
        .and(query_param("feature_1", "EDUCATION"))
        .and(query_param("feature_2", "AGE"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let f = fetcher(&server, dir.path());

    let first = f
        .get(&ArtifactRequest::BivariatePair {
            feature_a: "EDUCATION".to_string(),
            feature_b: "AGE".to_string(),
        })
        .await
        .unwrap();
    let second = f
        .get(&ArtifactRequest::BivariatePair {
            feature_a: "AGE".to_string(),
            feature_b: "EDUCATION".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(f.store().entries().unwrap().len(), 1);
}

#[tokio::test]
async fn gauge_is_always_live_and_never_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/100001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"score": 0.62})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let f = fetcher(&server, dir.path());
    let req = ArtifactRequest::Gauge { client_id: 100001 };

    assert_eq!(f.get(&req).await.unwrap(), ArtifactHandle::Score(0.62));
    assert_eq!(f.get(&req).await.unwrap(), ArtifactHandle::Score(0.62));
    assert!(f.store().entries().unwrap().is_empty());
}

#[tokio::test]
async fn timeout_leaves_no_artifact_behind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/100001/local_impact"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG_BYTES.to_vec())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = HttpRemoteClient::new(server.uri())
        .with_timeouts(Duration::from_millis(50), Duration::from_millis(50));
    let f = CachingFetcher::new(catalog(), ArtifactStore::open(dir.path()).unwrap(), client);

    let err = f
        .get(&ArtifactRequest::LocalImpact {
            client_id: 100001,
            max_features: 16,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CreditError::Timeout(_)));
    assert!(f.store().entries().unwrap().is_empty());
}

#[tokio::test]
async fn server_error_propagates_with_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/100001/feature"))
        .respond_with(ResponseTemplate::new(503).set_body_string("shap worker down"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let f = fetcher(&server, dir.path());

    let err = f
        .get(&ArtifactRequest::SingleFeature {
            client_id: 100001,
            feature: "AGE".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        CreditError::ServerError { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "shap worker down");
        }
        other => panic!("expected ServerError, got {other:?}"),
    }
    assert!(f.store().entries().unwrap().is_empty());
}

#[tokio::test]
async fn validation_failures_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let f = fetcher(&server, dir.path());

    assert!(matches!(
        f.get(&ArtifactRequest::SingleFeature {
            client_id: 100001,
            feature: "NOT_A_FEATURE".to_string(),
        })
        .await,
        Err(CreditError::UnknownFeature(_))
    ));
    assert!(matches!(
        f.get(&ArtifactRequest::GlobalImpact { max_features: 3 }).await,
        Err(CreditError::InvalidParameter(_))
    ));
    assert!(matches!(
        f.get(&ArtifactRequest::BivariatePair {
            feature_a: "AGE".to_string(),
            feature_b: "AGE".to_string(),
        })
        .await,
        Err(CreditError::InvalidParameter(_))
    ));
}

#[tokio::test]
async fn cache_survives_a_fetcher_restart() {
    let dir = tempfile::tempdir().unwrap();
    let req = ArtifactRequest::GlobalImpact { max_features: 25 };

    {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/global_impact"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        fetcher(&server, dir.path()).get(&req).await.unwrap();
    }

    // New process, new service: the artifact must come from disk.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let handle = fetcher(&server, dir.path()).get(&req).await.unwrap();
    assert_eq!(std::fs::read(handle.path().unwrap()).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn session_bootstrap_loads_registry_and_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clients_list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id_list": [100001, 100002, 100003]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feature_lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "all": ["AGE", "EDUCATION"],
            "cat": ["EDUCATION"],
            "num": ["AGE"],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpRemoteClient::new(server.uri());
    let session = Session::bootstrap(&client).await.unwrap();

    assert_eq!(session.clients().ids(), &[100001, 100002, 100003]);
    assert!(session.clients().contains(100002));
    assert_eq!(session.catalog().feature_index("EDUCATION"), Some(1));
}

#[tokio::test]
async fn selection_list_passes_filter_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/100001/feature_selection"))
        .and(query_param("is_wf", "true"))
        .and(query_param("filter", "previous"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"feature_selection": ["CREDIT_HISTORY", "AGE"]}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    use creditlens::{RemoteClient, SelectionFilter};
    let client = HttpRemoteClient::new(server.uri());
    let features = client
        .list_feature_selection(100001, true, SelectionFilter::Previous)
        .await
        .unwrap();
    assert_eq!(features, vec!["CREDIT_HISTORY", "AGE"]);
}
