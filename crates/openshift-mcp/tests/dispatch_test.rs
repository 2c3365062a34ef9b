mod common;

use common::{dispatcher, FakeConnector};
use openshift_mcp::llm::{LLMProvider, MockProvider};
use openshift_mcp::tools::ArgumentBag;
use serde_json::{json, Value};
use std::sync::Arc;

fn bag(value: Value) -> ArgumentBag {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn connect_args(url: &str) -> ArgumentBag {
    bag(json!({"cluster_url": url, "token": "sha256~token"}))
}

#[tokio::test]
async fn scaling_twice_issues_two_calls() {
    let connector = Arc::new(FakeConnector::default());
    let mut d = dispatcher(connector.clone(), vec![]);
    d.invoke("connect_cluster", connect_args("https://api.one:6443")).await;

    let args = bag(json!({"namespace": "shop", "deployment_name": "web", "replicas": 3}));
    let first = d.invoke("scale_deployment", args.clone()).await;
    let second = d.invoke("scale_deployment", args).await;

    assert!(first.success && second.success);
    let cluster = &connector.sessions()[0];
    assert_eq!(
        cluster.calls(),
        vec!["scale_deployment shop web 3", "scale_deployment shop web 3"]
    );
}

#[tokio::test]
async fn reconnect_routes_reads_through_new_session() {
    let connector = Arc::new(FakeConnector::default());
    let mut d = dispatcher(connector.clone(), vec![]);

    d.invoke("connect_cluster", connect_args("https://api.one:6443")).await;
    d.invoke("connect_cluster", connect_args("https://api.two:6443")).await;
    let result = d.invoke("list_pods", bag(json!({"namespace": "shop"}))).await;

    assert!(result.success);
    let sessions = connector.sessions();
    assert_eq!(sessions.len(), 2);
    assert!(sessions[0].calls().is_empty());
    assert_eq!(sessions[1].calls(), vec!["list_pods shop"]);
    assert_eq!(d.cluster_url().as_deref(), Some("https://api.two:6443"));
}

#[tokio::test]
async fn failed_reconnect_keeps_previous_session() {
    let connector = Arc::new(FakeConnector::default());
    let mut d = dispatcher(connector.clone(), vec![]);
    d.invoke("connect_cluster", connect_args("https://api.one:6443")).await;

    let failed = d
        .invoke(
            "connect_cluster",
            bag(json!({"cluster_url": "https://api.two:6443", "token": "expired"})),
        )
        .await;

    assert!(!failed.success);
    assert_eq!(failed.error.as_deref(), Some("Kubernetes error: Unauthorized"));
    assert_eq!(d.cluster_url().as_deref(), Some("https://api.one:6443"));
}

#[tokio::test]
async fn missing_arguments_never_reach_the_cluster() {
    let connector = Arc::new(FakeConnector::default());
    let mut d = dispatcher(connector.clone(), vec![]);
    d.invoke("connect_cluster", connect_args("https://api.one:6443")).await;

    let missing_replicas = d
        .invoke("scale_deployment", bag(json!({"namespace": "shop", "deployment_name": "web"})))
        .await;
    let empty_pod = d
        .invoke("delete_pod", bag(json!({"namespace": "shop", "pod_name": ""})))
        .await;

    assert_eq!(missing_replicas.error.as_deref(), Some("replicas is required"));
    assert_eq!(empty_pod.error.as_deref(), Some("pod_name is required"));
    assert!(connector.sessions()[0].calls().is_empty());
}

#[tokio::test]
async fn zero_replicas_is_a_present_argument() {
    let connector = Arc::new(FakeConnector::default());
    let mut d = dispatcher(connector.clone(), vec![]);
    d.invoke("connect_cluster", connect_args("https://api.one:6443")).await;

    let result = d
        .invoke(
            "scale_deployment",
            bag(json!({"namespace": "shop", "deployment_name": "web", "replicas": 0})),
        )
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.data.unwrap()["replicas"], 0);
}

#[tokio::test]
async fn pod_logs_default_tail() {
    let connector = Arc::new(FakeConnector::default());
    let mut d = dispatcher(connector.clone(), vec![]);
    d.invoke("connect_cluster", connect_args("https://api.one:6443")).await;

    let result = d
        .invoke("get_pod_logs", bag(json!({"namespace": "shop", "pod_name": "web-1"})))
        .await;

    assert!(result.success);
    assert_eq!(connector.sessions()[0].calls(), vec!["get_pod_logs shop web-1 100"]);
}

#[tokio::test]
async fn gateway_errors_become_failed_results() {
    let connector = Arc::new(FakeConnector::default());
    let mut d = dispatcher(connector.clone(), vec![]);
    d.invoke("connect_cluster", connect_args("https://api.one:6443")).await;

    let result = d.invoke("delete_namespace", bag(json!({"name": "shop"}))).await;

    assert!(!result.success);
    assert!(result.data.is_none());
    assert_eq!(
        result.error.as_deref(),
        Some("Kubernetes error: delete_namespace is not stubbed")
    );
    assert!(result.elapsed_seconds.is_some());
}

#[tokio::test]
async fn analysis_sends_snapshot_to_provider() {
    let connector = Arc::new(FakeConnector::default());
    let provider = Arc::new(MockProvider::new("gemini").with_reply("cluster looks healthy"));
    let mut d = dispatcher(connector.clone(), vec![provider.clone() as Arc<dyn LLMProvider>]);
    d.invoke("connect_cluster", connect_args("https://api.one:6443")).await;

    let result = d
        .invoke("intelligent_cluster_analysis", bag(json!({"namespace": "shop"})))
        .await;

    assert!(result.success, "{:?}", result.error);
    let data = result.data.unwrap();
    assert_eq!(data["analysis"], "cluster looks healthy");
    assert_eq!(data["provider"], "gemini");

    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("Total namespaces: 2"), "{}", prompt);
    assert_eq!(connector.sessions()[0].count("list_pods"), 1);
}
