//! In-memory cluster spies shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use openshift_mcp::{
    history::InteractionLog,
    kubernetes::{
        ApplicationInfo, ClusterConnector, ClusterGateway, ClusterHealth, ConfigMapInfo,
        ConnectParams, MutationOutcome, NamespaceDetails, NamespaceInfo, PodInfo, ResourceUsage,
        RouteInfo, SecretInfo, ServiceInfo,
    },
    llm::{LLMGateway, LLMProvider},
    shell::Session,
    tools::ToolDispatcher,
    Error, Result,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Records every gateway call as `"<method> <args>"`.
pub struct FakeCluster {
    pub url: String,
    pub namespaces: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeCluster {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            namespaces: vec!["default".to_string(), "shop".to_string()],
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split_whitespace().next() == Some(method))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn unstubbed<T>(&self, method: &str) -> Result<T> {
        self.record(method.to_string());
        Err(Error::Kubernetes(format!("{} is not stubbed", method)))
    }
}

pub fn pod(name: &str) -> PodInfo {
    PodInfo {
        name: name.to_string(),
        status: "Running".to_string(),
        ready: true,
        restart_count: 0,
        node: Some("worker-0".to_string()),
        image: "quay.io/shop/web:1.0".to_string(),
        created: None,
        labels: BTreeMap::new(),
    }
}

#[async_trait]
impl ClusterGateway for FakeCluster {
    fn server_url(&self) -> String {
        self.url.clone()
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>> {
        self.record("list_namespaces".to_string());
        Ok(self
            .namespaces
            .iter()
            .map(|name| NamespaceInfo {
                name: name.clone(),
                display_name: name.clone(),
                description: String::new(),
                status: "Active".to_string(),
                created: None,
                labels: BTreeMap::new(),
            })
            .collect())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodInfo>> {
        self.record(format!("list_pods {}", namespace));
        Ok(vec![pod("web-1"), pod("web-2")])
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>> {
        self.record(format!("list_services {}", namespace));
        Ok(vec![])
    }

    async fn list_routes(&self, namespace: &str) -> Result<Vec<RouteInfo>> {
        self.record(format!("list_routes {}", namespace));
        Ok(vec![])
    }

    async fn list_configmaps(&self, _namespace: &str) -> Result<Vec<ConfigMapInfo>> {
        self.unstubbed("list_configmaps")
    }

    async fn list_secrets(&self, _namespace: &str) -> Result<Vec<SecretInfo>> {
        self.unstubbed("list_secrets")
    }

    async fn list_applications(&self, _namespace: &str) -> Result<Vec<ApplicationInfo>> {
        self.unstubbed("list_applications")
    }

    async fn get_pod_logs(&self, namespace: &str, pod_name: &str, tail_lines: i64) -> Result<String> {
        self.record(format!("get_pod_logs {} {} {}", namespace, pod_name, tail_lines));
        Ok("started\nlistening on :8080".to_string())
    }

    async fn get_resource_usage(&self, _namespace: &str) -> Result<ResourceUsage> {
        self.unstubbed("get_resource_usage")
    }

    async fn describe_resource(
        &self,
        _namespace: &str,
        _resource_type: &str,
        _resource_name: &str,
    ) -> Result<serde_json::Value> {
        self.unstubbed("describe_resource")
    }

    async fn get_namespace_info(&self, _namespace: &str) -> Result<NamespaceDetails> {
        self.unstubbed("get_namespace_info")
    }

    async fn scale_deployment(
        &self,
        namespace: &str,
        deployment_name: &str,
        replicas: i32,
    ) -> Result<MutationOutcome> {
        self.record(format!("scale_deployment {} {} {}", namespace, deployment_name, replicas));
        Ok(MutationOutcome {
            name: deployment_name.to_string(),
            message: format!("Scaled {} to {} replicas", deployment_name, replicas),
            replicas: Some(replicas),
        })
    }

    async fn restart_deployment(&self, _namespace: &str, _deployment_name: &str) -> Result<MutationOutcome> {
        self.unstubbed("restart_deployment")
    }

    async fn delete_pod(&self, namespace: &str, pod_name: &str) -> Result<MutationOutcome> {
        self.record(format!("delete_pod {} {}", namespace, pod_name));
        Ok(MutationOutcome {
            name: pod_name.to_string(),
            message: format!("Deleted pod {}", pod_name),
            replicas: None,
        })
    }

    async fn create_namespace(&self, _name: &str, _labels: BTreeMap<String, String>) -> Result<MutationOutcome> {
        self.unstubbed("create_namespace")
    }

    async fn delete_namespace(&self, _name: &str) -> Result<MutationOutcome> {
        self.unstubbed("delete_namespace")
    }

    async fn get_cluster_health(&self) -> Result<ClusterHealth> {
        self.unstubbed("get_cluster_health")
    }
}

/// Hands out a fresh [`FakeCluster`] per connect and keeps every one of them.
#[derive(Default)]
pub struct FakeConnector {
    sessions: Mutex<Vec<Arc<FakeCluster>>>,
}

impl FakeConnector {
    pub fn sessions(&self) -> Vec<Arc<FakeCluster>> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterConnector for FakeConnector {
    async fn connect(&self, params: &ConnectParams) -> Result<Arc<dyn ClusterGateway>> {
        if params.token == "expired" {
            return Err(Error::Kubernetes("Unauthorized".to_string()));
        }
        let cluster = Arc::new(FakeCluster::new(&params.cluster_url));
        self.sessions.lock().unwrap().push(cluster.clone());
        Ok(cluster)
    }
}

pub fn dispatcher(connector: Arc<FakeConnector>, providers: Vec<Arc<dyn LLMProvider>>) -> ToolDispatcher {
    ToolDispatcher::new(connector, Arc::new(LLMGateway::new(providers)))
}

pub fn session(connector: Arc<FakeConnector>, providers: Vec<Arc<dyn LLMProvider>>) -> Session {
    Session::new(dispatcher(connector, providers), InteractionLog::default())
}
