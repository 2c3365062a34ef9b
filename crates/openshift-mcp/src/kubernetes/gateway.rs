use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::resources::{
    ApplicationInfo, ClusterHealth, ConfigMapInfo, MutationOutcome, NamespaceDetails,
    NamespaceInfo, PodInfo, ResourceUsage, RouteInfo, SecretInfo, ServiceInfo,
};
use crate::Result;

/// Parameters for establishing a cluster session.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectParams {
    pub cluster_url: String,
    pub token: String,
    pub verify_ssl: bool,
}

/// An authenticated session against one cluster.
///
/// Every call is a single round-trip; failures come back as
/// [`crate::Error::Kubernetes`] carrying the API server's message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    fn server_url(&self) -> String;

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>>;
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodInfo>>;
    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>>;
    async fn list_routes(&self, namespace: &str) -> Result<Vec<RouteInfo>>;
    async fn list_configmaps(&self, namespace: &str) -> Result<Vec<ConfigMapInfo>>;
    async fn list_secrets(&self, namespace: &str) -> Result<Vec<SecretInfo>>;
    async fn list_applications(&self, namespace: &str) -> Result<Vec<ApplicationInfo>>;
    async fn get_pod_logs(&self, namespace: &str, pod_name: &str, tail_lines: i64)
        -> Result<String>;
    async fn get_resource_usage(&self, namespace: &str) -> Result<ResourceUsage>;
    /// The raw object, with secret values redacted.
    async fn describe_resource(
        &self,
        namespace: &str,
        resource_type: &str,
        resource_name: &str,
    ) -> Result<serde_json::Value>;
    async fn get_namespace_info(&self, namespace: &str) -> Result<NamespaceDetails>;

    async fn scale_deployment(
        &self,
        namespace: &str,
        deployment_name: &str,
        replicas: i32,
    ) -> Result<MutationOutcome>;
    async fn restart_deployment(
        &self,
        namespace: &str,
        deployment_name: &str,
    ) -> Result<MutationOutcome>;
    async fn delete_pod(&self, namespace: &str, pod_name: &str) -> Result<MutationOutcome>;
    async fn create_namespace(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
    ) -> Result<MutationOutcome>;
    async fn delete_namespace(&self, name: &str) -> Result<MutationOutcome>;

    async fn get_cluster_health(&self) -> Result<ClusterHealth>;
}

/// Opens new cluster sessions. Swapped for a fake in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    async fn connect(&self, params: &ConnectParams) -> Result<Arc<dyn ClusterGateway>>;
}
