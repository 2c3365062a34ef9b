use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{
    ConfigMap, LimitRange, Namespace, Node, Pod, ResourceQuota, Secret, Service,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{
    api::{Api, ApiResource, DeleteParams, DynamicObject, GroupVersionKind, ListParams, LogParams, Patch, PatchParams, PostParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::gateway::{ClusterConnector, ClusterGateway, ConnectParams};
use super::resources::{
    redact_secret_values, ApplicationInfo, ClusterHealth, ConfigMapInfo, DescribableKind,
    MutationOutcome, NamespaceDetails, NamespaceInfo, PodInfo, ResourceUsage, RouteInfo,
    SecretInfo, ServiceInfo,
};
use crate::{Error, Result};

const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

/// Build a single-context kubeconfig for a bearer-token session.
fn kubeconfig_for(params: &ConnectParams) -> Result<Kubeconfig> {
    let raw = json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": "openshift",
            "cluster": {
                "server": params.cluster_url,
                "insecure-skip-tls-verify": !params.verify_ssl,
            }
        }],
        "users": [{
            "name": "openshift-mcp",
            "user": { "token": params.token }
        }],
        "contexts": [{
            "name": "openshift",
            "context": { "cluster": "openshift", "user": "openshift-mcp" }
        }],
        "current-context": "openshift",
    });

    serde_json::from_value(raw)
        .map_err(|e| Error::Config(format!("Failed to build kubeconfig: {}", e)))
}

/// Cluster session backed by a `kube` client.
pub struct KubeCluster {
    client: Client,
    server_url: String,
}

impl KubeCluster {
    pub async fn connect(params: &ConnectParams) -> Result<Self> {
        let kubeconfig = kubeconfig_for(params)?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| Error::Kubernetes(format!("Invalid cluster configuration: {}", e)))?;
        let client = Client::try_from(config)?;

        info!(
            "Connected to OpenShift cluster: {} (verify_ssl={})",
            params.cluster_url, params.verify_ssl
        );

        Ok(Self {
            client,
            server_url: params.cluster_url.clone(),
        })
    }

    pub fn from_client(client: Client, server_url: impl Into<String>) -> Self {
        Self {
            client,
            server_url: server_url.into(),
        }
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn routes(&self, namespace: &str) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk("route.openshift.io", "v1", "Route");
        let resource = ApiResource::from_gvk(&gvk);
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }

    fn projects(&self) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk("project.openshift.io", "v1", "Project");
        let resource = ApiResource::from_gvk(&gvk);
        Api::all_with(self.client.clone(), &resource)
    }

    /// Project metadata and phase, or the Namespace's on plain Kubernetes.
    async fn project_meta(&self, namespace: &str) -> Result<(ObjectMeta, Option<String>)> {
        match self.projects().get(namespace).await {
            Ok(project) => {
                let phase = project
                    .data
                    .pointer("/status/phase")
                    .and_then(|p| p.as_str())
                    .map(str::to_string);
                Ok((project.metadata, phase))
            }
            Err(kube::Error::Api(e)) if e.code == 404 => {
                warn!("Project {} not found, falling back to Namespace: {}", namespace, e.message);
                let ns = Api::<Namespace>::all(self.client.clone()).get(namespace).await?;
                Ok((ns.metadata, ns.status.and_then(|s| s.phase)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ClusterGateway for KubeCluster {
    fn server_url(&self) -> String {
        self.server_url.clone()
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        debug!("Listed {} namespaces", list.items.len());
        Ok(list.items.iter().map(NamespaceInfo::from).collect())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodInfo>> {
        let list = self.namespaced::<Pod>(namespace).list(&ListParams::default()).await?;
        debug!("Listed {} pods in {}", list.items.len(), namespace);
        Ok(list.items.iter().map(PodInfo::from).collect())
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>> {
        let list = self
            .namespaced::<Service>(namespace)
            .list(&ListParams::default())
            .await?;
        Ok(list.items.iter().map(ServiceInfo::from).collect())
    }

    async fn list_routes(&self, namespace: &str) -> Result<Vec<RouteInfo>> {
        let list = self.routes(namespace).list(&ListParams::default()).await?;
        Ok(list.items.iter().map(RouteInfo::from).collect())
    }

    async fn list_configmaps(&self, namespace: &str) -> Result<Vec<ConfigMapInfo>> {
        let list = self
            .namespaced::<ConfigMap>(namespace)
            .list(&ListParams::default())
            .await?;
        Ok(list.items.iter().map(ConfigMapInfo::from).collect())
    }

    async fn list_secrets(&self, namespace: &str) -> Result<Vec<SecretInfo>> {
        let list = self
            .namespaced::<Secret>(namespace)
            .list(&ListParams::default())
            .await?;
        Ok(list.items.iter().map(SecretInfo::from).collect())
    }

    async fn list_applications(&self, namespace: &str) -> Result<Vec<ApplicationInfo>> {
        let params = ListParams::default();
        let deployments = self.namespaced::<Deployment>(namespace).list(&params).await?;
        let statefulsets = self.namespaced::<StatefulSet>(namespace).list(&params).await?;
        let daemonsets = self.namespaced::<DaemonSet>(namespace).list(&params).await?;

        let mut apps: Vec<ApplicationInfo> =
            deployments.items.iter().map(ApplicationInfo::from).collect();
        apps.extend(statefulsets.items.iter().map(ApplicationInfo::from));
        apps.extend(daemonsets.items.iter().map(ApplicationInfo::from));
        Ok(apps)
    }

    async fn get_pod_logs(
        &self,
        namespace: &str,
        pod_name: &str,
        tail_lines: i64,
    ) -> Result<String> {
        let params = LogParams {
            tail_lines: Some(tail_lines),
            ..Default::default()
        };
        let logs = self.namespaced::<Pod>(namespace).logs(pod_name, &params).await?;
        Ok(logs)
    }

    async fn get_resource_usage(&self, namespace: &str) -> Result<ResourceUsage> {
        let list = self.namespaced::<Pod>(namespace).list(&ListParams::default()).await?;
        ResourceUsage::from_pods(namespace, &list.items)
    }

    async fn describe_resource(
        &self,
        namespace: &str,
        resource_type: &str,
        resource_name: &str,
    ) -> Result<serde_json::Value> {
        let kind = DescribableKind::resolve(resource_type).ok_or_else(|| {
            Error::Validation(format!("Unsupported resource_type: {}", resource_type))
        })?;
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &kind.api_resource());
        let object = api.get(resource_name).await?;
        debug!("Fetched {} {}/{}", kind.kind, namespace, resource_name);

        let mut value = serde_json::to_value(&object)?;
        if kind.is_secret() {
            redact_secret_values(&mut value);
        }
        Ok(value)
    }

    async fn get_namespace_info(&self, namespace: &str) -> Result<NamespaceDetails> {
        let (meta, phase) = self.project_meta(namespace).await?;
        let params = ListParams::default();
        let quotas = self.namespaced::<ResourceQuota>(namespace).list(&params).await?;
        let limits = self.namespaced::<LimitRange>(namespace).list(&params).await?;

        NamespaceDetails::from_parts(&meta, phase, &quotas.items, &limits.items)
    }

    async fn scale_deployment(
        &self,
        namespace: &str,
        deployment_name: &str,
        replicas: i32,
    ) -> Result<MutationOutcome> {
        let patch = json!({ "spec": { "replicas": replicas } });
        let api = self.namespaced::<Deployment>(namespace);
        let deployment = api
            .patch(
                deployment_name,
                &PatchParams::default(),
                &Patch::Merge(&patch),
            )
            .await?;

        info!("Scaled deployment {}/{} to {} replicas", namespace, deployment_name, replicas);
        Ok(MutationOutcome {
            name: deployment_name.to_string(),
            message: format!(
                "Successfully scaled deployment {} to {} replicas",
                deployment_name, replicas
            ),
            replicas: deployment.spec.and_then(|s| s.replicas).or(Some(replicas)),
        })
    }

    async fn restart_deployment(
        &self,
        namespace: &str,
        deployment_name: &str,
    ) -> Result<MutationOutcome> {
        let patch = json!({
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": { RESTARTED_AT_ANNOTATION: Utc::now().to_rfc3339() }
                    }
                }
            }
        });
        self.namespaced::<Deployment>(namespace)
            .patch(
                deployment_name,
                &PatchParams::default(),
                &Patch::Merge(&patch),
            )
            .await?;

        info!("Restarted deployment {}/{}", namespace, deployment_name);
        Ok(MutationOutcome {
            name: deployment_name.to_string(),
            message: format!("Successfully restarted deployment {}", deployment_name),
            replicas: None,
        })
    }

    async fn delete_pod(&self, namespace: &str, pod_name: &str) -> Result<MutationOutcome> {
        self.namespaced::<Pod>(namespace)
            .delete(pod_name, &DeleteParams::default())
            .await?;

        info!("Deleted pod {}/{}", namespace, pod_name);
        Ok(MutationOutcome {
            name: pod_name.to_string(),
            message: format!("Successfully deleted pod {}", pod_name),
            replicas: None,
        })
    }

    async fn create_namespace(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
    ) -> Result<MutationOutcome> {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: if labels.is_empty() { None } else { Some(labels) },
                ..Default::default()
            },
            ..Default::default()
        };
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.create(&PostParams::default(), &namespace).await?;

        info!("Created namespace {}", name);
        Ok(MutationOutcome {
            name: name.to_string(),
            message: format!("Successfully created namespace {}", name),
            replicas: None,
        })
    }

    async fn delete_namespace(&self, name: &str) -> Result<MutationOutcome> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.delete(name, &DeleteParams::default()).await?;

        info!("Deleted namespace {}", name);
        Ok(MutationOutcome {
            name: name.to_string(),
            message: format!("Successfully deleted namespace {}", name),
            replicas: None,
        })
    }

    async fn get_cluster_health(&self) -> Result<ClusterHealth> {
        let params = ListParams::default();
        let nodes = Api::<Node>::all(self.client.clone()).list(&params).await?;
        let namespaces = Api::<Namespace>::all(self.client.clone()).list(&params).await?;
        let pods = Api::<Pod>::all(self.client.clone()).list(&params).await?;

        Ok(ClusterHealth::from_parts(
            &nodes.items,
            namespaces.items.len(),
            &pods.items,
        ))
    }
}

/// Opens [`KubeCluster`] sessions.
#[derive(Debug, Default, Clone)]
pub struct KubeConnector;

#[async_trait]
impl ClusterConnector for KubeConnector {
    async fn connect(&self, params: &ConnectParams) -> Result<Arc<dyn ClusterGateway>> {
        let cluster = KubeCluster::connect(params).await?;
        Ok(Arc::new(cluster))
    }
}
