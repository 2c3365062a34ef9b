//! Summaries of cluster objects returned by the gateway.
//!
//! Each view carries the resource name, its status/phase and a few
//! descriptive fields. Conversions from the typed `k8s-openapi` objects live
//! here so they can be tested without a cluster.

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{
    ConfigMap, LimitRange, Namespace, Node, Pod, ResourceQuota, Secret, Service,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::quantity::{parse_cpu, parse_memory};

const DISPLAY_NAME_ANNOTATION: &str = "openshift.io/display-name";
const DESCRIPTION_ANNOTATION: &str = "openshift.io/description";
const REDACTED: &str = "<redacted>";

fn name_of(meta: &ObjectMeta) -> String {
    meta.name.clone().unwrap_or_else(|| "<unknown>".to_string())
}

fn created_of(meta: &ObjectMeta) -> Option<String> {
    meta.creation_timestamp.as_ref().map(|t| t.0.to_rfc3339())
}

fn labels_of(meta: &ObjectMeta) -> BTreeMap<String, String> {
    meta.labels.clone().unwrap_or_default()
}

/// Display name (defaulting to the object name) and description from the
/// OpenShift project annotations.
fn project_titles(meta: &ObjectMeta) -> (String, String) {
    let annotations = meta.annotations.as_ref();
    let display_name = annotations
        .and_then(|a| a.get(DISPLAY_NAME_ANNOTATION))
        .cloned()
        .unwrap_or_else(|| name_of(meta));
    let description = annotations
        .and_then(|a| a.get(DESCRIPTION_ANNOTATION))
        .cloned()
        .unwrap_or_default();
    (display_name, description)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamespaceInfo {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub status: String,
    pub created: Option<String>,
    pub labels: BTreeMap<String, String>,
}

impl From<&Namespace> for NamespaceInfo {
    fn from(ns: &Namespace) -> Self {
        let (display_name, description) = project_titles(&ns.metadata);
        Self {
            name: name_of(&ns.metadata),
            display_name,
            description,
            status: ns
                .status
                .as_ref()
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            created: created_of(&ns.metadata),
            labels: labels_of(&ns.metadata),
        }
    }
}

/// Everything `get_namespace_info` reports about one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamespaceDetails {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub status: String,
    pub created: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub resource_quotas: Vec<Value>,
    pub limit_ranges: Vec<Value>,
}

impl NamespaceDetails {
    /// `meta` and `phase` come from the Project, or the Namespace when the
    /// cluster does not serve projects.
    pub fn from_parts(
        meta: &ObjectMeta,
        phase: Option<String>,
        quotas: &[ResourceQuota],
        limits: &[LimitRange],
    ) -> crate::Result<Self> {
        let (display_name, description) = project_titles(meta);
        Ok(Self {
            name: name_of(meta),
            display_name,
            description,
            status: phase.unwrap_or_else(|| "Unknown".to_string()),
            created: created_of(meta),
            labels: labels_of(meta),
            annotations: meta.annotations.clone().unwrap_or_default(),
            resource_quotas: quotas
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
            limit_ranges: limits
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// A namespaced kind that `describe_resource` can fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescribableKind {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
    pub short_name: Option<&'static str>,
}

const fn describable(
    group: &'static str,
    version: &'static str,
    kind: &'static str,
    plural: &'static str,
    short_name: Option<&'static str>,
) -> DescribableKind {
    DescribableKind {
        group,
        version,
        kind,
        plural,
        short_name,
    }
}

const DESCRIBABLE_KINDS: &[DescribableKind] = &[
    describable("", "v1", "Pod", "pods", Some("po")),
    describable("", "v1", "Service", "services", Some("svc")),
    describable("", "v1", "ConfigMap", "configmaps", Some("cm")),
    describable("", "v1", "Secret", "secrets", None),
    describable("", "v1", "PersistentVolumeClaim", "persistentvolumeclaims", Some("pvc")),
    describable("", "v1", "ServiceAccount", "serviceaccounts", Some("sa")),
    describable("apps", "v1", "Deployment", "deployments", Some("deploy")),
    describable("apps", "v1", "StatefulSet", "statefulsets", Some("sts")),
    describable("apps", "v1", "DaemonSet", "daemonsets", Some("ds")),
    describable("apps", "v1", "ReplicaSet", "replicasets", Some("rs")),
    describable("batch", "v1", "Job", "jobs", None),
    describable("batch", "v1", "CronJob", "cronjobs", Some("cj")),
    describable("networking.k8s.io", "v1", "Ingress", "ingresses", Some("ing")),
    describable("networking.k8s.io", "v1", "NetworkPolicy", "networkpolicies", Some("netpol")),
    describable("route.openshift.io", "v1", "Route", "routes", None),
];

impl DescribableKind {
    /// Match a user-supplied type by kind, plural or short name, ignoring case.
    pub fn resolve(resource_type: &str) -> Option<&'static DescribableKind> {
        let wanted = resource_type.trim().to_ascii_lowercase();
        DESCRIBABLE_KINDS.iter().find(|k| {
            k.kind.eq_ignore_ascii_case(&wanted)
                || k.plural == wanted
                || k.short_name == Some(wanted.as_str())
        })
    }

    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(self.group, self.version, self.kind);
        ApiResource::from_gvk_with_plural(&gvk, self.plural)
    }

    pub fn is_secret(&self) -> bool {
        self.group.is_empty() && self.kind == "Secret"
    }
}

/// Blank out every value under `data` and `stringData`, keeping the keys.
pub fn redact_secret_values(secret: &mut Value) {
    for field in ["data", "stringData"] {
        if let Some(Value::Object(entries)) = secret.get_mut(field) {
            for value in entries.values_mut() {
                *value = Value::String(REDACTED.to_string());
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PodInfo {
    pub name: String,
    pub status: String,
    pub ready: bool,
    pub restart_count: i32,
    pub node: Option<String>,
    pub image: String,
    pub created: Option<String>,
    pub labels: BTreeMap<String, String>,
}

impl From<&Pod> for PodInfo {
    fn from(pod: &Pod) -> Self {
        let status = pod.status.as_ref();
        // The first container is reported, matching `oc get pods` output for single-container pods.
        let first_status = status
            .and_then(|s| s.container_statuses.as_ref())
            .and_then(|statuses| statuses.first());
        let spec = pod.spec.as_ref();

        Self {
            name: name_of(&pod.metadata),
            status: status
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            ready: first_status.map(|c| c.ready).unwrap_or(false),
            restart_count: first_status.map(|c| c.restart_count).unwrap_or(0),
            node: spec.and_then(|s| s.node_name.clone()),
            image: spec
                .and_then(|s| s.containers.first())
                .and_then(|c| c.image.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            created: created_of(&pod.metadata),
            labels: labels_of(&pod.metadata),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServicePort {
    pub port: i32,
    pub target_port: Option<String>,
    pub protocol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub cluster_ip: Option<String>,
    pub external_ips: Vec<String>,
    pub ports: Vec<ServicePort>,
    pub created: Option<String>,
}

impl From<&Service> for ServiceInfo {
    fn from(svc: &Service) -> Self {
        let spec = svc.spec.clone().unwrap_or_default();
        Self {
            name: name_of(&svc.metadata),
            service_type: spec.type_.unwrap_or_else(|| "ClusterIP".to_string()),
            cluster_ip: spec.cluster_ip,
            external_ips: spec.external_ips.unwrap_or_default(),
            ports: spec
                .ports
                .unwrap_or_default()
                .into_iter()
                .map(|p| ServicePort {
                    port: p.port,
                    target_port: p.target_port.map(|t| match t {
                        k8s_openapi::apimachinery::pkg::util::intstr::IntOrString::Int(i) => {
                            i.to_string()
                        }
                        k8s_openapi::apimachinery::pkg::util::intstr::IntOrString::String(s) => s,
                    }),
                    protocol: p.protocol.unwrap_or_else(|| "TCP".to_string()),
                })
                .collect(),
            created: created_of(&svc.metadata),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteInfo {
    pub name: String,
    pub host: Option<String>,
    pub service_name: Option<String>,
    pub port: Option<String>,
    pub tls: bool,
    pub created: Option<String>,
}

impl From<&DynamicObject> for RouteInfo {
    fn from(route: &DynamicObject) -> Self {
        let spec = route.data.get("spec");
        let str_at = |pointer: &str| {
            spec.and_then(|s| s.pointer(pointer)).and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };

        Self {
            name: name_of(&route.metadata),
            host: str_at("/host"),
            service_name: str_at("/to/name"),
            port: str_at("/port/targetPort"),
            tls: spec
                .and_then(|s| s.get("tls"))
                .map(|tls| !tls.is_null())
                .unwrap_or(false),
            created: created_of(&route.metadata),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigMapInfo {
    pub name: String,
    pub data_keys: Vec<String>,
    pub created: Option<String>,
}

impl From<&ConfigMap> for ConfigMapInfo {
    fn from(cm: &ConfigMap) -> Self {
        Self {
            name: name_of(&cm.metadata),
            data_keys: cm
                .data
                .as_ref()
                .map(|d| d.keys().cloned().collect())
                .unwrap_or_default(),
            created: created_of(&cm.metadata),
        }
    }
}

/// Secret summary. Only key names are exposed, never values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecretInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub secret_type: String,
    pub data_keys: Vec<String>,
    pub created: Option<String>,
}

impl From<&Secret> for SecretInfo {
    fn from(secret: &Secret) -> Self {
        Self {
            name: name_of(&secret.metadata),
            secret_type: secret.type_.clone().unwrap_or_else(|| "Opaque".to_string()),
            data_keys: secret
                .data
                .as_ref()
                .map(|d| d.keys().cloned().collect())
                .unwrap_or_default(),
            created: created_of(&secret.metadata),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub image: String,
    pub replicas: Option<i32>,
    pub ready_replicas: Option<i32>,
    pub available_replicas: Option<i32>,
    pub created: Option<String>,
}

fn first_image(template: Option<&k8s_openapi::api::core::v1::PodSpec>) -> String {
    template
        .and_then(|s| s.containers.first())
        .and_then(|c| c.image.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

impl From<&Deployment> for ApplicationInfo {
    fn from(d: &Deployment) -> Self {
        let spec = d.spec.as_ref();
        let status = d.status.as_ref();
        Self {
            name: name_of(&d.metadata),
            kind: "Deployment".to_string(),
            image: first_image(spec.and_then(|s| s.template.spec.as_ref())),
            replicas: spec.and_then(|s| s.replicas),
            ready_replicas: status.and_then(|s| s.ready_replicas),
            available_replicas: status.and_then(|s| s.available_replicas),
            created: created_of(&d.metadata),
        }
    }
}

impl From<&StatefulSet> for ApplicationInfo {
    fn from(s: &StatefulSet) -> Self {
        let spec = s.spec.as_ref();
        Self {
            name: name_of(&s.metadata),
            kind: "StatefulSet".to_string(),
            image: first_image(spec.and_then(|s| s.template.spec.as_ref())),
            replicas: spec.and_then(|s| s.replicas),
            ready_replicas: s.status.as_ref().and_then(|s| s.ready_replicas),
            available_replicas: s.status.as_ref().and_then(|s| s.available_replicas),
            created: created_of(&s.metadata),
        }
    }
}

impl From<&DaemonSet> for ApplicationInfo {
    fn from(d: &DaemonSet) -> Self {
        let status = d.status.as_ref();
        Self {
            name: name_of(&d.metadata),
            kind: "DaemonSet".to_string(),
            image: first_image(d.spec.as_ref().and_then(|s| s.template.spec.as_ref())),
            replicas: status.map(|s| s.desired_number_scheduled),
            ready_replicas: status.map(|s| s.number_ready),
            available_replicas: status.and_then(|s| s.number_available),
            created: created_of(&d.metadata),
        }
    }
}

/// Outcome of a mutating cluster call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationOutcome {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeCapacity {
    pub cpu: String,
    pub memory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeHealth {
    pub name: String,
    pub status: String,
    pub ready: bool,
    pub capacity: NodeCapacity,
}

impl From<&Node> for NodeHealth {
    fn from(node: &Node) -> Self {
        let status = node.status.as_ref();
        let conditions = status
            .and_then(|s| s.conditions.as_ref())
            .cloned()
            .unwrap_or_default();
        let capacity = status.and_then(|s| s.capacity.as_ref());
        let capacity_of = |key: &str| {
            capacity
                .and_then(|c| c.get(key))
                .map(|q| q.0.clone())
                .unwrap_or_else(|| "N/A".to_string())
        };

        Self {
            name: name_of(&node.metadata),
            status: conditions
                .last()
                .map(|c| c.type_.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            ready: conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True"),
            capacity: NodeCapacity {
                cpu: capacity_of("cpu"),
                memory: capacity_of("memory"),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterHealth {
    pub nodes: Vec<NodeHealth>,
    pub namespaces_count: usize,
    pub total_pods: usize,
    pub running_pods: usize,
    pub failed_pods: usize,
    pub pending_pods: usize,
}

impl ClusterHealth {
    pub fn from_parts(nodes: &[Node], namespaces_count: usize, pods: &[Pod]) -> Self {
        let mut health = ClusterHealth {
            nodes: nodes.iter().map(NodeHealth::from).collect(),
            namespaces_count,
            ..Default::default()
        };

        for pod in pods {
            health.total_pods += 1;
            match pod.status.as_ref().and_then(|s| s.phase.as_deref()) {
                Some("Running") => health.running_pods += 1,
                Some("Failed") => health.failed_pods += 1,
                Some("Pending") => health.pending_pods += 1,
                _ => {}
            }
        }

        health
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PodUsage {
    pub name: String,
    pub status: String,
    pub cpu_request: f64,
    pub cpu_limit: f64,
    pub memory_request: f64,
    pub memory_limit: f64,
}

/// Requested and limited resources for a namespace. CPU is in cores, memory in bytes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceUsage {
    pub namespace: String,
    pub pods: Vec<PodUsage>,
    pub total_cpu_request: f64,
    pub total_cpu_limit: f64,
    pub total_memory_request: f64,
    pub total_memory_limit: f64,
}

impl ResourceUsage {
    /// Sum requests and limits across every container in `spec.containers`.
    /// Init containers are not counted.
    pub fn from_pods(namespace: &str, pods: &[Pod]) -> crate::Result<Self> {
        let mut usage = ResourceUsage {
            namespace: namespace.to_string(),
            ..Default::default()
        };

        for pod in pods {
            let mut pod_usage = PodUsage {
                name: name_of(&pod.metadata),
                status: pod
                    .status
                    .as_ref()
                    .and_then(|s| s.phase.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                ..Default::default()
            };

            let containers = pod.spec.as_ref().map(|s| s.containers.as_slice()).unwrap_or(&[]);
            for container in containers {
                let Some(resources) = container.resources.as_ref() else {
                    continue;
                };

                if let Some(requests) = &resources.requests {
                    if let Some(cpu) = requests.get("cpu") {
                        pod_usage.cpu_request += parse_cpu(&cpu.0)?;
                    }
                    if let Some(memory) = requests.get("memory") {
                        pod_usage.memory_request += parse_memory(&memory.0)?;
                    }
                }

                if let Some(limits) = &resources.limits {
                    if let Some(cpu) = limits.get("cpu") {
                        pod_usage.cpu_limit += parse_cpu(&cpu.0)?;
                    }
                    if let Some(memory) = limits.get("memory") {
                        pod_usage.memory_limit += parse_memory(&memory.0)?;
                    }
                }
            }

            usage.total_cpu_request += pod_usage.cpu_request;
            usage.total_cpu_limit += pod_usage.cpu_limit;
            usage.total_memory_request += pod_usage.memory_request;
            usage.total_memory_limit += pod_usage.memory_limit;
            usage.pods.push(pod_usage);
        }

        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        Container, ContainerStatus, PodSpec, PodStatus, ResourceRequirements,
    };
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

    fn container(name: &str, requests: &[(&str, &str)], limits: &[(&str, &str)]) -> Container {
        let to_map = |pairs: &[(&str, &str)]| {
            let map: BTreeMap<String, Quantity> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
                .collect();
            if map.is_empty() {
                None
            } else {
                Some(map)
            }
        };
        Container {
            name: name.to_string(),
            image: Some(format!("registry.example.com/{}:latest", name)),
            resources: Some(ResourceRequirements {
                requests: to_map(requests),
                limits: to_map(limits),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn pod(name: &str, phase: &str, containers: Vec<Container>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers,
                node_name: Some("worker-0".to_string()),
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some(phase.to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn usage_sums_every_container() {
        let pods = vec![
            pod(
                "api-0",
                "Running",
                vec![
                    container("api", &[("cpu", "250m"), ("memory", "256Mi")], &[("cpu", "1"), ("memory", "1Gi")]),
                    container("sidecar", &[("cpu", "50m")], &[]),
                ],
            ),
            pod("worker-0", "Pending", vec![container("worker", &[("memory", "128Mi")], &[])]),
        ];

        let usage = ResourceUsage::from_pods("shop", &pods).unwrap();

        assert_eq!(usage.namespace, "shop");
        assert_eq!(usage.pods.len(), 2);
        assert!((usage.pods[0].cpu_request - 0.3).abs() < 1e-9);
        assert!((usage.total_cpu_request - 0.3).abs() < 1e-9);
        assert!((usage.total_cpu_limit - 1.0).abs() < 1e-9);
        assert_eq!(usage.total_memory_request, (384u64 * 1024 * 1024) as f64);
        assert_eq!(usage.total_memory_limit, (1024u64 * 1024 * 1024) as f64);
        assert_eq!(usage.pods[1].status, "Pending");
    }

    #[test]
    fn usage_ignores_init_containers() {
        let mut p = pod("db-0", "Running", vec![container("db", &[("cpu", "500m")], &[])]);
        if let Some(spec) = p.spec.as_mut() {
            spec.init_containers = Some(vec![container("migrate", &[("cpu", "2")], &[])]);
        }

        let usage = ResourceUsage::from_pods("data", &[p]).unwrap();
        assert!((usage.total_cpu_request - 0.5).abs() < 1e-9);
    }

    #[test]
    fn usage_rejects_garbage_quantities() {
        let pods = vec![pod("bad", "Running", vec![container("c", &[("cpu", "lots")], &[])])];
        assert!(ResourceUsage::from_pods("ns", &pods).is_err());
    }

    #[test]
    fn pod_info_reports_first_container() {
        let mut p = pod("web-1", "Running", vec![container("web", &[], &[])]);
        if let Some(status) = p.status.as_mut() {
            status.container_statuses = Some(vec![ContainerStatus {
                name: "web".to_string(),
                ready: true,
                restart_count: 3,
                ..Default::default()
            }]);
        }

        let info = PodInfo::from(&p);
        assert_eq!(info.name, "web-1");
        assert!(info.ready);
        assert_eq!(info.restart_count, 3);
        assert_eq!(info.node.as_deref(), Some("worker-0"));
        assert_eq!(info.image, "registry.example.com/web:latest");
    }

    #[test]
    fn pod_without_statuses_is_not_ready() {
        let info = PodInfo::from(&pod("init-1", "Pending", vec![]));
        assert!(!info.ready);
        assert_eq!(info.restart_count, 0);
        assert_eq!(info.image, "N/A");
    }

    #[test]
    fn cluster_health_counts_phases() {
        let pods = vec![
            pod("a", "Running", vec![]),
            pod("b", "Running", vec![]),
            pod("c", "Failed", vec![]),
            pod("d", "Pending", vec![]),
            pod("e", "Succeeded", vec![]),
        ];
        let health = ClusterHealth::from_parts(&[], 7, &pods);
        assert_eq!(health.namespaces_count, 7);
        assert_eq!(health.total_pods, 5);
        assert_eq!(health.running_pods, 2);
        assert_eq!(health.failed_pods, 1);
        assert_eq!(health.pending_pods, 1);
    }

    #[test]
    fn route_info_reads_dynamic_spec() {
        let route: DynamicObject = serde_json::from_value(serde_json::json!({
            "apiVersion": "route.openshift.io/v1",
            "kind": "Route",
            "metadata": { "name": "frontend" },
            "spec": {
                "host": "shop.apps.example.com",
                "to": { "kind": "Service", "name": "frontend" },
                "port": { "targetPort": 8080 },
                "tls": { "termination": "edge" }
            }
        }))
        .unwrap();

        let info = RouteInfo::from(&route);
        assert_eq!(info.host.as_deref(), Some("shop.apps.example.com"));
        assert_eq!(info.service_name.as_deref(), Some("frontend"));
        assert_eq!(info.port.as_deref(), Some("8080"));
        assert!(info.tls);
    }

    #[test]
    fn describable_kinds_match_kind_plural_and_short_name() {
        for name in ["Deployment", "deployments", "deploy", " DEPLOYMENT "] {
            let kind = DescribableKind::resolve(name).unwrap();
            assert_eq!(kind.kind, "Deployment", "{}", name);
        }
        let route = DescribableKind::resolve("route").unwrap().api_resource();
        assert_eq!(route.api_version, "route.openshift.io/v1");
        assert_eq!(route.plural, "routes");
        let pod = DescribableKind::resolve("po").unwrap().api_resource();
        assert_eq!(pod.api_version, "v1");

        assert!(DescribableKind::resolve("Node").is_none());
        assert!(DescribableKind::resolve("").is_none());
    }

    #[test]
    fn secret_values_are_redacted_but_keys_survive() {
        let mut secret = serde_json::json!({
            "kind": "Secret",
            "metadata": { "name": "db" },
            "data": { "password": "aHVudGVyMg==", "user": "YWRtaW4=" },
            "stringData": { "token": "plain" },
            "type": "Opaque"
        });

        redact_secret_values(&mut secret);

        assert_eq!(secret["data"]["password"], "<redacted>");
        assert_eq!(secret["data"]["user"], "<redacted>");
        assert_eq!(secret["stringData"]["token"], "<redacted>");
        assert_eq!(secret["type"], "Opaque");
        assert!(DescribableKind::resolve("secrets").unwrap().is_secret());
        assert!(!DescribableKind::resolve("configmap").unwrap().is_secret());
    }

    #[test]
    fn namespace_details_read_project_annotations() {
        let meta: ObjectMeta = serde_json::from_value(serde_json::json!({
            "name": "shop",
            "labels": { "team": "web" },
            "annotations": {
                "openshift.io/display-name": "Shop Frontend",
                "openshift.io/description": "Customer storefront"
            }
        }))
        .unwrap();
        let quota: ResourceQuota = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "compute" },
            "spec": { "hard": { "pods": "10" } }
        }))
        .unwrap();

        let details =
            NamespaceDetails::from_parts(&meta, Some("Active".to_string()), &[quota], &[]).unwrap();

        assert_eq!(details.display_name, "Shop Frontend");
        assert_eq!(details.description, "Customer storefront");
        assert_eq!(details.status, "Active");
        assert_eq!(details.labels.get("team").map(String::as_str), Some("web"));
        assert_eq!(details.annotations.len(), 2);
        assert_eq!(details.resource_quotas.len(), 1);
        assert_eq!(details.resource_quotas[0]["spec"]["hard"]["pods"], "10");
        assert!(details.limit_ranges.is_empty());
    }

    #[test]
    fn namespace_details_default_display_name_and_status() {
        let meta = ObjectMeta {
            name: Some("plain".to_string()),
            ..Default::default()
        };

        let details = NamespaceDetails::from_parts(&meta, None, &[], &[]).unwrap();

        assert_eq!(details.display_name, "plain");
        assert_eq!(details.description, "");
        assert_eq!(details.status, "Unknown");
        assert!(details.annotations.is_empty());
    }
}
