use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::registry::{lookup, ToolSpec, TOOLS};
use super::{ArgumentBag, ToolError, ToolResult};
use crate::kubernetes::{ClusterConnector, ClusterGateway, ConnectParams, DescribableKind};
use crate::llm::{LLMGateway, LLMResponse};
use crate::metrics;

type ToolOutcome = std::result::Result<Map<String, Value>, ToolError>;

const ANALYSIS_PROMPT: &str = "Please analyze this OpenShift cluster and provide:
1. Overall health assessment
2. Key observations
3. Recommendations for optimization
4. Potential issues to watch for";

const TROUBLESHOOTING_REQUEST: &str = "Please provide:
1. Possible causes of this issue
2. Step-by-step troubleshooting steps
3. Commands to run for diagnosis
4. Prevention tips for the future
5. When to contact support";

/// Await `fut` and add its wall-clock time to `elapsed`.
async fn timed<T, F>(elapsed: &mut Option<Duration>, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    *elapsed = Some(elapsed.unwrap_or_default() + start.elapsed());
    out
}

fn into_data(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> std::result::Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::Gateway(e.to_string()))
}

// Argument readers. `validate` has already coerced types, so a missing or
// mistyped value here means the registry and the handler disagree.
fn str_arg<'a>(args: &'a ArgumentBag, name: &str) -> std::result::Result<&'a str, ToolError> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::MissingArgument(name.to_string()))
}

fn opt_str_arg<'a>(args: &'a ArgumentBag, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn int_arg(args: &ArgumentBag, name: &str) -> std::result::Result<i64, ToolError> {
    args.get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::MissingArgument(name.to_string()))
}

fn labels_arg(args: &ArgumentBag, name: &str) -> BTreeMap<String, String> {
    args.get(name)
        .and_then(Value::as_object)
        .map(|labels| {
            labels
                .iter()
                .map(|(k, v)| {
                    let value = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn llm_failure(response: &LLMResponse) -> Option<ToolError> {
    response
        .error
        .as_ref()
        .filter(|e| !e.is_empty())
        .map(|e| ToolError::Gateway(e.clone()))
}

/// Runs named tools against the cluster and LLM gateways.
///
/// The dispatcher owns the current cluster session. `connect_cluster`
/// replaces it; every other cluster tool reads through it.
pub struct ToolDispatcher {
    connector: Arc<dyn ClusterConnector>,
    cluster: Option<Arc<dyn ClusterGateway>>,
    llm: Arc<LLMGateway>,
    default_verify_ssl: bool,
}

impl ToolDispatcher {
    pub fn new(connector: Arc<dyn ClusterConnector>, llm: Arc<LLMGateway>) -> Self {
        Self {
            connector,
            cluster: None,
            llm,
            default_verify_ssl: true,
        }
    }

    /// `verify_ssl` used by `connect_cluster` when the caller omits it.
    pub fn with_default_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.default_verify_ssl = verify_ssl;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.cluster.is_some()
    }

    pub fn cluster_url(&self) -> Option<String> {
        self.cluster.as_ref().map(|c| c.server_url())
    }

    pub fn llm(&self) -> &LLMGateway {
        &self.llm
    }

    pub fn tools(&self) -> &'static [ToolSpec] {
        TOOLS
    }

    /// Run one tool. Never fails: every error becomes a failed [`ToolResult`].
    pub async fn invoke(&mut self, name: &str, args: ArgumentBag) -> ToolResult {
        debug!("Invoking tool {} with {} argument(s)", name, args.len());

        let mut elapsed = None;
        let outcome = self.run(name, &args, &mut elapsed).await;
        let elapsed_seconds = elapsed.map(|d| d.as_secs_f64());

        let result = match outcome {
            Ok(data) => {
                info!("Tool {} succeeded", name);
                ToolResult::success(data, elapsed_seconds)
            }
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                ToolResult::failure(e.to_string(), elapsed_seconds)
            }
        };

        let label = lookup(name).map_or(metrics::UNKNOWN_TOOL, |spec| spec.name);
        metrics::record_invocation(label, result.success, elapsed);
        result
    }

    fn session(&self) -> std::result::Result<Arc<dyn ClusterGateway>, ToolError> {
        self.cluster.clone().ok_or(ToolError::NotConnected)
    }

    async fn run(
        &mut self,
        name: &str,
        raw_args: &ArgumentBag,
        elapsed: &mut Option<Duration>,
    ) -> ToolOutcome {
        let spec = lookup(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        // Connection is checked before arguments.
        let session = if spec.requires_connection {
            Some(self.session()?)
        } else {
            None
        };
        let args = spec.validate(raw_args)?;

        match (spec.name, session) {
            ("connect_cluster", _) => self.connect_cluster(&args, elapsed).await,
            ("ask_llm", _) => self.ask_llm(&args, elapsed).await,
            ("get_llm_providers", _) => Ok(self.llm_providers()),
            ("test_llm_connection", _) => self.test_llm_connection(&args, elapsed).await,
            ("get_troubleshooting_help", _) => self.troubleshooting_help(&args, elapsed).await,
            (tool, Some(cluster)) => run_cluster_tool(tool, cluster, &self.llm, &args, elapsed).await,
            (tool, None) => Err(ToolError::UnknownTool(tool.to_string())),
        }
    }

    async fn connect_cluster(
        &mut self,
        args: &ArgumentBag,
        elapsed: &mut Option<Duration>,
    ) -> ToolOutcome {
        let params = ConnectParams {
            cluster_url: str_arg(args, "cluster_url")?.to_string(),
            token: str_arg(args, "token")?.to_string(),
            verify_ssl: args
                .get("verify_ssl")
                .and_then(Value::as_bool)
                .unwrap_or(self.default_verify_ssl),
        };

        let session = timed(elapsed, self.connector.connect(&params)).await?;
        if self.cluster.is_some() {
            info!("Replacing existing cluster session with {}", params.cluster_url);
        }
        self.cluster = Some(session);

        Ok(into_data(json!({
            "cluster_url": params.cluster_url,
            "verify_ssl": params.verify_ssl,
            "message": format!("Successfully connected to OpenShift cluster: {}", params.cluster_url),
        })))
    }

    async fn ask_llm(&self, args: &ArgumentBag, elapsed: &mut Option<Duration>) -> ToolOutcome {
        if self.llm.default_provider().is_none() {
            return Err(ToolError::NoProvider);
        }

        let question = str_arg(args, "question")?;
        let caller_context = opt_str_arg(args, "context");
        let context = match (self.cluster_url(), caller_context) {
            (Some(url), Some(ctx)) => format!("Connected to OpenShift cluster: {}\n\n{}", url, ctx),
            (Some(url), None) => format!("Connected to OpenShift cluster: {}", url),
            (None, Some(ctx)) => ctx.to_string(),
            (None, None) => String::new(),
        };

        let response = timed(
            elapsed,
            self.llm
                .generate(question, Some(&context), opt_str_arg(args, "provider")),
        )
        .await;
        if let Some(err) = llm_failure(&response) {
            return Err(err);
        }

        Ok(into_data(json!({
            "response": response.content,
            "provider": response.provider,
            "model": response.model,
            "response_time": response.elapsed_seconds,
            "tokens_used": response.tokens_used,
        })))
    }

    fn llm_providers(&self) -> Map<String, Value> {
        let providers = self.llm.available_providers();
        into_data(json!({
            "total_providers": providers.len(),
            "available_providers": providers,
            "default_provider": self.llm.default_provider(),
        }))
    }

    async fn test_llm_connection(
        &self,
        args: &ArgumentBag,
        elapsed: &mut Option<Duration>,
    ) -> ToolOutcome {
        match opt_str_arg(args, "provider") {
            Some(provider) => {
                let reachable = timed(elapsed, self.llm.test_connection(provider))
                    .await
                    .ok_or_else(|| ToolError::ProviderNotFound(provider.to_string()))?;
                let mut data = Map::new();
                data.insert(provider.to_string(), Value::Bool(reachable));
                Ok(data)
            }
            None => {
                let results = timed(elapsed, self.llm.test_connections()).await;
                Ok(into_data(json!({ "connection_results": results })))
            }
        }
    }

    async fn troubleshooting_help(
        &self,
        args: &ArgumentBag,
        elapsed: &mut Option<Duration>,
    ) -> ToolOutcome {
        if self.llm.default_provider().is_none() {
            return Err(ToolError::NoProvider);
        }

        let issue = str_arg(args, "issue_description")?;
        let context = match &self.cluster {
            Some(cluster) => {
                let namespaces = timed(elapsed, cluster.list_namespaces())
                    .await
                    .map_err(|e| ToolError::Gather(e.to_string()))?;
                format!("Connected to OpenShift cluster with {} namespaces.", namespaces.len())
            }
            None => String::new(),
        };

        let mut prompt = format!(
            "I'm experiencing an OpenShift issue and need help troubleshooting:\n\nIssue: {}\n\n",
            issue
        );
        if let Some(errors) = opt_str_arg(args, "error_messages") {
            prompt.push_str(&format!("Error messages/logs: {}\n\n", errors));
        }
        prompt.push_str(TROUBLESHOOTING_REQUEST);

        let response = timed(
            elapsed,
            self.llm
                .generate(&prompt, Some(&context), opt_str_arg(args, "provider")),
        )
        .await;
        if let Some(err) = llm_failure(&response) {
            return Err(err);
        }

        Ok(into_data(json!({
            "troubleshooting_help": response.content,
            "provider": response.provider,
            "model": response.model,
            "response_time": response.elapsed_seconds,
        })))
    }
}

async fn run_cluster_tool(
    tool: &str,
    cluster: Arc<dyn ClusterGateway>,
    llm: &LLMGateway,
    args: &ArgumentBag,
    elapsed: &mut Option<Duration>,
) -> ToolOutcome {
    match tool {
        "list_namespaces" => {
            let namespaces = timed(elapsed, cluster.list_namespaces()).await?;
            Ok(into_data(json!({
                "count": namespaces.len(),
                "namespaces": to_value(&namespaces)?,
            })))
        }
        "list_pods" => {
            let namespace = str_arg(args, "namespace")?;
            let pods = timed(elapsed, cluster.list_pods(namespace)).await?;
            Ok(into_data(json!({
                "namespace": namespace,
                "count": pods.len(),
                "pods": to_value(&pods)?,
            })))
        }
        "list_services" => {
            let namespace = str_arg(args, "namespace")?;
            let services = timed(elapsed, cluster.list_services(namespace)).await?;
            Ok(into_data(json!({
                "namespace": namespace,
                "count": services.len(),
                "services": to_value(&services)?,
            })))
        }
        "list_routes" => {
            let namespace = str_arg(args, "namespace")?;
            let routes = timed(elapsed, cluster.list_routes(namespace)).await?;
            Ok(into_data(json!({
                "namespace": namespace,
                "count": routes.len(),
                "routes": to_value(&routes)?,
            })))
        }
        "list_configmaps" => {
            let namespace = str_arg(args, "namespace")?;
            let configmaps = timed(elapsed, cluster.list_configmaps(namespace)).await?;
            Ok(into_data(json!({
                "namespace": namespace,
                "count": configmaps.len(),
                "configmaps": to_value(&configmaps)?,
            })))
        }
        "list_secrets" => {
            let namespace = str_arg(args, "namespace")?;
            let secrets = timed(elapsed, cluster.list_secrets(namespace)).await?;
            Ok(into_data(json!({
                "namespace": namespace,
                "count": secrets.len(),
                "secrets": to_value(&secrets)?,
            })))
        }
        "list_applications" => {
            let namespace = str_arg(args, "namespace")?;
            let applications = timed(elapsed, cluster.list_applications(namespace)).await?;
            Ok(into_data(json!({
                "namespace": namespace,
                "count": applications.len(),
                "applications": to_value(&applications)?,
            })))
        }
        "get_pod_logs" => {
            let namespace = str_arg(args, "namespace")?;
            let pod_name = str_arg(args, "pod_name")?;
            let tail_lines = int_arg(args, "tail_lines")?;
            let logs = timed(elapsed, cluster.get_pod_logs(namespace, pod_name, tail_lines)).await?;
            Ok(into_data(json!({
                "namespace": namespace,
                "pod_name": pod_name,
                "logs": logs,
            })))
        }
        "describe_resource" => {
            let namespace = str_arg(args, "namespace")?;
            let resource_type = str_arg(args, "resource_type")?;
            let resource_name = str_arg(args, "resource_name")?;
            if DescribableKind::resolve(resource_type).is_none() {
                return Err(ToolError::InvalidArgument(format!(
                    "Unsupported resource_type: {}",
                    resource_type
                )));
            }
            let resource = timed(
                elapsed,
                cluster.describe_resource(namespace, resource_type, resource_name),
            )
            .await?;
            Ok(into_data(json!({
                "namespace": namespace,
                "resource_type": resource_type,
                "resource_name": resource_name,
                "resource": resource,
            })))
        }
        "get_namespace_info" => {
            let namespace = str_arg(args, "namespace")?;
            let details = timed(elapsed, cluster.get_namespace_info(namespace)).await?;
            Ok(into_data(to_value(&details)?))
        }
        "get_resource_usage" => {
            let namespace = str_arg(args, "namespace")?;
            let usage = timed(elapsed, cluster.get_resource_usage(namespace)).await?;
            Ok(into_data(to_value(&usage)?))
        }
        "get_cluster_health" => {
            let health = timed(elapsed, cluster.get_cluster_health()).await?;
            Ok(into_data(to_value(&health)?))
        }
        "scale_deployment" => {
            let namespace = str_arg(args, "namespace")?;
            let deployment = str_arg(args, "deployment_name")?;
            let replicas = int_arg(args, "replicas")?;
            let replicas = i32::try_from(replicas).map_err(|_| {
                ToolError::InvalidArgument(format!("replicas out of range: {}", replicas))
            })?;
            let outcome =
                timed(elapsed, cluster.scale_deployment(namespace, deployment, replicas)).await?;
            Ok(into_data(to_value(&outcome)?))
        }
        "restart_deployment" => {
            let namespace = str_arg(args, "namespace")?;
            let deployment = str_arg(args, "deployment_name")?;
            let outcome = timed(elapsed, cluster.restart_deployment(namespace, deployment)).await?;
            Ok(into_data(to_value(&outcome)?))
        }
        "delete_pod" => {
            let namespace = str_arg(args, "namespace")?;
            let pod_name = str_arg(args, "pod_name")?;
            let outcome = timed(elapsed, cluster.delete_pod(namespace, pod_name)).await?;
            Ok(into_data(to_value(&outcome)?))
        }
        "create_namespace" => {
            let name = str_arg(args, "name")?;
            let labels = labels_arg(args, "labels");
            let outcome = timed(elapsed, cluster.create_namespace(name, labels)).await?;
            Ok(into_data(to_value(&outcome)?))
        }
        "delete_namespace" => {
            let name = str_arg(args, "name")?;
            let outcome = timed(elapsed, cluster.delete_namespace(name)).await?;
            Ok(into_data(to_value(&outcome)?))
        }
        "intelligent_cluster_analysis" => {
            intelligent_cluster_analysis(cluster.as_ref(), llm, args, elapsed).await
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

/// Best-effort textual snapshot used as LLM context.
async fn cluster_snapshot(
    cluster: &dyn ClusterGateway,
    namespace: Option<&str>,
) -> crate::Result<String> {
    let namespaces = cluster.list_namespaces().await?;
    let mut snapshot = format!("Cluster Information:\n- Total namespaces: {}\n", namespaces.len());

    match namespace {
        Some(namespace) => {
            let pods = cluster.list_pods(namespace).await?;
            let services = cluster.list_services(namespace).await?;
            let routes = cluster.list_routes(namespace).await?;
            snapshot.push_str(&format!(
                "- Current namespace: {}\n- Pods in namespace: {}\n- Services in namespace: {}\n- Routes in namespace: {}",
                namespace,
                pods.len(),
                services.len(),
                routes.len()
            ));
        }
        None => {
            let names: Vec<&str> = namespaces.iter().take(5).map(|n| n.name.as_str()).collect();
            snapshot.push_str(&format!("- Namespace names: {}", names.join(", ")));
        }
    }

    Ok(snapshot)
}

async fn intelligent_cluster_analysis(
    cluster: &dyn ClusterGateway,
    llm: &LLMGateway,
    args: &ArgumentBag,
    elapsed: &mut Option<Duration>,
) -> ToolOutcome {
    if llm.default_provider().is_none() {
        return Err(ToolError::NoProvider);
    }

    let namespace = opt_str_arg(args, "namespace");
    let snapshot = timed(elapsed, cluster_snapshot(cluster, namespace))
        .await
        .map_err(|e| ToolError::Gather(e.to_string()))?;

    let response = timed(
        elapsed,
        llm.generate(ANALYSIS_PROMPT, Some(&snapshot), opt_str_arg(args, "provider")),
    )
    .await;
    if let Some(err) = llm_failure(&response) {
        return Err(err);
    }

    Ok(into_data(json!({
        "analysis": response.content,
        "provider": response.provider,
        "model": response.model,
        "cluster_info": snapshot,
        "response_time": response.elapsed_seconds,
    })))
}
