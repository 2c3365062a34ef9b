use serde_json::{json, Map, Value};
use std::fmt;

use super::{ArgumentBag, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFamily {
    Connection,
    ClusterRead,
    ClusterMutation,
    Llm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Integer,
    Boolean,
    Object,
}

impl ArgKind {
    fn json_type(&self) -> &'static str {
        match self {
            ArgKind::String => "string",
            ArgKind::Integer => "integer",
            ArgKind::Boolean => "boolean",
            ArgKind::Object => "object",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_type())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgDefault {
    Integer(i64),
    EmptyObject,
}

impl ArgDefault {
    fn to_value(self) -> Value {
        match self {
            ArgDefault::Integer(i) => json!(i),
            ArgDefault::EmptyObject => Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub description: &'static str,
    pub default: Option<ArgDefault>,
}

const fn arg(name: &'static str, kind: ArgKind, description: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind,
        description,
        default: None,
    }
}

const fn arg_or(
    name: &'static str,
    kind: ArgKind,
    description: &'static str,
    default: ArgDefault,
) -> ArgSpec {
    ArgSpec {
        name,
        kind,
        description,
        default: Some(default),
    }
}

/// Static description of one tool and its argument contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub family: ToolFamily,
    pub requires_connection: bool,
    pub required: &'static [ArgSpec],
    pub optional: &'static [ArgSpec],
}

const NAMESPACE: ArgSpec = arg("namespace", ArgKind::String, "Namespace to query");
const POD_NAME: ArgSpec = arg("pod_name", ArgKind::String, "Name of the pod");
const DEPLOYMENT_NAME: ArgSpec = arg("deployment_name", ArgKind::String, "Name of the deployment");
const NAMESPACE_NAME: ArgSpec = arg("name", ArgKind::String, "Namespace name");
const PROVIDER: ArgSpec = arg(
    "provider",
    ArgKind::String,
    "LLM provider to use (gemini, openai, claude, custom)",
);

const NO_ARGS: &[ArgSpec] = &[];
const NAMESPACE_ONLY: &[ArgSpec] = &[NAMESPACE];
const POD_ARGS: &[ArgSpec] = &[NAMESPACE, POD_NAME];
const DEPLOYMENT_ARGS: &[ArgSpec] = &[NAMESPACE, DEPLOYMENT_NAME];
const SCALE_ARGS: &[ArgSpec] = &[
    NAMESPACE,
    DEPLOYMENT_NAME,
    arg("replicas", ArgKind::Integer, "Desired replica count"),
];
const DESCRIBE_ARGS: &[ArgSpec] = &[
    NAMESPACE,
    arg(
        "resource_type",
        ArgKind::String,
        "Resource type (Pod, Service, Deployment, Route, etc.)",
    ),
    arg("resource_name", ArgKind::String, "Name of the resource"),
];
const NAME_ONLY: &[ArgSpec] = &[NAMESPACE_NAME];
const CONNECT_ARGS: &[ArgSpec] = &[
    arg("cluster_url", ArgKind::String, "OpenShift API server URL"),
    arg("token", ArgKind::String, "Bearer token for authentication"),
];
const CONNECT_OPTIONS: &[ArgSpec] = &[arg(
    "verify_ssl",
    ArgKind::Boolean,
    "Verify the API server certificate",
)];
const LOG_OPTIONS: &[ArgSpec] = &[arg_or(
    "tail_lines",
    ArgKind::Integer,
    "Number of lines to retrieve",
    ArgDefault::Integer(100),
)];
const LABEL_OPTIONS: &[ArgSpec] = &[arg_or(
    "labels",
    ArgKind::Object,
    "Labels to set on the namespace",
    ArgDefault::EmptyObject,
)];
const QUESTION_ARGS: &[ArgSpec] = &[arg("question", ArgKind::String, "The question to ask")];
const QUESTION_OPTIONS: &[ArgSpec] = &[
    arg("context", ArgKind::String, "Additional context for the question"),
    PROVIDER,
];
const PROVIDER_ONLY: &[ArgSpec] = &[PROVIDER];
const ANALYSIS_OPTIONS: &[ArgSpec] = &[
    arg("namespace", ArgKind::String, "Namespace to focus on"),
    PROVIDER,
];
const ISSUE_ARGS: &[ArgSpec] = &[arg(
    "issue_description",
    ArgKind::String,
    "What is going wrong",
)];
const ISSUE_OPTIONS: &[ArgSpec] = &[
    arg("error_messages", ArgKind::String, "Relevant error messages or logs"),
    PROVIDER,
];

const fn tool(
    name: &'static str,
    description: &'static str,
    family: ToolFamily,
    required: &'static [ArgSpec],
    optional: &'static [ArgSpec],
) -> ToolSpec {
    ToolSpec {
        name,
        description,
        family,
        requires_connection: !matches!(family, ToolFamily::Connection | ToolFamily::Llm),
        required,
        optional,
    }
}

const fn cluster_read(
    name: &'static str,
    description: &'static str,
    required: &'static [ArgSpec],
) -> ToolSpec {
    tool(name, description, ToolFamily::ClusterRead, required, NO_ARGS)
}

pub static TOOLS: &[ToolSpec] = &[
    tool(
        "connect_cluster",
        "Connect to an OpenShift cluster using a bearer token",
        ToolFamily::Connection,
        CONNECT_ARGS,
        CONNECT_OPTIONS,
    ),
    cluster_read("list_namespaces", "List all namespaces/projects in the cluster", NO_ARGS),
    cluster_read("list_pods", "List pods in a namespace", NAMESPACE_ONLY),
    cluster_read("list_services", "List services in a namespace", NAMESPACE_ONLY),
    cluster_read("list_routes", "List routes in a namespace", NAMESPACE_ONLY),
    cluster_read("list_configmaps", "List configmaps in a namespace", NAMESPACE_ONLY),
    cluster_read(
        "list_secrets",
        "List secrets (names and keys only) in a namespace",
        NAMESPACE_ONLY,
    ),
    cluster_read(
        "list_applications",
        "List deployments, statefulsets and daemonsets in a namespace",
        NAMESPACE_ONLY,
    ),
    tool(
        "get_pod_logs",
        "Get logs from a pod",
        ToolFamily::ClusterRead,
        POD_ARGS,
        LOG_OPTIONS,
    ),
    cluster_read(
        "describe_resource",
        "Describe a specific resource in a namespace",
        DESCRIBE_ARGS,
    ),
    cluster_read(
        "get_namespace_info",
        "Namespace details including resource quotas and limit ranges",
        NAMESPACE_ONLY,
    ),
    cluster_read(
        "get_resource_usage",
        "Sum CPU and memory requests/limits for pods in a namespace",
        NAMESPACE_ONLY,
    ),
    cluster_read(
        "get_cluster_health",
        "Node readiness, namespace count and pod totals by phase",
        NO_ARGS,
    ),
    tool(
        "scale_deployment",
        "Scale a deployment to the given number of replicas",
        ToolFamily::ClusterMutation,
        SCALE_ARGS,
        NO_ARGS,
    ),
    tool(
        "restart_deployment",
        "Restart a deployment by rolling its pods",
        ToolFamily::ClusterMutation,
        DEPLOYMENT_ARGS,
        NO_ARGS,
    ),
    tool(
        "delete_pod",
        "Delete a pod",
        ToolFamily::ClusterMutation,
        POD_ARGS,
        NO_ARGS,
    ),
    tool(
        "create_namespace",
        "Create a namespace",
        ToolFamily::ClusterMutation,
        NAME_ONLY,
        LABEL_OPTIONS,
    ),
    tool(
        "delete_namespace",
        "Delete a namespace",
        ToolFamily::ClusterMutation,
        NAME_ONLY,
        NO_ARGS,
    ),
    tool(
        "ask_llm",
        "Ask the LLM a question about OpenShift management",
        ToolFamily::Llm,
        QUESTION_ARGS,
        QUESTION_OPTIONS,
    ),
    tool(
        "get_llm_providers",
        "List configured LLM providers",
        ToolFamily::Llm,
        NO_ARGS,
        NO_ARGS,
    ),
    tool(
        "test_llm_connection",
        "Check reachability of one or all LLM providers",
        ToolFamily::Llm,
        NO_ARGS,
        PROVIDER_ONLY,
    ),
    ToolSpec {
        name: "intelligent_cluster_analysis",
        description: "Summarize cluster state and ask the LLM for an assessment",
        family: ToolFamily::Llm,
        requires_connection: true,
        required: NO_ARGS,
        optional: ANALYSIS_OPTIONS,
    },
    tool(
        "get_troubleshooting_help",
        "Get LLM troubleshooting guidance for an issue",
        ToolFamily::Llm,
        ISSUE_ARGS,
        ISSUE_OPTIONS,
    ),
];

pub fn lookup(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Coerce a value to the declared kind. Numeric and boolean strings are accepted.
fn coerce(spec: &ArgSpec, value: &Value) -> Result<Value, ToolError> {
    let invalid = || {
        ToolError::InvalidArgument(format!("{} must be of type {}", spec.name, spec.kind))
    };

    match (spec.kind, value) {
        (ArgKind::String, Value::String(_)) => Ok(value.clone()),
        (ArgKind::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (ArgKind::Integer, Value::Number(n)) => n.as_i64().map(|i| json!(i)).ok_or_else(invalid),
        (ArgKind::Integer, Value::String(s)) => {
            s.trim().parse::<i64>().map(|i| json!(i)).map_err(|_| invalid())
        }
        (ArgKind::Boolean, Value::Bool(_)) => Ok(value.clone()),
        (ArgKind::Boolean, Value::String(s)) => match s.to_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        (ArgKind::Object, Value::Object(_)) => Ok(value.clone()),
        _ => Err(invalid()),
    }
}

impl ToolSpec {
    /// JSON schema advertised through `tools/list`.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for spec in self.required.iter().chain(self.optional.iter()) {
            let mut property = json!({
                "type": spec.kind.json_type(),
                "description": spec.description,
            });
            if let (Some(default), Value::Object(obj)) = (spec.default, &mut property) {
                obj.insert("default".to_string(), default.to_value());
            }
            properties.insert(spec.name.to_string(), property);
        }

        let required: Vec<&str> = self.required.iter().map(|s| s.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check required arguments, coerce types and fill defaults.
    /// Keys the tool does not declare are dropped.
    pub fn validate(&self, args: &ArgumentBag) -> Result<ArgumentBag, ToolError> {
        let mut out = ArgumentBag::new();

        for spec in self.required {
            let value = args.get(spec.name);
            if is_missing(value) {
                return Err(ToolError::MissingArgument(spec.name.to_string()));
            }
            if let Some(value) = value {
                out.insert(spec.name.to_string(), coerce(spec, value)?);
            }
        }

        for spec in self.optional {
            match args.get(spec.name) {
                value if is_missing(value) => {
                    if let Some(default) = spec.default {
                        out.insert(spec.name.to_string(), default.to_value());
                    }
                }
                Some(value) => {
                    out.insert(spec.name.to_string(), coerce(spec, value)?);
                }
                None => {}
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(value: Value) -> ArgumentBag {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn tool_names_are_unique() {
        let mut names: Vec<&str> = TOOLS.iter().map(|t| t.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), TOOLS.len());
    }

    #[test]
    fn missing_required_is_reported_by_name() {
        let spec = lookup("scale_deployment").unwrap();
        let err = spec
            .validate(&bag(json!({"namespace": "shop", "replicas": 3})))
            .unwrap_err();
        assert_eq!(err, ToolError::MissingArgument("deployment_name".into()));
    }

    #[test]
    fn null_and_empty_count_as_missing() {
        let spec = lookup("list_pods").unwrap();
        assert!(spec.validate(&bag(json!({"namespace": null}))).is_err());
        assert!(spec.validate(&bag(json!({"namespace": ""}))).is_err());
    }

    #[test]
    fn zero_replicas_is_present() {
        let spec = lookup("scale_deployment").unwrap();
        let args = spec
            .validate(&bag(json!({
                "namespace": "shop",
                "deployment_name": "api",
                "replicas": 0
            })))
            .unwrap();
        assert_eq!(args["replicas"], json!(0));
    }

    #[test]
    fn defaults_are_filled_and_unknown_keys_dropped() {
        let spec = lookup("get_pod_logs").unwrap();
        let args = spec
            .validate(&bag(json!({
                "namespace": "shop",
                "pod_name": "api-0",
                "follow": true
            })))
            .unwrap();
        assert_eq!(args["tail_lines"], json!(100));
        assert!(!args.contains_key("follow"));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let spec = lookup("scale_deployment").unwrap();
        let args = spec
            .validate(&bag(json!({
                "namespace": "shop",
                "deployment_name": "api",
                "replicas": "4"
            })))
            .unwrap();
        assert_eq!(args["replicas"], json!(4));
    }

    #[test]
    fn wrong_type_is_invalid() {
        let spec = lookup("create_namespace").unwrap();
        let err = spec
            .validate(&bag(json!({"name": "team-a", "labels": "env=dev"})))
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArgument("labels must be of type object".into())
        );
    }

    #[test]
    fn schema_lists_required_and_defaults() {
        let schema = lookup("get_pod_logs").unwrap().input_schema();
        assert_eq!(schema["required"], json!(["namespace", "pod_name"]));
        assert_eq!(schema["properties"]["tail_lines"]["default"], json!(100));
    }
}
