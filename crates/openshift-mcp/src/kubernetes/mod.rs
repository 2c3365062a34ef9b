//! Cluster access: the gateway seam, its `kube` implementation and the
//! resource summaries it returns.

pub mod client;
pub mod gateway;
pub mod quantity;
pub mod resources;

pub use client::{KubeCluster, KubeConnector};
pub use gateway::{ClusterConnector, ClusterGateway, ConnectParams};
pub use resources::{
    ApplicationInfo, ClusterHealth, ConfigMapInfo, DescribableKind, MutationOutcome,
    NamespaceDetails, NamespaceInfo, PodInfo, ResourceUsage, RouteInfo, SecretInfo, ServiceInfo,
};

#[cfg(test)]
pub use gateway::{MockClusterConnector, MockClusterGateway};
