//! Watch Target
//!
//! Identifies one resource collection and derives the list and watch
//! endpoint paths for it. The gateway serves Fluid custom resources under
//! `/kapis/data.fluid.io/v1alpha1`, with a namespaced and a cluster-wide
//! path shape and a `/clusters/{cluster}` prefix for non-host clusters.

const API_GROUP_PREFIX: &str = "/kapis/data.fluid.io/v1alpha1";

/// The cluster identifier that maps to the un-prefixed path.
pub const HOST_CLUSTER: &str = "host";

/// One watched resource collection: (cluster, namespace, resource plural).
///
/// An empty namespace means "all namespaces" and selects the cluster-wide
/// path shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    /// Collection-name form of the resource kind, e.g. "datasets".
    pub resource_plural: String,
    /// Namespace to scope the watch to; empty watches all namespaces.
    pub namespace: String,
    /// Cluster identifier used to derive the path prefix.
    pub cluster: String,
}

impl WatchTarget {
    /// Create a target for `resource_plural` on the host cluster, all
    /// namespaces.
    pub fn new(resource_plural: impl Into<String>) -> Self {
        Self {
            resource_plural: resource_plural.into(),
            namespace: String::new(),
            cluster: HOST_CLUSTER.to_string(),
        }
    }

    /// Scope the target to a namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Address the target through a specific cluster.
    pub fn cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }

    /// Path of the collection list endpoint.
    pub fn list_path(&self) -> String {
        let prefix = if self.cluster == HOST_CLUSTER {
            String::new()
        } else {
            format!("/clusters/{}", self.cluster)
        };

        if self.namespace.is_empty() {
            format!("{}{}/{}", prefix, API_GROUP_PREFIX, self.resource_plural)
        } else {
            format!(
                "{}{}/namespaces/{}/{}",
                prefix, API_GROUP_PREFIX, self.namespace, self.resource_plural
            )
        }
    }

    /// Path of the streaming watch endpoint.
    pub fn watch_path(&self) -> String {
        format!("{}?watch=true", self.list_path())
    }

    /// Absolute list URL against an HTTP base (e.g. `http://gateway:8080`).
    pub fn list_url(&self, http_base: &str) -> String {
        format!("{}{}", http_base.trim_end_matches('/'), self.list_path())
    }

    /// Absolute watch URL against a WebSocket base (e.g. `ws://gateway:8080`).
    pub fn watch_url(&self, ws_base: &str) -> String {
        format!("{}{}", ws_base.trim_end_matches('/'), self.watch_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_list_path() {
        let target = WatchTarget::new("datasets").namespace("team-a");
        assert_eq!(
            target.list_path(),
            "/kapis/data.fluid.io/v1alpha1/namespaces/team-a/datasets"
        );
    }

    #[test]
    fn test_all_namespaces_list_path() {
        let target = WatchTarget::new("dataloads");
        assert_eq!(target.list_path(), "/kapis/data.fluid.io/v1alpha1/dataloads");
    }

    #[test]
    fn test_member_cluster_prefix() {
        let target = WatchTarget::new("datasets")
            .namespace("team-a")
            .cluster("member-1");
        assert_eq!(
            target.list_path(),
            "/clusters/member-1/kapis/data.fluid.io/v1alpha1/namespaces/team-a/datasets"
        );
    }

    #[test]
    fn test_host_cluster_has_no_prefix() {
        let target = WatchTarget::new("datasets").cluster("host");
        assert_eq!(target.list_path(), "/kapis/data.fluid.io/v1alpha1/datasets");
    }

    #[test]
    fn test_watch_path_appends_watch_flag() {
        let target = WatchTarget::new("datasets").namespace("team-a");
        assert_eq!(
            target.watch_path(),
            "/kapis/data.fluid.io/v1alpha1/namespaces/team-a/datasets?watch=true"
        );
    }

    #[test]
    fn test_absolute_urls() {
        let target = WatchTarget::new("datasets").namespace("team-a");
        assert_eq!(
            target.list_url("http://gateway:8080/"),
            "http://gateway:8080/kapis/data.fluid.io/v1alpha1/namespaces/team-a/datasets"
        );
        assert_eq!(
            target.watch_url("ws://gateway:8080"),
            "ws://gateway:8080/kapis/data.fluid.io/v1alpha1/namespaces/team-a/datasets?watch=true"
        );
    }

    #[test]
    fn test_empty_plural_is_not_rejected() {
        // Caller contract violation: surfaces at the server, not here.
        let target = WatchTarget::new("");
        assert_eq!(target.list_path(), "/kapis/data.fluid.io/v1alpha1/");
    }
}
