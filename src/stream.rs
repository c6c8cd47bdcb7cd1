//! Pagination/stream decoding
//!
//! Listing responses group items one level deep: the first top-level item
//! is a container whose sub-items are the clusters. Each cluster is keyed
//! by the hash of its browse cursor; the container's next-page cursor pages
//! the whole bundle. "Get more" re-invokes the same fetch-and-decode path
//! against a server-supplied relative cursor — all filtering state is
//! already encoded in the cursor.
//!
//! A failed or undecodable next-page fetch yields an empty cluster/bundle
//! rather than an error: absence of more results is a valid terminal state.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::config::Endpoints;
use crate::envelope::Envelope;
use crate::models::App;
use crate::proto;
use crate::session::Session;
use crate::transport::Transport;

/// A named, cursor-keyed group of listing items
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamCluster {
    /// Cluster identity: the hash of its browse cursor
    pub id: i64,
    /// Cluster title (empty when absent)
    pub title: String,
    /// Cluster subtitle (empty when absent)
    pub subtitle: String,
    /// Browse cursor identifying the cluster
    pub browse_url: String,
    /// Cursor fetching more of this cluster (empty when exhausted)
    pub next_page_url: String,
    /// Apps referenced by the cluster, in server order
    pub apps: Vec<App>,
}

impl StreamCluster {
    /// Whether more pages of this cluster can be fetched.
    pub fn has_next(&self) -> bool {
        !self.next_page_url.is_empty()
    }
}

/// A keyed collection of clusters plus the bundle's own next-page cursor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamBundle {
    /// Bundle title from the container item
    pub title: String,
    /// Cursor fetching the next page of the bundle (empty when exhausted)
    pub next_page_url: String,
    /// Clusters keyed by their browse-cursor hash
    pub clusters: HashMap<i64, StreamCluster>,
}

impl StreamBundle {
    /// Whether more pages of this bundle can be fetched.
    pub fn has_next(&self) -> bool {
        !self.next_page_url.is_empty()
    }
}

/// Stable in-process identity for a browse cursor.
fn cursor_hash(cursor: &str) -> i64 {
    let mut hasher = DefaultHasher::new();
    cursor.hash(&mut hasher);
    hasher.finish() as i64
}

fn browse_url(item: &proto::Item) -> String {
    item.container_metadata
        .as_ref()
        .map(|m| m.browse_url.clone())
        .unwrap_or_default()
}

fn next_page_url(item: &proto::Item) -> String {
    item.container_metadata
        .as_ref()
        .map(|m| m.next_page_url.clone())
        .unwrap_or_default()
}

/// Extract the apps from an item's sub-items (discriminator 1 = app).
pub fn apps_from_item(item: &proto::Item) -> Vec<App> {
    item.sub_item
        .iter()
        .filter(|sub| sub.item_type == 1)
        .map(App::from_item)
        .collect()
}

/// Decode one cluster from a container sub-item.
pub fn cluster_from_item(item: &proto::Item) -> StreamCluster {
    let browse = browse_url(item);
    StreamCluster {
        id: cursor_hash(&browse),
        title: item.title.clone(),
        subtitle: item.subtitle.clone(),
        browse_url: browse,
        next_page_url: next_page_url(item),
        apps: apps_from_item(item),
    }
}

/// Decode the first cluster of a listing response.
pub fn cluster_from_list(list: &proto::ListResponse) -> StreamCluster {
    list.item
        .first()
        .and_then(|item| item.sub_item.first())
        .map(cluster_from_item)
        .unwrap_or_default()
}

/// Decode a bundle from a listing response.
///
/// Exactly the first top-level item is scanned: each of its sub-items
/// becomes one cluster, keyed by its cursor hash (duplicate cursors
/// overwrite benignly, last write wins), and the bundle's next-page cursor
/// is the first item's.
pub fn bundle_from_list(list: &proto::ListResponse) -> StreamBundle {
    let Some(container) = list.item.first() else {
        return StreamBundle::default();
    };
    if container.sub_item.is_empty() {
        return StreamBundle::default();
    }

    let mut clusters = HashMap::new();
    for sub_item in &container.sub_item {
        let cluster = cluster_from_item(sub_item);
        clusters.insert(cluster.id, cluster);
    }
    StreamBundle {
        title: container.title.clone(),
        next_page_url: next_page_url(container),
        clusters,
    }
}

async fn fetch_list(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    cursor: &str,
) -> Option<proto::ListResponse> {
    let url = endpoints.resolve_cursor(cursor);
    let headers = session.default_headers();
    let response = match transport.get(&url, &headers, &[]).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(cursor, error = %err, "next-page fetch failed");
            return None;
        }
    };
    if !response.successful {
        tracing::debug!(cursor, status = response.status, "next-page fetch unsuccessful");
        return None;
    }
    match Envelope::decode(&response.body) {
        Ok(envelope) => envelope.list_response().cloned(),
        Err(err) => {
            tracing::warn!(cursor, error = %err, "next-page decode failed");
            None
        }
    }
}

/// Fetch and decode the next page of a cluster.
///
/// Returns an empty cluster when the fetch fails or decodes to nothing.
pub async fn next_cluster(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    cursor: &str,
) -> StreamCluster {
    match fetch_list(transport, endpoints, session, cursor).await {
        Some(list) => cluster_from_list(&list),
        None => StreamCluster::default(),
    }
}

/// Fetch and decode the next page of a bundle.
///
/// Returns an empty bundle when the fetch fails or decodes to nothing.
pub async fn next_bundle(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    cursor: &str,
) -> StreamBundle {
    match fetch_list(transport, endpoints, session, cursor).await {
        Some(list) => bundle_from_list(&list),
        None => StreamBundle::default(),
    }
}
