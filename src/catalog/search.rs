//! Search queries
//!
//! Search results arrive as a listing whose sub-items mix apps with other
//! media and cross-sell clusters. Only app sub-items (discriminator 45) are
//! kept, and only generic continuation cursors are followed — the
//! "similar"/"related to your search" cursors lead away from the query.

use crate::config::Endpoints;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::models::App;
use crate::proto;
use crate::session::Session;
use crate::stream::apps_from_item;
use crate::transport::Transport;

/// Classification of a search continuation cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchCursorKind {
    /// Plain continuation of the same result stream
    Generic,
    /// "Similar apps" side cluster
    Similar,
    /// "Related to your search" side cluster
    RelatedToSearch,
    /// Unusable cursor
    Bogus,
}

/// One continuation cursor discovered in a search response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchCursor {
    /// The relative cursor
    pub cursor: String,
    /// What following it yields
    pub kind: SearchCursorKind,
}

/// One page of search results
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchBundle {
    /// Apps on this page, in server order
    pub apps: Vec<App>,
    /// Generic continuation cursors for fetching more results
    pub cursors: Vec<SearchCursor>,
}

impl SearchBundle {
    /// Whether more results can be fetched.
    pub fn has_next(&self) -> bool {
        !self.cursors.is_empty()
    }
}

/// Discriminator marking app items inside search responses
const SEARCH_APP_ITEM: i32 = 45;

/// Marker distinguishing side-cluster cursors from plain continuations
const SIDE_CLUSTER_MARKER: &str = "_-";

fn classify_cursor(cursor: &str) -> SearchCursor {
    let kind = if cursor.is_empty() {
        SearchCursorKind::Bogus
    } else if cursor.contains(SIDE_CLUSTER_MARKER) {
        if cursor.starts_with("getCluster?enpt=CkC") {
            SearchCursorKind::Similar
        } else if cursor.starts_with("getCluster?enpt=CkG") {
            SearchCursorKind::RelatedToSearch
        } else {
            SearchCursorKind::Bogus
        }
    } else {
        SearchCursorKind::Generic
    };
    SearchCursor {
        cursor: cursor.to_string(),
        kind,
    }
}

fn cursor_of(item: &proto::Item) -> SearchCursor {
    let next = item
        .container_metadata
        .as_ref()
        .map(|m| m.next_page_url.as_str())
        .unwrap_or_default();
    classify_cursor(next)
}

/// Build a search bundle from a listing payload, keeping only app items
/// and generic continuation cursors.
pub(crate) fn bundle_from_list(list: &proto::ListResponse) -> SearchBundle {
    let mut bundle = SearchBundle::default();
    for item in &list.item {
        for sub_item in &item.sub_item {
            if sub_item.item_type == SEARCH_APP_ITEM
                && (sub_item.title.is_empty() || sub_item.title == "Apps")
            {
                bundle.apps.extend(apps_from_item(sub_item));
            }
            let cursor = cursor_of(sub_item);
            if cursor.kind == SearchCursorKind::Generic {
                bundle.cursors.push(cursor);
            }
        }
        let cursor = cursor_of(item);
        if cursor.kind == SearchCursorKind::Generic {
            bundle.cursors.push(cursor);
        }
    }
    bundle
}

/// Run a search query.
///
/// Returns an empty bundle when the server rejects the call — an empty
/// result page and a rejected search are indistinguishable to callers by
/// design, matching the pagination terminal-state rule.
pub async fn search(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    query: &str,
) -> Result<SearchBundle> {
    let headers = session.default_headers();
    let params = [
        ("q".to_string(), query.to_string()),
        ("c".to_string(), "3".to_string()),
        ("ksm".to_string(), "1".to_string()),
    ];

    let response = transport
        .get(&endpoints.search(), &headers, &params)
        .await?;
    if !response.successful {
        tracing::debug!(query, status = response.status, "search rejected");
        return Ok(SearchBundle::default());
    }

    let envelope = Envelope::decode(&response.body)?;
    Ok(envelope
        .list_response()
        .map(bundle_from_list)
        .unwrap_or_default())
}

/// Follow the generic continuation cursors of a previous page.
///
/// The results of all cursors are concatenated into one composite bundle.
pub async fn next_search(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    cursors: &[SearchCursor],
) -> Result<SearchBundle> {
    let headers = session.default_headers();
    let mut composite = SearchBundle::default();

    for cursor in cursors.iter().filter(|c| c.kind == SearchCursorKind::Generic) {
        let url = format!("{}/{}", endpoints.search(), cursor.cursor);
        let response = transport.get(&url, &headers, &[]).await?;
        if !response.successful {
            continue;
        }
        let envelope = Envelope::decode(&response.body)?;
        if let Some(list) = envelope.list_response() {
            let page = bundle_from_list(list);
            composite.apps.extend(page.apps);
            composite.cursors.extend(page.cursors);
        }
    }
    Ok(composite)
}

/// Fetch search suggestions for a partial query.
pub async fn search_suggestions(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    query: &str,
) -> Result<Vec<String>> {
    let headers = session.default_headers();
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    // sst is repeated (2 = text entry, 3 = app id), so the query string is
    // pre-encoded rather than built from a parameter map.
    let raw_query = format!("q={encoded}&sb=5&sst=2&sst=3");

    let response = transport
        .get_raw_query(&endpoints.search_suggest(), &headers, &raw_query)
        .await?;
    if !response.successful {
        return Ok(Vec::new());
    }

    let envelope = Envelope::decode(&response.body)?;
    let suggestions = match envelope.resolved() {
        crate::envelope::PayloadKind::SearchSuggest(response) => response
            .entry
            .iter()
            .map(|entry| {
                if entry.suggested_query.is_empty() {
                    entry.title.clone()
                } else {
                    entry.suggested_query.clone()
                }
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    };
    Ok(suggestions)
}
