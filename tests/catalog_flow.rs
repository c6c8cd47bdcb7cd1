//! Catalog and pagination flows against a mock server: details, search
//! with prefetch fallback, stream bundles, reviews, and library access.

mod common;

use common::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use market_dl::{Error, catalog, proto, stream};

#[tokio::test]
async fn app_details_builds_the_app_model() {
    let server = MockServer::start().await;
    let payload = proto::Payload {
        details_response: Some(proto::DetailsResponse {
            item: Some(app_item("com.example.app")),
            ..Default::default()
        }),
        ..Default::default()
    };
    Mock::given(method("GET"))
        .and(path("/fdfe/details"))
        .and(query_param("doc", "com.example.app"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(envelope_bytes(payload)))
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let app = catalog::app_details(&transport, &endpoints, &session, "com.example.app")
        .await
        .expect("details succeed");
    assert_eq!(app.package_name, "com.example.app");
    assert_eq!(app.version_code, 5);
}

#[tokio::test]
async fn rejected_details_map_to_app_not_found_with_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fdfe/details"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Item not found"))
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let err = catalog::app_details(&transport, &endpoints, &session, "com.example.gone")
        .await
        .expect_err("a rejected details call must fail");
    match err {
        Error::AppNotFound { reason } => assert!(reason.contains("Item not found")),
        other => panic!("expected AppNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn bulk_details_collects_present_entries() {
    let server = MockServer::start().await;
    let payload = proto::Payload {
        bulk_details_response: Some(proto::BulkDetailsResponse {
            entry: vec![
                proto::BulkDetailsEntry {
                    item: Some(app_item("com.example.one")),
                },
                // Unknown package: entry without an item
                proto::BulkDetailsEntry { item: None },
                proto::BulkDetailsEntry {
                    item: Some(app_item("com.example.two")),
                },
            ],
        }),
        ..Default::default()
    };
    Mock::given(method("POST"))
        .and(path("/fdfe/bulkDetails"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(envelope_bytes(payload)))
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let apps = catalog::bulk_details(
        &transport,
        &endpoints,
        &session,
        &[
            "com.example.one".to_string(),
            "com.example.gone".to_string(),
            "com.example.two".to_string(),
        ],
    )
    .await
    .expect("bulk details succeed");

    assert_eq!(apps.len(), 2, "absent packages are silently skipped");
    assert_eq!(apps[0].package_name, "com.example.one");
    assert_eq!(apps[1].package_name, "com.example.two");
}

#[tokio::test]
async fn search_resolves_results_from_the_prefetch_slot() {
    let server = MockServer::start().await;

    let empty_primary = proto::Payload {
        list_response: Some(proto::ListResponse::default()),
        ..Default::default()
    };
    let real_results = proto::Payload {
        list_response: Some(proto::ListResponse {
            item: vec![proto::Item {
                sub_item: vec![proto::Item {
                    item_type: 45,
                    sub_item: vec![app_item("com.example.hit")],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }),
        ..Default::default()
    };
    Mock::given(method("GET"))
        .and(path("/fdfe/search"))
        .and(query_param("q", "example"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(prefetch_envelope_bytes(empty_primary, real_results)),
        )
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let bundle = catalog::search(&transport, &endpoints, &session, "example")
        .await
        .expect("search succeeds");
    assert_eq!(
        bundle.apps.len(),
        1,
        "an empty primary slot must defer to the prefetched results"
    );
    assert_eq!(bundle.apps[0].package_name, "com.example.hit");
}

#[tokio::test]
async fn stream_bundle_decodes_clusters_keyed_by_cursor() {
    let server = MockServer::start().await;
    let payload = list_payload_with_container(
        vec![
            cluster_item("Top", "browse/top"),
            cluster_item("New", "browse/new"),
            cluster_item("Trending", "browse/trending"),
        ],
        "page/2",
    );
    Mock::given(method("GET"))
        .and(path("/fdfe/getMoreStream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(envelope_bytes(payload)))
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let bundle =
        stream::next_bundle(&transport, &endpoints, &session, "getMoreStream").await;
    assert_eq!(bundle.clusters.len(), 3);
    assert_eq!(bundle.next_page_url, "page/2");
    assert!(bundle.has_next());
    let titles: std::collections::HashSet<&str> = bundle
        .clusters
        .values()
        .map(|c| c.title.as_str())
        .collect();
    assert!(titles.contains("Top") && titles.contains("New") && titles.contains("Trending"));
}

#[tokio::test]
async fn failed_next_page_yields_an_empty_bundle_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fdfe/getMoreStream"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let bundle = stream::next_bundle(&transport, &endpoints, &session, "getMoreStream").await;
    assert!(
        bundle.clusters.is_empty() && !bundle.has_next(),
        "absence of more results is a terminal state, not an error"
    );
}

#[tokio::test]
async fn reviews_page_carries_reviews_and_cursor() {
    let server = MockServer::start().await;
    let payload = proto::Payload {
        review_response: Some(proto::ReviewResponse {
            user_reviews: Some(proto::UserReviewsResponse {
                review: vec![proto::ReviewEntry {
                    star_rating: 5,
                    comment: "great".to_string(),
                    author: Some(proto::ReviewAuthor {
                        name: "Reviewer".to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                matching_count: 1,
            }),
            next_page_url: "rev?ctntkn=next".to_string(),
            user_review: None,
        }),
        ..Default::default()
    };
    Mock::given(method("GET"))
        .and(path("/fdfe/rev"))
        .and(query_param("doc", "com.example.app"))
        .and(query_param("sfilter", "ALL"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(envelope_bytes(payload)))
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let cluster = catalog::reviews(
        &transport,
        &endpoints,
        &session,
        "com.example.app",
        catalog::ReviewFilter::All,
    )
    .await
    .expect("reviews succeed");

    assert_eq!(cluster.reviews.len(), 1);
    assert_eq!(cluster.reviews[0].author, "Reviewer");
    assert!(cluster.has_next());
}

#[tokio::test]
async fn wishlist_collects_apps_across_items() {
    let server = MockServer::start().await;
    let payload = proto::Payload {
        list_response: Some(proto::ListResponse {
            item: vec![
                proto::Item {
                    sub_item: vec![app_item("com.example.one")],
                    ..Default::default()
                },
                proto::Item {
                    sub_item: vec![app_item("com.example.two")],
                    ..Default::default()
                },
            ],
        }),
        ..Default::default()
    };
    Mock::given(method("GET"))
        .and(path("/fdfe/library"))
        .and(query_param("libid", "u-wl"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(envelope_bytes(payload)))
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let apps = catalog::wishlist(&transport, &endpoints, &session)
        .await
        .expect("wishlist succeeds");
    assert_eq!(apps.len(), 2);
}

#[tokio::test]
async fn session_probe_reports_acceptance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fdfe/apps/contentSync"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let valid = catalog::validate_session(&transport, &endpoints, &session)
        .await
        .expect("probe completes");
    assert!(valid);
}

#[tokio::test]
async fn session_probe_reports_rejection_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fdfe/apps/contentSync"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (transport, endpoints, _) = client_for(&server);
    let session = authenticated_session();

    let valid = catalog::validate_session(&transport, &endpoints, &session)
        .await
        .expect("probe completes");
    assert!(!valid, "an expired session is a rejection, not an error");
}
