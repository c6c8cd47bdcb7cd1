//! Common test utilities for market-dl integration tests
//!
//! The mock server stands in for the remote service: protocol responses are
//! real encoded envelopes, token-exchange responses are real key/value text
//! blocks, and the client under test talks to them through the bundled
//! transport.

#![allow(dead_code)]

use prost::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use market_dl::{DeviceProperties, Endpoints, HttpTransport, Session, proto};

/// Device id used across the integration scenarios (hex "a1b2c3")
pub const DEVICE_ID_NUMERIC: u64 = 0x00a1_b2c3;

/// Encode a payload into response envelope bytes.
pub fn envelope_bytes(payload: proto::Payload) -> Vec<u8> {
    proto::ResponseWrapper {
        payload: Some(payload),
        ..Default::default()
    }
    .encode_to_vec()
}

/// Envelope bytes whose primary slot is empty and whose prefetch slot
/// carries the given payload.
pub fn prefetch_envelope_bytes(primary: proto::Payload, prefetched: proto::Payload) -> Vec<u8> {
    proto::ResponseWrapper {
        payload: Some(primary),
        pre_fetch: vec![proto::PreFetch {
            url: "prefetched".to_string(),
            response: Some(Box::new(proto::ResponseWrapper {
                payload: Some(prefetched),
                ..Default::default()
            })),
        }],
        ..Default::default()
    }
    .encode_to_vec()
}

/// A fresh transport/endpoints/session triple pointed at the mock server.
pub fn client_for(server: &MockServer) -> (HttpTransport, Endpoints, Session) {
    let transport = HttpTransport::new().expect("transport builds");
    let endpoints = Endpoints::with_base(server.uri());
    let session = Session::new("user@example.org", "aas_token", DeviceProperties::default());
    (transport, endpoints, session)
}

/// A session that already holds the state a purchase requires.
pub fn authenticated_session() -> Session {
    let mut session = Session::new("user@example.org", "aas_token", DeviceProperties::default());
    session.install_checkin("a1b2c3", "consistency");
    session.install_device_config_token("cfgTok1");
    session.install_token(market_dl::Service::Play, "playTok1");
    session
}

/// Mount the check-in endpoint returning the scenario device identity.
pub async fn mount_checkin(server: &MockServer) {
    let response = proto::CheckinResponse {
        stats_ok: true,
        android_id: DEVICE_ID_NUMERIC,
        security_token: 7,
        device_checkin_consistency_token: "consistency".to_string(),
        ..Default::default()
    };
    Mock::given(method("POST"))
        .and(path("/checkin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(response.encode_to_vec()))
        .mount(server)
        .await;
}

/// Mount the device configuration upload endpoint.
pub async fn mount_upload_device_config(server: &MockServer, token: &str) {
    let payload = proto::Payload {
        upload_device_config_response: Some(proto::UploadDeviceConfigResponse {
            upload_device_config_token: token.to_string(),
        }),
        ..Default::default()
    };
    Mock::given(method("POST"))
        .and(path("/fdfe/uploadDeviceConfig"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(envelope_bytes(payload)))
        .mount(server)
        .await;
}

/// Mount the token exchange endpoint answering with an `Auth` key.
pub async fn mount_auth(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("Auth={token}\nServices=market\n")),
        )
        .mount(server)
        .await;
}

/// A delivery payload with one base descriptor.
pub fn base_delivery_payload(url: &str, size: i64) -> proto::Payload {
    proto::Payload {
        delivery_response: Some(proto::DeliveryResponse {
            status: 1,
            app_delivery_data: Some(proto::AppDeliveryData {
                download_size: size,
                download_url: url.to_string(),
                ..Default::default()
            }),
        }),
        ..Default::default()
    }
}

/// A buy payload granting the given delivery token.
pub fn buy_payload(delivery_token: &str) -> proto::Payload {
    proto::Payload {
        buy_response: Some(proto::BuyResponse {
            encoded_delivery_token: delivery_token.to_string(),
        }),
        ..Default::default()
    }
}

/// A listing payload with one container item carrying the given sub-items.
pub fn list_payload_with_container(
    sub_items: Vec<proto::Item>,
    next_page_url: &str,
) -> proto::Payload {
    proto::Payload {
        list_response: Some(proto::ListResponse {
            item: vec![proto::Item {
                title: "Container".to_string(),
                container_metadata: Some(proto::ContainerMetadata {
                    browse_url: String::new(),
                    next_page_url: next_page_url.to_string(),
                }),
                sub_item: sub_items,
                ..Default::default()
            }],
        }),
        ..Default::default()
    }
}

/// A cluster sub-item with one app.
pub fn cluster_item(title: &str, browse_url: &str) -> proto::Item {
    proto::Item {
        title: title.to_string(),
        container_metadata: Some(proto::ContainerMetadata {
            browse_url: browse_url.to_string(),
            next_page_url: String::new(),
        }),
        sub_item: vec![app_item(&format!("{title}.app"))],
        ..Default::default()
    }
}

/// A bare app item.
pub fn app_item(package: &str) -> proto::Item {
    proto::Item {
        item_type: 1,
        id: package.to_string(),
        title: package.to_string(),
        details: Some(proto::Details {
            app_details: Some(proto::AppDetails {
                package_name: package.to_string(),
                version_code: 5,
                ..Default::default()
            }),
        }),
        ..Default::default()
    }
}
