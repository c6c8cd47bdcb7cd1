//! Device handshake
//!
//! Two exchanges bootstrap a device identity from a static property
//! profile: the check-in produces the durable device identifier and a
//! consistency token, and the device configuration upload produces the
//! token that gates every later authenticated call.
//!
//! Both are purely functional given their input: no retries, no local
//! validation (malformed descriptors are rejected by the remote side and
//! surface as protocol errors).

use prost::Message;

use crate::config::{DeviceProperties, Endpoints};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::proto;
use crate::session::Session;
use crate::transport::Transport;

/// Check-in protocol version
const CHECKIN_VERSION: i32 = 3;

/// Build the capability descriptor block from a device profile.
///
/// The same block is sent on check-in and on the configuration upload; the
/// remote side cross-checks them.
pub(crate) fn device_configuration(properties: &DeviceProperties) -> proto::DeviceConfiguration {
    proto::DeviceConfiguration {
        touch_screen: properties.touch_screen,
        keyboard: properties.keyboard,
        navigation: properties.navigation,
        screen_layout: properties.screen_layout,
        has_hard_keyboard: properties.has_hard_keyboard,
        has_five_way_navigation: properties.has_five_way_navigation,
        screen_density: properties.screen.density,
        gl_es_version: properties.gl_es_version,
        system_shared_library: properties.shared_libraries.clone(),
        system_available_feature: properties.features.clone(),
        native_platform: properties.platforms.clone(),
        screen_width: properties.screen.width,
        screen_height: properties.screen.height,
        system_supported_locale: properties.locales.clone(),
        gl_extension: properties.gl_extensions.clone(),
        device_class: 0,
        max_apk_download_size_mb: properties.max_apk_download_size_mb,
    }
}

pub(crate) fn build_checkin_request(properties: &DeviceProperties) -> proto::CheckinRequest {
    let build = proto::BuildInfo {
        fingerprint: properties.build.fingerprint.clone(),
        product: properties.build.product.clone(),
        carrier: properties.build.manufacturer.clone(),
        bootloader: properties.build.bootloader.clone(),
        client: properties.build.client.clone(),
        timestamp: 0,
        services_version: properties.build.services_version,
        device: properties.build.device.clone(),
        sdk_version: properties.build.sdk_version,
        model: properties.build.model.clone(),
        manufacturer: properties.build.manufacturer.clone(),
        build_product: properties.build.product.clone(),
        ota_installed: properties.build.ota_installed,
    };
    proto::CheckinRequest {
        id: 0,
        checkin: Some(proto::CheckinPayload {
            build: Some(build),
            last_checkin_msec: 0,
            cell_operator: properties.cell_operator.clone(),
            sim_operator: properties.sim_operator.clone(),
            roaming: properties.roaming.clone(),
            user_number: 0,
        }),
        locale: properties.locale.clone(),
        time_zone: properties.time_zone.clone(),
        version: CHECKIN_VERSION,
        device_configuration: Some(device_configuration(properties)),
        fragment: 0,
    }
}

/// Host header value for the check-in endpoint, derived from its URL.
fn host_header(endpoint: &str) -> Option<String> {
    let parsed = url::Url::parse(endpoint).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Run the device check-in.
///
/// Returns the device identifier (lowercase hex) and the consistency token,
/// and installs both on the session. Any transport failure or malformed
/// response is a fatal handshake failure; retries belong to the caller.
pub async fn check_in(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &mut Session,
) -> Result<(String, String)> {
    let request = build_checkin_request(session.properties());
    let body = request.encode_to_vec();

    let endpoint = endpoints.checkin();
    let mut headers = session.auth_headers();
    headers.push((
        "Content-Type".to_string(),
        "application/x-protobuffer".to_string(),
    ));
    if let Some(host) = host_header(&endpoint) {
        headers.push(("Host".to_string(), host));
    }

    let response = transport.post_bytes(&endpoint, &headers, &body).await?;
    if !response.successful {
        return Err(Error::Server {
            code: response.status,
            reason: response.error_text,
        });
    }

    let checkin = proto::CheckinResponse::decode(response.body.as_slice())?;
    if checkin.android_id == 0 {
        return Err(Error::ProtocolDecode(
            "check-in response carried no device identifier".to_string(),
        ));
    }

    let device_id = format!("{:x}", checkin.android_id);
    let consistency_token = checkin.device_checkin_consistency_token;
    session.install_checkin(device_id.clone(), consistency_token.clone());
    tracing::info!(device_id = %device_id, "device checked in");

    Ok((device_id, consistency_token))
}

/// Upload the device configuration.
///
/// Returns the configuration token and installs it on the session. This
/// token gates every later authenticated call; calls made without it fail
/// remotely, not locally.
pub async fn upload_device_config(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &mut Session,
) -> Result<String> {
    let request = proto::UploadDeviceConfigRequest {
        device_configuration: Some(device_configuration(session.properties())),
        manufacturer: session.properties().build.manufacturer.clone(),
    };
    let body = request.encode_to_vec();
    let headers = session.default_headers();

    let response = transport
        .post_bytes(&endpoints.upload_device_config(), &headers, &body)
        .await?;
    if !response.successful {
        return Err(Error::Server {
            code: response.status,
            reason: response.error_text,
        });
    }

    let config = Envelope::decode(&response.body)?.expect_upload_device_config()?;
    if config.upload_device_config_token.is_empty() {
        return Err(Error::ProtocolDecode(
            "device configuration upload returned an empty token".to_string(),
        ));
    }

    session.install_device_config_token(config.upload_device_config_token.clone());
    tracing::info!("device configuration uploaded");
    Ok(config.upload_device_config_token)
}
