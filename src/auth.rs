//! Token exchange and session gates
//!
//! One long-lived account credential is exchanged for short-lived
//! per-service tokens. Each service requires a fixed, hardcoded shaping of
//! the request — which `app`/`service`/`oauth2_foreground`/`callerPkg`
//! values are set — reproduced verbatim from the protocol. The shaping
//! lives in a data table so adding or auditing a service is a table edit,
//! not new control flow.
//!
//! Exchange responses are flat `Key=Value` text blocks, not the binary
//! envelope: success means the block contains an `Auth` (service token) or
//! `Token` (account token) key. A missing key is an authentication failure,
//! deliberately distinct from a transport failure.

use crate::config::Endpoints;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::proto;
use crate::session::Session;
use crate::transport::{Header, Param, Transport, TransportResponse};
use crate::utils::parse_key_values;

/// Signature reported for the market client package
const CLIENT_SIGNATURE: &str = "38918a453d07199354f8b19af05ec6562ced5788";

/// Logical service a token can be exchanged for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Service {
    /// Cloud-to-device messaging bootstrap
    Ac2dm,
    /// Plain platform token
    Android,
    /// Check-in server access
    AndroidCheckIn,
    /// Experiments and configuration access
    ExperimentalConfig,
    /// Cloud messaging access
    Gcm,
    /// Phone-number verification access
    Numberer,
    /// Account OAuth login access
    OauthLogin,
    /// Market storefront access (required for purchase/delivery)
    Play,
}

impl Service {
    /// All services, in a stable order.
    pub const ALL: [Service; 8] = [
        Service::Ac2dm,
        Service::Android,
        Service::AndroidCheckIn,
        Service::ExperimentalConfig,
        Service::Gcm,
        Service::Numberer,
        Service::OauthLogin,
        Service::Play,
    ];

    fn shaping(self) -> &'static ServiceShaping {
        // Indexed by the declaration order of `ALL`.
        match self {
            Service::Ac2dm => &SHAPING_TABLE[0],
            Service::Android => &SHAPING_TABLE[1],
            Service::AndroidCheckIn => &SHAPING_TABLE[2],
            Service::ExperimentalConfig => &SHAPING_TABLE[3],
            Service::Gcm => &SHAPING_TABLE[4],
            Service::Numberer => &SHAPING_TABLE[5],
            Service::OauthLogin => &SHAPING_TABLE[6],
            Service::Play => &SHAPING_TABLE[7],
        }
    }
}

/// How the `app` parameter is treated for one service
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AppParam {
    /// Keep the default (`com.android.vending`)
    Keep,
    /// Remove the parameter entirely
    Remove,
    /// Replace with a literal value
    Set(&'static str),
}

/// Fixed request shaping for one service
///
/// The table rows must be reproduced exactly for remote acceptance; they
/// are data, not configuration.
struct ServiceShaping {
    service: Service,
    /// Value for the `service` parameter
    token_service: &'static str,
    /// Treatment of the `app` parameter
    app_param: AppParam,
    /// `app` header override, when the service requires one
    app_header: Option<&'static str>,
    /// `oauth2_foreground` parameter, when the service requires one
    oauth2_foreground: Option<&'static str>,
    /// `callerPkg` parameter, when the service requires one
    caller_pkg: Option<&'static str>,
}

static SHAPING_TABLE: [ServiceShaping; 8] = [
    ServiceShaping {
        service: Service::Ac2dm,
        token_service: "ac2dm",
        app_param: AppParam::Remove,
        app_header: None,
        oauth2_foreground: None,
        caller_pkg: None,
    },
    ServiceShaping {
        service: Service::Android,
        token_service: "android",
        app_param: AppParam::Keep,
        app_header: None,
        oauth2_foreground: None,
        caller_pkg: None,
    },
    ServiceShaping {
        service: Service::AndroidCheckIn,
        token_service: "AndroidCheckInServer",
        app_param: AppParam::Set("com.google.android.gms"),
        app_header: None,
        oauth2_foreground: Some("0"),
        caller_pkg: None,
    },
    ServiceShaping {
        service: Service::ExperimentalConfig,
        token_service: "oauth2:https://www.googleapis.com/auth/experimentsandconfigs",
        app_param: AppParam::Keep,
        app_header: None,
        oauth2_foreground: None,
        caller_pkg: None,
    },
    ServiceShaping {
        service: Service::Gcm,
        token_service: "oauth2:https://www.googleapis.com/auth/gcm",
        app_param: AppParam::Set("com.google.android.gms"),
        app_header: None,
        oauth2_foreground: None,
        caller_pkg: None,
    },
    ServiceShaping {
        service: Service::Numberer,
        token_service: "oauth2:https://www.googleapis.com/auth/numberer",
        app_param: AppParam::Set("com.google.android.gms"),
        app_header: None,
        oauth2_foreground: None,
        caller_pkg: None,
    },
    ServiceShaping {
        service: Service::OauthLogin,
        token_service: "oauth2:https://www.google.com/accounts/OAuthLogin",
        app_param: AppParam::Set("com.google.android.googlequicksearchbox"),
        app_header: None,
        oauth2_foreground: Some("0"),
        caller_pkg: Some("com.google.android.googlequicksearchbox"),
    },
    ServiceShaping {
        service: Service::Play,
        token_service: "oauth2:https://www.googleapis.com/auth/googleplay",
        app_param: AppParam::Keep,
        app_header: Some("com.google.android.gms"),
        oauth2_foreground: None,
        caller_pkg: None,
    },
];

fn locale_language(locale: &str) -> &str {
    locale.split('_').next().unwrap_or("en")
}

fn locale_country(locale: &str) -> String {
    locale
        .split('_')
        .nth(1)
        .unwrap_or("US")
        .to_ascii_lowercase()
}

/// Parameters shared by every exchange against this session.
fn base_params(session: &Session) -> Vec<Param> {
    let properties = session.properties();
    vec![
        (
            "androidId".to_string(),
            session.device().device_id.clone(),
        ),
        ("Email".to_string(), session.email().to_string()),
        (
            "sdk_version".to_string(),
            properties.build.sdk_version.to_string(),
        ),
        (
            "google_play_services_version".to_string(),
            properties.build.services_version.to_string(),
        ),
        (
            "device_country".to_string(),
            locale_country(&properties.locale),
        ),
        (
            "lang".to_string(),
            locale_language(&properties.locale).to_string(),
        ),
        ("callerSig".to_string(), CLIENT_SIGNATURE.to_string()),
        ("client_sig".to_string(), CLIENT_SIGNATURE.to_string()),
    ]
}

/// Build the full parameter list for a service token exchange.
///
/// Exposed within the crate so the shaping can be asserted without a
/// network round-trip.
pub(crate) fn exchange_params(session: &Session, service: Service) -> Vec<Param> {
    let shaping = service.shaping();
    let mut params = base_params(session);
    params.push(("app".to_string(), "com.android.vending".to_string()));
    params.push(("Token".to_string(), session.aas_token().to_string()));
    params.push((
        "token_request_options".to_string(),
        "CAA4AVAB".to_string(),
    ));
    params.push(("system_partition".to_string(), "1".to_string()));

    match shaping.app_param {
        AppParam::Keep => {}
        AppParam::Remove => params.retain(|(name, _)| name != "app"),
        AppParam::Set(value) => {
            params.retain(|(name, _)| name != "app");
            params.push(("app".to_string(), value.to_string()));
        }
    }
    if let Some(foreground) = shaping.oauth2_foreground {
        params.push(("oauth2_foreground".to_string(), foreground.to_string()));
    }
    if let Some(caller_pkg) = shaping.caller_pkg {
        params.push(("callerPkg".to_string(), caller_pkg.to_string()));
    }
    params.push(("service".to_string(), shaping.token_service.to_string()));
    params
}

/// Build the header list for a service token exchange.
pub(crate) fn exchange_headers(session: &Session, service: Service) -> Vec<Header> {
    let mut headers = session.auth_headers();
    if let Some(app) = service.shaping().app_header {
        headers.push(("app".to_string(), app.to_string()));
    }
    headers
}

fn check_response(response: &TransportResponse) -> Result<()> {
    if response.successful {
        Ok(())
    } else {
        Err(Error::Server {
            code: response.status,
            reason: response.error_text.clone(),
        })
    }
}

/// Exchange the session's account credential for a service token.
///
/// On success the token is installed on the session and returned. A
/// response without an `Auth` key is an [`Error::Authentication`], not a
/// transport failure.
pub async fn exchange(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &mut Session,
    service: Service,
) -> Result<String> {
    tracing::debug!(?service, "exchanging service token");
    let params = exchange_params(session, service);
    let headers = exchange_headers(session, service);
    let response = transport
        .post_form(&endpoints.auth(), &headers, &params)
        .await?;
    check_response(&response)?;

    let values = parse_key_values(&response.body);
    match values.get("Auth") {
        Some(token) => {
            session.install_token(service, token.clone());
            tracing::debug!(?service, "service token obtained");
            Ok(token.clone())
        }
        None => Err(Error::Authentication {
            context: format!("{service:?} token exchange returned no Auth key"),
        }),
    }
}

/// Exchange a one-time OAuth token for the long-lived account token.
///
/// This is the account-setup step performed once before a session exists;
/// the returned token is the credential a [`Session`] is constructed with.
pub async fn exchange_aas_token(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    oauth_token: &str,
) -> Result<String> {
    tracing::debug!("exchanging account token");
    let mut params = base_params(session);
    params.push(("app".to_string(), "com.android.vending".to_string()));
    params.push(("service".to_string(), "ac2dm".to_string()));
    params.push(("add_account".to_string(), "1".to_string()));
    params.push(("get_accountid".to_string(), "1".to_string()));
    params.push(("ACCESS_TOKEN".to_string(), "1".to_string()));
    params.push((
        "callerPkg".to_string(),
        "com.android.vending".to_string(),
    ));
    params.push(("Token".to_string(), oauth_token.to_string()));

    let mut headers = session.auth_headers();
    headers.push(("app".to_string(), "com.android.vending".to_string()));

    let response = transport
        .post_form(&endpoints.auth(), &headers, &params)
        .await?;
    check_response(&response)?;

    let values = parse_key_values(&response.body);
    values
        .get("Token")
        .cloned()
        .ok_or_else(|| Error::Authentication {
            context: "account token exchange returned no Token key".to_string(),
        })
}

/// Fetch the session terms-of-service and run the acceptance gate.
///
/// When the response carries both a terms body and a terms token, the
/// acceptance call is issued before returning; when it carries a session
/// cookie, the cookie is installed on the session. Only after this returns
/// is the session considered usable.
pub async fn fetch_toc(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &mut Session,
) -> Result<proto::TocResponse> {
    let headers = session.default_headers();
    let response = transport.get(&endpoints.toc(), &headers, &[]).await?;
    check_response(&response)?;

    let toc = Envelope::decode(&response.body)?.expect_toc()?;

    if !toc.tos_content.is_empty() && !toc.tos_token.is_empty() {
        tracing::debug!("terms of service require acceptance");
        accept_terms(transport, endpoints, session, &toc.tos_token).await?;
    }
    if !toc.cookie.is_empty() {
        session.install_cookie(toc.cookie.clone());
    }
    Ok(toc)
}

async fn accept_terms(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    tos_token: &str,
) -> Result<proto::AcceptTosResponse> {
    let headers = session.default_headers();
    let params = vec![
        ("tost".to_string(), tos_token.to_string()),
        ("toscme".to_string(), "false".to_string()),
    ];
    let response = transport
        .post_form(&endpoints.accept_tos(), &headers, &params)
        .await?;
    check_response(&response)?;
    Envelope::decode(&response.body)?.expect_accept_tos()
}
