//! Session aggregate
//!
//! A [`Session`] collects everything the authenticated protocol calls need:
//! the account credential, the device identity produced by the handshake,
//! the per-service tokens produced by the token exchange, and the optional
//! session cookie from the terms-of-service gate. It is plain owned data —
//! callers sharing one session across threads must provide their own
//! synchronization (the intended pattern is one session per worker).

use std::collections::HashMap;

use crate::auth::Service;
use crate::config::DeviceProperties;
use crate::transport::Header;

/// Fixed targets descriptor sent on every authenticated call
const ENCODED_TARGETS: &str =
    "CAEScFfqlIEG6gUYogFWrAISK1WDAg+hAZoCDgIU1gYEOIACFkLMAeQBnASLATlASUuyAyqCAjY5igOMBQzfA/IClwFbApUC";

/// Device identity produced by the check-in handshake
///
/// Held for the life of the session; only re-running the handshake replaces
/// it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Numeric device identifier rendered as a lowercase hex string
    pub device_id: String,

    /// Opaque consistency token echoed on later calls
    pub checkin_consistency_token: String,

    /// Opaque token from the device configuration upload, required on every
    /// authenticated call
    pub device_config_token: String,
}

/// The aggregate consumed by every authenticated protocol operation
#[derive(Clone, Debug)]
pub struct Session {
    email: String,
    aas_token: String,
    properties: DeviceProperties,
    device: DeviceIdentity,
    tokens: HashMap<Service, String>,
    cookie: Option<String>,
}

impl Session {
    /// Create a session from an account credential and a device profile.
    ///
    /// The session starts without a device identity or service tokens; run
    /// the handshake and token exchange to populate it.
    pub fn new(
        email: impl Into<String>,
        aas_token: impl Into<String>,
        properties: DeviceProperties,
    ) -> Self {
        Self {
            email: email.into(),
            aas_token: aas_token.into(),
            properties,
            device: DeviceIdentity::default(),
            tokens: HashMap::new(),
            cookie: None,
        }
    }

    /// Account email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Long-lived account credential.
    pub fn aas_token(&self) -> &str {
        &self.aas_token
    }

    /// Device profile this session was built with.
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    /// Device identity from the handshake.
    pub fn device(&self) -> &DeviceIdentity {
        &self.device
    }

    /// Session cookie from the terms-of-service gate, if one was issued.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Token previously installed for a service.
    pub fn token(&self, service: Service) -> Option<&str> {
        self.tokens.get(&service).map(String::as_str)
    }

    /// Install (or overwrite) the token for a service. Idempotent.
    pub fn install_token(&mut self, service: Service, token: impl Into<String>) {
        self.tokens.insert(service, token.into());
    }

    /// Install the device id and consistency token from a check-in.
    /// Idempotent; re-installing overwrites.
    pub fn install_checkin(
        &mut self,
        device_id: impl Into<String>,
        consistency_token: impl Into<String>,
    ) {
        self.device.device_id = device_id.into();
        self.device.checkin_consistency_token = consistency_token.into();
    }

    /// Install the device configuration token. Idempotent.
    pub fn install_device_config_token(&mut self, token: impl Into<String>) {
        self.device.device_config_token = token.into();
    }

    /// Install the session cookie. Idempotent.
    pub fn install_cookie(&mut self, cookie: impl Into<String>) {
        self.cookie = Some(cookie.into());
    }

    /// Whether this session satisfies the purchase precondition: a PLAY
    /// service token and a non-empty device configuration token.
    ///
    /// Checked at use sites, not enforced internally; calls made without
    /// these are expected to fail remotely.
    pub fn ready_for_purchase(&self) -> bool {
        self.token(Service::Play).is_some_and(|t| !t.is_empty())
            && !self.device.device_config_token.is_empty()
    }

    /// Headers for the token-exchange and check-in endpoints.
    ///
    /// The per-service `app` header override, when one applies, is added by
    /// the token exchange on top of these.
    pub fn auth_headers(&self) -> Vec<Header> {
        let mut headers = vec![(
            "User-Agent".to_string(),
            self.properties.auth_user_agent(),
        )];
        if !self.device.device_id.is_empty() {
            headers.push(("device".to_string(), self.device.device_id.clone()));
        }
        headers
    }

    /// Headers for authenticated catalog/purchase calls.
    ///
    /// Attaches the PLAY token, the device identity fields, and the session
    /// cookie when present. Fields that have not been obtained yet are
    /// simply omitted; the remote side rejects the call.
    pub fn default_headers(&self) -> Vec<Header> {
        let mut headers = vec![
            (
                "User-Agent".to_string(),
                self.properties.market_user_agent(),
            ),
            (
                "Accept-Language".to_string(),
                self.properties.language_tag(),
            ),
            (
                "X-DFE-Encoded-Targets".to_string(),
                ENCODED_TARGETS.to_string(),
            ),
            ("X-DFE-Network-Type".to_string(), "4".to_string()),
            (
                "X-DFE-Client-Id".to_string(),
                "am-android-google".to_string(),
            ),
        ];
        if let Some(token) = self.token(Service::Play) {
            headers.push((
                "Authorization".to_string(),
                format!("GoogleLogin auth={token}"),
            ));
        }
        if !self.device.device_id.is_empty() {
            headers.push(("X-DFE-Device-Id".to_string(), self.device.device_id.clone()));
        }
        if !self.device.device_config_token.is_empty() {
            headers.push((
                "X-DFE-Device-Config-Token".to_string(),
                self.device.device_config_token.clone(),
            ));
        }
        if !self.device.checkin_consistency_token.is_empty() {
            headers.push((
                "X-DFE-Device-Checkin-Consistency-Token".to_string(),
                self.device.checkin_consistency_token.clone(),
            ));
        }
        if let Some(cookie) = &self.cookie {
            headers.push(("X-DFE-Cookie".to_string(), cookie.clone()));
        }
        headers
    }
}
