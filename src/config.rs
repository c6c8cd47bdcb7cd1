//! Configuration types for market-dl
//!
//! Two concerns live here: the immutable device property profile that seeds
//! the check-in handshake and every user agent the protocol expects, and the
//! endpoint table that maps operations to URLs under a configurable base
//! (overridable so tests can point the client at a local mock server).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Software build descriptors of the device profile
///
/// These feed the check-in request and the market user agent verbatim; the
/// remote side validates them for internal consistency, not this crate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildProperties {
    /// Build ID (e.g. "PQ3B.190801.002")
    #[serde(default = "default_build_id")]
    pub id: String,

    /// Full build fingerprint
    #[serde(default = "default_fingerprint")]
    pub fingerprint: String,

    /// Device codename
    #[serde(default = "default_device")]
    pub device: String,

    /// Product name
    #[serde(default = "default_product")]
    pub product: String,

    /// Marketing model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Manufacturer name
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    /// Bootloader version
    #[serde(default)]
    pub bootloader: String,

    /// Radio/baseband version
    #[serde(default)]
    pub radio: String,

    /// Client id reported on check-in
    #[serde(default = "default_client")]
    pub client: String,

    /// SDK/API level
    #[serde(default = "default_sdk_version")]
    pub sdk_version: i32,

    /// Platform release string (e.g. "9")
    #[serde(default = "default_version_release")]
    pub version_release: String,

    /// Installed platform services version code
    #[serde(default = "default_services_version")]
    pub services_version: i32,

    /// Market client version code
    #[serde(default = "default_vending_version_code")]
    pub vending_version_code: i32,

    /// Market client version string
    #[serde(default = "default_vending_version_string")]
    pub vending_version_string: String,

    /// Whether an OTA has been applied on top of the factory image
    #[serde(default)]
    pub ota_installed: bool,
}

impl Default for BuildProperties {
    fn default() -> Self {
        Self {
            id: default_build_id(),
            fingerprint: default_fingerprint(),
            device: default_device(),
            product: default_product(),
            model: default_model(),
            manufacturer: default_manufacturer(),
            bootloader: String::new(),
            radio: String::new(),
            client: default_client(),
            sdk_version: default_sdk_version(),
            version_release: default_version_release(),
            services_version: default_services_version(),
            vending_version_code: default_vending_version_code(),
            vending_version_string: default_vending_version_string(),
            ota_installed: false,
        }
    }
}

/// Display descriptors of the device profile
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScreenProperties {
    /// Screen density in dpi
    #[serde(default = "default_density")]
    pub density: i32,

    /// Screen width in pixels
    #[serde(default = "default_width")]
    pub width: i32,

    /// Screen height in pixels
    #[serde(default = "default_height")]
    pub height: i32,
}

impl Default for ScreenProperties {
    fn default() -> Self {
        Self {
            density: default_density(),
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Immutable hardware/software capability profile of the device identity
///
/// Loaded once (deserializable from JSON via serde) and never mutated; the
/// same profile must be used for the check-in and the device configuration
/// upload or the remote side rejects the session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceProperties {
    /// Software build descriptors
    #[serde(default)]
    pub build: BuildProperties,

    /// Display descriptors
    #[serde(default)]
    pub screen: ScreenProperties,

    /// Supported native platforms, preferred first
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,

    /// Declared system features
    #[serde(default = "default_features")]
    pub features: Vec<String>,

    /// Available shared libraries
    #[serde(default = "default_shared_libraries")]
    pub shared_libraries: Vec<String>,

    /// Supported locales
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,

    /// Reported GL ES version (packed major/minor)
    #[serde(default = "default_gl_es_version")]
    pub gl_es_version: i32,

    /// Reported GL extensions
    #[serde(default = "default_gl_extensions")]
    pub gl_extensions: Vec<String>,

    /// Touch screen class
    #[serde(default = "default_touch_screen")]
    pub touch_screen: i32,

    /// Keyboard class
    #[serde(default = "default_keyboard")]
    pub keyboard: i32,

    /// Navigation class
    #[serde(default = "default_navigation")]
    pub navigation: i32,

    /// Screen layout class
    #[serde(default = "default_screen_layout")]
    pub screen_layout: i32,

    /// Whether a hardware keyboard is present
    #[serde(default)]
    pub has_hard_keyboard: bool,

    /// Whether five-way navigation is present
    #[serde(default)]
    pub has_five_way_navigation: bool,

    /// Advertised maximum package download size in MiB
    #[serde(default = "default_max_download_mb")]
    pub max_apk_download_size_mb: i32,

    /// Cell operator numeric code
    #[serde(default = "default_operator")]
    pub cell_operator: String,

    /// SIM operator numeric code
    #[serde(default = "default_operator")]
    pub sim_operator: String,

    /// Roaming state label reported on check-in
    #[serde(default = "default_roaming")]
    pub roaming: String,

    /// Time zone identifier reported on check-in
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Locale used for Accept-Language and auth parameters (e.g. "en_US")
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self {
            build: BuildProperties::default(),
            screen: ScreenProperties::default(),
            platforms: default_platforms(),
            features: default_features(),
            shared_libraries: default_shared_libraries(),
            locales: default_locales(),
            gl_es_version: default_gl_es_version(),
            gl_extensions: default_gl_extensions(),
            touch_screen: default_touch_screen(),
            keyboard: default_keyboard(),
            navigation: default_navigation(),
            screen_layout: default_screen_layout(),
            has_hard_keyboard: false,
            has_five_way_navigation: false,
            max_apk_download_size_mb: default_max_download_mb(),
            cell_operator: default_operator(),
            sim_operator: default_operator(),
            roaming: default_roaming(),
            time_zone: default_time_zone(),
            locale: default_locale(),
        }
    }
}

impl DeviceProperties {
    /// Load a device profile from a JSON document.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The market client user agent derived from this profile.
    ///
    /// Sent on every authenticated catalog/purchase call.
    pub fn market_user_agent(&self) -> String {
        format!(
            "Android-Finsky/{} (api=3,versionCode={},sdk={},device={},hardware={},product={},platformVersionRelease={},model={},buildId={},isWideScreen=0)",
            self.build.vending_version_string,
            self.build.vending_version_code,
            self.build.sdk_version,
            self.build.device,
            self.build.device,
            self.build.product,
            self.build.version_release,
            self.build.model.replace(' ', "%20"),
            self.build.id,
        )
    }

    /// The auth client user agent derived from this profile.
    ///
    /// Sent on the token-exchange and check-in endpoints.
    pub fn auth_user_agent(&self) -> String {
        format!("GoogleAuth/1.4 ({} {})", self.build.device, self.build.id)
    }

    /// Language tag for the Accept-Language header ("en-US" form).
    pub fn language_tag(&self) -> String {
        self.locale.replace('_', "-")
    }
}

/// Endpoint table for the market protocol
///
/// All paths are fixed by the protocol; only the base is configurable so
/// tests and proxies can redirect traffic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Endpoints {
    /// Base URL, no trailing slash (default: the production service)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Endpoints {
    /// Endpoint table rooted at a custom base URL (trailing slash stripped).
    pub fn with_base(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn fdfe(&self, path: &str) -> String {
        format!("{}/fdfe/{}", self.base_url, path)
    }

    /// Device check-in endpoint
    pub fn checkin(&self) -> String {
        format!("{}/checkin", self.base_url)
    }

    /// Token exchange endpoint
    pub fn auth(&self) -> String {
        format!("{}/auth", self.base_url)
    }

    /// Device configuration upload endpoint
    pub fn upload_device_config(&self) -> String {
        self.fdfe("uploadDeviceConfig")
    }

    /// Terms-of-service fetch endpoint
    pub fn toc(&self) -> String {
        self.fdfe("toc")
    }

    /// Terms-of-service acceptance endpoint
    pub fn accept_tos(&self) -> String {
        self.fdfe("acceptTos")
    }

    /// Purchase (entitlement acquisition) endpoint
    pub fn purchase(&self) -> String {
        self.fdfe("purchase")
    }

    /// Delivery manifest endpoint
    pub fn delivery(&self) -> String {
        self.fdfe("delivery")
    }

    /// Single app details endpoint
    pub fn details(&self) -> String {
        self.fdfe("details")
    }

    /// Bulk app details endpoint
    pub fn bulk_details(&self) -> String {
        self.fdfe("bulkDetails")
    }

    /// Search endpoint
    pub fn search(&self) -> String {
        self.fdfe("search")
    }

    /// Search suggestion endpoint
    pub fn search_suggest(&self) -> String {
        self.fdfe("searchSuggest")
    }

    /// Reviews endpoint
    pub fn reviews(&self) -> String {
        self.fdfe("rev")
    }

    /// Review add/edit endpoint
    pub fn add_review(&self) -> String {
        self.fdfe("addReview")
    }

    /// Library listing endpoint
    pub fn library(&self) -> String {
        self.fdfe("library")
    }

    /// Library modification endpoint
    pub fn modify_library(&self) -> String {
        self.fdfe("modifyLibrary")
    }

    /// Content sync endpoint (used as a cheap session validity probe)
    pub fn content_sync(&self) -> String {
        self.fdfe("apps/contentSync")
    }

    /// Resolve a server-supplied relative pagination cursor to a full URL.
    ///
    /// Cursors arrive relative to the service path; all filtering state is
    /// already encoded in them.
    pub fn resolve_cursor(&self, cursor: &str) -> String {
        self.fdfe(cursor)
    }
}

/// Retry behavior configuration for the caller-side retry utility
///
/// Nothing inside the crate consumes this; it exists for embedders wrapping
/// operations with [`crate::retry::with_retry`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

// Duration serialization helper (seconds as integers)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

fn default_build_id() -> String {
    "PQ3B.190801.002".to_string()
}

fn default_fingerprint() -> String {
    "google/sargo/sargo:9/PQ3B.190801.002/5670241:user/release-keys".to_string()
}

fn default_device() -> String {
    "sargo".to_string()
}

fn default_product() -> String {
    "sargo".to_string()
}

fn default_model() -> String {
    "Pixel 3a".to_string()
}

fn default_manufacturer() -> String {
    "Google".to_string()
}

fn default_client() -> String {
    "android-google".to_string()
}

fn default_sdk_version() -> i32 {
    28
}

fn default_version_release() -> String {
    "9".to_string()
}

fn default_services_version() -> i32 {
    203_615_037
}

fn default_vending_version_code() -> i32 {
    82_251_300
}

fn default_vending_version_string() -> String {
    "22.5.13-21".to_string()
}

fn default_density() -> i32 {
    440
}

fn default_width() -> i32 {
    1080
}

fn default_height() -> i32 {
    2220
}

fn default_platforms() -> Vec<String> {
    vec![
        "arm64-v8a".to_string(),
        "armeabi-v7a".to_string(),
        "armeabi".to_string(),
    ]
}

fn default_features() -> Vec<String> {
    [
        "android.hardware.bluetooth",
        "android.hardware.camera",
        "android.hardware.camera.autofocus",
        "android.hardware.location",
        "android.hardware.location.gps",
        "android.hardware.microphone",
        "android.hardware.screen.portrait",
        "android.hardware.sensor.accelerometer",
        "android.hardware.touchscreen",
        "android.hardware.touchscreen.multitouch",
        "android.hardware.wifi",
        "android.software.device_admin",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_shared_libraries() -> Vec<String> {
    vec![
        "android.ext.shared".to_string(),
        "android.test.runner".to_string(),
        "org.apache.http.legacy".to_string(),
    ]
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string(), "en_US".to_string()]
}

fn default_gl_es_version() -> i32 {
    196_610
}

fn default_gl_extensions() -> Vec<String> {
    vec![
        "GL_EXT_debug_marker".to_string(),
        "GL_EXT_discard_framebuffer".to_string(),
        "GL_OES_EGL_image".to_string(),
        "GL_OES_compressed_ETC1_RGB8_texture".to_string(),
    ]
}

fn default_touch_screen() -> i32 {
    3
}

fn default_keyboard() -> i32 {
    1
}

fn default_navigation() -> i32 {
    1
}

fn default_screen_layout() -> i32 {
    2
}

fn default_max_download_mb() -> i32 {
    500
}

fn default_operator() -> String {
    "310260".to_string()
}

fn default_roaming() -> String {
    "mobile-notroaming".to_string()
}

fn default_time_zone() -> String {
    "America/New_York".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_base_url() -> String {
    "https://android.clients.google.com".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_internally_populated() {
        let props = DeviceProperties::default();
        assert!(!props.build.fingerprint.is_empty());
        assert!(!props.platforms.is_empty());
        assert!(!props.features.is_empty());
        assert!(props.build.sdk_version > 0);
        assert!(props.screen.width > 0 && props.screen.height > 0);
    }

    #[test]
    fn empty_json_deserializes_to_default_profile() {
        let props: DeviceProperties = serde_json::from_str("{}").unwrap();
        assert_eq!(props.build.device, "sargo");
        assert_eq!(props.locale, "en_US");
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let props = DeviceProperties::from_json(
            r#"{"build": {"device": "walleye", "sdk_version": 27}, "locale": "de_DE"}"#,
        )
        .unwrap();
        assert_eq!(props.build.device, "walleye");
        assert_eq!(props.build.sdk_version, 27);
        assert_eq!(props.locale, "de_DE");
        // Untouched fields keep their defaults
        assert_eq!(props.screen.density, 440);
    }

    #[test]
    fn market_user_agent_embeds_version_and_device() {
        let props = DeviceProperties::default();
        let ua = props.market_user_agent();
        assert!(ua.starts_with("Android-Finsky/"), "got: {ua}");
        assert!(ua.contains("device=sargo"));
        assert!(ua.contains("sdk=28"));
        assert!(
            !ua.contains("Pixel 3a"),
            "spaces in the model must be escaped, got: {ua}"
        );
    }

    #[test]
    fn language_tag_uses_bcp47_separator() {
        let props = DeviceProperties::default();
        assert_eq!(props.language_tag(), "en-US");
    }

    #[test]
    fn endpoints_join_under_service_path() {
        let endpoints = Endpoints::with_base("http://localhost:9999/");
        assert_eq!(endpoints.checkin(), "http://localhost:9999/checkin");
        assert_eq!(endpoints.auth(), "http://localhost:9999/auth");
        assert_eq!(
            endpoints.purchase(),
            "http://localhost:9999/fdfe/purchase"
        );
        assert_eq!(
            endpoints.delivery(),
            "http://localhost:9999/fdfe/delivery"
        );
        assert_eq!(
            endpoints.content_sync(),
            "http://localhost:9999/fdfe/apps/contentSync"
        );
    }

    #[test]
    fn cursor_resolution_joins_relative_to_service_path() {
        let endpoints = Endpoints::with_base("http://localhost:9999");
        assert_eq!(
            endpoints.resolve_cursor("getCluster?enpt=abc&n=20"),
            "http://localhost:9999/fdfe/getCluster?enpt=abc&n=20"
        );
    }

    #[test]
    fn default_base_points_at_production() {
        let endpoints = Endpoints::default();
        assert!(endpoints.toc().starts_with("https://"));
    }

    #[test]
    fn retry_config_round_trips_through_json() {
        let config = RetryConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: RetryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_attempts, config.max_attempts);
        assert_eq!(back.initial_delay, config.initial_delay);
        assert_eq!(back.max_delay, config.max_delay);
    }
}
