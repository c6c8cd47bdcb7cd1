//! Wire format messages for the market protocol
//!
//! The protocol speaks a length-delimited binary message format; every
//! response body (except the token-exchange text block) is a
//! [`ResponseWrapper`] carrying one payload and optional prefetched
//! sub-responses. Messages are hand-written `prost` derives — the message
//! set is small and stable enough that a codegen build step would be more
//! machinery than it saves.
//!
//! Tag numbers are part of the wire contract and must not be changed.

/// Outer response envelope
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponseWrapper {
    /// Primary payload, when the server filled the primary slot
    #[prost(message, optional, tag = "1")]
    pub payload: Option<Payload>,

    /// Server-side commands (error display, cache control)
    #[prost(message, optional, tag = "2")]
    pub commands: Option<ServerCommands>,

    /// Preemptively fetched sub-responses
    #[prost(message, repeated, tag = "3")]
    pub pre_fetch: Vec<PreFetch>,
}

/// Commands the server may attach to any response
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServerCommands {
    /// Human-readable error message the client should surface
    #[prost(string, tag = "2")]
    pub display_error_message: String,
}

/// One prefetched sub-response keyed by the URL it answers
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PreFetch {
    /// Relative URL this entry preempts
    #[prost(string, tag = "1")]
    pub url: String,

    /// The nested response
    #[prost(message, optional, boxed, tag = "2")]
    pub response: Option<Box<ResponseWrapper>>,
}

/// Payload union: exactly one field is populated per response
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payload {
    /// Listing payload (library, streams, pagination)
    #[prost(message, optional, tag = "1")]
    pub list_response: Option<ListResponse>,

    /// Single-item details payload
    #[prost(message, optional, tag = "2")]
    pub details_response: Option<DetailsResponse>,

    /// Reviews payload
    #[prost(message, optional, tag = "3")]
    pub review_response: Option<ReviewResponse>,

    /// Entitlement acquisition payload
    #[prost(message, optional, tag = "4")]
    pub buy_response: Option<BuyResponse>,

    /// Search payload
    #[prost(message, optional, tag = "5")]
    pub search_response: Option<SearchResponse>,

    /// Terms-of-service payload
    #[prost(message, optional, tag = "6")]
    pub toc_response: Option<TocResponse>,

    /// Browse payload
    #[prost(message, optional, tag = "7")]
    pub browse_response: Option<BrowseResponse>,

    /// Terms acceptance payload
    #[prost(message, optional, tag = "10")]
    pub accept_tos_response: Option<AcceptTosResponse>,

    /// Bulk details payload
    #[prost(message, optional, tag = "19")]
    pub bulk_details_response: Option<BulkDetailsResponse>,

    /// Delivery manifest payload
    #[prost(message, optional, tag = "21")]
    pub delivery_response: Option<DeliveryResponse>,

    /// Device configuration upload payload
    #[prost(message, optional, tag = "28")]
    pub upload_device_config_response: Option<UploadDeviceConfigResponse>,

    /// Search suggestion payload
    #[prost(message, optional, tag = "40")]
    pub search_suggest_response: Option<SearchSuggestResponse>,
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// Device check-in request
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckinRequest {
    /// Previously assigned device id (0 on first check-in)
    #[prost(int64, tag = "2")]
    pub id: i64,

    /// Check-in body
    #[prost(message, optional, tag = "4")]
    pub checkin: Option<CheckinPayload>,

    /// Device locale
    #[prost(string, tag = "6")]
    pub locale: String,

    /// Device time zone identifier
    #[prost(string, tag = "12")]
    pub time_zone: String,

    /// Check-in protocol version
    #[prost(int32, tag = "14")]
    pub version: i32,

    /// Hardware/software capability descriptors
    #[prost(message, optional, tag = "18")]
    pub device_configuration: Option<DeviceConfiguration>,

    /// Fragment number for chunked check-ins (always 0 here)
    #[prost(int32, tag = "20")]
    pub fragment: i32,
}

/// Inner check-in body
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckinPayload {
    /// Build descriptors
    #[prost(message, optional, tag = "1")]
    pub build: Option<BuildInfo>,

    /// Milliseconds since the last check-in (0 on first)
    #[prost(int64, tag = "2")]
    pub last_checkin_msec: i64,

    /// Cell operator numeric code
    #[prost(string, tag = "6")]
    pub cell_operator: String,

    /// SIM operator numeric code
    #[prost(string, tag = "7")]
    pub sim_operator: String,

    /// Roaming state label
    #[prost(string, tag = "8")]
    pub roaming: String,

    /// Device user number
    #[prost(int32, tag = "9")]
    pub user_number: i32,
}

/// Software build descriptors sent on check-in
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BuildInfo {
    #[prost(string, tag = "1")]
    pub fingerprint: String,
    #[prost(string, tag = "2")]
    pub product: String,
    #[prost(string, tag = "3")]
    pub carrier: String,
    #[prost(string, tag = "5")]
    pub bootloader: String,
    #[prost(string, tag = "6")]
    pub client: String,
    #[prost(int64, tag = "7")]
    pub timestamp: i64,
    #[prost(int32, tag = "8")]
    pub services_version: i32,
    #[prost(string, tag = "9")]
    pub device: String,
    #[prost(int32, tag = "10")]
    pub sdk_version: i32,
    #[prost(string, tag = "11")]
    pub model: String,
    #[prost(string, tag = "12")]
    pub manufacturer: String,
    #[prost(string, tag = "13")]
    pub build_product: String,
    #[prost(bool, tag = "14")]
    pub ota_installed: bool,
}

/// Device check-in response
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckinResponse {
    /// Whether stats were accepted
    #[prost(bool, tag = "1")]
    pub stats_ok: bool,

    /// Server time in milliseconds
    #[prost(int64, tag = "3")]
    pub time_msec: i64,

    /// The permanent numeric device identifier for this credential
    #[prost(fixed64, tag = "7")]
    pub android_id: u64,

    /// Security token for subsequent check-ins
    #[prost(fixed64, tag = "8")]
    pub security_token: u64,

    /// Consistency token echoed on later calls
    #[prost(string, tag = "12")]
    pub device_checkin_consistency_token: String,
}

/// Hardware/software capability descriptors
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceConfiguration {
    #[prost(int32, tag = "1")]
    pub touch_screen: i32,
    #[prost(int32, tag = "2")]
    pub keyboard: i32,
    #[prost(int32, tag = "3")]
    pub navigation: i32,
    #[prost(int32, tag = "4")]
    pub screen_layout: i32,
    #[prost(bool, tag = "5")]
    pub has_hard_keyboard: bool,
    #[prost(bool, tag = "6")]
    pub has_five_way_navigation: bool,
    #[prost(int32, tag = "7")]
    pub screen_density: i32,
    #[prost(int32, tag = "8")]
    pub gl_es_version: i32,
    #[prost(string, repeated, tag = "9")]
    pub system_shared_library: Vec<String>,
    #[prost(string, repeated, tag = "10")]
    pub system_available_feature: Vec<String>,
    #[prost(string, repeated, tag = "11")]
    pub native_platform: Vec<String>,
    #[prost(int32, tag = "12")]
    pub screen_width: i32,
    #[prost(int32, tag = "13")]
    pub screen_height: i32,
    #[prost(string, repeated, tag = "14")]
    pub system_supported_locale: Vec<String>,
    #[prost(string, repeated, tag = "15")]
    pub gl_extension: Vec<String>,
    #[prost(int32, tag = "16")]
    pub device_class: i32,
    #[prost(int32, tag = "17")]
    pub max_apk_download_size_mb: i32,
}

/// Device configuration upload request
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadDeviceConfigRequest {
    /// The same descriptors sent on check-in, wrapped for upload
    #[prost(message, optional, tag = "1")]
    pub device_configuration: Option<DeviceConfiguration>,

    /// Manufacturer name
    #[prost(string, tag = "2")]
    pub manufacturer: String,
}

/// Device configuration upload response
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadDeviceConfigResponse {
    /// Token gating every later authenticated call
    #[prost(string, tag = "1")]
    pub upload_device_config_token: String,
}

// ---------------------------------------------------------------------------
// Session gates
// ---------------------------------------------------------------------------

/// Terms-of-service payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TocResponse {
    /// Terms body; non-blank together with the token requires acceptance
    #[prost(string, tag = "4")]
    pub tos_content: String,

    /// Home URL for the session
    #[prost(string, tag = "5")]
    pub home_url: String,

    /// Terms token to echo on the acceptance call
    #[prost(string, tag = "7")]
    pub tos_token: String,

    /// Whether the server wants a device configuration upload
    #[prost(bool, tag = "9")]
    pub requires_upload_device_config: bool,

    /// Session cookie to attach to all later calls
    #[prost(string, tag = "19")]
    pub cookie: String,
}

/// Terms acceptance payload (no fields; presence is the acknowledgment)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AcceptTosResponse {}

// ---------------------------------------------------------------------------
// Purchase / delivery
// ---------------------------------------------------------------------------

/// Entitlement acquisition payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BuyResponse {
    /// Opaque delivery token to thread into the delivery request; emptiness
    /// is valid and means "no token to forward"
    #[prost(string, tag = "46")]
    pub encoded_delivery_token: String,
}

/// Delivery manifest payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeliveryResponse {
    /// Status code: 1 = OK, 2 = not supported, 3 = not purchased
    #[prost(int32, tag = "1")]
    pub status: i32,

    /// Delivery data, populated on status 1
    #[prost(message, optional, tag = "2")]
    pub app_delivery_data: Option<AppDeliveryData>,
}

/// Primary delivery data plus additional/split file descriptors
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppDeliveryData {
    #[prost(int64, tag = "1")]
    pub download_size: i64,
    #[prost(string, tag = "2")]
    pub sha1: String,
    #[prost(string, tag = "3")]
    pub download_url: String,
    /// Expansion and patch file descriptors
    #[prost(message, repeated, tag = "4")]
    pub additional_file: Vec<FileMetadata>,
    #[prost(message, repeated, tag = "5")]
    pub download_auth_cookie: Vec<HttpCookie>,
    /// Split package descriptors
    #[prost(message, repeated, tag = "15")]
    pub split_delivery_data: Vec<SplitDeliveryData>,
}

/// Additional (expansion/patch) file descriptor
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileMetadata {
    /// 0 = expansion ("main"), nonzero = patch
    #[prost(int32, tag = "1")]
    pub file_type: i32,
    #[prost(int32, tag = "2")]
    pub version_code: i32,
    #[prost(int64, tag = "3")]
    pub size: i64,
    #[prost(string, tag = "4")]
    pub download_url: String,
}

/// Split package descriptor
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SplitDeliveryData {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int64, tag = "2")]
    pub download_size: i64,
    #[prost(string, tag = "3")]
    pub sha1: String,
    #[prost(string, tag = "4")]
    pub download_url: String,
}

/// Cookie required by the artifact CDN
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpCookie {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Listing payload: top-level items with one level of sub-item grouping
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListResponse {
    /// Top-level items
    #[prost(message, repeated, tag = "2")]
    pub item: Vec<Item>,
}

/// One catalog item (app, cluster container, or other media)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Item {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub sub_id: String,
    /// Item discriminator (1 = app in listings, 45 = app in search)
    #[prost(int32, tag = "3")]
    pub item_type: i32,
    #[prost(int32, tag = "4")]
    pub category_id: i32,
    #[prost(string, tag = "5")]
    pub title: String,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub description_html: String,
    #[prost(message, repeated, tag = "8")]
    pub offer: Vec<Offer>,
    #[prost(message, repeated, tag = "10")]
    pub image: Vec<Image>,
    /// One level of grouping: clusters carry their members here
    #[prost(message, repeated, tag = "11")]
    pub sub_item: Vec<Item>,
    #[prost(message, optional, tag = "12")]
    pub container_metadata: Option<ContainerMetadata>,
    #[prost(message, optional, tag = "13")]
    pub details: Option<Details>,
    #[prost(message, optional, tag = "14")]
    pub aggregate_rating: Option<AggregateRating>,
    #[prost(string, tag = "22")]
    pub subtitle: String,
}

/// Cursor pair attached to cluster containers
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContainerMetadata {
    /// Browse cursor: identifies the cluster
    #[prost(string, tag = "1")]
    pub browse_url: String,
    /// Next-page cursor: fetches more of the same cluster
    #[prost(string, tag = "2")]
    pub next_page_url: String,
}

/// Price offer attached to an item
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Offer {
    #[prost(int64, tag = "1")]
    pub micros: i64,
    #[prost(string, tag = "2")]
    pub currency_code: String,
    #[prost(string, tag = "3")]
    pub formatted_amount: String,
    #[prost(int32, tag = "8")]
    pub offer_type: i32,
}

/// Artwork descriptor attached to an item
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Image {
    #[prost(int32, tag = "1")]
    pub image_type: i32,
    #[prost(message, optional, tag = "2")]
    pub dimension: Option<ImageDimension>,
    #[prost(string, tag = "5")]
    pub image_url: String,
}

/// Pixel dimensions of an artwork
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImageDimension {
    #[prost(int32, tag = "1")]
    pub width: i32,
    #[prost(int32, tag = "2")]
    pub height: i32,
    #[prost(int32, tag = "3")]
    pub aspect_ratio: i32,
}

/// Wrapper around the app-specific detail block
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Details {
    #[prost(message, optional, tag = "1")]
    pub app_details: Option<AppDetails>,
}

/// App-specific details
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppDetails {
    #[prost(string, tag = "1")]
    pub developer_name: String,
    #[prost(int32, tag = "3")]
    pub version_code: i32,
    #[prost(string, tag = "4")]
    pub version_string: String,
    #[prost(string, tag = "5")]
    pub title: String,
    #[prost(string, repeated, tag = "6")]
    pub app_category: Vec<String>,
    #[prost(string, tag = "7")]
    pub content_rating: String,
    #[prost(int64, tag = "9")]
    pub info_download_size: i64,
    #[prost(string, repeated, tag = "10")]
    pub permission: Vec<String>,
    #[prost(string, tag = "12")]
    pub package_name: String,
    /// Human-readable install count label (e.g. "1,000,000+ downloads")
    #[prost(string, tag = "13")]
    pub download_label: String,
}

/// Star-rating aggregate attached to an item
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AggregateRating {
    #[prost(int32, tag = "1")]
    pub rating_type: i32,
    #[prost(float, tag = "2")]
    pub star_rating: f32,
    #[prost(uint64, tag = "3")]
    pub ratings_count: u64,
    #[prost(uint64, tag = "4")]
    pub one_star_ratings: u64,
    #[prost(uint64, tag = "5")]
    pub two_star_ratings: u64,
    #[prost(uint64, tag = "6")]
    pub three_star_ratings: u64,
    #[prost(uint64, tag = "7")]
    pub four_star_ratings: u64,
    #[prost(uint64, tag = "8")]
    pub five_star_ratings: u64,
    #[prost(uint64, tag = "9")]
    pub thumbs_up_count: u64,
    #[prost(uint64, tag = "11")]
    pub comment_count: u64,
}

/// Search payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchResponse {
    #[prost(string, tag = "1")]
    pub original_query: String,
    #[prost(message, repeated, tag = "5")]
    pub item: Vec<Item>,
}

/// Search suggestion payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchSuggestResponse {
    #[prost(message, repeated, tag = "1")]
    pub entry: Vec<SearchSuggestEntry>,
}

/// One search suggestion
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchSuggestEntry {
    #[prost(int32, tag = "1")]
    pub entry_type: i32,
    #[prost(string, tag = "2")]
    pub suggested_query: String,
    #[prost(string, tag = "3")]
    pub title: String,
    #[prost(string, tag = "4")]
    pub package_name: String,
}

/// Browse payload (a shell; the real content ships in prefetch entries)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BrowseResponse {
    #[prost(string, tag = "1")]
    pub contents_url: String,
}

/// Single-item details payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DetailsResponse {
    /// The caller's own review of this item, when one exists
    #[prost(message, optional, tag = "3")]
    pub user_review: Option<ReviewEntry>,
    #[prost(message, optional, tag = "4")]
    pub item: Option<Item>,
    #[prost(string, tag = "5")]
    pub footer_html: String,
}

/// Bulk details request body
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkDetailsRequest {
    #[prost(string, repeated, tag = "1")]
    pub doc_id: Vec<String>,
    #[prost(bool, tag = "2")]
    pub include_child_docs: bool,
    #[prost(bool, tag = "3")]
    pub include_details: bool,
}

/// Bulk details payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkDetailsResponse {
    #[prost(message, repeated, tag = "1")]
    pub entry: Vec<BulkDetailsEntry>,
}

/// One bulk details entry
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkDetailsEntry {
    #[prost(message, optional, tag = "1")]
    pub item: Option<Item>,
}

/// Reviews payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReviewResponse {
    #[prost(message, optional, tag = "1")]
    pub user_reviews: Option<UserReviewsResponse>,
    /// Cursor for the next page of reviews
    #[prost(string, tag = "2")]
    pub next_page_url: String,
    /// Echo of a just-added/edited review
    #[prost(message, optional, tag = "3")]
    pub user_review: Option<ReviewEntry>,
}

/// Review list inside a reviews payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserReviewsResponse {
    #[prost(message, repeated, tag = "1")]
    pub review: Vec<ReviewEntry>,
    #[prost(int64, tag = "2")]
    pub matching_count: i64,
}

/// One review on the wire
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReviewEntry {
    #[prost(int64, tag = "1")]
    pub document_version: i64,
    #[prost(int64, tag = "2")]
    pub timestamp_msec: i64,
    #[prost(int32, tag = "3")]
    pub star_rating: i32,
    #[prost(string, tag = "4")]
    pub title: String,
    #[prost(string, tag = "5")]
    pub comment: String,
    #[prost(string, tag = "6")]
    pub comment_id: String,
    #[prost(message, optional, tag = "33")]
    pub author: Option<ReviewAuthor>,
}

/// Review author profile
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReviewAuthor {
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, repeated, tag = "10")]
    pub image: Vec<Image>,
}

/// Library modification request body
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModifyLibraryRequest {
    #[prost(string, tag = "1")]
    pub library_id: String,
    #[prost(string, repeated, tag = "2")]
    pub add_package_name: Vec<String>,
    #[prost(string, repeated, tag = "3")]
    pub remove_package_name: Vec<String>,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn empty_bytes_decode_to_default_wrapper() {
        let wrapper = ResponseWrapper::decode(&[][..]).unwrap();
        assert!(wrapper.payload.is_none());
        assert!(wrapper.pre_fetch.is_empty());
    }

    #[test]
    fn prefetch_nesting_survives_encode_decode() {
        let inner = ResponseWrapper {
            payload: Some(Payload {
                toc_response: Some(TocResponse {
                    cookie: "session-cookie".into(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let outer = ResponseWrapper {
            pre_fetch: vec![PreFetch {
                url: "toc".into(),
                response: Some(Box::new(inner)),
            }],
            ..Default::default()
        };

        let bytes = outer.encode_to_vec();
        let decoded = ResponseWrapper::decode(bytes.as_slice()).unwrap();
        let nested = decoded.pre_fetch[0]
            .response
            .as_ref()
            .and_then(|r| r.payload.as_ref())
            .and_then(|p| p.toc_response.as_ref())
            .expect("nested toc payload must survive the round trip");
        assert_eq!(nested.cookie, "session-cookie");
    }

    #[test]
    fn fixed64_device_id_round_trips() {
        let response = CheckinResponse {
            android_id: 0x00a1_b2c3,
            device_checkin_consistency_token: "tok".into(),
            ..Default::default()
        };
        let decoded = CheckinResponse::decode(response.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.android_id, 0x00a1_b2c3);
        assert_eq!(format!("{:x}", decoded.android_id), "a1b2c3");
    }
}
