//! Response envelope codec
//!
//! Every binary response body is an outer envelope carrying one primary
//! payload and zero or more prefetched sub-responses. Decoding resolves the
//! payload union into a tagged [`PayloadKind`] once, so callers match on a
//! variant instead of probing individual fields.
//!
//! The prefetch fallback rule: the server sometimes ships the real answer
//! inside a prefetch slot while the primary slot holds a placeholder. A
//! structurally empty primary payload (an empty list/search, a browse shell,
//! or no payload at all) therefore defers to the first prefetch entry.

use prost::Message;

use crate::error::{Error, Result};
use crate::proto;

/// The decoded payload union: one tag per response kind
#[derive(Clone, Debug, PartialEq)]
pub enum PayloadKind {
    /// Listing payload
    List(proto::ListResponse),
    /// Single-item details payload
    Details(proto::DetailsResponse),
    /// Reviews payload
    Review(proto::ReviewResponse),
    /// Entitlement acquisition payload
    Buy(proto::BuyResponse),
    /// Search payload
    Search(proto::SearchResponse),
    /// Terms-of-service payload
    Toc(proto::TocResponse),
    /// Browse payload
    Browse(proto::BrowseResponse),
    /// Terms acceptance payload
    AcceptTos(proto::AcceptTosResponse),
    /// Bulk details payload
    BulkDetails(proto::BulkDetailsResponse),
    /// Delivery manifest payload
    Delivery(proto::DeliveryResponse),
    /// Device configuration upload payload
    UploadDeviceConfig(proto::UploadDeviceConfigResponse),
    /// Search suggestion payload
    SearchSuggest(proto::SearchSuggestResponse),
    /// No payload was present
    Empty,
}

impl PayloadKind {
    /// Whether this payload is a placeholder for the list-like kinds that
    /// participate in prefetch fallback.
    fn is_structurally_empty(&self) -> bool {
        match self {
            PayloadKind::List(list) => list.item.is_empty(),
            PayloadKind::Search(search) => search.item.is_empty(),
            // Browse payloads are shells; their content always ships in
            // prefetch entries.
            PayloadKind::Browse(_) => true,
            PayloadKind::Empty => true,
            _ => false,
        }
    }
}

/// A decoded wire response
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Primary payload
    pub payload: PayloadKind,
    /// Prefetched sub-envelopes, in server order
    pub prefetch: Vec<Envelope>,
    /// Server-attached error message, when one was sent
    pub server_message: Option<String>,
}

impl Envelope {
    /// Decode an envelope from response body bytes.
    ///
    /// Pure and idempotent; the same bytes always produce a structurally
    /// equal envelope. Failures mean the caller chose the wrong decode path
    /// or the server changed shape — never retry them.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let wrapper = proto::ResponseWrapper::decode(bytes)?;
        Ok(Self::from_wrapper(wrapper))
    }

    fn from_wrapper(wrapper: proto::ResponseWrapper) -> Self {
        let server_message = wrapper
            .commands
            .map(|c| c.display_error_message)
            .filter(|m| !m.is_empty());

        let prefetch = wrapper
            .pre_fetch
            .into_iter()
            .filter_map(|entry| entry.response)
            .map(|response| Self::from_wrapper(*response))
            .collect();

        Envelope {
            payload: resolve_union(wrapper.payload),
            prefetch,
            server_message,
        }
    }

    /// The payload after applying the prefetch fallback rule.
    ///
    /// Primary takes precedence unless it is structurally empty and at
    /// least one prefetch entry exists, in which case the first prefetch
    /// entry's payload is used.
    pub fn resolved(&self) -> &PayloadKind {
        if self.payload.is_structurally_empty() {
            if let Some(first) = self.prefetch.first() {
                return &first.payload;
            }
        }
        &self.payload
    }

    /// The resolved listing payload, if this envelope carries one.
    pub fn list_response(&self) -> Option<&proto::ListResponse> {
        match self.resolved() {
            PayloadKind::List(list) => Some(list),
            _ => None,
        }
    }

    /// The resolved search payload, if this envelope carries one.
    pub fn search_response(&self) -> Option<&proto::SearchResponse> {
        match self.resolved() {
            PayloadKind::Search(search) => Some(search),
            _ => None,
        }
    }

    fn unexpected(self, expected: &str) -> Error {
        match self.server_message {
            Some(message) => Error::ProtocolDecode(format!(
                "expected {expected} payload, server said: {message}"
            )),
            None => Error::ProtocolDecode(format!("expected {expected} payload")),
        }
    }

    /// Extract the entitlement payload or fail.
    pub fn expect_buy(self) -> Result<proto::BuyResponse> {
        match self.payload {
            PayloadKind::Buy(buy) => Ok(buy),
            _ => Err(self.unexpected("buy")),
        }
    }

    /// Extract the delivery payload or fail.
    pub fn expect_delivery(self) -> Result<proto::DeliveryResponse> {
        match self.payload {
            PayloadKind::Delivery(delivery) => Ok(delivery),
            _ => Err(self.unexpected("delivery")),
        }
    }

    /// Extract the terms-of-service payload or fail.
    pub fn expect_toc(self) -> Result<proto::TocResponse> {
        match self.payload {
            PayloadKind::Toc(toc) => Ok(toc),
            _ => Err(self.unexpected("toc")),
        }
    }

    /// Extract the terms acceptance payload or fail.
    pub fn expect_accept_tos(self) -> Result<proto::AcceptTosResponse> {
        match self.payload {
            PayloadKind::AcceptTos(ack) => Ok(ack),
            _ => Err(self.unexpected("accept-tos")),
        }
    }

    /// Extract the device configuration upload payload or fail.
    pub fn expect_upload_device_config(self) -> Result<proto::UploadDeviceConfigResponse> {
        match self.payload {
            PayloadKind::UploadDeviceConfig(response) => Ok(response),
            _ => Err(self.unexpected("upload-device-config")),
        }
    }

    /// Extract the details payload or fail.
    pub fn expect_details(self) -> Result<proto::DetailsResponse> {
        match self.payload {
            PayloadKind::Details(details) => Ok(details),
            _ => Err(self.unexpected("details")),
        }
    }

    /// Extract the bulk details payload or fail.
    pub fn expect_bulk_details(self) -> Result<proto::BulkDetailsResponse> {
        match self.payload {
            PayloadKind::BulkDetails(bulk) => Ok(bulk),
            _ => Err(self.unexpected("bulk-details")),
        }
    }

    /// Extract the reviews payload or fail.
    pub fn expect_review(self) -> Result<proto::ReviewResponse> {
        match self.payload {
            PayloadKind::Review(review) => Ok(review),
            _ => Err(self.unexpected("review")),
        }
    }
}

/// Resolve the wire payload union into its tag, checked in a fixed
/// precedence order. Servers populate exactly one field.
fn resolve_union(payload: Option<proto::Payload>) -> PayloadKind {
    let Some(payload) = payload else {
        return PayloadKind::Empty;
    };
    if let Some(delivery) = payload.delivery_response {
        PayloadKind::Delivery(delivery)
    } else if let Some(buy) = payload.buy_response {
        PayloadKind::Buy(buy)
    } else if let Some(toc) = payload.toc_response {
        PayloadKind::Toc(toc)
    } else if let Some(ack) = payload.accept_tos_response {
        PayloadKind::AcceptTos(ack)
    } else if let Some(config) = payload.upload_device_config_response {
        PayloadKind::UploadDeviceConfig(config)
    } else if let Some(details) = payload.details_response {
        PayloadKind::Details(details)
    } else if let Some(bulk) = payload.bulk_details_response {
        PayloadKind::BulkDetails(bulk)
    } else if let Some(review) = payload.review_response {
        PayloadKind::Review(review)
    } else if let Some(suggest) = payload.search_suggest_response {
        PayloadKind::SearchSuggest(suggest)
    } else if let Some(search) = payload.search_response {
        PayloadKind::Search(search)
    } else if let Some(list) = payload.list_response {
        PayloadKind::List(list)
    } else if let Some(browse) = payload.browse_response {
        PayloadKind::Browse(browse)
    } else {
        PayloadKind::Empty
    }
}
