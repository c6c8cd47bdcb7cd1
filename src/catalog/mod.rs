//! Catalog queries
//!
//! Thin callers over the envelope and stream decoders: app details, search,
//! reviews, and library/wishlist access. Every operation takes its
//! transport, endpoint table, and session explicitly — there is no implicit
//! default client and no state beyond the session the caller passes in.

mod details;
mod library;
mod reviews;
mod search;

pub use details::{app_details, bulk_details};
pub use library::{modify_wishlist, wishlist};
pub use reviews::{
    ReviewCluster, ReviewFilter, add_or_edit_review, next_reviews, reviews, user_review,
};
pub use search::{
    SearchBundle, SearchCursor, SearchCursorKind, next_search, search, search_suggestions,
};

use crate::config::Endpoints;
use crate::error::Result;
use crate::session::Session;
use crate::transport::Transport;

/// Probe whether the session's tokens are still accepted.
///
/// Issues a cheap authenticated call and reports acceptance; expired or
/// revoked tokens show up as a rejected probe, not an error.
pub async fn validate_session(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
) -> Result<bool> {
    let headers = session.default_headers();
    let response = transport
        .post_form(&endpoints.content_sync(), &headers, &[])
        .await?;
    Ok(response.successful)
}
