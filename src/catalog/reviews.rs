//! Review queries

use crate::config::Endpoints;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::models::Review;
use crate::proto;
use crate::session::Session;
use crate::transport::{Param, Transport};

/// Default page size for review listings
const DEFAULT_PAGE_SIZE: usize = 20;

/// Review listing filter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewFilter {
    /// All reviews
    All,
    /// Positive sentiment only
    Positive,
    /// Critical sentiment only
    Critical,
    /// Exactly this many stars (1–5)
    Stars(u8),
}

impl ReviewFilter {
    /// The parameter key/value pair this filter contributes.
    fn param(self) -> Param {
        match self {
            ReviewFilter::All => ("sfilter".to_string(), "ALL".to_string()),
            ReviewFilter::Positive => ("sent".to_string(), "1".to_string()),
            ReviewFilter::Critical => ("sent".to_string(), "2".to_string()),
            ReviewFilter::Stars(stars) => ("rating".to_string(), stars.to_string()),
        }
    }
}

/// One page of reviews plus its continuation cursor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReviewCluster {
    /// Reviews on this page, in server order
    pub reviews: Vec<Review>,
    /// Cursor for the next page (empty when exhausted)
    pub next_page_url: String,
}

impl ReviewCluster {
    /// Whether more reviews can be fetched.
    pub fn has_next(&self) -> bool {
        !self.next_page_url.is_empty()
    }
}

fn cluster_from_response(response: &proto::ReviewResponse) -> ReviewCluster {
    let reviews = response
        .user_reviews
        .as_ref()
        .map(|reviews| reviews.review.iter().map(Review::from_entry).collect())
        .unwrap_or_default();
    ReviewCluster {
        reviews,
        next_page_url: response.next_page_url.clone(),
    }
}

async fn get_review_response(
    transport: &dyn Transport,
    session: &Session,
    url: &str,
    params: &[Param],
) -> Result<proto::ReviewResponse> {
    let headers = session.default_headers();
    let response = transport.get(url, &headers, params).await?;
    if !response.successful {
        return Err(Error::Server {
            code: response.status,
            reason: response.error_text,
        });
    }
    Envelope::decode(&response.body)?.expect_review()
}

/// Fetch one page of reviews for a package.
pub async fn reviews(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    package_name: &str,
    filter: ReviewFilter,
) -> Result<ReviewCluster> {
    let params = vec![
        ("doc".to_string(), package_name.to_string()),
        ("n".to_string(), DEFAULT_PAGE_SIZE.to_string()),
        filter.param(),
    ];
    let response =
        get_review_response(transport, session, &endpoints.reviews(), &params).await?;
    Ok(cluster_from_response(&response))
}

/// Fetch the caller's own review of a package, if one exists.
pub async fn user_review(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    package_name: &str,
) -> Result<Option<Review>> {
    let params = vec![
        ("doc".to_string(), package_name.to_string()),
        ("itpr".to_string(), "false".to_string()),
    ];
    let response =
        get_review_response(transport, session, &endpoints.reviews(), &params).await?;
    Ok(response
        .user_reviews
        .as_ref()
        .and_then(|reviews| reviews.review.first())
        .map(Review::from_entry))
}

/// Add or edit the caller's review of a package.
///
/// Returns the server's echo of the stored review, when it sent one.
pub async fn add_or_edit_review(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    package_name: &str,
    title: &str,
    content: &str,
    rating: i32,
    is_beta: bool,
) -> Result<Option<Review>> {
    let params = vec![
        ("doc".to_string(), package_name.to_string()),
        ("title".to_string(), title.to_string()),
        ("content".to_string(), content.to_string()),
        ("rating".to_string(), rating.to_string()),
        ("rst".to_string(), "3".to_string()),
        ("itpr".to_string(), is_beta.to_string()),
    ];
    let headers = session.default_headers();

    let response = transport
        .post_form(&endpoints.add_review(), &headers, &params)
        .await?;
    if !response.successful {
        return Err(Error::Server {
            code: response.status,
            reason: response.error_text,
        });
    }

    let review = Envelope::decode(&response.body)?.expect_review()?;
    Ok(review.user_review.as_ref().map(Review::from_entry))
}

/// Follow a review continuation cursor.
pub async fn next_reviews(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    cursor: &str,
) -> Result<ReviewCluster> {
    let url = endpoints.resolve_cursor(cursor);
    let response = get_review_response(transport, session, &url, &[]).await?;
    Ok(cluster_from_response(&response))
}
