//! Catalog domain models
//!
//! Pure, stateless transcription from wire items into caller-facing data.
//! Builders never fail: absent wire fields become defaults, and the
//! install-count label parse is explicitly best-effort (the label is a
//! locale-dependent display string, not a contract).

use serde::{Deserialize, Serialize};

use crate::proto;
use crate::utils::parse_count_label;

/// Artwork attached to a catalog item
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    /// Wire image type discriminator
    pub kind: i32,
    /// Image URL
    pub url: String,
    /// Width in pixels (0 when unreported)
    pub width: i32,
    /// Height in pixels (0 when unreported)
    pub height: i32,
}

impl Artwork {
    /// Build from a wire image descriptor.
    pub fn from_image(image: &proto::Image) -> Self {
        let dimension = image.dimension.clone().unwrap_or_default();
        Self {
            kind: image.image_type,
            url: image.image_url.clone(),
            width: dimension.width,
            height: dimension.height,
        }
    }
}

/// Star-rating aggregate for an app
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average star rating
    pub average: f32,
    /// Total number of ratings
    pub total: u64,
    /// One-star count
    pub one_star: u64,
    /// Two-star count
    pub two_star: u64,
    /// Three-star count
    pub three_star: u64,
    /// Four-star count
    pub four_star: u64,
    /// Five-star count
    pub five_star: u64,
    /// Thumbs-up count
    pub thumbs_up: u64,
    /// Comment count
    pub comments: u64,
}

impl Rating {
    fn from_aggregate(aggregate: &proto::AggregateRating) -> Self {
        Self {
            average: aggregate.star_rating,
            total: aggregate.ratings_count,
            one_star: aggregate.one_star_ratings,
            two_star: aggregate.two_star_ratings,
            three_star: aggregate.three_star_ratings,
            four_star: aggregate.four_star_ratings,
            five_star: aggregate.five_star_ratings,
            thumbs_up: aggregate.thumbs_up_count,
            comments: aggregate.comment_count,
        }
    }
}

/// One app from the catalog
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// Package name (the stable identifier)
    pub package_name: String,
    /// Display name
    pub display_name: String,
    /// Developer name
    pub developer_name: String,
    /// Version code
    pub version_code: i32,
    /// Version string
    pub version_name: String,
    /// HTML description
    pub description: String,
    /// Category labels
    pub categories: Vec<String>,
    /// Content rating label
    pub content_rating: String,
    /// Download size in bytes
    pub size: u64,
    /// Best-effort install count parsed from the display label; 0 when the
    /// label was absent or unparseable
    pub installs: u64,
    /// Declared permissions
    pub permissions: Vec<String>,
    /// Offer type to use for purchase (defaults to 1)
    pub offer_type: i32,
    /// Formatted price of the first offer, empty for free apps
    pub price: String,
    /// Whether the first offer is free
    pub is_free: bool,
    /// Rating aggregate
    pub rating: Rating,
    /// Artwork attached to the item
    pub artwork: Vec<Artwork>,
}

impl App {
    /// Build from a wire item. Infallible; missing blocks become defaults.
    pub fn from_item(item: &proto::Item) -> Self {
        let details = item
            .details
            .as_ref()
            .and_then(|d| d.app_details.as_ref())
            .cloned()
            .unwrap_or_default();

        let offer = item.offer.first();
        let micros = offer.map(|o| o.micros).unwrap_or(0);

        Self {
            package_name: if details.package_name.is_empty() {
                item.id.clone()
            } else {
                details.package_name.clone()
            },
            display_name: if item.title.is_empty() {
                details.title.clone()
            } else {
                item.title.clone()
            },
            developer_name: if details.developer_name.is_empty() {
                item.creator.clone()
            } else {
                details.developer_name.clone()
            },
            version_code: details.version_code,
            version_name: details.version_string.clone(),
            description: item.description_html.clone(),
            categories: details.app_category.clone(),
            content_rating: details.content_rating.clone(),
            size: details.info_download_size.max(0) as u64,
            installs: parse_count_label(&details.download_label),
            permissions: details.permission.clone(),
            offer_type: offer.map(|o| o.offer_type).filter(|t| *t != 0).unwrap_or(1),
            price: offer.map(|o| o.formatted_amount.clone()).unwrap_or_default(),
            is_free: micros == 0,
            rating: item
                .aggregate_rating
                .as_ref()
                .map(Rating::from_aggregate)
                .unwrap_or_default(),
            artwork: item.image.iter().map(Artwork::from_image).collect(),
        }
    }
}

/// One user review of an app
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Author display name
    pub author: String,
    /// Review title
    pub title: String,
    /// Review body
    pub comment: String,
    /// Server-side comment identifier
    pub comment_id: String,
    /// Star rating (1–5)
    pub rating: i32,
    /// Review timestamp in milliseconds
    pub timestamp_msec: i64,
}

impl Review {
    /// Build from a wire review entry. Infallible.
    pub fn from_entry(entry: &proto::ReviewEntry) -> Self {
        Self {
            author: entry
                .author
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            title: entry.title.clone(),
            comment: entry.comment.clone(),
            comment_id: entry.comment_id.clone(),
            rating: entry.star_rating,
            timestamp_msec: entry.timestamp_msec,
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn app_item() -> proto::Item {
        proto::Item {
            id: "com.example.app".into(),
            item_type: 1,
            title: "Example App".into(),
            creator: "Example Inc".into(),
            description_html: "<p>Example</p>".into(),
            offer: vec![proto::Offer {
                micros: 0,
                currency_code: "USD".into(),
                formatted_amount: String::new(),
                offer_type: 1,
            }],
            details: Some(proto::Details {
                app_details: Some(proto::AppDetails {
                    developer_name: "Example Inc".into(),
                    version_code: 5,
                    version_string: "1.2.3".into(),
                    package_name: "com.example.app".into(),
                    info_download_size: 123_456,
                    download_label: "10,000+ downloads".into(),
                    app_category: vec!["TOOLS".into()],
                    ..Default::default()
                }),
            }),
            aggregate_rating: Some(proto::AggregateRating {
                star_rating: 4.5,
                ratings_count: 321,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn app_builder_transcribes_detail_fields() {
        let app = App::from_item(&app_item());
        assert_eq!(app.package_name, "com.example.app");
        assert_eq!(app.display_name, "Example App");
        assert_eq!(app.version_code, 5);
        assert_eq!(app.version_name, "1.2.3");
        assert_eq!(app.size, 123_456);
        assert_eq!(app.installs, 10_000);
        assert_eq!(app.categories, vec!["TOOLS".to_string()]);
        assert_eq!(app.offer_type, 1);
        assert!(app.is_free);
        assert_eq!(app.rating.average, 4.5);
        assert_eq!(app.rating.total, 321);
    }

    #[test]
    fn app_builder_tolerates_bare_items() {
        let app = App::from_item(&proto::Item::default());
        assert!(app.package_name.is_empty());
        assert_eq!(app.version_code, 0);
        assert_eq!(app.installs, 0);
        assert_eq!(app.offer_type, 1, "missing offer defaults to type 1");
    }

    #[test]
    fn app_builder_falls_back_to_item_id_for_package() {
        let item = proto::Item {
            id: "com.example.fallback".into(),
            ..Default::default()
        };
        assert_eq!(App::from_item(&item).package_name, "com.example.fallback");
    }

    #[test]
    fn review_builder_reads_author_through_profile() {
        let entry = proto::ReviewEntry {
            star_rating: 4,
            title: "Good".into(),
            comment: "Works".into(),
            comment_id: "c1".into(),
            timestamp_msec: 1700,
            author: Some(proto::ReviewAuthor {
                name: "Reviewer".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let review = Review::from_entry(&entry);
        assert_eq!(review.author, "Reviewer");
        assert_eq!(review.rating, 4);
        assert_eq!(review.comment_id, "c1");
    }

    #[test]
    fn review_builder_tolerates_missing_author() {
        let review = Review::from_entry(&proto::ReviewEntry::default());
        assert!(review.author.is_empty());
    }

    #[test]
    fn artwork_builder_reads_dimensions() {
        let image = proto::Image {
            image_type: 4,
            image_url: "https://img/x.png".into(),
            dimension: Some(proto::ImageDimension {
                width: 512,
                height: 256,
                aspect_ratio: 0,
            }),
        };
        let artwork = Artwork::from_image(&image);
        assert_eq!(artwork.kind, 4);
        assert_eq!(artwork.width, 512);
        assert_eq!(artwork.height, 256);
    }
}
