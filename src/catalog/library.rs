//! Library/wishlist access

use prost::Message;

use crate::config::Endpoints;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::models::App;
use crate::proto;
use crate::session::Session;
use crate::stream::apps_from_item;
use crate::transport::Transport;

/// Wishlist library identifier
const WISHLIST_LIBRARY_ID: &str = "u-wl";

/// Fetch the account's wishlist.
pub async fn wishlist(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
) -> Result<Vec<App>> {
    let headers = session.default_headers();
    let params = [
        ("c".to_string(), "0".to_string()),
        ("dt".to_string(), "7".to_string()),
        ("libid".to_string(), WISHLIST_LIBRARY_ID.to_string()),
    ];

    let response = transport
        .get(&endpoints.library(), &headers, &params)
        .await?;
    if !response.successful {
        return Err(Error::Server {
            code: response.status,
            reason: response.error_text,
        });
    }

    let envelope = Envelope::decode(&response.body)?;
    let mut apps = Vec::new();
    if let Some(list) = envelope.list_response() {
        for item in &list.item {
            apps.extend(apps_from_item(item));
        }
    }
    Ok(apps)
}

/// Add a package to, or remove it from, the wishlist.
///
/// Returns whether the server accepted the modification.
pub async fn modify_wishlist(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    package_name: &str,
    add: bool,
) -> Result<bool> {
    let mut request = proto::ModifyLibraryRequest {
        library_id: WISHLIST_LIBRARY_ID.to_string(),
        ..Default::default()
    };
    if add {
        request.add_package_name.push(package_name.to_string());
    } else {
        request.remove_package_name.push(package_name.to_string());
    }

    let headers = session.default_headers();
    let response = transport
        .post_bytes(
            &endpoints.modify_library(),
            &headers,
            &request.encode_to_vec(),
        )
        .await?;
    Ok(response.successful)
}
