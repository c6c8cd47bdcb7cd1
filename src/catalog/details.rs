//! App details queries

use prost::Message;

use crate::config::Endpoints;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::models::App;
use crate::proto;
use crate::session::Session;
use crate::transport::Transport;

/// Fetch the details of a single app by package name.
///
/// A rejected request maps to [`Error::AppNotFound`] carrying the server's
/// reason — the common causes are OEM or regional restrictions rather than
/// outright absence.
pub async fn app_details(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    package_name: &str,
) -> Result<App> {
    let headers = session.default_headers();
    let params = [("doc".to_string(), package_name.to_string())];

    let response = transport
        .get(&endpoints.details(), &headers, &params)
        .await?;
    if !response.successful {
        return Err(Error::AppNotFound {
            reason: response.error_text,
        });
    }

    let details = Envelope::decode(&response.body)?.expect_details()?;
    let item = details.item.ok_or_else(|| Error::AppNotFound {
        reason: format!("no details item for {package_name}"),
    })?;
    Ok(App::from_item(&item))
}

/// Fetch the details of several apps in one round-trip.
///
/// Packages unknown to the server are silently absent from the result; a
/// rejected request is a [`Error::Server`].
pub async fn bulk_details(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    package_names: &[String],
) -> Result<Vec<App>> {
    let request = proto::BulkDetailsRequest {
        doc_id: package_names.to_vec(),
        include_child_docs: false,
        include_details: true,
    };
    let headers = session.default_headers();

    let response = transport
        .post_bytes(&endpoints.bulk_details(), &headers, &request.encode_to_vec())
        .await?;
    if !response.successful {
        return Err(Error::Server {
            code: response.status,
            reason: response.error_text,
        });
    }

    let bulk = Envelope::decode(&response.body)?.expect_bulk_details()?;
    Ok(bulk
        .entry
        .iter()
        .filter_map(|entry| entry.item.as_ref())
        .map(App::from_item)
        .collect())
}
