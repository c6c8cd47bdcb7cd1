//! Purchase/delivery transaction
//!
//! A two-call protocol with a mid-flight decision point: acquire the
//! entitlement ("buy"), then request the delivery manifest, then branch on
//! the manifest's status code. Terminal outcomes are a non-empty artifact
//! list, or one of the domain errors (`AppNotSupported`, `AppNotPurchased`,
//! `EmptyDownloads`, `Unknown`). A failed entitlement call is fatal — no
//! delivery is attempted.
//!
//! No state is retained between the two round-trips beyond the delivery
//! token threaded from the first into the second.

use crate::config::Endpoints;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::proto;
use crate::session::Session;
use crate::transport::{Param, Transport, TransportResponse};
use crate::types::{Artifact, ArtifactKind};

/// Patch formats advertised when patch negotiation is requested.
///
/// Patch delivery is present in the protocol surface but unexercised by
/// default; the first format is forwarded only when an installed version is
/// supplied.
const PATCH_FORMAT_GDIFF: i32 = 1;

/// The result of a successful entitlement acquisition
///
/// Transient: consumed immediately by the delivery step, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseGrant {
    /// Package the entitlement covers
    pub package_name: String,
    /// Version the entitlement covers
    pub version_code: i32,
    /// Offer type the entitlement was acquired under (1 for free apps)
    pub offer_type: i32,
    /// Opaque delivery token; may be empty, which simply means there is no
    /// token to forward
    pub delivery_token: String,
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

/// Acquire the entitlement for a package/version/offer triple.
///
/// A failed call here terminates the transaction; callers must not proceed
/// to delivery without a grant.
pub async fn acquire(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    package_name: &str,
    version_code: i32,
    offer_type: i32,
) -> Result<PurchaseGrant> {
    let params: Vec<Param> = vec![
        ("ot".to_string(), offer_type.to_string()),
        ("doc".to_string(), package_name.to_string()),
        ("vc".to_string(), version_code.to_string()),
    ];
    let headers = session.default_headers();

    let response = transport
        .post_form(&endpoints.purchase(), &headers, &params)
        .await?;
    check_response(&response)?;

    let buy = Envelope::decode(&response.body)?.expect_buy()?;
    tracing::debug!(
        package = package_name,
        token_present = !buy.encoded_delivery_token.is_empty(),
        "entitlement acquired"
    );

    Ok(PurchaseGrant {
        package_name: package_name.to_string(),
        version_code,
        offer_type,
        delivery_token: buy.encoded_delivery_token,
    })
}

/// Request the delivery manifest for an acquired entitlement.
///
/// `installed_version_code` enables patch negotiation when supplied; the
/// patch path is a protocol extension point that returns through the same
/// manifest shape.
pub async fn deliver(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    grant: &PurchaseGrant,
    installed_version_code: Option<i32>,
) -> Result<proto::DeliveryResponse> {
    let mut params: Vec<Param> = vec![
        ("ot".to_string(), grant.offer_type.to_string()),
        ("doc".to_string(), grant.package_name.to_string()),
        ("vc".to_string(), grant.version_code.to_string()),
    ];
    if let Some(installed) = installed_version_code.filter(|v| *v > 0) {
        params.push(("bvc".to_string(), installed.to_string()));
        params.push(("pf".to_string(), PATCH_FORMAT_GDIFF.to_string()));
    }
    if !grant.delivery_token.is_empty() {
        params.push(("dtok".to_string(), grant.delivery_token.clone()));
    }
    let headers = session.default_headers();

    let response = transport
        .get(&endpoints.delivery(), &headers, &params)
        .await?;
    check_response(&response)?;

    Envelope::decode(&response.body)?.expect_delivery()
}

/// Dispatch on the manifest status and assemble the artifact list.
///
/// Status `1` proceeds to assembly; `2` and `3` map to their domain errors;
/// anything else is unknown. A nominally successful manifest that yields
/// zero artifacts is itself a failure, never an empty success.
pub(crate) fn manifest_artifacts(
    package_name: &str,
    version_code: i32,
    delivery: &proto::DeliveryResponse,
) -> Result<Vec<Artifact>> {
    if delivery.status != 1 {
        return Err(Error::from_delivery_status(delivery.status));
    }

    let mut artifacts = Vec::new();
    if let Some(data) = &delivery.app_delivery_data {
        artifacts.push(Artifact {
            name: format!("{package_name}.apk"),
            url: data.download_url.clone(),
            size: data.download_size.max(0) as u64,
            kind: ArtifactKind::Base,
        });

        for file in &data.additional_file {
            let (label, kind) = if file.file_type == 0 {
                ("main", ArtifactKind::Expansion)
            } else {
                ("patch", ArtifactKind::Patch)
            };
            artifacts.push(Artifact {
                name: format!("{label}.{version_code}.{package_name}.obb"),
                url: file.download_url.clone(),
                size: file.size.max(0) as u64,
                kind,
            });
        }

        for split in &data.split_delivery_data {
            artifacts.push(Artifact {
                name: format!("{}.apk", split.name),
                url: split.download_url.clone(),
                size: split.download_size.max(0) as u64,
                kind: ArtifactKind::Split,
            });
        }
    }

    if artifacts.is_empty() {
        return Err(Error::EmptyDownloads);
    }
    Ok(artifacts)
}

/// Execute the full purchase → delivery transaction.
///
/// Two network round-trips; the grant's delivery token is the only state
/// threaded between them. On success the returned list contains at least
/// one [`ArtifactKind::Base`] artifact.
pub async fn purchase(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &Session,
    package_name: &str,
    version_code: i32,
    offer_type: i32,
) -> Result<Vec<Artifact>> {
    if !session.ready_for_purchase() {
        // Not enforced locally; the remote side is authoritative.
        tracing::warn!(
            package = package_name,
            "purchase attempted without PLAY token or device config token"
        );
    }

    let grant = acquire(
        transport,
        endpoints,
        session,
        package_name,
        version_code,
        offer_type,
    )
    .await?;
    let delivery = deliver(transport, endpoints, session, &grant, None).await?;
    let artifacts = manifest_artifacts(package_name, version_code, &delivery)?;
    tracing::info!(
        package = package_name,
        artifacts = artifacts.len(),
        "delivery manifest assembled"
    );
    Ok(artifacts)
}
