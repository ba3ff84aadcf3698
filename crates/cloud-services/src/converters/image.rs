use crate::error::ServiceError;
use arm_client::{COMPUTE_PROVIDER, ImageReference};
use crds::{Image, MarketplaceImage};

/// Build the wire image reference for `image`.
pub fn image_to_sdk(image: Option<&Image>) -> Result<ImageReference, ServiceError> {
    let image = image.ok_or_else(|| ServiceError::Validation("image is nil".to_string()))?;

    Ok(match image {
        Image::Id(id) => ImageReference {
            id: Some(id.clone()),
            ..Default::default()
        },
        Image::SharedGallery(gallery) => ImageReference {
            id: Some(format!(
                "/subscriptions/{}/resourceGroups/{}/providers/{}/galleries/{}/images/{}/versions/{}",
                gallery.subscription_id,
                gallery.resource_group,
                COMPUTE_PROVIDER,
                gallery.gallery,
                gallery.name,
                gallery.version
            )),
            ..Default::default()
        },
        Image::Marketplace(m) => ImageReference {
            id: None,
            publisher: Some(m.publisher.clone()),
            offer: Some(m.offer.clone()),
            sku: Some(m.sku.clone()),
            version: Some(m.version.clone()),
        },
    })
}

/// Read an image back from a wire reference. Gallery images come back as
/// plain IDs.
pub fn sdk_to_image(reference: &ImageReference) -> Option<Image> {
    if let Some(id) = reference.id.as_ref().filter(|id| !id.is_empty()) {
        return Some(Image::Id(id.clone()));
    }
    match (&reference.publisher, &reference.offer, &reference.sku) {
        (Some(publisher), Some(offer), Some(sku)) => Some(Image::Marketplace(MarketplaceImage {
            publisher: publisher.clone(),
            offer: offer.clone(),
            sku: sku.clone(),
            version: reference.version.clone().unwrap_or_default(),
        })),
        _ => None,
    }
}
