//! Publishing extracted artifacts: destination keys, content types and uploads.

mod destination;
mod mime;
mod presign;
mod upload;

pub use destination::{Destination, DestinationMapper, GLEAN_PACKAGES};
pub use mime::{DEFAULT_CONTENT_TYPE, MIME_MAP, MimeTable};
pub use presign::{Presigner, S3Presigner};
pub use upload::{ObjectStore, PresignedPutStore, UploadTask, upload_all};

use crate::error::Result;

/// Attach a content type to every destination.
pub fn plan_uploads(destinations: Vec<Destination>, mime: &MimeTable) -> Result<Vec<UploadTask>> {
    destinations
        .into_iter()
        .map(|destination| {
            let content_type = mime.content_type(&destination.source)?.to_string();
            Ok(UploadTask {
                source: destination.source,
                destination_key: destination.key,
                content_type,
            })
        })
        .collect()
}
