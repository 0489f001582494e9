mod error;
mod key;
mod traits;

pub mod memory;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::MediaError;
pub use key::{MediaKey, MediaKind};
pub use traits::{MediaStore, PendingUpload, UploadedMedia};
