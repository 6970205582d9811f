/// Shared-secret access gates
pub mod access;
/// Origin-echoing CORS
pub mod cors;

pub use access::{require_download_token, require_upload_token, AccessTokens};
pub use cors::cors;
