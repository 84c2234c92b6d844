//! Network layer: wire types, transport seam, and the authenticated pipeline.

pub mod pipeline;
pub mod transport;
pub mod types;

pub use pipeline::{ApiClient, REFRESH_PATH};
pub use transport::{Attachment, FormPart, HttpTransport, Method, MultipartForm, PendingRequest, RawResponse, Transport};
pub use types::{Envelope, Message};
