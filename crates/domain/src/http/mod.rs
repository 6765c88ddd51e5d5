//! HTTP value types exchanged between the API client and its transport.

mod method;
mod request;
mod response;

pub use method::HttpMethod;
pub use request::{ApiRequest, FilePart, MultipartForm, RequestBody};
pub use response::ApiResponse;
