//! Port implementations backed by third-party crates.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;
