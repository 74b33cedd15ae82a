//! HTTP plumbing shared by the vendor backends.

mod http;

pub use http::{HttpTransport, TransportError};
