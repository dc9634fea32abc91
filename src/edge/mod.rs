//! Edge function handlers
//!
//! The two handlers the edge binder can attach, as pure functions over the
//! CloudFront event contract. Neither performs I/O.

pub mod event;
pub mod origin_response;
pub mod viewer_request;

pub use event::{CfRequest, CfResponse, CloudFrontEvent, EventError, HeaderEntry, Headers};
pub use viewer_request::is_asset;
