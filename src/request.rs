//! Boundary traits for the transport layer.
//!
//! The engine never parses wire bytes or owns sockets; callers hand it
//! an already-parsed request through this trait and render the returned
//! action value themselves.

use std::collections::HashMap;

/// An already-parsed inbound request.
pub trait Request: Send + Sync + 'static {
    /// Upper- or lower-case method verb; matching uppercases it.
    fn method(&self) -> &str;

    /// The full request URL as received.
    fn url(&self) -> &str;

    /// The path component matched against route patterns.
    fn path(&self) -> &str;

    fn content_length(&self) -> usize;

    /// Decoded body parameters for binding-model population. Empty when
    /// the request carries no body.
    fn body_params(&self) -> &HashMap<String, String>;

    /// Session identifier, when the transport layer established one.
    /// `None` means the dispatch runs without session-scoped services.
    fn session_id(&self) -> Option<&str>;
}

/// An outbound response under construction. Handlers that take the
/// response as a bean parameter mutate it through interior mutability;
/// the transport layer serializes it after dispatch returns.
pub trait Response: Send + Sync + 'static {
    fn status(&self) -> u16;

    fn set_status(&self, status: u16);

    fn set_header(&self, name: &str, value: &str);

    fn set_body(&self, body: Vec<u8>);

    /// Wire-ready serialization of the response as built so far.
    fn wire_bytes(&self) -> Vec<u8>;
}
