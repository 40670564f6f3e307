//! Consent manager HTTP client
//!
//! Two outbound calls: `POST {uri}participants/login` exchanges the
//! service key + secret key for a bearer token, and
//! `POST {uri}users/register` links a local user to a remote identifier.
//! Failures are returned to the caller so it can abort instead of
//! proceeding with an invalid token.

mod client;

pub use client::{ConsentApi, ConsentError, ConsentHttpClient, ConsentSettings, ConsentToken};
