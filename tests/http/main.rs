//! HTTP integration tests.
//!
//! Starts an axum server and talks to it through `HttpTransport`, and checks
//! the identity map middleware resets repositories between requests.

#![cfg(feature = "http")]
