//! Repository integration tests, driven through a stub transport.

mod support;
mod persistence;
mod caching;
mod errors;
mod registry;
