//! Integration tests for the playback core.
//! Sessions run against mocked audio node and voice gateway capabilities.

mod common;
mod integration;
