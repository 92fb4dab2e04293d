//! Local static-file server for precompressed (`.gz`) web assets.
//!
//! `*.js.gz` and `*.wasm.gz` files go out byte-for-byte with the JavaScript
//! or WebAssembly content type plus `Content-Encoding: gzip`, so browsers
//! inflate and run them directly. Everything else is ordinary static file
//! serving from the document root.

pub mod args;
pub mod compression;
pub mod file_serving;
pub mod logging;
pub mod request;
pub mod response;
pub mod server;
