//! Persistence adapters

mod mft_sink;

pub use mft_sink::LocalMftSink;
