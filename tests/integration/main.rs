//! Integration tests: the full pipeline against stub sources and a local
//! mock HTTP server.

mod stub_sources;
mod pipeline;
mod http_end_to_end;
