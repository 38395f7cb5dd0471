//! Tests for the HTTP adapter's request construction.

use crate::adapters::HttpIndexerApi;
use ordiff_compare::{IndexerApiAdapter, Protocol};

#[test]
fn trailing_slash_is_trimmed_from_endpoint() {
    let api = HttpIndexerApi::new("https://indexer.example.com/", Protocol::Brc20).unwrap();
    assert_eq!(api.endpoint(), "https://indexer.example.com");
}

#[test]
fn endpoint_without_trailing_slash_is_unchanged() {
    let api = HttpIndexerApi::new("http://127.0.0.1:8080", Protocol::Ordinal).unwrap();
    assert_eq!(api.endpoint(), "http://127.0.0.1:8080");
}

#[test]
fn protocols_map_to_their_api_path_segments() {
    assert_eq!(Protocol::Ordinal.receipt_path_segment(), "ord");
    assert_eq!(Protocol::Brc20.receipt_path_segment(), "brc20");
}
