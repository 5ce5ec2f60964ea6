#![no_main]

use binary_node::{NodeCodec, TokenDictionary};
use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    // Feed input in uneven chunks; the codec must never panic or loop
    let dictionary = Arc::new(TokenDictionary::new(["iq", "query"], ["offer"]).unwrap_or_default());
    let mut codec = NodeCodec::new(dictionary).with_max_frame_size(4096);
    let mut buf = BytesMut::new();
    for chunk in data.chunks(7) {
        buf.extend_from_slice(chunk);
        loop {
            match codec.decode(&mut buf) {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(_) => return,
            }
        }
    }
});
