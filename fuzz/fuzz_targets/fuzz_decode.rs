#![no_main]

use binary_node::{decode, encode, TokenDictionary};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

fn dictionary() -> &'static TokenDictionary {
    static DICTIONARY: OnceLock<TokenDictionary> = OnceLock::new();
    DICTIONARY.get_or_init(|| {
        TokenDictionary::new(["iq", "query", "message", "body"], ["offer", "audio"])
            .unwrap_or_default()
    })
}

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode and decode to the same tree
    if let Ok(node) = decode(data, dictionary()) {
        let bytes = encode(&node, dictionary()).expect("decoded node must re-encode");
        assert_eq!(decode(&bytes, dictionary()).ok(), Some(node));
    }
});
