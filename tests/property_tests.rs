//! Property-based tests using proptest
//!
//! These tests validate codec invariants across randomly generated trees and
//! byte strings: round-trip equality, deterministic output, exact sizing and
//! safe rejection of truncated or arbitrary input.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use binary_node::core::NodeEncoder;
use binary_node::{decode, encode, AttrValue, Attributes, CodecError, Content, Node, TokenDictionary};
use proptest::prelude::*;

const TAGS: &[&str] = &["iq", "query", "message", "presence", "body"];
const DOUBLE: &[&str] = &["offer", "audio"];

fn dictionary() -> TokenDictionary {
    TokenDictionary::new(TAGS.iter().copied(), DOUBLE.iter().copied()).expect("dictionary")
}

fn arb_tag() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(TAGS).prop_map(str::to_string),
        prop::sample::select(DOUBLE).prop_map(str::to_string),
        Just(String::new()),
        "[a-z:@.]{1,12}",
    ]
}

fn arb_attr_value() -> impl Strategy<Value = AttrValue> {
    prop_oneof![
        ".{0,40}".prop_map(AttrValue::Text),
        prop::collection::vec(any::<u8>(), 0..300).prop_map(AttrValue::Binary),
    ]
}

fn arb_attrs() -> impl Strategy<Value = Attributes> {
    prop::collection::vec(("[a-z]{1,8}", arb_attr_value()), 0..6)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn arb_leaf_content() -> impl Strategy<Value = Content> {
    prop_oneof![
        Just(Content::Absent),
        ".{0,300}".prop_map(Content::Text),
        prop::collection::vec(any::<u8>(), 0..600).prop_map(Content::Binary),
        Just(Content::Children(Vec::new())),
    ]
}

fn arb_node() -> impl Strategy<Value = Node> {
    let leaf = (arb_tag(), arb_attrs(), arb_leaf_content()).prop_map(|(tag, attrs, content)| Node {
        tag,
        attrs,
        content,
    });
    leaf.prop_recursive(6, 64, 8, |inner| {
        (
            arb_tag(),
            arb_attrs(),
            prop::collection::vec(inner, 1..8),
        )
            .prop_map(|(tag, attrs, children)| Node {
                tag,
                attrs,
                content: Content::Children(children),
            })
    })
}

// Property: decode(encode(n)) == n, including attribute and child order
proptest! {
    #[test]
    fn prop_node_roundtrip(node in arb_node()) {
        let dict = dictionary();
        let bytes = encode(&node, &dict).expect("encode should not fail");
        let decoded = decode(&bytes, &dict).expect("decode should not fail");

        prop_assert_eq!(decoded.attrs.keys().collect::<Vec<_>>(), node.attrs.keys().collect::<Vec<_>>());
        prop_assert_eq!(decoded, node);
    }
}

// Property: the size pass predicts the output exactly
proptest! {
    #[test]
    fn prop_encoded_len_exact(node in arb_node()) {
        let dict = dictionary();
        let encoder = NodeEncoder::new(&dict);
        let predicted = encoder.encoded_len(&node).expect("size should not fail");
        let bytes = encoder.encode(&node).expect("encode should not fail");

        prop_assert_eq!(predicted, bytes.len());
    }
}

// Property: encoding is deterministic
proptest! {
    #[test]
    fn prop_encoding_deterministic(node in arb_node()) {
        let dict = dictionary();
        let bytes1 = encode(&node, &dict).unwrap();
        let bytes2 = encode(&node.clone(), &dict).unwrap();

        prop_assert_eq!(bytes1, bytes2);
    }
}

// Property: every strict prefix of a valid encoding is reported as truncated
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn prop_prefix_is_truncated(node in arb_node()) {
        let dict = dictionary();
        let bytes = encode(&node, &dict).unwrap();

        // evenly spaced cut points plus the tail, where framing bytes cluster
        let step = (bytes.len() / 256).max(1);
        let tail = bytes.len().saturating_sub(16);
        let cuts = (0..bytes.len()).step_by(step).chain(tail..bytes.len());
        for k in cuts {
            let result = decode(&bytes[..k], &dict);
            prop_assert!(
                matches!(result, Err(CodecError::TruncatedInput { .. }) | Err(CodecError::Framing(_))),
                "prefix {} of {} gave {:?}", k, bytes.len(), result
            );
        }
    }
}

// Property: arbitrary bytes never panic
proptest! {
    #[test]
    fn prop_arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let dict = dictionary();
        let _ = decode(&data, &dict);
    }
}

// Property: corrupting one byte never panics, and a successful decode
// re-encodes to a valid frame
proptest! {
    #[test]
    fn prop_single_byte_corruption(node in arb_node(), idx in any::<prop::sample::Index>(), byte in any::<u8>()) {
        let dict = dictionary();
        let mut bytes = encode(&node, &dict).unwrap();
        let i = idx.index(bytes.len());
        bytes[i] = byte;

        if let Ok(decoded) = decode(&bytes, &dict) {
            let again = encode(&decoded, &dict).expect("decoded node must re-encode");
            prop_assert_eq!(decode(&again, &dict).unwrap(), decoded);
        }
    }
}
