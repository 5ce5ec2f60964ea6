#![allow(clippy::unwrap_used)]

use binary_node::utils::CodecMetrics;
use binary_node::{decode, Node, NodeCodec, NodeEncoder, TokenDictionary};
use bytes::BytesMut;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::codec::{Decoder, Encoder};

fn tree(seed: usize, size: usize) -> Node {
    Node::new("message")
        .with_attr("seed", seed.to_string())
        .with_children(vec![
            Node::new("body").with_text("x".repeat(size)),
            Node::new("offer").with_binary(vec![(seed & 0xFF) as u8; size]),
        ])
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_encode_decode_shared_dictionary() {
    let dictionary = Arc::new(TokenDictionary::new(["message", "body"], ["offer"]).unwrap());
    let iterations = 2_000usize;
    let payload_sizes = [0usize, 64, 300, 4096, 70_000];

    let mut tasks = JoinSet::new();
    for &size in &payload_sizes {
        let dictionary = dictionary.clone();
        tasks.spawn(async move {
            let encoder = NodeEncoder::new(&dictionary);
            let mut buf = BytesMut::new();
            for i in 0..iterations / (1 + size / 4096) {
                let node = tree(i, size);
                buf.clear();
                encoder.encode_into(&node, &mut buf).unwrap();
                assert_eq!(decode(&buf, &dictionary).unwrap(), node);
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_codecs_share_metrics() {
    let dictionary = Arc::new(TokenDictionary::new(["message", "body"], ["offer"]).unwrap());
    let metrics = Arc::new(CodecMetrics::new());
    let tasks_count = 8u64;
    let per_task = 500u64;

    let mut tasks = JoinSet::new();
    for t in 0..tasks_count {
        let mut codec = NodeCodec::new(dictionary.clone()).with_metrics(metrics.clone());
        tasks.spawn(async move {
            let mut buf = BytesMut::new();
            for i in 0..per_task {
                let node = tree((t * per_task + i) as usize, 16);
                codec.encode(&node, &mut buf).unwrap();
                let decoded = codec.decode(&mut buf).unwrap().unwrap();
                assert_eq!(decoded, node);
                assert!(buf.is_empty());
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }

    let snap = metrics.snapshot();
    assert_eq!(snap.nodes_encoded, tasks_count * per_task);
    assert_eq!(snap.nodes_decoded, tasks_count * per_task);
    assert_eq!(snap.bytes_encoded, snap.bytes_decoded);
    assert_eq!(snap.framing_errors, 0);
}
