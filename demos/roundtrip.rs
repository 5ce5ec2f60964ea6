//! Example: Encoding and decoding a node tree
//!
//! Loads a codec configuration (from the TOML file given as the first
//! argument, or the built-in sample), encodes a small tree, prints the wire
//! bytes, then decodes them back and prints the result as JSON.
//!
//! Run with: `cargo run --example roundtrip [config.toml]`

use binary_node::config::CodecConfig;
use binary_node::utils::logging::init_logging;
use binary_node::{decode, AttrValue, Node, NodeEncoder};

const SAMPLE_CONFIG: &str = r#"
[dictionary]
version = 1
tags = ["iq", "query", "message", "body"]
double_byte = ["offer", "audio"]

[limits]
max_depth = 16
max_frame_size = 65536

[logging]
app_name = "roundtrip-demo"
log_level = "debug"
json_format = false
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CodecConfig::from_file(path)?,
        None => CodecConfig::from_toml(SAMPLE_CONFIG)?,
    };
    config.validate_strict()?;
    init_logging(&config.logging)?;

    let dictionary = config.build_dictionary()?;
    println!(
        "Dictionary v{}: {} single-byte, {} double-byte tokens\n",
        dictionary.version(),
        dictionary.single_byte_len() - 1,
        dictionary.double_byte_len()
    );

    let node = Node::new("iq")
        .with_attr("id", "1")
        .with_attr("type", "get")
        .with_attr("nonce", AttrValue::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]))
        .with_children(vec![
            Node::new("query").with_text("hello"),
            Node::new("audio").with_binary(vec![0u8; 8]),
            Node::new("x:unlisted").with_children(Vec::new()),
        ]);

    let encoder = NodeEncoder::new(&dictionary).with_max_depth(config.limits.max_depth);
    let bytes = encoder.encode(&node)?;
    println!("Encoded {} bytes:", bytes.len());
    for line in bytes.chunks(16) {
        println!("  {line:02X?}");
    }

    let decoded = decode(&bytes, &dictionary)?;
    println!("\nDecoded tree:\n{}", serde_json::to_string_pretty(&decoded)?);
    println!(
        "\nRoundtrip: {}",
        if decoded == node { "ok" } else { "MISMATCH" }
    );

    Ok(())
}
