//! # Protocol Data
//!
//! The values that travel over the wire and the token table both ends agree on.

pub mod dictionary;
pub mod node;


pub use dictionary::{Token, TokenDictionary};
pub use node::{AttrValue, Attributes, Content, Node};
