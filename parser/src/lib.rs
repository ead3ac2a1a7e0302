pub mod analyzer;
pub mod bitstream;
pub mod config;
pub mod demofile;
pub mod entity;
mod error;
pub mod flags;
pub mod game_constants;
pub mod huffman;
pub mod types;

pub use error::*;
pub use strum;

pub use config::SessionConfig;
pub use demofile::{DemoFile, RawFrame};
pub use entity::{EntityRecord, FrameUnpacker, RECORD_WIDTH};
pub use huffman::{HuffmanDecoder, HuffmanEncoder, SymbolTable};
