//! Static prefix coding for frame payloads.
//!
//! Both directions share one tree, built from a declared table of 256 symbol
//! weights by repeatedly merging the two lightest nodes. Ties are broken by
//! creation order, so the same table always yields the same tree.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::Path;

use serde::Deserialize;
use tracing::trace;

use crate::bitstream::BitCursor;
use crate::error::{DecodeError, Error};

/// Size of the symbol alphabet (one symbol per byte value).
pub const SYMBOL_COUNT: usize = 256;

/// Externally supplied weights, one per byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    weights: Vec<u32>,
}

#[derive(Deserialize)]
struct SymbolTableFile {
    weights: Vec<u32>,
}

impl SymbolTable {
    pub fn from_weights(weights: &[u32]) -> Result<Self, Error> {
        if weights.len() != SYMBOL_COUNT {
            return Err(Error::InvalidSymbolTable {
                expected: SYMBOL_COUNT,
                actual: weights.len(),
            });
        }
        Ok(Self {
            weights: weights.to_vec(),
        })
    }

    /// Every byte value equally likely. Mostly useful for tests.
    pub fn uniform() -> Self {
        Self {
            weights: vec![1; SYMBOL_COUNT],
        }
    }

    /// Parses a TOML document of the form `weights = [ ... ]`.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let file: SymbolTableFile = toml::from_str(contents)?;
        Self::from_weights(&file.weights)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(u8),
    Internal { zero: usize, one: usize },
}

/// The decode tree. Nodes live in an arena; the root is the last node.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
}

impl HuffmanTree {
    pub fn build(table: &SymbolTable) -> Self {
        let mut nodes = Vec::with_capacity(SYMBOL_COUNT * 2 - 1);
        // (weight, creation order, arena index)
        let mut heap = BinaryHeap::with_capacity(SYMBOL_COUNT);
        for (symbol, &weight) in table.weights.iter().enumerate() {
            let idx = nodes.len();
            nodes.push(Node::Leaf(symbol as u8));
            heap.push(Reverse((u64::from(weight), idx, idx)));
        }

        let mut order = nodes.len();
        while heap.len() > 1 {
            let (Some(Reverse((w0, _, zero))), Some(Reverse((w1, _, one)))) =
                (heap.pop(), heap.pop())
            else {
                break;
            };
            let idx = nodes.len();
            nodes.push(Node::Internal { zero, one });
            heap.push(Reverse((w0 + w1, order, idx)));
            order += 1;
        }

        Self { nodes }
    }

    fn root(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Code for every symbol as a sequence of branch bits from the root.
    fn codes(&self) -> Vec<Vec<bool>> {
        let mut codes = vec![Vec::new(); SYMBOL_COUNT];
        let mut stack = vec![(self.root(), Vec::new())];
        while let Some((idx, path)) = stack.pop() {
            match self.nodes[idx] {
                Node::Leaf(symbol) => codes[symbol as usize] = path,
                Node::Internal { zero, one } => {
                    let mut zero_path = path.clone();
                    zero_path.push(false);
                    let mut one_path = path;
                    one_path.push(true);
                    stack.push((zero, zero_path));
                    stack.push((one, one_path));
                }
            }
        }
        codes
    }

    /// Longest code length in bits.
    pub fn depth(&self) -> usize {
        self.codes().iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Turns a compressed frame back into raw bytes.
#[derive(Debug, Clone)]
pub struct HuffmanDecoder {
    tree: HuffmanTree,
}

impl HuffmanDecoder {
    pub fn new(table: &SymbolTable) -> Self {
        Self {
            tree: HuffmanTree::build(table),
        }
    }

    /// Decodes symbols until `max_len` bytes are produced or the input runs
    /// out on a symbol boundary.
    ///
    /// Once the output is full, the bits left over must be zero padding;
    /// anything else means the stream would expand past `max_len`.
    ///
    /// Padding is not distinguishable from encoded data, so when the input
    /// has spare zero bits they are read as whatever symbol an all-zero code
    /// path leads to. A frame holding fewer than `max_len` symbols is only
    /// reported short when its input ends exactly on a symbol boundary.
    pub fn decode(&self, raw: &[u8], max_len: usize) -> Result<Vec<u8>, DecodeError> {
        let mut cursor = BitCursor::new(raw);
        let mut out = Vec::with_capacity(max_len);

        while out.len() < max_len && cursor.bits_remaining() > 0 {
            let symbol = self.decode_symbol(&mut cursor, out.len())?;
            out.push(symbol);
        }

        if out.len() == max_len {
            let trailing_bits = cursor.bits_remaining();
            if !cursor.rest_is_zero()? {
                return Err(DecodeError::OutputOverflow {
                    limit: max_len,
                    trailing_bits,
                });
            }
        }

        trace!(input = raw.len(), output = out.len(), "decoded frame");
        Ok(out)
    }

    fn decode_symbol(&self, cursor: &mut BitCursor<'_>, produced: usize) -> Result<u8, DecodeError> {
        let mut idx = self.tree.root();
        loop {
            match self.tree.nodes[idx] {
                Node::Leaf(symbol) => return Ok(symbol),
                Node::Internal { zero, one } => {
                    let bit_position = cursor.position();
                    let bit = cursor
                        .read_bit()
                        .map_err(|_| DecodeError::DecodeTruncated {
                            produced,
                            bit_position,
                        })?;
                    idx = if bit { one } else { zero };
                }
            }
        }
    }
}

/// Encodes bytes with the same tree a [`HuffmanDecoder`] uses. The last byte
/// is padded with zero bits.
#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    codes: Vec<Vec<bool>>,
}

impl HuffmanEncoder {
    pub fn new(table: &SymbolTable) -> Self {
        Self {
            codes: HuffmanTree::build(table).codes(),
        }
    }

    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut writer = BitWriter::default();
        for &byte in data {
            for &bit in &self.codes[byte as usize] {
                writer.push(bit);
            }
        }
        writer.finish()
    }

    /// Number of bits `data` will take once encoded, before padding.
    pub fn encoded_bits(&self, data: &[u8]) -> usize {
        data.iter().map(|&b| self.codes[b as usize].len()).sum()
    }
}

#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    used: u8,
}

impl BitWriter {
    fn push(&mut self, bit: bool) {
        if self.used == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> self.used;
            }
        }
        self.used = (self.used + 1) % 8;
    }

    fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn skewed_table() -> SymbolTable {
        // Zero bytes dominate real snapshots; make them cheap.
        let mut weights = vec![1u32; SYMBOL_COUNT];
        weights[0] = 5000;
        weights[0xFF] = 400;
        weights[1] = 300;
        SymbolTable::from_weights(&weights).unwrap()
    }

    #[test]
    fn rejects_short_tables() {
        assert!(matches!(
            SymbolTable::from_weights(&[1; 12]),
            Err(Error::InvalidSymbolTable {
                expected: 256,
                actual: 12
            })
        ));
    }

    #[test]
    fn table_from_toml() {
        let weights = (0..SYMBOL_COUNT)
            .map(|i| (i + 1).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let table = SymbolTable::from_toml_str(&format!("weights = [{weights}]")).unwrap();
        assert_eq!(table.weights()[0], 1);
        assert_eq!(table.weights()[255], 256);
    }

    #[test]
    fn uniform_tree_is_balanced() {
        let tree = HuffmanTree::build(&SymbolTable::uniform());
        assert_eq!(tree.depth(), 8);
        assert!(tree.codes().iter().all(|c| c.len() == 8));
    }

    #[test]
    fn construction_is_deterministic() {
        let a = HuffmanEncoder::new(&skewed_table());
        let b = HuffmanEncoder::new(&skewed_table());
        assert_eq!(a.codes, b.codes);

        let data = b"deterministic output";
        assert_eq!(a.encode(data), b.encode(data));
    }

    #[test]
    fn codes_are_prefix_free() {
        let codes = HuffmanTree::build(&skewed_table()).codes();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "{i} is a prefix of {j}");
                }
            }
        }
    }

    #[test]
    fn round_trip() {
        let table = skewed_table();
        let encoder = HuffmanEncoder::new(&table);
        let decoder = HuffmanDecoder::new(&table);

        let all_bytes: Vec<u8> = (0..=255).collect();
        let mostly_zero = [0, 0, 0, 1, 0, 0xFF, 0, 0, 42, 0, 0, 0];
        for data in [&all_bytes[..], &mostly_zero[..], &[0x7F][..], &[][..]] {
            let encoded = encoder.encode(data);
            assert_eq!(decoder.decode(&encoded, data.len()).unwrap(), data);
        }
    }

    fn any_table() -> impl Strategy<Value = SymbolTable> {
        prop::collection::vec(0u32..10_000, SYMBOL_COUNT)
            .prop_map(|weights| SymbolTable { weights })
    }

    proptest! {
        #[test]
        fn round_trips_any_bytes(
            table in any_table(),
            data in prop::collection::vec(any::<u8>(), 0..300),
        ) {
            let encoded = HuffmanEncoder::new(&table).encode(&data);
            let decoded = HuffmanDecoder::new(&table).decode(&encoded, data.len());
            prop_assert_eq!(decoded, Ok(data));
        }

        #[test]
        fn cut_input_never_yields_a_wrong_symbol(
            table in any_table(),
            data in prop::collection::vec(any::<u8>(), 1..200),
            cut in any::<prop::sample::Index>(),
        ) {
            let encoded = HuffmanEncoder::new(&table).encode(&data);
            let len = cut.index(encoded.len());
            match HuffmanDecoder::new(&table).decode(&encoded[..len], data.len()) {
                Ok(partial) => {
                    prop_assert!(partial.len() < data.len());
                    prop_assert_eq!(&partial[..], &data[..partial.len()]);
                }
                Err(err) => {
                    prop_assert!(
                        matches!(err, DecodeError::DecodeTruncated { .. }),
                        "unexpected error {:?}",
                        err
                    );
                }
            }
        }
    }

    #[test]
    fn zero_padded_chunk() {
        let table = skewed_table();
        let data = [3u8, 0, 0, 0, 9, 0xFF, 0, 1];
        let mut chunk = HuffmanEncoder::new(&table).encode(&data);
        chunk.resize(64, 0);
        let decoded = HuffmanDecoder::new(&table).decode(&chunk, data.len()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn truncated_mid_symbol() {
        // input ending on a symbol boundary is a short frame, not an error
        let table = SymbolTable::uniform();
        let encoded = HuffmanEncoder::new(&table).encode(&[0xAB, 0xCD]);
        let decoded = HuffmanDecoder::new(&table).decode(&encoded[..1], 2).unwrap();
        assert_eq!(decoded, vec![0xAB]);

        // rare symbols get codes longer than a byte, so one byte can't hold one
        let table = skewed_table();
        let encoder = HuffmanEncoder::new(&table);
        assert!(encoder.encoded_bits(&[0x80]) > 8);
        let encoded = encoder.encode(&[0x80]);
        let err = HuffmanDecoder::new(&table)
            .decode(&encoded[..1], 4)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::DecodeTruncated { produced: 0, .. }
        ));
    }

    #[test]
    fn overflow_is_rejected() {
        let table = SymbolTable::uniform();
        let encoded = HuffmanEncoder::new(&table).encode(&[1, 2, 3, 4]);
        let err = HuffmanDecoder::new(&table).decode(&encoded, 2).unwrap_err();
        assert_eq!(
            err,
            DecodeError::OutputOverflow {
                limit: 2,
                trailing_bits: 16
            }
        );
    }
}
