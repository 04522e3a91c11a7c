//! DNS wire-format names and their registry nodes.
//!
//! A name is a sequence of length-prefixed labels ending with the zero-length
//! root label. Nodes follow ENSIP-1: `node(root) = 0` and
//! `node(label.parent) = keccak256(node(parent) ++ labelhash(label))`.
use std::fmt::Display;
use std::fmt::Formatter;

use alloy_primitives::keccak256;
use alloy_primitives::Bytes;
use alloy_primitives::B256;
use ur_messages::Node;

use crate::error::ResolveError;
use crate::error::Result;

/// `[` + 64 hex characters + `]`.
const ENCRYPTED_LABEL_LEN: usize = 66;

/// Largest label a single length byte can describe.
const MAX_LABEL_LEN: usize = u8::MAX as usize;

/// A name on the way from the leaf to the root.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ancestor {
    pub node: Node,

    /// Encoded bytes consumed from the leaf before this ancestor starts.
    pub offset: usize,
}

/// A validated DNS-encoded name.
#[derive(Clone, Debug)]
pub struct DnsName<'a> {
    bytes: &'a [u8],

    /// `(offset, label)` from the leaf to the last label before the root.
    labels: Vec<(usize, &'a [u8])>,
}

impl<'a> DnsName<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let mut labels = Vec::new();
        let mut offset = 0;
        loop {
            let Some(&len) = bytes.get(offset) else {
                return Err(malformed("missing root label"));
            };
            let len = usize::from(len);
            if len == 0 {
                if offset + 1 != bytes.len() {
                    return Err(malformed("bytes after the root label"));
                }
                break;
            }

            let end = offset + 1 + len;
            if end > bytes.len() {
                return Err(malformed("label overruns the name"));
            }
            labels.push((offset, &bytes[offset + 1..end]));
            offset = end;
        }

        Ok(Self { bytes, labels })
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Number of labels, the root excluded.
    pub fn depth(&self) -> usize {
        self.labels.len()
    }

    pub fn node(&self) -> Node {
        self.ancestors()
            .next()
            .map(|ancestor| ancestor.node)
            .unwrap_or(B256::ZERO)
    }

    /// The name itself, then each parent, ending with the root.
    ///
    /// A node is hashed from its parent's, so the chain is computed root
    /// first in one pass and then handed out from the leaf.
    pub fn ancestors(&self) -> impl Iterator<Item = Ancestor> {
        let mut chain = Vec::with_capacity(self.labels.len() + 1);
        let mut node = B256::ZERO;
        chain.push(Ancestor {
            node,
            offset: self.bytes.len() - 1,
        });
        for (offset, label) in self.labels.iter().rev() {
            node = child_node(node, label);
            chain.push(Ancestor {
                node,
                offset: *offset,
            });
        }
        chain.into_iter().rev()
    }
}

impl Display for DnsName<'_> {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        for (i, (_, label)) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&String::from_utf8_lossy(label))?;
        }
        Ok(())
    }
}

/// Hash of a single label. A label of the form `[<64 hex>]` already is a
/// hash and is used as is.
pub fn labelhash(label: &[u8]) -> B256 {
    encrypted_label(label).unwrap_or_else(|| keccak256(label))
}

fn encrypted_label(label: &[u8]) -> Option<B256> {
    if label.len() != ENCRYPTED_LABEL_LEN
        || label[0] != b'['
        || label[ENCRYPTED_LABEL_LEN - 1] != b']'
    {
        return None;
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(&label[1..ENCRYPTED_LABEL_LEN - 1], &mut hash).ok()?;
    Some(B256::from(hash))
}

fn child_node(
    parent: Node,
    label: &[u8],
) -> Node {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(parent.as_slice());
    preimage[32..].copy_from_slice(labelhash(label).as_slice());
    keccak256(preimage)
}

/// Node of a dotted name; the empty string is the root.
pub fn namehash(name: &str) -> Node {
    if name.is_empty() {
        return B256::ZERO;
    }
    name.rsplit('.')
        .fold(B256::ZERO, |node, label| child_node(node, label.as_bytes()))
}

/// DNS-encodes a dotted name; the empty string encodes the root.
pub fn dns_encode(name: &str) -> Result<Bytes> {
    let mut encoded = Vec::with_capacity(name.len() + 2);
    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() {
                return Err(malformed("empty label"));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(malformed("label longer than 255 bytes"));
            }
            encoded.push(label.len() as u8);
            encoded.extend_from_slice(label.as_bytes());
        }
    }
    encoded.push(0);
    Ok(encoded.into())
}

fn malformed(reason: &str) -> ResolveError {
    ResolveError::MalformedName(reason.to_string())
}
