//! The 512-byte wire block.
//!
//! A block is sixteen 32-byte fields. Field 0 is the header:
//!
//! | bytes  | content                              |
//! |--------|--------------------------------------|
//! | 0..8   | transport (ignored by the engine)    |
//! | 8..16  | type bitmap, little-endian           |
//! | 16..24 | timestamp, little-endian             |
//! | 24..32 | fee, little-endian                   |
//!
//! Nibble `i` of the bitmap selects the role of field `i`. A parsed [`Block`]
//! is immutable; everything that changes after admission lives in
//! [`BlockInfo`](dagcore_store::BlockInfo).

use std::fmt;

use dagcore_crypto::{
    check_signature, hash_block, public_key_from_x, sha256d_multi, verify_digest, PublicKey,
};
use dagcore_types::{Amount, BlockAddress, BlockHash, Difficulty, FieldType, Timestamp};
use dagcore_work::hash_difficulty;

use crate::LedgerError;

pub const FIELD_SIZE: usize = 32;
pub const FIELD_COUNT: usize = 16;
pub const BLOCK_SIZE: usize = FIELD_SIZE * FIELD_COUNT;

/// The only field that may carry a nonce.
pub const NONCE_FIELD: usize = FIELD_COUNT - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Input,
    Output,
}

/// A reference from one block to an older one, with the amount it moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    pub address: BlockAddress,
    pub amount: Amount,
    pub kind: LinkKind,
}

impl Link {
    pub fn input(address: BlockAddress, amount: Amount) -> Self {
        Self {
            address,
            amount,
            kind: LinkKind::Input,
        }
    }

    pub fn output(address: BlockAddress, amount: Amount) -> Self {
        Self {
            address,
            amount,
            kind: LinkKind::Output,
        }
    }

    fn from_field(data: &[u8; FIELD_SIZE], kind: LinkKind) -> Self {
        let mut amount = [0u8; 8];
        amount.copy_from_slice(&data[..8]);
        let mut low = [0u8; 24];
        low.copy_from_slice(&data[8..]);
        Self {
            address: BlockAddress::from_low_bytes(low),
            amount: Amount::new(u64::from_le_bytes(amount)),
            kind,
        }
    }

    /// 8-byte little-endian amount followed by the 24 low address bytes.
    pub(crate) fn to_field(self) -> [u8; FIELD_SIZE] {
        let mut data = [0u8; FIELD_SIZE];
        data[..8].copy_from_slice(&self.amount.raw().to_le_bytes());
        data[8..].copy_from_slice(self.address.low_bytes());
        data
    }
}

/// A signature spanning two consecutive fields, `r` then `s`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FieldSignature {
    /// Index of the `r` field.
    pub position: usize,
    pub bytes: [u8; 64],
}

impl fmt::Debug for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldSignature(@{})", self.position)
    }
}

/// A parsed wire block.
#[derive(Clone)]
pub struct Block {
    raw: Box<[u8; BLOCK_SIZE]>,
    hash: BlockHash,
    header: FieldType,
    timestamp: Timestamp,
    fee: Amount,
    inputs: Vec<Link>,
    outputs: Vec<Link>,
    public_keys: Vec<PublicKey>,
    in_signatures: Vec<FieldSignature>,
    out_signature: Option<FieldSignature>,
    nonce: Option<[u8; FIELD_SIZE]>,
    remark: Option<[u8; FIELD_SIZE]>,
}

impl Block {
    /// Parse 512 wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let raw: [u8; BLOCK_SIZE] = bytes.try_into().map_err(|_| {
            LedgerError::malformed(format!("expected {BLOCK_SIZE} bytes, got {}", bytes.len()))
        })?;
        let bitmap = read_u64(&raw, 8);
        let header = field_type(bitmap, 0);
        if !header.is_header() {
            return Err(LedgerError::malformed("field 0 is not a header"));
        }

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut public_keys = Vec::new();
        let mut in_signatures = Vec::new();
        let mut out_signature = None;
        let mut nonce = None;
        let mut remark = None;
        let mut pending: Option<(FieldType, usize)> = None;

        for index in 1..FIELD_COUNT {
            let kind = field_type(bitmap, index);
            let data = read_field(&raw, index);

            if let Some((first_kind, position)) = pending.take() {
                if kind != first_kind {
                    return Err(LedgerError::malformed(format!(
                        "unpaired signature field {position}"
                    )));
                }
                let mut bytes = [0u8; 64];
                bytes[..FIELD_SIZE].copy_from_slice(&read_field(&raw, position));
                bytes[FIELD_SIZE..].copy_from_slice(&data);
                check_signature(&bytes)?;
                let signature = FieldSignature { position, bytes };
                if kind == FieldType::SignIn {
                    in_signatures.push(signature);
                } else if out_signature.replace(signature).is_some() {
                    return Err(LedgerError::malformed("more than one output signature"));
                }
                continue;
            }

            match kind {
                FieldType::Nonce => {
                    if index == NONCE_FIELD && data != [0u8; FIELD_SIZE] {
                        nonce = Some(data);
                    }
                }
                FieldType::LinkIn => inputs.push(Link::from_field(&data, LinkKind::Input)),
                FieldType::LinkOut => outputs.push(Link::from_field(&data, LinkKind::Output)),
                FieldType::SignIn | FieldType::SignOut => pending = Some((kind, index)),
                FieldType::PublicKeyEven | FieldType::PublicKeyOdd => {
                    public_keys.push(public_key_from_x(&data, kind == FieldType::PublicKeyOdd)?);
                }
                FieldType::Remark => remark = Some(data),
                FieldType::Head | FieldType::HeadTest | FieldType::Reserved(_) => {}
            }
        }
        if let Some((_, position)) = pending {
            return Err(LedgerError::malformed(format!(
                "unpaired signature field {position}"
            )));
        }

        Ok(Self {
            hash: hash_block(&raw),
            header,
            timestamp: Timestamp::new(read_u64(&raw, 16)),
            fee: Amount::new(read_u64(&raw, 24)),
            raw: Box::new(raw),
            inputs,
            outputs,
            public_keys,
            in_signatures,
            out_signature,
            nonce,
            remark,
        })
    }

    /// A copy of this block with field 15 replaced by `nonce`.
    ///
    /// Signatures stay valid because nonce fields are excluded from signed ranges.
    pub fn with_nonce(&self, nonce: [u8; FIELD_SIZE]) -> Result<Self, LedgerError> {
        if field_type(self.bitmap(), NONCE_FIELD) != FieldType::Nonce {
            return Err(LedgerError::malformed("nonce field is occupied"));
        }
        let mut raw = *self.raw;
        raw[NONCE_FIELD * FIELD_SIZE..].copy_from_slice(&nonce);
        Self::from_bytes(&raw)
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.raw
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn address(&self) -> BlockAddress {
        self.hash.to_address()
    }

    /// Proof-of-work carried by this block alone.
    pub fn own_difficulty(&self) -> Difficulty {
        hash_difficulty(&self.hash)
    }

    pub fn header_type(&self) -> FieldType {
        self.header
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn inputs(&self) -> &[Link] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Link] {
        &self.outputs
    }

    /// Inputs, then outputs.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    pub fn in_signatures(&self) -> &[FieldSignature] {
        &self.in_signatures
    }

    pub fn out_signature(&self) -> Option<&FieldSignature> {
        self.out_signature.as_ref()
    }

    pub fn nonce(&self) -> Option<&[u8; FIELD_SIZE]> {
        self.nonce.as_ref()
    }

    pub fn remark(&self) -> Option<&[u8; FIELD_SIZE]> {
        self.remark.as_ref()
    }

    /// Timestamp closes its epoch and a nonce is present.
    pub fn is_main_candidate(&self) -> bool {
        self.timestamp.is_end_of_epoch() && self.nonce.is_some()
    }

    pub fn verify_signature(&self, signature: &FieldSignature, key: &PublicKey) -> bool {
        let digest = signing_digest(&self.raw, signature.position, key);
        verify_digest(&digest, &signature.bytes, key)
    }

    /// Whether the output signature was made by `key`.
    pub fn is_out_signed_by(&self, key: &PublicKey) -> bool {
        self.out_signature
            .as_ref()
            .is_some_and(|sig| self.verify_signature(sig, key))
    }

    /// Embedded public keys that produced at least one embedded signature.
    pub fn verified_keys(&self) -> Vec<PublicKey> {
        let mut keys: Vec<PublicKey> = Vec::new();
        for signature in self.in_signatures.iter().chain(self.out_signature.iter()) {
            for key in &self.public_keys {
                if !keys.contains(key) && self.verify_signature(signature, key) {
                    keys.push(*key);
                }
            }
        }
        keys
    }

    fn bitmap(&self) -> u64 {
        read_u64(&self.raw, 8)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("address", &self.address())
            .field("timestamp", &self.timestamp)
            .field("fee", &self.fee)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Block {}

pub(crate) fn field_type(bitmap: u64, index: usize) -> FieldType {
    FieldType::from_nibble(((bitmap >> (4 * index)) & 0xf) as u8)
}

fn read_u64(raw: &[u8; BLOCK_SIZE], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&raw[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

fn read_field(raw: &[u8; BLOCK_SIZE], index: usize) -> [u8; FIELD_SIZE] {
    let mut field = [0u8; FIELD_SIZE];
    field.copy_from_slice(&raw[index * FIELD_SIZE..(index + 1) * FIELD_SIZE]);
    field
}

/// Digest signed by the signature whose `r` field is at `position`.
///
/// The range is the whole block with every signature or nonce field at index
/// `>= position` zeroed, followed by the signer's compressed public key.
pub(crate) fn signing_digest(
    raw: &[u8; BLOCK_SIZE],
    position: usize,
    key: &PublicKey,
) -> [u8; 32] {
    let bitmap = read_u64(raw, 8);
    let mut range = *raw;
    for index in position..FIELD_COUNT {
        if field_type(bitmap, index).is_signature_or_nonce() {
            range[index * FIELD_SIZE..(index + 1) * FIELD_SIZE].fill(0);
        }
    }
    sha256d_multi(&[&range, &key.serialize()])
}

#[cfg(test)]
mod tests {
    use dagcore_crypto::keypair_from_seed;
    use dagcore_types::NetworkId;

    use super::*;
    use crate::BlockBuilder;

    fn raw_with_bitmap(bitmap: u64) -> [u8; BLOCK_SIZE] {
        let mut raw = [0u8; BLOCK_SIZE];
        raw[8..16].copy_from_slice(&bitmap.to_le_bytes());
        raw[16..24].copy_from_slice(&0x1234u64.to_le_bytes());
        raw
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            Block::from_bytes(&[0u8; 100]),
            Err(LedgerError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_missing_header() {
        let raw = raw_with_bitmap(0x3 << 4);
        assert!(Block::from_bytes(&raw).is_err());
    }

    #[test]
    fn parses_header_and_links() {
        let mut raw = raw_with_bitmap(0x1 | (0x2 << 4) | (0x3 << 8));
        raw[24..32].copy_from_slice(&7u64.to_le_bytes());
        raw[32..40].copy_from_slice(&500u64.to_le_bytes());
        raw[40..64].copy_from_slice(&[0xAA; 24]);
        raw[72..96].copy_from_slice(&[0xBB; 24]);

        let block = Block::from_bytes(&raw).unwrap();
        assert_eq!(block.header_type(), FieldType::Head);
        assert_eq!(block.timestamp(), Timestamp::new(0x1234));
        assert_eq!(block.fee(), Amount::new(7));
        assert_eq!(
            block.inputs(),
            &[Link::input(BlockAddress::from_low_bytes([0xAA; 24]), Amount::new(500))]
        );
        assert_eq!(
            block.outputs(),
            &[Link::output(BlockAddress::from_low_bytes([0xBB; 24]), Amount::ZERO)]
        );
        assert!(block.nonce().is_none());
    }

    #[test]
    fn link_field_layout() {
        let link = Link::output(BlockAddress::from_low_bytes([9u8; 24]), Amount::new(0x0102));
        let field = link.to_field();
        assert_eq!(&field[..8], &0x0102u64.to_le_bytes());
        assert_eq!(&field[8..], &[9u8; 24]);
        assert_eq!(Link::from_field(&field, LinkKind::Output), link);
    }

    #[test]
    fn unpaired_signature_is_malformed() {
        let raw = raw_with_bitmap(0x1 | (0x5 << 4) | (0x3 << 8));
        assert!(matches!(
            Block::from_bytes(&raw),
            Err(LedgerError::Malformed { .. })
        ));
    }

    #[test]
    fn zero_nonce_field_is_empty() {
        let mut raw = raw_with_bitmap(0x1);
        assert!(Block::from_bytes(&raw).unwrap().nonce().is_none());
        raw[BLOCK_SIZE - 1] = 1;
        assert!(Block::from_bytes(&raw).unwrap().nonce().is_some());
    }

    #[test]
    fn signatures_survive_nonce_change() {
        let key = keypair_from_seed(&[4u8; 32]).unwrap();
        let block = BlockBuilder::new(NetworkId::Devnet, Timestamp::new(0xFFFF))
            .sign_output(&key)
            .nonce([1u8; 32])
            .build()
            .unwrap();
        assert!(block.is_out_signed_by(&key.public));
        assert!(block.is_main_candidate());

        let mined = block.with_nonce([2u8; 32]).unwrap();
        assert_ne!(mined.hash(), block.hash());
        assert!(mined.is_out_signed_by(&key.public));
        assert_eq!(mined.verified_keys(), vec![key.public]);
    }

    #[test]
    fn foreign_key_is_not_verified() {
        let key = keypair_from_seed(&[4u8; 32]).unwrap();
        let other = keypair_from_seed(&[5u8; 32]).unwrap();
        let block = BlockBuilder::new(NetworkId::Devnet, Timestamp::new(10))
            .public_key(other.public)
            .sign_output(&key)
            .build()
            .unwrap();
        assert!(!block.is_out_signed_by(&other.public));
        assert_eq!(block.verified_keys(), vec![key.public]);
    }

    #[test]
    fn tampering_breaks_signature() {
        let key = keypair_from_seed(&[4u8; 32]).unwrap();
        let block = BlockBuilder::new(NetworkId::Devnet, Timestamp::new(10))
            .sign_output(&key)
            .build()
            .unwrap();
        let mut raw = *block.as_bytes();
        raw[24] ^= 1;
        let tampered = Block::from_bytes(&raw).unwrap();
        assert!(!tampered.is_out_signed_by(&key.public));
    }
}
