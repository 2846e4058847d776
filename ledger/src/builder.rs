//! Wire block synthesis.

use dagcore_crypto::{sign_digest, KeyPair, PublicKey};
use dagcore_types::{Amount, BlockAddress, FieldType, NetworkId, Timestamp};

use crate::block::{signing_digest, Link, BLOCK_SIZE, FIELD_COUNT, FIELD_SIZE, NONCE_FIELD};
use crate::{Block, LedgerError};

/// Assembles a signed wire block.
///
/// Fields are laid out as header, inputs, outputs, public keys, remark,
/// input signatures, output signature; the nonce always occupies field 15.
/// Input signatures are produced before the output signature.
#[derive(Clone, Debug)]
pub struct BlockBuilder {
    network: NetworkId,
    timestamp: Timestamp,
    fee: Amount,
    inputs: Vec<Link>,
    outputs: Vec<Link>,
    public_keys: Vec<PublicKey>,
    remark: Option<[u8; FIELD_SIZE]>,
    input_signers: Vec<KeyPair>,
    output_signer: Option<KeyPair>,
    nonce: Option<[u8; FIELD_SIZE]>,
}

impl BlockBuilder {
    pub fn new(network: NetworkId, timestamp: Timestamp) -> Self {
        Self {
            network,
            timestamp,
            fee: Amount::ZERO,
            inputs: Vec::new(),
            outputs: Vec::new(),
            public_keys: Vec::new(),
            remark: None,
            input_signers: Vec::new(),
            output_signer: None,
            nonce: None,
        }
    }

    pub fn fee(mut self, fee: Amount) -> Self {
        self.fee = fee;
        self
    }

    pub fn input(mut self, address: BlockAddress, amount: Amount) -> Self {
        self.inputs.push(Link::input(address, amount));
        self
    }

    pub fn output(mut self, address: BlockAddress, amount: Amount) -> Self {
        self.outputs.push(Link::output(address, amount));
        self
    }

    pub fn public_key(mut self, key: PublicKey) -> Self {
        if !self.public_keys.contains(&key) {
            self.public_keys.push(key);
        }
        self
    }

    pub fn remark(mut self, remark: [u8; FIELD_SIZE]) -> Self {
        self.remark = Some(remark);
        self
    }

    /// Add an input signature; the signer's public key is embedded too.
    pub fn sign_input(self, key: &KeyPair) -> Self {
        let mut builder = self.public_key(key.public);
        builder.input_signers.push(key.clone());
        builder
    }

    /// Set the output signature; the signer's public key is embedded too.
    pub fn sign_output(self, key: &KeyPair) -> Self {
        let mut builder = self.public_key(key.public);
        builder.output_signer = Some(key.clone());
        builder
    }

    pub fn nonce(mut self, nonce: [u8; FIELD_SIZE]) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Fields used so far, header included, nonce excluded.
    pub fn field_count(&self) -> usize {
        1 + self.inputs.len()
            + self.outputs.len()
            + self.public_keys.len()
            + usize::from(self.remark.is_some())
            + 2 * self.input_signers.len()
            + 2 * usize::from(self.output_signer.is_some())
    }

    /// Fields available before the nonce slot.
    fn capacity(&self) -> usize {
        if self.nonce.is_some() {
            NONCE_FIELD
        } else {
            FIELD_COUNT
        }
    }

    pub fn build(self) -> Result<Block, LedgerError> {
        let needed = self.field_count();
        let available = self.capacity();
        if needed > available {
            return Err(LedgerError::TooManyFields { needed, available });
        }

        let mut fields: Vec<(FieldType, [u8; FIELD_SIZE])> = Vec::with_capacity(needed);
        fields.push((self.network.header_type(), [0u8; FIELD_SIZE]));
        for link in self.inputs.iter().chain(self.outputs.iter()) {
            let kind = match link.kind {
                crate::LinkKind::Input => FieldType::LinkIn,
                crate::LinkKind::Output => FieldType::LinkOut,
            };
            fields.push((kind, link.to_field()));
        }
        for key in &self.public_keys {
            let compressed = key.serialize();
            let kind = if compressed[0] == 0x03 {
                FieldType::PublicKeyOdd
            } else {
                FieldType::PublicKeyEven
            };
            let mut x = [0u8; FIELD_SIZE];
            x.copy_from_slice(&compressed[1..]);
            fields.push((kind, x));
        }
        if let Some(remark) = self.remark {
            fields.push((FieldType::Remark, remark));
        }
        let mut input_positions = Vec::with_capacity(self.input_signers.len());
        for _ in &self.input_signers {
            input_positions.push(fields.len());
            fields.push((FieldType::SignIn, [0u8; FIELD_SIZE]));
            fields.push((FieldType::SignIn, [0u8; FIELD_SIZE]));
        }
        let output_position = self.output_signer.as_ref().map(|_| {
            let position = fields.len();
            fields.push((FieldType::SignOut, [0u8; FIELD_SIZE]));
            fields.push((FieldType::SignOut, [0u8; FIELD_SIZE]));
            position
        });

        let mut bitmap = 0u64;
        let mut raw = [0u8; BLOCK_SIZE];
        for (index, (kind, data)) in fields.iter().enumerate() {
            bitmap |= u64::from(kind.nibble()) << (4 * index);
            raw[index * FIELD_SIZE..(index + 1) * FIELD_SIZE].copy_from_slice(data);
        }
        raw[8..16].copy_from_slice(&bitmap.to_le_bytes());
        raw[16..24].copy_from_slice(&self.timestamp.ticks().to_le_bytes());
        raw[24..32].copy_from_slice(&self.fee.raw().to_le_bytes());
        if let Some(nonce) = self.nonce {
            raw[NONCE_FIELD * FIELD_SIZE..].copy_from_slice(&nonce);
        }

        for (signer, position) in self.input_signers.iter().zip(input_positions) {
            sign_at(&mut raw, position, signer)?;
        }
        if let (Some(signer), Some(position)) = (&self.output_signer, output_position) {
            sign_at(&mut raw, position, signer)?;
        }

        Block::from_bytes(&raw)
    }
}

fn sign_at(raw: &mut [u8; BLOCK_SIZE], position: usize, signer: &KeyPair) -> Result<(), LedgerError> {
    let digest = signing_digest(raw, position, &signer.public);
    let signature = sign_digest(&digest, &signer.secret)?;
    raw[position * FIELD_SIZE..(position + 2) * FIELD_SIZE].copy_from_slice(&signature);
    Ok(())
}
