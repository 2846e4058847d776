//! Double SHA-256 hashing for blocks and signature digests.

use dagcore_types::BlockHash;
use sha2::{Digest, Sha256};

/// SHA-256 applied twice.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256d_multi(&[data])
}

/// Double SHA-256 over several slices in sequence (avoids concatenation allocation).
pub fn sha256d_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let first = hasher.finalize();
    let second = Sha256::digest(first);
    let mut output = [0u8; 32];
    output.copy_from_slice(&second);
    output
}

/// Hash the 512 wire bytes of a block. The digest is stored byte-reversed.
pub fn hash_block(raw: &[u8]) -> BlockHash {
    let mut digest = sha256d(raw);
    digest.reverse();
    BlockHash::new(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256d_known_vector() {
        // sha256(sha256(""))
        let expected = "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456";
        let digest = sha256d(b"");
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        assert_eq!(hex, expected);
    }

    #[test]
    fn multi_matches_concatenation() {
        let joined = sha256d(b"helloworld");
        let split = sha256d_multi(&[b"hello", b"world"]);
        assert_eq!(joined, split);
    }

    #[test]
    fn block_hash_is_reversed_digest() {
        let raw = [3u8; 512];
        let mut digest = sha256d(&raw);
        digest.reverse();
        assert_eq!(hash_block(&raw).as_bytes(), &digest);
    }
}
