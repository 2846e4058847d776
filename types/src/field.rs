//! Wire field kinds, selected by 4-bit nibbles of the header type bitmap.

/// Role of one 32-byte field in a wire block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Nonce,
    Head,
    LinkIn,
    LinkOut,
    SignIn,
    SignOut,
    PublicKeyEven,
    PublicKeyOdd,
    HeadTest,
    Remark,
    Reserved(u8),
}

impl FieldType {
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0f {
            0x0 => Self::Nonce,
            0x1 => Self::Head,
            0x2 => Self::LinkIn,
            0x3 => Self::LinkOut,
            0x4 => Self::SignIn,
            0x5 => Self::SignOut,
            0x6 => Self::PublicKeyEven,
            0x7 => Self::PublicKeyOdd,
            0x8 => Self::HeadTest,
            0x9 => Self::Remark,
            other => Self::Reserved(other),
        }
    }

    pub fn nibble(&self) -> u8 {
        match self {
            Self::Nonce => 0x0,
            Self::Head => 0x1,
            Self::LinkIn => 0x2,
            Self::LinkOut => 0x3,
            Self::SignIn => 0x4,
            Self::SignOut => 0x5,
            Self::PublicKeyEven => 0x6,
            Self::PublicKeyOdd => 0x7,
            Self::HeadTest => 0x8,
            Self::Remark => 0x9,
            Self::Reserved(n) => n & 0x0f,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Self::Head | Self::HeadTest)
    }

    /// Fields excluded from signed byte ranges.
    pub fn is_signature_or_nonce(&self) -> bool {
        matches!(self, Self::SignIn | Self::SignOut | Self::Nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibbles_round_trip() {
        for n in 0u8..16 {
            assert_eq!(FieldType::from_nibble(n).nibble(), n);
        }
        assert_eq!(FieldType::from_nibble(0xB), FieldType::Reserved(0xB));
    }
}
