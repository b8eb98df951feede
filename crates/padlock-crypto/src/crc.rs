//! CRC-32 (ISO-3309) for pad transfer integrity
//!
//! Detects accidental corruption of pad chunks moved over lossy channels such
//! as QR codes. Not a security control: anyone can forge a CRC.

/// Reflected ISO-3309 polynomial
const POLYNOMIAL: u32 = 0xEDB8_8320;

const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ POLYNOMIAL } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the CRC-32 of `data`.
pub fn compute_crc32(data: &[u8]) -> u32 {
    let crc = data.iter().fold(0xFFFF_FFFFu32, |crc, &byte| {
        TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8)
    });
    crc ^ 0xFFFF_FFFF
}

/// Check `data` against an expected CRC-32.
pub fn verify_crc32(data: &[u8], expected: u32) -> bool {
    compute_crc32(data) == expected
}

/// Length-qualified checksum of transferred pad material.
///
/// Carried alongside a pad (or a chunk of one) so the receiver can reject a
/// truncated or corrupted transfer before running the mnemonic ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadChecksum {
    /// Number of bytes covered
    pub len: u64,
    /// CRC-32 over those bytes
    pub crc32: u32,
}

impl PadChecksum {
    /// Serialized size: u64 BE length + u32 BE CRC
    pub const SIZE: usize = 12;

    /// Checksum `data`.
    pub fn of(data: &[u8]) -> Self {
        Self { len: data.len() as u64, crc32: compute_crc32(data) }
    }

    /// True if `data` has the recorded length and CRC.
    pub fn matches(&self, data: &[u8]) -> bool {
        self.len == data.len() as u64 && verify_crc32(data, self.crc32)
    }

    /// Encode as `len (u64 BE) || crc32 (u32 BE)`.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..8].copy_from_slice(&self.len.to_be_bytes());
        out[8..].copy_from_slice(&self.crc32.to_be_bytes());
        out
    }

    /// Decode from [`Self::to_bytes`] output.
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let mut len = [0u8; 8];
        len.copy_from_slice(&bytes[..8]);
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&bytes[8..]);
        Self { len: u64::from_be_bytes(len), crc32: u32::from_be_bytes(crc) }
    }
}
