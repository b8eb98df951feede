//! Wegman-Carter one-time authenticator
//!
//! Each frame gets 64 fresh pad bytes split into two evaluation points and two
//! masks:
//!
//! ```text
//! auth_key = r1 (16) || r2 (16) || s1 (16) || s2 (16)
//! tag      = (H_r1(m) ^ s1) || (H_r2(m) ^ s2)
//! ```
//!
//! `H_r` is a polynomial hash over GF(2^128) of `header || ciphertext`,
//! followed by a block carrying both lengths. Forgery probability is bounded
//! by the polynomial degree over 2^128 per half, independent of the attacker's
//! computing power, provided no auth key is ever reused.
//!
//! # Security
//!
//! - Field multiplication is branch-free on key material
//! - Tag comparison is constant-time
//! - Key halves are zeroized after use

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// One-time authentication key size (bytes)
pub const AUTH_KEY_SIZE: usize = 64;

/// Authentication tag size (bytes)
pub const TAG_SIZE: usize = 32;

const BLOCK_SIZE: usize = 16;

/// `x^128 = x^7 + x^2 + x + 1`
const REDUCTION: u128 = 0x87;

/// Compute the tag for `header || ciphertext`.
///
/// The caller guarantees `auth_key` is never used for another frame.
pub fn compute_tag(auth_key: &[u8; AUTH_KEY_SIZE], header: &[u8], ciphertext: &[u8]) -> [u8; 32] {
    let mut r1 = load_block(&auth_key[0..16]);
    let mut r2 = load_block(&auth_key[16..32]);
    let mut s1 = load_block(&auth_key[32..48]);
    let mut s2 = load_block(&auth_key[48..64]);

    let mut tag = [0u8; TAG_SIZE];
    tag[..16].copy_from_slice(&(poly_hash(r1, header, ciphertext) ^ s1).to_be_bytes());
    tag[16..].copy_from_slice(&(poly_hash(r2, header, ciphertext) ^ s2).to_be_bytes());

    r1.zeroize();
    r2.zeroize();
    s1.zeroize();
    s2.zeroize();

    tag
}

/// Verify a tag in constant time.
///
/// Returns `false` on any mismatch, including a key or tag of the wrong
/// length. Never reports which check failed.
pub fn verify_tag(auth_key: &[u8], header: &[u8], ciphertext: &[u8], tag: &[u8]) -> bool {
    let Ok(key) = <&[u8; AUTH_KEY_SIZE]>::try_from(auth_key) else {
        return false;
    };
    if tag.len() != TAG_SIZE {
        return false;
    }

    let mut expected = compute_tag(key, header, ciphertext);
    let equal: bool = expected[..].ct_eq(tag).into();
    expected.zeroize();
    equal
}

/// Horner evaluation of the message polynomial at `r`.
fn poly_hash(r: u128, header: &[u8], ciphertext: &[u8]) -> u128 {
    let mut acc = 0u128;

    // header and ciphertext are hashed as one stream so a byte cannot move
    // between them without changing the length block
    let mut stream = header.iter().chain(ciphertext).copied();
    let total = header.len() + ciphertext.len();
    let mut consumed = 0;
    while consumed < total {
        let mut block = [0u8; BLOCK_SIZE];
        for slot in &mut block {
            match stream.next() {
                Some(byte) => {
                    *slot = byte;
                    consumed += 1;
                },
                None => break,
            }
        }
        acc = gf_mul(acc ^ u128::from_be_bytes(block), r);
    }

    let header_bits = (header.len() as u64).wrapping_mul(8);
    let ciphertext_bits = (ciphertext.len() as u64).wrapping_mul(8);
    let length_block = (u128::from(header_bits) << 64) | u128::from(ciphertext_bits);
    gf_mul(acc ^ length_block, r)
}

/// Multiply in GF(2^128) modulo `x^128 + x^7 + x^2 + x + 1`.
///
/// Bit `i` of the `u128` is the coefficient of `x^i`.
fn gf_mul(a: u128, b: u128) -> u128 {
    let mut result = 0u128;
    let mut a = a;
    for i in 0..128 {
        let take = 0u128.wrapping_sub((b >> i) & 1);
        result ^= a & take;

        let carry = 0u128.wrapping_sub(a >> 127);
        a = (a << 1) ^ (carry & REDUCTION);
    }
    result
}

fn load_block(bytes: &[u8]) -> u128 {
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(bytes);
    let value = u128::from_be_bytes(block);
    block.zeroize();
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; AUTH_KEY_SIZE] {
        let mut key = [0u8; AUTH_KEY_SIZE];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(37).wrapping_add(11);
        }
        key
    }

    #[test]
    fn gf_identity_and_zero() {
        let a = 0x0123_4567_89AB_CDEF_FEDC_BA98_7654_3210u128;
        assert_eq!(gf_mul(a, 1), a);
        assert_eq!(gf_mul(1, a), a);
        assert_eq!(gf_mul(a, 0), 0);
    }

    #[test]
    fn gf_reduction() {
        // x^127 * x = x^128 = x^7 + x^2 + x + 1
        assert_eq!(gf_mul(1u128 << 127, 2), REDUCTION);
    }

    #[test]
    fn gf_commutative_and_distributive() {
        let a = 0xDEAD_BEEF_0000_1111_2222_3333_4444_5555u128;
        let b = 0x0F0F_F0F0_1234_5678_9ABC_DEF0_0BAD_F00Du128;
        let c = 0x8000_0000_0000_0000_0000_0000_0000_0001u128;
        assert_eq!(gf_mul(a, b), gf_mul(b, a));
        assert_eq!(gf_mul(a, b ^ c), gf_mul(a, b) ^ gf_mul(a, c));
    }

    #[test]
    fn tag_verifies() {
        let key = test_key();
        let tag = compute_tag(&key, b"header", b"ciphertext");
        assert!(verify_tag(&key, b"header", b"ciphertext", &tag));
    }

    #[test]
    fn tag_is_deterministic() {
        let key = test_key();
        assert_eq!(compute_tag(&key, b"h", b"c"), compute_tag(&key, b"h", b"c"));
    }

    #[test]
    fn tag_halves_are_independent() {
        let key = test_key();
        let tag = compute_tag(&key, b"header", b"ciphertext");
        assert_ne!(tag[..16], tag[16..]);
    }

    #[test]
    fn moving_bytes_between_header_and_ciphertext_changes_tag() {
        let key = test_key();
        let tag = compute_tag(&key, b"abc", b"def");
        assert!(!verify_tag(&key, b"ab", b"cdef", &tag));
    }

    #[test]
    fn trailing_zero_extension_changes_tag() {
        let key = test_key();
        let tag = compute_tag(&key, b"", b"data");
        assert!(!verify_tag(&key, b"", b"data\0", &tag));
    }

    #[test]
    fn wrong_key_rejected() {
        let key = test_key();
        let tag = compute_tag(&key, b"header", b"ciphertext");

        let mut other = key;
        other[40] ^= 0x01;
        assert!(!verify_tag(&other, b"header", b"ciphertext", &tag));
    }

    #[test]
    fn malformed_inputs_return_false() {
        let key = test_key();
        let tag = compute_tag(&key, b"h", b"c");

        assert!(!verify_tag(&key[..63], b"h", b"c", &tag));
        assert!(!verify_tag(&key, b"h", b"c", &tag[..31]));
        assert!(!verify_tag(&key, b"h", b"c", &[]));
    }

    #[test]
    fn empty_message_has_tag() {
        let key = test_key();
        let tag = compute_tag(&key, b"", b"");
        assert!(verify_tag(&key, b"", b"", &tag));
    }
}
