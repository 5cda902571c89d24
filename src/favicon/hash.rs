use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::models::Fingerprint;

/// Line length used when wrapping the base-64 text, as in MIME encoders.
pub const LINE_LENGTH: usize = 76;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// Fingerprint a raw favicon the way IoT search indexes do.
///
/// The input to MurmurHash3 is the wrapped base-64 text of the icon, not the
/// icon bytes themselves. The unsigned digest is reinterpreted as `i32`
/// because that is what Shodan, FOFA and ZoomEye store and query on.
pub fn fingerprint(raw: &[u8]) -> Fingerprint {
    let encoded = canonical_encoding(raw);
    Fingerprint(murmur3_x86_32(encoded.as_bytes(), 0) as i32)
}

/// Base-64 encode `raw` and append `\n` after every 76 characters,
/// including after the last, shorter line.
pub fn canonical_encoding(raw: &[u8]) -> String {
    let b64 = BASE64.encode(raw);
    let mut out = String::with_capacity(b64.len() + b64.len() / LINE_LENGTH + 1);
    // base-64 output is ASCII, so byte chunks never split a character.
    for line in b64.as_bytes().chunks(LINE_LENGTH) {
        out.extend(line.iter().map(|&b| b as char));
        out.push('\n');
    }
    out
}

/// MurmurHash3, x86 32-bit variant.
pub fn murmur3_x86_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= mix_k(k);
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, &b) in tail.iter().enumerate() {
            k ^= (b as u32) << (8 * i);
        }
        h ^= mix_k(k);
    }

    h ^= data.len() as u32;
    fmix32(h)
}

fn mix_k(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_murmur_reference_vectors() {
        assert_eq!(murmur3_x86_32(b"", 0), 0);
        assert_eq!(murmur3_x86_32(b"", 1), 0x514e_28b7);
        assert_eq!(murmur3_x86_32(b"", 0xffff_ffff), 0x81f1_6f39);
        assert_eq!(murmur3_x86_32(b"\0\0\0\0", 0), 0x2362_f9de);
        assert_eq!(murmur3_x86_32(b"abc", 0), 0xb3dd_93fa);
        assert_eq!(murmur3_x86_32(b"hello", 0), 0x248b_fa47);
    }

    #[test]
    fn test_murmur_every_tail_length() {
        let seed = 0x9747_b28c;
        assert_eq!(murmur3_x86_32(b"a", seed), 0x7fa0_9ea6);
        assert_eq!(murmur3_x86_32(b"aa", seed), 0x5d21_1726);
        assert_eq!(murmur3_x86_32(b"aaa", seed), 0x283e_0130);
        assert_eq!(murmur3_x86_32(b"aaaa", seed), 0x5a97_808a);
        assert_eq!(murmur3_x86_32(b"Hello, world!", seed), 0x2488_4cba);
        assert_eq!(
            murmur3_x86_32(b"The quick brown fox jumps over the lazy dog", seed),
            0x2fa8_26cd
        );
    }

    #[test]
    fn test_high_digests_are_negative() {
        // "foo" hashes to 0xf6a5c420, above i32::MAX.
        let digest = murmur3_x86_32(b"foo", 0);
        assert!(digest >= 1 << 31);
        assert_eq!(digest as i32, -156_908_512);
    }

    #[test]
    fn test_wrapping_matches_line_count() {
        for len in [0usize, 1, 56, 57, 58, 114, 1000, 5430] {
            let raw = vec![0xabu8; len];
            let b64_len = BASE64.encode(&raw).len();
            let encoded = canonical_encoding(&raw);
            let breaks = encoded.matches('\n').count();
            assert_eq!(breaks, b64_len.div_ceil(LINE_LENGTH), "len {}", len);
            assert_eq!(encoded.len(), b64_len + breaks);
            assert!(encoded.lines().all(|l| l.len() <= LINE_LENGTH));
            if len > 0 {
                assert!(encoded.ends_with('\n'));
            }
        }
    }

    #[test]
    fn test_exact_line_boundary() {
        // 57 bytes encode to exactly 76 characters: one line, one break.
        let encoded = canonical_encoding(&[0u8; 57]);
        assert_eq!(encoded.len(), 77);
        assert_eq!(encoded.matches('\n').count(), 1);
    }

    #[test]
    fn test_short_input_encoding() {
        assert_eq!(canonical_encoding(b"foo"), "Zm9v\n");
        assert_eq!(canonical_encoding(b"fo"), "Zm8=\n");
    }

    #[test]
    fn test_empty_asset_still_fingerprints() {
        assert_eq!(canonical_encoding(b""), "");
        assert_eq!(fingerprint(b""), Fingerprint(0));
    }

    #[test]
    fn test_fingerprint_hashes_wrapped_text() {
        let raw: Vec<u8> = (0..=255u8).cycle().take(600).collect();
        let expected = murmur3_x86_32(canonical_encoding(&raw).as_bytes(), 0) as i32;
        assert_eq!(fingerprint(&raw), Fingerprint(expected));
        assert_ne!(
            fingerprint(&raw).0,
            murmur3_x86_32(&raw, 0) as i32,
            "raw bytes must not be hashed directly"
        );
    }

    fn sample_asset(len: usize) -> Vec<u8> {
        (0..len).map(|i| ((i * 31 + 7) % 251) as u8).collect()
    }

    #[test]
    fn test_known_fingerprints() {
        // Values computed with base64.encodebytes + mmh3.hash in Python.
        let cases: &[(usize, i32)] = &[
            (57, -1883828970),
            (58, 824363479),
            (1000, 1199067077),
            (5430, -1545157919),
        ];
        for &(len, expected) in cases {
            assert_eq!(fingerprint(&sample_asset(len)), Fingerprint(expected), "len {len}");
        }
        assert_eq!(fingerprint(&[0u8; 57]), Fingerprint(1993561383));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let raw = b"\x00\x00\x01\x00\x01\x00\x10\x10".repeat(100);
        assert_eq!(fingerprint(&raw), fingerprint(&raw.clone()));
    }
}
