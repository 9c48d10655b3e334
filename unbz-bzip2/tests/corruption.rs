//! Damaged-input tests: truncation, CRC enforcement and structural errors.

mod common;

use common::*;
use std::io::Read;
use unbz_bzip2::{BzDecoder, decompress};
use unbz_core::{BzError, CrcKind};

/// Offset of the first byte of the first block's stored CRC.
const BLOCK_CRC_OFFSET: usize = 10;

/// Cut `lorem.bz2` after `len` bytes and return the reported stream bit.
fn truncation_point(len: usize) -> u64 {
    match decompress(&LOREM_BZ2[..len]).unwrap_err() {
        // Positions count from the end of the 4-byte stream header.
        BzError::UnexpectedEndOfInput { bit_position } => bit_position + 32,
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_truncated_in_selectors() {
    // Selectors of lorem.bz2 occupy stream bits 267..323.
    let bit = truncation_point(36);
    assert!((267..=288).contains(&bit), "stopped at bit {}", bit);
}

#[test]
fn test_truncated_in_code_lengths() {
    // Code lengths of lorem.bz2 occupy stream bits 323..708.
    let bit = truncation_point(60);
    assert!((323..=480).contains(&bit), "stopped at bit {}", bit);
}

#[test]
fn test_every_prefix_is_truncation() {
    for len in 0..LOREM_BZ2.len() {
        let err = decompress(&LOREM_BZ2[..len]).unwrap_err();
        assert!(err.is_truncation(), "prefix {}: {:?}", len, err);
    }
}

#[test]
fn test_truncated_multiblock_keeps_earlier_blocks() {
    let data = &MULTIBLOCK[..MULTIBLOCK.len() / 2];
    let mut decoder = BzDecoder::new(data).unwrap();
    let first = decoder.read_block().unwrap().unwrap();
    assert_eq!(first, &words(50_000)[..first.len()]);

    let err = loop {
        match decoder.read_block() {
            Ok(Some(_)) => continue,
            Ok(None) => panic!("truncated stream decoded completely"),
            Err(e) => break e,
        }
    };
    assert!(err.is_truncation());
}

#[test]
fn test_block_crc_mismatch_after_full_block() {
    let mut data = LOREM_BZ2.to_vec();
    data[BLOCK_CRC_OFFSET] ^= 0x01;

    let mut decoder = BzDecoder::new(&data[..]).unwrap();
    let mut buf = [0u8; 1000];
    let mut served = Vec::new();
    let err = loop {
        match decoder.read_bytes(&mut buf) {
            Ok(0) => panic!("corrupted CRC went unnoticed"),
            Ok(n) => served.extend_from_slice(&buf[..n]),
            Err(e) => break e,
        }
    };

    assert_eq!(served, lorem());
    match err {
        BzError::CrcMismatch {
            kind,
            expected,
            computed,
        } => {
            assert_eq!(kind, CrcKind::Block(0));
            assert_eq!(computed, 0x3462_56D1);
            assert_eq!(expected, 0x3462_56D1 ^ 0x0100_0000);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(decoder.read_bytes(&mut buf).is_err());
}

#[test]
fn test_stream_crc_mismatch() {
    // The second-to-last byte lies entirely inside the combined CRC.
    let mut data = LOREM_BZ2.to_vec();
    let at = data.len() - 2;
    data[at] ^= 0x10;

    let mut decoder = BzDecoder::new(&data[..]).unwrap();
    assert_eq!(decoder.read_block().unwrap().unwrap(), lorem());
    let err = decoder.read_block().unwrap_err();
    assert!(matches!(
        err,
        BzError::CrcMismatch {
            kind: CrcKind::Stream,
            ..
        }
    ));
    assert!(err.is_crc_error());
}

#[test]
fn test_crc_error_through_read_trait() {
    let mut data = REPEATED.to_vec();
    data[BLOCK_CRC_OFFSET + 3] ^= 0x80;

    let mut decoder = BzDecoder::new(&data[..]).unwrap();
    let mut sink = Vec::new();
    let err = decoder.read_to_end(&mut sink).unwrap_err();

    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    let inner = err.get_ref().and_then(|e| e.downcast_ref::<BzError>());
    assert!(matches!(inner, Some(BzError::CrcMismatch { .. })));
    assert_eq!(sink, repeated());
}

#[test]
fn test_bad_block_magic() {
    let mut data = SINGLE_BYTE.to_vec();
    data[4] = 0x32;
    let err = decompress(&data[..]).unwrap_err();
    assert!(matches!(
        err,
        BzError::BadBlockHeader {
            found: 0x3241_5926_5359
        }
    ));
}

#[test]
fn test_bad_stream_header() {
    let mut data = SINGLE_BYTE.to_vec();
    data[3] = b'0';
    assert!(matches!(
        BzDecoder::new(&data[..]),
        Err(BzError::InvalidHeader { .. })
    ));

    data[0] = b'X';
    assert!(matches!(
        BzDecoder::new(&data[..]),
        Err(BzError::InvalidMagic { .. })
    ));
}

/// Every single-bit flip either fails or still yields the right bytes.
fn assert_flips_detected(data: &[u8], expected: &[u8]) {
    for index in 0..data.len() {
        for bit in 0..8 {
            let mut damaged = data.to_vec();
            damaged[index] ^= 1 << bit;
            if let Ok(output) = decompress(&damaged[..]) {
                assert_eq!(output, expected, "flip of bit {} in byte {}", bit, index);
            }
        }
    }
}

#[test]
fn test_bit_flips_never_yield_wrong_output() {
    assert_flips_detected(SINGLE_BYTE, b"x");
    assert_flips_detected(RUNS_255, &b"ab".repeat(256));
    assert_flips_detected(HANDMADE, &randomized_text());
    assert_flips_detected(RANDOMIZED, &randomized_text());
}
