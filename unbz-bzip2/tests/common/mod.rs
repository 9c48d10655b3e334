//! Plaintexts of the golden corpora under `tests/data`.

#![allow(dead_code)]

pub const LOREM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.\n";

const WORDS: [&[u8]; 16] = [
    b"alpha", b"bravo", b"charlie", b"delta", b"echo", b"foxtrot", b"golf", b"hotel", b"india",
    b"juliet", b"kilo", b"lima", b"mike", b"november", b"oscar", b"papa",
];

/// `repeated.bz2`: level 3, one block.
pub fn repeated() -> Vec<u8> {
    b"AAAAAAAAAABBBBCCCC".repeat(10_000)
}

/// `lorem.bz2`: numbered copies of the lorem paragraph.
pub fn lorem() -> Vec<u8> {
    let text = std::str::from_utf8(LOREM).unwrap();
    (0..200)
        .flat_map(|i| text.replace("Lorem", &i.to_string()).into_bytes())
        .collect()
}

/// `multiblock.bz2`: level 1, four blocks of pseudo-random words.
pub fn words(count: usize) -> Vec<u8> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut out = Vec::new();
    for i in 0..count {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        out.extend_from_slice(WORDS[((state >> 33) % 16) as usize]);
        out.push(if i % 12 == 11 { b'\n' } else { b' ' });
    }
    out
}

/// `randomized.bz2` and `handmade.bz2`.
pub fn randomized_text() -> Vec<u8> {
    let mut unit = Vec::new();
    unit.extend_from_slice(b"aaaaaaaaaaaaaaaaaaaa the randomised block path ");
    unit.extend_from_slice(b"zzzzzz");
    unit.extend_from_slice(&b"0123456789".repeat(3));
    unit.repeat(40)
}

pub const EMPTY: &[u8] = include_bytes!("../data/empty.bz2");
pub const SINGLE_BYTE: &[u8] = include_bytes!("../data/single_byte.bz2");
pub const REPEATED: &[u8] = include_bytes!("../data/repeated.bz2");
pub const LOREM_BZ2: &[u8] = include_bytes!("../data/lorem.bz2");
pub const MULTIBLOCK: &[u8] = include_bytes!("../data/multiblock.bz2");
pub const RUNS_255: &[u8] = include_bytes!("../data/runs_255.bz2");
pub const RUNS_256: &[u8] = include_bytes!("../data/runs_256.bz2");
pub const RANDOMIZED: &[u8] = include_bytes!("../data/randomized.bz2");
pub const HANDMADE: &[u8] = include_bytes!("../data/handmade.bz2");
