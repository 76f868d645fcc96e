use abstape::translator::block::{HEADER_LEN, SIGNATURE};
use abstape::translator::{translate_source, Translator};

use pretty_assertions::assert_eq;

/// Split an image into (address, data) pairs, checking the framing of every
/// block along the way: signature, header-inclusive length field, and a
/// checksum byte that brings the frame sum to 0 mod 256.
fn split_blocks(image: &[u8]) -> Vec<(u16, Vec<u8>)> {
    let mut blocks = Vec::new();
    let mut rest = image;
    while !rest.is_empty() {
        let signature = u16::from_le_bytes([rest[0], rest[1]]);
        assert_eq!(signature, SIGNATURE);
        let length = u16::from_le_bytes([rest[2], rest[3]]) as usize;
        let addr = u16::from_le_bytes([rest[4], rest[5]]);
        let data = rest[HEADER_LEN..length].to_vec();
        assert_eq!(length, data.len() + HEADER_LEN);
        let framed = &rest[..length + 1];
        let sum = framed.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        assert_eq!(sum, 0, "block at addr {addr:06o} fails checksum");
        blocks.push((addr, data));
        rest = &rest[length + 1..];
    }
    blocks
}

#[test]
fn test_single_word_program() {
    let translation = translate_source("= 1000\n012345\n", &[]).unwrap();
    assert_eq!(translation.errors, 0);
    assert_eq!(
        split_blocks(&translation.image),
        vec![(0o1000, vec![0xe5, 0x14]), (1, vec![])]
    );
}

#[test]
fn test_exact_image_bytes() {
    let translation = translate_source("= 1000\n012345\n", &[]).unwrap();
    assert_eq!(
        translation.image,
        vec![
            /* sig */ 0x01, 0x00, /* len */ 0x08, 0x00, /* addr */ 0x00, 0x02,
            /* data */ 0xe5, 0x14, /* cksum */ 0xfc, /* halt */ 0x01, 0x00, 0x06, 0x00,
            0x01, 0x00, 0xf8,
        ]
    );
}

#[test]
fn test_empty_input_emits_halt_only() {
    let translation = translate_source("", &[]).unwrap();
    let blocks = split_blocks(&translation.image);
    assert_eq!(blocks, vec![(1, vec![])]);
}

#[test]
fn test_halt_address_is_odd() {
    let translation = translate_source("= 1000\n000001\n", &[]).unwrap();
    let blocks = split_blocks(&translation.image);
    let (halt_addr, halt_data) = blocks.last().unwrap();
    assert_eq!(halt_addr % 2, 1);
    assert_eq!(halt_data.len(), 0);
}

#[test]
fn test_ifdef_selects_branch() {
    let input = "#ifdef FOO\n000001\n#else\n000002\n#endif\n";

    let with_foo = translate_source(input, &["FOO".to_string()]).unwrap();
    assert_eq!(with_foo.errors, 0);
    assert_eq!(split_blocks(&with_foo.image)[0].1, vec![0x01, 0x00]);

    let without_foo = translate_source(input, &[]).unwrap();
    assert_eq!(without_foo.errors, 0);
    assert_eq!(split_blocks(&without_foo.image)[0].1, vec![0x02, 0x00]);
}

#[test]
fn test_nested_conditionals_inside_false_branch() {
    let input = "#if 0\n#ifdef FOO\n000001\n#endif\n000002\n#else\n000003\n#endif\n";
    let translation = translate_source(input, &["FOO".to_string()]).unwrap();
    assert_eq!(translation.errors, 0);
    assert_eq!(split_blocks(&translation.image)[0].1, vec![0x03, 0x00]);
}

#[test]
fn test_define_in_text_enables_later_ifdef() {
    let input = "#define REV2\n#ifdef REV2\n= 1000\n000001\n#endif\n";
    let translation = translate_source(input, &[]).unwrap();
    assert_eq!(translation.errors, 0);
    assert_eq!(split_blocks(&translation.image)[0].1, vec![0x01, 0x00]);
}

#[test]
fn test_lagging_check_matches() {
    let translation = translate_source("= 0\n000001\n: 0\n", &[]).unwrap();
    assert_eq!(translation.errors, 0);
    assert_eq!(translation.diagnostics, vec![]);
}

#[test]
fn test_current_check_matches_and_splits_blocks() {
    let input = "= 1000\n000001\n:: 1002\n000002\n";
    let translation = translate_source(input, &[]).unwrap();
    assert_eq!(translation.errors, 0);
    // The check flushes; the next block starts where the pc left off.
    assert_eq!(
        split_blocks(&translation.image),
        vec![
            (0o1000, vec![0x01, 0x00]),
            (0o1002, vec![0x02, 0x00]),
            (1, vec![]),
        ]
    );
}

#[test]
fn test_current_check_mismatch() {
    let translation = translate_source("= 1000\n000001\n:: 1000\n", &[]).unwrap();
    assert_eq!(translation.errors, 1);
    assert_eq!(
        translation.diagnostics[0].to_string(),
        "line 3 ERROR: consistency check, expecting pc=001002 but \":: 001000\" specified"
    );
}

#[test]
fn test_word_at_odd_pc() {
    let translation = translate_source("= 1\n000001\n", &[]).unwrap();
    assert_eq!(translation.errors, 1);
    assert_eq!(
        translation.diagnostics[0].to_string(),
        "line 2 ERROR: odd pc=000001"
    );
}

#[test]
fn test_stray_endif() {
    let translation = translate_source("#endif\n", &[]).unwrap();
    assert_eq!(translation.errors, 1);
    assert_eq!(
        translation.diagnostics[0].to_string(),
        "line 1 ERROR: #endif without corresponding #if"
    );
}

#[test]
fn test_stray_else_does_not_suppress() {
    let translation = translate_source("#else\n= 1000\n000001\n", &[]).unwrap();
    assert_eq!(translation.errors, 1);
    assert_eq!(
        translation.diagnostics[0].to_string(),
        "line 1 ERROR: #else without corresponding #if"
    );
    assert_eq!(split_blocks(&translation.image)[0].1, vec![0x01, 0x00]);
}

#[test]
fn test_bytes_interleave_with_words() {
    let input = "= 1000\nb 200\nb 201\n000001\n";
    let translation = translate_source(input, &[]).unwrap();
    assert_eq!(translation.errors, 0);
    assert_eq!(
        split_blocks(&translation.image)[0].1,
        vec![0x80, 0x81, 0x01, 0x00]
    );
}

#[test]
fn test_multi_word_line() {
    let input = "= 1000\n012345 054321 000007\n:: 1006\n";
    let translation = translate_source(input, &[]).unwrap();
    assert_eq!(translation.errors, 0);
    assert_eq!(
        split_blocks(&translation.image)[0].1,
        vec![0xe5, 0x14, 0xd1, 0x58, 0x07, 0x00]
    );
}

#[test]
fn test_range_errors_still_emit() {
    let tests = vec![
        ("= 200000\n", "line 1 ERROR: range org=200000"),
        ("b 400\n", "line 1 ERROR: range b=0400"),
        ("200000\n", "line 1 ERROR: range word=200000"),
    ];
    for (input, expected) in tests {
        let translation = translate_source(input, &[]).unwrap();
        assert_eq!(translation.errors, 1, "input {:?}", input);
        assert_eq!(
            translation.diagnostics[0].to_string(),
            expected,
            "input {:?}",
            input
        );
    }

    // The out-of-range word is still appended, masked to 16 bits, so pc
    // bookkeeping stays in step with the transcription on error runs.
    let translation = translate_source("200000\n", &[]).unwrap();
    assert_eq!(split_blocks(&translation.image)[0].1, vec![0x00, 0x00]);
}

#[test]
fn test_syntax_error_is_collected_and_run_continues() {
    let translation = translate_source("= 1000\nmov r0, r1\n000001\n", &[]).unwrap();
    assert_eq!(translation.errors, 1);
    assert_eq!(
        translation.diagnostics[0].to_string(),
        "line 2 ERROR: syntax error \"mov r0, r1\""
    );
    assert_eq!(split_blocks(&translation.image)[0].1, vec![0x01, 0x00]);
}

#[test]
fn test_comments_and_blank_lines_are_skipped_everywhere() {
    let input = "// header comment\n\n#if 0\n// suppressed comment\n\n#endif\n= 1000\n000001\n";
    let translation = translate_source(input, &[]).unwrap();
    assert_eq!(translation.errors, 0);
    assert_eq!(split_blocks(&translation.image)[0].1, vec![0x01, 0x00]);
}

#[test]
fn test_listing_covers_every_physical_line() {
    let translation = Translator::new()
        .with_listing()
        .translate("= 1000\n\n012345\n")
        .unwrap();
    assert_eq!(translation.listing.len(), 3);
    assert_eq!(translation.listing[0].to_string(), "line #0001: 000000 | = 1000");
    assert_eq!(translation.listing[2].to_string(), "line #0003: 001000 | 012345");
}

#[test]
fn test_block_summaries() {
    let translation = translate_source("= 1000\n012345\n", &[]).unwrap();
    let rendered: Vec<String> = translation.blocks.iter().map(|b| b.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "wrote BLK org 001000 len 000002 cksum 0374(0xfc)",
            "wrote HALT org 000001 len 000000 cksum 0370(0xf8)",
        ]
    );
}
