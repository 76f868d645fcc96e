/// Octal word dump of an image, for eyeballing against printed listings.
///
/// Bytes are paired little-endian and printed as 6-digit octal words,
/// `stride` words to a line, with an octal byte-offset column. A trailing
/// odd byte is padded with zero.
pub fn octal_dump(image: &[u8], stride: usize) -> String {
    fn offset_column(out: &mut String, offset: usize) {
        if offset != 0 {
            out.push('\n');
        }
        out.push_str(format!("{:06o}:", offset).as_str());
    }

    let mut out = String::new();
    let mut offset = 0;
    for pair in image.chunks(2) {
        if offset % (stride * 2) == 0 {
            offset_column(&mut out, offset);
        }
        let word = u16::from_le_bytes([pair[0], if pair.len() == 1 { 0 } else { pair[1] }]);
        out.push(' ');
        out.push_str(format!("{:06o}", word).as_str());
        offset += 2;
    }

    out
}
