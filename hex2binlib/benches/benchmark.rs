use criterion::{Criterion, criterion_group, criterion_main};
use hex2binlib::{Converter, NullReporter, SparseImage};
use rand::Rng;

/// Format one data record line with a valid checksum
fn format_data_record(address: u16, data: &[u8]) -> String {
    let payload_hex: String = data.iter().map(|b| format!("{b:02X}")).collect();
    let mut sum = (data.len() as u8)
        .wrapping_add((address >> 8) as u8)
        .wrapping_add((address & 0xFF) as u8);
    for b in data {
        sum = sum.wrapping_add(*b);
    }
    let checksum = (!sum).wrapping_add(1);
    format!(":{:02X}{address:04X}00{payload_hex}{checksum:02X}", data.len())
}

/// Format one extended linear address record with a valid checksum
fn format_ela_record(field: u16) -> String {
    let [hi, lo] = field.to_be_bytes();
    let sum = 2u8.wrapping_add(0x04).wrapping_add(hi).wrapping_add(lo);
    let checksum = (!sum).wrapping_add(1);
    format!(":02000004{field:04X}{checksum:02X}")
}

/// Build an in-memory hex document: `blocks` 64 KiB blocks of random data,
/// each prefixed with an extended linear address record
fn generate_hex_doc(blocks: u16) -> String {
    let mut rng = rand::rng();
    let mut doc = String::new();

    for block in 0..blocks {
        doc.push_str(&format_ela_record(block));
        doc.push('\n');
        for line in 0u16..4096 {
            let mut payload = [0u8; 16];
            rng.fill(&mut payload[..]);
            doc.push_str(&format_data_record(line * 16, &payload));
            doc.push('\n');
        }
    }
    doc.push_str(":00000001FF\n");
    doc
}

#[allow(clippy::expect_used)]
fn bench_hex_to_bin(c: &mut Criterion) {
    // ~1 MB of hex text: 6 blocks of 64 KiB data records
    let content = generate_hex_doc(6);

    c.bench_function("convert_1mb_hex", |b| {
        let converter = Converter::new();

        b.iter(|| {
            let mut image = SparseImage::new();
            converter
                .convert_str(
                    std::hint::black_box(&content),
                    &mut image,
                    &mut NullReporter,
                )
                .expect("Failed to convert hex document");
            std::hint::black_box(image);
        });
    });

    c.bench_function("convert_1mb_hex_offset", |b| {
        let mut converter = Converter::new();
        converter.set_linear_offset(true);

        b.iter(|| {
            let mut image = SparseImage::new();
            converter
                .convert_str(
                    std::hint::black_box(&content),
                    &mut image,
                    &mut NullReporter,
                )
                .expect("Failed to convert hex document");
            std::hint::black_box(image);
        });
    });
}

criterion_group!(
    name = hex2binlib_benches;
    config = Criterion::default().sample_size(20);
    targets = bench_hex_to_bin
);
criterion_main!(hex2binlib_benches);
