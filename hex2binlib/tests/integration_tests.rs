use hex2binlib::{
    ChecksumMismatch, Converter, Hex2BinError, Hex2BinErrorKind, NullReporter, RecordType,
    SparseImage,
};
use std::fs;

fn compare_files(path1: &str, path2: &str) -> bool {
    // Load them in memory (small files -> OK)
    let f1 = fs::read(path1);
    let f2 = fs::read(path2);

    // Verify both are Ok and their contents match
    f1.is_ok_and(|content1| f2.is_ok_and(|content2| content1 == content2))
}

#[test]
fn test_convert_file_writes_expected_image() {
    // Define in/out paths
    let input_path = "tests/fixtures/fw_valid_1.hex";
    let output_path = "build/t1/fw.bin";

    // Convert and check the result
    let converter = Converter::new();
    let res = converter.convert_file(input_path, output_path, &mut NullReporter);
    assert!(res.is_ok());

    if let Ok(summary) = res {
        assert_eq!(summary.bytes_written, 40);
        assert!(summary.checksum_mismatches.is_empty());
        assert!(summary.record_types.contains(&RecordType::Data));
        assert!(
            summary
                .record_types
                .contains(&RecordType::ExtendedSegmentAddress)
        );
        assert!(summary.record_types.contains(&RecordType::EndOfFile));
    }

    // The segment base pushes the last data record to 0x1000..0x1007
    let out = fs::read(output_path).unwrap();
    assert_eq!(out.len(), 0x1008);
    assert_eq!(out[0x0000], 0x00);
    assert_eq!(out[0x001F], 0x1F);
    assert_eq!(out[0x0020], 0x00); // gap stays zero
    assert_eq!(out[0x0FFF], 0x00);
    assert_eq!(out[0x1000], 0xAA);
    assert_eq!(out[0x1007], 0x11);
}

#[test]
fn test_convert_file_is_deterministic() {
    // Define in/out paths
    let input_path = "tests/fixtures/fw_valid_1.hex";
    let output_path_a = "build/t2/fw_a.bin";
    let output_path_b = "build/t2/fw_b.bin";

    // Convert the same input twice
    let converter = Converter::new();
    let res = converter.convert_file(input_path, output_path_a, &mut NullReporter);
    assert!(res.is_ok());
    let res = converter.convert_file(input_path, output_path_b, &mut NullReporter);
    assert!(res.is_ok());

    assert!(compare_files(output_path_a, output_path_b));
}

#[test]
fn test_linear_offset_disabled_by_default() {
    // Define in/out paths
    let input_path = "tests/fixtures/fw_valid_2.hex";
    let output_path = "build/t3/fw.bin";

    // Convert and check the result
    let converter = Converter::new();
    let res = converter.convert_file(input_path, output_path, &mut NullReporter);
    assert!(res.is_ok());

    // Extended linear address record leaves addressing alone
    let out = fs::read(output_path).unwrap();
    assert_eq!(out, b"abcdefghijklmnop");

    if let Ok(summary) = res {
        assert_eq!(summary.start_execution, Some(0x1234));
    }
}

#[test]
fn test_linear_offset_enabled() {
    // Define in/out paths
    let input_path = "tests/fixtures/fw_valid_2.hex";
    let output_path = "build/t4/fw.bin";

    // Convert with the linear offset adjustment enabled
    let mut converter = Converter::new();
    converter.set_linear_offset(true);
    let res = converter.convert_file(input_path, output_path, &mut NullReporter);
    assert!(res.is_ok());

    // Data shifted by 0x10000; everything below stays zero
    let out = fs::read(output_path).unwrap();
    assert_eq!(out.len(), 0x10010);
    assert_eq!(out[0x00000], 0x00);
    assert_eq!(out[0x10000], b'a');
    assert_eq!(out[0x1000F], b'p');
}

#[test]
fn test_bad_checksum_is_not_fatal() {
    // Define in/out paths
    let input_path = "tests/fixtures/fw_bad_checksum.hex";
    let output_path = "build/t5/fw.bin";

    // Convert and check the result
    let converter = Converter::new();
    let res = converter.convert_file(input_path, output_path, &mut NullReporter);
    assert!(res.is_ok());

    // The mismatch is collected; the record's bytes are still written
    if let Ok(summary) = res {
        assert_eq!(
            summary.checksum_mismatches,
            vec![ChecksumMismatch {
                line: 1,
                expected: 0xF7,
                actual: 0x00,
            }]
        );
        assert_eq!(summary.bytes_written, 3);
    }

    let out = fs::read(output_path).unwrap();
    assert_eq!(out, [0x01, 0x02, 0x03]);
}

#[test]
#[allow(clippy::panic)]
fn test_malformed_record_fails() {
    // Define in/out paths
    let input_path = "tests/fixtures/fw_malformed.hex";
    let output_path = "build/t6/fw.bin";

    // Convert the file
    let converter = Converter::new();
    let res = converter.convert_file(input_path, output_path, &mut NullReporter);

    // Check the error
    match res {
        Err(e) => {
            if let Some(err) = e.downcast_ref::<Hex2BinError>() {
                assert!(matches!(
                    err,
                    Hex2BinError::ParseRecordError(Hex2BinErrorKind::MissingStartCode, 2)
                ));
            } else {
                panic!("Error was not a Hex2BinError");
            }
        }
        Ok(_) => panic!("Expected an error, but got Ok"),
    }

    // Writes made before the failing line stand
    let out = fs::read(output_path).unwrap();
    assert_eq!(out, [0x55]);
}

#[test]
fn test_sparse_image_write_bin_gap_fill() {
    // Define in/out paths
    let input_path = "tests/fixtures/fw_valid_1.hex";
    let output_path = "build/t7/fw.bin";

    // Convert into memory, then flatten with a gap fill byte
    let content = fs::read_to_string(input_path).unwrap();
    let converter = Converter::new();
    let mut image = SparseImage::new();
    let res = converter.convert_str(&content, &mut image, &mut NullReporter);
    assert!(res.is_ok());

    let res = image.write_bin(output_path, 0xFF);
    assert!(res.is_ok());

    let out = fs::read(output_path).unwrap();
    assert_eq!(out.len(), 0x1008);
    assert_eq!(out[0x001F], 0x1F);
    assert_eq!(out[0x0020], 0xFF); // gap filled
    assert_eq!(out[0x0FFF], 0xFF);
    assert_eq!(out[0x1000], 0xAA);
}

#[test]
fn test_missing_input_fails() {
    // Define in/out paths
    let input_path = "tests/fixtures/no_such_file.hex";
    let output_path = "build/t8/fw.bin";

    // Convert the file
    let converter = Converter::new();
    let res = converter.convert_file(input_path, output_path, &mut NullReporter);

    assert!(res.is_err());
}
