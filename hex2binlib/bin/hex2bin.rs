use hex2binlib::{ConsoleReporter, Converter, SparseImage};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");

    println!(" --------------------------------------");
    println!("|  Intel HEX to BIN Converter | v{version} |");
    println!(" --------------------------------------");
    println!("\nUsage:");
    println!("  hex2bin info <input> [options]");
    println!("  hex2bin convert <input> <output> [options]");
    println!("\nOptions:");
    println!("  --offset           Apply extended linear address records to output addressing");
    println!("  --gap-fill <val>   Byte to fill gaps in the output BIN (default: sparse zeros)");
    println!("\nExamples:");
    println!("  hex2bin info firmware.hex");
    println!("  hex2bin convert firmware.hex firmware.bin");
    println!("  hex2bin convert firmware.hex firmware.bin --offset --gap-fill 0xFF");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    println!();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];

    // Dispatch and immediately handle results
    if let Err(e) = run_dispatch(command, &args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_dispatch(cmd: &str, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        "help" | "-h" | "--help" => {
            print_usage();
            Ok(())
        }
        "info" => {
            // Guard: Check args count
            let path_str = args.get(2).ok_or("Missing input file path")?;

            // Guard: File must exist
            let abs_path =
                validate_exists(path_str).map_err(|_| format!("File not found: {path_str}"))?;

            run_info(&abs_path, has_flag(args, "--offset"))
        }
        "convert" => {
            // Guard: Check file path arguments given
            let in_path_str = args.get(2).ok_or("Missing input path")?;
            let out_path_str = args.get(3).ok_or("Missing output path")?;

            // Guard: Check input exists
            let in_abs_path = validate_exists(in_path_str)?;
            let out_path = PathBuf::from(out_path_str);

            let offset = has_flag(args, "--offset");

            // Optional gap fill; the output is staged in memory when given
            let gap_fill = if let Some(gap_fill) = get_flag_value(args, "--gap-fill") {
                Some(u8::try_from(
                    parse_hex_str(&gap_fill)
                        .map_err(|_e| format!("Invalid gap fill: {gap_fill}"))?,
                )?)
            } else {
                None
            };

            run_convert(&in_abs_path, &out_path, offset, gap_fill)
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }
}

fn run_info(path: &Path, offset: bool) -> Result<(), Box<dyn std::error::Error>> {
    fn format_addr(addr: u64) -> String {
        let s = format!("{addr:08X}");
        let split = s.len() - 4;
        format!("0x{}_{}", &s[..split], &s[split..])
    }

    fn format_with_commas(n: usize) -> String {
        let s = n.to_string();
        s.as_bytes()
            .rchunks(3)
            .rev()
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",")
    }

    let mut converter = Converter::new();
    converter.set_linear_offset(offset);

    let content = fs::read_to_string(path)?;
    let mut image = SparseImage::new();
    converter.convert_str(&content, &mut image, &mut ConsoleReporter)?;

    println!("File Path:   {}", path.display());
    println!("Data Size:   {} bytes", format_with_commas(image.len()));
    println!(
        "Range:       {} - {}",
        format_addr(image.get_min_addr().unwrap_or(0)),
        format_addr(image.get_max_addr().unwrap_or(0)),
    );
    Ok(())
}

fn run_convert(
    in_path: &Path,
    out_path: &Path,
    offset: bool,
    gap_fill: Option<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut converter = Converter::new();
    converter.set_linear_offset(offset);

    let mut reporter = ConsoleReporter;

    match gap_fill {
        // Gap filling needs the full address range up front, so the image is
        // staged in memory and flattened at the end
        Some(fill) => {
            let content = fs::read_to_string(in_path)?;
            let mut image = SparseImage::new();
            converter.convert_str(&content, &mut image, &mut reporter)?;
            image.write_bin(out_path, fill)?;
        }
        None => {
            converter.convert_file(in_path, out_path, &mut reporter)?;
        }
    }

    // Validate output file was written
    let out_abs_path = validate_exists(&out_path.to_string_lossy())?;

    println!(
        "Converted {} -> {}",
        in_path.display(),
        out_abs_path.display()
    );
    Ok(())
}

// =============================== HELPER FUNCTIONS ===============================

/// Parse a string as a hex number (with optional 0x prefix)
fn parse_hex_str(s: &str) -> Result<usize, std::num::ParseIntError> {
    let s = s.trim();

    // Handle explicit 0x prefix
    if let Some(hex_str) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return usize::from_str_radix(hex_str, 16);
    }

    // Parse as hex without prefix
    usize::from_str_radix(s, 16)
}

/// Validate that a path exists and is a file. Returns absolute path.
fn validate_exists(path_str: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = PathBuf::from(path_str);
    if !path.exists() {
        return Err(format!("File not found: {path_str}").into());
    }
    if !path.is_file() {
        return Err(format!("Path is not a file: {path_str}").into());
    }
    // Return absolute path
    Ok(std::fs::canonicalize(path)?)
}

/// Find the value after a specific flag (e.g., "--gap-fill 0xFF")
fn get_flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

/// Check whether a bare flag (e.g., "--offset") is present
fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}
