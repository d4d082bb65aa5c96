use clap::Subcommand;
use std::path::PathBuf;

pub mod execute;
pub mod list;
pub mod pack;
pub mod unpack;

#[derive(Subcommand)]
pub enum Commands {
    /// Pack the files of a directory into a LAB archive
    Pack {
        /// Directory holding the files to pack (not recursive)
        input_dir: PathBuf,

        /// LAB archive to create
        output_lab: PathBuf,

        /// Also pack dot-files
        #[arg(long)]
        include_hidden: bool,

        /// Header tag to write, decimal or 0x-prefixed hex
        #[arg(long, value_parser = parse_format_tag, default_value = "0x10000")]
        format_tag: u32,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Extract every file of a LAB archive into a directory
    Unpack {
        /// LAB archive to read
        input_lab: PathBuf,

        /// Output directory (created if missing)
        output_dir: PathBuf,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the contents of a LAB archive
    List {
        /// LAB archive to read
        input_lab: PathBuf,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parse a `--format-tag` value, either decimal or `0x` hex
fn parse_format_tag(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("Invalid format tag '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_tag() {
        assert_eq!(parse_format_tag("0x10000"), Ok(0x10000));
        assert_eq!(parse_format_tag("0XfF"), Ok(255));
        assert_eq!(parse_format_tag("65536"), Ok(65536));
        assert!(parse_format_tag("0x").is_err());
        assert!(parse_format_tag("-1").is_err());
        assert!(parse_format_tag("0x100000000").is_err());
        assert!(parse_format_tag("LABN").is_err());
    }
}
