//! Command execution implementations

use super::Commands;
use super::{list, pack, unpack};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, verbose: bool) -> anyhow::Result<()> {
        match self {
            Commands::Pack {
                input_dir,
                output_lab,
                include_hidden,
                format_tag,
                quiet,
            } => pack::execute(input_dir, output_lab, *include_hidden, *format_tag, *quiet),
            Commands::Unpack {
                input_lab,
                output_dir,
                quiet,
            } => unpack::execute(input_lab, output_dir, verbose, *quiet),
            Commands::List { input_lab, json } => list::execute(input_lab, *json),
        }
    }
}
