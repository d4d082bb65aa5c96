//! CLI command for LAB extraction

use std::io;
use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{
    LOOKING_GLASS, PACKAGE, print_done, print_step, short_name, simple_bar,
};
use crate::lab::LabReader;

pub fn execute(
    input_lab: &Path,
    output_dir: &Path,
    verbose: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Reading {}...", input_lab.display()));
    }
    let mut reader = LabReader::new(input_lab);
    reader.open()?;

    if verbose {
        reader.write_listing(&mut io::stdout().lock())?;
    }

    let total = reader.len();
    let written = if quiet {
        reader.extract_all(output_dir)
    } else {
        print_step(
            2,
            2,
            PACKAGE,
            &format!("Extracting {total} files to {}...", output_dir.display()),
        );

        let pb = simple_bar(total as u64, "Extracting");
        let written = reader.extract_all_with_progress(output_dir, &|progress| {
            pb.set_position(progress.current as u64);
            if let Some(name) = &progress.current_file {
                pb.set_message(short_name(name).to_string());
            }
        });
        pb.finish_and_clear();
        written
    };
    reader.close();

    if total > 0 && written == 0 {
        anyhow::bail!(
            "Failed to extract {} to {}",
            input_lab.display(),
            output_dir.display()
        );
    }

    if !quiet {
        if written < total {
            println!("{} of {total} files could not be extracted", total - written);
        }
        println!("Extracted {written} files to {}", output_dir.display());
        print_done(started.elapsed());
    }

    Ok(())
}
