//! CLI command for packing a directory into a LAB archive

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{DISK, LOOKING_GLASS, print_done, print_step, simple_bar};
use crate::lab::{LabPhase, LabWriter};

pub fn execute(
    input_dir: &Path,
    output_lab: &Path,
    include_hidden: bool,
    format_tag: u32,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Scanning {}...", input_dir.display()));
    }
    let mut writer = LabWriter::new(output_lab, input_dir).with_format_tag(format_tag);
    if include_hidden {
        writer = writer.with_hidden_files(true);
    }
    if writer.file_count() == 0 {
        anyhow::bail!("No files to pack in {}", input_dir.display());
    }

    let stats = if quiet {
        writer.write()?
    } else {
        print_step(
            2,
            2,
            DISK,
            &format!("Packing {} files into {}...", writer.file_count(), output_lab.display()),
        );

        let pb = simple_bar(writer.file_count() as u64, "Loading");
        let result = writer.write_with_progress(&|progress| match progress.phase {
            LabPhase::LoadingFiles | LabPhase::WritingFiles => {
                pb.set_message(progress.phase.as_str());
                pb.set_length(progress.total as u64);
                pb.set_position(progress.current as u64);
            }
            LabPhase::WritingTable => pb.set_message(progress.phase.as_str()),
            LabPhase::Complete => pb.finish_with_message("done"),
        });
        pb.finish_and_clear();
        result?
    };

    if !quiet {
        for name in &stats.skipped {
            println!("  skipped {name}");
        }
        println!(
            "Packed {} files into {} ({} bytes)",
            stats.files_packed,
            output_lab.display(),
            stats.archive_size
        );
        print_done(started.elapsed());
    }

    Ok(())
}
