//! CLI command for listing LAB contents

use std::io::{self, Write};
use std::path::Path;

use crate::lab::LabReader;

pub fn execute(input_lab: &Path, json: bool) -> anyhow::Result<()> {
    let mut reader = LabReader::new(input_lab);
    reader.open()?;

    let mut out = io::stdout().lock();
    if json {
        let entries = reader.list_entries()?;
        serde_json::to_writer_pretty(&mut out, &entries)?;
        writeln!(out)?;
    } else {
        reader.write_listing(&mut out)?;
    }

    Ok(())
}
