//! File type tags for packed entries
//!
//! The convention LucasArts used is not documented. The table below is
//! inferred from the stock Outlaws archives. Unknown extensions get an
//! all-zero tag, which the stock archives also contain.

use std::path::Path;

use super::labn::TypeTag;
use crate::utils::filesys::file_extension;

/// Archive name that stores `.pcx` images as `PXCP` instead of `MTXT`
const OUTLAWS_LAB: &str = "outlaws.lab";

/// Pick the type tag for `file_name` when packing into `dest_lab`
///
/// Matching on the extension is case-insensitive. `dest_lab` only matters
/// for `.pcx` files.
pub fn type_tag_for_file_name(file_name: &str, dest_lab: &Path) -> TypeTag {
    let Some(ext) = file_extension(file_name) else {
        return TypeTag::ZERO;
    };

    let tag = match ext.to_ascii_lowercase().as_str() {
        ".pcx" => {
            if is_outlaws_lab(dest_lab) {
                b"PXCP"
            } else {
                b"MTXT"
            }
        }
        ".nwx" => b"FXAW",
        ".phy" => b"SHYP",
        ".laf" => b"TNFN",
        ".rcs" | ".rca" => b"BPCR",
        ".msc" => b"BCSM",
        ".wav" => b"DVAW",
        ".atx" => b"FXTA",
        ".itm" => b"METI",
        ".inf" => b"FFNI",
        ".3do" => b"FOD3",
        ".obb" | ".obt" => b"FTBO",
        ".lvb" | ".lvt" => b"FTVL",
        _ => return TypeTag::ZERO,
    };

    TypeTag(*tag)
}

/// Case-insensitive, so `OUTLAWS.LAB` matches too. Older packers compared
/// case-sensitively and gave `.pcx` files in `OUTLAWS.LAB` the `MTXT` tag.
fn is_outlaws_lab(dest_lab: &Path) -> bool {
    dest_lab
        .to_string_lossy()
        .to_ascii_lowercase()
        .contains(OUTLAWS_LAB)
}
