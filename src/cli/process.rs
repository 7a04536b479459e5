use std::path::{Path, PathBuf};

use crate::cli::summary::format_report;
use crate::cli::{resolve_settings, run_options};
use crate::error::Result;
use crate::export::{CLEANED_FILE, DASHBOARD_FILE, TALLY_FILE};
use crate::processor::{process_file, Workbooks};
use crate::settings::shellexpand_path;

pub fn run(
    config: Option<&str>,
    file: &str,
    reduction: Option<u32>,
    home_state: Option<String>,
    output_dir: Option<String>,
) -> Result<()> {
    let settings = resolve_settings(config, reduction, home_state, output_dir);
    let options = run_options(&settings)?;
    let out = process_file(Path::new(file), &options)?;
    // Serialize everything before touching the output directory.
    let books = out.workbooks()?;

    let dir = PathBuf::from(shellexpand_path(&settings.output_dir));
    for path in write_workbooks(&dir, &books)? {
        println!("Wrote {}", path.display());
    }
    println!();
    println!("{}", format_report(&out, options.reduction_percent));
    Ok(())
}

/// Write the three workbooks into `dir`, returning the paths written.
pub fn write_workbooks(dir: &Path, books: &Workbooks) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(3);
    for (name, bytes) in [
        (CLEANED_FILE, &books.cleaned),
        (TALLY_FILE, &books.tally),
        (DASHBOARD_FILE, &books.dashboard),
    ] {
        let path = dir.join(name);
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote workbook");
        written.push(path);
    }
    Ok(written)
}
