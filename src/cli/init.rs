use crate::cli::resolve_settings;
use crate::error::Result;
use crate::settings::{save_settings, settings_path, shellexpand_path};

pub fn run(
    config: Option<&str>,
    home_state: Option<String>,
    reduction: Option<u32>,
    output_dir: Option<String>,
) -> Result<()> {
    let mut settings = resolve_settings(config, reduction, home_state, output_dir);
    settings.output_dir = shellexpand_path(&settings.output_dir);
    save_settings(&settings, config)?;

    println!("Saved settings to {}", settings_path(config).display());
    println!("Home state:   {}", settings.home_state_code);
    println!("Reduction:    {}%", settings.reduction_percent);
    println!("Output dir:   {}", settings.output_dir);
    Ok(())
}
