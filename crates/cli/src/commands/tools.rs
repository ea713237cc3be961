//! `dossier tools` — List registered tools.

use dossier_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let (_, registry) = super::build_runtime(&config)?;

    println!("{} tools registered:", registry.len());
    println!();
    for descriptor in registry.descriptors() {
        println!("  {:<20} [{}]", descriptor.name, descriptor.argument_mode);
        println!("      {}", descriptor.description);
    }
    Ok(())
}
