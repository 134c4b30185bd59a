use crate::config::PartialSimulationConfig;
use crate::error::Result;

pub fn render() -> Result<String> {
    let body = PartialSimulationConfig::from_defaults().to_toml_string()?;
    Ok(format!(
        "# Default LJMC configuration. Any key may be omitted from a config file.\n\
         # Use `system.particles` instead of `system.density` for an explicit count.\n\n{}",
        body
    ))
}

pub fn run() -> Result<()> {
    print!("{}", render()?);
    Ok(())
}
