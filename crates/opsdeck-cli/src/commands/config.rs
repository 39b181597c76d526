use anyhow::Result;
use colored::Colorize;
use opsdeck_infrastructure::ConfigService;

pub fn path(config: &ConfigService) -> Result<()> {
    println!("{}", config.config_path()?.display());
    Ok(())
}

pub fn show(config: &ConfigService) -> Result<()> {
    // Surface parse errors here instead of silently showing defaults.
    config.load()?;
    print!("{}", config.render()?);
    Ok(())
}

pub fn init(config: &ConfigService, force: bool) -> Result<()> {
    let (path, written) = config.init(force)?;
    if written {
        println!("{} {}", "Wrote".green(), path.display());
    } else {
        println!(
            "{} {} (use --force to overwrite)",
            "Exists:".yellow(),
            path.display()
        );
    }
    Ok(())
}

pub fn set(config: &ConfigService, key: &str, value: &str) -> Result<()> {
    config.set(key, value)?;
    println!("{} {} = {}", "Set".green(), key, value);
    Ok(())
}
