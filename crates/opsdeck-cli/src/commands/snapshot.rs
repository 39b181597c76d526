use anyhow::Result;
use opsdeck_core::AppStore;
use opsdeck_infrastructure::ConfigService;

/// Prints the snapshot of a freshly seeded store.
pub fn print(config: &ConfigService) -> Result<()> {
    let store = AppStore::new(config.get_config().store);
    println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
    Ok(())
}
