use anyhow::Result;
use chatharvest_core::Registry;

pub fn run_providers() -> Result<()> {
    let registry = Registry::builtin();
    for provider in registry.providers() {
        println!(
            "{:<10} {:<10} {}",
            provider.identity(),
            provider.display_name(),
            provider.entry_url()
        );
    }
    Ok(())
}
