//! `shop probe` – report network reachability.

use anyhow::{Context, Result};
use shop_core::context::AppContext;
use shop_core::reachability::HttpProbe;

pub async fn run_probe(ctx: &AppContext) -> Result<()> {
    let probe = HttpProbe::from_config(&ctx.config().reachability);
    let url = probe.url().to_string();
    let outcome = tokio::task::spawn_blocking(move || probe.probe())
        .await
        .context("probe task panicked")?;
    match outcome {
        Ok(code) => println!("online: {url} answered HTTP {code}"),
        Err(e) => println!("offline: {url}: {e}"),
    }
    Ok(())
}
