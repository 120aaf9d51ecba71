#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let photos = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 40,
    };

    println!("=== lazyview headless album ===");
    let report = gallery_demo::headless::run(photos)?;
    println!(
        "{} of {} photos loaded, {} scroll events, {} ms simulated",
        report.loaded, report.photos, report.scroll_events, report.elapsed_ms
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
