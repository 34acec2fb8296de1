use chrono::Utc;

use whale_scanner::{
    config::settings::Settings,
    services::{
        market_data::BinanceFutures,
        notifier::TelegramNotifier,
        scanner::Scanner,
    },
};

fn init_logging() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let settings = Settings::new().unwrap_or_else(|e| {
        eprintln!("Failed to load settings: {e}");
        std::process::exit(1);
    });
    let cfg = settings.scan_config().unwrap_or_else(|e| {
        eprintln!("Bad preset: {e}");
        std::process::exit(1);
    });

    println!(
        "Running futures early sell/buy scanner [{}]: {}",
        cfg.name,
        Utc::now().format("%Y-%m-%d %H:%M")
    );

    let source = BinanceFutures::new(&cfg).unwrap_or_else(|e| {
        eprintln!("HTTP client: {e}");
        std::process::exit(1);
    });
    let notifier = TelegramNotifier::new(settings.telegram_token.clone(), settings.chat_id.clone());
    if !notifier.is_configured() {
        log::warn!("TELEGRAM_TOKEN / CHAT_ID not set, alerts go to stdout");
    }

    let report = Scanner::new(source, notifier, cfg).run_once().await;

    log::info!(
        "scanned {} symbols ({} skipped, {} failed)",
        report.scanned,
        report.skipped,
        report.failed
    );
    if report.alerts.is_empty() {
        println!("No alerts this run.");
    } else {
        println!("Sent {} alerts.", report.alerts.len());
    }
}
