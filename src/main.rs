mod api;
mod app;
mod chat;
mod config;
mod dashboard;
mod event;
mod model;
mod scheduler;
mod theme;

use api::BackendClient;
use app::FaqboardApp;
use config::Config;
use eframe::egui;
use scheduler::RefreshScheduler;
use std::sync::mpsc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::from_env();
    log::info!(
        "starting faqboard against {} (refresh every {:?})",
        config.api_base_url,
        config.refresh_interval
    );

    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("faqboard-runtime")
        .build()?;
    let runtime_handle = runtime.handle().clone();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "FAQ Chatbot Console",
        native_options,
        Box::new(move |creation_context| {
            let repaint = creation_context.egui_ctx.clone();
            theme::Theme::default().apply_visuals(&repaint);

            let client = BackendClient::new(
                &config,
                runtime_handle.clone(),
                tx.clone(),
                repaint.clone(),
            );
            let scheduler = RefreshScheduler::start(
                runtime_handle.clone(),
                tx.clone(),
                repaint,
                config.refresh_interval,
            );
            Ok(Box::new(FaqboardApp::new(rx, client, scheduler)))
        }),
    )?;

    Ok(())
}
