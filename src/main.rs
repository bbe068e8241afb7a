mod api;
mod app;
mod config;
mod screens;
mod session;
mod validate;

use app::App;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> iced::Result {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config().unwrap_or_else(|e| {
        warn!("using default config: {e}");
        config::Config::default()
    });
    let session = session::load_session(&config.token_file).map_err(|e| {
        error!("no usable session: {e}");
        e.to_string()
    });
    if let Ok(session) = &session {
        info!("signed in as {} (tutor {})", session.email, session.tutor_id);
    }
    let client = api::EduClient::new(&config.api_base_url, &config.provinces_base_url).map_err(|e| {
        error!("cannot build http client: {e}");
        e.to_string()
    });

    iced::application("Hồ sơ giáo viên", App::update, App::view)
        .theme(|app: &App| app.theme.clone())
        .window_size(iced::Size::new(1200.0, 900.0))
        .run_with(move || App::boot(config, session, client))
}
