use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use cybersensei_ai::config::Config;
use cybersensei_ai::knowledge::KnowledgeBase;
use cybersensei_ai::llama::LlamaClient;
use cybersensei_ai::web::{routes, AppState};

/// Startup readiness budget for the llama.cpp server.
const READY_MAX_ATTEMPTS: u32 = 30;
const READY_DELAY: Duration = Duration::from_secs(2);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();

    info!("Starting CyberSensei AI Service");
    info!("Model path: {}", config.model_path);
    info!("llama.cpp server: {}", config.llama_url());

    let llama = match LlamaClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize llama.cpp client: {}", e);
            std::process::exit(1);
        }
    };

    // Refuse to accept traffic until the inference server answers
    info!("Waiting for llama.cpp server...");
    if let Err(e) = llama.wait_until_ready(READY_MAX_ATTEMPTS, READY_DELAY).await {
        error!("{}", e);
        std::process::exit(1);
    }

    let api_port = config.api_port;
    let app_state = Data::new(AppState {
        config,
        knowledge: KnowledgeBase::default(),
        llama,
    });

    info!("AI Service ready, listening on port {}", api_port);

    HttpServer::new(move || {
        App::new()
            // The dashboard frontend is served from another origin
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", api_port))?
    .run()
    .await
}
