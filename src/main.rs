use payoff_desk::config::{self, RunMode};
use payoff_desk::console::Console;
use payoff_desk::server;

#[tokio::main]
async fn main() {
    // Logs go to stderr so the console report owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        mode = ?cfg.mode,
        grid_points = cfg.grid_points,
        max_positions = cfg.max_positions,
        "payoff_desk starting"
    );

    let result = match cfg.mode {
        RunMode::Server => server::serve(cfg).await,
        RunMode::Console => {
            // Stdin reads block; keep them off the async workers.
            let joined = tokio::task::spawn_blocking(move || {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                Console::new(stdin.lock(), stdout.lock(), &cfg)?.run()
            })
            .await;
            match joined {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!("console task panicked: {e}");
                    std::process::exit(1);
                }
            }
        }
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
