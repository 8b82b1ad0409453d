use gavel_runner::{MarketSimulation, ScenarioConfig};

fn print_help() {
    eprintln!(
        r#"Gavel - English book auction market

USAGE:
    gavel [OPTIONS]

OPTIONS:
    --config <PATH>     Load the scenario from a JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Run the built-in demo market
    gavel

    # Run a scenario file with protocol traces
    RUST_LOG=debug gavel --config market.json
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => {
            log::info!("Loading scenario from: {}", path);
            ScenarioConfig::from_file(&path)?
        }
        None => {
            log::info!("No --config given, running the demo market");
            ScenarioConfig::demo()
        }
    };

    let results = MarketSimulation::new(config).run().await?;
    results.log_summary();

    Ok(())
}
