// CLI entry point for a headless Night Brew shift.
//
// Loads a `GameConfig` (or the default shift), lets the scripted barista in
// `autoplay.rs` play until an ending or the tick budget, and prints a
// summary. With `--events` every `ShopEvent` is printed as one JSON line,
// which is handy for diffing two runs of the same seed.
//
// Logging goes through `env_logger`; `RUST_LOG` overrides the default `info`
// level (e.g. `RUST_LOG=night_brew_sim=debug`).
//
// Usage:
//   night_brew [OPTIONS]
//     --seed <N>          PRNG seed (default: 42)
//     --config <PATH>     JSON config file (default: built-in shift)
//     --decline           Decline the phone instead of accepting
//     --max-ticks <N>     Tick budget (default: 3600000, one simulated hour)
//     --events            Print every event as a JSON line
//     --dump-config       Print the default config as JSON and exit

use std::path::PathBuf;

use log::{error, info};
use night_brew_sim::autoplay::Autoplayer;
use night_brew_sim::config::GameConfig;
use night_brew_sim::phone::PhoneChoice;
use night_brew_sim::sim::ShopState;

struct Options {
    seed: u64,
    config_path: Option<PathBuf>,
    phone_choice: PhoneChoice,
    max_ticks: u64,
    print_events: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: 42,
            config_path: None,
            phone_choice: PhoneChoice::Accept,
            max_ticks: 3_600_000,
            print_events: false,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let options = parse_args();

    let config = match &options.config_path {
        Some(path) => match GameConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    info!(
        "Opening shop (seed {}, {} machines, {} milestones)",
        options.seed,
        config.machines.len(),
        config.milestones.len()
    );
    let mut shop = ShopState::with_config(options.seed, config);
    let bot = Autoplayer::new(options.phone_choice);
    let report = bot.run(&mut shop, options.max_ticks);

    if options.print_events {
        for event in &report.events {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => error!("Could not serialize event: {e}"),
            }
        }
    }

    match report.ending {
        Some(kind) => println!(
            "Ending: {kind:?} after {} customers at tick {}",
            report.customers_served, report.final_tick
        ),
        None => {
            println!(
                "No ending within {} ticks ({} customers served)",
                options.max_ticks, report.customers_served
            );
            std::process::exit(2);
        }
    }
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Options {
    let mut options = Options::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                options.seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a number");
                    std::process::exit(1);
                });
            }
            "--config" => {
                i += 1;
                options.config_path = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--decline" => options.phone_choice = PhoneChoice::Decline,
            "--max-ticks" => {
                i += 1;
                options.max_ticks =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--max-ticks requires a number");
                        std::process::exit(1);
                    });
            }
            "--events" => options.print_events = true,
            "--dump-config" => {
                match serde_json::to_string_pretty(&GameConfig::default()) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Could not serialize config: {e}");
                        std::process::exit(1);
                    }
                }
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    options
}

fn print_usage() {
    println!("Usage: night_brew [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --seed <N>          PRNG seed (default: 42)");
    println!("  --config <PATH>     JSON config file (default: built-in shift)");
    println!("  --decline           Decline the phone instead of accepting");
    println!("  --max-ticks <N>     Tick budget (default: 3600000)");
    println!("  --events            Print every event as a JSON line");
    println!("  --dump-config       Print the default config as JSON and exit");
    println!("  --help, -h          Show this help");
}
