use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use waymark::scenario::{Replay, format_report, load_scenario};
use waymark_core::{EncounterDefinition, EncounterModule, EngineConfig, EngineConfigExt, load_encounters};

#[derive(Parser)]
#[command(version, about = "Replay scripted encounters through the waymark engine")]
struct Cli {
    /// Debug logging for waymark crates (same as DEBUG_LOGGING=1)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive an encounter with a scenario script and print every tick
    Replay {
        /// Encounter file or directory of encounter files
        #[arg(short, long)]
        encounter: PathBuf,
        #[arg(short, long)]
        scenario: PathBuf,
        /// Encounter id, required when the path holds more than one
        #[arg(long)]
        id: Option<String>,
        /// Party slot to report draw intents for
        #[arg(long)]
        pov: Option<usize>,
        /// Ignore the stored engine config
        #[arg(long)]
        default_config: bool,
    },
    /// Build every encounter under a path and report problems
    Validate { path: PathBuf },
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    waymark::logging::init(cli.verbose);

    match cli.command {
        Commands::Replay {
            encounter,
            scenario,
            id,
            pov,
            default_config,
        } => {
            let def = pick_encounter(load_encounters(&encounter).map_err(|e| error_chain(&e))?, id.as_deref())?;
            let config = if default_config {
                EngineConfig::default()
            } else {
                EngineConfig::load()
            };
            let scenario = load_scenario(&scenario).map_err(|e| error_chain(&e))?;
            let module = EncounterModule::from_definition(def, config).map_err(|e| e.to_string())?;

            println!("{} / {}", module.name(), scenario.name);
            let timer = Instant::now();
            let mut replay = Replay::new(module, &scenario).with_pov(pov);
            for report in replay.run(&scenario) {
                print!("{}", format_report(&report, replay.world()));
            }
            println!("replayed {} frames in {}ms", scenario.frames.len(), timer.elapsed().as_millis());
        }
        Commands::Validate { path } => {
            let defs = load_encounters(&path).map_err(|e| error_chain(&e))?;
            let mut failed = 0;
            for def in &defs {
                let id = def.id.clone();
                match EncounterModule::from_definition(def.clone(), EngineConfig::default()) {
                    Ok(module) => println!(
                        "ok    {} ({} components, {} phases)",
                        id,
                        module.registry().len(),
                        def.phases.len()
                    ),
                    Err(e) => {
                        failed += 1;
                        println!("error {}: {}", id, e);
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{} of {} encounters failed validation", failed, defs.len()));
            }
            if defs.is_empty() {
                return Err(format!("no encounters found under {}", path.display()));
            }
        }
    }

    Ok(())
}

fn pick_encounter(mut defs: Vec<EncounterDefinition>, id: Option<&str>) -> Result<EncounterDefinition, String> {
    match id {
        Some(id) => match defs.iter().position(|d| d.id == id) {
            Some(index) => Ok(defs.swap_remove(index)),
            None => Err(format!("no encounter with id '{}'", id)),
        },
        None if defs.len() == 1 => Ok(defs.remove(0)),
        None => {
            let ids: Vec<&str> = defs.iter().map(|d| d.id.as_str()).collect();
            Err(format!("pick an encounter with --id: [{}]", ids.join(", ")))
        }
    }
}

/// Error message including its sources
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        msg.push_str(": ");
        msg.push_str(&e.to_string());
        source = e.source();
    }
    msg
}
