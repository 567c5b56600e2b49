//! destino CLI: travel recommendations from a forward-chaining rule engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use destino::advisor::{Advice, TravelAdvisor};
use destino::chain::ConflictResolutionStrategy;
use destino::config::DestinoConfig;
use destino::preferences::TravelPreferences;

#[derive(Parser)]
#[command(name = "destino", version, about = "Travel recommendation rule engine")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend destinations for a set of preferences.
    Recommend {
        /// Preferred activity (cultura, aventura, naturaleza, gastronomia, relax, trekking, fotografia).
        #[arg(long)]
        actividad: Option<String>,

        /// Budget (baja, media, alta).
        #[arg(long)]
        presupuesto: Option<String>,

        /// Preferred climate (calido, templado, frio, variado).
        #[arg(long)]
        clima: Option<String>,

        /// Trip length (1-3, 4-7, 7+).
        #[arg(long)]
        duracion: Option<String>,

        /// Travel group (solo, pareja, familia, amigos).
        #[arg(long)]
        grupo: Option<String>,

        /// Read preferences from a JSON file instead of flags.
        #[arg(long, conflicts_with_all = ["actividad", "presupuesto", "clima", "duracion", "grupo"])]
        preferences: Option<PathBuf>,

        /// Conflict resolution strategy (first, priority, refraction, random, general).
        #[arg(long)]
        strategy: Option<ConflictResolutionStrategy>,

        /// Seed for the random strategy.
        #[arg(long)]
        seed: Option<u64>,

        /// Timeout in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Print the execution trace.
        #[arg(long)]
        trace: bool,
    },

    /// List the rules of the knowledge base.
    Rules,

    /// List destinations, or show one in detail.
    Destinations {
        /// Destination id.
        id: Option<String>,
    },

    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DestinoConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Recommend {
            actividad,
            presupuesto,
            clima,
            duracion,
            grupo,
            preferences,
            strategy,
            seed,
            timeout_ms,
            trace,
        } => {
            if let Some(strategy) = strategy {
                config.engine.strategy = strategy;
            }
            if seed.is_some() {
                config.engine.random_seed = seed;
            }
            if let Some(ms) = timeout_ms {
                config.advisor.timeout_ms = ms;
            }

            let prefs = match preferences {
                Some(path) => {
                    let content = std::fs::read_to_string(&path).into_diagnostic()?;
                    serde_json::from_str(&content).into_diagnostic()?
                }
                None => TravelPreferences {
                    actividad_preferida: actividad,
                    presupuesto,
                    clima_preferido: clima,
                    duracion,
                    tipo_grupo: grupo,
                },
            };

            let advisor = TravelAdvisor::from_config(&config)?;
            let advice = advisor.recommend(&prefs)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&advice).into_diagnostic()?
                );
            } else {
                print_advice(&advice, trace);
            }
        }

        Commands::Rules => {
            let advisor = TravelAdvisor::from_config(&config)?;
            let kb = advisor.knowledge();
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&kb.rules).into_diagnostic()?
                );
            } else {
                println!("{} v{} ({} rules)", kb.name, kb.version, kb.rules.len());
                for rule in &kb.rules.rules {
                    println!(
                        "  [{:>2}] {:<36} {} -> {} ({:.2})",
                        rule.priority,
                        rule.id,
                        rule.antecedents.join(" & "),
                        rule.consequent,
                        rule.confidence,
                    );
                }
            }
        }

        Commands::Destinations { id } => {
            let advisor = TravelAdvisor::from_config(&config)?;
            let catalog = advisor.catalog();
            match id {
                Some(id) => {
                    let dest = catalog.lookup(&id);
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&dest).into_diagnostic()?);
                    } else {
                        println!("{} {} ({})", dest.image, dest.name, dest.region);
                        println!("  {}", dest.description);
                        println!("  Activities:     {}", dest.activities.join(", "));
                        println!("  Climate:        {}", dest.climate.join(", "));
                        println!("  Altitude:       {}", dest.altitude);
                        println!("  Temperature:    {}", dest.avg_temperature);
                        println!("  Best months:    {}", dest.best_months.join(", "));
                        println!("  Accommodation:  {}", dest.accommodations);
                        println!("  Local food:     {}", dest.local_food);
                        println!("  Transport:      {}", dest.local_transport);
                    }
                }
                None => {
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(catalog.list()).into_diagnostic()?
                        );
                    } else {
                        for dest in catalog.list() {
                            println!("  {:<24} {} {}", dest.id, dest.image, dest.name);
                        }
                    }
                }
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn print_advice(advice: &Advice, trace: bool) {
    if trace {
        for line in &advice.execution_trace {
            println!("{line}");
        }
        println!();
    }

    println!(
        "Fired {} of {} rules in {} iterations ({}), {} ms",
        advice.fired_rules.len(),
        advice.total_rules,
        advice.iterations,
        advice.halt,
        advice.elapsed_ms,
    );

    if advice.recommendations.is_empty() {
        println!("No destination matches these preferences.");
        return;
    }

    for (rank, rec) in advice.recommendations.iter().enumerate() {
        println!(
            "{}. {} {} (score {:.0})",
            rank + 1,
            rec.destination.image,
            rec.destination.name,
            rec.recommendation.score,
        );
        for reason in &rec.recommendation.reasons {
            println!("     - {reason}");
        }
    }
}
