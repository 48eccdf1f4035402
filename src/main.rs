use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use blkcat_store_lib::modules::ordering::HasMachineId;
use blkcat_store_lib::modules::storage::FileStorage;
use blkcat_store_lib::state::Preferences;
use blkcat_store_lib::{Result, ServerConfig, StoreConfig, StoreError};

#[derive(Parser)]
#[command(name = "blkcat-store", about = "Inspect and edit blkcat monitor preferences")]
struct Cli {
    /// Configuration directory (defaults to $BLKCAT_CONFIG_DIR or ~/.blkcat)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Machine and session display names
    Names {
        #[command(subcommand)]
        action: NamesAction,
    },
    /// Saved views
    Views {
        #[command(subcommand)]
        action: ViewsAction,
    },
    /// Saved agent addresses
    Agents {
        #[command(subcommand)]
        action: AgentsAction,
    },
    /// Machine display order
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Effective server configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum NamesAction {
    Show,
    SetMachine { machine_id: String, label: String },
    SetSession { machine_id: String, session_id: String, label: String },
}

#[derive(Subcommand)]
enum ViewsAction {
    List,
}

#[derive(Subcommand)]
enum AgentsAction {
    List,
    Add { address: String },
    Remove { address: String },
}

#[derive(Subcommand)]
enum OrderAction {
    Show,
    Set { machine_ids: Vec<String> },
    /// Print the given machine ids in display order
    Sort { machine_ids: Vec<String> },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
}

struct MachineArg(String);

impl HasMachineId for MachineArg {
    fn machine_id(&self) -> &str {
        &self.0
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to render output: {}", e),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = StoreConfig::resolve(cli.config_dir)?;
    log::debug!("Using config directory {:?}", config.config_dir);

    match cli.command {
        Command::Names { action } => {
            let store = config.display_names();
            let mut names = store.load().await;
            match action {
                NamesAction::Show => print_json(&names),
                NamesAction::SetMachine { machine_id, label } => {
                    names.set_machine_name(&machine_id, &label);
                    store.save(&names).await?;
                }
                NamesAction::SetSession {
                    machine_id,
                    session_id,
                    label,
                } => {
                    names.set_session_name(&machine_id, &session_id, &label);
                    store.save(&names).await?;
                }
            }
        }
        Command::Views {
            action: ViewsAction::List,
        } => {
            for view in config.views().load().await {
                println!("{}\t{}\t{} panes", view.id, view.name, view.panes.len());
            }
        }
        Command::Agents { action } => {
            let store = config.agents();
            let mut agents = store.load().await;
            match action {
                AgentsAction::List => agents.iter().for_each(|a| println!("{}", a)),
                AgentsAction::Add { address } => {
                    if !agents.contains(&address) {
                        agents.push(address);
                        store.save(&agents).await?;
                    }
                }
                AgentsAction::Remove { address } => {
                    agents.retain(|a| a != &address);
                    store.save(&agents).await?;
                }
            }
        }
        Command::Order { action } => {
            let storage = Arc::new(FileStorage::new(config.local_storage_path()));
            let prefs = Preferences::new(storage, None);
            match action {
                OrderAction::Show => prefs.machine_order.order().iter().for_each(|id| println!("{}", id)),
                OrderAction::Set { machine_ids } => {
                    prefs.machine_order.set_machine_order(machine_ids.clone());
                    let stored = prefs.machine_order.persisted_order()?;
                    if stored != machine_ids {
                        return Err(StoreError::storage(format!(
                            "machine order was not saved to {}",
                            config.local_storage_path().display()
                        )));
                    }
                    stored.iter().for_each(|id| println!("{}", id));
                }
                OrderAction::Sort { machine_ids } => {
                    let machines = machine_ids.into_iter().map(MachineArg).collect();
                    for machine in prefs.machine_order.ordered_machines(machines) {
                        println!("{}", machine.0);
                    }
                }
            }
        }
        Command::Config {
            action: ConfigAction::Show,
        } => print_json(&ServerConfig::load(&config.config_dir).await),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
