//! CLI interface for the incident desk.
//!
//! `list` and `show` are one-shot: arguments in, output out. `console` opens
//! an interactive session for the multi-step publish and feedback flows.
//!
//! Incidents are generated per run. Pass the same `--seed` to `list` and
//! `show` to see the same incidents.

mod console;
mod format;

use std::io;

use clap::{Parser, Subcommand};
use jiff::Timestamp;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::catalog::{Catalog, IncidentFilter, paginate};
use crate::config::Config;
use crate::credentials;
use crate::draft::{self, ChatDrafter, Drafter, TemplateDrafter};
use crate::model::{IncidentKind, IncidentState, Severity};

use format::{format_incident_detail, format_incident_table, format_summary};

/// Incident desk: triage incidents and publish customer communications.
#[derive(Debug, Parser)]
#[command(name = "incident-desk", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Seed for the generated incidents. Overrides `seed` in the config.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Chat-completion API key for AI drafts.
    /// Falls back to `PERPLEXITY_API_KEY`, then the config file.
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: communicating an incident
  1. incident-desk --seed 7 list --severity critical --state open
  2. incident-desk --seed 7 show INC-4821
  3. incident-desk --seed 7 console
       open INC-4821
       message generate
       message select Status Page, Email
       message publish
       message publish yes";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List incidents, one page at a time.
    ///
    /// Filters combine with AND; repeating a filter matches any of its values.
    List {
        /// Only these severities (critical, high, medium, low).
        #[arg(long)]
        severity: Vec<Severity>,

        /// Only these states (open, in-progress, resolved, closed).
        #[arg(long)]
        state: Vec<IncidentState>,

        /// Only incidents owned by these services.
        #[arg(long)]
        service: Vec<String>,

        /// Only these incident types (external, internal).
        #[arg(long = "type")]
        kind: Vec<IncidentKind>,

        /// Page number, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Print the page as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show an incident: essentials, summary, drafts, and postmortems.
    Show {
        /// Incident ID, e.g. `INC-4821`. Case-insensitive.
        id: String,
    },

    /// Interactive session for drafting, publishing, and feedback.
    Console,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    let seed = cli.seed.or(config.seed).unwrap_or_else(rand::random);
    let catalog = Catalog::generate(
        config.incident_count,
        Timestamp::now(),
        &mut StdRng::seed_from_u64(seed),
    );
    info!(seed, count = catalog.incidents().len(), "incidents generated");

    match cli.command {
        Command::List {
            severity,
            state,
            service,
            kind,
            page,
            json,
        } => {
            let filter = IncidentFilter {
                severities: severity,
                states: state,
                services: service,
                kinds: kind,
            };
            if cli.seed.is_none() && config.seed.is_none() {
                eprintln!("Seed {seed}: pass --seed {seed} to see these incidents again");
            }
            cmd_list(&catalog, &filter, page, config.page_size, json)
        }
        Command::Show { id } => {
            let drafter = build_drafter(config, cli.api_key.as_deref())?;
            cmd_show(&catalog, &id, drafter.as_ref(), &template_drafter(config))
        }
        Command::Console => {
            let drafter = build_drafter(config, cli.api_key.as_deref())?;
            let channels = config
                .channel_selection()
                .map_err(|e| format!("invalid channel config: {e}"))?;
            let mut console =
                console::Console::new(catalog, channels, config.page_size, drafter);
            console::run(&mut console, io::stdin().lock(), io::stdout().lock())
                .map_err(|e| format!("console I/O failed: {e}"))
        }
    }
}

/// The AI drafter when a key resolves, the offline template otherwise.
fn build_drafter(config: &Config, api_key: Option<&str>) -> Result<Box<dyn Drafter>, String> {
    match credentials::resolve_api_key(api_key, &config.drafting) {
        Some(key) => {
            let drafter = ChatDrafter::new(&config.drafting, key)
                .map_err(|e| format!("failed to set up AI drafting: {e}"))?;
            Ok(Box::new(drafter))
        }
        None => {
            info!("no API key configured, drafting from templates");
            Ok(Box::new(template_drafter(config)))
        }
    }
}

fn template_drafter(config: &Config) -> TemplateDrafter {
    TemplateDrafter {
        status_page_url: config.status_page_url.clone(),
        team_name: config.team_name.clone(),
    }
}

fn cmd_list(
    catalog: &Catalog,
    filter: &IncidentFilter,
    page: usize,
    page_size: usize,
    json: bool,
) -> Result<(), String> {
    let matches = catalog.filter(filter);
    let page = paginate(&matches, page, page_size);

    if json {
        let json = serde_json::to_string_pretty(&page)
            .map_err(|e| format!("failed to serialize incidents: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", format_incident_table(&page));
    }
    Ok(())
}

fn cmd_show(
    catalog: &Catalog,
    id: &str,
    drafter: &dyn Drafter,
    fallback: &TemplateDrafter,
) -> Result<(), String> {
    let incident = catalog
        .find(id)
        .ok_or_else(|| format!("no incident '{id}' (incidents depend on --seed)"))?;

    println!("{}", format_incident_detail(incident));
    println!();
    println!("{}", format_summary(&draft::mock_summary(incident)));
    println!();

    let message = match drafter.draft(incident) {
        Ok(text) if !text.trim().is_empty() => text,
        result => {
            let error = result.err().map_or_else(|| "empty reply".to_string(), |e| e.to_string());
            warn!(incident = %incident.id, %error, "AI draft unavailable, showing template");
            eprintln!("AI draft unavailable; showing the template draft.");
            fallback.draft(incident).unwrap_or_default()
        }
    };
    println!("Customer message draft:\n\n{}", message.trim_end());
    println!();
    println!(
        "Customer postmortem:\n\n{}",
        draft::customer_postmortem(incident).trim_end()
    );
    println!();
    println!(
        "Internal postmortem:\n\n{}",
        draft::internal_postmortem(incident).trim_end()
    );
    Ok(())
}
