use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::cli::OutputFormat;
use crate::registry::AccessionRegistry;

#[derive(Args)]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub command: RegistryCommands,
}

#[derive(Subcommand)]
pub enum RegistryCommands {
    /// List accessions and their indices
    Show {
        /// Registry snapshot prefix (usually the store path)
        #[arg(required = true)]
        prefix: PathBuf,

        /// Look up a single accession
        #[arg(long)]
        accession: Option<String>,
    },
}

/// Execute registry subcommand
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or an accession is unknown.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RegistryArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        RegistryCommands::Show { prefix, accession } => {
            let registry = AccessionRegistry::from_snapshot(&prefix, 0)
                .with_context(|| format!("Failed to load registry {}", prefix.display()))?;

            let entries: Vec<(&str, i32)> = match accession.as_deref() {
                Some(wanted) => {
                    let entry = registry
                        .iter()
                        .find(|(a, _)| *a == wanted)
                        .ok_or_else(|| anyhow::anyhow!("Accession '{wanted}' not in registry"))?;
                    vec![entry]
                }
                None => {
                    let mut all: Vec<_> = registry.iter().collect();
                    all.sort_by_key(|(_, index)| *index);
                    all
                }
            };
            print_entries(&entries, registry.len(), format)
        }
    }
}

fn print_entries(entries: &[(&str, i32)], total: usize, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = entries
                .iter()
                .map(|(a, i)| ((*a).to_string(), serde_json::Value::from(*i)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Tsv => {
            println!("index\taccession");
            for (accession, index) in entries {
                println!("{index}\t{accession}");
            }
        }
        OutputFormat::Text => {
            println!("{:<10} ACCESSION", "INDEX");
            for (accession, index) in entries {
                println!("{index:<10} {accession}");
            }
            println!("\n{total} accessions in registry");
        }
    }
    Ok(())
}
