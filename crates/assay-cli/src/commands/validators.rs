//! Validators command implementation

use anyhow::Result;
use assay_test::{ValidatorEntry, ValidatorRegistry};
use serde::Serialize;

use crate::cli::{ValidatorsArgs, ValidatorsOutput};

/// Listing entry for one validator
#[derive(Debug, Serialize)]
struct ValidatorInfo {
    entity_type: String,
    name: String,
    runtime_parameters: bool,
}

impl From<&ValidatorEntry> for ValidatorInfo {
    fn from(entry: &ValidatorEntry) -> Self {
        Self {
            entity_type: entry.entity_type().to_string(),
            name: entry.name().to_string(),
            runtime_parameters: entry.requires_runtime_parameters(),
        }
    }
}

/// Execute the validators command
pub fn execute(args: &ValidatorsArgs) -> Result<()> {
    let registry = ValidatorRegistry::with_builtins();
    let infos: Vec<ValidatorInfo> = registry.entries().map(ValidatorInfo::from).collect();

    match args.output {
        ValidatorsOutput::Json => println!("{}", serde_json::to_string_pretty(&infos)?),
        ValidatorsOutput::Table => {
            for info in &infos {
                let marker = if info.runtime_parameters {
                    " (runtime params)"
                } else {
                    ""
                };
                println!("  {:<6} {}{marker}", info.entity_type, info.name);
            }
            println!("\n{} validators", infos.len());
        }
    }
    Ok(())
}
