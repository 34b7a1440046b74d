use crate::cli::NormalizeArgs;
use crate::config::Config;
use crate::manager::SerializerManager;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;

pub fn execute(args: &NormalizeArgs) -> Result<()> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;
    let manager = SerializerManager::from_config(&config)?;

    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload '{}'", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            buffer
        }
    };
    let payload: Value = serde_json::from_str(&raw).context("Payload is not valid JSON")?;

    if args.array {
        let document = manager.extract_array(&args.type_key, payload)?;
        print_json(&document, args.pretty)
    } else {
        let document = manager.extract_single(&args.type_key, payload, args.id.as_deref())?;
        print_json(&document, args.pretty)
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}
