use crate::cli::CheckArgs;
use crate::config::Config;
use crate::manager::SerializerManager;
use crate::schema::RelationshipKind;
use anyhow::{Context, Result};

pub fn execute(args: &CheckArgs) -> Result<()> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Invalid config '{}'", args.config.display()))?;
    let manager = SerializerManager::from_config(&config)?;

    println!("=== Models ===\n");

    for model in manager.schema().models() {
        match model.parent() {
            Some(parent) => println!("{} (extends {})", model.type_key(), parent),
            None => println!("{}", model.type_key()),
        }

        if !args.verbose {
            continue;
        }

        println!("  attributes: {}", model.attributes().join(", "));
        let serializer = manager.serializer_for(model.type_key());
        for relationship in model.relationships() {
            let kind = match relationship.kind {
                RelationshipKind::BelongsTo => "belongsTo",
                RelationshipKind::HasMany => "hasMany",
            };
            let mut flags = Vec::new();
            if relationship.polymorphic {
                flags.push("polymorphic".to_string());
            }
            if let Some(mode) = serializer
                .embedded()
                .and_then(|embedded| embedded.mode_for(&relationship.key))
            {
                flags.push(format!("embedded: {:?}", mode).to_lowercase());
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            println!(
                "  {} {}('{}'){}",
                relationship.key, kind, relationship.related_type, flags
            );
        }
        println!();
    }

    println!("Configuration OK.");
    Ok(())
}
