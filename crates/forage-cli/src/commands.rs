use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use forage_sdk::{Forage, SharedTable, StoreConfig};
use forage_store::key_prefix;
use serde_json::{json, Value};

use crate::cli::*;
use crate::script::{parse_script, Op, Step, StoreRef};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args, cli.format).await,
        Command::Prefix(args) => cmd_prefix(args, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StoreConfig> {
    let Some(path) = path else {
        return Ok(StoreConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    StoreConfig::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

async fn cmd_run(args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let base = load_config(args.config.as_deref())?;
    let script = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let steps = parse_script(&script, args.strict)?;

    let table = SharedTable::new();
    let mut stores: HashMap<StoreRef, Forage> = HashMap::new();
    for step in &steps {
        let forage = stores
            .entry(step.store.clone())
            .or_insert_with(|| Forage::create_instance(&table, step.store.config(&base)));
        let output = execute(forage, &step.op).await?;
        print_step(step, &output, format);
    }

    if format == OutputFormat::Text {
        println!(
            "{} {} steps, {} stores, {} entries in table",
            "✓".green().bold(),
            steps.len(),
            stores.len(),
            table.len()
        );
    }
    Ok(())
}

/// Run one operation and describe its result as JSON.
pub async fn execute(forage: &Forage, op: &Op) -> anyhow::Result<Value> {
    let output = match op {
        Op::Set { key, value } => forage.set_item(key, value.clone()).await?,
        Op::Unset { key } => forage.set_undefined(key).await?,
        Op::Get { key } => match forage.get_item(key).await? {
            Some(value) => value,
            None => json!({ "undefined": true }),
        },
        Op::Remove { key } => {
            forage.remove_item(key).await?;
            Value::Null
        }
        Op::Clear => {
            forage.clear().await?;
            Value::Null
        }
        Op::Keys => json!(forage.keys().await?),
        Op::Length => json!(forage.length().await?),
        Op::Key { n } => json!(forage.key(*n).await?),
        Op::Iterate => {
            let mut entries = Vec::new();
            forage
                .iterate(|value, key, n| {
                    entries.push(json!({ "n": n, "key": key, "value": value }));
                    None
                })
                .await?;
            Value::Array(entries)
        }
    };
    Ok(output)
}

fn print_step(step: &Step, output: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let record = json!({
                "line": step.line,
                "store": step.store.label(),
                "op": step.op.name(),
                "result": output,
            });
            println!("{record}");
        }
        OutputFormat::Text => {
            let result = match (&step.op, output) {
                (Op::Remove { .. } | Op::Clear, _) => "ok".green().to_string(),
                (Op::Iterate, Value::Array(entries)) => format!("{} entries", entries.len()),
                (_, value) => value.to_string(),
            };
            println!(
                "{:>4} {} {} {}",
                step.line.to_string().dimmed(),
                step.store.label().cyan(),
                step.op.name().yellow(),
                result
            );
            if let (Op::Iterate, Value::Array(entries)) = (&step.op, output) {
                for entry in entries {
                    println!(
                        "       {} {} = {}",
                        format!("#{}", entry["n"]).dimmed(),
                        entry["key"].as_str().unwrap_or_default().bold(),
                        entry["value"]
                    );
                }
            }
        }
    }
}

fn cmd_prefix(args: PrefixArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = args.name {
        config.name = name;
    }
    if let Some(store_name) = args.store_name {
        config.store_name = store_name;
    }
    let prefix = key_prefix(&config);
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "name": config.name, "storeName": config.store_name, "keyPrefix": prefix })
        ),
        OutputFormat::Text => println!("{}", prefix.bold()),
    }
    Ok(())
}
