//! `viewcache render`: resolve one template through the cache and print it.

use viewcache_cache::Outcome;

use crate::setup::{build_engine, load_config};
use crate::{GlobalArgs, RenderArgs};

/// Runs the `viewcache render` command.
///
/// The template goes through the same hash and artifact checks as `warm`, so
/// with a durable store a second render reuses the stored artifact.
pub async fn run(args: &RenderArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let context = parse_context(args.data.as_deref())?;

    let engine = build_engine(&config).await?;
    let resolved = engine.resolve(&args.file).await?;
    if let Outcome::CompiledUnpersisted(e) = &resolved.outcome {
        if !global.quiet {
            eprintln!("warning: {}: compiled but not cached: {e}", args.file.display());
        }
    }

    print!("{}", resolved.template.render(&context));
    Ok(0)
}

/// Parses `--data`. An absent value renders with an empty object.
fn parse_context(data: Option<&str>) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    match data {
        None => Ok(serde_json::Value::Object(serde_json::Map::new())),
        Some(raw) => {
            let value: serde_json::Value = serde_json::from_str(raw)
                .map_err(|e| format!("--data is not valid JSON: {e}"))?;
            Ok(value)
        }
    }
}
