//! entity-inspect: load a risk entity source, run the check pass and print
//! a JSON summary followed by the warnings.
//!
//! Usage:
//!   entity-inspect
//!   entity-inspect --file demo_today.mat --description "demo run"
//!   entity-inspect --data-dir ./data

use anyhow::{Context, Result};
use entity_core::{config, Entity, Loader};
use std::env;
use std::path::PathBuf;

#[derive(serde::Serialize)]
struct Summary {
    files:        Vec<String>,
    descriptions: Vec<String>,
    exposures:    ExposuresSummary,
    impact_funcs: Vec<FuncSummary>,
    measures:     Vec<String>,
    discounts:    DiscountSummary,
}

#[derive(serde::Serialize)]
struct ExposuresSummary {
    assets:      usize,
    ref_year:    i32,
    value_unit:  String,
    total_value: f64,
}

#[derive(serde::Serialize)]
struct FuncSummary {
    haz_type: String,
    ids:      Vec<i64>,
}

#[derive(serde::Serialize)]
struct DiscountSummary {
    years:      usize,
    first_year: Option<i64>,
    last_year:  Option<i64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let file = parse_arg(&args, "--file").map(PathBuf::from);
    let description = parse_arg(&args, "--description");

    if let Some(data_dir) = parse_arg(&args, "--data-dir") {
        let loaded = config::Config::load(data_dir)
            .with_context(|| format!("loading configuration from {data_dir}"))?;
        config::init(loaded)?;
    }

    let file = file.unwrap_or_else(|| config::global().paths.entity_default.clone());
    log::info!("Inspecting {}", file.display());

    let mut entity = Entity::default();
    let warnings = entity
        .load(&file, description)
        .with_context(|| format!("loading {}", file.display()))?;

    println!("{}", serde_json::to_string_pretty(&summarize(&entity))?);
    for warning in &warnings {
        println!("warning: {warning}");
    }
    Ok(())
}

fn summarize(entity: &Entity) -> Summary {
    let mut files = Vec::new();
    let mut descriptions = Vec::new();
    for tag in entity.tags() {
        for name in &tag.file_name {
            if !files.contains(name) {
                files.push(name.clone());
            }
        }
        for text in &tag.description {
            if !descriptions.contains(text) {
                descriptions.push(text.clone());
            }
        }
    }

    let exposures = entity.exposures();
    let funcs = entity.impact_funcs();
    let discounts = entity.discounts();
    Summary {
        files,
        descriptions,
        exposures: ExposuresSummary {
            assets:      exposures.len(),
            ref_year:    exposures.ref_year,
            value_unit:  exposures.value_unit.clone(),
            total_value: exposures.value.iter().sum(),
        },
        impact_funcs: funcs
            .haz_types()
            .into_iter()
            .map(|haz_type| FuncSummary { haz_type: haz_type.to_string(), ids: funcs.ids(haz_type) })
            .collect(),
        measures: entity.measures().names().into_iter().map(str::to_string).collect(),
        discounts: DiscountSummary {
            years:      discounts.years.len(),
            first_year: discounts.years.iter().min().copied(),
            last_year:  discounts.years.iter().max().copied(),
        },
    }
}

fn parse_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
