//! 成分避免计划引擎 CLI
//!
//! 加载配置和规则目录后执行单个子命令，结果以 JSON 输出到 stdout。

use anyhow::{Context, Result};
use avoidance_engine::cli::{Cli, CommandRunner, Commands, read_input};
use avoidance_engine::{RuleCatalogue, RuleEngine};
use clap::Parser;
use nutrlens_shared::config::AppConfig;
use nutrlens_shared::observability;
use serde::Serialize;
use tracing::{info, warn};

const SERVICE_NAME: &str = "avoidance-engine";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name)
        .with_log_level(cli.log_level.as_deref());
    let _guard = observability::init(&obs_config)?;

    let catalogue = load_catalogue(&config)?;
    let stats = catalogue.stats();
    info!(
        health_rules = stats.health_rules,
        allergy_rules = stats.allergy_rules,
        "规则目录已加载"
    );

    let runner = CommandRunner::new(RuleEngine::new(catalogue))
        .with_history_limit(config.engine.history_limit);

    match cli.command {
        Commands::Plan {
            input,
            classify,
            strict,
        } => {
            let json = read_input(&input)?;
            let plan = runner.run_plan_json(&json, classify, strict)?;
            print_json(&plan)?;
        }
        Commands::Validate {
            conditions,
            allergies,
        } => {
            let validation = runner.run_validate(&conditions, &allergies);
            print_json(&validation)?;
            if !validation.valid {
                warn!(errors = validation.errors.len(), "健康档案校验未通过");
                std::process::exit(1);
            }
        }
        Commands::Catalogue => {
            print_json(&runner.run_catalogue())?;
        }
        Commands::Label { input } => {
            let text = read_input(&input)?;
            print_json(&runner.run_label(&text)?)?;
        }
        Commands::Session { input, limit } => {
            let json = read_input(&input)?;
            print_json(&runner.run_session_json(&json, limit).await?)?;
        }
    }

    Ok(())
}

fn load_catalogue(config: &AppConfig) -> Result<RuleCatalogue> {
    match &config.engine.catalogue_path {
        Some(path) => RuleCatalogue::from_file(path)
            .with_context(|| format!("加载规则目录失败: {}", path)),
        None => Ok(RuleCatalogue::builtin()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
