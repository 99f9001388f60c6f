//! recast command line
//!
//! Drives the three phases over a source tree: environment setup, the
//! dependency-ordered migration itself, and the generate/validate/run test
//! loop against the containerized target.

mod docker;
mod llm;

use anyhow::{bail, Context as _};
use clap::{value_parser, Arg, Command};
use recast_engine::{
    EnvironmentBuilder, MemoryStore, MigrationContext, MigrationOrchestrator, RetryPolicy,
    TestLifecycle,
};
use recast_fs::{build_directory_structure, detect_language};
use recast_llm::LlmConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Command::new("recast")
        .version("0.1.0")
        .about("LLM-driven codebase migration")
        .arg(
            Arg::new("llm-cmd")
                .long("llm-cmd")
                .required(true)
                .help("Completion command: prompt on stdin, completion on stdout"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .default_value("gemini/gemini-1.5-flash")
                .help("Model label exported to the completion command"),
        )
        .arg(
            Arg::new("temperature")
                .long("temperature")
                .default_value("0")
                .value_parser(value_parser!(f32))
                .help("Sampling temperature"),
        )
        .arg(
            Arg::new("sourcedir")
                .long("sourcedir")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Source directory containing the code to be migrated"),
        )
        .arg(
            Arg::new("sourcelang")
                .long("sourcelang")
                .help("Source language or framework (detected when omitted)"),
        )
        .arg(
            Arg::new("sourceentry")
                .long("sourceentry")
                .default_value("app.py")
                .help("Entrypoint filename relative to the source directory"),
        )
        .arg(
            Arg::new("targetdir")
                .long("targetdir")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory where the migrated code will live"),
        )
        .arg(
            Arg::new("targetlang")
                .long("targetlang")
                .default_value("nodejs")
                .help("Target language or framework"),
        )
        .arg(
            Arg::new("os")
                .long("os")
                .default_value("linux")
                .help("Operating system for the container manifest"),
        )
        .arg(
            Arg::new("testfiles")
                .long("testfiles")
                .default_value("app.py")
                .help("Comma-separated files whose behavior gets generated tests"),
        )
        .arg(
            Arg::new("sourceport")
                .long("sourceport")
                .value_parser(value_parser!(u16))
                .help("Port of the original app; enables test cross-validation"),
        )
        .arg(
            Arg::new("targetport")
                .long("targetport")
                .default_value("8080")
                .value_parser(value_parser!(u16))
                .help("Port the migrated app listens on"),
        )
        .arg(
            Arg::new("guidelines")
                .long("guidelines")
                .default_value("")
                .help("Stylistic guidelines followed during the migration"),
        )
        .arg(
            Arg::new("step")
                .long("step")
                .default_value("all")
                .value_parser(["setup", "migrate", "test", "all"])
                .help("Phase to run"),
        )
        .arg(
            Arg::new("max-attempts")
                .long("max-attempts")
                .default_value("10")
                .value_parser(value_parser!(u32))
                .help("Failures tolerated per repair loop before giving up"),
        )
        .arg(
            Arg::new("readiness-pause-secs")
                .long("readiness-pause-secs")
                .default_value("1")
                .value_parser(value_parser!(u64))
                .help("Pause before re-probing a restarted environment"),
        );

    let matches = cli.get_matches();

    let source_dir = matches
        .get_one::<PathBuf>("sourcedir")
        .expect("required")
        .canonicalize()
        .context("source directory does not exist")?;
    let target_dir = matches.get_one::<PathBuf>("targetdir").expect("required");
    std::fs::create_dir_all(target_dir).context("failed to create target directory")?;
    let target_dir = target_dir
        .canonicalize()
        .context("target directory does not exist")?;

    let source_lang = match matches.get_one::<String>("sourcelang") {
        Some(lang) => lang.clone(),
        None => match detect_language(&source_dir) {
            Some(lang) => {
                tracing::info!(lang, "detected source language");
                lang
            }
            None => bail!("unable to detect the source language; pass --sourcelang"),
        },
    };

    let source_entry = matches.get_one::<String>("sourceentry").expect("default");
    if !source_dir.join(source_entry).exists() {
        bail!("entrypoint {source_entry} not found under {}", source_dir.display());
    }

    let config = LlmConfig {
        model: matches.get_one::<String>("model").expect("default").clone(),
        temperature: *matches.get_one::<f32>("temperature").expect("default"),
        ..LlmConfig::default()
    };
    let llm = Arc::new(llm::CommandLlm::new(
        matches.get_one::<String>("llm-cmd").expect("required").clone(),
        config,
    ));

    let source_tree = build_directory_structure(&source_dir);
    let target_port = *matches.get_one::<u16>("targetport").expect("default");
    let test_files: Vec<String> = matches
        .get_one::<String>("testfiles")
        .expect("default")
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    let ctx = MigrationContext::new(&source_dir, &target_dir, llm)
        .with_languages(
            source_lang,
            matches.get_one::<String>("targetlang").expect("default").clone(),
        )
        .with_entry(source_entry.clone())
        .with_source_tree(source_tree)
        .with_test_files(test_files)
        .with_ports(matches.get_one::<u16>("sourceport").copied(), target_port)
        .with_guidelines(matches.get_one::<String>("guidelines").expect("default").clone())
        .with_operating_system(matches.get_one::<String>("os").expect("default").clone());

    tracing::info!(
        source = %source_dir.display(),
        target = %target_dir.display(),
        entry = %ctx.source_entry,
        "reading {} project, outputting {}",
        ctx.source_lang,
        ctx.target_lang
    );

    let step = matches.get_one::<String>("step").expect("default").as_str();
    let policy = RetryPolicy {
        max_attempts: *matches.get_one::<u32>("max-attempts").expect("default"),
        readiness_pause: Duration::from_secs(
            *matches.get_one::<u64>("readiness-pause-secs").expect("default"),
        ),
    };

    if matches!(step, "setup" | "all") {
        EnvironmentBuilder::new(&ctx).create_environment().await?;
    }

    if matches!(step, "migrate" | "all") {
        let memory = MemoryStore::open(&ctx.memory_dir)?;
        let mut orchestrator = MigrationOrchestrator::new(&ctx, &memory);
        orchestrator.migrate_entry().await?;
        tracing::info!(files = orchestrator.files_visited(), "migration finished");
        EnvironmentBuilder::new(&ctx).add_env_files(&memory).await?;
    }

    if matches!(step, "test" | "all") {
        let runtime = docker::DockerRuntime::new(target_port);
        let results = TestLifecycle::new(&ctx, &runtime, policy).run().await?;
        println!("{}", serde_json::to_string_pretty(&results)?);
        println!("All tests complete.");
    }

    Ok(())
}
