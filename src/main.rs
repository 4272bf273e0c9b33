// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::env;
use std::time::{Duration, Instant};

use flowlet::config::{load_config, Config, ParameterValues};
use flowlet::demo::{branching_workflow, template_workflow};
use flowlet::engine::{compile, compile_graph_description, ReactiveExecutor, RunContext};
use flowlet::observability::init_tracing;
use flowlet::workflow::Workflow;

/// Command line options
struct CliArgs {
    config_file: Option<String>,
    print_graph: bool,
    template: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs {
        config_file: None,
        print_graph: false,
        template: false,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config requires a file path")?;
                cli.config_file = Some(path.clone());
            }
            "--graph" => cli.print_graph = true,
            "--template" => cli.template = true,
            other => bail!("unknown argument '{}'", other),
        }
    }

    Ok(cli)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [--config <file.yaml|file.toml>] [--graph] [--template]", program);
    eprintln!("  --config    executor and logging options");
    eprintln!("  --graph     print the compiled graph as JSON instead of running it");
    eprintln!("  --template  run the processing template instead of the branching example");
    eprintln!("Parameters are read from WORKFLOW_PARAM as a JSON object, e.g.");
    eprintln!("  WORKFLOW_PARAM='{{\"a\": 3, \"b\": -1}}' {}", program);
}

/// Parameters used when WORKFLOW_PARAM is not set
fn default_params(template: bool) -> ParameterValues {
    if template {
        ParameterValues::new()
            .with("input_data", "hello world")
            .with("config", json!({}))
            .with("threshold", 10)
    } else {
        ParameterValues::new().with("a", 3).with("b", -1)
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("❌ {}", e);
            print_usage(args.first().map_or("flowlet", String::as_str));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CliArgs) -> Result<()> {
    let config = match &cli.config_file {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path))?,
        None => Config::default(),
    };
    init_tracing(&config.logging);

    let workflow: Workflow = if cli.template {
        template_workflow()
    } else {
        branching_workflow(Duration::from_secs(1))
    };

    if cli.print_graph {
        let description = compile_graph_description(&workflow)?;
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }

    let params = ParameterValues::from_env()?.unwrap_or_else(|| default_params(cli.template));
    let graph = compile(&workflow)?;
    let executor = ReactiveExecutor::from_config(&config);

    println!("🚀 flowlet: workflow '{}'", graph.workflow());
    println!("═══════════════════════════════════");
    if let Some(path) = &cli.config_file {
        println!("📋 Configuration: {}", path);
    }
    println!("⚙️  Max Concurrency: {}", executor.max_concurrency());
    println!("🔢 Nodes: {}", graph.len());
    println!("📥 Parameters: {}", serde_json::to_string(&params)?);

    let start = Instant::now();
    match executor.run(&graph, params).await {
        Ok((ctx, output)) => {
            print_context(&ctx);
            println!("\n🎯 Final Output: {}", output.map_or_else(|| "(none)".to_string(), |v| v.to_string()));
        }
        Err(failure) => {
            print_context(&failure.context);
            println!("\n❌ Run failed: {}", failure.error);
            println!("⏱️  Total Time: {:?}", start.elapsed());
            bail!("workflow '{}' failed", graph.workflow());
        }
    }

    println!("⏱️  Total Time: {:?}", start.elapsed());
    Ok(())
}

fn print_context(ctx: &RunContext) {
    println!("\n📊 Execution Results:");
    println!("🔖 Trace ID: {}", ctx.trace_id());
    println!("🔖 Run ID:   {}", ctx.run_id());
    println!("⏱️  Elapsed: {:.3}s", ctx.elapsed().as_secs_f64());

    println!("\n🔄 Node Timings:");
    for (node, timing) in ctx.timings() {
        println!("  • {}: {:.3}s", node, timing.as_secs_f64());
    }

    if !ctx.skipped().is_empty() {
        println!("\n⏭️  Skipped Nodes:");
        for (node, reason) in ctx.skipped() {
            println!("  • {}: {}", node, reason);
        }
    }

    if !ctx.logs().is_empty() {
        println!("\n📝 Logs:");
        for entry in ctx.logs() {
            println!("  {}", entry);
        }
    }

    println!("\n📦 Terminal Outputs:");
    for (node, outputs) in ctx.outputs() {
        for (name, value) in outputs {
            println!("  • {}.{} = {}", node, name, value);
        }
    }
}
