//! `dossier run` — Single-instruction or interactive research mode.

use dossier_agent::{RunOptions, Workflow, WorkflowResult};
use dossier_config::AppConfig;
use dossier_core::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    max_iterations: Option<u32>,
    quiet: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| Error::Config {
        message: e.to_string(),
    })?;

    if config.needs_api_key() && !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    DOSSIER_API_KEY       (generic)");
        eprintln!("    HUGGINGFACE_API_KEY   (or HF_TOKEN, for the Hugging Face router)");
        eprintln!("    OPENAI_API_KEY        (for OpenAI-compatible endpoints)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let (generator, registry) = super::build_runtime(&config)?;
    let workflow = Workflow::from_config(generator, registry, &config);

    let options = RunOptions {
        max_iterations,
        verbose: Some(config.agent.verbose && !quiet),
    };

    if let Some(instruction) = message {
        let result = workflow.run(&instruction, options).await?;
        print_result(&result, json)?;
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Dossier — Interactive Mode");
    println!();
    println!("  Provider:  {}", config.llm.provider);
    println!("  Model:     {}", config.llm.model);
    println!("  Tools:     {}", workflow.registry().names().join(", "));
    println!();
    println!("  Type an instruction and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("  You > ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let instruction = line.trim();
        if instruction.is_empty() {
            continue;
        }
        if matches!(instruction, "exit" | "quit") {
            break;
        }

        match workflow.run(instruction, options).await {
            Ok(result) => print_result(&result, json)?,
            Err(e) => eprintln!("  Error: {e}"),
        }
    }

    Ok(())
}

fn print_result(result: &WorkflowResult, json: bool) -> dossier_core::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{}", result.text);
    eprintln!(
        "  [{} — {} iteration(s), {} tool call(s)]",
        result.terminal_reason, result.iterations, result.tool_calls
    );
    Ok(())
}
