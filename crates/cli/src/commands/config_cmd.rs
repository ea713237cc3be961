//! `dossier config` — Configuration commands.

use dossier_config::AppConfig;

pub fn show_default() {
    println!("# {}", AppConfig::config_path().display());
    print!("{}", AppConfig::default_toml());
}

pub fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   Config parsed successfully");

            if config.has_api_key() {
                println!("   API key found");
            } else if !config.needs_api_key() {
                println!("   No API key needed for {}", config.llm.provider);
            } else {
                println!("   Warning: no API key set (DOSSIER_API_KEY, HUGGINGFACE_API_KEY, HF_TOKEN or OPENAI_API_KEY)");
            }

            println!();
            println!("   Provider:        {}", config.llm.provider);
            println!("   Model:           {}", config.llm.model);
            let endpoint = config
                .llm
                .api_url
                .as_deref()
                .or_else(|| dossier_providers::endpoint_for(&config.llm.provider));
            match endpoint {
                Some(url) => println!("   Endpoint:        {url}"),
                None => {
                    let err = dossier_core::ProviderError::NotConfigured(config.llm.provider.clone());
                    println!("   Endpoint error:  {err}");
                    return Err(err.into());
                }
            }
            println!("   Max iterations:  {}", config.agent.max_iterations);
            println!("   Model timeout:   {}s", config.llm.request_timeout_secs);
            println!("   Redacted terms:  {}", config.security.sensitive_terms.len());
            Ok(())
        }
        Err(e) => {
            println!("   Config error: {e}");
            Err(e.into())
        }
    }
}
