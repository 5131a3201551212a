use anyhow::Result;
use cloudkey_core::profile::env::{ACCESS_KEY_ID_VAR, SECRET_ACCESS_KEY_VAR};
use cloudkey_core::{
    Credential, CredentialStore, EnvStore, ProcessEnv, ProfileResolver, RotationEngine,
    RotationReport, Source,
};
use colored::Colorize;
use std::sync::Arc;

use crate::cli::RotateArgs;
use crate::config::CliConfig;
use crate::output::{VISIBLE_KEY_CHARS, obfuscate};

pub async fn run(args: RotateArgs, config: &CliConfig) -> Result<()> {
    let env: Arc<dyn EnvStore> = Arc::new(ProcessEnv);
    let store_config = config.store(env.as_ref())?;

    let engine = RotationEngine::new(
        ProfileResolver::new(&store_config, env.clone()),
        CredentialStore::new(&store_config, env),
        Arc::new(config.session_factory()),
        config.rotation(),
    );

    if args.profile.is_none() {
        println!("Rotating the access key of the current profile...");
    }
    let report = engine.rotate(args.profile.as_deref()).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &RotationReport) {
    let profile = match report.source {
        Source::EnvironmentVariable => "(environment)",
        Source::ConfigFile => report.profile_name.as_str(),
    };

    println!(
        "{} Rotated access key for {}",
        "✓".green().bold(),
        report.user_name.bold()
    );
    println!("Profile:   {}", profile);
    println!("Source:    {}", report.source);
    println!(
        "Old key:   {} (deleted)",
        obfuscate(&report.old_access_key_id, VISIBLE_KEY_CHARS)
    );
    println!(
        "New key:   {}",
        obfuscate(&report.new_access_key_id, VISIBLE_KEY_CHARS)
    );

    if report.source == Source::EnvironmentVariable {
        println!();
        println!(
            "{}",
            "The new key only replaced the variables of this process. Update your shell with:"
                .yellow()
        );
        for line in export_lines(&report.new_credential) {
            println!("  {line}");
        }
    }
}

fn export_lines(credential: &Credential) -> [String; 2] {
    [
        format!("export {}={}", ACCESS_KEY_ID_VAR, credential.access_key_id),
        format!("export {}={}", SECRET_ACCESS_KEY_VAR, credential.secret_access_key),
    ]
}
