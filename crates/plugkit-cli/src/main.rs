use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use plugkit_core::analyzer::{Analyzer, ArtifactKind};
use plugkit_core::audit::{self, AuditOptions, AuditSummary, PluginAudit};
use plugkit_core::config::Config;
use plugkit_core::generator::Generator;
use plugkit_core::manifest::{self, SchemaKind};
use plugkit_core::skills;
use plugkit_core::{PlugkitError, Result};

mod args;
use args::{Cli, Commands, ConfigAction, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let base_dir = resolve_base_dir(cli.base_dir);

    let result = match cli.command {
        Some(Commands::Analyze { path }) => handle_analyze(&base_dir, &path),
        Some(Commands::ValidateMarketplace { file }) => {
            handle_validate(&file, SchemaKind::Marketplace)
        }
        Some(Commands::ValidatePlugin { file }) => handle_validate(&file, SchemaKind::Plugin),
        Some(Commands::Generate {
            path,
            name,
            owner,
            author,
        }) => handle_generate(&base_dir, &path, &name, owner, author),
        Some(Commands::Check { dir, plugin }) => {
            handle_check(&base_dir, &dir, plugin.as_deref(), cli.verbose)
        }
        Some(Commands::SyncSkills { dir, dry_run }) => handle_sync_skills(&dir, dry_run),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "plugkit_core=debug,info"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "plugkit", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("PLUGKIT_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".plugkit"))
        .unwrap_or_else(|| PathBuf::from(".plugkit"))
}

fn handle_analyze(base_dir: &Path, path: &Path) -> Result<()> {
    let config = Config::load(base_dir)?;
    let analyzer = Analyzer::new(&config.analyzer)?;
    let analysis = analyzer.analyze(path)?;

    println!("Analyzing .claude directory in: {}", path.display());
    println!("{}", "-".repeat(50));

    if !analysis.exists {
        println!();
        println!("Nothing to analyze: {} does not exist.", analysis.root.display());
    }

    for kind in ArtifactKind::ALL {
        let heading = match kind {
            ArtifactKind::Command => "Commands",
            ArtifactKind::Agent => "Agents",
            ArtifactKind::Hook => "Hooks",
        };
        println!();
        println!("{} found: {}", heading.bold(), analysis.total.get(kind));
        for (category, items) in analysis.grouped(kind) {
            println!("  [{}]", category.cyan());
            for item in items {
                println!("    - {} ({} bytes)", item.name, item.size);
            }
        }
    }

    if !analysis.categories.is_empty() {
        println!();
        println!("{}", "By category:".bold());
        for (category, counts) in &analysis.categories {
            println!(
                "  {:<30} commands: {:>3}  agents: {:>3}  hooks: {:>3}",
                category.cyan(),
                counts.commands,
                counts.agents,
                counts.hooks
            );
        }
    }

    println!();
    println!(
        "Total: {} commands, {} agents, {} hooks ({} artifacts)",
        analysis.total.commands,
        analysis.total.agents,
        analysis.total.hooks,
        analysis.total.total()
    );

    Ok(())
}

fn handle_validate(file: &Path, kind: SchemaKind) -> Result<()> {
    println!("Validating {} manifest: {}", kind, file.display());

    let report = manifest::validate_file(file, kind)?;

    for name in &report.duplicate_plugins {
        println!(
            "{} plugin name '{}' appears more than once",
            "[WARN]".yellow(),
            name
        );
    }

    if report.is_valid() {
        println!("{} {} manifest is valid!", "✓".green(), capitalize(&kind.to_string()));
        return Ok(());
    }

    println!("{} Validation failed:", "✗".red());
    for violation in &report.violations {
        println!("  - {}", violation);
    }

    Err(PlugkitError::ValidationFailed {
        count: report.violations.len(),
    })
}

fn handle_generate(
    base_dir: &Path,
    path: &Path,
    name: &str,
    owner: Option<String>,
    author: Option<String>,
) -> Result<()> {
    let mut defaults = Config::load(base_dir)?.generator;
    if let Some(owner) = owner {
        defaults.owner_name = owner;
    }
    if let Some(author) = author {
        defaults.author_name = author;
    }

    println!("Generating marketplace structure at: {}", path.display());
    println!("Marketplace name: {}", name);

    let generated = Generator::new(defaults).generate(path, name)?;

    println!();
    println!("{} Marketplace structure created successfully!", "✓".green());
    println!("  - Marketplace: {}", generated.root.display());
    println!("  - Plugin config: {}", generated.marketplace_path.display());
    println!(
        "  - Sample plugin: {} ({} v{})",
        generated.plugin_path.display(),
        generated.plugin.name.cyan(),
        generated.plugin.version
    );

    Ok(())
}

fn handle_check(base_dir: &Path, dir: &Path, plugin: Option<&str>, verbose: bool) -> Result<()> {
    let config = Config::load(base_dir)?;
    let options = AuditOptions::new(&config.audit, verbose);

    println!("{}", "=== Claude Code Plugin Validator ===".bold());
    println!();

    let audits = audit::audit_plugins(dir, plugin, &options)?;
    println!("Validating {} plugin(s)...", audits.len());

    for audit in &audits {
        print_audit(audit, verbose);
    }

    let summary = AuditSummary::from_audits(&audits);
    println!();
    println!("{}", "=".repeat(60).bold());
    println!("{}", "Overall Summary".bold());
    println!("{}", "=".repeat(60).bold());
    println!();
    println!("Total Plugins: {}", summary.plugins);
    println!("{}", format!("Total Errors: {}", summary.errors).red());
    println!("{}", format!("Total Warnings: {}", summary.warnings).yellow());
    println!("Average Score: {:.1}/100", summary.average_score);

    println!();
    println!("{}", "Plugins by Score:".bold());
    let mut ranked: Vec<&PluginAudit> = audits.iter().collect();
    ranked.sort_by(|a, b| b.score().cmp(&a.score()));
    for audit in ranked {
        let score = format!("{:>3}/100", audit.score());
        println!("  {:<30} {}", audit.plugin, color_score(audit.score(), &score));
    }

    if summary.errors > 0 {
        return Err(PlugkitError::ValidationFailed {
            count: summary.errors,
        });
    }
    Ok(())
}

fn print_audit(audit: &PluginAudit, verbose: bool) {
    println!();
    println!("{}", "=".repeat(60).bold());
    println!("{}", format!("Plugin: {}", audit.plugin).bold());
    println!("{}", "=".repeat(60).bold());

    if !audit.errors.is_empty() {
        println!();
        println!("{}", format!("Errors ({}):", audit.errors.len()).red().bold());
        for error in &audit.errors {
            println!("  {} {}", "•".red(), error);
        }
    }

    if !audit.warnings.is_empty() {
        println!();
        println!(
            "{}",
            format!("Warnings ({}):", audit.warnings.len()).yellow().bold()
        );
        for warning in &audit.warnings {
            println!("  {} {}", "•".yellow(), warning);
        }
    }

    if verbose && !audit.passed.is_empty() {
        println!();
        println!("{}", format!("Passed ({}):", audit.passed.len()).green().bold());
        for passed in &audit.passed {
            println!("  {} {}", "•".green(), passed);
        }
    }

    let score = format!("{}/100", audit.score());
    println!();
    println!("{} {}", "Score:".bold(), color_score(audit.score(), &score));
}

fn color_score(score: u8, text: &str) -> colored::ColoredString {
    if score >= 90 {
        text.green()
    } else if score >= 70 {
        text.yellow()
    } else {
        text.red()
    }
}

fn handle_sync_skills(dir: &Path, dry_run: bool) -> Result<()> {
    println!("{}", "=== Plugin Skills Fix Tool ===".bold());
    println!();
    if dry_run {
        println!(
            "{}",
            "Running in DRY RUN mode - no files will be modified".yellow()
        );
        println!();
    }

    let results = skills::sync_all(dir, dry_run)?;
    println!("Found {} plugins", results.len());
    println!();

    let mut fixed = 0usize;
    for result in &results {
        if result.is_up_to_date() {
            println!("{} {}", "✓".green(), result.plugin.bold());
            println!("  Skills: {} (up to date)", result.actual.len());
        } else {
            println!("{} {}", "⚠".yellow(), result.plugin.bold());
            println!(
                "  Declared: {} | Actual: {}",
                result.declared.len(),
                result.actual.len()
            );
            if !result.missing.is_empty() {
                println!("  {}", "Missing from plugin.json:".red());
                for skill in &result.missing {
                    println!("    + {}", skill);
                }
            }
            if !result.extra.is_empty() {
                println!("  {}", "Extra in plugin.json (not found):".yellow());
                for skill in &result.extra {
                    println!("    - {}", skill);
                }
            }
            if result.updated {
                fixed += 1;
                if dry_run {
                    println!("  {}", "Would update plugin.json".blue());
                } else {
                    println!("  {}", "Updated plugin.json".green());
                }
            }
        }
        println!();
    }

    println!("{}", "=== Summary ===".bold());
    println!("Total plugins: {}", results.len());
    println!("{}", format!("Up to date: {}", results.len() - fixed).green());
    println!("{}", format!("Fixed: {}", fixed).yellow());

    if dry_run && fixed > 0 {
        println!();
        println!("{}", "Run without --dry-run to apply changes".blue());
    }

    Ok(())
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(PlugkitError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            println!("{}", Config::path(base_dir).display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
