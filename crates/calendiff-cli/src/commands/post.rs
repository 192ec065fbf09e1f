//! Post command

use calendiff_core::diff::model::DiffStatus;
use calendiff_core::loader::{load_discord_templates, load_forum_templates};
use calendiff_core::posts::{discord_post, find_template, forum_posts, DiscordTemplate};
use calendiff_core::template::{extract_variables, templatize_json};
use calendiff_core::{DashboardConfig, ExError, ExErrorKind};
use clap::{Args, Subcommand};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use super::{display_rows, DisplayArgs};

#[derive(Debug, Args)]
pub struct PostArgs {
    #[command(subcommand)]
    pub command: PostCommand,
}

#[derive(Debug, Subcommand)]
pub enum PostCommand {
    /// Forum text for every changed row, English then Japanese
    Forum(ForumArgs),
    /// Discord webhook payload for one row
    Discord(DiscordArgs),
    /// Turn a finished Discord payload into a template entry
    Templatize(TemplatizeArgs),
}

#[derive(Debug, Args)]
pub struct ForumArgs {
    #[command(flatten)]
    pub display: DisplayArgs,

    /// Forum template file (`[status_lang]` sections)
    #[arg(long)]
    pub templates: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DiscordArgs {
    #[command(flatten)]
    pub display: DisplayArgs,

    /// Discord template file (JSON list)
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Template name
    #[arg(long)]
    pub template: String,

    /// Row index in table order
    #[arg(long, default_value_t = 0)]
    pub event: usize,
}

#[derive(Debug, Args)]
pub struct TemplatizeArgs {
    /// Finished webhook payload (JSON)
    #[arg(long)]
    pub input: PathBuf,

    /// Template name
    #[arg(long)]
    pub name: String,

    /// Template description (defaults to one derived from the name)
    #[arg(long)]
    pub description: Option<String>,

    /// Add the entry to the Discord template file, replacing one with the same name
    #[arg(long)]
    pub save: bool,

    /// Discord template file to save into
    #[arg(long)]
    pub templates: Option<PathBuf>,
}

pub fn execute(args: PostArgs, config: &DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        PostCommand::Forum(forum_args) => execute_forum(forum_args, config),
        PostCommand::Discord(discord_args) => execute_discord(discord_args, config),
        PostCommand::Templatize(templatize_args) => execute_templatize(templatize_args, config),
    }
}

fn execute_forum(args: ForumArgs, config: &DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut rows = display_rows(&args.display, config)?;
    rows.retain(|r| r.diff_status != DiffStatus::Unchanged);

    let path = args
        .templates
        .unwrap_or_else(|| config.files.forum_templates.clone());
    let templates = load_forum_templates(&path)?;

    let posts = forum_posts(&rows, &templates);
    if posts.is_empty() {
        println!("No changed events.");
        return Ok(());
    }
    println!("{}", posts.summary_en());
    println!();
    println!("{}", posts.summary_ja());
    Ok(())
}

fn execute_discord(
    args: DiscordArgs,
    config: &DashboardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = display_rows(&args.display, config)?;

    let path = args
        .templates
        .unwrap_or_else(|| config.files.discord_templates.clone());
    let templates = load_discord_templates(&path)?;
    let template = find_template(&templates, &args.template)?;

    let row = rows.get(args.event).ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("cli_post_discord")
            .with_message(format!(
                "Event index {} out of range ({} events)",
                args.event,
                rows.len()
            ))
    })?;

    println!("{}", serde_json::to_string_pretty(&discord_post(row, template))?);
    Ok(())
}

fn execute_templatize(
    args: TemplatizeArgs,
    config: &DashboardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&args.input).map_err(|e| {
        ExError::from(e)
            .with_op("cli_post_templatize")
            .with_entity_id(args.input.display().to_string())
    })?;
    let payload: Value = serde_json::from_str(&text).map_err(|e| {
        ExError::from(e)
            .with_op("cli_post_templatize")
            .with_entity_id(args.input.display().to_string())
    })?;

    let template = templatize_json(&payload);
    let variables = extract_variables(&template);
    let entry = DiscordTemplate {
        description: args
            .description
            .unwrap_or_else(|| format!("Discord post template for {}", args.name)),
        name: args.name,
        variables: BTreeMap::new(),
        template,
    };

    eprintln!("Variables:");
    for name in &variables {
        eprintln!("  {{{}}}", name);
    }

    if !args.save {
        println!("{}", serde_json::to_string_pretty(&[&entry])?);
        return Ok(());
    }

    let path = args
        .templates
        .unwrap_or_else(|| config.files.discord_templates.clone());
    let mut templates = load_discord_templates(&path)?;
    let replaced = templates.iter().any(|t| t.name == entry.name);
    templates.retain(|t| t.name != entry.name);
    let name = entry.name.clone();
    templates.push(entry);
    fs::write(&path, serde_json::to_string_pretty(&templates)?).map_err(|e| {
        ExError::from(e)
            .with_op("cli_post_templatize")
            .with_entity_id(path.display().to_string())
    })?;

    println!("Template saved:");
    println!("  path: {}", path.display());
    println!("  name: {}", name);
    println!("  replaced: {}", replaced);
    println!("  templates: {}", templates.len());
    Ok(())
}
