use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use instance_creator::walker;
use instance_creator::{
    ArtifactLocator, ArtifactRoot, CandidateName, DEFAULT_UNIT_SUFFIX, Namespace, ScanConfig,
};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "instance-creator", version, about = "Inspect instance-creator artifact roots")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the artifact root and its container kind
    Locate {
        #[command(flatten)]
        root: RootArgs,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// List the candidate names found under a namespace
    List {
        #[command(flatten)]
        root: RootArgs,

        /// Namespace to walk, with `.` or `/` separators (default: every namespace)
        #[arg(short, long, default_value = "")]
        namespace: String,

        /// Do not descend into nested namespaces
        #[arg(long)]
        no_subnamespaces: bool,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct RootArgs {
    /// Artifact root (directory or archive); located automatically when omitted
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Suffix of files that denote a type
    #[arg(long, default_value = DEFAULT_UNIT_SUFFIX)]
    pub unit_suffix: String,

    /// Follow symbolic links inside a directory root
    #[arg(long)]
    pub follow_links: bool,
}

impl RootArgs {
    fn config(&self) -> ScanConfig {
        let mut config = ScanConfig::default();
        config.unit_suffix.clone_from(&self.unit_suffix);
        config.follow_links = self.follow_links;
        config
    }

    fn resolve(&self, config: &ScanConfig) -> Result<ArtifactRoot> {
        if let Some(path) = &self.root {
            return ArtifactRoot::detect(path, config)
                .with_context(|| format!("Cannot use {} as artifact root", path.display()));
        }
        let locator = ArtifactLocator::new(config.clone());
        let root = locator.resolve_root()?.clone();
        Ok(root)
    }
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    root: &'a ArtifactRoot,
    namespace: &'a Namespace,
    include_subnamespaces: bool,
    candidates: &'a [CandidateName],
}

/// Execute `cli`, writing results to `out`.
///
/// # Errors
/// Returns an error if the root cannot be resolved, the namespace is malformed,
/// the artifact cannot be read, or writing fails.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Command::Locate { root, json } => {
            let config = root.config();
            let resolved = root.resolve(&config)?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&resolved)?)?;
            } else {
                writeln!(out, "{resolved}")?;
            }
        }
        Command::List {
            root,
            namespace,
            no_subnamespaces,
            json,
        } => {
            let config = root.config();
            let resolved = root.resolve(&config)?;
            let namespace = Namespace::parse(namespace)?;
            let include_subnamespaces = !no_subnamespaces;

            let candidates = walker::walk(
                &resolved,
                namespace.clone(),
                include_subnamespaces,
                &config.unit_suffix,
                config.follow_links,
            )?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to walk {resolved}"))?;
            tracing::info!(count = candidates.len(), namespace = %namespace, "listed candidates");

            if *json {
                let listing = Listing {
                    root: &resolved,
                    namespace: &namespace,
                    include_subnamespaces,
                    candidates: &candidates,
                };
                writeln!(out, "{}", serde_json::to_string_pretty(&listing)?)?;
            } else {
                for candidate in &candidates {
                    writeln!(out, "{candidate}")?;
                }
            }
        }
    }
    Ok(())
}
