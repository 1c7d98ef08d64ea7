use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::Level;

use xcpatch_cli::add_file::{AddFileOptions, run_add_file_command};
use xcpatch_cli::dedup::{DedupOptions, run_dedup_command};
use xcpatch_cli::localize::{LocalizeOptions, run_localize_command};
use xcpatch_cli::missing::{MissingOptions, run_missing_command};
use xcpatch_cli::prune::{PruneOptions, run_prune_command};
use xcpatch_cli::settings::load_config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an xcpatch.toml (default: ./xcpatch.toml if present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Register source files in an Xcode project.
    AddFile {
        /// Files to add, relative to the source root
        #[arg(required = true)]
        files: Vec<String>,

        /// Path to project.pbxproj
        #[arg(short, long)]
        project: Option<String>,

        /// Destination group path, e.g. Features/Prompts (default: the file's directory)
        #[arg(short, long)]
        group: Option<String>,

        /// Target whose build phase receives the files
        #[arg(short, long)]
        target: Option<String>,

        /// Create missing groups instead of skipping them
        #[arg(long)]
        create_groups: bool,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove duplicate build-file entries from an Xcode project.
    Dedup {
        /// Path to project.pbxproj
        #[arg(short, long)]
        project: Option<String>,

        /// Keep a copy that leads another build phase (a file shared by two targets)
        #[arg(long)]
        keep_shared: bool,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List source files that are not referenced by the project, optionally adding them.
    Missing {
        /// Path to project.pbxproj
        #[arg(short, long)]
        project: Option<String>,

        /// Directory to scan (default: the directory holding the .xcodeproj)
        #[arg(short, long)]
        source_root: Option<String>,

        /// Glob of files to consider; repeatable (default: **/*.swift)
        #[arg(long)]
        include: Vec<String>,

        /// Glob of files to ignore; repeatable
        #[arg(long)]
        exclude: Vec<String>,

        /// Also write a plain-text report to this file
        #[arg(short, long)]
        output: Option<String>,

        /// Register the missing files in the project
        #[arg(long)]
        add: bool,

        /// With --add, create missing groups instead of skipping them
        #[arg(long, requires = "add")]
        create_groups: bool,

        /// With --add, report what would change without writing
        #[arg(long, requires = "add")]
        dry_run: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill missing languages in a string catalog.
    Localize {
        /// Path to the .xcstrings catalog
        #[arg(short, long)]
        catalog: Option<String>,

        /// Translation table (.json, .yaml or .toml)
        #[arg(short, long)]
        translations: Option<String>,

        /// Languages to fill, comma separated or repeated
        #[arg(short, long = "lang", value_delimiter = ',')]
        languages: Vec<String>,

        /// Leave keys starting with % or # untouched
        #[arg(long)]
        skip_format_keys: bool,

        /// Write to this file instead of updating the catalog in place
        #[arg(short, long)]
        output: Option<String>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove catalog keys that no source file mentions.
    Prune {
        /// Path to the .xcstrings catalog
        #[arg(short, long)]
        catalog: Option<String>,

        /// Directory of sources to search (default: the catalog's directory)
        #[arg(short, long)]
        source_root: Option<String>,

        /// Glob of files to search; repeatable (default: **/*.swift and **/*.plist)
        #[arg(long)]
        include: Vec<String>,

        /// Do not write <catalog>.backup before changing the catalog
        #[arg(long)]
        no_backup: bool,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: Args) -> Result<(), String> {
    if let Commands::Completions { shell } = args.commands {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "xcpatch", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;

    match args.commands {
        Commands::AddFile {
            files,
            project,
            group,
            target,
            create_groups,
            dry_run,
            json,
        } => run_add_file_command(
            AddFileOptions {
                project,
                files,
                group,
                target,
                create_groups,
                dry_run,
                json,
            },
            &config,
        ),
        Commands::Dedup {
            project,
            keep_shared,
            dry_run,
            json,
        } => run_dedup_command(
            DedupOptions {
                project,
                keep_shared,
                dry_run,
                json,
            },
            &config,
        ),
        Commands::Missing {
            project,
            source_root,
            include,
            exclude,
            output,
            add,
            create_groups,
            dry_run,
            json,
        } => run_missing_command(
            MissingOptions {
                project,
                source_root,
                include,
                exclude,
                output,
                add,
                create_groups,
                dry_run,
                json,
            },
            &config,
        ),
        Commands::Localize {
            catalog,
            translations,
            languages,
            skip_format_keys,
            output,
            dry_run,
            json,
        } => run_localize_command(
            LocalizeOptions {
                catalog,
                translations,
                languages,
                skip_format_keys,
                output,
                dry_run,
                json,
            },
            &config,
        ),
        Commands::Prune {
            catalog,
            source_root,
            include,
            no_backup,
            dry_run,
            json,
        } => run_prune_command(
            PruneOptions {
                catalog,
                source_root,
                include,
                no_backup,
                dry_run,
                json,
            },
            &config,
        ),
        Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
