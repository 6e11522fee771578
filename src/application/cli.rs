use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::services::clipboard::ClipboardService;
use crate::domain::services::HistoryStore;
use crate::infrastructure::storage::DiskStore;

/// Everything the generate flow needs from the command line.
pub struct GenerateCommand {
    pub prompt: String,
    pub data_uri: bool,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn build_history_store() -> HistoryStore {
    return HistoryStore::new(Box::<DiskStore>::default());
}

async fn print_history_list() -> Result<()> {
    let entries = build_history_store().load().await;

    if entries.is_empty() {
        println!("No history yet. Prompts you generate will appear here.");
        return Ok(());
    }

    let lines = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            return format!("{}. {entry}", idx + 1);
        })
        .collect::<Vec<String>>();

    println!("{}", lines.join("\n"));
    return Ok(());
}

async fn copy_history_entry(index: usize) -> Result<()> {
    let entries = build_history_store().load().await;

    if index == 0 || index > entries.len() {
        bail!(format!(
            "No history entry at {index}. There are {} entries.",
            entries.len()
        ));
    }

    let entry = &entries[index - 1];
    ClipboardService::set(entry)?;
    println!("Copied \"{entry}\" to clipboard.");
    return Ok(());
}

async fn clear_history() -> Result<()> {
    build_history_store().clear().await?;
    println!("History cleared.");
    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if !config_file_path.parent().unwrap().exists() {
        fs::create_dir_all(config_file_path.parent().unwrap()).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    let config_path_display = config_file_path.as_os_str().to_str().unwrap();
    println!("Created default config file at {config_path_display}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_history_copy() -> Command {
    return Command::new("copy")
        .about("Copy a history entry to the clipboard by its position in the list.")
        .arg(
            clap::Arg::new("index")
                .short('i')
                .long("index")
                .help("Entry position, as printed by 'history list'. The most recent prompt is 1.")
                .value_parser(value_parser!(usize))
                .required(true),
        );
}

fn subcommand_history() -> Command {
    return Command::new("history")
        .about("Manage the prompt history.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the history storage directory path."))
        .subcommand(
            Command::new("list").about("List all saved prompts, most recent first."),
        )
        .subcommand(subcommand_history_copy())
        .subcommand(
            Command::new("clear").about("Delete all saved prompts. This cannot be undone."),
        );
}

fn subcommand_generate() -> Command {
    return Command::new("generate")
        .about("Generate an image from a text prompt and save it as a PNG.")
        .arg(
            clap::Arg::new("prompt")
                .help("The prompt describing the image to create, in English.")
                .num_args(1..)
                .required(true),
        )
        .arg(
            clap::Arg::new("data-uri")
                .long("data-uri")
                .help("Print the image as a base64 data URI to stdout instead of saving a file.")
                .action(ArgAction::SetTrue),
        );
}

fn arg_backend() -> Arg {
    return Arg::new(ConfigKey::Backend.to_string())
        .short('b')
        .long(ConfigKey::Backend.to_string())
        .env("EASEL_BACKEND")
        .num_args(1)
        .help(format!(
            "The image generation backend to use. [default: {}]",
            Config::default(ConfigKey::Backend)
        ))
        .value_parser(PossibleValuesParser::new(BackendName::VARIANTS))
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("easel")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(subcommand_generate())
        .subcommand(subcommand_history())
        .subcommand(subcommand_config())
        .subcommand(subcommand_completions())
        .arg(arg_backend())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("EASEL_CONFIG_FILE")
                .num_args(1)
                .help(format!(
                    "Path to configuration file [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OutputDir.to_string())
                .short('o')
                .long(ConfigKey::OutputDir.to_string())
                .env("EASEL_OUTPUT_DIR")
                .num_args(1)
                .help(format!(
                    "Directory where generated images are saved. [default: {}]",
                    Config::default(ConfigKey::OutputDir)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("EASEL_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!(
                    "Time to wait in milliseconds before giving up on a generation request. [default: {}]",
                    Config::default(ConfigKey::RequestTimeout)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StabilityToken.to_string())
                .long(ConfigKey::StabilityToken.to_string())
                .env("EASEL_STABILITY_TOKEN")
                .num_args(1)
                .help("Stability AI API key used as the bearer credential.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StabilityURL.to_string())
                .long(ConfigKey::StabilityURL.to_string())
                .env("EASEL_STABILITY_URL")
                .num_args(1)
                .help(format!(
                    "Stability AI API URL. Can be swapped to a compatible proxy. [default: {}]",
                    Config::default(ConfigKey::StabilityURL)
                ))
                .global(true),
        );
}

/// Parses arguments and runs one-shot subcommands. Returns the generate
/// command to run, or `None` when all requested work is already done.
pub async fn parse() -> Result<Option<GenerateCommand>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("generate", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;

            let prompt = subcmd_matches
                .get_many::<String>("prompt")
                .unwrap()
                .map(|e| return e.to_string())
                .collect::<Vec<String>>()
                .join(" ");

            return Ok(Some(GenerateCommand {
                prompt,
                data_uri: subcmd_matches.get_flag("data-uri"),
            }));
        }
        Some(("history", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("dir", _)) => {
                let dir = DiskStore::default().data_dir.to_string_lossy().to_string();
                println!("{dir}");
            }
            Some(("list", _)) => {
                print_history_list().await?;
            }
            Some(("copy", copy_matches)) => {
                let index = *copy_matches.get_one::<usize>("index").unwrap();
                copy_history_entry(index).await?;
            }
            Some(("clear", _)) => {
                clear_history().await?;
            }
            _ => {
                subcommand_history().print_long_help()?;
            }
        },
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        _ => {
            println!(
                "{}",
                Paint::new("Run 'easel generate <PROMPT>' to create your first image.").bold()
            );
        }
    }

    return Ok(None);
}
