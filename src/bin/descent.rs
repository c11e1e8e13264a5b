//! Command-line interface for descent
//!
//! Usage:
//!   descent parse `<grammar>` `<input>` [--rule `<name>`] [--format `<format>`] [--config `<file>`] [--tokens]
//!   descent rules `<grammar>`      - Show the rules of a grammar in declaration order
//!   descent formats               - List available output formats
//!
//! Grammar files are JSON or YAML mappings from rule name to specification. An input of
//! `-` is read from stdin. Exit codes: 0 on a match, 1 when the input does not match,
//! 2 on any error.

use clap::{Arg, ArgAction, ArgMatches, Command};
use descent::config::{DescentConfig, Loader};
use descent::formats::FormatRegistry;
use descent::grammar::loader;
use descent::{Grammar, ListNode, TokenStream};
use std::io::Read;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let matches = Command::new("descent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Match input against grammars defined at runtime")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("parse")
                .about("Parse input with a grammar file")
                .arg(
                    Arg::new("grammar")
                        .help("Path to the grammar file (.json, .yaml, .yml)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("input")
                        .help("Input text, or '-' to read stdin")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("rule")
                        .long("rule")
                        .short('r')
                        .help("Match this rule instead of the entry rule"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (default from configuration: treeviz)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Configuration file layered over the defaults"),
                )
                .arg(
                    Arg::new("tokens")
                        .long("tokens")
                        .help("Treat the input as a JSON array of tokens")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("rules")
                .about("Show the rules of a grammar in declaration order")
                .arg(
                    Arg::new("grammar")
                        .help("Path to the grammar file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("formats").about("List available output formats"))
        .get_matches();

    match matches.subcommand() {
        Some(("parse", parse_matches)) => handle_parse_command(parse_matches),
        Some(("rules", rules_matches)) => {
            let path = rules_matches.get_one::<String>("grammar").unwrap();
            handle_rules_command(path);
        }
        Some(("formats", _)) => handle_formats_command(),
        _ => unreachable!(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(2);
}

fn load_config(path: Option<&String>) -> DescentConfig {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader.build().unwrap_or_else(|e| fail(e))
}

fn load_grammar(path: &str) -> Grammar<ListNode> {
    loader::load_path(path).unwrap_or_else(|e| fail(e))
}

fn read_input(input: &str) -> String {
    if input != "-" {
        return input.to_string();
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .unwrap_or_else(|e| fail(format!("reading stdin: {}", e)));
    buffer.trim_end_matches(['\n', '\r']).to_string()
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches) {
    let config = load_config(matches.get_one::<String>("config"));
    let grammar = load_grammar(matches.get_one::<String>("grammar").unwrap())
        .with_config(&config.engine);
    let input = read_input(matches.get_one::<String>("input").unwrap());

    let stream = if matches.get_flag("tokens") {
        let value: serde_json::Value =
            serde_json::from_str(&input).unwrap_or_else(|e| fail(format!("invalid tokens: {}", e)));
        TokenStream::try_from(value).unwrap_or_else(|e| fail(e))
    } else {
        let tokenizer = config.tokenizer().unwrap_or_else(|e| fail(e));
        TokenStream::with_tokenizer(&input, tokenizer.as_ref())
    };

    let result = match matches.get_one::<String>("rule") {
        Some(rule) => grammar.test(rule, stream),
        None => grammar.parse(stream),
    };

    let format = matches
        .get_one::<String>("format")
        .unwrap_or(&config.output.format);

    match result {
        Ok(Some(parsed)) => {
            let registry = FormatRegistry::with_defaults();
            let output = registry.serialize(&parsed, format).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                eprintln!("Available formats: {}", registry.list_formats().join(", "));
                std::process::exit(2);
            });
            print!("{}", output);
        }
        Ok(None) => {
            eprintln!("no match");
            std::process::exit(1);
        }
        Err(e) => fail(e),
    }
}

/// Handle the rules command
fn handle_rules_command(path: &str) {
    let grammar = load_grammar(path);
    for (name, options) in grammar.rules() {
        println!("{}", name);
        for option in options {
            if option.is_empty() {
                println!("  (empty)");
            } else {
                println!("  {}", option.join(" "));
            }
        }
    }
}

/// Handle the formats command
fn handle_formats_command() {
    let registry = FormatRegistry::with_defaults();
    println!("Available output formats:\n");
    for name in registry.list_formats() {
        if let Some(formatter) = registry.get(&name) {
            println!("  {}", name);
            println!("    {}", formatter.description());
            println!();
        }
    }
}
