use log::warn;
use sdb::config::DEFAULT_CONFIG_PATH;
use sdb::{
    CommandLine, Configuration, Dialect, DialectKind, Logger, ResumeSignal, SimulatedSession,
    TerminalReader,
};
use std::path::PathBuf;
use std::process;

fn print_usage() {
    println!("Usage: sdb [--config <path>] [--dialect <sdb|gdb>] [--log <path>]");
    println!();
    println!("  --config <path>     configuration file (default: {})", DEFAULT_CONFIG_PATH);
    println!("  --dialect <name>    command vocabulary, sdb or gdb");
    println!("  --log <path>        copy all output to a log file");
    println!("  --help              show this message");
}

fn flag_value(args: &[String], index: usize) -> String {
    match args.get(index + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Missing value for {}", args[index]);
            print_usage();
            process::exit(2);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut dialect_name: Option<String> = None;
    let mut log_path: Option<PathBuf> = None;

    let mut arg_index = 1;
    while arg_index < args.len() {
        let arg = &args[arg_index];
        if arg == "--config" {
            config_path = PathBuf::from(flag_value(&args, arg_index));
            arg_index += 2;
        } else if arg == "--dialect" {
            dialect_name = Some(flag_value(&args, arg_index));
            arg_index += 2;
        } else if arg == "--log" {
            log_path = Some(PathBuf::from(flag_value(&args, arg_index)));
            arg_index += 2;
        } else if arg == "--help" || arg == "-h" {
            print_usage();
            return;
        } else {
            eprintln!("Unknown argument: {}", arg);
            print_usage();
            process::exit(2);
        }
    }

    let mut config = Configuration::load_or_default(&config_path);
    if let Some(name) = dialect_name {
        config.command_dialect = match name.parse::<DialectKind>() {
            Ok(kind) => kind,
            Err(error) => {
                eprintln!("{}; using {}", error, DialectKind::Sdb);
                DialectKind::Sdb
            }
        };
    }
    if log_path.is_some() {
        config.log_path = log_path;
    }

    let dialect = match Dialect::for_kind(config.command_dialect) {
        Ok(dialect) => dialect,
        Err(error) => {
            eprintln!("Error building the {} dialect: {}", config.command_dialect, error);
            process::exit(1);
        }
    };

    let mut logger = Logger::stdio();
    if let Some(ref path) = config.log_path {
        if let Err(error) = logger.open_sink(path) {
            warn!("cannot open log file {}: {}", path.display(), error);
        }
    }

    let resume = ResumeSignal::new();
    let session = SimulatedSession::new(resume.clone(), config.target_latency());
    let mut command_line = CommandLine::new(dialect, session, logger, resume);

    command_line.run(&mut TerminalReader::new());
}
