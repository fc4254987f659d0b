use std::env;
use std::process;

use log::debug;

use lup::{
    build_line, capture_stdin, execute, join_tokens, parse_args, Config, Invocation, USAGE,
    VERSION,
};

fn main() {
    init_logging();
    process::exit(run());
}

fn init_logging() {
    let env = env_logger::Env::default().filter_or("LUP_LOG", "warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

fn run() -> i32 {
    let invocation = match parse_args(env::args().skip(1), Config::from_env()) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("lup: {}", err.display_simple());
            return err.exit_code();
        }
    };
    let (mut config, tokens) = match invocation {
        Invocation::Help => {
            println!("{USAGE}");
            return 0;
        }
        Invocation::Version => {
            println!("{VERSION}");
            return 0;
        }
        Invocation::Run { config, tokens } => (config, tokens),
    };

    match capture_stdin() {
        Ok(input) => config.input = input,
        Err(err) => {
            let err = lup::LupError::from(err).with_context("while reading stdin");
            eprintln!("lup: {}", err.display_simple());
            return err.exit_code();
        }
    }

    let line = join_tokens(&tokens);
    debug!("cli event=start line={line:?} dry_run={}", config.dry_run);
    let generator = match build_line(&line, &config) {
        Ok(generator) => generator,
        Err(err) => {
            eprintln!("lup: {}", err.display_with_input(&line));
            return err.exit_code();
        }
    };
    debug!("cli event=generated count={}", generator.len());
    execute(generator.commands(), &config).exit_code()
}
