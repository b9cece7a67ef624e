//! `deluge-patch`: inspect and edit Deluge patch files without disturbing
//! anything the editor does not understand.

use clap::Parser;
use deluge_patch::cli::{init_logging, run, CliArgs};
use deluge_patch::EditorConfig;

fn main() {
    let args = CliArgs::parse();

    let config_level = args
        .config
        .as_ref()
        .and_then(|path| EditorConfig::from_path(path).ok())
        .and_then(|config| config.log_level);
    init_logging(args.verbosity(), config_level.as_deref());

    match run(&args) {
        Ok((output, ok)) => {
            if !output.is_empty() {
                println!("{output}");
            }
            if !ok {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
