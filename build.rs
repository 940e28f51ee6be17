// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: working directory
fn work_dir_arg(help: &'static str) -> Arg {
    Arg::new("work_dir")
        .short('w')
        .long("work-dir")
        .value_name("DIR")
        .required(true)
        .help(help)
}

fn flag(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(long).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("niiprep")
        .version(env!("CARGO_PKG_VERSION"))
        .author("niiprep Contributors")
        .about("Prepare converter input and resolve converter output")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging (RUST_LOG takes precedence)"),
        )
        .subcommand(
            Command::new("prepare")
                .about("Arrange an archive, header/data pair or file into a flat input directory")
                .arg(Arg::new("input").required(true).help("Submitted input: zip, tarball, PAR header, file or directory"))
                .arg(Arg::new("data").long("data").value_name("REC").help("REC data file paired with a PAR header input"))
                .arg(work_dir_arg("Working directory the input directory is created in")),
        )
        .subcommand(
            Command::new("resolve")
                .about("Describe converter outputs and move the retained ones")
                .arg(work_dir_arg("Directory the converter wrote into"))
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .required(true)
                        .help("Directory retained outputs are moved to"),
                )
                .arg(
                    Arg::new("sidecar")
                        .long("sidecar")
                        .value_name("FILE")
                        .action(ArgAction::Append)
                        .help("Sidecar written by the converter (repeatable)"),
                )
                .arg(
                    Arg::new("image")
                        .long("image")
                        .value_name("FILE")
                        .action(ArgAction::Append)
                        .help("Image, gradient table or NRRD part written by the converter (repeatable)"),
                )
                .arg(Arg::new("input_dir").long("input-dir").help("Converter input directory, only reported"))
                .arg(Arg::new("config").short('c').long("config").help("TOML configuration file"))
                .arg(flag("ignore_errors", "ignore-errors", "Move every file of the working directory"))
                .arg(
                    Arg::new("bids_sidecar")
                        .long("bids-sidecar")
                        .value_name("MODE")
                        .value_parser(["y", "n", "o"])
                        .help("Sidecar handling: y (keep), n (drop), o (sidecars only)"),
                )
                .arg(flag("output_nrrd", "output-nrrd", "Converter wrote NRRD instead of NIfTI"))
                .arg(flag(
                    "pydeface_intermediaries",
                    "pydeface-intermediaries",
                    "Keep defacing mask and transform files",
                ))
                .arg(Arg::new("modality").long("modality").help("Modality recorded for every file, overriding the sidecar")),
        )
        .subcommand(
            Command::new("merge-corrected")
                .about("Merge incomplete-volume correction output into an input directory")
                .arg(Arg::new("dir").required(true).help("Prepared input directory")),
        )
        .subcommand(
            Command::new("sanitize")
                .about("Print the directory token a filename sanitizes to")
                .arg(Arg::new("name").required(true).help("Filename to sanitize")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell to generate completions for"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("niiprep.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
