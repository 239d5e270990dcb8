use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tag_gen::codegen::Target;
use tag_gen::GeneratorOptions;
use tracing_subscriber::EnvFilter;

mod cmds;

#[derive(Parser)]
#[command(name = "tag-gen")]
#[command(about = "Tag definition code generator", long_about = None)]
struct Cli {
    /* Log generator decisions at debug level */
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Emit enums, bitfields, editable structs and both layouts */
    Definitions {
        /* Directory holding the schema files */
        #[arg(value_name = "SCHEMA_DIR")]
        schema_dir: PathBuf,

        /* Output source file */
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /* Crate path the emitted code imports its runtime from */
        #[arg(long, default_value = "tag_runtime")]
        runtime_crate: String,
    },

    /* Emit packed decode and compile routines */
    PackedCodec {
        #[arg(value_name = "SCHEMA_DIR")]
        schema_dir: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[arg(long, default_value = "tag_runtime")]
        runtime_crate: String,
    },

    /* Emit tag file parse and generate routines */
    FileCodec {
        #[arg(value_name = "SCHEMA_DIR")]
        schema_dir: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[arg(long, default_value = "tag_runtime")]
        runtime_crate: String,

        /* Also write cache-only and unused fields into tag files */
        #[arg(long)]
        extract_hidden: bool,
    },

    /* Emit range, index, reference and normal validators */
    Validators {
        #[arg(value_name = "SCHEMA_DIR")]
        schema_dir: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[arg(long, default_value = "tag_runtime")]
        runtime_crate: String,
    },

    /* Emit field descriptors for generic editors */
    Reflection {
        #[arg(value_name = "SCHEMA_DIR")]
        schema_dir: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[arg(long, default_value = "tag_runtime")]
        runtime_crate: String,
    },

    /* Emit every target plus include.rs into one directory */
    Generate {
        #[arg(value_name = "SCHEMA_DIR")]
        schema_dir: PathBuf,

        /* Output directory for generated code */
        #[arg(short, long, value_name = "DIR", default_value = "generated")]
        output: PathBuf,

        #[arg(long, default_value = "tag_runtime")]
        runtime_crate: String,

        #[arg(long)]
        extract_hidden: bool,
    },

    /* Show emission order, classified fields and warnings */
    Analyze {
        #[arg(value_name = "SCHEMA_DIR")]
        schema_dir: PathBuf,

        /* Print the resolved and classified model as JSON instead of a report */
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn options(runtime_crate: String, extract_hidden: bool, verbose: bool) -> GeneratorOptions {
    GeneratorOptions {
        extract_hidden,
        runtime_crate,
        verbose,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let verbose = cli.verbose;

    match cli.command {
        Commands::Definitions {
            schema_dir,
            output,
            runtime_crate,
        } => {
            let options = options(runtime_crate, false, verbose);
            cmds::codegen::run_target(Target::Definitions, schema_dir, output, &options)?;
        }

        Commands::PackedCodec {
            schema_dir,
            output,
            runtime_crate,
        } => {
            let options = options(runtime_crate, false, verbose);
            cmds::codegen::run_target(Target::PackedCodec, schema_dir, output, &options)?;
        }

        Commands::FileCodec {
            schema_dir,
            output,
            runtime_crate,
            extract_hidden,
        } => {
            let options = options(runtime_crate, extract_hidden, verbose);
            cmds::codegen::run_target(Target::FileCodec, schema_dir, output, &options)?;
        }

        Commands::Validators {
            schema_dir,
            output,
            runtime_crate,
        } => {
            let options = options(runtime_crate, false, verbose);
            cmds::codegen::run_target(Target::Validators, schema_dir, output, &options)?;
        }

        Commands::Reflection {
            schema_dir,
            output,
            runtime_crate,
        } => {
            let options = options(runtime_crate, false, verbose);
            cmds::codegen::run_target(Target::Reflection, schema_dir, output, &options)?;
        }

        Commands::Generate {
            schema_dir,
            output,
            runtime_crate,
            extract_hidden,
        } => {
            let options = options(runtime_crate, extract_hidden, verbose);
            cmds::codegen::run_all(schema_dir, output, &options)?;
        }

        Commands::Analyze { schema_dir, json } => {
            cmds::analyze::run(schema_dir, json)?;
        }
    }

    Ok(())
}
