//! Command-line entry point for the operator-table compiler.
//!
//! Reads the architecture schema and the external C declarations, then
//! patches the generated regions of the target sources in place. Paths
//! default to the layout of the IR directory the tool lives next to; pass
//! `--dir` to run against it from elsewhere.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use opgen::pipeline::{self, Config};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the default paths are resolved against
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Architecture schema
    #[arg(long, default_value = "arch_base.lisp")]
    schema: PathBuf,

    /// C header declaring the type codes
    #[arg(long, default_value = "../types.h")]
    types: PathBuf,

    /// C header declaring the source-language tokens
    #[arg(long, default_value = "../parse/parse.h")]
    tokens: PathBuf,

    /// Target header for generated declarations
    #[arg(long, default_value = "op.h")]
    op_h: PathBuf,

    /// Target source for generated lookup tables
    #[arg(long, default_value = "op.c")]
    op_c: PathBuf,

    /// Target source for generated dispatch switches
    #[arg(long, default_value = "ir-ast.c")]
    ir_ast_c: PathBuf,

    /// Validate and report without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the validated model as JSON instead of patching
    #[arg(long)]
    dump_model: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config {
        schema: args.dir.join(&args.schema),
        types_decl: args.dir.join(&args.types),
        tokens_decl: args.dir.join(&args.tokens),
        op_h: args.dir.join(&args.op_h),
        op_c: args.dir.join(&args.op_c),
        ir_ast_c: args.dir.join(&args.ir_ast_c),
        dry_run: args.dry_run,
    };

    if args.dump_model {
        let model = pipeline::load(&config).context("loading inputs")?;
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    pipeline::run(&config).context("generating operator tables")?;
    Ok(())
}
