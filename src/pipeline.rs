//! End-to-end generation pipeline
//!
//! Loading reads the schema and both external declarations, cross-validates
//! everything, and produces a [`Model`]. Patching emits every table body
//! from the model and splices them into the three target files. All
//! validation happens before the first write, so a failing run leaves every
//! target untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::gen;
use crate::patch::{patch_file, Region};
use crate::registry::{load_ast_tokens, load_type_codes, AstOpMap, AuxTable, TypeCodeMap};
use crate::schema::Arch;

/// Input and target paths plus run options
#[derive(Debug, Clone)]
pub struct Config {
    /// Base architecture schema (s-expressions)
    pub schema: PathBuf,
    /// C header declaring the type codes
    pub types_decl: PathBuf,
    /// C header declaring the source-language tokens
    pub tokens_decl: PathBuf,
    /// Target header for enum/struct declarations
    pub op_h: PathBuf,
    /// Target source for the lookup tables
    pub op_c: PathBuf,
    /// Target source for the token dispatch switches
    pub ir_ast_c: PathBuf,
    /// Validate and report without writing
    pub dry_run: bool,
}

/// Everything loaded and cross-validated, ready for emission
#[derive(Debug, Serialize)]
pub struct Model {
    /// Architectures in emission order; the base arch comes first
    pub archs: Vec<Arch>,
    /// Type codes in declared enum order, aliases included
    pub type_codes: Vec<String>,
    /// (token, textual representation) pairs from the declaration window
    pub ast_tokens: Vec<(String, String)>,
    /// Type code to irtype mapping
    pub type_code_map: TypeCodeMap,
    /// Token to operator-prefix mapping
    pub ast_op_map: AstOpMap,
    /// Auxiliary-storage kinds
    pub aux: AuxTable,
}

impl Model {
    /// The base (generic) architecture
    pub fn base(&self) -> &Arch {
        &self.archs[0]
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))
}

/// Loads and cross-validates all inputs
pub fn load(config: &Config) -> Result<Model> {
    let type_code_map = TypeCodeMap::builtin();
    let ast_op_map = AstOpMap::builtin();
    let aux = AuxTable::builtin();

    let types_label = config.types_decl.display().to_string();
    let type_codes = load_type_codes(&type_code_map, &types_label, &read(&config.types_decl)?)?;

    let tokens_label = config.tokens_decl.display().to_string();
    let ast_tokens = load_ast_tokens(&ast_op_map, &tokens_label, &read(&config.tokens_decl)?)?;

    let schema_label = config.schema.display().to_string();
    let mut base = Arch::parse(&schema_label, &read(&config.schema)?)?;
    base.is_generic = true;
    debug!(
        ops = base.ops.len(),
        addr_size = base.addr_size,
        reg_size = base.reg_size,
        int_size = base.int_size,
        "loaded base architecture"
    );

    Ok(Model {
        archs: vec![base],
        type_codes,
        ast_tokens,
        type_code_map,
        ast_op_map,
        aux,
    })
}

/// Emits every table from the model and patches the target files.
///
/// Returns true if any target changed (or would change under dry-run).
pub fn patch(config: &Config, model: &Model) -> Result<bool> {
    let base = model.base();
    let map = &model.type_code_map;

    let op_enum = gen::op_enum::generate(&model.archs);
    let names = gen::op_names::generate(&model.archs);
    let max_len = gen::op_names::generate_max_len(&model.archs);
    let const_map = gen::const_map::generate(base, map, &model.type_codes)?;
    let conv = gen::conv_table::generate(base, map, &model.type_codes)?;
    let switches = gen::ast_switch::generate(base, map, &model.ast_op_map, &model.type_codes)?;
    let flag_enum = gen::statics::generate_flag_enum();
    let aux_enum = gen::statics::generate_aux_enum(&model.aux);
    let descr = gen::statics::generate_descr_struct();
    let info = gen::op_info::generate(&model.archs, map, &model.aux)?;

    // A bare "};" or "}," also closes rows inside table bodies; anchoring
    // those end markers behind a newline matches only at column zero.
    let flag_end = format!("\n{}", gen::statics::FLAG_END);
    let aux_end = format!("\n{}", gen::statics::AUX_END);
    let descr_end = format!("\n{}", gen::statics::DESCR_END);
    let table_end = format!("\n{}", gen::const_map::END);

    let mut changed = false;

    changed |= patch_file(
        &config.op_h,
        &[
            Region {
                start: gen::op_enum::START,
                end: gen::op_enum::END,
                body: &op_enum,
            },
            Region {
                start: gen::op_names::MAX_LEN_START,
                end: gen::op_names::MAX_LEN_END,
                body: &max_len,
            },
            Region {
                start: gen::statics::FLAG_START,
                end: &flag_end,
                body: &flag_enum,
            },
            Region {
                start: gen::statics::AUX_START,
                end: &aux_end,
                body: &aux_enum,
            },
            Region {
                start: gen::statics::DESCR_START,
                end: &descr_end,
                body: &descr,
            },
        ],
        config.dry_run,
    )?;

    changed |= patch_file(
        &config.op_c,
        &[
            Region {
                start: gen::op_names::START,
                end: gen::op_names::END,
                body: &names,
            },
            Region {
                start: gen::const_map::START,
                end: &table_end,
                body: &const_map,
            },
            Region {
                start: gen::conv_table::START,
                end: &table_end,
                body: &conv,
            },
            Region {
                start: gen::op_info::START,
                end: &table_end,
                body: &info,
            },
        ],
        config.dry_run,
    )?;

    changed |= patch_file(
        &config.ir_ast_c,
        &[Region {
            start: gen::ast_switch::START,
            end: gen::ast_switch::END,
            body: &switches,
        }],
        config.dry_run,
    )?;

    Ok(changed)
}

/// Loads, validates, generates and patches in one step
pub fn run(config: &Config) -> Result<bool> {
    let model = load(config)?;
    patch(config, &model)
}
