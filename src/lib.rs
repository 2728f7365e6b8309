/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod file_reader;
pub mod macros;
pub mod parser;

use std::path::Path;

use anyhow::{Context, Result};
use file_reader::FileReader;

extern crate pest;
extern crate pest_derive;

/// Runs the full pipeline (comment stripping, macro expansion to
/// fixpoint, label/variable resolution, encoding) on one source file,
/// returning the 16-character `0`/`1` lines of its assembled output.
pub fn assemble_file<F: FileReader>(source_path: &Path, reader: &F) -> Result<Vec<String>> {
    let source = reader
        .read_to_string(source_path)
        .context("Failed to read source file")?;
    assemble_source(&source).context("Failed during assembly")
}

/// Runs the full pipeline on source text already in memory.
pub fn assemble_source(source: &str) -> Result<Vec<String>> {
    let program = parser::parse_source(source).context("Failed during parsing stage")?;
    let machine_code = assembler::encode_program(&program).context("Failed during encoding stage")?;
    Ok(machine_code)
}

/// Runs only the comment-stripping and macro-expansion stages, returning
/// the expanded source text (`--expand-macros-only` mode).
pub fn expand_macros_only(source: &str) -> Result<String> {
    parser::expand_to_text(source).context("Failed during macro expansion")
}
