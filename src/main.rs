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

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use hackasm::errors::AssemblyError;
use hackasm::file_reader::{AsmFileReader, FileReader};

#[derive(ClapParser)]
#[clap(version = "0.1.0", author = "Connor Nolan")]
struct Opts {
    /// Source files to assemble, processed independently.
    inputs: Vec<PathBuf>,
    /// Run only the comment-strip and macro-expansion stages, writing the
    /// expanded source back out instead of assembled machine code.
    #[clap(long)]
    expand_macros_only: bool,
}

fn output_path(input: &PathBuf, expand_only: bool) -> PathBuf {
    let name = input.to_string_lossy();
    let has_asm_ext = name.to_lowercase().ends_with(".asm");
    let stem = if has_asm_ext { &name[..name.len() - 4] } else { name.as_ref() };
    if expand_only {
        PathBuf::from(format!("{stem}.expanded.asm"))
    } else {
        PathBuf::from(format!("{stem}.hack"))
    }
}

fn process_one(input: &PathBuf, expand_only: bool, reader: &AsmFileReader) -> anyhow::Result<()> {
    let source = reader.read_to_string(input)?;
    let out_path = output_path(input, expand_only);
    if expand_only {
        let expanded = hackasm::expand_macros_only(&source)?;
        fs::write(&out_path, expanded)?;
    } else {
        let machine_code = hackasm::assemble_source(&source)?;
        fs::write(&out_path, machine_code.join("\n"))?;
    }
    println!("Successfully assembled {} to {}", input.display(), out_path.display());
    Ok(())
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    let reader = AsmFileReader;

    for input in &opts.inputs {
        if let Err(err) = process_one(input, opts.expand_macros_only, &reader) {
            match err.downcast_ref::<AssemblyError>() {
                Some(asm_err) => eprintln!("{asm_err}"),
                None => eprintln!("{err}"),
            }
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
