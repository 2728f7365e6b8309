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

use hackasm::assemble_source;
use hackasm::expand_macros_only;
use hackasm::file_reader::MockFileReader;

fn bits_to_u16(line: &str) -> u16 {
    u16::from_str_radix(line, 2).unwrap()
}

#[test]
fn ld_constant_into_d() {
    let out = assemble_source("$LD(D,42)\n").unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].len(), 16);
    assert!(out[0].starts_with('0'));
    assert_eq!(bits_to_u16(&out[0]), 42);
    assert_eq!(out[1], "1110110000010000"); // D=A
}

#[test]
fn add_with_two_addresses() {
    let out = assemble_source("@x\nM=0\n@y\nM=1\n$ADD(D,@x,@y)\n").unwrap();
    assert!(!out.is_empty());
    assert!(out.iter().all(|l| l.len() == 16));
}

#[test]
fn and_logical_true_cases() {
    let out = assemble_source("@x\nM=1\n@y\nM=1\n$AND(D,@x,@y)\n").unwrap();
    assert!(out.iter().all(|l| l.len() == 16 && l.chars().all(|c| c == '0' || c == '1')));
}

#[test]
fn and_rejects_m_d_forbidden_combination() {
    let err = assemble_source("$AND(D,M,D)\n").unwrap_err();
    assert!(format!("{err:?}").contains("MCR"));
}

#[test]
fn mult_of_address_and_constant() {
    let out = assemble_source("@x\nM=7\n$MULT(@r,7,@x)\n").unwrap();
    assert!(out.iter().all(|l| l.len() == 16));
}

#[test]
fn if_block_with_braces_expands_and_encodes() {
    let src = "$IF(D){\n@5\n0;JMP\n}\n";
    let out = assemble_source(src).unwrap();
    assert!(out.iter().all(|l| l.len() == 16));
}

#[test]
fn loop_block_expands_and_encodes() {
    let src = "@count\nM=3\n$LOOP(@count){\n@count\nM=M-1\n}\n";
    let out = assemble_source(src).unwrap();
    assert!(out.iter().all(|l| l.len() == 16));
}

#[test]
fn halt_is_a_self_jump() {
    let out = assemble_source("$HALT()\n").unwrap();
    // The label declaration contributes no machine-code line; only the
    // `@__halt_0` / `0;JMP` pair does.
    assert_eq!(out.len(), 2);
    assert_eq!(out[0], "0000000000000000"); // @__halt_0, which resolves to address 0
    assert_eq!(out[1], "1110101010000111"); // 0;JMP
}

#[test]
fn expand_macros_only_leaves_no_dollar_tokens() {
    let expanded = expand_macros_only("$LD(D,42)\n$HALT()\n").unwrap();
    assert!(!expanded.lines().any(|l| l.trim_start().starts_with('$')));
}

#[test]
fn labels_and_variables_resolve_through_the_mock_reader() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "(START)\n@START\n0;JMP\n@counter\nM=0\n");

    let machine_code = hackasm::assemble_file(std::path::Path::new("test.asm"), &reader).unwrap();
    assert_eq!(machine_code.len(), 4);
    assert_eq!(bits_to_u16(&machine_code[0]), 0); // @START resolves to address 0
    assert_eq!(bits_to_u16(&machine_code[3]), 16); // @counter allocated at 16
}

#[test]
fn duplicate_label_declaration_is_rejected() {
    let err = assemble_source("(LOOP)\n@0\n0;JMP\n(LOOP)\n@0\n0;JMP\n").unwrap_err();
    assert!(format!("{err:?}").contains("SYM"));
}

#[test]
fn unknown_computation_is_a_com_error() {
    let err = assemble_source("D=D+D\n").unwrap_err();
    assert!(format!("{err:?}").contains("COM"));
}

#[test]
fn division_by_zero_folds_to_zero() {
    let out = assemble_source("$DIV(D,7,0)\n").unwrap();
    assert!(out.iter().all(|l| l.len() == 16));
    // D=0 encodes as comp "0" -> 101010
    assert_eq!(out.last().unwrap(), "1110101010010000");
}

#[test]
fn pow_folds_fully_constant_arguments() {
    let out = assemble_source("$POW(D,2,10)\n").unwrap();
    assert!(out.iter().all(|l| l.len() == 16));
    assert_eq!(bits_to_u16(&out[0]), 1024);
}

#[test]
fn swap_self_swap_is_a_no_op() {
    let out = assemble_source("$SWAP(D,D)\n").unwrap();
    assert!(out.is_empty());
}
