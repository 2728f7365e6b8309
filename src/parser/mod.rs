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

//! The line pipeline: comment stripping, the macro-expansion fixpoint
//! loop, and final classification into primitive [`Instruction`]s for the
//! assembler passes.

use pest::Parser;

use crate::assembler::{ASymbol, Instruction};
use crate::errors::AssemblyError;
use crate::macros::control_flow::{close_block, BlockKind};
use crate::macros::{expand, Expansion};

#[derive(pest_derive::Parser)]
#[grammar = "grammar.pest"]
struct LineGrammar;

/// One line of source text, tagged with its originating line number for
/// diagnostics. Generated lines inherit the line number of the macro
/// invocation that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    pub line: i64,
}

/// Stage 1: strips `//` line comments and `/* ... */` block comments
/// (which may span multiple lines), then drops blank lines. An
/// unmatched `*/` is a [`AssemblyError::CommentStructure`] error.
pub fn strip_comments(source: &str) -> Result<Vec<SourceLine>, AssemblyError> {
    let mut in_block = false;
    let mut out = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line_no = (idx + 1) as i64;
        let chars: Vec<char> = raw.chars().collect();
        let mut kept = String::new();
        let mut i = 0;
        while i < chars.len() {
            if in_block {
                if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    in_block = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }
            if chars[i] == '/' && chars.get(i + 1) == Some(&'/') {
                break;
            }
            if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
                in_block = true;
                i += 2;
                continue;
            }
            if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                return Err(AssemblyError::comment(line_no, "Unmatched `*/`"));
            }
            kept.push(chars[i]);
            i += 1;
        }
        let trimmed = kept.trim();
        if !trimmed.is_empty() {
            out.push(SourceLine { text: trimmed.to_string(), line: line_no });
        }
    }
    if in_block {
        return Err(AssemblyError::comment(-1, "Unterminated block comment"));
    }
    Ok(out)
}

/// What one line's text resolves to, before any macro expansion is applied.
enum Classified {
    Label(String),
    MacroClose,
    MacroInvocation { name: String, args: Vec<String>, marker: Marker },
    Raw,
}

enum Marker {
    None,
    Open,
    OpenClose,
}

fn classify(text: &str) -> Classified {
    if let Ok(mut pairs) = LineGrammar::parse(Rule::label_decl, text) {
        let name = pairs
            .next()
            .unwrap()
            .into_inner()
            .find(|p| p.as_rule() == Rule::name)
            .unwrap()
            .as_str()
            .to_string();
        return Classified::Label(name);
    }
    if LineGrammar::parse(Rule::macro_close, text).is_ok() {
        return Classified::MacroClose;
    }
    if let Ok(mut pairs) = LineGrammar::parse(Rule::macro_invocation, text) {
        let mut name = String::new();
        let mut args = Vec::new();
        let mut marker = Marker::None;
        for p in pairs.next().unwrap().into_inner() {
            match p.as_rule() {
                Rule::macro_name => name = p.as_str().to_string(),
                Rule::arg_list => {
                    for a in p.into_inner() {
                        if a.as_rule() == Rule::arg {
                            args.push(a.as_str().trim().to_string());
                        }
                    }
                }
                Rule::body_marker => {
                    marker = if p.as_str() == "{}" { Marker::OpenClose } else { Marker::Open };
                }
                _ => {}
            }
        }
        return Classified::MacroInvocation { name, args, marker };
    }
    Classified::Raw
}

/// Every `(label)` declaration and `@symbol` reference in the user's
/// original source, checked once before any expansion, so macro-generated
/// scratch names (which legitimately match the same patterns) are never
/// mistaken for a collision.
fn validate_no_reserved_collisions(lines: &[SourceLine]) -> Result<(), AssemblyError> {
    for l in lines {
        let t = l.text.trim();
        if let Some(name) = t.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            check_name(name, l.line)?;
        }
        let bytes = t.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'@' {
                let start = i + 1;
                let mut j = start;
                while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_' || bytes[j] == b'.') {
                    j += 1;
                }
                let name = &t[start..j];
                if !name.is_empty() && name.parse::<i64>().is_err() {
                    check_name(name, l.line)?;
                }
                i = j;
            } else {
                i += 1;
            }
        }
    }
    Ok(())
}

fn check_name(name: &str, line: i64) -> Result<(), AssemblyError> {
    if crate::ast::is_reserved_name(name) {
        Err(AssemblyError::macro_err(line, format!("`{name}` collides with a reserved name")))
    } else {
        Ok(())
    }
}

fn push_lines(out: &mut Vec<SourceLine>, text: &str, line: i64) {
    for l in text.lines() {
        let t = l.trim();
        if !t.is_empty() {
            out.push(SourceLine { text: t.to_string(), line });
        }
    }
}

struct Frame {
    kind: BlockKind,
    auto: bool,
}

fn drain_auto_frames(stack: &mut Vec<Frame>, out: &mut Vec<SourceLine>, line: i64) {
    while matches!(stack.last(), Some(f) if f.auto) {
        let frame = stack.pop().unwrap();
        push_lines(out, &close_block(&frame.kind), line);
    }
}

/// One full walk of the line pipeline's expansion primitive: every line
/// is fed to the macro dispatcher (if it names one), the result is
/// re-linearized, and block bookkeeping is threaded across the walk.
fn expand_one_pass(lines: &[SourceLine], next_p: &mut usize) -> Result<Vec<SourceLine>, AssemblyError> {
    let mut out = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for line in lines {
        match classify(&line.text) {
            Classified::Raw => {
                push_lines(&mut out, &line.text, line.line);
                drain_auto_frames(&mut stack, &mut out, line.line);
            }
            Classified::Label(name) => {
                push_lines(&mut out, &format!("({name})"), line.line);
                drain_auto_frames(&mut stack, &mut out, line.line);
            }
            Classified::MacroClose => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| AssemblyError::macro_err(line.line, "`}` with no matching open block"))?;
                push_lines(&mut out, &close_block(&frame.kind), line.line);
                drain_auto_frames(&mut stack, &mut out, line.line);
            }
            Classified::MacroInvocation { name, args, marker } => {
                let p = *next_p;
                *next_p += 1;
                let expansion = expand(&name, &args, p, line.line)?;
                match (expansion, marker) {
                    (Expansion::Text(text), Marker::None) => {
                        push_lines(&mut out, &text, line.line);
                        drain_auto_frames(&mut stack, &mut out, line.line);
                    }
                    (Expansion::Text(_), Marker::Open) | (Expansion::Text(_), Marker::OpenClose) => {
                        return Err(AssemblyError::macro_err(
                            line.line,
                            format!("`${name}` is not a block macro and cannot take a body"),
                        ));
                    }
                    (Expansion::BlockOpen(text, kind), Marker::None) => {
                        push_lines(&mut out, &text, line.line);
                        stack.push(Frame { kind, auto: true });
                    }
                    (Expansion::BlockOpen(text, kind), Marker::Open) => {
                        push_lines(&mut out, &text, line.line);
                        stack.push(Frame { kind, auto: false });
                    }
                    (Expansion::BlockOpen(text, kind), Marker::OpenClose) => {
                        push_lines(&mut out, &text, line.line);
                        push_lines(&mut out, &close_block(&kind), line.line);
                        drain_auto_frames(&mut stack, &mut out, line.line);
                    }
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err(AssemblyError::macro_err(-1, "Unbalanced macro block: missing `}`"));
    }
    Ok(out)
}

/// A defensive cap on the number of expansion passes, well beyond any
/// realistic nesting depth, guarding against a runaway macro definition
/// instead of hanging the process.
const MAX_EXPANSION_PASSES: usize = 10_000;

/// Stage 2: repeatedly apply [`expand_one_pass`] until no line begins
/// with `$`. `p` is threaded across the whole run (never reset per pass)
/// so every macro invocation in the program gets a globally unique index.
pub fn expand_macros(lines: Vec<SourceLine>) -> Result<Vec<SourceLine>, AssemblyError> {
    validate_no_reserved_collisions(&lines)?;
    let mut current = lines;
    let mut next_p: usize = 0;
    for _ in 0..MAX_EXPANSION_PASSES {
        if !current.iter().any(|l| l.text.trim_start().starts_with('$')) {
            return Ok(current);
        }
        current = expand_one_pass(&current, &mut next_p)?;
    }
    Err(AssemblyError::macro_err(-1, "Macro expansion did not reach a fixpoint"))
}

/// Stage 3 (classification half): turns a fully macro-expanded line into
/// a primitive [`Instruction`] — label declaration, A-instruction, or
/// C-instruction.
fn classify_primitive(text: &str, line: i64) -> Result<Instruction, AssemblyError> {
    if let Some(name) = text.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        return Ok(Instruction::Label(name.to_string()));
    }
    if let Some(rest) = text.strip_prefix('@') {
        return Ok(Instruction::AInstruction(match rest.parse::<i64>() {
            Ok(n) if (0..=32767).contains(&n) => ASymbol::Number(n as u16),
            Ok(_) => {
                return Err(AssemblyError::symbol(line, format!("A-instruction constant out of range: `{rest}`")))
            }
            Err(_) => ASymbol::Name(rest.to_string()),
        }));
    }
    let (dest, rest) = match text.split_once('=') {
        Some((d, r)) => (d.to_string(), r),
        None => (String::new(), text),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((c, j)) => (c.to_string(), j.to_string()),
        None => (rest.to_string(), String::new()),
    };
    if comp.trim().is_empty() {
        return Err(AssemblyError::encoding(line, format!("Empty computation in `{text}`")));
    }
    Ok(Instruction::CInstruction { dest, comp, jump })
}

/// Runs stages 1-2 and joins the result back into text, for
/// `--expand-macros-only` mode.
pub fn expand_to_text(source: &str) -> Result<String, AssemblyError> {
    let stripped = strip_comments(source)?;
    let expanded = expand_macros(stripped)?;
    Ok(expanded.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n"))
}

/// Runs the full line pipeline (stages 1-3) and returns the primitive
/// instruction stream ready for the assembler passes.
pub fn parse_source(source: &str) -> Result<Vec<Instruction>, AssemblyError> {
    let stripped = strip_comments(source)?;
    let expanded = expand_macros(stripped)?;
    expanded.iter().map(|l| classify_primitive(&l.text, l.line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_comments_removes_line_and_block_forms() {
        let src = "@1 // a comment\n/* spans\nmultiple */@2\n";
        let out = strip_comments(src).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "@1");
        assert_eq!(out[1].text, "@2");
    }

    #[test]
    fn unmatched_close_is_an_error() {
        assert!(strip_comments("D=A */").is_err());
    }

    #[test]
    fn simple_macro_expands_inline() {
        let lines = vec![SourceLine { text: "$LD(D,42)".to_string(), line: 1 }];
        let out = expand_macros(lines).unwrap();
        assert!(!out.iter().any(|l| l.text.starts_with('$')));
        assert_eq!(out[0].text, "@42");
        assert_eq!(out[1].text, "D=A");
    }

    #[test]
    fn if_block_with_braces_round_trips() {
        let lines = vec![
            SourceLine { text: "$IF(D){".to_string(), line: 1 },
            SourceLine { text: "@5".to_string(), line: 2 },
            SourceLine { text: "D=A".to_string(), line: 2 },
            SourceLine { text: "}".to_string(), line: 3 },
        ];
        let out = expand_macros(lines).unwrap();
        assert!(out.iter().any(|l| l.text.starts_with("(__if_")));
    }

    #[test]
    fn implicit_single_statement_body_closes_after_next_line() {
        let lines = vec![
            SourceLine { text: "$IF(D)".to_string(), line: 1 },
            SourceLine { text: "@5".to_string(), line: 2 },
            SourceLine { text: "0;JMP".to_string(), line: 3 },
        ];
        let out = expand_macros(lines).unwrap();
        let close_pos = out.iter().position(|l| l.text.starts_with("(__if_")).unwrap();
        let at_pos = out.iter().position(|l| l.text == "@5").unwrap();
        let jmp_pos = out.iter().position(|l| l.text == "0;JMP").unwrap();
        assert!(at_pos < close_pos && close_pos < jmp_pos);
    }

    #[test]
    fn unclosed_block_is_unbalanced() {
        let lines = vec![SourceLine { text: "$IF(D){".to_string(), line: 1 }];
        assert!(expand_macros(lines).is_err());
    }

    #[test]
    fn reserved_name_in_source_is_rejected() {
        let lines = vec![SourceLine { text: "(__aux)".to_string(), line: 1 }];
        assert!(expand_macros(lines).is_err());
    }

    #[test]
    fn parse_source_classifies_label_a_and_c_instructions() {
        let program = parse_source("(LOOP)\n@LOOP\nD=A;JGT\n").unwrap();
        assert_eq!(program[0], Instruction::Label("LOOP".to_string()));
        assert_eq!(program[1], Instruction::AInstruction(ASymbol::Name("LOOP".to_string())));
        assert_eq!(
            program[2],
            Instruction::CInstruction { dest: "D".to_string(), comp: "A".to_string(), jump: "JGT".to_string() }
        );
    }
}
