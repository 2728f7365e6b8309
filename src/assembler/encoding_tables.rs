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

//! The fixed comp/dest/jump lookup tables Pass C encodes against.

/// `comp` mnemonic, with commutative aliases listed alongside their
/// canonical form, to its 7-bit field (`a` is the high bit).
pub fn comp_bits(token: &str) -> Option<&'static str> {
    Some(match token {
        "0" => "0101010",
        "1" => "0111111",
        "-1" => "0111010",
        "D" => "0001100",
        "A" => "0110000",
        "!D" => "0001101",
        "!A" => "0110001",
        "-D" => "0001111",
        "-A" => "0110011",
        "D+1" => "0011111",
        "A+1" => "0110111",
        "D-1" => "0001110",
        "A-1" => "0110010",
        "D+A" | "A+D" => "0000010",
        "D-A" => "0010011",
        "A-D" => "0000111",
        "D&A" | "A&D" => "0000000",
        "D|A" | "A|D" => "0010101",
        "M" => "1110000",
        "!M" => "1110001",
        "-M" => "1110011",
        "M+1" => "1110111",
        "M-1" => "1110010",
        "D+M" | "M+D" => "1000010",
        "D-M" => "1010011",
        "M-D" => "1000111",
        "D&M" | "M&D" => "1000000",
        "D|M" | "M|D" => "1010101",
        _ => return None,
    })
}

/// Destination subset mnemonic to its 3-bit field (A, D, M order).
pub fn dest_bits(token: &str) -> Option<&'static str> {
    Some(match token {
        "" => "000",
        "M" => "001",
        "D" => "010",
        "MD" => "011",
        "A" => "100",
        "AM" => "101",
        "AD" => "110",
        "AMD" => "111",
        _ => return None,
    })
}

/// Jump mnemonic to its 3-bit field.
pub fn jump_bits(token: &str) -> Option<&'static str> {
    Some(match token {
        "" => "000",
        "JGT" => "001",
        "JEQ" => "010",
        "JGE" => "011",
        "JLT" => "100",
        "JNE" => "101",
        "JLE" => "110",
        "JMP" => "111",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_resolve() {
        assert_eq!(comp_bits("D+A"), comp_bits("A+D"));
        assert_eq!(dest_bits("AMD"), Some("111"));
        assert_eq!(jump_bits("JMP"), Some("111"));
    }

    #[test]
    fn unknown_tokens_are_none() {
        assert_eq!(comp_bits("D+D"), None);
        assert_eq!(dest_bits("DA"), None);
    }
}
