//! Binding strength of each operator, lowest first. The parser and the trace
//! formatter both read this table.

pub const OR: u8 = 1;
pub const AND: u8 = 2;
pub const EQUALITY: u8 = 4;
pub const RELATIONAL: u8 = 5;
pub const ADDITIVE: u8 = 6;
pub const MULTIPLICATIVE: u8 = 7;
pub const UNARY: u8 = 8;
pub const ATOM: u8 = 9;

/// Precedence of a binary operator by its canonical symbol.
pub fn of_binary(op_symbol: &str) -> u8 {
    match op_symbol {
        "OR" => OR,
        "AND" => AND,
        "==" | "!=" => EQUALITY,
        ">" | ">=" | "<" | "<=" => RELATIONAL,
        "+" | "-" => ADDITIVE,
        "*" | "/" => MULTIPLICATIVE,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_operators_bind_looser_than_unary() {
        for symbol in ["OR", "AND", "==", "!=", ">", ">=", "<", "<=", "+", "-", "*", "/"] {
            let p = of_binary(symbol);
            assert!(p >= OR && p < UNARY, "{symbol} has precedence {p}");
        }
        assert!(of_binary("*") > of_binary("+"));
        assert_eq!(of_binary("XOR"), 0);
    }
}
