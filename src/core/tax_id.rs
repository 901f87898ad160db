//! CNPJ (Brazilian company tax id) normalization and masking

/// Number of digits in a complete CNPJ
pub const CNPJ_LEN: usize = 14;

/// Keeps only ASCII digits, truncated to 14
pub fn cnpj_digits(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(CNPJ_LEN)
        .collect()
}

/// Applies the `00.000.000/0000-00` mask progressively, so partial input is
/// masked as far as it goes.
pub fn format_cnpj(input: &str) -> String {
    let d = cnpj_digits(input);
    let n = d.len();

    match n {
        0..=2 => d,
        3..=5 => format!("{}.{}", &d[..2], &d[2..]),
        6..=8 => format!("{}.{}.{}", &d[..2], &d[2..5], &d[5..]),
        9..=12 => format!("{}.{}.{}/{}", &d[..2], &d[2..5], &d[5..8], &d[8..]),
        _ => format!(
            "{}.{}.{}/{}-{}",
            &d[..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..]
        ),
    }
}

/// True when the input holds exactly 14 digits (mask characters ignored)
pub fn is_complete_cnpj(input: &str) -> bool {
    input.chars().filter(|c| c.is_ascii_digit()).count() == CNPJ_LEN
}
