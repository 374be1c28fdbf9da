//! Ten-digit listing numbers used for quick lookup.

use rand::Rng;

pub const CODE_LENGTH: usize = 10;
const CODE_SPACE: u64 = 10_000_000_000;

pub fn generate() -> String {
    let n = rand::thread_rng().gen_range(0..CODE_SPACE);
    format!("{n:0width$}", width = CODE_LENGTH)
}

/// Pulls a listing code out of free text such as `#258-635-1000`.
pub fn extract(query: &str) -> Option<String> {
    let digits: String = query.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == CODE_LENGTH).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_ten_digits() {
        for _ in 0..100 {
            let code = generate();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn extracts_codes_from_formatted_input() {
        assert_eq!(extract("#2586351000").as_deref(), Some("2586351000"));
        assert_eq!(extract(" 258 635 1000 ").as_deref(), Some("2586351000"));
        assert_eq!(extract("BMW 2020"), None);
        assert_eq!(extract("25863510001"), None);
    }
}
