//! Trading pair normalization
//!
//! Markets arrive as `SOL-USDC`, `SOL/USDC` or `SOLUSDC` depending on the
//! caller; every map in this crate is keyed by the canonical form.

/// Canonicalize a trading pair: strip separators and uppercase.
pub fn normalize_pair(trading_pair: &str) -> String {
    trading_pair
        .chars()
        .filter(|c| *c != '-' && *c != '/')
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_separators() {
        assert_eq!(normalize_pair("SOL-USDC"), "SOLUSDC");
        assert_eq!(normalize_pair("SOL/USDC"), "SOLUSDC");
        assert_eq!(normalize_pair("SOLUSDC"), "SOLUSDC");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(normalize_pair("sol-usdc"), "SOLUSDC");
        assert_eq!(normalize_pair("Sol/Usdc"), normalize_pair("SOL-USDC"));
    }

    #[test]
    fn test_empty_pair() {
        assert_eq!(normalize_pair(""), "");
    }
}
