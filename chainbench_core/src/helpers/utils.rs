use regex::Regex;
use std::sync::LazyLock;

static ADDRESS_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").ok());

/// Rounds to two decimal places, the precision used for rps and deviations.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Integer percentage of `part` over `whole`, 0 when `whole` is 0.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }

    (part as f64 / whole as f64 * 100.0).round() as u32
}

/// `0x` followed by 40 hex digits. Used for wallets and token contracts.
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(address))
}
