/// Parses a currency-formatted price such as `£51.77`
///
/// Everything before the first digit or decimal point is treated as the
/// currency symbol and dropped. This also covers the UTF-8 pound sign read as
/// Latin-1 (`Â£`). Thousands separators are removed. Returns `None` for
/// negative, non-finite, or otherwise unparseable amounts.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let start = trimmed.find(|c: char| c.is_ascii_digit() || c == '.')?;
    let (symbol, amount) = trimmed.split_at(start);

    if symbol.contains('-') {
        return None;
    }

    let amount: String = amount.trim().chars().filter(|c| *c != ',').collect();
    let value: f64 = amount.parse().ok()?;

    (value.is_finite() && value >= 0.0).then_some(value)
}
