use ethers::types::U256;

/// Decimals of the native currency on every supported chain.
pub const NATIVE_DECIMALS: usize = 18;

/// Render a wei amount in whole units, trimming trailing zeros the way wallets
/// display balances (`1.0`, `0.25`, `0.000000000000000001`).
pub fn format_ether(wei: U256) -> String {
    let full = ethers::utils::format_ether(wei);
    match full.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => format!("{}.0", full),
    }
}

/// Parse a decimal amount in whole units into wei.
///
/// Only plain unsigned decimals are accepted; signs, exponents and more than
/// 18 fractional digits are rejected rather than silently rounded.
pub fn parse_ether(amount: &str) -> Result<U256, String> {
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err("amount is empty".to_string());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("{:?} is not a decimal number", amount));
    }
    if fraction.len() > NATIVE_DECIMALS {
        return Err(format!("at most {} decimal places are supported", NATIVE_DECIMALS));
    }

    let too_large = || format!("{:?} is too large", amount);
    let whole = U256::from_dec_str(if whole.is_empty() { "0" } else { whole }).map_err(|_| too_large())?;
    let fraction = U256::from_dec_str(&format!("{:0<width$}", fraction, width = NATIVE_DECIMALS))
        .map_err(|e| format!("{:?}: {:?}", amount, e))?;

    // checked: a whole part past ~1.15e59 no longer fits in 256 bits of wei
    whole
        .checked_mul(U256::exp10(NATIVE_DECIMALS))
        .and_then(|wei| wei.checked_add(fraction))
        .ok_or_else(too_large)
}
