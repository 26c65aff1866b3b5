//! Supported asset universe.
//!
//! Asset ids are the upstream market-data identifiers (lower-case slugs).
//! Lists from the command line or config are comma-separated.

use crate::domain::error::SmartTraderError;
use std::collections::HashSet;

pub const SUPPORTED_ASSETS: [(&str, &str); 15] = [
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("cardano", "ADA"),
    ("solana", "SOL"),
    ("polkadot", "DOT"),
    ("binancecoin", "BNB"),
    ("ripple", "XRP"),
    ("dogecoin", "DOGE"),
    ("avalanche-2", "AVAX"),
    ("chainlink", "LINK"),
    ("polygon", "MATIC"),
    ("uniswap", "UNI"),
    ("stellar", "XLM"),
    ("cosmos", "ATOM"),
    ("litecoin", "LTC"),
];

pub fn symbol_for(asset: &str) -> Option<&'static str> {
    SUPPORTED_ASSETS
        .iter()
        .find(|(id, _)| *id == asset)
        .map(|(_, symbol)| *symbol)
}

pub fn is_supported(asset: &str) -> bool {
    symbol_for(asset).is_some()
}

/// Normalizes `asset` and rejects ids outside the universe.
pub fn validate_asset(asset: &str) -> Result<String, SmartTraderError> {
    let id = asset.trim().to_lowercase();
    if is_supported(&id) {
        Ok(id)
    } else {
        Err(SmartTraderError::UnsupportedAsset(asset.trim().to_string()))
    }
}

pub fn parse_assets(input: &str) -> Result<Vec<String>, SmartTraderError> {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SmartTraderError::Data {
                reason: "empty token in asset list".to_string(),
            });
        }
        let asset = validate_asset(trimmed)?;
        if !seen.insert(asset.clone()) {
            return Err(SmartTraderError::Data {
                reason: format!("duplicate asset: {asset}"),
            });
        }
        assets.push(asset);
    }

    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols() {
        assert_eq!(symbol_for("bitcoin"), Some("BTC"));
        assert_eq!(symbol_for("avalanche-2"), Some("AVAX"));
        assert_eq!(symbol_for("BTC"), None);
    }

    #[test]
    fn universe_has_no_duplicates() {
        let ids: HashSet<_> = SUPPORTED_ASSETS.iter().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), SUPPORTED_ASSETS.len());
    }

    #[test]
    fn validate_normalizes_case() {
        assert_eq!(validate_asset(" Ethereum ").unwrap(), "ethereum");
    }

    #[test]
    fn validate_rejects_unknown() {
        let err = validate_asset("shibacoin").unwrap_err();
        assert!(matches!(err, SmartTraderError::UnsupportedAsset(ref a) if a == "shibacoin"));
    }

    #[test]
    fn parse_single() {
        assert_eq!(parse_assets("bitcoin").unwrap(), vec!["bitcoin"]);
    }

    #[test]
    fn parse_multiple_with_whitespace() {
        assert_eq!(
            parse_assets(" bitcoin , solana,litecoin ").unwrap(),
            vec!["bitcoin", "solana", "litecoin"]
        );
    }

    #[test]
    fn parse_empty_token() {
        assert!(matches!(
            parse_assets("bitcoin,,solana"),
            Err(SmartTraderError::Data { .. })
        ));
        assert!(parse_assets("").is_err());
    }

    #[test]
    fn parse_duplicate_is_case_insensitive() {
        let err = parse_assets("bitcoin,BITCOIN").unwrap_err();
        assert!(err.to_string().contains("duplicate asset: bitcoin"));
    }

    #[test]
    fn parse_unsupported() {
        assert!(matches!(
            parse_assets("bitcoin,dogwifhat"),
            Err(SmartTraderError::UnsupportedAsset(_))
        ));
    }
}
