use lazy_static::lazy_static;
use regex::Regex;

use crate::{Error, Result};

lazy_static! {
    static ref QUANTITY: Regex =
        Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?(?:[eE][-+]?[0-9]+)?)\s*([A-Za-z]*)\s*$")
            .expect("quantity regex is valid");
}

fn split(raw: &str) -> Result<(f64, &str)> {
    let caps = QUANTITY
        .captures(raw)
        .ok_or_else(|| Error::Validation(format!("invalid quantity: {:?}", raw)))?;
    let number = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let suffix = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let value = number
        .parse::<f64>()
        .map_err(|e| Error::Validation(format!("invalid quantity {:?}: {}", raw, e)))?;
    Ok((value, suffix))
}

/// Parse a CPU quantity into cores. `250m` is 0.25, `2` is 2.0.
pub fn parse_cpu(raw: &str) -> Result<f64> {
    match split(raw)? {
        (value, "") => Ok(value),
        (value, "m") => Ok(value / 1000.0),
        (value, "u") => Ok(value / 1_000_000.0),
        (value, "n") => Ok(value / 1_000_000_000.0),
        (_, suffix) => Err(Error::Validation(format!(
            "unknown cpu suffix {:?} in {:?}",
            suffix, raw
        ))),
    }
}

/// Parse a memory quantity into bytes. Binary (`Ki`..`Ei`) and decimal
/// (`k`/`K`..`E`) suffixes are understood.
pub fn parse_memory(raw: &str) -> Result<f64> {
    let (value, suffix) = split(raw)?;
    let multiplier: f64 = match suffix {
        "" => 1.0,
        "Ki" => 1024.0,
        "Mi" => 1024.0_f64.powi(2),
        "Gi" => 1024.0_f64.powi(3),
        "Ti" => 1024.0_f64.powi(4),
        "Pi" => 1024.0_f64.powi(5),
        "Ei" => 1024.0_f64.powi(6),
        "K" | "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        other => {
            return Err(Error::Validation(format!(
                "unknown memory suffix {:?} in {:?}",
                other, raw
            )))
        }
    };
    Ok(value * multiplier)
}
