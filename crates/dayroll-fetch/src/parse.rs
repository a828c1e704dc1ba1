//! Alpha Vantage intraday JSON parsing.

use std::str::FromStr;

use chrono::NaiveDateTime;
use dayroll_types::{MalformedQuote, Quote, QuoteBatch, SourceError, Symbol};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

const SERIES_KEY: &str = "Time Series (60min)";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const OPEN_KEY: &str = "1. open";
const CLOSE_KEY: &str = "4. close";
const VOLUME_KEY: &str = "5. volume";

/// Keys the vendor uses for error and throttling payloads.
const ERROR_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Parses an intraday response body into a quote batch.
///
/// Records that cannot be parsed are collected in
/// [`QuoteBatch::malformed`] and skipped. The returned quotes are sorted
/// most recent first regardless of the order in the payload.
///
/// # Errors
///
/// Returns [`SourceError::Api`] if the vendor answered with an error
/// payload, or [`SourceError::InvalidResponse`] if the body is not JSON or
/// carries no hourly series.
pub fn parse_intraday(symbol: &Symbol, body: &str) -> Result<QuoteBatch, SourceError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| SourceError::InvalidResponse(format!("body is not JSON: {e}")))?;

    let Some(root) = root.as_object() else {
        return Err(SourceError::InvalidResponse(
            "top-level value is not an object".into(),
        ));
    };

    if let Some(message) = ERROR_KEYS
        .iter()
        .find_map(|key| root.get(*key).and_then(Value::as_str))
    {
        return Err(SourceError::Api(message.to_string()));
    }

    let series = root
        .get(SERIES_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| SourceError::InvalidResponse(format!("missing '{SERIES_KEY}'")))?;

    let mut quotes = Vec::with_capacity(series.len());
    let mut malformed = Vec::new();

    for (key, record) in series {
        match parse_record(symbol, key, record) {
            Ok(quote) => quotes.push(quote),
            Err(reason) => malformed.push(MalformedQuote::new(symbol.clone(), key, reason)),
        }
    }

    quotes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(QuoteBatch::with_malformed(symbol.clone(), quotes, malformed))
}

fn parse_record(symbol: &Symbol, key: &str, record: &Value) -> Result<Quote, String> {
    let timestamp = NaiveDateTime::parse_from_str(key, TIMESTAMP_FORMAT)
        .map_err(|e| format!("bad timestamp: {e}"))?;

    let fields = record
        .as_object()
        .ok_or_else(|| "record is not an object".to_string())?;

    let open_price = price_field(fields, OPEN_KEY)?;
    let close_price = price_field(fields, CLOSE_KEY)?;
    let volume = volume_field(fields)?;

    Ok(Quote::new(
        symbol.clone(),
        timestamp,
        open_price,
        close_price,
        volume,
    ))
}

fn price_field(fields: &Map<String, Value>, key: &str) -> Result<Decimal, String> {
    let value = fields.get(key).ok_or_else(|| format!("missing '{key}'"))?;
    let price = match value {
        Value::String(s) => Decimal::from_str(s.trim()),
        Value::Number(n) => Decimal::from_str(&n.to_string()),
        _ => return Err(format!("'{key}' is not a number")),
    }
    .map_err(|e| format!("'{key}': {e}"))?;

    if price.is_sign_negative() {
        return Err(format!("'{key}' is negative: {price}"));
    }
    Ok(price)
}

fn volume_field(fields: &Map<String, Value>) -> Result<u64, String> {
    let value = fields
        .get(VOLUME_KEY)
        .ok_or_else(|| format!("missing '{VOLUME_KEY}'"))?;
    match value {
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("'{VOLUME_KEY}': {e}")),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| format!("'{VOLUME_KEY}' is not a non-negative integer")),
        _ => Err(format!("'{VOLUME_KEY}' is not a number")),
    }
}
