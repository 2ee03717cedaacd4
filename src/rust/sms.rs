//! Pulls structured transaction details out of a bank SMS.
//!
//! This is pattern matching only and runs independently of the classifier.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref AMOUNT: Regex =
        Regex::new(r"(?i)(?:\b(?:rs\.?|inr)|₹)\s*([0-9][0-9,]*(?:\.[0-9]+)?)").expect("amount pattern is valid");
    static ref DIRECTION: Regex = Regex::new(
        r"(?i)\b(debited|credited|received|deposited|spent|paid|sent|deducted|withdrawn|payment|purchase|transferred|mandate|autopay|transaction)\b"
    )
    .expect("direction pattern is valid");
    static ref VPA: Regex = Regex::new(r"\b([A-Za-z0-9][A-Za-z0-9._-]*@[A-Za-z]{2,})\b").expect("vpa pattern is valid");
    static ref PREPOSITION_TARGET: Regex =
        Regex::new(r"(?i)\b(?:to|at|towards)\s+([A-Za-z][A-Za-z0-9&._-]+)").expect("merchant pattern is valid");
    static ref DATE: Regex = Regex::new(
        r"(?i)\b(\d{1,2}[-/](?:\d{1,2}|[A-Za-z]{3})[-/]\d{2,4}|\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+\d{2,4})\b"
    )
    .expect("date pattern is valid");
    static ref TIME: Regex = Regex::new(r"(?i)\b(\d{1,2}:\d{2}(?:\s*[ap]m)?)\b").expect("time pattern is valid");
    static ref REFERENCE: Regex =
        Regex::new(r"(?i)\bref(?:erence)?\.?\s*(?:no\.?|number|id)?\s*:?\s*(\d{6,})").expect("reference pattern is valid");
}

/// Merchants that show up often enough in UPI alerts to be matched by name.
const KNOWN_MERCHANTS: &[(&str, &str)] = &[
    ("paytm", "Paytm"),
    ("swiggy", "Swiggy"),
    ("zomato", "Zomato"),
    ("amazon", "Amazon"),
    ("flipkart", "Flipkart"),
    ("myntra", "Myntra"),
    ("uber", "Uber"),
    ("ola", "Ola"),
    ("netflix", "Netflix"),
    ("spotify", "Spotify"),
    ("hotstar", "Hotstar"),
    ("airtel", "Airtel"),
    ("bescom", "BESCOM"),
    ("irctc", "IRCTC"),
    ("makemytrip", "MakeMyTrip"),
];

/// Words that follow "to"/"at" in alerts without naming a counterparty.
const NOT_A_MERCHANT: &[&str] = &["your", "you", "the", "a", "an", "ac", "a/c", "account", "rs", "inr"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub direction: Option<Direction>,
    pub counterparty: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reference: Option<String>,
    /// Share of fields that were found, weighted by how useful each one is.
    pub confidence: f64,
}

fn extract_amount(text: &str) -> Option<f64> {
    AMOUNT
        .captures_iter(text)
        .filter_map(|caps| caps[1].replace(',', "").parse::<f64>().ok())
        .find(|amount| *amount > 0.0)
}

fn extract_direction(text: &str) -> Option<Direction> {
    let keyword = DIRECTION.captures(text)?[1].to_ascii_lowercase();
    match keyword.as_str() {
        "credited" | "received" | "deposited" => Some(Direction::Credit),
        _ => Some(Direction::Debit),
    }
}

fn extract_counterparty(text: &str) -> Option<String> {
    if let Some(caps) = VPA.captures(text) {
        return Some(caps[1].to_string());
    }

    let lowered = text.to_ascii_lowercase();
    for (needle, name) in KNOWN_MERCHANTS {
        let found = lowered.match_indices(needle).any(|(start, _)| {
            let end = start + needle.len();
            let before = lowered[..start].chars().next_back();
            let after = lowered[end..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        });
        if found {
            return Some(name.to_string());
        }
    }

    PREPOSITION_TARGET
        .captures_iter(text)
        .map(|caps| caps[1].trim_end_matches('.').to_string())
        .find(|word| !NOT_A_MERCHANT.contains(&word.to_ascii_lowercase().as_str()))
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern.captures(text).map(|caps| caps[1].to_string())
}

/// Extracts whatever transaction details `text` carries. Missing pieces stay `None`.
pub fn parse_sms(text: &str) -> TransactionDetails {
    let text = text.trim();
    let mut details = TransactionDetails {
        amount: extract_amount(text),
        direction: extract_direction(text),
        counterparty: extract_counterparty(text),
        date: first_capture(&DATE, text),
        time: first_capture(&TIME, text),
        reference: first_capture(&REFERENCE, text),
        confidence: 0.0,
    };

    let mut confidence = 0.0;
    if details.amount.is_some() {
        confidence += 0.4;
    }
    if details.direction.is_some() {
        confidence += 0.3;
    }
    if details.counterparty.is_some() {
        confidence += 0.2;
    }
    if details.date.is_some() {
        confidence += 0.1;
    }
    if details.time.is_some() {
        confidence += 0.05;
    }
    details.confidence = (f64::min(confidence, 1.0) * 100.0).round() / 100.0;
    details
}
