//! Regex rewrites applied before any token-level filtering.
//!
//! Order matters: each rewrite sees the output of the previous one. Every
//! redaction is replaced by a single space so neighbouring words never fuse.

use std::sync::LazyLock;

use regex::Regex;

const MONTHS: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

/// Month name followed by a four-digit year or an apostrophe year.
fn month_year() -> String {
    format!(r"\b(?:{MONTHS})\.?[ \t,/\-]*(?:'\d{{2}}|(?:19|20)\d{{2}})\b")
}

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}\b").unwrap());

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[ \t.\-]?)?(?:\(\d{2,4}\)|\b\d{2,4})[ \t.\-]?\d{3,5}[ \t.\-]?\d{3,5}\b")
        .unwrap()
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());

static PROFILE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:[a-z0-9\-]+\.)*(?:linkedin|github|gitlab|bitbucket|behance|dribbble|medium|stackoverflow|kaggle|leetcode|twitter)\.(?:com|io|org|in)\b(?:/\S*)?",
    )
    .unwrap()
});

// A dash only counts as a separator after whitespace, so "GitHub-Actions" is not a label.
static CONTACT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:e-?mail(?:\s+id)?|phone|mobile|mob|cell|tel(?:ephone)?|contact(?:\s+no\.?)?|address|linkedin|github|portfolio|website|skype)[ \t]*(?::|[ \t]+-)[ \t]*(?:\S+(?:[ \t]+\S+){0,2})?",
    )
    .unwrap()
});

static MONTH_YEAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    let my = month_year();
    Regex::new(&format!(
        r"(?i){my}[ \t]*(?:-|–|—|to)[ \t]*(?:{my}|present|current|now|till\s+date)"
    ))
    .unwrap()
});

static YEAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:19|20)\d{2}[ \t]*(?:-|–|—|to)[ \t]*(?:(?:19|20)\d{2}|present|current|now|till\s+date)\b")
        .unwrap()
});

static MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i){}", month_year())).unwrap());

static NUMERIC_MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:0?[1-9]|1[0-2])[/.\-](?:19|20)\d{2}\b").unwrap());

static DATE_OF_BIRTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:\bdate\s+of\s+birth|\bd\.o\.b\.?|\bdob\b)[ \t]*[:\-]?[ \t]*(?:\d{{1,2}}(?:st|nd|rd|th)?(?:[ \t./\-]+(?:(?:{MONTHS})\.?|\d{{1,2}})[ \t./,\-]+\d{{2,4}})?\b|\d{{4}}[./\-]\d{{1,2}}[./\-]\d{{1,2}}\b)?"
    ))
    .unwrap()
});

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:curriculum\s+vitae|r[eé]sum[eé]|cv|summary|objective|profile|references)\b")
        .unwrap()
});

// '+' and '#' survive so tokens like C++ and C# stay intact.
static SYMBOLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[•●▪■□◆◇○◦‣∙·➢➤►▶✓✔★–—_=\~\^\*"'`“”‘’\(\)\[\]\{\}<>/\\:;,\.!\?@%\&\$\-]"#)
        .unwrap()
});

static THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}(?:,\d{3})+\b").unwrap());

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").unwrap());

static PIPES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|+").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Runs the regex rewrites in order and returns single-space separated text.
pub fn redact(raw: &str) -> String {
    let mut text = raw.to_string();

    for pattern in [
        &*EMAIL,
        &*PHONE,
        &*URL,
        &*PROFILE_DOMAIN,
        &*CONTACT_LABEL,
        &*MONTH_YEAR_RANGE,
        &*YEAR_RANGE,
        &*MONTH_YEAR,
        &*NUMERIC_MONTH_YEAR,
        &*DATE_OF_BIRTH,
        &*SECTION_HEADER,
        // Thousands separators go before the comma itself is stripped.
        &*THOUSANDS,
        &*SYMBOLS,
        &*NUMBER,
        &*PIPES,
        &*WHITESPACE,
    ] {
        text = pattern.replace_all(&text, " ").into_owned();
    }

    text.trim().to_string()
}
