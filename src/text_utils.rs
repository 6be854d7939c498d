use std::ops::Index;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATE_TIME_REGEX: Regex = Regex::new(
        r#"^(\d{4})-(\d{1,2})-(\d{1,2})[ T](\d{1,2}):(\d{1,2}):(\d{1,2})(\.\d{0,3})?"#
    ).unwrap();
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref ENTITY_REGEX: Regex = Regex::new(r"&[^;\s]+;").unwrap();
    static ref SPACES_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

pub const EXCERPT_WORDS: usize = 15;
const WORDS_PER_MINUTE: usize = 200;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = to_u32(caps.index(4))?;
    let mn: u32 = to_u32(caps.index(5))?;
    let s: u32 = to_u32(caps.index(6))?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date in {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time in {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Backend timestamps are mostly RFC 3339, but older posts were stored as plain
/// `YYYY-MM-DD HH:MM:SS`. Anything else counts as missing.
pub fn parse_timestamp(buf: &str) -> Option<DateTime<Utc>> {
    let buf = buf.trim();
    if buf.is_empty() {
        return None;
    }

    if let Ok(date_time) = DateTime::parse_from_rfc3339(buf) {
        return Some(date_time.with_timezone(&Utc));
    }

    parse_date_time(buf).ok().map(|naive| naive.and_utc())
}

pub fn format_date_time(date_time: &DateTime<Utc>) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

/// e.g. `Tuesday, January 2, 2024`
pub fn format_long_date(date_time: &DateTime<Utc>) -> String {
    date_time.format("%A, %B %-d, %Y").to_string()
}

pub fn strip_tags(html: &str) -> String {
    let text = TAG_REGEX.replace_all(html, " ");
    let text = ENTITY_REGEX.replace_all(&text, " ");
    SPACES_REGEX.replace_all(&text, " ").trim().to_string()
}

pub fn excerpt(html: &str, word_count: usize) -> String {
    let text = strip_tags(html);
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut res = words.iter().take(word_count).copied().collect::<Vec<_>>().join(" ");
    if words.len() > word_count {
        res.push_str("...");
    }
    res
}

/// Minutes, never less than one.
pub fn reading_time(html: &str) -> u32 {
    let text = TAG_REGEX.replace_all(html, " ");
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}
