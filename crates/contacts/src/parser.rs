//! Parser turning raw vCard records into `Contact`s.
//!
//! The parser is stateless: build one `CardParser` at startup and share it
//! (behind an `Arc` if needed) with every caller. Identical input always
//! produces an identical `Contact`, fingerprint included.

use crate::error::{ParseError, Result};
use crate::grammar::{self, ContentLine};
use crate::types::*;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Cards in the wild are inconsistent about base64 padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Converts raw card text into structured contacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardParser;

impl CardParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one raw record.
    ///
    /// `N` is mandatory; everything else is optional. Only the first PHOTO is
    /// looked at. Categories are collected whether or not the card has
    /// emails.
    pub fn parse(&self, raw: &str) -> Result<Contact> {
        let lines = grammar::unfold(raw);
        let body = card_body(&lines)?;

        let mut name: Option<(String, String)> = None;
        let mut birthday: Option<NaiveDate> = None;
        let mut phone_numbers = Vec::new();
        let mut emails = Vec::new();
        let mut categories = BTreeSet::new();
        let mut photo: Option<Photo> = None;
        let mut photo_seen = false;

        for (line_no, text) in body {
            if text.trim().is_empty() {
                continue;
            }
            let line = ContentLine::parse(text)
                .map_err(|reason| ParseError::MalformedLine { line: line_no, reason })?;

            match line.name.as_str() {
                "N" if name.is_none() => {
                    let mut parts = grammar::split_escaped(&line.value, ';').into_iter();
                    let family = parts.next().unwrap_or_default();
                    let given = parts.next().unwrap_or_default();
                    name = Some((given.trim().to_string(), family.trim().to_string()));
                }
                "BDAY" if birthday.is_none() => {
                    birthday = parse_birthday(&line)?;
                }
                "TEL" => phone_numbers.push(PhoneNumber {
                    kind: line.type_label(),
                    number: line.value.clone(),
                }),
                "EMAIL" => emails.push(Email {
                    kind: line.type_label(),
                    address: grammar::unescape(line.value.trim()),
                }),
                "CATEGORIES" => {
                    categories.extend(
                        grammar::split_escaped(&line.value, ',')
                            .into_iter()
                            .map(|c| c.trim().to_string())
                            .filter(|c| !c.is_empty()),
                    );
                }
                "PHOTO" if !photo_seen => {
                    photo_seen = true;
                    photo = decode_photo(&line)?;
                }
                "PHOTO" => tracing::trace!("ignoring additional PHOTO entry on line {}", line_no),
                _ => {}
            }
        }

        let (given, family) = name.ok_or(ParseError::MissingField("N"))?;

        let mut contact = Contact::new(Fingerprint::of(raw), given, family);
        contact.birthday = birthday;
        contact.phone_numbers = phone_numbers;
        contact.emails = emails;
        contact.categories = categories;
        contact.photo = photo;
        Ok(contact)
    }

    /// Parse many records in parallel. Results come back in input order.
    pub fn parse_batch(&self, records: &[String]) -> Vec<Result<Contact>> {
        records.par_iter().map(|raw| self.parse(raw)).collect()
    }
}

/// Lines between `BEGIN:VCARD` and the matching `END:VCARD`, numbered from 1.
fn card_body(lines: &[String]) -> Result<Vec<(usize, &str)>> {
    let mut numbered = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.as_str()))
        .skip_while(|(_, line)| line.trim().is_empty());

    match numbered.next() {
        Some((_, first)) if first.trim().eq_ignore_ascii_case("BEGIN:VCARD") => {}
        _ => return Err(ParseError::MissingBegin),
    }

    let mut body = Vec::new();
    let mut depth = 1usize;
    for (line_no, line) in numbered {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("BEGIN:VCARD") {
            // 2.1 AGENT cards may be embedded; their lines are not ours
            depth += 1;
        } else if trimmed.eq_ignore_ascii_case("END:VCARD") {
            depth -= 1;
            if depth == 0 {
                return Ok(body);
            }
        } else if depth == 1 {
            body.push((line_no, line));
        }
    }
    Err(ParseError::MissingEnd)
}

/// Accepts `YYYY-MM-DD` or `YYYYMMDD`, optionally followed by a `T` time part.
///
/// Birthdays a `NaiveDate` cannot hold (no year, no day, or free text) are
/// treated as absent rather than failing the card.
fn parse_birthday(line: &ContentLine) -> Result<Option<NaiveDate>> {
    let trimmed = line.value.trim();
    if line
        .param("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("text"))
    {
        tracing::debug!("ignoring text BDAY {:?}", trimmed);
        return Ok(None);
    }

    let date = trimmed.split_once('T').map_or(trimmed, |(date, _)| date);
    if is_reduced_accuracy(date) {
        tracing::debug!("ignoring partial BDAY {:?}", trimmed);
        return Ok(None);
    }

    let invalid = || ParseError::InvalidBirthday(trimmed.to_string());
    if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        let year = date[..4].parse().map_err(|_| invalid())?;
        let month = date[4..6].parse().map_err(|_| invalid())?;
        let day = date[6..].parse().map_err(|_| invalid())?;
        return NaiveDate::from_ymd_opt(year, month, day)
            .map(Some)
            .ok_or_else(invalid);
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| invalid())
}

/// RFC 6350 dates missing a year (`--MMDD`, `--MM-DD`, `---DD`) or a day
/// (`YYYY`, `YYYY-MM`).
fn is_reduced_accuracy(date: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if let Some(rest) = date.strip_prefix("--") {
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        let compact: String = rest.chars().filter(|&c| c != '-').collect();
        return matches!(compact.len(), 2 | 4) && digits(&compact);
    }
    match date.split_once('-') {
        Some((year, month)) => year.len() == 4 && digits(year) && month.len() == 2 && digits(month),
        None => date.len() == 4 && digits(date),
    }
}

/// Decode inline photo data; a reference URI yields no photo.
fn decode_photo(line: &ContentLine) -> Result<Option<Photo>> {
    let value = line.value.trim();
    if let Some(rest) = value.strip_prefix("data:") {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| ParseError::InvalidPhoto("data URI without payload".to_string()))?;
        if !meta.to_ascii_lowercase().ends_with(";base64") {
            return Err(ParseError::InvalidPhoto(
                "only base64 data URIs are supported".to_string(),
            ));
        }
        return decode_base64(payload).map(Some);
    }
    if line.is_inline_binary() {
        return decode_base64(value).map(Some);
    }
    Ok(None)
}

fn decode_base64(payload: &str) -> Result<Photo> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    LENIENT_BASE64
        .decode(compact.as_bytes())
        .map(Photo::new)
        .map_err(|e| ParseError::InvalidPhoto(e.to_string()))
}

/// Split a document holding several cards into one raw record per card.
///
/// Each record keeps its original text (so fingerprints match what a
/// single-card source would produce). Non-blank text found between cards is
/// returned as a record of its own so that the parser reports it rather than
/// having it vanish.
pub fn split_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        let begins = trimmed.eq_ignore_ascii_case("BEGIN:VCARD");

        if depth == 0 {
            if begins {
                flush(&mut records, &mut current);
                depth = 1;
            }
            current.push_str(line);
            continue;
        }

        current.push_str(line);
        if begins {
            depth += 1;
        } else if trimmed.eq_ignore_ascii_case("END:VCARD") {
            depth -= 1;
            if depth == 0 {
                records.push(std::mem::take(&mut current));
            }
        }
    }
    flush(&mut records, &mut current);
    records
}

fn flush(records: &mut Vec<String>, current: &mut String) {
    if !current.trim().is_empty() {
        records.push(std::mem::take(current));
    } else {
        current.clear();
    }
}
