//! Plain-text rendering of command results.

use std::io::Write;

use keydesk_domain::{ConnectionProfile, KeyEntry, ModelProfile, Record, SearchHit};

use crate::error::CliError;

/// One line per profile, `*` marking the active one.
pub fn connections(
    out: &mut impl Write,
    profiles: &[ConnectionProfile],
    active: Option<&str>,
) -> Result<(), CliError> {
    for profile in profiles {
        let marker = if active == Some(profile.name.as_str()) { '*' } else { ' ' };
        writeln!(out, "{marker} {}\t{}", profile.name, profile.address())?;
    }
    Ok(())
}

/// One key per line.
pub fn keys(out: &mut impl Write, keys: &[KeyEntry]) -> Result<(), CliError> {
    for entry in keys {
        writeln!(out, "{}", entry.key)?;
    }
    Ok(())
}

/// The record as indented JSON, fields in stored order.
pub fn record(out: &mut impl Write, record: &Record) -> Result<(), CliError> {
    writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
    Ok(())
}

/// Similarity, key and compact answer per hit, best first as returned.
pub fn hits(out: &mut impl Write, hits: &[SearchHit]) -> Result<(), CliError> {
    if hits.is_empty() {
        writeln!(out, "no matches")?;
    }
    for hit in hits {
        writeln!(out, "{:.3}\t{}\t{}", hit.similarity, hit.key, hit.data)?;
    }
    Ok(())
}

/// One line per model, `*` marking the current one.
pub fn models(
    out: &mut impl Write,
    profiles: &[ModelProfile],
    current: Option<&str>,
) -> Result<(), CliError> {
    for profile in profiles {
        let marker = if current == Some(profile.name.as_str()) { '*' } else { ' ' };
        writeln!(
            out,
            "{marker} {}\t{}\t{}",
            profile.name, profile.model_type, profile.url
        )?;
    }
    Ok(())
}

/// Field-per-line view of a model profile.
pub fn model(out: &mut impl Write, profile: &ModelProfile) -> Result<(), CliError> {
    writeln!(out, "name:    {}", profile.name)?;
    writeln!(out, "url:     {}", profile.url)?;
    writeln!(out, "type:    {}", profile.model_type)?;
    if let Some(key) = &profile.api_key {
        writeln!(out, "api key: {key}")?;
    }
    Ok(())
}
