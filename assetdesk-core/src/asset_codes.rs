//! Sequential asset names of the form `<prefix>-<category code>-<sequence>`.
//!
//! The next name is computed from the names already stored, so two writers
//! working on the same category at the same time can arrive at the same
//! candidate. The unique index on `assets.name` rejects the second insert;
//! callers report that as [`DuplicateKey::AssetName`](assetdesk_common::DuplicateKey)
//! and may regenerate.

use std::cmp::Ordering;
use std::fmt;

use assetdesk_db_entities::Asset;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use tracing::*;

#[allow(clippy::unwrap_used)]
static SEQUENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)$").unwrap());

/// A sequence number kept as its decimal digits, so suffixes of any length
/// compare and increment without overflowing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence(String);

impl Sequence {
    /// Accepts ASCII digits only. Leading zeros are dropped.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = digits.trim_start_matches('0');
        Some(Self(if trimmed.is_empty() {
            "0".to_owned()
        } else {
            trimmed.to_owned()
        }))
    }

    pub fn zero() -> Self {
        Self("0".to_owned())
    }

    pub fn next(&self) -> Self {
        let mut digits = self.0.clone().into_bytes();
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                return Self(String::from_utf8_lossy(&digits).into_owned());
            }
        }
        digits.insert(0, b'1');
        Self(String::from_utf8_lossy(&digits).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for Sequence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Sequence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for Sequence {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn asset_name_prefix(prefix: &str, category_code: &str) -> String {
    format!("{prefix}-{category_code}-")
}

/// Extracts the sequence number from `name` if it belongs to the given prefix and category.
pub fn parse_sequence(prefix: &str, category_code: &str, name: &str) -> Option<Sequence> {
    let rest = name.strip_prefix(&asset_name_prefix(prefix, category_code))?;
    let captures = SEQUENCE.captures(rest)?;
    Sequence::from_digits(captures.get(1)?.as_str())
}

pub fn format_asset_name(
    prefix: &str,
    category_code: &str,
    sequence: &Sequence,
    width: usize,
) -> String {
    format!(
        "{}{:0>width$}",
        asset_name_prefix(prefix, category_code),
        sequence.as_str(),
        width = width
    )
}

/// Highest existing sequence for the category plus one, starting at 1.
pub fn next_asset_name<'a, I>(prefix: &str, category_code: &str, width: usize, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let last = existing
        .into_iter()
        .filter_map(|name| parse_sequence(prefix, category_code, name))
        .max()
        .unwrap_or_else(Sequence::zero);
    format_asset_name(prefix, category_code, &last.next(), width)
}

/// `LIKE` pattern matching names that start with `literal`, with the
/// pattern metacharacters escaped by `\`.
fn prefix_pattern(literal: &str) -> String {
    let mut pattern = String::with_capacity(literal.len() + 1);
    for c in literal.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn generate_asset_name<C: ConnectionTrait>(
    db: &C,
    prefix: &str,
    category_code: &str,
    width: usize,
) -> Result<String, DbErr> {
    let names: Vec<String> = Asset::Entity::find()
        .select_only()
        .column(Asset::Column::Name)
        .filter(
            Asset::Column::Name.like(
                LikeExpr::new(prefix_pattern(&asset_name_prefix(prefix, category_code)))
                    .escape('\\'),
            ),
        )
        .into_tuple()
        .all(db)
        .await?;

    let name = next_asset_name(prefix, category_code, width, names.iter().map(String::as_str));
    debug!(%name, candidates = names.len(), "Generated asset name");
    Ok(name)
}
