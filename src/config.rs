//! Configuration bag handed to every entry constructor.
//!
//! The registry never interprets keys. Each constructor reads what it needs and
//! reports [`MakerError::MissingConfiguration`] or
//! [`MakerError::InvalidConfiguration`] on its own. Loaders for properties text,
//! process environment and (with the `config` feature) JSON documents populate
//! a bag before the registry is built.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::Path;
use std::str::{Chars, FromStr};

#[cfg(feature = "config")]
use serde::Deserialize;

use crate::{MakerError, MakerResult};

/// Immutable key to string mapping.
///
/// # Examples
///
/// ```
/// use maker_registry::ConfigurationBag;
///
/// let bag = ConfigurationBag::new()
///     .with("ceiba_age", "120")
///     .with("daisy_kind", "oxeye");
///
/// assert_eq!(bag.require("daisy_kind").unwrap(), "oxeye");
/// assert_eq!(bag.parse::<u32>("ceiba_age").unwrap(), 120);
/// assert!(bag.require("pinky.name").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationBag {
    values: BTreeMap<String, String>,
}

impl ConfigurationBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this bag with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Returns a bag holding both sets of keys; `other` wins on conflicts.
    pub fn merged(&self, other: &ConfigurationBag) -> Self {
        let mut values = self.values.clone();
        values.extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the value for `key` or [`MakerError::MissingConfiguration`].
    pub fn require(&self, key: &str) -> MakerResult<&str> {
        self.get(key)
            .ok_or_else(|| MakerError::MissingConfiguration(key.to_string()))
    }

    /// Parses the value for `key`.
    ///
    /// Fails with `MissingConfiguration` when absent and `InvalidConfiguration`
    /// when the trimmed value does not parse as `T`.
    pub fn parse<T>(&self, key: &str) -> MakerResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.require(key)?;
        raw.trim()
            .parse::<T>()
            .map_err(|e| MakerError::invalid(key, raw, e))
    }

    /// Like [`parse`](Self::parse) but falls back to `default` when the key is absent.
    ///
    /// A present but malformed value is still an error.
    pub fn parse_or<T>(&self, key: &str, default: T) -> MakerResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        if self.contains(key) {
            self.parse(key)
        } else {
            Ok(default)
        }
    }

    /// Parses `.properties` text.
    ///
    /// Supports `key=value`, `key: value` and `key value` lines, `#` and `!`
    /// comments, and trailing-backslash continuation lines. Backslash escapes
    /// are decoded in keys and values: `\t`, `\n`, `\r`, `\f`, `\uXXXX`,
    /// and any other escaped character stands for itself, so `\=`, `\:` and
    /// `\ ` do not end a key. Unescaped trailing whitespace of a value is
    /// dropped. Later duplicates win.
    ///
    /// ```
    /// use maker_registry::ConfigurationBag;
    ///
    /// let bag = ConfigurationBag::from_properties_str(
    ///     "# dogs\nsparky.name = Sparky\npinky.name: Pinky\nmotto = long \\\n    line\nkennel\\=yard = Caf\\u00e9\n",
    /// );
    /// assert_eq!(bag.get("sparky.name"), Some("Sparky"));
    /// assert_eq!(bag.get("pinky.name"), Some("Pinky"));
    /// assert_eq!(bag.get("motto"), Some("long line"));
    /// assert_eq!(bag.get("kennel=yard"), Some("Café"));
    /// ```
    pub fn from_properties_str(text: &str) -> Self {
        let mut values = BTreeMap::new();
        let mut logical = String::new();
        let mut continuing = false;

        for raw in text.lines() {
            let line = raw.trim_start_matches(PROPERTY_BLANKS);
            if !continuing && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }

            if let Some(head) = continued(line) {
                logical.push_str(head);
                continuing = true;
                continue;
            }

            logical.push_str(line);
            if let Some((key, value)) = split_property(&logical) {
                values.insert(key, value);
            }
            logical.clear();
            continuing = false;
        }

        if let Some((key, value)) = split_property(&logical) {
            values.insert(key, value);
        }

        Self { values }
    }

    /// Reads and parses a `.properties` file.
    pub fn from_properties_file(path: impl AsRef<Path>) -> MakerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MakerError::ConfigurationSource {
            origin: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_properties_str(&text))
    }

    /// Collects environment variables named `PREFIX_SOME_KEY` as `some.key`.
    ///
    /// The prefix match is case-insensitive; an empty prefix takes every variable.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_vars(prefix, env::vars())
    }

    pub(crate) fn from_vars<I>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}_", prefix.to_uppercase())
        };

        vars.into_iter()
            .filter_map(|(name, value)| {
                let upper = name.to_uppercase();
                let rest = upper.strip_prefix(&marker)?;
                if rest.is_empty() {
                    return None;
                }
                Some((rest.to_lowercase().replace('_', "."), value))
            })
            .collect()
    }

    /// Parses a JSON object; nested objects flatten into dotted keys.
    ///
    /// ```
    /// # #[cfg(feature = "config")]
    /// # {
    /// use maker_registry::ConfigurationBag;
    ///
    /// let bag = ConfigurationBag::from_json_str(
    ///     r#"{ "daisy_kind": "oxeye", "ceiba": { "age": 120, "native": true } }"#,
    /// ).unwrap();
    /// assert_eq!(bag.get("ceiba.age"), Some("120"));
    /// assert_eq!(bag.get("ceiba.native"), Some("true"));
    /// # }
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json_str(text: &str) -> MakerResult<Self> {
        Self::from_json_source("<json>", text)
    }

    /// Reads and parses a JSON configuration file.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> MakerResult<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| MakerError::ConfigurationSource {
            origin: origin.clone(),
            message: e.to_string(),
        })?;
        Self::from_json_source(&origin, &text)
    }

    #[cfg(feature = "config")]
    fn from_json_source(origin: &str, text: &str) -> MakerResult<Self> {
        let source_error = |message: String| MakerError::ConfigurationSource {
            origin: origin.to_string(),
            message,
        };

        let root: JsonNode = serde_json::from_str(text).map_err(|e| source_error(e.to_string()))?;
        let JsonNode::Table(table) = root else {
            return Err(source_error("top-level value must be an object".to_string()));
        };

        let mut values = BTreeMap::new();
        flatten_json("", table, &mut values).map_err(source_error)?;
        Ok(Self { values })
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigurationBag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Whitespace separating keys from values in properties text.
const PROPERTY_BLANKS: &[char] = &[' ', '\t', '\x0c'];

/// Returns the line without its continuation backslash, if it has one.
///
/// An even run of trailing backslashes is an escaped backslash, not a continuation.
fn continued(line: &str) -> Option<&str> {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    if trailing % 2 == 1 {
        Some(&line[..line.len() - 1])
    } else {
        None
    }
}

/// Splits a logical line at its first unescaped separator and decodes both halves.
fn split_property(line: &str) -> Option<(String, String)> {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut separated = false;

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = idx;
                separated = true;
                break;
            }
            c if PROPERTY_BLANKS.contains(&c) => {
                key_end = idx;
                break;
            }
            _ => {}
        }
    }

    let mut rest = &line[key_end..];
    if separated {
        rest = &rest[1..];
    }
    rest = rest.trim_start_matches(PROPERTY_BLANKS);
    if !separated {
        if let Some(after) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
            rest = after.trim_start_matches(PROPERTY_BLANKS);
        }
    }

    let key = unescape(&line[..key_end], false);
    if key.is_empty() {
        return None;
    }
    Some((key, unescape(rest, true)))
}

/// Decodes backslash escapes, optionally dropping unescaped trailing blanks.
fn unescape(raw: &str, trim_end: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut kept = 0;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            if !PROPERTY_BLANKS.contains(&c) {
                kept = out.len();
            }
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => out.push(unicode_escape(&mut chars)),
            Some(other) => out.push(other),
            None => {}
        }
        kept = out.len();
    }

    if trim_end {
        out.truncate(kept);
    }
    out
}

/// Decodes the digits of a `\uXXXX` escape, pairing UTF-16 surrogates.
///
/// Malformed digits leave a plain `u`; an unpaired surrogate becomes U+FFFD.
fn unicode_escape(chars: &mut Chars<'_>) -> char {
    let Some(unit) = hex_unit(chars) else {
        return 'u';
    };

    if (0xD800..0xDC00).contains(&unit) {
        let mut ahead = chars.clone();
        if ahead.next() == Some('\\') && ahead.next() == Some('u') {
            if let Some(low) = hex_unit(&mut ahead).filter(|low| (0xDC00..0xE000).contains(low)) {
                *chars = ahead;
                let scalar = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER);
            }
        }
    }
    char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Reads four hex digits, consuming nothing unless all four are present.
fn hex_unit(chars: &mut Chars<'_>) -> Option<u32> {
    let mut ahead = chars.clone();
    let mut unit = 0u32;
    for _ in 0..4 {
        unit = unit * 16 + ahead.next()?.to_digit(16)?;
    }
    *chars = ahead;
    Some(unit)
}

#[cfg(feature = "config")]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonNode {
    Null(()),
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<JsonNode>),
    Table(BTreeMap<String, JsonNode>),
}

#[cfg(feature = "config")]
fn flatten_json(
    prefix: &str,
    table: BTreeMap<String, JsonNode>,
    out: &mut BTreeMap<String, String>,
) -> Result<(), String> {
    for (name, node) in table {
        let key = if prefix.is_empty() {
            name
        } else {
            format!("{}.{}", prefix, name)
        };

        match node {
            JsonNode::Null(()) => {}
            JsonNode::Flag(b) => {
                out.insert(key, b.to_string());
            }
            JsonNode::Number(n) => {
                out.insert(key, n.to_string());
            }
            JsonNode::Text(s) => {
                out.insert(key, s);
            }
            JsonNode::List(_) => return Err(format!("arrays are not supported (key {})", key)),
            JsonNode::Table(inner) => flatten_json(&key, inner, out)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reports_missing_then_invalid() {
        let bag = ConfigurationBag::new().with("ceiba_age", "old");

        match bag.parse::<u32>("missing") {
            Err(MakerError::MissingConfiguration(key)) => assert_eq!(key, "missing"),
            other => panic!("unexpected: {:?}", other),
        }
        match bag.parse::<u32>("ceiba_age") {
            Err(MakerError::InvalidConfiguration { key, value, .. }) => {
                assert_eq!(key, "ceiba_age");
                assert_eq!(value, "old");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn parse_or_only_defaults_when_absent() {
        let bag = ConfigurationBag::new().with("litter", "x");
        assert_eq!(bag.parse_or::<u8>("size", 3).unwrap(), 3);
        assert!(bag.parse_or::<u8>("litter", 3).is_err());
    }

    #[test]
    fn merged_prefers_other() {
        let animals = ConfigurationBag::new().with("sparky.name", "Sparky").with("shared", "a");
        let plants = ConfigurationBag::new().with("daisy_kind", "oxeye").with("shared", "b");

        let all = animals.merged(&plants);
        assert_eq!(all.len(), 3);
        assert_eq!(all.get("shared"), Some("b"));
        assert_eq!(animals.get("shared"), Some("a"));
    }

    #[test]
    fn properties_comments_separators_and_duplicates() {
        let text = "\
! legacy comment
# another
sparky.name=Sparky
pinky.name : Pinky
bare.key
spaced value here
sparky.name=Sparky II
";
        let bag = ConfigurationBag::from_properties_str(text);
        assert_eq!(bag.get("sparky.name"), Some("Sparky II"));
        assert_eq!(bag.get("pinky.name"), Some("Pinky"));
        assert_eq!(bag.get("bare.key"), Some(""));
        assert_eq!(bag.get("spaced"), Some("value here"));
        assert_eq!(bag.len(), 4);
    }

    #[test]
    fn properties_continuation_at_end_of_input() {
        let bag = ConfigurationBag::from_properties_str("path = /usr/\\\n   local\\");
        assert_eq!(bag.get("path"), Some("/usr/local"));
    }

    #[test]
    fn properties_escaped_backslash_is_not_continuation() {
        let bag = ConfigurationBag::from_properties_str("dir = C:\\\\\nnext = 1");
        assert_eq!(bag.get("dir"), Some("C:\\"));
        assert_eq!(bag.get("next"), Some("1"));
    }

    #[test]
    fn properties_escapes_are_decoded() {
        let text = "\
key\\=part = v
colon\\:key:w
spaced\\ key = x
cafe = Caf\\u00e9
tab = a\\tb
lines = one\\ntwo
smile = \\ud83d\\ude00
kept = trailing\\ \t
\\#not.comment = y
odd = \\q\\uzz
";
        let bag = ConfigurationBag::from_properties_str(text);
        assert_eq!(bag.get("key=part"), Some("v"));
        assert_eq!(bag.get("colon:key"), Some("w"));
        assert_eq!(bag.get("spaced key"), Some("x"));
        assert_eq!(bag.get("cafe"), Some("Café"));
        assert_eq!(bag.get("tab"), Some("a\tb"));
        assert_eq!(bag.get("lines"), Some("one\ntwo"));
        assert_eq!(bag.get("smile"), Some("\u{1F600}"));
        assert_eq!(bag.get("kept"), Some("trailing "));
        assert_eq!(bag.get("#not.comment"), Some("y"));
        assert_eq!(bag.get("odd"), Some("quzz"));
        assert!(!bag.contains("key"));
    }

    #[test]
    fn properties_lone_surrogate_is_replaced() {
        let bag = ConfigurationBag::from_properties_str("broken = \\ud83dx");
        assert_eq!(bag.get("broken"), Some("\u{FFFD}x"));
    }

    #[test]
    fn env_vars_are_filtered_and_renamed() {
        let vars = vec![
            ("MAKER_SPARKY_NAME".to_string(), "Sparky".to_string()),
            ("maker_ceiba_age".to_string(), "12".to_string()),
            ("OTHER_THING".to_string(), "x".to_string()),
            ("MAKER_".to_string(), "empty".to_string()),
        ];
        let bag = ConfigurationBag::from_vars("maker", vars);
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get("sparky.name"), Some("Sparky"));
        assert_eq!(bag.get("ceiba.age"), Some("12"));
    }

    #[test]
    fn missing_properties_file_is_a_source_error() {
        let err = ConfigurationBag::from_properties_file("/definitely/not/here.properties").unwrap_err();
        assert!(matches!(err, MakerError::ConfigurationSource { .. }));
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_flattens_and_rejects_arrays() {
        let bag = ConfigurationBag::from_json_str(
            r#"{"daisy_kind":"oxeye","ceiba":{"age":120,"height":3.5},"unused":null}"#,
        )
        .unwrap();
        assert_eq!(bag.get("daisy_kind"), Some("oxeye"));
        assert_eq!(bag.get("ceiba.age"), Some("120"));
        assert_eq!(bag.get("ceiba.height"), Some("3.5"));
        assert!(!bag.contains("unused"));

        let err = ConfigurationBag::from_json_str(r#"{"names":["a","b"]}"#).unwrap_err();
        assert!(err.to_string().contains("names"));

        let err = ConfigurationBag::from_json_str("[1,2]").unwrap_err();
        assert!(matches!(err, MakerError::ConfigurationSource { .. }));
    }
}
