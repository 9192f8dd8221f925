//! Parsing of the text service reply into ordered recipes.
//!
//! Replies are a JSON object of `title -> markdown`, optionally wrapped in
//! a markdown code fence. Object key order is the recipe order, so the
//! object is read with a map visitor rather than through `serde_json::Map`.

use std::fmt;

use serde::Deserialize;
use serde::de::{MapAccess, Visitor};
use thiserror::Error;

use super::GeneratedRecipe;

const FENCE: &str = "```";

/// Reasons a reply could not be turned into recipes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedResponse {
    /// The upstream envelope carried no text.
    #[error("response contained no text")]
    EmptyText,

    /// The upstream envelope itself could not be decoded.
    #[error("unexpected response envelope: {0}")]
    Envelope(String),

    /// The text is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The JSON is valid but not an object.
    #[error("expected a JSON object of recipe title to markdown")]
    NotAnObject,

    /// A recipe value was not a string.
    #[error("recipe {0:?} has a non-string body")]
    NonStringBody(String),

    /// A recipe title was blank.
    #[error("recipe title is empty")]
    EmptyTitle,

    /// The object had no entries.
    #[error("response contains no recipes")]
    NoRecipes,
}

/// Remove a surrounding markdown code fence, with or without a language tag.
///
/// Text that does not start with a fence (before its first `{`) is returned trimmed.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(fence_at) = trimmed.find(FENCE) else {
        return trimmed;
    };
    if trimmed.find('{').is_some_and(|brace_at| brace_at < fence_at) {
        return trimmed;
    }

    let (_, after_open) = trimmed.split_at(fence_at + FENCE.len());
    let body = after_open.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let body = closing_fence(body).and_then(|at| body.get(..at)).unwrap_or(body);
    body.trim()
}

/// Offset of the first fence that ends its line.
///
/// Fences inside JSON strings are followed by escaped text, never by a line
/// break, so they are skipped.
fn closing_fence(body: &str) -> Option<usize> {
    body.match_indices(FENCE).map(|(at, _)| at).find(|&at| {
        body.get(at + FENCE.len()..)
            .and_then(|rest| rest.split('\n').next())
            .is_some_and(|line| line.trim().is_empty())
    })
}

/// Parse a reply into recipes, preserving the reply's key order.
///
/// # Errors
///
/// Returns `MalformedResponse` if the text is not a non-empty JSON object
/// whose keys are non-blank titles and whose values are strings.
pub fn parse_recipes(text: &str) -> Result<Vec<GeneratedRecipe>, MalformedResponse> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(MalformedResponse::EmptyText);
    }

    let OrderedEntries(entries) = serde_json::from_str::<OrderedEntries>(body).map_err(|e| {
        if e.is_data() {
            MalformedResponse::NotAnObject
        } else {
            MalformedResponse::InvalidJson(e.to_string())
        }
    })?;

    if entries.is_empty() {
        return Err(MalformedResponse::NoRecipes);
    }

    entries
        .into_iter()
        .map(|(title, value)| {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(MalformedResponse::EmptyTitle);
            }
            match value {
                serde_json::Value::String(markdown) => Ok(GeneratedRecipe { title, markdown }),
                _ => Err(MalformedResponse::NonStringBody(title)),
            }
        })
        .collect()
}

/// Object entries in document order.
///
/// A repeated key keeps its first position and takes the last value.
struct OrderedEntries(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedEntriesVisitor)
    }
}

struct OrderedEntriesVisitor;

impl<'de> Visitor<'de> for OrderedEntriesVisitor {
    type Value = OrderedEntries;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries: Vec<(String, serde_json::Value)> =
            Vec::with_capacity(map.size_hint().unwrap_or(0));

        while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }

        Ok(OrderedEntries(entries))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn titles(recipes: &[GeneratedRecipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_strip_json_fence() {
        let text = "```json\n{\"a\": \"b\"}\n```";
        assert_eq!(strip_code_fence(text), "{\"a\": \"b\"}");
    }

    #[test]
    fn test_strip_bare_fence() {
        let text = "```\n{\"a\": \"b\"}\n```\n";
        assert_eq!(strip_code_fence(text), "{\"a\": \"b\"}");
    }

    #[test]
    fn test_strip_fence_with_preamble() {
        let text = "Here you go:\n```json\n{\"a\": \"b\"}\n```";
        assert_eq!(strip_code_fence(text), "{\"a\": \"b\"}");
    }

    #[test]
    fn test_strip_stops_at_first_closing_fence() {
        let text = "```json\n{\"a\": \"b\"}\n```\nOr try this variation:\n```\n{\"c\": \"d\"}\n```";
        assert_eq!(strip_code_fence(text), "{\"a\": \"b\"}");

        let recipes = parse_recipes(text).unwrap();
        assert_eq!(titles(&recipes), ["a"]);
    }

    #[test]
    fn test_fence_inside_recipe_body_is_not_a_closer() {
        let text = "```json\n{\"Toast\": \"```bash\\ntoast\\n```\"}\n```";
        assert_eq!(strip_code_fence(text), "{\"Toast\": \"```bash\\ntoast\\n```\"}");
        assert_eq!(parse_recipes(text).unwrap()[0].markdown, "```bash\ntoast\n```");
    }

    #[test]
    fn test_unfenced_text_keeps_inner_fences() {
        let text = "  {\"Toast\": \"```\\ncode\\n```\"}  ";
        assert_eq!(strip_code_fence(text), "{\"Toast\": \"```\\ncode\\n```\"}");
    }

    #[test]
    fn test_fenced_and_unfenced_parse_identically() {
        let plain = r##"{"Fried Rice": "# Fried Rice", "Omelette": "# Omelette"}"##;
        let fenced = format!("```json\n{plain}\n```");

        assert_eq!(parse_recipes(plain).unwrap(), parse_recipes(&fenced).unwrap());
    }

    #[test]
    fn test_key_order_is_preserved() {
        let text = r#"{"Zucchini Bread": "z", "Apple Pie": "a", "Mango Lassi": "m"}"#;
        let recipes = parse_recipes(text).unwrap();
        assert_eq!(titles(&recipes), ["Zucchini Bread", "Apple Pie", "Mango Lassi"]);
        assert_eq!(recipes[1].markdown, "a");
    }

    #[test]
    fn test_duplicate_key_keeps_first_position() {
        let text = r#"{"A": "1", "B": "2", "A": "3"}"#;
        let recipes = parse_recipes(text).unwrap();
        assert_eq!(titles(&recipes), ["A", "B"]);
        assert_eq!(recipes[0].markdown, "3");
    }

    #[test]
    fn test_array_is_not_an_object() {
        assert_eq!(
            parse_recipes(r#"["Fried Rice"]"#),
            Err(MalformedResponse::NotAnObject)
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_recipes("Sorry, I can't help with that."),
            Err(MalformedResponse::InvalidJson(_))
        ));
    }

    #[test]
    fn test_non_string_body() {
        assert_eq!(
            parse_recipes(r#"{"Soup": {"steps": []}}"#),
            Err(MalformedResponse::NonStringBody("Soup".into()))
        );
    }

    #[test]
    fn test_empty_object_and_empty_title() {
        assert_eq!(parse_recipes("{}"), Err(MalformedResponse::NoRecipes));
        assert_eq!(
            parse_recipes(r##"{"  ": "# Nothing"}"##),
            Err(MalformedResponse::EmptyTitle)
        );
        assert_eq!(parse_recipes("```json\n```"), Err(MalformedResponse::EmptyText));
    }
}
