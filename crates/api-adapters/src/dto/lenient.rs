//! Deserializers for fields that arrive as text from multipart forms but as
//! typed values from JSON bodies.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum ValueOrText<T> {
    Value(T),
    Text(String),
}

/// `Option<T>` from a typed value or its text form. Blank text is `None`.
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<ValueOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ValueOrText::Value(value)) => Ok(Some(value)),
        Some(ValueOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(ValueOrText::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrText {
    List(Vec<String>),
    Text(String),
}

/// A list, or a comma-separated string. Items are trimmed and blanks dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<ListOrText>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(ListOrText::List(items)) => items,
        Some(ListOrText::Text(text)) => text.split(',').map(str::to_owned).collect(),
    };
    Ok(Some(
        items
            .into_iter()
            .map(|item| item.trim().to_owned())
            .filter(|item| !item.is_empty())
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::PetId;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "optional")]
        fee: Option<f64>,
        #[serde(default, deserialize_with = "optional")]
        public: Option<bool>,
        #[serde(default, deserialize_with = "optional")]
        pet: Option<PetId>,
        #[serde(default, deserialize_with = "string_list")]
        tags: Option<Vec<String>>,
    }

    #[test]
    fn accepts_typed_values_and_text() {
        let typed: Form =
            serde_json::from_value(json!({"fee": 150.5, "public": false, "tags": ["a", " b "]}))
                .unwrap();
        assert_eq!(typed.fee, Some(150.5));
        assert_eq!(typed.public, Some(false));
        assert_eq!(typed.tags, Some(vec!["a".to_owned(), "b".to_owned()]));

        let id = PetId::generate();
        let text: Form = serde_json::from_value(
            json!({"fee": "75", "public": "true", "pet": id.to_string(), "tags": "dogs, ,rescue"}),
        )
        .unwrap();
        assert_eq!(text.fee, Some(75.0));
        assert_eq!(text.public, Some(true));
        assert_eq!(text.pet, Some(id));
        assert_eq!(text.tags, Some(vec!["dogs".to_owned(), "rescue".to_owned()]));
    }

    #[test]
    fn blank_text_is_absent_and_garbage_is_rejected() {
        let blank: Form = serde_json::from_value(json!({"fee": " ", "pet": ""})).unwrap();
        assert_eq!(blank.fee, None);
        assert_eq!(blank.pet, None);

        assert!(serde_json::from_value::<Form>(json!({"fee": "cheap"})).is_err());
        assert!(serde_json::from_value::<Form>(json!({"pet": "not-an-id"})).is_err());
    }
}
