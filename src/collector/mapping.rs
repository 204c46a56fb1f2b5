use serde_json::Value;

use crate::error::CollectorError;

/// Ordered, non-empty mapping of app id -> display name.
///
/// Iteration follows definition order, which is also the order
/// in which `Collector::run_all` processes apps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapping {
    entries: Vec<(String, String)>,
}

impl SourceMapping {
    /// Builds a mapping from `(app_id, display_name)` pairs.
    ///
    /// Fails with `InvalidConfiguration` when there are no pairs or
    /// an app id appears twice.
    pub fn new<I, K, V>(pairs: I) -> Result<Self, CollectorError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();

        for (id, name) in pairs {
            let id = id.into();
            if entries.iter().any(|(known, _)| *known == id) {
                return Err(CollectorError::InvalidConfiguration(format!(
                    "duplicate app id '{id}'"
                )));
            }
            entries.push((id, name.into()));
        }

        if entries.is_empty() {
            return Err(CollectorError::InvalidConfiguration(
                "app mapping must not be empty".into(),
            ));
        }

        Ok(Self { entries })
    }

    /// Builds a mapping from a JSON object of string values, keeping
    /// the object's key order.
    pub fn from_json(value: &Value) -> Result<Self, CollectorError> {
        let object = value.as_object().ok_or_else(|| {
            CollectorError::InvalidConfiguration(
                "apps must be an object mapping app ids to display names".into(),
            )
        })?;

        let mut pairs = Vec::with_capacity(object.len());
        for (id, name) in object {
            let name = name.as_str().ok_or_else(|| {
                CollectorError::InvalidConfiguration(format!(
                    "display name for '{id}' must be a string"
                ))
            })?;
            pairs.push((id.as_str(), name));
        }

        Self::new(pairs)
    }

    pub fn name(&self, app_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == app_id)
            .map(|(_, name)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed mapping.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn is_invalid(result: Result<SourceMapping, CollectorError>) -> bool {
        matches!(result, Err(CollectorError::InvalidConfiguration(_)))
    }

    #[test]
    fn keeps_definition_order() {
        let apps = SourceMapping::new([("z.app", "Z"), ("a.app", "A")]).unwrap();
        let ids: Vec<&str> = apps.iter().map(|(id, _)| id).collect();

        assert_eq!(ids, ["z.app", "a.app"]);
        assert_eq!(apps.name("a.app"), Some("A"));
        assert_eq!(apps.name("b.app"), None);
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert!(is_invalid(SourceMapping::new(Vec::<(String, String)>::new())));
        assert!(is_invalid(SourceMapping::new([("a.app", "A"), ("a.app", "B")])));
    }

    #[test]
    fn any_string_key_is_an_app_id() {
        let apps = SourceMapping::from_json(&json!({ "": "Blank", " ": "Space" })).unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps.name(""), Some("Blank"));
    }

    #[test]
    fn from_json_validates_shape() {
        assert!(is_invalid(SourceMapping::from_json(&json!({}))));
        assert!(is_invalid(SourceMapping::from_json(&json!(["com.a.app"]))));
        assert!(is_invalid(SourceMapping::from_json(&json!("com.a.app"))));
        assert!(is_invalid(SourceMapping::from_json(&json!({ "com.a.app": 7 }))));

        let apps = SourceMapping::from_json(&json!({ "com.a.app": "Bank A" })).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps.name("com.a.app"), Some("Bank A"));
    }
}
