use serde::{Deserialize, Serialize};

/// Schema of a paginated model.
///
/// `properties` lists every field a record of this model may carry; wildcard
/// search terms fan out over exactly these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub properties: Vec<String>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>, properties: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}
