use super::request::WILDCARD;
use crate::domain::{filter::entity::Filter, model::entity::ModelDefinition};
use std::collections::BTreeMap;
use tracing::debug;

/// Expands search terms into a filter.
///
/// Named fields get one case-insensitive `like` each and are AND-ed. A `*` term
/// becomes an OR-group with one `like` per model property, appended as the last
/// AND term. A model without properties yields an empty OR-group, which matches
/// nothing.
pub fn expand_search_terms(terms: &BTreeMap<String, String>, model: &ModelDefinition) -> Filter {
    let mut all_of = Vec::with_capacity(terms.len());
    let mut any_field = None;

    for (key, pattern) in terms {
        if key == WILDCARD {
            debug!(
                model = %model.name,
                properties = model.properties.len(),
                "Expanding wildcard search term"
            );
            any_field = Some(Filter::Or(
                model
                    .properties
                    .iter()
                    .map(|property| Filter::like_ci(property.as_str(), pattern.as_str()))
                    .collect(),
            ));
        } else {
            all_of.push(Filter::like_ci(key.as_str(), pattern.as_str()));
        }
    }

    all_of.extend(any_field);
    Filter::And(all_of)
}
