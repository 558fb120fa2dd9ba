// ABOUTME: Select-style search filters a source exposes (type, category, status, sort).
// ABOUTME: A filter contributes a query parameter only when a non-default option is chosen.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

/// A single-choice filter; `state` indexes `options`, 0 is the default entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub param: String,
    pub options: Vec<FilterOption>,
    pub state: usize,
}

impl Filter {
    pub fn select(name: &str, param: &str, options: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            param: param.to_string(),
            options: options
                .iter()
                .map(|(label, value)| FilterOption {
                    label: label.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            state: 0,
        }
    }

    /// Choose the option whose value (or label, case-insensitively) is `choice`.
    pub fn with_choice(mut self, choice: &str) -> Option<Self> {
        let idx = self.options.iter().position(|o| {
            o.value == choice || o.label.to_lowercase() == choice.to_lowercase()
        })?;
        self.state = idx;
        Some(self)
    }

    /// The chosen value unless the default entry (or an empty value) is selected.
    pub fn selected_value(&self) -> Option<&str> {
        if self.state == 0 {
            return None;
        }
        self.options
            .get(self.state)
            .map(|o| o.value.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// `(param, value)` pairs for every applied filter, in filter order.
pub fn query_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .filter_map(|f| f.selected_value().map(|v| (f.param.clone(), v.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn status() -> Filter {
        Filter::select(
            "Durum",
            "status",
            &[("Tümü", ""), ("Devam Ediyor", "ongoing"), ("Tamamlandı", "completed")],
        )
    }

    #[test]
    fn default_state_is_not_applied() {
        assert_eq!(status().selected_value(), None);
        assert!(query_pairs(&[status()]).is_empty());
    }

    #[test]
    fn choose_by_value_or_label() {
        let by_value = status().with_choice("completed").unwrap();
        assert_eq!(by_value.selected_value(), Some("completed"));
        let by_label = status().with_choice("devam ediyor").unwrap();
        assert_eq!(
            query_pairs(&[by_label]),
            vec![("status".to_string(), "ongoing".to_string())]
        );
        assert!(status().with_choice("nope").is_none());
    }
}
