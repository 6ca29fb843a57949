use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::normalize_product_id;

/// One category and the PLUs that roll up into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub product_ids: Vec<String>,
}

/// A single PLU → category row, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAssignment {
    pub product_id: String,
    pub category: String,
}

/// Static PLU → category lookup. Categories keep their declaration order,
/// which is also the column order of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMapping {
    categories: Vec<String>,
    index: HashMap<String, usize>,
    order: Vec<String>,
}

impl CategoryMapping {
    pub fn from_rules(rules: &[CategoryRule]) -> Self {
        let mut mapping = Self::default();
        for rule in rules {
            for product_id in &rule.product_ids {
                mapping.insert(product_id, &rule.category);
            }
            mapping.category_position(&rule.category);
        }
        mapping
    }

    pub fn from_assignments(assignments: &[CategoryAssignment]) -> Self {
        let mut mapping = Self::default();
        for assignment in assignments {
            mapping.insert(&assignment.product_id, &assignment.category);
        }
        mapping
    }

    fn category_position(&mut self, category: &str) -> usize {
        let category = category.trim();
        if let Some(position) = self.categories.iter().position(|name| name == category) {
            return position;
        }
        self.categories.push(category.to_string());
        self.categories.len() - 1
    }

    fn insert(&mut self, product_id: &str, category: &str) {
        let product_id = normalize_product_id(product_id);
        if product_id.is_empty() || category.trim().is_empty() {
            return;
        }
        let position = self.category_position(category);
        if let Some(existing) = self.index.get(&product_id) {
            if *existing != position {
                tracing::warn!(
                    product_id = %product_id,
                    kept = %self.categories[*existing],
                    ignored = %self.categories[position],
                    "PLU mapped to more than one category"
                );
            }
            return;
        }
        self.index.insert(product_id.clone(), position);
        self.order.push(product_id);
    }

    pub fn resolve(&self, product_id: &str) -> Option<&str> {
        self.resolve_index(product_id)
            .map(|position| self.categories[position].as_str())
    }

    pub(crate) fn resolve_index(&self, product_id: &str) -> Option<usize> {
        if let Some(position) = self.index.get(product_id) {
            return Some(*position);
        }
        self.index.get(&normalize_product_id(product_id)).copied()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of mapped PLUs.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn to_rules(&self) -> Vec<CategoryRule> {
        let mut rules = self
            .categories
            .iter()
            .map(|category| CategoryRule {
                category: category.clone(),
                product_ids: Vec::new(),
            })
            .collect::<Vec<_>>();
        for product_id in &self.order {
            let position = self.index[product_id];
            rules[position].product_ids.push(product_id.clone());
        }
        rules.retain(|rule| !rule.product_ids.is_empty());
        rules
    }

    pub fn to_assignments(&self) -> Vec<CategoryAssignment> {
        self.to_rules()
            .into_iter()
            .flat_map(|rule| {
                let category = rule.category;
                rule.product_ids
                    .into_iter()
                    .map(move |product_id| CategoryAssignment {
                        product_id,
                        category: category.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(category: &str, product_ids: &[&str]) -> CategoryRule {
        CategoryRule {
            category: category.to_string(),
            product_ids: product_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[test]
    fn resolves_known_and_drops_unknown() {
        let mapping = CategoryMapping::from_rules(&[
            rule("1/2 Chix", &["81831", "81990"]),
            rule("Corn", &["2307"]),
        ]);
        assert_eq!(mapping.resolve("81831"), Some("1/2 Chix"));
        assert_eq!(mapping.resolve(" 2307.0"), Some("Corn"));
        assert_eq!(mapping.resolve("99999"), None);
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn first_category_wins_for_duplicate_plu() {
        let mapping =
            CategoryMapping::from_rules(&[rule("Pots", &["100"]), rule("Grits", &["100", "200"])]);
        assert_eq!(mapping.resolve("100"), Some("Pots"));
        assert_eq!(mapping.resolve("200"), Some("Grits"));
        assert_eq!(mapping.categories(), ["Pots", "Grits"]);
    }

    #[test]
    fn assignments_round_trip_keeps_category_order() {
        let mapping = CategoryMapping::from_rules(&[
            rule("Full Ribs", &["2273"]),
            rule("1/2 Ribs", &["82151", "82149"]),
        ]);
        let rebuilt = CategoryMapping::from_assignments(&mapping.to_assignments());
        assert_eq!(rebuilt.categories(), ["Full Ribs", "1/2 Ribs"]);
        assert_eq!(rebuilt.to_rules(), mapping.to_rules());
    }
}
