use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use super::{
    entities::{Category, EventTag},
    CategoryId, EventId,
};

/// Category bucket that collects slots whose event no longer exists.
pub const DELETED_CATEGORY_ID: &str = "__deleted__";
pub const DELETED_LABEL: &str = "(deleted)";
pub const UNCATEGORIZED_LABEL: &str = "(uncategorized)";

/// Categories and events known to the tracker. Lookups are linear; the lists stay in the
/// tens of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub events: Vec<EventTag>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>, events: Vec<EventTag>) -> Self {
        Self { categories, events }
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|v| &*v.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&EventTag> {
        self.events.iter().find(|v| &*v.id == id)
    }

    /// Category an event is counted under. Unknown events fall into [DELETED_CATEGORY_ID];
    /// events whose category was deleted keep pointing at the missing id.
    pub fn resolve_category(&self, event_id: &str) -> CategoryId {
        self.event(event_id)
            .map(|v| v.category_id.clone())
            .unwrap_or_else(|| DELETED_CATEGORY_ID.into())
    }

    pub fn category_label(&self, category_id: &str) -> String {
        if category_id == DELETED_CATEGORY_ID {
            return DELETED_LABEL.to_string();
        }
        self.category(category_id)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string())
    }

    /// Name shown for a slot. Category-only events show their category name.
    pub fn event_label(&self, event_id: &str) -> String {
        match self.event(event_id) {
            Some(EventTag {
                name: Some(name), ..
            }) => name.clone(),
            Some(event) => self.category_label(&event.category_id),
            None => DELETED_LABEL.to_string(),
        }
    }

    pub fn add_category(&mut self, name: &str) -> Result<CategoryId> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Category name can't be empty");
        }
        let id: CategoryId =
            unique_slug(name, |candidate| self.category(candidate).is_some()).into();
        self.categories.push(Category {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(id)
    }

    pub fn add_event(
        &mut self,
        category_id: &str,
        name: Option<&str>,
        fixed: bool,
    ) -> Result<EventId> {
        let category = self
            .category(category_id)
            .ok_or_else(|| anyhow!("Unknown category {category_id}"))?;
        let category_id = category.id.clone();
        let name = name.map(str::trim).filter(|v| !v.is_empty());

        let base = match name {
            Some(name) => format!("{category_id}-{name}"),
            None => category_id.to_string(),
        };
        let id: EventId = unique_slug(&base, |candidate| self.event(candidate).is_some()).into();
        self.events.push(EventTag {
            id: id.clone(),
            category_id,
            name: name.map(ToString::to_string),
            fixed,
        });
        Ok(id)
    }

    /// Removes the category only. Its events stay and resolve to the uncategorized label.
    pub fn delete_category(&mut self, id: &str) -> Option<Category> {
        let index = self.categories.iter().position(|v| &*v.id == id)?;
        Some(self.categories.remove(index))
    }

    pub fn delete_event(&mut self, id: &str) -> Option<EventTag> {
        let index = self.events.iter().position(|v| &*v.id == id)?;
        Some(self.events.remove(index))
    }

    pub fn events_in<'a>(
        &'a self,
        category_id: &'a str,
    ) -> impl Iterator<Item = &'a EventTag> + 'a {
        self.events
            .iter()
            .filter(move |v| &*v.category_id == category_id)
    }
}

fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug.to_string()
    }
}

fn unique_slug(value: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = slugify(value);
    if !taken(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::{Catalog, DELETED_CATEGORY_ID, DELETED_LABEL, UNCATEGORIZED_LABEL};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.add_category("Work").unwrap();
        catalog.add_category("Rest & Sleep").unwrap();
        catalog.add_event("work", Some("Deep focus"), false).unwrap();
        catalog.add_event("rest-sleep", None, true).unwrap();
        catalog
    }

    #[test]
    fn test_ids_are_slugs() {
        let catalog = catalog();
        let ids = catalog
            .events
            .iter()
            .map(|v| v.id.to_string())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["work-deep-focus", "rest-sleep"]);
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let mut catalog = catalog();
        assert_eq!(&*catalog.add_category("work").unwrap(), "work-2");
        assert_eq!(
            &*catalog.add_event("work", Some("Deep focus"), false).unwrap(),
            "work-deep-focus-2"
        );
        assert!(catalog.add_category("  ").is_err());
        assert!(catalog.add_event("missing", None, false).is_err());
    }

    #[test]
    fn test_labels_fall_back_to_placeholders() {
        let mut catalog = catalog();
        assert_eq!(catalog.event_label("work-deep-focus"), "Deep focus");
        assert_eq!(catalog.event_label("rest-sleep"), "Rest & Sleep");
        assert_eq!(catalog.event_label("gone"), DELETED_LABEL);
        assert_eq!(&*catalog.resolve_category("gone"), DELETED_CATEGORY_ID);

        catalog.delete_category("rest-sleep");
        assert!(catalog.event("rest-sleep").is_some());
        assert_eq!(catalog.event_label("rest-sleep"), UNCATEGORIZED_LABEL);
        assert_eq!(&*catalog.resolve_category("rest-sleep"), "rest-sleep");
        assert_eq!(catalog.category_label("rest-sleep"), UNCATEGORIZED_LABEL);
    }
}
