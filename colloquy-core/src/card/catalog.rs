//! The card catalog and the content-provider seam that fills it.
//!
//! Content loading and validation live outside the engine. A host implements
//! [`ContentProvider`] to hand over fully typed templates; the catalog only
//! checks id uniqueness and then serves shared, immutable templates.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::CardTemplate;
use crate::error::{ColloquyError, Result};
use crate::types::CardId;

/// Source of validated card templates.
pub trait ContentProvider {
    /// Every template the content defines.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be produced.
    fn templates(&self) -> Result<Vec<CardTemplate>>;
}

impl ContentProvider for Vec<CardTemplate> {
    fn templates(&self) -> Result<Vec<CardTemplate>> {
        Ok(self.clone())
    }
}

/// Provider reading a JSON array of templates.
#[derive(Debug, Clone)]
pub struct JsonContentProvider {
    source: String,
}

impl JsonContentProvider {
    /// Provider over an in-memory JSON document.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Provider over a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }
}

impl ContentProvider for JsonContentProvider {
    fn templates(&self) -> Result<Vec<CardTemplate>> {
        serde_json::from_str(&self.source).map_err(|e| ColloquyError::Config(e.to_string()))
    }
}

/// Immutable set of card templates keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    templates: HashMap<CardId, Arc<CardTemplate>>,
}

impl CardCatalog {
    /// Build a catalog from a content provider.
    ///
    /// # Errors
    ///
    /// Propagates provider errors and returns [`ColloquyError::DuplicateCard`]
    /// if two templates share an id.
    pub fn from_provider(provider: &dyn ContentProvider) -> Result<Self> {
        let catalog = Self::from_templates(provider.templates()?)?;
        info!(cards = catalog.len(), "Card catalog loaded");
        Ok(catalog)
    }

    /// Build a catalog from templates.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::DuplicateCard`] if two templates share an id.
    pub fn from_templates(templates: impl IntoIterator<Item = CardTemplate>) -> Result<Self> {
        let mut map = HashMap::new();
        for template in templates {
            let id = template.id.clone();
            if map.insert(id.clone(), Arc::new(template)).is_some() {
                return Err(ColloquyError::DuplicateCard(id));
            }
            debug!(card = %id, "Registered card template");
        }
        Ok(Self { templates: map })
    }

    /// Look up a template.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownCard`] if the id is not in the catalog.
    pub fn get(&self, id: &CardId) -> Result<&Arc<CardTemplate>> {
        self.templates
            .get(id)
            .ok_or_else(|| ColloquyError::UnknownCard(id.clone()))
    }

    /// Whether the catalog holds `id`.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.templates.contains_key(id)
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// All templates, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CardTemplate>> {
        self.templates.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardKind, ExchangeCard};
    use crate::types::ConnectionType;

    fn exchange(id: &str) -> CardTemplate {
        CardTemplate::new(
            id,
            ConnectionType::Commerce,
            CardKind::Exchange(ExchangeCard::default()),
        )
    }

    #[test]
    fn lookup_by_id() {
        let catalog = CardCatalog::from_provider(&vec![exchange("a"), exchange("b")])
            .expect("from provider");
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&CardId::from("a")));
        assert_eq!(catalog.get(&CardId::from("b")).expect("get").id.as_str(), "b");
    }

    #[test]
    fn unknown_id_is_an_error() {
        let catalog = CardCatalog::from_templates([exchange("a")]).expect("from templates");
        let err = catalog.get(&CardId::from("missing")).expect_err("get");
        assert!(matches!(err, ColloquyError::UnknownCard(id) if id.as_str() == "missing"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = CardCatalog::from_templates([exchange("a"), exchange("a")])
            .expect_err("from templates");
        assert!(matches!(err, ColloquyError::DuplicateCard(_)));
    }

    #[test]
    fn json_provider_parses_arrays_and_reports_garbage() {
        let provider = JsonContentProvider::new(
            r#"[{ "id": "ale", "connection": "Commerce", "kind": "Exchange" }]"#,
        );
        let catalog = CardCatalog::from_provider(&provider).expect("from provider");
        assert!(catalog.contains(&CardId::from("ale")));

        let broken = JsonContentProvider::new("not json");
        assert!(matches!(
            CardCatalog::from_provider(&broken),
            Err(ColloquyError::Config(_))
        ));
    }
}
