use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::error::CatalogError;
use crate::template::Template;

/// Ordered, immutable list of intent templates.
///
/// Position in the list is the template's index. The matcher scores templates
/// in this order and keeps the first of any tied scores, so reordering entries
/// changes which template wins a tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Builds a catalog from a custom ordered list, validating every entry
    /// and rejecting duplicate ids.
    pub fn from_templates(templates: Vec<Template>) -> Result<Self, CatalogError> {
        if templates.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut ids = HashSet::with_capacity(templates.len());
        for template in &templates {
            template.validate()?;
            if !ids.insert(template.id.as_str()) {
                return Err(CatalogError::DuplicateId(template.id.clone()));
            }
        }
        debug!(templates = templates.len(), "template catalog built");
        Ok(Self { templates })
    }

    /// The built-in retail catalog: orders, customers, products and inventory.
    pub fn retail() -> Self {
        let templates = RETAIL_TEMPLATES
            .iter()
            .map(|(id, description, sql, parameters)| Template {
                id: (*id).to_string(),
                description: (*description).to_string(),
                sql: (*sql).to_string(),
                parameters: parameters.iter().map(|name| (*name).to_string()).collect(),
            })
            .collect();
        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Template at `index`, or [`CatalogError::IndexOutOfRange`].
    pub fn get(&self, index: usize) -> Result<&Template, CatalogError> {
        self.templates
            .get(index)
            .ok_or(CatalogError::IndexOutOfRange {
                index,
                len: self.templates.len(),
            })
    }

    /// Index and template for `id`.
    pub fn find(&self, id: &str) -> Option<(usize, &Template)> {
        self.templates
            .iter()
            .enumerate()
            .find(|(_, template)| template.id == id)
    }

    /// Descriptions in catalog order; this is what gets embedded.
    pub fn descriptions(&self) -> Vec<&str> {
        self.templates
            .iter()
            .map(|template| template.description.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::retail()
    }
}

impl<'a> IntoIterator for &'a TemplateCatalog {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.iter()
    }
}

type RetailEntry = (&'static str, &'static str, &'static str, &'static [&'static str]);

const RETAIL_TEMPLATES: &[RetailEntry] = &[
    (
        "pending_orders",
        "Show all pending orders",
        "SELECT o.order_id, c.first_name, c.last_name, o.order_date, o.total_amount FROM orders o JOIN customers c ON o.customer_id = c.customer_id WHERE o.status = 'pending'",
        &[],
    ),
    (
        "customer_orders",
        "Find orders for a specific customer by last name",
        "SELECT o.order_id, o.order_date, o.status, o.total_amount FROM orders o JOIN customers c ON o.customer_id = c.customer_id WHERE c.last_name = '{customer_last_name}'",
        &["customer_last_name"],
    ),
    (
        "product_inventory",
        "Check inventory for a product by name",
        "SELECT p.name, i.quantity, i.warehouse FROM products p JOIN inventory i ON p.product_id = i.product_id WHERE p.name LIKE '%{product_name}%'",
        &["product_name"],
    ),
    (
        "products_above_price",
        "List products above a certain price",
        "SELECT name, price, category FROM products WHERE price > {min_price}",
        &["min_price"],
    ),
    (
        "products_in_category",
        "Show all products in a category",
        "SELECT name, price, sku FROM products WHERE category = '{category}'",
        &["category"],
    ),
    (
        "low_stock_items",
        "Show low stock items (less than certain quantity)",
        "SELECT p.name, i.quantity, i.warehouse FROM products p JOIN inventory i ON p.product_id = i.product_id WHERE i.quantity < {threshold}",
        &["threshold"],
    ),
    (
        "all_customers",
        "List all customers",
        "SELECT customer_id, first_name, last_name, email FROM customers",
        &[],
    ),
];
