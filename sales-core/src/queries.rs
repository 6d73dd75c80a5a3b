//! In-memory search and aggregation over the catalog and customer directory.

use rust_decimal::Decimal;

use crate::models::{Customer, CustomerType, Product, StockStatus};

/// Catalog search: free text against name or SKU, optionally narrowed to a
/// category. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub query: String,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn matches(
        &self,
        product: &Product,
    ) -> bool {
        let query = self.query.trim().to_lowercase();
        let matches_search = query.is_empty()
            || product.name.to_lowercase().contains(&query)
            || product.sku.to_lowercase().contains(&query);
        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|category| product.category == category);

        matches_search && matches_category
    }

    pub fn apply<'a>(
        &self,
        products: &'a [Product],
    ) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct categories in catalog order.
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for product in products {
        if !seen.contains(&product.category.as_str()) {
            seen.push(&product.category);
        }
    }
    seen
}

/// Products that are low on stock or out of stock.
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| p.stock_status() != StockStatus::InStock)
        .collect()
}

/// Value of stock on hand at cost.
pub fn inventory_value(products: &[Product]) -> Decimal {
    products
        .iter()
        .map(|p| Decimal::from(p.quantity) * p.cost)
        .sum()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CustomerSegment {
    #[default]
    All,
    Individual,
    Business,
    Outstanding,
}

impl CustomerSegment {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "individual" => Some(Self::Individual),
            "business" => Some(Self::Business),
            "outstanding" => Some(Self::Outstanding),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Customers",
            Self::Individual => "Individuals",
            Self::Business => "Businesses",
            Self::Outstanding => "Outstanding Balance",
        }
    }

    fn includes(
        &self,
        customer: &Customer,
    ) -> bool {
        match self {
            Self::All => true,
            Self::Individual => customer.customer_type == CustomerType::Individual,
            Self::Business => customer.customer_type == CustomerType::Business,
            Self::Outstanding => customer.has_outstanding_balance(),
        }
    }
}

/// Directory search. Name and email match case-insensitively, phone numbers
/// match verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub query: String,
    pub segment: CustomerSegment,
}

impl CustomerFilter {
    pub fn matches(
        &self,
        customer: &Customer,
    ) -> bool {
        let raw = self.query.trim();
        let query = raw.to_lowercase();
        let matches_search = query.is_empty()
            || customer.name.to_lowercase().contains(&query)
            || customer.email.to_lowercase().contains(&query)
            || customer.phone.contains(raw);

        matches_search && self.segment.includes(customer)
    }

    pub fn apply<'a>(
        &self,
        customers: &'a [Customer],
    ) -> Vec<&'a Customer> {
        customers.iter().filter(|c| self.matches(c)).collect()
    }
}

pub fn total_outstanding(customers: &[Customer]) -> Decimal {
    customers.iter().map(|c| c.outstanding_balance).sum()
}
