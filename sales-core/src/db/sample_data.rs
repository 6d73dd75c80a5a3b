//! Demonstration catalog and customer directory used by the memory backend.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Customer, CustomerType, Product};

fn date(
    year: i32,
    month: u32,
    day: u32,
) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn product(
    id: i64,
    name: &str,
    sku: &str,
    category: &str,
    (quantity, low_stock_threshold): (u32, u32),
    (price, cost): (i64, i64),
    last_updated: NaiveDate,
) -> Product {
    Product {
        id,
        name: name.to_string(),
        sku: sku.to_string(),
        category: category.to_string(),
        quantity,
        low_stock_threshold,
        price: Decimal::from(price),
        cost: Decimal::from(cost),
        last_updated,
    }
}

pub fn sample_products() -> Vec<Product> {
    vec![
        product(1, "Laptop Dell Inspiron 15", "DELL-INS-15-001", "Electronics", (25, 10), (85000, 70000), date(2024, 1, 15)),
        product(2, "Office Chair Ergonomic", "CHAIR-ERG-001", "Furniture", (8, 5), (15000, 12000), date(2024, 1, 14)),
        product(3, "Wireless Mouse Logitech", "LOGI-MOUSE-001", "Electronics", (3, 10), (2500, 1800), date(2024, 1, 13)),
        product(4, "A4 Paper Ream", "PAPER-A4-001", "Office Supplies", (150, 20), (800, 600), date(2024, 1, 15)),
    ]
}

pub fn sample_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: 1,
            name: "Ahmed Ben Ali".to_string(),
            email: "ahmed.benali@email.com".to_string(),
            phone: "+213 555 123 456".to_string(),
            address: "123 Rue de la Liberté".to_string(),
            city: "Algiers".to_string(),
            country: "Algeria".to_string(),
            customer_type: CustomerType::Individual,
            total_purchases: Decimal::from(125000),
            last_purchase: Some(date(2024, 1, 15)),
            outstanding_balance: Decimal::ZERO,
        },
        Customer {
            id: 2,
            name: "Société SARL TechCorp".to_string(),
            email: "contact@techcorp.dz".to_string(),
            phone: "+213 555 987 654".to_string(),
            address: "45 Boulevard Mohamed V".to_string(),
            city: "Oran".to_string(),
            country: "Algeria".to_string(),
            customer_type: CustomerType::Business,
            total_purchases: Decimal::from(450000),
            last_purchase: Some(date(2024, 1, 14)),
            outstanding_balance: Decimal::from(25000),
        },
        Customer {
            id: 3,
            name: "Fatima Zahra".to_string(),
            email: "fatima.zahra@email.com".to_string(),
            phone: "+212 666 111 222".to_string(),
            address: "78 Avenue Hassan II".to_string(),
            city: "Casablanca".to_string(),
            country: "Morocco".to_string(),
            customer_type: CustomerType::Individual,
            total_purchases: Decimal::from(75000),
            last_purchase: Some(date(2024, 1, 10)),
            outstanding_balance: Decimal::from(5000),
        },
        Customer {
            id: 4,
            name: "Entreprise Moderne SARL".to_string(),
            email: "info@moderne.ma".to_string(),
            phone: "+212 666 333 444".to_string(),
            address: "12 Rue Abderrahman".to_string(),
            city: "Rabat".to_string(),
            country: "Morocco".to_string(),
            customer_type: CustomerType::Business,
            total_purchases: Decimal::from(320000),
            last_purchase: Some(date(2024, 1, 12)),
            outstanding_balance: Decimal::ZERO,
        },
    ]
}
