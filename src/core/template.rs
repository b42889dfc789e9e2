use crate::core::parsers::DEFAULT_DELIMITER;
use crate::domain::model::RecordKind;

const PRODUCT_HEADERS: &[&str] = &[
    "sku",
    "name",
    "category",
    "subcategory",
    "brand",
    "price",
    "cost",
    "inventory_level",
    "launch_date",
];

const PRODUCT_ROWS: &[&[&str]] = &[
    &[
        "ELEC-001",
        "Wireless Headphones",
        "Electronics",
        "Audio",
        "TechBrand",
        "99.99",
        "45.00",
        "150",
        "2024-01-15",
    ],
    &[
        "APPR-001",
        "Cotton T-Shirt",
        "Apparel",
        "Shirts",
        "FashionCo",
        "24.99",
        "12.50",
        "300",
        "2024-02-01",
    ],
    &[
        "HOME-001",
        "Coffee Maker",
        "Home & Garden",
        "Kitchen",
        "HomePlus",
        "149.99",
        "75.00",
        "75",
        "2024-01-20",
    ],
];

const SALES_HEADERS: &[&str] = &["sku", "date", "unitsSold", "revenue", "channel", "region"];

const SALES_ROWS: &[&[&str]] = &[
    &["ELEC-001", "2024-01-15", "5", "499.95", "online", "North America"],
    &["APPR-001", "2024-01-16", "12", "299.88", "retail", "Europe"],
    &["HOME-001", "2024-01-17", "3", "449.97", "online", "Asia Pacific"],
];

const INVENTORY_HEADERS: &[&str] = &["sku", "quantity", "location"];

const INVENTORY_ROWS: &[&[&str]] = &[
    &["ELEC-001", "150", "Warehouse A"],
    &["APPR-001", "300", "Warehouse B"],
    &["HOME-001", "75", "Warehouse A"],
];

fn render(headers: &[&str], rows: &[&[&str]]) -> String {
    let delimiter = char::from(DEFAULT_DELIMITER).to_string();
    std::iter::once(headers)
        .chain(rows.iter().copied())
        .map(|row| row.join(delimiter.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Example upload file for `kind`: header row first, one record per line.
pub fn generate(kind: RecordKind) -> String {
    match kind {
        RecordKind::Product => render(PRODUCT_HEADERS, PRODUCT_ROWS),
        RecordKind::Sales => render(SALES_HEADERS, SALES_ROWS),
        RecordKind::Generic => render(INVENTORY_HEADERS, INVENTORY_ROWS),
    }
}

/// Suggested download name for the template of `kind`.
pub fn file_name(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Product => "product_template.csv",
        RecordKind::Sales => "sales_template.csv",
        RecordKind::Generic => "inventory_template.csv",
    }
}
