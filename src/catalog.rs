use std::fmt;

/// Product id used for inquiries that are not about a specific product.
pub const GENERAL_INQUIRY: &str = "none";
pub const GENERAL_INQUIRY_NAME: &str = "General Business Consultation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Agriculture,
    Textiles,
    Industrial,
    Electronics,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Agriculture => "Agriculture",
            Category::Textiles => "Textiles",
            Category::Industrial => "Industrial",
            Category::Electronics => "Electronics",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub origin: &'static str,
    pub specifications: &'static [&'static str],
}

pub const PRODUCTS: &[Product] = &[
    Product {
        id: "1",
        name: "Turmeric Powder",
        category: Category::Agriculture,
        origin: "India",
        specifications: &["Curcumin Content: 5.5%+", "Moisture: < 10%", "AFLATOXIN Certified"],
    },
    Product {
        id: "2",
        name: "Nasik Red Onions",
        category: Category::Agriculture,
        origin: "India",
        specifications: &["Size: 45mm - 65mm", "Skin: Double Layer", "Packing: 25kg Mesh Bags"],
    },
    Product {
        id: "3",
        name: "Premium Indian Fruits",
        category: Category::Agriculture,
        origin: "India",
        specifications: &["GlobalGAP Certified", "Residue-free", "Export-grade Grading"],
    },
    Product {
        id: "4",
        name: "High-End Mobile Accessories",
        category: Category::Electronics,
        origin: "India",
        specifications: &["BIS & CE Certified", "RoHS Compliant", "Eco-friendly Retail Pack"],
    },
    Product {
        id: "6",
        name: "Precision Cast Components",
        category: Category::Industrial,
        origin: "India",
        specifications: &["Material: SS316 / CI", "Tolerance: ±0.05mm", "ISO 9001:2015 Compliant"],
    },
    Product {
        id: "7",
        name: "Basmati Long Grain Rice",
        category: Category::Agriculture,
        origin: "India",
        specifications: &["Aged: 2 Years", "Average Grain Length: 8.3mm", "Purity: 95%"],
    },
    Product {
        id: "8",
        name: "Kashmiri Saffron (Grade A1)",
        category: Category::Agriculture,
        origin: "India",
        specifications: &["Grade: Mongra (Top)", "Moisture Content: < 12%", "ISO 3632 Compliant"],
    },
];

pub fn find(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|product| product.id == id)
}

/// Products offered as one-click inquiry targets in the quote form.
pub fn quick_picks() -> &'static [Product] {
    &PRODUCTS[..3]
}

/// Display name for an inquiry target; unknown ids count as general inquiries.
pub fn inquiry_name(product_id: &str) -> &'static str {
    find(product_id).map_or(GENERAL_INQUIRY_NAME, |product| product.name)
}
