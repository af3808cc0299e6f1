//! Static company and product content shown alongside the estimator and fed
//! to the chat assistant.

use std::fmt::Write as _;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompanyInfo {
    pub name: &'static str,
    pub tagline: &'static str,
    pub rating: f32,
    pub review_count: u32,
    pub address: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
    pub hours: &'static str,
    pub maps_link: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Product {
    pub name: &'static str,
    pub description: &'static str,
    pub price_range: &'static str,
    pub features: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceArea {
    pub title: &'static str,
    pub description: &'static str,
}

pub const COMPANY: CompanyInfo = CompanyInfo {
    name: "A406 Windows",
    tagline: "Architectural Glazing Systems",
    rating: 4.1,
    review_count: 13,
    address: "377 B, N Circular Rd., London N13 5UU",
    phone: "020 8889 9982",
    email: "info@a406windows.co.uk",
    hours: "Mon-Fri: 08:00 - 17:00",
    maps_link: "https://www.google.com/maps/place/A406+Windows/@51.615,-0.115,15z",
};

pub const PRODUCTS: &[Product] = &[
    Product {
        name: "Aluminium Casement",
        description: "Slim sightlines, maximum light. The architect's choice.",
        price_range: "£600 - £1200 per unit",
        features: &[
            "Thermal Break Technology",
            "High Security Locks",
            "Powder Coated Finish",
        ],
    },
    Product {
        name: "Heritage Sash",
        description: "Timeless design meeting modern thermal standards.",
        price_range: "£900 - £1600 per unit",
        features: &["Woodgrain Effect", "Easy Clean Tilt", "A++ Energy Rating"],
    },
    Product {
        name: "Panoramic Sliding Doors",
        description: "Floor-to-ceiling glass walls for seamless indoor-outdoor living.",
        price_range: "£1200 - £3000 per meter",
        features: &[
            "Ultra Slim Frames",
            "Smooth Lift & Slide",
            "Triple Glazing Option",
        ],
    },
];

pub const SERVICES: &[ServiceArea] = &[
    ServiceArea {
        title: "Structural Glazing",
        description: "Frameless glass facades and roof lights for commercial and residential builds.",
    },
    ServiceArea {
        title: "Residential Systems",
        description: "Energy-efficient aluminium and uPVC windows fitted to British standards.",
    },
    ServiceArea {
        title: "Entrance Technology",
        description: "Secure composite and aluminium entrance doors with multi-point locking.",
    },
];

/// Everything the site publishes about the business.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Catalog {
    pub company: CompanyInfo,
    pub products: &'static [Product],
    pub services: &'static [ServiceArea],
}

impl Catalog {
    pub const fn standard() -> Self {
        Self {
            company: COMPANY,
            products: PRODUCTS,
            services: SERVICES,
        }
    }

    pub fn product(
        &self,
        name: &str,
    ) -> Option<&'static Product> {
        self.products
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Plain-text product list, one `- name: range (features)` line each.
    pub fn product_summary(&self) -> String {
        let mut out = String::new();
        for product in self.products {
            let _ = writeln!(
                out,
                "- {}: {} ({})",
                product.name,
                product.price_range,
                product.features.join(", ")
            );
        }
        out
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
