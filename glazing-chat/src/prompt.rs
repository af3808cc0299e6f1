use std::fmt::Write as _;

use glazing_core::catalog::Catalog;

/// Builds the assistant persona from the published catalog.
pub fn system_instruction(catalog: &Catalog) -> String {
    let company = &catalog.company;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "You are the assistant for {}, a London company fitting double glazing, windows and doors.",
        company.name
    );
    out.push_str(
        "Be helpful and professional, and encourage customers to request a quote or call us.\n\
         We no longer offer painting services; we work only on glazing, windows and doors.\n\n",
    );

    out.push_str("Company details:\n");
    let _ = writeln!(out, "Name: {}", company.name);
    let _ = writeln!(out, "Address: {}", company.address);
    let _ = writeln!(out, "Phone: {}", company.phone);
    let _ = writeln!(out, "Hours: {}", company.hours);
    let _ = writeln!(
        out,
        "Rating: {} stars from {} reviews.",
        company.rating, company.review_count
    );

    out.push_str("\nProducts:\n");
    for product in catalog.products {
        let _ = writeln!(
            out,
            "- {}: {} ({})",
            product.name, product.description, product.price_range
        );
    }

    out.push_str(
        "\nTone: modern, professional, expert and concise.\n\
         When asked about prices, quote the ranges above and explain that a site visit gives an accurate figure.\n\
         When asked where we are, say North Circular Rd, London N13.\n\
         When asked about painting, explain politely that we now specialise in windows and doors only.\n\
         Keep answers under 80 words unless the customer asks for detail.\n",
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_names_company_and_contact() {
        let text = system_instruction(&Catalog::standard());

        assert!(text.contains("A406 Windows"));
        assert!(text.contains("020 8889 9982"));
        assert!(text.contains("377 B, N Circular Rd., London N13 5UU"));
        assert!(text.contains("4.1 stars from 13 reviews"));
    }

    #[test]
    fn instruction_lists_every_product_with_range() {
        let catalog = Catalog::standard();
        let text = system_instruction(&catalog);

        for product in catalog.products {
            assert!(text.contains(product.name), "missing {}", product.name);
            assert!(text.contains(product.price_range));
        }
    }

    #[test]
    fn instruction_sets_scope_and_length() {
        let text = system_instruction(&Catalog::standard());

        assert!(text.contains("painting"));
        assert!(text.contains("under 80 words"));
        assert!(text.contains("site visit"));
    }
}
