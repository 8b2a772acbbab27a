//! # Catalog Export
//!
//! Renders the product catalog as a multi-page A4 table for printing or
//! sharing with suppliers.
//!
//! Columns: ID, Name, Category, Price, Cost, Stock, Tax %, Barcode. The
//! header repeats at the top of every page.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::{format_money, PdfError, PdfResult, MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use storebill_core::{Product, StoreProfile};

// Column x positions (mm)
const X_ID: f32 = MARGIN_MM;
const X_NAME: f32 = 28.0;
const X_CATEGORY: f32 = 78.0;
const X_PRICE: f32 = 108.0;
const X_COST: f32 = 126.0;
const X_STOCK: f32 = 144.0;
const X_TAX: f32 = 158.0;
const X_BARCODE: f32 = 170.0;

const BOTTOM_MARGIN: f32 = 20.0;

fn text(layer: &PdfLayerReference, font: &IndirectFontRef, s: &str, size: f32, x: f32, y: f32) {
    layer.use_text(s, size, Mm(x), Mm(y), font);
}

fn rule(layer: &PdfLayerReference, y: f32) {
    layer.add_line(printpdf::Line {
        points: vec![
            (printpdf::Point::new(Mm(MARGIN_MM), Mm(y)), false),
            (
                printpdf::Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(y)),
                false,
            ),
        ],
        is_closed: false,
    });
}

fn column_header(layer: &PdfLayerReference, bold: &IndirectFontRef, y: &mut f32) {
    text(layer, bold, "ID", 9.0, X_ID, *y);
    text(layer, bold, "Name", 9.0, X_NAME, *y);
    text(layer, bold, "Category", 9.0, X_CATEGORY, *y);
    text(layer, bold, "Price", 9.0, X_PRICE, *y);
    text(layer, bold, "Cost", 9.0, X_COST, *y);
    text(layer, bold, "Stock", 9.0, X_STOCK, *y);
    text(layer, bold, "Tax %", 9.0, X_TAX, *y);
    text(layer, bold, "Barcode", 9.0, X_BARCODE, *y);
    *y -= 3.0;
    rule(layer, *y);
    *y -= 6.0;
}

/// Truncates a cell so columns never overlap.
fn clip(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let clipped: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", clipped)
}

/// Renders the product catalog to PDF bytes.
pub fn render_catalog(store: &StoreProfile, products: &[Product]) -> PdfResult<Vec<u8>> {
    let (doc, page1, layer1) = PdfDocument::new(
        "Product Catalog",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let mut layer = doc.get_page(page1).get_layer(layer1);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PdfError::Render(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| PdfError::Render(e.to_string()))?;

    let mut y: f32 = PAGE_HEIGHT_MM - 15.0;

    text(&layer, &bold, &store.name, 16.0, MARGIN_MM, y);
    y -= 7.0;
    text(&layer, &bold, "Product Catalog", 12.0, MARGIN_MM, y);
    y -= 10.0;

    column_header(&layer, &bold, &mut y);

    for product in products {
        if y < BOTTOM_MARGIN {
            let (page, new_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(new_layer);
            y = PAGE_HEIGHT_MM - 20.0;
            column_header(&layer, &bold, &mut y);
        }

        text(&layer, &font, &product.id.to_string(), 9.0, X_ID, y);
        text(&layer, &font, &clip(&product.name, 30), 9.0, X_NAME, y);
        text(
            &layer,
            &font,
            &clip(product.category.as_deref().unwrap_or("-"), 16),
            9.0,
            X_CATEGORY,
            y,
        );
        text(&layer, &font, &format_money(product.price), 9.0, X_PRICE, y);
        text(
            &layer,
            &font,
            &format_money(product.cost_price),
            9.0,
            X_COST,
            y,
        );
        text(&layer, &font, &product.stock.to_string(), 9.0, X_STOCK, y);
        text(
            &layer,
            &font,
            &format!("{:.0}", product.tax_rate),
            9.0,
            X_TAX,
            y,
        );
        text(
            &layer,
            &font,
            product.barcode.as_deref().unwrap_or("-"),
            9.0,
            X_BARCODE,
            y,
        );
        y -= 5.5;
    }

    let mut writer = std::io::BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| PdfError::Render(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| PdfError::Render(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> StoreProfile {
        StoreProfile {
            name: "Lilly's Closet".to_string(),
            address: String::new(),
            email: String::new(),
            phone: String::new(),
        }
    }

    fn product(id: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            category: Some("Tops".to_string()),
            price: 49.0,
            cost_price: 22.0,
            stock: 10,
            tax_rate: 18.0,
            barcode: Some(format!("89010010{:05}", id)),
            description: None,
        }
    }

    #[test]
    fn test_empty_catalog_renders() {
        let bytes = render_catalog(&store(), &[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_large_catalog_paginates() {
        let products: Vec<Product> = (1..=150).map(product).collect();
        let small = render_catalog(&store(), &products[..5]).unwrap();
        let large = render_catalog(&store(), &products).unwrap();

        assert!(large.starts_with(b"%PDF"));
        assert!(large.len() > small.len());
    }

    #[test]
    fn test_clip_preserves_short_values() {
        assert_eq!(clip("Shirt", 10), "Shirt");
        assert_eq!(clip("A very long product name", 10), "A very lo…");
    }
}
