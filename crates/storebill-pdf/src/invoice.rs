//! # Invoice Rendering
//!
//! Draws one invoice on A4, in the classic layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Store Name (bold 16)                              INVOICE (bold 14)    │
//! │  Store address                                                          │
//! │                                                                         │
//! │  BILL TO                                  INVOICE #   3F2A9C01          │
//! │  Customer name                            ISSUE DATE  2026-08-25        │
//! │  Phone / address                          DUE DATE    2026-08-25        │
//! │  ───────────────────────────────────────────────────────────────────    │
//! │  DESCRIPTION                      QTY       PRICE        TOTAL          │
//! │  ───────────────────────────────────────────────────────────────────    │
//! │  Linen Shirt                        2      100.00       200.00          │
//! │  ...                                                                    │
//! │  ───────────────────────────────────────────────────────────────────    │
//! │                                        SUBTOTAL         200.00          │
//! │                                        DISCOUNT (10%)    20.00          │
//! │                                        TAX               36.00          │
//! │                                        TOTAL            216.00          │
//! │                                                                         │
//! │  store@example.com | 000-000-0000                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The DISCOUNT line appears only when the percentage is non-zero. Long
//! item lists continue onto extra pages with the table header repeated.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::{format_money, PdfError, PdfResult, MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use storebill_core::{Customer, Invoice, StoreProfile};

/// One printable table row: the item snapshot plus its display name.
///
/// Invoice items store only the product id; callers resolve the name (or
/// fall back to something like "Item #7" for deleted products).
#[derive(Debug, Clone)]
pub struct PrintLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
}

impl PrintLine {
    fn total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Everything needed to draw one invoice.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub store: StoreProfile,
    pub invoice: Invoice,
    /// None renders the bill-to block as "Walk-in customer".
    pub customer: Option<Customer>,
    pub lines: Vec<PrintLine>,
}

// Column x positions (mm)
const X_DESC: f32 = MARGIN_MM;
const X_QTY: f32 = 120.0;
const X_PRICE: f32 = 145.0;
const X_TOTAL: f32 = 175.0;
const X_META_LABEL: f32 = 130.0;
const X_META_VALUE: f32 = 160.0;

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

fn table_header(layer: &PdfLayerReference, bold: &IndirectFontRef, y: &mut f32) {
    text(layer, bold, "DESCRIPTION", 10.0, X_DESC, *y);
    text(layer, bold, "QTY", 10.0, X_QTY, *y);
    text(layer, bold, "PRICE", 10.0, X_PRICE, *y);
    text(layer, bold, "TOTAL", 10.0, X_TOTAL, *y);
    *y -= 3.5;
    rule(layer, *y);
    *y -= 7.0;
}

/// Renders an invoice to PDF bytes.
pub fn render_invoice(document: &InvoiceDocument) -> PdfResult<Vec<u8>> {
    let title = format!("Invoice {}", document.invoice.invoice_number);
    let (doc, page1, layer1) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let mut layer = doc.get_page(page1).get_layer(layer1);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PdfError::Render(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| PdfError::Render(e.to_string()))?;

    let mut y: f32 = PAGE_HEIGHT_MM - 15.0;

    // Header: store identity left, document title right
    text(&layer, &bold, &document.store.name, 16.0, MARGIN_MM, y);
    text(&layer, &bold, "INVOICE", 14.0, 165.0, y);
    y -= 6.0;
    if !document.store.address.is_empty() {
        text(&layer, &font, &document.store.address, 10.0, MARGIN_MM, y);
    }
    y -= 14.0;

    // Bill-to block left, invoice metadata right
    text(&layer, &bold, "BILL TO", 11.0, MARGIN_MM, y);
    text(&layer, &bold, "INVOICE #", 10.0, X_META_LABEL, y);
    text(
        &layer,
        &font,
        &document.invoice.invoice_number,
        10.0,
        X_META_VALUE,
        y,
    );
    y -= 6.0;

    let date = document.invoice.date.format("%Y-%m-%d").to_string();
    match &document.customer {
        Some(customer) => text(&layer, &font, &customer.name, 10.0, MARGIN_MM, y),
        None => text(&layer, &font, "Walk-in customer", 10.0, MARGIN_MM, y),
    }
    text(&layer, &bold, "ISSUE DATE", 10.0, X_META_LABEL, y);
    text(&layer, &font, &date, 10.0, X_META_VALUE, y);
    y -= 5.0;

    if let Some(customer) = &document.customer {
        if let Some(phone) = &customer.phone {
            text(&layer, &font, phone, 10.0, MARGIN_MM, y);
        }
    }
    // Paid at the counter; the due date equals the issue date.
    text(&layer, &bold, "DUE DATE", 10.0, X_META_LABEL, y);
    text(&layer, &font, &date, 10.0, X_META_VALUE, y);
    y -= 5.0;

    if let Some(customer) = &document.customer {
        if let Some(address) = &customer.address {
            text(&layer, &font, address, 10.0, MARGIN_MM, y);
        }
    }
    y -= 8.0;
    rule(&layer, y);
    y -= 7.0;

    // Item table, continuing onto fresh pages as needed
    table_header(&layer, &bold, &mut y);
    for line in &document.lines {
        if y < 45.0 {
            let (page, new_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(new_layer);
            y = PAGE_HEIGHT_MM - 20.0;
            table_header(&layer, &bold, &mut y);
        }

        text(&layer, &font, &line.description, 10.0, X_DESC, y);
        text(&layer, &font, &line.quantity.to_string(), 10.0, X_QTY, y);
        text(&layer, &font, &format_money(line.unit_price), 10.0, X_PRICE, y);
        text(&layer, &font, &format_money(line.total()), 10.0, X_TOTAL, y);
        y -= 6.0;
    }

    y -= 2.0;
    rule(&layer, y);
    y -= 8.0;

    // Totals block, right-aligned column
    let invoice = &document.invoice;
    text(&layer, &bold, "SUBTOTAL", 10.0, X_PRICE, y);
    text(&layer, &font, &format_money(invoice.subtotal), 10.0, X_TOTAL, y);
    y -= 6.0;

    if invoice.discount_percent > 0.0 {
        let label = if invoice.discount_name.is_empty() {
            format!("DISCOUNT ({:.0}%)", invoice.discount_percent)
        } else {
            format!(
                "{} ({:.0}%)",
                invoice.discount_name.to_uppercase(),
                invoice.discount_percent
            )
        };
        text(&layer, &bold, &label, 10.0, X_PRICE, y);
        text(
            &layer,
            &font,
            &format_money(invoice.discount_amount()),
            10.0,
            X_TOTAL,
            y,
        );
        y -= 6.0;
    }

    text(&layer, &bold, "TAX", 10.0, X_PRICE, y);
    text(&layer, &font, &format_money(invoice.tax), 10.0, X_TOTAL, y);
    y -= 7.0;

    text(&layer, &bold, "TOTAL", 12.0, X_PRICE, y);
    text(&layer, &bold, &format_money(invoice.total), 12.0, X_TOTAL, y);

    // Footer: store contact line
    let footer = match (
        document.store.email.is_empty(),
        document.store.phone.is_empty(),
    ) {
        (false, false) => format!("{} | {}", document.store.email, document.store.phone),
        (false, true) => document.store.email.clone(),
        (true, false) => document.store.phone.clone(),
        (true, true) => String::new(),
    };
    if !footer.is_empty() {
        text(&layer, &font, &footer, 9.0, MARGIN_MM, 12.0);
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
    use chrono::NaiveDate;

    fn sample_invoice(discount_percent: f64) -> Invoice {
        Invoice {
            id: 1,
            invoice_number: "3F2A9C01".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            customer_id: None,
            subtotal: 200.0,
            discount_name: "Festival".to_string(),
            discount_percent,
            tax: 36.0,
            total: 216.0,
        }
    }

    fn sample_document(discount_percent: f64, line_count: usize) -> InvoiceDocument {
        InvoiceDocument {
            store: StoreProfile {
                name: "Lilly's Closet".to_string(),
                address: "12 Market Street".to_string(),
                email: "hello@lillyscloset.example".to_string(),
                phone: "000-000-0000".to_string(),
            },
            invoice: sample_invoice(discount_percent),
            customer: None,
            lines: (0..line_count)
                .map(|i| PrintLine {
                    description: format!("Item {}", i + 1),
                    quantity: 2,
                    unit_price: 100.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = render_invoice(&sample_document(10.0, 1)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_without_discount() {
        // Zero percent suppresses the discount line; rendering must succeed.
        let bytes = render_invoice(&sample_document(0.0, 3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_invoice_spills_onto_extra_pages() {
        let short = render_invoice(&sample_document(0.0, 2)).unwrap();
        let long = render_invoice(&sample_document(0.0, 120)).unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }

    #[test]
    fn test_named_customer_renders() {
        let mut document = sample_document(10.0, 1);
        document.customer = Some(Customer {
            id: 7,
            name: "Priya Sharma".to_string(),
            phone: Some("9876543210".to_string()),
            email: None,
            address: Some("42 Lake Road".to_string()),
            total_purchases: 0.0,
            last_visit: None,
        });
        assert!(render_invoice(&document).unwrap().starts_with(b"%PDF"));
    }
}
