//! Invoice composition.
//!
//! Arithmetic is kept separate from layout: [`InvoiceRequest::totals`] is the
//! single source of truth for subtotal, discount, tax and total, and every
//! figure is re-derivable from the stored payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{escape_typst_string, format_currency};
use super::validation::{
    validate_email, validate_non_negative, validate_positive, validate_required, ValidationError,
    ValidationErrors,
};
use crate::error::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
}

impl InvoiceItem {
    pub fn amount(&self) -> f64 {
        self.quantity * self.rate
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceRequest {
    pub company_name: String,
    pub company_address: String,
    pub company_email: String,
    pub company_phone: String,
    pub client_name: String,
    pub client_address: String,
    pub client_email: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub items: Vec<InvoiceItem>,
    /// Percentage applied after the discount.
    #[serde(default)]
    pub tax_rate: f64,
    /// Percentage applied to the subtotal.
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub template_id: Option<Uuid>,
}

/// Derived figures; no rounding until display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub after_discount: f64,
    pub tax_amount: f64,
    pub total: f64,
}

impl InvoiceRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.company_name, "company_name", "Company name", &mut errors);
        validate_required(&self.client_name, "client_name", "Client name", &mut errors);
        validate_email(&self.company_email, "company_email", &mut errors);
        validate_email(&self.client_email, "client_email", &mut errors);
        validate_required(&self.invoice_number, "invoice_number", "Invoice number", &mut errors);
        validate_required(&self.invoice_date, "invoice_date", "Invoice date", &mut errors);
        validate_required(&self.due_date, "due_date", "Due date", &mut errors);
        validate_non_negative(self.tax_rate, "tax_rate", "Tax rate", &mut errors);
        validate_non_negative(self.discount, "discount", "Discount", &mut errors);

        if self.items.is_empty() {
            errors.add(ValidationError::new(
                "items",
                "An invoice needs at least one line item",
            ));
        }
        for (i, item) in self.items.iter().enumerate() {
            validate_required(
                &item.description,
                &format!("items[{i}].description"),
                "Item description",
                &mut errors,
            );
            validate_positive(
                item.quantity,
                &format!("items[{i}].quantity"),
                "Item quantity",
                &mut errors,
            );
            validate_non_negative(
                item.rate,
                &format!("items[{i}].rate"),
                "Item rate",
                &mut errors,
            );
        }

        errors.into_result()
    }

    pub fn totals(&self) -> InvoiceTotals {
        let subtotal: f64 = self.items.iter().map(InvoiceItem::amount).sum();
        let discount_amount = subtotal * (self.discount / 100.0);
        let after_discount = subtotal - discount_amount;
        let tax_amount = after_discount * (self.tax_rate / 100.0);
        let total = after_discount + tax_amount;
        InvoiceTotals {
            subtotal,
            discount_amount,
            after_discount,
            tax_amount,
            total,
        }
    }

    pub fn title(&self) -> String {
        format!("Invoice #{}", self.invoice_number)
    }

    /// Deterministic Typst source for this payload and template accent.
    pub fn typst_source(&self, accent: &str) -> String {
        let totals = self.totals();

        let mut item_rows = String::new();
        for item in &self.items {
            item_rows.push_str(&format!(
                "  [{}], [{}], [{}], [{}],\n",
                escape_typst_string(&item.description),
                item.quantity,
                format_currency(item.rate),
                format_currency(item.amount()),
            ));
        }

        let notes_block = if self.notes.trim().is_empty() {
            String::new()
        } else {
            format!(
                "\n== Notes\n{}\n",
                escape_typst_string(self.notes.trim())
            )
        };

        format!(
            r#"#set page(paper: "us-letter", margin: 2cm)
#set text(10pt)

#align(center)[#text(24pt, weight: "bold", fill: rgb("{accent}"))[INVOICE]]

#grid(
  columns: (1fr, 1fr),
  [
    *From:* \
    {company_name} \
    {company_address} \
    {company_email} \
    {company_phone}
  ],
  [
    *To:* \
    {client_name} \
    {client_address} \
    {client_email}
  ],
)

#v(1em)
Invoice Number: {invoice_number} \
Invoice Date: {invoice_date} \
Due Date: {due_date}

#v(1em)
#table(
  columns: (3fr, 1fr, 1fr, 1fr),
  table.header([*Description*], [*Quantity*], [*Rate*], [*Amount*]),
{item_rows})

#align(right)[
  Subtotal: {subtotal} \
  Discount ({discount_rate}%): -{discount_amount} \
  Tax ({tax_rate}%): {tax_amount} \
  *Total: {total}*
]
{notes_block}"#,
            accent = accent,
            company_name = escape_typst_string(&self.company_name),
            company_address = escape_typst_string(&self.company_address),
            company_email = escape_typst_string(&self.company_email),
            company_phone = escape_typst_string(&self.company_phone),
            client_name = escape_typst_string(&self.client_name),
            client_address = escape_typst_string(&self.client_address),
            client_email = escape_typst_string(&self.client_email),
            invoice_number = escape_typst_string(&self.invoice_number),
            invoice_date = escape_typst_string(&self.invoice_date),
            due_date = escape_typst_string(&self.due_date),
            item_rows = item_rows,
            subtotal = format_currency(totals.subtotal),
            discount_rate = self.discount,
            discount_amount = format_currency(totals.discount_amount),
            tax_rate = self.tax_rate,
            tax_amount = format_currency(totals.tax_amount),
            total = format_currency(totals.total),
            notes_block = notes_block,
        )
    }
}
