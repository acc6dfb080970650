use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::calc;
use super::error::DteError;
use super::types::*;

/// The authority accepts at most this many items per document.
pub const MAX_LINES: usize = 2_000;

/// Builder for constructing invoices ready for mapping.
///
/// ```
/// use dte_sv::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let created = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(10, 30, 0).unwrap();
/// let address = AddressBuilder::new("06", "14", "Colonia Escalón, San Salvador").build();
/// let invoice = InvoiceBuilder::new("F-0001", created, DocumentVariant::StandardInvoice)
///     .company(CompanyBuilder::new("Comercial Ejemplo S.A. de C.V.", "46510", "Venta al por mayor", address.clone())
///         .nit("06141234567890")
///         .nrc("1234567")
///         .build())
///     .customer(CustomerBuilder::new("María López", address).national_id("012345678").build())
///     .add_line(InvoiceLineBuilder::new("Consultoría", dec!(2), dec!(11.30)).build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.totals.total, dec!(22.60));
/// ```
pub struct InvoiceBuilder {
    number: String,
    created_at: NaiveDateTime,
    variant: DocumentVariant,
    lines: Vec<InvoiceLine>,
    customer: Option<Customer>,
    company: Option<Company>,
    operation_condition: OperationCondition,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, created_at: NaiveDateTime, variant: DocumentVariant) -> Self {
        Self {
            number: number.into(),
            created_at,
            variant,
            lines: Vec::new(),
            customer: None,
            company: None,
            operation_condition: OperationCondition::Cash,
        }
    }

    pub fn company(mut self, company: Company) -> Self {
        self.company = Some(company);
        self
    }

    pub fn customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn add_line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn operation_condition(mut self, condition: OperationCondition) -> Self {
        self.operation_condition = condition;
        self
    }

    /// Build the invoice, computing totals and checking that the customer
    /// carries the identity the variant needs.
    pub fn build(self) -> Result<Invoice, DteError> {
        if self.number.trim().is_empty() {
            return Err(DteError::Builder("invoice number must not be empty".into()));
        }
        if self.lines.is_empty() {
            return Err(DteError::Builder(
                "at least one line item is required".into(),
            ));
        }
        if self.lines.len() > MAX_LINES {
            return Err(DteError::Builder(format!(
                "invoice cannot have more than {MAX_LINES} line items"
            )));
        }
        if let Some(i) = self.lines.iter().position(|l| l.quantity <= Decimal::ZERO) {
            return Err(DteError::Builder(format!(
                "line {} must have a positive quantity",
                i + 1
            )));
        }
        if let Some(i) = self.lines.iter().position(|l| l.unit_price < Decimal::ZERO) {
            return Err(DteError::Builder(format!(
                "line {} must not have a negative unit price",
                i + 1
            )));
        }

        let invoice = self.build_unchecked()?;

        let customer = &invoice.customer;
        if invoice.variant.document_type().uses_taxpayer_recipient() {
            if customer.nit.as_deref().is_none_or(str::is_empty) {
                return Err(DteError::Builder(
                    "fiscal-credit documents require the customer's NIT".into(),
                ));
            }
        } else if customer.national_id.as_deref().is_none_or(str::is_empty) {
            return Err(DteError::Builder(
                "this document type requires the customer's national ID".into(),
            ));
        }

        Ok(invoice)
    }

    /// Build without identity or line checks, for importing stored data.
    pub fn build_unchecked(self) -> Result<Invoice, DteError> {
        let company = self
            .company
            .ok_or_else(|| DteError::Builder("company is required".into()))?;
        let customer = self
            .customer
            .ok_or_else(|| DteError::Builder("customer is required".into()))?;

        let totals = calc::invoice_totals(&self.lines);
        Ok(Invoice {
            number: self.number,
            created_at: self.created_at,
            variant: self.variant,
            lines: self.lines,
            customer,
            company,
            operation_condition: self.operation_condition,
            totals,
        })
    }
}

/// Builder for the issuing company.
pub struct CompanyBuilder {
    nit: Option<String>,
    nrc: Option<String>,
    name: String,
    commercial_name: Option<String>,
    activity_code: String,
    activity_description: String,
    establishment_type: String,
    establishment_code_mh: String,
    establishment_code: String,
    point_of_sale_code_mh: String,
    point_of_sale_code: String,
    address: Address,
    phone: String,
    email: String,
}

impl CompanyBuilder {
    pub fn new(
        name: impl Into<String>,
        activity_code: impl Into<String>,
        activity_description: impl Into<String>,
        address: Address,
    ) -> Self {
        Self {
            nit: None,
            nrc: None,
            name: name.into(),
            commercial_name: None,
            activity_code: activity_code.into(),
            activity_description: activity_description.into(),
            establishment_type: "02".to_string(),
            establishment_code_mh: String::new(),
            establishment_code: String::new(),
            point_of_sale_code_mh: String::new(),
            point_of_sale_code: String::new(),
            address,
            phone: String::new(),
            email: String::new(),
        }
    }

    pub fn nit(mut self, nit: impl Into<String>) -> Self {
        self.nit = Some(nit.into());
        self
    }

    pub fn nrc(mut self, nrc: impl Into<String>) -> Self {
        self.nrc = Some(nrc.into());
        self
    }

    pub fn commercial_name(mut self, name: impl Into<String>) -> Self {
        self.commercial_name = Some(name.into());
        self
    }

    pub fn establishment_type(mut self, code: impl Into<String>) -> Self {
        self.establishment_type = code.into();
        self
    }

    /// Authority-assigned and own establishment codes.
    pub fn establishment(mut self, code_mh: impl Into<String>, code: impl Into<String>) -> Self {
        self.establishment_code_mh = code_mh.into();
        self.establishment_code = code.into();
        self
    }

    /// Authority-assigned and own point-of-sale codes.
    pub fn point_of_sale(mut self, code_mh: impl Into<String>, code: impl Into<String>) -> Self {
        self.point_of_sale_code_mh = code_mh.into();
        self.point_of_sale_code = code.into();
        self
    }

    pub fn contact(mut self, phone: impl Into<String>, email: impl Into<String>) -> Self {
        self.phone = phone.into();
        self.email = email.into();
        self
    }

    pub fn build(self) -> Company {
        Company {
            nit: self.nit,
            nrc: self.nrc,
            name: self.name,
            commercial_name: self.commercial_name,
            activity_code: self.activity_code,
            activity_description: self.activity_description,
            establishment_type: self.establishment_type,
            establishment_code_mh: self.establishment_code_mh,
            establishment_code: self.establishment_code,
            point_of_sale_code_mh: self.point_of_sale_code_mh,
            point_of_sale_code: self.point_of_sale_code,
            address: self.address,
            phone: self.phone,
            email: self.email,
        }
    }
}

/// Builder for Customer.
pub struct CustomerBuilder {
    name: String,
    national_id: Option<String>,
    nit: Option<String>,
    nrc: Option<String>,
    commercial_name: Option<String>,
    activity_code: Option<String>,
    activity_description: Option<String>,
    address: Address,
    phone: Option<String>,
    email: Option<String>,
}

impl CustomerBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            national_id: None,
            nit: None,
            nrc: None,
            commercial_name: None,
            activity_code: None,
            activity_description: None,
            address,
            phone: None,
            email: None,
        }
    }

    pub fn national_id(mut self, id: impl Into<String>) -> Self {
        self.national_id = Some(id.into());
        self
    }

    /// Corporate identity used by fiscal-credit documents and notes.
    pub fn taxpayer(mut self, nit: impl Into<String>, nrc: impl Into<String>) -> Self {
        self.nit = Some(nit.into());
        self.nrc = Some(nrc.into());
        self
    }

    pub fn commercial_name(mut self, name: impl Into<String>) -> Self {
        self.commercial_name = Some(name.into());
        self
    }

    pub fn activity(mut self, code: impl Into<String>, description: impl Into<String>) -> Self {
        self.activity_code = Some(code.into());
        self.activity_description = Some(description.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn build(self) -> Customer {
        Customer {
            name: self.name,
            national_id: self.national_id,
            nit: self.nit,
            nrc: self.nrc,
            commercial_name: self.commercial_name,
            activity_code: self.activity_code,
            activity_description: self.activity_description,
            address: self.address,
            phone: self.phone,
            email: self.email,
        }
    }
}

/// Builder for Address.
pub struct AddressBuilder {
    department: String,
    municipality: String,
    complement: String,
}

impl AddressBuilder {
    pub fn new(
        department: impl Into<String>,
        municipality: impl Into<String>,
        complement: impl Into<String>,
    ) -> Self {
        Self {
            department: department.into(),
            municipality: municipality.into(),
            complement: complement.into(),
        }
    }

    pub fn build(self) -> Address {
        Address {
            department: self.department,
            municipality: self.municipality,
            complement: self.complement,
        }
    }
}

/// Builder for InvoiceLine.
pub struct InvoiceLineBuilder {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    product_code: Option<String>,
}

impl InvoiceLineBuilder {
    /// `unit_price` is tax-inclusive.
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            product_code: None,
        }
    }

    pub fn product_code(mut self, code: impl Into<String>) -> Self {
        self.product_code = Some(code.into());
        self
    }

    pub fn build(self) -> InvoiceLine {
        InvoiceLine {
            quantity: self.quantity,
            unit_price: self.unit_price,
            description: self.description,
            product_code: self.product_code,
        }
    }
}
