use serde::{Deserialize, Serialize};

use texinvoice_core::{DomainError, DomainResult, Email, ValueObject};

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(alias = "address")]
    pub street: String,
    #[serde(alias = "zip_code")]
    pub postal_code: u32,
    pub city: String,
}

impl ValueObject for Address {}

impl Address {
    pub fn new(street: impl Into<String>, postal_code: u32, city: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            postal_code,
            city: city.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        let mut missing = Vec::new();
        if self.street.trim().is_empty() {
            missing.push("street");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::missing(missing))
        }
    }
}

/// Bank-transfer details printed in the payment section of the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub name: Option<String>,
    pub iban: String,
    pub bic: String,
}

impl ValueObject for BankDetails {}

impl BankDetails {
    pub fn validate(&self) -> DomainResult<()> {
        let mut missing = Vec::new();
        if self.iban.trim().is_empty() {
            missing.push("iban");
        }
        if self.bic.trim().is_empty() {
            missing.push("bic");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::missing(missing))
        }
    }
}

/// The party issuing the invoice (seller).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Issuer {
    pub company_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// French company registration number.
    pub siret: Option<String>,
    /// Intra-community VAT number.
    pub intracom_vat: Option<String>,
    /// Path of a logo image, resolved by the typesetting compiler.
    pub logo: Option<String>,
    pub address: Option<Address>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    #[serde(alias = "rib")]
    pub bank: Option<BankDetails>,
}

impl Issuer {
    pub fn company(name: impl Into<String>) -> Self {
        Self {
            company_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        require_identifying_name(&self.company_name, &self.first_name, &self.last_name)?;
        if let Some(address) = &self.address {
            address.validate().map_err(|e| e.nested("address"))?;
        }
        if let Some(bank) = &self.bank {
            bank.validate().map_err(|e| e.nested("bank"))?;
        }
        Ok(())
    }

    /// Company name when present, otherwise the person's full name.
    pub fn display_name(&self) -> String {
        display_name(&self.company_name, &self.first_name, &self.last_name)
    }
}

/// The party being billed (buyer).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customer {
    /// Company name.
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<Address>,
    pub email: Option<Email>,
    pub phone: Option<String>,
}

impl Customer {
    pub fn person(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        require_identifying_name(&self.name, &self.first_name, &self.last_name)?;
        if let Some(address) = &self.address {
            address.validate().map_err(|e| e.nested("address"))?;
        }
        Ok(())
    }

    pub fn display_name(&self) -> String {
        display_name(&self.name, &self.first_name, &self.last_name)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn require_identifying_name(
    company: &Option<String>,
    first: &Option<String>,
    last: &Option<String>,
) -> DomainResult<()> {
    if non_blank(company).is_none() && non_blank(first).is_none() && non_blank(last).is_none() {
        return Err(DomainError::invalid(
            "name",
            "at least one of company name, first name or last name is required",
        ));
    }
    Ok(())
}

fn display_name(company: &Option<String>, first: &Option<String>, last: &Option<String>) -> String {
    if let Some(company) = non_blank(company) {
        return company.to_string();
    }
    [non_blank(first), non_blank(last)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_requires_an_identifying_name() {
        let err = Issuer::default().validate().unwrap_err();
        assert_eq!(err.fields(), vec!["name"]);

        let issuer = Issuer {
            last_name: Some("Qui roule".to_string()),
            ..Issuer::default()
        };
        assert!(issuer.validate().is_ok());
        assert_eq!(issuer.display_name(), "Qui roule");
    }

    #[test]
    fn blank_names_do_not_count() {
        let customer = Customer {
            name: Some("   ".to_string()),
            ..Customer::default()
        };
        assert!(customer.validate().is_err());
    }

    #[test]
    fn nested_address_errors_name_the_path() {
        let customer = Customer {
            address: Some(Address::new("", 75000, "")),
            ..Customer::person("Jean", "Dupond")
        };
        let err = customer.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["address.street", "address.city"]);
    }

    #[test]
    fn bank_details_require_iban_and_bic() {
        let issuer = Issuer {
            bank: Some(BankDetails {
                name: None,
                iban: "FR76 0000".to_string(),
                bic: String::new(),
            }),
            ..Issuer::company("My Awesome Company")
        };
        let err = issuer.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["bank.bic"]);
    }

    #[test]
    fn display_name_prefers_company() {
        let customer = Customer {
            name: Some("SARL Dupond et fils".to_string()),
            ..Customer::person("Jean", "Dupond")
        };
        assert_eq!(customer.display_name(), "SARL Dupond et fils");
        assert_eq!(Customer::person("Jean", "Dupond").display_name(), "Jean Dupond");
    }
}
