use serde::{Deserialize, Serialize};

use super::TaxRate;

/// Currencies the business can invoice in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Dzd,
    Mad,
    Tnd,
    Egp,
    Lyd,
}

impl Currency {
    pub fn all() -> &'static [Currency] {
        &[
            Currency::Dzd,
            Currency::Mad,
            Currency::Tnd,
            Currency::Egp,
            Currency::Lyd,
        ]
    }

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Dzd => "DZD",
            Self::Mad => "MAD",
            Self::Tnd => "TND",
            Self::Egp => "EGP",
            Self::Lyd => "LYD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dzd => "Algerian Dinar",
            Self::Mad => "Moroccan Dirham",
            Self::Tnd => "Tunisian Dinar",
            Self::Egp => "Egyptian Pound",
            Self::Lyd => "Libyan Dinar",
        }
    }

    /// Number of decimal places in the currency's smallest unit (ISO 4217).
    pub fn minor_units(&self) -> u32 {
        match self {
            Self::Dzd | Self::Mad | Self::Egp => 2,
            Self::Tnd | Self::Lyd => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Ar => "ar",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            "ar" => Some(Self::Ar),
            _ => None,
        }
    }
}

/// Business-wide settings. The TVA rate seeds the tax rate of every new
/// invoice draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessSettings {
    // Company profile
    pub company_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub tax_id: String,

    // Invoicing
    pub currency: Currency,
    pub language: Language,
    pub tva_rate: TaxRate,

    // Inventory
    pub low_stock_threshold: u32,

    // Preferences
    pub enable_notifications: bool,
    pub enable_auto_backup: bool,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            company_name: "My Business SARL".to_string(),
            address: "123 Business Street, Algiers, Algeria".to_string(),
            phone: "+213 555 123 456".to_string(),
            email: "contact@mybusiness.dz".to_string(),
            tax_id: "NIF123456789".to_string(),
            currency: Currency::Dzd,
            language: Language::En,
            tva_rate: TaxRate::standard_tva(),
            low_stock_threshold: 10,
            enable_notifications: true,
            enable_auto_backup: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn defaults_use_dinar_and_nineteen_percent_tva() {
        let settings = BusinessSettings::default();

        assert_eq!(settings.currency, Currency::Dzd);
        assert_eq!(settings.tva_rate.percent(), dec!(19));
        assert_eq!(settings.low_stock_threshold, 10);
    }

    #[test]
    fn currency_parse_is_case_insensitive() {
        assert_eq!(Currency::parse("mad"), Some(Currency::Mad));
        assert_eq!(Currency::parse(" TND "), Some(Currency::Tnd));
        assert_eq!(Currency::parse("EUR"), None);
    }

    #[test]
    fn three_decimal_currencies() {
        assert_eq!(Currency::Tnd.minor_units(), 3);
        assert_eq!(Currency::Lyd.minor_units(), 3);
        assert_eq!(Currency::Dzd.minor_units(), 2);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: BusinessSettings =
            serde_json::from_str(r#"{"company_name": "Atlas SARL", "currency": "MAD"}"#).unwrap();

        assert_eq!(settings.company_name, "Atlas SARL");
        assert_eq!(settings.currency, Currency::Mad);
        assert_eq!(settings.tva_rate, TaxRate::standard_tva());
    }
}
