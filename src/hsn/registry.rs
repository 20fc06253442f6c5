//! HSN (Harmonized System of Nomenclature) code registry
//!
//! Maps product classification codes to tax category, rate, and exemption
//! metadata. The registry is the single shared, mutable resource in the
//! crate: lookups may run concurrently from any thread while mutations
//! (`add`, `remove`, `clear_and_reload_defaults`) are serialized through
//! a write lock.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::hsn::standard_vat_rate;
use crate::traits::HsnSource;
use crate::types::{EinvoiceError, EinvoiceResult};

/// A single HSN code entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HsnEntry {
    /// HSN/SAC code (4-8 digits, even length)
    pub code: String,
    /// Human-readable description of the goods or services
    pub description: String,
    /// Product category label (e.g. "MEDICAL", "ELECTRONICS")
    pub category: String,
    /// VAT rate percentage applied to this code
    pub tax_rate: BigDecimal,
    /// Whether the code is VAT exempt
    pub is_exempt: bool,
    /// Statutory reason for the exemption, when exempt
    pub exemption_reason: Option<String>,
}

impl HsnEntry {
    /// Create a taxable entry at the given rate
    pub fn taxable(code: &str, description: &str, category: &str, tax_rate: BigDecimal) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            tax_rate,
            is_exempt: false,
            exemption_reason: None,
        }
    }

    /// Create an exempt entry (rate 0) with a statutory reason
    pub fn exempt(code: &str, description: &str, category: &str, reason: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            tax_rate: BigDecimal::from(0),
            is_exempt: true,
            exemption_reason: Some(reason.to_string()),
        }
    }

    /// Validate the entry: code format, and exempt entries must carry a
    /// zero rate and a reason
    pub fn validate(&self) -> EinvoiceResult<()> {
        if !HsnRegistry::validate_format(&self.code) {
            return Err(EinvoiceError::Validation(format!(
                "Invalid HSN code format: {}",
                self.code
            )));
        }

        if self.is_exempt {
            if self.tax_rate != BigDecimal::from(0) {
                return Err(EinvoiceError::Validation(format!(
                    "Exempt HSN code {} must have a zero tax rate",
                    self.code
                )));
            }
            if self.exemption_reason.is_none() {
                return Err(EinvoiceError::Validation(format!(
                    "Exempt HSN code {} requires an exemption reason",
                    self.code
                )));
            }
        }

        Ok(())
    }
}

/// Summary statistics over the registry contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HsnStatistics {
    pub total: usize,
    pub exempt: usize,
    pub taxable: usize,
    pub categories: HashMap<String, usize>,
}

/// Registry of HSN codes with exemption metadata
#[derive(Debug, Clone)]
pub struct HsnRegistry {
    entries: Arc<RwLock<HashMap<String, HsnEntry>>>,
}

impl HsnRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry seeded with the built-in default table
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.reload_defaults();
        registry
    }

    /// Validate HSN code format: 4-8 digits, even length
    pub fn validate_format(code: &str) -> bool {
        (4..=8).contains(&code.len())
            && code.len() % 2 == 0
            && code.chars().all(|c| c.is_ascii_digit())
    }

    /// Look up an entry by exact code, falling back to the 4-digit
    /// chapter prefix
    pub fn lookup(&self, code: &str) -> Option<HsnEntry> {
        let entries = self.entries.read().unwrap();
        if let Some(entry) = entries.get(code) {
            return Some(entry.clone());
        }
        code.get(..4).and_then(|chapter| entries.get(chapter).cloned())
    }

    /// Check whether a code is VAT exempt; unknown codes are not
    pub fn is_exempt(&self, code: &str) -> bool {
        self.lookup(code).map(|e| e.is_exempt).unwrap_or(false)
    }

    /// Tax rate for a code, defaulting to the standard VAT rate for
    /// unknown codes
    pub fn tax_rate(&self, code: &str) -> BigDecimal {
        self.lookup(code)
            .map(|e| e.tax_rate)
            .unwrap_or_else(standard_vat_rate)
    }

    /// Exemption reason for a code, if any
    pub fn exemption_reason(&self, code: &str) -> Option<String> {
        self.lookup(code).and_then(|e| e.exemption_reason)
    }

    /// Add an entry, validating it first
    pub fn add(&self, entry: HsnEntry) -> EinvoiceResult<()> {
        entry.validate()?;
        self.entries
            .write()
            .unwrap()
            .insert(entry.code.clone(), entry);
        Ok(())
    }

    /// Remove an entry; returns whether it was present
    pub fn remove(&self, code: &str) -> bool {
        self.entries.write().unwrap().remove(code).is_some()
    }

    /// Drop all entries and reinstate the built-in default table
    pub fn clear_and_reload_defaults(&self) {
        self.reload_defaults();
    }

    fn reload_defaults(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.clear();
        for entry in default_entries() {
            entries.insert(entry.code.clone(), entry);
        }
    }

    /// Import a batch of entries, skipping invalid ones; returns the
    /// number imported
    pub fn import_entries(&self, batch: Vec<HsnEntry>) -> usize {
        let mut entries = self.entries.write().unwrap();
        let mut imported = 0;
        for entry in batch {
            if entry.validate().is_ok() {
                entries.insert(entry.code.clone(), entry);
                imported += 1;
            }
        }
        imported
    }

    /// Export all entries
    pub fn export_entries(&self) -> Vec<HsnEntry> {
        self.entries.read().unwrap().values().cloned().collect()
    }

    /// All entries in a category
    pub fn entries_in_category(&self, category: &str) -> Vec<HsnEntry> {
        self.entries
            .read()
            .unwrap()
            .values()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }

    /// All exempt entries
    pub fn exempt_entries(&self) -> Vec<HsnEntry> {
        self.entries
            .read()
            .unwrap()
            .values()
            .filter(|e| e.is_exempt)
            .cloned()
            .collect()
    }

    /// Search entries by code, description, or category substring
    pub fn search(&self, term: &str) -> Vec<HsnEntry> {
        let term = term.to_lowercase();
        self.entries
            .read()
            .unwrap()
            .values()
            .filter(|e| {
                e.code.to_lowercase().contains(&term)
                    || e.description.to_lowercase().contains(&term)
                    || e.category.to_lowercase().contains(&term)
            })
            .cloned()
            .collect()
    }

    /// Summary statistics over the registry contents
    pub fn statistics(&self) -> HsnStatistics {
        let entries = self.entries.read().unwrap();
        let exempt = entries.values().filter(|e| e.is_exempt).count();

        let mut categories: HashMap<String, usize> = HashMap::new();
        for entry in entries.values() {
            *categories.entry(entry.category.clone()).or_insert(0) += 1;
        }

        HsnStatistics {
            total: entries.len(),
            exempt,
            taxable: entries.len() - exempt,
            categories,
        }
    }

    /// Number of entries in the registry
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Load entries from an external reference-data source (fetch and
    /// caching live behind the trait); returns the number imported
    pub async fn load_from(&self, source: &dyn HsnSource) -> EinvoiceResult<usize> {
        let batch = source.load_entries().await?;
        Ok(self.import_entries(batch))
    }
}

impl Default for HsnRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const MEDICAL_EXEMPTION: &str = "Medical equipment and pharmaceuticals - VAT exempt";
const FOOD_EXEMPTION: &str = "Basic food items - VAT exempt";
const INFANT_EXEMPTION: &str = "Infant and baby products - VAT exempt";
const EDUCATION_EXEMPTION: &str = "Educational materials and books - VAT exempt";

fn default_entries() -> Vec<HsnEntry> {
    vec![
        // Medical supplies
        HsnEntry::exempt("3004", "Medicaments", "MEDICAL", MEDICAL_EXEMPTION),
        HsnEntry::exempt(
            "3005",
            "Wadding, gauze, bandages",
            "MEDICAL",
            MEDICAL_EXEMPTION,
        ),
        HsnEntry::exempt(
            "3006",
            "Pharmaceutical preparations",
            "MEDICAL",
            MEDICAL_EXEMPTION,
        ),
        // Basic food items
        HsnEntry::exempt("1001", "Wheat and meslin", "FOOD_BASIC", FOOD_EXEMPTION),
        HsnEntry::exempt("1006", "Rice", "FOOD_BASIC", FOOD_EXEMPTION),
        HsnEntry::exempt("0401", "Milk and cream", "FOOD_BASIC", FOOD_EXEMPTION),
        // Infant products
        HsnEntry::exempt(
            "1901",
            "Infant food preparations",
            "INFANT",
            INFANT_EXEMPTION,
        ),
        HsnEntry::exempt(
            "3401",
            "Baby soap and cleansing preparations",
            "INFANT",
            INFANT_EXEMPTION,
        ),
        // Educational materials
        HsnEntry::exempt(
            "4901",
            "Books, brochures, leaflets",
            "EDUCATION",
            EDUCATION_EXEMPTION,
        ),
        HsnEntry::exempt("4902", "Newspapers, journals", "EDUCATION", EDUCATION_EXEMPTION),
        // Standard taxable items
        HsnEntry::taxable(
            "8471",
            "Computers and computer peripherals",
            "ELECTRONICS",
            standard_vat_rate(),
        ),
        HsnEntry::taxable(
            "8517",
            "Telephones and telecommunication equipment",
            "ELECTRONICS",
            standard_vat_rate(),
        ),
        HsnEntry::taxable(
            "8703",
            "Motor cars and vehicles",
            "AUTOMOTIVE",
            standard_vat_rate(),
        ),
        HsnEntry::taxable("9403", "Furniture", "FURNITURE", standard_vat_rate()),
        HsnEntry::taxable("6109", "T-shirts, singlets", "TEXTILES", standard_vat_rate()),
    ]
}
