//! Seed fixture loading.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::customers::{check_candidate, CustomerCandidate, NewCustomer};
use crate::products::{validate_product, NewProduct, ProductInput};
use crate::ConfigError;

fn default_order_count() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFile {
    pub customers: Vec<CustomerCandidate>,
    pub products: Vec<ProductInput>,
    /// Number of random orders generated on each seed run.
    #[serde(default = "default_order_count")]
    pub orders: usize,
}

impl Default for SeedFile {
    fn default() -> Self {
        Self {
            customers: vec![
                CustomerCandidate::new("Alice Johnson", "alice@example.com", Some("+1234567890")),
                CustomerCandidate::new("Bob Smith", "bob@example.com", Some("123-456-7890")),
                CustomerCandidate::new("Carol White", "carol@example.com", None),
                CustomerCandidate::new("David Brown", "david@example.com", Some("+1987654321")),
            ],
            products: vec![
                product("Laptop", 999.99, 10),
                product("Smartphone", 699.99, 15),
                product("Tablet", 399.99, 8),
                product("Monitor", 199.99, 5),
                product("Headphones", 89.99, 20),
            ],
            orders: default_order_count(),
        }
    }
}

/// A seed fixture that passed validation, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedData {
    pub customers: Vec<NewCustomer>,
    pub products: Vec<NewProduct>,
    pub orders: usize,
}

impl SeedFile {
    /// Normalize and validate every entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending entry.
    pub fn validate(&self) -> Result<SeedData, ConfigError> {
        let mut seen_emails = HashSet::new();
        let mut customers = Vec::with_capacity(self.customers.len());
        for (idx, candidate) in self.customers.iter().enumerate() {
            let customer = check_candidate(candidate)
                .map_err(|e| ConfigError::Validation(format!("customer {}: {e}", idx + 1)))?;
            if !seen_emails.insert(customer.email.clone()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate customer email: '{}'",
                    customer.email
                )));
            }
            customers.push(customer);
        }

        let mut seen_names = HashSet::new();
        let mut products = Vec::with_capacity(self.products.len());
        for (idx, input) in self.products.iter().enumerate() {
            let product = validate_product(input).map_err(|errors| {
                ConfigError::Validation(format!("product {}: {}", idx + 1, errors.join(" ")))
            })?;
            if !seen_names.insert(product.name.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate product name: '{}'",
                    product.name
                )));
            }
            products.push(product);
        }

        if self.orders > 0 && (customers.is_empty() || products.is_empty()) {
            return Err(ConfigError::Validation(
                "orders require at least one customer and one product".to_string(),
            ));
        }

        Ok(SeedData {
            customers,
            products,
            orders: self.orders,
        })
    }
}

fn product(name: &str, price: f64, stock: i32) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        price,
        stock: Some(stock),
    }
}

/// Load and validate a seed fixture from a YAML file.
///
/// A missing file is not an error: the built-in fixture is returned instead.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_seed_file(path: &Path) -> Result<SeedData, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return SeedFile::default().validate(),
        Err(e) => {
            return Err(ConfigError::SeedFileIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let seed: SeedFile = serde_yaml::from_str(&content).map_err(ConfigError::SeedFileParse)?;
    seed.validate()
}
