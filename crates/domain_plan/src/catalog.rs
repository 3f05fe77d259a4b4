//! In-memory plan catalog
//!
//! The catalog is the data-loader boundary: it parses plan product records
//! from JSON, resolves each into a validated `PlanBenefitModel`, and serves
//! them by code. Simulations never look plans up themselves.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use core_kernel::{Money, PlanCode};

use crate::benefit_model::PlanBenefitModel;
use crate::error::PlanError;
use crate::module::PlanProduct;

/// A plan file holds either one product or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum PlanDocument {
    Many(Vec<PlanProduct>),
    One(Box<PlanProduct>),
}

/// Resolved plans keyed by code
#[derive(Debug, Clone, Default)]
pub struct PlanCatalog {
    plans: BTreeMap<PlanCode, Arc<PlanBenefitModel>>,
}

impl PlanCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves and registers every product
    ///
    /// # Errors
    ///
    /// Fails on the first product that does not resolve, or on a duplicate code.
    pub fn from_products<I>(products: I) -> Result<Self, PlanError>
    where
        I: IntoIterator<Item = PlanProduct>,
    {
        let mut catalog = Self::new();
        for product in products {
            catalog.insert(PlanBenefitModel::resolve(&product)?)?;
        }
        Ok(catalog)
    }

    /// Parses a JSON document and registers its products
    pub fn load_from_str(&mut self, json: &str) -> Result<usize, PlanError> {
        let products = match serde_json::from_str::<PlanDocument>(json)
            .map_err(|e| PlanError::Parse(e.to_string()))?
        {
            PlanDocument::Many(products) => products,
            PlanDocument::One(product) => vec![*product],
        };

        let count = products.len();
        for product in products {
            self.insert(PlanBenefitModel::resolve(&product)?)?;
        }
        Ok(count)
    }

    /// Loads products from a JSON file
    pub fn load_from_file(&mut self, path: &Path) -> Result<usize, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|e| PlanError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let count = self.load_from_str(&content)?;
        debug!(path = %path.display(), plans = count, "Loaded plan file");
        Ok(count)
    }

    /// Loads every `*.json` file in a directory, in file-name order
    pub fn load_from_dir(&mut self, dir: &Path) -> Result<usize, PlanError> {
        let io_error = |e: std::io::Error| PlanError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();

        let mut total = 0;
        for file in &files {
            total += self.load_from_file(file)?;
        }

        info!(dir = %dir.display(), files = files.len(), plans = total, "Loaded plan catalog");
        Ok(total)
    }

    /// Registers a resolved plan
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Configuration` if the code is already registered.
    pub fn insert(&mut self, model: PlanBenefitModel) -> Result<(), PlanError> {
        let code = model.code().clone();
        if self.plans.contains_key(&code) {
            return Err(PlanError::configuration(&code, "plan code registered twice"));
        }
        self.plans.insert(code, Arc::new(model));
        Ok(())
    }

    /// Looks a plan up by code
    pub fn get(&self, code: &PlanCode) -> Result<Arc<PlanBenefitModel>, PlanError> {
        self.plans
            .get(code)
            .cloned()
            .ok_or_else(|| PlanError::not_found(code))
    }

    /// All plans, ordered by code
    pub fn plans(&self) -> impl Iterator<Item = &Arc<PlanBenefitModel>> {
        self.plans.values()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Other options of the same scheme and benefit year
    ///
    /// Ordered by headline co-payment ascending, plans without one last,
    /// then by code.
    pub fn related_plans(&self, code: &PlanCode) -> Result<Vec<Arc<PlanBenefitModel>>, PlanError> {
        let anchor = self.get(code)?;

        let mut related: Vec<Arc<PlanBenefitModel>> = self
            .plans
            .values()
            .filter(|plan| {
                plan.identity.code != anchor.identity.code
                    && plan.identity.scheme == anchor.identity.scheme
                    && plan.identity.benefit_year == anchor.identity.benefit_year
            })
            .cloned()
            .collect();

        related.sort_by(|a, b| {
            copayment_key(&a.identity.headline_copayment)
                .cmp(&copayment_key(&b.identity.headline_copayment))
                .then_with(|| a.identity.code.cmp(&b.identity.code))
        });

        Ok(related)
    }
}

/// Sort key placing missing co-payments after every present one
fn copayment_key(copayment: &Option<Money>) -> (bool, rust_decimal::Decimal) {
    match copayment {
        Some(amount) => (false, amount.amount()),
        None => (true, rust_decimal::Decimal::ZERO),
    }
}
