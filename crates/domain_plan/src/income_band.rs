//! Income-banded contribution tables
//!
//! Contributions are keyed by household income. Each band carries a
//! per-member premium for the main member, adult dependants and child
//! dependants. Banding is household-level: every member pays the rate of
//! the band matched by the household's income.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};

/// Household composition beyond the main member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Household {
    /// Adult dependants
    #[serde(default)]
    pub adults: u32,
    /// Child dependants
    #[serde(default)]
    pub children: u32,
}

impl Household {
    /// A main member with no dependants
    pub fn single() -> Self {
        Self::default()
    }

    pub fn new(adults: u32, children: u32) -> Self {
        Self { adults, children }
    }
}

/// Monthly premium per member type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPremium {
    pub main: Money,
    pub adult: Money,
    pub child: Money,
}

impl MemberPremium {
    /// Premium for the whole household: main + adults × adult + children × child
    pub fn for_household(&self, household: &Household) -> Money {
        self.main
            + self.adult * Decimal::from(household.adults)
            + self.child * Decimal::from(household.children)
    }
}

/// A single income band
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeBand {
    /// Inclusive lower bound
    pub min_income: Money,
    /// Exclusive upper bound; `None` for the unbounded top band
    pub max_income: Option<Money>,
    pub premium: MemberPremium,
}

impl IncomeBand {
    /// Returns true if the income falls within this band
    pub fn contains(&self, income: &Money) -> bool {
        if *income < self.min_income {
            return false;
        }
        match &self.max_income {
            Some(max) => income < max,
            None => income.currency() == self.min_income.currency(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_income.is_none()
    }
}

/// Problems found when validating a band table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandTableDefect {
    Empty,
    DoesNotStartAtZero,
    EmptyOrInvertedBand { index: usize },
    Gap { index: usize },
    Overlap { index: usize },
    UnboundedBeforeTop { index: usize },
    BoundedTop,
    NegativePremium { index: usize },
    CurrencyMismatch { index: usize },
}

impl std::fmt::Display for BandTableDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BandTableDefect::Empty => write!(f, "income band table is empty"),
            BandTableDefect::DoesNotStartAtZero => write!(f, "first income band must start at zero"),
            BandTableDefect::EmptyOrInvertedBand { index } => {
                write!(f, "income band {} has max_income not above min_income", index)
            }
            BandTableDefect::Gap { index } => {
                write!(f, "gap between income bands {} and {}", index - 1, index)
            }
            BandTableDefect::Overlap { index } => {
                write!(f, "income bands {} and {} overlap", index - 1, index)
            }
            BandTableDefect::UnboundedBeforeTop { index } => {
                write!(f, "income band {} is unbounded but is not the top band", index)
            }
            BandTableDefect::BoundedTop => write!(f, "top income band must be unbounded"),
            BandTableDefect::NegativePremium { index } => {
                write!(f, "income band {} has a negative premium", index)
            }
            BandTableDefect::CurrencyMismatch { index } => {
                write!(f, "income band {} is not in the plan currency", index)
            }
        }
    }
}

/// Ordered, contiguous income bands covering `[0, ∞)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeBandTable {
    bands: Vec<IncomeBand>,
}

impl IncomeBandTable {
    /// Wraps bands without checking them; call `defects` before use
    pub fn from_bands(bands: Vec<IncomeBand>) -> Self {
        Self { bands }
    }

    /// A single unbounded band with flat premiums
    pub fn flat(premium: MemberPremium) -> Self {
        Self {
            bands: vec![IncomeBand {
                min_income: Money::zero(premium.main.currency()),
                max_income: None,
                premium,
            }],
        }
    }

    pub fn bands(&self) -> &[IncomeBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// True when pricing varies with income
    pub fn is_income_banded(&self) -> bool {
        self.bands.len() > 1
    }

    /// Finds the band containing `income`, with its index
    pub fn find(&self, income: &Money) -> Option<(usize, &IncomeBand)> {
        self.bands
            .iter()
            .enumerate()
            .find(|(_, band)| band.contains(income))
    }

    /// Returns the band following `index`, if any
    pub fn next_after(&self, index: usize) -> Option<&IncomeBand> {
        self.bands.get(index + 1)
    }

    /// Lists every structural problem with the table
    pub fn defects(&self, currency: Currency) -> Vec<BandTableDefect> {
        let mut defects = Vec::new();

        let Some(first) = self.bands.first() else {
            defects.push(BandTableDefect::Empty);
            return defects;
        };

        if !first.min_income.is_zero() {
            defects.push(BandTableDefect::DoesNotStartAtZero);
        }

        let last_index = self.bands.len() - 1;
        for (index, band) in self.bands.iter().enumerate() {
            let amounts = [
                Some(band.min_income),
                band.max_income,
                Some(band.premium.main),
                Some(band.premium.adult),
                Some(band.premium.child),
            ];
            if amounts.iter().flatten().any(|m| m.currency() != currency) {
                defects.push(BandTableDefect::CurrencyMismatch { index });
                continue;
            }

            if band.premium.main.is_negative()
                || band.premium.adult.is_negative()
                || band.premium.child.is_negative()
            {
                defects.push(BandTableDefect::NegativePremium { index });
            }

            match &band.max_income {
                Some(max) if *max <= band.min_income => {
                    defects.push(BandTableDefect::EmptyOrInvertedBand { index });
                }
                None if index != last_index => {
                    defects.push(BandTableDefect::UnboundedBeforeTop { index });
                }
                Some(_) if index == last_index => defects.push(BandTableDefect::BoundedTop),
                _ => {}
            }

            if index > 0 {
                if let Some(previous_max) = self.bands[index - 1].max_income {
                    if previous_max.currency() == currency {
                        if band.min_income > previous_max {
                            defects.push(BandTableDefect::Gap { index });
                        } else if band.min_income < previous_max {
                            defects.push(BandTableDefect::Overlap { index });
                        }
                    }
                }
            }
        }

        defects
    }
}
