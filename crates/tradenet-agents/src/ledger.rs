//! Goods ledger operations for agents.
//!
//! A ledger is an ordered list of [`Good`] entries. Entries are not merged
//! by name: every good received in trade is appended as its own
//! single-unit entry, and removal decrements the first entry of the
//! matching kind. An entry whose quantity reaches zero is removed, so a
//! well-formed ledger never holds a zero-quantity entry.
//!
//! [`GoodsLedger::coalesce`] offers an explicit, opt-in normalization that
//! merges entries of the same kind. It changes entry counts (and therefore
//! trade amounts), so it is never applied implicitly.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradenet_types::Good;

/// Errors from ledger mutation.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No entry of the requested kind is held.
    #[error("good not held: {name} at {price}")]
    GoodNotHeld {
        /// Name of the good.
        name: String,
        /// Unit price of the good.
        price: Decimal,
    },

    /// An entry with quantity zero was supplied.
    #[error("zero-quantity entry for {name}")]
    ZeroQuantity {
        /// Name of the good.
        name: String,
    },

    /// Merging entries would overflow the quantity type.
    #[error("quantity overflow while merging {name}")]
    QuantityOverflow {
        /// Name of the good.
        name: String,
    },
}

/// An agent's ordered list of owned goods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoodsLedger {
    entries: Vec<Good>,
}

impl GoodsLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a ledger from existing entries, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroQuantity`] if any entry has quantity 0.
    pub fn from_goods(goods: Vec<Good>) -> Result<Self, LedgerError> {
        if let Some(empty) = goods.iter().find(|g| g.quantity == 0) {
            return Err(LedgerError::ZeroQuantity {
                name: empty.name.clone(),
            });
        }
        Ok(Self { entries: goods })
    }

    /// Number of entries (not units). This is the "ledger size" the trade
    /// strategies and customs costs are computed from.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[Good] {
        &self.entries
    }

    /// Whether at least one entry of this kind is held.
    pub fn holds(&self, name: &str, price: Decimal) -> bool {
        self.entries.iter().any(|g| g.same_kind(name, price))
    }

    /// Append a fresh single-unit entry.
    pub fn receive(&mut self, name: impl Into<String>, price: Decimal) {
        self.entries.push(Good::unit(name, price));
    }

    /// Remove one unit from the first entry of this kind, dropping the
    /// entry if it empties.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GoodNotHeld`] if no entry matches.
    pub fn take_one(&mut self, name: &str, price: Decimal) -> Result<(), LedgerError> {
        let position = self
            .entries
            .iter()
            .position(|g| g.same_kind(name, price))
            .ok_or_else(|| LedgerError::GoodNotHeld {
                name: name.to_owned(),
                price,
            })?;

        let emptied = match self.entries.get_mut(position) {
            Some(entry) if entry.quantity > 1 => {
                entry.quantity = entry.quantity.saturating_sub(1);
                false
            }
            _ => true,
        };
        if emptied {
            self.entries.remove(position);
        }
        Ok(())
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.entries
            .iter()
            .fold(0_u64, |acc, g| acc.saturating_add(u64::from(g.quantity)))
    }

    /// Total quantity held per good name.
    pub fn summary(&self) -> BTreeMap<String, u64> {
        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for good in &self.entries {
            let total = totals.entry(good.name.clone()).or_insert(0);
            *total = total.saturating_add(u64::from(good.quantity));
        }
        totals
    }

    /// Merge entries of equal (name, price) into the first such entry.
    ///
    /// The relative order of first occurrences is kept.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::QuantityOverflow`] if a merged quantity
    /// exceeds `u32::MAX`. The ledger is left unchanged in that case.
    pub fn coalesce(&mut self) -> Result<(), LedgerError> {
        let mut merged: Vec<Good> = Vec::with_capacity(self.entries.len());
        for good in &self.entries {
            if let Some(existing) = merged
                .iter_mut()
                .find(|m| m.same_kind(&good.name, good.price))
            {
                existing.quantity = existing.quantity.checked_add(good.quantity).ok_or_else(
                    || LedgerError::QuantityOverflow {
                        name: good.name.clone(),
                    },
                )?;
            } else {
                merged.push(good.clone());
            }
        }
        self.entries = merged;
        Ok(())
    }
}
