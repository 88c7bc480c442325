use crate::domain::{AssetInfo, AssetType, DebtInfo, DebtType, RecordId};

use super::rules::{non_negative, require};
use super::ValidationReport;

/// A list-valued step: the items being edited plus the ids of stored items
/// the user removed, so the next save can delete them.
#[derive(Debug, Clone, PartialEq)]
pub struct ListDraft<T> {
    items: Vec<T>,
    removed: Vec<RecordId>,
}

impl<T> Default for ListDraft<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Items that may already exist on the backend.
pub trait Persisted {
    fn record_id(&self) -> Option<RecordId>;
    fn set_record_id(&mut self, id: RecordId);
}

impl<T: Persisted> ListDraft<T> {
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            removed: Vec::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes the item at `index`, remembering its id when it was stored.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        if let Some(id) = item.record_id() {
            self.removed.push(id);
        }
        Some(item)
    }

    pub fn removed(&self) -> &[RecordId] {
        &self.removed
    }

    /// Replaces the edited items with what the backend acknowledged.
    pub fn mark_synced(&mut self, items: Vec<T>) {
        self.items = items;
        self.removed.clear();
    }

    /// Keeps what a sync stored before it failed: confirmed deletions leave
    /// the removed list and stored items take their backend id, so a retry
    /// updates them instead of creating them again.
    pub fn acknowledge(&mut self, deleted: &[RecordId], stored: &[Option<RecordId>]) {
        self.removed.retain(|id| !deleted.contains(id));
        for (item, id) in self.items.iter_mut().zip(stored) {
            if let Some(id) = id {
                item.set_record_id(*id);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetDraft {
    pub record_id: Option<RecordId>,
    pub asset_type: Option<AssetType>,
    pub description: String,
    pub current_value: f64,
    pub amount_owed: f64,
    pub account_number: String,
}

impl AssetDraft {
    /// Value minus what is still owed; negative when underwater.
    pub fn equity(&self) -> f64 {
        self.current_value - self.amount_owed
    }

    pub fn from_record(record: &AssetInfo) -> Self {
        Self {
            record_id: record.id,
            asset_type: Some(record.asset_type),
            description: record.description.clone(),
            current_value: record.current_value,
            amount_owed: record.amount_owed,
            account_number: record.account_number.clone(),
        }
    }

    /// `None` until an asset type has been chosen.
    pub fn to_record(&self) -> Option<AssetInfo> {
        Some(AssetInfo {
            id: self.record_id,
            session: None,
            asset_type: self.asset_type?,
            description: self.description.trim().to_string(),
            current_value: self.current_value,
            amount_owed: self.amount_owed,
            account_number: self.account_number.trim().to_string(),
            equity: self.equity(),
        })
    }
}

impl Persisted for AssetDraft {
    fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    fn set_record_id(&mut self, id: RecordId) {
        self.record_id = Some(id);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtDraft {
    pub record_id: Option<RecordId>,
    pub debt_type: Option<DebtType>,
    pub creditor_name: String,
    pub account_number: String,
    pub amount_owed: f64,
    pub monthly_payment: f64,
    pub is_secured: bool,
    pub collateral_description: String,
}

impl DebtDraft {
    pub fn secured(&self) -> bool {
        self.is_secured || self.debt_type == Some(DebtType::Secured)
    }

    pub fn from_record(record: &DebtInfo) -> Self {
        Self {
            record_id: record.id,
            debt_type: Some(record.debt_type),
            creditor_name: record.creditor_name.clone(),
            account_number: record.account_number.clone(),
            amount_owed: record.amount_owed,
            monthly_payment: record.monthly_payment,
            is_secured: record.is_secured,
            collateral_description: record.collateral_description.clone(),
        }
    }

    pub fn to_record(&self) -> Option<DebtInfo> {
        Some(DebtInfo {
            id: self.record_id,
            session: None,
            debt_type: self.debt_type?,
            creditor_name: self.creditor_name.trim().to_string(),
            account_number: self.account_number.trim().to_string(),
            amount_owed: self.amount_owed,
            monthly_payment: self.monthly_payment,
            is_secured: self.secured(),
            collateral_description: self.collateral_description.trim().to_string(),
        })
    }
}

impl Persisted for DebtDraft {
    fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    fn set_record_id(&mut self, id: RecordId) {
        self.record_id = Some(id);
    }
}

pub fn validate_asset(asset: &AssetDraft) -> ValidationReport {
    let mut report = ValidationReport::new();
    if asset.asset_type.is_none() {
        report.insert("asset_type", "Please choose what kind of asset this is");
    }
    require(
        &mut report,
        "description",
        &asset.description,
        "Please describe this item (for example, '2015 Honda Civic')",
    );
    non_negative(&mut report, "current_value", asset.current_value);
    non_negative(&mut report, "amount_owed", asset.amount_owed);
    report
}

pub fn validate_debt(debt: &DebtDraft) -> ValidationReport {
    let mut report = ValidationReport::new();
    require(
        &mut report,
        "creditor_name",
        &debt.creditor_name,
        "Please enter who this amount is owed to",
    );
    if debt.debt_type.is_none() {
        report.insert("debt_type", "Please choose the kind of amount owed");
    }
    non_negative(&mut report, "amount_owed", debt.amount_owed);
    non_negative(&mut report, "monthly_payment", debt.monthly_payment);
    if debt.secured() {
        require(
            &mut report,
            "collateral_description",
            &debt.collateral_description,
            "Please describe the property that secures this loan",
        );
    }
    report
}

/// Having no assets is a valid answer; each listed asset must be complete.
pub fn validate_assets(assets: &ListDraft<AssetDraft>) -> ValidationReport {
    let mut report = ValidationReport::new();
    for (index, asset) in assets.items().iter().enumerate() {
        report.absorb(&format!("assets[{index}]."), validate_asset(asset));
    }
    report
}

pub fn validate_debts(debts: &ListDraft<DebtDraft>) -> ValidationReport {
    let mut report = ValidationReport::new();
    for (index, debt) in debts.items().iter().enumerate() {
        report.absorb(&format!("debts[{index}]."), validate_debt(debt));
    }
    report
}
