use crate::domain::StepKind;

/// One entry of the wizard's step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    /// 1-based position shown to the user.
    pub number: u32,
    pub kind: StepKind,
    pub label: &'static str,
}

/// Ordered, non-empty list of steps. Step numbers are dense and start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOrder {
    steps: Vec<StepDescriptor>,
}

const DEFAULT_STEPS: [(StepKind, &str); 6] = [
    (StepKind::DebtorInfo, "Your Information"),
    (StepKind::IncomeInfo, "Income"),
    (StepKind::ExpenseInfo, "Expenses"),
    (StepKind::Assets, "Assets"),
    (StepKind::Debts, "Amounts Owed"),
    (StepKind::Review, "Review & Results"),
];

impl Default for StepOrder {
    fn default() -> Self {
        Self::from_kinds(DEFAULT_STEPS).unwrap_or_else(|| Self { steps: Vec::new() })
    }
}

impl StepOrder {
    /// Numbers the given steps in order. `None` for an empty sequence.
    pub fn from_kinds(
        kinds: impl IntoIterator<Item = (StepKind, &'static str)>,
    ) -> Option<Self> {
        let steps: Vec<StepDescriptor> = kinds
            .into_iter()
            .zip(1u32..)
            .map(|((kind, label), number)| StepDescriptor {
                number,
                kind,
                label,
            })
            .collect();
        (!steps.is_empty()).then_some(Self { steps })
    }

    pub fn len(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, number: u32) -> Option<&StepDescriptor> {
        let index = number.checked_sub(1)? as usize;
        self.steps.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.steps.iter()
    }

    pub fn is_last(&self, number: u32) -> bool {
        number == self.len()
    }

    /// Pins a server-reported step number into `[1, len]`.
    pub fn clamp(&self, number: u32) -> u32 {
        number.clamp(1, self.len().max(1))
    }

    pub fn label_of(&self, kind: StepKind) -> &'static str {
        self.steps
            .iter()
            .find(|step| step.kind == kind)
            .map(|step| step.label)
            .unwrap_or_else(|| kind.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_has_six_numbered_steps() {
        let order = StepOrder::default();
        assert_eq!(order.len(), 6);
        let labels: Vec<_> = order.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![
                "Your Information",
                "Income",
                "Expenses",
                "Assets",
                "Amounts Owed",
                "Review & Results"
            ]
        );
        assert_eq!(order.get(2).map(|s| s.kind), Some(StepKind::IncomeInfo));
        assert!(order.get(0).is_none());
        assert!(order.get(7).is_none());
        assert!(order.is_last(6));
    }

    #[test]
    fn clamp_keeps_server_steps_in_range() {
        let order = StepOrder::default();
        assert_eq!(order.clamp(0), 1);
        assert_eq!(order.clamp(4), 4);
        assert_eq!(order.clamp(40), 6);
    }

    #[test]
    fn empty_sequences_are_rejected() {
        assert!(StepOrder::from_kinds(Vec::new()).is_none());
    }
}
