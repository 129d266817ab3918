//! Classification of events into the mutually exclusive update scenarios.

use crate::{
    config::IndexerConfig,
    events::{event_data::Transfer, Event},
};
use primitive_types::H160;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Scenario {
    /// A new token, minted to the distributor.
    Mint,
    /// The distributor sends a token to the zero address.
    DistributorBurn,
    /// Anyone else sends a token to the zero address, which is how the
    /// contract retires tokens absorbed by a merge.
    ExternalBurn,
    /// A token leaves the dead address.
    DirectBurn,
    NormalTransfer,
    Merge,
    AlphaChange,
}

impl Scenario {
    pub fn is_burn(self) -> bool {
        matches!(
            self,
            Scenario::DistributorBurn | Scenario::ExternalBurn | Scenario::DirectBurn
        )
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Debug)]
pub struct ScenarioClassifier {
    distributor: H160,
    dead_address: H160,
}

impl ScenarioClassifier {
    pub fn new(config: &IndexerConfig) -> Self {
        ScenarioClassifier {
            distributor: config.distributor,
            dead_address: config.dead_address,
        }
    }

    /// Administrative calls like `WhitelistUpdate` have no scenario.
    pub fn classify(&self, event: &Event) -> Option<Scenario> {
        match event {
            Event::Transfer(transfer) => Some(self.classify_transfer(transfer)),
            Event::AlphaMassUpdate(_) => Some(Scenario::AlphaChange),
            Event::MassUpdate(_) => Some(Scenario::Merge),
            Event::WhitelistUpdate(_) => None,
        }
    }

    /// The zero address appears on either side of mints and burns so the
    /// checks only select a single scenario when evaluated in this order.
    pub fn classify_transfer(&self, transfer: &Transfer) -> Scenario {
        let zero = H160::zero();
        if transfer.from == zero && transfer.to == self.distributor {
            Scenario::Mint
        } else if transfer.to == zero && transfer.from == self.distributor {
            Scenario::DistributorBurn
        } else if transfer.to == zero {
            Scenario::ExternalBurn
        } else if transfer.from == self.dead_address {
            Scenario::DirectBurn
        } else {
            Scenario::NormalTransfer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_data::{AlphaMassUpdate, MassUpdate, WhitelistUpdate};

    fn classifier() -> (ScenarioClassifier, IndexerConfig) {
        let config = IndexerConfig::default();
        (ScenarioClassifier::new(&config), config)
    }

    fn transfer(from: H160, to: H160) -> Transfer {
        Transfer {
            from,
            to,
            token_id: 7.into(),
        }
    }

    fn user(n: u64) -> H160 {
        H160::from_low_u64_be(n)
    }

    #[test]
    fn mint() {
        let (classifier, config) = classifier();
        assert_eq!(
            classifier.classify_transfer(&transfer(H160::zero(), config.distributor)),
            Scenario::Mint
        );
    }

    #[test]
    fn burns() {
        let (classifier, config) = classifier();
        assert_eq!(
            classifier.classify_transfer(&transfer(config.distributor, H160::zero())),
            Scenario::DistributorBurn
        );
        assert_eq!(
            classifier.classify_transfer(&transfer(user(0xabc), H160::zero())),
            Scenario::ExternalBurn
        );
        assert_eq!(
            classifier.classify_transfer(&transfer(config.dead_address, user(0xabc))),
            Scenario::DirectBurn
        );
    }

    #[test]
    fn zero_address_checks_take_precedence_over_dead_address() {
        let (classifier, config) = classifier();
        assert_eq!(
            classifier.classify_transfer(&transfer(config.dead_address, H160::zero())),
            Scenario::ExternalBurn
        );
    }

    #[test]
    fn normal_transfers() {
        let (classifier, config) = classifier();
        // First real ownership assignment out of the distributor.
        assert_eq!(
            classifier.classify_transfer(&transfer(config.distributor, user(0xabc))),
            Scenario::NormalTransfer
        );
        assert_eq!(
            classifier.classify_transfer(&transfer(user(1), user(2))),
            Scenario::NormalTransfer
        );
        // Sending to the dead address is a plain transfer, the burn is the
        // transfer out of it.
        assert_eq!(
            classifier.classify_transfer(&transfer(user(1), config.dead_address)),
            Scenario::NormalTransfer
        );
        // Only mints to the distributor are mints.
        assert_eq!(
            classifier.classify_transfer(&transfer(H160::zero(), user(1))),
            Scenario::NormalTransfer
        );
    }

    #[test]
    fn classifies_every_event_kind() {
        let (classifier, config) = classifier();
        assert_eq!(
            classifier.classify(&Event::Transfer(transfer(H160::zero(), config.distributor))),
            Some(Scenario::Mint)
        );
        assert_eq!(
            classifier.classify(&Event::AlphaMassUpdate(AlphaMassUpdate::default())),
            Some(Scenario::AlphaChange)
        );
        assert_eq!(
            classifier.classify(&Event::MassUpdate(MassUpdate::default())),
            Some(Scenario::Merge)
        );
        assert_eq!(
            classifier.classify(&Event::WhitelistUpdate(WhitelistUpdate::default())),
            None
        );
    }

    #[test]
    fn burn_scenarios() {
        let burns = [
            Scenario::DistributorBurn,
            Scenario::ExternalBurn,
            Scenario::DirectBurn,
        ];
        for scenario in &burns {
            assert!(scenario.is_burn());
        }
        for scenario in &[
            Scenario::Mint,
            Scenario::NormalTransfer,
            Scenario::Merge,
            Scenario::AlphaChange,
        ] {
            assert!(!scenario.is_burn());
        }
    }
}
