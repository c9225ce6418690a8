//! Funding preflight
//!
//! Before every upload attempt the account is checked against the network's
//! price for the payload. When the balance falls short, exactly the deficit
//! (plus the configured margin, zero by default) is funded and confirmed
//! before the upload goes ahead.
//!
//! Price and balance are queried fresh on every call. Without
//! [`FundingPolicy::serialize`], two concurrent uploads can both observe a
//! shortfall and both top up; the price can also rise between the query and
//! the upload and leave a just-funded account marginally short.

use moments_core::Amount;
use moments_storage::StorageNetwork;
use tokio::sync::Mutex;

use crate::error::UploadError;
use crate::types::{BalanceReport, FundingState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FundingPolicy {
    /// Added to the deficit as a percentage of the price
    pub margin_percent: u32,
    /// Hold a lock across the balance check and top-up
    pub serialize: bool,
}

/// Funding preflight for one network account
pub struct FundingPreflight {
    policy: FundingPolicy,
    lock: Option<Mutex<()>>,
}

impl FundingPreflight {
    pub fn new(policy: FundingPolicy) -> Self {
        FundingPreflight {
            policy,
            lock: policy.serialize.then(|| Mutex::new(())),
        }
    }

    /// Make sure `network` can pay for `size_bytes`, topping up if needed
    ///
    /// Returns the observed price and pre-top-up balance.
    pub async fn ensure_funded(
        &self,
        network: &dyn StorageNetwork,
        size_bytes: u64,
    ) -> Result<FundingState, UploadError> {
        let _guard = match self.lock {
            Some(ref lock) => Some(lock.lock().await),
            None => None,
        };

        let kind = network.kind();
        let price = network
            .get_price(size_bytes)
            .await
            .map_err(|source| UploadError::NetworkQuery {
                network: kind,
                source,
            })?;
        let balance = network
            .get_balance()
            .await
            .map_err(|source| UploadError::NetworkQuery {
                network: kind,
                source,
            })?;

        tracing::debug!(
            network = %kind,
            size_bytes = size_bytes,
            price = %price,
            balance = %balance,
            price_eth = %price.format_ether(),
            balance_eth = %balance.format_ether(),
            "Funding preflight"
        );

        if balance >= price {
            return Ok(FundingState {
                price,
                balance,
                top_up: None,
            });
        }

        let amount = self.top_up_amount(price, balance);

        tracing::info!(
            network = %kind,
            price = %price,
            balance = %balance,
            amount = %amount,
            amount_eth = %amount.format_ether(),
            "Balance insufficient, funding account"
        );

        let receipt = network.fund(amount).await.map_err(|source| {
            tracing::error!(error = %source, network = %kind, amount = %amount, "Funding failed");
            UploadError::FundingTransaction {
                network: kind,
                amount,
                source,
            }
        })?;

        Ok(FundingState {
            price,
            balance,
            top_up: Some(receipt),
        })
    }

    fn top_up_amount(&self, price: Amount, balance: Amount) -> Amount {
        let deficit = price.saturating_sub(balance);
        deficit.saturating_add(price.percent(self.policy.margin_percent))
    }
}

impl Default for FundingPreflight {
    fn default() -> Self {
        Self::new(FundingPolicy::default())
    }
}

/// Compare price and balance for `size_bytes` without funding anything
pub async fn check_balance(
    network: &dyn StorageNetwork,
    size_bytes: u64,
) -> Result<BalanceReport, UploadError> {
    let kind = network.kind();
    let price = network
        .get_price(size_bytes)
        .await
        .map_err(|source| UploadError::NetworkQuery {
            network: kind,
            source,
        })?;
    let balance = network
        .get_balance()
        .await
        .map_err(|source| UploadError::NetworkQuery {
            network: kind,
            source,
        })?;

    Ok(BalanceReport {
        network: kind,
        size_bytes,
        price,
        balance,
        has_sufficient_funds: balance >= price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_up_is_exact_deficit_by_default() {
        let preflight = FundingPreflight::default();
        assert_eq!(
            preflight.top_up_amount(Amount::new(1000), Amount::new(200)),
            Amount::new(800)
        );
    }

    #[test]
    fn test_top_up_adds_margin() {
        let preflight = FundingPreflight::new(FundingPolicy {
            margin_percent: 10,
            serialize: false,
        });
        assert_eq!(
            preflight.top_up_amount(Amount::new(1000), Amount::new(200)),
            Amount::new(900)
        );
    }

    #[test]
    fn test_lock_only_when_serialized() {
        assert!(FundingPreflight::default().lock.is_none());
        let serialized = FundingPreflight::new(FundingPolicy {
            margin_percent: 0,
            serialize: true,
        });
        assert!(serialized.lock.is_some());
    }
}
