//! Check / compound / withdraw orchestration across all configured wallets.
//!
//! One cycle reads a snapshot per wallet, runs the decision engines and acts
//! through the collaborator traits. Compounding failures are isolated per
//! wallet; a failed withdrawal swap aborts the rest of the batch.

use std::sync::Arc;

use alloy::primitives::U256;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::compounding::{can_compound, select_compounding_name};
use crate::constants::WEI_PER_TOKEN;
use crate::dex::Dex;
use crate::error::ExponentiatorError;
use crate::investment::Investment;
use crate::node::NodeManager;
use crate::notification_log::{NotificationLog, SystemClock};
use crate::notifier::{subjects, Notifier};
use crate::wallet::WalletAccount;
use crate::withdrawal::should_withdraw;

pub const CHECK_SUCCEEDED: &str = "Succeeded in executing check";
pub const WITHDRAW_SUCCEEDED: &str = "Succeeded in executing withdraw";

/// Default re-notification window for compounding opportunities.
pub const DEFAULT_RENOTIFY_HOURS: i64 = 3;

pub struct Exponentiator {
    node: Arc<dyn NodeManager>,
    dex: Arc<dyn Dex>,
    notifier: Arc<dyn Notifier>,
    accounts: Vec<WalletAccount>,
    notifications: NotificationLog,
    swap_amount: U256,
    service_name: String,
    rng: StdRng,
}

impl Exponentiator {
    pub fn new(
        node: Arc<dyn NodeManager>,
        dex: Arc<dyn Dex>,
        notifier: Arc<dyn Notifier>,
        accounts: Vec<WalletAccount>,
    ) -> Self {
        Self {
            node,
            dex,
            notifier,
            accounts,
            notifications: NotificationLog::new(
                chrono::Duration::hours(DEFAULT_RENOTIFY_HOURS),
                Arc::new(SystemClock),
            ),
            swap_amount: WEI_PER_TOKEN,
            service_name: "exponentiator".to_string(),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_notification_log(mut self, log: NotificationLog) -> Self {
        self.notifications = log;
        self
    }

    /// Amount (wei) swapped per eligible withdrawal.
    pub fn with_swap_amount(mut self, amount: U256) -> Self {
        self.swap_amount = amount;
        self
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Deterministic name selection for tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Compound every wallet whose rewards cross the threshold.
    ///
    /// Only a [`ExponentiatorError::Connection`] escapes; every other failure
    /// becomes a notification and the next wallet is processed.
    pub async fn execute_check(&mut self, compound_pct: u32) -> Result<String, ExponentiatorError> {
        tracing::debug!(compound_pct, wallets = self.accounts.len(), "execute_check starting");
        let investments = self.read_investments().await?;
        let costs = self.node.cost_table();

        for (index, investment) in &investments {
            if !can_compound(investment, costs, compound_pct) {
                tracing::info!(
                    wallet = %investment.name,
                    balance = %alloy::primitives::utils::format_ether(investment.balance),
                    rewards = %alloy::primitives::utils::format_ether(investment.rewards),
                    "Can not yet compound"
                );
                continue;
            }

            tracing::info!(
                wallet = %investment.name,
                balance = %alloy::primitives::utils::format_ether(investment.balance),
                rewards = %alloy::primitives::utils::format_ether(investment.rewards),
                "Sufficient rewards to compound"
            );

            let names = match self.node.node_names(investment.address).await {
                Ok(names) => names,
                Err(e) if e.is_connection() => return Err(e),
                Err(e) => {
                    self.notify_compounding_error(investment, &e).await;
                    continue;
                }
            };
            let name = select_compounding_name(&names, &mut self.rng);
            let account = &self.accounts[*index];

            let outcome = match self.node.compound(account, &name).await {
                Ok(true) => self
                    .node
                    .claim_rewards(account, compound_pct)
                    .await
                    .map(|()| true),
                other => other,
            };

            match outcome {
                Ok(true) => tracing::info!(wallet = %investment.name, node = %name, "Compounding complete"),
                Ok(false) => self.notify_compounding_opportunity(investment).await,
                Err(e) => self.notify_compounding_error(investment, &e).await,
            }
        }

        Ok(CHECK_SUCCEEDED.to_string())
    }

    /// Swap a fixed amount to native for every wallet whose idle balance
    /// exceeds what `interval_hours` of uncompounded rewards would produce.
    ///
    /// The first failed swap is reported and ends the batch.
    pub async fn execute_withdraw(
        &mut self,
        compound_pct: u32,
        interval_hours: u64,
    ) -> Result<String, ExponentiatorError> {
        tracing::debug!(compound_pct, interval_hours, "execute_withdraw starting");
        let investments = self.read_investments().await?;
        let costs = self.node.cost_table();

        for (index, investment) in &investments {
            let decision = should_withdraw(investment, costs, compound_pct, interval_hours);
            if !decision.eligible {
                tracing::info!(
                    wallet = %investment.name,
                    threshold = %alloy::primitives::utils::format_ether(decision.threshold),
                    "Balance below withdrawal threshold"
                );
                continue;
            }

            let account = &self.accounts[*index];
            match self.dex.swap_to_native(account, self.swap_amount).await {
                Ok(tx_hash) => {
                    tracing::info!(wallet = %investment.name, %tx_hash, "Withdrawal swap complete")
                }
                Err(e) => {
                    self.notify_withdrawal_error(investment, &e).await;
                    return Ok(format!("Withdrawal aborted at [{}]", investment.name));
                }
            }
        }

        Ok(WITHDRAW_SUCCEEDED.to_string())
    }

    /// Reconnect, then snapshot every wallet in configuration order, paired
    /// with its index into `accounts`.
    async fn read_investments(&self) -> Result<Vec<(usize, Investment)>, ExponentiatorError> {
        self.node.ensure_connected().await?;

        let power_price = match self.node.reward_price_usd().await {
            Ok(price) => Some(price),
            Err(e) => {
                tracing::warn!(error = %e, "POWER price unavailable");
                None
            }
        };

        let mut investments = Vec::with_capacity(self.accounts.len());
        for (index, account) in self.accounts.iter().enumerate() {
            match self.read_investment(account, power_price).await {
                Ok(investment) => {
                    tracing::info!(
                        wallet = %investment.name,
                        nodes = investment.node_count,
                        rewards = %alloy::primitives::utils::format_ether(investment.rewards),
                        rewards_usd = ?investment.rewards_in_usd(),
                        "Read investment"
                    );
                    investments.push((index, investment));
                }
                Err(ExponentiatorError::NoNodeOwner(_)) => {
                    tracing::info!(wallet = account.name(), "Account had no nodes attached");
                }
                Err(e) if e.is_connection() => return Err(e),
                Err(e) => {
                    tracing::warn!(wallet = account.name(), error = %e, "Account experienced a contract error");
                }
            }
        }
        Ok(investments)
    }

    async fn read_investment(
        &self,
        account: &WalletAccount,
        power_price: Option<f64>,
    ) -> Result<Investment, ExponentiatorError> {
        let address = account.address();
        Ok(Investment {
            name: account.name().to_string(),
            address,
            balance: self.node.wallet_balance(address).await?,
            node_count: self.node.node_count(address).await?,
            rewards: self.node.rewards_balance(address).await?,
            tier: self.node.primary_tier(),
            power_price,
        })
    }

    async fn notify_compounding_opportunity(&self, investment: &Investment) {
        if self.notifications.recently_notified(&investment.name) {
            tracing::debug!(wallet = %investment.name, "opportunity already notified within window");
            return;
        }

        let content = format!(
            "You currently have enough rewards to create a new node\n\n{}\n",
            investment.summary()
        );
        match self
            .notifier
            .send(subjects::COMPOUNDING_OPPORTUNITY, &content)
            .await
        {
            Ok(()) => self.notifications.record(&investment.name),
            Err(e) => tracing::warn!(wallet = %investment.name, error = %e, "failed to send opportunity notification"),
        }
    }

    async fn notify_compounding_error(&self, investment: &Investment, error: &ExponentiatorError) {
        tracing::warn!(wallet = %investment.name, error = %error, "Compounding failed");
        let content = format!(
            "{} experienced an error attempting to auto compound your nodes\n\n{}\n\nError\n\n    {error}\n",
            self.service_name,
            investment.summary()
        );
        self.send_quietly(subjects::COMPOUNDING_ERROR, &content).await;
    }

    async fn notify_withdrawal_error(&self, investment: &Investment, error: &ExponentiatorError) {
        tracing::warn!(wallet = %investment.name, error = %error, "Withdrawal swap failed");
        let content = format!(
            "{} experienced an error attempting to withdraw from [{}]\n\n{}\n\nError\n\n    {error}\n",
            self.service_name,
            investment.name,
            investment.summary()
        );
        self.send_quietly(subjects::WITHDRAWAL_ERROR, &content).await;
    }

    async fn send_quietly(&self, subject: &str, content: &str) {
        if let Err(e) = self.notifier.send(subject, content).await {
            tracing::warn!(subject, error = %e, "failed to send notification");
        }
    }
}
