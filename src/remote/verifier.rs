use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::loader::{Record, Registries, Registry};
use crate::models::{Curator, PointsMap, PointsMapping, WarningTarget};
use crate::validation::{Category, CheckOutcome};

use super::{Lookup, MarketIndex, RemoteError, RemoteMarket, RiskScorer};

/// Outbound calls go out in groups of `size`, with `pause` between groups
#[derive(Debug, Clone)]
pub struct Batching {
    pub size: usize,
    pub pause: Duration,
}

impl Default for Batching {
    fn default() -> Self {
        Self {
            size: 20,
            pause: Duration::from_millis(1000),
        }
    }
}

impl Batching {
    /// Run `task` over `items`, at most `size` at a time, keeping input order
    pub async fn run<I, T, F, Fut>(&self, items: Vec<I>, task: F) -> Vec<T>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = T>,
    {
        let total = items.len();
        let size = self.size.max(1);
        let mut results = Vec::with_capacity(total);
        let mut pending = items.into_iter().peekable();

        while pending.peek().is_some() {
            if !results.is_empty() && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            let batch: Vec<Fut> = pending.by_ref().take(size).map(&task).collect();
            debug!("Sending batch of {} ({}/{total} done)", batch.len(), results.len());
            results.extend(join_all(batch).await);
        }
        results
    }
}

/// Which check groups are skipped, and why
#[derive(Debug, Clone, Default)]
pub struct RemoteChecks {
    /// Existence of the vaults and markets custom warnings point at
    pub skip_vaults: Option<String>,
    /// Existence and listing of the markets points.json rewards
    pub skip_markets: Option<String>,
    /// Risk screening of curator addresses
    pub skip_risk: Option<String>,
}

#[derive(Debug, Clone)]
struct Target {
    chain_id: u64,
    id: String,
    location: String,
}

pub struct RemoteVerifier<'a> {
    index: &'a dyn MarketIndex,
    scorer: Option<&'a dyn RiskScorer>,
    checks: RemoteChecks,
    batching: Batching,
}

impl<'a> RemoteVerifier<'a> {
    pub fn new(
        index: &'a dyn MarketIndex,
        scorer: Option<&'a dyn RiskScorer>,
        checks: RemoteChecks,
        batching: Batching,
    ) -> Self {
        Self {
            index,
            scorer,
            checks,
            batching,
        }
    }

    pub async fn verify(&self, registries: &Registries) -> Vec<CheckOutcome> {
        let mut outcomes = Vec::new();

        let warnings = registries.records(Registry::CustomWarnings);
        match &self.checks.skip_vaults {
            Some(reason) => {
                for check in ["remote/warning-vaults", "remote/warning-markets"] {
                    outcomes.push(CheckOutcome::skipped(check, Category::Remote, reason));
                }
            }
            None => {
                outcomes.push(self.warning_vaults(warnings).await);
                outcomes.push(self.warning_markets(warnings).await);
            }
        }

        match &self.checks.skip_markets {
            Some(reason) => {
                let check = "remote/points-markets";
                outcomes.push(CheckOutcome::skipped(check, Category::Remote, reason));
            }
            None => {
                let points = registries.points().unwrap_or_default();
                outcomes.push(self.points_markets(&points).await);
            }
        }

        match (&self.checks.skip_risk, self.scorer) {
            (Some(reason), _) => outcomes.extend(risk_skipped(reason)),
            (None, None) => outcomes.extend(risk_skipped("no risk scorer configured")),
            (None, Some(scorer)) => {
                let curators = registries.typed::<Curator>(Registry::Curators);
                let (remote, risk) = self.curator_risk(scorer, &curators).await;
                outcomes.push(remote);
                outcomes.push(risk);
            }
        }

        outcomes
    }

    /// Every vault a warning points at must exist
    async fn warning_vaults(&self, warnings: &[Record]) -> CheckOutcome {
        let targets = warning_targets(warnings, |target| match target {
            WarningTarget::Vault(address) => Some(address),
            WarningTarget::Market(_) => None,
        });

        let index = self.index;
        let results = self
            .batching
            .run(targets, move |target| async move {
                let result = index.vault_by_address(&target.id, target.chain_id).await;
                (target, result)
            })
            .await;

        let mut outcome = CheckOutcome::new("remote/warning-vaults", Category::Remote);
        for (target, result) in results {
            outcome.tick();
            match result {
                Ok(Lookup::Exists(vault)) if vault.address.eq_ignore_ascii_case(&target.id) => {}
                Ok(Lookup::Exists(vault)) => outcome.push(
                    &target.location,
                    format!("API returned vault {} on chain {}", vault.address, target.chain_id),
                ),
                Ok(Lookup::NotFound) => outcome.push(
                    &target.location,
                    format!("vault does not exist on chain {}", target.chain_id),
                ),
                Err(e) => outcome.push(&target.location, format!("vault lookup failed: {e}")),
            }
        }
        outcome
    }

    /// Every market a warning points at must exist
    async fn warning_markets(&self, warnings: &[Record]) -> CheckOutcome {
        let targets = warning_targets(warnings, |target| match target {
            WarningTarget::Market(market_id) => Some(market_id),
            WarningTarget::Vault(_) => None,
        });

        let index = self.index;
        let results = self
            .batching
            .run(targets, move |target| async move {
                let result = index.market_by_unique_key(&target.id, target.chain_id).await;
                (target, result)
            })
            .await;

        let mut outcome = CheckOutcome::new("remote/warning-markets", Category::Remote);
        for (target, result) in results {
            outcome.tick();
            check_market(&mut outcome, &target, result, false);
        }
        outcome
    }

    /// Markets rewarded in points.json must exist and be whitelisted. One bulk
    /// query per chain; chains where it fails fall back to per-market lookups.
    async fn points_markets(&self, points: &PointsMapping) -> CheckOutcome {
        let by_chain = points_market_targets(points);
        let index = self.index;

        let chain_ids: Vec<u64> = by_chain.keys().copied().collect();
        let bulk = self
            .batching
            .run(chain_ids, move |chain_id| async move {
                (chain_id, index.markets(chain_id).await)
            })
            .await;

        let mut listed: HashMap<u64, HashMap<String, RemoteMarket>> = HashMap::new();
        for (chain_id, result) in bulk {
            match result {
                Ok(markets) => {
                    let markets = markets
                        .into_iter()
                        .map(|market| (market.unique_key.clone(), market))
                        .collect();
                    listed.insert(chain_id, markets);
                }
                Err(e) => warn!(
                    "Bulk markets query failed for chain {chain_id}, \
                     falling back to per-market lookups: {e}"
                ),
            }
        }

        let mut outcome = CheckOutcome::new("remote/points-markets", Category::Remote);
        let mut fallback = Vec::new();
        for (chain_id, targets) in by_chain {
            let Some(markets) = listed.get(&chain_id) else {
                fallback.extend(targets);
                continue;
            };
            for target in targets {
                outcome.tick();
                let found = markets
                    .get(&target.id)
                    .cloned()
                    .map_or(Lookup::NotFound, Lookup::Exists);
                check_market(&mut outcome, &target, Ok(found), true);
            }
        }

        let results = self
            .batching
            .run(fallback, move |target| async move {
                let result = index.market_by_unique_key(&target.id, target.chain_id).await;
                (target, result)
            })
            .await;
        for (target, result) in results {
            outcome.tick();
            check_market(&mut outcome, &target, result, true);
        }
        outcome
    }

    /// Screen every curator address. Lookup failures and incomplete
    /// screenings land in the remote outcome, risky addresses in the risk one.
    async fn curator_risk(
        &self,
        scorer: &'a dyn RiskScorer,
        curators: &[(usize, Curator)],
    ) -> (CheckOutcome, CheckOutcome) {
        let targets: Vec<(String, String)> = curators
            .iter()
            .flat_map(|(index, curator)| {
                curator.chain_addresses().map(move |(chain, address)| {
                    (
                        address.to_string(),
                        format!(
                            "{} index {index} ({}, chain {chain}, address {address})",
                            Registry::Curators,
                            curator.name
                        ),
                    )
                })
            })
            .collect();

        let results = self
            .batching
            .run(targets, move |(address, location)| async move {
                let result = scorer.risk_of(&address).await;
                (location, result)
            })
            .await;

        let mut remote = CheckOutcome::new("remote/curator-risk", Category::Remote);
        let mut risk = CheckOutcome::new("risk/curators", Category::Risk);
        for (location, result) in results {
            remote.tick();
            match result {
                Err(e) => remote.push(&location, format!("risk lookup failed: {e}")),
                Ok(score) if !score.is_complete() => remote.push(
                    &location,
                    format!("risk screening incomplete (status {})", score.status),
                ),
                Ok(score) => {
                    risk.tick();
                    if !score.is_low() {
                        let reason = score.risk_reason.as_deref().unwrap_or("no reason given");
                        risk.push(&location, format!("{} risk: {reason}", score.risk));
                    }
                }
            }
        }
        (remote, risk)
    }
}

fn risk_skipped(reason: &str) -> [CheckOutcome; 2] {
    [
        CheckOutcome::skipped("remote/curator-risk", Category::Remote, reason),
        CheckOutcome::skipped("risk/curators", Category::Risk, reason),
    ]
}

/// Warnings without a single target or a chain id are left to the schema and
/// target checks
fn warning_targets<'w>(
    warnings: &'w [Record],
    pick: impl Fn(WarningTarget<'w>) -> Option<&'w str>,
) -> Vec<Target> {
    warnings
        .iter()
        .filter_map(|record| {
            let target = WarningTarget::of_value(&record.value).ok()?;
            let chain_id = record.u64_field("chainId")?;
            let kind = target.kind();
            let id = pick(target)?;
            Some(Target {
                chain_id,
                id: id.to_string(),
                location: format!(
                    "{} index {} ({kind}: {id})",
                    Registry::CustomWarnings,
                    record.index
                ),
            })
        })
        .collect()
}

/// Market keys of `marketsWithPoints` and `vaultsWithPointsOnMarket`, grouped
/// by chain and deduplicated
fn points_market_targets(points: &PointsMapping) -> BTreeMap<u64, Vec<Target>> {
    let mut seen = BTreeSet::new();
    let mut by_chain: BTreeMap<u64, Vec<Target>> = BTreeMap::new();

    for which in [PointsMap::MarketsWithPoints, PointsMap::VaultsWithPointsOnMarket] {
        for (chain, markets) in points.map(which) {
            // Non-numeric chain keys are reported by the points key check
            let Ok(chain_id) = chain.parse::<u64>() else {
                continue;
            };
            for market_id in markets.keys() {
                if seen.insert((chain_id, market_id.as_str())) {
                    by_chain.entry(chain_id).or_default().push(Target {
                        chain_id,
                        id: market_id.clone(),
                        location: format!("{which} → chain {chain} → {market_id}"),
                    });
                }
            }
        }
    }
    by_chain
}

fn check_market(
    outcome: &mut CheckOutcome,
    target: &Target,
    result: Result<Lookup<RemoteMarket>, RemoteError>,
    require_whitelisted: bool,
) {
    match result {
        Ok(Lookup::Exists(market)) if market.unique_key != target.id => outcome.push(
            &target.location,
            format!("API returned market {} instead", market.unique_key),
        ),
        Ok(Lookup::Exists(market)) if require_whitelisted && !market.whitelisted => outcome.push(
            &target.location,
            format!("market on chain {} is not whitelisted", target.chain_id),
        ),
        Ok(Lookup::Exists(_)) => {}
        Ok(Lookup::NotFound) => outcome.push(
            &target.location,
            format!("market does not exist on chain {}", target.chain_id),
        ),
        Err(e) => outcome.push(&target.location, format!("market lookup failed: {e}")),
    }
}
