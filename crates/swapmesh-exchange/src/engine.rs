//! The settlement engine: atomic batch matching of signed order pairs.
//!
//! Every `match_orders` call runs a strict plan → commit → execute
//! pipeline:
//!
//! 1. **Plan** — validate, match and price every pair without mutating
//!    anything. Later pairs observe earlier pairs' pending fills through
//!    an overlay, so a batch cannot double-spend one order's remainder.
//! 2. **Commit** — apply all fill deltas to the ledger. This is the only
//!    internal state mutation and happens strictly before any external
//!    call, so a re-entrant transfer callee can never observe a stale
//!    remaining amount.
//! 3. **Execute** — hand the complete ordered leg list to the asset
//!    bridge in one all-or-none call. On failure the fill deltas are
//!    restored from the snapshot taken at commit time and the whole call
//!    reverts: no partial settlement of any pair survives.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use swapmesh_matchcore::{
    AssetMatcher, FeeSide, SubAsset, distributed_total, expand_bundle, fee_side, fill_order,
};
use swapmesh_types::{
    Address, AssetClass, AssetType, ExchangeConfig, ExchangeError, FillPair, MatchId, MatchRecord,
    Order, OrderKey, OrderPair, RegistryId, Result, constants,
};
use swapmesh_validator::{OrderValidator, Role, RoleService};

use crate::bridge::{AssetBridge, LegKind, RoyaltySource, TransferLeg};
use crate::fees::{LinePricing, split_payment};
use crate::fill_ledger::FillLedger;

/// Everything computed for one pair during the plan phase.
struct PairPlan {
    left_key: OrderKey,
    right_key: OrderKey,
    left_delta: u128,
    right_delta: u128,
    legs: Vec<TransferLeg>,
    record: MatchRecord,
}

/// The SwapMesh settlement engine.
///
/// Owns the fill ledger, the admin configuration, the role service and the
/// validator; consumes the royalty schedule and the transfer capability
/// through their traits.
pub struct Exchange<B: AssetBridge> {
    config: ExchangeConfig,
    roles: RoleService,
    validator: OrderValidator,
    matcher: AssetMatcher,
    ledger: FillLedger,
    royalties: Box<dyn RoyaltySource>,
    bridge: B,
    match_seq: u64,
}

impl<B: AssetBridge> Exchange<B> {
    /// Create an engine. `admin` receives the `Admin` and `Pauser` roles;
    /// `fee_receiver` must be non-zero.
    pub fn new(
        admin: Address,
        fee_receiver: Address,
        bridge: B,
        royalties: Box<dyn RoyaltySource>,
    ) -> Result<Self> {
        if fee_receiver.is_zero() {
            return Err(ExchangeError::ZeroAddress {
                field: "fee receiver",
            });
        }
        let mut roles = RoleService::new();
        roles.grant(admin, Role::Admin);
        roles.grant(admin, Role::Pauser);
        let mut config = ExchangeConfig::default();
        config.fees.receiver = fee_receiver;
        Ok(Self {
            config,
            roles,
            validator: OrderValidator::new(),
            matcher: AssetMatcher::new(),
            ledger: FillLedger::new(),
            royalties,
            bridge,
            match_seq: 0,
        })
    }

    // ════════════════════════════════════════════════════════════════
    // Matching
    // ════════════════════════════════════════════════════════════════

    /// Match and settle a batch of order pairs atomically.
    ///
    /// Records are returned in caller order, one per pair.
    pub fn match_orders(
        &mut self,
        caller: Address,
        pairs: &[OrderPair],
        now: DateTime<Utc>,
    ) -> Result<Vec<MatchRecord>> {
        self.check_batch_guards(pairs)?;
        self.run_batch(caller, pairs, now)
    }

    /// Match a batch on behalf of another sender. Restricted to accounts
    /// holding the `Relayer` role.
    pub fn match_orders_from(
        &mut self,
        relayer: Address,
        on_behalf_of: Address,
        pairs: &[OrderPair],
        now: DateTime<Utc>,
    ) -> Result<Vec<MatchRecord>> {
        self.roles.require(relayer, Role::Relayer)?;
        if on_behalf_of.is_zero() {
            return Err(ExchangeError::ZeroAddress {
                field: "on_behalf_of",
            });
        }
        self.check_batch_guards(pairs)?;
        self.run_batch(on_behalf_of, pairs, now)
    }

    fn check_batch_guards(&self, pairs: &[OrderPair]) -> Result<()> {
        if self.config.paused {
            return Err(ExchangeError::Paused);
        }
        if pairs.is_empty() {
            return Err(ExchangeError::EmptyBatch);
        }
        if pairs.len() > self.config.match_orders_limit {
            return Err(ExchangeError::TooManyMatches {
                submitted: pairs.len(),
                limit: self.config.match_orders_limit,
            });
        }
        Ok(())
    }

    fn run_batch(
        &mut self,
        effective_sender: Address,
        pairs: &[OrderPair],
        now: DateTime<Utc>,
    ) -> Result<Vec<MatchRecord>> {
        // Plan: no mutation happens before every pair has been validated,
        // matched and priced.
        let mut pending: HashMap<OrderKey, u128> = HashMap::new();
        let mut plans = Vec::with_capacity(pairs.len());
        for (index, pair) in pairs.iter().enumerate() {
            let sequence = self.match_seq + index as u64;
            plans.push(self.plan_pair(effective_sender, pair, now, &mut pending, sequence)?);
        }

        // Commit: fill-ledger bookkeeping, strictly before any external
        // call. Prior values are snapshotted for the rollback path.
        let mut snapshot: Vec<(OrderKey, u128)> = Vec::with_capacity(plans.len() * 2);
        for plan in &plans {
            for (key, delta) in [
                (plan.left_key, plan.left_delta),
                (plan.right_key, plan.right_delta),
            ] {
                snapshot.push((key, self.ledger.fills(&key)));
                if let Err(err) = self.ledger.commit(key, delta) {
                    self.rollback(&snapshot);
                    return Err(err);
                }
            }
        }

        // Execute: one all-or-none bridge call for the whole batch.
        let legs: Vec<TransferLeg> = plans
            .iter()
            .flat_map(|plan| plan.legs.iter().cloned())
            .collect();
        if let Err(err) = self.bridge.execute(&legs) {
            self.rollback(&snapshot);
            tracing::warn!(target: "swapmesh::engine", "batch reverted: {err}");
            return Err(err);
        }

        self.match_seq += plans.len() as u64;
        let records: Vec<MatchRecord> = plans.into_iter().map(|plan| plan.record).collect();
        for record in &records {
            tracing::info!(target: "swapmesh::engine", "{record}");
        }
        Ok(records)
    }

    fn rollback(&mut self, snapshot: &[(OrderKey, u128)]) {
        for (key, value) in snapshot.iter().rev() {
            self.ledger.restore(*key, *value);
        }
    }

    fn plan_pair(
        &self,
        effective_sender: Address,
        pair: &OrderPair,
        now: DateTime<Utc>,
        pending: &mut HashMap<OrderKey, u128>,
        sequence: u64,
    ) -> Result<PairPlan> {
        let left = &pair.left;
        let right = &pair.right;

        self.validator
            .validate(left, &pair.left_signature, effective_sender, now)?;
        self.validator
            .validate(right, &pair.right_signature, effective_sender, now)?;
        let whitelist = self.config.whitelist_enabled;
        self.validator.check_allow_list(left, &self.roles, whitelist)?;
        self.validator
            .check_allow_list(right, &self.roles, whitelist)?;

        if !left.taker.is_zero() && left.taker != right.maker {
            return Err(ExchangeError::TakerMismatch);
        }
        if !right.taker.is_zero() && right.taker != left.maker {
            return Err(ExchangeError::TakerMismatch);
        }

        let make_match = self
            .matcher
            .match_types(&left.make_asset.asset_type, &right.take_asset.asset_type)?;
        let take_match = self
            .matcher
            .match_types(&left.take_asset.asset_type, &right.make_asset.asset_type)?;

        for asset in [
            &left.make_asset,
            &left.take_asset,
            &right.make_asset,
            &right.take_asset,
        ] {
            if asset.asset_type.class().is_unit_valued() && asset.value != 1 {
                return Err(ExchangeError::UnitValueRequired(asset.value));
            }
        }

        let left_key = left.key();
        let right_key = right.key();
        let left_fill = self.effective_fill(&left_key, pending)?;
        let right_fill = self.effective_fill(&right_key, pending)?;
        if left_fill >= left.take_asset.value {
            return Err(ExchangeError::NothingToFill(left_key));
        }
        if right_fill >= right.take_asset.value {
            return Err(ExchangeError::NothingToFill(right_key));
        }

        let fill = fill_order(left, right, left_fill, right_fill)?;
        let left_delta = fill.right_value;
        let right_delta = fill.left_value;
        bump_pending(pending, left_key, left_delta)?;
        bump_pending(pending, right_key, right_delta)?;

        let (legs, total_paid, total_received) =
            self.plan_transfers(left, right, &make_match, &take_match, fill)?;

        let record = MatchRecord {
            id: MatchId::deterministic(&left_key, &right_key, sequence),
            caller: effective_sender,
            left_key,
            right_key,
            left_order: left.clone(),
            right_order: right.clone(),
            fill,
            total_paid,
            total_received,
            executed_at: now,
        };
        Ok(PairPlan {
            left_key,
            right_key,
            left_delta,
            right_delta,
            legs,
            record,
        })
    }

    fn effective_fill(&self, key: &OrderKey, pending: &HashMap<OrderKey, u128>) -> Result<u128> {
        if self.ledger.is_cancelled(key) {
            return Err(ExchangeError::NothingToFill(*key));
        }
        self.ledger
            .fills(key)
            .checked_add(pending.get(key).copied().unwrap_or(0))
            .ok_or(ExchangeError::ArithmeticOverflow)
    }

    /// Build the transfer legs for one matched pair and return them with
    /// the payment face amount and the net delivered.
    fn plan_transfers(
        &self,
        left: &Order,
        right: &Order,
        make_match: &AssetType,
        take_match: &AssetType,
        fill: FillPair,
    ) -> Result<(Vec<TransferLeg>, u128, u128)> {
        match fee_side(make_match.class(), take_match.class()) {
            FeeSide::Left => self.plan_payment_side(
                make_match,
                fill.left_value,
                left.maker,
                right.proceeds_to(),
                take_match,
                fill.right_value,
                right.maker,
                left.proceeds_to(),
            ),
            FeeSide::Right => self.plan_payment_side(
                take_match,
                fill.right_value,
                right.maker,
                left.proceeds_to(),
                make_match,
                fill.left_value,
                left.maker,
                right.proceeds_to(),
            ),
            FeeSide::None => {
                let mut legs =
                    self.plain_legs(make_match, fill.left_value, left.maker, right.proceeds_to())?;
                legs.extend(self.plain_legs(
                    take_match,
                    fill.right_value,
                    right.maker,
                    left.proceeds_to(),
                )?);
                Ok((legs, 0, 0))
            }
        }
    }

    /// One side pays, the other delivers the sold asset. Royalties and the
    /// protocol fee come out of the payment; the sold side moves whole.
    #[allow(clippy::too_many_arguments)]
    fn plan_payment_side(
        &self,
        payment_type: &AssetType,
        payment_amount: u128,
        payer: Address,
        payee: Address,
        sold_type: &AssetType,
        sold_amount: u128,
        seller: Address,
        buyer: Address,
    ) -> Result<(Vec<TransferLeg>, u128, u128)> {
        let (pricing, sold_legs) =
            self.sold_lines(sold_type, sold_amount, payment_amount, seller, buyer)?;

        let split = split_payment(
            &self.roles,
            &self.config.fees,
            self.royalties.as_ref(),
            seller,
            &pricing,
            payment_amount,
        )?;

        let mut legs = Vec::with_capacity(sold_legs.len() + split.royalties.len() + 2);
        for (receiver, amount) in &split.royalties {
            legs.push(TransferLeg {
                from: payer,
                to: *receiver,
                kind: payment_leg_kind(payment_type, *amount)?,
            });
        }
        if split.fee > 0 {
            legs.push(TransferLeg {
                from: payer,
                to: self.config.fees.receiver,
                kind: payment_leg_kind(payment_type, split.fee)?,
            });
        }
        if split.net > 0 {
            legs.push(TransferLeg {
                from: payer,
                to: payee,
                kind: payment_leg_kind(payment_type, split.net)?,
            });
        }
        legs.extend(sold_legs);
        Ok((legs, payment_amount, split.net))
    }

    /// Pricing lines and transfer legs for the sold side of a match.
    fn sold_lines(
        &self,
        sold: &AssetType,
        amount: u128,
        payment: u128,
        from: Address,
        to: Address,
    ) -> Result<(Vec<LinePricing>, Vec<TransferLeg>)> {
        if let AssetType::Bundle(spec) = sold {
            let lines = expand_bundle(spec, amount, payment)?;
            let mut pricing = Vec::with_capacity(lines.len());
            let mut legs = Vec::with_capacity(lines.len());
            for line in lines {
                pricing.push(LinePricing {
                    registry: line.sub_asset.registry(),
                    token: line.sub_asset.token(),
                    price: line.unit_price,
                });
                legs.push(TransferLeg {
                    from,
                    to,
                    kind: self.sub_asset_leg_kind(line.sub_asset),
                });
            }
            return Ok((pricing, legs));
        }

        let pricing = vec![LinePricing {
            registry: sold.registry(),
            token: sold.token(),
            price: payment,
        }];
        let legs = self.plain_legs(sold, amount, from, to)?;
        Ok((pricing, legs))
    }

    /// Transfer legs for an asset moving whole, outside any fee phase.
    fn plain_legs(
        &self,
        asset: &AssetType,
        amount: u128,
        from: Address,
        to: Address,
    ) -> Result<Vec<TransferLeg>> {
        let kinds = match asset {
            AssetType::Native => vec![LegKind::Native { value: amount }],
            AssetType::Fungible { registry } => vec![LegKind::Fungible {
                registry: *registry,
                value: amount,
            }],
            AssetType::Unique { registry, token } => vec![LegKind::Unique {
                registry: *registry,
                token: *token,
            }],
            AssetType::Stack { registry, token } => vec![LegKind::Stack {
                registry: *registry,
                token: *token,
                supply: amount,
            }],
            AssetType::Bundle(spec) => {
                let total = distributed_total(spec, amount)?;
                return Ok(expand_bundle(spec, amount, total)?
                    .into_iter()
                    .map(|line| TransferLeg {
                        from,
                        to,
                        kind: self.sub_asset_leg_kind(line.sub_asset),
                    })
                    .collect());
            }
        };
        Ok(kinds
            .into_iter()
            .map(|kind| TransferLeg { from, to, kind })
            .collect())
    }

    fn sub_asset_leg_kind(&self, sub_asset: SubAsset) -> LegKind {
        match sub_asset {
            SubAsset::Fungible { registry, value } => LegKind::Fungible { registry, value },
            SubAsset::Unique { registry, token } => LegKind::Unique { registry, token },
            SubAsset::Stack {
                registry,
                token,
                supply,
            } => LegKind::Stack {
                registry,
                token,
                supply,
            },
            SubAsset::ParcelBatch { parcels } => LegKind::ParcelBatch {
                registry: self.config.parcel_registry,
                parcels,
            },
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Cancellation and reads
    // ════════════════════════════════════════════════════════════════

    /// Cancel an order by driving its fill to the sentinel. Only the maker
    /// may cancel, and only non-zero-salt orders can be.
    pub fn cancel(&mut self, caller: Address, order: &Order, key: OrderKey) -> Result<()> {
        if caller != order.maker {
            return Err(ExchangeError::NotMaker);
        }
        if order.salt == 0 {
            return Err(ExchangeError::ZeroSalt);
        }
        if key != order.key() {
            return Err(ExchangeError::InvalidOrderHash);
        }
        self.ledger.cancel(key);
        tracing::info!(target: "swapmesh::engine", "order cancelled: {key}");
        Ok(())
    }

    /// Read-only fill-ledger lookup.
    #[must_use]
    pub fn fills(&self, key: &OrderKey) -> u128 {
        self.ledger.fills(key)
    }

    /// Whether a key carries the cancellation sentinel.
    #[must_use]
    pub fn is_cancelled(&self, key: &OrderKey) -> bool {
        self.ledger.is_cancelled(key)
    }

    #[must_use]
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    #[must_use]
    pub fn roles(&self) -> &RoleService {
        &self.roles
    }

    #[must_use]
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Mutable access to the external registries, for seeding balances.
    /// Registry state is not engine-gated — it belongs to the registries.
    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    // ════════════════════════════════════════════════════════════════
    // Admin surface (role-gated)
    // ════════════════════════════════════════════════════════════════

    /// Set protocol fee rates. Each must stay below 5000 bps.
    pub fn set_protocol_fees(
        &mut self,
        caller: Address,
        primary_bps: u16,
        secondary_bps: u16,
    ) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        for bps in [primary_bps, secondary_bps] {
            if bps >= constants::MAX_FEE_BPS {
                return Err(ExchangeError::FeeTooHigh(bps));
            }
        }
        self.config.fees.primary_bps = primary_bps;
        self.config.fees.secondary_bps = secondary_bps;
        self.config.bump();
        tracing::info!(
            target: "swapmesh::admin",
            "protocol fees set: primary={primary_bps}bps secondary={secondary_bps}bps"
        );
        Ok(())
    }

    /// Set the protocol fee receiver. Must be non-zero.
    pub fn set_fee_receiver(&mut self, caller: Address, receiver: Address) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        if receiver.is_zero() {
            return Err(ExchangeError::ZeroAddress {
                field: "fee receiver",
            });
        }
        self.config.fees.receiver = receiver;
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "fee receiver set: {receiver}");
        Ok(())
    }

    /// Set the maximum order pairs per batch. Must be positive.
    pub fn set_match_orders_limit(&mut self, caller: Address, limit: usize) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        if limit == 0 {
            return Err(ExchangeError::InvalidLimit(limit));
        }
        self.config.match_orders_limit = limit;
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "match orders limit set: {limit}");
        Ok(())
    }

    /// Swap the royalty-schedule source.
    pub fn set_royalty_source(
        &mut self,
        caller: Address,
        royalties: Box<dyn RoyaltySource>,
    ) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.royalties = royalties;
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "royalty source replaced");
        Ok(())
    }

    /// Swap the order validator (and its signer registry).
    pub fn set_validator(&mut self, caller: Address, validator: OrderValidator) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.validator = validator;
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "order validator replaced");
        Ok(())
    }

    /// Set the registry resolving grid-addressed parcel transfers.
    pub fn set_parcel_registry(
        &mut self,
        caller: Address,
        registry: RegistryId,
    ) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.config.parcel_registry = registry;
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "parcel registry set: {registry}");
        Ok(())
    }

    /// Toggle the fungible allow-list.
    pub fn set_whitelist_enabled(&mut self, caller: Address, enabled: bool) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.config.whitelist_enabled = enabled;
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "whitelist enabled: {enabled}");
        Ok(())
    }

    /// Register or unregister an asset class with the matcher.
    pub fn set_asset_class_registered(
        &mut self,
        caller: Address,
        class: AssetClass,
        registered: bool,
    ) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        if registered {
            self.matcher.register_class(class);
        } else {
            self.matcher.unregister_class(class);
        }
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "asset class {class} registered: {registered}");
        Ok(())
    }

    /// Halt all matching.
    pub fn pause(&mut self, caller: Address) -> Result<()> {
        self.roles.require(caller, Role::Pauser)?;
        self.config.paused = true;
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "exchange paused");
        Ok(())
    }

    /// Resume matching.
    pub fn unpause(&mut self, caller: Address) -> Result<()> {
        self.roles.require(caller, Role::Pauser)?;
        self.config.paused = false;
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "exchange unpaused");
        Ok(())
    }

    /// Grant an account role.
    pub fn grant_role(&mut self, caller: Address, subject: Address, role: Role) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.roles.grant(subject, role);
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "role {role} granted to {subject}");
        Ok(())
    }

    /// Revoke an account role.
    pub fn revoke_role(&mut self, caller: Address, subject: Address, role: Role) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.roles.revoke(subject, role);
        self.config.bump();
        tracing::info!(target: "swapmesh::admin", "role {role} revoked from {subject}");
        Ok(())
    }

    /// Put a fungible registry on the allow-list.
    pub fn approve_fungible(
        &mut self,
        caller: Address,
        registry: RegistryId,
    ) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.roles.approve_fungible(registry);
        self.config.bump();
        Ok(())
    }

    /// Remove a fungible registry from the allow-list.
    pub fn revoke_fungible(
        &mut self,
        caller: Address,
        registry: RegistryId,
    ) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.roles.revoke_fungible(registry);
        self.config.bump();
        Ok(())
    }

    /// Register a primary-market seller for a registry.
    pub fn grant_primary_seller(
        &mut self,
        caller: Address,
        seller: Address,
        registry: RegistryId,
    ) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.roles.grant_primary_seller(seller, registry);
        self.config.bump();
        Ok(())
    }

    /// Deregister a primary-market seller.
    pub fn revoke_primary_seller(
        &mut self,
        caller: Address,
        seller: Address,
        registry: RegistryId,
    ) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.roles.revoke_primary_seller(seller, registry);
        self.config.bump();
        Ok(())
    }
}

fn bump_pending(
    pending: &mut HashMap<OrderKey, u128>,
    key: OrderKey,
    delta: u128,
) -> Result<()> {
    let entry = pending.entry(key).or_insert(0);
    *entry = entry
        .checked_add(delta)
        .ok_or(ExchangeError::ArithmeticOverflow)?;
    Ok(())
}

/// The transfer-leg kind for an amount of the payment-side asset.
fn payment_leg_kind(asset: &AssetType, value: u128) -> Result<LegKind> {
    match asset {
        AssetType::Native => Ok(LegKind::Native { value }),
        AssetType::Fungible { registry } => Ok(LegKind::Fungible {
            registry: *registry,
            value,
        }),
        AssetType::Stack { registry, token } => Ok(LegKind::Stack {
            registry: *registry,
            token: *token,
            supply: value,
        }),
        AssetType::Unique { .. } | AssetType::Bundle(_) => Err(ExchangeError::Internal(
            "non-payment asset on the fee side".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{InMemoryBridge, MapRoyaltySource};
    use swapmesh_types::{Asset, RegistryId};

    fn addr(n: u8) -> Address {
        Address([n; 32])
    }

    fn registry(n: u8) -> RegistryId {
        RegistryId([n; 32])
    }

    fn engine() -> Exchange<InMemoryBridge> {
        Exchange::new(
            addr(100),
            addr(99),
            InMemoryBridge::new(),
            Box::new(MapRoyaltySource::new()),
        )
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        use chrono::TimeZone;
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn zero_fee_receiver_rejected_at_construction() {
        let err = Exchange::new(
            addr(100),
            Address::ZERO,
            InMemoryBridge::new(),
            Box::new(MapRoyaltySource::new()),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ExchangeError::ZeroAddress { .. }));
    }

    #[test]
    fn empty_batch_rejected() {
        let mut exchange = engine();
        let err = exchange.match_orders(addr(1), &[], now()).unwrap_err();
        assert!(matches!(err, ExchangeError::EmptyBatch));
    }

    #[test]
    fn paused_engine_rejects_batches() {
        let mut exchange = engine();
        exchange.pause(addr(100)).unwrap();
        let order = Order::between(
            addr(1),
            Asset::fungible(registry(1), 10),
            Asset::fungible(registry(2), 10),
        );
        let mirror = Order::between(
            addr(2),
            Asset::fungible(registry(2), 10),
            Asset::fungible(registry(1), 10),
        );
        let pairs = [OrderPair::new(order, mirror)];
        assert!(matches!(
            exchange.match_orders(addr(1), &pairs, now()),
            Err(ExchangeError::Paused)
        ));

        exchange.unpause(addr(100)).unwrap();
        assert!(!exchange.config().paused);
    }

    #[test]
    fn pause_requires_pauser_role() {
        let mut exchange = engine();
        let err = exchange.pause(addr(1)).unwrap_err();
        assert!(matches!(err, ExchangeError::MissingRole { .. }));
    }

    #[test]
    fn admin_setters_validate_inputs() {
        let mut exchange = engine();
        let admin = addr(100);

        assert!(matches!(
            exchange.set_protocol_fees(admin, 5_000, 100),
            Err(ExchangeError::FeeTooHigh(5_000))
        ));
        assert!(matches!(
            exchange.set_fee_receiver(admin, Address::ZERO),
            Err(ExchangeError::ZeroAddress { .. })
        ));
        assert!(matches!(
            exchange.set_match_orders_limit(admin, 0),
            Err(ExchangeError::InvalidLimit(0))
        ));

        exchange.set_protocol_fees(admin, 100, 200).unwrap();
        assert_eq!(exchange.config().fees.primary_bps, 100);
        assert_eq!(exchange.config().fees.secondary_bps, 200);
    }

    #[test]
    fn admin_setters_bump_version() {
        let mut exchange = engine();
        let before = exchange.config().version;
        exchange.set_match_orders_limit(addr(100), 10).unwrap();
        exchange.set_whitelist_enabled(addr(100), true).unwrap();
        assert_eq!(exchange.config().version, before + 2);
    }

    #[test]
    fn non_admin_cannot_mutate_config() {
        let mut exchange = engine();
        assert!(matches!(
            exchange.set_match_orders_limit(addr(1), 10),
            Err(ExchangeError::MissingRole { .. })
        ));
        assert!(matches!(
            exchange.grant_role(addr(1), addr(2), Role::Relayer),
            Err(ExchangeError::MissingRole { .. })
        ));
    }

    #[test]
    fn cancel_guards() {
        let mut exchange = engine();
        let maker = addr(1);
        let order = Order::between(
            maker,
            Asset::fungible(registry(1), 10),
            Asset::fungible(registry(2), 10),
        );
        let key = order.key();

        assert!(matches!(
            exchange.cancel(addr(2), &order, key),
            Err(ExchangeError::NotMaker)
        ));

        let mut zero_salt = order.clone();
        zero_salt.salt = 0;
        assert!(matches!(
            exchange.cancel(maker, &zero_salt, zero_salt.key()),
            Err(ExchangeError::ZeroSalt)
        ));

        assert!(matches!(
            exchange.cancel(maker, &order, OrderKey([0u8; 32])),
            Err(ExchangeError::InvalidOrderHash)
        ));

        exchange.cancel(maker, &order, key).unwrap();
        assert!(exchange.is_cancelled(&key));
        assert_eq!(exchange.fills(&key), u128::MAX);
    }

    #[test]
    fn unregistered_class_blocks_matching() {
        let mut exchange = engine();
        exchange
            .set_asset_class_registered(addr(100), AssetClass::Native, false)
            .unwrap();

        // Same maker on both sides so the batch is fully self-authorized.
        let maker = addr(1);
        exchange.bridge_mut().mint_native(maker, 100);
        exchange
            .bridge_mut()
            .mint_fungible(registry(1), maker, 100);
        let left = Order::between(
            maker,
            Asset::native(100),
            Asset::fungible(registry(1), 100),
        );
        let right = Order::between(
            maker,
            Asset::fungible(registry(1), 100),
            Asset::native(100),
        );
        let pairs = [OrderPair::new(left, right)];
        let err = exchange.match_orders(maker, &pairs, now()).unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidAssetClass { .. }));
    }

    #[test]
    fn match_orders_from_requires_relayer_role() {
        let mut exchange = engine();
        let order = Order::between(
            addr(1),
            Asset::fungible(registry(1), 10),
            Asset::fungible(registry(2), 10),
        );
        let mirror = Order::between(
            addr(1),
            Asset::fungible(registry(2), 10),
            Asset::fungible(registry(1), 10),
        );
        let pairs = [OrderPair::new(order, mirror)];
        let err = exchange
            .match_orders_from(addr(5), addr(1), &pairs, now())
            .unwrap_err();
        assert!(matches!(err, ExchangeError::MissingRole { .. }));
    }
}
