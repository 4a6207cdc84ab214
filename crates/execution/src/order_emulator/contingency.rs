// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Contingency coordination across linked order groups (OTO, OCO, OUO) and
//! exec-spawn groups.

use ferrum_common::messages::execution::{SubmitOrder, TradingCommand};
use ferrum_core::UUID4;
use ferrum_model::{
    enums::{ContingencyType, TriggerType},
    events::order::{
        OrderCanceled, OrderEventAny, OrderExpired, OrderFilled, OrderRejected, OrderUpdated,
    },
    identifiers::{ClientId, ClientOrderId, PositionId},
    orders::Order,
    types::Quantity,
};

use super::emulator::OrderEmulator;

impl OrderEmulator {
    /// Caches a submit order command for later release or cancellation.
    pub fn cache_submit_order_command(&mut self, command: SubmitOrder) {
        self.commands_submit_order
            .insert(command.client_order_id, command);
    }

    /// Removes and returns a cached submit order command.
    pub fn pop_submit_order_command(
        &mut self,
        client_order_id: ClientOrderId,
    ) -> Option<SubmitOrder> {
        self.commands_submit_order.remove(&client_order_id)
    }

    /// Returns whether the emulator should coordinate the given order.
    #[must_use]
    pub fn should_manage_order(&self, order: &Order) -> bool {
        order.is_active_local()
    }

    /// Submits the given order into the pipeline: emulated orders re-enter
    /// the submission path, all others are forwarded to the risk engine or
    /// their execution algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if the order cannot be written to the cache.
    pub fn create_new_submit_order(
        &mut self,
        order: &Order,
        position_id: Option<PositionId>,
        client_id: Option<ClientId>,
    ) -> anyhow::Result<()> {
        self.cache
            .borrow_mut()
            .add_order(order.clone(), position_id, client_id, true)?;

        let submit = SubmitOrder::new(
            order.trader_id,
            client_id,
            order.strategy_id,
            order.instrument_id,
            order.clone(),
            order.exec_algorithm_id,
            position_id,
            UUID4::new(),
            self.clock.borrow().timestamp_ns(),
        );

        if order.emulation_trigger == TriggerType::NoTrigger {
            self.cache_submit_order_command(submit.clone());

            match order.exec_algorithm_id {
                Some(exec_algorithm_id) => self.send_algo_command(submit, exec_algorithm_id),
                None => self.send_risk_command(TradingCommand::SubmitOrder(submit)),
            }
        } else {
            self.handle_submit_order(submit);
        }

        Ok(())
    }

    /// Updates the quantity of the given order through the emulator.
    pub fn modify_order_quantity(&mut self, order: &Order, new_quantity: Quantity) {
        let mut order = order.clone();
        self.update_order(&mut order, new_quantity);
    }

    // -- EVENT HANDLERS ------------------------------------------------------

    /// Routes an order event to the appropriate contingency handler.
    ///
    /// Only terminal and quantity-changing events drive coordination; the
    /// remaining lifecycle events are deliberate no-ops here.
    pub fn handle_event(&mut self, event: OrderEventAny) {
        match event {
            OrderEventAny::Rejected(event) => self.handle_order_rejected(event),
            OrderEventAny::Canceled(event) => self.handle_order_canceled(event),
            OrderEventAny::Expired(event) => self.handle_order_expired(event),
            OrderEventAny::Updated(event) => self.handle_order_updated(event),
            OrderEventAny::Filled(event) => self.handle_order_filled(event),
            OrderEventAny::Initialized(_)
            | OrderEventAny::Emulated(_)
            | OrderEventAny::Released(_)
            | OrderEventAny::Submitted(_)
            | OrderEventAny::Accepted(_)
            | OrderEventAny::Triggered(_) => {}
        }
    }

    pub fn handle_order_rejected(&mut self, rejected: OrderRejected) {
        let order = self.cache.borrow().order(&rejected.client_order_id).cloned();
        if let Some(order) = order {
            if order.contingency_type != ContingencyType::NoContingency {
                self.handle_contingencies(order);
            }
        } else {
            log::error!(
                "Cannot handle `OrderRejected`: order for client_order_id: {} not found, {rejected}",
                rejected.client_order_id,
            );
        }
    }

    pub fn handle_order_canceled(&mut self, canceled: OrderCanceled) {
        let order = self.cache.borrow().order(&canceled.client_order_id).cloned();
        if let Some(order) = order {
            if order.contingency_type != ContingencyType::NoContingency {
                self.handle_contingencies(order);
            }
        } else {
            log::error!(
                "Cannot handle `OrderCanceled`: order for client_order_id: {} not found, {canceled}",
                canceled.client_order_id,
            );
        }
    }

    pub fn handle_order_expired(&mut self, expired: OrderExpired) {
        let order = self.cache.borrow().order(&expired.client_order_id).cloned();
        if let Some(order) = order {
            if order.contingency_type != ContingencyType::NoContingency {
                self.handle_contingencies(order);
            }
        } else {
            log::error!(
                "Cannot handle `OrderExpired`: order for client_order_id: {} not found, {expired}",
                expired.client_order_id,
            );
        }
    }

    pub fn handle_order_updated(&mut self, updated: OrderUpdated) {
        let order = self.cache.borrow().order(&updated.client_order_id).cloned();
        if let Some(order) = order {
            if order.contingency_type != ContingencyType::NoContingency {
                self.handle_contingencies_update(&order);
            }
        } else {
            log::error!(
                "Cannot handle `OrderUpdated`: order for client_order_id: {} not found, {updated}",
                updated.client_order_id,
            );
        }
    }

    /// Handles a fill by arming OTO children, canceling OCO siblings, or
    /// propagating OUO quantities.
    ///
    /// # Panics
    ///
    /// Panics if a linked order is missing from the cache: the contingency
    /// graph is malformed, which is a logic error upstream.
    pub fn handle_order_filled(&mut self, filled: OrderFilled) {
        let order = self.cache.borrow().order(&filled.client_order_id).cloned();
        let Some(order) = order else {
            log::error!(
                "Cannot handle `OrderFilled`: order for client_order_id: {} not found, {filled}",
                filled.client_order_id,
            );
            return;
        };

        match order.contingency_type {
            ContingencyType::Oto => {
                let position_id = self.cache.borrow().position_id(&order.client_order_id);
                let client_id = self.cache.borrow().client_id(&order.client_order_id);

                let parent_filled_qty = match order.exec_spawn_id {
                    Some(spawn_id) => {
                        let filled_qty = self
                            .cache
                            .borrow()
                            .exec_spawn_total_filled_qty(&spawn_id, true);
                        let Some(filled_qty) = filled_qty else {
                            log::error!("Failed to get spawn filled quantity for {spawn_id}");
                            return;
                        };
                        filled_qty
                    }
                    None => order.filled_qty,
                };

                let Some(linked_order_ids) = order.linked_order_ids.clone() else {
                    log::error!("No linked orders found for OTO order");
                    return;
                };

                for client_order_id in &linked_order_ids {
                    let child_order = self.cache.borrow().order(client_order_id).cloned();
                    let mut child_order = child_order.unwrap_or_else(|| {
                        panic!("Cannot find OTO child order for client_order_id: {client_order_id}")
                    });

                    if !self.should_manage_order(&child_order)
                        || child_order.is_closed()
                        || child_order.is_pending_cancel()
                    {
                        continue;
                    }

                    // The child is sized to the spawn group's filled quantity,
                    // not to its remaining leaves
                    if parent_filled_qty != child_order.quantity {
                        self.modify_order_quantity(&child_order, parent_filled_qty);
                        if let Some(updated) =
                            self.cache.borrow().order(client_order_id).cloned()
                        {
                            child_order = updated;
                        }
                    }

                    if child_order.position_id.is_none() {
                        child_order.position_id = position_id;
                    }

                    if !self
                        .commands_submit_order
                        .contains_key(&child_order.client_order_id)
                        && let Err(e) =
                            self.create_new_submit_order(&child_order, position_id, client_id)
                    {
                        log::error!("Failed to create new submit order: {e}");
                    }
                }
            }
            ContingencyType::Oco => {
                let Some(linked_order_ids) = order.linked_order_ids.clone() else {
                    log::error!("No linked orders found for OCO order");
                    return;
                };

                for client_order_id in &linked_order_ids {
                    let contingent_order = self.cache.borrow().order(client_order_id).cloned();
                    let contingent_order = contingent_order.unwrap_or_else(|| {
                        panic!(
                            "Cannot find OCO contingent order for client_order_id: {client_order_id}"
                        )
                    });

                    // Not being managed || already completed
                    if !self.should_manage_order(&contingent_order) || contingent_order.is_closed()
                    {
                        continue;
                    }
                    if contingent_order.client_order_id != order.client_order_id {
                        self.cancel_order(&contingent_order);
                    }
                }
            }
            ContingencyType::Ouo => self.handle_contingencies(order),
            ContingencyType::NoContingency => {}
        }
    }

    /// Applies terminal and quantity effects of one leg to its open siblings.
    ///
    /// # Panics
    ///
    /// Panics if a linked order is missing from the cache.
    pub fn handle_contingencies(&mut self, order: Order) {
        let (filled_qty, leaves_qty, is_spawn_active) = if let Some(spawn_id) = order.exec_spawn_id
        {
            let quantities = {
                let cache = self.cache.borrow();
                (
                    cache.exec_spawn_total_filled_qty(&spawn_id, true),
                    cache.exec_spawn_total_leaves_qty(&spawn_id, true),
                )
            };
            if let (Some(filled_qty), Some(leaves_qty)) = quantities {
                (filled_qty, leaves_qty, leaves_qty.is_positive())
            } else {
                log::error!("Failed to get spawn quantities for {spawn_id}");
                return;
            }
        } else {
            (order.filled_qty, order.leaves_qty, false)
        };

        let Some(linked_order_ids) = order.linked_order_ids.clone() else {
            log::error!("No linked orders found");
            return;
        };

        for client_order_id in &linked_order_ids {
            let contingent_order = self.cache.borrow().order(client_order_id).cloned();
            let contingent_order = contingent_order.unwrap_or_else(|| {
                panic!("Cannot find contingent order for client_order_id: {client_order_id}")
            });

            if !self.should_manage_order(&contingent_order)
                || *client_order_id == order.client_order_id
            {
                continue;
            }

            if contingent_order.is_closed() {
                self.commands_submit_order.remove(&order.client_order_id);
                continue;
            }

            match order.contingency_type {
                ContingencyType::Oto => {
                    if order.is_closed()
                        && filled_qty.is_zero()
                        && (order.exec_spawn_id.is_none() || !is_spawn_active)
                    {
                        self.cancel_order(&contingent_order);
                    } else if filled_qty.is_positive() && filled_qty != contingent_order.quantity {
                        self.modify_order_quantity(&contingent_order, filled_qty);
                    }
                }
                ContingencyType::Oco => {
                    if order.is_closed() && (order.exec_spawn_id.is_none() || !is_spawn_active) {
                        self.cancel_order(&contingent_order);
                    }
                }
                ContingencyType::Ouo => {
                    if (leaves_qty.is_zero() && order.exec_spawn_id.is_some())
                        || (order.is_closed()
                            && (order.exec_spawn_id.is_none() || !is_spawn_active))
                    {
                        self.cancel_order(&contingent_order);
                    } else if leaves_qty != contingent_order.leaves_qty {
                        self.modify_order_quantity(&contingent_order, leaves_qty);
                    }
                }
                ContingencyType::NoContingency => {}
            }
        }
    }

    /// Propagates a quantity update on one leg to its open siblings.
    ///
    /// # Panics
    ///
    /// Panics if a linked order is missing from the cache.
    pub fn handle_contingencies_update(&mut self, order: &Order) {
        // Spawned secondaries never drive sibling updates; only the primary does
        if order.is_spawn_secondary() {
            return;
        }

        let quantity = match order.exec_spawn_id {
            Some(spawn_id) => {
                let quantity = self
                    .cache
                    .borrow()
                    .exec_spawn_total_quantity(&spawn_id, true);
                let Some(quantity) = quantity else {
                    log::error!("Failed to get spawn total quantity for {spawn_id}");
                    return;
                };
                quantity
            }
            None => order.quantity,
        };

        if quantity.is_zero() {
            return;
        }

        let Some(linked_order_ids) = order.linked_order_ids.clone() else {
            log::error!("No linked orders found for contingent order");
            return;
        };

        for client_order_id in &linked_order_ids {
            let contingent_order = self.cache.borrow().order(client_order_id).cloned();
            let contingent_order = contingent_order.unwrap_or_else(|| {
                panic!("Cannot find contingent order for client_order_id: {client_order_id}")
            });

            if !self.should_manage_order(&contingent_order)
                || *client_order_id == order.client_order_id
                || contingent_order.is_closed()
            {
                continue;
            }

            if matches!(
                order.contingency_type,
                ContingencyType::Oto | ContingencyType::Ouo
            ) && quantity != contingent_order.quantity
            {
                self.modify_order_quantity(&contingent_order, quantity);
            }
        }
    }
}
