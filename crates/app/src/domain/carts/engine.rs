//! Cart Engine
//!
//! Pure cart mutations. Each operation validates against the product's live
//! state, works on a copy of the items and only writes back once the new
//! total is known, so a failed call leaves the cart untouched. The returned
//! [`ItemChange`]s are what the store persists.

use std::mem;

use crate::domain::{
    carts::{
        errors::CartsServiceError,
        models::{Cart, CartItem, CartItemUuid},
    },
    products::records::{ProductRecord, ProductUuid},
};

/// A single item-level effect of a cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemChange {
    Inserted(CartItem),
    Updated(CartItem),
    Removed(CartItem),
}

impl CartItem {
    /// `quantity * unit_price`.
    pub fn line_total(&self) -> Result<u64, CartsServiceError> {
        u64::from(self.quantity)
            .checked_mul(self.unit_price)
            .ok_or(CartsServiceError::InvalidQuantity)
    }

    fn lock_price(&mut self, product: &ProductRecord) {
        self.product_name.clone_from(&product.name);
        self.discount = product.discount;
        self.unit_price = product.special_price;
    }
}

fn sum_line_totals(items: &[CartItem]) -> Result<u64, CartsServiceError> {
    items.iter().try_fold(0_u64, |total, item| {
        total
            .checked_add(item.line_total()?)
            .ok_or(CartsServiceError::InvalidQuantity)
    })
}

impl Cart {
    #[must_use]
    pub fn item(&self, product: ProductUuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_uuid == product)
    }

    fn position(&self, product: ProductUuid) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_uuid == product)
    }

    fn new_item(&self, product: &ProductRecord, quantity: u32) -> CartItem {
        CartItem {
            uuid: CartItemUuid::new(),
            cart_uuid: self.uuid,
            product_uuid: product.uuid,
            product_name: product.name.clone(),
            quantity,
            discount: product.discount,
            unit_price: product.special_price,
        }
    }

    fn commit(&mut self, items: Vec<CartItem>) -> Result<(), CartsServiceError> {
        self.total_price = sum_line_totals(&items)?;
        self.items = items;

        Ok(())
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line is topped up at its locked price; otherwise a new line
    /// locks the product's current special price.
    pub fn add_item(
        &mut self,
        product: &ProductRecord,
        quantity: u32,
    ) -> Result<ItemChange, CartsServiceError> {
        if !product.in_stock() {
            return Err(CartsServiceError::Unavailable);
        }

        if quantity == 0 || quantity > product.quantity {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut items = self.items.clone();

        let change = if let Some(item) = items
            .iter_mut()
            .find(|item| item.product_uuid == product.uuid)
        {
            item.quantity = item
                .quantity
                .checked_add(quantity)
                .ok_or(CartsServiceError::InvalidQuantity)?;

            ItemChange::Updated(item.clone())
        } else {
            let item = self.new_item(product, quantity);

            items.push(item.clone());

            ItemChange::Inserted(item)
        };

        self.commit(items)?;

        Ok(change)
    }

    /// Adjust a line by `delta` units, removing it at zero or below.
    ///
    /// A surviving line is re-locked to the product's current price.
    pub fn change_quantity(
        &mut self,
        product: &ProductRecord,
        delta: i64,
    ) -> Result<ItemChange, CartsServiceError> {
        let index = self
            .position(product.uuid)
            .ok_or(CartsServiceError::NotFound)?;

        let mut items = self.items.clone();

        let current = items.get(index).ok_or(CartsServiceError::NotFound)?;

        let requested = i64::from(current.quantity)
            .checked_add(delta)
            .ok_or(CartsServiceError::InvalidQuantity)?;

        if requested <= 0 {
            let removed = items.remove(index);

            self.commit(items)?;

            return Ok(ItemChange::Removed(removed));
        }

        if requested > i64::from(product.quantity) {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let Ok(quantity) = u32::try_from(requested) else {
            return Err(CartsServiceError::InvalidQuantity);
        };

        let item = items.get_mut(index).ok_or(CartsServiceError::NotFound)?;

        item.quantity = quantity;
        item.lock_price(product);

        let change = ItemChange::Updated(item.clone());

        self.commit(items)?;

        Ok(change)
    }

    /// Take a product's line out of the cart, deducting its contribution.
    pub fn remove_item(&mut self, product: ProductUuid) -> Result<ItemChange, CartsServiceError> {
        let index = self.position(product).ok_or(CartsServiceError::NotFound)?;
        let item = self.items.get(index).ok_or(CartsServiceError::NotFound)?;

        let total = self
            .total_price
            .checked_sub(item.line_total()?)
            .ok_or(CartsServiceError::InvalidData)?;

        let removed = self.items.remove(index);

        self.total_price = total;

        Ok(ItemChange::Removed(removed))
    }

    /// Re-lock a line to the product's current special price and discount.
    pub fn propagate_price_change(
        &mut self,
        product: &ProductRecord,
    ) -> Result<ItemChange, CartsServiceError> {
        let slot = self
            .items
            .iter_mut()
            .find(|item| item.product_uuid == product.uuid)
            .ok_or(CartsServiceError::NotFound)?;

        let mut item = slot.clone();
        let previous = item.line_total()?;

        item.lock_price(product);

        let total = self
            .total_price
            .checked_sub(previous)
            .ok_or(CartsServiceError::InvalidData)?
            .checked_add(item.line_total()?)
            .ok_or(CartsServiceError::InvalidQuantity)?;

        *slot = item.clone();
        self.total_price = total;

        Ok(ItemChange::Updated(item))
    }

    /// Replace every line with fresh ones at current prices.
    ///
    /// Lines naming the same product are folded together. Stock is not
    /// checked. Returns the removals followed by the insertions.
    pub fn replace_contents(
        &mut self,
        lines: &[(ProductRecord, u32)],
    ) -> Result<Vec<ItemChange>, CartsServiceError> {
        let mut items: Vec<CartItem> = Vec::with_capacity(lines.len());
        let mut total = 0_u64;

        for (product, quantity) in lines {
            if *quantity == 0 {
                return Err(CartsServiceError::InvalidQuantity);
            }

            let contribution = u64::from(*quantity)
                .checked_mul(product.special_price)
                .ok_or(CartsServiceError::InvalidQuantity)?;

            total = total
                .checked_add(contribution)
                .ok_or(CartsServiceError::InvalidQuantity)?;

            if let Some(item) = items
                .iter_mut()
                .find(|item| item.product_uuid == product.uuid)
            {
                item.quantity = item
                    .quantity
                    .checked_add(*quantity)
                    .ok_or(CartsServiceError::InvalidQuantity)?;
            } else {
                items.push(self.new_item(product, *quantity));
            }
        }

        let inserted: Vec<ItemChange> = items.iter().cloned().map(ItemChange::Inserted).collect();
        let previous = mem::replace(&mut self.items, items);

        self.total_price = total;

        let mut changes: Vec<ItemChange> = previous.into_iter().map(ItemChange::Removed).collect();

        changes.extend(inserted);

        Ok(changes)
    }

    /// Whether the stored total agrees with the items.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        sum_line_totals(&self.items).is_ok_and(|total| total == self.total_price)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use proptest::prelude::*;
    use testresult::TestResult;

    use crate::domain::{
        carts::models::CartUuid, categories::records::CategoryUuid,
        products::pricing::special_price, users::UserUuid,
    };

    use super::*;

    fn empty_cart() -> Cart {
        Cart {
            uuid: CartUuid::new(),
            user_uuid: UserUuid::new(),
            total_price: 0,
            version: 0,
            items: Vec::new(),
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn product(name: &str, stock: u32, special: u64) -> ProductRecord {
        ProductRecord {
            uuid: ProductUuid::new(),
            category_uuid: CategoryUuid::new(),
            name: name.to_string(),
            description: "A product for testing".to_string(),
            quantity: stock,
            price: special,
            discount: 0,
            special_price: special,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            deleted_at: None,
        }
    }

    #[test]
    fn adding_then_draining_a_product() -> TestResult {
        let mut cart = empty_cart();
        let lamp = product("Lamp", 5, 9_000);

        let change = cart.add_item(&lamp, 3)?;

        assert!(matches!(change, ItemChange::Inserted(ref item) if item.quantity == 3));
        assert_eq!(cart.total_price, 27_000);

        let change = cart.change_quantity(&lamp, -3)?;

        assert!(matches!(change, ItemChange::Removed(_)));
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_price, 0);

        Ok(())
    }

    #[test]
    fn new_line_locks_special_price_and_discount() -> TestResult {
        let mut cart = empty_cart();
        let mut lamp = product("Lamp", 10, 0);

        lamp.price = 1_000;
        lamp.discount = 10;
        lamp.special_price = special_price(lamp.price, lamp.discount)?;

        cart.add_item(&lamp, 2)?;

        let item = cart.item(lamp.uuid).ok_or("item missing")?;

        assert_eq!(item.unit_price, 900);
        assert_eq!(item.discount, 10);
        assert_eq!(item.product_name, "Lamp");
        assert_eq!(cart.total_price, 1_800);

        Ok(())
    }

    #[test]
    fn adding_existing_product_keeps_locked_price() -> TestResult {
        let mut cart = empty_cart();
        let mut lamp = product("Lamp", 10, 500);

        cart.add_item(&lamp, 1)?;

        lamp.special_price = 700;

        let change = cart.add_item(&lamp, 2)?;

        assert!(matches!(change, ItemChange::Updated(ref item) if item.quantity == 3 && item.unit_price == 500));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_price, 1_500);

        Ok(())
    }

    #[test]
    fn adding_more_than_stock_leaves_cart_unchanged() -> TestResult {
        let mut cart = empty_cart();
        let lamp = product("Lamp", 5, 9_000);

        cart.add_item(&lamp, 2)?;

        let before = cart.clone();
        let result = cart.add_item(&lamp, 6);

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn adding_zero_units_is_rejected() {
        let mut cart = empty_cart();
        let result = cart.add_item(&product("Lamp", 5, 100), 0);

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );
    }

    #[test]
    fn adding_out_of_stock_product_is_unavailable() {
        let mut cart = empty_cart();
        let result = cart.add_item(&product("Lamp", 0, 100), 1);

        assert!(
            matches!(result, Err(CartsServiceError::Unavailable)),
            "expected Unavailable, got {result:?}"
        );
        assert!(cart.items.is_empty());
    }

    #[test]
    fn changing_quantity_relocks_price() -> TestResult {
        let mut cart = empty_cart();
        let mut lamp = product("Lamp", 10, 500);

        cart.add_item(&lamp, 2)?;

        lamp.special_price = 400;
        lamp.discount = 20;

        let change = cart.change_quantity(&lamp, 1)?;

        assert!(matches!(change, ItemChange::Updated(ref item) if item.quantity == 3 && item.unit_price == 400 && item.discount == 20));
        assert_eq!(cart.total_price, 1_200);

        Ok(())
    }

    #[test]
    fn edits_touch_only_the_matching_line() -> TestResult {
        let mut cart = empty_cart();
        let mut lamp = product("Lamp", 10, 500);
        let mug = product("Mug", 10, 250);
        let rug = product("Rug", 10, 1_000);

        cart.add_item(&lamp, 1)?;
        cart.add_item(&mug, 2)?;
        cart.add_item(&rug, 1)?;

        cart.change_quantity(&mug, 1)?;

        lamp.special_price = 450;
        cart.propagate_price_change(&lamp)?;
        cart.remove_item(rug.uuid)?;

        let lines: Vec<(ProductUuid, u32, u64)> = cart
            .items
            .iter()
            .map(|item| (item.product_uuid, item.quantity, item.unit_price))
            .collect();

        assert_eq!(
            lines,
            vec![(lamp.uuid, 1, 450), (mug.uuid, 3, 250)],
            "lines should keep their order and only the edited ones change"
        );
        assert_eq!(cart.total_price, 1_200, "total should track the edits");
        assert!(cart.is_consistent(), "total should equal the line sum");

        Ok(())
    }

    #[test]
    fn changing_quantity_beyond_stock_is_rejected() -> TestResult {
        let mut cart = empty_cart();
        let lamp = product("Lamp", 4, 100);

        cart.add_item(&lamp, 3)?;

        let before = cart.clone();
        let result = cart.change_quantity(&lamp, 2);

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn changing_quantity_below_zero_removes_the_line() -> TestResult {
        let mut cart = empty_cart();
        let lamp = product("Lamp", 4, 100);
        let mug = product("Mug", 4, 250);

        cart.add_item(&lamp, 3)?;
        cart.add_item(&mug, 1)?;

        let change = cart.change_quantity(&lamp, -10)?;

        assert!(matches!(change, ItemChange::Removed(ref item) if item.product_uuid == lamp.uuid));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_price, 250);

        Ok(())
    }

    #[test]
    fn changing_quantity_of_absent_product_is_not_found() {
        let mut cart = empty_cart();
        let result = cart.change_quantity(&product("Lamp", 4, 100), 1);

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[test]
    fn removing_deducts_the_line_total() -> TestResult {
        let mut cart = empty_cart();
        let lamp = product("Lamp", 4, 100);
        let mug = product("Mug", 4, 250);

        cart.add_item(&lamp, 2)?;
        cart.add_item(&mug, 2)?;

        let change = cart.remove_item(mug.uuid)?;

        assert!(matches!(change, ItemChange::Removed(ref item) if item.product_name == "Mug"));
        assert_eq!(cart.total_price, 200);
        assert!(cart.is_consistent());

        Ok(())
    }

    #[test]
    fn removing_absent_product_is_not_found() {
        let mut cart = empty_cart();
        let result = cart.remove_item(ProductUuid::new());

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[test]
    fn removing_from_an_understated_total_is_invalid() -> TestResult {
        let mut cart = empty_cart();
        let lamp = product("Lamp", 4, 100);

        cart.add_item(&lamp, 2)?;
        cart.total_price = 50;

        let result = cart.remove_item(lamp.uuid);

        assert!(
            matches!(result, Err(CartsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
        assert_eq!(cart.items.len(), 1);

        Ok(())
    }

    #[test]
    fn price_change_swaps_old_contribution_for_new() -> TestResult {
        let mut cart = empty_cart();
        let mut lamp = product("Lamp", 10, 1_000);
        let mug = product("Mug", 10, 300);

        cart.add_item(&lamp, 2)?;
        cart.add_item(&mug, 1)?;

        lamp.special_price = 750;
        lamp.discount = 25;

        cart.propagate_price_change(&lamp)?;

        let item = cart.item(lamp.uuid).ok_or("item missing")?;

        assert_eq!(item.unit_price, 750);
        assert_eq!(item.discount, 25);
        assert_eq!(cart.total_price, 1_800);

        Ok(())
    }

    #[test]
    fn price_change_for_absent_product_is_not_found() {
        let mut cart = empty_cart();
        let result = cart.propagate_price_change(&product("Lamp", 1, 1));

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[test]
    fn replacing_contents_reprices_everything() -> TestResult {
        let mut cart = empty_cart();
        let mut lamp = product("Lamp", 10, 1_000);
        let mug = product("Mug", 1, 300);

        cart.add_item(&lamp, 1)?;

        lamp.special_price = 800;

        let changes = cart.replace_contents(&[(lamp.clone(), 2), (mug.clone(), 3)])?;

        let removed = changes
            .iter()
            .filter(|change| matches!(change, ItemChange::Removed(_)))
            .count();

        assert_eq!(removed, 1);
        assert_eq!(changes.len(), 3);
        assert_eq!(cart.total_price, 2 * 800 + 3 * 300);
        assert!(cart.is_consistent());

        Ok(())
    }

    #[test]
    fn replacing_contents_folds_duplicate_products() -> TestResult {
        let mut cart = empty_cart();
        let lamp = product("Lamp", 10, 100);

        cart.replace_contents(&[(lamp.clone(), 1), (lamp.clone(), 2)])?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.total_price, 300);

        Ok(())
    }

    #[test]
    fn replacing_contents_with_zero_quantity_leaves_cart_unchanged() -> TestResult {
        let mut cart = empty_cart();
        let lamp = product("Lamp", 10, 100);

        cart.add_item(&lamp, 1)?;

        let before = cart.clone();
        let result = cart.replace_contents(&[(lamp, 0)]);

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn replacing_contents_twice_is_idempotent() -> TestResult {
        let mut cart = empty_cart();
        let lines = [(product("Lamp", 10, 100), 2), (product("Mug", 10, 250), 1)];

        cart.replace_contents(&lines)?;

        let first: Vec<_> = cart
            .items
            .iter()
            .map(|item| (item.product_uuid, item.quantity, item.unit_price))
            .collect();
        let first_total = cart.total_price;

        cart.replace_contents(&lines)?;

        let second: Vec<_> = cart
            .items
            .iter()
            .map(|item| (item.product_uuid, item.quantity, item.unit_price))
            .collect();

        assert_eq!(first, second);
        assert_eq!(cart.total_price, first_total);

        Ok(())
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize, u32),
        Change(usize, i64),
        Remove(usize),
        Reprice(usize, u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..3_usize, 0..8_u32).prop_map(|(p, q)| Op::Add(p, q)),
            (0..3_usize, -8..8_i64).prop_map(|(p, d)| Op::Change(p, d)),
            (0..3_usize).prop_map(Op::Remove),
            (0..3_usize, 0..10_000_u64).prop_map(|(p, price)| Op::Reprice(p, price)),
        ]
    }

    proptest! {
        #[test]
        fn total_matches_items_after_any_sequence(ops in prop::collection::vec(op(), 1..40)) {
            let mut cart = empty_cart();
            let mut products = vec![
                product("Lamp", 5, 9_000),
                product("Mug", 20, 350),
                product("Rug", 1, 12_500),
            ];

            for op in ops {
                let before = cart.clone();

                let result = match op {
                    Op::Add(p, q) => cart.add_item(&products[p], q).map(|_| ()),
                    Op::Change(p, d) => cart.change_quantity(&products[p], d).map(|_| ()),
                    Op::Remove(p) => cart.remove_item(products[p].uuid).map(|_| ()),
                    Op::Reprice(p, price) => {
                        products[p].special_price = price;

                        match cart.propagate_price_change(&products[p]) {
                            Err(CartsServiceError::NotFound) => Ok(()),
                            other => other.map(|_| ()),
                        }
                    }
                };

                if result.is_err() {
                    prop_assert_eq!(&cart, &before);
                }

                prop_assert!(cart.is_consistent());
                prop_assert!(cart.items.iter().all(|item| item.quantity > 0));
            }
        }
    }
}
