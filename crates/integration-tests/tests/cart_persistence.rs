//! Cart mutations against real file-backed storage.
//!
//! Every mutation must leave the persisted record in lockstep with memory:
//! a fresh hydration from the same profile directory reproduces the exact
//! cart, and clearing deletes the record outright.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use thread_haven_core::Price;
use thread_haven_storefront::cart::{CartStore, ProductSummary, VariantChoice, VariantKey};
use thread_haven_storefront::storage::{JsonFileStore, KeyValueStore, keys};

fn shirt_a() -> ProductSummary {
    ProductSummary {
        id: "shirt-a".into(),
        name: "Oxford Shirt".to_owned(),
        price: Price::from(500_u32),
        image: "/img/shirt-a.jpg".to_owned(),
    }
}

#[test]
fn cart_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let m_black = VariantChoice::new("M", "Black").unwrap();

    // First "session": build up a cart.
    {
        let mut storage = JsonFileStore::new(dir.path());
        let mut cart = CartStore::load(&storage);
        cart.add_item(&mut storage, &shirt_a(), &m_black).unwrap();
        cart.add_item(&mut storage, &shirt_a(), &m_black).unwrap();
    }

    // Second "session": same profile directory, identical cart.
    let storage = JsonFileStore::new(dir.path());
    let cart = CartStore::load(&storage);
    assert_eq!(cart.cart().line_items.len(), 1);
    assert_eq!(cart.cart().line_items[0].quantity, 2);
    assert_eq!(cart.cart().total_quantity, 2);
    assert_eq!(cart.cart().total_amount, Decimal::from(1000));
}

#[test]
fn corrupt_cart_file_hydrates_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cartItems.json"), "{definitely not json").unwrap();

    let mut storage = JsonFileStore::new(dir.path());
    let mut cart = CartStore::load(&storage);
    assert!(cart.cart().is_empty());

    // The store is fully usable after recovery.
    cart.add_item(
        &mut storage,
        &shirt_a(),
        &VariantChoice::new("M", "Black").unwrap(),
    )
    .unwrap();

    let rehydrated = CartStore::load(&storage);
    assert_eq!(rehydrated.cart(), cart.cart());
}

#[test]
fn clearing_cart_removes_the_record_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = JsonFileStore::new(dir.path());
    let mut cart = CartStore::load(&storage);
    let m_black = VariantChoice::new("M", "Black").unwrap();

    cart.add_item(&mut storage, &shirt_a(), &m_black).unwrap();
    assert!(dir.path().join("cartItems.json").exists());

    cart.clear(&mut storage);
    assert!(!dir.path().join("cartItems.json").exists());
    assert!(storage.get_raw(keys::CART_ITEMS).is_none());
}

#[test]
fn remove_and_decrement_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = JsonFileStore::new(dir.path());
    let mut cart = CartStore::load(&storage);

    let m_black = VariantChoice::new("M", "Black").unwrap();
    let l_white = VariantChoice::new("L", "White").unwrap();
    cart.add_item(&mut storage, &shirt_a(), &m_black).unwrap();
    cart.add_item(&mut storage, &shirt_a(), &l_white).unwrap();
    cart.add_item(&mut storage, &shirt_a(), &l_white).unwrap();

    let l_white_key = VariantKey::new("shirt-a".into(), &l_white);
    cart.decrement_quantity(&mut storage, &l_white_key).unwrap();
    cart.remove_item(&mut storage, &VariantKey::new("shirt-a".into(), &m_black))
        .unwrap();

    let rehydrated = CartStore::load(&storage);
    assert_eq!(rehydrated.cart().line_items.len(), 1);
    assert_eq!(rehydrated.cart().line_items[0].size, "L");
    assert_eq!(rehydrated.cart().line_items[0].quantity, 1);
    assert_eq!(rehydrated.cart().total_amount, Decimal::from(500));
}
