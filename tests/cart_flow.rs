mod common;

use common::{
    anonymous, assert_consistent, create_customer, create_product, line_for, set_price, setup_state,
    signed_in,
};
use sea_orm::EntityTrait;
use storefront_api::{
    dto::cart::AddToCartRequest,
    entity::Carts,
    error::AppError,
    middleware::session::SessionId,
    models::{Cart, CartAction},
    services::{cart_service, session_service},
};
use uuid::Uuid;

fn add(product_id: Uuid, quantity: Option<i32>) -> AddToCartRequest {
    AddToCartRequest {
        product_id,
        quantity,
    }
}

fn cart_of(resp: storefront_api::response::ApiResponse<storefront_api::dto::cart::CartView>) -> Cart {
    resp.data
        .and_then(|view| view.cart)
        .expect("response carries a cart")
}

#[tokio::test]
async fn first_add_creates_cart_and_binds_it_to_the_session() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 250).await?;
    let session = SessionId::new();

    let resp = cart_service::add_to_cart(&state, &anonymous(session), add(mug, None)).await?;
    assert_eq!(resp.data.as_ref().map(|v| v.session_id), Some(session.0));
    let cart = cart_of(resp);

    assert_eq!(cart.total, 250);
    assert_eq!(cart.customer_id, None);
    assert_eq!(cart.lines.len(), 1);
    let line = line_for(&cart, mug).expect("mug line");
    assert_eq!((line.rate, line.quantity, line.subtotal), (250, 1, 250));
    assert_eq!(line.product_title, "ferris mug");

    let bound = session_service::current_cart_id(&state.orm, session).await?;
    assert_eq!(bound, Some(cart.id));
    Ok(())
}

#[tokio::test]
async fn adding_twice_equals_adding_two_at_once() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 120).await?;

    let twice = anonymous(SessionId::new());
    cart_service::add_to_cart(&state, &twice, add(mug, None)).await?;
    let twice_cart = cart_of(cart_service::add_to_cart(&state, &twice, add(mug, None)).await?);

    let once = anonymous(SessionId::new());
    let once_cart = cart_of(cart_service::add_to_cart(&state, &once, add(mug, Some(2))).await?);

    assert_ne!(twice_cart.id, once_cart.id);
    assert_eq!(twice_cart.total, once_cart.total);
    assert_eq!(twice_cart.lines.len(), 1);
    assert_eq!(
        line_for(&twice_cart, mug).map(|l| l.quantity),
        line_for(&once_cart, mug).map(|l| l.quantity)
    );
    assert_eq!(twice_cart.total, 240);
    Ok(())
}

#[tokio::test]
async fn running_total_matches_lines_after_every_mutation() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let hoodie = create_product(&state, "axum-hoodie", 100).await?;
    let stickers = create_product(&state, "sticker-pack", 35).await?;
    let ctx = anonymous(SessionId::new());

    let cart = cart_of(cart_service::add_to_cart(&state, &ctx, add(hoodie, None)).await?);
    assert_consistent(&cart);
    let cart = cart_of(cart_service::add_to_cart(&state, &ctx, add(stickers, Some(3))).await?);
    assert_consistent(&cart);
    assert_eq!(cart.total, 205);

    let hoodie_line = line_for(&cart, hoodie).map(|l| l.id).expect("hoodie line");
    let sticker_line = line_for(&cart, stickers).map(|l| l.id).expect("sticker line");

    let steps = [
        (hoodie_line, Some(CartAction::Increment), 305),
        (sticker_line, Some(CartAction::Decrement), 270),
        (hoodie_line, Some(CartAction::Decrement), 170),
        (sticker_line, Some(CartAction::Increment), 205),
        (hoodie_line, Some(CartAction::Remove), 105),
        (sticker_line, None, 105),
    ];
    for (line_id, action, expected_total) in steps {
        let cart = cart_of(cart_service::change_quantity(&state, &ctx, line_id, action).await?);
        assert_consistent(&cart);
        assert_eq!(cart.total, expected_total, "after {action:?}");
    }

    let cart = cart_of(cart_service::add_to_cart(&state, &ctx, add(hoodie, None)).await?);
    assert_consistent(&cart);
    assert_eq!(cart.total, 205);
    Ok(())
}

#[tokio::test]
async fn decrementing_a_single_unit_line_removes_it() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let hoodie = create_product(&state, "axum-hoodie", 100).await?;
    let stickers = create_product(&state, "sticker-pack", 35).await?;
    let ctx = anonymous(SessionId::new());

    cart_service::add_to_cart(&state, &ctx, add(hoodie, None)).await?;
    let before = cart_of(cart_service::add_to_cart(&state, &ctx, add(stickers, None)).await?);
    let sticker_line = line_for(&before, stickers).expect("sticker line");
    let rate = sticker_line.rate;

    let after = cart_of(
        cart_service::change_quantity(&state, &ctx, sticker_line.id, Some(CartAction::Decrement))
            .await?,
    );

    assert_eq!(after.total, before.total - rate);
    assert!(line_for(&after, stickers).is_none());
    assert_eq!(after.lines.len(), 1);
    assert_consistent(&after);
    Ok(())
}

#[tokio::test]
async fn unknown_action_leaves_cart_untouched() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 120).await?;
    let ctx = anonymous(SessionId::new());

    let before = cart_of(cart_service::add_to_cart(&state, &ctx, add(mug, Some(2))).await?);
    let line_id = before.lines[0].id;
    let after = cart_of(
        cart_service::change_quantity(&state, &ctx, line_id, CartAction::parse("explode")).await?,
    );

    assert_eq!(after.total, before.total);
    assert_eq!(after.lines[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn lines_of_another_session_are_not_reachable() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 120).await?;
    let owner = anonymous(SessionId::new());
    let cart = cart_of(cart_service::add_to_cart(&state, &owner, add(mug, None)).await?);
    let line_id = cart.lines[0].id;

    let stranger = anonymous(SessionId::new());
    let result =
        cart_service::change_quantity(&state, &stranger, line_id, Some(CartAction::Remove)).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    // Even with a cart of its own, the stranger cannot touch the owner's line.
    cart_service::add_to_cart(&state, &stranger, add(mug, None)).await?;
    let result =
        cart_service::change_quantity(&state, &stranger, line_id, Some(CartAction::Remove)).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    let untouched = cart_of(cart_service::view_cart(&state, &owner).await?);
    assert_eq!(untouched.total, 120);
    Ok(())
}

#[tokio::test]
async fn emptying_keeps_the_cart_but_clears_lines_and_total() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let hoodie = create_product(&state, "axum-hoodie", 100).await?;
    let mug = create_product(&state, "ferris-mug", 120).await?;
    let ctx = anonymous(SessionId::new());

    cart_service::add_to_cart(&state, &ctx, add(hoodie, Some(2))).await?;
    let full = cart_of(cart_service::add_to_cart(&state, &ctx, add(mug, None)).await?);
    assert_eq!(full.total, 320);

    let emptied = cart_of(cart_service::empty_cart(&state, &ctx).await?);
    assert_eq!(emptied.id, full.id);
    assert_eq!(emptied.total, 0);
    assert!(emptied.lines.is_empty());
    assert_eq!(
        session_service::current_cart_id(&state.orm, ctx.session).await?,
        Some(full.id)
    );
    Ok(())
}

#[tokio::test]
async fn emptying_without_a_cart_is_harmless() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let resp = cart_service::empty_cart(&state, &anonymous(SessionId::new())).await?;
    assert!(resp.data.and_then(|view| view.cart).is_none());
    Ok(())
}

#[tokio::test]
async fn line_rate_is_frozen_when_first_added() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 100).await?;
    let ctx = anonymous(SessionId::new());

    cart_service::add_to_cart(&state, &ctx, add(mug, None)).await?;
    set_price(&state, mug, 999).await?;
    let cart = cart_of(cart_service::add_to_cart(&state, &ctx, add(mug, None)).await?);

    let line = line_for(&cart, mug).expect("mug line");
    assert_eq!((line.rate, line.quantity, line.subtotal), (100, 2, 200));
    assert_eq!(cart.total, 200);
    Ok(())
}

#[tokio::test]
async fn anonymous_cart_follows_the_customer_who_logs_in() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 100).await?;
    let alice = create_customer(&state, "alice@example.com").await?;
    let bob = create_customer(&state, "bob@example.com").await?;
    let session = SessionId::new();

    let cart = cart_of(cart_service::add_to_cart(&state, &anonymous(session), add(mug, None)).await?);
    assert_eq!(cart.customer_id, None);

    let cart = cart_of(cart_service::view_cart(&state, &signed_in(session, &alice)).await?);
    assert_eq!(cart.customer_id, Some(alice.user_id));

    // Rebinding to the same customer changes nothing.
    let cart = cart_of(cart_service::view_cart(&state, &signed_in(session, &alice)).await?);
    assert_eq!(cart.customer_id, Some(alice.user_id));

    // A cart already owned is not handed to somebody else, nor shown to them.
    let for_bob = cart_service::view_cart(&state, &signed_in(session, &bob)).await?;
    assert!(for_bob.data.and_then(|view| view.cart).is_none());
    assert_eq!(session_service::current_cart_id(&state.orm, session).await?, None);

    let kept = Carts::find_by_id(cart.id)
        .one(&state.orm)
        .await?
        .expect("alice's cart survives");
    assert_eq!(kept.customer_id, Some(alice.user_id));
    assert_eq!(kept.total, 100);
    Ok(())
}

#[tokio::test]
async fn second_customer_on_a_session_gets_a_cart_of_their_own() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 100).await?;
    let hat = create_product(&state, "crab-hat", 50).await?;
    let alice = create_customer(&state, "alice@example.com").await?;
    let bob = create_customer(&state, "bob@example.com").await?;
    let session = SessionId::new();

    let alices = cart_of(cart_service::add_to_cart(&state, &signed_in(session, &alice), add(mug, None)).await?);
    let bobs = cart_of(cart_service::add_to_cart(&state, &signed_in(session, &bob), add(hat, None)).await?);

    assert_ne!(bobs.id, alices.id);
    assert_eq!(bobs.customer_id, Some(bob.user_id));
    assert_eq!(bobs.total, 50);
    assert_eq!(bobs.lines.len(), 1);
    assert!(line_for(&bobs, mug).is_none());

    let untouched = Carts::find_by_id(alices.id)
        .one(&state.orm)
        .await?
        .expect("alice's cart");
    assert_eq!(untouched.total, 100);
    Ok(())
}

#[tokio::test]
async fn unknown_action_is_ignored_even_for_foreign_lines() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 120).await?;
    let owner = anonymous(SessionId::new());
    let cart = cart_of(cart_service::add_to_cart(&state, &owner, add(mug, None)).await?);

    let stranger = anonymous(SessionId::new());
    let resp = cart_service::change_quantity(&state, &stranger, cart.lines[0].id, None).await?;
    assert!(resp.data.and_then(|view| view.cart).is_none());

    let untouched = cart_of(cart_service::view_cart(&state, &owner).await?);
    assert_eq!(untouched.total, 120);
    Ok(())
}

#[tokio::test]
async fn cart_created_by_a_customer_is_owned_from_the_start() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 100).await?;
    let alice = create_customer(&state, "alice@example.com").await?;

    let ctx = signed_in(SessionId::new(), &alice);
    let cart = cart_of(cart_service::add_to_cart(&state, &ctx, add(mug, None)).await?);
    assert_eq!(cart.customer_id, Some(alice.user_id));
    Ok(())
}

#[tokio::test]
async fn invalid_adds_are_rejected() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let mug = create_product(&state, "ferris-mug", 100).await?;
    let ctx = anonymous(SessionId::new());

    let zero = cart_service::add_to_cart(&state, &ctx, add(mug, Some(0))).await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));

    let missing = cart_service::add_to_cart(&state, &ctx, add(Uuid::new_v4(), None)).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    // Nothing was created for the session along the way.
    assert_eq!(
        session_service::current_cart_id(&state.orm, ctx.session).await?,
        None
    );
    Ok(())
}
