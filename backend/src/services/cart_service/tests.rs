use super::*;
use chrono::{Duration, Utc};

fn order(id: i64, status: OrderStatus, total: i64, age_minutes: i64) -> Order {
    Order {
        id,
        user_id: 1,
        status,
        total: Decimal::from(total),
        created_at: Utc::now() - Duration::minutes(age_minutes),
        paid_at: Some(Utc::now()),
    }
}

fn item(id: i64, order_id: i64, ticket_id: Option<i64>, number: &str, price: i64) -> OrderItem {
    OrderItem {
        id,
        order_id,
        ticket_id,
        number: number.to_string(),
        price: Decimal::from(price),
    }
}

#[test]
fn groups_items_under_their_orders() {
    let orders = vec![order(2, OrderStatus::Paid, 160, 1), order(1, OrderStatus::Drawn, 80, 60)];
    let items = vec![
        item(1, 1, Some(10), "111111", 80),
        item(2, 2, Some(11), "222222", 80),
        item(3, 2, Some(12), "333333", 80),
    ];

    let grouped = group_orders(orders, items);

    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].oid, 2);
    assert_eq!(grouped[0].items.len(), 2);
    assert_eq!(grouped[0].total, Decimal::from(160));
    assert_eq!(grouped[1].oid, 1);
    assert_eq!(grouped[1].status, OrderStatus::Drawn);
    assert_eq!(grouped[1].items[0].number, "111111");
}

#[test]
fn orders_without_items_get_empty_lists() {
    let grouped = group_orders(vec![order(5, OrderStatus::Paid, 0, 0)], Vec::new());
    assert_eq!(grouped.len(), 1);
    assert!(grouped[0].items.is_empty());
}

#[test]
fn receipts_for_regenerated_tickets_keep_number_and_price() {
    let grouped = group_orders(
        vec![order(3, OrderStatus::Drawn, 80, 5)],
        vec![item(9, 3, None, "424242", 80)],
    );
    let line = &grouped[0].items[0];
    assert_eq!(line.lotto_id, 0);
    assert_eq!(line.number, "424242");
    assert_eq!(line.price, Decimal::from(80));
}
