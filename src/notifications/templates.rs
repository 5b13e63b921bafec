use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::interest::InterestSubmitted;
use crate::domain::order::{BrandDispatched, OrderItem, OrderPaid};
use crate::domain::user::BrandApproved;
use super::mailer::{Contact, OutgoingEmail};

// ============================================================================
// E-mail templates
// ============================================================================
//
// Plain inline HTML. Every user-supplied string goes through `escape`.
//
// ============================================================================

pub fn order_receipt(to: Contact, order_id: Uuid, paid: &OrderPaid) -> OutgoingEmail {
    let rows = item_rows(paid.items.iter());
    let html = format!(
        "<h1>Thanks for your order</h1>\
         <p>Hi {name},</p>\
         <p>We have received your payment for order <strong>{order}</strong>.</p>\
         <table>{rows}</table>\
         <p>Total paid: <strong>${total:.2}</strong></p>\
         <p>Each brand ships its items separately; you will hear from us as they go out.</p>",
        name = escape(&to.name),
        order = order_id,
        rows = rows,
        total = paid.total_price,
    );

    OutgoingEmail {
        template: "order_receipt",
        subject: format!("Vente Vault receipt for order {}", short_id(order_id)),
        to,
        html,
    }
}

pub fn brand_new_order(
    to: Contact,
    order_id: Uuid,
    brand_id: Uuid,
    brand_name: &str,
    paid: &OrderPaid,
) -> OutgoingEmail {
    let items: Vec<&OrderItem> = paid.items.iter().filter(|i| i.brand_id == brand_id).collect();
    let subtotal: Decimal = items.iter().map(|i| i.line_total()).sum();
    let html = format!(
        "<h1>New order for {brand}</h1>\
         <p>Order <strong>{order}</strong> has been paid and is ready to dispatch.</p>\
         <table>{rows}</table>\
         <p>Your items: <strong>${subtotal:.2}</strong></p>",
        brand = escape(brand_name),
        order = order_id,
        rows = item_rows(items.into_iter()),
        subtotal = subtotal,
    );

    OutgoingEmail {
        template: "brand_new_order",
        subject: format!("New order {} to dispatch", short_id(order_id)),
        to,
        html,
    }
}

pub fn brand_dispatched(to: Contact, order_id: Uuid, dispatched: &BrandDispatched) -> OutgoingEmail {
    let tracking = match &dispatched.tracking_number {
        Some(number) => format!("<p>Tracking number: <strong>{}</strong></p>", escape(number)),
        None => String::new(),
    };
    let html = format!(
        "<h1>Your items are on their way</h1>\
         <p>Hi {name},</p>\
         <p>{brand} has dispatched its items from order <strong>{order}</strong>.</p>\
         {tracking}",
        name = escape(&to.name),
        brand = escape(&dispatched.brand_name),
        order = order_id,
        tracking = tracking,
    );

    OutgoingEmail {
        template: "brand_dispatched",
        subject: format!("{} dispatched your order", dispatched.brand_name),
        to,
        html,
    }
}

pub fn brand_approved(approved: &BrandApproved) -> OutgoingEmail {
    let html = format!(
        "<h1>Welcome to Vente Vault</h1>\
         <p>Hi {name},</p>\
         <p>{brand} has been approved. You can now sign in and list your products.</p>",
        name = escape(&approved.contact_name),
        brand = escape(&approved.brand_name),
    );

    OutgoingEmail {
        template: "brand_approved",
        to: Contact::new(approved.email.as_str(), approved.contact_name.clone()),
        subject: format!("{} is approved on Vente Vault", approved.brand_name),
        html,
    }
}

pub fn interest_submitted(admin: Contact, submitted: &InterestSubmitted) -> OutgoingEmail {
    let details = &submitted.details;
    let html = format!(
        "<h1>New brand application</h1>\
         <p><strong>{brand}</strong> wants to sell on Vente Vault.</p>\
         <ul>\
         <li>Contact: {contact} ({email})</li>\
         <li>Phone: {phone}</li>\
         <li>Website: {website}</li>\
         <li>Instagram: {instagram}</li>\
         </ul>\
         <p>{message}</p>",
        brand = escape(&details.brand_name),
        contact = escape(&details.contact_name),
        email = escape(details.email.as_str()),
        phone = escape(&details.phone),
        website = escape(&details.website),
        instagram = escape(&details.instagram_handle),
        message = escape(&details.message),
    );

    OutgoingEmail {
        template: "interest_submitted",
        to: admin,
        subject: format!("Brand application: {}", details.brand_name),
        html,
    }
}

fn item_rows<'a>(items: impl Iterator<Item = &'a OrderItem>) -> String {
    items
        .map(|item| {
            let size = item
                .size
                .as_deref()
                .map(|s| format!(" ({})", escape(s)))
                .unwrap_or_default();
            format!(
                "<tr><td>{name}{size}</td><td>{qty} × ${price:.2}</td><td>${total:.2}</td></tr>",
                name = escape(&item.name),
                size = size,
                qty = item.qty,
                price = item.price,
                total = item.line_total(),
            )
        })
        .collect()
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::PaymentResult;
    use crate::domain::shared::Email;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn item(brand_id: Uuid, name: &str, price: Decimal, qty: i32) -> OrderItem {
        OrderItem {
            product_id: Uuid::new_v4(),
            name: name.to_string(),
            image: String::new(),
            size: Some("M".to_string()),
            price,
            qty,
            brand_id,
            brand_name: "Brand".to_string(),
        }
    }

    fn paid(items: Vec<OrderItem>) -> OrderPaid {
        OrderPaid {
            user_id: Uuid::new_v4(),
            payment_result: PaymentResult::default(),
            total_price: dec!(57.50),
            items,
            brand_deliveries: vec![],
            paid_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>Tom & \"Jerry\"</b>"), "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_receipt_lists_items_and_total() {
        let order_id = Uuid::new_v4();
        let email = order_receipt(
            Contact::new("jane@example.com", "Jane"),
            order_id,
            &paid(vec![item(Uuid::new_v4(), "Linen Shirt", dec!(25), 2)]),
        );

        assert_eq!(email.template, "order_receipt");
        assert!(email.subject.contains(&short_id(order_id)));
        assert!(email.html.contains("Linen Shirt (M)"));
        assert!(email.html.contains("$50.00"));
        assert!(email.html.contains("$57.50"));
    }

    #[test]
    fn test_brand_notice_only_lists_own_items() {
        let ours = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        let order = paid(vec![
            item(ours, "Wool Scarf", dec!(30), 1),
            item(theirs, "Leather Belt", dec!(40), 1),
        ]);

        let email = brand_new_order(Contact::new("b@x.com", "B"), Uuid::new_v4(), ours, "Knits", &order);

        assert!(email.html.contains("Wool Scarf"));
        assert!(!email.html.contains("Leather Belt"));
        assert!(email.html.contains("$30.00"));
    }

    #[test]
    fn test_dispatch_includes_tracking_when_present() {
        let dispatched = BrandDispatched {
            user_id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            brand_name: "Knits".to_string(),
            tracking_number: Some("TRK-1".to_string()),
            dispatched_at: Utc::now(),
        };

        let email = brand_dispatched(Contact::new("jane@example.com", "Jane"), Uuid::new_v4(), &dispatched);
        assert!(email.html.contains("TRK-1"));
    }

    #[test]
    fn test_brand_approved_goes_to_applicant() {
        let approved = BrandApproved {
            email: Email::parse("owner@knits.com").unwrap(),
            contact_name: "Olive".to_string(),
            brand_name: "Knits".to_string(),
            approved_at: Utc::now(),
        };

        let email = brand_approved(&approved);
        assert_eq!(email.to.email, "owner@knits.com");
        assert!(email.subject.contains("Knits"));
    }
}
