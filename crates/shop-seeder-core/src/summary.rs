//! Summary builder: renders a shop into the text that gets embedded.

use crate::models::{ProductRecord, ShopRecord};

/// Render `shop` as a single human-readable line.
///
/// Format:
///
/// ```text
/// {name}, owned by {owner}, located at {address} ({lat}, {lon}). Rating: {rating} stars. Products: {p1}, {p2}, ...
/// ```
///
/// where each product is `{name} ({category}, ${price})`, in the record's
/// original order. Numbers use their shortest round-trip form, so `40.0`
/// renders as `40` and `1.2` as `1.2`. Magnitudes below `1e-6` or from
/// `1e21` up switch to exponent form (`1e-7`, `1.5e+21`).
///
/// # Example
///
/// ```rust
/// use shop_seeder_core::models::{Location, ShopRecord};
/// use shop_seeder_core::summary::shop_summary;
///
/// let shop = ShopRecord {
///     name: "Corner Pantry".into(),
///     owner: "R. Diaz".into(),
///     location: Location { latitude: 1.5, longitude: 2.0, address: "9 Elm".into() },
///     rating: 3.0,
///     products: vec![],
/// };
/// assert_eq!(
///     shop_summary(&shop),
///     "Corner Pantry, owned by R. Diaz, located at 9 Elm (1.5, 2). Rating: 3 stars. Products: "
/// );
/// ```
pub fn shop_summary(shop: &ShopRecord) -> String {
    let location = format!(
        "{} ({}, {})",
        shop.location.address,
        number(shop.location.latitude),
        number(shop.location.longitude)
    );
    let products = shop
        .products
        .iter()
        .map(product_summary)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}, owned by {}, located at {}. Rating: {} stars. Products: {}",
        shop.name,
        shop.owner,
        location,
        number(shop.rating),
        products
    )
}

fn product_summary(product: &ProductRecord) -> String {
    format!(
        "{} ({}, ${})",
        product.name,
        product.category,
        number(product.price)
    )
}

fn number(value: f64) -> String {
    // -0.0 prints as "-0"
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude.is_finite() && !(1e-6..1e21).contains(&magnitude) {
        let exponent = format!("{:e}", value);
        return match exponent.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => exponent,
        };
    }
    value.to_string()
}
