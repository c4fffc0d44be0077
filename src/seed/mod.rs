use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::PgPool;
use tracing::info;

use crate::error::AppResult;
use crate::models::Sweet;

/// Classic counter stock, paired with its category.
static SWEETS: &[(&str, &str)] = &[
    ("Kaju Katli", "Nut-Based"),
    ("Badam Barfi", "Nut-Based"),
    ("Pista Roll", "Nut-Based"),
    ("Gulab Jamun", "Milk-Based"),
    ("Rasgulla", "Milk-Based"),
    ("Rasmalai", "Milk-Based"),
    ("Kalakand", "Milk-Based"),
    ("Jalebi", "Syrup-Based"),
    ("Imarti", "Syrup-Based"),
    ("Besan Ladoo", "Flour-Based"),
    ("Motichoor Ladoo", "Flour-Based"),
    ("Mysore Pak", "Flour-Based"),
    ("Soan Papdi", "Flour-Based"),
    ("Chocolate Barfi", "Chocolate"),
    ("Milk Cake", "Milk-Based"),
    ("Coconut Ladoo", "Coconut"),
];

#[derive(Debug)]
pub struct SeedSweet {
    pub sweet_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i32,
    pub description: Option<String>,
}

/// Generate `count` sample sweets. Names cycle through the base table and
/// pick up a batch suffix once it is exhausted; sweet ids are serial so
/// repeated seeding collides deliberately (the insert skips duplicates).
pub fn generate_sweets(rng: &mut StdRng, count: usize) -> Vec<SeedSweet> {
    (0..count)
        .map(|i| {
            let (name, category) = SWEETS[i % SWEETS.len()];
            let name = if i < SWEETS.len() {
                name.to_string()
            } else {
                format!("{} #{}", name, i / SWEETS.len() + 1)
            };
            // whole- or half-rupee prices between 5.0 and 120.0
            let price = rng.gen_range(10..=240) as f64 / 2.0;
            SeedSweet {
                sweet_id: format!("SW-{:04}", 1001 + i),
                name: name.clone(),
                category: category.to_string(),
                price,
                quantity: rng.gen_range(0..=120),
                description: if rng.gen_bool(0.6) {
                    Some(format!("Fresh {} made daily in-house.", name))
                } else {
                    None
                },
            }
        })
        .collect()
}

/// Seed the catalog with `count` sample sweets in one bulk insert. Rows whose
/// sweet id already exists are left untouched.
pub async fn seed_sweets(pool: &PgPool, count: usize) -> AppResult<Vec<Sweet>> {
    info!("Seeding {} sweets...", count);

    let mut rng = StdRng::from_entropy();
    let generated = generate_sweets(&mut rng, count);

    let mut sweet_ids: Vec<String> = Vec::with_capacity(generated.len());
    let mut names: Vec<String> = Vec::with_capacity(generated.len());
    let mut categories: Vec<String> = Vec::with_capacity(generated.len());
    let mut prices: Vec<f64> = Vec::with_capacity(generated.len());
    let mut quantities: Vec<i32> = Vec::with_capacity(generated.len());
    let mut descriptions: Vec<Option<String>> = Vec::with_capacity(generated.len());

    for sweet in generated {
        sweet_ids.push(sweet.sweet_id);
        names.push(sweet.name);
        categories.push(sweet.category);
        prices.push(sweet.price);
        quantities.push(sweet.quantity);
        descriptions.push(sweet.description);
    }

    let inserted = sqlx::query_as::<_, Sweet>(
        r#"
        INSERT INTO sweets (sweet_id, name, category, price, quantity, description)
        SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::double precision[], $5::int[], $6::text[])
        ON CONFLICT (sweet_id) DO NOTHING
        RETURNING id, sweet_id, name, category, price, quantity, description, image, created_at, updated_at
        "#,
    )
    .bind(&sweet_ids)
    .bind(&names)
    .bind(&categories)
    .bind(&prices)
    .bind(&quantities)
    .bind(&descriptions)
    .fetch_all(pool)
    .await?;

    info!("Seeding complete. Inserted {} sweets", inserted.len());
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_sweet_ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(7);
        let sweets = generate_sweets(&mut rng, 50);
        let ids: HashSet<&str> = sweets.iter().map(|s| s.sweet_id.as_str()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn generated_sweets_satisfy_catalog_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        for sweet in generate_sweets(&mut rng, 40) {
            assert!(!sweet.sweet_id.is_empty());
            assert!(!sweet.name.is_empty());
            assert!(!sweet.category.is_empty());
            assert!(sweet.price >= 0.0);
            assert!(sweet.quantity >= 0);
        }
    }

    #[test]
    fn names_repeat_with_suffix_past_base_table() {
        let mut rng = StdRng::seed_from_u64(7);
        let sweets = generate_sweets(&mut rng, SWEETS.len() + 1);
        assert_eq!(sweets[0].name, "Kaju Katli");
        assert_eq!(sweets[SWEETS.len()].name, "Kaju Katli #2");
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let left = generate_sweets(&mut a, 10);
        let right = generate_sweets(&mut b, 10);
        for (l, r) in left.iter().zip(right.iter()) {
            assert_eq!(l.price, r.price);
            assert_eq!(l.quantity, r.quantity);
        }
    }
}
