//! Translation of domain filters into JSONB predicates.
//!
//! Each `push_*` appends ` AND ...` clauses to a query that already ends in
//! a `WHERE` condition.

use domains::{PetFilter, PostFilter, UserFilter};
use sqlx::{Postgres, QueryBuilder};

/// `%needle%` with LIKE metacharacters escaped.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn push_pet_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PetFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND doc->>'status' = ").push_bind(status.as_str());
    }
    if let Some(q) = &filter.text {
        let pattern = like_pattern(q);
        qb.push(" AND (doc->>'name' ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR doc->>'breed' ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(pet_type) = filter.pet_type {
        qb.push(" AND doc->>'type' = ").push_bind(pet_type.as_str());
    }
    if let Some(types) = &filter.pet_types {
        let types: Vec<String> = types.iter().map(|t| t.as_str().to_owned()).collect();
        qb.push(" AND doc->>'type' = ANY(").push_bind(types).push(")");
    }
    if let Some(breed) = &filter.breed {
        qb.push(" AND doc->>'breed' ILIKE ").push_bind(like_pattern(breed));
    }
    if let Some(age) = filter.age {
        if let Some(min) = age.min {
            qb.push(" AND (doc->'age'->>'value')::float8 >= ").push_bind(min);
        }
        if let Some(max) = age.max {
            qb.push(" AND (doc->'age'->>'value')::float8 <= ").push_bind(max);
        }
    }
    if let Some(gender) = filter.gender {
        qb.push(" AND doc->>'gender' = ").push_bind(gender.as_str());
    }
    if let Some(size) = filter.size {
        qb.push(" AND doc->>'size' = ").push_bind(size.as_str());
    }
    if let Some(city) = &filter.city {
        qb.push(" AND doc->'location'->>'city' ILIKE ").push_bind(like_pattern(city));
    }
    if let Some(min) = filter.min_fee {
        qb.push(" AND (doc->>'adoptionFee')::float8 >= ").push_bind(min);
    }
    if let Some(max) = filter.max_fee {
        qb.push(" AND (doc->>'adoptionFee')::float8 <= ").push_bind(max);
    }
    if let Some(vaccinated) = filter.is_vaccinated {
        qb.push(" AND (doc->'health'->>'isVaccinated')::boolean = ").push_bind(vaccinated);
    }
    if let Some(spayed) = filter.is_spayed {
        qb.push(" AND (doc->'health'->>'isSpayed')::boolean = ").push_bind(spayed);
    }
    if let Some(owner) = filter.owner {
        qb.push(" AND doc->>'owner' = ").push_bind(owner.to_string());
    }
    if let Some(user) = filter.favorited_by {
        qb.push(" AND doc->'favorites' @> jsonb_build_array(")
            .push_bind(user.to_string())
            .push("::text)");
    }
    if let Some(user) = filter.applicant {
        qb.push(" AND EXISTS (SELECT 1 FROM pet_applications pa WHERE pa.pet_id = pets.id AND pa.user_id = ")
            .push_bind(user.as_uuid())
            .push(")");
    }
    if let Some(featured) = filter.featured {
        qb.push(" AND COALESCE((doc->>'isFeatured')::boolean, false) = ").push_bind(featured);
    }
    if let Some(after) = filter.created_after {
        qb.push(" AND created_at >= ").push_bind(after);
    }
}

pub(crate) fn push_post_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    if filter.visible_only {
        qb.push(" AND (doc->>'isPublic')::boolean AND doc->>'status' = 'active'");
    }
    if let Some(author) = filter.author {
        qb.push(" AND doc->>'author' = ").push_bind(author.to_string());
    }
    if let Some(q) = &filter.text {
        qb.push(" AND doc->>'content' ILIKE ").push_bind(like_pattern(q));
    }
    if let Some(post_type) = filter.post_type {
        qb.push(" AND doc->>'type' = ").push_bind(post_type.as_str());
    }
    if let Some(tags) = &filter.tags_any {
        qb.push(" AND EXISTS (SELECT 1 FROM jsonb_array_elements_text(doc->'tags') AS t(tag) WHERE t.tag = ANY(")
            .push_bind(tags.clone())
            .push("))");
    }
    if let Some(ids) = &filter.pet_ids {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        qb.push(" AND doc->>'pet' = ANY(").push_bind(ids).push(")");
    }
    if let Some(after) = filter.created_after {
        qb.push(" AND created_at >= ").push_bind(after);
    }
}

pub(crate) fn push_user_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if let Some(q) = &filter.text {
        let pattern = like_pattern(q);
        qb.push(" AND (doc->>'name' ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR doc->>'email' ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(role) = filter.role {
        qb.push(" AND doc->>'role' = ").push_bind(role.as_str());
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND (doc->>'isActive')::boolean = ").push_bind(active);
    }
    if let Some(verified) = filter.is_verified {
        qb.push(" AND COALESCE((doc->>'isVerified')::boolean, false) = ").push_bind(verified);
    }
    if let Some(after) = filter.created_after {
        qb.push(" AND created_at >= ").push_bind(after);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("lab"), "%lab%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn filters_render_placeholders_in_order() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM pets WHERE TRUE");
        push_pet_filter(
            &mut qb,
            &PetFilter {
                text: Some("lab".into()),
                ..PetFilter::available()
            },
        );
        assert_eq!(
            qb.sql(),
            "SELECT doc FROM pets WHERE TRUE AND doc->>'status' = $1 AND (doc->>'name' ILIKE $2 OR doc->>'breed' ILIKE $3)"
        );
    }
}
