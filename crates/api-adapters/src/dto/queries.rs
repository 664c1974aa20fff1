use serde::Deserialize;

use domains::{
    AgeRange, Gender, PageRequest, PetFilter, PetType, PostFilter, PostType, Result, Size,
};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn request(&self, default_limit: u32) -> PageRequest {
        PageRequest::new(self.page, self.limit, default_limit)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSearchQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub pet_type: Option<PetType>,
    pub breed: Option<String>,
    /// `"min-max"` or `"max"`.
    pub age: Option<String>,
    pub gender: Option<Gender>,
    pub size: Option<Size>,
    pub city: Option<String>,
    pub min_fee: Option<f64>,
    pub max_fee: Option<f64>,
    pub is_vaccinated: Option<bool>,
    pub is_spayed: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl PetSearchQuery {
    pub fn filter(&self) -> Result<PetFilter> {
        let age = match non_blank(&self.age) {
            Some(range) => Some(range.parse::<AgeRange>()?),
            None => None,
        };
        Ok(PetFilter {
            text: non_blank(&self.q),
            pet_type: self.pet_type,
            breed: non_blank(&self.breed),
            age,
            gender: self.gender,
            size: self.size,
            city: non_blank(&self.city),
            min_fee: self.min_fee,
            max_fee: self.max_fee,
            is_vaccinated: self.is_vaccinated,
            is_spayed: self.is_spayed,
            ..PetFilter::available()
        })
    }

    pub fn page(&self, default_limit: u32) -> PageRequest {
        PageRequest::new(self.page, self.limit, default_limit)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostSearchQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<PostType>,
    /// Comma-separated; a post matches when it carries any of them.
    pub tags: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PostSearchQuery {
    pub fn filter(&self) -> PostFilter {
        let tags: Vec<String> = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        PostFilter {
            text: non_blank(&self.q),
            post_type: self.post_type,
            tags_any: (!tags.is_empty()).then_some(tags),
            ..PostFilter::visible()
        }
    }

    pub fn page(&self, default_limit: u32) -> PageRequest {
        PageRequest::new(self.page, self.limit, default_limit)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::PetStatus;

    #[test]
    fn pet_search_is_always_restricted_to_available() {
        let query = PetSearchQuery {
            q: Some("  lab ".into()),
            age: Some("1-3".into()),
            city: Some(" ".into()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.status, Some(PetStatus::Available));
        assert_eq!(filter.text.as_deref(), Some("lab"));
        assert_eq!(filter.age, Some(AgeRange { min: Some(1.0), max: Some(3.0) }));
        assert_eq!(filter.city, None);
    }

    #[test]
    fn bad_age_range_is_a_validation_error() {
        let query = PetSearchQuery {
            age: Some("young".into()),
            ..Default::default()
        };
        assert!(query.filter().is_err());
    }

    #[test]
    fn post_search_splits_tags() {
        let query = PostSearchQuery {
            tags: Some("dogs, ,rescue".into()),
            ..Default::default()
        };
        let filter = query.filter();
        assert!(filter.visible_only);
        assert_eq!(filter.tags_any, Some(vec!["dogs".to_owned(), "rescue".to_owned()]));
    }
}
